//! Interactive prompts

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;

/// Ask a yes/no question on the terminal
///
/// Returns `false` without asking when stdin is not a terminal.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    read_confirmation(io::stdin().lock())
}

fn read_confirmation(mut input: impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.trim().to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes" | "j" | "ja"))
}
