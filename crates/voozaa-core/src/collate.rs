//! Locale-aware, numeric-aware string ordering
//!
//! Approximates a German collation with numeric sorting: digit runs compare
//! by numeric value (`"9" < "10"`), letters compare case-insensitively with
//! accented letters folded onto their base letter, and remaining ties put
//! lowercase before uppercase.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, PartialEq, Eq)]
enum Token {
    /// Digit run with leading zeros stripped
    Number(String),
    Char(char),
}

/// Compare two strings the way the list views sort text columns
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let primary = cmp_tokens(&tokenize(&fold(a)), &tokenize(&fold(b)));
    if primary != Ordering::Equal {
        return primary;
    }
    // Tertiary strength: lowercase before uppercase, then code point order
    let key = |c: char| (c.is_uppercase(), c);
    a.chars().map(key).cmp(b.chars().map(key))
}

/// Lowercase, decompose and drop combining marks, so `é` sorts as `e`
///
/// Letters without a canonical decomposition (`ß`, `ł`, `ø`, ...) are
/// mapped by hand.
fn fold(s: &str) -> String {
    let lowered: String = s.chars().flat_map(char::to_lowercase).collect();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ł' => out.push('l'),
            'ø' => out.push('o'),
            'đ' | 'ð' => out.push('d'),
            'ı' => out.push('i'),
            other => out.push(other),
        }
    }
    out
}

fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut digits = String::from(c);
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            let trimmed = digits.trim_start_matches('0');
            tokens.push(Token::Number(if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }));
        } else {
            tokens.push(Token::Char(c));
        }
    }
    tokens
}

fn cmp_tokens(a: &[Token], b: &[Token]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Token::Number(m), Token::Number(n)) => m.len().cmp(&n.len()).then_with(|| m.cmp(n)),
            (Token::Char(c), Token::Char(d)) => c.cmp(d),
            // Numbers sort where the digit '0' would
            (Token::Number(_), Token::Char(d)) => '0'.cmp(d),
            (Token::Char(c), Token::Number(_)) => c.cmp(&'0'),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| natural_cmp(a, b));
        items
    }

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("Lead 10", "Lead 9"), Ordering::Greater);
        assert_eq!(sorted(vec!["a10", "a2", "a1"]), vec!["a1", "a2", "a10"]);
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_first_on_ties() {
        assert_eq!(natural_cmp("a", "A"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_umlauts_fold() {
        assert_eq!(sorted(vec!["Zürich", "Ulm", "Ümit"]), vec!["Ulm", "Ümit", "Zürich"]);
        assert_ne!(natural_cmp("Straße", "Strasse"), Ordering::Equal);
        assert_eq!(natural_cmp("Straße", "Strassf"), Ordering::Less);
    }

    #[test]
    fn test_accents_fold_beyond_german() {
        assert_eq!(natural_cmp("Ñandú", "Zebra"), Ordering::Less);
        assert_eq!(natural_cmp("Çelik", "Dora"), Ordering::Less);
        assert_eq!(natural_cmp("Łukasz", "Martin"), Ordering::Less);
        assert_eq!(natural_cmp("Øre", "Pia"), Ordering::Less);
        assert_eq!(sorted(vec!["Émile", "Eva", "Ebert"]), vec!["Ebert", "Émile", "Eva"]);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("007", "8"), Ordering::Less);
        assert_eq!(natural_cmp("2026-01-12", "2026-01-28"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("Neu", "Neukunde"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }
}
