//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use voozaa_core::display::{format_date, format_money};
use voozaa_core::stats::{StageCount, StatusRevenue};
use voozaa_core::{Customer, Lead, Location, Stats, TrackerState};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        print!("{}", encode(value));
    }

    /// Print a single lead
    pub fn print_lead(&self, state: &TrackerState, lead: &Lead) {
        match self.format {
            OutputFormat::Human => {
                let settings = &state.settings;
                println!("ID:         {}", lead.id);
                println!("Name:       {}", lead.name);
                print_optional("Company:", &lead.company);
                print_optional("Email:", &lead.email);
                print_optional("Phone:", &lead.phone);
                println!("Stage:      {}", lead.stage);
                print_optional("Source:", &lead.source);
                print_optional(
                    "Location:",
                    state.location_name(lead.location_id.as_deref()).unwrap_or(""),
                );
                println!(
                    "Value:      {}",
                    format_money(lead.value, &settings.currency)
                );
                println!(
                    "Created:    {}",
                    format_date(lead.created_at.date_naive(), &settings.date_format)
                );
                println!(
                    "Updated:    {}",
                    format_date(lead.updated_at.date_naive(), &settings.date_format)
                );
                if !lead.notes.is_empty() {
                    println!();
                    println!("{}", lead.notes);
                }
            }
            OutputFormat::Json => self.json(lead),
            OutputFormat::Quiet => println!("{}", lead.id),
        }
    }

    /// Print a list of leads
    pub fn print_leads(&self, state: &TrackerState, leads: &[&Lead]) {
        print!("{}", self.render_leads(state, leads));
    }

    fn render_leads(&self, state: &TrackerState, leads: &[&Lead]) -> String {
        match self.format {
            OutputFormat::Human => {
                if leads.is_empty() {
                    return "No leads found.\n".to_string();
                }
                let mut out = String::new();
                for lead in leads {
                    out.push_str(&format!(
                        "{} | {} | {} | {} | {}\n",
                        lead.id,
                        truncate(&lead.name, 25),
                        truncate(&lead.company, 20),
                        lead.stage,
                        format_money(lead.value, &state.settings.currency)
                    ));
                }
                out.push_str(&format!("\n{} lead(s)\n", leads.len()));
                out
            }
            OutputFormat::Json => encode(leads),
            OutputFormat::Quiet => id_lines(leads.iter().map(|l| l.id.as_str())),
        }
    }

    /// Print a single customer
    pub fn print_customer(&self, state: &TrackerState, customer: &Customer) {
        match self.format {
            OutputFormat::Human => {
                let settings = &state.settings;
                println!("ID:         {}", customer.id);
                println!("Customer:   {}", customer.name);
                print_optional("Contact:", &customer.contact);
                print_optional("Email:", &customer.email);
                print_optional("Phone:", &customer.phone);
                println!("Status:     {}", customer.status);
                print_optional("Tags:", &customer.tags.join(", "));
                print_optional(
                    "Location:",
                    state
                        .location_name(customer.location_id.as_deref())
                        .unwrap_or(""),
                );
                println!(
                    "MRR:        {}",
                    format_money(customer.mrr, &settings.currency)
                );
                if let Some(start) = customer.start_date {
                    println!("Since:      {}", format_date(start, &settings.date_format));
                }
                if !customer.notes.is_empty() {
                    println!();
                    println!("{}", customer.notes);
                }
            }
            OutputFormat::Json => self.json(customer),
            OutputFormat::Quiet => println!("{}", customer.id),
        }
    }

    /// Print a list of customers
    pub fn print_customers(&self, state: &TrackerState, customers: &[&Customer]) {
        print!("{}", self.render_customers(state, customers));
    }

    fn render_customers(&self, state: &TrackerState, customers: &[&Customer]) -> String {
        match self.format {
            OutputFormat::Human => {
                if customers.is_empty() {
                    return "No customers found.\n".to_string();
                }
                let mut out = String::new();
                for customer in customers {
                    out.push_str(&format!(
                        "{} | {} | {} | {}\n",
                        customer.id,
                        truncate(&customer.name, 30),
                        customer.status,
                        format_money(customer.mrr, &state.settings.currency)
                    ));
                }
                out.push_str(&format!("\n{} customer(s)\n", customers.len()));
                out
            }
            OutputFormat::Json => encode(customers),
            OutputFormat::Quiet => id_lines(customers.iter().map(|c| c.id.as_str())),
        }
    }

    /// Print a list of locations with how many records use each
    pub fn print_locations(&self, state: &TrackerState) {
        match self.format {
            OutputFormat::Human => {
                if state.locations.is_empty() {
                    println!("No locations found.");
                    return;
                }
                for location in &state.locations {
                    let (leads, customers) = usage(state, location);
                    println!(
                        "{} | {} | {} | {} lead(s), {} customer(s)",
                        location.id,
                        truncate(&location.name, 25),
                        location.region,
                        leads,
                        customers
                    );
                }
                println!("\n{} location(s)", state.locations.len());
            }
            OutputFormat::Json => self.json(&state.locations),
            OutputFormat::Quiet => {
                for location in &state.locations {
                    println!("{}", location.id);
                }
            }
        }
    }

    /// Print the overview figures and breakdowns
    pub fn print_stats(
        &self,
        state: &TrackerState,
        stats: &Stats,
        by_stage: &[StageCount],
        by_status: &[StatusRevenue],
    ) {
        match self.format {
            OutputFormat::Human => {
                let money = |v: f64| format_money(v, &state.settings.currency);
                println!("{}", state.profile.org_name);
                println!();
                println!("Leads:      {}", stats.leads);
                println!("Customers:  {}", stats.customers);
                println!("MRR:        {}", money(stats.mrr));
                println!("Pipeline:   {}", money(stats.pipeline));
                println!("Won:        {}", money(stats.won));
                println!("Lost:       {}", money(stats.lost));
                println!();
                println!("── Leads by stage ──");
                for entry in by_stage {
                    println!("{:<20} {}", entry.stage, entry.count);
                }
                println!();
                println!("── MRR by status ──");
                for entry in by_status {
                    println!("{:<20} {}", entry.status.label(), money(entry.mrr));
                }
            }
            OutputFormat::Json => self.json(&serde_json::json!({
                "stats": stats,
                "leadsByStage": by_stage,
                "mrrByStatus": by_status,
            })),
            OutputFormat::Quiet => {
                println!("{}\t{}\t{}", stats.leads, stats.customers, stats.mrr);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, msg: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", msg);
        }
    }
}

/// Pretty JSON followed by a newline; empty if the value cannot be encoded
fn encode<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(text) => format!("{}\n", text),
        Err(e) => {
            eprintln!("Failed to encode output: {}", e);
            String::new()
        }
    }
}

fn id_lines<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    ids.map(|id| format!("{}\n", id)).collect()
}

fn print_optional(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:<12}{}", label, value);
    }
}

fn usage(state: &TrackerState, location: &Location) -> (usize, usize) {
    let here = |id: &Option<String>| id.as_deref() == Some(location.id.as_str());
    (
        state.leads.iter().filter(|l| here(&l.location_id)).count(),
        state
            .customers
            .iter()
            .filter(|c| here(&c.location_id))
            .count(),
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are not split
        assert_eq!(truncate("Müller Großhandel", 9), "Müller...");
    }

    #[test]
    fn test_usage_counts() {
        let state = TrackerState::seeded();
        let berlin = state.location("loc_1").unwrap();
        assert_eq!(usage(&state, berlin), (1, 1));
    }

    #[test]
    fn test_render_leads_json_lists_every_row() {
        let state = TrackerState::seeded();
        let rows: Vec<&Lead> = state.leads.iter().collect();
        let text = Output::new(OutputFormat::Json).render_leads(&state, &rows);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let listed: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        let expected: Vec<&str> = rows.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(listed, expected);
        assert!(value[0].get("createdAt").is_some());
    }

    #[test]
    fn test_render_leads_quiet_prints_ids_only() {
        let state = TrackerState::seeded();
        let rows: Vec<&Lead> = state.leads.iter().collect();
        let text = Output::new(OutputFormat::Quiet).render_leads(&state, &rows);

        let lines: Vec<&str> = text.lines().collect();
        let expected: Vec<&str> = rows.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(lines, expected);
        assert_eq!(Output::new(OutputFormat::Quiet).render_leads(&state, &[]), "");
    }

    #[test]
    fn test_render_leads_human() {
        let state = TrackerState::seeded();
        let rows: Vec<&Lead> = state.leads.iter().collect();
        let text = Output::new(OutputFormat::Human).render_leads(&state, &rows);
        assert!(text.ends_with(&format!("\n{} lead(s)\n", rows.len())));
        assert_eq!(
            Output::new(OutputFormat::Human).render_leads(&state, &[]),
            "No leads found.\n"
        );
    }

    #[test]
    fn test_render_customers_json_and_quiet() {
        let state = TrackerState::seeded();
        let rows: Vec<&Customer> = state.customers.iter().collect();
        let expected: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();

        let json = Output::new(OutputFormat::Json).render_customers(&state, &rows);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let listed: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(listed, expected);
        assert_eq!(value[0]["status"], rows[0].status.label());

        let quiet = Output::new(OutputFormat::Quiet).render_customers(&state, &rows);
        assert_eq!(quiet.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_render_empty_json_list() {
        let state = TrackerState::default();
        let text = Output::new(OutputFormat::Json).render_customers(&state, &[]);
        assert_eq!(text.trim(), "[]");
    }
}
