//! VooZaa Tracker CLI
//!
//! Command-line interface for VooZaa Tracker - leads, customers and locations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use voozaa_core::{Config, CustomerStatus, ProfilePatch, SettingsPatch, SortDirection, Store, Tab};

mod commands;
mod logging;
mod output;
mod prompt;

use commands::customer::CustomerFields;
use commands::lead::LeadFields;
use commands::transfer::ExportTarget;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "voozaa")]
#[command(about = "VooZaa Tracker - leads, customers and locations")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage leads
    Lead {
        #[command(subcommand)]
        command: LeadCommands,
    },
    /// Manage customers
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },
    /// Manage locations
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
    /// Show totals, pipeline and breakdowns
    Stats,
    /// Export a JSON backup or a CSV file
    Export {
        #[arg(value_enum)]
        target: ExportTarget,
        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },
    /// Import a JSON backup ("-" reads stdin)
    Import { file: PathBuf },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Change organisation and user names
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Show or switch the active tab
    Tab { name: Option<Tab> },
    /// Change view state
    Ui {
        #[command(subcommand)]
        command: UiCommands,
    },
    /// Replace all data with the built-in defaults
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum LeadCommands {
    /// Create a new lead
    #[command(alias = "create")]
    Add {
        name: String,
        /// Use this ID instead of generating one
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: LeadFields,
    },
    /// Edit a lead
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: LeadFields,
    },
    /// List leads
    #[command(alias = "ls")]
    List {
        /// Search name, company, email, phone, source and notes
        search: Option<String>,
        #[arg(short, long)]
        stage: Option<String>,
        /// Location ID or name ("none" for leads without one)
        #[arg(short, long)]
        location: Option<String>,
        /// name, company, stage, location, value, created or updated
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        dir: Option<SortDirection>,
    },
    /// Show lead details
    Show { id: String },
    /// Delete a lead
    #[command(alias = "rm")]
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CustomerCommands {
    /// Create a new customer
    #[command(alias = "create")]
    Add {
        name: String,
        /// Use this ID instead of generating one
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Edit a customer
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// List customers
    #[command(alias = "ls")]
    List {
        /// Search name, contact, email, phone, tags and notes
        search: Option<String>,
        #[arg(short, long)]
        status: Option<CustomerStatus>,
        /// Location ID or name ("none" for customers without one)
        #[arg(short, long)]
        location: Option<String>,
        /// name, contact, status, location, mrr or start
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        dir: Option<SortDirection>,
    },
    /// Show customer details
    Show { id: String },
    /// Delete a customer
    #[command(alias = "rm")]
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LocationCommands {
    /// Create a new location
    #[command(alias = "create")]
    Add {
        name: String,
        #[arg(short, long)]
        region: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Edit a location
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        region: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List locations
    #[command(alias = "ls")]
    List,
    /// Delete a location (leads and customers there keep existing)
    #[command(alias = "rm")]
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show profile, settings and view state
    Show,
    /// Change settings
    Set {
        /// ISO currency code, e.g. EUR
        #[arg(long)]
        currency: Option<String>,
        /// Date pattern using DD, MM and YYYY
        #[arg(long)]
        date_format: Option<String>,
        /// Ask before deleting records
        #[arg(long)]
        confirm_deletes: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Change organisation or user name
    Set {
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum UiCommands {
    /// Open or close the sidebar
    ToggleSidebar,
    /// Switch compact mode on or off
    ToggleCompact,
    /// Show or hide the help panel
    ShowHelp {
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage_key, seed_sample_data, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file alone
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config_file.as_ref(), &output);
    }

    let config = Config::load_with_override(cli.config_file.as_deref())
        .context("Failed to load configuration")?;
    logging::init(&config);

    let mut store = Store::open_with_config(config)?;

    match cli.command {
        Commands::Lead { command } => handle_lead_command(command, &mut store, &output),
        Commands::Customer { command } => handle_customer_command(command, &mut store, &output),
        Commands::Location { command } => handle_location_command(command, &mut store, &output),
        Commands::Stats => commands::stats::show(&store, &output),
        Commands::Export {
            target,
            out,
            stdout,
        } => commands::transfer::export(&store, target, out, stdout, &output),
        Commands::Import { file } => commands::transfer::import(&mut store, file, &output),
        Commands::Settings { command } => match command {
            Some(SettingsCommands::Show) | None => commands::settings::show(&store, &output),
            Some(SettingsCommands::Set {
                currency,
                date_format,
                confirm_deletes,
            }) => {
                let patch = SettingsPatch {
                    currency,
                    date_format,
                    allow_delete_confirm: confirm_deletes,
                };
                commands::settings::set(&mut store, patch, &output)
            }
        },
        Commands::Profile {
            command: ProfileCommands::Set { org, user },
        } => {
            let patch = ProfilePatch {
                org_name: org,
                user_name: user,
            };
            commands::settings::set_profile(&mut store, patch, &output)
        }
        Commands::Tab { name } => commands::settings::tab(&mut store, name, &output),
        Commands::Ui { command } => match command {
            UiCommands::ToggleSidebar => commands::settings::toggle_sidebar(&mut store, &output),
            UiCommands::ToggleCompact => commands::settings::toggle_compact(&mut store, &output),
            UiCommands::ShowHelp { state } => commands::settings::set_help(&mut store, state, &output),
        },
        Commands::Reset { yes } => commands::settings::reset(&mut store, yes, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_lead_command(command: LeadCommands, store: &mut Store, output: &Output) -> Result<()> {
    match command {
        LeadCommands::Add { name, id, fields } => {
            commands::lead::add(store, name, id, fields, output)
        }
        LeadCommands::Edit { id, name, fields } => {
            commands::lead::edit(store, id, name, fields, output)
        }
        LeadCommands::List {
            search,
            stage,
            location,
            sort,
            dir,
        } => commands::lead::list(store, search, stage, location, sort, dir, output),
        LeadCommands::Show { id } => commands::lead::show(store, id, output),
        LeadCommands::Delete { id, yes } => commands::lead::delete(store, id, yes, output),
    }
}

fn handle_customer_command(
    command: CustomerCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        CustomerCommands::Add { name, id, fields } => {
            commands::customer::add(store, name, id, fields, output)
        }
        CustomerCommands::Edit { id, name, fields } => {
            commands::customer::edit(store, id, name, fields, output)
        }
        CustomerCommands::List {
            search,
            status,
            location,
            sort,
            dir,
        } => commands::customer::list(store, search, status, location, sort, dir, output),
        CustomerCommands::Show { id } => commands::customer::show(store, id, output),
        CustomerCommands::Delete { id, yes } => {
            commands::customer::delete(store, id, yes, output)
        }
    }
}

fn handle_location_command(
    command: LocationCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    match command {
        LocationCommands::Add {
            name,
            region,
            address,
        } => commands::location::add(store, name, region, address, output),
        LocationCommands::Edit {
            id,
            name,
            region,
            address,
        } => commands::location::edit(store, id, name, region, address, output),
        LocationCommands::List => commands::location::list(store, output),
        LocationCommands::Delete { id, yes } => {
            commands::location::delete(store, id, yes, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Expected on or off, got '{}'", other)),
    }
}
