//! Command line front end for the allocation engine.
//!
//! Reads `mats.toml` / `MATS_*` for the database url, runs one operation and
//! prints its result as JSON on stdout.

mod error;

use std::process::ExitCode;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use error::CliError;
use mat_allocation_config::get_config;
use mat_allocation_database::models::{FacilityId, GuestId, RegistrationId, TemplateId};
use mat_allocation_database::{get_database_connection, migrate, PgStore};
use mat_allocation_engine::{AllocationEngine, GuestAssignment};
use mat_allocation_telemetry::setup_telemetry;
use serde::Serialize;
use tracing::{error, info};

/// Assign shelter guests to sleeping mats
#[derive(Parser, Debug)]
#[command(name = "mats", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the tables and indexes
    Migrate,

    /// Insert a sample facility with guests and a template
    Seed {
        /// Name of the new facility
        #[arg(default_value = "Demo Facility")]
        facility_name: String,
    },

    /// Create the unassigned registrations of a day from a template
    Generate {
        #[arg(long)]
        template: TemplateId,
        /// Registration date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },

    /// Bind a guest to an unassigned registration
    Assign(AssignArgs),

    /// Release the guest of a registration
    Deassign { registration: RegistrationId },

    /// Move a guest and its details to another registration
    Reassign {
        from: RegistrationId,
        to: RegistrationId,
    },

    /// Show the guests of a facility
    Guests {
        #[arg(long)]
        facility: FacilityId,
    },

    /// Show the registrations of a facility on a date with their guests
    List {
        #[arg(long)]
        facility: FacilityId,
        /// Registration date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Args, Debug)]
struct AssignArgs {
    registration: RegistrationId,

    #[arg(long)]
    guest: GuestId,

    #[arg(long)]
    comments: Option<String>,

    #[arg(long)]
    payment_amount: Option<BigDecimal>,

    #[arg(long)]
    payment_type: Option<String>,

    /// HH:MM
    #[arg(long, value_parser = parse_time)]
    shower_time: Option<NaiveTime>,

    /// HH:MM
    #[arg(long, value_parser = parse_time)]
    wakeup_time: Option<NaiveTime>,
}

impl From<AssignArgs> for GuestAssignment {
    fn from(value: AssignArgs) -> Self {
        Self {
            guest_id: value.guest,
            comments: value.comments,
            payment_amount: value.payment_amount,
            payment_type: value.payment_type,
            shower_time: value.shower_time,
            wakeup_time: value.wakeup_time,
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = get_config()?;
    setup_telemetry(config.log_filter.as_deref());

    let pool = get_database_connection(&config.database_url)?;
    let engine = AllocationEngine::new(PgStore::new(pool));

    match cli.command {
        Commands::Migrate => Ok(migrate(engine.store().pool()).await?),
        Commands::Seed { facility_name } => print_json(&engine.seed(&facility_name).await?),
        Commands::Generate { template, date } => {
            let created = engine.generate(template, date).await?;
            info!(count = created.len(), "day generated");
            print_json(&created)
        }
        Commands::Assign(args) => {
            let registration = args.registration;
            print_json(&engine.assign(registration, args.into()).await?)
        }
        Commands::Deassign { registration } => print_json(&engine.deassign(registration).await?),
        Commands::Reassign { from, to } => print_json(&engine.reassign(from, to).await?),
        Commands::Guests { facility } => print_json(&engine.guests(facility).await?),
        Commands::List { facility, date } => print_json(
            &engine
                .registrations_by_facility_and_date(facility, date)
                .await?,
        ),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}
