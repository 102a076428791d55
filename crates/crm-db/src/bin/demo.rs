//! # CRM Demo Driver
//!
//! Seeds, mutates and cleans the CRM tables, printing the database state
//! after each phase.
//!
//! ## Usage
//! ```bash
//! # Statement backend against ./crm.db
//! cargo run -p crm-db --bin demo
//!
//! # Repository backend, JSON reports, more logging
//! CRM_BACKEND=repository CRM_REPORT_FORMAT=json RUST_LOG=debug \
//!     cargo run -p crm-db --bin demo
//! ```
//!
//! See `crm_db::config` for every recognised variable.

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crm_core::DatabaseState;
use crm_db::config::{AppConfig, ReportFormat};
use crm_db::{report, script, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load()?;
    info!(
        database = %config.database_path,
        backend = %config.backend,
        report_format = %config.report_format,
        server = %config.connection.redacted_url(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let dal = db.data_access(config.backend);

    let outcome = script::run(dal.as_ref()).await;

    // The pool is released whether or not the script succeeded
    db.close().await;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Demo script failed");
            return Err(e.into());
        }
    };

    for (phase, state) in [
        ("Seeded", &report.seeded),
        ("Updated", &report.mutated),
        ("Cleaned up", &report.cleaned),
    ] {
        print_state(phase, state, config.report_format)?;
    }

    info!("Demo complete");
    Ok(())
}

fn print_state(
    phase: &str,
    state: &DatabaseState,
    format: ReportFormat,
) -> Result<(), serde_json::Error> {
    println!("===== {} =====", phase);
    match format {
        ReportFormat::Table => println!("{}\n", report::render_state(state)),
        ReportFormat::Json => println!("{}\n", serde_json::to_string_pretty(state)?),
    }
    Ok(())
}
