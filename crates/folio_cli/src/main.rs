//! Folio operator CLI.
//!
//! # Responsibility
//! - Verify `folio_core` linkage and database bootstrap from a shell.
//! - Run a handful of read-mostly operations against the configured database.
//!
//! Configuration comes from `FOLIO_*` variables, optionally loaded from a
//! `.env` file in the working directory.

use folio_core::{
    document_locks, init_logging, open_connection, CoreConfig, CoreError, FolioApi,
};
use log::{error, info};
use serde::Serialize;
use std::env;
use std::process::ExitCode;

const USAGE: &str = "usage: folio <ping|version|register EMAIL HANDLE|stats EMAIL|search EMAIL QUERY>";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = env::args().skip(1).collect::<Vec<_>>();

    match args.first().map(String::as_str) {
        Some("ping") => {
            println!("folio_core ping={}", folio_core::ping());
            return ExitCode::SUCCESS;
        }
        Some("version") | None => {
            println!("folio_core version={}", folio_core::core_version());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&config.logging()) {
        eprintln!("logging error: {err}");
        return ExitCode::from(2);
    }

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(CliError::Core(err)) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
        Err(CliError::Output(err)) => {
            eprintln!("output error: {err}");
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    Usage,
    Core(CoreError),
    Output(serde_json::Error),
}

impl From<CoreError> for CliError {
    fn from(value: CoreError) -> Self {
        Self::Core(value)
    }
}

fn run(config: &CoreConfig, args: &[String]) -> Result<(), CliError> {
    let conn = open_connection(config).map_err(CoreError::from)?;
    let api = FolioApi::new(&conn, document_locks(config), config.clone());
    info!(
        "event=cli_command module=cli status=start command={}",
        args[0]
    );

    match (args[0].as_str(), &args[1..]) {
        ("register", [email, handle]) => print_json(&api.register_user(email, handle)?),
        ("stats", [email]) => {
            let identity = api.identity_for_email(email)?;
            print_json(&api.get_analytics(&identity)?)
        }
        ("search", [email, query]) => {
            let identity = api.identity_for_email(email)?;
            print_json(&api.search_projects_and_documents(&identity, query)?)
        }
        _ => Err(CliError::Usage),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{text}");
    Ok(())
}
