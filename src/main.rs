use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use artefolio_session::client::{ApiError, SessionClient, TracingNavigator};
use artefolio_session::config::{load_config, print_schema};
use artefolio_session::models::{SignInData, User};
use artefolio_session::session::SessionStore;
use artefolio_session::utils::{init_logging, LoggingError};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error loading configuration: {0}")]
    Config(#[from] figment::Error),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "artefolio", about = "artefolio session client")]
struct Cli {
    #[arg(long, env = "ARTEFOLIO_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current session and print the signed-in user, if any.
    Whoami,
    /// Sign in with email and password and print the user.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ARTEFOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session.
    SignOut,
    /// Print the JSON schema of the configuration file.
    Schema,
}

fn print_user(user: Option<&User>) -> Result<(), CliError> {
    match user {
        Some(user) => println!("{}", serde_json::to_string_pretty(user)?),
        None => println!("not signed in"),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Schema = cli.command {
        print_schema()?;
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    init_logging(&config.logging)?;

    let client = SessionClient::builder(config.api)
        .navigator(Arc::new(TracingNavigator))
        .build()?;
    let store = SessionStore::new(Arc::new(client));

    match cli.command {
        Command::Whoami => {
            let session = store.initialize().await;
            print_user(session.user.as_ref())
        }
        Command::SignIn { email, password } => {
            let user = store.sign_in(&SignInData { email, password }).await?;
            info!("Signed in as '{}'", user.username);
            print_user(Some(&user))
        }
        Command::SignOut => {
            store.initialize().await;
            store.sign_out().await;
            print_user(store.user().as_ref())
        }
        Command::Schema => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
