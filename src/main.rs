use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use session_client::config::{ClientConfig, ConfigError};
use session_client::form::login::{FormError, FormField, LoginForm, SubmitOutcome};
use session_client::net::api::{ApiError, HttpSessionApi};
use session_client::state::session::{SessionState, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("login rejected: {0}")]
    LoginRejected(String),
}

#[derive(Parser, Debug)]
#[command(name = "session-client", about = "Log in and manage the user session")]
struct Cli {
    #[arg(long, env = "SESSION_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate credentials and log in.
    Login {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, env = "SESSION_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
        #[arg(long, default_value_t = false)]
        remember_me: bool,
    },
    /// Load a user profile into the session.
    Fetch { user_id: String },
    /// Replace a user profile with a JSON document.
    Update {
        user_id: String,
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!(base_url = %config.base_url, "session client configured");

    let api = Arc::new(HttpSessionApi::new(&config)?);
    let store = SessionStore::new(api.clone());

    match cli.command {
        Command::Login { email, password, remember_me } => {
            let form = LoginForm::new(api, store.clone());
            form.update_field(FormField::Email, email)?;
            form.update_field(FormField::Password, password)?;
            form.update_field(FormField::RememberMe, remember_me)?;

            match form.submit().await {
                SubmitOutcome::Navigate(route) => {
                    print_json(&json!({ "navigate": route, "session": session_json(&store.snapshot()) }))?;
                }
                SubmitOutcome::Invalid | SubmitOutcome::Failed => {
                    let errors = form.errors();
                    let message = [errors.email, errors.password, errors.general]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(CliError::LoginRejected(message));
                }
                outcome @ (SubmitOutcome::Busy | SubmitOutcome::Cancelled) => {
                    return Err(CliError::LoginRejected(format!("{outcome:?}")));
                }
            }
        }
        Command::Fetch { user_id } => {
            let result = store.fetch_user(&user_id).await;
            print_json(&session_json(&store.snapshot()))?;
            result?;
        }
        Command::Update { user_id, data } => {
            let data: Value = serde_json::from_str(&data)?;
            let result = store.update_user(&user_id, &data).await;
            print_json(&session_json(&store.snapshot()))?;
            result?;
        }
    }
    Ok(())
}

fn session_json(state: &SessionState) -> Value {
    json!({
        "profile": state.profile,
        "loading": state.loading,
        "error": state.error,
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
