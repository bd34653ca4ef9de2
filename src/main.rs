use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use pokec::{ClientConfig, HttpTimeouts, PokecClient, PokecError, ReqwestTransport, TransportError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Pokec(#[from] PokecError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pokec", about = "Pokec chat client")]
struct Cli {
    /// Log every call and failure.
    #[arg(long, env = "POKEC_VERBOSE", default_value_t = false)]
    verbose: bool,

    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long, env = "POKEC_USERNAME")]
    username: String,

    #[arg(long, env = "POKEC_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rooms that currently have chatters.
    Rooms,
    /// Log in and print the session token and cookies.
    Login(Credentials),
    /// Log in and send one message.
    Send {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        room: i64,

        #[arg(long, default_value = pokec::DEFAULT_RECIPIENT)]
        to: String,

        message: String,
    },
    /// Log in and print the status payload.
    Ping(Credentials),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let transport =
        ReqwestTransport::with_timeouts(HttpTimeouts::from_secs(cli.request_timeout_secs, cli.connect_timeout_secs))?;
    let mut client = PokecClient::with_transport(ClientConfig::default().verbose(cli.verbose), Arc::new(transport));

    match cli.command {
        Command::Rooms => print_json(&client.list_rooms().await?),
        Command::Login(credentials) => {
            let session = client.login(&credentials.username, &credentials.password).await?;
            print_json(&session)
        }
        Command::Send { credentials, room, to, message } => {
            client.login(&credentials.username, &credentials.password).await?;
            client.send_message_to(&message, room, &to).await?;
            tracing::info!(room, %to, "message sent");
            Ok(())
        }
        Command::Ping(credentials) => {
            client.login(&credentials.username, &credentials.password).await?;
            print_json(&client.ping().await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
