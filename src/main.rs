use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use coin_portal_lib::settings::Config;
use coin_portal_lib::{start_service, Action};

/// Read and send coins through the coin portal contract.
#[derive(FromArgs)]
struct Args {
    /// path to a YAML configuration file
    #[argh(option)]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListCmd),
    Connect(ConnectCmd),
    Send(SendCmd),
}

/// List recorded coins for an already authorized account.
#[derive(FromArgs)]
#[argh(subcommand, name = "list")]
struct ListCmd {}

/// Authorize an account, then list recorded coins.
#[derive(FromArgs)]
#[argh(subcommand, name = "connect")]
struct ConnectCmd {}

/// Send a coin and wait for it to be mined.
#[derive(FromArgs)]
#[argh(subcommand, name = "send")]
struct SendCmd {
    /// message to attach instead of the configured default
    #[argh(option)]
    message: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(args.config.as_deref())?;
    let action = match args.command {
        Command::List(_) => Action::List,
        Command::Connect(_) => Action::Connect,
        Command::Send(cmd) => Action::Send {
            message: cmd.message,
        },
    };

    let state = start_service(config, action).await?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}
