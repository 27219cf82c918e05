#![doc = include_str!("../README.md")]

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use tracing_subscriber::{
    EnvFilter, prelude::__tracing_subscriber_SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::{command::*, config::CliConfig, render::CommandResult};

mod command;
mod config;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // the log level hierarchy is determined by:
    //    - if RUST_LOG is detected at runtime
    //    - if RUST_LOG is provided at compile time
    //    - default to INFO
    let filter = EnvFilter::builder()
        .with_default_directive(
            option_env!("RUST_LOG")
                .unwrap_or("info")
                .parse()
                .expect("should provide valid log level at compile time."),
        )
        // parse directives from the RUST_LOG environment variable,
        // overriding the default directive for matching targets.
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    color_eyre::install()?;
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()?;
        return Ok(());
    };

    let result = process_commands(command, &cli.config).await;
    render::render_result(result, cli.quiet)
}

async fn process_commands(command: Commands, config_path: &std::path::Path) -> CommandResult {
    let config = CliConfig::load(config_path)?;

    match command {
        Commands::Session => command::session(&config).await,
        Commands::Logout => command::logout(&config),
        Commands::User => Ok(config.client()?.request_user().await?.into()),
        Commands::Account(ids) => {
            let client = config.client()?;
            let user_id = ids.resolve_user_id(&config, &client).await?;
            Ok(client.request_monetary_account_bank(user_id).await?.into())
        }
        Commands::Payments(ids) => {
            let client = config.client()?;
            let user_id = ids.resolve_user_id(&config, &client).await?;
            let account_id = ids.resolve_account_id(&config)?;
            Ok(client.request_payments(user_id, account_id).await?.into())
        }
        Commands::Pay(args) => args.run(&config).await,
    }
}
