use std::path::PathBuf;

use bunq_core::SignedRequestClient;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};

use crate::{config::CliConfig, render::CommandResult};

pub const CONFIG_ENV: &str = "BUNQ_CONFIG";

#[derive(Parser, Clone)]
#[command(name = "bunq", version, about = "bunq API client", long_about = None)]
pub struct Cli {
    // Optional as a workaround for https://github.com/clap-rs/clap/issues/3572
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        long,
        global = true,
        env = CONFIG_ENV,
        default_value = "config.json",
        help = "Configuration file pointing at the key, installation and session files."
    )]
    pub config: PathBuf,

    #[arg(
        short = 'q',
        long,
        global = true,
        help = "Don't return anything to stdout."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    #[command(long_about = "Open a session, or reuse the stored one, and print its token.")]
    Session,

    #[command(long_about = "Forget the stored session.")]
    Logout,

    #[command(long_about = "Show the users this session has access to.")]
    User,

    #[command(long_about = "Show the bank accounts of a user.")]
    Account(AccountArgs),

    #[command(long_about = "List the payments of an account.")]
    Payments(AccountArgs),

    #[command(long_about = "Pay an amount in euro to an IBAN.")]
    Pay(PayArgs),
}

#[derive(Args, Clone)]
pub struct AccountArgs {
    #[arg(
        long,
        help = "Defaults to userId of the device-server config, then the session user."
    )]
    pub user_id: Option<u64>,

    #[arg(long, help = "Defaults to accountId of the device-server config.")]
    pub account_id: Option<u64>,
}

impl AccountArgs {
    pub async fn resolve_user_id(
        &self,
        config: &CliConfig,
        client: &SignedRequestClient,
    ) -> Result<u64> {
        if let Some(user_id) = self.user_id.or(config.device_server()?.user_id) {
            return Ok(user_id);
        }

        client.sessions().ensure_session().await?;
        client
            .sessions()
            .active_session()
            .and_then(|session| session.user_id)
            .ok_or_else(|| eyre!("No user id given and the session does not name a user"))
    }

    pub fn resolve_account_id(&self, config: &CliConfig) -> Result<u64> {
        self.account_id
            .or(config.device_server()?.account_id)
            .ok_or_else(|| eyre!("No account id given"))
    }
}

#[derive(Args, Clone)]
pub struct PayArgs {
    #[arg(help = "Amount in euro, e.g. 12.50")]
    pub amount: String,
    #[arg(help = "IBAN of the receiving account")]
    pub iban: String,
    #[arg(help = "Name of the account holder")]
    pub name: String,
    pub description: String,

    #[command(flatten)]
    pub account: AccountArgs,
}

impl PayArgs {
    pub async fn run(self, config: &CliConfig) -> CommandResult {
        let client = config.client()?;
        let user_id = self.account.resolve_user_id(config, &client).await?;
        let account_id = self.account.resolve_account_id(config)?;

        let response = client
            .send_payment(
                user_id,
                account_id,
                &self.amount,
                &self.iban,
                &self.name,
                &self.description,
            )
            .await?;
        Ok(response.into())
    }
}

pub async fn session(config: &CliConfig) -> CommandResult {
    let client = config.client()?;
    Ok(client.sessions().ensure_session().await?.into())
}

pub fn logout(config: &CliConfig) -> CommandResult {
    let store = config.session_store();
    store.clear()?;
    store.clear_history()?;
    Ok("Logged out".into())
}
