//! CLI module for Conduit Accounts
//!
//! Provides subcommands that drive the account service against PostgreSQL:
//! - `migrate`: apply or revert the accounts schema
//! - `register` / `login` / `whoami` / `update`: credentials and tokens
//! - `profile` / `follow` / `unfollow`: profiles and follows
//! - `favorite` / `unfavorite`: article favorites

mod output;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{Account, ArticleId, DomainError};
use crate::infrastructure::account::{RegisterRequest, UpdateAccountRequest};
use crate::infrastructure::{logging, storage};
use crate::PostgresAccountService;

pub use output::{ErrorsEnvelope, FavoritesEnvelope, ProfileEnvelope, UserEnvelope};

/// Conduit Accounts - account records for a blogging backend
#[derive(Parser)]
#[command(name = "conduit-accounts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending schema migrations (or revert the latest one)
    Migrate(MigrateArgs),

    #[command(flatten)]
    Account(AccountCommand),
}

/// Commands that run against the account service
#[derive(Subcommand)]
pub enum AccountCommand {
    /// Register a new account and print its auth payload
    Register(RegisterArgs),

    /// Log in with email and password and print the auth payload
    Login(LoginArgs),

    /// Print the auth payload of the account a token belongs to
    Whoami(TokenArgs),

    /// Edit the profile of the token's account
    Update(UpdateArgs),

    /// Show a profile, optionally as seen by the token's account
    Profile(ProfileArgs),

    /// Follow a profile
    Follow(FollowArgs),

    /// Stop following a profile
    Unfollow(FollowArgs),

    /// Add an article to favorites
    Favorite(FavoriteArgs),

    /// Remove an article from favorites
    Unfavorite(FavoriteArgs),
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Authentication token
    #[arg(long, env = "CONDUIT_TOKEN")]
    pub token: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub auth: TokenArgs,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// New bio; pass an empty string to clear it
    #[arg(long)]
    pub bio: Option<String>,
    /// New image URL; pass an empty string to clear it
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    pub username: String,
    /// View the profile as this token's account
    #[arg(long, env = "CONDUIT_TOKEN")]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct FollowArgs {
    pub username: String,
    #[command(flatten)]
    pub auth: TokenArgs,
}

#[derive(Args)]
pub struct FavoriteArgs {
    pub article: ArticleId,
    #[command(flatten)]
    pub auth: TokenArgs,
}

/// Load configuration, install logging and run one command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let result = match cli.command {
        Command::Migrate(args) => migrate(&config, args).await,
        Command::Account(command) => {
            let service = crate::create_account_service(&config).await?;
            execute(&service, command).await
        }
    };

    if let Err(error) = &result {
        if let Some(errors) = error
            .downcast_ref::<DomainError>()
            .and_then(DomainError::field_errors)
        {
            output::print(&ErrorsEnvelope { errors })?;
        }
    }

    result
}

async fn migrate(config: &AppConfig, args: MigrateArgs) -> anyhow::Result<()> {
    let pool = storage::connect(&config.database).await?;

    if args.revert {
        match storage::revert_last_account_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = storage::run_account_migrations(&pool).await?;
        info!(applied, "Migrations complete");
    }

    Ok(())
}

async fn execute(service: &PostgresAccountService, command: AccountCommand) -> anyhow::Result<()> {
    match command {
        AccountCommand::Register(args) => {
            let account = service
                .register(RegisterRequest {
                    username: args.username,
                    email: args.email,
                    password: args.password,
                })
                .await?;

            print_user(service, &account)
        }

        AccountCommand::Login(args) => match service.login(&args.email, &args.password).await? {
            Some(account) => print_user(service, &account),
            None => {
                output::print(&ErrorsEnvelope::invalid_login())?;
                Err(DomainError::credential("email or password is invalid").into())
            }
        },

        AccountCommand::Whoami(args) => {
            let account = service.authenticate_token(&args.token).await?;
            print_user(service, &account)
        }

        AccountCommand::Update(args) => {
            let account = service.authenticate_token(&args.auth.token).await?;
            let account = service
                .update(
                    account.id(),
                    UpdateAccountRequest {
                        username: args.username,
                        email: args.email,
                        bio: args.bio,
                        image: args.image,
                        password: args.password,
                    },
                )
                .await?;

            print_user(service, &account)
        }

        AccountCommand::Profile(args) => {
            let viewer = match &args.token {
                Some(token) => Some(service.authenticate_token(token).await?),
                None => None,
            };

            let profile = service
                .profile(&args.username, viewer.as_ref().map(Account::id))
                .await?;
            output::print(&ProfileEnvelope { profile })
        }

        AccountCommand::Follow(args) => {
            let viewer = service.authenticate_token(&args.auth.token).await?;
            let profile = service.follow(viewer.id(), &args.username).await?;
            output::print(&ProfileEnvelope { profile })
        }

        AccountCommand::Unfollow(args) => {
            let viewer = service.authenticate_token(&args.auth.token).await?;
            let profile = service.unfollow(viewer.id(), &args.username).await?;
            output::print(&ProfileEnvelope { profile })
        }

        AccountCommand::Favorite(args) => {
            let account = service.authenticate_token(&args.auth.token).await?;
            let account = service.favorite(account.id(), args.article).await?;
            output::print(&FavoritesEnvelope::new(&account, &args.article))
        }

        AccountCommand::Unfavorite(args) => {
            let account = service.authenticate_token(&args.auth.token).await?;
            let account = service.unfavorite(account.id(), &args.article).await?;
            output::print(&FavoritesEnvelope::new(&account, &args.article))
        }
    }
}

fn print_user(service: &PostgresAccountService, account: &Account) -> anyhow::Result<()> {
    let user = service.auth_payload(account)?;
    output::print(&UserEnvelope { user })
}
