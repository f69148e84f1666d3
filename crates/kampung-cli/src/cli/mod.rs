//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kampung_core::api::SESSION_EXPIRED_MESSAGE;
use kampung_core::views::ProfileTab;
use kampung_core::{ApiClient, AuthSession, Config, FileSessionStore, SessionStore};
use kampung_types::Id;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "kampung")]
#[command(version)]
#[command(about = "Terminal client for the KampunG social network")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (prefer the environment variable)
        #[arg(short, long, env = "KAMPUNG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (log in separately afterwards)
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "KAMPUNG_PASSWORD", hide_env_values = true)]
        password: String,
        /// Password confirmation; must match --password
        #[arg(long = "confirm", value_name = "PASSWORD")]
        confirm_password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show the timeline
    Feed {
        /// Only posts from users you follow
        #[arg(long)]
        following: bool,
    },
    /// Create, show, delete or like a post
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },
    /// List a user's posts
    Posts {
        #[arg(value_name = "USER_ID")]
        user_id: Id,
    },
    /// Show a profile (your own by default)
    Profile {
        #[arg(value_name = "USER_ID")]
        user_id: Option<Id>,
        #[arg(long, value_enum, default_value_t = TabArg::Posts)]
        tab: TabArg,
    },
    /// Follow or unfollow a user
    Follow {
        #[arg(value_name = "USER_ID")]
        user_id: Id,
    },
    /// Search users by name
    Search {
        query: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PostCommands {
    /// Publish a new post
    Create {
        content: String,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Show a single post
    Show {
        #[arg(value_name = "POST_ID")]
        id: Id,
    },
    /// Delete one of your posts
    Delete {
        #[arg(value_name = "POST_ID")]
        id: Id,
    },
    /// Like or unlike a post
    Like {
        #[arg(value_name = "POST_ID")]
        id: Id,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TabArg {
    Posts,
    Followers,
    Following,
}

impl From<TabArg> for ProfileTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Posts => ProfileTab::Posts,
            TabArg::Followers => ProfileTab::Followers,
            TabArg::Following => ProfileTab::Following,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the config itself is broken.
    if let Commands::Config { command } = cli.command {
        return run_config(command);
    }

    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(config.log_file().as_deref())?;

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open_default());
    let api = ApiClient::from_config(&config, store).context("build API client")?;
    tracing::debug!(base_url = api.base_url(), "using API");
    let session = AuthSession::restore(api);

    // Login and register report their own failure instead of the expiry.
    let at_login = matches!(cli.command, Commands::Login { .. } | Commands::Register { .. });
    let result = execute(cli.command, &session, &config).await;
    if session.take_expired() && !at_login {
        anyhow::bail!(SESSION_EXPIRED_MESSAGE);
    }
    result
}

fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
    }
}

async fn execute(command: Commands, session: &AuthSession, config: &Config) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            commands::auth::login(session, &username, &password).await
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            commands::auth::register(session, username, email, password, confirm_password).await
        }
        Commands::Logout => {
            commands::auth::logout(session);
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::whoami(session);
            Ok(())
        }
        Commands::Feed { following } => commands::posts::feed(session, following).await,
        Commands::Post { command } => match command {
            PostCommands::Create { content, title } => {
                commands::posts::create(session, content, title).await
            }
            PostCommands::Show { id } => commands::posts::show(session, &id).await,
            PostCommands::Delete { id } => commands::posts::delete(session, &id).await,
            PostCommands::Like { id } => commands::posts::like(session, &id).await,
        },
        Commands::Posts { user_id } => commands::posts::by_user(session, &user_id).await,
        Commands::Profile { user_id, tab } => {
            commands::users::profile(session, user_id, tab.into()).await
        }
        Commands::Follow { user_id } => commands::users::follow(session, &user_id).await,
        Commands::Search { query } => commands::users::search(session, config, query).await,
        Commands::Config { command } => run_config(command),
    }
}
