use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_auth::store::cookie::FileCookies;
use dashboard_auth::store::local::FileStorage;
use dashboard_auth::{AccessControl, AuthProvider, Config, DeviceSessionStore, RestDataProvider};

/// Sign in to the school dashboard backend from this device.
#[derive(Parser)]
#[command(name = "school-dashboard-auth", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange credentials for a session.
    Login { username: String, password: String },
    /// Clear the session on this device.
    Logout,
    /// Verify the stored session; clears it when it is no longer valid.
    Check,
    /// Show the signed-in identity.
    Whoami,
    /// Show the permission level.
    Permissions,
    /// Ask whether an action on a resource is allowed.
    Can { resource: String, action: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::debug!("✅ Configuration loaded, state in {}", config.state_dir.display());

    let store = DeviceSessionStore::new(
        FileCookies::new(config.cookie_jar_path()),
        FileStorage::new(config.local_storage_path()),
        config.app_env.is_production(),
    );
    let auth = Arc::new(AuthProvider::new(
        store,
        RestDataProvider::new(config.api_url.as_str()),
        &config.jwt_secret,
    ));

    let output = match cli.command {
        Command::Login { username, password } => {
            sonic_rs::to_string_pretty(&auth.login(&username, &password).await)
        }
        Command::Logout => sonic_rs::to_string_pretty(&auth.logout().await),
        Command::Check => {
            let response = auth.check().await;
            if response.logout {
                auth.logout().await;
            }
            sonic_rs::to_string_pretty(&response)
        }
        Command::Whoami => sonic_rs::to_string_pretty(&auth.get_identity().await),
        Command::Permissions => sonic_rs::to_string_pretty(&auth.get_permissions().await),
        Command::Can { resource, action } => {
            let access = AccessControl::new(auth.clone());
            sonic_rs::to_string_pretty(&access.can(&resource, &action).await)
        }
    }
    .context("Failed to render response")?;

    println!("{}", output);
    Ok(())
}
