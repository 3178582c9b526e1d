//! Banking panel command-line entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankpanel_core::config::BankPanelConfig;
use bankpanel_core::traits::DataStore;
use bankpanel_core::types::StaffFilter;
use bankpanel_core::BalanceSummary;
use bankpanel_platform::{NewStaff, StaffProvisioner};

#[derive(Parser)]
#[command(name = "bankpanel")]
#[command(about = "Banking panel back office")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "BANKPANEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create an admin account (no HTTP route can do this)
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },

    /// Create a staff account
    CreateStaff {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },

    /// Print balance totals, optionally for one staff profile
    Summary {
        #[arg(long)]
        staff_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(BankPanelConfig::default_path);
    let mut config = BankPanelConfig::load_or_default(&path)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            bankpanel_gateway::start(&config).await?;
        }
        Commands::CreateAdmin { email, password, name } => {
            let provisioner = provisioner(&config)?;
            let done = provisioner.provision_admin(NewStaff::new(email, password, name)).await?;
            print_json(&serde_json::json!({ "userId": done.user_id, "message": done.message }))?;
        }
        Commands::CreateStaff { email, password, name } => {
            let provisioner = provisioner(&config)?;
            let done = provisioner.provision(NewStaff::new(email, password, name)).await?;
            print_json(&serde_json::json!({ "userId": done.user_id, "message": done.message }))?;
        }
        Commands::Summary { staff_id } => {
            let backend = bankpanel_backend::create_backend(&config)?;
            let filter = StaffFilter::from_param(staff_id.as_deref());
            let details = backend.store.list_bank_details(&filter, false).await?;
            print_json(&BalanceSummary::from_details(&details))?;
        }
    }

    Ok(())
}

fn provisioner(config: &BankPanelConfig) -> Result<StaffProvisioner> {
    let backend = bankpanel_backend::create_backend(config)?;
    Ok(StaffProvisioner::with_config(backend.identity, backend.store, &config.provisioning))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
