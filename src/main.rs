use clap::{Parser, Subcommand};
use ghes_azure_deploy::azure::ArmProvider;
use ghes_azure_deploy::config::DeployConfig;
use ghes_azure_deploy::report::{print_outputs, print_preview};
use ghes_azure_deploy::{declare, destroy, up};
use std::error::Error;
use std::sync::Arc;

/// Provision a GitHub Enterprise Server host on Azure.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// log4rs configuration file
    #[arg(long, default_value = "log4rs.yml")]
    log_config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the desired state without calling Azure
    Preview,
    /// Create or update every resource and print the outputs
    Up {
        /// Print outputs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the resource group and everything in it
    Destroy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    let cli = Cli::parse();
    if let Err(e) = log4rs::init_file(&cli.log_config, Default::default()) {
        eprintln!("Logging disabled, cannot load {}: {e}", cli.log_config);
    }
    dotenv::dotenv().ok();
    log::info!("#Start main() {:?}", cli.command);

    let deploy_config = DeployConfig::from_env()?;

    match cli.command.unwrap_or(Command::Up { json: false }) {
        Command::Preview => {
            let deployment = declare(&deploy_config)?;
            print_preview(&deployment)?;
        }
        Command::Up { json } => {
            let deployment = declare(&deploy_config)?;
            let provider = ArmProvider::from_config(&deploy_config)?;
            let outputs = up(Arc::new(provider), deployment).await?;
            print_outputs(&outputs, json)?;
        }
        Command::Destroy => {
            let provider = ArmProvider::from_config(&deploy_config)?;
            destroy(&provider, &deploy_config.resource_group_name()).await?;
        }
    }

    log::info!("#End main()");
    Ok(())
}
