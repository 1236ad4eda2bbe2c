mod archive;
mod aws;
mod commands;
mod deployer;
mod function;
mod logger;
mod settings;
mod stack;
mod template;

use crate::commands::Commands;
use crate::settings::Settings;
use aws_config::{BehaviorVersion, Region};
use clap::Parser;
use rust_dotenv::dotenv::DotEnv;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "cloudops.toml", global = true)]
    config: std::path::PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Expose .env variables (e.g. AWS credentials) to the SDK without
/// overriding anything already set in the shell
fn load_dotenv() {
    for (key, value) in DotEnv::new("").all_vars().to_owned() {
        if std::env::var(&key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    logger::init();
    load_dotenv();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .load()
        .await;

    match cli.command {
        Commands::Stack(cmd) => commands::stack::run(cmd, &settings, &config).await,
        Commands::Deploy(cmd) => commands::deploy::run(cmd, &settings, &config).await,
    }
}
