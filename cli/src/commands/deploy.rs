use crate::deployer::Deployer;
use crate::settings::Settings;
use clap::Args;

#[derive(Args)]
pub struct DeployCommand {
    /// Functions to deploy, all configured functions when empty
    pub names: Vec<String>,
}

pub async fn run(
    cmd: DeployCommand,
    settings: &Settings,
    config: &aws_config::SdkConfig,
) -> eyre::Result<()> {
    let deployer = Deployer::new(aws_sdk_lambda::Client::new(config), settings);

    let names = if cmd.names.is_empty() {
        settings.functions.names.clone()
    } else {
        cmd.names
    };

    deployer.deploy_all(&names).await?;
    println!("Finished");

    Ok(())
}
