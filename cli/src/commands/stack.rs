use crate::settings::Settings;
use crate::stack::Reconciler;
use crate::template;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StackTarget {
    /// Static site bucket and CDN
    Site,

    /// Budget alerting topic and subscription
    Budget,
}

#[derive(Args)]
pub struct StackCommand {
    /// Which stack to reconcile
    #[arg(value_enum)]
    pub target: StackTarget,
}

pub async fn run(
    cmd: StackCommand,
    settings: &Settings,
    config: &aws_config::SdkConfig,
) -> eyre::Result<()> {
    let reconciler = Reconciler::new(aws_sdk_cloudformation::Client::new(config));

    let (name, template) = match cmd.target {
        StackTarget::Site => (
            settings.site.stack_name.as_str(),
            template::site::body(settings),
        ),
        StackTarget::Budget => (
            settings.budget.stack_name.as_str(),
            template::budget::body(settings),
        ),
    };

    reconciler.reconcile(name, &template).await?;
    println!("Finished");

    Ok(())
}
