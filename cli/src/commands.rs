pub mod deploy;
pub mod stack;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update one of the CloudFormation stacks
    Stack(stack::StackCommand),

    /// Package and publish Lambda functions
    Deploy(deploy::DeployCommand),
}
