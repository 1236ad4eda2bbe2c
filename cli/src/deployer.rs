use crate::archive::Package;
use crate::aws;
use crate::function::{FunctionConfig, CONFIG_FILENAME};
use crate::settings::Settings;
use aws_sdk_lambda::operation::get_function_configuration::GetFunctionConfigurationOutput;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Environment, FunctionCode, Runtime};
use eyre::{ContextCompat, WrapErr};

/// The alias invocations go through, moved to a new version on every
/// published change
pub const ALIAS: &str = "current";

/// Reconciles functions against their desired configuration and code
///
/// Remote state is queried fresh on every run, nothing is kept between
/// runs.
pub struct Deployer<'a> {
    client: aws_sdk_lambda::Client,
    settings: &'a Settings,
}

impl<'a> Deployer<'a> {
    pub fn new(client: aws_sdk_lambda::Client, settings: &'a Settings) -> Self {
        Deployer { client, settings }
    }

    /// Deploy every function in order, stopping at the first failure
    pub async fn deploy_all(&self, names: &[String]) -> eyre::Result<()> {
        for name in names {
            let version = self
                .deploy(name)
                .await
                .wrap_err_with(|| format!("Fail to deploy {name}"))?;

            println!("Deployed {name} as version {version}");
        }

        Ok(())
    }

    /// Deploy a single function, returns the version the alias points at
    pub async fn deploy(&self, name: &str) -> eyre::Result<String> {
        let full_name = self.settings.function_name(name);

        let config = FunctionConfig::load(
            &self.settings.functions.root.join(CONFIG_FILENAME),
            &self.settings.functions.root.join(name),
        )?;

        println!("> Creating {full_name} archive");
        let package = Package::from_dir(&self.settings.functions.dist.join(name)).await?;
        log::debug!("Packaged {name} with digest {}", package.digest);

        println!("> Loading {full_name} configuration");
        let live = match self
            .client
            .get_function_configuration()
            .function_name(&full_name)
            .qualifier(ALIAS)
            .send()
            .await
        {
            Ok(live) => live,

            Err(err) => {
                let err = aws::classify(err);

                if !err.is_not_found() {
                    return Err(err).wrap_err_with(|| format!("Failed to query {full_name}"));
                }

                return self.create(&full_name, &config, package).await;
            }
        };

        self.update(&full_name, &config, package, live).await
    }

    /// Push configuration and code changes to an existing function,
    /// publishing a new version only if something actually changed
    async fn update(
        &self,
        full_name: &str,
        config: &FunctionConfig,
        package: Package,
        live: GetFunctionConfigurationOutput,
    ) -> eyre::Result<String> {
        let mut should_publish = false;

        if config.drifted(&live) {
            println!("> Updating {full_name} configuration");

            self.client
                .update_function_configuration()
                .function_name(full_name)
                .handler(config.handler.as_str())
                .memory_size(config.memory)
                .runtime(Runtime::from(config.runtime.as_str()))
                .timeout(config.timeout)
                .role(config.role.as_str())
                .environment(
                    Environment::builder()
                        .set_variables(Some(config.environment.clone()))
                        .build(),
                )
                .send()
                .await
                .map_err(aws::classify)
                .wrap_err("Failed to update the configuration")?;

            aws::wait_updated(&self.client, full_name).await?;
            should_publish = true;
        }

        if live.code_sha256() != Some(package.digest.as_str()) {
            println!("> Updating function code");

            self.client
                .update_function_code()
                .function_name(full_name)
                .zip_file(Blob::new(package.bytes.clone()))
                .send()
                .await
                .map_err(aws::classify)
                .wrap_err("Failed to update the code")?;

            aws::wait_updated(&self.client, full_name).await?;
            should_publish = true;
        }

        if !should_publish {
            return live
                .version()
                .map(str::to_owned)
                .wrap_err("The live function reports no version");
        }

        let version = self.publish(full_name, &package.digest).await?;

        println!("> Move {ALIAS} alias to version {version}");
        self.client
            .update_alias()
            .function_name(full_name)
            .name(ALIAS)
            .function_version(version.as_str())
            .send()
            .await
            .map_err(aws::classify)
            .wrap_err("Failed to move the alias")?;

        aws::wait_updated(&self.client, full_name).await?;

        Ok(version)
    }

    /// Create the function from scratch with its first version and alias
    async fn create(
        &self,
        full_name: &str,
        config: &FunctionConfig,
        package: Package,
    ) -> eyre::Result<String> {
        println!("> Create new function {full_name}");

        self.client
            .create_function()
            .function_name(full_name)
            .description(config.description.as_str())
            .handler(config.handler.as_str())
            .memory_size(config.memory)
            .runtime(Runtime::from(config.runtime.as_str()))
            .timeout(config.timeout)
            .role(config.role.as_str())
            .environment(
                Environment::builder()
                    .set_variables(Some(config.environment.clone()))
                    .build(),
            )
            .code(
                FunctionCode::builder()
                    .zip_file(Blob::new(package.bytes.clone()))
                    .build(),
            )
            .send()
            .await
            .map_err(aws::classify)
            .wrap_err("Failed to create the function")?;

        aws::wait_active(&self.client, full_name).await?;

        let version = self.publish(full_name, &package.digest).await?;

        println!("> Create {ALIAS} alias for version {version}");
        self.client
            .create_alias()
            .function_name(full_name)
            .name(ALIAS)
            .function_version(version.as_str())
            .send()
            .await
            .map_err(aws::classify)
            .wrap_err("Failed to create the alias")?;

        aws::wait_updated(&self.client, full_name).await?;

        Ok(version)
    }

    /// Publish an immutable version, pinned to the digest so a
    /// concurrent code change fails the publish instead of shipping
    async fn publish(&self, full_name: &str, digest: &str) -> eyre::Result<String> {
        println!("> Publishing new version");

        let published = self
            .client
            .publish_version()
            .function_name(full_name)
            .code_sha256(digest)
            .send()
            .await
            .map_err(aws::classify)
            .wrap_err("Failed to publish a version")?;

        aws::wait_updated(&self.client, full_name).await?;

        published
            .version()
            .map(str::to_owned)
            .wrap_err("The published version has no version number")
    }
}
