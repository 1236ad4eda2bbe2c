use aws_sdk_lambda::operation::get_function_configuration::GetFunctionConfigurationOutput;
use eyre::WrapErr;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of both the repo-wide defaults file and the per-function override
pub const CONFIG_FILENAME: &str = "project.json";

/// Desired configuration of a single function
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionConfig {
    pub description: String,
    pub memory: i32,
    pub timeout: i32,
    pub handler: String,
    pub runtime: String,
    pub role: String,

    #[serde(default)]
    pub environment: HashMap<String, String>,
}

/// Per-function override, any subset of the default fields
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    description: Option<String>,
    memory: Option<i32>,
    timeout: Option<i32>,
    handler: Option<String>,
    runtime: Option<String>,
    role: Option<String>,
    environment: Option<HashMap<String, String>>,
}

impl FunctionConfig {
    /// Repo-wide defaults merged with the function's own project.json,
    /// when it has one
    pub fn load(defaults: &Path, function_dir: &Path) -> eyre::Result<FunctionConfig> {
        let mut config: FunctionConfig = serde_json::from_str(
            &fs::read_to_string(defaults)
                .wrap_err_with(|| format!("Failed to read defaults from {defaults:?}"))?,
        )
        .wrap_err("Failed to parse the defaults file")?;

        let path = function_dir.join(CONFIG_FILENAME);

        if path.exists() {
            let overrides: Overrides = serde_json::from_str(&fs::read_to_string(&path)?)
                .wrap_err_with(|| format!("Failed to parse {path:?}"))?;

            config.merge(overrides);
        }

        Ok(config)
    }

    /// True when any of the fields the deployer manages differs between
    /// the live function and the desired configuration
    pub fn drifted(&self, live: &GetFunctionConfigurationOutput) -> bool {
        let environment = live
            .environment()
            .and_then(|env| env.variables())
            .cloned()
            .unwrap_or_default();

        live.memory_size() != Some(self.memory)
            || live.timeout() != Some(self.timeout)
            || live.handler() != Some(self.handler.as_str())
            || live.runtime().map(|runtime| runtime.as_str()) != Some(self.runtime.as_str())
            || live.role() != Some(self.role.as_str())
            || environment != self.environment
    }

    fn merge(&mut self, overrides: Overrides) {
        let Overrides {
            description,
            memory,
            timeout,
            handler,
            runtime,
            role,
            environment,
        } = overrides;

        if let Some(description) = description {
            self.description = description;
        }

        if let Some(memory) = memory {
            self.memory = memory;
        }

        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }

        if let Some(handler) = handler {
            self.handler = handler;
        }

        if let Some(runtime) = runtime {
            self.runtime = runtime;
        }

        if let Some(role) = role {
            self.role = role;
        }

        if let Some(environment) = environment {
            self.environment = environment;
        }
    }
}
