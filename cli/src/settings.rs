use eyre::{bail, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Everything the deployment scripts used to hard-code: region, stack
/// names, site identifiers and the function roster. Loaded once at
/// process start and validated before any remote call is made.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub region: String,
    pub site: SiteSettings,
    pub budget: BudgetSettings,
    pub functions: FunctionsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    pub stack_name: String,

    /// Bucket name, which doubles as the public domain of the static site
    pub bucket_domain: String,

    /// ACM certificate for the CDN, must live in us-east-1
    pub certificate_arn: String,

    pub logging_bucket: String,
    pub logging_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetSettings {
    pub stack_name: String,
    pub topic_name: String,

    /// ARN of the lambda subscribed to budget notifications
    pub subscriber_arn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionsSettings {
    /// Prefix of the remote function names, e.g. "collection" makes
    /// the sendmail function "collection_sendmail"
    pub prefix: String,

    /// Directory with the per-function configuration overrides
    pub root: PathBuf,

    /// Directory with the built per-function artifacts to package
    pub dist: PathBuf,

    /// Functions deployed in this order by a plain `deploy`
    pub names: Vec<String>,
}

impl Settings {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let toml_string = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read settings from {path:?}"))?;

        let settings: Settings =
            toml::from_str(&toml_string).wrap_err("Failed to parse the settings file")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Remote name of a function
    pub fn function_name(&self, name: &str) -> String {
        format!("{}_{}", self.functions.prefix, name)
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.region.is_empty() {
            bail!("region must not be empty");
        }

        if self.functions.prefix.is_empty() {
            bail!("functions.prefix must not be empty");
        }

        if self.functions.names.is_empty() {
            bail!("functions.names must list at least one function");
        }

        Ok(())
    }
}

#[cfg(test)]
impl Settings {
    pub(crate) fn fixture() -> Settings {
        Settings {
            region: "eu-central-1".into(),
            site: SiteSettings {
                stack_name: "StaticSite".into(),
                bucket_domain: "static.example.social".into(),
                certificate_arn:
                    "arn:aws:acm:us-east-1:000000000000:certificate/11111111-2222-3333-4444-555555555555"
                        .into(),
                logging_bucket: "logs.example.social.s3.amazonaws.com".into(),
                logging_prefix: "cloudfront/static".into(),
            },
            budget: BudgetSettings {
                stack_name: "Budget".into(),
                topic_name: "BudgetSNS".into(),
                subscriber_arn:
                    "arn:aws:lambda:eu-central-1:000000000000:function:collection_budget".into(),
            },
            functions: FunctionsSettings {
                prefix: "collection".into(),
                root: "functions".into(),
                dist: "target/lambda".into(),
                names: vec!["sendmail".into(), "budget".into()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
        region = "eu-central-1"

        [site]
        stack_name = "StaticSite"
        bucket_domain = "static.example.social"
        certificate_arn = "arn:aws:acm:us-east-1:000000000000:certificate/abc"
        logging_bucket = "logs.example.social.s3.amazonaws.com"
        logging_prefix = "cloudfront/static"

        [budget]
        stack_name = "Budget"
        topic_name = "BudgetSNS"
        subscriber_arn = "arn:aws:lambda:eu-central-1:000000000000:function:collection_budget"

        [functions]
        prefix = "collection"
        root = "functions"
        dist = "target/lambda"
        names = ["sendmail", "budget"]
    "#;

    #[test]
    fn parses_and_validates() {
        let settings: Settings = toml::from_str(SETTINGS).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.function_name("sendmail"), "collection_sendmail");
        assert_eq!(settings.functions.names, vec!["sendmail", "budget"]);
    }

    #[test]
    fn rejects_empty_function_list() {
        let mut settings: Settings = toml::from_str(SETTINGS).unwrap();
        settings.functions.names.clear();

        assert!(settings.validate().is_err());
    }
}
