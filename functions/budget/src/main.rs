use aws_config::{BehaviorVersion, Region};
use futures::future::try_join_all;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;

/// Subject marker AWS Budgets puts into threshold notifications
const MARKER: &str = "has exceeded your alert threshold";

/// CloudFront distributions are managed through the us-east-1 endpoint
const REGION: &str = "us-east-1";

/// The SNS-shaped part of the notification the handler cares about,
/// everything else in the records is ignored
#[derive(Debug, Default, Deserialize)]
struct AlertEvent {
    #[serde(rename = "Records", default)]
    records: Vec<AlertRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct AlertRecord {
    #[serde(rename = "Sns", default)]
    sns: Notification,
}

#[derive(Debug, Default, Deserialize)]
struct Notification {
    #[serde(rename = "Subject", default)]
    subject: Option<String>,
}

/// True when at least one record announces a crossed budget threshold
fn threshold_exceeded(event: &AlertEvent) -> bool {
    event.records.iter().any(|record| {
        record
            .sns
            .subject
            .as_deref()
            .is_some_and(|subject| subject.contains(MARKER))
    })
}

/// Fetch the distribution configuration and push it back disabled,
/// guarded by the ETag from the read
async fn disable(client: &aws_sdk_cloudfront::Client, id: &str) -> Result<(), Error> {
    let current = client.get_distribution_config().id(id).send().await?;
    let etag = current.e_tag().unwrap_or_default().to_string();

    let mut config = current
        .distribution_config
        .ok_or("The distribution came back without a configuration")?;
    config.enabled = false;

    client
        .update_distribution()
        .id(id)
        .if_match(etag)
        .distribution_config(config)
        .send()
        .await?;

    Ok(())
}

/// Disable every configured distribution once a threshold notification
/// arrives
///
/// The distributions are updated in parallel, the first failure fails
/// the whole invocation. Returns whether any action was taken.
async fn handler(
    event: LambdaEvent<AlertEvent>,
    client: &aws_sdk_cloudfront::Client,
    distributions: &[String],
) -> Result<bool, Error> {
    if !threshold_exceeded(&event.payload) {
        return Ok(false);
    }

    try_join_all(distributions.iter().map(|id| disable(client, id))).await?;

    Ok(true)
}

/// Distribution IDs come from the environment, validated once at startup
fn distributions() -> Result<Vec<String>, Error> {
    let raw = std::env::var("DISTRIBUTIONS")
        .map_err(|_| "The DISTRIBUTIONS environment variable is not set")?;

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect::<Vec<String>>();

    if ids.is_empty() {
        return Err("DISTRIBUTIONS does not list any distribution".into());
    }

    Ok(ids)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let distributions = distributions()?;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .load()
        .await;
    let client = aws_sdk_cloudfront::Client::new(&config);

    lambda_runtime::run(service_fn(|event| handler(event, &client, &distributions))).await
}
