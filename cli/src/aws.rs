use aws_sdk_lambda::client::Waiters;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::client::waiters::error::WaiterError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::time::Duration;

/// Bound for waiting on a configuration or code update to settle
const MAX_WAIT_UPDATED: Duration = Duration::from_secs(10);

/// Bound for waiting on a freshly created function to become active
const MAX_WAIT_ACTIVE: Duration = Duration::from_secs(30);

/// Remote failures folded into the handful of cases the scripts act on
///
/// Only NotFound is recoverable, it switches the caller to the create
/// path. Everything else terminates the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwsError {
    NotFound(String),
    Conflict(String),
    Timeout(String),
    Validation(String),
    Unknown(String),
}

impl std::fmt::Display for AwsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AwsError::NotFound(detail) => write!(f, "Resource not found: {detail}"),
            AwsError::Conflict(detail) => write!(f, "Conflicting remote change: {detail}"),
            AwsError::Timeout(detail) => write!(f, "Timed out waiting for remote state: {detail}"),
            AwsError::Validation(detail) => write!(f, "Request rejected: {detail}"),
            AwsError::Unknown(detail) => write!(f, "{detail}"),
        }
    }
}

impl std::error::Error for AwsError {}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound(_))
    }
}

/// Fold an SDK error into the taxonomy by its service error code
///
/// CloudFormation has no dedicated not-found error, a missing stack
/// comes back as a ValidationError whose message ends with
/// "does not exist".
pub fn classify<E, R>(err: SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().unwrap_or_default().to_string();
    let message = err.message().unwrap_or_default().to_string();
    let detail = format!("{}", DisplayErrorContext(&err));

    log::debug!("Remote call failed with code {code:?}: {message}");

    if code.ends_with("NotFoundException") || message.ends_with("does not exist") {
        return AwsError::NotFound(if message.is_empty() { detail } else { message });
    }

    match code.as_str() {
        "ResourceConflictException" | "ConcurrentModificationException" | "PreconditionFailed" => {
            AwsError::Conflict(detail)
        }
        "ValidationError" | "ValidationException" | "InvalidParameterValueException" => {
            AwsError::Validation(detail)
        }
        _ => AwsError::Unknown(detail),
    }
}

/// Wait until a configuration or code change is fully applied
pub async fn wait_updated(client: &aws_sdk_lambda::Client, name: &str) -> Result<(), AwsError> {
    client
        .wait_until_function_updated_v2()
        .function_name(name)
        .wait(MAX_WAIT_UPDATED)
        .await
        .map(|_| ())
        .map_err(waiter_error)
}

/// Wait until a freshly created function can be invoked
pub async fn wait_active(client: &aws_sdk_lambda::Client, name: &str) -> Result<(), AwsError> {
    client
        .wait_until_function_active_v2()
        .function_name(name)
        .wait(MAX_WAIT_ACTIVE)
        .await
        .map(|_| ())
        .map_err(waiter_error)
}

fn waiter_error<O, E>(err: WaiterError<O, E>) -> AwsError
where
    O: std::fmt::Debug,
    E: std::fmt::Debug,
{
    match err {
        WaiterError::ExceededMaxWait(context) => {
            AwsError::Timeout(format!("gave up after {:?}", context.max_wait()))
        }
        other => AwsError::Unknown(format!("{other:?}")),
    }
}
