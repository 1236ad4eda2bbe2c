use aws_config::BehaviorVersion;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use serde_email::Email;

/// Invocation payload of the transactional email sender
///
/// Deserialization is the validation step: malformed addresses reject
/// the invocation before any send is attempted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailRequest {
    from: Address,
    to: Vec<Address>,
    reply_to: Option<Address>,
    subject: String,
    content: EmailContent,
    configuration_set: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailContent {
    text: String,
    html: String,
}

/// A bare address or a display-name pair, both rendered into a single
/// formatted address field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Address {
    Plain(Email),
    Named { name: String, address: Email },
}

impl Address {
    fn formatted(&self) -> String {
        match self {
            Address::Plain(email) => email.to_string(),
            Address::Named { name, address } => format!("{name} <{address}>"),
        }
    }
}

/// Forward the normalized payload to SES, returns the message id
async fn send(client: &aws_sdk_ses::Client, request: &EmailRequest) -> Result<String, Error> {
    let destination = Destination::builder()
        .set_to_addresses(Some(request.to.iter().map(Address::formatted).collect()))
        .build();

    let message = Message::builder()
        .subject(Content::builder().data(request.subject.as_str()).build()?)
        .body(
            Body::builder()
                .text(Content::builder().data(request.content.text.as_str()).build()?)
                .html(Content::builder().data(request.content.html.as_str()).build()?)
                .build(),
        )
        .build();

    let response = client
        .send_email()
        .source(request.from.formatted())
        .destination(destination)
        .message(message)
        .set_reply_to_addresses(request.reply_to.as_ref().map(|reply| vec![reply.formatted()]))
        .set_configuration_set_name(request.configuration_set.clone())
        .send()
        .await?;

    Ok(response.message_id().to_string())
}

/// Returns the invocation's log stream name as a correlation token for
/// the caller
async fn handler(
    event: LambdaEvent<EmailRequest>,
    client: &aws_sdk_ses::Client,
) -> Result<String, Error> {
    let message_id = send(client, &event.payload).await?;
    lambda_runtime::tracing::info!(%message_id, "Email accepted by SES");

    Ok(event.context.env_config.log_stream.clone())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    // Region comes from the runtime environment
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = aws_sdk_ses::Client::new(&config);

    lambda_runtime::run(service_fn(|event| handler(event, &client))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ses::operation::send_email::SendEmailOutput;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};
    use serde_json::json;

    fn request(value: serde_json::Value) -> EmailRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rejects_an_invalid_from_address() {
        let result = serde_json::from_value::<EmailRequest>(json!({
            "from": "not-an-address",
            "to": ["c@d.com"],
            "subject": "S",
            "content": {"text": "t", "html": "<p>t</p>"}
        }));

        assert!(result.is_err());
    }

    #[test]
    fn formats_display_name_pairs() {
        let request = request(json!({
            "from": {"name": "Alice", "address": "a@b.com"},
            "to": ["c@d.com"],
            "subject": "S",
            "content": {"text": "t", "html": "<p>t</p>"}
        }));

        assert_eq!(request.from.formatted(), "Alice <a@b.com>");
        assert_eq!(request.to[0].formatted(), "c@d.com");
    }

    #[tokio::test]
    async fn maps_the_payload_to_a_send_request() {
        let send_email = mock!(aws_sdk_ses::Client::send_email)
            .match_requests(|req| {
                req.source() == Some("a@b.com")
                    && req
                        .destination()
                        .is_some_and(|d| d.to_addresses() == ["c@d.com".to_string()])
            })
            .then_output(|| {
                SendEmailOutput::builder()
                    .message_id("0101-test")
                    .build()
                    .unwrap()
            });
        let client = mock_client!(aws_sdk_ses, RuleMode::MatchAny, [&send_email]);

        let message_id = send(
            &client,
            &request(json!({
                "from": "a@b.com",
                "to": ["c@d.com"],
                "subject": "S",
                "content": {"text": "t", "html": "<p>t</p>"}
            })),
        )
        .await
        .unwrap();

        assert_eq!(message_id, "0101-test");
        assert_eq!(send_email.num_calls(), 1);
    }

    #[tokio::test]
    async fn passes_reply_to_and_configuration_set() {
        let send_email = mock!(aws_sdk_ses::Client::send_email)
            .match_requests(|req| {
                req.reply_to_addresses() == ["e@f.com".to_string()]
                    && req.configuration_set_name() == Some("transaction-emails")
            })
            .then_output(|| {
                SendEmailOutput::builder()
                    .message_id("0102-test")
                    .build()
                    .unwrap()
            });
        let client = mock_client!(aws_sdk_ses, RuleMode::MatchAny, [&send_email]);

        send(
            &client,
            &request(json!({
                "from": "a@b.com",
                "to": ["c@d.com"],
                "replyTo": "e@f.com",
                "subject": "S",
                "content": {"text": "t", "html": "<p>t</p>"},
                "configurationSet": "transaction-emails"
            })),
        )
        .await
        .unwrap();

        assert_eq!(send_email.num_calls(), 1);
    }
}
