use crate::aws;
use eyre::WrapErr;
use serde_json::Value;

/// Creates the stack, or unconditionally pushes the template when the
/// stack already exists
///
/// No local diffing of the template against the live stack is done,
/// CloudFormation is the one deciding what actually changes.
pub struct Reconciler {
    client: aws_sdk_cloudformation::Client,
}

impl Reconciler {
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Reconciler { client }
    }

    pub async fn reconcile(&self, name: &str, template: &Value) -> eyre::Result<()> {
        let body = template.to_string();

        match self.client.describe_stacks().stack_name(name).send().await {
            Ok(_) => {
                println!("Updating stack {name}");

                self.client
                    .update_stack()
                    .stack_name(name)
                    .template_body(body.as_str())
                    .send()
                    .await
                    .map_err(aws::classify)
                    .wrap_err_with(|| format!("Failed to update stack {name}"))?;
            }

            Err(err) => {
                let err = aws::classify(err);

                if !err.is_not_found() {
                    return Err(err).wrap_err_with(|| format!("Failed to query stack {name}"));
                }

                println!("Creating new stack {name}");

                self.client
                    .create_stack()
                    .stack_name(name)
                    .template_body(body.as_str())
                    .send()
                    .await
                    .map_err(aws::classify)
                    .wrap_err_with(|| format!("Failed to create stack {name}"))?;
            }
        }

        Ok(())
    }
}
