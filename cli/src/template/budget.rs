use crate::settings::Settings;
use serde_json::{json, Value};

/// Budget automation: an SNS topic AWS Budgets is allowed to publish
/// to, wired to the budget lambda
pub fn body(settings: &Settings) -> Value {
    let budget = &settings.budget;

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": "Budget automation",
        "Resources": {
            "BudgetSNSTopic": {
                "Type": "AWS::SNS::Topic",
                "Properties": {
                    "TopicName": budget.topic_name
                }
            },
            "BudgetSNSPolicy": {
                "Type": "AWS::SNS::TopicPolicy",
                "Properties": {
                    "PolicyDocument": {
                        "Statement": [{
                            "Sid": "AWSBudgets-notification-1",
                            "Effect": "Allow",
                            "Principal": { "Service": "budgets.amazonaws.com" },
                            "Action": "SNS:Publish",
                            "Resource": { "Ref": "BudgetSNSTopic" }
                        }]
                    },
                    "Topics": [{ "Ref": "BudgetSNSTopic" }]
                }
            },
            "BudgetSubscription": {
                "Type": "AWS::SNS::Subscription",
                "Properties": {
                    "Endpoint": budget.subscriber_arn,
                    "Protocol": "lambda",
                    "TopicArn": { "Ref": "BudgetSNSTopic" }
                }
            }
        }
    })
}
