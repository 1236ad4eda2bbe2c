use crate::settings::Settings;
use serde_json::{json, Value};

/// Static site storage and CDN: a public-read website bucket fronted by
/// a CloudFront distribution with its own cache and origin request
/// policies
pub fn body(settings: &Settings) -> Value {
    let site = &settings.site;
    let bucket = &site.bucket_domain;
    let origin_id = "StaticBucketOrigin";

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": "Static site storage and CDN",
        "Resources": {
            "StaticBucket": {
                "Type": "AWS::S3::Bucket",
                "Properties": {
                    "BucketName": bucket,
                    "PublicAccessBlockConfiguration": {
                        "BlockPublicAcls": false,
                        "BlockPublicPolicy": false,
                        "IgnorePublicAcls": false,
                        "RestrictPublicBuckets": false
                    },
                    "WebsiteConfiguration": {
                        "IndexDocument": "index.html",
                        "ErrorDocument": "404.html"
                    }
                }
            },
            "StaticBucketPolicy": {
                "Type": "AWS::S3::BucketPolicy",
                "Properties": {
                    "Bucket": { "Ref": "StaticBucket" },
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Sid": "PublicReadGetObject",
                            "Effect": "Allow",
                            "Principal": "*",
                            "Action": "s3:GetObject",
                            "Resource": {
                                "Fn::Join": ["", ["arn:aws:s3:::", { "Ref": "StaticBucket" }, "/*"]]
                            }
                        }]
                    }
                }
            },
            "SiteCachePolicy": {
                "Type": "AWS::CloudFront::CachePolicy",
                "Properties": {
                    "CachePolicyConfig": {
                        "Comment": "Cache policy for the static site",
                        "DefaultTTL": 86400,
                        "MaxTTL": 31536000,
                        "MinTTL": 1,
                        "Name": "SiteCachePolicy",
                        "ParametersInCacheKeyAndForwardedToOrigin": {
                            "CookiesConfig": { "CookieBehavior": "none" },
                            "EnableAcceptEncodingBrotli": true,
                            "EnableAcceptEncodingGzip": true,
                            "HeadersConfig": {
                                "HeaderBehavior": "whitelist",
                                "Headers": ["Host", "Origin"]
                            },
                            "QueryStringsConfig": { "QueryStringBehavior": "none" }
                        }
                    }
                }
            },
            "SiteOriginRequestPolicy": {
                "Type": "AWS::CloudFront::OriginRequestPolicy",
                "Properties": {
                    "OriginRequestPolicyConfig": {
                        "Comment": "Origin request policy for the static site",
                        "CookiesConfig": { "CookieBehavior": "none" },
                        "HeadersConfig": {
                            "HeaderBehavior": "whitelist",
                            "Headers": ["Host"]
                        },
                        "Name": "SiteOriginRequestPolicy",
                        "QueryStringsConfig": { "QueryStringBehavior": "none" }
                    }
                }
            },
            "SiteCDN": {
                "Type": "AWS::CloudFront::Distribution",
                "Properties": {
                    "DistributionConfig": {
                        "Aliases": [bucket],
                        "Origins": [{
                            "DomainName": format!("{bucket}.s3.{}.amazonaws.com", settings.region),
                            "Id": origin_id,
                            "S3OriginConfig": { "OriginAccessIdentity": "" }
                        }],
                        "Enabled": true,
                        "HttpVersion": "http2and3",
                        "Comment": "Static site content",
                        "DefaultRootObject": "index.html",
                        "PriceClass": "PriceClass_All",
                        "IPV6Enabled": true,
                        "DefaultCacheBehavior": {
                            "TargetOriginId": origin_id,
                            "CachePolicyId": { "Ref": "SiteCachePolicy" },
                            "OriginRequestPolicyId": { "Ref": "SiteOriginRequestPolicy" },
                            "Compress": true,
                            "ViewerProtocolPolicy": "redirect-to-https"
                        },
                        "ViewerCertificate": {
                            "AcmCertificateArn": site.certificate_arn,
                            "SslSupportMethod": "sni-only",
                            "MinimumProtocolVersion": "TLSv1.2_2021"
                        },
                        "Logging": {
                            "Bucket": site.logging_bucket,
                            "Prefix": site.logging_prefix
                        }
                    }
                }
            }
        }
    })
}
