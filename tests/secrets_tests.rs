use aws_sdk_ssm::config::retry::RetryConfig;
use aws_sdk_ssm::config::{BehaviorVersion, Credentials, Region};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use claude_query::error::Error;
use claude_query::secrets::{SecretStore, SsmSecretStore};

const SECRET_NAME: &str = "/claude-sdk/api-key";
const AWS_JSON: &str = "application/x-amz-json-1.1";

/// SDK client pointed at the mock server, with static credentials
/// and no retries
fn ssm_client(server: &MockServer) -> aws_sdk_ssm::Client
{   let config = aws_sdk_ssm::Config::builder()
      .behavior_version(BehaviorVersion::latest())
      .region(Region::new("us-east-1"))
      .credentials_provider(Credentials::new(
        "AKIDTEST", "test-secret", None, None, "test"
      ))
      .endpoint_url(server.uri())
      .retry_config(RetryConfig::disabled())
      .build();
    aws_sdk_ssm::Client::from_conf(config)
}

fn get_parameter() -> wiremock::MockBuilder
{   Mock::given(method("POST"))
      .and(path("/"))
      .and(header("x-amz-target", "AmazonSSM.GetParameter"))
}

#[tokio::test]
async fn fetches_decrypted_parameter_value()
{   let server = MockServer::start().await;
    get_parameter()
      .and(body_partial_json(json!({
        "Name": SECRET_NAME,
        "WithDecryption": true
      })))
      .respond_with(ResponseTemplate::new(200).set_body_raw(
        json!({
          "Parameter": {
            "Name": SECRET_NAME,
            "Type": "SecureString",
            "Value": "sk-live-key",
            "Version": 1
          }
        }).to_string(),
        AWS_JSON
      ))
      .expect(2)
      .mount(&server)
      .await;

    let store = SsmSecretStore::with_client(ssm_client(&server));
    assert_eq!(store.get_secret(SECRET_NAME).await, Ok("sk-live-key".to_string()));
    // Every call goes back to the store
    assert_eq!(store.get_secret(SECRET_NAME).await, Ok("sk-live-key".to_string()));
}

#[tokio::test]
async fn missing_parameter_is_unavailable()
{   let server = MockServer::start().await;
    get_parameter()
      .respond_with(ResponseTemplate::new(400).set_body_raw(
        json!({
          "__type": "ParameterNotFound",
          "message": "Parameter /claude-sdk/api-key not found."
        }).to_string(),
        AWS_JSON
      ))
      .mount(&server)
      .await;

    let store = SsmSecretStore::with_client(ssm_client(&server));
    match store.get_secret(SECRET_NAME).await
    {   Err(Error::SecretUnavailable(msg)) => {
          assert!(msg.starts_with(SECRET_NAME), "{}", msg);
        }
      , other => panic!("expected SecretUnavailable, got {:?}", other)
    }
}

#[tokio::test]
async fn parameter_without_value_is_unavailable()
{   let server = MockServer::start().await;
    get_parameter()
      .respond_with(ResponseTemplate::new(200).set_body_raw(
        json!({ "Parameter": {} }).to_string(),
        AWS_JSON
      ))
      .mount(&server)
      .await;

    let store = SsmSecretStore::with_client(ssm_client(&server));
    assert_eq!(
      store.get_secret(SECRET_NAME).await,
      Err(Error::SecretUnavailable(format!(
        "{}: parameter has no value",
        SECRET_NAME
      )))
    );
}
