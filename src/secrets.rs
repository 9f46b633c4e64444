//! Secret retrieval from the managed parameter store

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::error::DisplayErrorContext;
use tokio::sync::OnceCell;
use log::{debug, error};
use crate::error::Error;

/// Looks up a decrypted secret value by name
#[async_trait]
pub trait SecretStore: Send + Sync
{   async fn get_secret(&self, name: &str) -> Result<String, Error>;
}

/// SSM Parameter Store backed secrets.
///
/// The SDK client is built on first use from the default AWS
/// configuration chain and shared by every later invocation. Values
/// are never cached.
#[derive(Debug, Default)]
pub struct SsmSecretStore
{   client: OnceCell<aws_sdk_ssm::Client>
}

impl SsmSecretStore
{   pub fn new() -> Self
    {   SsmSecretStore
        {   client: OnceCell::new()
        }
    }

    /// Use an already-configured SDK client
    pub fn with_client(client: aws_sdk_ssm::Client) -> Self
    {   SsmSecretStore
        {   client: OnceCell::new_with(Some(client))
        }
    }

    async fn client(&self) -> &aws_sdk_ssm::Client
    {   self.client.get_or_init(|| async {
          debug!("Loading AWS config for SSM client");
          let config = aws_config::load_defaults(
            BehaviorVersion::latest()
          ).await;
          aws_sdk_ssm::Client::new(&config)
        }).await
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore
{   async fn get_secret(&self, name: &str) -> Result<String, Error>
    {   debug!("Fetching parameter {}", name);

        let output = self.client().await
          .get_parameter()
          .name(name)
          .with_decryption(true)
          .send()
          .await
          .map_err(|e| {
            error!(
              "GetParameter {} failed: {}",
              name, DisplayErrorContext(&e)
            );
            Error::SecretUnavailable(format!(
              "{}: {}",
              name, DisplayErrorContext(&e)
            ))
          })?;

        output.parameter()
          .and_then(|p| p.value())
          .map(str::to_string)
          .ok_or_else(|| {
            error!("Parameter {} has no value", name);
            Error::SecretUnavailable(format!(
              "{}: parameter has no value",
              name
            ))
          })
    }
}
