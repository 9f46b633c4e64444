use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use log::{debug, trace, error};
use crate::config::ProviderConfig;
use crate::error::Error;
use crate::request::{QueryRequest, Usage};

const MESSAGES_PATH: &str = "/v1/messages";

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest
{   pub model: String
  , pub max_tokens: u32
  , pub temperature: f64
  , pub messages: Vec<ChatMessage>
}

impl MessageRequest
{   /// Single user-role message carrying the prompt
    pub fn user_prompt(query: &QueryRequest) -> Self
    {   MessageRequest
        {   model: query.model.clone()
          , max_tokens: query.max_tokens
          , temperature: query.temperature
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: query.prompt.clone()
              }
            ]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock
{   #[serde(rename = "type")]
    pub kind: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>
}

impl ContentBlock
{   pub fn text(text: &str) -> Self
    {   ContentBlock
        {   kind: "text".to_string()
          , text: Some(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse
{   #[serde(default)]
    pub id: Option<String>
  , pub content: Vec<ContentBlock>
  , /// Model as reported by the provider
    #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub stop_reason: Option<String>
  , pub usage: Usage
}

impl MessageResponse
{   /// Text of the first content block
    pub fn first_text(&self) -> Result<&str, Error>
    {   self.content.first()
          .and_then(|block| block.text.as_deref())
          .ok_or_else(|| {
            error!("No text in first content block");
            Error::NoContentInResponse
          })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody
{   error: ApiErrorDetail
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail
{   #[serde(rename = "type", default)]
    kind: Option<String>
  , message: String
}

// ===== Connector =====

/// Holds the pooled HTTP client shared by every per-invocation
/// `AnthropicClient`
#[derive(Debug, Clone)]
pub struct AnthropicConnector
{   http_client: reqwest::Client
  , config: ProviderConfig
}

impl AnthropicConnector
{   pub fn new(config: ProviderConfig) -> Result<Self, Error>
    {   debug!(
          "Creating AnthropicConnector for {}",
          config.api_base
        );
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::HttpError(e.to_string())
          })?;

        Ok(AnthropicConnector
        {   http_client
          , config
        })
    }
}

impl crate::providers::ChatConnector for AnthropicConnector
{   type Client = AnthropicClient;

    fn connect(&self, api_key: String) -> Result<AnthropicClient, Error>
    {   AnthropicClient::new(
          self.http_client.clone(),
          &self.config,
          api_key
        )
    }
}

// ===== Client =====

/// Anthropic Messages API client bound to one API key
#[derive(Debug, Clone)]
pub struct AnthropicClient
{   http_client: reqwest::Client
  , endpoint: String
  , headers: HeaderMap
}

impl AnthropicClient
{   pub fn new(
      http_client: reqwest::Client
    , config: &ProviderConfig
    , api_key: String
    ) -> Result<Self, Error>
    {   if api_key.trim().is_empty()
        {   error!("Empty API key");
            return Err(Error::MissingConfiguration(
              "Anthropic API key".to_string()
            ));
        }

        let mut key_header = HeaderValue::from_str(&api_key)
          .map_err(|_| {
            Error::InvalidConfiguration(
              "API key is not a valid header value".to_string()
            )
          })?;
        key_header.set_sensitive(true);

        let version_header = HeaderValue::from_str(&config.api_version)
          .map_err(|_| {
            Error::InvalidConfiguration(format!(
              "anthropic-version {:?} is not a valid header value",
              config.api_version
            ))
          })?;

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key_header);
        headers.insert("anthropic-version", version_header);
        headers.insert(
          CONTENT_TYPE,
          HeaderValue::from_static("application/json")
        );

        Ok(AnthropicClient
        {   http_client
          , endpoint: format!(
              "{}{}",
              config.api_base.trim_end_matches('/'),
              MESSAGES_PATH
            )
          , headers
        })
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }
}

#[async_trait]
impl crate::providers::ChatClient for AnthropicClient
{   async fn create_message(
      &self
    , request: &MessageRequest
    ) -> Result<MessageResponse, Error>
    {   debug!(
          "create_message model={} max_tokens={}",
          request.model, request.max_tokens
        );

        let response = self.http_client
          .post(&self.endpoint)
          .headers(self.headers.clone())
          .json(request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Anthropic response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            let message = match serde_json::from_str::<ApiErrorBody>(
              &error_text
            )
            {   Ok(body) => match body.error.kind
                {   Some(kind) => format!("{}: {}", kind, body.error.message)
                  , None => body.error.message
                }
              , Err(_) => error_text
            };
            error!("Anthropic API error {}: {}", status, message);
            return Err(Error::ApiError
            {   status: status.as_u16()
              , message
            });
        }

        let message: MessageResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        debug!(
          "Anthropic replied: {} blocks, usage in={} out={}",
          message.content.len(),
          message.usage.input_tokens,
          message.usage.output_tokens
        );
        Ok(message)
    }
}
