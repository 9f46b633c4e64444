//! Inbound event, validated query request and response envelope types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use log::{debug, trace};
use crate::error::{Error, FailureKind, FieldError, StepResult};

pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// HTTP-style event delivered by the hosting runtime.
/// Only `body` is read; every other field is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEvent
{   #[serde(default)]
    pub body: Option<Value>
}

impl InboundEvent
{   /// Decode a raw runtime event
    pub fn from_value(event: Value) -> Result<Self, Error>
    {   serde_json::from_value(event).map_err(|e| {
          debug!("Event is not an HTTP-style object: {}", e);
          Error::InvalidEvent(e.to_string())
        })
    }

    /// Event carrying a raw body string
    pub fn with_body(body: &str) -> Self
    {   InboundEvent
        {   body: Some(Value::String(body.to_string()))
        }
    }

    /// Parse the body into a JSON value. A missing or null body
    /// reads as `{}`.
    pub fn parse_body(&self) -> StepResult<Value>
    {   match &self.body
        {   None | Some(Value::Null) => {
              trace!("No body on event, using empty object");
              Ok(Value::Object(Map::new()))
            }
          , Some(Value::String(raw)) => {
              serde_json::from_str(raw).map_err(|e| {
                debug!("Body is not valid JSON: {}", e);
                ( FailureKind::MalformedJson
                , Error::MalformedJson(e.to_string())
                )
              })
            }
          , Some(_) => {
              Err(( FailureKind::InvalidRequestShape
                  , Error::InvalidRequestShape(vec![
                      FieldError::new(
                        "body",
                        "expected a JSON-encoded string"
                      )
                    ])
                  ))
            }
        }
    }
}

/// Validated query request. Only built through `from_value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest
{   /// The prompt to send to the model
    pub prompt: String
  , /// Maximum tokens in the response
    pub max_tokens: u32
  , /// Sampling temperature
    pub temperature: f64
  , /// Model identifier
    pub model: String
}

impl QueryRequest
{   /// Validate a parsed body in one pass. Every failing field is
    /// reported, not just the first.
    pub fn from_value(value: &Value)
      -> Result<QueryRequest, Vec<FieldError>>
    {   let obj = value.as_object().ok_or_else(|| {
          vec![FieldError::new("body", "expected a JSON object")]
        })?;

        let mut errors = Vec::new();

        let prompt = match obj.get("prompt")
        {   None | Some(Value::Null) => {
              errors.push(FieldError::new("prompt", "field required"));
              None
            }
          , Some(Value::String(s)) if s.is_empty() => {
              errors.push(FieldError::new(
                "prompt",
                "must not be empty"
              ));
              None
            }
          , Some(Value::String(s)) => Some(s.clone())
          , Some(_) => {
              errors.push(FieldError::new(
                "prompt",
                "expected a string"
              ));
              None
            }
        };

        let max_tokens = match obj.get("max_tokens")
        {   None | Some(Value::Null) => Some(DEFAULT_MAX_TOKENS)
          , Some(v) => {
              let parsed = positive_u32(v);
              if parsed.is_none()
              {   errors.push(FieldError::new(
                    "max_tokens",
                    "expected a positive integer"
                  ));
              }
              parsed
            }
        };

        let temperature = match obj.get("temperature")
        {   None | Some(Value::Null) => Some(DEFAULT_TEMPERATURE)
          , Some(v) => {
              let parsed = v.as_f64().filter(|t| t.is_finite());
              if parsed.is_none()
              {   errors.push(FieldError::new(
                    "temperature",
                    "expected a number"
                  ));
              }
              parsed
            }
        };

        let model = match obj.get("model")
        {   None | Some(Value::Null) => Some(DEFAULT_MODEL.to_string())
          , Some(Value::String(s)) => Some(s.clone())
          , Some(_) => {
              errors.push(FieldError::new(
                "model",
                "expected a string"
              ));
              None
            }
        };

        match (prompt, max_tokens, temperature, model)
        {   (Some(prompt), Some(max_tokens), Some(temperature), Some(model))
              if errors.is_empty() => {
              Ok(QueryRequest
              {   prompt
                , max_tokens
                , temperature
                , model
              })
            }
          , _ => Err(errors)
        }
    }
}

/// Accepts integers and integral floats in `1..=u32::MAX`
fn positive_u32(v: &Value) -> Option<u32>
{   let n = match v.as_u64()
    {   Some(n) => n
      , None => {
          let f = v.as_f64()?;
          if f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64
          {   return None;
          }
          f as u64
        }
    };
    if n == 0
    {   return None;
    }
    u32::try_from(n).ok()
}

/// Token counters reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage
{   pub input_tokens: u64
  , pub output_tokens: u64
}

/// Body of a 200 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody
{   /// Generated text
    pub response: String
  , pub usage: Usage
  , /// Model named in the request
    pub model: String
}

/// Body of a 4xx/5xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureBody
{   pub error: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

/// Exactly one of the two shapes is produced per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope
{   Success(SuccessBody)
  , Failure(FailureBody)
}

impl ResponseEnvelope
{   pub fn failure(kind: FailureKind, error: &Error) -> Self
    {   ResponseEnvelope::Failure(FailureBody
        {   error: kind.label().to_string()
          , details: if kind.has_details()
            {   Some(error.to_string())
            } else
            {   None
            }
        })
    }
}

/// What the function returns to the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse
{   #[serde(rename = "statusCode")]
    pub status_code: u16
  , /// JSON-encoded `ResponseEnvelope`
    pub body: String
}

impl HandlerResponse
{   pub fn new(status_code: u16, envelope: &ResponseEnvelope) -> Self
    {   let body = serde_json::to_string(envelope)
          .unwrap_or_else(|e| {
            format!(
              "{{\"error\":\"Internal server error\",\"details\":{:?}}}",
              e.to_string()
            )
          });
        HandlerResponse
        {   status_code
          , body
        }
    }

    pub fn success(body: SuccessBody) -> Self
    {   HandlerResponse::new(200, &ResponseEnvelope::Success(body))
    }

    pub fn failure(kind: FailureKind, error: &Error) -> Self
    {   HandlerResponse::new(
          kind.status_code(),
          &ResponseEnvelope::failure(kind, error)
        )
    }

    /// Decode the body back into an envelope
    pub fn envelope(&self) -> Result<ResponseEnvelope, Error>
    {   serde_json::from_str(&self.body)
          .map_err(|e| Error::ParseError(e.to_string()))
    }
}
