//! The query handler: one inbound event in, one response out

use serde_json::Value;
use log::{debug, info, warn, error};
use crate::error::{Error, FailureKind, StepResult};
use crate::providers::{ChatClient, ChatConnector, MessageRequest};
use crate::request::{HandlerResponse, InboundEvent, QueryRequest, SuccessBody};
use crate::secrets::SecretStore;

/// Tags an error as an unexpected (generic 500) failure
fn unexpected(e: Error) -> (FailureKind, Error)
{   (FailureKind::Unexpected, e)
}

/// Request handler.
///
/// Holds the process-wide collaborators (secret store and provider
/// connector). Neither is mutated after construction, so one handler
/// serves every invocation.
pub struct QueryHandler<S, C>
{   secrets: S
  , connector: C
  , secret_parameter: Option<String>
}

impl<S, C> QueryHandler<S, C>
where S: SecretStore
    , C: ChatConnector
{   pub fn new(
      secrets: S
    , connector: C
    , secret_parameter: Option<String>
    ) -> Self
    {   debug!(
          "Creating QueryHandler, secret parameter: {:?}",
          secret_parameter
        );
        QueryHandler
        {   secrets
          , connector
          , secret_parameter
        }
    }

    /// Handle a raw runtime event. An event that is not an
    /// HTTP-style object becomes the generic 500 once the secret has
    /// been fetched, like every other unexpected failure.
    pub async fn handle_event(&self, event: Value) -> HandlerResponse
    {   let decoded = InboundEvent::from_value(event);
        self.respond(self.run(decoded.as_ref().map_err(Clone::clone)).await)
    }

    /// Handle one event. Always produces a response; failures are
    /// folded into the response body.
    pub async fn handle(&self, event: &InboundEvent) -> HandlerResponse
    {   self.respond(self.run(Ok(event)).await)
    }

    fn respond(&self, outcome: StepResult<SuccessBody>) -> HandlerResponse
    {   match outcome
        {   Ok(body) => {
              info!(
                "Query answered: model={} input_tokens={} output_tokens={}",
                body.model,
                body.usage.input_tokens,
                body.usage.output_tokens
              );
              HandlerResponse::success(body)
            }
          , Err((kind, e)) => {
              if kind.status_code() >= 500
              {   error!("{} ({:?}): {}", kind.label(), kind, e);
              } else
              {   warn!("{} ({:?}): {}", kind.label(), kind, e);
              }
              HandlerResponse::failure(kind, &e)
            }
        }
    }

    async fn run(
      &self
    , event: Result<&InboundEvent, Error>
    ) -> StepResult<SuccessBody>
    {   let api_key = self.fetch_api_key().await
          .map_err(unexpected)?;

        let event = event.map_err(unexpected)?;
        let body = event.parse_body()?;

        let query = QueryRequest::from_value(&body)
          .map_err(|errors| {
            ( FailureKind::InvalidRequestShape
            , Error::InvalidRequestShape(errors)
            )
          })?;
        debug!(
          "Validated query: model={} max_tokens={} temperature={} prompt_len={}",
          query.model, query.max_tokens, query.temperature, query.prompt.len()
        );

        let client = self.connector.connect(api_key)
          .map_err(unexpected)?;

        let message = client
          .create_message(&MessageRequest::user_prompt(&query))
          .await
          .map_err(|e| (FailureKind::DownstreamApi, e))?;

        let text = message.first_text()
          .map_err(unexpected)?;

        // The requested model is echoed, not the one the provider reports
        Ok(SuccessBody
        {   response: text.to_string()
          , usage: message.usage
          , model: query.model
        })
    }

    /// Fetched on every invocation, never cached
    async fn fetch_api_key(&self) -> Result<String, Error>
    {   let name = self.secret_parameter.as_deref()
          .ok_or_else(|| {
            Error::MissingConfiguration(
              crate::config::SECRET_PARAMETER_ENV.to_string()
            )
          })?;
        self.secrets.get_secret(name).await
    }
}
