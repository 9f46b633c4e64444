//! claude-query: a Lambda function that relays a prompt to the
//! Anthropic Messages API.
//!
//! One invocation fetches the API key from SSM Parameter Store,
//! validates the caller's JSON body, calls the provider once and
//! answers with a `{statusCode, body}` response whose body is a JSON
//! `ResponseEnvelope`.
//!
//! ```text
//! src/
//! ├── lib.rs          # Re-exports
//! ├── main.rs         # Lambda entry point
//! ├── error.rs        # Error type and failure categories
//! ├── config.rs       # Environment configuration
//! ├── request.rs      # Event, request and response types
//! ├── secrets.rs      # Parameter store access
//! ├── handler.rs      # The request handler
//! └── providers/      # Provider-specific implementations
//!     ├── mod.rs      # ChatClient / ChatConnector seams
//!     └── anthropic.rs
//! ```

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod secrets;
pub mod handler;

pub use config::{HandlerConfig, ProviderConfig};
pub use error::{Error, FailureKind, FieldError};
pub use handler::QueryHandler;
pub use providers::{AnthropicConnector, ChatClient, ChatConnector};
pub use request::{
  HandlerResponse, InboundEvent, QueryRequest, ResponseEnvelope
};
pub use secrets::{SecretStore, SsmSecretStore};
