//! LLM provider implementations

use async_trait::async_trait;

pub mod anthropic;

// Re-export for convenience
pub use anthropic::{AnthropicClient, AnthropicConnector};
pub use anthropic::{MessageRequest, MessageResponse};

/// A client bound to one credential that can create messages
#[async_trait]
pub trait ChatClient: Send + Sync
{   async fn create_message(
      &self
    , request: &MessageRequest
    ) -> Result<MessageResponse, crate::error::Error>;
}

/// Builds a `ChatClient` from an API key. Construction makes no
/// network call.
pub trait ChatConnector: Send + Sync
{   type Client: ChatClient;

    fn connect(&self, api_key: String)
      -> Result<Self::Client, crate::error::Error>;
}
