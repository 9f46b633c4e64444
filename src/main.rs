use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{debug, info};
use serde_json::Value;
use claude_query::{
  AnthropicConnector, HandlerConfig, HandlerResponse, QueryHandler,
  SsmSecretStore
};

type Handler = QueryHandler<SsmSecretStore, AnthropicConnector>;

#[tokio::main]
async fn main() -> Result<(), Error>
{   // CloudWatch stamps each line, so no timestamps here
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    )
      .format_timestamp(None)
      .init();

    let config = HandlerConfig::from_env()?;
    let connector = AnthropicConnector::new(config.provider.clone())?;
    let handler: Handler = QueryHandler::new(
      SsmSecretStore::new(),
      connector,
      config.secret_parameter.clone()
    );

    info!("claude-query ready");
    let handler = &handler;
    run(service_fn(move |event: LambdaEvent<Value>| async move {
      invoke(handler, event).await
    })).await
}

async fn invoke(
  handler: &Handler
, event: LambdaEvent<Value>
) -> Result<HandlerResponse, Error>
{   debug!("Invocation {}", event.context.request_id);
    Ok(handler.handle_event(event.payload).await)
}
