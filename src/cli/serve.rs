use crate::config::Config;
use crate::error::{AppError, Result};
use crate::handler::{Handler, InvocationEvent};
use lambda_runtime::{LambdaEvent, service_fn};
use tracing::info;

pub async fn execute() -> Result<()> {
    let config = Config::load()?;
    let handler = Handler::new(config);
    let handler = &handler;

    info!("Waiting for invocations");
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<InvocationEvent>| async move {
            handler
                .handle(event.payload)
                .await
                .map_err(lambda_runtime::Error::from)
        },
    ))
    .await
    .map_err(|e| AppError::Other(anyhow::anyhow!("Lambda runtime failed: {}", e)))
}
