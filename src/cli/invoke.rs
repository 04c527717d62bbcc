use crate::config::Config;
use crate::error::Result;
use crate::handler::{Handler, InvocationEvent};

pub async fn execute(target: &str) -> Result<()> {
    let config = Config::load()?;
    let handler = Handler::new(config);

    let response = handler
        .handle(InvocationEvent {
            target: target.to_string(),
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
