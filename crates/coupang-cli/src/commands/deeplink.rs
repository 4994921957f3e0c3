use coupang_core::retry_with_backoff;
use serde::Serialize;

use crate::cli::DeeplinkArgs;
use crate::error::CliError;

use super::{CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct DeeplinkResponseData {
    original_url: String,
    short_url: String,
}

/// Unlike product listings, a failed conversion here is an error.
pub async fn run(args: &DeeplinkArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let url = args.url.trim();
    if url.is_empty() {
        return Err(CliError::Command(String::from("url must not be empty")));
    }

    let short_url = retry_with_backoff(&context.retry, || context.feed.deep_link(url)).await?;

    let data = serde_json::to_value(DeeplinkResponseData {
        original_url: url.to_owned(),
        short_url,
    })?;
    Ok(CommandResult::ok(data))
}
