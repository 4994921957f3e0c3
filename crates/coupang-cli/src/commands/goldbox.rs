use coupang_core::{retry_with_backoff, NormalizedProduct};
use serde::Serialize;

use crate::cli::GoldboxArgs;
use crate::error::CliError;

use super::{limit_warnings, CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct GoldboxResponseData {
    products: Vec<NormalizedProduct>,
}

pub async fn run(args: &GoldboxArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let list = retry_with_backoff(&context.retry, || context.feed.todays_deals(args.limit)).await?;

    let data = serde_json::to_value(GoldboxResponseData {
        products: list.products,
    })?;
    Ok(CommandResult::ok(data).with_warnings(limit_warnings(args.limit)))
}
