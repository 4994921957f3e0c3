use coupang_core::{retry_with_backoff, NormalizedProduct};
use serde::Serialize;

use crate::cli::BestArgs;
use crate::error::CliError;

use super::{limit_warnings, CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct BestResponseData {
    category_id: u32,
    products: Vec<NormalizedProduct>,
}

pub async fn run(args: &BestArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let list = retry_with_backoff(&context.retry, || {
        context.feed.best_products(args.category_id, args.limit)
    })
    .await?;

    let data = serde_json::to_value(BestResponseData {
        category_id: args.category_id,
        products: list.products,
    })?;
    Ok(CommandResult::ok(data).with_warnings(limit_warnings(args.limit)))
}
