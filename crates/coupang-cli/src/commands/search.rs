use coupang_core::{retry_with_backoff, NormalizedProduct, SearchRequest, SortOrder};
use serde::Serialize;

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::{limit_warnings, CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct SearchResponseData {
    keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landing_url: Option<String>,
    products: Vec<NormalizedProduct>,
}

pub async fn run(args: &SearchArgs, context: &CommandContext) -> Result<CommandResult, CliError> {
    let keyword = args.keyword.trim();
    let mut request = SearchRequest::new(keyword, args.limit)?;
    if let Some(sort) = args.sort {
        request = request.with_sort(sort.into());
    }

    let list = retry_with_backoff(&context.retry, || context.feed.search_products(&request)).await?;

    let data = serde_json::to_value(SearchResponseData {
        keyword: request.keyword.clone(),
        sort: request.sort,
        landing_url: list.landing_url,
        products: list.products,
    })?;
    Ok(CommandResult::ok(data).with_warnings(limit_warnings(args.limit)))
}
