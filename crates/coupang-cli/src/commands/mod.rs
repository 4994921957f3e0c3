mod best;
mod deeplink;
mod goldbox;
mod search;

use std::path::Path;
use std::time::{Duration, Instant};

use coupang_core::{
    clamp_limit, ClientConfig, GatewayClient, LinkResolver, ProductFeed, ResultNormalizer,
    RetryConfig, VariantPricing, VariantPricingRules,
};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Output;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a command needs to talk to the gateway.
pub struct CommandContext {
    pub feed: ProductFeed,
    pub retry: RetryConfig,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(timeout_ms) = cli.timeout_ms {
            if timeout_ms == 0 {
                return Err(CliError::Command(String::from(
                    "--timeout-ms must be greater than zero",
                )));
            }
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }

        let gateway = GatewayClient::new(&config);
        Self::with_gateway(cli, gateway, &config)
    }

    pub fn with_gateway(
        cli: &Cli,
        gateway: GatewayClient,
        config: &ClientConfig,
    ) -> Result<Self, CliError> {
        let normalizer = load_normalizer(cli.rules.as_deref())?;
        let feed = if cli.no_shorten {
            ProductFeed::without_link_resolution(gateway)
        } else {
            let resolver = LinkResolver::from_config(gateway.clone(), config);
            ProductFeed::new(gateway, resolver)
        }
        .with_normalizer(normalizer);

        let retry = if cli.retries == 0 {
            RetryConfig::no_retry()
        } else {
            RetryConfig::exponential(cli.retries)
        };

        Ok(Self { feed, retry })
    }
}

pub async fn run(cli: &Cli, context: &CommandContext) -> Result<Output, CliError> {
    let started = Instant::now();

    let (name, result) = match &cli.command {
        Command::Search(args) => ("search", search::run(args, context).await?),
        Command::Best(args) => ("best", best::run(args, context).await?),
        Command::Goldbox(args) => ("goldbox", goldbox::run(args, context).await?),
        Command::Deeplink(args) => ("deeplink", deeplink::run(args, context).await?),
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Output::new(name, result.data, latency_ms, result.warnings)
}

fn load_normalizer(rules: Option<&Path>) -> Result<ResultNormalizer, CliError> {
    let Some(path) = rules else {
        return Ok(ResultNormalizer::default());
    };

    let raw = std::fs::read_to_string(path)?;
    let rules = VariantPricingRules::from_json(&raw)?;
    let variant_pricing = VariantPricing::compile(&rules)?;
    tracing::debug!(path = %path.display(), "loaded variable-pricing rules");
    Ok(ResultNormalizer::new(variant_pricing))
}

/// Warning for limits the gateway would not accept as given.
fn limit_warnings(requested: u32) -> Vec<String> {
    let effective = clamp_limit(requested);
    if effective == requested {
        Vec::new()
    } else {
        vec![format!("--limit {requested} was clamped to {effective}")]
    }
}
