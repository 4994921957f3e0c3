use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::CliError;

/// Top-level JSON document written to stdout.
#[derive(Debug, Serialize)]
pub struct Output {
    pub meta: OutputMeta,
    pub data: Value,
}

/// Field order is fixed to keep the JSON stable across runs.
#[derive(Debug, Serialize)]
pub struct OutputMeta {
    pub command: &'static str,
    pub generated_at: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Output {
    pub fn new(
        command: &'static str,
        data: Value,
        latency_ms: u64,
        warnings: Vec<String>,
    ) -> Result<Self, CliError> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|error| CliError::Command(format!("failed to format timestamp: {error}")))?;

        Ok(Self {
            meta: OutputMeta {
                command,
                generated_at,
                latency_ms,
                warnings,
            },
            data,
        })
    }
}

pub fn to_json(output: &Output, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(payload)
}

pub fn render(output: &Output, pretty: bool) -> Result<(), CliError> {
    println!("{}", to_json(output, pretty)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn warnings_are_omitted_when_empty() {
        let output =
            Output::new("goldbox", json!({"products": []}), 12, Vec::new()).expect("output");
        let rendered: Value =
            serde_json::from_str(&to_json(&output, false).expect("json")).expect("parse");

        assert_eq!(rendered["meta"]["command"], "goldbox");
        assert_eq!(rendered["meta"]["latency_ms"], 12);
        assert!(rendered["meta"].get("warnings").is_none());
        assert_eq!(rendered["data"]["products"], json!([]));
    }

    #[test]
    fn pretty_output_is_indented() {
        let output = Output::new(
            "deeplink",
            json!({"short_url": "https://link.coupang.com/a/x"}),
            3,
            vec![String::from("note")],
        )
        .expect("output");

        let pretty = to_json(&output, true).expect("json");
        assert!(pretty.contains("\n  \"meta\""));
        assert!(pretty.contains("\"warnings\""));
    }
}
