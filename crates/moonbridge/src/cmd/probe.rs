use moonbridge_host::client::{HttpExchange, HttpMethod, UreqExchange};
use moonbridge_host::locate::{candidates, HEALTH_CHECK_PATH, PROBE_TIMEOUT};
use moonbridge_host::HostOverrides;
use serde::Serialize;

use crate::cmd::ProbeArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct ProbeAttempt {
    target: String,
    outcome: String,
    accepted: bool,
}

#[derive(Debug, Serialize)]
struct ProbeOutput {
    schema_id: &'static str,
    attempts: Vec<ProbeAttempt>,
    selected: Option<String>,
}

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let overrides = HostOverrides {
        scheme: args.scheme,
        host: args.host,
        port: args.port,
    };

    let output = probe_candidates(&UreqExchange::new(), &overrides);
    print_probe(&output, format);

    if output.selected.is_some() {
        Ok(SUCCESS)
    } else {
        Ok(HEALTH_CHECK_FAILED)
    }
}

/// Walk the candidate list in locator order, recording every attempt. The
/// first acceptance stops the walk, exactly as the bridge's locator would.
fn probe_candidates<C: HttpExchange>(client: &C, overrides: &HostOverrides) -> ProbeOutput {
    let mut attempts = Vec::new();
    let mut selected = None;

    for target in candidates(overrides) {
        let url = target.url_for(HEALTH_CHECK_PATH);
        let (outcome, accepted) = match client.exchange(HttpMethod::Get, &url, PROBE_TIMEOUT) {
            Ok(reply) if reply.status == 200 => ("accepted".to_string(), true),
            Ok(reply) => (format!("rejected (status {})", reply.status), false),
            Err(err) => (format!("unreachable ({err})"), false),
        };
        attempts.push(ProbeAttempt {
            target: target.to_string(),
            outcome,
            accepted,
        });
        if accepted {
            selected = Some(target.to_string());
            break;
        }
    }

    ProbeOutput {
        schema_id: "https://schemas.3leaps.dev/moonbridge/cli/v1/probe-report.schema.json",
        attempts,
        selected,
    }
}

fn print_probe(output: &ProbeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("moonbridge probe\n");
            for attempt in &output.attempts {
                let mark = if attempt.accepted { "ok" } else { "--" };
                println!("  [{mark}] {:<24} {}", attempt.target, attempt.outcome);
            }
            match &output.selected {
                Some(target) => println!("\n  Selected: {target}"),
                None => println!("\n  Selected: none (no candidate answered the health check)"),
            }
        }
        OutputFormat::Raw => match &output.selected {
            Some(target) => println!("{target}"),
            None => println!("none"),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use moonbridge_host::client::HttpReply;
    use moonbridge_host::error::ExchangeError;

    use super::*;

    struct OnlyMoonrakerUp;

    impl HttpExchange for OnlyMoonrakerUp {
        fn exchange(
            &self,
            _method: HttpMethod,
            url: &str,
            _timeout: Duration,
        ) -> Result<HttpReply, ExchangeError> {
            if url.contains(":7125") {
                Ok(HttpReply {
                    status: 200,
                    body: bytes::Bytes::new(),
                })
            } else {
                Err(ExchangeError::Failed("connection refused".to_string()))
            }
        }
    }

    struct NothingUp;

    impl HttpExchange for NothingUp {
        fn exchange(
            &self,
            _method: HttpMethod,
            _url: &str,
            _timeout: Duration,
        ) -> Result<HttpReply, ExchangeError> {
            Err(ExchangeError::Failed("connection refused".to_string()))
        }
    }

    #[test]
    fn records_attempts_until_the_first_acceptance() {
        let output = probe_candidates(&OnlyMoonrakerUp, &HostOverrides::default());

        assert_eq!(output.attempts.len(), 2);
        assert!(!output.attempts[0].accepted);
        assert!(output.attempts[1].accepted);
        assert_eq!(output.selected.as_deref(), Some("http://localhost:7125"));
    }

    #[test]
    fn no_acceptance_leaves_nothing_selected() {
        let overrides = HostOverrides {
            port: Some(9999),
            ..HostOverrides::default()
        };
        let output = probe_candidates(&NothingUp, &overrides);

        assert_eq!(output.attempts.len(), 3);
        assert!(output.selected.is_none());
    }

    #[test]
    fn probe_report_serializes() {
        let output = probe_candidates(&NothingUp, &HostOverrides::default());
        let json = serde_json::to_string(&output).expect("probe output should serialize");
        assert!(json.contains("\"selected\":null"));
    }
}
