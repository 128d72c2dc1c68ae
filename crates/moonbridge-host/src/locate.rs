use std::time::Duration;

use tracing::{debug, info};

use crate::client::{HttpExchange, HttpMethod};
use crate::error::{HostError, Result};
use crate::target::HostTarget;

/// Health-check path that must answer 200 when the host is ready.
pub const HEALTH_CHECK_PATH: &str = "/printer/info";

/// Whole-call timeout for one candidate probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default scheme when none is configured.
pub const DEFAULT_SCHEME: &str = "http";

/// Default host when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Well-known port probed before the application default.
pub const FALLBACK_PORT: u16 = 80;

/// Moonraker's default application port, probed last.
pub const MOONRAKER_PORT: u16 = 7125;

/// Optional host overrides from flags or environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOverrides {
    /// URL scheme override.
    pub scheme: Option<String>,
    /// Host name override.
    pub host: Option<String>,
    /// Explicit port; makes the first candidate.
    pub port: Option<u16>,
}

/// Candidate targets in probe order: the explicit configuration first when a
/// port override is present, then port 80, then Moonraker's 7125. The list
/// is not deduplicated; order is the contract.
pub fn candidates(overrides: &HostOverrides) -> Vec<HostTarget> {
    let scheme = overrides.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
    let host = overrides.host.as_deref().unwrap_or(DEFAULT_HOST);

    let mut list = Vec::with_capacity(3);
    if let Some(port) = overrides.port {
        list.push(HostTarget::new(scheme, host, port));
    }
    list.push(HostTarget::new(scheme, host, FALLBACK_PORT));
    list.push(HostTarget::new(scheme, host, MOONRAKER_PORT));
    list
}

/// Probe candidates in order and return the first that answers the health
/// check with 200. Probe errors and non-200 answers reject the candidate
/// without raising; the first acceptance wins and stops the scan.
pub fn locate_host<C: HttpExchange>(client: &C, overrides: &HostOverrides) -> Result<HostTarget> {
    let tried = candidates(overrides);
    for target in &tried {
        let url = target.url_for(HEALTH_CHECK_PATH);
        debug!(%target, "probing printer host");
        match client.exchange(HttpMethod::Get, &url, PROBE_TIMEOUT) {
            Ok(reply) if reply.status == 200 => {
                info!(%target, "printer host accepted");
                return Ok(target.clone());
            }
            Ok(reply) => {
                debug!(%target, status = reply.status, "candidate rejected");
            }
            Err(err) => {
                debug!(%target, error = %err, "candidate unreachable");
            }
        }
    }
    Err(HostError::Unreachable { tried })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use bytes::Bytes;

    use super::*;
    use crate::client::HttpReply;
    use crate::error::ExchangeError;

    /// Scripted exchange: answers per URL and records the probe order.
    struct ScriptedExchange {
        up: Vec<(String, u16)>,
        probed: RefCell<Vec<String>>,
    }

    impl ScriptedExchange {
        fn new(up: Vec<(&str, u16)>) -> Self {
            Self {
                up: up.into_iter().map(|(u, s)| (u.to_string(), s)).collect(),
                probed: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpExchange for ScriptedExchange {
        fn exchange(
            &self,
            _method: HttpMethod,
            url: &str,
            _timeout: Duration,
        ) -> std::result::Result<HttpReply, ExchangeError> {
            self.probed.borrow_mut().push(url.to_string());
            match self.up.iter().find(|(u, _)| u == url) {
                Some((_, status)) => Ok(HttpReply {
                    status: *status,
                    body: Bytes::new(),
                }),
                None => Err(ExchangeError::Failed("connection refused".to_string())),
            }
        }
    }

    #[test]
    fn candidates_without_overrides() {
        let list = candidates(&HostOverrides::default());
        assert_eq!(
            list,
            vec![
                HostTarget::new("http", "localhost", 80),
                HostTarget::new("http", "localhost", 7125),
            ]
        );
    }

    #[test]
    fn candidates_with_port_override_come_first() {
        let overrides = HostOverrides {
            host: Some("printer.lan".to_string()),
            port: Some(9999),
            ..HostOverrides::default()
        };
        let list = candidates(&overrides);
        assert_eq!(
            list,
            vec![
                HostTarget::new("http", "printer.lan", 9999),
                HostTarget::new("http", "printer.lan", 80),
                HostTarget::new("http", "printer.lan", 7125),
            ]
        );
    }

    #[test]
    fn scheme_override_applies_to_every_candidate() {
        let overrides = HostOverrides {
            scheme: Some("https".to_string()),
            ..HostOverrides::default()
        };
        for target in candidates(&overrides) {
            assert_eq!(target.scheme, "https");
        }
    }

    #[test]
    fn probes_in_order_and_stops_at_first_acceptance() {
        let overrides = HostOverrides {
            host: Some("a".to_string()),
            port: Some(9999),
            ..HostOverrides::default()
        };
        let client = ScriptedExchange::new(vec![("http://a:7125/printer/info", 200)]);

        let target = locate_host(&client, &overrides).unwrap();

        assert_eq!(target, HostTarget::new("http", "a", 7125));
        assert_eq!(
            *client.probed.borrow(),
            vec![
                "http://a:9999/printer/info",
                "http://a:80/printer/info",
                "http://a:7125/printer/info",
            ]
        );
    }

    #[test]
    fn acceptance_short_circuits_later_candidates() {
        let client = ScriptedExchange::new(vec![
            ("http://localhost:80/printer/info", 200),
            ("http://localhost:7125/printer/info", 200),
        ]);

        let target = locate_host(&client, &HostOverrides::default()).unwrap();

        assert_eq!(target.port, 80);
        assert_eq!(client.probed.borrow().len(), 1);
    }

    #[test]
    fn non_200_rejects_the_candidate() {
        let client = ScriptedExchange::new(vec![
            ("http://localhost:80/printer/info", 503),
            ("http://localhost:7125/printer/info", 200),
        ]);

        let target = locate_host(&client, &HostOverrides::default()).unwrap();

        assert_eq!(target.port, 7125);
        assert_eq!(client.probed.borrow().len(), 2);
    }

    #[test]
    fn all_rejected_is_unreachable_with_the_tried_list() {
        let client = ScriptedExchange::new(vec![]);

        let err = locate_host(&client, &HostOverrides::default()).unwrap_err();

        let HostError::Unreachable { tried } = err;
        assert_eq!(tried.len(), 2);
        assert_eq!(client.probed.borrow().len(), 2);
    }
}
