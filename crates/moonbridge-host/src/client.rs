use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::Bytes;

use crate::error::ExchangeError;

/// Cap on response bodies read into memory. Anything larger fails the
/// exchange instead of exhausting the host (or the display's RAM).
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Verbs the bridge forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Case-insensitive parse of a frame's method token. Unknown tokens are
    /// refused locally, never forwarded.
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("GET") {
            Some(HttpMethod::Get)
        } else if token.eq_ignore_ascii_case("POST") {
            Some(HttpMethod::Post)
        } else {
            None
        }
    }

    /// Canonical verb string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A completed HTTP exchange: upstream status and raw body bytes.
///
/// Upstream 4xx/5xx statuses are completions, not errors; the bridge
/// forwards them to the microcontroller like any other reply.
#[derive(Debug, Clone)]
pub struct HttpReply {
    /// Upstream status code.
    pub status: u16,
    /// Raw body bytes, capped at [`MAX_BODY_BYTES`].
    pub body: Bytes,
}

impl HttpReply {
    /// Body decoded as text for single-line replies.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Blocking HTTP seam shared by discovery probes and request dispatch.
pub trait HttpExchange {
    /// Perform one call, honoring `timeout` for the entire exchange.
    fn exchange(
        &self,
        method: HttpMethod,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<HttpReply, ExchangeError>;
}

/// Production implementation over a shared `ureq` agent. Clones share the
/// agent and its connection pool.
#[derive(Clone)]
pub struct UreqExchange {
    agent: ureq::Agent,
}

impl UreqExchange {
    /// Build an agent with default connection pooling.
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpExchange for UreqExchange {
    fn exchange(
        &self,
        method: HttpMethod,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<HttpReply, ExchangeError> {
        let request = self.agent.request(method.as_str(), url).timeout(timeout);
        let response = match request.call() {
            Ok(response) => response,
            // ureq reports upstream 4xx/5xx as Err; those are completed
            // exchanges as far as the bridge is concerned.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(classify_transport(transport, timeout));
            }
        };

        let status = response.status();
        let body = read_body(response)?;
        Ok(HttpReply { status, body })
    }
}

fn read_body(response: ureq::Response) -> std::result::Result<Bytes, ExchangeError> {
    let mut buf = Vec::new();
    let mut reader = response.into_reader().take(MAX_BODY_BYTES as u64 + 1);
    reader
        .read_to_end(&mut buf)
        .map_err(|err| ExchangeError::Failed(format!("reading body: {err}")))?;
    if buf.len() > MAX_BODY_BYTES {
        return Err(ExchangeError::Failed(format!(
            "response body exceeds {MAX_BODY_BYTES} bytes"
        )));
    }
    Ok(Bytes::from(buf))
}

fn classify_transport(transport: ureq::Transport, timeout: Duration) -> ExchangeError {
    if has_timeout_source(&transport) {
        ExchangeError::TimedOut(timeout)
    } else {
        ExchangeError::Failed(transport.to_string())
    }
}

/// Walk the error chain looking for a timed-out socket read; ureq surfaces
/// both connect and read timeouts as transport errors with an io source.
fn has_timeout_source(transport: &ureq::Transport) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(transport);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = err.source();
    }
    false
}
