use std::time::Duration;

use moonbridge_frame::codec::{RequestFrame, ResponseFrame, ResponseMode};
use tracing::{debug, warn};

use crate::client::{HttpExchange, HttpMethod};
use crate::error::ExchangeError;
use crate::target::HostTarget;

/// What the bridge should do with a dispatched frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Write this reply back over the link.
    Reply(ResponseFrame),
    /// The call timed out; nothing is written back.
    Dropped(Duration),
}

/// Forward one request frame to the printer host.
///
/// Unsupported methods are answered locally without touching the network.
/// Timeouts drop the frame; any other transport failure is answered with a
/// 500 encoded for the frame's response mode.
pub fn dispatch<C: HttpExchange>(
    client: &C,
    target: &HostTarget,
    frame: &RequestFrame,
) -> DispatchOutcome {
    let method = match HttpMethod::parse(&frame.method) {
        Some(method) => method,
        None => {
            debug!(method = %frame.method, "unsupported request type");
            return DispatchOutcome::Reply(ResponseFrame::unsupported_method());
        }
    };

    let url = target.url_for(&frame.path);
    let timeout = frame.effective_timeout();
    debug!(%url, ?timeout, "forwarding request");

    match client.exchange(method, &url, timeout) {
        Ok(reply) => DispatchOutcome::Reply(match frame.mode {
            ResponseMode::Text => ResponseFrame::Text {
                status: reply.status,
                body: reply.body_text(),
            },
            ResponseMode::Binary => ResponseFrame::Binary {
                status: reply.status,
                body: reply.body,
            },
        }),
        Err(ExchangeError::TimedOut(elapsed)) => {
            debug!(%url, ?elapsed, "request timed out");
            DispatchOutcome::Dropped(elapsed)
        }
        Err(ExchangeError::Failed(reason)) => {
            warn!(%url, %reason, "request failed");
            DispatchOutcome::Reply(ResponseFrame::request_failed(frame.mode))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use bytes::Bytes;

    use super::*;
    use crate::client::HttpReply;

    /// Records every exchange and answers with a fixed script.
    struct RecordingExchange {
        result: std::result::Result<HttpReply, ExchangeError>,
        calls: RefCell<Vec<(HttpMethod, String, Duration)>>,
    }

    impl RecordingExchange {
        fn replying(status: u16, body: &[u8]) -> Self {
            Self {
                result: Ok(HttpReply {
                    status,
                    body: Bytes::copy_from_slice(body),
                }),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(err: ExchangeError) -> Self {
            Self {
                result: Err(err),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpExchange for RecordingExchange {
        fn exchange(
            &self,
            method: HttpMethod,
            url: &str,
            timeout: Duration,
        ) -> std::result::Result<HttpReply, ExchangeError> {
            self.calls.borrow_mut().push((method, url.to_string(), timeout));
            match &self.result {
                Ok(reply) => Ok(reply.clone()),
                Err(ExchangeError::TimedOut(d)) => Err(ExchangeError::TimedOut(*d)),
                Err(ExchangeError::Failed(msg)) => Err(ExchangeError::Failed(msg.clone())),
            }
        }
    }

    fn target() -> HostTarget {
        HostTarget::new("http", "localhost", 7125)
    }

    fn text_frame(timeout_ms: i64, method: &str, path: &str) -> RequestFrame {
        RequestFrame {
            timeout_ms,
            mode: ResponseMode::Text,
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn get_is_forwarded_with_the_frame_timeout() {
        let client = RecordingExchange::replying(200, b"{\"result\": {}}");
        let frame = text_frame(2000, "GET", "/printer/info");

        let outcome = dispatch(&client, &target(), &frame);

        assert_eq!(
            outcome,
            DispatchOutcome::Reply(ResponseFrame::Text {
                status: 200,
                body: "{\"result\": {}}".to_string(),
            })
        );
        let calls = client.calls.borrow();
        assert_eq!(
            *calls,
            vec![(
                HttpMethod::Get,
                "http://localhost:7125/printer/info".to_string(),
                Duration::from_millis(2000),
            )]
        );
    }

    #[test]
    fn method_match_is_case_insensitive() {
        let client = RecordingExchange::replying(200, b"ok");
        let frame = text_frame(500, "post", "/printer/gcode/script?script=M115");

        let outcome = dispatch(&client, &target(), &frame);

        assert!(matches!(outcome, DispatchOutcome::Reply(_)));
        assert_eq!(client.calls.borrow()[0].0, HttpMethod::Post);
    }

    #[test]
    fn unsupported_method_answers_locally_without_a_call() {
        let client = RecordingExchange::replying(200, b"never seen");
        let frame = text_frame(2000, "DELETE", "/printer/info");

        let outcome = dispatch(&client, &target(), &frame);

        assert_eq!(
            outcome,
            DispatchOutcome::Reply(ResponseFrame::unsupported_method())
        );
        assert!(client.calls.borrow().is_empty());
    }

    #[test]
    fn non_positive_timeout_still_calls_with_the_default() {
        let client = RecordingExchange::replying(200, b"ok");
        let frame = text_frame(0, "GET", "/printer/info");

        let outcome = dispatch(&client, &target(), &frame);

        assert!(matches!(outcome, DispatchOutcome::Reply(_)));
        assert_eq!(client.calls.borrow()[0].2, Duration::from_millis(1000));
    }

    #[test]
    fn binary_frame_keeps_the_raw_body() {
        let payload = b"\x00\x01\xfe\xff";
        let client = RecordingExchange::replying(200, payload);
        let frame = RequestFrame {
            timeout_ms: 3000,
            mode: ResponseMode::Binary,
            method: "GET".to_string(),
            path: "/server/files/config/printer.cfg".to_string(),
        };

        let outcome = dispatch(&client, &target(), &frame);

        assert_eq!(
            outcome,
            DispatchOutcome::Reply(ResponseFrame::Binary {
                status: 200,
                body: Bytes::copy_from_slice(payload),
            })
        );
    }

    #[test]
    fn timeout_drops_the_frame() {
        let client = RecordingExchange::failing(ExchangeError::TimedOut(Duration::from_millis(800)));
        let frame = text_frame(800, "GET", "/printer/info");

        let outcome = dispatch(&client, &target(), &frame);

        assert_eq!(outcome, DispatchOutcome::Dropped(Duration::from_millis(800)));
    }

    #[test]
    fn transport_failure_answers_500_in_text_mode() {
        let client = RecordingExchange::failing(ExchangeError::Failed("connection refused".into()));
        let frame = text_frame(2000, "GET", "/printer/info");

        let outcome = dispatch(&client, &target(), &frame);

        assert_eq!(
            outcome,
            DispatchOutcome::Reply(ResponseFrame::Text {
                status: 500,
                body: "Request failed".to_string(),
            })
        );
    }

    #[test]
    fn transport_failure_answers_the_sentinel_in_binary_mode() {
        let client = RecordingExchange::failing(ExchangeError::Failed("connection refused".into()));
        let frame = RequestFrame {
            timeout_ms: 2000,
            mode: ResponseMode::Binary,
            method: "POST".to_string(),
            path: "/server/files/upload".to_string(),
        };

        let outcome = dispatch(&client, &target(), &frame);

        match outcome {
            DispatchOutcome::Reply(reply) => {
                assert_eq!(reply.status(), 500);
                assert_eq!(reply.encode().unwrap(), b"00000000");
            }
            other => panic!("expected a reply, got {other:?}"),
        }
    }
}
