//! Server session: composes registry, dispatcher, and transport into the
//! request/response loop.
//!
//! A session is single-use and moves through
//! `Uninitialized -> Listening -> Draining -> Stopped`, never backwards.
//! Dispatch is strictly sequential: one request is fully handled and its
//! response flushed before the next line is read, so response order always
//! matches arrival order.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::domains::tools::{Dispatcher, ToolRegistry};

use super::error::{Error, Result};
use super::protocol::{
    decode_line, CapabilityListing, Decoded, ErrorKind, Outcome, Request, Response,
};
use super::transport::StdioTransport;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Listening,
    Draining,
    Stopped,
}

/// One stdio serving session over a fixed tool registry.
pub struct ServerSession {
    name: String,
    dispatcher: Dispatcher,
    state: SessionState,
}

impl ServerSession {
    /// Build a session over a fully registered registry. The registry is
    /// read-only from here on.
    pub fn new(name: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            dispatcher: Dispatcher::new(Arc::new(registry)),
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run over the process's standard streams until stdin closes or an
    /// interrupt arrives.
    pub async fn run_stdio(&mut self) -> Result<()> {
        self.run(tokio::io::stdin(), tokio::io::stdout(), interrupt())
            .await
    }

    /// Run the session loop over arbitrary streams. `shutdown` resolving
    /// has the same effect as the input stream closing: stop reading,
    /// finish the request in flight, exit cleanly.
    pub async fn run<R, W, S>(&mut self, reader: R, writer: W, shutdown: S) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        if self.state != SessionState::Uninitialized {
            return Err(Error::Session("session is single-use".to_string()));
        }

        let mut transport = StdioTransport::new(reader, writer);
        self.state = SessionState::Listening;
        info!(server = %self.name, tools = self.dispatcher.handle_list_capabilities().len(), "session listening");

        tokio::pin!(shutdown);
        loop {
            let raw = tokio::select! {
                message = transport.read_message() => match message? {
                    Some(raw) => raw,
                    None => {
                        debug!("input stream closed");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    info!(server = %self.name, "shutdown signal received");
                    break;
                }
            };

            match decode_line(&raw) {
                Decoded::Request(Request::ListCapabilities { id }) => {
                    let tools = self
                        .dispatcher
                        .handle_list_capabilities()
                        .into_iter()
                        .map(|d| serde_json::to_value(d))
                        .collect::<std::result::Result<Vec<Value>, _>>()
                        .map_err(super::transport::TransportError::from)?;
                    transport
                        .write_message(&CapabilityListing { id, tools })
                        .await?;
                }
                Decoded::Request(Request::Call(call)) => {
                    let outcome = self
                        .dispatcher
                        .handle_call(&call.tool_name, &call.arguments)
                        .await;
                    transport
                        .write_message(&Response {
                            id: call.id,
                            outcome,
                        })
                        .await?;
                }
                Decoded::Malformed { id, reason } => {
                    warn!(%reason, "malformed message");
                    transport
                        .write_message(&Response {
                            id,
                            outcome: Outcome::failure(ErrorKind::ProtocolError, reason),
                        })
                        .await?;
                }
            }
        }

        self.state = SessionState::Draining;
        debug!(server = %self.name, "session draining");
        // Sequential dispatch: nothing is in flight once the loop exits.
        self.state = SessionState::Stopped;
        info!(server = %self.name, "session stopped");
        Ok(())
    }
}

/// Resolves when the process receives an interrupt.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for interrupt");
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::ContentItem;
    use crate::domains::tools::{
        ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments,
    };
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct PingParams {}

    #[derive(Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct EchoParams {
        text: String,
    }

    struct PingHandler;

    #[async_trait]
    impl ToolHandler for PingHandler {
        async fn invoke(&self, _args: ValidatedArguments) -> ToolResult {
            Ok(vec![ContentItem::text("pong")])
        }
    }

    struct EchoHandler;

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
            let params: EchoParams = args.parse()?;
            Ok(vec![ContentItem::text(params.text)])
        }
    }

    fn test_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDescriptor::new::<PingParams>("ping", "Reply with pong"),
                Arc::new(PingHandler),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new::<EchoParams>("echo", "Echo text back"),
                Arc::new(EchoHandler),
            )
            .unwrap();
        registry
    }

    /// Run a whole session over in-memory streams and return the emitted
    /// response lines as JSON values.
    async fn run_session(input: &str) -> (Vec<Value>, SessionState) {
        let mut session = ServerSession::new("test", test_registry());
        let mut output = Vec::new();
        session
            .run(input.as_bytes(), &mut output, std::future::pending())
            .await
            .unwrap();
        let state = session.state();
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (lines, state)
    }

    #[tokio::test]
    async fn ping_round_trip_matches_wire_contract() {
        let (responses, _) =
            run_session("{\"id\":\"1\",\"toolName\":\"ping\",\"arguments\":{}}\n").await;
        assert_eq!(
            responses,
            vec![json!({
                "id": "1",
                "outcome": {"status": "ok", "content": [{"kind": "text", "value": "pong"}]}
            })]
        );
    }

    #[tokio::test]
    async fn unknown_tool_yields_unknown_tool_error() {
        let (responses, _) =
            run_session("{\"id\":\"2\",\"toolName\":\"nonexistent\",\"arguments\":{}}\n").await;
        assert_eq!(responses[0]["id"], json!("2"));
        assert_eq!(responses[0]["outcome"]["status"], json!("error"));
        assert_eq!(responses[0]["outcome"]["errorKind"], json!("UnknownTool"));
    }

    #[tokio::test]
    async fn missing_required_argument_names_the_parameter() {
        let (responses, _) =
            run_session("{\"id\":\"3\",\"toolName\":\"echo\",\"arguments\":{}}\n").await;
        assert_eq!(
            responses[0]["outcome"]["errorKind"],
            json!("InvalidArguments")
        );
        let message = responses[0]["outcome"]["message"].as_str().unwrap();
        assert!(message.contains("text"));
    }

    #[tokio::test]
    async fn responses_preserve_arrival_order() {
        let input = "\
            {\"id\":\"r1\",\"toolName\":\"ping\",\"arguments\":{}}\n\
            {\"id\":\"r2\",\"toolName\":\"echo\",\"arguments\":{\"text\":\"two\"}}\n\
            {\"id\":\"r3\",\"toolName\":\"ping\",\"arguments\":{}}\n";
        let (responses, _) = run_session(input).await;
        let ids: Vec<_> = responses.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("r1"), json!("r2"), json!("r3")]);
    }

    #[tokio::test]
    async fn list_capabilities_reports_registration_order() {
        let (responses, _) = run_session("{\"id\":\"0\",\"op\":\"list_capabilities\"}\n").await;
        let tools = responses[0]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], json!("ping"));
        assert_eq!(tools[1]["name"], json!("echo"));
        assert!(tools[0]["inputSchema"].is_object());
        assert_eq!(tools[0]["description"], json!("Reply with pong"));
    }

    #[tokio::test]
    async fn malformed_line_answers_with_protocol_error() {
        let (responses, _) = run_session("this is not json\n").await;
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["outcome"]["errorKind"], json!("ProtocolError"));
    }

    #[tokio::test]
    async fn malformed_line_salvages_the_id() {
        let (responses, _) = run_session("{\"id\":\"x9\",\"nonsense\":1}\n").await;
        assert_eq!(responses[0]["id"], json!("x9"));
        assert_eq!(responses[0]["outcome"]["errorKind"], json!("ProtocolError"));
    }

    #[tokio::test]
    async fn session_recovers_after_malformed_and_failing_calls() {
        let input = "\
            garbage\n\
            {\"id\":\"a\",\"toolName\":\"nope\",\"arguments\":{}}\n\
            {\"id\":\"b\",\"toolName\":\"ping\",\"arguments\":{}}\n";
        let (responses, state) = run_session(input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2]["outcome"]["status"], json!("ok"));
        assert_eq!(state, SessionState::Stopped);
    }

    #[tokio::test]
    async fn eof_with_no_pending_requests_is_clean_shutdown() {
        let (responses, state) = run_session("").await;
        assert!(responses.is_empty());
        assert_eq!(state, SessionState::Stopped);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_session() {
        let mut session = ServerSession::new("test", test_registry());
        let (_tx, rx) = tokio::sync::oneshot::channel::<()>();
        drop(_tx);
        let shutdown = async move {
            let _ = rx.await;
        };
        // Reader that never produces data: the shutdown future must win.
        let (reader, _writer_keepalive) = tokio::io::duplex(64);
        let mut output = Vec::new();
        session.run(reader, &mut output, shutdown).await.unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn session_is_single_use() {
        let mut session = ServerSession::new("test", test_registry());
        let mut output = Vec::new();
        session
            .run("".as_bytes(), &mut output, std::future::pending())
            .await
            .unwrap();
        let err = session
            .run("".as_bytes(), &mut Vec::new(), std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("single-use"));
    }
}
