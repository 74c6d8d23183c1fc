//! Runtime that reaches remote agents through a local gateway command.
//!
//! The gateway is any executable that accepts
//! `--agent-id <id> --agent-alias-id <alias> --session-id <sid> --region <r> [--enable-trace]`,
//! reads the request body on stdin and writes one JSON object per line:
//!
//! ```text
//! {"chunk":{"bytes":"APPROVED"}}
//! {"trace":{"orchestrationTrace":{...}}}
//! {"error":{"code":"ThrottlingException","message":"Rate exceeded"}}
//! ```

use crate::agents::base::{
    AgentRuntime, CompletionEvent, InvokeRequest, InvokeResponse, TransportError,
};
use crate::agents::cli_executor::{CliExecutor, CommandSpec};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio_stream::StreamExt;

pub struct ProcessRuntime {
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessRuntime {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            working_dir: None,
        }
    }

    /// Run the gateway in `dir` instead of the caller's directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn command_spec(&self, request: &InvokeRequest) -> CommandSpec {
        let mut args = self.args.clone();
        args.extend([
            "--agent-id".to_string(),
            request.agent_id.clone(),
            "--agent-alias-id".to_string(),
            request.alias_id.clone(),
            "--session-id".to_string(),
            request.session_id.clone(),
            "--region".to_string(),
            request.region.clone(),
        ]);
        if request.enable_trace {
            args.push("--enable-trace".to_string());
        }

        CommandSpec {
            command: self.command.clone(),
            args,
            working_dir: self.working_dir.clone(),
            input: Some(request.input_text.clone()),
        }
    }
}

/// One NDJSON line from the gateway.
#[derive(Debug, Deserialize)]
struct GatewayLine {
    chunk: Option<GatewayChunk>,
    trace: Option<serde_json::Value>,
    error: Option<GatewayError>,
}

#[derive(Debug, Deserialize)]
struct GatewayChunk {
    bytes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Convert one gateway line into a completion event.
///
/// Objects that are neither chunk, trace nor error become a chunk without
/// payload; the client decides whether that is acceptable.
fn convert_line(value: serde_json::Value) -> Result<CompletionEvent, TransportError> {
    let line: GatewayLine = serde_json::from_value(value)
        .map_err(|e| TransportError::StreamParse(format!("Unexpected gateway event: {}", e)))?;

    if let Some(error) = line.error {
        return Err(TransportError::Service {
            code: error.code,
            message: error.message,
        });
    }

    if let Some(chunk) = line.chunk {
        return Ok(CompletionEvent::Chunk {
            bytes: chunk.bytes.map(String::into_bytes),
        });
    }

    if let Some(trace) = line.trace {
        return Ok(CompletionEvent::Trace(trace));
    }

    Ok(CompletionEvent::empty())
}

#[async_trait]
impl AgentRuntime for ProcessRuntime {
    async fn check_availability(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, TransportError> {
        if !self.check_availability().await {
            return Err(TransportError::NotAvailable(format!(
                "Gateway command '{}' not found on PATH",
                self.command
            )));
        }

        let session_id = request.session_id.clone();
        let lines = CliExecutor::execute(self.command_spec(&request));
        let completion = lines.map(|line| line.and_then(convert_line));

        Ok(InvokeResponse {
            completion: Box::pin(completion),
            trace: None,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> InvokeRequest {
        InvokeRequest::new(
            "AGENT123".to_string(),
            "ALIAS456".to_string(),
            "payment_validator-abc".to_string(),
            "{\"Amount\":\"12.00\"}".to_string(),
            "eu-west-1".to_string(),
        )
    }

    #[test]
    fn test_command_spec_arguments() {
        let runtime = ProcessRuntime::new("gateway", vec!["invoke".to_string()]);
        let spec = runtime.command_spec(&request());

        assert_eq!(spec.command, "gateway");
        assert_eq!(
            spec.args,
            vec![
                "invoke",
                "--agent-id",
                "AGENT123",
                "--agent-alias-id",
                "ALIAS456",
                "--session-id",
                "payment_validator-abc",
                "--region",
                "eu-west-1",
                "--enable-trace",
            ]
        );
        assert_eq!(spec.input.as_deref(), Some("{\"Amount\":\"12.00\"}"));

        assert_eq!(spec.working_dir, None);

        let spec = runtime.command_spec(&request().with_trace(false));
        assert!(!spec.args.contains(&"--enable-trace".to_string()));

        let runtime = runtime.with_working_dir("/srv/gateway");
        let spec = runtime.command_spec(&request());
        assert_eq!(spec.working_dir, Some(std::path::PathBuf::from("/srv/gateway")));
    }

    #[test]
    fn test_convert_line_variants() {
        assert_eq!(
            convert_line(json!({"chunk": {"bytes": "CLEAR"}})),
            Ok(CompletionEvent::text("CLEAR"))
        );
        assert_eq!(
            convert_line(json!({"chunk": {}})),
            Ok(CompletionEvent::empty())
        );
        assert_eq!(
            convert_line(json!({"trace": {"step": 1}})),
            Ok(CompletionEvent::Trace(json!({"step": 1})))
        );
        assert_eq!(
            convert_line(json!({"returnControl": {}})),
            Ok(CompletionEvent::empty())
        );
        assert_eq!(
            convert_line(json!({"error": {"code": "ThrottlingException", "message": "slow down"}})),
            Err(TransportError::Service {
                code: "ThrottlingException".to_string(),
                message: "slow down".to_string(),
            })
        );
        assert!(matches!(
            convert_line(json!("just a string")),
            Err(TransportError::StreamParse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let runtime = ProcessRuntime::new("nonexistent-gateway-xyz", vec![]);
        assert!(!runtime.check_availability().await);

        let result = runtime.invoke(request()).await;
        assert!(matches!(result, Err(TransportError::NotAvailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invoke_through_shell_gateway() {
        use tokio_stream::StreamExt;

        // The script ignores its flags and echoes stdin back as a chunk.
        let script = r#"read body; printf '{"chunk":{"bytes":"got %s"}}\n' "$(echo "$body" | tr -d '"{}')"; echo '{"trace":{"ok":true}}'"#;
        let runtime = ProcessRuntime::new("sh", vec!["-c".to_string(), script.to_string(), "gateway".to_string()]);

        let response = runtime.invoke(request()).await.unwrap();
        assert_eq!(response.session_id, "payment_validator-abc");

        let events: Vec<_> = response.completion.collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Ok(CompletionEvent::text("got Amount:12.00")));
        assert_eq!(events[1], Ok(CompletionEvent::Trace(json!({"ok": true}))));
    }
}
