//! Subprocess executor for gateway commands.
//!
//! Spawns a command, feeds it an optional stdin payload, and parses its
//! stdout as JSON Lines / NDJSON.

use crate::agents::base::TransportError;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_stream::Stream;

pub type JsonLineStream = Pin<Box<dyn Stream<Item = Result<serde_json::Value, TransportError>> + Send>>;

/// A command line to run.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Written to stdin while stdout is read, after which stdin is closed.
    pub input: Option<String>,
}

pub struct CliExecutor;

impl CliExecutor {
    /// Execute a command and parse its stdout as JSON Lines.
    ///
    /// Empty lines are skipped. Lines that fail to parse yield
    /// `TransportError::StreamParse`. A non-zero exit yields a trailing
    /// `TransportError::Execution` carrying whatever the command wrote to
    /// stderr.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pf_core::agents::cli_executor::{CliExecutor, CommandSpec};
    /// use tokio_stream::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let stream = CliExecutor::execute(CommandSpec {
    ///         command: "echo".to_string(),
    ///         args: vec![r#"{"chunk":{"bytes":"hi"}}"#.to_string()],
    ///         ..Default::default()
    ///     });
    ///
    ///     let values: Vec<_> = stream.collect().await;
    ///     println!("Got {} values", values.len());
    /// }
    /// ```
    pub fn execute(spec: CommandSpec) -> JsonLineStream {
        let stream = async_stream::stream! {
            let CommandSpec { command, args, working_dir, input } = spec;

            let mut cmd = Command::new(&command);
            cmd.args(&args);
            if let Some(dir) = &working_dir {
                cmd.current_dir(dir);
            }
            cmd.stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() });
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
            cmd.kill_on_drop(true);

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    yield Err(TransportError::Execution(format!(
                        "Failed to spawn command '{}': {}",
                        command, e
                    )));
                    return;
                }
            };

            // Drain stderr on the side so a chatty command cannot block on a full pipe.
            let stderr_task = child.stderr.take().map(|mut stderr| {
                tokio::spawn(async move {
                    let mut text = String::new();
                    let _ = stderr.read_to_string(&mut text).await;
                    text
                })
            });

            // Feed stdin concurrently with reading stdout; a gateway may emit
            // output before it has consumed the whole request.
            let stdin_task = match (input, child.stdin.take()) {
                (Some(text), Some(mut stdin)) => Some(tokio::spawn(async move {
                    stdin.write_all(text.as_bytes()).await?;
                    stdin.shutdown().await
                })),
                _ => None,
            };

            let stdout = match child.stdout.take() {
                Some(stdout) => stdout,
                None => {
                    yield Err(TransportError::Execution(
                        "Failed to capture stdout".to_string()
                    ));
                    return;
                }
            };

            let mut lines = BufReader::new(stdout).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }

                        match serde_json::from_str::<serde_json::Value>(&line) {
                            Ok(value) => yield Ok(value),
                            Err(e) => {
                                yield Err(TransportError::StreamParse(format!(
                                    "Failed to parse JSON: {} (line: {})",
                                    e, line
                                )));
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(TransportError::StreamParse(e.to_string()));
                        break;
                    }
                }
            }

            // A gateway that exits without reading all of stdin closes the pipe;
            // its exit status decides the outcome then.
            if let Some(task) = stdin_task {
                match task.await {
                    Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                        yield Err(TransportError::Execution(format!(
                            "Failed to write request to '{}': {}",
                            command, e
                        )));
                    }
                    Err(e) => {
                        yield Err(TransportError::Execution(format!(
                            "Request writer for '{}' failed: {}",
                            command, e
                        )));
                    }
                    _ => {}
                }
            }

            let stderr_text = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };

            match child.wait().await {
                Ok(status) if !status.success() => {
                    yield Err(TransportError::Execution(format!(
                        "'{}' exited with {}: {}",
                        command,
                        status,
                        stderr_text.trim()
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    yield Err(TransportError::Execution(format!(
                        "Failed to wait for '{}': {}",
                        command, e
                    )));
                }
            }
        };

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn spec(command: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_execute_echo_json() {
        let stream = CliExecutor::execute(spec("echo", &[r#"{"type":"test","value":42}"#]));

        let values: Vec<_> = stream
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("Should parse JSON successfully");

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].get("type").and_then(|v| v.as_str()), Some("test"));
        assert_eq!(values[0].get("value").and_then(|v| v.as_i64()), Some(42));
    }

    #[tokio::test]
    async fn test_execute_feeds_stdin() {
        let mut cat = spec("cat", &[]);
        cat.input = Some("{\"chunk\":{\"bytes\":\"hello\"}}\n".to_string());

        let values: Vec<_> = CliExecutor::execute(cat)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .expect("Should parse JSON successfully");

        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["chunk"]["bytes"], "hello");
    }

    #[tokio::test]
    async fn test_execute_invalid_command() {
        let results: Vec<_> = CliExecutor::execute(spec("nonexistent-command-xyz", &[]))
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(TransportError::Execution(msg)) => {
                assert!(msg.contains("Failed to spawn command"))
            }
            other => panic!("Expected Execution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_parse_errors_and_skips_blank_lines() {
        let script = spec("sh", &["-c", "echo; echo 'not json'; echo; echo '{\"n\":1}'"]);
        let results: Vec<_> = CliExecutor::execute(script).collect().await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(TransportError::StreamParse(_))));
        assert_eq!(results[1].as_ref().ok().and_then(|v| v["n"].as_i64()), Some(1));
    }

    #[tokio::test]
    async fn test_execute_non_zero_exit() {
        let script = spec("sh", &["-c", "echo boom >&2; exit 3"]);
        let results: Vec<_> = CliExecutor::execute(script).collect().await;

        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(TransportError::Execution(msg)) => assert!(msg.contains("boom")),
            other => panic!("Expected Execution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_large_input_with_large_output_completes() {
        // Gateway fills its stdout pipe before reading any of the request.
        let mut script = spec(
            "sh",
            &[
                "-c",
                "i=0; while [ $i -lt 5000 ]; do echo '{\"chunk\":{\"bytes\":\"xxxxxxxxxxxxxxxxxxxxxxxx\"}}'; i=$((i+1)); done; cat > /dev/null",
            ],
        );
        script.input = Some("a".repeat(300 * 1024));

        let results = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            CliExecutor::execute(script).collect::<Vec<_>>(),
        )
        .await
        .expect("executor should not block on a full stdout pipe");

        assert_eq!(results.len(), 5000);
        assert!(results.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_gateway_ignoring_stdin_is_not_an_error() {
        let mut script = spec("sh", &["-c", "echo '{\"n\":1}'"]);
        script.input = Some("b".repeat(300 * 1024));

        let results: Vec<_> = CliExecutor::execute(script).collect().await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }
}
