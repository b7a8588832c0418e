use anyhow::Context as _;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Minimal MCP client speaking line-delimited JSON-RPC to a child process over stdio.
///
/// Exists only for integration tests; it performs the `initialize` handshake and then lets
/// the test issue raw requests.
pub struct McpStdioSession {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl McpStdioSession {
    /// Spawn `command` with piped stdio and complete the MCP handshake.
    ///
    /// The child is killed when the session is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the handshake fails or times out.
    pub async fn spawn(mut command: Command, timeout_dur: Duration) -> anyhow::Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawn MCP server")?;

        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = child.stdout.take().context("child stdout")?;
        let mut session = Self {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let init = session
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "dao3-integration-tests", "version": "0" }
                }),
                timeout_dur,
            )
            .await?;
        anyhow::ensure!(init.get("result").is_some(), "initialize failed: {init}");

        session
            .send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;

        Ok(session)
    }

    /// Send a request and wait for the response carrying the same `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails, the server closes stdout, or the timeout elapses.
    pub async fn request(
        &mut self,
        id: u64,
        method: &str,
        params: Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<Value> {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        tokio::time::timeout(timeout_dur, self.read_response(id))
            .await
            .with_context(|| format!("timed out waiting for {method} response"))?
    }

    async fn send(&mut self, msg: &Value) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(msg)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self, id: u64) -> anyhow::Result<Value> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .context("MCP server closed stdout")?;
            if line.trim().is_empty() {
                continue;
            }
            let msg: Value = serde_json::from_str(&line)
                .with_context(|| format!("non-JSON line on stdout: {line}"))?;
            // Skip server notifications and unrelated responses.
            if msg.get("id") == Some(&json!(id)) {
                return Ok(msg);
            }
        }
    }
}

/// `result.content[0].text` of a `tools/call` response.
///
/// # Errors
///
/// Returns an error if the message is not a successful JSON-RPC response with text content.
pub fn tool_call_text(msg: &Value) -> anyhow::Result<&str> {
    msg.get("result")
        .and_then(|r| r.get("content"))
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .with_context(|| format!("tools/call response missing content[0].text: {msg}"))
}

/// `result.isError` of a `tools/call` response, `false` when absent.
#[must_use]
pub fn tool_call_is_error(msg: &Value) -> bool {
    msg.get("result")
        .and_then(|r| r.get("isError"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
