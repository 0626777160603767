//! Query bridge backed by an external command

use crate::{BridgeConfig, ColumnValue, QueryBridge, QueryError, QueryRow, Result, SimpleSelect};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use taskfilter_core::TaskNumber;
use tracing::{debug, warn};

/// Exit code the command uses to reject an expression
pub const EXIT_MALFORMED_EXPRESSION: i32 = 2;

/// Runs the configured command once per query
///
/// The [`SimpleSelect`] is written to stdin as JSON. Each non-empty stdout line must
/// be a [`QueryRow`]. Exit code [`EXIT_MALFORMED_EXPRESSION`] reports a bad
/// expression with the message on stderr; any other failure means the store is
/// unavailable.
#[derive(Debug, Clone)]
pub struct CommandBridge {
    config: BridgeConfig,
    base_dir: PathBuf,
}

impl CommandBridge {
    /// Create a new command bridge
    ///
    /// # Arguments
    ///
    /// * `config` - Bridge configuration
    /// * `base_dir` - Directory relative command paths resolve against
    #[must_use]
    pub const fn new(config: BridgeConfig, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn resolve_command(&self) -> Result<PathBuf> {
        let command = self
            .config
            .command
            .as_ref()
            .ok_or_else(|| QueryError::StoreUnavailable("no query command configured".into()))?;
        let path = if command.is_absolute() {
            command.clone()
        } else {
            self.base_dir.join(command)
        };
        if path.exists() {
            Ok(path)
        } else {
            Err(QueryError::StoreUnavailable(format!(
                "query command not found: {}",
                path.display()
            )))
        }
    }

    fn run(&self, command: &Path, select: &SimpleSelect) -> Result<Output> {
        let input_json = serde_json::to_string(select)?;
        let mut child = Command::new(command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                QueryError::StoreUnavailable(format!(
                    "failed to start {}: {err}",
                    command.display()
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input_json.as_bytes()) {
                Ok(()) => {}
                // The command exited without reading; its exit status tells why.
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    debug!("query command closed stdin early");
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
            }
        }

        wait_with_timeout(&mut child, Duration::from_secs(self.config.timeout))
    }
}

impl QueryBridge for CommandBridge {
    fn map_tasks(
        &self,
        select: &SimpleSelect,
        consumer: &mut dyn FnMut(TaskNumber, ColumnValue),
    ) -> Result<()> {
        let command = self.resolve_command()?;
        debug!(
            command = %command.display(),
            expression = ?select.where_expression,
            "running query command"
        );
        let output = self.run(&command, select)?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        match output.status.code() {
            Some(0) => {}
            Some(EXIT_MALFORMED_EXPRESSION) => {
                return Err(QueryError::MalformedExpression {
                    expression: select.where_expression.clone().unwrap_or_default(),
                    message: stderr,
                });
            }
            code => {
                let code = code.map_or_else(|| "signal".to_owned(), |code| code.to_string());
                return Err(QueryError::StoreUnavailable(format!(
                    "query command exited with {code}: {stderr}"
                )));
            }
        }
        if !stderr.is_empty() {
            warn!(%stderr, "query command wrote to stderr");
        }

        // Parse everything before handing rows out so a bad line yields no partial result.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let rows = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str::<QueryRow>(line)
                    .map_err(|err| QueryError::Protocol(format!("{line}: {err}")))
            })
            .collect::<Result<Vec<_>>>()?;
        for row in rows {
            consumer(row.task_number, row.value);
        }
        Ok(())
    }
}

struct Output {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Wait for a child process with timeout
///
/// # Errors
///
/// Returns `QueryError::Timeout` if the process doesn't complete within the timeout
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output> {
    // Drain pipes on helper threads so a chatty command cannot block on a full pipe.
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let poll_interval = Duration::from_millis(20);

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(QueryError::Timeout(timeout.as_secs()));
        }
        std::thread::sleep(poll_interval);
    };

    Ok(Output {
        status,
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<std::thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_means_store_unavailable() {
        let bridge = CommandBridge::new(BridgeConfig::default(), PathBuf::from("."));
        let err = bridge
            .map_tasks(&SimpleSelect::task_numbers(Some("x")), &mut |_, _| {})
            .err();
        assert!(matches!(err, Some(QueryError::StoreUnavailable(_))));
    }

    #[test]
    fn nonexistent_command_means_store_unavailable() {
        let config = BridgeConfig {
            command: Some(PathBuf::from("does-not-exist")),
            ..BridgeConfig::default()
        };
        let bridge = CommandBridge::new(config, PathBuf::from("/nonexistent-taskfilter-dir"));
        let Err(QueryError::StoreUnavailable(message)) =
            bridge.map_tasks(&SimpleSelect::task_numbers(None), &mut |_, _| {})
        else {
            panic!("expected store unavailable");
        };
        assert!(message.contains("not found"));
    }
}
