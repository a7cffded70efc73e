use crate::Buck2CliOpsError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default per-command timeout. Cold `buck2` daemons can take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw command output from a buck2 subprocess.
#[derive(Debug, Clone)]
pub struct CommandRunOutput {
    pub stdout: String,
}

/// Responsible for locating and executing the buck2 CLI.
#[derive(Debug, Clone)]
pub struct Buck2CommandRunner {
    executable: String,
    timeout_secs: u64,
}

impl Default for Buck2CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Buck2CommandRunner {
    pub fn new() -> Self {
        Self {
            executable: resolve_buck2_executable(None),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Use an explicit executable, falling back to discovery when blank.
    pub fn with_executable(executable: &str) -> Self {
        Self {
            executable: resolve_buck2_executable(Some(executable)),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub async fn run(
        &self,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<CommandRunOutput, Buck2CliOpsError> {
        let command_repr = format!("{} {}", self.executable, args.join(" "));
        debug!(command = %command_repr, "Running buck2");

        let mut cmd = Command::new(&self.executable);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        apply_non_interactive_env(&mut cmd);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = match timeout(Duration::from_secs(self.timeout_secs), cmd.output()).await {
            Err(_) => {
                return Err(Buck2CliOpsError::Timeout {
                    command: command_repr,
                    timeout_secs: self.timeout_secs,
                });
            }
            Ok(Err(err)) => {
                return if err.kind() == std::io::ErrorKind::NotFound {
                    Err(Buck2CliOpsError::Buck2NotInstalled {
                        executable: self.executable.clone(),
                    })
                } else {
                    Err(Buck2CliOpsError::CommandFailed {
                        message: format!("failed to execute buck2 command: {err}"),
                        exit_code: None,
                        stderr: String::new(),
                        stdout: String::new(),
                    })
                };
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let exit_code = output.status.code();

        if output.status.success() {
            return Ok(CommandRunOutput { stdout });
        }

        debug!(command = %command_repr, ?exit_code, "buck2 exited unsuccessfully");
        Err(classify_failed_command(exit_code, &stdout, &stderr))
    }
}

fn apply_non_interactive_env(cmd: &mut Command) {
    cmd.env("BUCK_NO_INTERACTIVE_CONSOLE", "1");
    cmd.env("NO_COLOR", "1");
    cmd.env("CLICOLOR", "0");
}

fn resolve_buck2_executable(explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Ok(path) = std::env::var("BUCK2_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let cargo_bin = Path::new(&home).join(".cargo").join("bin").join("buck2");
        if cargo_bin.exists() {
            return cargo_bin.to_string_lossy().to_string();
        }
    }

    for candidate in [
        "/opt/homebrew/bin/buck2",
        "/usr/local/bin/buck2",
        "/usr/bin/buck2",
    ] {
        if Path::new(candidate).exists() {
            return candidate.to_string();
        }
    }

    "buck2".to_string()
}

fn classify_failed_command(exit_code: Option<i32>, stdout: &str, stderr: &str) -> Buck2CliOpsError {
    let combined = format!("{stderr}\n{stdout}").to_ascii_lowercase();

    if is_missing_project_root(&combined) {
        return Buck2CliOpsError::NotABuckProject {
            message: non_empty(stderr, stdout, "no Buck2 project found"),
            exit_code,
            stderr: stderr.to_string(),
            stdout: stdout.to_string(),
        };
    }

    if combined.contains("unknown target")
        || combined.contains("no such package")
        || combined.contains("invalid target pattern")
        || combined.contains("error parsing target")
        || combined.contains("did not find package")
    {
        return Buck2CliOpsError::InvalidTarget {
            message: non_empty(stderr, stdout, "invalid target"),
            exit_code,
            stderr: stderr.to_string(),
            stdout: stdout.to_string(),
        };
    }

    Buck2CliOpsError::CommandFailed {
        message: non_empty(
            stderr,
            stdout,
            &format!("buck2 command failed with exit code {:?}", exit_code),
        ),
        exit_code,
        stderr: stderr.to_string(),
        stdout: stdout.to_string(),
    }
}

/// Only the "no project root" phrasing counts. Errors *inside* a
/// `.buckconfig` mean the project exists.
fn is_missing_project_root(lowercased: &str) -> bool {
    if lowercased.contains("not in a buck2 project")
        || lowercased.contains("could not find project root")
    {
        return true;
    }

    lowercased.lines().any(|line| {
        line.contains(".buckconfig")
            && (line.contains("could not find") || line.contains("couldn't find"))
    })
}

fn non_empty(primary: &str, secondary: &str, fallback: &str) -> String {
    if !primary.trim().is_empty() {
        primary.to_string()
    } else if !secondary.trim().is_empty() {
        secondary.to_string()
    } else {
        fallback.to_string()
    }
}
