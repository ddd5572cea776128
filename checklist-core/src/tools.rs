//! External command-line tools the build can use when they are installed.
//!
//! Nothing in here returns an error. A tool that is missing, fails, or hangs
//! comes back as [`ToolOutcome::Unavailable`] and the caller decides on a
//! substitute value.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

const TIDY_ARGS: &[&str] = &["-q", "-asxhtml", "--show-warnings", "no"];
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum ToolUnavailable {
    #[error("{0} is not installed")]
    NotInstalled(String),
    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: ExitStatus },
    #[error("{tool} did not finish within {}s", .timeout.as_secs_f32())]
    TimedOut { tool: String, timeout: Duration },
    #[error("{tool} could not be run: {message}")]
    Io { tool: String, message: String },
    #[error("{tool} produced unusable output")]
    InvalidOutput { tool: String },
}

#[derive(Debug)]
pub enum ToolOutcome<T> {
    Completed(T),
    Unavailable(ToolUnavailable),
}

impl<T> ToolOutcome<T> {
    pub fn unwrap_or_else<F: FnOnce(ToolUnavailable) -> T>(self, fallback: F) -> T {
        match self {
            ToolOutcome::Completed(value) => value,
            ToolOutcome::Unavailable(reason) => fallback(reason),
        }
    }
}

fn locate(tool: &str) -> Result<PathBuf, ToolUnavailable> {
    which::which(tool).map_err(|_| ToolUnavailable::NotInstalled(tool.to_string()))
}

/// Abbreviated revision of the checkout at `repo`, exactly 7 characters.
pub fn git_revision(repo: &Path) -> ToolOutcome<String> {
    let git = match locate("git") {
        Ok(git) => git,
        Err(reason) => return ToolOutcome::Unavailable(reason),
    };

    let output = match Command::new(git)
        .args(["rev-parse", "--short=7", "HEAD"])
        .current_dir(repo)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            return ToolOutcome::Unavailable(ToolUnavailable::Io {
                tool: "git".to_string(),
                message: e.to_string(),
            });
        }
    };

    if !output.status.success() {
        return ToolOutcome::Unavailable(ToolUnavailable::Failed {
            tool: "git".to_string(),
            status: output.status,
        });
    }

    let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if revision.len() < 7 || !revision.chars().all(|c| c.is_ascii_alphanumeric()) {
        return ToolOutcome::Unavailable(ToolUnavailable::InvalidOutput {
            tool: "git".to_string(),
        });
    }

    // git lengthens the abbreviation when 7 characters are ambiguous
    ToolOutcome::Completed(revision[..7].to_string())
}

/// Reformat HTML as strict XHTML with `tidy`.
pub fn lint_html(html: &str, timeout: Duration) -> ToolOutcome<String> {
    run_filter("tidy", TIDY_ARGS, html, timeout)
}

/// Pipe `input` through `tool` and return its stdout.
pub(crate) fn run_filter(
    tool: &str,
    args: &[&str],
    input: &str,
    timeout: Duration,
) -> ToolOutcome<String> {
    let program = match locate(tool) {
        Ok(program) => program,
        Err(reason) => return ToolOutcome::Unavailable(reason),
    };

    match run_with_timeout(&program, args, input, timeout) {
        Ok(RunResult::Finished { status, stdout }) if status.success() => {
            match String::from_utf8(stdout) {
                Ok(output) if !output.trim().is_empty() => ToolOutcome::Completed(output),
                _ => ToolOutcome::Unavailable(ToolUnavailable::InvalidOutput {
                    tool: tool.to_string(),
                }),
            }
        }
        Ok(RunResult::Finished { status, .. }) => {
            ToolOutcome::Unavailable(ToolUnavailable::Failed {
                tool: tool.to_string(),
                status,
            })
        }
        Ok(RunResult::TimedOut) => ToolOutcome::Unavailable(ToolUnavailable::TimedOut {
            tool: tool.to_string(),
            timeout,
        }),
        Err(e) => ToolOutcome::Unavailable(ToolUnavailable::Io {
            tool: tool.to_string(),
            message: e.to_string(),
        }),
    }
}

enum RunResult {
    Finished { status: ExitStatus, stdout: Vec<u8> },
    TimedOut,
}

fn run_with_timeout(
    program: &Path,
    args: &[&str],
    input: &str,
    timeout: Duration,
) -> std::io::Result<RunResult> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(std::io::Error::other("child pipes were not captured"));
    };

    // Feed and drain on helper threads so a full pipe never blocks the child.
    let input = input.to_owned();
    let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));
    let stdout_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    // A child that exits without reading all of stdin breaks the pipe; its
    // exit status already says everything.
    let _ = writer.join();
    let stdout = stdout_reader
        .join()
        .map_err(|_| std::io::Error::other("stdout reader panicked"))??;
    let _ = stderr_reader.join();

    Ok(match status {
        Some(status) => RunResult::Finished { status, stdout },
        None => RunResult::TimedOut,
    })
}
