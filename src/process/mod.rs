//! Thin facade over the operating system pieces the stages touch: binary
//! lookup, external process execution, and file presence/removal.
//!
//! Stages receive a [`System`] at construction time so tests can swap in a
//! double instead of spawning real tools.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Combined output of one external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// stdout and stderr lines, interleaved in arrival order
    pub combined: String,

    /// Whether the process exited successfully
    pub success: bool,

    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ToolOutput {
    pub fn success(combined: impl Into<String>) -> Self {
        Self {
            combined: combined.into(),
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: i32, combined: impl Into<String>) -> Self {
        Self {
            combined: combined.into(),
            success: false,
            code: Some(code),
        }
    }

    /// Human readable exit information
    pub fn exit_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait System: Send + Sync {
    /// Resolve a binary on the execution path
    fn lookup(&self, name: &str) -> Option<PathBuf>;

    /// Run a program to completion, capturing stdout and stderr together
    async fn run(&self, program: &str, args: &[String]) -> io::Result<ToolOutput>;

    fn exists(&self, path: &Path) -> bool;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`System`] backed by the real host
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSystem;

#[async_trait]
impl System for HostSystem {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    async fn run(&self, program: &str, args: &[String]) -> io::Result<ToolOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stderr was not captured"))?;

        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');
        let mut combined = String::new();
        let mut out_done = false;
        let mut err_done = false;

        while !(out_done && err_done) {
            tokio::select! {
                segment = out_lines.next_segment(), if !out_done => match segment? {
                    Some(line) => push_line(&mut combined, &line),
                    None => out_done = true,
                },
                segment = err_lines.next_segment(), if !err_done => match segment? {
                    Some(line) => push_line(&mut combined, &line),
                    None => err_done = true,
                },
            }
        }

        let status = child.wait().await?;

        Ok(ToolOutput {
            combined,
            success: status.success(),
            code: status.code(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

fn push_line(buffer: &mut String, line: &[u8]) {
    buffer.push_str(&String::from_utf8_lossy(line));
    buffer.push('\n');
}

/// Render a command line for log output
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
