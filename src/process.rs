//! Subprocess execution for the external transcription tool.
//!
//! The tool is a black box reached only through its command line and the
//! files it writes. We run it synchronously with captured output:
//! - the child's working directory is the scenario's scratch directory, so
//!   a tool that drops relative-path files never pollutes the caller's cwd
//!   (the caller's own cwd is never touched)
//! - the child inherits our environment plus any explicitly configured pairs,
//!   so execution stays hermetic regardless of ambient installation state
//! - a non-zero exit is a hard [`Error::ProcessExecution`] carrying the
//!   captured stderr; callers never see partial output on failure
//!
//! There is deliberately no timeout: a hung tool blocks the case, and CI is
//! expected to impose an external wall-clock limit.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// Captured output of a successful tool invocation.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands with a controlled working directory and environment.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    workdir: PathBuf,
    extra_env: Vec<(String, String)>,
    interpreter: Option<String>,
}

impl ProcessRunner {
    /// Create a runner whose children execute inside `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            extra_env: Vec::new(),
            interpreter: None,
        }
    }

    /// Add an environment variable visible to every child.
    ///
    /// Typical use: pointing an interpreted tool at the same library search
    /// path the harness itself was launched with.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    /// Configure an interpreter to prepend when the command is a `.py` script.
    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    /// Execute a token sequence, asserting a successful exit.
    pub fn run(&self, tokens: &[String]) -> Result<ProcessOutput> {
        let tokens = self.with_interpreter(tokens)?;
        let rendered = tokens.join(" ");
        debug!(command = %rendered, workdir = %self.workdir.display(), "running tool");

        let output = Command::new(&tokens[0])
            .args(&tokens[1..])
            .current_dir(&self.workdir)
            .envs(self.extra_env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|err| Error::msg(format!("failed to spawn `{rendered}`: {err}")))?;

        if !output.status.success() {
            return Err(Error::ProcessExecution {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn with_interpreter(&self, tokens: &[String]) -> Result<Vec<String>> {
        let first = tokens
            .first()
            .ok_or_else(|| Error::msg("empty command"))?;
        match &self.interpreter {
            Some(interpreter) if Path::new(first).extension().is_some_and(|e| e == "py") => {
                let mut cmd = Vec::with_capacity(tokens.len() + 1);
                cmd.push(interpreter.clone());
                cmd.extend(tokens.iter().cloned());
                Ok(cmd)
            }
            _ => Ok(tokens.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn captures_stdout_on_success() -> anyhow::Result<()> {
        let scratch = tempfile::tempdir()?;
        let runner = ProcessRunner::new(scratch.path());
        let out = runner.run(&tokens(&["echo", "hello"]))?;
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "");
        Ok(())
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let scratch = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(scratch.path());
        let err = runner
            .run(&tokens(&["sh", "-c", "echo boom >&2; exit 3"]))
            .unwrap_err();
        match err {
            Error::ProcessExecution { stderr, status, .. } => {
                assert_eq!(stderr, "boom\n");
                assert!(status.contains('3'), "{status}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn children_run_inside_the_scratch_directory() -> anyhow::Result<()> {
        let scratch = tempfile::tempdir()?;
        let runner = ProcessRunner::new(scratch.path());
        runner.run(&tokens(&["sh", "-c", "pwd > where.txt"]))?;

        // The relative-path file lands in the scratch dir, not our cwd.
        let written = std::fs::read_to_string(scratch.path().join("where.txt"))?;
        assert_eq!(
            Path::new(written.trim_end()).canonicalize()?,
            scratch.path().canonicalize()?
        );
        Ok(())
    }

    #[test]
    fn configured_env_reaches_the_child() -> anyhow::Result<()> {
        let scratch = tempfile::tempdir()?;
        let runner = ProcessRunner::new(scratch.path()).env("GOLDENEAR_PROBE", "42");
        let out = runner.run(&tokens(&["sh", "-c", "printf %s \"$GOLDENEAR_PROBE\""]))?;
        assert_eq!(out.stdout, "42");
        Ok(())
    }

    #[test]
    fn interpreter_is_prepended_for_python_scripts() -> anyhow::Result<()> {
        let runner = ProcessRunner::new(".").interpreter("python3");
        let cmd = runner.with_interpreter(&tokens(&["transcribe.py", "audio.wav"]))?;
        assert_eq!(cmd, tokens(&["python3", "transcribe.py", "audio.wav"]));

        // Non-script commands are left alone.
        let cmd = runner.with_interpreter(&tokens(&["transcribe", "audio.wav"]))?;
        assert_eq!(cmd, tokens(&["transcribe", "audio.wav"]));
        Ok(())
    }

    #[test]
    fn empty_command_is_rejected() {
        let runner = ProcessRunner::new(".");
        assert!(runner.run(&[]).is_err());
    }
}
