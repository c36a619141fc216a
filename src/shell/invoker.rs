//! Spawning external programs and streaming their output.

use colored::*;
use log::debug;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

use crate::error::{IoContext, Result, ShellError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: Stream,
    pub text: String,
}

pub struct ProcessRequest<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: &'a Path,
    pub env: &'a HashMap<String, String>,
    pub timeout: Option<Duration>,
    /// Keep the streamed lines in the outcome as well as printing them.
    pub capture: bool,
}

#[derive(Debug)]
pub struct ProcessOutcome {
    /// `None` when killed by a signal or by the timeout.
    pub code: Option<i32>,
    pub timed_out: bool,
    pub output: Vec<OutputLine>,
}

/// Programs `cmd.exe` runs itself, with no executable on PATH.
const CMD_INTERNALS: &[&str] = &[
    "cls", "copy", "del", "dir", "echo", "erase", "md", "mkdir", "move", "rd", "ren", "rename", "rmdir", "set", "type",
    "ver", "vol",
];

fn search_path(env: &HashMap<String, String>) -> Option<OsString> {
    env.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("PATH"))
        .map(|(_, v)| OsString::from(v))
}

/// Find `program` on the session's PATH.
pub fn locate(program: &str, cwd: &Path, env: &HashMap<String, String>) -> Option<PathBuf> {
    which::which_in(program, search_path(env), cwd).ok()
}

fn is_shell_internal(program: &str) -> bool {
    cfg!(windows) && CMD_INTERNALS.contains(&program.to_lowercase().as_str())
}

/// Whether `program` could be started at all.
pub fn is_resolvable(program: &str, cwd: &Path, env: &HashMap<String, String>) -> bool {
    locate(program, cwd, env).is_some() || is_shell_internal(program)
}

fn build_command(req: &ProcessRequest) -> Result<Command> {
    match locate(req.program, req.cwd, req.env) {
        Some(path) => {
            let mut cmd = Command::new(path);
            cmd.args(req.args);
            Ok(cmd)
        }
        None if is_shell_internal(req.program) => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(req.program).args(req.args);
            Ok(cmd)
        }
        None => Err(ShellError::NotFound(req.program.to_string())),
    }
}

type Sink = Option<Arc<Mutex<Vec<OutputLine>>>>;

fn spawn_reader<R: Read + Send + 'static>(source: R, stream: Stream, sink: Sink) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            // Console code pages are not always UTF-8.
            let text = String::from_utf8_lossy(&buf).trim_end_matches(['\r', '\n']).to_string();
            match stream {
                Stream::Stdout => println!("{}", text),
                Stream::Stderr => eprintln!("{}", text.red()),
            }
            if let Some(sink) = &sink {
                if let Ok(mut lines) = sink.lock() {
                    lines.push(OutputLine { stream, text });
                }
            }
        }
    })
}

/// Run a program to completion, printing its output line by line as it
/// arrives. Stdin is inherited so interactive programs still work.
pub fn invoke(req: &ProcessRequest) -> Result<ProcessOutcome> {
    let mut cmd = build_command(req)?;
    cmd.current_dir(req.cwd);

    // The session environment is the source of truth
    cmd.env_clear();
    cmd.envs(req.env);

    cmd.stdin(Stdio::inherit()).stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("Spawning {} {:?} in {}", req.program, req.args, req.cwd.display());
    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ShellError::NotFound(req.program.to_string()),
        _ => ShellError::io(format!("Failed to execute command: {}", req.program), e),
    })?;

    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = || req.capture.then(|| Arc::clone(&collected));
    let readers: Vec<JoinHandle<()>> = [
        child.stdout.take().map(|out| spawn_reader(out, Stream::Stdout, sink())),
        child.stderr.take().map(|err| spawn_reader(err, Stream::Stderr, sink())),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (code, timed_out) = match req.timeout {
        Some(limit) => match child
            .wait_timeout(limit)
            .with_io_context(|| format!("Failed to wait for {}", req.program))?
        {
            Some(status) => (status.code(), false),
            None => {
                child.kill().ok();
                child.wait().ok();
                (None, true)
            }
        },
        None => {
            let status = child
                .wait()
                .with_io_context(|| format!("Failed to wait for {}", req.program))?;
            (status.code(), false)
        }
    };

    // Wait for the readers to flush everything
    for handle in readers {
        handle.join().ok();
    }

    let output = match Arc::try_unwrap(collected) {
        Ok(mutex) => mutex.into_inner().unwrap_or_default(),
        Err(shared) => shared.lock().map(|v| v.clone()).unwrap_or_default(),
    };

    Ok(ProcessOutcome { code, timed_out, output })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn env() -> HashMap<String, String> {
        std::env::vars().collect()
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_captures_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let env = env();
        let args = strings(&["-c", "echo out; echo err 1>&2; exit 4"]);
        let outcome = invoke(&ProcessRequest {
            program: "sh",
            args: &args,
            cwd: dir.path(),
            env: &env,
            timeout: None,
            capture: true,
        })
        .unwrap();

        assert_eq!(outcome.code, Some(4));
        assert!(outcome.output.contains(&OutputLine { stream: Stream::Stdout, text: "out".into() }));
        assert!(outcome.output.contains(&OutputLine { stream: Stream::Stderr, text: "err".into() }));
    }

    #[test]
    fn test_runs_in_session_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let env = env();
        let args = strings(&["-c", "pwd"]);
        let outcome = invoke(&ProcessRequest {
            program: "sh",
            args: &args,
            cwd: dir.path(),
            env: &env,
            timeout: None,
            capture: true,
        })
        .unwrap();
        let printed = std::path::PathBuf::from(&outcome.output[0].text);
        assert_eq!(printed.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let env = env();
        let args = strings(&["-c", "exec sleep 5"]);
        let outcome = invoke(&ProcessRequest {
            program: "sh",
            args: &args,
            cwd: dir.path(),
            env: &env,
            timeout: Some(Duration::from_millis(200)),
            capture: false,
        })
        .unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.code, None);
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let env = env();
        let err = invoke(&ProcessRequest {
            program: "definitely-not-installed-xyz",
            args: &[],
            cwd: dir.path(),
            env: &env,
            timeout: None,
            capture: false,
        })
        .unwrap_err();
        assert!(matches!(err, ShellError::NotFound(_)));
        assert!(!is_resolvable("definitely-not-installed-xyz", dir.path(), &env));
        assert!(is_resolvable("sh", dir.path(), &env));
    }
}
