//! UCI subprocess generator
//!
//! Each request starts a fresh engine process, runs the minimal UCI handshake
//! (`uci` / `isready`), sends the position and a `go` command, and waits for the
//! `bestmove` line. The whole exchange is bounded by a hard timeout that is
//! independent of the thinking time passed to the engine; when it fires the
//! process is killed.

use crate::{GeneratorError, GeneratorResult, MoveGenerator, SearchRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// Grace period for the engine to exit after `quit`
const QUIT_GRACE: Duration = Duration::from_millis(200);

/// A UCI chess program invoked as a subprocess
#[derive(Debug, Clone)]
pub struct UciEngine {
    program: PathBuf,
    args: Vec<String>,
    hard_timeout: Duration,
}

impl UciEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, hard_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            hard_timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn hard_timeout(&self) -> Duration {
        self.hard_timeout
    }

    async fn run(&self, request: &SearchRequest) -> GeneratorResult<Option<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("engine stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("engine stdout was not captured"))?;
        let mut lines = BufReader::new(stdout).lines();

        send(&mut stdin, "uci").await?;
        wait_for(&mut lines, "uciok").await?;
        send(&mut stdin, "isready").await?;
        wait_for(&mut lines, "readyok").await?;

        send(&mut stdin, &format!("position fen {}", request.fen)).await?;
        send(&mut stdin, &go_command(request.think_time)).await?;

        let reply = loop {
            match lines.next_line().await? {
                Some(line) if line.starts_with("bestmove") => break parse_bestmove(&line)?,
                Some(line) => debug!("[ENGINE] {}", line),
                None => {
                    return Err(GeneratorError::UnexpectedEof {
                        expected: "bestmove",
                    })
                }
            }
        };

        if send(&mut stdin, "quit").await.is_err() {
            debug!("[ENGINE] engine closed stdin before quit");
        }
        drop(stdin);
        if tokio::time::timeout(QUIT_GRACE, child.wait()).await.is_err() {
            warn!("[ENGINE] {} ignored quit, killing it", self.program.display());
            child.kill().await?;
        }

        Ok(reply)
    }
}

#[async_trait]
impl MoveGenerator for UciEngine {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("uci-engine")
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn best_move(&self, request: &SearchRequest) -> GeneratorResult<Option<String>> {
        tokio::time::timeout(self.hard_timeout, self.run(request))
            .await
            .map_err(|_| GeneratorError::Timeout(self.hard_timeout))?
    }
}

/// `go` command for a thinking-time budget
///
/// Several engines read `movetime 0` as "no limit", so a zero budget asks for a
/// one-ply search instead.
fn go_command(think_time: Duration) -> String {
    if think_time.is_zero() {
        "go depth 1".to_string()
    } else {
        format!("go movetime {}", think_time.as_millis())
    }
}

async fn send(stdin: &mut ChildStdin, command: &str) -> GeneratorResult<()> {
    debug!("[ENGINE] > {}", command);
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

async fn wait_for(
    lines: &mut Lines<BufReader<ChildStdout>>,
    token: &'static str,
) -> GeneratorResult<()> {
    while let Some(line) = lines.next_line().await? {
        if line.trim() == token {
            return Ok(());
        }
    }
    Err(GeneratorError::UnexpectedEof { expected: token })
}

/// Extract the move from a `bestmove <move> [ponder <move>]` line
///
/// `(none)` and the null move `0000` mean the engine has no move to offer.
pub fn parse_bestmove(line: &str) -> GeneratorResult<Option<String>> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some("bestmove"), Some("(none)" | "0000")) => Ok(None),
        (Some("bestmove"), Some(code)) => Ok(Some(code.to_string())),
        _ => Err(GeneratorError::MalformedReply {
            line: line.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove_plain() {
        assert_eq!(
            parse_bestmove("bestmove e7e5").unwrap(),
            Some("e7e5".to_string())
        );
    }

    #[test]
    fn test_parse_bestmove_with_ponder() {
        assert_eq!(
            parse_bestmove("bestmove g8f6 ponder d2d4").unwrap(),
            Some("g8f6".to_string())
        );
    }

    #[test]
    fn test_parse_bestmove_null_answers() {
        assert_eq!(parse_bestmove("bestmove (none)").unwrap(), None);
        assert_eq!(parse_bestmove("bestmove 0000").unwrap(), None);
    }

    #[test]
    fn test_parse_bestmove_rejects_other_lines() {
        assert!(matches!(
            parse_bestmove("bestmove"),
            Err(GeneratorError::MalformedReply { .. })
        ));
        assert!(matches!(
            parse_bestmove("info depth 3"),
            Err(GeneratorError::MalformedReply { .. })
        ));
    }

    #[test]
    fn test_go_command_zero_budget_is_one_ply() {
        assert_eq!(go_command(Duration::ZERO), "go depth 1");
        assert_eq!(go_command(Duration::from_millis(250)), "go movetime 250");
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let engine = UciEngine::new(
            "/nonexistent/definitely-not-an-engine",
            Vec::new(),
            Duration::from_secs(1),
        );
        let request = SearchRequest::new("8/8/8/8/8/8/8/8 w - - 0 1", Duration::ZERO);
        let result = engine.best_move(&request).await;
        assert!(matches!(result, Err(GeneratorError::Spawn { .. })));
    }
}
