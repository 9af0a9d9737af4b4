//! One-time engine discovery
//!
//! Resolves which generator the process will use. This runs once at startup
//! and the result is passed explicitly to the opponent policy; nothing is
//! cached globally.

use crate::{AbsentGenerator, MoveGenerator, UciEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Programs probed on `PATH` when no engine is configured, in order
pub const DEFAULT_CANDIDATES: &[&str] = &["stockfish", "gnuchess --uci"];

/// A program name or path plus its arguments, e.g. `gnuchess --uci`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    /// Split a whitespace-separated command line; `None` when it is blank
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Absolute location of the program, if it exists and can be run
    pub fn locate(&self) -> Option<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }
        let search_path = std::env::var_os("PATH")?;
        std::env::split_paths(&search_path)
            .map(|dir| dir.join(&self.program))
            .find(|path| is_executable(path))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Pick the move generator for this process
///
/// An explicitly configured engine is used as-is when it exists; a configured
/// engine that cannot be found leaves the process without a generator rather
/// than silently substituting another program. Without configuration the
/// [`DEFAULT_CANDIDATES`] are tried in order.
pub fn discover(configured: Option<&str>, hard_timeout: Duration) -> Arc<dyn MoveGenerator> {
    let commands: Vec<EngineCommand> = match configured.and_then(EngineCommand::parse) {
        Some(command) => vec![command],
        None => DEFAULT_CANDIDATES
            .iter()
            .filter_map(|command| EngineCommand::parse(command))
            .collect(),
    };

    for command in commands {
        if let Some(path) = command.locate() {
            info!(
                "[ENGINE] Using {} {:?} (hard timeout {:?})",
                path.display(),
                command.args,
                hard_timeout
            );
            return Arc::new(UciEngine::new(path, command.args, hard_timeout));
        }
        warn!("[ENGINE] {} not found", command.program);
    }

    warn!("[ENGINE] No engine available; the opponent will play random moves");
    Arc::new(AbsentGenerator)
}
