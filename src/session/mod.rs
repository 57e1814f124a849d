//! Search/select session orchestration
//!
//! One session pairs a search subprocess with a selector subprocess:
//!
//! ```text
//! search stdout -> RankStage -> selector stdin
//!                                selector stdout -> selected line
//! ```
//!
//! The pump (read, rank, write) runs inside the session's own task. The
//! session ends when the selector exits; the search subprocess is then
//! torn down with SIGTERM, escalating to SIGKILL after the grace period.

mod process;

pub use process::{spawn_search, spawn_selector, terminate, CommandSpec, Termination};

use crate::config::Config;
use crate::error::{ImportPickError, Result};
use crate::ranking::{RankStage, RankStats};
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;

/// Search exit code meaning "ran fine, found nothing"
pub const SEARCH_NO_MATCHES: i32 = 1;

/// Selector exit code when the user aborts (Ctrl-C / Esc)
pub const SELECTOR_CANCELLED: i32 = 130;

/// Selector exit code when nothing could be selected
pub const SELECTOR_NO_SELECTION: i32 = 1;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How a session resolved. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user confirmed this line (trimmed)
    Selected(String),
    /// The user aborted the selector
    Cancelled,
    /// The search found no candidates
    NoMatches,
    /// The selector exited cleanly without printing anything
    Empty,
}

impl SessionOutcome {
    pub fn selection(&self) -> Option<&str> {
        match self {
            SessionOutcome::Selected(line) => Some(line),
            _ => None,
        }
    }

    pub fn into_selection(self) -> Option<String> {
        match self {
            SessionOutcome::Selected(line) => Some(line),
            _ => None,
        }
    }
}

/// Lifecycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    BothLaunched,
    SearchFinished,
    SelectorFinished,
    Terminated,
}

/// Tunables shared by every session an orchestrator starts
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub batch_size: usize,
    pub grace_period: Duration,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.ranking.batch_size,
            grace_period: Duration::from_millis(config.session.grace_period_ms),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Regex handed to the search subprocess. With a keyword, import lines
/// mentioning it; without, any `import ... from '...'` line.
pub fn search_pattern(keyword: Option<&str>) -> String {
    match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(keyword) => format!(r"^\s*import\b.*{}", regex::escape(keyword)),
        None => r#"^\s*import\b.*\bfrom\s*['"]"#.to_string(),
    }
}

/// Builds search/selector commands from configuration and runs sessions
pub struct Orchestrator {
    config: Config,
    options: SessionOptions,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let options = SessionOptions::from_config(&config);
        Self { config, options }
    }

    /// ripgrep invocation for `pattern`, rooted at the working directory
    pub fn search_command(&self, pattern: &str) -> CommandSpec {
        let search = &self.config.search;
        let mut args = search.flags.clone();

        let glob = match search.extensions.as_slice() {
            [single] => format!("*.{}", single),
            many => format!("*.{{{}}}", many.join(",")),
        };
        args.push("--glob".to_string());
        args.push(glob);

        for file_type in &search.exclude_types {
            args.push("--type-not".to_string());
            args.push(file_type.clone());
        }

        args.push("-e".to_string());
        args.push(pattern.to_string());
        args.push(".".to_string());

        CommandSpec::new(search.program.clone(), args)
    }

    /// fzf invocation showing `prompt`
    pub fn selector_command(&self, prompt: &str) -> CommandSpec {
        let selector = &self.config.selector;
        let mut args = selector.options.clone();
        args.push("--prompt".to_string());
        args.push(prompt.to_string());
        CommandSpec::new(selector.program.clone(), args)
    }

    /// Run one search/select session in `project_root`
    pub async fn run(
        &self,
        pattern: &str,
        project_root: &Path,
        prompt: &str,
        keyword: Option<&str>,
    ) -> Result<SessionOutcome> {
        let mut session = Session::new(
            self.search_command(pattern),
            self.selector_command(prompt),
            self.options.clone(),
        );
        session.run(project_root, keyword).await
    }
}

/// Summary of the pump once it stops
#[derive(Debug, Clone, Copy)]
struct PumpSummary {
    /// Search output reached EOF (false when the selector stopped reading)
    drained: bool,
    stats: RankStats,
}

/// One search -> rank -> select lifecycle
pub struct Session {
    search: CommandSpec,
    selector: CommandSpec,
    options: SessionOptions,
    state: SessionState,
}

impl Session {
    pub fn new(search: CommandSpec, selector: CommandSpec, options: SessionOptions) -> Self {
        Self {
            search,
            selector,
            options,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Launch both subprocesses in `cwd`, stream candidates through the
    /// rank stage, and wait for the selection. The search subprocess is
    /// always torn down before returning.
    pub async fn run(&mut self, cwd: &Path, keyword: Option<&str>) -> Result<SessionOutcome> {
        if self.state != SessionState::Idle {
            return Err(ImportPickError::Other(anyhow::anyhow!(
                "session already used (state {:?})",
                self.state
            )));
        }

        let mut search = spawn_search(&self.search, cwd)?;
        let selector = match spawn_selector(&self.selector, cwd) {
            Ok(child) => child,
            Err(e) => {
                self.teardown(&mut search).await;
                return Err(e);
            }
        };
        self.transition(SessionState::BothLaunched);

        let result = self.drive(&mut search, selector, keyword).await;
        self.teardown(&mut search).await;

        match &result {
            Ok(outcome) => tracing::info!("Session resolved: {:?}", outcome),
            Err(e) => tracing::info!("Session failed: {}", e),
        }
        result
    }

    async fn drive(
        &mut self,
        search: &mut Child,
        mut selector: Child,
        keyword: Option<&str>,
    ) -> Result<SessionOutcome> {
        let search_stdout = search
            .stdout
            .take()
            .ok_or_else(|| missing_pipe(&self.search, "stdout"))?;
        let selector_stdin = selector
            .stdin
            .take()
            .ok_or_else(|| missing_pipe(&self.selector, "stdin"))?;
        let mut selector_stdout = selector
            .stdout
            .take()
            .ok_or_else(|| missing_pipe(&self.selector, "stdout"))?;

        let stage = RankStage::new(keyword, self.options.batch_size);
        let mut pumping = Box::pin(pump(search_stdout, selector_stdin, stage));

        let selector_ref = &mut selector;
        let mut selection = Box::pin(async move {
            let mut captured = String::new();
            selector_stdout.read_to_string(&mut captured).await?;
            let status = selector_ref.wait().await?;
            Ok::<_, io::Error>((status, captured))
        });

        let (selected, no_matches) = tokio::select! {
            selected = &mut selection => {
                drop(pumping);
                (selected, false)
            }
            pumped = &mut pumping => {
                drop(pumping);
                self.transition(SessionState::SearchFinished);
                match self.search_exit(search, pumped).await {
                    Ok(no_matches) => ((&mut selection).await, no_matches),
                    Err(e) => {
                        drop(selection);
                        if let Err(te) =
                            terminate(&mut selector, self.selector.program(), self.options.grace_period).await
                        {
                            tracing::warn!("Failed to stop {}: {}", self.selector.program(), te);
                        }
                        return Err(e);
                    }
                }
            }
        };
        self.transition(SessionState::SelectorFinished);

        let (status, captured) = selected.map_err(|e| ImportPickError::Io {
            source: e,
            context: format!("Failed to read selection from {}", self.selector.program()),
        })?;
        resolve_selection(self.selector.program(), status, &captured, no_matches)
    }

    /// Interpret the end of the search side. Returns whether the search
    /// reported "no matches".
    async fn search_exit(
        &self,
        search: &mut Child,
        pumped: io::Result<PumpSummary>,
    ) -> Result<bool> {
        let summary = pumped.map_err(|e| ImportPickError::Io {
            source: e,
            context: format!("Failed to stream results from {}", self.search.program()),
        })?;
        tracing::debug!(
            "Pump stopped: drained={}, {:?}",
            summary.drained,
            summary.stats
        );

        if !summary.drained {
            // selector stopped reading; its own exit decides the session
            return Ok(false);
        }

        let status = search.wait().await.map_err(|e| ImportPickError::Io {
            source: e,
            context: format!("Failed to wait for {}", self.search.program()),
        })?;

        match status.code() {
            Some(0) => Ok(false),
            Some(SEARCH_NO_MATCHES) => {
                tracing::info!("{} found no matches", self.search.program());
                Ok(true)
            }
            code => Err(ImportPickError::SubprocessExit {
                program: self.search.program().to_string(),
                code,
            }),
        }
    }

    async fn teardown(&mut self, search: &mut Child) {
        match terminate(search, self.search.program(), self.options.grace_period).await {
            Ok(how) => tracing::debug!("{} teardown: {:?}", self.search.program(), how),
            Err(e) => tracing::warn!("Failed to stop {}: {}", self.search.program(), e),
        }
        self.transition(SessionState::Terminated);
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn missing_pipe(spec: &CommandSpec, pipe: &str) -> ImportPickError {
    ImportPickError::Io {
        source: io::Error::new(io::ErrorKind::Other, format!("{} not captured", pipe)),
        context: format!("Failed to attach to {}", spec.program()),
    }
}

fn resolve_selection(
    program: &str,
    status: ExitStatus,
    captured: &str,
    no_matches: bool,
) -> Result<SessionOutcome> {
    match status.code() {
        Some(0) => {
            let line = captured.trim();
            if !line.is_empty() {
                Ok(SessionOutcome::Selected(line.to_string()))
            } else if no_matches {
                Ok(SessionOutcome::NoMatches)
            } else {
                Ok(SessionOutcome::Empty)
            }
        }
        Some(SELECTOR_CANCELLED) => Ok(SessionOutcome::Cancelled),
        Some(SELECTOR_NO_SELECTION) if no_matches => Ok(SessionOutcome::NoMatches),
        code => Err(ImportPickError::SubprocessExit {
            program: program.to_string(),
            code,
        }),
    }
}

/// Copy search output through the rank stage into the selector until the
/// search output ends or the selector stops reading.
async fn pump<R, W>(mut source: R, mut sink: W, mut stage: RankStage) -> io::Result<PumpSummary>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let text = take_utf8_prefix(&mut pending);
        if text.is_empty() {
            continue;
        }

        if !forward(&mut sink, stage.push(&text)).await? {
            stage.release();
            return Ok(PumpSummary {
                drained: false,
                stats: stage.stats(),
            });
        }
    }

    let mut chunks = Vec::new();
    if !pending.is_empty() {
        chunks.extend(stage.push(&String::from_utf8_lossy(&pending)));
    }
    chunks.extend(stage.finish());

    if forward(&mut sink, chunks).await? {
        if let Err(e) = sink.shutdown().await {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e);
            }
        }
    }
    // dropping the sink closes the selector's stdin

    Ok(PumpSummary {
        drained: true,
        stats: stage.stats(),
    })
}

/// Write chunks downstream. Ok(false) once the reader has gone away.
async fn forward<W>(sink: &mut W, chunks: Vec<String>) -> io::Result<bool>
where
    W: AsyncWrite + Unpin,
{
    if chunks.is_empty() {
        return Ok(true);
    }
    for chunk in chunks {
        match sink.write_all(chunk.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Selector closed its input");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
    }
    match sink.flush().await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e),
    }
}

/// Split off the longest valid UTF-8 prefix, keeping an incomplete
/// trailing sequence for the next read. Invalid bytes are replaced.
fn take_utf8_prefix(pending: &mut Vec<u8>) -> String {
    let split = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => pending.len(),
    };
    let rest = pending.split_off(split);
    let head = std::mem::replace(pending, rest);
    String::from_utf8_lossy(&head).into_owned()
}
