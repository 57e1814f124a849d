// Deduplicating rank stage between the search output and the selector input
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};

use crate::ranking::scorer;

/// Number of scored candidates collected before a batch is sorted and emitted
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One import line as produced by the search subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    raw: String,
    trimmed: String,
}

impl Candidate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        Self { raw, trimmed }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Dedup key
    pub fn trimmed(&self) -> &str {
        &self.trimmed
    }
}

/// Candidate paired with its relevance score; lives only inside a batch
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: u32,
}

/// Counters for one stage lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankStats {
    /// Complete lines seen
    pub lines: u64,
    /// Lines written downstream
    pub emitted: u64,
    /// Lines dropped as duplicates
    pub duplicates: u64,
    /// Lines dropped as relative-path imports
    pub relative: u64,
    /// Batches sorted and flushed (keyword mode only)
    pub batches: u64,
}

/// Stateful transform from raw search output chunks to selector input chunks.
///
/// Without a keyword, surviving lines are forwarded immediately in arrival
/// order. With a keyword, lines are scored and emitted in locally sorted
/// batches of `batch_size`. Every emitted chunk holds whole lines, each
/// terminated by `\n`.
///
/// All state (carry-over fragment, seen-set, score cache, batch) belongs to
/// one session and is released by [`RankStage::finish`].
pub struct RankStage {
    keyword: Option<String>,
    batch_size: usize,

    /// Trailing fragment of the last chunk that had no line break yet
    carry: String,

    /// Trimmed texts already emitted (or queued in the batch)
    seen: HashSet<String>,

    /// Trimmed text -> score for the current keyword
    scores: HashMap<String, u32>,

    batch: Vec<ScoredCandidate>,
    stats: RankStats,
}

impl RankStage {
    /// Create a stage. An empty keyword is treated as no keyword.
    pub fn new(keyword: Option<&str>, batch_size: usize) -> Self {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Self {
            keyword,
            batch_size: batch_size.max(1),
            carry: String::new(),
            seen: HashSet::new(),
            scores: HashMap::new(),
            batch: Vec::new(),
            stats: RankStats::default(),
        }
    }

    /// True when lines are scored and batched
    pub fn is_ranking(&self) -> bool {
        self.keyword.is_some()
    }

    /// Feed one arriving chunk. Returns the chunks ready to be written
    /// downstream, possibly none.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.carry.push_str(chunk);

        let Some(last_break) = self.carry.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.carry.split_off(last_break + 1);
        let complete = std::mem::replace(&mut self.carry, rest);

        let mut out = Vec::new();
        let mut immediate = String::new();
        for line in complete.split_terminator('\n') {
            self.process_line(line, &mut immediate, &mut out);
        }
        if !immediate.is_empty() {
            out.insert(0, immediate);
        }
        out
    }

    /// Signal end of input: the residual fragment is processed as a final
    /// line, any partial batch is flushed, and the session state released.
    pub fn finish(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        let mut immediate = String::new();

        let residual = std::mem::take(&mut self.carry);
        if !residual.is_empty() {
            self.process_line(&residual, &mut immediate, &mut out);
        }
        if !immediate.is_empty() {
            out.push(immediate);
        }
        if let Some(chunk) = self.flush_batch() {
            out.push(chunk);
        }

        self.release();
        out
    }

    /// Drop the seen-set, score cache, and pending state
    pub fn release(&mut self) {
        self.carry = String::new();
        self.seen = HashSet::new();
        self.scores = HashMap::new();
        self.batch = Vec::new();
    }

    pub fn stats(&self) -> RankStats {
        self.stats
    }

    fn process_line(&mut self, line: &str, immediate: &mut String, out: &mut Vec<String>) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        self.stats.lines += 1;

        let candidate = Candidate::new(line);
        if candidate.trimmed().is_empty() {
            if !self.is_ranking() {
                immediate.push_str(candidate.raw());
                immediate.push('\n');
                self.stats.emitted += 1;
            }
            return;
        }

        if scorer::is_relative_import(candidate.trimmed()) {
            self.stats.relative += 1;
            return;
        }

        if !self.seen.insert(candidate.trimmed().to_string()) {
            self.stats.duplicates += 1;
            return;
        }

        let Some(keyword) = self.keyword.as_deref() else {
            immediate.push_str(candidate.raw());
            immediate.push('\n');
            self.stats.emitted += 1;
            return;
        };

        let score = match self.scores.get(candidate.trimmed()) {
            Some(&cached) => cached,
            None => {
                let computed = scorer::score(candidate.trimmed(), keyword);
                self.scores.insert(candidate.trimmed().to_string(), computed);
                computed
            }
        };

        self.batch.push(ScoredCandidate { candidate, score });
        if self.batch.len() >= self.batch_size {
            if let Some(chunk) = self.flush_batch() {
                out.push(chunk);
            }
        }
    }

    /// Sort the pending batch (score descending, then shorter raw line) and
    /// render it as one chunk
    fn flush_batch(&mut self) -> Option<String> {
        if self.batch.is_empty() {
            return None;
        }

        let mut batch = std::mem::take(&mut self.batch);
        batch.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.candidate.raw().len().cmp(&b.candidate.raw().len()))
        });

        let mut chunk = String::new();
        for scored in &batch {
            chunk.push_str(scored.candidate.raw());
            chunk.push('\n');
        }

        self.stats.emitted += batch.len() as u64;
        self.stats.batches += 1;
        tracing::debug!("Flushed ranked batch of {} candidates", batch.len());
        Some(chunk)
    }
}
