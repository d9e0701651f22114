//! Query-to-results and selection-to-preview pipelines.
//!
//! The session owns all display state. It never performs I/O: it hands out
//! tickets describing the request to run, and the host reports each outcome
//! back with [`Session::complete_search`] / [`Session::complete_preview`].
//! Outcomes for superseded tickets are dropped.

use std::time::{Duration, Instant};

use github_search::{FileDescriptor, GitHubSearchResult, SearchPage};
use tracing::{debug, info, warn};

use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::load_state::{Failure, LoadState, RequestSequencer};

/// A search the host must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    /// Raw query terms (not yet wrapped in the scope qualifiers).
    pub terms: String,
}

/// A content fetch the host must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    pub seq: u64,
    pub file: FileDescriptor,
}

/// What happened to a reported outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was superseded; display state is untouched.
    Discarded,
}

#[derive(Debug, Default)]
pub struct Session {
    debouncer: Debouncer,
    search_seq: RequestSequencer,
    results: LoadState<SearchPage>,
    preview_seq: RequestSequencer,
    preview: LoadState<String>,
    previewed: Option<FileDescriptor>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_debounce(DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(window: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(window),
            ..Self::default()
        }
    }

    // ----- query -----

    /// Keystroke handler: records the text; no search starts until it settles.
    ///
    /// Submitting the settled text again after its search failed retries it.
    pub fn on_search_text_changed(&mut self, text: &str, now: Instant) {
        let retry = text == self.debouncer.debounced()
            && text == self.debouncer.raw()
            && matches!(self.results, LoadState::Failed(_));
        if retry {
            debug!(terms = %text, "resubmitting failed search");
            self.debouncer.resubmit(now);
        } else {
            self.debouncer.input(text, now);
        }
    }

    pub fn search_text(&self) -> &str {
        self.debouncer.raw()
    }

    /// When the host should next call [`Session::poll_debounce`].
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Starts a search if the typed text has settled into a new value.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchTicket> {
        let query = self.debouncer.poll(now)?;
        self.start_search(query)
    }

    /// Starts a search for `query`, superseding any outstanding one.
    ///
    /// Blank queries do not reach the API: results become an empty ready list.
    pub fn start_search(&mut self, query: String) -> Option<SearchTicket> {
        if query.trim().is_empty() {
            self.search_seq.invalidate();
            self.results = LoadState::Ready(SearchPage::default());
            debug!("blank query, skipping remote search");
            return None;
        }

        let seq = self.search_seq.issue();
        self.results = LoadState::Loading { seq };
        debug!(seq, terms = %query, "search issued");
        Some(SearchTicket { seq, terms: query })
    }

    /// Applies a search outcome if `seq` is still the latest issued search.
    pub fn complete_search(
        &mut self,
        seq: u64,
        outcome: GitHubSearchResult<SearchPage>,
    ) -> Completion {
        if !self.search_seq.is_latest(seq) {
            debug!(seq, latest = self.search_seq.latest(), "stale search response discarded");
            return Completion::Discarded;
        }

        self.results = match outcome {
            Ok(page) => {
                info!(
                    seq,
                    count = page.items.len(),
                    total = page.total_count,
                    "search results applied"
                );
                LoadState::Ready(page)
            }
            Err(err) => {
                warn!(seq, error = %err, "search failed");
                LoadState::Failed(Failure::from(&err))
            }
        };
        Completion::Applied
    }

    pub fn results(&self) -> &LoadState<SearchPage> {
        &self.results
    }

    /// Files to list; empty unless the latest search succeeded.
    pub fn files(&self) -> &[FileDescriptor] {
        self.results
            .ready()
            .map(|page| page.items.as_slice())
            .unwrap_or(&[])
    }

    /// Busy while typing has not settled or a search is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.debouncer.is_settled() || self.results.is_loading()
    }

    // ----- preview -----

    /// Selection handler: fetches content for a newly selected file.
    ///
    /// Re-selecting the file already loading or shown is a no-op; re-selecting
    /// after a failure retries.
    pub fn select(&mut self, file: FileDescriptor) -> Option<PreviewTicket> {
        let same_file = self
            .previewed
            .as_ref()
            .is_some_and(|f| f.git_url == file.git_url);
        if same_file && !matches!(self.preview, LoadState::Failed(_) | LoadState::Idle) {
            return None;
        }

        let seq = self.preview_seq.issue();
        self.preview = LoadState::Loading { seq };
        self.previewed = Some(file.clone());
        debug!(seq, path = %file.path, "preview issued");
        Some(PreviewTicket { seq, file })
    }

    /// Applies fetched content if `seq` is still the latest selection.
    pub fn complete_preview(&mut self, seq: u64, outcome: GitHubSearchResult<String>) -> Completion {
        if !self.preview_seq.is_latest(seq) {
            debug!(seq, latest = self.preview_seq.latest(), "stale preview response discarded");
            return Completion::Discarded;
        }

        self.preview = match outcome {
            Ok(text) => LoadState::Ready(text),
            Err(err) => {
                warn!(seq, error = %err, "preview failed");
                LoadState::Failed(Failure::from(&err))
            }
        };
        Completion::Applied
    }

    /// Drops the preview and ignores any fetch still in flight.
    pub fn close_preview(&mut self) {
        self.preview_seq.invalidate();
        self.preview = LoadState::Idle;
        self.previewed = None;
    }

    pub fn preview(&self) -> &LoadState<String> {
        &self.preview
    }

    pub fn previewed_file(&self) -> Option<&FileDescriptor> {
        self.previewed.as_ref()
    }
}
