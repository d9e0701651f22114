//! `idle → loading → {ready | failed}` state shared by search and preview.

use std::fmt;

use github_search::GitHubSearchError;

/// Why a request ended in [`LoadState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Token missing or rejected.
    Auth,
    /// Transport or API failure.
    Network,
    /// Content could not be decoded to text.
    Decode,
}

/// Terminal failure for one request, ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&GitHubSearchError> for Failure {
    fn from(err: &GitHubSearchError) -> Self {
        let kind = if err.is_auth_failure() {
            FailureKind::Auth
        } else if err.is_decode_failure() {
            FailureKind::Decode
        } else {
            FailureKind::Network
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            FailureKind::Auth => "authentication failed",
            FailureKind::Network => "request failed",
            FailureKind::Decode => "could not decode content",
        };
        write!(f, "{label}: {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    /// Waiting for the response to request `seq`.
    Loading { seq: u64 },
    Ready(T),
    Failed(Failure),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            LoadState::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// Hands out monotonically increasing request numbers.
///
/// Only a response carrying the latest number may touch display state.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    /// Issues the number for a new request, superseding all earlier ones.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Supersedes outstanding requests without starting a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use github_search::{DecodeError, ProviderError};

    #[test]
    fn sequencer_only_accepts_latest() {
        let mut s = RequestSequencer::default();
        let a = s.issue();
        let b = s.issue();
        assert!(b > a);
        assert!(!s.is_latest(a));
        assert!(s.is_latest(b));
        s.invalidate();
        assert!(!s.is_latest(b));
    }

    #[test]
    fn failure_kinds_from_errors() {
        let f = Failure::from(&GitHubSearchError::from(ProviderError::Unauthorized));
        assert_eq!(f.kind, FailureKind::Auth);
        assert!(f.to_string().starts_with("authentication failed"));

        let f = Failure::from(&GitHubSearchError::from(ProviderError::Timeout));
        assert_eq!(f.kind, FailureKind::Network);

        let f = Failure::from(&GitHubSearchError::from(DecodeError::UnsupportedEncoding(
            "x".into(),
        )));
        assert_eq!(f.kind, FailureKind::Decode);
    }

    #[test]
    fn state_accessors() {
        let s: LoadState<u8> = LoadState::Loading { seq: 3 };
        assert!(s.is_loading());
        assert_eq!(s.ready(), None);
        let s = LoadState::Ready(5u8);
        assert_eq!(s.ready(), Some(&5));
        assert!(LoadState::<u8>::default() == LoadState::Idle);
    }
}
