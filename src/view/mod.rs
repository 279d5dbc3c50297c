//! State holders behind the two admin pages.
//!
//! Each view is a plain state container driven by messages. `update`
//! applies a message and hands back the fetches it wants performed;
//! running those against a [`DataSource`](crate::source::DataSource) and
//! feeding the result back as another message is up to the host.
//!
//! Every fetch whose answer replaces state is tagged with a
//! [`RequestToken`]. A response carrying anything but the most recently
//! issued token for its slot is stale and gets dropped, so a slow answer
//! for a previous selection never overwrites a newer one.

pub mod expert;
pub mod metrics;

pub use expert::ExpertView;
pub use metrics::MetricsView;

/// Generation number of a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens for one fetch slot and remembers the latest.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    latest: Option<RequestToken>,
}

impl TokenIssuer {
    pub fn issue(&mut self) -> RequestToken {
        let next = RequestToken(self.latest.map_or(1, |RequestToken(n)| n + 1));
        self.latest = Some(next);
        next
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("nothing to export: {0} not loaded yet")]
    NotLoaded(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let mut issuer = TokenIssuer::default();
        let first = issuer.issue();
        assert!(issuer.is_current(first));
        let second = issuer.issue();
        assert!(second > first);
        assert!(!issuer.is_current(first));
        assert!(issuer.is_current(second));
    }
}
