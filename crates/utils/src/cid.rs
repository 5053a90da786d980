use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;

const DEFAULT_CID_LENGTH: usize = 6;

/// Short random tag attached to a server run so log files and chat
/// transcripts from the same session can be matched up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self::with_length(DEFAULT_CID_LENGTH)
    }

    pub fn with_length(length: usize) -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
