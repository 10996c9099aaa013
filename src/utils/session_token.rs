use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SUFFIX_LEN: usize = 6;
const TIMESTAMP_LEN: usize = 14;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid session token: {0}")]
pub struct InvalidSessionToken(pub String);

/// Correlation key for one upload batch, e.g. `abc123_20240115093000`.
///
/// The same value names the storage folder for the inputs, the folder the
/// stitched output appears under, and the key of the status record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// Random base-36 suffix followed by the US Eastern wall-clock time.
    pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        let timestamp = now.with_timezone(&New_York).format("%Y%m%d%H%M%S");
        Self(format!("{}_{}", suffix, timestamp))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionToken {
    type Err = InvalidSessionToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSessionToken(s.to_string());
        let (suffix, timestamp) = s.split_once('_').ok_or_else(invalid)?;

        let suffix_ok =
            suffix.len() == SUFFIX_LEN && suffix.bytes().all(|b| b.is_ascii_alphanumeric());
        let timestamp_ok =
            timestamp.len() == TIMESTAMP_LEN && timestamp.bytes().all(|b| b.is_ascii_digit());

        if suffix_ok && timestamp_ok {
            Ok(Self(s.to_string()))
        } else {
            Err(invalid())
        }
    }
}
