use crate::client::api::ApiClient;
use crate::client::error::ClientError;
use crate::models::StitchedVideoResponse;
use crate::utils::session_token::SessionToken;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Anything that can answer "is the stitched video there yet?".
#[async_trait]
pub trait StitchSource: Send + Sync + 'static {
    async fn check(&self, folder: &SessionToken) -> Result<StitchedVideoResponse, ClientError>;
}

#[async_trait]
impl StitchSource for ApiClient {
    async fn check(&self, folder: &SessionToken) -> Result<StitchedVideoResponse, ClientError> {
        self.check_stitched_video(folder).await
    }
}

/// How often to re-check and when to give up.
///
/// The default is a fixed 30 second interval with no attempt limit, which is
/// how the web client has always behaved. `backoff_factor` above 1.0 grows
/// the delay after each unsuccessful check, capped at `max_interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(30))
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            backoff_factor: 1.0,
            max_interval: interval,
            max_attempts: None,
        }
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = factor;
        self.max_interval = max_interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Delay before the next check, after `attempt` checks (1-based) came
    /// back without a result.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let cap = self.max_interval.max(self.interval).as_secs_f64();
        let factor = if self.backoff_factor.is_finite() {
            self.backoff_factor.max(1.0)
        } else {
            1.0
        };
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = (self.interval.as_secs_f64() * factor.powi(exponent)).min(cap);
        // f64 rounding can push huge intervals past Duration::MAX
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_interval.max(self.interval))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Available(String),
    Cancelled,
    Exhausted { attempts: u32 },
}

/// A running poll. Dropping the handle cancels the task.
pub struct PollHandle {
    folder: SessionToken,
    cancel: CancellationToken,
    join: JoinHandle<PollOutcome>,
    _guard: DropGuard,
}

impl PollHandle {
    pub fn folder(&self) -> &SessionToken {
        &self.folder
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn wait(self) -> Result<PollOutcome, ClientError> {
        let PollHandle { join, .. } = self;
        Ok(join.await?)
    }
}

pub struct StitchPoller<S: StitchSource> {
    source: Arc<S>,
    policy: PollPolicy,
}

impl<S: StitchSource> StitchPoller<S> {
    pub fn new(source: Arc<S>, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    /// Start checking `folder` in the background. The first check runs
    /// immediately; each later one is scheduled only after the previous one
    /// resolved, so checks for a session never overlap.
    pub fn watch(&self, folder: SessionToken) -> PollHandle {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(run_poll(
            self.source.clone(),
            folder.clone(),
            self.policy.clone(),
            cancel.clone(),
        ));

        PollHandle {
            folder,
            _guard: cancel.clone().drop_guard(),
            cancel,
            join,
        }
    }
}

async fn run_poll<S: StitchSource>(
    source: Arc<S>,
    folder: SessionToken,
    policy: PollPolicy,
    cancel: CancellationToken,
) -> PollOutcome {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = source.check(&folder) => result,
        };

        match result {
            Ok(StitchedVideoResponse {
                available: true,
                url: Some(url),
            }) => {
                info!("🎬 Stitched video available for {} after {} checks", folder, attempt);
                return PollOutcome::Available(url);
            }
            Ok(StitchedVideoResponse { available: true, url: None }) => {
                warn!("⚠️ Server reported {} available without a URL", folder);
            }
            Ok(_) => debug!("⏳ Stitched video for {} not ready (check {})", folder, attempt),
            Err(e) => warn!("❌ Error checking for stitched video {}: {}", folder, e),
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            info!("🛑 Giving up on {} after {} checks", folder, attempt);
            return PollOutcome::Exhausted { attempts: attempt };
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(policy.delay_after(attempt)) => {}
        }
    }
}
