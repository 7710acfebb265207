use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use common::{PollOption, ResultItem, VoteSubmission, normalize_labels, total_votes};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::PollApi;

/// Message shown when a results refresh fails.
pub const RESULTS_ERROR: &str = "Failed to load results";

/// Outcome of the most recent vote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsState {
    /// True until the first fetch settles.
    pub loading: bool,
    /// Set by a failed refresh, cleared when the next one starts.
    pub error: Option<String>,
    /// Last successfully fetched list, labels normalized.
    pub items: Option<Vec<ResultItem>>,
}

impl Default for ResultsState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            items: None,
        }
    }
}

/// Everything a renderer needs to draw the ballot and the results panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub selected: Option<PollOption>,
    pub submitting: bool,
    pub submit_status: SubmitStatus,
    pub results: ResultsState,
}

impl ViewState {
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.submitting
    }

    pub fn total_votes(&self) -> u64 {
        self.results.items.as_deref().map(total_votes).unwrap_or(0)
    }
}

/// Owns the client-side poll state and publishes every change through a
/// `watch` channel.
pub struct PollController {
    api: Arc<dyn PollApi>,
    poll_id: String,
    state: watch::Sender<ViewState>,
    next_seq: AtomicU64,
    applied_seq: AtomicU64,
}

impl PollController {
    pub fn new(api: Arc<dyn PollApi>, poll_id: impl Into<String>) -> Self {
        Self {
            api,
            poll_id: poll_id.into(),
            state: watch::Sender::new(ViewState::default()),
            next_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
        }
    }

    pub fn poll_id(&self) -> &str {
        &self.poll_id
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn select(&self, option: PollOption) {
        self.state.send_if_modified(|s| {
            let changed = s.selected != Some(option);
            s.selected = Some(option);
            changed
        });
    }

    /// Submit the selected option once.
    ///
    /// Returns `None` without doing anything when nothing is selected or a
    /// submission is already in flight.
    pub async fn submit(&self) -> Option<SubmitStatus> {
        let mut option = None;
        self.state.send_if_modified(|s| {
            if !s.can_submit() {
                return false;
            }
            option = s.selected;
            s.submitting = true;
            s.submit_status = SubmitStatus::Idle;
            true
        });
        let option = option?;

        let mut guard = SubmitGuard {
            state: &self.state,
            status: SubmitStatus::Error,
        };

        let vote = VoteSubmission::new(&self.poll_id, option);
        guard.status = match self.api.submit_vote(&vote).await {
            Ok(()) => {
                info!(option = option.id(), user_id = %vote.user_id, "Vote submitted");
                SubmitStatus::Success
            }
            Err(e) => {
                warn!(option = option.id(), error = %e, "Vote submission failed");
                SubmitStatus::Error
            }
        };

        Some(guard.status)
    }

    /// Fetch results once and apply them unless a newer fetch already landed.
    pub async fn refresh_results(&self) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|s| s.results.error.take().is_some());

        let outcome = self.api.fetch_results(&self.poll_id).await;

        self.state.send_if_modified(|s| {
            let was_loading = std::mem::replace(&mut s.results.loading, false);

            if seq < self.applied_seq.load(Ordering::SeqCst) {
                debug!(seq, "Discarding results older than the ones shown");
                return was_loading;
            }
            self.applied_seq.store(seq, Ordering::SeqCst);

            match outcome {
                Ok(data) => {
                    s.results.items = Some(normalize_labels(data.items));
                }
                Err(e) => {
                    warn!(error = %e, "Results fetch failed");
                    s.results.error = Some(RESULTS_ERROR.to_string());
                }
            }
            true
        });
    }
}

/// Clears `submitting` on every exit from [`PollController::submit`],
/// including cancellation and panics.
struct SubmitGuard<'a> {
    state: &'a watch::Sender<ViewState>,
    status: SubmitStatus,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let status = self.status;
        self.state.send_modify(|s| {
            s.submitting = false;
            s.submit_status = status;
        });
    }
}

/// Handle to a running refresh loop. Dropping it stops future ticks;
/// fetches already in flight still complete.
pub struct RefreshLoop {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// Stop scheduling fetches and wait for the loop task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Fetch results now and then every `period`.
///
/// Each tick runs in its own task, so a slow fetch never delays the next
/// one.
pub fn spawn_refresh_loop(controller: Arc<PollController>, period: Duration) -> RefreshLoop {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let controller = Arc::clone(&controller);
                    tokio::spawn(async move { controller.refresh_results().await });
                }
            }
        }

        debug!("Refresh loop stopped");
    });

    RefreshLoop {
        cancel,
        handle: Some(handle),
    }
}
