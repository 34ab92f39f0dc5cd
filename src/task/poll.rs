use crate::{
    Error, Result,
    api::{API_STATUS_OK, KlingApi, StatusResponse, TASK_STATUS_COMPLETE, TASK_STATUS_FAILED},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Fixed wait between status queries. Uniform, no jitter.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

// Poll states
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Polling,
    Succeeded(String),
    Failed(PollFailure),
    TimedOut,
}

// Poll events, one per status-fetch observation
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    InProgress(i64),
    Completed(String),
    TaskFailed(Option<String>),
    AuthRejected,
    TransportFailed(String),
    DeadlineExceeded,
}

/// Why a poll ended in Failure. Auth and transport failures on the status
/// fetch are definitive: the fetch is never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum PollFailure {
    Auth,
    /// The service marked the task failed, with its reason when one was
    /// reported.
    Task(Option<String>),
    Transport(String),
}

/// Terminal result of one poll. Callers never retry after receiving it.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success(String),
    Failure(PollFailure),
    Timeout,
}

/// Explicit state machine for the polling loop. Terminal states are final:
/// feeding an event into a terminal state is a contract violation.
pub struct PollStateMachine {
    state: PollState,
}

impl PollStateMachine {
    pub fn new() -> Self {
        Self {
            state: PollState::Polling,
        }
    }

    pub fn current_state(&self) -> &PollState {
        &self.state
    }

    pub fn transition(&mut self, event: PollEvent) -> Result<()> {
        let new_state = match (&self.state, &event) {
            (PollState::Polling, PollEvent::InProgress(_)) => PollState::Polling,
            (PollState::Polling, PollEvent::Completed(url)) => PollState::Succeeded(url.clone()),
            (PollState::Polling, PollEvent::TaskFailed(reason)) => {
                PollState::Failed(PollFailure::Task(reason.clone()))
            }
            (PollState::Polling, PollEvent::AuthRejected) => PollState::Failed(PollFailure::Auth),
            (PollState::Polling, PollEvent::TransportFailed(reason)) => {
                PollState::Failed(PollFailure::Transport(reason.clone()))
            }
            (PollState::Polling, PollEvent::DeadlineExceeded) => PollState::TimedOut,
            _ => {
                warn!(
                    "Invalid poll transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::internal(format!(
                    "invalid poll transition from {:?} with event {:?}",
                    self.state, event
                )));
            }
        };

        if self.state != new_state {
            debug!("Poll state transition: {:?} -> {:?}", self.state, new_state);
        }

        self.state = new_state;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, PollState::Polling)
    }

    pub fn into_outcome(self) -> Option<PollOutcome> {
        match self.state {
            PollState::Polling => None,
            PollState::Succeeded(url) => Some(PollOutcome::Success(url)),
            PollState::Failed(failure) => Some(PollOutcome::Failure(failure)),
            PollState::TimedOut => Some(PollOutcome::Timeout),
        }
    }
}

impl Default for PollStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies one status fetch into a poll event. A failed fetch is treated
/// as a definitive job failure rather than something to retry.
pub fn classify_status_fetch(fetch: Result<StatusResponse>) -> PollEvent {
    let response = match fetch {
        Ok(response) => response,
        Err(Error::Auth(_)) => return PollEvent::AuthRejected,
        Err(e) => return PollEvent::TransportFailed(e.to_string()),
    };

    if response.status != API_STATUS_OK {
        return PollEvent::AuthRejected;
    }

    let data = match response.data {
        Some(data) => data,
        None => return PollEvent::AuthRejected,
    };

    match data.status {
        TASK_STATUS_FAILED => PollEvent::TaskFailed(response.message),
        TASK_STATUS_COMPLETE => {
            let url = data
                .works
                .first()
                .and_then(|w| w.resource.as_ref())
                .map(|r| r.resource.clone());
            match url {
                Some(url) => PollEvent::Completed(url),
                // Complete but no work item to show for it.
                None => PollEvent::TaskFailed(None),
            }
        }
        code => PollEvent::InProgress(code),
    }
}

/// Repeatedly queries task status until a terminal state or the deadline.
/// The deadline is checked before each query; once it has passed, no
/// further request is issued.
pub struct TaskPoller {
    api: Arc<dyn KlingApi>,
    interval: Duration,
    print_progress: bool,
}

impl TaskPoller {
    pub fn new(api: Arc<dyn KlingApi>, print_progress: bool) -> Self {
        Self {
            api,
            interval: POLL_INTERVAL,
            print_progress,
        }
    }

    /// Shorter interval for tests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn poll(&self, task_id: &str, timeout: Duration) -> Result<PollOutcome> {
        let started = Instant::now();
        let mut fsm = PollStateMachine::new();

        while !fsm.is_terminal() {
            if started.elapsed() >= timeout {
                error!("Task ID: {} | Polling timed out", task_id);
                fsm.transition(PollEvent::DeadlineExceeded)?;
                break;
            }

            let event = classify_status_fetch(self.api.task_status(task_id).await);

            match &event {
                PollEvent::InProgress(code) => {
                    if self.print_progress {
                        info!("Task ID: {} | Status: {}", task_id, code);
                    }
                }
                PollEvent::Completed(url) => {
                    if self.print_progress {
                        info!("Task ID: {} | Image URL: {}", task_id, url);
                    }
                }
                PollEvent::TaskFailed(reason) => error!(
                    "Task ID: {} | Fail Reason: {}",
                    task_id,
                    reason.as_deref().unwrap_or("not reported")
                ),
                PollEvent::AuthRejected => {
                    error!("Task ID: {} | Status fetch rejected, cookie invalid", task_id)
                }
                PollEvent::TransportFailed(reason) => {
                    error!("Task ID: {} | Status fetch failed: {}", task_id, reason)
                }
                PollEvent::DeadlineExceeded => {}
            }

            fsm.transition(event)?;

            if !fsm.is_terminal() {
                tokio::time::sleep(self.interval).await;
            }
        }

        fsm.into_outcome()
            .ok_or_else(|| Error::internal("poll loop exited without a terminal state"))
    }
}
