//! Mock rules backend for testing.
//!
//! Scripted responses, injectable failures and a call log. Clones share
//! state, so a test can keep one handle for assertions and give another to
//! the schedulers.
//!
//! # Example
//!
//! ```ignore
//! let rules = MockRulesService::new()
//!     .with_close_outcome(outcome)
//!     .failing(RulesEndpoint::JackpotNewGame, 2);
//!
//! // ... drive the schedulers ...
//! assert_eq!(rules.calls_to(RulesEndpoint::JackpotNewGame), 3);
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::wheel::WheelOutcome;
use crate::ports::{
    JackpotStatus, RulesCall, RulesEndpoint, RulesError, RulesService, SetStatusAck,
};

/// How many upcoming calls to an endpoint should fail, and with which
/// HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failures {
    Next { remaining: u32, status: u16 },
    Always { status: u16 },
}

#[derive(Debug)]
struct MockState {
    close_outcome: WheelOutcome,
    slider: Value,
    new_game: Value,
    status: JackpotStatus,
    failures: HashMap<RulesEndpoint, Failures>,
    delays: HashMap<RulesEndpoint, Duration>,
    calls: Vec<RulesCall>,
}

#[derive(Debug, Clone)]
pub struct MockRulesService {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockRulesService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRulesService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                close_outcome: WheelOutcome {
                    spin_value: 0,
                    last_color: "green".to_string(),
                    game_id: 1,
                },
                slider: json!({ "winner": null }),
                new_game: json!({ "id": 1 }),
                status: JackpotStatus {
                    id: None,
                    status: 0,
                    room: None,
                    min: 0,
                    sec: 0,
                    time: 0,
                    timer: 0,
                },
                failures: HashMap::new(),
                delays: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Result returned by every `/api/wheel/close` call.
    pub fn with_close_outcome(self, outcome: WheelOutcome) -> Self {
        self.lock().close_outcome = outcome;
        self
    }

    pub fn with_slider(self, slider: Value) -> Self {
        self.lock().slider = slider;
        self
    }

    pub fn with_new_game(self, new_game: Value) -> Self {
        self.lock().new_game = new_game;
        self
    }

    pub fn with_status(self, status: JackpotStatus) -> Self {
        self.lock().status = status;
        self
    }

    /// Fail the next `times` calls to `endpoint` with HTTP 503.
    pub fn failing(self, endpoint: RulesEndpoint, times: u32) -> Self {
        self.failing_with_status(endpoint, times, 503)
    }

    /// Fail the next `times` calls to `endpoint` with the given HTTP status.
    pub fn failing_with_status(self, endpoint: RulesEndpoint, times: u32, status: u16) -> Self {
        self.lock().failures.insert(
            endpoint,
            Failures::Next {
                remaining: times,
                status,
            },
        );
        self
    }

    /// Fail every call to `endpoint` with HTTP 503.
    pub fn always_failing(self, endpoint: RulesEndpoint) -> Self {
        self.lock()
            .failures
            .insert(endpoint, Failures::Always { status: 503 });
        self
    }

    /// Delay responses from `endpoint`.
    pub fn with_delay(self, endpoint: RulesEndpoint, delay: Duration) -> Self {
        self.lock().delays.insert(endpoint, delay);
        self
    }

    /// Change the close outcome on a shared handle mid-test.
    pub fn set_close_outcome(&self, outcome: WheelOutcome) {
        self.lock().close_outcome = outcome;
    }

    /// Stop injecting failures for `endpoint`.
    pub fn recover(&self, endpoint: RulesEndpoint) {
        self.lock().failures.remove(&endpoint);
    }

    pub fn calls(&self) -> Vec<RulesCall> {
        self.lock().calls.clone()
    }

    pub fn calls_to(&self, endpoint: RulesEndpoint) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Records the call and returns whether it should fail.
    async fn begin(&self, endpoint: RulesEndpoint, body: Option<Value>) -> Result<(), RulesError> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(RulesCall { endpoint, body });
            state.delays.get(&endpoint).copied()
        };

        if let Some(delay) = delay {
            sleep(delay).await;
        }

        let mut state = self.lock();
        let failure = match state.failures.get_mut(&endpoint) {
            Some(Failures::Always { status }) => Some(*status),
            Some(Failures::Next { remaining, status }) if *remaining > 0 => {
                *remaining -= 1;
                Some(*status)
            }
            _ => None,
        };

        match failure {
            Some(status) => Err(RulesError::Status { endpoint, status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RulesService for MockRulesService {
    async fn close_wheel_bets(&self) -> Result<WheelOutcome, RulesError> {
        self.begin(RulesEndpoint::WheelClose, None).await?;
        Ok(self.lock().close_outcome.clone())
    }

    async fn open_wheel_bets(&self) -> Result<(), RulesError> {
        self.begin(RulesEndpoint::WheelOpen, None).await
    }

    async fn start_wheel_game(&self) -> Result<(), RulesError> {
        self.begin(RulesEndpoint::WheelStart, None).await
    }

    async fn end_wheel_bets(&self) -> Result<(), RulesError> {
        self.begin(RulesEndpoint::WheelEnd, None).await
    }

    async fn jackpot_slider(&self) -> Result<Value, RulesError> {
        self.begin(RulesEndpoint::JackpotSlider, None).await?;
        Ok(self.lock().slider.clone())
    }

    async fn jackpot_new_game(&self) -> Result<Value, RulesError> {
        self.begin(RulesEndpoint::JackpotNewGame, None).await?;
        Ok(self.lock().new_game.clone())
    }

    async fn jackpot_status(&self) -> Result<JackpotStatus, RulesError> {
        self.begin(RulesEndpoint::JackpotStatus, None).await?;
        Ok(self.lock().status.clone())
    }

    async fn jackpot_set_status(&self, status: i64) -> Result<SetStatusAck, RulesError> {
        self.begin(
            RulesEndpoint::JackpotSetStatus,
            Some(json!({ "status": status })),
        )
        .await?;
        Ok(SetStatusAck {
            msg: Some(format!("status set to {}", status)),
        })
    }
}
