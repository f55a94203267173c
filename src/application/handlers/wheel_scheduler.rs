//! Wheel scheduler - the task that owns the wheel round.
//!
//! All round mutation happens inside [`WheelScheduler::run`]. Callers talk
//! to it through a cloneable [`WheelHandle`]. Rules backend calls are
//! spawned and report back through an internal channel tagged with the
//! round epoch they were issued under, so the tick loop never waits on HTTP
//! and late answers from an abandoned round are discarded.
//!
//! ```text
//!  wheel_timer ─┐
//!  admin ───────┼─► WheelHandle ─► inbox ─┐
//!               │                         ▼
//!               │          ┌──── select! ─────────┐
//!               │          │ inbox   results      │
//!               │          │ ticker  restart delay│
//!               │          └──────────────────────┘
//!               │               │            ▲
//!               │   spawn rules call         │ WheelResult{epoch}
//!               └───────────────┴────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};

use crate::domain::foundation::RoundEpoch;
use crate::domain::relay::OutboundEvent;
use crate::domain::wheel::{WheelOutcome, WheelRound, WheelSettings, WheelSnapshot, WheelTick};
use crate::ports::{Broadcaster, RulesEndpoint, RulesError, RulesService};

use super::errors::SchedulerError;
use super::timers::{Deadline, Ticker};

const NAME: &str = "wheel";

/// Tunables for the wheel scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelSchedulerConfig {
    pub settings: WheelSettings,
    /// Length of one countdown/spin second.
    pub tick_interval: Duration,
    /// Pause between an admin stop and the restart.
    pub stop_delay: Duration,
    /// Call `/api/wheel/start` and `/api/wheel/open` on countdown starts.
    pub announce_bet_window: bool,
}

impl Default for WheelSchedulerConfig {
    fn default() -> Self {
        Self {
            settings: WheelSettings::default(),
            tick_interval: Duration::from_secs(1),
            stop_delay: Duration::from_millis(500),
            announce_bet_window: false,
        }
    }
}

#[derive(Debug)]
pub enum WheelCommand {
    /// Begin the countdown unless a round is already running.
    Start,
    /// Restart the countdown from a full window whatever the phase.
    Reload,
    /// Close bets now and restart after the stop delay.
    Stop,
    Snapshot(oneshot::Sender<WheelSnapshot>),
}

#[derive(Debug)]
enum WheelResult {
    BetsClosed {
        epoch: RoundEpoch,
        outcome: Result<WheelOutcome, RulesError>,
    },
}

/// Cloneable handle to a running [`WheelScheduler`].
#[derive(Debug, Clone)]
pub struct WheelHandle {
    sender: mpsc::Sender<WheelCommand>,
}

impl WheelHandle {
    async fn send(&self, command: WheelCommand) -> Result<(), SchedulerError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SchedulerError::Unavailable(NAME))
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.send(WheelCommand::Start).await
    }

    pub async fn reload(&self) -> Result<(), SchedulerError> {
        self.send(WheelCommand::Reload).await
    }

    pub async fn stop(&self) -> Result<(), SchedulerError> {
        self.send(WheelCommand::Stop).await
    }

    pub async fn snapshot(&self) -> Result<WheelSnapshot, SchedulerError> {
        let (tx, rx) = oneshot::channel();
        self.send(WheelCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| SchedulerError::Unavailable(NAME))
    }
}

pub struct WheelScheduler {
    config: WheelSchedulerConfig,
    round: WheelRound,
    rules: Arc<dyn RulesService>,
    broadcaster: Arc<dyn Broadcaster>,
    inbox: mpsc::Receiver<WheelCommand>,
    results_tx: mpsc::UnboundedSender<WheelResult>,
    results_rx: mpsc::UnboundedReceiver<WheelResult>,
    ticker: Ticker,
    restart: Deadline,
    game_announced: bool,
}

impl WheelScheduler {
    pub fn new(
        config: WheelSchedulerConfig,
        rules: Arc<dyn RulesService>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> (Self, WheelHandle) {
        let (sender, inbox) = mpsc::channel(64);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let scheduler = Self {
            round: WheelRound::new(config.settings),
            config,
            rules,
            broadcaster,
            inbox,
            results_tx,
            results_rx,
            ticker: Ticker::idle(),
            restart: Deadline::idle(),
            game_announced: false,
        };

        (scheduler, WheelHandle { sender })
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            countdown_secs = self.config.settings.countdown_secs,
            spin_secs = self.config.settings.spin_secs,
            "Wheel scheduler started"
        );
        let mut inbox_open = true;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                command = self.inbox.recv(), if inbox_open => match command {
                    Some(command) => self.handle_command(command),
                    None => inbox_open = false,
                },
                Some(result) = self.results_rx.recv() => self.handle_result(result),
                _ = self.ticker.tick() => self.on_tick(),
                _ = self.restart.fired() => self.restart_round(),
            }
        }

        tracing::info!("Wheel scheduler stopped");
    }

    fn handle_command(&mut self, command: WheelCommand) {
        match command {
            WheelCommand::Start => {
                if self.round.is_active() {
                    tracing::debug!(phase = ?self.round.phase(), "Wheel already running, start ignored");
                    return;
                }
                self.begin_countdown();
            }
            WheelCommand::Reload => {
                tracing::info!(phase = ?self.round.phase(), "Reloading wheel");
                self.ticker.cancel();
                self.restart.cancel();
                self.begin_countdown();
            }
            WheelCommand::Stop => self.stop(),
            WheelCommand::Snapshot(reply) => {
                let _ = reply.send(self.round.snapshot());
            }
        }
    }

    fn handle_result(&mut self, result: WheelResult) {
        match result {
            WheelResult::BetsClosed { epoch, outcome } => {
                match outcome {
                    Ok(outcome) => {
                        if !self.round.record_outcome(epoch, outcome) {
                            tracing::debug!(%epoch, current = %self.round.epoch(), "Discarding stale close-bets result");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!(%epoch, endpoint = %e.endpoint(), error = %e, "Closing wheel bets failed, spinning with previous result");
                    }
                }

                if self.round.begin_spin(epoch) {
                    tracing::debug!(%epoch, "Wheel spinning");
                    self.ticker.arm(self.config.tick_interval);
                }
            }
        }
    }

    fn on_tick(&mut self) {
        let tick = match self.round.tick() {
            Ok(tick) => tick,
            Err(e) => {
                tracing::error!(error = %e, "Wheel tick rejected");
                self.ticker.cancel();
                return;
            }
        };

        match tick {
            WheelTick::Idle => self.ticker.cancel(),
            WheelTick::Countdown(event) | WheelTick::Roll(event) => self.broadcast(event),
            WheelTick::BetsClosing { event, epoch } => {
                self.broadcast(event);
                self.ticker.cancel();
                self.spawn_close_bets(epoch);
            }
            WheelTick::RoundOver(event) => {
                self.broadcast(event);
                self.ticker.cancel();
                self.restart_round();
            }
        }
    }

    fn stop(&mut self) {
        self.ticker.cancel();
        self.restart.cancel();
        match self.round.stop() {
            Ok(epoch) => {
                tracing::info!(%epoch, "Stopping wheel");
                self.spawn_close_bets(epoch);
                self.restart.arm(self.config.stop_delay);
            }
            Err(e) => tracing::error!(error = %e, "Wheel stop rejected"),
        }
    }

    /// Settle the round and roll straight into the next countdown.
    fn restart_round(&mut self) {
        let epoch = self.round.epoch();
        let rules = Arc::clone(&self.rules);
        spawn_logged(RulesEndpoint::WheelEnd, epoch, async move {
            rules.end_wheel_bets().await
        });

        match self.round.begin_reset() {
            Ok(clear) => self.broadcast(clear),
            Err(e) => {
                tracing::error!(error = %e, "Wheel reset rejected");
                return;
            }
        }
        self.begin_countdown();
    }

    fn begin_countdown(&mut self) {
        if self.config.announce_bet_window && !self.game_announced {
            self.game_announced = true;
            let rules = Arc::clone(&self.rules);
            spawn_logged(RulesEndpoint::WheelStart, self.round.epoch(), async move {
                rules.start_wheel_game().await
            });
        }

        let opening = match self.round.begin_countdown() {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Wheel countdown rejected");
                return;
            }
        };
        tracing::debug!(epoch = %self.round.epoch(), "Wheel countdown started");

        if self.config.announce_bet_window {
            let rules = Arc::clone(&self.rules);
            spawn_logged(RulesEndpoint::WheelOpen, self.round.epoch(), async move {
                rules.open_wheel_bets().await
            });
        }

        self.broadcast(opening);
        self.ticker.arm(self.config.tick_interval);
    }

    fn spawn_close_bets(&self, epoch: RoundEpoch) {
        let rules = Arc::clone(&self.rules);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let outcome = rules.close_wheel_bets().await;
            let _ = results.send(WheelResult::BetsClosed { epoch, outcome });
        });
    }

    fn broadcast(&self, event: OutboundEvent) {
        self.broadcaster.broadcast(event);
    }
}

/// Fire-and-forget rules call; failures are only logged.
fn spawn_logged<F>(endpoint: RulesEndpoint, epoch: RoundEpoch, call: F)
where
    F: Future<Output = Result<(), RulesError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = call.await {
            tracing::warn!(%endpoint, %epoch, error = %e, "Wheel rules call failed");
        }
    });
}
