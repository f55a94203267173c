//! Relay - turns bus messages into broadcasts and scheduler commands.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::foundation::DomainError;
use crate::domain::relay::{route, InboundChannel, RelayAction, WheelEventTypes};
use crate::ports::{Broadcaster, BusMessage, MessageBus};

use super::admin::AdminControlHandler;
use super::jackpot_scheduler::JackpotHandle;
use super::wheel_scheduler::WheelHandle;

pub struct Relay {
    broadcaster: Arc<dyn Broadcaster>,
    wheel: WheelHandle,
    jackpot: JackpotHandle,
    admin: AdminControlHandler,
    wheel_events: WheelEventTypes,
}

impl Relay {
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        wheel: WheelHandle,
        jackpot: JackpotHandle,
        wheel_events: WheelEventTypes,
    ) -> Self {
        Self {
            broadcaster,
            admin: AdminControlHandler::new(wheel.clone()),
            wheel,
            jackpot,
            wheel_events,
        }
    }

    /// Process one inbound message.
    ///
    /// Errors mean the message was dropped; the relay itself is unaffected.
    pub async fn handle(&self, message: &BusMessage) -> Result<(), DomainError> {
        match route(&message.channel, &message.payload, &self.wheel_events)? {
            RelayAction::Broadcast(event) => self.broadcaster.broadcast(event),
            RelayAction::StartWheel => self.wheel.start().await?,
            RelayAction::Admin(command) => self.admin.handle(command).await?,
            RelayAction::StartJackpot(request) => self.jackpot.start(request).await?,
        }
        Ok(())
    }

    /// Subscribe to every inbound channel and relay until shutdown or until
    /// the bus closes.
    pub async fn run<B: MessageBus>(
        &self,
        mut bus: B,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), DomainError> {
        bus.subscribe(&InboundChannel::names()).await?;
        if self.wheel_events.is_empty() {
            tracing::warn!("No wheel event types configured, wheel channel messages will be dropped");
        }
        tracing::info!(wheel_event_types = self.wheel_events.len(), "Relay started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                next = bus.next_message() => match next {
                    Ok(Some(message)) => {
                        if let Err(e) = self.handle(&message).await {
                            tracing::warn!(channel = %message.channel, error = %e, "Dropped inbound message");
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Message bus closed");
                        break;
                    }
                    Err(e) => tracing::warn!(error = %e, "Message bus error"),
                },
            }
        }

        tracing::info!("Relay stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rules::MockRulesService;
    use crate::adapters::websocket::ClientHub;
    use crate::application::handlers::jackpot_scheduler::{JackpotScheduler, JackpotSchedulerConfig};
    use crate::application::handlers::wheel_scheduler::{WheelScheduler, WheelSchedulerConfig};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::relay::{OutboundEvent, OutboundTopic};
    use serde_json::json;
    use tokio::sync::broadcast;

    struct Fixture {
        relay: Relay,
        rx: broadcast::Receiver<OutboundEvent>,
        _shutdown: watch::Sender<bool>,
    }

    fn fixture() -> Fixture {
        let hub = ClientHub::new(64);
        let rx = hub.subscribe();
        let rules = Arc::new(MockRulesService::new());
        let hub = Arc::new(hub);
        let (wheel, wheel_handle) =
            WheelScheduler::new(WheelSchedulerConfig::default(), rules.clone(), hub.clone());
        let (jackpot, jackpot_handle) =
            JackpotScheduler::new(JackpotSchedulerConfig::default(), rules, hub.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(wheel.run(shutdown_rx.clone()));
        tokio::spawn(jackpot.run(shutdown_rx));

        Fixture {
            relay: Relay::new(
                hub,
                wheel_handle,
                jackpot_handle,
                WheelEventTypes::new(["wheel_bet", "wheel_bets"]).unwrap(),
            ),
            rx,
            _shutdown: shutdown_tx,
        }
    }

    #[tokio::test]
    async fn plain_channels_are_rebroadcast_verbatim() {
        let mut f = fixture();
        f.relay
            .handle(&BusMessage::new("withdraw", r#"{"user":7,"amount":"1.5"}"#))
            .await
            .unwrap();

        let event = f.rx.recv().await.unwrap();
        assert_eq!(event.topic, OutboundTopic::Withdraw);
        assert_eq!(event.payload, json!({ "user": 7, "amount": "1.5" }));
    }

    #[tokio::test]
    async fn wheel_channel_uses_payload_type() {
        let mut f = fixture();
        f.relay
            .handle(&BusMessage::new("wheel", r#"{"type":"wheel_bet","sum":10}"#))
            .await
            .unwrap();

        let event = f.rx.recv().await.unwrap();
        assert_eq!(event.topic, OutboundTopic::Wheel("wheel_bet".to_string()));
        assert_eq!(event.payload["sum"], json!(10));
    }

    #[tokio::test]
    async fn unconfigured_wheel_type_is_dropped() {
        let mut f = fixture();
        let err = f
            .relay
            .handle(&BusMessage::new("wheel", r#"{"type":"wheel_history","rows":[]}"#))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownEventType);
        assert!(f.rx.try_recv().is_err());

        f.relay
            .handle(&BusMessage::new("wheel", r#"{"type":"wheel_bets","rows":[]}"#))
            .await
            .unwrap();
        assert_eq!(f.rx.recv().await.unwrap().topic.as_str(), "wheel_bets");
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped_with_error() {
        let mut f = fixture();
        let err = f
            .relay
            .handle(&BusMessage::new("test", "{not json"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::MalformedPayload);
        assert!(f.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_wheel_type_is_not_broadcast() {
        let mut f = fixture();
        let result = f
            .relay
            .handle(&BusMessage::new("wheel", r#"{"type":"drop_tables"}"#))
            .await;

        assert!(result.is_err());
        assert!(f.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn wheel_timer_starts_countdown() {
        let mut f = fixture();
        f.relay
            .handle(&BusMessage::new("wheel_timer", "anything"))
            .await
            .unwrap();

        assert_eq!(f.rx.recv().await.unwrap(), OutboundEvent::wheel_start(15));
    }
}
