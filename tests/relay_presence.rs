//! Integration tests for the bus relay and presence tracking.
//!
//! The relay runs over the in-memory bus with real schedulers behind it;
//! presence is exercised through the same hub clients subscribe to.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::{json, Value};
use tokio::sync::{broadcast, watch};
use tokio::time::sleep;

use casino_orchestrator::adapters::bus::{InMemoryMessageBus, InMemoryPublisher};
use casino_orchestrator::adapters::rules::MockRulesService;
use casino_orchestrator::adapters::websocket::ClientHub;
use casino_orchestrator::application::handlers::{
    JackpotHandle, JackpotScheduler, JackpotSchedulerConfig, PresenceService, Relay, WheelHandle,
    WheelScheduler, WheelSchedulerConfig,
};
use casino_orchestrator::domain::foundation::ClientAddress;
use casino_orchestrator::domain::jackpot::JackpotPhase;
use casino_orchestrator::domain::relay::{
    route, OutboundEvent, OutboundTopic, RelayAction, WheelEventTypes,
};
use casino_orchestrator::domain::wheel::WheelPhase;
use casino_orchestrator::ports::RulesEndpoint;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Stack {
    publisher: InMemoryPublisher,
    events: broadcast::Receiver<OutboundEvent>,
    wheel: WheelHandle,
    jackpot: JackpotHandle,
    rules: MockRulesService,
    relay_task: tokio::task::JoinHandle<()>,
    _shutdown: watch::Sender<bool>,
}

fn stack() -> Stack {
    let hub = ClientHub::new(1024);
    let events = hub.subscribe();
    let broadcaster = Arc::new(hub);
    let rules = MockRulesService::new();

    let (wheel, wheel_handle) = WheelScheduler::new(
        WheelSchedulerConfig::default(),
        Arc::new(rules.clone()),
        broadcaster.clone(),
    );
    let (jackpot, jackpot_handle) = JackpotScheduler::new(
        JackpotSchedulerConfig::default(),
        Arc::new(rules.clone()),
        broadcaster.clone(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(wheel.run(shutdown_rx.clone()));
    tokio::spawn(jackpot.run(shutdown_rx.clone()));

    let (bus, publisher) = InMemoryMessageBus::new();
    let relay = Relay::new(
        broadcaster,
        wheel_handle.clone(),
        jackpot_handle.clone(),
        WheelEventTypes::new(["wheel_bet", "wheel_bets"]).unwrap(),
    );
    let relay_task = tokio::spawn(async move {
        relay.run(bus, shutdown_rx).await.unwrap();
    });

    Stack {
        publisher,
        events,
        wheel: wheel_handle,
        jackpot: jackpot_handle,
        rules,
        relay_task,
        _shutdown: shutdown_tx,
    }
}

fn drain(rx: &mut broadcast::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

// =============================================================================
// Relay
// =============================================================================

#[tokio::test(start_paused = true)]
async fn generic_channels_reach_clients_verbatim() {
    let mut s = stack();

    s.publisher.publish("withdraw", r#"{"user":"u1","amount":25}"#);
    s.publisher.publish("crash", r#"{"multiplier":2.5}"#);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        drain(&mut s.events),
        vec![
            OutboundEvent::new(OutboundTopic::Withdraw, json!({"user": "u1", "amount": 25})),
            OutboundEvent::new(OutboundTopic::Crash, json!({"multiplier": 2.5})),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn bad_messages_are_dropped_and_relay_keeps_going() {
    let mut s = stack();

    s.publisher.publish("crash", "not json");
    s.publisher.publish("wheel", r#"{"type":"wheel_unknown"}"#);
    s.publisher.publish("admin", r#"{"type":"shutdown"}"#);
    s.publisher.publish("elsewhere", r#"{"ignored":true}"#);
    s.publisher.publish("test", r#"{"ok":true}"#);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        drain(&mut s.events),
        vec![OutboundEvent::new(OutboundTopic::Test, json!({"ok": true}))]
    );
    assert!(!s.relay_task.is_finished());
}

#[tokio::test(start_paused = true)]
async fn wheel_events_keep_their_type_as_topic() {
    let mut s = stack();

    s.publisher.publish("wheel", r#"{"type":"wheel_history","rows":[]}"#);
    s.publisher.publish("wheel", r#"{"type":"wheel_bet","amount":10}"#);
    sleep(Duration::from_millis(10)).await;

    let events = drain(&mut s.events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic.as_str(), "wheel_bet");
    assert_eq!(events[0].payload["amount"], json!(10));
}

#[tokio::test(start_paused = true)]
async fn timer_channels_drive_the_schedulers() {
    let mut s = stack();

    s.publisher.publish("wheel_timer", "");
    s.publisher.publish("jackpot.timer", r#"{"min":0,"sec":30,"time":30}"#);
    sleep(Duration::from_millis(1_500)).await;

    assert_eq!(s.wheel.snapshot().await.unwrap().phase, WheelPhase::CountingDown);
    assert_eq!(s.jackpot.snapshot().await.unwrap().phase, JackpotPhase::Counting);

    let events = drain(&mut s.events);
    assert!(events.contains(&OutboundEvent::wheel_start(15)));
    assert!(events.contains(&OutboundEvent::wheel_start(14)));
    assert!(events.contains(&OutboundEvent::jackpot_timer(0, 29, 29, 30)));
}

#[tokio::test(start_paused = true)]
async fn admin_stop_goes_through_the_relay() {
    let mut s = stack();

    s.publisher.publish("wheel_timer", "");
    sleep(Duration::from_millis(2_500)).await;
    s.publisher.publish("admin", r#"{"type":"stopWheel"}"#);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(s.wheel.snapshot().await.unwrap().phase, WheelPhase::Resetting);
    assert_eq!(s.rules.calls_to(RulesEndpoint::WheelClose), 1);

    sleep(Duration::from_millis(600)).await;
    let events = drain(&mut s.events);
    assert!(events.iter().any(|e| e.topic == OutboundTopic::WheelClear));
}

#[tokio::test(start_paused = true)]
async fn relay_stops_when_bus_closes() {
    let s = stack();

    drop(s.publisher);
    tokio::time::timeout(Duration::from_secs(1), s.relay_task)
        .await
        .expect("relay should exit once the bus closes")
        .unwrap();
}

// =============================================================================
// Presence
// =============================================================================

fn live_counts(rx: &mut broadcast::Receiver<OutboundEvent>) -> Vec<Value> {
    drain(rx)
        .into_iter()
        .filter(|e| e.topic == OutboundTopic::Live)
        .map(|e| e.payload["count"].clone())
        .collect()
}

#[tokio::test]
async fn presence_counts_addresses_not_sockets() {
    let hub = ClientHub::new(64);
    let mut rx = hub.subscribe();
    let presence = PresenceService::new(Arc::new(hub));

    let a1 = presence.connect(ClientAddress::from("10.0.0.1")).await;
    let a2 = presence.connect(ClientAddress::from("10.0.0.1")).await;
    let b = presence.connect(ClientAddress::from("10.0.0.2")).await;
    presence.disconnect(&a1).await;
    presence.disconnect(&a2).await;
    presence.disconnect(&b).await;

    assert_eq!(
        live_counts(&mut rx),
        vec![json!(1), json!(1), json!(2), json!(2), json!(1), json!(0)]
    );
    assert_eq!(presence.online_count().await, 0);
}

#[tokio::test]
async fn presence_ignores_unknown_disconnects() {
    let hub = ClientHub::new(64);
    let mut rx = hub.subscribe();
    let presence = PresenceService::new(Arc::new(hub));

    let a = presence.connect(ClientAddress::from("10.0.0.1")).await;
    presence.disconnect(&a).await;
    presence.disconnect(&a).await;

    assert_eq!(presence.online_count().await, 0);
    assert_eq!(live_counts(&mut rx).last(), Some(&json!(0)));
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #[test]
    fn generic_payloads_are_forwarded_unchanged(
        user in "[a-z]{1,12}",
        amount in 0i64..1_000_000,
        note in proptest::option::of("[ -~]{0,24}"),
    ) {
        let body = json!({ "user": user, "amount": amount, "note": note });
        let action = route("withdraw", &body.to_string(), &WheelEventTypes::default()).unwrap();
        prop_assert_eq!(
            action,
            RelayAction::Broadcast(OutboundEvent::new(OutboundTopic::Withdraw, body))
        );
    }

    #[test]
    fn unknown_channels_are_rejected(channel in "[a-z]{3,10}\\.[a-z]{3,10}") {
        prop_assume!(channel != "jackpot.newbet" && channel != "jackpot.timer");
        let result = route(&channel, "{}", &WheelEventTypes::default());
        prop_assert!(result.is_err());
    }
}
