//! Relay domain - inbound channel routing and outbound client events.
//!
//! ```text
//!   bus message (channel, payload)
//!            │
//!            ▼
//!        route()  ──► RelayError (logged, dropped)
//!            │
//!   ┌────────┼──────────────┬────────────────┐
//!   ▼        ▼              ▼                ▼
//! Broadcast StartWheel   Admin(cmd)    StartJackpot(req)
//! ```

mod admin;
mod channel;
mod errors;
mod outbound;
mod routing;
mod wheel_events;

pub use admin::AdminCommand;
pub use channel::InboundChannel;
pub use errors::RelayError;
pub use outbound::{OutboundEvent, OutboundTopic};
pub use routing::{route, RelayAction};
pub use wheel_events::WheelEventTypes;
