//! Application handlers.
//!
//! Long-running tasks and services that drive the domain:
//!
//! - `presence` - Online count bookkeeping for sockets
//! - `relay` - Bus message dispatch
//! - `admin` - Operator controls
//! - `wheel_scheduler` / `jackpot_scheduler` - One task per round type
//! - `timers` - Cancellable ticker and deadline used by the schedulers

pub mod admin;
pub mod errors;
pub mod jackpot_scheduler;
pub mod presence;
pub mod relay;
pub mod timers;
pub mod wheel_scheduler;

pub use admin::AdminControlHandler;
pub use errors::SchedulerError;
pub use jackpot_scheduler::{
    JackpotCommand, JackpotHandle, JackpotScheduler, JackpotSchedulerConfig,
};
pub use presence::PresenceService;
pub use relay::Relay;
pub use timers::{Deadline, Ticker};
pub use wheel_scheduler::{WheelCommand, WheelHandle, WheelScheduler, WheelSchedulerConfig};
