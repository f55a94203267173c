//! Message bus adapters (Redis in production, in-memory for tests).

mod in_memory;
mod redis;

pub use self::in_memory::{InMemoryMessageBus, InMemoryPublisher};
pub use self::redis::RedisMessageBus;
