//! Typed service configuration.
//!
//! Everything comes from `CASINO_ORCHESTRATOR__*` environment variables
//! (a `.env` file is read first when present). Nesting uses `__`, so
//! `CASINO_ORCHESTRATOR__ROUNDS__JACKPOT__BUILD_UP_SECS=10` sets
//! `rounds.jackpot.build_up_secs`. `relay.wheel_event_types` is read as a
//! comma separated list. Only `redis.url` has no default.
//!
//! ```no_run
//! use casino_orchestrator::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod redis;
mod relay;
mod rounds;
mod rules;
mod server;

pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use relay::RelayConfig;
pub use rounds::{JackpotRoundConfig, RoundsConfig, WheelRoundConfig};
pub use rules::RulesConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root of the configuration tree.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Listener configuration (host, port, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis pub/sub feed
    pub redis: RedisConfig,

    /// Rules backend HTTP client
    #[serde(default)]
    pub rules: RulesConfig,

    /// Wheel and jackpot timings
    #[serde(default)]
    pub rounds: RoundsConfig,

    /// Bus relay forwarding rules
    #[serde(default)]
    pub relay: RelayConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and the prefixed environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CASINO_ORCHESTRATOR")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("relay.wheel_event_types"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.rules.validate()?;
        self.rounds.validate()?;
        self.relay.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
