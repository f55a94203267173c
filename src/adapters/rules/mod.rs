//! Rules backend adapters.

mod http_client;
mod mock;

pub use http_client::{HttpRulesConfig, HttpRulesService};
pub use mock::MockRulesService;
