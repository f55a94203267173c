//! Event names the `wheel` channel is allowed to fan out.
//!
//! The publisher picks the client-facing event name through the payload's
//! `type` field, so only names configured at startup are forwarded.

use std::collections::BTreeSet;

use super::errors::RelayError;
use super::outbound::OutboundTopic;

/// Validated allow-list of wheel event names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WheelEventTypes {
    names: BTreeSet<String>,
}

impl WheelEventTypes {
    /// Build the allow-list, rejecting names that are empty, contain
    /// characters outside `[A-Za-z0-9_.-]`, or shadow an event the
    /// orchestrator emits itself.
    pub fn new<I, S>(names: I) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if !is_valid_name(name) || OutboundTopic::is_reserved(name) {
                return Err(RelayError::InvalidWheelEventType(name.to_string()));
            }
            set.insert(name.to_string());
        }
        Ok(Self { names: set })
    }

    /// The configured name matching `declared`, if any.
    pub fn lookup(&self, declared: &str) -> Option<&str> {
        self.names.get(declared).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
