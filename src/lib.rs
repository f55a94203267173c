//! Casino Orchestrator - real-time round coordination for wheel and jackpot games.
//!
//! Relays pub/sub events from the game backend to WebSocket clients, tracks
//! how many players are online and drives the timed wheel and jackpot rounds.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
