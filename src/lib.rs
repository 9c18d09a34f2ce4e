//! Roomcast - Room-State Synchronization Service
//!
//! This crate keeps a fleet of display "rooms" in sync over persistent
//! WebSocket connections, resolving each room's daily schedule from calendar
//! overrides and weekly defaults and pushing snapshots whenever room state
//! changes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
