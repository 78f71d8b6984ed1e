//! blepick: BLE peripheral picker core.
//!
//! Discovers nearby BLE peripherals, keeps a live roster deduplicated by
//! hardware address, and hands the chosen device back to the caller.
//! The crate has no platform dependencies and is testable on any host with
//! `cargo test`. Platform code (firmware, mobile bindings) provides the radio
//! stack and the keep-alive primitive through [`RadioStack`] and [`Prober`],
//! and renders whatever the session reports.
//!
//! Data flow:
//! - radio callback context → [`ScanAdapter`] (normalizes legacy/modern
//!   results, stamps the scan epoch) → [`ScanChannel`]
//! - owner task → [`run_session`] → [`ScanSession`] (state machine, roster,
//!   keep-alive workaround, deadline) → [`SessionListener`]
//! - caller → [`Command`] → [`gateway::apply`]

#![cfg_attr(not(test), no_std)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod gateway;
pub mod record;
pub mod roster;
pub mod runner;
pub mod session;
pub mod workaround;

#[cfg(test)]
mod mock;

pub use adapter::{RadioStack, ScanAdapter, ScanApi, ScanChannel, ScanConfig, ScanMode, ServiceFilter};
pub use config::{SessionConfig, ROSTER_CAPACITY};
pub use error::{AdapterError, ProbeError, ScanError, SelectionError};
pub use gateway::{Command, SelectionGateway, SelectionListener, SessionOutcome};
pub use record::{DeviceRecord, DiscoveryEvent, MacString, NameString, UuidString};
pub use roster::DeviceRoster;
pub use runner::{run_session, CommandChannel};
pub use session::{ScanSession, ScanState, SessionEvent, SessionListener};
pub use workaround::{CrashWorkaround, Prober};
