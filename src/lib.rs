//! wifi-knob: pick a WiFi network and type its password with two
//! potentiometers, one button and a 128×64 OLED.
//!
//! Everything above the hardware runs on the host: the connection policy
//! ([`wifi::orchestrator`]), the network browser ([`wifi::selector`]), the
//! on-screen keyboard and the credential vault all talk to the board
//! through four seams:
//!
//! - [`wifi::Radio`] - station-mode scan / connect / status
//! - [`storage::CredentialStore`] - namespaced string key-value store
//! - [`ui::input::ControlInputs`] - raw pot and button levels
//! - [`ui::Surface`] - monochrome draw target with a `present` step
//!
//! [`mock`] implements all four in RAM for tests. The ESP32-C3 versions
//! live in `board` behind the `embedded` feature.
//!
//! Usage: `cargo test` (host), `cargo run --release --features embedded`
//! (target, via espflash).

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod config;
pub mod context;
pub mod error;
pub mod mock;
pub mod storage;
pub mod ui;
pub mod wifi;

#[cfg(feature = "embedded")]
pub mod board;

pub use config::Config;
pub use context::Context;
pub use error::{Error, Result};
pub use wifi::orchestrator::{Orchestrator, Progress, Stage};
