//! ESP32-C3 implementations of the library seams.
//!
//! - **display**: SSD1306 over I²C as a [`crate::ui::Surface`]
//! - **controls**: two ADC potentiometers and an active-low button
//! - **radio**: `esp-radio` station + `embassy-net` DHCP as a [`crate::wifi::Radio`]
//! - **flash**: `sequential-storage` map on the NVS partition as a
//!   [`crate::storage::CredentialStore`]
//!
//! The radio and flash drivers are async; the library is tick-driven, so
//! each call is driven to completion with `embassy_futures::block_on`.

pub mod controls;
pub mod display;
pub mod flash;
pub mod radio;

pub use controls::KnobInputs;
pub use display::OledSurface;
pub use flash::FlashStore;
pub use radio::StationRadio;
