//! User interface subsystem - OLED display + two potentiometers + one button.
//!
//! Everything here is drawn through embedded-graphics onto a
//! [`Surface`], so the same code paints the SSD1306 on target and a RAM
//! frame buffer in host tests.
//!
//! ## Components
//!
//! - **input**: debounced pots and button, one [`input::InputFrame`] per poll
//! - **keyboard**: character-grid password entry
//! - **marquee**: scrolling text for fields narrower than their content
//! - **screens**: full-screen painters for each step of the connection flow

pub mod input;
pub mod input_logic;
pub mod keyboard;
pub mod marquee;
pub mod screens;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

use crate::error::Result;

/// A monochrome draw target whose contents become visible on `present`.
pub trait Surface: DrawTarget<Color = BinaryColor> {
    /// Push the frame to the panel.
    fn present(&mut self) -> Result<()>;
}
