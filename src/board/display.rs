//! SSD1306 OLED display wrapper.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::config::OLED_I2C_ADDRESS;
use crate::error::{Error, Result};
use crate::ui::Surface;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Panel<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Buffered 128×64 panel. Drawing goes to RAM; `present` pushes it out.
pub struct OledSurface<I2C> {
    panel: Panel<I2C>,
}

impl<I2C> OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and clear the screen.
    pub fn init(i2c: I2C) -> Result<Self> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, OLED_I2C_ADDRESS);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        if let Err(e) = panel.init() {
            error!("SSD1306 init failed: {:?}", defmt::Debug2Format(&e));
            return Err(Error::Display);
        }
        panel.clear_buffer();
        panel.flush().map_err(|_| Error::Display)?;

        Ok(Self { panel })
    }
}

impl<I2C> OriginDimensions for OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn size(&self) -> Size {
        self.panel.size()
    }
}

impl<I2C> DrawTarget for OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Color = BinaryColor;
    type Error = <Panel<I2C> as DrawTarget>::Error;

    fn draw_iter<P>(&mut self, pixels: P) -> core::result::Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.panel.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> core::result::Result<(), Self::Error> {
        self.panel.clear(color)
    }
}

impl<I2C> Surface for OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn present(&mut self) -> Result<()> {
        self.panel.flush().map_err(|_| Error::Display)
    }
}
