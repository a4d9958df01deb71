//! Potentiometers on ADC1 and the select button.
//!
//! Two pots (X and Y) wired as voltage dividers between 3V3 and GND, read
//! one-shot at 11 dB attenuation so the full 0..=4095 range is usable.
//! The button is active-low with the internal pull-up enabled.
//!
//! Debouncing lives in [`crate::ui::input`]; this only samples levels.

use esp_hal::analog::adc::{Adc, AdcChannel, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::{AnalogPin, Input};
use esp_hal::peripherals::ADC1;
use esp_hal::Blocking;

use crate::config::ADC_MAX;
use crate::ui::input::ControlInputs;

pub struct KnobInputs<'d, X, Y> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    x: AdcPin<X, ADC1<'d>>,
    y: AdcPin<Y, ADC1<'d>>,
    button: Input<'d>,
    /// Last good readings, reused when a conversion fails.
    last_x: u16,
    last_y: u16,
}

impl<'d, X, Y> KnobInputs<'d, X, Y>
where
    X: AdcChannel + AnalogPin,
    Y: AdcChannel + AnalogPin,
{
    pub fn new(adc1: ADC1<'d>, x_pin: X, y_pin: Y, button: Input<'d>) -> Self {
        let mut config = AdcConfig::new();
        let x = config.enable_pin(x_pin, Attenuation::_11dB);
        let y = config.enable_pin(y_pin, Attenuation::_11dB);

        Self {
            adc: Adc::new(adc1, config),
            x,
            y,
            button,
            last_x: ADC_MAX / 2,
            last_y: ADC_MAX / 2,
        }
    }
}

impl<X, Y> ControlInputs for KnobInputs<'_, X, Y>
where
    X: AdcChannel + AnalogPin,
    Y: AdcChannel + AnalogPin,
{
    fn read_x(&mut self) -> u16 {
        if let Ok(raw) = nb::block!(self.adc.read_oneshot(&mut self.x)) {
            self.last_x = raw.min(ADC_MAX);
        }
        self.last_x
    }

    fn read_y(&mut self) -> u16 {
        if let Ok(raw) = nb::block!(self.adc.read_oneshot(&mut self.y)) {
            self.last_y = raw.min(ADC_MAX);
        }
        self.last_y
    }

    fn button_is_high(&mut self) -> bool {
        self.button.is_high()
    }
}
