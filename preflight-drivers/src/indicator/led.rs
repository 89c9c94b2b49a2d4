//! GPIO status LEDs
//!
//! Two LEDs on plain GPIO pins, directly or through a transistor. Boards
//! that sink the LED current drive the pins active-low.

use embedded_hal::digital::OutputPin;
use preflight_core::traits::{LedId, StatusLeds};

/// Blue and amber status LEDs
pub struct GpioLeds<B, A> {
    blue: B,
    amber: A,
    /// If true, LED on = pin low
    inverted: bool,
}

impl<B: OutputPin, A: OutputPin> GpioLeds<B, A> {
    /// Create the LED pair with both LEDs off
    ///
    /// # Arguments
    /// - `blue`, `amber`: The GPIO pins to control
    /// - `inverted`: If true, an LED is lit when its pin is LOW
    pub fn new(blue: B, amber: A, inverted: bool) -> Self {
        let mut leds = Self {
            blue,
            amber,
            inverted,
        };
        for led in LedId::ALL {
            leds.set(led, false);
        }
        leds
    }

    pub fn new_active_high(blue: B, amber: A) -> Self {
        Self::new(blue, amber, false)
    }

    pub fn new_active_low(blue: B, amber: A) -> Self {
        Self::new(blue, amber, true)
    }

    fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
        if high {
            pin.set_high()
        } else {
            pin.set_low()
        }
    }
}

impl<B: OutputPin, A: OutputPin> StatusLeds for GpioLeds<B, A> {
    fn set(&mut self, led: LedId, on: bool) {
        // on=true, inverted=false -> high; on=true, inverted=true -> low
        let high = on != self.inverted;
        let ok = match led {
            LedId::Blue => Self::drive(&mut self.blue, high).is_ok(),
            LedId::Amber => Self::drive(&mut self.amber, high).is_ok(),
        };
        if !ok {
            #[cfg(feature = "defmt")]
            defmt::warn!("led {}: pin write failed", led);
        }
    }
}
