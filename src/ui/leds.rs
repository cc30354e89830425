//! Status LEDs (active-low on the nRF52840-DK).

use core::cell::RefCell;

use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};

use crate::config::RUN_LED_BLINK_INTERVAL_MS;
use crate::ui::StatusIndicator;

pub struct Led {
    pin: Mutex<CriticalSectionRawMutex, RefCell<Output<'static>>>,
}

impl Led {
    /// Create the LED switched off.
    pub fn new(pin: AnyPin) -> Self {
        Self {
            pin: Mutex::new(RefCell::new(Output::new(pin, Level::High, OutputDrive::Standard))),
        }
    }

    pub fn set(&self, on: bool) {
        let level = if on { Level::Low } else { Level::High };
        self.pin.lock(|pin| pin.borrow_mut().set_level(level));
    }

    pub fn toggle(&self) {
        self.pin.lock(|pin| pin.borrow_mut().toggle());
    }
}

impl StatusIndicator for Led {
    fn set_connected(&self, connected: bool) {
        self.set(connected);
    }
}

/// Toggle `led` forever, independent of the BLE state.
pub async fn blink_task(led: &'static Led) -> ! {
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(RUN_LED_BLINK_INTERVAL_MS)).await;
    }
}
