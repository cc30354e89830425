//! GPIO button input with async debouncing.
//!
//! Four buttons on the nRF52840-DK (active-low with internal pull-up).
//! Each button is handled by an async task that waits for a GPIO edge,
//! debounces it, and reports a [`ButtonChange`] with the mask of all
//! buttons currently held.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};

use crate::config::BUTTON_DEBOUNCE_MS;
use crate::ui::ButtonChange;

/// Bit `n` set while button `n + 1` is held.
static HELD: AtomicU32 = AtomicU32::new(0);

/// Run a single button polling loop.
///
/// `index` is the 0-based button number. Both edges are reported; the
/// input adapter ignores releases.
pub async fn button_task(
    pin: AnyPin,
    index: u8,
    tx: Sender<'static, CriticalSectionRawMutex, ButtonChange, 4>,
) -> ! {
    let mut btn = Input::new(pin, Pull::Up);
    let bit = 1u32 << index;

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if !btn.is_low() {
            continue;
        }

        let state = HELD.fetch_or(bit, Ordering::Relaxed) | bit;
        info!("Button {} down", index + 1);
        tx.send(ButtonChange { state, changed: bit }).await;

        // Wait for release to avoid repeat triggers.
        btn.wait_for_rising_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        let state = HELD.fetch_and(!bit, Ordering::Relaxed) & !bit;
        tx.send(ButtonChange { state, changed: bit }).await;
    }
}
