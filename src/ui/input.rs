//! Button presses → button characteristic + notification.

use crate::ble::notify::NotificationDispatcher;
use crate::ble::{Characteristic, Notifier, RemoteService};
use crate::config::BUTTON_COUNT;
use crate::error::NotifyError;
use crate::ui::ButtonChange;

/// Button identity (1-based) of a press edge, if `change` is one.
///
/// Release edges yield `None`, as do events where the pressed-and-changed
/// mask is not exactly one known button.
pub fn pressed_button(change: ButtonChange) -> Option<u8> {
    let pressed = change.state & change.changed;
    if pressed.count_ones() != 1 {
        return None;
    }
    let id = pressed.trailing_zeros() as u8 + 1;
    (id <= BUTTON_COUNT).then_some(id)
}

pub struct InputAdapter<'s, 'a, C, N> {
    service: &'s RemoteService<'a, C>,
    notifier: &'s N,
    dispatcher: NotificationDispatcher<'s, 'a, C, N>,
}

impl<'s, 'a, C, N> InputAdapter<'s, 'a, C, N>
where
    C: Clone,
    N: Notifier<C>,
{
    pub fn new(service: &'s RemoteService<'a, C>, notifier: &'s N) -> Self {
        Self {
            service,
            notifier,
            dispatcher: NotificationDispatcher::new(service, notifier),
        }
    }

    /// Handle a raw driver event. `None` if it was not a single press.
    pub fn on_button_change(&self, change: ButtonChange) -> Option<Result<(), NotifyError>> {
        if change.state & change.changed == 0 {
            return None;
        }
        match pressed_button(change) {
            Some(id) => Some(self.on_press(id)),
            None => {
                warn!(
                    "Ignoring ambiguous button event (state {:#x}, changed {:#x})",
                    change.state, change.changed
                );
                None
            }
        }
    }

    /// Store `id` as the button value and notify the peer.
    ///
    /// The notify result is returned for inspection; `NoConnection` and
    /// `NotSubscribed` are normal while idle and only logged at debug.
    /// Before the service is ready, or for an id outside
    /// `1..=BUTTON_COUNT`, the press is dropped entirely.
    ///
    /// The stack's attribute table is updated before the notification goes
    /// out, so a peer reading on receipt sees the new value.
    pub fn on_press(&self, id: u8) -> Result<(), NotifyError> {
        if !(1..=BUTTON_COUNT).contains(&id) {
            warn!("Ignoring press of unknown button {}", id);
            return Err(NotifyError::UnknownButton(id));
        }
        if !self.service.is_ready() {
            warn!("Button {} pressed before the service is ready", id);
            return Err(NotifyError::NotReady);
        }

        info!("Button {} pressed", id);
        self.service.store().set_button(id);
        if let Err(e) = self.notifier.set_value(Characteristic::Button, &[id]) {
            warn!("Button attribute not updated: {:?}", e);
        }

        let result = self.dispatcher.notify(id);
        match result {
            Ok(()) => {}
            Err(e) if e.is_expected() => debug!("Button {} not sent: {:?}", id, e),
            Err(e) => error!("Couldn't send notification: {:?}", e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(state: u32, changed: u32) -> ButtonChange {
        ButtonChange { state, changed }
    }

    #[test]
    fn single_press_maps_to_button_index() {
        assert_eq!(pressed_button(change(0b0001, 0b0001)), Some(1));
        assert_eq!(pressed_button(change(0b0010, 0b0010)), Some(2));
        assert_eq!(pressed_button(change(0b0100, 0b0100)), Some(3));
        assert_eq!(pressed_button(change(0b1000, 0b1000)), Some(4));
    }

    #[test]
    fn held_buttons_do_not_mask_a_new_press() {
        // Button 1 still held, button 3 newly pressed.
        assert_eq!(pressed_button(change(0b0101, 0b0100)), Some(3));
    }

    #[test]
    fn release_is_not_a_press() {
        assert_eq!(pressed_button(change(0b0000, 0b0010)), None);
    }

    #[test]
    fn simultaneous_presses_are_ignored() {
        assert_eq!(pressed_button(change(0b0011, 0b0011)), None);
    }

    #[test]
    fn unknown_button_bits_are_ignored() {
        assert_eq!(pressed_button(change(0b1_0000, 0b1_0000)), None);
    }
}
