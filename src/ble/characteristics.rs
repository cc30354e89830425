//! Button value, subscription state, and read/write dispatch.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::ble::{Characteristic, RemoteCallbacks, SubscriptionState};
use crate::config::MESSAGE_MAX_LEN;
use crate::error::AttError;

pub struct CharacteristicStore<'a, C> {
    /// Last pressed button (0 = none yet, 1..=4 otherwise).
    button: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    subscription: Mutex<CriticalSectionRawMutex, Cell<SubscriptionState>>,
    callbacks: &'a dyn RemoteCallbacks<C>,
}

impl<'a, C> CharacteristicStore<'a, C> {
    pub fn new(callbacks: &'a dyn RemoteCallbacks<C>) -> Self {
        Self {
            button: Mutex::new(Cell::new(0)),
            subscription: Mutex::new(Cell::new(SubscriptionState::Disabled)),
            callbacks,
        }
    }

    pub fn read_button(&self) -> u8 {
        self.button.lock(|b| b.get())
    }

    /// Overwrite the button value. Does not notify; that is the caller's job.
    pub fn set_button(&self, value: u8) {
        self.button.lock(|b| b.set(value));
        debug!("Button value = {}", value);
    }

    pub fn subscription(&self) -> SubscriptionState {
        self.subscription.lock(|s| s.get())
    }

    /// The peer rewrote the client configuration descriptor.
    pub fn on_subscription_changed(&self, state: SubscriptionState) {
        let prev = self.subscription.lock(|s| s.replace(state));
        info!("Button notifications: {:?} -> {:?}", prev, state);
        self.callbacks.notifications_changed(state);
    }

    pub fn on_read(
        &self,
        characteristic: Characteristic,
        buf: &mut [u8],
    ) -> Result<usize, AttError> {
        match characteristic {
            Characteristic::Button => {
                let slot = buf.first_mut().ok_or(AttError::InvalidOffset)?;
                *slot = self.read_button();
                Ok(1)
            }
            Characteristic::Message => Err(AttError::ReadNotPermitted),
        }
    }

    /// Forward a message write to the application.
    ///
    /// The whole payload is consumed on success; there is no partial-write
    /// state. `data` is not kept past this call.
    pub fn on_write(
        &self,
        conn: &C,
        characteristic: Characteristic,
        data: &[u8],
    ) -> Result<usize, AttError> {
        if characteristic != Characteristic::Message {
            warn!("Write to read-only characteristic {:?}", characteristic);
            return Err(AttError::WriteNotPermitted);
        }
        if data.len() > MESSAGE_MAX_LEN {
            warn!("Message too long ({} > {})", data.len(), MESSAGE_MAX_LEN);
            return Err(AttError::InvalidAttributeValueLength);
        }

        info!("Received message, {} bytes", data.len());
        self.callbacks.data_received(conn, data);
        Ok(data.len())
    }
}
