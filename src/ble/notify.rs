//! Button notifications to the connected peer.

use crate::ble::{Characteristic, Notifier, RemoteService, SubscriptionState};
use crate::error::NotifyError;

/// Sends button changes to the tracked connection through a [`Notifier`].
pub struct NotificationDispatcher<'s, 'a, C, N> {
    service: &'s RemoteService<'a, C>,
    notifier: &'s N,
}

impl<'s, 'a, C, N> NotificationDispatcher<'s, 'a, C, N>
where
    C: Clone,
    N: Notifier<C>,
{
    pub fn new(service: &'s RemoteService<'a, C>, notifier: &'s N) -> Self {
        Self { service, notifier }
    }

    /// Submit a one-byte notification carrying `value`.
    ///
    /// Fire-and-forget: `Ok` means the stack accepted it. Equal values are
    /// sent again; nothing is deduplicated or queued.
    pub fn notify(&self, value: u8) -> Result<(), NotifyError> {
        if !self.service.is_ready() {
            return Err(NotifyError::NotReady);
        }

        let conn = self.service.connection().current().ok_or(NotifyError::NoConnection)?;

        if self.service.store().subscription() == SubscriptionState::Disabled {
            return Err(NotifyError::NotSubscribed);
        }

        let payload = [value];
        self.notifier
            .notify(&conn, Characteristic::Button, &payload)
            .map_err(|e| {
                warn!("Button notification rejected: {:?}", e);
                NotifyError::from(e)
            })?;

        debug!("Button notification queued ({})", value);
        Ok(())
    }
}
