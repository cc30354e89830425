//! Single-connection tracker.
//!
//! Holds zero or one connection reference. Storing a reference is the
//! acquire (`Clone`), dropping it is the release (`Drop`), so every
//! acquire is paired with exactly one release.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::ui::StatusIndicator;

/// HCI status code for a successful connection.
const HCI_SUCCESS: u8 = 0x00;

pub struct ConnectionTracker<'a, C> {
    current: Mutex<CriticalSectionRawMutex, RefCell<Option<C>>>,
    indicator: &'a dyn StatusIndicator,
}

impl<'a, C: Clone> ConnectionTracker<'a, C> {
    pub fn new(indicator: &'a dyn StatusIndicator) -> Self {
        Self {
            current: Mutex::new(RefCell::new(None)),
            indicator,
        }
    }

    /// A connection attempt finished.
    ///
    /// On failure nothing is stored. On success the tracker takes its own
    /// reference to `conn`; a connection already being tracked is released
    /// first (last writer wins).
    pub fn on_connected(&self, conn: &C, err: u8) {
        if err != HCI_SUCCESS {
            warn!("Connection failed (err {:#x})", err);
            return;
        }

        // Swap in one critical section; the stale reference is released
        // after the lock is gone.
        let adopted = conn.clone();
        let stale = self.current.lock(|current| current.borrow_mut().replace(adopted));
        if let Some(stale) = stale {
            warn!("Connected while a connection was tracked - releasing the old one");
            drop(stale);
        }

        info!("Connected");
        self.indicator.set_connected(true);
    }

    /// The connection went away. Safe to call when nothing is tracked.
    pub fn on_disconnected(&self, _conn: &C, reason: u8) {
        info!("Disconnected (reason {:#x})", reason);

        let released = self.current.lock(|current| current.borrow_mut().take());
        if released.is_none() {
            debug!("Disconnect with no tracked connection");
        }
        drop(released);

        self.indicator.set_connected(false);
    }

    /// A new reference to the tracked connection, if any.
    ///
    /// The returned reference is the caller's own and is released when
    /// dropped; the tracker's state is not changed.
    pub fn current(&self) -> Option<C> {
        self.current.lock(|current| current.borrow().clone())
    }

    pub fn is_connected(&self) -> bool {
        self.current.lock(|current| current.borrow().is_some())
    }
}
