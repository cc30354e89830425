//! Bluetooth Low Energy subsystem - the Remote Service.
//!
//! The device runs in **Peripheral** role and exposes one vendor GATT
//! service with two characteristics:
//!
//! - **Button** (read, notify) - the last pressed button index, 1 byte.
//! - **Message** (write without response) - opaque bytes handed to the
//!   application.
//!
//! Pieces, leaf to root:
//!
//! 1. **Readiness gate** - turns the stack's "enabled" completion into an
//!    awaitable result.
//! 2. **Connection tracker** - holds at most one connection reference.
//! 3. **Characteristic store** - button value and subscription state.
//! 4. **Notification dispatcher** - pushes button changes to the peer.
//! 5. **Service initializer** - enable, then advertise, once.
//!
//! The radio stack itself sits behind the [`Transport`] and [`Notifier`]
//! traits; the stack feeds events back through [`GattEvents`], which
//! [`RemoteService`] implements.

pub mod adv;
pub mod characteristics;
pub mod connection;
pub mod init;
pub mod notify;
pub mod readiness;

#[cfg(feature = "embedded")]
pub mod softdevice;


use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::{AttError, TransportError};
use crate::ui::StatusIndicator;
use characteristics::CharacteristicStore;
use connection::ConnectionTracker;
use init::InitState;
use readiness::{EnableCompletion, ReadinessGate};

/// Characteristics of the Remote Service, as seen by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Characteristic {
    /// Button value (read, notify).
    Button,
    /// Inbound message (write without response).
    Message,
}

/// Client configuration state of the button characteristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscriptionState {
    #[default]
    Disabled,
    Enabled,
}

impl From<bool> for SubscriptionState {
    fn from(enabled: bool) -> Self {
        if enabled {
            SubscriptionState::Enabled
        } else {
            SubscriptionState::Disabled
        }
    }
}

/// Radio stack capabilities needed to bring the service up.
///
/// `'a` is how long the stack may hold on to the registered callbacks
/// and the enable completion.
pub trait Transport<'a> {
    /// Reference to a live connection. `Clone` acquires a reference,
    /// `Drop` releases it.
    type Conn: Clone;

    /// Route connection and GATT events to `events`.
    fn register_callbacks(&mut self, events: &'a dyn GattEvents<Self::Conn>);

    /// Ask the stack to enable itself. `done` must be completed exactly
    /// once, possibly from another context, after this returns `Ok`.
    fn enable(&mut self, done: EnableCompletion<'a>) -> Result<(), TransportError>;

    /// Start connectable advertising with the given payloads.
    fn advertise_start(&mut self, adv_data: &[u8], scan_data: &[u8]) -> Result<(), TransportError>;
}

/// Outbound notification primitive.
pub trait Notifier<C> {
    /// Queue `payload` for `characteristic` on `conn`. `Ok` means the stack
    /// accepted it; delivery is reported later through
    /// [`GattEvents::on_notify_complete`] if the stack supports it.
    fn notify(
        &self,
        conn: &C,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Mirror `value` into the stack's own attribute table, for stacks that
    /// answer reads without calling [`GattEvents::on_read`].
    fn set_value(
        &self,
        _characteristic: Characteristic,
        _value: &[u8],
    ) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Events delivered by the stack. Every method must be non-blocking.
pub trait GattEvents<C> {
    /// `err` is the HCI status of the connection attempt (0 = success).
    fn on_connected(&self, conn: &C, err: u8);
    fn on_disconnected(&self, conn: &C, reason: u8);
    fn on_subscription_changed(&self, state: SubscriptionState);
    /// Serve a read into `buf`, returning the number of bytes written.
    fn on_read(&self, characteristic: Characteristic, buf: &mut [u8]) -> Result<usize, AttError>;
    /// Handle a write, returning the number of bytes consumed.
    fn on_write(
        &self,
        conn: &C,
        characteristic: Characteristic,
        data: &[u8],
    ) -> Result<usize, AttError>;
    fn on_notify_complete(&self, result: Result<(), TransportError>);
}

/// Application hooks for the Remote Service.
pub trait RemoteCallbacks<C> {
    /// The peer wrote to the message characteristic. `data` is only valid
    /// for the duration of the call.
    fn data_received(&self, conn: &C, data: &[u8]);

    /// The peer toggled button notifications.
    fn notifications_changed(&self, _state: SubscriptionState) {}
}

/// Shared state of the Remote Service.
///
/// One instance lives for the whole process; the stack, the button input
/// and the initializer all hold `&RemoteService`. Fields are individually
/// guarded so any of them can be touched from callback context.
pub struct RemoteService<'a, C> {
    readiness: ReadinessGate,
    state: Mutex<CriticalSectionRawMutex, Cell<InitState>>,
    connection: ConnectionTracker<'a, C>,
    store: CharacteristicStore<'a, C>,
}

impl<'a, C: Clone> RemoteService<'a, C> {
    pub fn new(callbacks: &'a dyn RemoteCallbacks<C>, indicator: &'a dyn StatusIndicator) -> Self {
        Self {
            readiness: ReadinessGate::new(),
            state: Mutex::new(Cell::new(InitState::Idle)),
            connection: ConnectionTracker::new(indicator),
            store: CharacteristicStore::new(callbacks),
        }
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.readiness
    }

    pub fn connection(&self) -> &ConnectionTracker<'a, C> {
        &self.connection
    }

    pub fn store(&self) -> &CharacteristicStore<'a, C> {
        &self.store
    }

    /// Current initializer state.
    pub fn init_state(&self) -> InitState {
        self.state.lock(|s| s.get())
    }

    pub fn is_ready(&self) -> bool {
        self.init_state() == InitState::Ready
    }

    pub(crate) fn set_init_state(&self, next: InitState) {
        let prev = self.state.lock(|s| s.replace(next));
        info!("Remote service: {:?} -> {:?}", prev, next);
    }

    /// Last button value; shorthand for `store().read_button()`.
    pub fn read_button(&self) -> u8 {
        self.store.read_button()
    }
}

impl<'a, C: Clone> GattEvents<C> for RemoteService<'a, C> {
    fn on_connected(&self, conn: &C, err: u8) {
        self.connection.on_connected(conn, err);
    }

    fn on_disconnected(&self, conn: &C, reason: u8) {
        self.connection.on_disconnected(conn, reason);
    }

    fn on_subscription_changed(&self, state: SubscriptionState) {
        self.store.on_subscription_changed(state);
    }

    fn on_read(&self, characteristic: Characteristic, buf: &mut [u8]) -> Result<usize, AttError> {
        self.store.on_read(characteristic, buf)
    }

    fn on_write(
        &self,
        conn: &C,
        characteristic: Characteristic,
        data: &[u8],
    ) -> Result<usize, AttError> {
        self.store.on_write(conn, characteristic, data)
    }

    fn on_notify_complete(&self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => debug!("Button notification delivered"),
            Err(e) => warn!("Button notification failed: {:?}", e),
        }
    }
}
