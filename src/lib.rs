//! Remote Service - BLE peripheral that reports button presses and
//! receives short messages.
//!
//! The connection, characteristic, and startup logic is pure and runs on
//! the host: `cargo test --lib --tests`.
//!
//! With the `embedded` feature the same crate also carries the nRF52840
//! glue (SoftDevice transport, GPIO buttons, LEDs) used by `main.rs`.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod ble;
pub mod config;
pub mod error;
pub mod ui;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use ble::init::{InitState, ServiceInitializer};
pub use ble::notify::NotificationDispatcher;
pub use ble::readiness::{EnableCompletion, ReadinessGate};
pub use ble::{
    Characteristic, GattEvents, Notifier, RemoteCallbacks, RemoteService, SubscriptionState,
    Transport,
};
pub use error::{AttError, InitError, NotifyError, TransportError};
pub use ui::input::InputAdapter;
pub use ui::{ButtonChange, StatusIndicator};
