//! Error types for the remote service.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Each type derives `defmt::Format` when the `defmt` feature is on so
//! it can be logged on target.

/// Failure reported by the underlying radio/transport stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Raw error code from the stack (SoftDevice `NRF_ERROR_*`, HCI, ...).
    Raw(u32),
    /// The stack has not been enabled yet.
    NotEnabled,
    /// The stack cannot take the request right now (queue full, task busy).
    Busy,
    /// A payload did not fit the stack's limits.
    InvalidPayload,
    /// The connection the request targeted is gone.
    Disconnected,
}

/// Fatal startup failures. Any of these leaves the initializer in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The enable request could not be issued at all.
    EnableRequestFailed(TransportError),
    /// The enable completion reported failure.
    EnableFailed,
    /// The stack did not report ready in time.
    EnableTimeout,
    /// Advertising could not be started.
    AdvertiseFailed(TransportError),
    /// The initializer already ran; restart the process to retry.
    AlreadyStarted,
}

/// Outcome of a notification attempt that did not reach the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// The service has not reached `Ready`.
    NotReady,
    /// Nobody is connected.
    NoConnection,
    /// The peer has not enabled notifications.
    NotSubscribed,
    /// The transport refused the notification synchronously.
    Transport(TransportError),
    /// Not a button id (`1..=BUTTON_COUNT`).
    UnknownButton(u8),
}

impl NotifyError {
    /// `NoConnection` and `NotSubscribed` are normal idle states, not faults.
    pub const fn is_expected(&self) -> bool {
        matches!(self, NotifyError::NoConnection | NotifyError::NotSubscribed)
    }
}

/// Attribute protocol errors returned to the peer on reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttError {
    ReadNotPermitted,
    WriteNotPermitted,
    InvalidOffset,
    InvalidAttributeValueLength,
}

impl AttError {
    /// ATT error code as sent on the wire.
    pub const fn code(self) -> u8 {
        match self {
            AttError::ReadNotPermitted => 0x02,
            AttError::WriteNotPermitted => 0x03,
            AttError::InvalidOffset => 0x07,
            AttError::InvalidAttributeValueLength => 0x0D,
        }
    }
}

// Convenience conversions

impl From<TransportError> for NotifyError {
    fn from(e: TransportError) -> Self {
        NotifyError::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_notify_outcomes() {
        assert!(NotifyError::NoConnection.is_expected());
        assert!(NotifyError::NotSubscribed.is_expected());
        assert!(!NotifyError::NotReady.is_expected());
        assert!(!NotifyError::Transport(TransportError::Busy).is_expected());
        assert!(!NotifyError::UnknownButton(0).is_expected());
    }

    #[test]
    fn att_error_codes() {
        assert_eq!(AttError::ReadNotPermitted.code(), 0x02);
        assert_eq!(AttError::WriteNotPermitted.code(), 0x03);
        assert_eq!(AttError::InvalidOffset.code(), 0x07);
        assert_eq!(AttError::InvalidAttributeValueLength.code(), 0x0D);
    }

    #[test]
    fn transport_error_wraps_into_notify_error() {
        let e: NotifyError = TransportError::Raw(0x13).into();
        assert_eq!(e, NotifyError::Transport(TransportError::Raw(0x13)));
    }
}
