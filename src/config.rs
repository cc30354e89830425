//! Application-wide constants and compile-time configuration.
//!
//! UUIDs, advertising parameters, and pin/timing choices live here so
//! they can be tuned in one place.

// Remote Service UUIDs
//
// Vendor-specific 128-bit UUIDs. Existing observers look these up by
// value, so they must never change between builds.

/// Remote Service.
pub const REMOTE_SERVICE_UUID: u128 = 0xe9ea0001_e19b_482d_9293_c7907585fc48;
/// Button characteristic (read, notify).
pub const BUTTON_CHRC_UUID: u128 = 0xe9ea0002_e19b_482d_9293_c7907585fc48;
/// Message characteristic (write without response).
pub const MESSAGE_CHRC_UUID: u128 = 0xe9ea0003_e19b_482d_9293_c7907585fc48;

/// Canonical string forms. The `nrf_softdevice` GATT macros only accept
/// literals, so `ble::softdevice` repeats these verbatim.
pub const REMOTE_SERVICE_UUID_STR: &str = "e9ea0001-e19b-482d-9293-c7907585fc48";
pub const BUTTON_CHRC_UUID_STR: &str = "e9ea0002-e19b-482d-9293-c7907585fc48";
pub const MESSAGE_CHRC_UUID_STR: &str = "e9ea0003-e19b-482d-9293-c7907585fc48";

// BLE

/// Name placed in the advertisement (complete local name).
pub const DEVICE_NAME: &str = "Remote_Service";

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const ADV_INTERVAL: u32 = 160;

/// Negotiated ATT MTU we ask the SoftDevice to support.
pub const ATT_MTU: u16 = 247;

/// Largest inbound message we accept (ATT MTU minus the 3-byte write header).
pub const MESSAGE_MAX_LEN: usize = ATT_MTU as usize - 3;

/// Legacy advertising PDU payload limit.
pub const ADV_PAYLOAD_MAX: usize = 31;

// Startup

/// How long the binary waits for the stack to report ready (ms).
pub const ENABLE_TIMEOUT_MS: u64 = 5_000;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Button 1..4        → P0.11, P0.12, P0.24, P0.25 (active-low)
//   LED1 run status    → P0.13 (active-low)
//   LED2 conn status   → P0.14 (active-low)

/// Number of physical buttons reported by the input driver.
pub const BUTTON_COUNT: u8 = 4;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Run-status LED toggle interval (ms).
pub const RUN_LED_BLINK_INTERVAL_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_uuid(s: &str) -> u128 {
        let hex: std::string::String = s.chars().filter(|c| *c != '-').collect();
        u128::from_str_radix(&hex, 16).unwrap()
    }

    #[test]
    fn uuid_string_forms_match_numeric_values() {
        assert_eq!(parse_uuid(REMOTE_SERVICE_UUID_STR), REMOTE_SERVICE_UUID);
        assert_eq!(parse_uuid(BUTTON_CHRC_UUID_STR), BUTTON_CHRC_UUID);
        assert_eq!(parse_uuid(MESSAGE_CHRC_UUID_STR), MESSAGE_CHRC_UUID);
    }

    #[test]
    fn characteristic_uuids_share_service_base() {
        let base_mask = !(0xFFFF_u128 << 96);
        assert_eq!(BUTTON_CHRC_UUID & base_mask, REMOTE_SERVICE_UUID & base_mask);
        assert_eq!(MESSAGE_CHRC_UUID & base_mask, REMOTE_SERVICE_UUID & base_mask);
    }

    #[test]
    fn message_fits_in_one_write() {
        assert_eq!(MESSAGE_MAX_LEN, 244);
    }
}
