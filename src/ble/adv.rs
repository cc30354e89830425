//! Advertisement and scan-response payloads.
//!
//! Legacy advertising PDUs carry at most 31 bytes of AD structures, each
//! `[len][type][data...]` where `len` covers type + data.

use heapless::Vec;

use crate::config::ADV_PAYLOAD_MAX;

/// Encoded AD structures for one advertising PDU.
pub type AdvPayload = Vec<u8, ADV_PAYLOAD_MAX>;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_COMPLETE_128BIT_UUIDS: u8 = 0x07;
const AD_TYPE_SHORTENED_LOCAL_NAME: u8 = 0x08;
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// LE General Discoverable Mode.
const FLAG_LE_GENERAL_DISC: u8 = 0x02;
/// BR/EDR Not Supported.
const FLAG_BREDR_NOT_SUPPORTED: u8 = 0x04;

/// An AD structure did not fit in the remaining payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdOverflow;

/// Flags plus the device name.
///
/// A name that does not fit is cut on a character boundary and advertised
/// as a shortened name.
pub fn advertisement(name: &str) -> AdvPayload {
    let mut payload = AdvPayload::new();
    let flags = [FLAG_LE_GENERAL_DISC | FLAG_BREDR_NOT_SUPPORTED];
    let pushed = push_ad(&mut payload, AD_TYPE_FLAGS, &flags).and_then(|()| {
        let room = ADV_PAYLOAD_MAX - payload.len() - 2;
        if name.len() <= room {
            push_ad(&mut payload, AD_TYPE_COMPLETE_LOCAL_NAME, name.as_bytes())
        } else {
            let short = truncate_to_char_boundary(name, room);
            warn!("Device name truncated to {} bytes", short.len());
            push_ad(&mut payload, AD_TYPE_SHORTENED_LOCAL_NAME, short.as_bytes())
        }
    });
    debug_assert_eq!(pushed, Ok(()));
    payload
}

/// Complete list of 128-bit service UUIDs containing `service_uuid`.
pub fn scan_response(service_uuid: u128) -> AdvPayload {
    let mut payload = AdvPayload::new();
    // Multi-byte fields go on air little-endian.
    let pushed = push_ad(&mut payload, AD_TYPE_COMPLETE_128BIT_UUIDS, &service_uuid.to_le_bytes());
    debug_assert_eq!(pushed, Ok(()));
    payload
}

/// Append one `[len][type][data]` structure, or nothing if it does not fit.
pub fn push_ad(payload: &mut AdvPayload, ad_type: u8, data: &[u8]) -> Result<(), AdOverflow> {
    if payload.len() + 2 + data.len() > ADV_PAYLOAD_MAX {
        return Err(AdOverflow);
    }
    payload.push(data.len() as u8 + 1).map_err(|_| AdOverflow)?;
    payload.push(ad_type).map_err(|_| AdOverflow)?;
    payload.extend_from_slice(data).map_err(|_| AdOverflow)
}

fn truncate_to_char_boundary(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REMOTE_SERVICE_UUID;

    #[test]
    fn advertisement_carries_flags_and_complete_name() {
        let adv = advertisement("Remote");
        assert_eq!(
            adv.as_slice(),
            &[0x02, 0x01, 0x06, 0x07, 0x09, b'R', b'e', b'm', b'o', b't', b'e']
        );
    }

    #[test]
    fn long_name_becomes_shortened_name() {
        let name = "A-device-name-that-is-far-too-long-to-advertise";
        let adv = advertisement(name);
        assert_eq!(adv.len(), ADV_PAYLOAD_MAX);
        assert_eq!(adv[3] as usize, ADV_PAYLOAD_MAX - 3 - 1);
        assert_eq!(adv[4], AD_TYPE_SHORTENED_LOCAL_NAME);
        assert_eq!(&adv[5..], &name.as_bytes()[..26]);
    }

    #[test]
    fn name_exactly_filling_the_pdu_stays_complete() {
        let name = "abcdefghijklmnopqrstuvwxyz";
        let adv = advertisement(name);
        assert_eq!(adv.len(), ADV_PAYLOAD_MAX);
        assert_eq!(adv[4], AD_TYPE_COMPLETE_LOCAL_NAME);
    }

    #[test]
    fn shortened_name_never_splits_a_character() {
        // 25 ASCII bytes, then a 2-byte character straddling the 26-byte cut.
        let name = "abcdefghijklmnopqrstuvwxyé-tail";
        let adv = advertisement(name);
        assert_eq!(adv[4], AD_TYPE_SHORTENED_LOCAL_NAME);
        assert_eq!(&adv[5..], b"abcdefghijklmnopqrstuvwxy");
        assert_eq!(adv[3] as usize, 25 + 1);
        assert!(core::str::from_utf8(&adv[5..]).is_ok());
    }

    #[test]
    fn oversized_structure_is_refused_whole() {
        let mut payload = AdvPayload::new();
        assert_eq!(push_ad(&mut payload, AD_TYPE_FLAGS, &[0x06]), Ok(()));
        assert_eq!(
            push_ad(&mut payload, AD_TYPE_COMPLETE_LOCAL_NAME, &[b'x'; 27]),
            Err(AdOverflow)
        );
        assert_eq!(payload.as_slice(), &[0x02, 0x01, 0x06]);

        assert_eq!(push_ad(&mut payload, AD_TYPE_COMPLETE_LOCAL_NAME, &[b'x'; 26]), Ok(()));
        assert_eq!(payload.len(), ADV_PAYLOAD_MAX);
    }

    #[test]
    fn scan_response_has_service_uuid_little_endian() {
        let rsp = scan_response(REMOTE_SERVICE_UUID);
        assert_eq!(rsp.len(), 18);
        assert_eq!(rsp[0], 17);
        assert_eq!(rsp[1], AD_TYPE_COMPLETE_128BIT_UUIDS);
        // e9ea0001-e19b-482d-9293-c7907585fc48
        assert_eq!(
            &rsp[2..],
            &[
                0x48, 0xfc, 0x85, 0x75, 0x90, 0xc7, 0x93, 0x92, 0x2d, 0x48, 0x9b, 0xe1, 0x01, 0x00,
                0xea, 0xe9
            ]
        );
    }
}
