//! Nordic SoftDevice S140 transport.
//!
//! Declares the Remote Service GATT table, enables the SoftDevice, and runs
//! the advertise → connect → serve loop, feeding everything that happens
//! on the link into [`GattEvents`].

use core::mem;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError};
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

use crate::ble::adv::AdvPayload;
use crate::ble::readiness::EnableCompletion;
use crate::ble::{Characteristic, GattEvents, Notifier, SubscriptionState, Transport};
use crate::config::{ADV_INTERVAL, ATT_MTU, DEVICE_NAME, MESSAGE_MAX_LEN};
use crate::error::TransportError;

/// nrf-softdevice GATT service for the Remote Service.
///
/// The UUID literals must stay equal to the constants in `config`.
#[nrf_softdevice::gatt_service(uuid = "e9ea0001-e19b-482d-9293-c7907585fc48")]
pub struct RemoteGattService {
    /// Last pressed button - notifications carry the new value.
    #[characteristic(uuid = "e9ea0002-e19b-482d-9293-c7907585fc48", read, notify)]
    pub button: u8,

    /// Inbound message from the central.
    #[characteristic(uuid = "e9ea0003-e19b-482d-9293-c7907585fc48", write_without_response)]
    pub message: heapless::Vec<u8, MESSAGE_MAX_LEN>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub remote: RemoteGattService,
}

/// `gatt_server::run` does not surface the HCI disconnect reason.
const DISCONNECT_REASON_UNKNOWN: u8 = 0;

/// Delay before re-arming advertising after an advertising error.
const ADV_RETRY_MS: u64 = 1000;

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: ATT_MTU }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        common_vs_uuid: Some(raw::ble_common_cfg_vs_uuid_t { vs_uuid_count: 1 }),
        ..Default::default()
    }
}

/// [`Transport`] backed by the SoftDevice.
pub struct SoftdeviceTransport {
    spawner: Spawner,
    events: Option<&'static dyn GattEvents<Connection>>,
    sd: Option<&'static Softdevice>,
    server: Option<&'static Server>,
}

impl SoftdeviceTransport {
    pub fn new(spawner: Spawner) -> Self {
        Self {
            spawner,
            events: None,
            sd: None,
            server: None,
        }
    }

    /// Notification primitive, available once the GATT table is registered.
    pub fn notifier(&self) -> Option<SoftdeviceNotifier> {
        self.server.map(|server| SoftdeviceNotifier { server })
    }
}

impl Transport<'static> for SoftdeviceTransport {
    type Conn = Connection;

    fn register_callbacks(&mut self, events: &'static dyn GattEvents<Connection>) {
        self.events = Some(events);
    }

    fn enable(&mut self, done: EnableCompletion<'static>) -> Result<(), TransportError> {
        static SERVER: StaticCell<Server> = StaticCell::new();

        if self.sd.is_some() {
            return Err(TransportError::Busy);
        }

        let sd = Softdevice::enable(&softdevice_config());
        let registered = match Server::new(sd) {
            Ok(server) => {
                self.server = Some(SERVER.init(server));
                true
            }
            Err(e) => {
                error!("GATT table registration failed: {:?}", e);
                false
            }
        };
        let sd: &'static Softdevice = sd;
        self.sd = Some(sd);

        self.spawner
            .spawn(softdevice_task(sd, done, registered))
            .map_err(|_| TransportError::Busy)
    }

    fn advertise_start(&mut self, adv_data: &[u8], scan_data: &[u8]) -> Result<(), TransportError> {
        let (Some(sd), Some(server)) = (self.sd, self.server) else {
            return Err(TransportError::NotEnabled);
        };
        let events = self.events.ok_or(TransportError::NotEnabled)?;

        let adv = AdvPayload::from_slice(adv_data).map_err(|_| TransportError::InvalidPayload)?;
        let scan = AdvPayload::from_slice(scan_data).map_err(|_| TransportError::InvalidPayload)?;

        self.spawner
            .spawn(connection_task(sd, server, events, adv, scan))
            .map_err(|_| TransportError::Busy)
    }
}

/// Runs the SoftDevice event loop; reports enable completion once running.
#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice, done: EnableCompletion<'static>, ok: bool) -> ! {
    done.complete(ok);
    sd.run().await
}

/// Advertise, accept one central, serve it until it leaves, repeat.
#[embassy_executor::task]
async fn connection_task(
    sd: &'static Softdevice,
    server: &'static Server,
    events: &'static dyn GattEvents<Connection>,
    adv: AdvPayload,
    scan: AdvPayload,
) -> ! {
    let config = peripheral::Config {
        interval: ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        let advertisement = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv,
            scan_data: &scan,
        };
        let conn = match peripheral::advertise_connectable(sd, advertisement, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising error: {:?}", e);
                Timer::after(Duration::from_millis(ADV_RETRY_MS)).await;
                continue;
            }
        };

        events.on_connected(&conn, 0);

        let reason = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Remote(RemoteGattServiceEvent::ButtonCccdWrite { notifications }) => {
                events.on_subscription_changed(SubscriptionState::from(notifications));
            }
            ServerEvent::Remote(RemoteGattServiceEvent::MessageWrite(data)) => {
                if let Err(e) = events.on_write(&conn, Characteristic::Message, &data) {
                    warn!("Message rejected: {:?}", e);
                }
            }
        })
        .await;
        debug!("GATT server exited: {:?}", reason);

        // System attributes are not kept for unbonded peers, so the CCCD
        // is back to disabled for the next connection.
        events.on_subscription_changed(SubscriptionState::Disabled);
        events.on_disconnected(&conn, DISCONNECT_REASON_UNKNOWN);
    }
}

/// Notifications and attribute updates through the registered GATT table.
pub struct SoftdeviceNotifier {
    server: &'static Server,
}

impl Notifier<Connection> for SoftdeviceNotifier {
    fn notify(
        &self,
        conn: &Connection,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let handle = match characteristic {
            Characteristic::Button => self.server.remote.button_value_handle,
            Characteristic::Message => return Err(TransportError::InvalidPayload),
        };

        gatt_server::notify_value(conn, handle, payload).map_err(|e| match e {
            NotifyValueError::Disconnected => TransportError::Disconnected,
            NotifyValueError::Raw(raw) => TransportError::Raw(raw as u32),
        })
    }

    /// The SoftDevice serves reads from its attribute table.
    fn set_value(
        &self,
        characteristic: Characteristic,
        value: &[u8],
    ) -> Result<(), TransportError> {
        let (Characteristic::Button, &[value]) = (characteristic, value) else {
            return Err(TransportError::InvalidPayload);
        };
        self.server.remote.button_set(&value).map_err(|e| {
            debug!("button_set failed: {:?}", e);
            TransportError::InvalidPayload
        })
    }
}
