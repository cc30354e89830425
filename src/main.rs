//! Remote Service firmware for the nRF52840-DK.
//!
//! Boots the SoftDevice, registers the Remote Service, advertises, then
//! turns button presses into notifications. LED1 blinks while running,
//! LED2 is lit while a central is connected.

#![no_std]
#![no_main]

use defmt::{error, info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use nrf_softdevice::ble::Connection;
use panic_probe as _;
use static_cell::StaticCell;

use remote_service::ble::softdevice::SoftdeviceTransport;
use remote_service::config::ENABLE_TIMEOUT_MS;
use remote_service::ui::{buttons, leds};
use remote_service::{
    ButtonChange, InitError, InputAdapter, RemoteCallbacks, RemoteService, ServiceInitializer,
    SubscriptionState,
};

static BUTTON_EVENTS: Channel<CriticalSectionRawMutex, ButtonChange, 4> = Channel::new();

/// Application side of the service: logs what the central sends.
struct App;

impl RemoteCallbacks<Connection> for App {
    fn data_received(&self, conn: &Connection, data: &[u8]) {
        info!("Message from {:?} ({} bytes): {=[u8]:a}", conn.handle(), data.len(), data);
    }

    fn notifications_changed(&self, state: SubscriptionState) {
        info!("Button notifications {:?}", state);
    }
}

#[embassy_executor::task(pool_size = 4)]
async fn button_task(pin: AnyPin, index: u8) -> ! {
    buttons::button_task(pin, index, BUTTON_EVENTS.sender()).await
}

#[embassy_executor::task]
async fn run_led_task(led: &'static leds::Led) -> ! {
    leds::blink_task(led).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Remote Service starting");

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    static RUN_LED: StaticCell<leds::Led> = StaticCell::new();
    static CON_LED: StaticCell<leds::Led> = StaticCell::new();
    let run_led: &'static leds::Led = RUN_LED.init(leds::Led::new(p.P0_13.degrade()));
    let con_led: &'static leds::Led = CON_LED.init(leds::Led::new(p.P0_14.degrade()));

    static APP: StaticCell<App> = StaticCell::new();
    static SERVICE: StaticCell<RemoteService<'static, Connection>> = StaticCell::new();
    let app: &'static App = APP.init(App);
    let service: &'static RemoteService<'static, Connection> =
        SERVICE.init(RemoteService::new(app, con_led));

    let mut transport = SoftdeviceTransport::new(spawner);
    let mut init = ServiceInitializer::new(service);
    let started = match with_timeout(
        Duration::from_millis(ENABLE_TIMEOUT_MS),
        init.run(&mut transport),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            init.abort(InitError::EnableTimeout);
            Err(InitError::EnableTimeout)
        }
    };

    if let Err(e) = started {
        error!("Bluetooth init failed: {:?}", e);
        loop {
            cortex_m::asm::wfe();
        }
    }
    info!("Bluetooth initialized");

    let notifier = unwrap!(transport.notifier());

    unwrap!(spawner.spawn(button_task(p.P0_11.degrade(), 0)));
    unwrap!(spawner.spawn(button_task(p.P0_12.degrade(), 1)));
    unwrap!(spawner.spawn(button_task(p.P0_24.degrade(), 2)));
    unwrap!(spawner.spawn(button_task(p.P0_25.degrade(), 3)));
    unwrap!(spawner.spawn(run_led_task(run_led)));

    let input = InputAdapter::new(service, &notifier);
    loop {
        let change = BUTTON_EVENTS.receive().await;
        // Outcome is logged by the adapter.
        let _ = input.on_button_change(change);
    }
}
