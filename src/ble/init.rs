//! Startup sequence: register, enable, advertise.
//!
//! ```text
//! Idle ─register─▶ WaitingForEnable ─ready─▶ AdvertisingStart ─ok─▶ Ready
//!                         │                          │
//!                         └────────── Failed ◀───────┘
//! ```
//!
//! `Ready` and `Failed` are terminal. There is no retry path; a failed
//! device is restarted.

use crate::ble::adv::{self, AdvPayload};
use crate::ble::{RemoteService, Transport};
use crate::config;
use crate::error::InitError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    Idle,
    WaitingForEnable,
    AdvertisingStart,
    Ready,
    Failed(InitError),
}

impl InitState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, InitState::Ready | InitState::Failed(_))
    }
}

/// Drives a [`RemoteService`] from `Idle` to `Ready` once.
pub struct ServiceInitializer<'a, C> {
    service: &'a RemoteService<'a, C>,
    adv_data: AdvPayload,
    scan_data: AdvPayload,
}

impl<'a, C: Clone + 'a> ServiceInitializer<'a, C> {
    /// Initializer advertising [`config::DEVICE_NAME`] and the Remote
    /// Service UUID.
    pub fn new(service: &'a RemoteService<'a, C>) -> Self {
        Self::with_payloads(
            service,
            adv::advertisement(config::DEVICE_NAME),
            adv::scan_response(config::REMOTE_SERVICE_UUID),
        )
    }

    pub fn with_payloads(
        service: &'a RemoteService<'a, C>,
        adv_data: AdvPayload,
        scan_data: AdvPayload,
    ) -> Self {
        Self {
            service,
            adv_data,
            scan_data,
        }
    }

    pub fn state(&self) -> InitState {
        self.service.init_state()
    }

    /// Run the whole sequence. Each step only starts if the previous one
    /// succeeded; the first failure is returned and recorded as `Failed`.
    pub async fn run<T>(&mut self, transport: &mut T) -> Result<(), InitError>
    where
        T: Transport<'a, Conn = C>,
    {
        if self.state() != InitState::Idle {
            warn!("Initializer already ran ({:?})", self.state());
            return Err(InitError::AlreadyStarted);
        }

        transport.register_callbacks(self.service);
        self.service.set_init_state(InitState::WaitingForEnable);

        let ready = self
            .service
            .readiness()
            .wait_until_ready(|done| transport.enable(done))
            .await;
        if let Err(e) = ready {
            return Err(self.fail(e));
        }

        self.service.set_init_state(InitState::AdvertisingStart);
        if let Err(e) = transport.advertise_start(&self.adv_data, &self.scan_data) {
            error!("Advertising failed to start: {:?}", e);
            return Err(self.fail(InitError::AdvertiseFailed(e)));
        }

        info!("Advertising as \"{}\"", config::DEVICE_NAME);
        self.service.set_init_state(InitState::Ready);
        Ok(())
    }

    /// Record a failure that happened outside [`run`](Self::run), e.g. a
    /// timeout imposed by the caller. No-op once a terminal state is reached.
    pub fn abort(&mut self, e: InitError) {
        if !self.state().is_terminal() {
            self.fail(e);
        }
    }

    fn fail(&self, e: InitError) -> InitError {
        self.service.set_init_state(InitState::Failed(e));
        e
    }
}
