//! Integration tests for the remote service through its public API.

use std::cell::RefCell;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use embassy_futures::block_on;
use remote_service::{
    ButtonChange, Characteristic, EnableCompletion, GattEvents, InitError, InitState,
    InputAdapter, Notifier, NotifyError, RemoteCallbacks, RemoteService, ServiceInitializer,
    StatusIndicator, SubscriptionState, Transport, TransportError,
};

/// Connection handle; the id stands in for the stack's connection index.
#[derive(Clone, Debug, PartialEq)]
struct Conn(u16);

#[derive(Default)]
struct Board {
    led: Mutex<Vec<bool>>,
    received: Mutex<Vec<Vec<u8>>>,
}

impl StatusIndicator for Board {
    fn set_connected(&self, connected: bool) {
        self.led.lock().unwrap().push(connected);
    }
}

impl RemoteCallbacks<Conn> for Board {
    fn data_received(&self, _conn: &Conn, data: &[u8]) {
        self.received.lock().unwrap().push(data.to_vec());
    }
}

/// Transport whose enable completion fires from a separate "stack" thread.
struct ThreadedStack<'a> {
    completions: mpsc::Sender<EnableCompletion<'a>>,
    events: Option<&'a dyn GattEvents<Conn>>,
    advertising: bool,
}

impl<'a> Transport<'a> for ThreadedStack<'a> {
    type Conn = Conn;

    fn register_callbacks(&mut self, events: &'a dyn GattEvents<Conn>) {
        self.events = Some(events);
    }

    fn enable(&mut self, done: EnableCompletion<'a>) -> Result<(), TransportError> {
        self.completions.send(done).map_err(|_| TransportError::Busy)
    }

    fn advertise_start(&mut self, adv: &[u8], scan: &[u8]) -> Result<(), TransportError> {
        if adv.len() > 31 || scan.len() > 31 {
            return Err(TransportError::InvalidPayload);
        }
        self.advertising = true;
        Ok(())
    }
}

#[derive(Default)]
struct Air {
    frames: RefCell<Vec<(u16, Vec<u8>)>>,
}

impl Notifier<Conn> for Air {
    fn notify(
        &self,
        conn: &Conn,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        assert_eq!(characteristic, Characteristic::Button);
        self.frames.borrow_mut().push((conn.0, payload.to_vec()));
        Ok(())
    }
}

#[test]
fn full_session_from_boot_to_disconnect() {
    let board = Board::default();
    let service: RemoteService<'_, Conn> = RemoteService::new(&board, &board);
    let (tx, rx) = mpsc::channel();
    let mut stack = ThreadedStack {
        completions: tx,
        events: None,
        advertising: false,
    };
    let mut init = ServiceInitializer::new(&service);

    std::thread::scope(|s| {
        s.spawn(move || {
            let done: EnableCompletion<'_> = rx.recv().unwrap();
            std::thread::sleep(Duration::from_millis(10));
            done.complete(true);
        });
        assert_eq!(block_on(init.run(&mut stack)), Ok(()));
    });
    assert_eq!(init.state(), InitState::Ready);
    assert!(stack.advertising);

    let air = Air::default();
    let input = InputAdapter::new(&service, &air);
    let events = stack.events.unwrap();

    // Pressed before anyone connects: stored, not sent.
    let press2 = ButtonChange { state: 0b0010, changed: 0b0010 };
    assert_eq!(input.on_button_change(press2), Some(Err(NotifyError::NoConnection)));
    assert_eq!(service.read_button(), 2);

    events.on_connected(&Conn(1), 0);
    assert_eq!(input.on_press(1), Err(NotifyError::NotSubscribed));

    events.on_subscription_changed(SubscriptionState::Enabled);
    let press3 = ButtonChange { state: 0b0100, changed: 0b0100 };
    assert_eq!(input.on_button_change(press3), Some(Ok(())));

    assert_eq!(events.on_write(&Conn(1), Characteristic::Message, b"ping"), Ok(4));

    let mut buf = [0u8; 1];
    assert_eq!(events.on_read(Characteristic::Button, &mut buf), Ok(1));
    assert_eq!(buf, [3]);

    events.on_disconnected(&Conn(1), 0x13);
    assert_eq!(input.on_press(4), Err(NotifyError::NoConnection));

    assert_eq!(*air.frames.borrow(), [(1, vec![3])]);
    assert_eq!(*board.received.lock().unwrap(), [b"ping".to_vec()]);
    assert_eq!(*board.led.lock().unwrap(), [true, false]);
}

#[test]
fn dropped_completion_sender_fails_startup() {
    let board = Board::default();
    let service: RemoteService<'_, Conn> = RemoteService::new(&board, &board);
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut stack = ThreadedStack {
        completions: tx,
        events: None,
        advertising: false,
    };
    let mut init = ServiceInitializer::new(&service);

    assert_eq!(
        block_on(init.run(&mut stack)),
        Err(InitError::EnableRequestFailed(TransportError::Busy))
    );
    assert!(!stack.advertising);
    assert!(matches!(init.state(), InitState::Failed(_)));
}
