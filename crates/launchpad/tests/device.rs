use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use launchpad::transport::memory::MemoryTransport;
use launchpad::{
    open, palette, Error, Hit, MidiMessage, NarrowColor, NarrowLaunchpad, OutputStream,
    RgbColor, ScrollTextEnded, TransportError, Variant, WideLaunchpad,
};
use parking_lot::Mutex;

const SHORT: Duration = Duration::from_millis(100);
const LONG: Duration = Duration::from_secs(2);

fn narrow(transport: &MemoryTransport) -> NarrowLaunchpad {
    NarrowLaunchpad::new(Arc::new(transport.input()), Arc::new(transport.output()))
}

fn wide(transport: &MemoryTransport) -> WideLaunchpad {
    WideLaunchpad::new(Arc::new(transport.input()), Arc::new(transport.output()))
}

/// Output that reconnects whenever asked, the way a hardware port handle can.
#[derive(Default)]
struct ReconnectingOutput {
    open: AtomicBool,
    opens: AtomicUsize,
    writes: AtomicUsize,
}

impl OutputStream for ReconnectingOutput {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn open(&self) -> Result<(), TransportError> {
        self.opens.fetch_add(1, Ordering::AcqRel);
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn write(&self, bytes: &[u8]) -> Result<usize, TransportError> {
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(bytes.len())
    }

    fn close(&self) -> Result<(), TransportError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + LONG;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_narrow_clear_and_light() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);

    device.clear().unwrap();
    assert_eq!(transport.sent(), vec![vec![0xB0, 0x00, 0x00]]);

    transport.clear_sent();
    let color = NarrowColor::new(2, 2).unwrap();
    device.light(0, 0, &color).unwrap();
    assert_eq!(transport.sent(), vec![vec![0x90, 0x00, 46]]);
}

#[test]
fn test_narrow_scene_button_light() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);

    device.light(3, 8, &NarrowColor::GREEN).unwrap();
    assert_eq!(transport.sent(), vec![vec![0xB0, 107, 60]]);
}

#[test]
fn test_narrow_rejects_rgb() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);

    let rgb = RgbColor::new(63, 0, 0).unwrap();
    assert!(matches!(
        device.light(0, 0, &rgb),
        Err(Error::UnsupportedColor {
            variant: Variant::Narrow,
            len: 3
        })
    ));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_wide_light_clear_and_text() {
    let transport = MemoryTransport::new();
    let device = wide(&transport);

    device.light(0, 7, &palette::BLUE).unwrap();
    device
        .light(8, 0, &RgbColor::new(63, 32, 0).unwrap())
        .unwrap();
    device.clear().unwrap();
    device
        .text_loop(&palette::WHITE)
        .unwrap()
        .add(5, "LP")
        .perform()
        .unwrap();

    assert_eq!(
        transport.sent(),
        vec![
            vec![0x90, 11, 45],
            vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x18, 0x0B, 89, 63, 32, 0, 0xF7],
            vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x18, 0x0E, 0x00, 0xF7],
            vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x18, 0x14, 3, 0x01, 5, b'L', b'P', 0xF7],
        ]
    );
}

#[test]
fn test_output_errors_are_returned_unchanged() {
    let transport = MemoryTransport::new();
    transport.fail_output_open("no such port");
    let device = narrow(&transport);

    assert!(matches!(
        device.clear(),
        Err(Error::Transport(TransportError::Open(ref reason))) if reason == "no such port"
    ));

    let transport = MemoryTransport::new();
    transport.fail_writes("cable unplugged");
    let device = wide(&transport);
    assert!(matches!(
        device.light(1, 1, &palette::RED),
        Err(Error::Transport(TransportError::Write(ref reason))) if reason == "cable unplugged"
    ));
}

#[test]
fn test_scene_hit_delivered_once() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let hits = device.listen_to_hits().unwrap();

    transport.send(MidiMessage::control_change(104, 127));

    assert_eq!(
        hits.recv_timeout(LONG),
        Ok(Hit {
            x: 0,
            y: 8,
            down: true
        })
    );
    assert_eq!(hits.recv_timeout(SHORT), Err(RecvTimeoutError::Timeout));

    device.close().unwrap();
}

#[test]
fn test_release_reported_as_note_on_with_zero_velocity() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let hits = device.listen_to_hits().unwrap();

    transport.send_bytes(&[0x90, 17, 127]);
    transport.send_bytes(&[0x90, 17, 0]);

    assert_eq!(
        hits.recv_timeout(LONG),
        Ok(Hit {
            x: 1,
            y: 1,
            down: true
        })
    );
    assert_eq!(
        hits.recv_timeout(LONG),
        Ok(Hit {
            x: 1,
            y: 1,
            down: false
        })
    );

    device.close().unwrap();
}

#[test]
fn test_wide_hits_skip_matrix_gaps() {
    let transport = MemoryTransport::new();
    let device = wide(&transport);
    let hits = device.listen_to_hits().unwrap();

    transport.send(MidiMessage::note_on(80, 127));
    transport.send(MidiMessage::note_on(81, 127));

    assert_eq!(
        hits.recv_timeout(LONG),
        Ok(Hit {
            x: 0,
            y: 0,
            down: true
        })
    );
    assert_eq!(hits.recv_timeout(SHORT), Err(RecvTimeoutError::Timeout));

    device.close().unwrap();
}

#[test]
fn test_scroll_text_end_markers() {
    let transport = MemoryTransport::new();
    let device = wide(&transport);
    let hits = device.listen_to_hits().unwrap();
    let markers = device.listen_to_scroll_text_end_marker().unwrap();

    transport.send(MidiMessage::control_change(0, 3));
    transport.send(MidiMessage::control_change(0, 3));

    assert_eq!(markers.recv_timeout(LONG), Ok(ScrollTextEnded));
    assert_eq!(markers.recv_timeout(LONG), Ok(ScrollTextEnded));
    assert_eq!(hits.recv_timeout(SHORT), Err(RecvTimeoutError::Timeout));

    device.close().unwrap();
}

#[test]
fn test_raw_listeners_run_in_registration_order() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let order = Arc::new(Mutex::new(Vec::new()));

    for id in 1..=3 {
        let order = Arc::clone(&order);
        device
            .add_listener(Box::new(move |_: &MidiMessage| order.lock().push(id)))
            .unwrap();
    }
    transport.send(MidiMessage::note_on(0, 127));

    assert!(wait_until(|| order.lock().len() == 3));
    assert_eq!(*order.lock(), vec![1, 2, 3]);

    device.close().unwrap();
}

#[test]
fn test_stalled_consumer_holds_up_other_listeners() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let stalled = device.listen_to_hits().unwrap();
    let active = device.listen_to_hits().unwrap();

    transport.send(MidiMessage::note_on(0, 127));

    // the first listener waits for a reader that never comes
    assert_eq!(active.recv_timeout(SHORT), Err(RecvTimeoutError::Timeout));

    let expected = Hit {
        x: 0,
        y: 0,
        down: true,
    };
    assert_eq!(stalled.recv_timeout(LONG), Ok(expected));
    assert_eq!(active.recv_timeout(LONG), Ok(expected));

    device.close().unwrap();
}

#[test]
fn test_close_ends_receive_loop() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let _hits = device.listen_to_hits().unwrap();
    assert!(device.is_receiving());

    device.close().unwrap();
    transport.end_of_stream();

    assert!(wait_until(|| !device.is_receiving()));
    assert!(transport.is_input_closed());
    assert!(transport.is_output_closed());
}

#[test]
fn test_close_abandons_blocked_delivery() {
    let transport = MemoryTransport::new();
    let device = narrow(&transport);
    let hits = device.listen_to_hits().unwrap();

    transport.send(MidiMessage::note_on(5, 127));
    transport.send(MidiMessage::note_on(6, 127));
    thread::sleep(SHORT);
    assert!(device.is_receiving());

    device.close().unwrap();

    assert!(wait_until(|| !device.is_receiving()));
    assert_eq!(hits.recv_timeout(SHORT), Err(RecvTimeoutError::Timeout));
}

#[test]
fn test_listen_open_failure() {
    let transport = MemoryTransport::new();
    transport.fail_input_open("device busy");
    let device = narrow(&transport);

    assert!(matches!(
        device.listen_to_hits(),
        Err(Error::Transport(TransportError::Open(ref reason))) if reason == "device busy"
    ));
    assert!(!device.is_listening());
}

#[test]
fn test_close_errors_are_aggregated() {
    let transport = MemoryTransport::new();
    transport.fail_input_close("input stuck");
    transport.fail_output_close("output stuck");
    let device = narrow(&transport);

    match device.close() {
        Err(Error::Close(failures)) => assert_eq!(
            failures,
            vec![
                "input: failed to close stream: input stuck".to_string(),
                "output: failed to close stream: output stuck".to_string(),
            ]
        ),
        other => panic!("expected close error, got {:?}", other),
    }
}

#[test]
fn test_close_still_closes_output_when_input_fails() {
    let transport = MemoryTransport::new();
    transport.fail_input_close("input stuck");
    let device = wide(&transport);

    let err = device.close().unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to close launchpad: input: failed to close stream: input stuck"
    );
    assert!(transport.is_output_closed());
}

#[test]
fn test_boxed_controller() {
    let transport = MemoryTransport::new();
    let device = open(
        Variant::Narrow,
        Arc::new(transport.input()),
        Arc::new(transport.output()),
    );

    assert_eq!(device.variant(), Variant::Narrow);
    device
        .text(&NarrowColor::AMBER)
        .unwrap()
        .add(0, "A")
        .add(8, "B")
        .perform()
        .unwrap();
    assert_eq!(
        transport.sent(),
        vec![vec![0xF0, 0x00, 0x20, 0x29, 0x09, 63, 1, b'A', 7, b'B', 0xF7]]
    );

    let hits = device.listen_to_hits().unwrap();
    transport.send(MidiMessage::control_change(112, 0));
    assert_eq!(
        hits.recv_timeout(LONG),
        Ok(Hit {
            x: 8,
            y: 8,
            down: false
        })
    );

    device.close().unwrap();
    assert!(wait_until(|| !device.is_receiving()));
}

#[test]
fn test_closed_device_does_not_reopen_output() {
    let transport = MemoryTransport::new();
    let output = Arc::new(ReconnectingOutput::default());
    let device = WideLaunchpad::new(Arc::new(transport.input()), output.clone());

    device.close().unwrap();

    assert!(matches!(
        device.light(0, 0, &palette::RED),
        Err(Error::Transport(TransportError::Closed))
    ));
    assert!(matches!(
        device.clear(),
        Err(Error::Transport(TransportError::Closed))
    ));
    assert!(matches!(
        device.text_loop(&palette::RED),
        Err(Error::Transport(TransportError::Closed))
    ));
    assert!(matches!(
        device.enter_session(),
        Err(Error::Transport(TransportError::Closed))
    ));
    assert_eq!(output.opens.load(Ordering::Acquire), 0);
    assert_eq!(output.writes.load(Ordering::Acquire), 0);
    assert!(!output.is_open());
}

#[test]
fn test_failed_listens_leave_no_listeners() {
    let transport = MemoryTransport::new();
    transport.fail_input_open("device busy");
    let device = narrow(&transport);

    for _ in 0..3 {
        assert!(matches!(
            device.listen_to_hits(),
            Err(Error::Transport(TransportError::Open(_)))
        ));
    }
    assert_eq!(device.listener_count(), 0);
}
