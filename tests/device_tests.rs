//! Integration tests for the device control loop.

mod common;

use std::cell::RefCell;

use common::{FixedLocation, RecordingTransport, TestRepository, int_command, repository};
use playa_core::{ManualMonotonic, SyncedClock};
use playa_light::{
    CommandQueue, Device, submit_command,
    app::usecases::light,
    config::MAX_COMMAND_LEN,
    controllers::{DispatchOutcome, StatusError, StatusSnapshot},
    domain::{entity::Position, ports::TransportError},
};
use playa_light_composer::{EffectId, FrameRecorder, Rgb, StripSink};

const SERVICE: &str = "4fafc201-1fb5-459e-8fcc-c5c9c331914b";
const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

type TestDevice<'a> = Device<'a, RecordingTransport, TestRepository, &'a ManualMonotonic>;

fn device<'a>(
    queue: &'a CommandQueue,
    clock: &'a ManualMonotonic,
    transport: RecordingTransport,
) -> TestDevice<'a> {
    Device::new(transport, repository(), queue, SyncedClock::new(clock), SERVICE)
}

// -----------------------------------------------------------------------------
// Startup
// -----------------------------------------------------------------------------

#[test]
fn begin_applies_defaults_and_advertises() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::default());

    device.begin().unwrap();

    assert_eq!(device.name(), "BMDevice - New");
    assert_eq!(
        device.transport().advertised,
        [("BMDevice - New".to_string(), SERVICE.to_string())]
    );
    assert_eq!(device.state().brightness, 50);
    assert!(device.state().power);
    assert_eq!(device.engine().scene().effect_id(), EffectId::PaletteStream);
    assert_eq!(device.engine().brightness(), 127);
}

#[test]
fn advertised_name_follows_stored_owner() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut first = device(&queue, &clock, RecordingTransport::default());
    first.begin().unwrap();
    first.dispatch(&common::text_command(0x30, "Ranger"));
    let (_, repository) = first.into_parts();

    let mut second = Device::new(
        RecordingTransport::default(),
        common::reopen(repository),
        &queue,
        SyncedClock::new(&clock),
        SERVICE,
    );
    second.begin().unwrap();
    assert_eq!(second.name(), "BMDevice - Ranger");
}

// -----------------------------------------------------------------------------
// Command queue
// -----------------------------------------------------------------------------

#[test]
fn submit_command_rejects_oversized_and_overflowing_writes() {
    let queue = CommandQueue::new();

    assert_eq!(
        submit_command(&queue, &vec![0x1B; MAX_COMMAND_LEN + 1]),
        Err(TransportError::PayloadTooLarge)
    );
    for _ in 0..4 {
        submit_command(&queue, &[0x01, 1]).unwrap();
    }
    assert_eq!(
        submit_command(&queue, &[0x01, 1]),
        Err(TransportError::QueueFull)
    );
}

#[test]
fn poll_handles_one_queued_command_per_iteration() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.begin().unwrap();

    submit_command(&queue, &int_command(0x04, 20)).unwrap();
    submit_command(&queue, &int_command(0x05, 60)).unwrap();

    device.poll();
    assert_eq!(device.state().brightness, 20);
    assert_eq!(device.state().speed, 100);

    device.poll();
    assert_eq!(device.state().speed, 60);
}

#[test]
fn dispatch_bypasses_the_queue() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.begin().unwrap();

    assert_eq!(device.dispatch(&[0x08, 7]), DispatchOutcome::Handled);
    assert_eq!(device.dispatch(&[0x04]), DispatchOutcome::Ignored);
}

// -----------------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------------

#[test]
fn power_off_blanks_every_sink() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut strip = StripSink::new(FrameRecorder::default(), 8);
    {
        let mut device = device(&queue, &clock, RecordingTransport::default());
        device.add_sink(&mut strip).unwrap();
        device.begin().unwrap();
        device.dispatch(&[0x0A, EffectId::Solid.as_u8()]);

        device.poll();
        assert_eq!(device.engine().scene().color, Rgb { r: 0, g: 255, b: 0 });

        device.dispatch(&[0x01, 0]);
        clock.advance(20);
        device.poll();
    }

    assert!(strip.driver().last_frame().iter().all(|pixel| *pixel == BLACK));
    assert!(strip.driver().writes() >= 2);
}

#[test]
fn power_on_redraws_a_static_scene_immediately() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut strip = StripSink::new(FrameRecorder::default(), 8);
    {
        let mut device = device(&queue, &clock, RecordingTransport::default());
        device.add_sink(&mut strip).unwrap();
        device.begin().unwrap();
        device.dispatch(&[0x0A, EffectId::Solid.as_u8()]);
        device.poll();

        device.dispatch(&[0x01, 0]);
        clock.advance(100);
        device.poll();

        device.dispatch(&[0x01, 1]);
        clock.advance(100);
        device.poll();
    }

    let frame = strip.driver().last_frame();
    assert!(frame.iter().all(|pixel| pixel.r == 0 && pixel.g > 0 && pixel.b == 0));
}

#[test]
fn fire_plasma_heat_tracks_strip_length() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut strip = StripSink::new(FrameRecorder::default(), 24);
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.add_sink(&mut strip).unwrap();
    device.begin().unwrap();

    device.dispatch(&[0x0A, EffectId::FirePlasma.as_u8()]);
    for _ in 0..5 {
        clock.advance(100);
        device.poll();
    }

    assert_eq!(device.engine().heat().len(), 24);
}

fn fire_heat_with_entropy(entropy: u16) -> Vec<u8> {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut strip = StripSink::new(FrameRecorder::default(), 24);
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.add_sink(&mut strip).unwrap();
    device.add_entropy(entropy);
    device.begin().unwrap();

    device.dispatch(&[0x0A, EffectId::FirePlasma.as_u8()]);
    device.poll();
    device.engine().heat().to_vec()
}

#[test]
fn units_with_different_entropy_do_not_animate_in_lockstep() {
    assert_eq!(fire_heat_with_entropy(0xA1B2), fire_heat_with_entropy(0xA1B2));
    assert_ne!(fire_heat_with_entropy(0xA1B2), fire_heat_with_entropy(0x0042));
}

// -----------------------------------------------------------------------------
// Connection and status
// -----------------------------------------------------------------------------

#[test]
fn connect_starts_a_paced_report() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(1000);
    let events = RefCell::new(Vec::new());
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.set_connection_handler(|connected| events.borrow_mut().push(connected));
    device.begin().unwrap();

    device.poll();
    assert!(device.transport().sent.is_empty());

    device.transport_mut().connected = true;
    device.poll();
    assert!(device.is_connected());
    assert_eq!(device.transport().sent.len(), 1);

    for _ in 0..3 {
        clock.advance(25);
        device.poll();
    }
    assert_eq!(device.transport().sent.len(), 4);
    assert!(!device.reporter().is_sending());

    device.transport_mut().connected = false;
    device.poll();
    drop(device);
    assert_eq!(*events.borrow(), [true, false]);
}

#[test]
fn replies_go_out_through_the_transport() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::connected());
    device.clear_status_chunks();
    device.begin().unwrap();

    device.dispatch(&[0x1C]);
    assert_eq!(device.transport().last_text(), r#"{"defaultsSaved":true}"#);
}

fn uptime(snapshot: &StatusSnapshot<'_>, buffer: &mut [u8]) -> Result<usize, StatusError> {
    let text = if snapshot.state.power { "{\"on\":1}" } else { "{\"on\":0}" };
    buffer[..text.len()].copy_from_slice(text.as_bytes());
    Ok(text.len())
}

#[test]
fn custom_status_chunks_replace_the_defaults() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::connected());
    device.clear_status_chunks();
    device.register_status_chunk("power", "power flag", uptime);
    device.begin().unwrap();

    device.poll();
    assert_eq!(device.transport().sent_text(), ["{\"on\":1}"]);

    device.dispatch(&[0x01, 0]);
    clock.advance(30);
    assert!(device.request_status());
    device.poll();
    assert_eq!(device.transport().last_text(), "{\"on\":0}");
}

// -----------------------------------------------------------------------------
// Location
// -----------------------------------------------------------------------------

#[test]
fn location_is_ignored_while_gps_is_disabled() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut gps = FixedLocation {
        position: Some(Position::new(40.78, -119.2)),
        speed: 10.0,
        updates: 0,
    };
    {
        let mut device = device(&queue, &clock, RecordingTransport::default());
        device.set_location_provider(&mut gps);
        device.begin().unwrap();
        device.poll();
        assert_eq!(device.state().position, None);
    }
    assert_eq!(gps.updates, 0);
}

#[test]
fn ground_speed_drives_the_animation_speed() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut gps = FixedLocation {
        position: Some(Position::new(40.78, -119.2)),
        speed: 15.0,
        updates: 0,
    };
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.set_location_provider(&mut gps);
    device.begin().unwrap();

    let mut enable = common::text_command(0x1B, "");
    enable.extend_from_slice(br#"{"gpsEnabled":true,"gpsLightshowSpeedEnabled":true}"#);
    device.dispatch(&enable);
    device.poll();

    let state = device.state();
    assert_eq!(state.position, Some(Position::new(40.78, -119.2)));
    assert!((state.current_speed - 15.0).abs() < f32::EPSILON);

    // halfway between 5 and 25 km/h
    let expected = light::effective_speed(state, device.defaults());
    assert_eq!(expected, 52);
    assert_eq!(device.engine().scene().speed, expected);
}

// -----------------------------------------------------------------------------
// Peer sync
// -----------------------------------------------------------------------------

#[test]
fn peer_scene_merges_only_while_sync_is_enabled() {
    let queue = CommandQueue::new();
    let clock = ManualMonotonic::new(0);
    let mut device = device(&queue, &clock, RecordingTransport::default());
    device.begin().unwrap();

    let mut peer = *device.engine().scene();
    peer.brightness = 200;
    assert!(device.apply_sync_scene(&peer));
    assert_eq!(device.engine().brightness(), 200);

    let mut disable = common::text_command(0x1B, "");
    disable.extend_from_slice(br#"{"syncEnabled":false}"#);
    device.dispatch(&disable);

    peer.brightness = 30;
    assert!(!device.apply_sync_scene(&peer));
    assert_eq!(device.engine().brightness(), 200);
}
