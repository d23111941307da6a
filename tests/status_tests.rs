//! Integration tests for the paced status reporter.

mod common;

use common::RecordingTransport;
use embassy_time::{Duration, Instant};
use playa_light::{
    controllers::{ReporterState, StatusError, StatusReporter, StatusSnapshot},
    domain::{
        dto::DeviceDefaults,
        entity::{DeviceState, Position},
    },
};

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

struct Fixture {
    state: DeviceState,
    defaults: DeviceDefaults,
    transport: RecordingTransport,
}

impl Fixture {
    fn new() -> Self {
        Self {
            state: DeviceState::new(),
            defaults: DeviceDefaults::factory(),
            transport: RecordingTransport::connected(),
        }
    }

    fn poll(&mut self, reporter: &mut StatusReporter<'_>, ms: u64) -> bool {
        let snapshot = StatusSnapshot {
            state: &self.state,
            defaults: &self.defaults,
        };
        let connected = self.transport.connected;
        reporter.poll(at(ms), connected, &snapshot, &mut self.transport)
    }
}

fn fixed(text: &'static str) -> impl FnMut(&StatusSnapshot<'_>, &mut [u8]) -> Result<usize, StatusError> {
    move |_snapshot: &StatusSnapshot<'_>, buffer: &mut [u8]| {
        buffer[..text.len()].copy_from_slice(text.as_bytes());
        Ok(text.len())
    }
}

// -----------------------------------------------------------------------------
// Pacing
// -----------------------------------------------------------------------------

#[test]
fn default_chunks_are_paced_then_idle() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::with_default_chunks();
    assert_eq!(reporter.chunk_count(), 4);

    assert!(reporter.trigger(at(0)));
    assert!(fixture.poll(&mut reporter, 0));
    assert!(!fixture.poll(&mut reporter, 10));
    assert!(!fixture.poll(&mut reporter, 24));
    assert!(fixture.poll(&mut reporter, 25));
    assert!(fixture.poll(&mut reporter, 50));
    assert!(fixture.poll(&mut reporter, 75));
    assert_eq!(reporter.state(), ReporterState::Idle);
    assert!(!fixture.poll(&mut reporter, 100));

    let sent = fixture.transport.sent_text();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].starts_with(r#"{"type":"basicStatus""#));
    assert!(sent[1].starts_with(r#"{"type":"devConfig""#));
    assert!(sent[2].starts_with(r#"{"type":"effectParams""#));
    assert!(sent[3].starts_with(r#"{"type":"defaults""#));
}

#[test]
fn trigger_is_ignored_while_sending() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::with_default_chunks();

    assert!(reporter.trigger(at(0)));
    fixture.poll(&mut reporter, 0);
    assert!(!reporter.trigger(at(10)));
    assert_eq!(reporter.state(), ReporterState::Sending { next: 1 });
}

#[test]
fn report_repeats_after_the_status_interval() {
    let mut fixture = Fixture::new();
    fixture.defaults.status_interval = 1000;
    let mut reporter = StatusReporter::new();

    assert!(fixture.poll(&mut reporter, 0));
    assert!(!fixture.poll(&mut reporter, 500));
    assert!(!fixture.poll(&mut reporter, 999));
    assert!(fixture.poll(&mut reporter, 1000));
    assert_eq!(fixture.transport.sent.len(), 2);
}

#[test]
fn disconnect_aborts_the_report() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::with_default_chunks();

    reporter.trigger(at(0));
    fixture.poll(&mut reporter, 0);
    fixture.transport.connected = false;

    assert!(!fixture.poll(&mut reporter, 25));
    assert!(!reporter.is_sending());
    assert_eq!(fixture.transport.sent.len(), 1);
}

#[test]
fn custom_chunk_delay() {
    let mut fixture = Fixture::new();
    let mut reporter =
        StatusReporter::with_default_chunks().with_chunk_delay(Duration::from_millis(100));

    reporter.trigger(at(0));
    fixture.poll(&mut reporter, 0);
    assert!(!fixture.poll(&mut reporter, 25));
    assert!(fixture.poll(&mut reporter, 100));
}

// -----------------------------------------------------------------------------
// Chunk registry
// -----------------------------------------------------------------------------

#[test]
fn registered_chunks_go_out_in_order() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::new();
    reporter.register_chunk("first", "first chunk", fixed(r#"{"n":1}"#));
    reporter.register_chunk("second", "second chunk", fixed(r#"{"n":2}"#));

    let names: Vec<_> = reporter.chunks().map(|(name, _)| name).collect();
    assert_eq!(names, ["first", "second"]);

    reporter.trigger(at(0));
    fixture.poll(&mut reporter, 0);
    fixture.poll(&mut reporter, 25);

    assert_eq!(fixture.transport.sent_text(), [r#"{"n":1}"#, r#"{"n":2}"#]);
}

fn always_fails(_snapshot: &StatusSnapshot<'_>, _buffer: &mut [u8]) -> Result<usize, StatusError> {
    Err(StatusError::Encode)
}

#[test]
fn failing_producer_does_not_stall_the_report() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::new();
    reporter.register_chunk("broken", "always fails", always_fails);
    reporter.register_chunk("ok", "works", fixed("{}"));

    reporter.trigger(at(0));
    assert!(fixture.poll(&mut reporter, 0));
    assert!(fixture.poll(&mut reporter, 25));

    assert_eq!(fixture.transport.sent_text(), ["{}"]);
    assert!(!reporter.is_sending());
}

#[test]
fn cleared_registry_falls_back_to_legacy_fragment() {
    let mut fixture = Fixture::new();
    fixture.state.position = Some(Position::new(40.5, -119.25));
    fixture.state.current_speed = 12.5;
    let mut reporter = StatusReporter::with_default_chunks();
    reporter.clear_chunks();
    assert_eq!(reporter.chunk_count(), 0);

    reporter.trigger(at(0));
    assert!(fixture.poll(&mut reporter, 0));
    assert!(!reporter.is_sending());

    let legacy = fixture.transport.last_text();
    assert!(legacy.starts_with(r#"{"pwr":true,"bri":10,"spd":100,"dir":true,"fx":"pstream","pal":"cool""#));
    assert!(legacy.contains(r#""posAvail":true"#));
    assert!(legacy.contains(r#""pos":{"lat":40.5,"lon":-119.25}"#));
    assert!(legacy.contains(r#""owner":"New","deviceName":"BMDevice""#));
}

// -----------------------------------------------------------------------------
// Chunk contents
// -----------------------------------------------------------------------------

#[test]
fn basic_status_reflects_live_state() {
    let mut fixture = Fixture::new();
    fixture.state.power = false;
    fixture.state.brightness = 42;
    fixture.defaults.max_brightness = 80;
    let mut reporter = StatusReporter::with_default_chunks();

    reporter.trigger(at(0));
    fixture.poll(&mut reporter, 0);

    assert_eq!(
        fixture.transport.last_text(),
        r#"{"type":"basicStatus","pwr":false,"bri":42,"spd":100,"dir":true,"fx":"pstream","pal":"cool","maxBri":80,"owner":"New","deviceName":"BMDevice"}"#
    );
}

#[test]
fn device_config_omits_missing_position() {
    let mut fixture = Fixture::new();
    let mut reporter = StatusReporter::with_default_chunks();

    reporter.trigger(at(0));
    fixture.poll(&mut reporter, 0);
    fixture.poll(&mut reporter, 25);

    let config = fixture.transport.last_text();
    assert!(config.contains(r#""activeLEDStrips":1"#));
    assert!(config.contains(r#""posAvail":false"#));
    assert!(!config.contains("\"pos\":"));
}
