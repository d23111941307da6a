//! Host doubles shared by the integration tests.

#![allow(dead_code)]

use playa_core::{FlashPreferences, MemoryFlash};
use playa_light::{
    domain::{
        entity::Position,
        ports::{LocationProvider, StatusNotifier, Transport, TransportError},
    },
    infrastructure::repositories::PersistentDefaults,
};

pub const FLASH_SIZE: usize = 8192;

pub type TestFlash = MemoryFlash<FLASH_SIZE>;
pub type TestRepository = PersistentDefaults<FlashPreferences<TestFlash, 4096>>;

pub fn repository() -> TestRepository {
    PersistentDefaults::open_at(TestFlash::new(), 0).unwrap()
}

pub fn reopen(repository: TestRepository) -> TestRepository {
    let flash = repository.into_inner().into_inner();
    PersistentDefaults::open_at(flash, 0).unwrap()
}

/// Transport that records everything sent over it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub connected: bool,
    pub advertised: Vec<(String, String)>,
    pub sent: Vec<Vec<u8>>,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn sent_text(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|payload| String::from_utf8(payload.clone()).unwrap())
            .collect()
    }

    pub fn last_text(&self) -> String {
        let last = self.sent.last().expect("nothing sent");
        String::from_utf8(last.clone()).unwrap()
    }
}

impl StatusNotifier for RecordingTransport {
    fn notify(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn advertise(&mut self, name: &str, service_id: &str) -> Result<(), TransportError> {
        self.advertised
            .push((name.to_string(), service_id.to_string()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Location source with a fixed answer
#[derive(Debug, Default)]
pub struct FixedLocation {
    pub position: Option<Position>,
    pub speed: f32,
    pub updates: usize,
}

impl LocationProvider for FixedLocation {
    fn update(&mut self) {
        self.updates += 1;
    }

    fn position(&self) -> Option<Position> {
        self.position
    }

    fn speed(&self) -> f32 {
        self.speed
    }
}

pub fn int_command(opcode: u8, value: i32) -> Vec<u8> {
    let mut command = vec![opcode];
    command.extend_from_slice(&value.to_ne_bytes());
    command
}

pub fn float_command(opcode: u8, value: f32) -> Vec<u8> {
    let mut command = vec![opcode];
    command.extend_from_slice(&value.to_ne_bytes());
    command
}

pub fn text_command(opcode: u8, text: &str) -> Vec<u8> {
    let mut command = vec![opcode];
    command.extend_from_slice(text.as_bytes());
    command
}
