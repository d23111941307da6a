//! Chunked status reporting.
//!
//! A full status report is split into named JSON chunks that go out one
//! per [`STATUS_CHUNK_DELAY`] so the link never sees a burst. Reports start
//! on connect, on an explicit trigger, and periodically every
//! `status_interval` milliseconds while a central is connected.

pub mod chunks;

use alloc::{boxed::Box, vec, vec::Vec};

use embassy_time::{Duration, Instant};

use crate::{
    config::{MAX_FRAGMENT_LEN, STATUS_CHUNK_DELAY},
    domain::{
        dto::DeviceDefaults,
        entity::DeviceState,
        ports::{StatusNotifier, TransportError},
    },
};

/// Read-only view the producers render from
#[derive(Clone, Copy)]
pub struct StatusSnapshot<'s> {
    pub state: &'s DeviceState,
    pub defaults: &'s DeviceDefaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusError {
    /// Payload did not fit the fragment buffer
    Encode,
    Transport(TransportError),
}

/// Renders one chunk into `buffer`, returning the written length
pub trait ChunkProducer {
    fn produce(
        &mut self,
        snapshot: &StatusSnapshot<'_>,
        buffer: &mut [u8],
    ) -> Result<usize, StatusError>;
}

impl<F> ChunkProducer for F
where
    F: FnMut(&StatusSnapshot<'_>, &mut [u8]) -> Result<usize, StatusError>,
{
    fn produce(
        &mut self,
        snapshot: &StatusSnapshot<'_>,
        buffer: &mut [u8],
    ) -> Result<usize, StatusError> {
        self(snapshot, buffer)
    }
}

struct StatusChunk<'a> {
    name: &'a str,
    description: &'a str,
    producer: Box<dyn ChunkProducer + 'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Idle,
    /// Index of the chunk that goes out next
    Sending { next: usize },
}

pub struct StatusReporter<'a> {
    chunks: Vec<StatusChunk<'a>>,
    state: ReporterState,
    chunk_delay: Duration,
    last_chunk_at: Option<Instant>,
    last_report_at: Option<Instant>,
    buffer: Vec<u8>,
}

impl<'a> StatusReporter<'a> {
    /// Reporter without chunks, sends the legacy full-state fragment
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            state: ReporterState::Idle,
            chunk_delay: STATUS_CHUNK_DELAY,
            last_chunk_at: None,
            last_report_at: None,
            buffer: vec![0; MAX_FRAGMENT_LEN],
        }
    }

    /// Reporter with the four standard chunks
    pub fn with_default_chunks() -> Self {
        let mut reporter = Self::new();
        reporter.register_chunk("basicStatus", "power, brightness and effect", chunks::basic_status);
        reporter.register_chunk("devConfig", "device and gps configuration", chunks::device_config);
        reporter.register_chunk("effectParams", "effect parameters", chunks::effect_params);
        reporter.register_chunk("defaults", "stored defaults", chunks::defaults);
        reporter
    }

    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Append a chunk, sent after the ones registered before it
    pub fn register_chunk(
        &mut self,
        name: &'a str,
        description: &'a str,
        producer: impl ChunkProducer + 'a,
    ) {
        #[cfg(feature = "log")]
        log::debug!("status: registered chunk {}", name);

        self.chunks.push(StatusChunk {
            name,
            description,
            producer: Box::new(producer),
        });
    }

    /// Drop every chunk and abort a running report
    pub fn clear_chunks(&mut self) {
        self.chunks.clear();
        self.state = ReporterState::Idle;
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Registered `(name, description)` pairs in send order
    pub fn chunks(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.chunks
            .iter()
            .map(|chunk| (chunk.name, chunk.description))
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, ReporterState::Sending { .. })
    }

    /// Start a report. Ignored while one is already in flight.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.is_sending() {
            return false;
        }

        self.state = ReporterState::Sending { next: 0 };
        self.last_report_at = Some(now);
        self.last_chunk_at = None;
        true
    }

    /// Advance the report, sending at most one fragment.
    ///
    /// Returns whether a fragment went out.
    pub fn poll(
        &mut self,
        now: Instant,
        connected: bool,
        snapshot: &StatusSnapshot<'_>,
        notifier: &mut dyn StatusNotifier,
    ) -> bool {
        if !connected {
            self.state = ReporterState::Idle;
            return false;
        }

        if !self.is_sending() {
            let interval = Duration::from_millis(u64::from(snapshot.defaults.status_interval));
            let due = self
                .last_report_at
                .is_none_or(|last| now.saturating_duration_since(last) >= interval);
            if !due {
                return false;
            }
            self.trigger(now);
        }

        let ReporterState::Sending { next } = self.state else {
            return false;
        };

        if self
            .last_chunk_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.chunk_delay)
        {
            return false;
        }

        let produced = if self.chunks.is_empty() {
            chunks::legacy_status(snapshot, &mut self.buffer)
        } else if let Some(chunk) = self.chunks.get_mut(next) {
            chunk.producer.produce(snapshot, &mut self.buffer)
        } else {
            self.state = ReporterState::Idle;
            return false;
        };

        let sent = produced.and_then(|len| {
            notifier
                .notify(&self.buffer[..len])
                .map_err(StatusError::Transport)
        });
        if let Err(_e) = sent {
            #[cfg(feature = "log")]
            log::warn!("status: failed to send fragment {}: {:?}", next, _e);
        }

        self.last_chunk_at = Some(now);
        let following = next + 1;
        self.state = if following < self.chunks.len() {
            ReporterState::Sending { next: following }
        } else {
            ReporterState::Idle
        };
        true
    }
}

impl Default for StatusReporter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
