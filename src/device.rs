//! Control loop of a single device.

use alloc::boxed::Box;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use heapless::{String, Vec};
use playa_core::{MonotonicSource, SyncedClock};
use playa_light_composer::{EngineError, LightEngine, PixelSink, Scene};

use crate::{
    app::usecases::{DefaultsUsecases, light},
    config::{COMMAND_QUEUE_DEPTH, DEVICE_NAME_PREFIX, MAX_ADVERTISED_NAME_LEN, MAX_COMMAND_LEN},
    controllers::{
        ChunkProducer, CommandContext, CommandDispatcher, CommandOverride, DispatchOutcome,
        StatusReporter, StatusSnapshot,
    },
    domain::{
        dto::DeviceDefaults,
        entity::DeviceState,
        ports::{DefaultsReader, DefaultsStorage, LocationProvider, Transport, TransportError},
    },
};

pub type CommandBuffer = Vec<u8, MAX_COMMAND_LEN>;

/// Inbound commands, filled by the transport and drained by [`Device::poll`]
pub type CommandQueue = Channel<CriticalSectionRawMutex, CommandBuffer, COMMAND_QUEUE_DEPTH>;

/// Queue a received write for the control loop
pub fn submit_command(queue: &CommandQueue, command: &[u8]) -> Result<(), TransportError> {
    let buffer = CommandBuffer::from_slice(command).map_err(|_e| {
        #[cfg(feature = "log")]
        log::warn!("device: command of {} bytes dropped", command.len());

        TransportError::PayloadTooLarge
    })?;
    queue.try_send(buffer).map_err(|_e| {
        #[cfg(feature = "log")]
        log::warn!("device: command queue full");

        TransportError::QueueFull
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    Transport(TransportError),
    Engine(EngineError),
}

pub type AdvertisedName = String<MAX_ADVERTISED_NAME_LEN>;

/// `"BMDevice - <owner>"`, cut to the advertising limit
pub fn advertised_name(owner: &str) -> AdvertisedName {
    let mut name = AdvertisedName::new();
    let _ = name.push_str(DEVICE_NAME_PREFIX);
    for c in owner.chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    name
}

/// Per-device seed so units running the same scene do not animate in
/// lockstep
#[allow(clippy::cast_possible_truncation)]
fn effect_seed(entropy: u16, now_ms: u32, device_name: &str) -> u16 {
    let time = (now_ms as u16) ^ ((now_ms >> 16) as u16);
    device_name
        .bytes()
        .fold(entropy ^ time, |seed, byte| {
            seed.rotate_left(5) ^ u16::from(byte)
        })
}

pub struct Device<'a, T, R, M>
where
    T: Transport,
    R: DefaultsStorage,
    M: MonotonicSource,
{
    transport: T,
    commands: &'a CommandQueue,
    clock: SyncedClock<M>,
    defaults: DefaultsUsecases<R>,
    state: DeviceState,
    engine: LightEngine<'a>,
    dispatcher: CommandDispatcher<'a>,
    reporter: StatusReporter<'a>,
    location: Option<&'a mut dyn LocationProvider>,
    connection_handler: Option<Box<dyn FnMut(bool) + 'a>>,
    connected: bool,
    service_id: &'a str,
    name: AdvertisedName,
    entropy: u16,
}

impl<'a, T, R, M> Device<'a, T, R, M>
where
    T: Transport,
    R: DefaultsStorage,
    M: MonotonicSource,
{
    pub fn new(
        transport: T,
        repository: R,
        commands: &'a CommandQueue,
        clock: SyncedClock<M>,
        service_id: &'a str,
    ) -> Self {
        Self {
            transport,
            commands,
            clock,
            defaults: DefaultsUsecases::new(repository),
            state: DeviceState::new(),
            engine: LightEngine::new(),
            dispatcher: CommandDispatcher::new(),
            reporter: StatusReporter::with_default_chunks(),
            location: None,
            connection_handler: None,
            connected: false,
            service_id,
            name: AdvertisedName::new(),
            entropy: 0,
        }
    }

    pub fn add_sink(&mut self, sink: &'a mut dyn PixelSink) -> Result<(), DeviceError> {
        self.engine.add_sink(sink).map_err(DeviceError::Engine)
    }

    /// Device-unique value (MAC, chip id) mixed into the effect seed at
    /// [`begin`](Self::begin)
    pub fn add_entropy(&mut self, entropy: u16) {
        self.entropy = self.entropy.wrapping_add(entropy);
    }

    pub fn set_location_provider(&mut self, provider: &'a mut dyn LocationProvider) {
        self.location = Some(provider);
    }

    pub fn set_command_override(&mut self, handler: impl CommandOverride + 'a) {
        self.dispatcher.set_override(handler);
    }

    pub fn clear_command_override(&mut self) {
        self.dispatcher.clear_override();
    }

    /// Called with the new link state on every connect and disconnect
    pub fn set_connection_handler(&mut self, handler: impl FnMut(bool) + 'a) {
        self.connection_handler = Some(Box::new(handler));
    }

    pub fn register_status_chunk(
        &mut self,
        name: &'a str,
        description: &'a str,
        producer: impl ChunkProducer + 'a,
    ) {
        self.reporter.register_chunk(name, description, producer);
    }

    pub fn clear_status_chunks(&mut self) {
        self.reporter.clear_chunks();
    }

    /// Load defaults, apply them and start advertising
    pub fn begin(&mut self) -> Result<(), DeviceError> {
        self.defaults.begin();
        let defaults = self.defaults.defaults();
        self.engine
            .add_entropy(effect_seed(self.entropy, self.clock.now_ms(), &defaults.device_name));
        light::apply_defaults(&mut self.state, defaults);
        light::apply_state(&mut self.engine, &self.state, defaults);

        self.name = advertised_name(&defaults.owner);
        self.transport
            .advertise(&self.name, self.service_id)
            .map_err(|e| {
                #[cfg(feature = "log")]
                log::error!("device: failed to advertise: {:?}", e);

                DeviceError::Transport(e)
            })?;

        #[cfg(feature = "log")]
        log::info!("device: advertising as {}", self.name.as_str());

        Ok(())
    }

    /// One iteration of the control loop
    pub fn poll(&mut self) {
        let now = self.clock.now();

        if let Ok(command) = self.commands.try_receive() {
            self.dispatch(&command);
        }

        self.update_connection(now);
        self.update_location();

        let snapshot = StatusSnapshot {
            state: &self.state,
            defaults: self.defaults.defaults(),
        };
        self.reporter
            .poll(now, self.connected, &snapshot, &mut self.transport);

        if self.state.power {
            self.engine.render(now);
        } else {
            self.engine.blank();
        }
    }

    /// Run a command immediately, bypassing the queue
    pub fn dispatch(&mut self, command: &[u8]) -> DispatchOutcome {
        let mut ctx = CommandContext {
            state: &mut self.state,
            defaults: &mut self.defaults,
            engine: &mut self.engine,
            notifier: &mut self.transport,
        };
        self.dispatcher.dispatch(&mut ctx, command)
    }

    /// Start a status report now
    pub fn request_status(&mut self) -> bool {
        let now = self.clock.now();
        self.reporter.trigger(now)
    }

    pub fn synchronize_clock(&mut self, reference_ms: u32) {
        self.clock.synchronize(reference_ms);
    }

    /// Merge a scene received from a peer device.
    ///
    /// Ignored while sync is disabled in the defaults. The next local
    /// command rebuilds the scene from the device state again.
    pub fn apply_sync_scene(&mut self, scene: &Scene) -> bool {
        if !self.defaults.defaults().sync_enabled {
            #[cfg(feature = "log")]
            log::debug!("device: sync disabled, peer scene dropped");

            return false;
        }
        self.engine.apply_sync_update(scene);
        true
    }

    fn update_connection(&mut self, now: embassy_time::Instant) {
        let connected = self.transport.is_connected();
        if connected == self.connected {
            return;
        }
        self.connected = connected;

        #[cfg(feature = "log")]
        log::info!("device: central {}", if connected { "connected" } else { "disconnected" });

        if connected {
            self.reporter.trigger(now);
        }
        if let Some(handler) = self.connection_handler.as_mut() {
            handler(connected);
        }
    }

    fn update_location(&mut self) {
        let defaults = self.defaults.defaults();
        if !defaults.gps_enabled {
            return;
        }
        let Some(provider) = self.location.as_deref_mut() else {
            return;
        };

        provider.update();
        let Some(position) = provider.position() else {
            return;
        };
        self.state.position = Some(position);
        self.state.current_speed = provider.speed();

        if defaults.gps_lightshow_speed_enabled {
            light::apply_state(&mut self.engine, &self.state, defaults);
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn defaults(&self) -> &DeviceDefaults {
        self.defaults.defaults()
    }

    pub fn engine(&self) -> &LightEngine<'a> {
        &self.engine
    }

    pub fn reporter(&self) -> &StatusReporter<'a> {
        &self.reporter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &SyncedClock<M> {
        &self.clock
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn into_parts(self) -> (T, R) {
        (self.transport, self.defaults.into_repository())
    }
}
