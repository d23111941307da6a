//! Binary command protocol.
//!
//! A command is `[opcode:u8][payload...]`. 32-bit integers and floats sit
//! at offset 1 in native byte order, booleans are one byte (nonzero is
//! true), strings are the remaining bytes without a terminator. Commands
//! shorter than their declared length are dropped without touching state;
//! no acknowledgment is ever sent for a dropped command.

mod handlers;

use alloc::boxed::Box;

use playa_light_composer::LightEngine;

use crate::{
    app::usecases::light,
    domain::{
        entity::{DeviceState, EffectParameter},
        ports::{DefaultsHandler, StatusNotifier},
    },
};

/// Command identifiers of the wire protocol
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Power = 0x01,
    Brightness = 0x04,
    Speed = 0x05,
    Direction = 0x06,
    Origin = 0x07,
    Palette = 0x08,
    /// Reserved, has no standard handler
    Speedometer = 0x09,
    Effect = 0x0A,
    WaveWidth = 0x0B,
    MeteorCount = 0x0C,
    TrailLength = 0x0D,
    HeatVariance = 0x0E,
    MirrorCount = 0x0F,
    CometCount = 0x10,
    DropRate = 0x11,
    CloudScale = 0x12,
    BlobCount = 0x13,
    WaveCount = 0x14,
    FlashIntensity = 0x15,
    FlashFrequency = 0x16,
    ExplosionSize = 0x17,
    SpiralArms = 0x18,
    Color = 0x19,
    GetDefaults = 0x1A,
    SetDefaults = 0x1B,
    SaveCurrentAsDefaults = 0x1C,
    ResetToFactory = 0x1D,
    SetMaxBrightness = 0x1E,
    SetDeviceOwner = 0x1F,
    SetAutoOn = 0x20,
    SetGpsLowSpeed = 0x21,
    SetGpsTopSpeed = 0x22,
    SetGpsLightshowSpeedEnabled = 0x23,
    SetOwner = 0x30,
    SetDeviceType = 0x31,
    ConfigureLedStrip = 0x32,
    GetConfiguration = 0x33,
    ResetToDefaults = 0x34,
}

impl Opcode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        let opcode = match value {
            0x01 => Self::Power,
            0x04 => Self::Brightness,
            0x05 => Self::Speed,
            0x06 => Self::Direction,
            0x07 => Self::Origin,
            0x08 => Self::Palette,
            0x09 => Self::Speedometer,
            0x0A => Self::Effect,
            0x0B => Self::WaveWidth,
            0x0C => Self::MeteorCount,
            0x0D => Self::TrailLength,
            0x0E => Self::HeatVariance,
            0x0F => Self::MirrorCount,
            0x10 => Self::CometCount,
            0x11 => Self::DropRate,
            0x12 => Self::CloudScale,
            0x13 => Self::BlobCount,
            0x14 => Self::WaveCount,
            0x15 => Self::FlashIntensity,
            0x16 => Self::FlashFrequency,
            0x17 => Self::ExplosionSize,
            0x18 => Self::SpiralArms,
            0x19 => Self::Color,
            0x1A => Self::GetDefaults,
            0x1B => Self::SetDefaults,
            0x1C => Self::SaveCurrentAsDefaults,
            0x1D => Self::ResetToFactory,
            0x1E => Self::SetMaxBrightness,
            0x1F => Self::SetDeviceOwner,
            0x20 => Self::SetAutoOn,
            0x21 => Self::SetGpsLowSpeed,
            0x22 => Self::SetGpsTopSpeed,
            0x23 => Self::SetGpsLightshowSpeedEnabled,
            0x30 => Self::SetOwner,
            0x31 => Self::SetDeviceType,
            0x32 => Self::ConfigureLedStrip,
            0x33 => Self::GetConfiguration,
            0x34 => Self::ResetToDefaults,
            _ => return None,
        };
        Some(opcode)
    }

    /// Effect parameter set by this opcode
    pub const fn effect_parameter(self) -> Option<EffectParameter> {
        let parameter = match self {
            Self::WaveWidth => EffectParameter::WaveWidth,
            Self::MeteorCount => EffectParameter::MeteorCount,
            Self::TrailLength => EffectParameter::TrailLength,
            Self::HeatVariance => EffectParameter::HeatVariance,
            Self::MirrorCount => EffectParameter::MirrorCount,
            Self::CometCount => EffectParameter::CometCount,
            Self::DropRate => EffectParameter::DropRate,
            Self::CloudScale => EffectParameter::CloudScale,
            Self::BlobCount => EffectParameter::BlobCount,
            Self::WaveCount => EffectParameter::WaveCount,
            Self::FlashIntensity => EffectParameter::FlashIntensity,
            Self::FlashFrequency => EffectParameter::FlashFrequency,
            Self::ExplosionSize => EffectParameter::ExplosionSize,
            Self::SpiralArms => EffectParameter::SpiralArms,
            _ => return None,
        };
        Some(parameter)
    }
}

/// Everything a command handler may touch
pub struct CommandContext<'c, 'e> {
    pub state: &'c mut DeviceState,
    pub defaults: &'c mut dyn DefaultsHandler,
    pub engine: &'c mut LightEngine<'e>,
    /// Channel for command replies
    pub notifier: &'c mut dyn StatusNotifier,
}

impl CommandContext<'_, '_> {
    /// Rebuild the whole scene from the current state
    pub fn refresh_scene(&mut self) -> bool {
        light::apply_state(self.engine, self.state, self.defaults.defaults())
    }

    /// Load the defaults snapshot into the live state and rebuild the scene
    pub fn apply_defaults(&mut self) {
        light::apply_defaults(self.state, self.defaults.defaults());
        self.refresh_scene();
    }

    pub fn reply(&mut self, payload: &[u8]) {
        if let Err(_e) = self.notifier.notify(payload) {
            #[cfg(feature = "log")]
            log::warn!("dispatcher: failed to send reply: {:?}", _e);
        }
    }
}

/// Hook that sees every command before the standard table.
///
/// Returning `true` claims the command and skips standard dispatch.
pub trait CommandOverride {
    fn handle(&mut self, ctx: &mut CommandContext<'_, '_>, command: &[u8]) -> bool;
}

impl<F> CommandOverride for F
where
    F: FnMut(&mut CommandContext<'_, '_>, &[u8]) -> bool,
{
    fn handle(&mut self, ctx: &mut CommandContext<'_, '_>, command: &[u8]) -> bool {
        self(ctx, command)
    }
}

/// What happened to a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// Claimed by the override hook
    Overridden,
    /// Empty or shorter than the opcode requires
    Ignored,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
enum PayloadLen {
    AtLeast(usize),
    Exactly(usize),
}

impl PayloadLen {
    const fn accepts(self, len: usize) -> bool {
        match self {
            PayloadLen::AtLeast(min) => len >= min,
            PayloadLen::Exactly(exact) => len == exact,
        }
    }
}

type Handler = fn(&mut CommandContext<'_, '_>, &[u8]);

struct CommandRoute {
    opcode: Opcode,
    len: PayloadLen,
    handler: Handler,
}

const fn route(opcode: Opcode, len: PayloadLen, handler: Handler) -> CommandRoute {
    CommandRoute {
        opcode,
        len,
        handler,
    }
}

use PayloadLen::{AtLeast, Exactly};

/// Lengths include the opcode byte
const COMMANDS: [CommandRoute; 37] = [
    route(Opcode::Power, AtLeast(2), handlers::power),
    route(Opcode::Brightness, AtLeast(5), handlers::brightness),
    route(Opcode::Speed, AtLeast(5), handlers::speed),
    route(Opcode::Direction, AtLeast(2), handlers::direction),
    route(Opcode::Origin, Exactly(9), handlers::origin),
    route(Opcode::Palette, AtLeast(2), handlers::palette),
    route(Opcode::Effect, AtLeast(2), handlers::effect),
    route(Opcode::WaveWidth, AtLeast(5), handlers::effect_parameter),
    route(Opcode::MeteorCount, AtLeast(5), handlers::effect_parameter),
    route(Opcode::TrailLength, AtLeast(5), handlers::effect_parameter),
    route(Opcode::HeatVariance, AtLeast(5), handlers::effect_parameter),
    route(Opcode::MirrorCount, AtLeast(5), handlers::effect_parameter),
    route(Opcode::CometCount, AtLeast(5), handlers::effect_parameter),
    route(Opcode::DropRate, AtLeast(5), handlers::effect_parameter),
    route(Opcode::CloudScale, AtLeast(5), handlers::effect_parameter),
    route(Opcode::BlobCount, AtLeast(5), handlers::effect_parameter),
    route(Opcode::WaveCount, AtLeast(5), handlers::effect_parameter),
    route(Opcode::FlashIntensity, AtLeast(5), handlers::effect_parameter),
    route(Opcode::FlashFrequency, AtLeast(5), handlers::effect_parameter),
    route(Opcode::ExplosionSize, AtLeast(5), handlers::effect_parameter),
    route(Opcode::SpiralArms, AtLeast(5), handlers::effect_parameter),
    route(Opcode::Color, AtLeast(4), handlers::color),
    route(Opcode::GetDefaults, AtLeast(1), handlers::get_defaults),
    route(Opcode::SetDefaults, AtLeast(2), handlers::set_defaults),
    route(Opcode::SaveCurrentAsDefaults, AtLeast(1), handlers::save_current_as_defaults),
    route(Opcode::ResetToFactory, AtLeast(1), handlers::reset_to_factory),
    route(Opcode::SetMaxBrightness, AtLeast(5), handlers::set_max_brightness),
    route(Opcode::SetDeviceOwner, AtLeast(2), handlers::set_owner),
    route(Opcode::SetAutoOn, AtLeast(2), handlers::set_auto_on),
    route(Opcode::SetGpsLowSpeed, AtLeast(5), handlers::set_gps_low_speed),
    route(Opcode::SetGpsTopSpeed, AtLeast(5), handlers::set_gps_top_speed),
    route(Opcode::SetGpsLightshowSpeedEnabled, AtLeast(2), handlers::set_gps_lightshow_speed),
    route(Opcode::SetOwner, AtLeast(2), handlers::set_owner),
    route(Opcode::SetDeviceType, AtLeast(2), handlers::set_device_type),
    route(Opcode::ConfigureLedStrip, AtLeast(6), handlers::configure_led_strip),
    route(Opcode::GetConfiguration, AtLeast(1), handlers::get_configuration),
    route(Opcode::ResetToDefaults, AtLeast(1), handlers::reset_to_factory),
];

/// Routes commands to their handlers
pub struct CommandDispatcher<'o> {
    override_handler: Option<Box<dyn CommandOverride + 'o>>,
}

impl<'o> CommandDispatcher<'o> {
    pub const fn new() -> Self {
        Self {
            override_handler: None,
        }
    }

    pub fn set_override(&mut self, handler: impl CommandOverride + 'o) {
        self.override_handler = Some(Box::new(handler));
    }

    pub fn clear_override(&mut self) {
        self.override_handler = None;
    }

    /// Whether the standard table routes `opcode`
    pub fn is_routed(opcode: u8) -> bool {
        COMMANDS.iter().any(|route| route.opcode.as_u8() == opcode)
    }

    pub fn dispatch(
        &mut self,
        ctx: &mut CommandContext<'_, '_>,
        command: &[u8],
    ) -> DispatchOutcome {
        let Some(&opcode) = command.first() else {
            #[cfg(feature = "log")]
            log::debug!("dispatcher: empty command");

            return DispatchOutcome::Ignored;
        };

        if let Some(handler) = self.override_handler.as_mut() {
            if handler.handle(ctx, command) {
                return DispatchOutcome::Overridden;
            }
        }

        let Some(route) = COMMANDS.iter().find(|route| route.opcode.as_u8() == opcode) else {
            #[cfg(feature = "log")]
            log::warn!("dispatcher: unknown opcode 0x{:02X}", opcode);

            return DispatchOutcome::Unknown;
        };

        if !route.len.accepts(command.len()) {
            #[cfg(feature = "log")]
            log::warn!(
                "dispatcher: dropping {:?}, unexpected length {}",
                route.opcode,
                command.len()
            );

            return DispatchOutcome::Ignored;
        }

        (route.handler)(ctx, command);
        DispatchOutcome::Handled
    }
}

impl Default for CommandDispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}
