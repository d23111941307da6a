use embassy_time::Duration;

/// Flash offset of the defaults partition on the production layout
pub const DEFAULTS_PARTITION_OFFSET: u32 = 0x31_0000;
/// Size of the defaults region, one erase block
pub const DEFAULTS_REGION_SIZE: usize = 4096;
pub const DEFAULTS_NAMESPACE: &str = "bmdefaults";
/// Current schema version of the persisted defaults
pub const DEFAULTS_VERSION: u8 = 1;

pub const MAX_LED_STRIPS: usize = 8;
/// Owner, device name and device type length limit, in bytes
pub const MAX_NAME_LEN: usize = 32;
pub const DEVICE_NAME_PREFIX: &str = "BMDevice - ";
/// Advertised name: prefix plus owner
pub const MAX_ADVERTISED_NAME_LEN: usize = DEVICE_NAME_PREFIX.len() + MAX_NAME_LEN;

pub const BRIGHTNESS_MIN: u8 = 1;
pub const BRIGHTNESS_MAX: u8 = 100;
pub const SPEED_MIN: u16 = 5;
pub const SPEED_MAX: u16 = 200;
pub const STATUS_INTERVAL_MIN: u32 = 1_000;
pub const STATUS_INTERVAL_MAX: u32 = 60_000;
pub const GPS_LOW_SPEED_MAX: f32 = 100.0;
pub const GPS_TOP_SPEED_MAX: f32 = 200.0;

/// Delay between two chunks of one status report
pub const STATUS_CHUNK_DELAY: Duration = Duration::from_millis(25);
pub const DEFAULT_STATUS_INTERVAL: u32 = 5_000;

/// Largest inbound command, opcode included
pub const MAX_COMMAND_LEN: usize = 1024;
pub const COMMAND_QUEUE_DEPTH: usize = 4;
/// Largest outbound status fragment
pub const MAX_FRAGMENT_LEN: usize = 1024;
