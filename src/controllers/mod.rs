pub mod commands;
pub mod status;

pub use commands::{CommandContext, CommandDispatcher, CommandOverride, DispatchOutcome, Opcode};
pub use status::{ChunkProducer, ReporterState, StatusError, StatusReporter, StatusSnapshot};
