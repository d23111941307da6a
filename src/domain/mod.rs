//! Domain layer
//!
//! Device state, persisted defaults, wire documents and the ports the
//! application layer talks through.

pub mod dto;
pub mod entity;
pub mod ports;
