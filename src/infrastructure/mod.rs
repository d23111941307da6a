//! Infrastructure layer - Port implementations
//!
//! Concrete implementations of the domain ports on top of the shared
//! `playa-core` primitives.

pub mod repositories;
