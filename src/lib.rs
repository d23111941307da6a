#![no_std]

//! Device core of the playa wearables.
//!
//! Ties the animation engine from `playa-light-composer` to the binary
//! command protocol, the paced status reporter and the persisted device
//! defaults. One [`Device::poll`] call is one iteration of the control loop.

extern crate alloc;

pub mod app;
pub mod config;
pub mod controllers;
pub mod device;
pub mod domain;
pub mod infrastructure;

pub use device::{CommandQueue, Device, DeviceError, submit_command};
