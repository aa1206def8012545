//! Host-side control for a QR-guided shelf robot.
//!
//! The robot carries a camera and two actuators (traversal drive and lift)
//! behind a small HTTP endpoint family on an unreliable wireless link. This
//! crate runs the navigation control loop: pull a frame, decode QR symbols,
//! match them against the commanded slot, dispatch actuator commands, and
//! fall back to a reconnect cadence when the link drops.

pub mod camera;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod control_loop;
pub mod events;
pub mod location;
pub mod navigator;
pub mod overlay;
pub mod qr;
pub mod robot;

pub use config::Config;
pub use events::NavEvent;
pub use location::{Level, LocationCode};
pub use navigator::{NavStatus, Phase};
pub use robot::Robot;
