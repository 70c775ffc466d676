//! # Domain Models
//!
//! Configuration structures and shared constants for the imghub crates.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
