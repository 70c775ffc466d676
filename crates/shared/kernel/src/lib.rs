//! Kernel utilities shared across the imghub crates.
//! Keep this crate lightweight: config loading plus the routes every server exposes.
//!
//! ## Config loading
//! ```rust,no_run
//! use imghub_kernel::config::load_app_config;
//!
//! let cfg = load_app_config(Some("server.toml")).unwrap();
//! println!("listening on {}", cfg.server.socket_addr());
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use imghub_domain as domain;
