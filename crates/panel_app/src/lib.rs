//! Terminal front end of the proxy pool admin panel.
pub mod cli;
pub mod config;
pub mod platform;

pub use config::{PanelConfig, TimingsConfig};
pub use platform::{system_clock, Clock, PanelRuntime, Renderer, TerminalRenderer};
