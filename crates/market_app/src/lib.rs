//! Market app: owns the feed store and wires it to presentation and config.
pub mod config;
pub mod logging;
pub mod presenter;
pub mod store;
pub mod streams;

pub use config::{AppConfig, ConfigError};
pub use presenter::{FeedPresenter, Renderer, TextRenderer};
pub use store::FeedStore;
pub use streams::{Subject, Subscription};
