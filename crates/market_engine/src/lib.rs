//! Market engine: page fetching and off-thread execution of fetch effects.
mod engine;
mod fetch;
mod payload;
mod types;

pub use engine::EngineHandle;
pub use fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
pub use payload::{decode_item, decode_page};
pub use types::{EngineEvent, FailureKind, FetchError, FetchTicket};
