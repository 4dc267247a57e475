//! Market core: pure feed state machine, prefetch gate and collection model.
mod collection;
mod effect;
mod gate;
mod item;
mod msg;
mod state;
mod update;
mod view_model;

pub use collection::{IncrementalCollectionModel, LayoutMode, Snapshot};
pub use effect::{Effect, FeedEvent};
pub use gate::PrefetchGate;
pub use item::{Generation, Item, ItemId, Page, PageNumber, FIRST_PAGE_NUMBER};
pub use msg::Msg;
pub use state::FeedState;
pub use update::update;
pub use view_model::FeedViewModel;
