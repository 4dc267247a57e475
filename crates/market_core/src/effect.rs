#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        page: crate::PageNumber,
        generation: crate::Generation,
    },
    Publish(FeedEvent),
}

/// Output of the feed, fanned out to subscribers by the owner of the state.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Items appended by one merged page, in arrival order.
    ItemsAdded(Vec<crate::Item>),
    LoadingChanged(bool),
    ErrorOccurred(String),
    ItemSelected(crate::ItemId),
    /// The feed was reset; downstream collections should empty.
    FeedCleared,
}
