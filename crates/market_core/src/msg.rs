#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The feed view became visible; load the first page if nothing was requested yet.
    Activated,
    /// The feed view was dismissed; start over on the next visit.
    Dismissed,
    /// Explicit request for a page.
    PageRequested(crate::PageNumber),
    /// Presentation reported the last visible index after a scroll.
    VisibleRangeEnded { last_visible_index: usize },
    /// Engine completion: the page arrived.
    PageLoaded {
        page: crate::PageNumber,
        generation: crate::Generation,
        items: Vec<crate::Item>,
    },
    /// Engine completion: the fetch failed.
    PageFailed {
        page: crate::PageNumber,
        generation: crate::Generation,
        message: String,
    },
    /// User selected an item in the presentation.
    ItemSelected(crate::ItemId),
    /// Fallback for placeholder wiring.
    NoOp,
}
