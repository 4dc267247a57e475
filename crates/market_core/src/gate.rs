use std::num::NonZeroUsize;

use crate::PageNumber;

/// Decides from the last visible index whether the next page should be fetched.
///
/// The gate compares the page the index falls on against the caller's page
/// counter. It holds no counter of its own, so repeated scroll callbacks that
/// report the same boundary authorize at most one request once the caller
/// advances its counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchGate {
    page_size: NonZeroUsize,
}

impl PrefetchGate {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// The 1-based page containing `last_visible_index`.
    pub fn page_for_index(&self, last_visible_index: usize) -> PageNumber {
        let page = last_visible_index / self.page_size.get() + 1;
        PageNumber::try_from(page).unwrap_or(PageNumber::MAX)
    }

    /// Returns the page to request, if any.
    pub fn authorize(
        &self,
        last_visible_index: usize,
        next_page_number: PageNumber,
    ) -> Option<PageNumber> {
        let current_page = self.page_for_index(last_visible_index);
        (current_page == next_page_number).then_some(current_page)
    }
}

impl Default for PrefetchGate {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN))
    }
}
