use crate::{Generation, PageNumber};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub item_count: usize,
    pub is_loading: bool,
    pub in_flight: Vec<PageNumber>,
    pub next_page_number: PageNumber,
    pub last_error: Option<String>,
    pub generation: Generation,
    pub duplicates_dropped: usize,
    pub dirty: bool,
}

impl FeedViewModel {
    /// One-line status summary for logs and the CLI footer.
    pub fn status_line(&self) -> String {
        let loading = if self.is_loading { "loading" } else { "idle" };
        match &self.last_error {
            Some(err) => format!(
                "{} items, {loading}, next page {}, last error: {err}",
                self.item_count, self.next_page_number
            ),
            None => format!(
                "{} items, {loading}, next page {}",
                self.item_count, self.next_page_number
            ),
        }
    }
}
