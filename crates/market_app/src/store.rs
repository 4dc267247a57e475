//! The feed store: sole owner of [`FeedState`].
//!
//! Every mutation goes through [`market_core::update`] on the thread that owns
//! the store. Fetches run on the engine's runtime; their completions wait in
//! the engine channel until [`FeedStore::process_pending`] (or one of the
//! `wait_*` helpers) applies them here.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use market_core::{
    update, Effect, FeedEvent, FeedState, FeedViewModel, Item, ItemId, Msg, PageNumber,
    PrefetchGate,
};
use market_engine::{EngineEvent, EngineHandle, FetchTicket, PageFetcher};
use market_logging::{market_debug, market_error, market_info, market_warn};

use crate::streams::{Subject, Subscription};

pub struct FeedStore {
    state: FeedState,
    engine: EngineHandle,
    events: Subject<FeedEvent>,
    items_added: Subject<Vec<Item>>,
    loading_changed: Subject<bool>,
    error_occurred: Subject<String>,
    item_selected: Subject<ItemId>,
    feed_cleared: Subject<()>,
}

impl FeedStore {
    /// Fails only if the fetch engine's runtime cannot be started.
    pub fn new(fetcher: Arc<dyn PageFetcher>, gate: PrefetchGate) -> io::Result<Self> {
        Ok(Self {
            state: FeedState::new(gate),
            engine: EngineHandle::new(fetcher)?,
            events: Subject::new(),
            items_added: Subject::new(),
            loading_changed: Subject::new(),
            error_occurred: Subject::new(),
            item_selected: Subject::new(),
            feed_cleared: Subject::new(),
        })
    }

    // Inputs

    /// The feed view became visible: load the first page unless already requested.
    pub fn activate(&mut self) {
        self.dispatch(Msg::Activated);
    }

    /// Starts a fetch for `page`. No-op if that page is already in flight.
    pub fn request_page(&mut self, page: PageNumber) {
        if page == 0 {
            market_warn!("Ignoring request for page 0; pages start at 1");
            return;
        }
        if self.state.is_in_flight(page) {
            market_debug!("Page {} already in flight; request ignored", page);
            return;
        }
        self.dispatch(Msg::PageRequested(page));
    }

    pub fn on_visible_range_end(&mut self, last_visible_index: usize) {
        self.dispatch(Msg::VisibleRangeEnded { last_visible_index });
    }

    pub fn select_item(&mut self, id: ItemId) {
        self.dispatch(Msg::ItemSelected(id));
    }

    /// Clears the feed. In-flight fetches keep running but their results are dropped.
    pub fn reset(&mut self) {
        market_info!(
            "Resetting feed (generation {}, {} items, {} in flight)",
            self.state.generation(),
            self.state.items().len(),
            self.state.view().in_flight.len()
        );
        self.dispatch(Msg::Dismissed);
    }

    // Completion pump

    /// Applies every completion that has already arrived. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.engine.try_recv() {
            self.apply_engine_event(event);
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for one completion and applies it.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> bool {
        match self.engine.recv_timeout(timeout) {
            Some(event) => {
                self.apply_engine_event(event);
                true
            }
            None => false,
        }
    }

    /// Applies completions until nothing is in flight or `timeout` elapses.
    /// Returns whether the store is idle.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.wait_for_completion(remaining) {
                break;
            }
        }
        !self.state.is_loading()
    }

    // Reads

    pub fn items(&self) -> &[Item] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    pub fn next_page_number(&self) -> PageNumber {
        self.state.next_page_number()
    }

    pub fn page_size(&self) -> usize {
        self.state.gate().page_size().get()
    }

    pub fn view(&self) -> FeedViewModel {
        self.state.view()
    }

    // Output streams

    /// Every feed event in publish order, for consumers that need the
    /// interleaving of appends and clears.
    pub fn events(&self) -> Subscription<FeedEvent> {
        self.events.subscribe()
    }

    pub fn items_added(&self) -> Subscription<Vec<Item>> {
        self.items_added.subscribe()
    }

    pub fn loading_changed(&self) -> Subscription<bool> {
        self.loading_changed.subscribe()
    }

    pub fn error_occurred(&self) -> Subscription<String> {
        self.error_occurred.subscribe()
    }

    pub fn item_selected(&self) -> Subscription<ItemId> {
        self.item_selected.subscribe()
    }

    pub fn feed_cleared(&self) -> Subscription<()> {
        self.feed_cleared.subscribe()
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage { page, generation } => {
                    market_info!("Requesting page {} (generation {})", page, generation);
                    if !self.engine.enqueue(FetchTicket { page, generation }) {
                        market_error!("Fetch engine unavailable; failing page {}", page);
                        self.dispatch(Msg::PageFailed {
                            page,
                            generation,
                            message: "fetch engine is not running".to_string(),
                        });
                    }
                }
                Effect::Publish(event) => self.publish(event),
            }
        }
    }

    fn publish(&self, event: FeedEvent) {
        self.events.publish(event.clone());
        match event {
            FeedEvent::ItemsAdded(items) => {
                self.items_added.publish(items);
            }
            FeedEvent::LoadingChanged(is_loading) => {
                self.loading_changed.publish(is_loading);
            }
            FeedEvent::ErrorOccurred(message) => {
                self.error_occurred.publish(message);
            }
            FeedEvent::ItemSelected(id) => {
                self.item_selected.publish(id);
            }
            FeedEvent::FeedCleared => {
                self.feed_cleared.publish(());
            }
        }
    }

    fn apply_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::PageCompleted { ticket, result } => {
                if ticket.generation != self.state.generation() {
                    market_info!(
                        "Dropping page {} from stale generation {} (current {})",
                        ticket.page,
                        ticket.generation,
                        self.state.generation()
                    );
                    return;
                }
                match result {
                    Ok(page) => {
                        let before = self.state.items().len();
                        let received = page.items.len();
                        if page.is_last() {
                            market_debug!("Page {} is the last page", page.number);
                        }
                        self.dispatch(Msg::PageLoaded {
                            page: ticket.page,
                            generation: ticket.generation,
                            items: page.items,
                        });
                        let appended = self.state.items().len() - before;
                        market_info!(
                            "Merged page {}: {} appended, {} duplicates dropped",
                            ticket.page,
                            appended,
                            received - appended
                        );
                    }
                    Err(err) => {
                        market_warn!("Page {} failed: {}", ticket.page, err);
                        self.dispatch(Msg::PageFailed {
                            page: ticket.page,
                            generation: ticket.generation,
                            message: err.to_string(),
                        });
                    }
                }
            }
        }
    }
}
