#![allow(dead_code)]

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use market_app::FeedStore;
use market_core::{Item, ItemId, Page, PageNumber, PrefetchGate};
use market_engine::{FailureKind, FetchError, PageFetcher};
use tokio::sync::oneshot;

pub const WAIT: Duration = Duration::from_secs(5);

type Reply = Result<Page, FetchError>;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(market_logging::initialize_for_tests);
}

/// Fetcher whose pages resolve only when the test releases them.
///
/// A page can be fetched any number of times; each call waits for its own
/// release, in call order.
#[derive(Default)]
pub struct ScriptedFetcher {
    waiting: Mutex<HashMap<PageNumber, Vec<oneshot::Sender<Reply>>>>,
    calls: Mutex<Vec<PageNumber>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<PageNumber> {
        self.calls.lock().unwrap().clone()
    }

    /// Resolves the oldest outstanding call for `page`, waiting for the call
    /// to reach the fetcher first.
    pub fn release(&self, page: PageNumber, reply: Reply) {
        let deadline = Instant::now() + WAIT;
        loop {
            let waiter = {
                let mut waiting = self.waiting.lock().unwrap();
                waiting
                    .get_mut(&page)
                    .filter(|queue| !queue.is_empty())
                    .map(|queue| queue.remove(0))
            };
            if let Some(waiter) = waiter {
                assert!(waiter.send(reply).is_ok(), "fetch of page {page} was dropped");
                return;
            }
            assert!(Instant::now() < deadline, "page {page} was never fetched");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    pub fn release_items(&self, page: PageNumber, ids: impl IntoIterator<Item = ItemId>) {
        self.release(page, Ok(page_of(page, ids)));
    }

    pub fn release_error(&self, page: PageNumber, kind: FailureKind, message: &str) {
        self.release(page, Err(FetchError::new(kind, message)));
    }
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, page: PageNumber) -> Result<Page, FetchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.calls.lock().unwrap().push(page);
        self.waiting
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .push(reply_tx);
        reply_rx
            .await
            .unwrap_or_else(|_| Err(FetchError::new(FailureKind::Transport, "reply dropped")))
    }
}

pub fn page_of(number: PageNumber, ids: impl IntoIterator<Item = ItemId>) -> Page {
    Page::new(
        number,
        ids.into_iter()
            .map(|id| Item::new(id, format!("product {id}")))
            .collect(),
    )
}

pub fn store_with(fetcher: &Arc<ScriptedFetcher>, page_size: usize) -> FeedStore {
    let gate = PrefetchGate::new(NonZeroUsize::new(page_size).unwrap());
    FeedStore::new(fetcher.clone(), gate).expect("fetch engine starts")
}

pub fn ids(items: &[Item]) -> Vec<ItemId> {
    items.iter().map(|item| item.id).collect()
}
