use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use market_core::{Item, Page, PageNumber};
use market_engine::{EngineEvent, EngineHandle, FailureKind, FetchError, FetchTicket, PageFetcher};
use tokio::sync::oneshot;

type Reply = Result<Page, FetchError>;

/// Fetcher whose pages resolve only when the test says so.
struct ScriptedFetcher {
    pending: Mutex<HashMap<PageNumber, oneshot::Receiver<Reply>>>,
}

fn scripted(
    pages: &[PageNumber],
) -> (Arc<ScriptedFetcher>, HashMap<PageNumber, oneshot::Sender<Reply>>) {
    let mut pending = HashMap::new();
    let mut senders = HashMap::new();
    for page in pages {
        let (tx, rx) = oneshot::channel();
        pending.insert(*page, rx);
        senders.insert(*page, tx);
    }
    let fetcher = ScriptedFetcher {
        pending: Mutex::new(pending),
    };
    (Arc::new(fetcher), senders)
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, page: PageNumber) -> Result<Page, FetchError> {
        let rx = self.pending.lock().unwrap().remove(&page);
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::new(FailureKind::Transport, "dropped"))),
            None => Err(FetchError::new(FailureKind::Server(404), "unscripted page")),
        }
    }
}

fn page(number: PageNumber, ids: &[u64]) -> Page {
    Page::new(
        number,
        ids.iter().map(|id| Item::new(*id, format!("p{id}"))).collect(),
    )
}

fn ticket(page: PageNumber) -> FetchTicket {
    FetchTicket {
        page,
        generation: 0,
    }
}

fn completed_page(event: Option<EngineEvent>) -> (PageNumber, Result<Page, FetchError>) {
    match event.expect("engine event") {
        EngineEvent::PageCompleted { ticket, result } => (ticket.page, result),
    }
}

#[test]
fn completions_arrive_in_resolution_order() {
    let (fetcher, mut senders) = scripted(&[1, 2]);
    let engine = EngineHandle::new(fetcher).expect("engine starts");

    assert!(engine.enqueue(ticket(1)));
    assert!(engine.enqueue(ticket(2)));
    assert!(engine.try_recv().is_none());

    senders.remove(&2).unwrap().send(Ok(page(2, &[21]))).unwrap();
    let (first, result) = completed_page(engine.recv_timeout(Duration::from_secs(5)));
    assert_eq!(first, 2);
    assert_eq!(result.unwrap().items[0].id, 21);

    senders.remove(&1).unwrap().send(Ok(page(1, &[1]))).unwrap();
    let (second, _) = completed_page(engine.recv_timeout(Duration::from_secs(5)));
    assert_eq!(second, 1);
}

#[test]
fn failures_are_reported_once_with_ticket() {
    let (fetcher, _senders) = scripted(&[]);
    let engine = EngineHandle::new(fetcher).expect("engine starts");

    let issued = FetchTicket {
        page: 7,
        generation: 3,
    };
    assert!(engine.enqueue(issued));

    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::PageCompleted { ticket, result }) => {
            assert_eq!(ticket, issued);
            assert_eq!(result.unwrap_err().kind, FailureKind::Server(404));
        }
        None => panic!("no completion"),
    }
    assert!(engine.recv_timeout(Duration::from_millis(50)).is_none());
}

#[test]
fn fetch_enqueued_right_after_start_is_not_lost() {
    let (fetcher, mut senders) = scripted(&[1]);
    let engine = EngineHandle::new(fetcher).expect("engine starts");

    assert!(engine.enqueue(ticket(1)));
    senders.remove(&1).unwrap().send(Ok(page(1, &[1, 2]))).unwrap();

    let (completed, result) = completed_page(engine.recv_timeout(Duration::from_secs(5)));
    assert_eq!(completed, 1);
    assert_eq!(result.unwrap().items.len(), 2);
}
