use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use market_logging::market_debug;

use crate::fetch::PageFetcher;
use crate::{EngineEvent, FetchTicket};

enum EngineCommand {
    FetchPage { ticket: FetchTicket },
}

/// Runs page fetches on a tokio runtime owned by a worker thread.
///
/// Completions are queued on a channel in arrival order and are only observed
/// when the owner calls [`EngineHandle::try_recv`] or
/// [`EngineHandle::recv_timeout`], so the owner applies them on its own
/// thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts the worker. The runtime is built here so a failure reaches the
    /// caller instead of silently stranding queued fetches.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, event_tx).await;
                });
            }
            market_debug!("Fetch engine stopped");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Dispatches a fetch without waiting for it. False if the worker is gone.
    pub fn enqueue(&self, ticket: FetchTicket) -> bool {
        self.cmd_tx.send(EngineCommand::FetchPage { ticket }).is_ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchPage { ticket } => {
            market_debug!(
                "Fetching page {} (generation {})",
                ticket.page,
                ticket.generation
            );
            let result = fetcher.fetch_page(ticket.page).await;
            let _ = event_tx.send(EngineEvent::PageCompleted { ticket, result });
        }
    }
}
