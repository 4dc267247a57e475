//! Binds the store's event stream to a collection model and a renderer.

use std::io::Write;

use market_core::{FeedEvent, IncrementalCollectionModel, Item, LayoutMode, Snapshot};
use market_logging::market_warn;

use crate::store::FeedStore;
use crate::streams::Subscription;

/// The drawing surface. Receives every new snapshot.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
}

pub struct FeedPresenter<R: Renderer> {
    model: IncrementalCollectionModel,
    events: Subscription<FeedEvent>,
    renderer: R,
    rendered_version: Option<u64>,
}

impl<R: Renderer> FeedPresenter<R> {
    pub fn new(store: &FeedStore, layout: LayoutMode, renderer: R) -> Self {
        Self {
            model: IncrementalCollectionModel::new(layout),
            events: store.events(),
            renderer,
            rendered_version: None,
        }
    }

    /// Applies queued feed events and renders if the snapshot changed.
    /// Returns whether a render happened.
    pub fn sync(&mut self) -> bool {
        for event in self.events.drain() {
            match event {
                FeedEvent::ItemsAdded(items) => {
                    self.model.apply_append(items);
                }
                FeedEvent::FeedCleared => {
                    self.model.clear();
                }
                FeedEvent::LoadingChanged(_)
                | FeedEvent::ErrorOccurred(_)
                | FeedEvent::ItemSelected(_) => {}
            }
        }
        self.render_if_changed()
    }

    /// Re-lays out the loaded items without touching the store.
    pub fn set_layout(&mut self, layout: LayoutMode) -> bool {
        self.model.set_layout(layout);
        self.render_if_changed()
    }

    pub fn layout(&self) -> LayoutMode {
        self.model.layout()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.model.current_snapshot()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn render_if_changed(&mut self) -> bool {
        let snapshot = self.model.current_snapshot();
        if self.rendered_version == Some(snapshot.version()) {
            return false;
        }
        self.renderer.render(&snapshot);
        self.rendered_version = Some(snapshot.version());
        true
    }
}

/// Plain-text renderer: one row per item in list layout, a fixed-width table in grid.
///
/// Appends are drawn incrementally; a clear, a layout switch or a grid append
/// that would continue a partial row redraws everything.
pub struct TextRenderer<W: Write> {
    out: W,
    grid_columns: usize,
    previous: Option<Snapshot>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            grid_columns: 2,
            previous: None,
        }
    }

    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = columns.max(1);
        self
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let grid_columns = self.grid_columns;
        let incremental = self
            .previous
            .as_ref()
            .filter(|previous| previous.layout() == snapshot.layout())
            // A grid append has to start on a fresh row to keep the columns.
            .filter(|previous| {
                previous.layout() == LayoutMode::List || previous.len() % grid_columns == 0
            })
            .and_then(|previous| snapshot.appended_since(previous));

        let (start, items) = match incremental {
            Some(tail) => (snapshot.len() - tail.len(), tail),
            None => {
                writeln!(
                    self.out,
                    "-- {} view, {} items --",
                    snapshot.layout(),
                    snapshot.len()
                )?;
                (0, snapshot.items())
            }
        };

        match snapshot.layout() {
            LayoutMode::List => {
                for (offset, item) in items.iter().enumerate() {
                    writeln!(self.out, "{:>4}. {}", start + offset + 1, list_row(item))?;
                }
            }
            LayoutMode::Grid => {
                for row in items.chunks(self.grid_columns) {
                    let cells: Vec<String> = row.iter().map(grid_cell).collect();
                    writeln!(self.out, "{}", cells.join(" | "))?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) {
        if let Err(err) = self.write_snapshot(snapshot) {
            market_warn!("Failed to render snapshot {}: {}", snapshot.version(), err);
        }
        self.previous = Some(snapshot.clone());
    }
}

fn price_label(item: &Item) -> String {
    let currency = item.currency.as_deref().unwrap_or("");
    if item.has_discount() {
        format!(
            "{currency} {:.0} (was {:.0})",
            item.effective_price(),
            item.price
        )
        .trim()
        .to_string()
    } else {
        format!("{currency} {:.0}", item.price).trim().to_string()
    }
}

fn list_row(item: &Item) -> String {
    let stock = match item.stock {
        Some(0) => "sold out".to_string(),
        Some(n) => format!("stock {n}"),
        None => String::new(),
    };
    format!("[{}] {} - {} {}", item.id, item.name, price_label(item), stock)
        .trim_end()
        .to_string()
}

fn grid_cell(item: &Item) -> String {
    let name: String = item.name.chars().take(18).collect();
    format!("{:<18} {:>14}", name, price_label(item))
}
