pub type ItemId = u64;
pub type PageNumber = u32;
/// Bumped by every reset; fetches carry the generation they were issued in.
pub type Generation = u64;

pub const FIRST_PAGE_NUMBER: PageNumber = 1;

/// A single product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub thumbnail: String,
    pub price: f64,
    pub bargain_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub vendor_name: Option<String>,
    pub currency: Option<String>,
    pub stock: Option<u32>,
    pub description: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            thumbnail: String::new(),
            price: 0.0,
            bargain_price: None,
            discounted_price: None,
            vendor_name: None,
            currency: None,
            stock: None,
            description: None,
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discounted_price.is_some_and(|discount| discount > 0.0)
    }

    /// Price the buyer actually pays: the bargain price when discounted.
    pub fn effective_price(&self) -> f64 {
        match self.bargain_price {
            Some(bargain) if self.has_discount() => bargain,
            _ => self.price,
        }
    }
}

/// One batch of items returned by a single paginated fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: PageNumber,
    pub items: Vec<Item>,
    pub items_per_page: Option<u32>,
    pub last_page: Option<PageNumber>,
    pub has_next: Option<bool>,
}

impl Page {
    pub fn new(number: PageNumber, items: Vec<Item>) -> Self {
        Self {
            number,
            items,
            items_per_page: None,
            last_page: None,
            has_next: None,
        }
    }

    /// True when the server reported this as the final page.
    pub fn is_last(&self) -> bool {
        match (self.has_next, self.last_page) {
            (Some(has_next), _) => !has_next,
            (None, Some(last)) => self.number >= last,
            (None, None) => false,
        }
    }
}
