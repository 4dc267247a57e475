use std::collections::HashSet;

use market_core::{Item, Page, PageNumber};
use market_logging::market_warn;
use serde::Deserialize;

use crate::{FailureKind, FetchError};

/// Product list response of the marketplace API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductListPayload {
    page_no: Option<PageNumber>,
    items_per_page: Option<u32>,
    last_page: Option<PageNumber>,
    has_next: Option<bool>,
    pages: Vec<ProductPayload>,
}

#[derive(Debug, Deserialize)]
struct ProductPayload {
    id: u64,
    name: String,
    #[serde(default)]
    thumbnail: String,
    price: f64,
    bargain_price: Option<f64>,
    discounted_price: Option<f64>,
    #[serde(rename = "vendorName")]
    vendor_name: Option<String>,
    currency: Option<String>,
    stock: Option<u32>,
    description: Option<String>,
}

impl From<ProductPayload> for Item {
    fn from(p: ProductPayload) -> Self {
        Item {
            id: p.id,
            name: p.name,
            thumbnail: p.thumbnail,
            price: p.price,
            bargain_price: p.bargain_price,
            discounted_price: p.discounted_price,
            vendor_name: p.vendor_name,
            currency: p.currency,
            stock: p.stock,
            description: p.description,
        }
    }
}

/// Decode one page of products. Ids must be unique within the page.
pub fn decode_page(bytes: &[u8], requested: PageNumber) -> Result<Page, FetchError> {
    let payload: ProductListPayload = serde_json::from_slice(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

    if let Some(page_no) = payload.page_no {
        if page_no != requested {
            market_warn!(
                "Requested page {} but payload reports pageNo={}",
                requested,
                page_no
            );
        }
    }

    let mut seen = HashSet::with_capacity(payload.pages.len());
    let mut items = Vec::with_capacity(payload.pages.len());
    for product in payload.pages {
        if !seen.insert(product.id) {
            return Err(FetchError::new(
                FailureKind::Decode,
                format!("duplicate product id {} within page {requested}", product.id),
            ));
        }
        items.push(Item::from(product));
    }

    Ok(Page {
        number: requested,
        items,
        items_per_page: payload.items_per_page,
        last_page: payload.last_page,
        has_next: payload.has_next,
    })
}

/// Decode a single product detail response.
pub fn decode_item(bytes: &[u8]) -> Result<Item, FetchError> {
    serde_json::from_slice::<ProductPayload>(bytes)
        .map(Item::from)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}
