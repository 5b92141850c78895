//! Pagination envelope.

use crate::{NODE_FIELD, Pagination, ReadError, TOTAL_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Navigation links of a page. `next`/`previous` only exist when there is
/// such a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// One page of a collection plus its position in the whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    pub items: Vec<Value>,
    /// Number of items on this page.
    pub amount: u64,
    pub current_page: u64,
    pub per_page: u64,
    /// Size of the whole collection.
    pub total: u64,
    pub total_pages: u64,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

impl PageEnvelope {
    /// Shapes rows produced by a paginated pipeline (`{node, total}` each).
    ///
    /// No rows means the page lies past the end (or the collection is
    /// empty); a missing count means the path did not hold an array.
    pub fn from_rows(
        resource: &str,
        pagination: Pagination,
        rows: Vec<Value>,
    ) -> Result<Self, ReadError> {
        let Some(first) = rows.first() else {
            return Err(ReadError::PageOutOfRange {
                page: pagination.page,
            });
        };
        let total = first
            .get(TOTAL_FIELD)
            .and_then(Value::as_u64)
            .ok_or(ReadError::NotACollection)?;
        let items = rows
            .into_iter()
            .filter_map(|mut row| row.get_mut(NODE_FIELD).map(Value::take))
            .collect();
        Self::shape(resource, pagination, total, items)
    }

    /// Builds the envelope for `items` on the requested page.
    pub fn shape(
        resource: &str,
        pagination: Pagination,
        total: u64,
        items: Vec<Value>,
    ) -> Result<Self, ReadError> {
        let Pagination { page, per_page } = pagination;
        let total_pages = total.div_ceil(per_page);
        if page > total_pages {
            return Err(ReadError::PageOutOfRange { page });
        }

        let link = |n: u64| format!("{resource}?page={n}&per_page={per_page}");
        let links = PageLinks {
            self_link: link(page),
            first: link(1),
            last: link(total_pages),
            next: (page < total_pages).then(|| link(page + 1)),
            previous: (page > 1).then(|| link(page - 1)),
        };

        Ok(Self {
            amount: items.len() as u64,
            items,
            current_page: page,
            per_page,
            total,
            total_pages,
            links,
        })
    }
}
