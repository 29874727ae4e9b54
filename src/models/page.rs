/// Paginated response envelope.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    /// Zero-based page number
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.number.saturating_add(1) >= self.total_pages
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: 0,
            size: 0,
        }
    }
}
