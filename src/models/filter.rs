//! Listing filter state and its resolution into one of the two listing endpoints.
//!
//! The backend exposes keyword search and category listing as separate
//! endpoints, so a filter holds at most one of the two selection modes.

use super::student::Category;
use crate::error::{ClientError, Result};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Page sizes offered by the size selector.
pub const PAGE_SIZE_CHOICES: [u32; 4] = [5, 10, 20, 50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    FirstName,
    LastName,
    Email,
    Category,
    #[default]
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::FirstName,
        SortField::LastName,
        SortField::Email,
        SortField::Category,
        SortField::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::FirstName => "firstName",
            SortField::LastName => "lastName",
            SortField::Email => "email",
            SortField::Category => "category",
            SortField::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::Validation(format!("Unknown sort field: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ClientError::Validation(format!(
                "Unknown sort direction: {}",
                other
            ))),
        }
    }
}

/// Client-side listing filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub keyword: String,
    pub category: Option<Category>,
    pub sort_by: SortField,
    pub direction: SortDirection,
    /// Zero-based
    pub page: u32,
    pub size: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            keyword: String::new(),
            category: None,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    pub fn with_size(size: u32) -> Result<Self> {
        validate_size(size)?;
        Ok(FilterState {
            size,
            ..Default::default()
        })
    }

    /// Switch to keyword search. Clears the category and rewinds to page 0.
    pub fn select_keyword(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
        self.category = None;
        self.page = 0;
    }

    /// Switch to category listing (or back to search with `None`).
    /// Clears the keyword and rewinds to page 0.
    pub fn select_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.keyword.clear();
        self.page = 0;
    }

    pub fn resize(&mut self, size: u32) -> Result<()> {
        validate_size(size)?;
        self.size = size;
        self.page = 0;
        Ok(())
    }

    /// Short description of the active selection, e.g. for a page title.
    pub fn title(&self) -> String {
        match (&self.category, self.keyword.is_empty()) {
            (Some(category), _) => category.to_string(),
            (None, false) => self.keyword.clone(),
            (None, true) => "Full Data".to_string(),
        }
    }
}

fn validate_size(size: u32) -> Result<()> {
    if size == 0 {
        return Err(ClientError::Validation(
            "Page size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Paging and ordering shared by both listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub size: u32,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

/// A resolved listing request. Exactly one variant per fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentQuery {
    Search { keyword: String, paging: Paging },
    Category { category: Category, paging: Paging },
}

impl StudentQuery {
    pub fn resolve(filters: &FilterState) -> Self {
        let paging = Paging {
            page: filters.page,
            size: filters.size,
            sort_by: filters.sort_by,
            direction: filters.direction,
        };
        match filters.category {
            Some(category) => StudentQuery::Category { category, paging },
            None => StudentQuery::Search {
                keyword: filters.keyword.clone(),
                paging,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            StudentQuery::Search { .. } => "/students/search".to_string(),
            StudentQuery::Category { category, .. } => format!("/students/category/{}", category),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let (keyword, paging) = match self {
            StudentQuery::Search { keyword, paging } => (Some(keyword), paging),
            StudentQuery::Category { paging, .. } => (None, paging),
        };
        let mut params = Vec::with_capacity(5);
        if let Some(keyword) = keyword {
            params.push(("keyword", keyword.clone()));
        }
        params.push(("page", paging.page.to_string()));
        params.push(("size", paging.size.to_string()));
        params.push(("sortBy", paging.sort_by.to_string()));
        params.push(("direction", paging.direction.to_string()));
        params
    }
}
