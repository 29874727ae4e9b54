/// Student listing controller.
/// Owns the filter state, resolves it to the search or category endpoint and
/// publishes the fetched page to subscribers.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Category, FilterState, Page, SortDirection, SortField, Student, StudentQuery};
use crate::notify::{Notification, Notifier};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// What subscribers render: the last applied page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub students: Vec<Student>,
    pub total_pages: u32,
    pub total_elements: u64,
    /// Page number reported by the server for `students`
    pub page: u32,
    /// Requests issued but not yet completed
    pub in_flight: usize,
    /// Sequence number of the request whose result is shown
    pub applied_seq: u64,
}

impl ListState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// Result of a filter change or manual refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the list state
    Applied,
    /// A newer request was issued meanwhile; the response was discarded
    Stale,
    /// The request failed; the previous state was kept
    Failed,
    /// The filter did not change, nothing was fetched
    Unchanged,
}

pub struct ListController {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    filters: Mutex<FilterState>,
    issued: AtomicU64,
    state: watch::Sender<ListState>,
}

impl ListController {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>, filters: FilterState) -> Self {
        let (state, _) = watch::channel(ListState::default());
        ListController {
            api,
            notifier,
            filters: Mutex::new(filters),
            issued: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub async fn filters(&self) -> FilterState {
        self.filters.lock().await.clone()
    }

    /// Search by keyword. Clears any category and returns to the first page.
    pub async fn set_keyword(&self, keyword: &str) -> FetchOutcome {
        self.update(|f| f.select_keyword(keyword)).await
    }

    /// List a single category (or drop back to keyword search with `None`).
    /// Clears the keyword and returns to the first page.
    pub async fn set_category(&self, category: Option<Category>) -> FetchOutcome {
        self.update(|f| f.select_category(category)).await
    }

    /// Drop both keyword and category.
    pub async fn clear_filters(&self) -> FetchOutcome {
        self.update(|f| f.select_category(None)).await
    }

    pub async fn set_sort(&self, sort_by: SortField, direction: SortDirection) -> FetchOutcome {
        self.update(|f| {
            f.sort_by = sort_by;
            f.direction = direction;
        })
        .await
    }

    /// Change the page size. Returns to the first page; zero is rejected.
    pub async fn set_size(&self, size: u32) -> Result<FetchOutcome> {
        let mut filters = self.filters.lock().await;
        let before = filters.clone();
        filters.resize(size)?;
        if *filters == before {
            return Ok(FetchOutcome::Unchanged);
        }
        let (query, seq) = self.issue(&filters);
        drop(filters);

        Ok(self.fetch(query, seq).await)
    }

    pub async fn set_page(&self, page: u32) -> FetchOutcome {
        self.update(|f| f.page = page).await
    }

    pub async fn first_page(&self) -> FetchOutcome {
        self.set_page(0).await
    }

    pub async fn previous_page(&self) -> FetchOutcome {
        self.update(|f| f.page = f.page.saturating_sub(1)).await
    }

    pub async fn next_page(&self) -> FetchOutcome {
        let total_pages = self.state.borrow().total_pages;
        self.update(|f| {
            if let Some(next) = f.page.checked_add(1).filter(|n| *n < total_pages) {
                f.page = next;
            }
        })
        .await
    }

    pub async fn last_page(&self) -> FetchOutcome {
        let total_pages = self.state.borrow().total_pages;
        match total_pages.checked_sub(1) {
            Some(last) => self.set_page(last).await,
            None => FetchOutcome::Unchanged,
        }
    }

    /// Apply `change` and, if it altered the filters, issue the fetch while
    /// still holding the filter lock.
    async fn update<F>(&self, change: F) -> FetchOutcome
    where
        F: FnOnce(&mut FilterState),
    {
        let mut filters = self.filters.lock().await;
        let before = filters.clone();
        change(&mut filters);
        if *filters == before {
            return FetchOutcome::Unchanged;
        }
        let (query, seq) = self.issue(&filters);
        drop(filters);

        self.fetch(query, seq).await
    }

    /// Fetch the page for the current filters.
    ///
    /// Each request gets a sequence number; its result is applied only if no
    /// newer request was issued while it was in flight.
    pub async fn refetch(&self) -> FetchOutcome {
        let (query, seq) = {
            let filters = self.filters.lock().await;
            self.issue(&filters)
        };
        self.fetch(query, seq).await
    }

    /// Resolve the query and take its sequence number. Callers hold the
    /// filter lock, so sequence order matches the order of filter changes.
    fn issue(&self, filters: &FilterState) -> (StudentQuery, u64) {
        let query = StudentQuery::resolve(filters);
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.in_flight += 1);
        (query, seq)
    }

    async fn fetch(&self, query: StudentQuery, seq: u64) -> FetchOutcome {
        log::debug!("Fetching students #{}: {:?}", seq, query);
        let result = self.api.list_students(&query).await;
        self.complete(seq, result)
    }

    /// Apply or discard a finished request. The latest-check runs inside the
    /// state update so an older page can never overwrite a newer one.
    fn complete(&self, seq: u64, result: Result<Page<Student>>) -> FetchOutcome {
        let mut outcome = FetchOutcome::Stale;
        let mut failure = None;
        self.state.send_modify(|s| {
            s.in_flight -= 1;
            let is_latest = seq == self.issued.load(Ordering::SeqCst);
            match result {
                Ok(page) if is_latest => {
                    s.students = page.content;
                    s.total_pages = page.total_pages;
                    s.total_elements = page.total_elements;
                    s.page = page.number;
                    s.applied_seq = seq;
                    outcome = FetchOutcome::Applied;
                }
                Err(e) if is_latest => {
                    failure = Some(e);
                    outcome = FetchOutcome::Failed;
                }
                Ok(_) => log::debug!("Discarding stale student page #{}", seq),
                Err(e) => log::debug!("Ignoring failure of stale request #{}: {}", seq, e),
            }
        });

        if let Some(e) = failure {
            log::error!("Failed to fetch students: {}", e);
            self.notifier.notify(Notification::error(
                e.user_message("Failed to load students"),
            ));
        }
        outcome
    }
}
