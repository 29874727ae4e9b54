//! Dashboard aggregator.
//!
//! Fires the five aggregate queries together and publishes them as one
//! snapshot, so a renderer sees either the previous set or the new set.

use crate::api::ApiClient;
use crate::models::stats::{self, CountDto, MonthlyTrend};
use crate::notify::{Notification, Notifier};
use chrono::{DateTime, Datelike, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

pub const SYNC_SUCCESS: &str = "Dashboard synced";
pub const SYNC_FAILED: &str = "Failed to load analytics";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub total: u64,
    pub gender: Vec<CountDto>,
    pub category: Vec<CountDto>,
    pub institute: Vec<CountDto>,
    pub trend: Vec<MonthlyTrend>,
}

impl DashboardSnapshot {
    pub fn active_departments(&self) -> usize {
        self.category.len()
    }

    pub fn partner_institutes(&self) -> usize {
        self.institute.len()
    }

    pub fn monthly_series(&self) -> [u64; 12] {
        stats::monthly_series(&self.trend)
    }

    pub fn registrations_this_year(&self) -> u64 {
        self.monthly_series().iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub snapshot: DashboardSnapshot,
    pub loading: bool,
    /// Year the trend in `snapshot` belongs to
    pub year: Option<i32>,
    pub last_synced: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Synced,
    Failed,
    /// A refresh was already running
    Busy,
}

pub struct DashboardAggregator {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    loading: AtomicBool,
    state: watch::Sender<DashboardState>,
}

/// Clears the loading flag even if the refresh future is dropped mid-flight.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<DashboardState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }
}

impl DashboardAggregator {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        DashboardAggregator {
            api,
            notifier,
            loading: AtomicBool::new(false),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Refresh with the trend for the current calendar year.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_for_year(Local::now().year()).await
    }

    pub async fn refresh_for_year(&self, year: i32) -> RefreshOutcome {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Dashboard refresh already in progress");
            return RefreshOutcome::Busy;
        }
        self.state.send_modify(|s| s.loading = true);
        let _guard = LoadingGuard {
            flag: &self.loading,
            state: &self.state,
        };

        let result = futures::try_join!(
            self.api.total_students(),
            self.api.gender_count(),
            self.api.category_count(),
            self.api.institute_count(),
            self.api.registration_trend(year),
        );

        match result {
            Ok((total, gender, category, institute, trend)) => {
                let snapshot = DashboardSnapshot {
                    total,
                    gender,
                    category,
                    institute,
                    trend,
                };
                self.state.send_modify(|s| {
                    s.snapshot = snapshot;
                    s.year = Some(year);
                    s.last_synced = Some(Local::now());
                });
                self.notifier.notify(Notification::success(SYNC_SUCCESS));
                RefreshOutcome::Synced
            }
            Err(e) => {
                log::error!("Dashboard refresh failed: {}", e);
                self.notifier.notify(Notification::error(SYNC_FAILED));
                RefreshOutcome::Failed
            }
        }
    }
}
