/// Aggregate DTOs returned by the dashboard endpoints, plus the derived views
/// the dashboard renders from them.

use serde::{Deserialize, Serialize};

/// Count for one label of a breakdown (gender, category or institute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDto {
    pub label: String,
    pub count: u64,
}

/// Registrations in one month (1-12) of the queried year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: u32,
    pub count: u64,
}

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_label(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_LABELS.get(idx as usize).copied())
}

/// Spread a sparse trend over twelve slots. Missing months stay zero and
/// out-of-range months are dropped.
pub fn monthly_series(trend: &[MonthlyTrend]) -> [u64; 12] {
    let mut series = [0u64; 12];
    for entry in trend {
        if (1..=12).contains(&entry.month) {
            series[(entry.month - 1) as usize] += entry.count;
        }
    }
    series
}

pub fn total_count(breakdown: &[CountDto]) -> u64 {
    breakdown.iter().map(|c| c.count).sum()
}

/// Percentage of the breakdown total held by `entry`; zero for an empty total.
pub fn share(entry: &CountDto, breakdown: &[CountDto]) -> f64 {
    match total_count(breakdown) {
        0 => 0.0,
        total => entry.count as f64 * 100.0 / total as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(label: &str, count: u64) -> CountDto {
        CountDto {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(1), Some("Jan"));
        assert_eq!(month_label(12), Some("Dec"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }

    #[test]
    fn test_monthly_series_fills_gaps() {
        let trend = vec![
            MonthlyTrend { month: 2, count: 4 },
            MonthlyTrend { month: 11, count: 1 },
            MonthlyTrend { month: 14, count: 9 },
        ];
        let series = monthly_series(&trend);
        assert_eq!(series[0], 0);
        assert_eq!(series[1], 4);
        assert_eq!(series[10], 1);
        assert_eq!(series.iter().sum::<u64>(), 5);
    }

    #[test]
    fn test_share_of_breakdown() {
        let gender = vec![count("MALE", 3), count("FEMALE", 1)];
        assert_eq!(total_count(&gender), 4);
        assert!((share(&gender[0], &gender) - 75.0).abs() < f64::EPSILON);
        assert_eq!(share(&count("OTHER", 0), &[]), 0.0);
    }
}
