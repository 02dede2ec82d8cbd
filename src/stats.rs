//! Latency aggregation: counts, means, nearest-rank percentiles, and
//! per-county breakdowns.

use crate::parser::NavRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate summary over one record set, at any scope (per-day or
/// all-time). Serialized as `summary.json` documents.
#[derive(Debug, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub p50: i64,
    pub p95: i64,
    pub p99: i64,
    #[serde(rename = "byCountyAvg")]
    pub by_county_avg: BTreeMap<String, f64>,
}

/// One day's entry in `trends/summary_by_day.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day: String,
    pub count: usize,
    pub mean: f64,
    pub p50: i64,
    pub p95: i64,
    pub p99: i64,
}

impl TrendPoint {
    pub fn from_summary(day: &str, summary: &Summary) -> Self {
        TrendPoint {
            day: day.to_string(),
            count: summary.count,
            mean: summary.mean,
            p50: summary.p50,
            p95: summary.p95,
            p99: summary.p99,
        }
    }
}

/// Nearest-rank percentile: the value at zero-based index `floor(p * (n-1))`
/// of the ascending-sorted values, with no interpolation. Returns 0 for
/// empty input.
pub fn percentile(values: &[i64], p: f64) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let index = (p * (sorted.len() - 1) as f64) as usize;
    sorted[index]
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

/// Groups records by their normalized county value, sorted by county so
/// downstream output is deterministic.
pub fn group_by_county(rows: &[NavRecord]) -> BTreeMap<String, Vec<&NavRecord>> {
    let mut groups: BTreeMap<String, Vec<&NavRecord>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.county.clone()).or_default().push(row);
    }
    groups
}

/// Sorts a county listing latency-descending and truncates it to `n`.
pub fn top_by_latency<'a>(mut rows: Vec<&'a NavRecord>, n: usize) -> Vec<&'a NavRecord> {
    rows.sort_by(|a, b| b.latency.cmp(&a.latency));
    rows.truncate(n);
    rows
}

/// Computes the aggregate summary for one record set. Each scope is
/// summarized independently from its own records.
pub fn summarize(rows: &[NavRecord]) -> Summary {
    let latencies: Vec<i64> = rows.iter().map(|r| r.latency).collect();

    let by_county_avg = group_by_county(rows)
        .into_iter()
        .map(|(county, group)| {
            let group_latencies: Vec<i64> = group.iter().map(|r| r.latency).collect();
            (county, mean(&group_latencies))
        })
        .collect();

    Summary {
        count: rows.len(),
        mean: mean(&latencies),
        p50: percentile(&latencies, 0.50),
        p95: percentile(&latencies, 0.95),
        p99: percentile(&latencies, 0.99),
        by_county_avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(county: &str, latency: i64) -> NavRecord {
        NavRecord {
            time: "t".to_string(),
            user_id: "U1".to_string(),
            username: "alice".to_string(),
            county: county.to_string(),
            screen: "Home".to_string(),
            latency,
        }
    }

    #[test]
    fn test_percentile_endpoints() {
        let values = vec![30, 10, 50, 20, 40];
        assert_eq!(percentile(&values, 0.0), 10);
        assert_eq!(percentile(&values, 1.0), 50);
    }

    #[test]
    fn test_percentile_nearest_rank_truncates() {
        // floor(0.5 * 4) = 2 -> third value of the sorted array
        assert_eq!(percentile(&[1, 2, 3, 4, 5], 0.5), 3);
        // floor(0.95 * 4) = 3
        assert_eq!(percentile(&[1, 2, 3, 4, 5], 0.95), 4);
    }

    #[test]
    fn test_percentile_empty_is_zero() {
        for p in [0.0, 0.5, 0.95, 1.0] {
            assert_eq!(percentile(&[], p), 0);
        }
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[42], 0.99), 42);
    }

    #[test]
    fn test_summarize_empty_is_degenerate_not_error() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.p50, 0);
        assert_eq!(summary.p95, 0);
        assert_eq!(summary.p99, 0);
        assert!(summary.by_county_avg.is_empty());
    }

    #[test]
    fn test_summarize_counts_and_means() {
        let rows = vec![
            record("WAKE", 1000),
            record("WAKE", 3000),
            record("DURHAM", 500),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 1500.0);
        assert_eq!(summary.by_county_avg["WAKE"], 2000.0);
        assert_eq!(summary.by_county_avg["DURHAM"], 500.0);
    }

    #[test]
    fn test_group_by_county_keeps_empty_group() {
        let rows = vec![record("", 100), record("WAKE", 200)];
        let groups = group_by_county(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[""].len(), 1);
    }

    #[test]
    fn test_top_by_latency_sorts_desc_and_caps() {
        let rows = vec![record("WAKE", 100), record("WAKE", 300), record("WAKE", 200)];
        let refs: Vec<&NavRecord> = rows.iter().collect();

        let top = top_by_latency(refs.clone(), 2);
        let latencies: Vec<i64> = top.iter().map(|r| r.latency).collect();
        assert_eq!(latencies, vec![300, 200]);

        let all = top_by_latency(refs, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_top_by_latency_is_stable_on_ties() {
        let a = record("WAKE", 100);
        let b = record("DURHAM", 100);
        let top = top_by_latency(vec![&a, &b], 2);
        assert_eq!(top[0].county, "WAKE");
        assert_eq!(top[1].county, "DURHAM");
    }

    #[test]
    fn test_trend_point_from_summary() {
        let summary = summarize(&[record("WAKE", 1000)]);
        let point = TrendPoint::from_summary("2025-01-01", &summary);
        assert_eq!(point.day, "2025-01-01");
        assert_eq!(point.count, 1);
        assert_eq!(point.mean, 1000.0);
        assert_eq!(point.p50, 1000);
    }
}
