//! Analytics aggregation over the log stores
//!
//! [`summarize`] is a pure function of the three log snapshots and the
//! supplied `now`: it computes totals, unique users, top-N rankings, an
//! hourly timeline and a recent-activity feed. Nothing is cached; callers
//! recompute on every request.

use crate::log_entry::{ClickLog, ClientLog, LogRecord, SearchLog};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Longest timeline the aggregator will build: one leap year of hours
pub const MAX_TIMELINE_HOURS: u32 = 24 * 366;

/// Upper bound for each top-N list
pub const MAX_TOP_N: usize = 1_000;

/// Upper bound for the recent-activity feed
pub const MAX_RECENT_LIMIT: usize = 10_000;

/// Tunables for [`summarize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Length of each top-N list
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Maximum entries in the recent-activity feed
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Number of hourly timeline buckets
    #[serde(default = "default_timeline_hours")]
    pub timeline_hours: u32,
}

fn default_top_n() -> usize {
    5
}

fn default_recent_limit() -> usize {
    20
}

fn default_timeline_hours() -> u32 {
    24
}

impl AggregateOptions {
    /// Reject values that are zero or would make a report unreasonably large
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 || self.top_n > MAX_TOP_N {
            return Err(Error::InvalidInput(format!(
                "analytics.top_n must be between 1 and {} (got {})",
                MAX_TOP_N, self.top_n
            )));
        }
        if self.recent_limit > MAX_RECENT_LIMIT {
            return Err(Error::InvalidInput(format!(
                "analytics.recent_limit must be at most {} (got {})",
                MAX_RECENT_LIMIT, self.recent_limit
            )));
        }
        if self.timeline_hours == 0 || self.timeline_hours > MAX_TIMELINE_HOURS {
            return Err(Error::InvalidInput(format!(
                "analytics.timeline_hours must be between 1 and {} (got {})",
                MAX_TIMELINE_HOURS, self.timeline_hours
            )));
        }
        Ok(())
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            recent_limit: default_recent_limit(),
            timeline_hours: default_timeline_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCount {
    pub product_id: String,
    pub title: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_searches: usize,
    pub total_clicks: usize,
    pub total_client_events: usize,
    pub unique_users: usize,
    pub top_categories: Vec<CategoryCount>,
    pub top_search_queries: Vec<QueryCount>,
    pub top_clicked_products: Vec<ProductCount>,
}

/// One hour of activity; `timestamp` is the bucket start
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub timestamp: DateTime<Utc>,
    pub searches: usize,
    pub clicks: usize,
    pub pageviews: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Search,
    Click,
    Pageview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActivityDetails {
    Search(SearchLog),
    Click(ClickLog),
    Pageview(ClientLog),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
    pub details: ActivityDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub timeline: Vec<TimelineBucket>,
    pub recent_activity: Vec<RecentActivity>,
}

/// Compute the analytics report for the given log snapshots
///
/// Options above the `MAX_*` bounds are clamped to them.
pub fn summarize(
    searches: &[SearchLog],
    clicks: &[ClickLog],
    client_events: &[ClientLog],
    now: DateTime<Utc>,
    options: &AggregateOptions,
) -> AnalyticsReport {
    let top_n = options.top_n.min(MAX_TOP_N);
    let recent_limit = options.recent_limit.min(MAX_RECENT_LIMIT);
    let timeline_hours = options.timeline_hours.min(MAX_TIMELINE_HOURS);

    AnalyticsReport {
        summary: AnalyticsSummary {
            total_searches: searches.len(),
            total_clicks: clicks.len(),
            total_client_events: client_events.len(),
            unique_users: unique_users(searches, clicks, client_events),
            top_categories: top_categories(clicks, top_n),
            top_search_queries: top_search_queries(searches, top_n),
            top_clicked_products: top_clicked_products(clicks, top_n),
        },
        timeline: timeline(searches, clicks, client_events, now, timeline_hours),
        recent_activity: recent_activity(searches, clicks, client_events, recent_limit),
    }
}

/// Number of distinct session/user ids across all three logs
pub fn unique_users(searches: &[SearchLog], clicks: &[ClickLog], client_events: &[ClientLog]) -> usize {
    searches
        .iter()
        .filter_map(|s| s.actor_id())
        .chain(clicks.iter().filter_map(|c| c.actor_id()))
        .chain(client_events.iter().filter_map(|e| e.actor_id()))
        .collect::<HashSet<_>>()
        .len()
}

/// Count keys and rank them by frequency
///
/// The sort is stable, so keys with equal counts stay in first-seen order.
pub fn rank_by_frequency<'a, I>(keys: I, limit: usize) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for key in keys {
        match positions.get(key) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

fn top_categories(clicks: &[ClickLog], limit: usize) -> Vec<CategoryCount> {
    rank_by_frequency(clicks.iter().filter_map(|c| c.category.as_deref()), limit)
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}

fn top_search_queries(searches: &[SearchLog], limit: usize) -> Vec<QueryCount> {
    rank_by_frequency(searches.iter().filter_map(SearchLog::meaningful_query), limit)
        .into_iter()
        .map(|(query, count)| QueryCount {
            query: query.to_string(),
            count,
        })
        .collect()
}

fn top_clicked_products(clicks: &[ClickLog], limit: usize) -> Vec<ProductCount> {
    rank_by_frequency(clicks.iter().map(|c| c.product_id.as_str()), limit)
        .into_iter()
        .map(|(product_id, count)| ProductCount {
            product_id: product_id.to_string(),
            title: clicks
                .iter()
                .find(|c| c.product_id == product_id)
                .and_then(|c| c.title.clone()),
            count,
        })
        .collect()
}

/// Hourly buckets ending at `now`, oldest first
///
/// Bucket `i` covers `[now - (hours - i)h, now - (hours - i - 1)h)`; the last
/// bucket is closed on the right so an event stamped exactly `now` counts.
/// The window is `[now - hours, now]`, so the newest bucket is stamped
/// `now - 1h`, not `now`. Front-ends that label buckets by their end time
/// should add one hour.
fn timeline(
    searches: &[SearchLog],
    clicks: &[ClickLog],
    client_events: &[ClientLog],
    now: DateTime<Utc>,
    hours: u32,
) -> Vec<TimelineBucket> {
    let hours = i64::from(hours);

    (0..hours)
        .map(|i| {
            let start = now - Duration::hours(hours - i);
            let end = start + Duration::hours(1);
            let closed = i == hours - 1;
            let in_bucket = |ts: DateTime<Utc>| ts >= start && (ts < end || (closed && ts == end));

            TimelineBucket {
                timestamp: start,
                searches: searches.iter().filter(|s| in_bucket(s.timestamp)).count(),
                clicks: clicks.iter().filter(|c| in_bucket(c.timestamp)).count(),
                pageviews: client_events
                    .iter()
                    .filter(|e| e.is_pageview() && in_bucket(e.timestamp))
                    .count(),
            }
        })
        .collect()
}

/// Searches, clicks and pageviews merged newest first
fn recent_activity(
    searches: &[SearchLog],
    clicks: &[ClickLog],
    client_events: &[ClientLog],
    limit: usize,
) -> Vec<RecentActivity> {
    let mut activity: Vec<RecentActivity> = searches
        .iter()
        .map(|s| RecentActivity {
            kind: ActivityKind::Search,
            timestamp: s.timestamp,
            details: ActivityDetails::Search(s.clone()),
        })
        .chain(clicks.iter().map(|c| RecentActivity {
            kind: ActivityKind::Click,
            timestamp: c.timestamp,
            details: ActivityDetails::Click(c.clone()),
        }))
        .chain(client_events.iter().filter(|e| e.is_pageview()).map(|e| RecentActivity {
            kind: ActivityKind::Pageview,
            timestamp: e.timestamp,
            details: ActivityDetails::Pageview(e.clone()),
        }))
        .collect();

    activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activity.truncate(limit);
    activity
}

/// Count client events per type, for the client-log listing
pub fn client_event_counts(client_events: &[ClientLog]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for event in client_events {
        *counts.entry(event.kind.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_entry::ClientEventKind;

    fn search(session: &str, query: &str, ts: DateTime<Utc>) -> SearchLog {
        SearchLog {
            id: format!("s-{}-{}", session, query),
            query: Some(query.to_string()),
            timestamp: ts,
            user_agent: None,
            ip: "localhost".to_string(),
            session_id: session.to_string(),
        }
    }

    fn click(session: &str, product: &str, category: Option<&str>, ts: DateTime<Utc>) -> ClickLog {
        ClickLog {
            id: format!("c-{}-{}", session, product),
            product_id: product.to_string(),
            title: Some(format!("Product {}", product)),
            brand: None,
            category: category.map(str::to_string),
            price: None,
            url: None,
            timestamp: ts,
            user_agent: None,
            ip: "localhost".to_string(),
            session_id: session.to_string(),
        }
    }

    fn client(user: Option<&str>, kind: &str, ts: DateTime<Utc>) -> ClientLog {
        ClientLog {
            id: format!("e-{}", kind),
            kind: ClientEventKind::from(kind),
            timestamp: ts,
            user_id: user.map(str::to_string),
            url: None,
            user_agent: None,
            payload: None,
            server_timestamp: ts,
            ip: "localhost".to_string(),
        }
    }

    #[test]
    fn test_unique_users_is_set_union() {
        let now = Utc::now();
        let searches = vec![search("a", "phone", now), search("b", "phone", now)];
        let clicks = vec![click("b", "1", None, now), click("c", "2", None, now)];
        let events = vec![
            client(Some("a"), "pageview", now),
            client(Some("d"), "scroll", now),
            client(None, "hover", now),
        ];

        assert_eq!(unique_users(&searches, &clicks, &events), 4);
    }

    #[test]
    fn test_rank_by_frequency_breaks_ties_by_first_seen() {
        let ranked = rank_by_frequency(["b", "a", "c", "a", "b", "d"], 10);
        assert_eq!(ranked, vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn test_rank_by_frequency_truncates() {
        let ranked = rank_by_frequency(["x", "y", "y", "z"], 2);
        assert_eq!(ranked, vec![("y", 2), ("x", 1)]);
    }

    #[test]
    fn test_top_lists() {
        let now = Utc::now();
        let searches = vec![
            search("a", "iphone", now),
            search("a", "  ", now),
            search("b", "jacket", now),
            search("c", "jacket", now),
        ];
        let clicks = vec![
            click("a", "1", Some("手機"), now),
            click("a", "3", Some("耳機"), now),
            click("b", "3", Some("耳機"), now),
            click("c", "2", None, now),
        ];

        let report = summarize(&searches, &clicks, &[], now, &AggregateOptions::default());
        let summary = report.summary;

        assert_eq!(summary.total_searches, 4);
        assert_eq!(summary.total_clicks, 4);
        assert_eq!(
            summary.top_search_queries,
            vec![
                QueryCount { query: "jacket".to_string(), count: 2 },
                QueryCount { query: "iphone".to_string(), count: 1 },
            ]
        );
        assert_eq!(summary.top_categories[0].category, "耳機");
        assert_eq!(summary.top_categories[0].count, 2);
        assert_eq!(summary.top_categories.len(), 2);
        assert_eq!(summary.top_clicked_products[0].product_id, "3");
        assert_eq!(summary.top_clicked_products[0].title.as_deref(), Some("Product 3"));
        assert_eq!(summary.top_clicked_products[1].product_id, "1");
    }

    #[test]
    fn test_timeline_buckets_by_hour() {
        let now = Utc::now();
        let searches = vec![
            search("a", "q", now),
            search("a", "q", now - Duration::minutes(30)),
            search("a", "q", now - Duration::minutes(90)),
            search("a", "q", now - Duration::hours(30)),
        ];
        let events = vec![
            client(Some("a"), "pageview", now - Duration::minutes(10)),
            client(Some("a"), "scroll", now - Duration::minutes(10)),
        ];

        let report = summarize(&searches, &[], &events, now, &AggregateOptions::default());
        let timeline = report.timeline;

        assert_eq!(timeline.len(), 24);
        assert_eq!(timeline[0].timestamp, now - Duration::hours(24));
        assert_eq!(timeline[23].timestamp, now - Duration::hours(1));
        assert_eq!(timeline[23].searches, 2);
        assert_eq!(timeline[23].pageviews, 1);
        assert_eq!(timeline[22].searches, 1);

        let total: usize = timeline.iter().map(|b| b.searches).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_recent_activity_is_newest_first_pageviews_only() {
        let now = Utc::now();
        let searches = vec![search("a", "old", now - Duration::minutes(5))];
        let clicks = vec![click("a", "1", None, now - Duration::minutes(1))];
        let events = vec![
            client(Some("a"), "pageview", now - Duration::minutes(3)),
            client(Some("a"), "hover", now),
        ];

        let report = summarize(&searches, &clicks, &events, now, &AggregateOptions::default());
        let kinds: Vec<_> = report.recent_activity.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::Click, ActivityKind::Pageview, ActivityKind::Search]
        );
    }

    #[test]
    fn test_recent_activity_respects_limit() {
        let now = Utc::now();
        let searches: Vec<_> = (0..30)
            .map(|i| search("a", "q", now - Duration::seconds(i)))
            .collect();
        let options = AggregateOptions {
            recent_limit: 7,
            ..AggregateOptions::default()
        };

        let report = summarize(&searches, &[], &[], now, &options);
        assert_eq!(report.recent_activity.len(), 7);
        assert_eq!(report.recent_activity[0].timestamp, now);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let now = Utc::now();
        let report = summarize(&[], &[], &[], now, &AggregateOptions::default());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["summary"]["uniqueUsers"], 0);
        assert!(value["summary"]["topClickedProducts"].is_array());
        assert!(value["recentActivity"].is_array());
        assert_eq!(value["timeline"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_options_validate_bounds() {
        assert!(AggregateOptions::default().validate().is_ok());

        let too_long = AggregateOptions {
            timeline_hours: MAX_TIMELINE_HOURS + 1,
            ..AggregateOptions::default()
        };
        let err = too_long.validate().unwrap_err();
        assert!(err.to_string().contains("timeline_hours"));

        for options in [
            AggregateOptions { top_n: 0, ..AggregateOptions::default() },
            AggregateOptions { top_n: MAX_TOP_N + 1, ..AggregateOptions::default() },
            AggregateOptions { recent_limit: MAX_RECENT_LIMIT + 1, ..AggregateOptions::default() },
            AggregateOptions { timeline_hours: 0, ..AggregateOptions::default() },
        ] {
            assert!(matches!(options.validate(), Err(Error::InvalidInput(_))), "{:?}", options);
        }
    }

    #[test]
    fn test_oversized_options_are_clamped() {
        let now = Utc::now();
        let options = AggregateOptions {
            top_n: usize::MAX,
            recent_limit: usize::MAX,
            timeline_hours: 2_400_000_000,
        };

        let report = summarize(&[search("a", "q", now)], &[], &[], now, &options);
        assert_eq!(report.timeline.len(), MAX_TIMELINE_HOURS as usize);
        assert_eq!(report.timeline.last().unwrap().searches, 1);
        assert_eq!(report.recent_activity.len(), 1);
    }

    #[test]
    fn test_client_event_counts() {
        let now = Utc::now();
        let events = vec![
            client(Some("a"), "pageview", now),
            client(Some("a"), "scroll", now),
            client(Some("b"), "scroll", now),
        ];
        let counts = client_event_counts(&events);
        assert_eq!(counts.get("scroll"), Some(&2));
        assert_eq!(counts.get("pageview"), Some(&1));
    }
}
