//! Weekly usage report.

use crate::types::ComponentRequest;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default report window
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Units handed out for one component
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Component name as recorded on the request lines
    pub component: String,
    /// Units approved within the window
    pub total_quantity: u64,
}

/// Units approved per component over a trailing window
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeeklyReport {
    /// Report time
    pub generated_at: DateTime<Utc>,
    /// Earliest approval time counted
    pub window_start: DateTime<Utc>,
    /// Requests counted
    pub request_count: usize,
    /// Rows by total descending, ties by name
    pub rows: Vec<ReportRow>,
}

/// Sums requested quantities of requests approved at or after `now - window`
///
/// Requests approved in the window count whether or not their units have
/// come back since. A window reaching past the earliest representable time
/// starts there.
pub fn weekly_report<'a>(
    requests: impl IntoIterator<Item = &'a ComponentRequest>,
    now: DateTime<Utc>,
    window: Duration,
) -> WeeklyReport {
    let window_start = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    let mut request_count = 0;

    for request in requests {
        let in_window = request
            .approved_at
            .is_some_and(|approved_at| approved_at >= window_start);
        if !in_window {
            continue;
        }
        request_count += 1;
        for line in &request.items {
            *totals.entry(line.name.clone()).or_default() += u64::from(line.quantity);
        }
    }

    let mut rows: Vec<ReportRow> = totals
        .into_iter()
        .map(|(component, total_quantity)| ReportRow {
            component,
            total_quantity,
        })
        .collect();
    // BTreeMap order breaks ties by name; the sort is stable
    rows.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

    WeeklyReport {
        generated_at: now,
        window_start,
        request_count,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentId, RequestId, RequestLine, RequestStatus, UserId};

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_089)
    }

    fn request(
        id: &str,
        status: RequestStatus,
        approved_days_ago: Option<i64>,
        lines: &[(&str, u32)],
    ) -> ComponentRequest {
        ComponentRequest {
            id: RequestId::from(id),
            user_id: UserId::from("u1"),
            user_name: "Charlie Brown".to_string(),
            department: "Mechatronics".to_string(),
            year: "4th".to_string(),
            items: lines
                .iter()
                .map(|(name, quantity)| RequestLine {
                    component_id: ComponentId::from(*name),
                    name: (*name).to_string(),
                    quantity: *quantity,
                    returned_quantity: 0,
                })
                .collect(),
            purpose: String::new(),
            status,
            created_at: now() - Duration::days(10),
            approved_at: approved_days_ago.map(|days| now() - Duration::days(days)),
        }
    }

    #[test]
    fn sums_approved_requests_inside_the_window() {
        let requests = [
            request("a", RequestStatus::Approved, Some(4), &[("Arduino Uno", 1), ("HC-SR04", 2)]),
            request("b", RequestStatus::Returned, Some(1), &[("Arduino Uno", 2)]),
            request("c", RequestStatus::Approved, Some(8), &[("Arduino Uno", 9)]),
            request("d", RequestStatus::Pending, None, &[("Raspberry Pi 4", 5)]),
        ];

        let report = weekly_report(&requests, now(), Duration::days(DEFAULT_WINDOW_DAYS));

        assert_eq!(report.request_count, 2);
        assert_eq!(
            report.rows,
            vec![
                ReportRow {
                    component: "Arduino Uno".to_string(),
                    total_quantity: 3
                },
                ReportRow {
                    component: "HC-SR04".to_string(),
                    total_quantity: 2
                },
            ]
        );
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let requests = [request(
            "a",
            RequestStatus::Approved,
            Some(0),
            &[("SG90 Micro Servo", 4), ("DHT11 Sensor", 4)],
        )];

        let report = weekly_report(&requests, now(), Duration::days(7));
        let names: Vec<&str> = report.rows.iter().map(|r| r.component.as_str()).collect();
        assert_eq!(names, vec!["DHT11 Sensor", "SG90 Micro Servo"]);
    }

    #[test]
    fn window_start_is_inclusive() {
        let requests = [request("a", RequestStatus::Approved, Some(7), &[("ESP32", 1)])];
        let report = weekly_report(&requests, now(), Duration::days(7));
        assert_eq!(report.request_count, 1);
    }

    #[test]
    fn window_past_the_earliest_time_counts_everything() {
        let requests = [request("a", RequestStatus::Approved, Some(400), &[("ESP32", 3)])];

        let report = weekly_report(&requests, now(), Duration::days(1_000_000_000));

        assert_eq!(report.window_start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(report.request_count, 1);
        assert_eq!(report.rows[0].total_quantity, 3);
    }
}
