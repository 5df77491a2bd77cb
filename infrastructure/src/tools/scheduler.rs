//! `scheduler` tool — queue a drafted post for a publication slot.
//!
//! Either the mediator supplies `preferred_time`, or `optimize` picks the
//! next peak engagement slot (10:00 or 18:00 UTC). Scheduled entries are
//! kept in memory for the lifetime of the tool.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use postpilot_application::Tool;
use postpilot_domain::ToolError;
use serde_json::{Map, Value, json};
use std::sync::Mutex;

use super::args;
use super::timer::parse_timestamp;

/// Peak engagement hours (UTC) used by `optimize`.
const PEAK_HOURS: [u32; 2] = [10, 18];

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPost {
    pub content_id: String,
    pub scheduled_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SchedulerTool {
    scheduled: Mutex<Vec<ScheduledPost>>,
}

impl SchedulerTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries scheduled so far, oldest first.
    pub fn schedules(&self) -> Vec<ScheduledPost> {
        self.scheduled
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Tool for SchedulerTool {
    fn name(&self) -> &str {
        "scheduler"
    }

    fn description(&self) -> &str {
        "Schedule a drafted post for publication. Requires: content_id. \
         Optional: preferred_time, optimize (pick the next peak slot)."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let content_id = args::require_str(args, "content_id")?;
        let optimize = args::optional_bool(args, "optimize", false)?;

        let scheduled_time = if optimize {
            next_peak_slot(Utc::now())
        } else {
            match args::optional_str(args, "preferred_time") {
                Some(raw) => parse_timestamp(raw)?,
                None => {
                    return Err(ToolError::invalid_argument(
                        "provide preferred_time or set optimize to true",
                    ));
                }
            }
        };

        let entry = ScheduledPost {
            content_id: content_id.to_string(),
            scheduled_time,
        };
        self.scheduled
            .lock()
            .map_err(|_| ToolError::execution_failed("schedule store poisoned"))?
            .push(entry);

        Ok(json!({
            "content_id": content_id,
            "scheduled_time": scheduled_time.to_rfc3339(),
            "status": "scheduled",
        }))
    }
}

/// Next peak hour strictly after `now` (today or tomorrow).
fn next_peak_slot(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    for day_offset in 0..2 {
        let date = today + Duration::days(day_offset);
        for &hour in &PEAK_HOURS {
            if let Some(candidate) = date
                .and_hms_opt(hour, 0, 0)
                .map(|naive| naive.and_utc())
                .filter(|slot| *slot > now)
            {
                return candidate;
            }
        }
    }
    // Unreachable with non-empty PEAK_HOURS; keep a sane fallback anyway.
    now + Duration::hours(24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[tokio::test]
    async fn test_preferred_time_is_used() {
        let tool = SchedulerTool::new();
        let args = json!({"content_id": "draft-u1", "preferred_time": "2026-09-03T09:00:00Z"})
            .as_object()
            .cloned()
            .unwrap();

        let result = tool.invoke(&args).await.unwrap();
        assert_eq!(result["status"], "scheduled");
        assert_eq!(result["scheduled_time"], "2026-09-03T09:00:00+00:00");
        assert_eq!(tool.schedules().len(), 1);
        assert_eq!(tool.schedules()[0].content_id, "draft-u1");
    }

    #[tokio::test]
    async fn test_optimize_picks_future_peak_hour() {
        let tool = SchedulerTool::new();
        let args = json!({"content_id": "draft-u1", "optimize": true})
            .as_object()
            .cloned()
            .unwrap();

        let result = tool.invoke(&args).await.unwrap();
        let slot = parse_timestamp(result["scheduled_time"].as_str().unwrap()).unwrap();
        assert!(slot > Utc::now());
        assert!(PEAK_HOURS.contains(&slot.hour()));
        assert_eq!(slot.minute(), 0);
    }

    #[tokio::test]
    async fn test_neither_time_nor_optimize_is_an_error() {
        let tool = SchedulerTool::new();
        let args = json!({"content_id": "draft-u1"}).as_object().cloned().unwrap();

        let err = tool.invoke(&args).await.err().unwrap();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert!(tool.schedules().is_empty());
    }

    #[test]
    fn test_next_peak_slot_rolls_over_to_tomorrow() {
        let late = "2026-09-01T21:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let slot = next_peak_slot(late);
        assert_eq!(slot.hour(), 10);
        assert_eq!(slot.date_naive().to_string(), "2026-09-02");
    }

    #[test]
    fn test_next_peak_slot_same_day() {
        let morning = "2026-09-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(next_peak_slot(morning).hour(), 10);

        let midday = "2026-09-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(next_peak_slot(midday).hour(), 18);
    }
}
