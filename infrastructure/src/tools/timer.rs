//! `timer` tool — report how long until a scheduled time.
//!
//! Pure computation over timestamps; the only tool with no upstream and no
//! model call. Accepts RFC 3339 with or without an offset (naive times are
//! read as UTC).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use postpilot_application::Tool;
use postpilot_domain::ToolError;
use serde_json::{Map, Value, json};

use super::args;

#[derive(Debug, Default)]
pub struct TimerTool;

impl TimerTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for TimerTool {
    fn name(&self) -> &str {
        "timer"
    }

    fn description(&self) -> &str {
        "Report the time remaining until a scheduled post goes live. \
         Requires: scheduled_time. Optional: now, humanize, clamp_zero."
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
        let scheduled_raw = args::require_str(args, "scheduled_time")?;
        let scheduled = parse_timestamp(scheduled_raw)?;
        let humanize_output = args::optional_bool(args, "humanize", true)?;
        let clamp_zero = args::optional_bool(args, "clamp_zero", true)?;

        let now = match args::optional_str(args, "now") {
            Some(raw) => parse_timestamp(raw)?,
            None => Utc::now(),
        };

        let delta_secs = (scheduled - now).num_seconds();
        let overdue = delta_secs < 0;
        let remaining = if clamp_zero { delta_secs.max(0) } else { delta_secs };

        let mut result = json!({
            "scheduled_time": scheduled.to_rfc3339(),
            "now": now.to_rfc3339(),
            "seconds_remaining": remaining,
            "overdue": overdue,
        });
        if humanize_output
            && let Some(map) = result.as_object_mut()
        {
            map.insert("humanized".to_string(), json!(humanize(delta_secs)));
        }
        Ok(result)
    }
}

/// Parse an RFC 3339 timestamp; a naive `YYYY-MM-DDTHH:MM:SS` is taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ToolError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ToolError::invalid_argument(format!(
        "not a recognized timestamp: {}",
        raw
    )))
}

/// Render a second count as "2d 3h 5m" (or "… ago" when negative).
fn humanize(total_secs: i64) -> String {
    let past = total_secs < 0;
    let mut rest = total_secs.abs();

    let days = rest / 86_400;
    rest %= 86_400;
    let hours = rest / 3_600;
    rest %= 3_600;
    let minutes = rest / 60;
    rest %= 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if parts.is_empty() {
        parts.push(format!("{}s", rest));
    }

    let body = parts.join(" ");
    if past { format!("{} ago", body) } else { body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(scheduled: &str, now: &str) -> Map<String, Value> {
        json!({"scheduled_time": scheduled, "now": now})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_future_schedule() {
        let tool = TimerTool::new();
        let result = tool
            .invoke(&call("2026-09-01T12:00:00Z", "2026-09-01T10:30:00Z"))
            .await
            .unwrap();

        assert_eq!(result["seconds_remaining"], 5400);
        assert_eq!(result["overdue"], false);
        assert_eq!(result["humanized"], "1h 30m");
    }

    #[tokio::test]
    async fn test_overdue_schedule_clamps_remaining() {
        let tool = TimerTool::new();
        let result = tool
            .invoke(&call("2026-09-01T10:00:00Z", "2026-09-01T10:02:00Z"))
            .await
            .unwrap();

        assert_eq!(result["seconds_remaining"], 0);
        assert_eq!(result["overdue"], true);
        assert_eq!(result["humanized"], "2m ago");
    }

    #[tokio::test]
    async fn test_naive_timestamp_read_as_utc() {
        let tool = TimerTool::new();
        let result = tool
            .invoke(&call("2026-09-01T12:00:00", "2026-09-01T11:59:00Z"))
            .await
            .unwrap();
        assert_eq!(result["seconds_remaining"], 60);
    }

    #[tokio::test]
    async fn test_humanize_false_omits_field_and_clamp_false_goes_negative() {
        let tool = TimerTool::new();
        let args = json!({
            "scheduled_time": "2026-09-01T10:00:00Z",
            "now": "2026-09-01T10:01:00Z",
            "humanize": false,
            "clamp_zero": false
        })
        .as_object()
        .cloned()
        .unwrap();

        let result = tool.invoke(&args).await.unwrap();
        assert_eq!(result["seconds_remaining"], -60);
        assert!(result.get("humanized").is_none());
    }

    #[tokio::test]
    async fn test_rejects_garbage_timestamp() {
        let tool = TimerTool::new();
        let args = json!({"scheduled_time": "tomorrow-ish"})
            .as_object()
            .cloned()
            .unwrap();
        let err = tool.invoke(&args).await.err().unwrap();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[test]
    fn test_humanize_zero_and_seconds() {
        assert_eq!(humanize(0), "0s");
        assert_eq!(humanize(42), "42s");
        assert_eq!(humanize(90_061), "1d 1h 1m");
    }
}
