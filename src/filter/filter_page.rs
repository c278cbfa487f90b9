use serde_json::Value;

use super::error::FilterError;
use super::types::Page;

impl Page {
    /// Pick the page window. Filter-supplied offset and limit win when both are
    /// present, then the legacy query parameters, then `(0, default_limit)`.
    /// The limit is clamped to `[0, max_limit]` and the offset floored at 0.
    pub fn resolve(
        filter_offset: Option<&Value>,
        filter_limit: Option<&Value>,
        legacy_offset: Option<&str>,
        legacy_limit: Option<&str>,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Page, FilterError> {
        let (offset, limit) = match (filter_offset, filter_limit, legacy_offset, legacy_limit) {
            (Some(offset), Some(limit), _, _) => (
                json_integer(offset).ok_or_else(|| FilterError::InvalidOffset(offset.to_string()))?,
                json_integer(limit).ok_or_else(|| FilterError::InvalidLimit(limit.to_string()))?,
            ),
            (_, _, Some(offset), Some(limit)) => (
                offset.trim().parse().map_err(|_| FilterError::InvalidOffset(offset.to_string()))?,
                limit.trim().parse().map_err(|_| FilterError::InvalidLimit(limit.to_string()))?,
            ),
            _ => (0, default_limit),
        };

        let clamped = limit.clamp(0, max_limit);
        if clamped != limit {
            tracing::warn!("Limit {} outside [0, {}], using {}", limit, max_limit, clamped);
        }

        Ok(Page { offset: offset.max(0), limit: clamped })
    }
}

fn json_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
