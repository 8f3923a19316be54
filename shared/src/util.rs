use chrono::{SecondsFormat, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as an ISO-8601 UTC string with millisecond precision
/// (`2024-01-01T10:00:00.000Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Placeholder id for an entry inserted locally before the server assigns one.
pub fn temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, now_millis())
}

/// Prefix marking locally generated ids
pub const TEMP_ID_PREFIX: &str = "tmp_";
