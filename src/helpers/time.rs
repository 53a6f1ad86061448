use chrono::Utc;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

/// Unix seconds in the token timestamp width.
pub fn now_u32() -> u32 {
    u32::try_from(now_i64()).unwrap_or(u32::MAX)
}
