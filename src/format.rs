//! Text formatting for times shown to users

/// Format a lap time in milliseconds as `m:ss.mmm` (or `ss.mmm` under a minute).
pub fn lap_time(ms: u32) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    if minutes > 0 {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    } else {
        format!("{:02}.{:03}", seconds, millis)
    }
}

/// Format a signed delta in milliseconds as `+s.mmm` / `-s.mmm`.
pub fn delta(ms: i32) -> String {
    let sign = if ms < 0 { '-' } else { '+' };
    let abs = ms.unsigned_abs();
    format!("{}{}.{:03}", sign, abs / 1_000, abs % 1_000)
}
