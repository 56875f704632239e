/// Format milliseconds as "MM:SS.mmm". Each unit is truncated, never rounded;
/// minutes grow past two digits as needed.
pub fn format_duration(ms: f64) -> String {
    // NaN.max(0.0) is 0.0
    let total_ms = ms.max(0.0).floor() as u64;
    let total_secs = total_ms / 1000;
    let m = total_secs / 60;
    let s = total_secs % 60;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}.{:03}", m, s, millis)
}
