/// Compact uptime: `"2d 3h"`, `"1h 2m"` or `"5m"`. Seconds are dropped.
pub fn format_uptime(seconds: u64) -> String {
    let d = seconds / 86_400;
    let h = (seconds % 86_400) / 3_600;
    let m = (seconds % 3_600) / 60;
    if d > 0 {
        format!("{d}d {h}h")
    } else if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Shorten `name` to `keep` characters plus an ellipsis once it is longer than `limit`.
pub fn truncate(name: &str, limit: usize, keep: usize) -> String {
    if name.chars().count() > limit {
        let mut out: String = name.chars().take(keep).collect();
        out.push('…');
        out
    } else {
        name.to_string()
    }
}
