//! Human-readable memory sizes ("512MB", "2GB", "1.5g").

use once_cell::sync::Lazy;
use regex::Regex;

/// Smallest memory limit a linting container can usefully run with
pub const MIN_MEMORY_MB: u64 = 512;

/// Upper bound applied after heuristic scaling
pub const MAX_MEMORY_MB: u64 = 8 * 1024;

/// Replacement used when the configured limit is unusable
pub const FALLBACK_MEMORY: &str = "2GB";

static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([kmgt])?(?:i?b)?\s*$").expect("valid size regex")
});

/// Parse a size into megabytes. A bare number is read as megabytes.
pub fn parse_memory_mb(value: &str) -> Option<u64> {
    let caps = SIZE_RE.captures(value)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let factor = match caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .as_deref()
    {
        Some("k") => 1.0 / 1024.0,
        Some("m") | None => 1.0,
        Some("g") => 1024.0,
        Some("t") => 1024.0 * 1024.0,
        Some(_) => return None,
    };
    Some((amount * factor).round() as u64)
}

/// Render megabytes, preferring whole gigabytes
pub fn format_memory_mb(mb: u64) -> String {
    if mb >= 1024 && mb % 1024 == 0 {
        format!("{}GB", mb / 1024)
    } else {
        format!("{}MB", mb)
    }
}

/// Value for the container runtime's `--memory` flag
pub fn runtime_memory_flag(value: &str) -> Option<String> {
    parse_memory_mb(value).map(|mb| format!("{}m", mb))
}
