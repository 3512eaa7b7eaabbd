// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable duration parsing for config values like `30s`, `5m`, `1h`.

use std::time::Duration;

/// Parse a duration string like "30s", "5m", "1h", "1d" into a Duration.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", s))?;

    let multiplier = match suffix.trim() {
        "ms" | "millis" | "millisecond" | "milliseconds" => {
            return Ok(Duration::from_millis(num));
        }
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86400,
        other => return Err(format!("unknown duration suffix: {}", other)),
    };

    Ok(Duration::from_secs(num * multiplier))
}

/// Format a Duration back into the largest whole unit form `parse_duration` accepts.
/// Used when serializing config back out (e.g. for `--validate` echoing).
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 && d.subsec_millis() > 0 {
        return format!("{}ms", d.as_millis());
    }
    if secs % 86400 == 0 && secs > 0 {
        return format!("{}d", secs / 86400);
    }
    if secs % 3600 == 0 && secs > 0 {
        return format!("{}h", secs / 3600);
    }
    if secs % 60 == 0 && secs > 0 {
        return format!("{}m", secs / 60);
    }
    format!("{}s", secs)
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
