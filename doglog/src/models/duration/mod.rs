use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new("([0-9]*)([a-zA-Z]*)").expect("segment pattern is valid"));

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.to_ascii_lowercase().as_str() {
        "s" => Some(1),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        "d" => Some(DAY),
        _ => None,
    }
}

/// Converts a compound range such as `2h` or `3d2h30m` into a number of seconds.
///
/// Segments are `<digits><unit>` pairs and accumulate, so `1h1h` is two hours.
/// Text between segments is skipped and only logged; an unknown unit or a
/// missing number fails.
pub fn range_to_seconds(range: &str) -> Result<u64> {
    let mut total: u64 = 0;
    let mut ignored: Vec<&str> = vec![];

    for caps in SEGMENT.captures_iter(range) {
        let part = caps.get(0).map_or("", |m| m.as_str());
        if part.len() <= 1 {
            if !part.is_empty() {
                ignored.push(part);
            }
            continue;
        }
        let (digits, unit) = (&caps[1], &caps[2]);
        let n: u64 = digits
            .parse()
            .map_err(|e| anyhow!("invalid number {:?} in {:?}: {}", digits, part, e))?;
        let multiplier =
            unit_seconds(unit).ok_or_else(|| anyhow!("unknown unit {:?} in {:?}", unit, part))?;
        total = n
            .checked_mul(multiplier)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| anyhow!("range {:?} is too large", range))?;
    }

    // Anything left over is skipped rather than rejected.
    let rest = SEGMENT.replace_all(range, "");
    if !rest.is_empty() || !ignored.is_empty() {
        log::warn!(
            "ignored unrecognized text in range {:?}: {:?} {:?}",
            range,
            rest,
            ignored
        );
    }

    log::debug!("range {:?} is {} seconds", range, total);
    Ok(total)
}
