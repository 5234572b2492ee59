use anyhow::{anyhow, Result};
use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9]{1,2}:[0-9]{2}(:[0-9]{2})?([ ]*(am|pm)?)?$")
        .expect("time-only pattern is valid")
});

static UTC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+) (utc|gmt|z)$").expect("utc suffix pattern is valid"));

const DATES_WITH_YEAR: &[&str] = &[
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATES_WITHOUT_YEAR: &[&str] = &["%B %d", "%m/%d", "%d %B"];

// `%.f` also matches when there is no fraction.
const TIMES: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S%.f %p",
    "%I:%M:%S%.f%p",
    "%I:%M %p",
    "%I:%M%p",
];

/// Layouts that do not split into a date part and a time part.
const FULL_LAYOUTS: &[&str] = &[
    "%a %B %d %H:%M:%S%.f %Y",
    "%a %B %d %H:%M %Y",
    "%d %B %Y, %H:%M:%S%.f",
    "%d %B %Y, %H:%M",
    "%B %d, %Y, %H:%M:%S%.f",
    "%B %d, %Y, %H:%M",
];

const WITH_OFFSET: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Resolves a human-friendly date such as `1:32pm`, `1/4/2019 12:30:00`,
/// `Jan 4 12:30` or `2h ago` against `now`.
///
/// A bare time is read as today at that time and a date without a year is
/// read as this year. An empty input is `now` when `default_to_now` is set,
/// otherwise `None`.
pub fn parse_date(
    input: &str,
    default_to_now: bool,
    now: DateTime<Local>,
) -> Result<Option<DateTime<Local>>> {
    let input = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if input.is_empty() {
        return Ok(if default_to_now { Some(now) } else { None });
    }

    let text = if TIME_ONLY.is_match(&input) {
        format!("{} {}", now.format("%Y-%m-%d"), input)
    } else {
        input
    };

    let date = parse_natural(&text, now)
        .or_else(|| parse_epoch(&text))
        .or_else(|| parse_with_offset(&text))
        .or_else(|| parse_utc_suffix(&text))
        .or_else(|| parse_naive(&text).and_then(local))
        .or_else(|| parse_naive(&format!("{} {}", now.year(), text)).and_then(local))
        .ok_or_else(|| anyhow!("unrecognized date {:?}", text))?;
    log::debug!("date {:?} resolved to {}", text, date);
    Ok(Some(date))
}

fn local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(d) => Some(d),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

fn parse_natural(s: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let s = s.to_ascii_lowercase();
    let today = now.naive_local().date();
    match s.as_str() {
        "now" => Some(now),
        "today" => local(today.and_hms_opt(0, 0, 0)?),
        "yesterday" => local(today.pred_opt()?.and_hms_opt(0, 0, 0)?),
        _ => {
            let ago = s.strip_suffix(" ago")?;
            let d = humantime::parse_duration(ago.trim()).ok()?;
            now.checked_sub_signed(chrono::Duration::from_std(d).ok()?)
        }
    }
}

/// Epoch seconds or milliseconds, and compact `YYYYMMDD` dates.
fn parse_epoch(s: &str) -> Option<DateTime<Local>> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    match s.len() {
        8 => NaiveDate::parse_from_str(s, "%Y%m%d")
            .ok()
            .filter(full_year)
            .and_then(|d| local(d.and_hms_opt(0, 0, 0)?)),
        9 | 10 => Local.timestamp_opt(n, 0).single(),
        13 => Local.timestamp_millis_opt(n).single(),
        _ => None,
    }
}

fn parse_with_offset(s: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .or_else(|| {
            WITH_OFFSET
                .iter()
                .find_map(|f| DateTime::parse_from_str(s, f).ok())
        })
        .filter(full_year)
        .map(|d| d.with_timezone(&Local))
}

/// `2019-01-04 12:30:00 UTC` and friends: a local layout followed by a UTC
/// zone name.
fn parse_utc_suffix(s: &str) -> Option<DateTime<Local>> {
    let caps = UTC_SUFFIX.captures(s)?;
    let naive = parse_naive(caps.get(1)?.as_str())?;
    Some(Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// `%Y` takes anywhere from one to four digits, so a short year such as the
/// `19` in `19-01-04` would otherwise land in the first century.
fn full_year<D: Datelike>(d: &D) -> bool {
    (1000..=9999).contains(&d.year())
}

/// Tries every date and date-time layout. Layouts without a year are only
/// tried with a leading `%Y ` so the caller can supply the year.
fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    let with_year = DATES_WITH_YEAR.iter().map(|d| d.to_string());
    let without_year = DATES_WITHOUT_YEAR.iter().map(|d| format!("%Y {}", d));
    let dates: Vec<String> = with_year.chain(without_year).collect();

    let full = FULL_LAYOUTS
        .iter()
        .filter_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .find(full_year);
    if full.is_some() {
        return full;
    }

    for date in &dates {
        for time in TIMES {
            for sep in &[" ", "T"] {
                let layout = format!("{}{}{}", date, sep, time);
                match NaiveDateTime::parse_from_str(s, &layout) {
                    Ok(naive) if full_year(&naive) => return Some(naive),
                    _ => {}
                }
            }
        }
        match NaiveDate::parse_from_str(s, date) {
            Ok(day) if full_year(&day) => return day.and_hms_opt(0, 0, 0),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, sec: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, sec)
            .unwrap();
        local(naive).unwrap()
    }

    fn now() -> DateTime<Local> {
        at(2024, 3, 15, 10, 0, 0)
    }

    fn parse(s: &str) -> DateTime<Local> {
        parse_date(s, false, now()).unwrap().unwrap()
    }

    #[test]
    fn empty_defaults_to_now_when_asked() {
        assert_eq!(parse_date("", true, now()).unwrap(), Some(now()));
        assert_eq!(parse_date("", false, now()).unwrap(), None);
        assert_eq!(parse_date("   ", false, now()).unwrap(), None);
    }

    #[test]
    fn bare_time_is_today() {
        assert_eq!(parse("1:32pm"), at(2024, 3, 15, 13, 32, 0));
        assert_eq!(parse("1:32 PM"), at(2024, 3, 15, 13, 32, 0));
        assert_eq!(parse("6:45am"), at(2024, 3, 15, 6, 45, 0));
        assert_eq!(parse("13:32"), at(2024, 3, 15, 13, 32, 0));
        assert_eq!(parse("08:05:09"), at(2024, 3, 15, 8, 5, 9));
    }

    #[test]
    fn bare_time_uses_current_date() {
        let d = parse_date("1:32pm", false, Local::now()).unwrap().unwrap();
        assert_eq!(d.naive_local().date(), Local::now().naive_local().date());
        assert_eq!((d.hour(), d.minute(), d.second()), (13, 32, 0));
    }

    #[test]
    fn absolute_dates() {
        assert_eq!(parse("2019-01-04 12:30:00"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("2019-01-04T12:30"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("1/4/2019 12:30:00"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("2019/01/04 1:05 pm"), at(2019, 1, 4, 13, 5, 0));
        assert_eq!(parse("January 4, 2019 12:30"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("4 Jan 2019 12:30"), at(2019, 1, 4, 12, 30, 0));
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(parse("2019-01-04"), at(2019, 1, 4, 0, 0, 0));
        assert_eq!(parse("1/4/2019"), at(2019, 1, 4, 0, 0, 0));
    }

    #[test]
    fn missing_year_is_current_year() {
        assert_eq!(parse("Jan 4 12:30"), at(2024, 1, 4, 12, 30, 0));
        assert_eq!(parse("1/4 12:30:15"), at(2024, 1, 4, 12, 30, 15));
        assert_eq!(parse("Feb 2"), at(2024, 2, 2, 0, 0, 0));
    }

    #[test]
    fn rfc3339_and_epoch() {
        let expected = Local.timestamp_opt(1_546_605_000, 0).unwrap();
        assert_eq!(parse("2019-01-04T12:30:00Z"), expected);
        assert_eq!(parse("1546605000"), expected);
        assert_eq!(parse("1546605000000"), expected);
    }

    #[test]
    fn natural_phrases() {
        assert_eq!(parse("now"), now());
        assert_eq!(parse("today"), at(2024, 3, 15, 0, 0, 0));
        assert_eq!(parse("Yesterday"), at(2024, 3, 14, 0, 0, 0));
        assert_eq!(parse("2h ago"), at(2024, 3, 15, 8, 0, 0));
        assert_eq!(parse("90min ago"), at(2024, 3, 15, 8, 30, 0));
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(parse("1/4/19"), at(2019, 1, 4, 0, 0, 0));
        assert_eq!(parse("1/4/19 12:30"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("12/31/99 11:59 pm"), at(1999, 12, 31, 23, 59, 0));
    }

    #[test]
    fn short_year_is_not_a_first_century_date() {
        assert!(parse_date("19-01-04", false, now()).is_err());
        assert!(parse_date("19/01/04 12:30", false, now()).is_err());
        assert!(parse_date("Jan 4 19", false, now()).is_err());
    }

    #[test]
    fn fractional_seconds() {
        let base = at(2019, 1, 4, 12, 30, 0);
        assert_eq!(
            parse("2019-01-04 12:30:00.123"),
            base + chrono::Duration::milliseconds(123)
        );
        assert_eq!(
            parse("2019-01-04T12:30:00.5"),
            base + chrono::Duration::milliseconds(500)
        );
        assert_eq!(
            parse("2019-01-04T12:30:00.250Z"),
            Local.timestamp_millis_opt(1_546_605_000_250).unwrap()
        );
    }

    #[test]
    fn rfc2822() {
        let expected = Utc
            .with_ymd_and_hms(2006, 1, 2, 22, 4, 5)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(parse("Mon, 02 Jan 2006 15:04:05 -0700"), expected);
    }

    #[test]
    fn trailing_utc_zone_name() {
        let expected = Local.timestamp_opt(1_546_605_000, 0).unwrap();
        assert_eq!(parse("2019-01-04 12:30:00 UTC"), expected);
        assert_eq!(parse("2019-01-04 12:30 gmt"), expected);
    }

    #[test]
    fn ctime_and_comma_layouts() {
        assert_eq!(parse("Fri Jan 4 12:30:00 2019"), at(2019, 1, 4, 12, 30, 0));
        assert_eq!(parse("12 Feb 2006, 19:17"), at(2006, 2, 12, 19, 17, 0));
    }

    #[test]
    fn compact_date() {
        assert_eq!(parse("20190104"), at(2019, 1, 4, 0, 0, 0));
        assert!(parse_date("00190104", false, now()).is_err());
    }

    #[test]
    fn garbage_fails() {
        assert!(parse_date("not a date", false, now()).is_err());
        assert!(parse_date("25:99", true, now()).is_err());
        assert!(parse_date("13:00pm", false, now()).is_err());
    }
}
