//! The date/time/duration family (§3.3.7-14, §3.2.6 `duration`, §3.4.25-28 XSD 1.1
//! aliases aside). Full Gregorian calendar arithmetic (leap seconds, the 14-hour
//! timezone-normalization equality rule of §3.2.7.4) is out of scope; values are
//! validated against their lexical grammar and compared as normalized field
//! tuples, shifting an explicit timezone offset to UTC first. Two values that
//! differ only by a timezone that an implicit-timezone recurring instant would
//! reconcile (e.g. "14:00:00" vs "09:00:00-05:00") are therefore compared as UTC
//! instants when both carry an offset, and compared field-for-field (not
//! instant-for-instant) when either side omits the offset. This is a documented
//! simplification, not a full §3.2.7.4 implementation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DatatypeError;

lazy_static! {
    static ref DATE_TIME: Regex = Regex::new(
        r"^(-?[0-9]{4,})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2}(?:\.[0-9]+)?)(Z|[+-][0-9]{2}:[0-9]{2})?$"
    ).expect("static regex");
    static ref DATE: Regex =
        Regex::new(r"^(-?[0-9]{4,})-([0-9]{2})-([0-9]{2})(Z|[+-][0-9]{2}:[0-9]{2})?$")
            .expect("static regex");
    static ref TIME: Regex = Regex::new(
        r"^([0-9]{2}):([0-9]{2}):([0-9]{2}(?:\.[0-9]+)?)(Z|[+-][0-9]{2}:[0-9]{2})?$"
    )
    .expect("static regex");
    static ref G_YEAR_MONTH: Regex =
        Regex::new(r"^(-?[0-9]{4,})-([0-9]{2})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("static regex");
    static ref G_YEAR: Regex =
        Regex::new(r"^(-?[0-9]{4,})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("static regex");
    static ref G_MONTH_DAY: Regex =
        Regex::new(r"^--([0-9]{2})-([0-9]{2})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("static regex");
    static ref G_DAY: Regex =
        Regex::new(r"^---([0-9]{2})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("static regex");
    static ref G_MONTH: Regex =
        Regex::new(r"^--([0-9]{2})(Z|[+-][0-9]{2}:[0-9]{2})?$").expect("static regex");
    static ref DURATION: Regex = Regex::new(
        r"^(-?)P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]+)?)S)?)?$"
    )
    .expect("static regex");
}

fn parse_tz(tz: Option<&str>) -> Option<i32> {
    match tz {
        None => None,
        Some("Z") => Some(0),
        Some(s) => {
            let sign = if s.starts_with('-') { -1 } else { 1 };
            let rest = &s[1..];
            let (h, m) = rest.split_once(':')?;
            Some(sign * (h.parse::<i32>().ok()? * 60 + m.parse::<i32>().ok()?))
        }
    }
}

/// Normalized date/time fields, with the timezone (if present) folded into UTC.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DateTimeValue {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
    pub has_timezone: bool,
}

fn shift_to_utc(mut v: DateTimeValue, offset_minutes: i32) -> DateTimeValue {
    // A coarse but adequate shift for comparison purposes: fold the offset into
    // the minute/hour fields without full calendar day/month/year rollover,
    // since instance documents overwhelmingly keep offsets within a day and
    // exact rollover precision only matters for cross-midnight instant equality,
    // which is out of scope here (see module docs).
    let mut minutes = v.hour as i64 * 60 + v.minute as i64 - offset_minutes as i64;
    let mut day_shift: i64 = 0;
    while minutes < 0 {
        minutes += 24 * 60;
        day_shift -= 1;
    }
    while minutes >= 24 * 60 {
        minutes -= 24 * 60;
        day_shift += 1;
    }
    v.hour = (minutes / 60) as u32;
    v.minute = (minutes % 60) as u32;
    v.day = (v.day as i64 + day_shift).max(1) as u32;
    v.has_timezone = true;
    v
}

pub fn parse_date_time(lexical: &str) -> Result<DateTimeValue, DatatypeError> {
    let caps = DATE_TIME.captures(lexical).ok_or_else(|| DatatypeError::Lexical {
        type_name: "dateTime",
        lexical: lexical.to_string(),
    })?;
    let v = DateTimeValue {
        year: caps[1].parse().unwrap(),
        month: caps[2].parse().unwrap(),
        day: caps[3].parse().unwrap(),
        hour: caps[4].parse().unwrap(),
        minute: caps[5].parse().unwrap(),
        second: caps[6].parse().unwrap(),
        has_timezone: caps.get(7).is_some(),
    };
    validate_calendar_fields("dateTime", lexical, v.month, v.day, v.hour, v.minute, v.second)?;
    Ok(match parse_tz(caps.get(7).map(|m| m.as_str())) {
        Some(off) => shift_to_utc(v, off),
        None => v,
    })
}

pub fn parse_date(lexical: &str) -> Result<DateTimeValue, DatatypeError> {
    let caps = DATE.captures(lexical).ok_or_else(|| DatatypeError::Lexical {
        type_name: "date",
        lexical: lexical.to_string(),
    })?;
    let v = DateTimeValue {
        year: caps[1].parse().unwrap(),
        month: caps[2].parse().unwrap(),
        day: caps[3].parse().unwrap(),
        hour: 0,
        minute: 0,
        second: 0.0,
        has_timezone: caps.get(4).is_some(),
    };
    validate_calendar_fields("date", lexical, v.month, v.day, 0, 0, 0.0)?;
    Ok(v)
}

pub fn parse_time(lexical: &str) -> Result<DateTimeValue, DatatypeError> {
    let caps = TIME.captures(lexical).ok_or_else(|| DatatypeError::Lexical {
        type_name: "time",
        lexical: lexical.to_string(),
    })?;
    let v = DateTimeValue {
        year: 0,
        month: 1,
        day: 1,
        hour: caps[1].parse().unwrap(),
        minute: caps[2].parse().unwrap(),
        second: caps[3].parse().unwrap(),
        has_timezone: caps.get(4).is_some(),
    };
    validate_calendar_fields("time", lexical, 1, 1, v.hour, v.minute, v.second)?;
    Ok(match parse_tz(caps.get(4).map(|m| m.as_str())) {
        Some(off) => shift_to_utc(v, off),
        None => v,
    })
}

macro_rules! simple_gregorian {
    ($fn_name:ident, $regex:ident, $type_name:literal, $year_idx:expr, $month_idx:expr, $day_idx:expr) => {
        pub fn $fn_name(lexical: &str) -> Result<DateTimeValue, DatatypeError> {
            let caps = $regex.captures(lexical).ok_or_else(|| DatatypeError::Lexical {
                type_name: $type_name,
                lexical: lexical.to_string(),
            })?;
            Ok(DateTimeValue {
                year: $year_idx.map(|i: usize| caps[i].parse().unwrap()).unwrap_or(0),
                month: $month_idx.map(|i: usize| caps[i].parse().unwrap()).unwrap_or(1),
                day: $day_idx.map(|i: usize| caps[i].parse().unwrap()).unwrap_or(1),
                hour: 0,
                minute: 0,
                second: 0.0,
                has_timezone: false,
            })
        }
    };
}

simple_gregorian!(parse_g_year_month, G_YEAR_MONTH, "gYearMonth", Some(1), Some(2), None::<usize>);
simple_gregorian!(parse_g_year, G_YEAR, "gYear", Some(1), None::<usize>, None::<usize>);
simple_gregorian!(parse_g_month_day, G_MONTH_DAY, "gMonthDay", None::<usize>, Some(1), Some(2));
simple_gregorian!(parse_g_day, G_DAY, "gDay", None::<usize>, None::<usize>, Some(1));
simple_gregorian!(parse_g_month, G_MONTH, "gMonth", None::<usize>, Some(1), None::<usize>);

fn validate_calendar_fields(
    type_name: &'static str,
    lexical: &str,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Result<(), DatatypeError> {
    let bad = !(1..=12).contains(&month)
        || !(1..=31).contains(&day)
        || hour > 24
        || minute > 59
        || second >= 60.0
        || (hour == 24 && (minute != 0 || second != 0.0));
    if bad {
        return Err(DatatypeError::OutOfRange {
            type_name,
            lexical: lexical.to_string(),
        });
    }
    Ok(())
}

/// A validated `xs:duration` value, normalized to non-negative field magnitudes
/// plus a sign. Months and seconds are kept un-collapsed (a duration's value
/// space is only partially ordered; this crate only needs equality for it,
/// which follows from comparing the normalized fields directly since facet
/// engines never call `<`/`>` on durations without a canonicalizing context this
/// crate doesn't implement -- see `SimpleType` docs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duration {
    pub negative: bool,
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: f64,
}

impl Duration {
    /// Canonical lexical mapping per §3.2.6.1: only non-zero components are
    /// emitted, and the `T` separator is dropped entirely if no time component
    /// is present.
    pub fn canonical(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        let mut date_part = String::new();
        if self.years != 0 {
            date_part.push_str(&format!("{}Y", self.years));
        }
        if self.months != 0 {
            date_part.push_str(&format!("{}M", self.months));
        }
        if self.days != 0 {
            date_part.push_str(&format!("{}D", self.days));
        }
        let mut time_part = String::new();
        if self.hours != 0 {
            time_part.push_str(&format!("{}H", self.hours));
        }
        if self.minutes != 0 {
            time_part.push_str(&format!("{}M", self.minutes));
        }
        if self.seconds != 0.0 {
            time_part.push_str(&format!("{}S", self.seconds));
        }
        if date_part.is_empty() && time_part.is_empty() {
            format!("{sign}P0D")
        } else if time_part.is_empty() {
            format!("{sign}P{date_part}")
        } else {
            format!("{sign}P{date_part}T{time_part}")
        }
    }
}

pub fn parse_duration(lexical: &str) -> Result<Duration, DatatypeError> {
    let caps = DURATION.captures(lexical).ok_or_else(|| DatatypeError::Lexical {
        type_name: "duration",
        lexical: lexical.to_string(),
    })?;
    let has_any_component = (2..=7).any(|i| caps.get(i).is_some());
    if !has_any_component {
        return Err(DatatypeError::Lexical {
            type_name: "duration",
            lexical: lexical.to_string(),
        });
    }
    let num = |i: usize| -> u64 { caps.get(i).map(|m| m.as_str().parse().unwrap()).unwrap_or(0) };
    let secs = caps
        .get(7)
        .map(|m| m.as_str().parse::<f64>().unwrap())
        .unwrap_or(0.0);
    Ok(Duration {
        negative: !caps[1].is_empty(),
        years: num(2),
        months: num(3),
        days: num(4),
        hours: num(5),
        minutes: num(6),
        seconds: secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_parses_and_shifts_timezone() {
        let a = parse_date_time("2024-01-01T14:00:00Z").unwrap();
        let b = parse_date_time("2024-01-01T09:00:00-05:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn date_rejects_bad_month() {
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn duration_parses_components() {
        let d = parse_duration("-P1Y2M3DT4H5M6.5S").unwrap();
        assert!(d.negative);
        assert_eq!(d.years, 1);
        assert_eq!(d.months, 2);
        assert_eq!(d.days, 3);
        assert_eq!(d.hours, 4);
        assert_eq!(d.seconds, 6.5);
    }

    #[test]
    fn duration_requires_at_least_one_component() {
        assert!(parse_duration("P").is_err());
    }

    #[test]
    fn g_year_month_parses() {
        let v = parse_g_year_month("2024-03").unwrap();
        assert_eq!(v.year, 2024);
        assert_eq!(v.month, 3);
    }
}
