use std::collections::BTreeMap;

use time::Date;

use crate::domain::{DateRange, HotelSeries, MatchQuality, UsageRecord};

/// How days in the current period are paired with days in the comparison
/// period. Different dashboards prioritise different fairness criteria, so
/// the policy is a first-class, selectable parameter rather than a hidden
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MatchPolicy {
    /// Two days match iff they share month and day-of-month. The strictest
    /// policy: December 25 is only ever compared to December 25.
    #[default]
    ExactMonthDay,
    /// Two days match iff they share month, week-of-month bucket and
    /// weekday, so "the second Tuesday of April" is compared across years
    /// even when the calendar date differs.
    WeekdayWeekOfMonth,
    /// Each current day is paired with the same calendar day one year
    /// earlier; no filtering beyond data being present on both sides.
    CalendarOffset,
}

impl std::str::FromStr for MatchPolicy {
    type Err = crate::EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exact-month-day" => Ok(Self::ExactMonthDay),
            "weekday-week-of-month" => Ok(Self::WeekdayWeekOfMonth),
            "calendar-offset" => Ok(Self::CalendarOffset),
            other => Err(crate::EngineError::Configuration(format!(
                "unknown match policy '{other}'"
            ))),
        }
    }
}

/// The outcome of pairing two date ranges over one hotel's series.
///
/// `current_rows` and `comparison_rows` always have equal length: row `i` of
/// one is the comparison partner of row `i` of the other, and only usable
/// pairs (data present on both sides) are kept.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchedPairSet {
    pub current_rows: Vec<UsageRecord>,
    pub comparison_rows: Vec<UsageRecord>,
    pub matched_day_count: usize,
    pub expected_day_count: usize,
}

impl MatchedPairSet {
    pub fn quality(&self) -> MatchQuality {
        MatchQuality::new(self.matched_day_count, self.expected_day_count)
    }
}

/// Pair days between `current` and `comparison` under `policy`.
pub fn match_days(
    series: &HotelSeries,
    current: &DateRange,
    comparison: &DateRange,
    policy: MatchPolicy,
) -> MatchedPairSet {
    let expected_day_count = current.day_count().max(0) as usize;

    let (current_rows, comparison_rows) = match policy {
        MatchPolicy::ExactMonthDay => keyed_match(series, current, comparison, month_day_key),
        MatchPolicy::WeekdayWeekOfMonth => {
            keyed_match(series, current, comparison, weekday_week_key)
        }
        MatchPolicy::CalendarOffset => offset_match(series, current),
    };

    let matched_day_count = current_rows.len();
    MatchedPairSet {
        current_rows,
        comparison_rows,
        matched_day_count,
        expected_day_count,
    }
}

fn month_day_key(date: Date) -> (u8, u8, u8) {
    (date.month() as u8, date.day(), 0)
}

fn weekday_week_key(date: Date) -> (u8, u8, u8) {
    (
        date.month() as u8,
        week_of_month(date),
        date.weekday().number_days_from_monday(),
    )
}

/// Week-of-month bucket: days 1-7 are week 1, 8-14 week 2, and so on.
pub fn week_of_month(date: Date) -> u8 {
    (date.day() - 1) / 7 + 1
}

/// Key-based pairing: compute a key per day on each side, intersect the key
/// sets, keep one row per shared key per side, ordered by date. Ranges
/// longer than a year would alias keys; the first occurrence wins.
fn keyed_match(
    series: &HotelSeries,
    current: &DateRange,
    comparison: &DateRange,
    key_fn: fn(Date) -> (u8, u8, u8),
) -> (Vec<UsageRecord>, Vec<UsageRecord>) {
    let mut current_by_key: BTreeMap<(u8, u8, u8), &UsageRecord> = BTreeMap::new();
    for record in series.range_slice(current) {
        current_by_key.entry(key_fn(record.date)).or_insert(record);
    }

    let mut comparison_by_key: BTreeMap<(u8, u8, u8), &UsageRecord> = BTreeMap::new();
    for record in series.range_slice(comparison) {
        comparison_by_key.entry(key_fn(record.date)).or_insert(record);
    }

    let mut pairs: Vec<(&UsageRecord, &UsageRecord)> = current_by_key
        .iter()
        .filter_map(|(key, cur)| comparison_by_key.get(key).map(|cmp| (*cur, *cmp)))
        .collect();
    pairs.sort_by_key(|(cur, _)| cur.date);

    pairs
        .into_iter()
        .map(|(cur, cmp)| (cur.clone(), cmp.clone()))
        .unzip()
}

/// Offset pairing: each current-range day against the same calendar day one
/// year earlier, kept only when both sides carry data.
fn offset_match(series: &HotelSeries, current: &DateRange) -> (Vec<UsageRecord>, Vec<UsageRecord>) {
    series
        .range_slice(current)
        .iter()
        .filter_map(|cur| {
            let prior = previous_year_same_day(cur.date)?;
            series.get(prior).map(|cmp| (cur.clone(), cmp.clone()))
        })
        .unzip()
}

/// The same month and day one year earlier. Feb 29 has no counterpart in a
/// non-leap prior year and yields `None`.
fn previous_year_same_day(date: Date) -> Option<Date> {
    Date::from_calendar_date(date.year() - 1, date.month(), date.day()).ok()
}
