use std::str::FromStr;

use time::{Date, Duration, Month};

use crate::domain::DateRange;
use crate::EngineError;

/// The promotional window the competition runs over, e.g. the week around
/// Earth Day. Supplied by configuration, never hardcoded.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChallengeWindow {
    pub start: Date,
    pub end: Date,
}

/// A named period selection as offered by the dashboard's period picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelection {
    LastNDays(u16),
    YearToDate,
    ThisMonth,
    PreviousMonth,
    NamedMonth { year: i32, month: Month },
    ChallengeWindow,
}

/// A resolved period. `projected` is set when the challenge window lies in
/// the future and last year's window was substituted, so the caller can
/// present the figures as forecast-like rather than actuals.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPeriod {
    pub range: DateRange,
    pub projected: bool,
}

impl FromStr for PeriodSelection {
    type Err = EngineError;

    /// Parses the kebab-case period vocabulary: `last-7-days`,
    /// `year-to-date`, `this-month`, `previous-month`, `earth-day-challenge`
    /// and named months such as `april-2025`. Unknown names are rejected,
    /// never silently defaulted.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "year-to-date" => return Ok(Self::YearToDate),
            "this-month" => return Ok(Self::ThisMonth),
            "previous-month" => return Ok(Self::PreviousMonth),
            "earth-day-challenge" => return Ok(Self::ChallengeWindow),
            _ => {}
        }

        if let Some(rest) = name.strip_prefix("last-") {
            if let Some(n) = rest.strip_suffix("-days") {
                let n: u16 = n
                    .parse()
                    .map_err(|_| EngineError::Configuration(format!("unknown period '{name}'")))?;
                return Ok(Self::LastNDays(n));
            }
        }

        if let Some((month_name, year)) = name.split_once('-') {
            if let (Some(month), Ok(year)) = (parse_month(month_name), year.parse::<i32>()) {
                return Ok(Self::NamedMonth { year, month });
            }
        }

        Err(EngineError::Configuration(format!(
            "unknown period '{name}'"
        )))
    }
}

fn parse_month(name: &str) -> Option<Month> {
    let month = match name {
        "january" => Month::January,
        "february" => Month::February,
        "march" => Month::March,
        "april" => Month::April,
        "may" => Month::May,
        "june" => Month::June,
        "july" => Month::July,
        "august" => Month::August,
        "september" => Month::September,
        "october" => Month::October,
        "november" => Month::November,
        "december" => Month::December,
        _ => return None,
    };
    Some(month)
}

/// Resolve a period selection against `today` into a concrete date range.
pub fn resolve(
    selection: &PeriodSelection,
    today: Date,
    challenge: &ChallengeWindow,
) -> Result<ResolvedPeriod, EngineError> {
    let (range, projected) = match selection {
        PeriodSelection::LastNDays(n) => (
            DateRange::new(today - Duration::days(i64::from(*n)), today)?,
            false,
        ),
        PeriodSelection::YearToDate => {
            let jan_first = Date::from_calendar_date(today.year(), Month::January, 1)
                .expect("January 1st exists in every year");
            (DateRange::new(jan_first, today)?, false)
        }
        PeriodSelection::ThisMonth => {
            let first = first_of_month(today);
            (DateRange::new(first, today)?, false)
        }
        PeriodSelection::PreviousMonth => {
            // Step back from the first of the current month to land in the
            // previous month, then take that month's calendar bounds.
            let prev_end = first_of_month(today)
                .previous_day()
                .ok_or_else(|| EngineError::Configuration("no month precedes the calendar minimum".to_string()))?;
            (DateRange::new(first_of_month(prev_end), prev_end)?, false)
        }
        PeriodSelection::NamedMonth { year, month } => (month_bounds(*year, *month)?, false),
        PeriodSelection::ChallengeWindow => {
            if today < challenge.start {
                let range = DateRange::new(
                    shift_back_one_year(challenge.start),
                    shift_back_one_year(challenge.end),
                )?;
                (range, true)
            } else {
                (DateRange::new(challenge.start, challenge.end)?, false)
            }
        }
    };

    Ok(ResolvedPeriod { range, projected })
}

/// The comparison range for a resolved current range: the end shifts back
/// exactly one calendar year (Feb 29 clamps to Feb 28) and the start is
/// chosen to preserve the current range's day count. Shared by every
/// dashboard; there is deliberately exactly one copy of this.
pub fn comparison_period(range: &DateRange) -> DateRange {
    let end = shift_back_one_year(range.end);
    let start = end - Duration::days(range.day_count() - 1);
    DateRange { start, end }
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1).expect("day 1 exists in every month")
}

fn month_bounds(year: i32, month: Month) -> Result<DateRange, EngineError> {
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|e| EngineError::Configuration(format!("invalid month {month} {year}: {e}")))?;
    let last = Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
        .expect("month length is a valid day");
    DateRange::new(first, last)
}

/// Shift a date back one calendar year, clamping Feb 29 to Feb 28.
pub(crate) fn shift_back_one_year(date: Date) -> Date {
    date.replace_year(date.year() - 1).unwrap_or_else(|_| {
        Date::from_calendar_date(date.year() - 1, Month::February, 28)
            .expect("Feb 28 exists in every year")
    })
}
