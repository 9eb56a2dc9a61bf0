use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use energy_core::domain::{half_hour_labels, UsageRecord};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::ServiceError;
use crate::sources::UsageSource;

const DATE_FORMAT: &'static [FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One raw CSV row, before the meter point is mapped to a hotel. The
/// backfill bin consumes these directly; `CsvUsageSource` filters and maps
/// them into `UsageRecord`s for one hotel.
#[derive(Debug, Clone)]
pub struct CsvUsageRow {
    pub date: Date,
    pub meter_point: String,
    pub total_kwh: f64,
    pub half_hours: Option<Vec<f64>>,
}

/// CSV file source for one hotel's usage.
///
/// Expected header columns (by name):
/// - `Date` (calendar day, `YYYY-MM-DD`, a time suffix is tolerated)
/// - `Meter Point`
/// - `Total Usage`
/// - optionally the 48 half-hour columns `"00:00"` through `"23:30"`;
///   a file without them degrades to daily-only records.
pub struct CsvUsageSource {
    path: PathBuf,
    meter_point: String,
    hotel: String,
}

impl CsvUsageSource {
    pub fn new<P: Into<PathBuf>>(path: P, meter_point: &str, hotel: &str) -> Self {
        Self {
            path: path.into(),
            meter_point: meter_point.to_string(),
            hotel: hotel.to_string(),
        }
    }
}

fn parse_date(text: &str) -> Result<Date, ServiceError> {
    let day = text.trim();
    let day = day.get(..10).unwrap_or(day);
    Date::parse(day, DATE_FORMAT)
        .map_err(|e| ServiceError::Source(format!("invalid date '{text}': {e}")))
}

fn record_to_row(
    record: &StringRecord,
    headers: &StringRecord,
    half_hour_cols: Option<&[usize]>,
) -> Result<CsvUsageRow, ServiceError> {
    let get = |name: &str| -> Result<&str, ServiceError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| ServiceError::Source(format!("missing column '{name}' in CSV record")))
    };

    let date = parse_date(get("Date")?)?;
    let meter_point = get("Meter Point")?.trim().to_string();

    let kwh_str = get("Total Usage")?;
    let total_kwh: f64 = match kwh_str.trim() {
        // Unmetered days are imported as zero rather than dropped.
        "" => 0.0,
        value => value
            .parse()
            .map_err(|e| ServiceError::Source(format!("invalid usage '{kwh_str}': {e}")))?,
    };

    let half_hours = match half_hour_cols {
        None => None,
        Some(cols) => {
            let mut slots = Vec::with_capacity(cols.len());
            for &idx in cols {
                let cell = record.get(idx).unwrap_or("").trim();
                let value: f64 = if cell.is_empty() {
                    0.0
                } else {
                    cell.parse().map_err(|e| {
                        ServiceError::Source(format!("invalid half-hour value '{cell}': {e}"))
                    })?
                };
                slots.push(value);
            }
            Some(slots)
        }
    };

    Ok(CsvUsageRow {
        date,
        meter_point,
        total_kwh,
        half_hours,
    })
}

/// Read every row of a usage CSV. Parse failures abort the load; the caller
/// decides whether to fall back to simulated data.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<CsvUsageRow>, ServiceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| ServiceError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();

    // Half-hour columns are all-or-nothing: a partial set means the export
    // was daily-only and the breakdown is not trustworthy.
    let labels = half_hour_labels();
    let positions: Vec<Option<usize>> = labels
        .iter()
        .map(|label| headers.iter().position(|h| h == label))
        .collect();
    let half_hour_cols: Option<Vec<usize>> = positions.into_iter().collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| ServiceError::Source(format!("failed to read CSV record: {e}")))?;

        let row = match record_to_row(&record, &headers, half_hour_cols.as_deref()) {
            Ok(row) => row,
            Err(e) => {
                metrics::counter!("usage_csv_parse_errors_total").increment(1);
                return Err(e);
            }
        };
        rows.push(row);
    }

    Ok(rows)
}

#[async_trait::async_trait]
impl UsageSource for CsvUsageSource {
    fn identity(&self) -> String {
        format!("csv:{}:{}", self.path.display(), self.meter_point)
    }

    async fn fetch(&self) -> Result<Vec<UsageRecord>, ServiceError> {
        // Blocking reader; the files involved are a couple of years of
        // daily rows, so this stays well under any latency that matters.
        let file = File::open(&self.path)
            .map_err(|e| ServiceError::Source(format!("failed to open CSV file: {e}")))?;
        let rows = read_csv_rows(file)?;

        Ok(rows
            .into_iter()
            .filter(|row| row.meter_point == self.meter_point)
            .map(|row| UsageRecord {
                date: row.date,
                hotel: self.hotel.clone(),
                total_kwh: row.total_kwh,
                half_hours: row.half_hours,
            })
            .collect())
    }
}
