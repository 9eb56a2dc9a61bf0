use anyhow::{anyhow, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::domain::{half_hour_labels, UsageRecord, HALF_HOUR_SLOTS};

const DATE_FORMAT: &'static [FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Coverage summary for one meter point.
#[derive(Debug, Clone)]
pub struct DateCoverage {
    pub first_date: Option<Date>,
    pub last_date: Option<Date>,
    pub row_count: i64,
}

/// Fetch the full, date-ordered usage history for one meter point.
///
/// The `hh_data` table stores one row per day with a `"Total Usage"` column
/// and, when the import carried them, 48 half-hour columns named `"00:00"`
/// through `"23:30"`. The half-hour columns are optional: a schema without
/// them (or a row with gaps) degrades to a daily-only record rather than
/// failing the load.
pub async fn usage_history(
    pool: &SqlitePool,
    meter_point: &str,
    hotel: &str,
) -> Result<Vec<UsageRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT *
        FROM hh_data
        WHERE "Meter Point" = ?
        ORDER BY Date
        "#,
    )
    .bind(meter_point)
    .fetch_all(pool)
    .await?;

    let labels = half_hour_labels();
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let date_text: String = row.try_get("Date")?;
        let date = parse_date(&date_text)?;

        // NULL usage is recorded as zero, the same treatment the import
        // applies to unparseable cells.
        let total_kwh: f64 = row.try_get::<Option<f64>, _>("Total Usage")?.unwrap_or(0.0);

        let half_hours = read_half_hours(&row, &labels);

        records.push(UsageRecord {
            date,
            hotel: hotel.to_string(),
            total_kwh,
            half_hours,
        });
    }

    Ok(records)
}

/// First date, last date and row count for one meter point.
pub async fn date_coverage(pool: &SqlitePool, meter_point: &str) -> Result<DateCoverage> {
    let row = sqlx::query(
        r#"
        SELECT MIN(Date) AS first_date, MAX(Date) AS last_date, COUNT(*) AS row_count
        FROM hh_data
        WHERE "Meter Point" = ?
        "#,
    )
    .bind(meter_point)
    .fetch_one(pool)
    .await?;

    let first: Option<String> = row.try_get("first_date")?;
    let last: Option<String> = row.try_get("last_date")?;

    Ok(DateCoverage {
        first_date: first.as_deref().map(parse_date).transpose()?,
        last_date: last.as_deref().map(parse_date).transpose()?,
        row_count: row.try_get("row_count")?,
    })
}

fn parse_date(text: &str) -> Result<Date> {
    // Dates may carry a time suffix ("2025-04-01 00:00:00"); the calendar
    // day is the first ten characters.
    let day = text.get(..10).unwrap_or(text);
    Date::parse(day, DATE_FORMAT).map_err(|e| anyhow!("invalid date '{text}': {e}"))
}

fn read_half_hours(row: &sqlx::sqlite::SqliteRow, labels: &[String]) -> Option<Vec<f64>> {
    let mut slots = Vec::with_capacity(HALF_HOUR_SLOTS);
    for label in labels {
        match row.try_get::<Option<f64>, _>(label.as_str()) {
            Ok(value) => slots.push(value.unwrap_or(0.0)),
            // Column absent from this schema: daily-only data.
            Err(_) => return None,
        }
    }
    Some(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn seeded_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(r#"CREATE TABLE hh_data ("Date" TEXT, "Meter Point" TEXT, "Total Usage" REAL)"#)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn daily_only_schema_loads_without_half_hours() {
        let pool = seeded_pool().await;
        sqlx::query(r#"INSERT INTO hh_data VALUES ('2025-04-01 00:00:00', '2500021277783', 120.5)"#)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(r#"INSERT INTO hh_data VALUES ('2025-04-02', '2500021277783', NULL)"#)
            .execute(&pool)
            .await
            .unwrap();

        let records = usage_history(&pool, "2500021277783", "Westin").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, time::macros::date!(2025 - 04 - 01));
        assert_eq!(records[0].total_kwh, 120.5);
        assert!(records[0].half_hours.is_none());
        // NULL usage reads as zero.
        assert_eq!(records[1].total_kwh, 0.0);
        assert_eq!(records[0].hotel, "Westin");
    }

    #[tokio::test]
    async fn coverage_reports_bounds_and_count() {
        let pool = seeded_pool().await;
        for day in ["2025-04-01", "2025-04-03", "2025-04-02"] {
            sqlx::query(r#"INSERT INTO hh_data VALUES (?, 'm-1', 1.0)"#)
                .bind(day)
                .execute(&pool)
                .await
                .unwrap();
        }

        let coverage = date_coverage(&pool, "m-1").await.unwrap();
        assert_eq!(coverage.row_count, 3);
        assert_eq!(coverage.first_date, Some(time::macros::date!(2025 - 04 - 01)));
        assert_eq!(coverage.last_date, Some(time::macros::date!(2025 - 04 - 03)));
    }
}
