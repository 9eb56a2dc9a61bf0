use anyhow::{bail, Result};
use dashboard_service::{config::AppConfig, observability, sources};
use energy_core::domain::{half_hour_labels, HALF_HOUR_SLOTS};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{env, fs::File};

/// Import a usage CSV export into the `hh_data` table. The table is created
/// on first use; rows are appended, with duplicate-day merging left to the
/// series builder on the read side.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: backfill_usage <csv_file_path>");
    }
    let file_path = &args[1];

    // Load configuration (can point DASHBOARD_CONFIG to a backfill-specific file).
    let cfg = AppConfig::load()?;

    let options = SqliteConnectOptions::new()
        .filename(&cfg.database.path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let file = File::open(file_path)?;
    let rows = sources::read_csv_rows(file)?;

    let labels = half_hour_labels();
    create_table(&pool, &labels).await?;

    let insert_sql = insert_statement(&labels);
    let mut tx = pool.begin().await?;
    let mut inserted = 0_u64;

    for row in &rows {
        let mut query = sqlx::query(&insert_sql)
            .bind(row.date.to_string())
            .bind(&row.meter_point)
            .bind(row.total_kwh);
        for slot in 0..HALF_HOUR_SLOTS {
            query = query.bind(row.half_hours.as_ref().map(|hh| hh[slot]));
        }
        query.execute(&mut *tx).await?;
        inserted += 1;
    }

    tx.commit().await?;

    tracing::info!(
        file = %file_path,
        inserted_rows = inserted,
        "usage backfill complete"
    );

    Ok(())
}

async fn create_table(pool: &sqlx::SqlitePool, labels: &[String]) -> Result<()> {
    let slot_columns: String = labels
        .iter()
        .map(|label| format!(r#", "{label}" REAL"#))
        .collect();
    let ddl = format!(
        r#"CREATE TABLE IF NOT EXISTS hh_data ("Date" TEXT NOT NULL, "Meter Point" TEXT NOT NULL, "Total Usage" REAL{slot_columns})"#
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

fn insert_statement(labels: &[String]) -> String {
    let slot_columns: String = labels
        .iter()
        .map(|label| format!(r#", "{label}""#))
        .collect();
    let placeholders = vec!["?"; 3 + labels.len()].join(", ");
    format!(r#"INSERT INTO hh_data ("Date", "Meter Point", "Total Usage"{slot_columns}) VALUES ({placeholders})"#)
}
