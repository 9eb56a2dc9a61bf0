use anyhow::Result;
use dashboard_service::{config::AppConfig, observability};
use energy_core::domain::HotelSeries;
use energy_core::engine::{self, PeriodSelection};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use time::OffsetDateTime;

/// One-shot standings report across every configured hotel, for ops and for
/// the printed leaderboard. Takes an optional period argument, e.g.
/// `race_report earth-day-challenge`.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    let selection: PeriodSelection = env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("year-to-date")
        .parse()?;
    let today = OffsetDateTime::now_utc().date();

    let options = SqliteConnectOptions::new()
        .filename(&cfg.database.path)
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect_with(options)
        .await?;

    let mut series_list = Vec::with_capacity(cfg.hotels.len());
    for hotel in &cfg.hotels {
        let records = energy_core::db::usage_history(&pool, &hotel.meter_point, &hotel.name).await?;
        series_list.push(HotelSeries::from_records(&hotel.name, records));
    }

    let entries: Vec<_> = series_list
        .iter()
        .zip(&cfg.hotels)
        .map(|(series, hotel)| (series, cfg.calculator_for(hotel)))
        .collect();

    let standings = engine::rank_hotels(
        &entries,
        &selection,
        today,
        cfg.engine.match_policy,
        &cfg.challenge_window(),
    )?;

    for (position, standing) in standings.iter().enumerate() {
        tracing::info!(
            position = position + 1,
            hotel = %standing.hotel,
            energy_reduction_pct = standing.energy_reduction,
            progress_pct = standing.progress_percentage,
            kwh_saved = standing.kwh_saved,
            matched_days = standing.quality.matched_day_count,
            insufficient_data = standing.insufficient_data,
            "race standing"
        );
    }

    Ok(())
}
