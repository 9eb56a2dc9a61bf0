use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use time::{Date, OffsetDateTime};

use energy_core::domain::{MetricsResult, QualityBand, UsageRecord};
use energy_core::engine::profile::{self, SlotAverage, WeekdayAverage};
use energy_core::engine::{self, HotelStanding, MatchPolicy, PeriodSelection};
use energy_core::EngineError;

use crate::cache::SeriesCache;
use crate::config::AppConfig;
use crate::directory::HotelDirectory;
use crate::error::ServiceError;
use crate::sources::{SqliteUsageSource, UsageSource};

pub struct AppState {
    pub config: AppConfig,
    pub directory: HotelDirectory,
    pub cache: SeriesCache,
    pub pool: SqlitePool,
}

type SharedState = Arc<AppState>;

pub async fn serve(config: AppConfig, pool: SqlitePool) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;

    let state = Arc::new(AppState {
        directory: HotelDirectory::new(&config.hotels),
        cache: SeriesCache::new(),
        config,
        pool,
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard API listening");
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/hotels", get(get_hotels))
        .route("/dashboard/:hotel", get(get_dashboard))
        .route("/leaderboard", get(get_leaderboard))
        .route("/cache/invalidate/:hotel", post(invalidate_hotel_cache))
        .route("/cache/clear", post(clear_cache))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PipelineParams {
    period: Option<String>,
    policy: Option<String>,
}

#[derive(Debug, Serialize)]
struct HotelInfo {
    name: String,
    meter_point: String,
}

#[derive(Debug, Serialize)]
struct PeriodInfo {
    start: Date,
    end: Date,
    projected: bool,
}

#[derive(Debug, Serialize)]
struct RangeInfo {
    start: Date,
    end: Date,
}

#[derive(Debug, Serialize)]
struct MatchQualityInfo {
    percentage: f64,
    matched_day_count: usize,
    expected_day_count: usize,
    level: QualityBand,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    hotel: String,
    period: PeriodInfo,
    comparison: RangeInfo,
    metrics: MetricsResult,
    match_quality: MatchQualityInfo,
    current_rows: Vec<UsageRecord>,
    comparison_rows: Vec<UsageRecord>,
    half_hour_profile: Option<Vec<SlotAverage>>,
    weekday_profile: Vec<WeekdayAverage>,
    simulated: bool,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    period: PeriodInfo,
    comparison: RangeInfo,
    standings: Vec<HotelStanding>,
    /// Hotels whose series came from the fallback generator.
    simulated_hotels: Vec<String>,
}

async fn get_hotels(State(state): State<SharedState>) -> Json<Vec<HotelInfo>> {
    let hotels = state
        .directory
        .hotels()
        .iter()
        .map(|h| HotelInfo {
            name: h.name.clone(),
            meter_point: h.meter_point.clone(),
        })
        .collect();
    Json(hotels)
}

async fn get_dashboard(
    State(state): State<SharedState>,
    Path(hotel): Path<String>,
    Query(params): Query<PipelineParams>,
) -> Result<Json<DashboardResponse>, ApiError> {
    metrics::counter!("dashboard_requests_total").increment(1);

    let hotel = state
        .directory
        .hotel_named(&hotel)
        .ok_or_else(|| ApiError::NotFound(format!("unknown hotel '{hotel}'")))?;

    let (selection, policy) = parse_pipeline_params(&state, &params)?;
    let today = today();

    let source = SqliteUsageSource::new(state.pool.clone(), &hotel.meter_point, &hotel.name);
    let cached = state.cache.get_or_load(&source, &hotel.name, today).await?;

    let figures = engine::evaluate(
        &cached.series,
        &selection,
        today,
        policy,
        &state.config.challenge_window(),
        &state.config.calculator_for(hotel),
    )?;

    let half_hour_profile = profile::half_hour_profile(&cached.series, &figures.period);
    let weekday_profile = profile::weekday_profile(&cached.series, &figures.period);

    let quality = figures.quality;
    Ok(Json(DashboardResponse {
        hotel: hotel.name.clone(),
        period: PeriodInfo {
            start: figures.period.start,
            end: figures.period.end,
            projected: figures.projected,
        },
        comparison: RangeInfo {
            start: figures.comparison.start,
            end: figures.comparison.end,
        },
        metrics: figures.metrics,
        match_quality: MatchQualityInfo {
            percentage: quality.percentage,
            matched_day_count: quality.matched_day_count,
            expected_day_count: quality.expected_day_count,
            level: quality.band(),
        },
        current_rows: figures.pairs.current_rows,
        comparison_rows: figures.pairs.comparison_rows,
        half_hour_profile,
        weekday_profile,
        simulated: cached.simulated,
    }))
}

async fn get_leaderboard(
    State(state): State<SharedState>,
    Query(params): Query<PipelineParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    metrics::counter!("leaderboard_requests_total").increment(1);

    let (selection, policy) = parse_pipeline_params(&state, &params)?;
    let today = today();
    let challenge = state.config.challenge_window();

    let mut loaded = Vec::with_capacity(state.directory.hotels().len());
    let mut simulated_hotels = Vec::new();
    for hotel in state.directory.hotels() {
        let source = SqliteUsageSource::new(state.pool.clone(), &hotel.meter_point, &hotel.name);
        let cached = state.cache.get_or_load(&source, &hotel.name, today).await?;
        if cached.simulated {
            simulated_hotels.push(hotel.name.clone());
        }
        loaded.push((cached, state.config.calculator_for(hotel)));
    }

    let entries: Vec<_> = loaded
        .iter()
        .map(|(cached, cfg)| (&cached.series, *cfg))
        .collect();
    let standings = engine::rank_hotels(&entries, &selection, today, policy, &challenge)?;

    let resolved = engine::resolve(&selection, today, &challenge)?;
    let comparison = engine::comparison_period(&resolved.range);

    Ok(Json(LeaderboardResponse {
        period: PeriodInfo {
            start: resolved.range.start,
            end: resolved.range.end,
            projected: resolved.projected,
        },
        comparison: RangeInfo {
            start: comparison.start,
            end: comparison.end,
        },
        standings,
        simulated_hotels,
    }))
}

async fn invalidate_hotel_cache(
    State(state): State<SharedState>,
    Path(hotel): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hotel = state
        .directory
        .hotel_named(&hotel)
        .ok_or_else(|| ApiError::NotFound(format!("unknown hotel '{hotel}'")))?;

    let source = SqliteUsageSource::new(state.pool.clone(), &hotel.meter_point, &hotel.name);
    let invalidated = state.cache.invalidate(&source.identity());
    Ok(Json(serde_json::json!({ "invalidated": invalidated })))
}

async fn clear_cache(State(state): State<SharedState>) -> StatusCode {
    state.cache.clear();
    StatusCode::NO_CONTENT
}

fn parse_pipeline_params(
    state: &AppState,
    params: &PipelineParams,
) -> Result<(PeriodSelection, MatchPolicy), ApiError> {
    let selection: PeriodSelection = params
        .period
        .as_deref()
        .unwrap_or("year-to-date")
        .parse()
        .map_err(ApiError::from)?;
    let policy = match params.policy.as_deref() {
        Some(name) => name.parse().map_err(ApiError::from)?,
        None => state.config.engine.match_policy,
    };
    Ok((selection, policy))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        // Both variants reject the request as malformed input.
        Self::BadRequest(e.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Configuration(msg) => Self::BadRequest(msg),
            ServiceError::Engine(inner) => inner.into(),
            ServiceError::Source(_) | ServiceError::Database(_) => {
                tracing::error!(error = %e, "request failed");
                Self::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
