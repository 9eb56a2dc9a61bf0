use serde::Deserialize;
use std::fs;
use time::Date;

use energy_core::engine::{CalculatorConfig, ChallengeWindow, MatchPolicy};

use crate::error::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

/// The competition window and goal shared by every hotel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    pub start: Date,
    pub end: Date,
    pub target_savings_percent: f64,
}

/// Reporting constants: grid carbon intensity changes per reporting year, so
/// it lives in configuration rather than in code.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub electricity_factor: f64,
    pub co2_per_tree_kg: f64,
    pub match_policy: MatchPolicy,
}

/// One competing hotel: its display name, its meter point identifier in the
/// half-hourly data, and its average nightly guest count for per-guest
/// normalisation.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelConfig {
    pub name: String,
    pub meter_point: String,
    pub avg_guests_per_night: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub metrics: Option<MetricsConfig>,
    pub challenge: ChallengeConfig,
    pub engine: EngineConfig,
    pub hotels: Vec<HotelConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg = Self::from_toml(&contents)?;
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ServiceError> {
        let cfg: AppConfig = toml::from_str(contents)
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.challenge.start > self.challenge.end {
            return Err(ServiceError::Configuration(format!(
                "challenge start {} is after end {}",
                self.challenge.start, self.challenge.end
            )));
        }
        if self.hotels.is_empty() {
            return Err(ServiceError::Configuration(
                "at least one [[hotels]] entry is required".to_string(),
            ));
        }
        for hotel in &self.hotels {
            if hotel.avg_guests_per_night <= 0.0 {
                return Err(ServiceError::Configuration(format!(
                    "hotel '{}' needs a positive avg_guests_per_night",
                    hotel.name
                )));
            }
        }
        Ok(())
    }

    pub fn challenge_window(&self) -> ChallengeWindow {
        ChallengeWindow {
            start: self.challenge.start,
            end: self.challenge.end,
        }
    }

    /// The calculator inputs for one hotel: shared reporting constants plus
    /// the hotel's own guest count.
    pub fn calculator_for(&self, hotel: &HotelConfig) -> CalculatorConfig {
        CalculatorConfig {
            electricity_factor: self.engine.electricity_factor,
            target_savings_percent: self.challenge.target_savings_percent,
            avg_guests_per_night: hotel.avg_guests_per_night,
            co2_per_tree_kg: self.engine.co2_per_tree_kg,
        }
    }
}
