use std::env;
use std::time::Duration;

/// Reaper (maintenance sweep) configuration
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub ws_port: Option<u16>,
    pub environment: String,
    pub reaper: ReaperConfig,
    /// Hours a group survives after its venue booking
    pub booking_ttl_hours: i64,
}

impl ReaperConfig {
    /// Create reaper config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let enabled = env::var("REAPER_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        let interval_secs = env::var("REAPER_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        if interval_secs == 0 {
            return Err("REAPER_INTERVAL_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            enabled,
            interval_secs,
        })
    }

    /// Get sweep interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let reaper = ReaperConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let ws_port = env::var("WS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let booking_ttl_hours = env::var("BOOKING_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(6);

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        if booking_ttl_hours <= 0 {
            return Err("BOOKING_TTL_HOURS must be greater than 0".to_string());
        }

        Ok(Self {
            log_level: log_level.to_lowercase(),
            ws_port,
            environment: environment.to_lowercase(),
            reaper,
            booking_ttl_hours,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Booking lifetime as a chrono duration
    pub fn booking_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.booking_ttl_hours)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ws_port: None,
            environment: "development".to_string(),
            reaper: ReaperConfig::default(),
            booking_ttl_hours: 6,
        }
    }
}
