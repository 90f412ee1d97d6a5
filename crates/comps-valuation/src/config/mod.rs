use crate::quality::QualityConfig;
use crate::valuation::ComparisonConfig;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub quality: QualityConfig,
    pub comparison: ComparisonConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat { value: raw })?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            quality: load_quality()?,
            comparison: load_comparison()?,
        })
    }
}

fn load_quality() -> Result<QualityConfig, ConfigError> {
    let defaults = QualityConfig::default();

    let psf_min = env_number("QUALITY_PSF_MIN", defaults.psf_min)?;
    let psf_max = env_number("QUALITY_PSF_MAX", defaults.psf_max)?;
    if psf_min >= psf_max {
        return Err(ConfigError::InvalidPsfRange {
            min: psf_min,
            max: psf_max,
        });
    }

    let generic_street_names = match env::var("QUALITY_GENERIC_STREETS") {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => defaults.generic_street_names,
    };

    Ok(QualityConfig {
        psf_min,
        psf_max,
        generic_street_names,
        search_radius_miles: env_number(
            "QUALITY_SEARCH_RADIUS_MILES",
            defaults.search_radius_miles,
        )?,
        min_properties_for_identical_estimate: env_number(
            "QUALITY_MIN_PROPERTIES_FOR_IDENTICAL_ESTIMATE",
            defaults.min_properties_for_identical_estimate,
        )?,
    })
}

fn load_comparison() -> Result<ComparisonConfig, ConfigError> {
    let defaults = ComparisonConfig::default();
    Ok(ComparisonConfig {
        sqft_tolerance_pct: env_number(
            "COMPARISON_SQFT_TOLERANCE_PCT",
            defaults.sqft_tolerance_pct,
        )?,
        year_built_tolerance: env_number(
            "COMPARISON_YEAR_BUILT_TOLERANCE",
            defaults.year_built_tolerance,
        )?,
    })
}

fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat { value: String },
    InvalidNumber { key: &'static str, value: String },
    InvalidPsfRange { min: f64, max: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat { value } => write!(
                f,
                "APP_LOG_FORMAT must be one of compact, pretty or json (got '{}')",
                value
            ),
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{} must be numeric (got '{}')", key, value)
            }
            ConfigError::InvalidPsfRange { min, max } => write!(
                f,
                "QUALITY_PSF_MIN ({}) must be lower than QUALITY_PSF_MAX ({})",
                min, max
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat { .. }
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidPsfRange { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "QUALITY_PSF_MIN",
            "QUALITY_PSF_MAX",
            "QUALITY_GENERIC_STREETS",
            "QUALITY_SEARCH_RADIUS_MILES",
            "QUALITY_MIN_PROPERTIES_FOR_IDENTICAL_ESTIMATE",
            "COMPARISON_SQFT_TOLERANCE_PCT",
            "COMPARISON_YEAR_BUILT_TOLERANCE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.quality, QualityConfig::default());
        assert_eq!(config.comparison, ComparisonConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn market_thresholds_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("QUALITY_PSF_MIN", "45");
        env::set_var("QUALITY_PSF_MAX", "180.5");
        env::set_var("QUALITY_GENERIC_STREETS", "Main St, Elm St,,");
        env::set_var("COMPARISON_YEAR_BUILT_TOLERANCE", "10");
        env::set_var("APP_LOG_FORMAT", "JSON");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.quality.psf_min, 45.0);
        assert_eq!(config.quality.psf_max, 180.5);
        assert_eq!(
            config.quality.generic_street_names,
            vec!["Main St".to_string(), "Elm St".to_string()]
        );
        assert_eq!(config.comparison.year_built_tolerance, 10);
        assert_eq!(config.comparison.sqft_tolerance_pct, 10.0);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn inverted_psf_range_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("QUALITY_PSF_MIN", "100");
        let error = AppConfig::load().expect_err("min equal to default max");
        assert!(matches!(error, ConfigError::InvalidPsfRange { .. }));
        reset_env();
    }

    #[test]
    fn non_numeric_values_name_the_variable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("QUALITY_SEARCH_RADIUS_MILES", "three");
        let error = AppConfig::load().expect_err("radius must be numeric");
        assert!(error.to_string().contains("QUALITY_SEARCH_RADIUS_MILES"));
        reset_env();
    }
}
