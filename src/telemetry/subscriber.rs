use std::{env, error::Error};

use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::telemetry::otel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: Level,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::parse(
            env::var("LOG_FORMAT").ok().as_deref(),
            env::var("LOG_LEVEL").ok().as_deref(),
        )
    }

    fn parse(format: Option<&str>, level: Option<&str>) -> Self {
        let format = match format {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let level = match level {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ => Level::INFO,
        };

        Self { format, level }
    }

    fn default_filter(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        format!("{level},tower_http=info,sqlx=warn")
    }
}

pub fn init_tracing() -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = LogSettings::from_env();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_filter()));

    let fmt_layer = match settings.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(otel::build_otel_layer()?)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

pub fn shutdown_tracing() {
    otel::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_info() {
        let settings = LogSettings::parse(None, None);
        assert_eq!(settings.format, LogFormat::Pretty);
        assert_eq!(settings.level, Level::INFO);
        assert_eq!(settings.default_filter(), "info,tower_http=info,sqlx=warn");
    }

    #[test]
    fn reads_json_and_level() {
        let settings = LogSettings::parse(Some("json"), Some("debug"));
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.level, Level::DEBUG);
    }
}
