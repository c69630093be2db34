use color_eyre::{eyre::eyre, Result};
use tracing_subscriber::filter::LevelFilter;

/// A configuration for a tracing subscriber
///
/// See the subscriber builder page for full details:
/// [link](https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/fmt/struct.SubscriberBuilder.html).
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct TracingConfig {
    /// The logging style. json | pretty | compact | default
    #[serde(default)]
    pub style: Style,
    /// The logging level. Defaults to info
    #[serde(default)]
    pub level: Level,
}

impl TracingConfig {
    /// Attempt to instantiate and register a tracing subscriber setup from
    /// settings
    pub fn try_init_tracing(&self) -> Result<()> {
        let builder = tracing_subscriber::fmt().with_max_level(LevelFilter::from(self.level));

        let result = match self.style {
            Style::Pretty => builder.pretty().try_init(),
            Style::Json => builder.json().try_init(),
            Style::Compact => builder.compact().try_init(),
            Style::Default => builder.try_init(),
        };

        result.map_err(|e| eyre!("Failed to initialize tracing: {}", e))
    }
}

/// Basic tracing configuration
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// Pretty print
    Pretty,
    /// JSON
    Json,
    /// Compact
    Compact,
    /// Default style
    #[serde(other)]
    Default,
}

impl Default for Style {
    fn default() -> Self {
        Style::Default
    }
}

/// Logging level
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Off
    Off,
    /// Error
    Error,
    /// Warn
    Warn,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// Info
    #[serde(other)]
    Info,
}

impl Default for Level {
    fn default() -> Self {
        Level::Info
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> LevelFilter {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
        }
    }
}
