use serde::Deserialize;
use tracing::Level;

/// Severity used for rendered-SQL events.
///
/// Mirrors [`tracing::Level`] so the setting can be read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Builder behaviour settings.
///
/// Defaults: page 1, page size 20, rendered SQL logged at DEBUG and
/// truncated to 200 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Page index used when the bag has no `PageIndex`.
    pub default_page_index: i32,
    /// Page size used when the bag has no `PageSize`.
    pub default_page_size: i32,
    /// Level of the `condsql.sql` event emitted on render.
    pub log_level: LogLevel,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_log_sql_length: Option<usize>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_page_index: 1,
            default_page_size: 20,
            log_level: LogLevel::Debug,
            max_log_sql_length: Some(200),
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_page_index(mut self, page_index: i32) -> Self {
        self.default_page_index = page_index;
        self
    }

    pub fn with_default_page_size(mut self, page_size: i32) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn with_max_log_sql_length(mut self, len: usize) -> Self {
        self.max_log_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in log output.
    pub fn no_truncate(mut self) -> Self {
        self.max_log_sql_length = None;
        self
    }
}
