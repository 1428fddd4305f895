//! Layered configuration for the affiliate-program client.
//!
//! Values are merged by `ortho_config` from defaults, an optional
//! configuration file, `AFFILIATE_*` environment variables and command-line
//! flags, in increasing order of precedence.

mod defaults;
mod limits;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    ALLOWED_MONTH_COUNTS, DEFAULT_LOG_FILTER, DEFAULT_MAX_COMMISSION_PERMILLE,
    DEFAULT_MIN_COMMISSION_PERMILLE, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use limits::{ProgramLimits, ProgramLimitsError};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the client and its host application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "AFFILIATE")]
pub struct Config {
    /// Tracing filter expression, e.g. `info` or `affiliate_client=debug`.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the tracing subscriber.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Smallest commission the backend accepts, in per-mille.
    #[ortho_config(default = defaults::DEFAULT_MIN_COMMISSION_PERMILLE)]
    pub min_commission_permille: i32,
    /// Largest commission the backend accepts, in per-mille.
    #[ortho_config(default = defaults::DEFAULT_MAX_COMMISSION_PERMILLE)]
    pub max_commission_permille: i32,
}

impl Config {
    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Commission and duration bounds for program terms.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramLimitsError`] when the configured commission range is
    /// empty or outside `1..=999`.
    pub fn program_limits(&self) -> Result<ProgramLimits, ProgramLimitsError> {
        ProgramLimits::new(self.min_commission_permille, self.max_commission_permille)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            min_commission_permille: DEFAULT_MIN_COMMISSION_PERMILLE,
            max_commission_permille: DEFAULT_MAX_COMMISSION_PERMILLE,
        }
    }
}
