//! Logging configuration.
//!
//! Level precedence, highest first: `-q`/`-v` flags, `NHI_LOG`, `RUST_LOG`,
//! then the built-in `info`. `--log-format` beats `NHI_LOG_FORMAT`.

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "NHI_LOG";

/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "NHI_LOG_FORMAT";

/// Standard tracing directive variable, consulted last.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "console" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {} (expected human or jsonl)", s)),
        }
    }
}

/// Minimum level that reaches stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        f.write_str(s)
    }
}

/// Resolved logging settings for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw `RUST_LOG` directives. Only set when neither a CLI flag nor
    /// `NHI_LOG` chose the level.
    pub directives: Option<String>,
}

impl LogConfig {
    /// Resolve from the process environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        let var = |name| std::env::var(name).ok();
        Self::resolve(
            cli_level,
            cli_format,
            var(ENV_LOG_LEVEL).as_deref(),
            var(ENV_RUST_LOG).as_deref(),
            var(ENV_LOG_FORMAT).as_deref(),
        )
    }

    /// Resolve from explicit values; unparseable env values are ignored.
    pub fn resolve(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        nhi_log: Option<&str>,
        rust_log: Option<&str>,
        nhi_log_format: Option<&str>,
    ) -> Self {
        let env_level = nhi_log.and_then(|v| v.parse::<LogLevel>().ok());
        let rust_log = rust_log.map(str::trim).filter(|v| !v.is_empty());

        let (level, directives) = match (cli_level, env_level, rust_log) {
            (Some(level), _, _) | (None, Some(level), _) => (level, None),
            (None, None, Some(raw)) => match raw.parse::<LogLevel>() {
                Ok(level) => (level, None),
                Err(_) => (LogLevel::default(), Some(raw.to_string())),
            },
            (None, None, None) => (LogLevel::default(), None),
        };

        let format = cli_format
            .or_else(|| nhi_log_format.and_then(|v| v.parse().ok()))
            .unwrap_or_default();

        LogConfig {
            format,
            level,
            directives,
        }
    }

    /// Map `-v` / `-q` counts onto a level override.
    pub fn level_from_verbosity(verbose: u8, quiet: bool) -> Option<LogLevel> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }
}
