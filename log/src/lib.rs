//! Logging setup for glide: a log file, plus stdout when asked for.
//!
//! The file always receives `warn` and above, or whatever the environment
//! filter selects when one is set. Stdout is only attached when an
//! environment filter is set, or in debug builds.
//!
//! ## Environment Variables
//!
//! 1. **`GLIDE_LOG`**: a bare level (`debug`) applies to every glide crate;
//!    anything with `=`, `:` or `,` is used as a full filter.
//! 2. **`RUST_LOG`**: standard tracing filter, used as-is.
//! 3. Neither: `warn` globally, `info` for glide crates.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/glide/logs/glide-<pid>.log`. A `--log-file`
//! path with an extension names the file, one without names the directory.

use snafu::{ResultExt, Snafu};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::ParseError,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer, Registry,
};

const GLIDE_CRATES: &[&str] = &["glide_viewport", "glide_bin", "glide_log"];

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to create log directory {}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Invalid log filter '{directives}'"))]
    Filter {
        directives: String,
        source: ParseError,
    },

    #[snafu(display("A global subscriber is already installed"))]
    Install { source: TryInitError },
}

/// Keeps the background file writer alive. Dropping it flushes the log.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Filter sources, read once from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FilterEnv {
    glide_log: Option<String>,
    rust_log: Option<String>,
}

impl FilterEnv {
    fn from_env() -> Self {
        Self {
            glide_log: env::var("GLIDE_LOG").ok(),
            rust_log: env::var("RUST_LOG").ok(),
        }
    }

    fn is_set(&self) -> bool {
        self.glide_log.is_some() || self.rust_log.is_some()
    }

    /// Directives for stdout, and for the file when the environment asks.
    fn directives(&self) -> String {
        if let Some(level) = &self.glide_log {
            return expand_glide_log(level);
        }
        if let Some(rust_log) = &self.rust_log {
            return rust_log.clone();
        }
        crate_directives("info")
    }

    fn file_directives(&self) -> String {
        if self.is_set() {
            self.directives()
        } else {
            "warn".to_string()
        }
    }
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed; [`test`] is the variant that
/// tolerates that.
pub fn init(config: LogConfig) -> Result<LogGuard, Error> {
    let filters = FilterEnv::from_env();
    let (log_dir, filename) = resolve_log_path(config.log_file_path, std::process::id());
    std::fs::create_dir_all(&log_dir).context(CreateDirSnafu { path: &log_dir })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(build_filter(filters.file_directives())?);

    let stdout_layer = if filters.is_set() || cfg!(debug_assertions) {
        Some(fmt::layer().with_filter(build_filter(filters.directives())?))
    } else {
        None
    };

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context(InstallSnafu)?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Stdout-only logging for tests. Safe to call from every test.
pub fn test() {
    let Ok(filter) = build_filter(FilterEnv::from_env().directives()) else {
        return;
    };
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

fn build_filter(directives: String) -> Result<EnvFilter, Error> {
    EnvFilter::try_new(&directives).context(FilterSnafu { directives })
}

fn resolve_log_path(override_path: Option<PathBuf>, pid: u32) -> (PathBuf, String) {
    let filename = format!("glide-{pid}.log");
    match override_path {
        Some(path) if path.extension().is_some() => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or(filename);
            (dir, name)
        },
        Some(dir) => (dir, filename),
        None => {
            let dir = dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("glide")
                .join("logs");
            (dir, filename)
        },
    }
}

fn crate_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for krate in GLIDE_CRATES {
        directives.push_str(&format!(",{krate}={level}"));
    }
    directives
}

fn expand_glide_log(value: &str) -> String {
    if value.contains(['=', ':', ',']) {
        value.to_string()
    } else {
        crate_directives(value)
    }
}
