//! log4rs setup: `app.log` for everything, `query.log` for the `devcamper::query` target.
//!
//! Both files roll at 10 MiB and keep `retention` old files. Calling a configure function again
//! replaces the active configuration.

use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const QUERY_TARGET: &str = "devcamper::query";

const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const APP_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const QUERY_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {m}{n}";

static HANDLE: OnceLock<Handle> = OnceLock::new();

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(
    base: &Path,
    name: &str,
    pattern: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{name}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build(base.join(format!("{name}.log")), Box::new(policy))?)
}

/// Configure logging for the process.
/// - dir: base directory for log files; current directory when `None`
/// - level: error|warn|info|debug|trace (default info)
/// - retention: rolled files kept per log (default 7)
///
/// # Errors
/// Returns an error if the directory cannot be created or an appender cannot be built.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = retention.unwrap_or(7).max(1);
    let lvl = parse_level(level.unwrap_or("info"));

    let app = rolling(&base, "app", APP_PATTERN, keep)?;
    let query = rolling(&base, "query", QUERY_PATTERN, keep)?;
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(app)))
        .appender(Appender::builder().build("query", Box::new(query)))
        .logger(Logger::builder().appender("query").additive(false).build(QUERY_TARGET, lvl))
        .build(Root::builder().appender("app").build(lvl))?;

    match HANDLE.get() {
        Some(handle) => handle.set_config(config),
        None => {
            let handle = log4rs::init_config(config)?;
            // a racing initializer already holds the global logger; keep its handle
            let _ = HANDLE.set(handle);
        }
    }
    Ok(())
}

/// Configure logging from `DEVCAMPER_LOG_DIR`, `DEVCAMPER_LOG_LEVEL` and
/// `DEVCAMPER_LOG_RETENTION`.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("DEVCAMPER_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("DEVCAMPER_LOG_LEVEL").ok();
    let retention =
        std::env::var("DEVCAMPER_LOG_RETENTION").ok().and_then(|s| s.parse::<u32>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
