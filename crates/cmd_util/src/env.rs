use std::{
    env,
    fmt::Debug,
    fs::File,
    str::FromStr,
};

use tracing::Level;
use tracing_subscriber::{
    fmt::format::format,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Read a tuning knob from the environment, falling back to `default` when
/// the variable is unset or unparsable.
pub fn env_config<T: Debug + FromStr>(name: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    let var_s = match env::var(name) {
        Ok(s) => s,
        Err(env::VarError::NotPresent) => return default,
        Err(env::VarError::NotUnicode(..)) => {
            tracing::warn!("Invalid value for {name}, falling back to {default:?}.");
            return default;
        },
    };
    match T::from_str(&var_s) {
        Ok(v) => {
            tracing::info!("Overriding {name} to {v:?} from environment");
            v
        },
        Err(e) => {
            tracing::warn!("Invalid value {var_s} for {name}, falling back to {default:?}: {e:?}");
            default
        },
    }
}

/// Guard object returned by [`config_service`]. Hold onto it for as long as
/// the `COORDINATOR_TRACE_FILE` appender should keep flushing.
pub struct TracingGuard {
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Call this from services at startup: a stdout fmt layer filtered by
/// `RUST_LOG` (INFO by default), formatted per `LOG_FORMAT`
/// (compact/json/pretty), plus an optional non-blocking file appender when
/// `COORDINATOR_TRACE_FILE` is set.
pub fn config_service() -> TracingGuard {
    let stdout_layer = {
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(env::var("NO_COLOR").is_err())
            .with_writer(std::io::stdout);
        let layer = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => layer.event_format(format().json()).boxed(),
            Ok("pretty") => layer.event_format(format().pretty()).boxed(),
            _ => layer.event_format(format().compact()).boxed(),
        };
        layer.with_filter(
            EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(Level::INFO.as_str())),
        )
    };

    let (file_layer, guard) = match trace_file() {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()));
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    TracingGuard { _guard: guard }
}

/// When `COORDINATOR_TRACE_FILE` is set, log to `<exe name>.log` in the
/// working directory alongside stdout.
fn trace_file() -> Option<File> {
    env::var("COORDINATOR_TRACE_FILE").ok()?;
    let exe_path = env::current_exe().ok()?;
    let filename = format!("{}.log", exe_path.file_name()?.to_str()?);
    match File::create(&filename) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not create trace file {filename}: {e}");
            None
        },
    }
}

/// Best-effort tracing init for tests. Losing the race to another test in
/// the same process is fine; somebody initialized it.
pub fn config_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}
