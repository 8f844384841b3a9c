//! Tracing subscriber setup for binaries and tools.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::EngineResult;

/// Installs the global subscriber: fmt output with uptime stamps, filtered by
/// `RUST_LOG` when it is set, otherwise by per-crate levels for the engine
/// crates (verbose in debug builds).
///
/// Call once, early. Libraries never call this.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` is malformed or a subscriber is already set.
pub fn init() -> EngineResult<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_from(env.as_deref())?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_timer(time::uptime()))
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Builds the filter from a `RUST_LOG` value. A blank value counts as unset.
fn filter_from(env: Option<&str>) -> EngineResult<EnvFilter> {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    if let Some(directives) = env.filter(|s| !s.trim().is_empty()) {
        return Ok(builder.parse(directives)?);
    }

    let (own, core) = if cfg!(debug_assertions) {
        ("nebula=debug", "nebula_core=debug")
    } else {
        ("nebula=info", "nebula_core=warn")
    };
    Ok(builder
        .parse("")?
        .add_directive(own.parse()?)
        .add_directive(core.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_directives_are_not_overridden() {
        let trace = filter_from(Some("nebula_core=trace")).unwrap();
        assert_eq!(trace.max_level_hint(), Some(LevelFilter::TRACE));

        let quiet = filter_from(Some("warn")).unwrap();
        assert_eq!(quiet.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_builtin_levels_when_unset() {
        for env in [None, Some(""), Some("  ")] {
            let filter = filter_from(env).unwrap();
            assert!(filter.max_level_hint() >= Some(LevelFilter::INFO));
        }
    }

    #[test]
    fn test_malformed_env_is_an_error() {
        assert!(filter_from(Some("nebula_core=loud")).is_err());
    }
}
