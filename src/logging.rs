//! Logging setup for binaries and tests embedding the engine.
//!
//! The engine itself only emits through the `log` facade; it never prints.
//! Hosts that want output on stderr can call [`init`] once at startup.
//! Level selection (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. The `verbosity` argument: 0 = info, 1 = debug, 2+ = trace

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the `env_logger` backend.
///
/// # Panics
///
/// Panics if a logger was already installed. Use [`try_init`] where
/// double-initialization is possible (tests, plugins).
pub fn init(verbosity: u8) {
    builder(verbosity).init();
}

/// Initialize the `env_logger` backend, ignoring an already-installed logger.
///
/// Safe to call from every `#[test]`.
pub fn try_init(verbosity: u8) {
    let _ = builder(verbosity).is_test(true).try_init();
}

fn builder(verbosity: u8) -> Builder {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbosity));
    }

    builder.format(|buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        writeln!(
            buf,
            "{} {level_style}{:<5}{level_style:#} {}",
            buf.timestamp_seconds(),
            level,
            record.args()
        )
    });
    builder
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), LevelFilter::Info);
        assert_eq!(level_for(1), LevelFilter::Debug);
        assert_eq!(level_for(2), LevelFilter::Trace);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn try_init_is_idempotent() {
        try_init(0);
        try_init(1);
    }
}
