//! Logging setup using tracing.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber.
///
/// `verbosity` uses the `-v` scale (0=warn, 1=info, 2=debug, 3+=trace). The
/// netpanel binary combines its `-v` count with the config file's
/// `log_level` through [`verbosity()`]. Directives in `RUST_LOG` are added on
/// top, so `RUST_LOG=netpanel::backend=trace` raises one module without
/// touching the rest.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::from_default_env().add_directive(level_for(verbosity).into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Whichever of the `-v` count and the configured `log_level` is louder.
pub fn verbosity(cli: u8, configured: u8) -> u8 {
    cli.max(configured)
}

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(3), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }

    #[test]
    fn louder_of_flag_and_config_wins() {
        assert_eq!(verbosity(0, 2), 2);
        assert_eq!(verbosity(3, 1), 3);
        assert_eq!(level_for(verbosity(0, 0)), Level::WARN);
    }
}
