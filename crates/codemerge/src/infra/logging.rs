//! Tracing subscriber setup.

use tracing::Level;

/// Map `-q` / `-v` counts onto a maximum log level.
pub fn level_for(verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global fmt subscriber writing to stderr. Later calls are ignored.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbosity() {
        assert_eq!(level_for(3, true), Level::ERROR);
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(2, false), Level::DEBUG);
        assert_eq!(level_for(9, false), Level::TRACE);
    }
}
