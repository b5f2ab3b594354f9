use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;

/// Number of `-v` flags given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self.0 {
            0 => LevelFilter::ERROR,
            1 => LevelFilter::WARN,
            2 => LevelFilter::INFO,
            3 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// A stderr subscriber for one run. Install it with
/// `tracing::subscriber::with_default` rather than globally.
pub fn subscriber(verbosity: Verbosity) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_max_level(verbosity.level_filter())
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .finish()
}
