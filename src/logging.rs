//! Log output for the bot. Everything goes to stderr so that console
//! delivery on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "aws_security_bot=debug,info"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling this twice is harmless; the second
/// call keeps the first subscriber.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("debug"));
        assert_eq!(default_filter(false), "warn");
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
