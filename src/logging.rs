//! Log setup for the binary.
//!
//! Status lines go to stderr so stdout only ever carries release JSON. The
//! subscriber is scoped: it stays active while the returned guard lives.

use std::io::{self, IsTerminal};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count.
pub fn directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("release_me={level},github_release={level},warn")
}

/// Install the stderr subscriber for the current thread.
///
/// `RUST_LOG` is honored unless `-v` was given.
pub fn init(verbose: u8) -> DefaultGuard {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(0))),
        n => EnvFilter::new(directive(n)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_levels() {
        assert_eq!(directive(0), "release_me=info,github_release=info,warn");
        assert_eq!(directive(1), "release_me=debug,github_release=debug,warn");
        assert_eq!(directive(5), "release_me=trace,github_release=trace,warn");
    }
}
