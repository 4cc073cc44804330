//! Tracing setup for debugging inference.
//!
//! Output format is chosen by `LTY_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`, the easiest way to
//!   follow a declaration through cycle cuts and cache hits
//! - `json`: one JSON object per event
//!
//! ```bash
//! LTY_LOG=debug LTY_LOG_FORMAT=tree cargo test -p lty-checker
//! LTY_LOG="lty_checker=trace,lty_binder=debug" cargo bench
//! ```
//!
//! Nothing is installed unless `LTY_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => LogFormat::Tree,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> Self {
        LogFormat::parse(&std::env::var("LTY_LOG_FORMAT").unwrap_or_default())
    }
}

/// `LTY_LOG` wins over `RUST_LOG`; both use `RUST_LOG` directive syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("LTY_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber, writing to stderr. A second call, or a
/// subscriber installed elsewhere, is left in place.
pub fn init_tracing() {
    if std::env::var_os("LTY_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = build_filter();

    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(layer).try_init()
        }
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
