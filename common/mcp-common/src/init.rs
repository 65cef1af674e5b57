//! Tracing initialization
//!
//! Logs go to stderr so stdout stays free for whatever the process pipes.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Sets up logging to stderr with:
/// - Formatted output without ANSI colors (for clean logs)
/// - Environment-based filtering via RUST_LOG
/// - Default log level of `info` for each of the given targets
///
/// Set `LOG_FORMAT=json` for structured JSON output (useful for production/log aggregation).
/// Default is human-readable text output.
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing(&["serper_mcp", "mcp_common", "tower_http"])?;
/// ```
pub fn init_tracing(targets: &[&str]) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for target in targets {
        filter = filter.add_directive(format!("{}=info", target).parse()?);
    }

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
