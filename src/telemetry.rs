use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Library targets raised together by `--verbose`.
pub const WORKSPACE_TARGETS: [&str; 5] = [
    "ai_llm_service",
    "knowledge_store",
    "float_sources",
    "query_pipeline",
    "floatchat_backend",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Level directive for one workspace crate, e.g. `float_sources=debug`.
pub fn level_directive(target: &str, level: Level) -> Directive {
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).expect("valid level directive")
}

/// Filter from `RUST_LOG`, else `default`; `verbose` lifts workspace crates to DEBUG.
pub fn env_filter(default: &str, verbose: bool) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if !verbose {
        return base;
    }
    WORKSPACE_TARGETS
        .iter()
        .fold(base, |f, t| f.add_directive(level_directive(t, Level::DEBUG)))
}

/// Installs the global subscriber.
///
/// Logs go to stderr so stdout carries only the JSON envelope.
/// ANSI colors only when stderr is a terminal.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        // Span close events carry durations for instrumented stages.
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(
            fmt::format()
                .compact()
                .with_timer(ChronoRfc3339Utc)
                .with_level(true)
                .with_target(true),
        );

    tracing_subscriber::registry()
        .with(env_filter("info", verbose))
        .with(layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_names_the_crate() {
        assert_eq!(
            level_directive("query_pipeline", Level::DEBUG).to_string(),
            "query_pipeline=debug"
        );
    }
}
