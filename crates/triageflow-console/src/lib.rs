//! Colored console output for allocation runs.
//!
//! Provides a `tracing` layer that renders engine events on stderr, so
//! JSON reports written to stdout stay machine-readable.
//!
//! ## Log Levels
//!
//! - **INFO**: Run lifecycle (run start/end, solves, slot selections, commits)
//! - **WARN**: Skipped input rows, links and transfers
//! - **DEBUG**: Graph sizes and store internals, through the default formatter only

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const DEFAULT_DIRECTIVES: [&str; 2] = ["triageflow_solver=info", "triageflow_store=info"];

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default engine directives when set.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);

        let mut filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            for directive in DEFAULT_DIRECTIVES {
                if let Ok(directive) = directive.parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(AllocationConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

/// A tracing layer that formats engine events with colors.
pub struct AllocationConsoleLayer;

impl<S: Subscriber> Layer<S> for AllocationConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("triageflow") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    scenario: Option<String>,
    slot: Option<String>,
    kind: Option<String>,
    reason: Option<String>,
    value: Option<i64>,
    capacity: Option<i64>,
    items: Option<u64>,
    mutations: Option<u64>,
    augmenting_paths: Option<u64>,
    nodes: Option<u64>,
    edges: Option<u64>,
    line: Option<u64>,
    committed: Option<bool>,
    dry_run: Option<bool>,
    counts: Vec<(&'static str, u64)>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        self.record_text(field, s);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "items" => self.items = Some(value),
            "mutations" => self.mutations = Some(value),
            "augmenting_paths" => self.augmenting_paths = Some(value),
            "nodes" => self.nodes = Some(value),
            "edges" => self.edges = Some(value),
            "line" => self.line = Some(value),
            name @ ("patients" | "hospitals" | "transfers" | "centers" | "zones" | "routes"
            | "links" | "slots" | "placed") => self.counts.push((name, value)),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "value" => self.value = Some(value),
            "capacity" => self.capacity = Some(value),
            _ if value >= 0 => self.record_u64(field, value as u64),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "committed" => self.committed = Some(value),
            "dry_run" => self.dry_run = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }
}

impl EventVisitor {
    fn record_text(&mut self, field: &Field, value: String) {
        match field.name() {
            "event" => self.event = Some(value),
            "scenario" => self.scenario = Some(value),
            "slot" => self.slot = Some(value),
            "kind" => self.kind = Some(value),
            "reason" => self.reason = Some(value),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "run_start" => format_run_start(v),
        "run_end" => format_run_end(v),
        "solve_end" => format_solve_end(v),
        "slot_selected" => format_slot_selected(v),
        "commit" => format_commit(v),
        event if level == Level::WARN => format_warning(v, event),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

fn signed(n: i64) -> String {
    n.to_formatted_string(&Locale::en)
}

fn scenario(v: &EventVisitor) -> &str {
    v.scenario.as_deref().unwrap_or("run")
}

fn format_run_start(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        scenario(v).white().bold()
    );
    for (name, n) in &v.counts {
        output.push_str(&format!(" │ {} {}", count(*n).bright_yellow(), name));
    }
    if let Some(capacity) = v.capacity {
        output.push_str(&format!(" │ capacity {}", signed(capacity).bright_yellow()));
    }
    if let Some(items) = v.items {
        output.push_str(&format!(" │ {} items", count(items).bright_yellow()));
    }
    output
}

fn format_solve_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Max flow {} │ {} paths │ {} nodes │ {} edges",
        format_elapsed(),
        "⚡".bright_cyan(),
        signed(v.value.unwrap_or(0)).bright_magenta().bold(),
        count(v.augmenting_paths.unwrap_or(0)).white(),
        count(v.nodes.unwrap_or(0)).white(),
        count(v.edges.unwrap_or(0)).white(),
    )
}

fn format_slot_selected(v: &EventVisitor) -> String {
    format!(
        "{} {} Slot {} │ capacity {} │ {} items │ value {}",
        format_elapsed(),
        "◆".bright_blue(),
        v.slot.as_deref().unwrap_or("?").white().bold(),
        signed(v.capacity.unwrap_or(0)).bright_yellow(),
        count(v.items.unwrap_or(0)).white(),
        signed(v.value.unwrap_or(0)).bright_magenta(),
    )
}

fn format_commit(v: &EventVisitor) -> String {
    let mutations = count(v.mutations.unwrap_or(0));
    if v.dry_run.unwrap_or(false) {
        format!(
            "{} {} Dry run │ {} mutations not written",
            format_elapsed(),
            "○".yellow(),
            mutations.yellow()
        )
    } else {
        format!(
            "{} {} Committed {} mutations",
            format_elapsed(),
            "✓".bright_green().bold(),
            mutations.bright_green()
        )
    }
}

fn format_run_end(v: &EventVisitor) -> String {
    let status = if v.committed.unwrap_or(false) {
        "committed".bright_green().to_string()
    } else {
        "not committed".yellow().to_string()
    };
    format!(
        "{} {} {} complete │ value {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        scenario(v).white().bold(),
        signed(v.value.unwrap_or(0)).bright_magenta().bold(),
        status
    )
}

fn format_warning(v: &EventVisitor, event: &str) -> String {
    let mut output = format!(
        "{} {} {}",
        format_elapsed(),
        "!".bright_red().bold(),
        event.replace('_', " ").yellow()
    );
    if let Some(kind) = &v.kind {
        output.push_str(&format!(" │ {}", kind));
    }
    if let Some(line) = v.line {
        output.push_str(&format!(" │ line {}", count(line)));
    }
    if let Some(reason) = &v.reason {
        output.push_str(&format!(" │ {}", reason.bright_black()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_unknown_events_are_silent() {
        assert!(format_event(&visitor("graph_built"), Level::INFO).is_empty());
        assert!(format_event(&visitor(""), Level::DEBUG).is_empty());
    }

    #[test]
    fn test_warnings_show_reason() {
        let mut v = visitor("row_skipped");
        v.kind = Some("route link".to_string());
        v.line = Some(3);
        v.reason = Some("capacity must not be negative".to_string());

        let output = format_event(&v, Level::WARN);
        assert!(output.contains("row skipped"));
        assert!(output.contains("route link"));
        assert!(output.contains("line"));
        assert!(output.contains("capacity must not be negative"));
    }

    #[test]
    fn test_large_values_grouped() {
        let mut v = visitor("solve_end");
        v.value = Some(1_250_000);
        assert!(format_event(&v, Level::INFO).contains("1,250,000"));
    }

    #[test]
    fn test_dry_run_commit() {
        let mut v = visitor("commit");
        v.mutations = Some(4);
        v.dry_run = Some(true);
        assert!(format_event(&v, Level::INFO).contains("Dry run"));
    }
}
