//! Colorful console output for calculation events.
//!
//! Provides a `tracing` layer that formats blockplan events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Calculation start/end, solve end, provision results
//! - **WARN**: Missing brick catalogs, skipped blocks, timeouts

use std::io::{self, Write};
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the console layer.
///
/// Safe to call multiple times; only the first call has effect. `RUST_LOG`
/// overrides the default `blockplan=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in [
            "blockplan_optimizer=info",
            "blockplan_solver=info",
        ] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(ConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that prints blockplan events.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("blockplan") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    status: Option<String>,
    category: Option<String>,
    reason: Option<String>,
    block: Option<u64>,
    block_count: Option<u64>,
    skipped_count: Option<u64>,
    duration_ms: Option<u64>,
    time_limit_ms: Option<u64>,
    live_workers: Option<u64>,
    objective: Option<f64>,
    total_before: Option<f64>,
    total_after: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "status" => self.status = Some(s),
            "category" => self.category = Some(s),
            "reason" => self.reason = Some(s),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            "category" => self.category = Some(value.to_string()),
            "reason" => self.reason = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "block" => self.block = Some(value),
            "block_count" => self.block_count = Some(value),
            "skipped_count" => self.skipped_count = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "time_limit_ms" => self.time_limit_ms = Some(value),
            "live_workers" => self.live_workers = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "objective" => self.objective = Some(value),
            "total_before" => self.total_before = Some(value),
            "total_after" => self.total_after = Some(value),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "calculate_start" => format!(
            "{} Calculating │ {} blocks",
            "▶".bright_green().bold(),
            v.block_count.unwrap_or(0).bright_yellow()
        ),
        "solve_end" => format!(
            "  {} Solved │ {} │ {}ms",
            "◆".bright_blue(),
            v.status.as_deref().unwrap_or("unknown").bright_white(),
            v.duration_ms.unwrap_or(0).bright_yellow()
        ),
        "solve_timeout" => format!(
            "  {} Solver gave up after {}ms │ {} workers still running",
            "⚠".yellow().bold(),
            v.time_limit_ms.unwrap_or(0).bright_yellow(),
            v.live_workers.unwrap_or(0).bright_red()
        ),
        "calculate_end" => {
            let mut output = format!(
                "{} Done │ {} blocks │ objective {}",
                "■".bright_cyan().bold(),
                v.block_count.unwrap_or(0).bright_yellow(),
                format!("{:.3}", v.objective.unwrap_or(0.0)).bright_green()
            );
            if let Some(skipped) = v.skipped_count.filter(|s| *s > 0) {
                output.push_str(&format!(" │ {} skipped", skipped.bright_red()));
            }
            if let Some(ms) = v.duration_ms {
                output.push_str(&format!(" │ {}ms", ms.bright_yellow()));
            }
            output
        }
        "provision_evaluated" => {
            let before = v.total_before.unwrap_or(0.0);
            let after = v.total_after.unwrap_or(0.0);
            let delta = format!("{:+.3}", after - before);
            let delta = if after >= before {
                delta.bright_green().to_string()
            } else {
                delta.bright_red().to_string()
            };
            format!(
                "{} Provision │ block {} │ {:.3} → {:.3} ({})",
                "●".bright_magenta(),
                v.block.unwrap_or(0),
                before,
                after,
                delta
            )
        }
        "missing_brick_catalog" => format!(
            "  {} block {} │ nothing to build for {}",
            "⚠".yellow().bold(),
            v.block.unwrap_or(0),
            v.category.as_deref().unwrap_or("?").bright_white()
        ),
        "block_skipped" => format!(
            "  {} block {} skipped │ {}",
            "✗".bright_red().bold(),
            v.block.unwrap_or(0),
            v.reason.as_deref().unwrap_or("").bright_black()
        ),
        _ => String::new(),
    }
}
