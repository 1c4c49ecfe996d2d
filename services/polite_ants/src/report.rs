//! Human-readable and JSON rendering of run outcomes

use colony_actors::{Quiescence, RunOutcome};
use colony_config::ColonyConfig;
use serde::Serialize;
use std::fmt::{self, Write};
use std::time::Duration;

const NOT_AVAILABLE: &str = "n/a";

/// One entry of a worker sweep
#[derive(Debug, Serialize)]
pub struct SweepRun<'a> {
    pub workers: usize,
    pub config: &'a ColonyConfig,
    pub outcome: &'a RunOutcome,
}

/// Render a run as the plain-text benchmark report
pub fn render_text(run: &SweepRun<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_text(&mut out, run);
    out
}

fn write_text(out: &mut impl Write, run: &SweepRun<'_>) -> fmt::Result {
    let config = run.config;
    let outcome = run.outcome;
    let report = &outcome.report;

    writeln!(out, "Run {} ({} workers)", outcome.run_id, run.workers)?;
    writeln!(out, "Ants: {}", group_thousands(config.population as u64))?;
    writeln!(out, "Greeting seeds: {}", group_thousands(config.seed_batch as u64))?;
    writeln!(out, "Greetings per schedule: {}", config.greetings_per_schedule)?;
    writeln!(out, "Greeting fake processing: {}", seconds(config.greeting_processing()))?;
    writeln!(out, "Test duration: {}", seconds(config.duration()))?;
    writeln!(out, "Workers: {}", run.workers)?;
    writeln!(out)?;

    writeln!(out, "Create ants: {} ms", outcome.creation_elapsed.as_millis())?;
    writeln!(out, "Started ants: {}", group_thousands(report.started_ants as u64))?;
    writeln!(out, "Start duration (avg): {}", millis(report.start_latency_avg))?;
    writeln!(out, "Schedules: {}", group_thousands(report.schedules_received_total))?;
    writeln!(out)?;

    writeln!(out, "Greeting sent (avg): {}", average(report.greetings_sent_avg))?;
    writeln!(out, "Greeting sent (sum): {}", group_thousands(report.greetings_sent_total))?;
    writeln!(out, "Greeting received (avg): {}", average(report.greetings_received_avg))?;
    writeln!(out, "Greeting received (sum): {}", group_thousands(report.greetings_received_total))?;
    writeln!(out, "GreetingAck received (avg): {}", average(report.acks_received_avg))?;
    writeln!(out, "GreetingAck received (sum): {}", group_thousands(report.acks_received_total))?;
    writeln!(out, "Messages: {}", group_thousands(report.total_messages))?;
    writeln!(out, "Message rate (m/s): {}", rate(report.message_rate))?;
    writeln!(out)?;

    writeln!(out, "Greeting RTT (avg): {}", latency(report.rtt_avg))?;
    writeln!(out, "Greeting RTT (max): {}", latency(report.rtt_max))?;
    writeln!(out, "Greeting RTT (min): {}", latency(report.rtt_min))?;
    writeln!(out, "Quiescence: {}", quiescence(&outcome.quiescence))
}

/// Render the whole sweep as a JSON array
pub fn render_json(runs: &[SweepRun<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(runs)
}

fn quiescence(state: &Quiescence) -> String {
    match state {
        Quiescence::Drained { waited } => format!("drained in {} ms", waited.as_millis()),
        Quiescence::TimedOut {
            waited,
            unprocessed,
            sends_in_flight,
        } => format!(
            "drain timed out after {} ms ({} unprocessed, {} sends in flight); counts are short",
            waited.as_millis(),
            unprocessed,
            sends_in_flight
        ),
        Quiescence::Settled { waited } => {
            format!("settled for {} ms with traffic live; counts may undercount", waited.as_millis())
        }
    }
}

fn seconds(duration: Duration) -> String {
    format!("{:.4} s", duration.as_secs_f64())
}

fn millis(value: Option<Duration>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |d| format!("{:.3} ms", d.as_secs_f64() * 1_000.0),
    )
}

fn latency(value: Option<Duration>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |d| format!("{:.6} s", d.as_secs_f64()),
    )
}

fn average(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

fn rate(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |v| group_thousands(v.round() as u64),
    )
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
