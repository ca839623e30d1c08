use std::collections::HashMap;
use std::time::Instant;

/// Observer for capture-session events.
///
/// Keeps the session loop free of output concerns: the CLI reports through
/// the `log` crate, tests swallow everything.
pub trait SessionLogger: Send {
    /// Called once per tick with the running tick and capture counts.
    fn tick(&mut self, tick: u64, captures: usize);

    /// Record how long a named stage took on one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time value (faces per tick, accumulated dwell).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: no-op.
    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn tick(&mut self, _tick: u64, _captures: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger for the CLI: collects stage timings and metrics, emits a
/// heartbeat every `heartbeat_ticks` ticks, and a summary at the end.
pub struct StdoutSessionLogger {
    heartbeat_ticks: u64,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    ticks: u64,
    captures: usize,
    messages: Vec<String>,
}

impl StdoutSessionLogger {
    pub fn new(heartbeat_ticks: u64) -> Self {
        Self {
            heartbeat_ticks: heartbeat_ticks.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
            captures: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted summary, or `None` before the first tick.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Session summary ({} ticks, {} captures, {:.1}s):",
            self.ticks,
            self.captures,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let max_ms = durations.iter().cloned().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutSessionLogger {
    /// Heartbeat every 50 ticks, about five seconds at the default period.
    fn default() -> Self {
        Self::new(50)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn tick(&mut self, tick: u64, captures: usize) {
        self.ticks = tick;
        self.captures = captures;
        if tick % self.heartbeat_ticks == 0 {
            log::info!("Tick {tick}: {captures} capture(s) so far");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
