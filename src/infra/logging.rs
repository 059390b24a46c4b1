pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // stdout carries MCP frames in stdio mode, so logs go to stderr.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log a metrics-like line and feed the `metrics` facade. Without an installed
/// recorder the facade call is a no-op.
pub fn log_metric(tool: &str, metric: &str, value: f64) {
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
    metrics::histogram!(metric.to_string(), "tool" => tool.to_string()).record(value);
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }

    #[test]
    fn log_metric_without_recorder_is_harmless() {
        super::log_metric("osascript", "automation_latency_ms", 12.0);
    }
}
