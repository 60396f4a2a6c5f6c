use std::sync::Arc;
use super::worker_metrics::WorkerMetrics;

pub fn render_prometheus(m: &Arc<WorkerMetrics>) -> String {
    let mut out = String::with_capacity(1024);

    write_counter(&mut out, "tripwire_worker_messages_received_total", m.messages_received_val());
    write_counter(&mut out, "tripwire_worker_rules_evaluated_total", m.rules_evaluated_val());
    write_counter(&mut out, "tripwire_worker_rules_matched_total", m.rules_matched_val());
    write_counter(&mut out, "tripwire_worker_rule_faults_total", m.rule_faults_val());
    write_counter(&mut out, "tripwire_worker_notifications_throttled_total", m.notifications_throttled_val());
    write_counter(&mut out, "tripwire_worker_notifications_sent_total", m.notifications_sent_val());
    write_counter(&mut out, "tripwire_worker_notifications_failed_total", m.notifications_failed_val());
    write_counter(&mut out, "tripwire_worker_subscribe_failures_total", m.subscribe_failures_val());
    write_counter(&mut out, "tripwire_worker_reconcile_runs_total", m.reconcile_runs_val());
    write_gauge(&mut out, "tripwire_worker_active_subscriptions", m.active_subscriptions_val());

    let (sum, count) = m.processing_latency_vals();
    write_summary(&mut out, "tripwire_worker_processing_latency_us", sum, count);

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_gauge(out: &mut String, name: &str, val: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {val}");
}

fn write_summary(out: &mut String, name: &str, sum: u64, count: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} summary");
    let _ = writeln!(out, "{name}_sum {sum}");
    let _ = writeln!(out, "{name}_count {count}");
}
