#[cfg(test)]
mod tests {
    use comfy_table::Cell;

    use crate::cmd::helpers::metric_value;
    use crate::cmd::throttle::human_period;
    use crate::output::{emit, enabled_cell, new_table, print_json, OutputMode};

    #[test]
    fn json_flag_selects_mode() {
        assert_eq!(OutputMode::from_flag(true), OutputMode::Json);
        assert!(OutputMode::from_flag(false).is_human());
        assert!(!OutputMode::Json.is_human());
    }

    #[test]
    fn print_json_valid() {
        let val = serde_json::json!({"topics": ["metrics.cpu"]});
        assert!(print_json(&val).is_ok());
    }

    #[test]
    fn emit_skips_human_renderer_in_json_mode() {
        let mut rendered = false;
        emit(OutputMode::Json, &serde_json::json!({"ok": true}), |_| rendered = true).unwrap();
        assert!(!rendered);

        emit(OutputMode::Human, &serde_json::json!({"ok": true}), |v| {
            rendered = v["ok"].as_bool().unwrap_or(false)
        })
        .unwrap();
        assert!(rendered);
    }

    #[test]
    fn table_headers_are_uppercased() {
        let mut table = new_table(&["Topic", "State"]);
        table.add_row(vec![Cell::new("metrics.cpu"), enabled_cell(true)]);
        table.add_row(vec![Cell::new("metrics.mem"), enabled_cell(false)]);
        let rendered = table.to_string();
        assert!(rendered.contains("TOPIC"));
        assert!(rendered.contains("metrics.cpu"));
        assert!(rendered.contains("on"));
        assert!(rendered.contains("off"));
    }

    #[test]
    fn human_period_picks_largest_unit() {
        assert_eq!(human_period(300), "5m");
        assert_eq!(human_period(7200), "2h");
        assert_eq!(human_period(45), "45s");
        assert_eq!(human_period(0), "unlimited");
    }

    #[test]
    fn metric_value_reads_exposition() {
        let text = "# TYPE tripwire_worker_notifications_sent_total counter\n\
                    tripwire_worker_notifications_sent_total 7\n\
                    # TYPE tripwire_worker_processing_latency_us summary\n\
                    tripwire_worker_processing_latency_us_sum 120\n";
        assert_eq!(metric_value(text, "tripwire_worker_notifications_sent_total"), Some(7.0));
        assert_eq!(metric_value(text, "tripwire_worker_processing_latency_us"), None);
        assert_eq!(metric_value(text, "tripwire_worker_processing_latency_us_sum"), Some(120.0));
    }
}
