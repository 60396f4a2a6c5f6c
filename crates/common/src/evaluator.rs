use serde_json::Value;

use crate::expression::{Expression, Predicate, Test};
use crate::message::{as_number, values_equal, Message};

pub fn evaluate(expression: &Expression, message: &Message) -> bool {
    match expression {
        Expression::All(children) => children.iter().all(|c| evaluate(c, message)),
        Expression::Any(children) => children.iter().any(|c| evaluate(c, message)),
        Expression::Predicate(predicate) => evaluate_predicate(predicate, message),
        Expression::Unsupported(reason) => {
            tracing::warn!(%reason, "unsupported rule expression, treating as no match");
            false
        }
    }
}

pub fn evaluate_raw(rule: &Value, raw_message: &str) -> bool {
    evaluate(&Expression::parse(rule), &Message::parse(raw_message))
}

fn evaluate_predicate(predicate: &Predicate, message: &Message) -> bool {
    let Some(resolved) = message.resolve(predicate.field.as_deref()) else {
        return false;
    };

    match &predicate.test {
        Test::Compare(cmp, threshold) => {
            as_number(resolved).is_some_and(|v| cmp.evaluate(v, *threshold))
        }
        Test::Equals(expected) => values_equal(resolved, expected),
        Test::NotEquals(expected) => !values_equal(resolved, expected),
        Test::In(candidates) => candidates.iter().any(|c| values_equal(resolved, c)),
        Test::Contains(needle) => resolved
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matches(rule: Value, message: &str) -> bool {
        evaluate_raw(&rule, message)
    }

    #[test]
    fn scalar_message_against_fieldless_rule() {
        assert!(matches(json!({"gt": {"value": 5}}), "8"));
        assert!(!matches(json!({"gt": {"value": 5}}), "3"));
    }

    #[test]
    fn field_comparison() {
        let msg = r#"{"cpu": 85, "status": "warning"}"#;
        assert!(matches(json!({"$gt": {"$field": "cpu", "$value": 80}}), msg));
        assert!(!matches(json!({"$lt": {"$field": "cpu", "$value": 80}}), msg));
    }

    #[test]
    fn nested_field_comparison() {
        let msg = r#"{"system": {"cpu": {"usage": 90}}}"#;
        assert!(matches(
            json!({"$gt": {"$field": "system.cpu.usage", "$value": 85}}),
            msg
        ));
    }

    #[test]
    fn missing_field_is_no_match() {
        let msg = r#"{"cpu": 85}"#;
        assert!(!matches(json!({"$gt": {"$field": "memory", "$value": 80}}), msg));
        assert!(!matches(json!({"$ne": {"$field": "memory", "$value": 80}}), msg));
        assert!(!matches(json!({"$in": {"$field": "memory", "$values": [80]}}), msg));
    }

    #[test]
    fn comparison_requires_numeric_resolution() {
        assert!(!matches(json!({"$gt": {"$field": "cpu", "$value": 1}}), r#"{"cpu": "85"}"#));
        assert!(!matches(json!({"$gt": {"$value": 1}}), "hello"));
        assert!(!matches(json!({"$gt": {"$value": 0}}), "true"));
        assert!(!matches(json!({"$gt": {"$field": "cpu", "$value": 1}}), r#"{"cpu": null}"#));
    }

    #[test]
    fn equality_is_type_aware() {
        let msg = r#"{"status": "warning", "code": 500, "ok": false}"#;
        assert!(matches(json!({"$eq": {"$field": "status", "$value": "warning"}}), msg));
        assert!(!matches(json!({"$eq": {"$field": "status", "$value": "WARNING"}}), msg));
        assert!(matches(json!({"$eq": {"$field": "code", "$value": 500.0}}), msg));
        assert!(matches(json!({"$eq": {"$field": "code", "$value": "500"}}), msg));
        assert!(matches(json!({"$eq": {"$field": "ok", "$value": false}}), msg));
        assert!(matches(json!({"$ne": {"$field": "status", "$value": "ok"}}), msg));
        assert!(!matches(json!({"$ne": {"$field": "code", "$value": 500}}), msg));
    }

    #[test]
    fn equality_on_scalar_messages() {
        assert!(matches(json!({"$eq": {"$value": "hello"}}), "hello"));
        assert!(matches(json!({"$eq": {"$value": true}}), "TRUE"));
        assert!(matches(json!({"$eq": {"$value": 42.5}}), "42.5"));
    }

    #[test]
    fn membership() {
        let rule = json!({"$in": {"$field": "level", "$values": ["ERROR", "FATAL"]}});
        assert!(matches(rule.clone(), r#"{"level": "FATAL"}"#));
        assert!(!matches(rule, r#"{"level": "error"}"#));
        assert!(matches(json!({"$in": {"$values": [1, 2, 3]}}), "2"));
        assert!(!matches(json!({"$in": {"$values": []}}), "2"));
    }

    #[test]
    fn contains_is_case_insensitive_and_textual() {
        let rule = json!({"$contains": {"$field": "msg", "$value": "DISK"}});
        assert!(matches(rule.clone(), r#"{"msg": "disk full on /var"}"#));
        assert!(!matches(rule.clone(), r#"{"msg": 42}"#));
        assert!(!matches(rule, r#"{"other": "disk"}"#));
        assert!(matches(json!({"$contains": {"$value": "err"}}), "Fatal ERROR"));
    }

    #[test]
    fn implicit_and_across_entries() {
        let rule = json!({
            "$gt": {"$field": "cpu", "$value": 80},
            "$eq": {"$field": "status", "$value": "warning"}
        });
        assert!(matches(rule.clone(), r#"{"cpu": 85, "status": "warning"}"#));
        assert!(!matches(rule, r#"{"cpu": 85, "status": "ok"}"#));
    }

    #[test]
    fn and_or_combinators() {
        let rule = json!({"$or": [
            {"$gt": {"$field": "cpu", "$value": 90}},
            {"$and": [
                {"$gt": {"$field": "cpu", "$value": 70}},
                {"$eq": {"$field": "env", "$value": "prod"}}
            ]}
        ]});
        assert!(matches(rule.clone(), r#"{"cpu": 95, "env": "dev"}"#));
        assert!(matches(rule.clone(), r#"{"cpu": 75, "env": "prod"}"#));
        assert!(!matches(rule, r#"{"cpu": 75, "env": "dev"}"#));
    }

    #[test]
    fn empty_combinators() {
        assert!(matches(json!({"$and": []}), "1"));
        assert!(!matches(json!({"$or": []}), "1"));
    }

    #[test]
    fn unknown_operator_fails_closed() {
        assert!(!matches(json!({"$regex": {"$value": ".*"}}), "anything"));
        assert!(!matches(
            json!({"$or": [{"$bogus": {}}, {"$lt": {"$value": 0}}]}),
            "5"
        ));
        assert!(matches(
            json!({"$or": [{"$bogus": {}}, {"$gt": {"$value": 0}}]}),
            "5"
        ));
    }

    #[test]
    fn malformed_messages_never_match_field_rules() {
        let rule = json!({"$gt": {"$field": "cpu", "$value": 1}});
        for raw in ["", "{not json", "[1, 2]", "null", "\"cpu\"", "{\"cpu\": [5]}"] {
            assert!(!matches(rule.clone(), raw), "unexpected match for {raw:?}");
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let expr = Expression::parse(&json!({"$gte": {"$field": "a.b", "$value": 3}}));
        let msg = Message::parse(r#"{"a": {"b": 3}}"#);
        let first = evaluate(&expr, &msg);
        for _ in 0..10 {
            assert_eq!(evaluate(&expr, &msg), first);
        }
        assert!(first);
    }
}
