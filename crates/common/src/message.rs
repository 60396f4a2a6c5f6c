use std::borrow::Cow;

use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    root: Value,
}

impl Message {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self { root: Value::Null };
        }

        if let Ok(value @ (Value::Object(_) | Value::Array(_))) =
            serde_json::from_str::<Value>(trimmed)
        {
            return Self { root: value };
        }

        Self {
            root: infer_scalar(trimmed),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.root, Value::Object(_) | Value::Array(_))
    }

    pub fn resolve(&self, field: Option<&str>) -> Option<&Value> {
        let Some(path) = field else {
            return Some(&self.root);
        };
        if path.is_empty() {
            return None;
        }
        path.split('.')
            .try_fold(&self.root, |current, part| current.as_object()?.get(part))
    }
}

fn infer_scalar(text: &str) -> Value {
    if text.contains('.') {
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }

    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    Value::String(text.to_string())
}

pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

pub fn text_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Null => Cow::Borrowed("null"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => text_form(actual) == text_form(expected),
    }
}
