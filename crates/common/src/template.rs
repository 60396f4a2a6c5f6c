use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::message::{text_form, Message};

pub fn render(template: &str, message: &Message) -> String {
    let vars = variables(message);
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match vars.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

pub fn variables(message: &Message) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    match message.root() {
        Value::Object(map) => flatten(map, "", &mut vars),
        Value::Array(_) => {}
        scalar => {
            vars.insert("value".to_string(), text_form(scalar).into_owned());
        }
    }
    vars
}

fn flatten(map: &Map<String, Value>, prefix: &str, vars: &mut HashMap<String, String>) {
    for (name, value) in map {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        match value {
            Value::Object(inner) => flatten(inner, &key, vars),
            other => {
                vars.insert(key, text_form(other).into_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_top_level_and_nested_fields() {
        let msg = Message::parse(r#"{"host": "web-1", "system": {"cpu": {"usage": 91.5}}}"#);
        let out = render("CPU on ${host} at ${system.cpu.usage}%", &msg);
        assert_eq!(out, "CPU on web-1 at 91.5%");
    }

    #[test]
    fn scalar_message_exposes_value() {
        let msg = Message::parse("8");
        assert_eq!(render("value is ${value}", &msg), "value is 8");

        let msg = Message::parse("disk almost full");
        assert_eq!(render("[${value}]", &msg), "[disk almost full]");
    }

    #[test]
    fn unresolved_placeholders_are_kept() {
        let msg = Message::parse(r#"{"cpu": 85}"#);
        assert_eq!(
            render("cpu=${cpu} mem=${memory} v=${value}", &msg),
            "cpu=85 mem=${memory} v=${value}"
        );
    }

    #[test]
    fn unterminated_placeholder_is_verbatim() {
        let msg = Message::parse(r#"{"cpu": 85}"#);
        assert_eq!(render("cpu=${cpu} and ${oops", &msg), "cpu=85 and ${oops");
    }

    #[test]
    fn arrays_render_as_json() {
        let msg = Message::parse(r#"{"tags": ["a", "b"], "ok": true, "gone": null}"#);
        assert_eq!(
            render("${tags} ${ok} ${gone}", &msg),
            r#"["a","b"] true null"#
        );
    }

    #[test]
    fn array_message_has_no_variables() {
        let msg = Message::parse("[1, 2]");
        assert!(variables(&msg).is_empty());
        assert_eq!(render("${value}", &msg), "${value}");
    }

    #[test]
    fn plain_text_passes_through() {
        let msg = Message::parse("1");
        assert_eq!(render("no placeholders $ here {}", &msg), "no placeholders $ here {}");
    }
}
