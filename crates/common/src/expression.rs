use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    All(Vec<Expression>),
    Any(Vec<Expression>),
    Predicate(Predicate),
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: Option<String>,
    pub test: Test,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Compare(Comparison, f64),
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    Contains(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Comparison {
    pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
    Leaf(LeafOperator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafOperator {
    Compare(Comparison),
    Eq,
    Ne,
    In,
    Contains,
}

impl Operator {
    fn from_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix('$').unwrap_or(key);
        let op = match name {
            "and" => Self::And,
            "or" => Self::Or,
            "gt" => Self::Leaf(LeafOperator::Compare(Comparison::GreaterThan)),
            "gte" => Self::Leaf(LeafOperator::Compare(Comparison::GreaterOrEqual)),
            "lt" => Self::Leaf(LeafOperator::Compare(Comparison::LessThan)),
            "lte" => Self::Leaf(LeafOperator::Compare(Comparison::LessOrEqual)),
            "eq" => Self::Leaf(LeafOperator::Eq),
            "ne" => Self::Leaf(LeafOperator::Ne),
            "in" => Self::Leaf(LeafOperator::In),
            "contains" => Self::Leaf(LeafOperator::Contains),
            _ => return None,
        };
        Some(op)
    }
}

impl Expression {
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::Object(map) => parse_map(map),
            other => Self::Unsupported(format!("rule must be an object, got {}", kind_of(other))),
        }
    }

    pub fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_problems(&mut out);
        out
    }

    pub fn is_valid(&self) -> bool {
        self.problems().is_empty()
    }

    fn collect_problems(&self, out: &mut Vec<String>) {
        match self {
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_problems(out);
                }
            }
            Self::Predicate(_) => {}
            Self::Unsupported(reason) => out.push(reason.clone()),
        }
    }
}

fn parse_map(map: &Map<String, Value>) -> Expression {
    let mut entries: Vec<Expression> = map
        .iter()
        .map(|(key, arg)| parse_entry(key, arg))
        .collect();

    if entries.len() == 1 {
        entries.remove(0)
    } else {
        Expression::All(entries)
    }
}

fn parse_entry(key: &str, arg: &Value) -> Expression {
    let Some(op) = Operator::from_key(key) else {
        return Expression::Unsupported(format!("unsupported operator '{key}'"));
    };

    match op {
        Operator::And => parse_children(key, arg).map_or_else(|e| e, Expression::All),
        Operator::Or => parse_children(key, arg).map_or_else(|e| e, Expression::Any),
        Operator::Leaf(leaf) => parse_predicate(key, leaf, arg).unwrap_or_else(Expression::Unsupported),
    }
}

fn parse_children(key: &str, arg: &Value) -> Result<Vec<Expression>, Expression> {
    let Value::Array(items) = arg else {
        return Err(Expression::Unsupported(format!(
            "'{key}' expects an array of conditions, got {}",
            kind_of(arg)
        )));
    };
    Ok(items.iter().map(Expression::parse).collect())
}

fn parse_predicate(key: &str, op: LeafOperator, arg: &Value) -> Result<Expression, String> {
    let Value::Object(args) = arg else {
        return Err(format!("'{key}' expects an object argument, got {}", kind_of(arg)));
    };

    let field = match argument(args, "field") {
        None => None,
        Some(Value::String(f)) => Some(f.clone()),
        Some(other) => {
            return Err(format!("'{key}' field must be a string, got {}", kind_of(other)));
        }
    };

    let test = match op {
        LeafOperator::Compare(cmp) => {
            let threshold = argument(args, "value")
                .and_then(numeric_operand)
                .ok_or_else(|| format!("'{key}' requires a numeric value"))?;
            Test::Compare(cmp, threshold)
        }
        LeafOperator::Eq => Test::Equals(required_value(key, args)?),
        LeafOperator::Ne => Test::NotEquals(required_value(key, args)?),
        LeafOperator::In => match argument(args, "values") {
            Some(Value::Array(values)) => Test::In(values.clone()),
            _ => return Err(format!("'{key}' requires a values array")),
        },
        LeafOperator::Contains => match argument(args, "value") {
            Some(Value::String(needle)) => Test::Contains(needle.clone()),
            _ => return Err(format!("'{key}' requires a string value")),
        },
    };

    Ok(Expression::Predicate(Predicate { field, test }))
}

fn argument<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    args.get(&format!("${name}")).or_else(|| args.get(name))
}

fn required_value(key: &str, args: &Map<String, Value>) -> Result<Value, String> {
    match argument(args, "value") {
        Some(Value::Null) | None => Err(format!("'{key}' requires a value")),
        Some(v) => Ok(v.clone()),
    }
}

fn numeric_operand(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
