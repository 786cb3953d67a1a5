use std::hash::{Hash, Hasher};

/// An attribute value. Mirrors the literal grammar of the knowledge-base
/// text format: integers, floats, booleans, quoted/bare strings, and the
/// `NIL` sentinel.
///
/// `NIL` is a value in its own right, distinct from "attribute absent" —
/// an attribute can be explicitly set to `NIL` (e.g. by arithmetic with a
/// missing operand) and later read back as `NIL`.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Nil,
}

impl Value {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// True division arithmetic — division always produces a float result,
    /// never integer truncation. Returns `Nil` if either
    /// operand is `Nil`; the caller is responsible for rejecting
    /// non-numeric operands before calling this.
    pub fn apply_numeric(op: char, a: &Value, b: &Value) -> Value {
        if matches!(a, Value::Nil) || matches!(b, Value::Nil) {
            return Value::Nil;
        }
        let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
        let result = match op {
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            '/' => a / b,
            _ => unreachable!("unsupported arithmetic operator {op}"),
        };
        Value::Float(result)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64).to_bits() == b.to_bits()
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(i) => {
                0u8.hash(state);
                (*i as f64).to_bits().hash(state);
            }
            Value::Float(f) => {
                0u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Value::Nil => 3u8.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "NIL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// Casts a raw knowledge-base token into a [`Value`]: `NIL` → `Nil`, a
/// double-quoted string → `Str` with the quotes stripped, `True`/`False` →
/// `Bool`, an integer or float token → `Int`/`Float`, anything else →
/// `Str` (bare-token passthrough).
///
/// Shared by `wm-kb`'s parser (casting literals as they're read) and
/// `wm-core`'s evaluator (casting the non-attribute-reference side of an
/// arithmetic expression) — both need identical literal semantics, so the
/// primitive lives here rather than being duplicated.
///
/// `True`/`False` are matched exactly, case-sensitively and without
/// accepting any prefix of either word.
pub fn cast_trial(token: &str) -> Value {
    if token == "NIL" {
        return Value::Nil;
    }
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return Value::Str(token[1..token.len() - 1].to_string());
    }
    if token == "True" {
        return Value::Bool(true);
    }
    if token == "False" {
        return Value::Bool(false);
    }
    if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = token.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(token.to_string())
}
