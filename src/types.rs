use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-?)0x([0-9a-fA-F]+)$").unwrap());
static OCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-?)0o([0-7]+)$").unwrap());
static BIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-?)0b([01]+)$").unwrap());
static INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]*\.[0-9]+(e[+-]?[0-9]+)?$").unwrap());

/// A property value decoded on demand from its stored string form
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PropertyValue {
    /// Guess the type of a stored string.
    ///
    /// Recognises `True`/`False`/`None`, hex (`0x`), octal (`0o`), binary
    /// (`0b`) and decimal integers, and decimal floats with an optional
    /// exponent. Anything else, including integers that overflow `i64`,
    /// stays a string.
    pub fn cast(raw: &str) -> Self {
        match raw {
            "True" => return PropertyValue::Bool(true),
            "False" => return PropertyValue::Bool(false),
            "None" => return PropertyValue::Null,
            _ => {}
        }

        for (regex, radix) in [(&*HEX, 16), (&*OCT, 8), (&*BIN, 2)] {
            if let Some(caps) = regex.captures(raw) {
                let negative = !caps[1].is_empty();
                return match i64::from_str_radix(&caps[2], radix) {
                    Ok(n) if negative => PropertyValue::Int(-n),
                    Ok(n) => PropertyValue::Int(n),
                    Err(_) => PropertyValue::String(raw.to_string()),
                };
            }
        }

        if INT.is_match(raw) {
            return raw
                .parse::<i64>()
                .map(PropertyValue::Int)
                .unwrap_or_else(|_| PropertyValue::String(raw.to_string()));
        }

        if FLOAT.is_match(raw) {
            if let Ok(f) = raw.parse::<f64>() {
                return PropertyValue::Float(f);
            }
        }

        PropertyValue::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Int(_) => "Int",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Bool(_) => "Bool",
            PropertyValue::Null => "Null",
        }
    }
}

impl fmt::Display for PropertyValue {
    /// Canonical stored form; `cast` of the output yields the same variant
    /// for every value except floats without a fractional part
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{:?}", v),
            PropertyValue::Bool(true) => write!(f, "True"),
            PropertyValue::Bool(false) => write!(f, "False"),
            PropertyValue::Null => write!(f, "None"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}
