use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table cell
///
/// `Coords` is the only nested value; it owns its list, so a copied table never
/// shares a coordinate list with its source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Coords(Vec<[f64; 2]>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_coords(&self) -> Option<&[[f64; 2]]> {
        match self {
            Value::Coords(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_coords_mut(&mut self) -> Option<&mut Vec<[f64; 2]>> {
        match self {
            Value::Coords(c) => Some(c),
            _ => None,
        }
    }

    /// Name of the stored type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Coords(_) => "coords",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Coords(c) => write!(f, "{:?}", c),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<[f64; 2]>> for Value {
    fn from(c: Vec<[f64; 2]>) -> Self {
        Value::Coords(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::from(3).as_float(), Some(3.0));
        assert_eq!(Value::from(2.5).as_int(), None);
        assert_eq!(Value::from(Some("x")).as_text(), Some("x"));
        assert!(Value::from(None::<f64>).is_null());
    }

    #[test]
    fn test_json_shape() {
        let cells = vec![
            Value::Null,
            Value::from(true),
            Value::from(7),
            Value::from(0.4),
            Value::from("MV Bus"),
            Value::from(vec![[0.0, 1.0], [1.0, 2.0]]),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,true,7,0.4,"MV Bus",[[0.0,1.0],[1.0,2.0]]]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }
}
