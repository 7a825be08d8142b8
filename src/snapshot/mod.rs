//! Pause-time views of interpreter state
//!
//! - [`output::OutputBuffer`]: everything the program printed, with a
//!   trimmable window for step events and a full transcript
//! - [`Snapshotter`]: renders the paused frame's bindings into a
//!   [`ScopeSnapshot`]

pub mod output;

use crate::memory::value::{ReprError, Value};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// Printable bindings of one frame, in binding order
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSnapshot(Vec<(String, String)>);

impl ScopeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ScopeSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ScopeSnapshot(iter.into_iter().collect())
    }
}

impl Serialize for ScopeSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScopeSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = ScopeSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of variable names to printable values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    entries.push((name, value));
                }
                Ok(ScopeSnapshot(entries))
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}

/// Renders frame bindings for step events
#[derive(Debug, Clone, Copy)]
pub struct Snapshotter {
    /// Rendered values longer than this are cut and suffixed with `...`; 0 disables
    pub max_value_chars: usize,
}

impl Snapshotter {
    pub fn new(max_value_chars: usize) -> Self {
        Snapshotter { max_value_chars }
    }

    /// Capture the user-visible bindings.
    ///
    /// Reserved `__names__` and callables are skipped. If any value fails to
    /// render the whole snapshot degrades to empty.
    pub fn capture<'a, I>(&self, bindings: I) -> ScopeSnapshot
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        match self.try_capture(bindings) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "scope snapshot failed, reporting no variables");
                ScopeSnapshot::new()
            }
        }
    }

    fn try_capture<'a, I>(&self, bindings: I) -> Result<ScopeSnapshot, ReprError>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        bindings
            .into_iter()
            .filter(|(name, value)| !name.starts_with("__") && !value.is_callable())
            .map(|(name, value)| Ok((name.to_string(), self.render(value)?)))
            .collect()
    }

    fn render(&self, value: &Value) -> Result<String, ReprError> {
        let text = value.repr()?;
        if self.max_value_chars == 0 {
            return Ok(text);
        }
        match text.char_indices().nth(self.max_value_chars) {
            Some((cut, _)) => Ok(format!("{}...", &text[..cut])),
            None => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::builtins::Builtin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_capture_skips_reserved_and_callables() {
        let name = Value::Str("__main__".to_string());
        let a = Value::Int(1);
        let f = Value::Builtin(Builtin::Len);
        let s = Value::Str("hi".to_string());
        let bindings = vec![("__name__", &name), ("a", &a), ("f", &f), ("s", &s)];

        let snapshot = Snapshotter::new(500).capture(bindings);
        let entries: Vec<(&str, &str)> = snapshot.iter().collect();
        assert_eq!(entries, vec![("a", "1"), ("s", "'hi'")]);
    }

    #[test]
    fn test_long_values_are_truncated() {
        let long = Value::Str("x".repeat(20));
        let snapshot = Snapshotter::new(5).capture(vec![("v", &long)]);
        assert_eq!(snapshot.get("v"), Some("'xxxx..."));

        let snapshot = Snapshotter::new(0).capture(vec![("v", &long)]);
        assert_eq!(snapshot.get("v").map(str::len), Some(22));
    }

    #[test]
    fn test_render_failure_degrades_to_empty() {
        let list = Value::new_list(vec![Value::Int(1)]);
        let ok = Value::Int(2);
        let snapshot = match &list {
            Value::List(items) => {
                // Holding a mutable borrow makes rendering the list fail
                let _guard = items.borrow_mut();
                Snapshotter::new(500).capture(vec![("ok", &ok), ("xs", &list)])
            }
            _ => unreachable!(),
        };
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_serializes_in_binding_order() {
        let snapshot: ScopeSnapshot = vec![
            ("zeta".to_string(), "1".to_string()),
            ("alpha".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);

        let back: ScopeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
