use std::fmt;

use indexmap::IndexMap;
use trellis_template::Value;

/// Prefix marking keys as internal bookkeeping; writes and deletes through
/// the public API are rejected for them.
pub const RESERVED_PREFIX: char = '_';

/// Whether a write actually changed the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Changed {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsError {
    /// Attempted to set or remove a reserved (`_`-prefixed) key.
    ReservedKey { key: String },
}

impl fmt::Display for PropsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropsError::ReservedKey { key } => {
                write!(f, "no permission to mutate reserved prop key {key:?}")
            }
        }
    }
}

impl std::error::Error for PropsError {}

/// A component's reactive property map.
///
/// The original engine trapped reads/writes through a proxy; here the same
/// contract lives in explicit setters. `set` is the single authority on
/// whether a write changed anything — equal values are accepted as no-ops
/// and never reported as a change, so the owner never emits an update for
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    values: IndexMap<String, Value>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Convenience accessor for string-valued props.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Stores `value` under `key`, reporting whether the stored value
    /// actually changed. Reserved keys are rejected.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<Changed, PropsError> {
        if key.starts_with(RESERVED_PREFIX) {
            return Err(PropsError::ReservedKey { key: key.to_string() });
        }
        let value = value.into();
        if self.values.get(key) == Some(&value) {
            return Ok(Changed::No);
        }
        self.values.insert(key.to_string(), value);
        Ok(Changed::Yes)
    }

    /// Removes `key` if present. Reserved keys are rejected; removing an
    /// absent key has no effect.
    pub fn remove(&mut self, key: &str) -> Result<(), PropsError> {
        if key.starts_with(RESERVED_PREFIX) {
            return Err(PropsError::ReservedKey { key: key.to_string() });
        }
        self.values.shift_remove(key);
        Ok(())
    }

    /// Unchecked insert for the component constructor: the initial prop set
    /// and the `__id` bookkeeping entry land here without the reserved-key
    /// check and without change reporting.
    pub(crate) fn seed_internal(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, value) in iter {
            props.values.insert(key.into(), value.into());
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::{Changed, Props, PropsError};
    use trellis_template::Value;

    #[test]
    fn set_reports_change_only_on_real_difference() {
        let mut props = Props::new();
        assert_eq!(props.set("text", "a"), Ok(Changed::Yes));
        assert_eq!(props.set("text", "a"), Ok(Changed::No));
        assert_eq!(props.set("text", "b"), Ok(Changed::Yes));
        assert_eq!(props.get_str("text"), Some("b"));
    }

    #[test]
    fn reserved_keys_reject_set_and_remove() {
        let mut props = Props::new();
        props.seed_internal("__id", 3i64);
        assert_eq!(
            props.set("__id", 4i64),
            Err(PropsError::ReservedKey { key: "__id".to_string() })
        );
        assert_eq!(
            props.set("_anything", "x"),
            Err(PropsError::ReservedKey { key: "_anything".to_string() })
        );
        assert_eq!(
            props.remove("__id"),
            Err(PropsError::ReservedKey { key: "__id".to_string() })
        );
        assert_eq!(props.get("__id"), Some(&Value::Int(3)));
    }

    #[test]
    fn remove_is_a_no_op_for_absent_keys() {
        let mut props = Props::new();
        assert_eq!(props.remove("ghost"), Ok(()));
    }
}
