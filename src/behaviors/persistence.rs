use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::events::{Binding, EventKind, ListenTarget};
use crate::host::Host;
use crate::{Error, Result};

/// Name to value of every named form control, as stored in local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSnapshot {
    values: BTreeMap<String, String>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| Error::MalformedSnapshot(err.to_string()))
    }

    /// Parses a stored record. Strings are taken as is; numbers and booleans
    /// are stringified the way a browser assigns them to `value`, and `null`
    /// becomes the empty string. Nested entries are skipped. Only a record
    /// that is not a JSON object is rejected.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: Value =
            serde_json::from_str(raw).map_err(|err| Error::MalformedSnapshot(err.to_string()))?;
        let Value::Object(entries) = parsed else {
            return Err(Error::MalformedSnapshot(
                "stored parameters are not a JSON object".into(),
            ));
        };

        let mut snapshot = Self::new();
        for (name, value) in entries {
            let value = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    trace!(%name, "skipping nested parameter");
                    continue;
                }
            };
            snapshot.insert(name, value);
        }
        Ok(snapshot)
    }
}

impl FromIterator<(String, String)> for ParameterSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Saves named form controls on every input and restores them at startup.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    key: String,
    selector: String,
}

impl ParameterStore {
    pub fn new(key: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selector: selector.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bind<H: Host>(&self, host: &mut H) -> Result<()> {
        host.listen(
            ListenTarget::Document,
            EventKind::Input,
            Binding::SaveParameters,
        )
    }

    /// Controls without a `name` (or with an empty one) are skipped; the
    /// later of two controls sharing a name wins.
    pub fn snapshot<H: Host>(&self, host: &H) -> Result<ParameterSnapshot> {
        let mut snapshot = ParameterSnapshot::new();
        for control in host.query_all(&self.selector)? {
            let Some(name) = host.attribute(&control, "name").filter(|name| !name.is_empty())
            else {
                continue;
            };
            snapshot.insert(name, host.value(&control)?);
        }
        Ok(snapshot)
    }

    pub fn save<H: Host>(&self, host: &mut H) -> Result<()> {
        let snapshot = self.snapshot(host)?;
        let record = snapshot.to_json()?;
        host.storage_set(&self.key, &record)?;
        trace!(key = %self.key, entries = snapshot.len(), "saved parameters");
        Ok(())
    }

    /// Restores stored values onto matching controls and returns how many
    /// were applied. An absent record restores nothing; a malformed one
    /// fails before any control is touched.
    pub fn load<H: Host>(&self, host: &mut H) -> Result<usize> {
        let Some(record) = host.storage_get(&self.key)? else {
            return Ok(0);
        };
        let snapshot = ParameterSnapshot::from_json(&record)?;

        let controls = host.query_all(&self.selector)?;
        let mut applied = 0;
        for (name, value) in snapshot.iter() {
            let control = controls
                .iter()
                .find(|control| host.attribute(control, "name").as_deref() == Some(name))
                .cloned();
            if let Some(control) = control {
                host.set_value(&control, value)?;
                applied += 1;
            }
        }
        debug!(applied, stored = snapshot.len(), "restored parameters");
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_values_are_stringified() -> Result<()> {
        let snapshot = ParameterSnapshot::from_json(r#"{"n":5,"ratio":0.5,"on":true,"s":"x"}"#)?;
        assert_eq!(snapshot.get("n"), Some("5"));
        assert_eq!(snapshot.get("ratio"), Some("0.5"));
        assert_eq!(snapshot.get("on"), Some("true"));
        assert_eq!(snapshot.get("s"), Some("x"));
        Ok(())
    }

    #[test]
    fn null_clears_and_nested_entries_are_skipped() -> Result<()> {
        let snapshot =
            ParameterSnapshot::from_json(r#"{"a":{"b":1},"c":[1],"d":null,"e":"kept"}"#)?;
        assert_eq!(snapshot.get("a"), None);
        assert_eq!(snapshot.get("c"), None);
        assert_eq!(snapshot.get("d"), Some(""));
        assert_eq!(snapshot.get("e"), Some("kept"));
        assert_eq!(snapshot.len(), 2);
        Ok(())
    }

    #[test]
    fn non_object_records_are_malformed() {
        for raw in ["[1,2]", "\"x\"", "null", "42", "not-json"] {
            assert!(
                matches!(ParameterSnapshot::from_json(raw), Err(Error::MalformedSnapshot(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn snapshot_serializes_as_flat_object() -> Result<()> {
        let snapshot: ParameterSnapshot = [("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(snapshot.to_json()?, r#"{"a":"1","b":"2"}"#);
        Ok(())
    }
}
