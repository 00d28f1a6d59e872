use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variables applied to an application, keyed by variable name.
#[derive(Default, PartialEq, Eq, Clone, Debug)]
pub struct ProfileSettings {
    values: BTreeMap<String, String>,
}

impl ProfileSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the previous value if the key was already present.
    pub fn insert(&mut self, key: &str, value: &str) -> Option<String> {
        self.values.insert(key.to_string(), value.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'de> Deserialize<'de> for ProfileSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ProfileSettingsVisitor)
    }
}

/// Accepts a `settings:` section left empty (only comments below it) as an
/// empty mapping. The section itself is still required.
pub(crate) fn deserialize_section<'de, D>(deserializer: D) -> Result<ProfileSettings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ProfileSettings>::deserialize(deserializer)?.unwrap_or_default())
}

struct ProfileSettingsVisitor;

impl<'de> Visitor<'de> for ProfileSettingsVisitor {
    type Value = ProfileSettings;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of setting names to scalar values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut settings = ProfileSettings::new();
        while let Some(key) = map.next_key::<String>()? {
            // Plain scalars arrive as written: `3.10` stays `3.10`, `true` stays `true`.
            let value = map.next_value::<Option<String>>().map_err(|_| {
                <A::Error as de::Error>::custom(format!("setting `{key}` must be a scalar value"))
            })?;
            if settings.values.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate setting `{key}`")));
            }
            let value = value.ok_or_else(|| {
                <A::Error as de::Error>::custom(format!("setting `{key}` has no value"))
            })?;
            settings.values.insert(key, value);
        }
        Ok(settings)
    }
}
