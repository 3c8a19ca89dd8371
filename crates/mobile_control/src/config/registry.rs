//! App name to package identifier mapping
//!
//! The registry is a JSON object on disk:
//!
//! ```json
//! { "YouTube": "com.google.android.youtube", "Chrome": "com.android.chrome" }
//! ```
//!
//! It is read once when the controller is built and never changes afterwards.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{DeviceError, Result};

/// Read-only lookup table from human-readable app names to package identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRegistry {
    apps: BTreeMap<String, String>,
}

/// JSON object that refuses repeated keys instead of keeping the last one
struct UniqueEntries(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for UniqueEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = UniqueEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping app names to package identifiers")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut apps = BTreeMap::new();
                while let Some((name, package)) = access.next_entry::<String, String>()? {
                    if apps.contains_key(&name) {
                        return Err(de::Error::custom(format!("duplicate app name `{}`", name)));
                    }
                    apps.insert(name, package);
                }
                Ok(UniqueEntries(apps))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl AppRegistry {
    /// Load the registry from a JSON file
    ///
    /// A missing file or malformed JSON is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DeviceError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;

        let UniqueEntries(apps) =
            serde_json::from_str(&contents).map_err(|source| DeviceError::RegistryFormat {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Loaded {} app entries from {}", apps.len(), path.display());
        Ok(Self { apps })
    }

    /// Build a registry from in-memory pairs; later duplicates replace earlier ones
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            apps: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the package identifier registered for an app name
    pub fn get(&self, app_name: &str) -> Option<&str> {
        self.apps.get(app_name).map(String::as_str)
    }

    /// Like [`get`](Self::get) but failing with [`DeviceError::AppNotRegistered`]
    pub fn resolve(&self, app_name: &str) -> Result<&str> {
        self.get(app_name)
            .ok_or_else(|| DeviceError::AppNotRegistered(app_name.to_string()))
    }

    /// Reverse lookup: the registered name of a package, if any
    pub fn app_name_for(&self, package: &str) -> Option<&str> {
        self.apps
            .iter()
            .find(|(_, pkg)| pkg.as_str() == package)
            .map(|(name, _)| name.as_str())
    }

    /// `(name, package)` pairs sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.apps.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
