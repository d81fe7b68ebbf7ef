use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RegistryConfig;
use crate::models::{License, LicenseKind, LicenseOrigin};

/// SPDX license list and exception list, compiled into the binary.
const SPDX_DATA: &str = include_str!("../../data/spdx.json");

/// Organization-defined licenses that ship with every registry.
pub const BUILTIN_CUSTOM: &[(&str, &str)] = &[
    ("Commons-Clause", "Commons Clause License Condition v1.0"),
    ("Confluent-Community-1.0", "Confluent Community License Version 1.0"),
    ("CockroachDB-Community-1.0", "CockroachDB Community License Agreement"),
    ("Redis-Source-Available-2.0", "Redis Source Available License 2.0"),
    ("Timescale-1.0", "Timescale License Agreement"),
];

#[derive(Debug, Deserialize)]
struct SpdxData {
    licenses: Vec<SpdxEntry>,
    exceptions: Vec<SpdxEntry>,
}

#[derive(Debug, Deserialize)]
struct SpdxEntry {
    id: String,
    name: String,
    #[serde(default)]
    deprecated: bool,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("malformed embedded SPDX data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("duplicate license id '{0}'")]
    Duplicate(String),

    #[error("invalid license id '{0}': only letters, digits, '.', '-' and ':' are allowed")]
    InvalidId(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Immutable id → [`License`] lookup table. Ids are case-sensitive.
#[derive(Debug, Clone)]
pub struct LicenseRegistry {
    entries: Vec<License>,
    index: HashMap<String, usize>,
}

impl LicenseRegistry {
    /// SPDX licenses and exceptions plus [`BUILTIN_CUSTOM`].
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_config(&RegistryConfig::default())
    }

    /// Build the registry from the embedded data, the built-in custom licenses
    /// and any custom licenses declared in `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let data: SpdxData = serde_json::from_str(SPDX_DATA)?;
        let id_pattern = Regex::new(r"^[A-Za-z0-9.\-:]+$")?;

        let mut registry = LicenseRegistry {
            entries: Vec::with_capacity(data.licenses.len() + data.exceptions.len()),
            index: HashMap::new(),
        };

        for entry in data.licenses {
            if entry.deprecated && !config.include_deprecated {
                continue;
            }
            registry.insert(License {
                id: entry.id,
                name: entry.name,
                origin: LicenseOrigin::Spdx,
                kind: LicenseKind::License,
                deprecated: entry.deprecated,
            })?;
        }

        for entry in data.exceptions {
            registry.insert(License {
                id: entry.id,
                name: entry.name,
                origin: LicenseOrigin::Spdx,
                kind: LicenseKind::Exception,
                deprecated: entry.deprecated,
            })?;
        }

        let builtin = BUILTIN_CUSTOM
            .iter()
            .map(|(id, name)| License::custom(*id, *name));
        let configured = config
            .custom
            .iter()
            .map(|c| License::custom(c.id.trim(), c.name.trim()));

        for license in builtin.chain(configured) {
            if !id_pattern.is_match(&license.id) {
                return Err(RegistryError::InvalidId(license.id));
            }
            registry.insert(license)?;
        }

        tracing::debug!(
            total = registry.len(),
            spdx = registry.count_by_origin(LicenseOrigin::Spdx),
            custom = registry.count_by_origin(LicenseOrigin::Custom),
            "license registry loaded"
        );

        Ok(registry)
    }

    fn insert(&mut self, license: License) -> Result<(), RegistryError> {
        if self.index.contains_key(&license.id) {
            return Err(RegistryError::Duplicate(license.id));
        }
        self.index.insert(license.id.clone(), self.entries.len());
        self.entries.push(license);
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, id: &str) -> Option<&License> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive lookup, for "did you mean" hints only.
    pub fn suggest(&self, id: &str) -> Option<&License> {
        self.entries.iter().find(|l| l.id.eq_ignore_ascii_case(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &License> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn count_by_origin(&self, origin: LicenseOrigin) -> usize {
        self.entries.iter().filter(|l| l.origin == origin).count()
    }
}
