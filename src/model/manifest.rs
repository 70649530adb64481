//! Addon manifest (`manifest.json`) types.
//!
//! Mirrors the Bedrock manifest layout closely enough to round-trip the
//! fields the merge engine reads and writes: header identity, modules and
//! dependencies. Versions serialize as `[major, minor, patch]` arrays but
//! also accept the `"1.2.3"` string form newer manifests use.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::addon::LoadedAddon;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A `major.minor.patch` triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub [u32; 3]);

impl Version {
    /// Build a version from its three components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self([major, minor, patch])
    }

    /// Parse a dotted version string.
    ///
    /// Exactly three components are required. A component that is not a
    /// number reads as 0, so `"1.x.3"` parses as `1.0.3`. A pre-release
    /// suffix on the last component (`"1.8.0-beta"`) is ignored.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        fn num(part: &str) -> u32 {
            part.trim().parse().unwrap_or(0)
        }

        let parts: Vec<&str> = s.trim().split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return None;
        };
        let patch = patch.split(['-', '+']).next().unwrap_or_default();
        Some(Self([num(major), num(minor), num(patch)]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{major}.{minor}.{patch}")
    }
}

impl From<[u32; 3]> for Version {
    fn from(parts: [u32; 3]) -> Self {
        Self(parts)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Array([u32; 3]),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Array(parts) => Ok(Self(parts)),
            Repr::Text(s) => Self::parse(&s).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid version string '{s}'"))
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// A parsed `manifest.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonManifest {
    /// Manifest schema version (2 for current packs).
    pub format_version: u32,
    /// Pack identity.
    pub header: ManifestHeader,
    /// Capability units the pack declares.
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
    /// Packs or modules this pack requires. Omitted entirely when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<ManifestDependency>>,
}

/// Pack identity fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Pack UUID.
    pub uuid: String,
    /// Pack version.
    pub version: Version,
    /// Oldest game version the pack supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_engine_version: Option<Version>,
}

/// One manifest module entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModule {
    /// Module type: `data`, `resources`, `script`, ...
    #[serde(rename = "type")]
    pub module_type: String,
    /// Module UUID.
    pub uuid: String,
    /// Module version.
    pub version: Version,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Script entry point, for `script` modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    /// Script language, for `script` modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ManifestModule {
    /// Module type of script modules.
    pub const SCRIPT: &'static str = "script";

    /// Create a module with no description or entry point.
    pub fn new(module_type: impl Into<String>, uuid: impl Into<String>, version: Version) -> Self {
        Self {
            module_type: module_type.into(),
            uuid: uuid.into(),
            version,
            description: None,
            entry: None,
            language: None,
        }
    }
}

/// One manifest dependency entry.
///
/// Pack dependencies name a `uuid`; script API dependencies name a
/// `module_name` instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependency {
    /// UUID of the required pack or module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Script module name (`@minecraft/server`), for API dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Required version.
    pub version: Version,
}

impl ManifestDependency {
    /// Create a UUID dependency.
    pub fn new(uuid: impl Into<String>, version: Version) -> Self {
        Self {
            uuid: Some(uuid.into()),
            module_name: None,
            version,
        }
    }

    /// De-duplication key: the UUID (or module name) plus the version.
    #[must_use]
    pub fn key(&self) -> (Option<&str>, Option<&str>, Version) {
        (
            self.uuid.as_deref(),
            self.module_name.as_deref(),
            self.version,
        )
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for AddonManifest {
    fn default() -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            header: ManifestHeader::default(),
            modules: Vec::new(),
            dependencies: None,
        }
    }
}

impl AddonManifest {
    /// Manifest schema version written for generated manifests.
    pub const FORMAT_VERSION: u32 = 2;

    /// Minimum engine version written for generated manifests.
    pub const MIN_ENGINE_VERSION: Version = Version::new(1, 20, 0);

    /// Generate a fresh manifest for a merged pack.
    ///
    /// Adds a `data` module when any addon carries behavior content and a
    /// `resources` module when any carries resource content. Every UUID is
    /// newly generated.
    #[must_use]
    pub fn generate(
        name: &str,
        description: &str,
        version: Version,
        addons: &[LoadedAddon],
    ) -> Self {
        let mut modules = Vec::new();
        if addons.iter().any(|a| a.pack_type.has_behavior()) {
            modules.push(ManifestModule::new("data", new_uuid(), version));
        }
        if addons.iter().any(|a| a.pack_type.has_resources()) {
            modules.push(ManifestModule::new("resources", new_uuid(), version));
        }

        Self {
            format_version: Self::FORMAT_VERSION,
            header: ManifestHeader {
                name: name.to_owned(),
                description: description.to_owned(),
                uuid: new_uuid(),
                version,
                min_engine_version: Some(Self::MIN_ENGINE_VERSION),
            },
            modules,
            dependencies: None,
        }
    }

    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    /// Returns the `serde_json` error when the text is not a valid manifest.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize as pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::addon::{AddonFile, AddonId};

    fn addon(paths: &[&str]) -> LoadedAddon {
        let files = paths.iter().map(|p| AddonFile::new(*p, "")).collect();
        LoadedAddon::new(AddonId::new("x"), "x.mcpack", files, None)
    }

    #[test]
    fn version_parse_accepts_three_parts() {
        assert_eq!(Version::parse("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(Version::parse(" 1.0.0 "), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn version_parse_non_numeric_reads_as_zero() {
        assert_eq!(Version::parse("1.x.3"), Some(Version::new(1, 0, 3)));
    }

    #[test]
    fn version_parse_rejects_other_arity() {
        assert_eq!(Version::parse("1.2"), None);
        assert_eq!(Version::parse("1.2.3.4"), None);
    }

    #[test]
    fn version_parse_ignores_prerelease() {
        assert_eq!(Version::parse("1.8.0-beta"), Some(Version::new(1, 8, 0)));
    }

    #[test]
    fn version_serializes_as_array_and_reads_both_forms() {
        let v = Version::new(1, 2, 3);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1,2,3]");
        let from_array: Version = serde_json::from_str("[1,2,3]").unwrap();
        let from_text: Version = serde_json::from_str("\"1.2.3\"").unwrap();
        assert_eq!(from_array, v);
        assert_eq!(from_text, v);
    }

    #[test]
    fn parse_real_manifest() {
        let text = r#"{
            "format_version": 2,
            "header": {
                "name": "Pack",
                "description": "desc",
                "uuid": "aaaa",
                "version": [1, 0, 0],
                "min_engine_version": [1, 20, 0]
            },
            "modules": [
                { "type": "data", "uuid": "bbbb", "version": [1, 0, 0] },
                { "type": "script", "uuid": "cccc", "version": [1, 0, 0],
                  "language": "javascript", "entry": "scripts/index.js" }
            ],
            "dependencies": [
                { "uuid": "dddd", "version": [1, 0, 0] },
                { "module_name": "@minecraft/server", "version": "1.8.0" }
            ]
        }"#;
        let m = AddonManifest::from_json(text).unwrap();
        assert_eq!(m.header.name, "Pack");
        assert_eq!(m.modules.len(), 2);
        assert_eq!(m.modules[1].entry.as_deref(), Some("scripts/index.js"));
        let deps = m.dependencies.unwrap();
        assert_eq!(deps[1].module_name.as_deref(), Some("@minecraft/server"));
        assert_eq!(deps[1].version, Version::new(1, 8, 0));
    }

    #[test]
    fn empty_dependencies_field_is_omitted() {
        let m = AddonManifest::default();
        let json = m.to_json_pretty().unwrap();
        assert!(!json.contains("dependencies"));
    }

    #[test]
    fn generate_adds_modules_per_pack_type() {
        let addons = vec![addon(&["entities/a.json"]), addon(&["textures/a.png"])];
        let m = AddonManifest::generate("Merged", "d", Version::new(1, 0, 0), &addons);
        let types: Vec<_> = m.modules.iter().map(|m| m.module_type.as_str()).collect();
        assert_eq!(types, ["data", "resources"]);
        assert_eq!(m.header.min_engine_version, Some(Version::new(1, 20, 0)));
        assert_eq!(m.format_version, 2);
        assert!(m.dependencies.is_none());
        assert_ne!(m.modules[0].uuid, m.modules[1].uuid);
        assert_ne!(m.header.uuid, m.modules[0].uuid);
    }

    #[test]
    fn generate_behavior_only() {
        let addons = vec![addon(&["functions/x.mcfunction"])];
        let m = AddonManifest::generate("Merged", "d", Version::new(1, 0, 0), &addons);
        assert_eq!(m.modules.len(), 1);
        assert_eq!(m.modules[0].module_type, "data");
    }
}
