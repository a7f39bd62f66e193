//! Package descriptors and the manifest key table.

use crate::error::{Error, Result};
use crate::reader::{IniReader, KeyValueReader};
use crate::version::{EngineVersion, VersionRange};
use crate::MANIFEST_FILE_NAME;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed metadata of one package.
///
/// Descriptors are read once when a session starts and never change
/// afterwards. `name` always equals the directory the package was loaded from.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Unique identifier, also the package's directory name.
    pub name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// The package's own version string. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Identifier of the game/content set this package targets.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub game: String,

    /// Engine versions this package declares itself compatible with.
    #[serde(default, skip_serializing_if = "VersionRange::is_unbounded")]
    pub engine: VersionRange,

    /// Packages that must be active and loaded before this one, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
}

/// A non-fatal problem found while reading a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestWarning {
    pub file: Utf8PathBuf,
    /// 1-based line number, when the reader knows it.
    pub line: Option<usize>,
    pub section: Option<String>,
    pub key: String,
    pub message: String,
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            return write!(f, "{}:{} '{}': {}", self.file, line, self.key, self.message);
        }
        match &self.section {
            Some(section) => write!(
                f,
                "{} [{}] '{}': {}",
                self.file, section, self.key, self.message
            ),
            None => write!(f, "{} '{}': {}", self.file, self.key, self.message),
        }
    }
}

/// A descriptor plus whatever diagnostics its manifest produced.
#[derive(Debug, Clone)]
pub struct LoadedDescriptor {
    pub descriptor: PackageDescriptor,
    /// Path of the manifest the descriptor was read from.
    pub manifest: Utf8PathBuf,
    pub warnings: Vec<ManifestWarning>,
}

type KeyHandler = fn(&mut PackageDescriptor, &str) -> std::result::Result<(), String>;

/// Known manifest keys. Anything else is reported and skipped.
const KEY_HANDLERS: &[(&str, KeyHandler)] = &[
    ("name", set_name),
    ("description", set_description),
    ("version", set_version),
    ("game", set_game),
    ("engine_min_version", set_engine_min),
    ("engine_max_version", set_engine_max),
    ("depends", add_depends),
    ("requires", add_depends),
];

fn set_name(descriptor: &mut PackageDescriptor, value: &str) -> std::result::Result<(), String> {
    if value != descriptor.name {
        return Err(format!(
            "declared name '{}' does not match directory '{}', using the directory name",
            value, descriptor.name
        ));
    }
    Ok(())
}

fn set_description(
    descriptor: &mut PackageDescriptor,
    value: &str,
) -> std::result::Result<(), String> {
    descriptor.description = value.to_string();
    Ok(())
}

fn set_version(descriptor: &mut PackageDescriptor, value: &str) -> std::result::Result<(), String> {
    descriptor.version = Some(value.to_string());
    Ok(())
}

fn set_game(descriptor: &mut PackageDescriptor, value: &str) -> std::result::Result<(), String> {
    descriptor.game = value.to_string();
    Ok(())
}

fn set_engine_min(
    descriptor: &mut PackageDescriptor,
    value: &str,
) -> std::result::Result<(), String> {
    descriptor.engine.min = Some(parse_bound(value)?);
    Ok(())
}

fn set_engine_max(
    descriptor: &mut PackageDescriptor,
    value: &str,
) -> std::result::Result<(), String> {
    descriptor.engine.max = Some(parse_bound(value)?);
    Ok(())
}

fn parse_bound(value: &str) -> std::result::Result<EngineVersion, String> {
    value
        .parse::<EngineVersion>()
        .map_err(|_| format!("'{}' is not a major.minor version, bound left open", value))
}

fn add_depends(descriptor: &mut PackageDescriptor, value: &str) -> std::result::Result<(), String> {
    for dep in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        if !descriptor.depends.iter().any(|d| d == dep) {
            descriptor.depends.push(dep.to_string());
        }
    }
    Ok(())
}

/// Check that `name` can be used as a package directory name.
pub fn validate_package_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':'])
        || name.trim() != name;
    if invalid {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

impl PackageDescriptor {
    /// A descriptor with only a name, as read from an empty manifest.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a descriptor for package `name` from manifest records.
    ///
    /// Unknown keys and unparsable values are reported as warnings, never as
    /// errors, so manifests written for newer engines still load.
    pub fn from_reader(
        name: &str,
        reader: &mut impl KeyValueReader,
    ) -> Result<(Self, Vec<ManifestWarning>)> {
        validate_package_name(name)?;

        let mut descriptor = Self::named(name);
        let mut warnings = Vec::new();

        while let Some(entry) = reader.next_entry() {
            let handler = KEY_HANDLERS
                .iter()
                .find(|(key, _)| *key == entry.key)
                .map(|(_, handler)| handler);

            let outcome = match handler {
                Some(handler) => handler(&mut descriptor, &entry.value),
                None => Err("unknown key, ignored".to_string()),
            };

            if let Err(message) = outcome {
                warnings.push(ManifestWarning {
                    file: reader.file_name().to_path_buf(),
                    line: None,
                    section: reader.section().map(str::to_string),
                    key: entry.key,
                    message,
                });
            }
        }

        warnings.extend(reader.malformed_lines().iter().map(|malformed| ManifestWarning {
            file: reader.file_name().to_path_buf(),
            line: Some(malformed.line),
            section: malformed.section.clone(),
            key: malformed.text.clone(),
            message: "no '=' separator, line ignored".to_string(),
        }));

        Ok((descriptor, warnings))
    }

    /// Load the descriptor of the package rooted at `package_dir`.
    ///
    /// The package name is the directory's file name. `Ok(None)` means the
    /// directory has no manifest and therefore is not a package.
    pub fn load(package_dir: &Utf8Path) -> Result<Option<LoadedDescriptor>> {
        let name = package_dir
            .file_name()
            .ok_or_else(|| Error::InvalidName(package_dir.to_string()))?;
        let manifest = package_dir.join(MANIFEST_FILE_NAME);

        if !manifest.as_std_path().is_file() {
            tracing::debug!("Directory '{}' has no {}", package_dir, MANIFEST_FILE_NAME);
            return Ok(None);
        }

        let mut reader = IniReader::open(&manifest)?;
        let (descriptor, warnings) = Self::from_reader(name, &mut reader)?;
        for warning in &warnings {
            tracing::warn!("Package '{}': {}", name, warning);
        }

        Ok(Some(LoadedDescriptor {
            descriptor,
            manifest,
            warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(name: &str, contents: &str) -> (PackageDescriptor, Vec<ManifestWarning>) {
        let mut reader = IniReader::parse("settings.txt", contents).unwrap();
        PackageDescriptor::from_reader(name, &mut reader).unwrap()
    }

    #[test]
    fn test_full_manifest() {
        let (descriptor, warnings) = parse(
            "core",
            "name=core\n\
             description=Core campaign\n\
             version=1.2\n\
             game=flare-game\n\
             engine_min_version=0.19\n\
             engine_max_version=1.0\n\
             depends=assets\n\
             depends=music\n",
        );

        assert!(warnings.is_empty());
        assert_eq!(
            descriptor,
            PackageDescriptor {
                name: "core".to_string(),
                description: "Core campaign".to_string(),
                version: Some("1.2".to_string()),
                game: "flare-game".to_string(),
                engine: VersionRange {
                    min: Some(EngineVersion::new(0, 19)),
                    max: Some(EngineVersion::new(1, 0)),
                },
                depends: vec!["assets".to_string(), "music".to_string()],
            }
        );
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        let (descriptor, warnings) = parse("bare", "");
        assert!(warnings.is_empty());
        assert_eq!(descriptor, PackageDescriptor::named("bare"));
    }

    #[test]
    fn test_requires_is_comma_separated() {
        let (descriptor, _) = parse("ui", "requires=a, b,,c\ndepends=b\n");
        assert_eq!(descriptor.depends, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_key_warns() {
        let (descriptor, warnings) = parse("ui", "[meta]\nauthor=someone\n");
        assert_eq!(descriptor, PackageDescriptor::named("ui"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "author");
        assert_eq!(warnings[0].section.as_deref(), Some("meta"));
        assert_eq!(warnings[0].file, "settings.txt");
    }

    #[test]
    fn test_bad_version_leaves_bound_open() {
        let (descriptor, warnings) = parse("ui", "engine_min_version=latest\n");
        assert_eq!(descriptor.engine.min, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "engine_min_version");
    }

    #[test]
    fn test_name_mismatch_keeps_directory_name() {
        let (descriptor, warnings) = parse("ui", "name=interface\n");
        assert_eq!(descriptor.name, "ui");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("core").is_ok());
        assert!(validate_package_name("my mod").is_ok());
        assert!(validate_package_name("").is_err());
        assert!(validate_package_name("..").is_err());
        assert!(validate_package_name("a/b").is_err());
        assert!(validate_package_name(" core").is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let package_dir = dir.path().join("core");
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(
            package_dir.join(MANIFEST_FILE_NAME),
            "description=Core\ndepends=assets\n",
        )
        .unwrap();

        let package_dir = Utf8PathBuf::from_path_buf(package_dir).unwrap();
        let loaded = PackageDescriptor::load(&package_dir).unwrap().unwrap();
        assert_eq!(loaded.descriptor.name, "core");
        assert_eq!(loaded.descriptor.depends, vec!["assets"]);
        assert_eq!(loaded.manifest, package_dir.join(MANIFEST_FILE_NAME));
    }

    #[test]
    fn test_directory_without_manifest_is_not_a_package() {
        let dir = tempfile::tempdir().unwrap();
        let package_dir = Utf8PathBuf::from_path_buf(dir.path().join("assets")).unwrap();
        fs::create_dir_all(&package_dir).unwrap();

        assert!(PackageDescriptor::load(&package_dir).unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_does_not_hide_depends() {
        let (descriptor, warnings) = parse(
            "core",
            "description=Core\nthis line has no separator\ndepends=assets\n",
        );

        assert_eq!(descriptor.description, "Core");
        assert_eq!(descriptor.depends, vec!["assets"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, Some(2));
        assert_eq!(warnings[0].key, "this line has no separator");
        assert_eq!(
            warnings[0].to_string(),
            "settings.txt:2 'this line has no separator': no '=' separator, line ignored"
        );
    }

    #[test]
    fn test_json_skips_empty_fields() {
        let json = serde_json::to_string(&PackageDescriptor::named("core")).unwrap();
        assert_eq!(json, r#"{"name":"core"}"#);
    }
}
