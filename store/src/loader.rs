//! Schema document loading.
//!
//! A schema document is JSON, or YAML when the file extension is `.yml` or
//! `.yaml`. Both map onto the same [`Project`] model, including its field
//! aliases (`database` for `dialect`, `kind` for a validation's `type`).

use std::io::BufReader;
use std::path::Path;

use crudgen_core::Project;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Document format of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_store::SchemaFormat;
    ///
    /// assert_eq!(SchemaFormat::from_path("shop.json").unwrap(), SchemaFormat::Json);
    /// assert_eq!(SchemaFormat::from_path("shop.YML").unwrap(), SchemaFormat::Yaml);
    /// assert!(SchemaFormat::from_path("shop.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yml" | "yaml") => Ok(Self::Yaml),
            _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Loads a project from a schema file.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedFormat`] for an unknown extension,
/// [`StoreError::IoError`] if the file cannot be read, or a JSON/YAML error if
/// the document does not describe a project.
pub fn load_project(path: impl AsRef<Path>) -> Result<Project> {
    let path = path.as_ref();
    let format = SchemaFormat::from_path(path)?;
    debug!("Loading {:?} schema from {}", format, path.display());

    let reader = BufReader::new(std::fs::File::open(path)?);
    let project: Project = match format {
        SchemaFormat::Json => serde_json::from_reader(reader)?,
        SchemaFormat::Yaml => serde_yaml::from_reader(reader)?,
    };

    info!(
        "Loaded project \"{}\" with {} entities",
        project.name,
        project.entities.len()
    );
    Ok(project)
}

/// Parses a project from document text.
///
/// # Errors
///
/// Returns a JSON/YAML error if the text does not describe a project.
pub fn parse_project(text: &str, format: SchemaFormat) -> Result<Project> {
    let project = match format {
        SchemaFormat::Json => serde_json::from_str(text)?,
        SchemaFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "name": "Shop",
        "database": "mysql",
        "entities": [{
            "name": "User",
            "properties": [
                {"name": "Id", "column": "ID", "primitive": "int", "isPrimaryKey": true},
                {"name": "Email", "column": "EMAIL", "primitive": "string",
                 "validations": [{"kind": "required", "depends": {"on": "Email", "when": "filled"}}]}
            ],
            "preInserts": [{"property": "Email", "set": "\"none\""}]
        }]
    }"#;

    #[test]
    fn test_parse_json_with_aliases() {
        let project = parse_project(JSON, SchemaFormat::Json).unwrap();
        assert_eq!(project.dialect, "mysql");
        let user = &project.entities[0];
        assert!(user.properties[0].is_primary_key);
        assert!(!user.properties[1].is_primary_key);
        assert_eq!(user.properties[1].validations[0].kind, "required");
        assert_eq!(user.properties[1].validations[0].depends.as_ref().unwrap().when, "filled");
        assert_eq!(user.pre_inserts[0].set, "\"none\"");
        assert!(user.pre_updates.is_empty());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
name: Shop
dialect: oracle
entities:
  - name: Order
    properties:
      - { name: Id, column: ID, primitive: int, isPrimaryKey: true }
      - { name: Total, column: TOTAL, primitive: decimal, validations: [{ type: positive }] }
"#;
        let project = parse_project(yaml, SchemaFormat::Yaml).unwrap();
        assert_eq!(project.dialect, "oracle");
        assert_eq!(project.entities[0].properties[1].validations[0].kind, "positive");
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_project("{\"name\": ", SchemaFormat::Json).unwrap_err();
        assert!(matches!(err, StoreError::JsonError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        std::fs::write(&path, JSON).unwrap();
        let project = load_project(&path).unwrap();
        assert_eq!(project.name, "Shop");

        let missing = load_project(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, StoreError::IoError(_)));
    }
}
