use std::path::Path;

use crudgen_core::validate_project;
use crudgen_store::{
    load_project, persist, GenerationConfig, Manifest, StoreError, MANIFEST_FILE,
};
use crudgen_synth::{synthesize, ArtifactKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SHOP_YAML: &str = r#"
name: Shop
dialect: postgresql
entities:
  - name: Customer
    properties:
      - { name: Id, column: CUSTOMER_ID, primitive: int, isPrimaryKey: true }
      - name: Email
        column: EMAIL
        primitive: string
        validations:
          - type: required
          - { type: email, depends: { on: email, when: Filled } }
      - { name: CreatedAt, column: CREATED_AT, primitive: datetime }
    preInserts:
      - { property: createdAt, set: DateTime.Now }
  - name: Order
    properties:
      - { name: Number, column: ORDER_NUMBER, primitive: int, isPrimaryKey: true }
      - { name: Total, column: TOTAL, primitive: decimal, validations: [{ type: positive }] }
"#;

fn write_schema(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Load -> synthesize -> persist
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_schema_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "shop.yaml", SHOP_YAML);
    let output = dir.path().join("out");

    let project = load_project(&schema).unwrap();
    let validated = validate_project(&project).unwrap();
    assert!(!validated.has_errors(), "{:?}", validated.diagnostics());
    let project = validated.into_result().unwrap();
    assert_eq!(project.entities[0].pre_inserts[0].property, "CreatedAt");

    let artifacts = synthesize(&project, &ArtifactKind::ALL).unwrap();
    assert_eq!(artifacts.len(), 12);
    let written = persist(&output, &artifacts).unwrap();
    assert_eq!(written.len(), 12);

    for path in [
        "Domain/Entities/Customer.cs",
        "Common/Queries/OrderQuery.cs",
        "Common/Repositories/CustomerRepository.cs",
        "Common/Validators/CustomerValidator.cs",
        "Common/Services/OrderService.cs",
        "Api/Controllers/OrderController.cs",
    ] {
        assert!(output.join(path).is_file(), "missing {path}");
    }

    let service = std::fs::read_to_string(output.join("Common/Services/CustomerService.cs")).unwrap();
    assert!(service.contains("customer.CreatedAt = DateTime.Now;"));
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[test]
fn test_manifest_tracks_written_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "shop.yml", SHOP_YAML);
    let output = dir.path().join("out");

    let project = load_project(&schema).unwrap();
    let config = GenerationConfig {
        artifacts: vec![ArtifactKind::Model, ArtifactKind::Query],
        ..GenerationConfig::default()
    };
    let mut files = synthesize(&project, &config.selected()).unwrap();
    let manifest = Manifest::from_artifacts("0.1.0", &project.name, &project.dialect, &files);
    files.push(manifest.to_artifact().unwrap());
    let written = persist(&output, &files).unwrap();
    assert_eq!(written.last().unwrap(), &output.join(MANIFEST_FILE));

    let loaded = Manifest::load(output.join(MANIFEST_FILE)).unwrap();
    assert_eq!(loaded.project, "Shop");
    assert_eq!(loaded.dialect, "postgresql");
    assert_eq!(loaded.artifacts.len(), 4);
    assert_eq!(loaded.artifacts[0].path, "Domain/Entities/Customer.cs");
    assert!(loaded.verify(&output).unwrap().is_empty());

    std::fs::write(output.join("Common/Queries/OrderQuery.cs"), "// edited").unwrap();
    assert_eq!(loaded.verify(&output).unwrap(), vec!["Common/Queries/OrderQuery.cs"]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "shop.toml", "name = 'Shop'");
    assert!(matches!(
        load_project(&schema).unwrap_err(),
        StoreError::UnsupportedFormat(_)
    ));
}

#[test]
fn test_document_missing_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "shop.json", r#"{"entities": []}"#);
    assert!(matches!(load_project(&schema).unwrap_err(), StoreError::JsonError(_)));
}
