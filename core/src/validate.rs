//! Schema validation.
//!
//! Proves a [`Project`] is internally consistent before any code is emitted.
//! Structural checks look at each node on its own (empty names, malformed
//! identifiers, missing primary key, half-filled `depends`). Cross-referential
//! checks resolve every `Depends.on` and `PreAction.property` against the
//! owning entity's properties and check `Depends.when` against the
//! depended-on primitive's legal states.
//!
//! Every problem is collected; nothing stops at the first error. References
//! are matched case-insensitively and the validated copy carries the
//! declared casing, so synthesis never performs its own lookups.
//!
//! # Examples
//!
//! ```
//! use crudgen_core::*;
//!
//! let project = Project::new("Shop", "mysql").with_entity(
//!     Entity::new("User")
//!         .with_property(Property::new("Id", "ID", "int").primary_key())
//!         .with_property(
//!             Property::new("Email", "EMAIL", "string")
//!                 .with_validation(Validation::new("required").depending_on("email", "FILLED")),
//!         ),
//! );
//!
//! let validated = validate_project(&project).unwrap();
//! assert!(!validated.has_errors());
//! let depends = validated.project().entities[0].properties[1].validations[0]
//!     .depends
//!     .as_ref()
//!     .unwrap();
//! assert_eq!(depends.on, "Email");
//! assert_eq!(depends.when, "filled");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::ConfigError;
use crate::naming::reserved_keyword;
use crate::types::{Depends, Entity, PreAction, Project, Property, Validation, ValidationKind};
use crate::PrimitiveKind;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Schema diagnostics.
///
/// Each variant describes one problem a user fixes by editing the schema
/// document. The `Display` impl is the log line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Project name is empty or whitespace-only.
    #[error("project name cannot be empty")]
    EmptyProjectName,
    /// Project declares no dialect.
    #[error("project \"{project}\" must declare a database dialect")]
    EmptyDialect { project: String },
    /// Entity name is empty or whitespace-only.
    #[error("entity name cannot be empty")]
    EmptyEntityName,
    /// Entity name cannot be used as a type name.
    #[error("entity name \"{0}\" is not a valid identifier")]
    InvalidEntityName(String),
    /// Entity name turns into a reserved C# keyword in generated code.
    #[error("entity name \"{name}\" is reserved in C# as \"{keyword}\"")]
    ReservedEntityName { name: String, keyword: String },
    /// Entity has no properties.
    #[error("entity \"{0}\" must declare at least one property")]
    NoProperties(String),
    /// Entity has zero or several primary keys.
    #[error("entity \"{entity}\" must declare exactly one primary key, found {found}")]
    PrimaryKeyCount { entity: String, found: usize },
    /// Property name is empty or whitespace-only.
    #[error("property name from \"{entity}\" entity cannot be empty")]
    EmptyPropertyName { entity: String },
    /// Property name cannot be used as a member name.
    #[error("property name \"{property}\" from \"{entity}\" entity is not a valid identifier")]
    InvalidPropertyName { entity: String, property: String },
    /// Property name turns into a reserved C# keyword in generated code.
    #[error("property name \"{property}\" from \"{entity}\" entity is reserved in C# as \"{keyword}\"")]
    ReservedPropertyName {
        entity: String,
        property: String,
        keyword: String,
    },
    /// Property has no storage column.
    #[error("property \"{property}\" from \"{entity}\" entity must declare a column")]
    EmptyColumn { entity: String, property: String },
    /// Property has no primitive.
    #[error("property \"{property}\" from \"{entity}\" entity must declare a primitive")]
    EmptyPrimitive { entity: String, property: String },
    /// Validation has no type.
    #[error("validation type from \"{property}\" property cannot be empty")]
    EmptyValidationKind { property: String },
    /// Validation type is not recognized.
    #[error(
        "validation \"{kind}\" from \"{property}\" property is not recognized. Allowed values: {allowed}"
    )]
    UnknownValidationKind {
        property: String,
        kind: String,
        allowed: String,
    },
    /// Validation type does not apply to the property's primitive.
    #[error("validation \"{kind}\" cannot be applied to \"{property}\" property ({primitive})")]
    InapplicableValidation {
        property: String,
        kind: String,
        primitive: String,
    },
    /// Exactly one of `on` / `when` is filled.
    #[error(
        "Depends' \"on\" ({on}) and \"when\" ({when}) from \"{property}\" property must be both filled or both empty"
    )]
    IncompleteDepends {
        property: String,
        on: String,
        when: String,
    },
    /// `Depends.on` names no property of the entity.
    #[error(
        "Depends' \"on\" ({on}) and \"when\" ({when}) from \"{property}\" property has a dependency not met"
    )]
    DependencyNotMet {
        property: String,
        on: String,
        when: String,
    },
    /// `Depends.when` is not a legal state for the primitive of `on`.
    #[error(
        "Depends' \"on\" ({on}) and \"when\" ({when}) from \"{property}\" property has a \"when\" ({when}) not allowed for its \"on\" ({on}) primitive ({primitive}). Allowed values: {allowed}"
    )]
    WhenNotAllowed {
        property: String,
        on: String,
        when: String,
        primitive: String,
        allowed: String,
    },
    /// Pre-action has no target property.
    #[error("PreAction \"set\" ({set}) from \"{entity}\" entity must name a property")]
    EmptyPreActionProperty { entity: String, set: String },
    /// Pre-action has no value expression.
    #[error("PreAction \"property\" ({property}) from \"{entity}\" entity must declare a \"set\" expression")]
    EmptyPreActionSet { entity: String, property: String },
    /// Pre-action names no property of the entity.
    #[error(
        "PreAction \"set\" ({set}) and \"property\" ({property}) from \"{entity}\" entity has a dependency not met"
    )]
    PreActionNotMet {
        entity: String,
        property: String,
        set: String,
    },
}

/// Result of validating a project.
///
/// Holds a canonicalized copy of the input (every resolved reference carries
/// the declared casing) and the full diagnostic log, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProject {
    project: Project,
    diagnostics: Vec<Diagnostic>,
}

impl ValidatedProject {
    /// Canonicalized copy of the validated project.
    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Returns the canonical project when there are no diagnostics.
    ///
    /// # Errors
    ///
    /// Returns the diagnostic log otherwise.
    pub fn into_result(self) -> Result<Project, Vec<Diagnostic>> {
        if self.diagnostics.is_empty() {
            Ok(self.project)
        } else {
            Err(self.diagnostics)
        }
    }
}

/// Collects diagnostics and logs each one as it is found.
#[derive(Default)]
struct Log {
    diagnostics: Vec<Diagnostic>,
}

impl Log {
    fn push(&mut self, diagnostic: Diagnostic) {
        error!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Validates a project.
///
/// Runs, per entity in declaration order: entity checks, pre-insert and
/// pre-update resolution, then per property its checks followed by each
/// validation and its `depends` clause.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedPrimitive`] when a `depends` clause
/// points at a property whose primitive has no table entry. Schema problems
/// are reported through [`ValidatedProject::diagnostics`], not as errors.
pub fn validate_project(project: &Project) -> Result<ValidatedProject, ConfigError> {
    let mut canonical = project.clone();
    let mut log = Log::default();

    debug!("Project \"{}\":", project.name);
    check_project(project, &mut log);

    for (entity, canonical_entity) in project.entities.iter().zip(canonical.entities.iter_mut()) {
        debug!("Entity \"{}\" from \"{}\" project:", entity.name, project.name);
        validate_entity(entity, canonical_entity, &mut log)?;
    }

    Ok(ValidatedProject {
        project: canonical,
        diagnostics: log.diagnostics,
    })
}

fn check_project(project: &Project, log: &mut Log) {
    if project.name.trim().is_empty() {
        log.push(Diagnostic::EmptyProjectName);
    }
    if project.dialect.trim().is_empty() {
        log.push(Diagnostic::EmptyDialect {
            project: project.name.clone(),
        });
    }
}

fn validate_entity(entity: &Entity, canonical: &mut Entity, log: &mut Log) -> Result<(), ConfigError> {
    check_entity(entity, log);

    for (action, slot) in entity.pre_inserts.iter().zip(canonical.pre_inserts.iter_mut()) {
        resolve_pre_action(entity, action, slot, log);
    }
    for (action, slot) in entity.pre_updates.iter().zip(canonical.pre_updates.iter_mut()) {
        resolve_pre_action(entity, action, slot, log);
    }

    for (property, canonical_property) in entity.properties.iter().zip(canonical.properties.iter_mut()) {
        debug!("Property \"{}\" from \"{}\" entity:", property.name, entity.name);
        check_property(entity, property, log);

        for (validation, canonical_validation) in property
            .validations
            .iter()
            .zip(canonical_property.validations.iter_mut())
        {
            debug!("Validation \"{}\" from \"{}\" property:", validation.kind, property.name);
            check_validation(property, validation, log);

            let Some(depends) = &validation.depends else {
                continue;
            };
            debug!(
                "Dependency \"on\" ({}) and \"when\" ({}) from \"{}\" validation:",
                depends.on, depends.when, validation.kind
            );
            if depends.is_blank() {
                continue;
            }
            if !depends.is_complete() {
                log.push(Diagnostic::IncompleteDepends {
                    property: property.name.clone(),
                    on: depends.on.clone(),
                    when: depends.when.clone(),
                });
                continue;
            }
            canonical_validation.depends = Some(resolve_depends(entity, property, depends, log)?);
        }
    }

    Ok(())
}

fn check_entity(entity: &Entity, log: &mut Log) {
    if entity.name.trim().is_empty() {
        log.push(Diagnostic::EmptyEntityName);
    } else if !IDENTIFIER.is_match(&entity.name) {
        log.push(Diagnostic::InvalidEntityName(entity.name.clone()));
    } else if let Some(keyword) = reserved_keyword(&entity.name) {
        log.push(Diagnostic::ReservedEntityName {
            name: entity.name.clone(),
            keyword: keyword.to_string(),
        });
    }

    if entity.properties.is_empty() {
        log.push(Diagnostic::NoProperties(entity.name.clone()));
        return;
    }

    let found = entity.primary_keys().count();
    if found != 1 {
        log.push(Diagnostic::PrimaryKeyCount {
            entity: entity.name.clone(),
            found,
        });
    }
}

fn check_property(entity: &Entity, property: &Property, log: &mut Log) {
    if property.name.trim().is_empty() {
        log.push(Diagnostic::EmptyPropertyName {
            entity: entity.name.clone(),
        });
    } else if !IDENTIFIER.is_match(&property.name) {
        log.push(Diagnostic::InvalidPropertyName {
            entity: entity.name.clone(),
            property: property.name.clone(),
        });
    } else if let Some(keyword) = reserved_keyword(&property.name) {
        log.push(Diagnostic::ReservedPropertyName {
            entity: entity.name.clone(),
            property: property.name.clone(),
            keyword: keyword.to_string(),
        });
    }
    if property.column.trim().is_empty() {
        log.push(Diagnostic::EmptyColumn {
            entity: entity.name.clone(),
            property: property.name.clone(),
        });
    }
    if property.primitive.trim().is_empty() {
        log.push(Diagnostic::EmptyPrimitive {
            entity: entity.name.clone(),
            property: property.name.clone(),
        });
    }
}

fn check_validation(property: &Property, validation: &Validation, log: &mut Log) {
    if validation.kind.trim().is_empty() {
        log.push(Diagnostic::EmptyValidationKind {
            property: property.name.clone(),
        });
        return;
    }

    let Some(kind) = validation.validation_kind() else {
        log.push(Diagnostic::UnknownValidationKind {
            property: property.name.clone(),
            kind: validation.kind.clone(),
            allowed: ValidationKind::ALL
                .iter()
                .map(|kind| kind.token())
                .collect::<Vec<_>>()
                .join(", "),
        });
        return;
    };

    // An unknown primitive surfaces as a configuration error at synthesis.
    if let Ok(primitive) = property.primitive_kind() {
        if !kind.applies_to(primitive) {
            log.push(Diagnostic::InapplicableValidation {
                property: property.name.clone(),
                kind: kind.token().to_string(),
                primitive: primitive.to_string(),
            });
        }
    }
}

fn resolve_depends(
    entity: &Entity,
    property: &Property,
    depends: &Depends,
    log: &mut Log,
) -> Result<Depends, ConfigError> {
    let Some(target) = entity.find_property(&depends.on) else {
        log.push(Diagnostic::DependencyNotMet {
            property: property.name.clone(),
            on: depends.on.clone(),
            when: depends.when.clone(),
        });
        return Ok(depends.clone());
    };

    let spec = target.primitive.parse::<PrimitiveKind>()?.spec();
    let mut resolved = Depends {
        on: target.name.clone(),
        when: depends.when.clone(),
    };

    match spec.when_state(&depends.when) {
        Some(state) => resolved.when = state.token.to_string(),
        None => log.push(Diagnostic::WhenNotAllowed {
            property: property.name.clone(),
            on: target.name.clone(),
            when: depends.when.clone(),
            primitive: target.primitive.clone(),
            allowed: spec.allowed_when(),
        }),
    }

    Ok(resolved)
}

fn resolve_pre_action(entity: &Entity, action: &PreAction, slot: &mut PreAction, log: &mut Log) {
    debug!(
        "PreAction \"set\" ({}) and \"property\" ({}) from \"{}\" entity:",
        action.set, action.property, entity.name
    );

    if action.set.trim().is_empty() {
        log.push(Diagnostic::EmptyPreActionSet {
            entity: entity.name.clone(),
            property: action.property.clone(),
        });
    }
    if action.property.trim().is_empty() {
        log.push(Diagnostic::EmptyPreActionProperty {
            entity: entity.name.clone(),
            set: action.set.clone(),
        });
        return;
    }

    match entity.find_property(&action.property) {
        Some(target) => slot.property = target.name.clone(),
        None => log.push(Diagnostic::PreActionNotMet {
            entity: entity.name.clone(),
            property: action.property.clone(),
            set: action.set.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Property) -> Project {
        Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(email),
        )
    }

    fn email_depending(on: &str, when: &str) -> Property {
        Property::new("Email", "EMAIL", "string")
            .with_validation(Validation::new("required").depending_on(on, when))
    }

    #[test]
    fn test_valid_project_has_no_diagnostics() {
        let validated = validate_project(&user(email_depending("Email", "filled"))).unwrap();
        assert!(validated.diagnostics().is_empty());
    }

    #[test]
    fn test_dependency_not_met() {
        let validated = validate_project(&user(email_depending("Phone", "filled"))).unwrap();
        assert_eq!(
            validated.diagnostics(),
            &[Diagnostic::DependencyNotMet {
                property: "Email".into(),
                on: "Phone".into(),
                when: "filled".into(),
            }]
        );
    }

    #[test]
    fn test_when_not_allowed_lists_allowed_values() {
        let validated = validate_project(&user(email_depending("email", "positive"))).unwrap();
        assert_eq!(validated.diagnostics().len(), 1);
        let message = validated.diagnostics()[0].to_string();
        assert!(message.ends_with("Allowed values: filled, empty"), "{message}");
    }

    #[test]
    fn test_on_is_rewritten_to_declared_casing() {
        let validated = validate_project(&user(email_depending("ID", "Positive"))).unwrap();
        assert!(!validated.has_errors());
        let depends = validated.project().entities[0].properties[1].validations[0]
            .depends
            .clone()
            .unwrap();
        assert_eq!(depends.on, "Id");
        assert_eq!(depends.when, "positive");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let project = user(email_depending("email", "filled"));
        let before = project.clone();
        validate_project(&project).unwrap();
        assert_eq!(project, before);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let first = validate_project(&user(email_depending("EMAIL", "Filled"))).unwrap();
        let second = validate_project(first.project()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_primitive_of_dependency_is_config_error() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "guid").primary_key())
                .with_property(email_depending("Id", "filled")),
        );
        assert_eq!(
            validate_project(&project),
            Err(ConfigError::UnsupportedPrimitive("guid".into()))
        );
    }

    #[test]
    fn test_pre_actions_are_resolved() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("CreatedAt", "CREATED_AT", "datetime"))
                .with_pre_insert(PreAction::new("createdat", "DateTime.Now"))
                .with_pre_update(PreAction::new("UpdatedAt", "DateTime.Now")),
        );

        let validated = validate_project(&project).unwrap();
        assert_eq!(validated.project().entities[0].pre_inserts[0].property, "CreatedAt");
        assert_eq!(
            validated.diagnostics(),
            &[Diagnostic::PreActionNotMet {
                entity: "User".into(),
                property: "UpdatedAt".into(),
                set: "DateTime.Now".into(),
            }]
        );
    }

    #[test]
    fn test_structural_diagnostics_are_exhaustive() {
        let project = Project::new(" ", "").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "", "int"))
                .with_property(
                    Property::new("Email", "EMAIL", "string")
                        .with_validation(Validation::new("positive"))
                        .with_validation(Validation::new("shiny"))
                        .with_validation(Validation::new("required").depending_on("Email", "")),
                ),
        );

        let validated = validate_project(&project).unwrap();
        let diagnostics = validated.diagnostics();
        assert_eq!(diagnostics.len(), 7);
        assert_eq!(diagnostics[0], Diagnostic::EmptyProjectName);
        assert!(matches!(diagnostics[1], Diagnostic::EmptyDialect { .. }));
        assert!(matches!(diagnostics[2], Diagnostic::PrimaryKeyCount { found: 0, .. }));
        assert!(matches!(diagnostics[3], Diagnostic::EmptyColumn { .. }));
        assert!(matches!(diagnostics[4], Diagnostic::InapplicableValidation { .. }));
        assert!(matches!(diagnostics[5], Diagnostic::UnknownValidationKind { .. }));
        assert!(matches!(diagnostics[6], Diagnostic::IncompleteDepends { .. }));
    }

    #[test]
    fn test_invalid_identifiers() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("Order Line")
                .with_property(Property::new("1Id", "ID", "int").primary_key()),
        );
        let validated = validate_project(&project).unwrap();
        assert_eq!(
            validated.diagnostics(),
            &[
                Diagnostic::InvalidEntityName("Order Line".into()),
                Diagnostic::InvalidPropertyName {
                    entity: "Order Line".into(),
                    property: "1Id".into(),
                },
            ]
        );
    }

    #[test]
    fn test_reserved_names() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("Event")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("Object", "OBJECT", "string")),
        );
        let validated = validate_project(&project).unwrap();
        assert_eq!(
            validated.diagnostics(),
            &[
                Diagnostic::ReservedEntityName {
                    name: "Event".into(),
                    keyword: "event".into(),
                },
                Diagnostic::ReservedPropertyName {
                    entity: "Event".into(),
                    property: "Object".into(),
                    keyword: "object".into(),
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_match() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("Flag", "FLAG_1", "bool"))
                .with_property(Property::new("FLAG", "FLAG_2", "string"))
                .with_property(
                    Property::new("Note", "NOTE", "string")
                        .with_validation(Validation::new("required").depending_on("flag", "true")),
                ),
        );
        let validated = validate_project(&project).unwrap();
        assert!(!validated.has_errors());
        let depends = validated.project().entities[0].properties[3].validations[0]
            .depends
            .clone()
            .unwrap();
        assert_eq!(depends.on, "Flag");
    }
}
