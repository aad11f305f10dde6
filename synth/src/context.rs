//! Per-entity synthesis context.
//!
//! Resolves everything a synthesizer needs up front (dialect, primary key,
//! primitive of every property, derived names) so that configuration errors
//! surface before any tree is assembled.

use crudgen_core::naming::camel;
use crudgen_core::{ConfigError, Dialect, Entity, PrimitiveKind, PrimitiveSpec, Project, Property};

/// A property with its resolved primitive and derived names.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub property: &'a Property,
    pub kind: PrimitiveKind,
    /// Parameter / local form of the name.
    pub camel: String,
}

impl Field<'_> {
    pub fn name(&self) -> &str {
        &self.property.name
    }

    pub fn column(&self) -> &str {
        &self.property.column
    }

    pub fn is_key(&self) -> bool {
        self.property.is_primary_key
    }

    pub fn spec(&self) -> &'static PrimitiveSpec {
        self.kind.spec()
    }

    pub fn cs_type(&self) -> &'static str {
        self.kind.cs_type()
    }
}

/// Everything resolved for one entity of one project.
#[derive(Debug, Clone)]
pub struct EntityContext<'a> {
    pub project: &'a Project,
    pub entity: &'a Entity,
    pub dialect: Dialect,
    pub fields: Vec<Field<'a>>,
    /// Parameter / local form of the entity name.
    pub camel: String,
    key: usize,
}

impl<'a> EntityContext<'a> {
    /// Resolves the context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown dialect, an unknown primitive,
    /// or a primary-key count other than one.
    pub fn new(project: &'a Project, entity: &'a Entity) -> Result<Self, ConfigError> {
        let dialect = project.dialect()?;
        entity.primary_key()?;

        let fields = entity
            .properties
            .iter()
            .map(|property| {
                Ok(Field {
                    property,
                    kind: property.primitive_kind()?,
                    camel: camel(&property.name),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let key = fields
            .iter()
            .position(Field::is_key)
            .ok_or_else(|| ConfigError::PrimaryKey {
                entity: entity.name.clone(),
                found: 0,
            })?;

        Ok(Self {
            project,
            entity,
            dialect,
            fields,
            camel: camel(&entity.name),
            key,
        })
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn key(&self) -> &Field<'a> {
        &self.fields[self.key]
    }

    pub fn non_key_fields(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter().filter(|field| !field.is_key())
    }

    /// Finds a field by exact declared name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedReference`] when no property carries
    /// that name, which means the project was not validated.
    pub fn field(&self, name: &str) -> Result<&Field<'a>, ConfigError> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| ConfigError::UnresolvedReference {
                entity: self.entity.name.clone(),
                reference: name.to_string(),
            })
    }

    /// Root-relative namespace (`{project}.{suffix}`).
    pub fn namespace(&self, suffix: &str) -> String {
        format!("{}.{suffix}", self.project.name)
    }
}
