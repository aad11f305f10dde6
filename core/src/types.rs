//! Schema type definitions for entity scaffolding.
//!
//! This module defines the data model the generator consumes: a [`Project`]
//! owns ordered [`Entity`] definitions, each entity owns its [`Property`]
//! list and [`PreAction`]s, and each property owns its [`Validation`]s. The
//! types deserialize from the camelCase schema document with [`serde`].
//!
//! Values whose recognition is a configuration concern (`dialect`,
//! `primitive`) stay as raw text and are resolved on demand through
//! [`Project::dialect`] and [`Property::primitive_kind`].

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::ConfigError;
use crate::primitive::PrimitiveKind;

/// One generation unit: a named project targeting a single database dialect.
///
/// # Examples
///
/// ```
/// use crudgen_core::*;
///
/// let project = Project::new("Shop", "mysql").with_entity(
///     Entity::new("User")
///         .with_property(Property::new("Id", "ID", "int").primary_key())
///         .with_property(Property::new("Email", "EMAIL", "string")),
/// );
///
/// assert_eq!(project.dialect().unwrap(), Dialect::MySql);
/// assert_eq!(project.find_entity("user").unwrap().name, "User");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name, used as the root namespace of generated code.
    pub name: String,
    /// Target database dialect token (e.g. `"mysql"`, `"oracle"`).
    #[serde(alias = "database")]
    pub dialect: String,
    /// Entities to scaffold, in declaration order.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Project {
    /// Creates a project with no entities.
    pub fn new(name: impl Into<String>, dialect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialect: dialect.into(),
            entities: Vec::new(),
        }
    }

    /// Appends an entity.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Resolves the dialect token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDialect`] when the token names no
    /// known dialect.
    pub fn dialect(&self) -> Result<Dialect, ConfigError> {
        self.dialect.parse()
    }

    /// Finds an entity by name (case-insensitive, first match wins).
    pub fn find_entity(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(name))
    }
}

/// One data aggregate to scaffold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity name, used verbatim as the generated type name.
    pub name: String,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Assignments applied before insert, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_inserts: Vec<PreAction>,
    /// Assignments applied before update, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_updates: Vec<PreAction>,
}

impl Entity {
    /// Creates an entity with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            pre_inserts: Vec::new(),
            pre_updates: Vec::new(),
        }
    }

    /// Appends a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Appends a pre-insert action.
    pub fn with_pre_insert(mut self, action: PreAction) -> Self {
        self.pre_inserts.push(action);
        self
    }

    /// Appends a pre-update action.
    pub fn with_pre_update(mut self, action: PreAction) -> Self {
        self.pre_updates.push(action);
        self
    }

    /// Returns the properties flagged as primary key.
    pub fn primary_keys(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_primary_key)
    }

    /// Returns the single primary-key property.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PrimaryKey`] when the entity declares zero or
    /// more than one primary key.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_core::*;
    ///
    /// let entity = Entity::new("User")
    ///     .with_property(Property::new("Id", "ID", "int").primary_key());
    /// assert_eq!(entity.primary_key().unwrap().name, "Id");
    ///
    /// let keyless = Entity::new("Log").with_property(Property::new("Text", "TEXT", "string"));
    /// assert!(keyless.primary_key().is_err());
    /// ```
    pub fn primary_key(&self) -> Result<&Property, ConfigError> {
        let mut keys = self.primary_keys();
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(key),
            _ => Err(ConfigError::PrimaryKey {
                entity: self.name.clone(),
                found: self.primary_keys().count(),
            }),
        }
    }

    /// Returns every property except the primary key, in declaration order.
    pub fn non_key_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.is_primary_key)
    }

    /// Finds a property by name (case-insensitive, first match wins).
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|property| property.name.eq_ignore_ascii_case(name))
    }
}

/// One field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name, used verbatim as the generated member name.
    pub name: String,
    /// Storage column name.
    pub column: String,
    /// Primitive kind token (e.g. `"int"`, `"datetime"`).
    pub primitive: String,
    /// Whether this property is the entity's primary key.
    #[serde(default)]
    pub is_primary_key: bool,
    /// Constraints attached to this property, in order.
    #[serde(default)]
    pub validations: Vec<Validation>,
}

impl Property {
    /// Creates a non-key property without validations.
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        primitive: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            primitive: primitive.into(),
            is_primary_key: false,
            validations: Vec::new(),
        }
    }

    /// Marks the property as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Appends a validation.
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    /// Resolves the primitive token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPrimitive`] for unknown tokens.
    pub fn primitive_kind(&self) -> Result<PrimitiveKind, ConfigError> {
        self.primitive.parse()
    }
}

/// Kind of constraint a [`Validation`] expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// Value must be present.
    Required,
    /// Value must not exist on another record.
    Unique,
    /// Value must be an e-mail address.
    Email,
    /// Value must be greater than zero.
    Positive,
    /// Value must lie in the past.
    Past,
    /// Value must lie in the future.
    Future,
}

impl ValidationKind {
    /// Every recognized kind, in document order.
    pub const ALL: [ValidationKind; 6] = [
        Self::Required,
        Self::Unique,
        Self::Email,
        Self::Positive,
        Self::Past,
        Self::Future,
    ];

    /// Parses a kind token case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.token().eq_ignore_ascii_case(token.trim()))
    }

    /// Document token for this kind.
    pub fn token(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Unique => "unique",
            Self::Email => "email",
            Self::Positive => "positive",
            Self::Past => "past",
            Self::Future => "future",
        }
    }

    /// Returns `true` if this kind can constrain a property of `primitive`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_core::{PrimitiveKind, ValidationKind};
    ///
    /// assert!(ValidationKind::Email.applies_to(PrimitiveKind::String));
    /// assert!(!ValidationKind::Email.applies_to(PrimitiveKind::Int));
    /// assert!(ValidationKind::Unique.applies_to(PrimitiveKind::Bool));
    /// ```
    pub fn applies_to(self, primitive: PrimitiveKind) -> bool {
        match self {
            Self::Required | Self::Unique => true,
            Self::Email => primitive == PrimitiveKind::String,
            Self::Positive => matches!(primitive, PrimitiveKind::Int | PrimitiveKind::Decimal),
            Self::Past | Self::Future => primitive == PrimitiveKind::DateTime,
        }
    }
}

/// One constraint attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Kind token (`"required"`, `"unique"`, ...).
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    /// Optional conditional-activation clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Depends>,
}

impl Validation {
    /// Creates an unconditional validation.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            depends: None,
        }
    }

    /// Attaches a [`Depends`] clause.
    pub fn depending_on(mut self, on: impl Into<String>, when: impl Into<String>) -> Self {
        self.depends = Some(Depends {
            on: on.into(),
            when: when.into(),
        });
        self
    }

    /// Resolves the kind token.
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        ValidationKind::parse(&self.kind)
    }
}

/// "This validation applies only when property `on` is in state `when`."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depends {
    /// Name of the property the validation depends on.
    #[serde(default)]
    pub on: String,
    /// State token, legal values depend on the primitive of `on`.
    #[serde(default)]
    pub when: String,
}

impl Depends {
    /// Both fields are blank.
    pub fn is_blank(&self) -> bool {
        self.on.trim().is_empty() && self.when.trim().is_empty()
    }

    /// Both fields are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.on.trim().is_empty() && !self.when.trim().is_empty()
    }
}

/// "Before insert/update, set `property` using expression `set`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAction {
    /// Name of the property being assigned.
    pub property: String,
    /// Target-language expression producing the value.
    pub set: String,
}

impl PreAction {
    pub fn new(property: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            set: set.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
            "name": "Shop",
            "database": "oracle",
            "entities": [{
                "name": "User",
                "properties": [
                    {"name": "Id", "column": "ID", "primitive": "int", "isPrimaryKey": true},
                    {"name": "Email", "column": "EMAIL", "primitive": "string",
                     "validations": [{"type": "required", "depends": {"on": "Email", "when": "filled"}}]}
                ],
                "preInserts": [{"property": "Email", "set": "\"none\""}]
            }]
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.dialect, "oracle");
        let user = &project.entities[0];
        assert_eq!(user.primary_key().unwrap().name, "Id");
        assert_eq!(user.pre_inserts.len(), 1);
        assert!(user.pre_updates.is_empty());
        let validation = &user.properties[1].validations[0];
        assert_eq!(validation.validation_kind(), Some(ValidationKind::Required));
        assert_eq!(validation.depends.as_ref().unwrap().when, "filled");
    }

    #[test]
    fn test_kind_alias_is_accepted() {
        let validation: Validation = serde_json::from_str(r#"{"kind": "Unique"}"#).unwrap();
        assert_eq!(validation.validation_kind(), Some(ValidationKind::Unique));
        assert!(validation.depends.is_none());
    }

    #[test]
    fn test_primary_key_counts() {
        let two_keys = Entity::new("Pair")
            .with_property(Property::new("A", "A", "int").primary_key())
            .with_property(Property::new("B", "B", "int").primary_key());
        assert_eq!(
            two_keys.primary_key(),
            Err(ConfigError::PrimaryKey {
                entity: "Pair".into(),
                found: 2
            })
        );
    }

    #[test]
    fn test_find_property_first_match_wins() {
        let entity = Entity::new("User")
            .with_property(Property::new("Name", "NAME_1", "string"))
            .with_property(Property::new("NAME", "NAME_2", "string"));
        assert_eq!(entity.find_property("name").unwrap().column, "NAME_1");
    }

    #[test]
    fn test_depends_shape() {
        assert!(Depends::default().is_blank());
        let half = Depends {
            on: "Email".into(),
            when: " ".into(),
        };
        assert!(!half.is_blank());
        assert!(!half.is_complete());
    }
}
