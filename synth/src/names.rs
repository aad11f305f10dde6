//! Cross-artifact identifiers.
//!
//! Every name one artifact uses to refer to another (type names, method
//! names, query keys, bound parameter names) is derived here and nowhere
//! else, so linkage holds without a resolution pass.

use std::fmt;

use crudgen_core::naming::constant;

use crate::ast::QueryRef;
use crate::context::{EntityContext, Field};

pub fn entity_type(ctx: &EntityContext<'_>) -> String {
    ctx.name().to_string()
}

pub fn repository_interface(ctx: &EntityContext<'_>) -> String {
    format!("I{}Repository", ctx.name())
}

pub fn repository_class(ctx: &EntityContext<'_>) -> String {
    format!("{}Repository", ctx.name())
}

pub fn query_class(ctx: &EntityContext<'_>) -> String {
    format!("{}Query", ctx.name())
}

pub fn validator_class(ctx: &EntityContext<'_>) -> String {
    format!("{}Validator", ctx.name())
}

pub fn service_interface(ctx: &EntityContext<'_>) -> String {
    format!("I{}Service", ctx.name())
}

pub fn service_class(ctx: &EntityContext<'_>) -> String {
    format!("{}Service", ctx.name())
}

pub fn controller_class(ctx: &EntityContext<'_>) -> String {
    format!("{}Controller", ctx.name())
}

pub const INSERT: &str = "InsertAsync";
pub const UPDATE: &str = "UpdateAsync";
pub const DELETE: &str = "DeleteAsync";
pub const GET: &str = "GetAsync";
pub const LIST: &str = "ListAsync";
pub const PAGINATE: &str = "PaginateAsync";

/// `ExistsBy{Property}Async`.
pub fn exists_by(field: &Field<'_>) -> String {
    format!("ExistsBy{}Async", field.name())
}

/// `ExistsBy{Property}AndDifferentThan{Key}Async`.
pub fn exists_by_different(field: &Field<'_>, key: &Field<'_>) -> String {
    format!("ExistsBy{}AndDifferentThan{}Async", field.name(), key.name())
}

/// Name under which a property is bound in equality contexts (insert
/// parameters, update/get/delete/exists objects, equality filters).
pub fn binding(field: &Field<'_>) -> String {
    field.column().to_string()
}

/// `from{Property}` bound name of a range filter.
pub fn range_from(field: &Field<'_>) -> String {
    format!("from{}", field.name())
}

/// `to{Property}` bound name of a range filter.
pub fn range_to(field: &Field<'_>) -> String {
    format!("to{}", field.name())
}

pub const OFFSET: &str = "offset";
pub const LIMIT: &str = "limit";

/// Constant-style query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKey {
    Insert,
    Update,
    Delete,
    Get,
    List,
    Paginate,
    PaginateCount,
    /// `EXISTS_BY_{PROPERTY}`.
    ExistsBy(String),
    /// `EXISTS_BY_{PROPERTY}_AND_DIFFERENT_{KEY}`.
    ExistsByAndDifferent(String, String),
}

impl QueryKey {
    pub fn exists_by(field: &Field<'_>) -> Self {
        Self::ExistsBy(field.name().to_string())
    }

    pub fn exists_by_different(field: &Field<'_>, key: &Field<'_>) -> Self {
        Self::ExistsByAndDifferent(field.name().to_string(), key.name().to_string())
    }

    /// Every key an entity's query class declares, in declaration order.
    pub fn for_entity(ctx: &EntityContext<'_>) -> Vec<QueryKey> {
        let mut keys = vec![
            Self::Insert,
            Self::Update,
            Self::Delete,
            Self::Get,
            Self::List,
            Self::Paginate,
            Self::PaginateCount,
        ];
        keys.extend(ctx.fields.iter().map(Self::exists_by));
        keys.extend(
            ctx.non_key_fields()
                .map(|field| Self::exists_by_different(field, ctx.key())),
        );
        keys
    }

    /// Reference from another artifact, `{Entity}Query.{KEY}`.
    pub fn reference(&self, ctx: &EntityContext<'_>) -> QueryRef {
        QueryRef {
            class: query_class(ctx),
            key: self.to_string(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => f.write_str("INSERT"),
            Self::Update => f.write_str("UPDATE"),
            Self::Delete => f.write_str("DELETE"),
            Self::Get => f.write_str("GET"),
            Self::List => f.write_str("LIST"),
            Self::Paginate => f.write_str("PAGINATE"),
            Self::PaginateCount => f.write_str("PAGINATE_COUNT"),
            Self::ExistsBy(property) => write!(f, "EXISTS_BY_{}", constant(property)),
            Self::ExistsByAndDifferent(property, key) => write!(
                f,
                "EXISTS_BY_{}_AND_DIFFERENT_{}",
                constant(property),
                constant(key)
            ),
        }
    }
}
