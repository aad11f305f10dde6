//! Operation signatures shared by repository, service and controller.
//!
//! The repository interface, its implementation and the service layer all
//! build their signatures from these functions, so they agree exactly.

use crate::ast::{Param, Signature};
use crate::context::{EntityContext, Field};
use crate::names;

pub fn insert(ctx: &EntityContext<'_>) -> Signature {
    Signature::new(
        format!("Task<{}>", ctx.key().cs_type()),
        names::INSERT,
        vec![entity_param(ctx)],
    )
}

pub fn update(ctx: &EntityContext<'_>) -> Signature {
    Signature::new("Task", names::UPDATE, vec![key_param(ctx), entity_param(ctx)])
}

pub fn delete(ctx: &EntityContext<'_>) -> Signature {
    Signature::new("Task", names::DELETE, vec![key_param(ctx)])
}

pub fn get(ctx: &EntityContext<'_>) -> Signature {
    Signature::new(
        format!("Task<{}>", names::entity_type(ctx)),
        names::GET,
        vec![key_param(ctx)],
    )
}

pub fn list(ctx: &EntityContext<'_>) -> Signature {
    Signature::new(
        format!("Task<IList<{}>>", names::entity_type(ctx)),
        names::LIST,
        Vec::new(),
    )
}

pub fn paginate(ctx: &EntityContext<'_>) -> Signature {
    let mut params = vec![Param::new("int", names::OFFSET), Param::new("int", names::LIMIT)];
    params.extend(filter_params(ctx));
    Signature::new(
        format!("Task<Pagination<{}>>", names::entity_type(ctx)),
        names::PAGINATE,
        params,
    )
}

/// The six CRUD signatures, in declaration order.
pub fn crud(ctx: &EntityContext<'_>) -> Vec<Signature> {
    vec![
        insert(ctx),
        update(ctx),
        delete(ctx),
        get(ctx),
        list(ctx),
        paginate(ctx),
    ]
}

pub fn exists_by(field: &Field<'_>) -> Signature {
    Signature::new(
        "Task<bool>",
        names::exists_by(field),
        vec![Param::new(field.cs_type(), field.camel.clone())],
    )
}

pub fn exists_by_different(ctx: &EntityContext<'_>, field: &Field<'_>) -> Signature {
    Signature::new(
        "Task<bool>",
        names::exists_by_different(field, ctx.key()),
        vec![Param::new(field.cs_type(), field.camel.clone()), key_param(ctx)],
    )
}

/// Existence checks: every property, then every non-key property against
/// a different key.
pub fn existence(ctx: &EntityContext<'_>) -> Vec<Signature> {
    let mut signatures: Vec<Signature> = ctx.fields.iter().map(exists_by).collect();
    signatures.extend(ctx.non_key_fields().map(|field| exists_by_different(ctx, field)));
    signatures
}

/// One filter parameter per property; range-filtered primitives contribute
/// a `from`/`to` pair.
pub fn filter_params(ctx: &EntityContext<'_>) -> Vec<Param> {
    let mut params = Vec::new();
    for field in &ctx.fields {
        let spec = field.spec();
        if spec.range_filter {
            params.push(Param::new(spec.filter_type, names::range_from(field)));
            params.push(Param::new(spec.filter_type, names::range_to(field)));
        } else {
            params.push(Param::new(spec.filter_type, field.camel.clone()));
        }
    }
    params
}

/// Argument list forwarding every parameter of `signature`.
pub fn forward(signature: &Signature) -> String {
    signature
        .params
        .iter()
        .map(|param| param.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn entity_param(ctx: &EntityContext<'_>) -> Param {
    Param::new(names::entity_type(ctx), ctx.camel.clone())
}

fn key_param(ctx: &EntityContext<'_>) -> Param {
    let key = ctx.key();
    Param::new(key.cs_type(), key.camel.clone())
}

#[cfg(test)]
mod tests {
    use crudgen_core::{Entity, Project, Property};

    use super::*;
    use crate::render::signature;

    #[test]
    fn test_pagination_signature() {
        let project = Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("Email", "EMAIL", "string"))
                .with_property(Property::new("CreatedAt", "CREATED_AT", "datetime"))
                .with_property(Property::new("Active", "ACTIVE", "bool")),
        );
        let ctx = EntityContext::new(&project, &project.entities[0]).unwrap();
        let paginate = paginate(&ctx);
        assert_eq!(
            signature(&paginate),
            "Task<Pagination<User>> PaginateAsync(int offset, int limit, int? id, string email, \
             DateTime? fromCreatedAt, DateTime? toCreatedAt, bool? active)"
        );
        assert_eq!(
            forward(&paginate),
            "offset, limit, id, email, fromCreatedAt, toCreatedAt, active"
        );
    }
}
