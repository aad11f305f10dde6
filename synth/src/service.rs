//! Service layer: `Common/Services/{Entity}Service.cs`.
//!
//! Insert and update apply the entity's pre-actions in declaration order,
//! validate, then call the repository. Every other operation forwards its
//! parameters unchanged.

use crudgen_core::{ConfigError, Entity, PreAction, Project};

use crate::ast::{Class, Constructor, Interface, Member, Method, Param, Signature, SourceFile, Stmt, TypeDecl};
use crate::context::EntityContext;
use crate::names;
use crate::operations;
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates the service interface and implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceSynthesizer;

impl Synthesizer for ServiceSynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Service
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;
        let class_name = names::service_class(&ctx);
        let entity_type = names::entity_type(&ctx);

        let interface = Interface {
            name: names::service_interface(&ctx),
            methods: operations::crud(&ctx),
        };

        let dependencies = [
            (format!("ILogger<{class_name}>"), "logger"),
            (names::repository_interface(&ctx), "repository"),
            (format!("IValidator<{entity_type}>"), "validator"),
        ];

        let mut class = Class::public(&class_name);
        class.bases.push(interface.name.clone());
        for (ty, name) in &dependencies {
            class.members.push(Member::Field {
                ty: ty.clone(),
                name: format!("_{name}"),
            });
        }
        class.members.push(Member::Constructor(Constructor {
            class: class_name.clone(),
            params: dependencies
                .iter()
                .map(|(ty, name)| Param::new(ty.clone(), *name))
                .collect(),
            body: dependencies
                .iter()
                .map(|(_, name)| {
                    Stmt::line(format!(
                        "_{name} = {name} ?? throw new ArgumentNullException(nameof({name}));"
                    ))
                })
                .collect(),
        }));

        let key = ctx.key();
        let mut insert_prelude = pre_actions(&ctx, &entity.pre_inserts)?;
        insert_prelude.extend(validate(&ctx));
        let mut update_prelude = vec![Stmt::line(format!(
            "{}.{} = {};",
            ctx.camel,
            key.name(),
            key.camel
        ))];
        update_prelude.extend(pre_actions(&ctx, &entity.pre_updates)?);
        update_prelude.extend(validate(&ctx));

        for signature in &interface.methods {
            let prelude = match signature.name.as_str() {
                names::INSERT => insert_prelude.clone(),
                names::UPDATE => update_prelude.clone(),
                _ => Vec::new(),
            };
            class.members.push(Member::Method(delegate(signature.clone(), prelude)));
        }

        let project_name = &ctx.project.name;
        Ok(GeneratedFile {
            path: format!("Common/Services/{class_name}.cs"),
            source: SourceFile {
                usings: vec![
                    format!("{project_name}.Domain.Entities"),
                    format!("{project_name}.Domain.Models.Responses"),
                    format!("{project_name}.Repositories"),
                    "FluentValidation".into(),
                    "Microsoft.Extensions.Logging".into(),
                    "System".into(),
                    "System.Collections.Generic".into(),
                    "System.Threading.Tasks".into(),
                ],
                namespace: ctx.namespace("Services"),
                types: vec![TypeDecl::Interface(interface), TypeDecl::Class(class)],
            },
        })
    }
}

fn pre_actions(ctx: &EntityContext<'_>, actions: &[PreAction]) -> Result<Vec<Stmt>, ConfigError> {
    actions
        .iter()
        .map(|action| {
            let field = ctx.field(&action.property)?;
            Ok(Stmt::line(format!(
                "{}.{} = {};",
                ctx.camel,
                field.name(),
                action.set
            )))
        })
        .collect()
}

fn validate(ctx: &EntityContext<'_>) -> Vec<Stmt> {
    vec![
        Stmt::Blank,
        Stmt::line(format!("await _validator.ValidateAndThrowAsync({});", ctx.camel)),
        Stmt::Blank,
    ]
}

fn delegate(signature: Signature, mut body: Vec<Stmt>) -> Method {
    let call = format!(
        "await _repository.{}({})",
        signature.name,
        operations::forward(&signature)
    );
    if signature.returns == "Task" {
        body.push(Stmt::line(format!("{call};")));
    } else {
        body.push(Stmt::Return(call));
    }
    Method {
        attributes: Vec::new(),
        signature,
        body,
    }
}

#[cfg(test)]
mod tests {
    use crudgen_core::Property;

    use super::*;

    fn user() -> Project {
        Project::new("Shop", "mysql").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("CreatedAt", "CREATED_AT", "datetime"))
                .with_property(Property::new("UpdatedAt", "UPDATED_AT", "datetime"))
                .with_pre_insert(PreAction::new("CreatedAt", "DateTime.Now"))
                .with_pre_update(PreAction::new("UpdatedAt", "DateTime.Now")),
        )
    }

    #[test]
    fn test_insert_applies_pre_inserts_then_validates() {
        let project = user();
        let file = ServiceSynthesizer.build(&project, &project.entities[0]).unwrap();
        let insert = file.source.class("UserService").unwrap().method("InsertAsync").unwrap();
        assert_eq!(
            insert.body,
            vec![
                Stmt::line("user.CreatedAt = DateTime.Now;"),
                Stmt::Blank,
                Stmt::line("await _validator.ValidateAndThrowAsync(user);"),
                Stmt::Blank,
                Stmt::Return("await _repository.InsertAsync(user)".into()),
            ]
        );
    }

    #[test]
    fn test_update_sets_key_and_pre_updates() {
        let project = user();
        let text = ServiceSynthesizer
            .generate_entity(&project, &project.entities[0])
            .unwrap()
            .content;
        assert!(text.contains(
            "            user.Id = id;\n            user.UpdatedAt = DateTime.Now;\n"
        ));
        assert!(text.contains("            await _repository.UpdateAsync(id, user);\n"));
        assert!(!text.contains("user.CreatedAt = DateTime.Now;\n            user.Id"));
    }

    #[test]
    fn test_unresolved_pre_action_is_fatal() {
        let mut project = user();
        project.entities[0].pre_inserts[0].property = "Missing".into();
        let err = ServiceSynthesizer.build(&project, &project.entities[0]).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedReference { .. }));
    }
}
