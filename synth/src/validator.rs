//! FluentValidation rules: `Common/Validators/{Entity}Validator.cs`.
//!
//! Each schema [`Validation`] becomes one `RuleFor` chain. `unique` rules
//! call the repository's existence checks, so the method names come from
//! [`names`] like the repository's own declarations. A [`Depends`] clause
//! becomes `.When(x => ...)` with the condition the primitive table assigns
//! to its `when` token.
//!
//! [`Depends`]: crudgen_core::Depends

use crudgen_core::{ConfigError, Entity, PrimitiveKind, Project, Validation, ValidationKind};

use crate::ast::{Class, Constructor, Member, Param, SourceFile, Stmt, TypeDecl};
use crate::context::{EntityContext, Field};
use crate::names;
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates an `AbstractValidator<Entity>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorSynthesizer;

impl Synthesizer for ValidatorSynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Validator
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;
        let class_name = names::validator_class(&ctx);
        let repository = names::repository_interface(&ctx);

        let mut body = vec![Stmt::line(
            "_repository = repository ?? throw new ArgumentNullException(nameof(repository));",
        )];
        for field in &ctx.fields {
            for validation in &field.property.validations {
                body.push(Stmt::Blank);
                body.extend(rule(&ctx, field, validation)?);
            }
        }

        let mut class = Class::public(&class_name);
        class
            .bases
            .push(format!("AbstractValidator<{}>", names::entity_type(&ctx)));
        class.members.push(Member::Field {
            ty: repository.clone(),
            name: "_repository".into(),
        });
        class.members.push(Member::Constructor(Constructor {
            class: class_name.clone(),
            params: vec![Param::new(repository, "repository")],
            body,
        }));

        let project_name = &ctx.project.name;
        Ok(GeneratedFile {
            path: format!("Common/Validators/{class_name}.cs"),
            source: SourceFile {
                usings: vec![
                    "FluentValidation".into(),
                    format!("{project_name}.Domain.Entities"),
                    format!("{project_name}.Repositories"),
                    "System".into(),
                ],
                namespace: ctx.namespace("Validators"),
                types: vec![TypeDecl::Class(class)],
            },
        })
    }
}

fn rule(
    ctx: &EntityContext<'_>,
    field: &Field<'_>,
    validation: &Validation,
) -> Result<Vec<Stmt>, ConfigError> {
    let kind = validation
        .validation_kind()
        .ok_or_else(|| ConfigError::UnsupportedValidation(validation.kind.clone()))?;

    let mut chain = vec![check(ctx, field, kind)];
    if let Some(depends) = validation.depends.as_ref().filter(|d| d.is_complete()) {
        let target = ctx.field(&depends.on)?;
        let state = target.spec().when_state(&depends.when).ok_or_else(|| {
            ConfigError::UnresolvedReference {
                entity: ctx.name().to_string(),
                reference: format!("{}.{}", depends.on, depends.when),
            }
        })?;
        chain.push(format!(
            ".When(x => {})",
            state.render(&format!("x.{}", target.name()))
        ));
    }

    let mut stmts = vec![Stmt::line(format!("RuleFor(x => x.{})", field.name()))];
    let last = chain.len() - 1;
    for (index, link) in chain.into_iter().enumerate() {
        let end = if index == last { ";" } else { "" };
        stmts.push(Stmt::line(format!("    {link}{end}")));
    }
    Ok(stmts)
}

fn check(ctx: &EntityContext<'_>, field: &Field<'_>, kind: ValidationKind) -> String {
    match kind {
        ValidationKind::Required if field.kind == PrimitiveKind::Bool => ".NotNull()".into(),
        ValidationKind::Required => ".NotEmpty()".into(),
        ValidationKind::Email => ".EmailAddress()".into(),
        ValidationKind::Positive => ".GreaterThan(0)".into(),
        ValidationKind::Past => ".LessThan(x => DateTime.Now)".into(),
        ValidationKind::Future => ".GreaterThan(x => DateTime.Now)".into(),
        ValidationKind::Unique if field.is_key() => format!(
            ".MustAsync(async ({camel}, cancellation) => !await _repository.{}({camel}))",
            names::exists_by(field),
            camel = field.camel
        ),
        ValidationKind::Unique => {
            let key = ctx.key();
            format!(
                ".MustAsync(async (x, {camel}, cancellation) => !await _repository.{}({camel}, x.{}))",
                names::exists_by_different(field, key),
                key.name(),
                camel = field.camel
            )
        }
    }
}
