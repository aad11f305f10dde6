//! Plain entity class: `Domain/Entities/{Entity}.cs`.

use crudgen_core::{ConfigError, Entity, Project};

use crate::ast::{Class, Member, SourceFile, TypeDecl};
use crate::context::EntityContext;
use crate::names;
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates one auto-property per schema property, annotated for mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSynthesizer;

impl Synthesizer for ModelSynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Model
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;

        let mut class = Class::public(names::entity_type(&ctx));
        class.attributes.push(format!("Table(\"{}\")", ctx.name()));
        class.members = ctx
            .fields
            .iter()
            .map(|field| {
                let mut attributes = Vec::new();
                if field.is_key() {
                    attributes.push("Key".to_string());
                }
                attributes.push(format!("Column(\"{}\")", field.column()));
                Member::Property {
                    attributes,
                    ty: field.cs_type().to_string(),
                    name: field.name().to_string(),
                }
            })
            .collect();

        Ok(GeneratedFile {
            path: format!("Domain/Entities/{}.cs", ctx.name()),
            source: SourceFile {
                usings: vec![
                    "System".into(),
                    "System.ComponentModel.DataAnnotations".into(),
                    "System.ComponentModel.DataAnnotations.Schema".into(),
                ],
                namespace: ctx.namespace("Domain.Entities"),
                types: vec![TypeDecl::Class(class)],
            },
        })
    }
}
