//! ASP.NET Core controller: `Api/Controllers/{Entity}Controller.cs`.

use crudgen_core::{ConfigError, Entity, Project};

use crate::ast::{Class, Constructor, Member, Method, Param, Signature, SourceFile, Stmt, TypeDecl};
use crate::context::EntityContext;
use crate::names;
use crate::operations;
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates one endpoint per service operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerSynthesizer;

impl Synthesizer for ControllerSynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Controller
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;
        let class_name = names::controller_class(&ctx);
        let service = names::service_interface(&ctx);
        let route_key = format!("{{{}}}", ctx.key().camel);

        let mut class = Class::public(&class_name);
        class.attributes.push("ApiController".into());
        class.attributes.push("Route(\"api/[controller]\")".into());
        class.bases.push("ControllerBase".into());
        class.members.push(Member::Field {
            ty: service.clone(),
            name: "_service".into(),
        });
        class.members.push(Member::Constructor(Constructor {
            class: class_name.clone(),
            params: vec![Param::new(service, "service")],
            body: vec![Stmt::line(
                "_service = service ?? throw new ArgumentNullException(nameof(service));",
            )],
        }));

        let key = &ctx.key().camel;
        let entity_local = &ctx.camel;
        let endpoints = [
            (
                "HttpPost".to_string(),
                operations::insert(&ctx),
                Response::Value(key.clone()),
            ),
            (
                format!("HttpPut(\"{route_key}\")"),
                operations::update(&ctx),
                Response::NoContent,
            ),
            (
                format!("HttpDelete(\"{route_key}\")"),
                operations::delete(&ctx),
                Response::NoContent,
            ),
            (
                format!("HttpGet(\"{route_key}\")"),
                operations::get(&ctx),
                Response::Found(entity_local.clone()),
            ),
            ("HttpGet".to_string(), operations::list(&ctx), Response::Value("list".into())),
            (
                "HttpGet(\"paginate\")".to_string(),
                operations::paginate(&ctx),
                Response::Value("pagination".into()),
            ),
        ];

        for (verb, signature, response) in endpoints {
            class
                .members
                .push(Member::Method(endpoint(&ctx, verb, signature, response)));
        }

        let project_name = &ctx.project.name;
        Ok(GeneratedFile {
            path: format!("Api/Controllers/{class_name}.cs"),
            source: SourceFile {
                usings: vec![
                    format!("{project_name}.Domain.Entities"),
                    format!("{project_name}.Services"),
                    "Microsoft.AspNetCore.Mvc".into(),
                    "System".into(),
                    "System.Threading.Tasks".into(),
                ],
                namespace: ctx.namespace("Controllers"),
                types: vec![TypeDecl::Class(class)],
            },
        })
    }
}

enum Response {
    /// `return Ok(local);`
    Value(String),
    /// `return local == null ? NotFound() : Ok(local);`
    Found(String),
    NoContent,
}

fn endpoint(ctx: &EntityContext<'_>, verb: String, service: Signature, response: Response) -> Method {
    let call = format!(
        "await _service.{}({})",
        service.name,
        operations::forward(&service)
    );

    let params = service
        .params
        .iter()
        .map(|param| {
            let source = if param.ty == names::entity_type(ctx) {
                "FromBody"
            } else if service.name == names::PAGINATE {
                "FromQuery"
            } else {
                "FromRoute"
            };
            param.clone().with_attribute(source)
        })
        .collect();

    let body = match response {
        Response::Value(local) => vec![
            Stmt::line(format!("var {local} = {call};")),
            Stmt::Blank,
            Stmt::Return(format!("Ok({local})")),
        ],
        Response::Found(local) => vec![
            Stmt::line(format!("var {local} = {call};")),
            Stmt::Blank,
            Stmt::Return(format!("{local} == null ? NotFound() : Ok({local})")),
        ],
        Response::NoContent => vec![
            Stmt::line(format!("{call};")),
            Stmt::Blank,
            Stmt::Return("NoContent()".into()),
        ],
    };

    Method {
        attributes: vec![verb],
        signature: Signature::new("Task<IActionResult>", service.name, params),
        body,
    }
}

#[cfg(test)]
mod tests {
    use crudgen_core::Property;

    use super::*;

    #[test]
    fn test_endpoints() {
        let project = Project::new("Shop", "postgres").with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("Active", "ACTIVE", "bool")),
        );
        let artifact = ControllerSynthesizer
            .generate_entity(&project, &project.entities[0])
            .unwrap();
        let text = artifact.content;

        assert_eq!(artifact.path, "Api/Controllers/UserController.cs");
        assert!(text.contains("    [ApiController]\n    [Route(\"api/[controller]\")]\n    public class UserController : ControllerBase\n"));
        assert!(text.contains(
            "        [HttpPut(\"{id}\")]\n        public async Task<IActionResult> UpdateAsync([FromRoute] int id, [FromBody] User user)\n"
        ));
        assert!(text.contains(
            "PaginateAsync([FromQuery] int offset, [FromQuery] int limit, [FromQuery] int? id, [FromQuery] bool? active)"
        ));
        assert!(text.contains("var pagination = await _service.PaginateAsync(offset, limit, id, active);"));
        assert!(text.contains("return user == null ? NotFound() : Ok(user);"));
    }
}
