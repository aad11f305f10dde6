//! Dapper repository layer: `Common/Repositories/{Entity}Repository.cs`.
//!
//! Declares `I{Entity}Repository` and implements it over the generated
//! code's `ISqlService`. Insert key retrieval follows the project dialect's
//! [`KeyRetrieval`]; datetime pagination filters are widened to whole days
//! with [`DayBound`].

use crudgen_core::{ConfigError, Entity, KeyRetrieval, Project};

use crate::ast::{
    Args, Class, Constructor, Direction, FieldValue, Interface, Member, Method, Param, SourceFile,
    SqlCall, Stmt, TypeDecl,
};
use crate::context::{EntityContext, Field};
use crate::names::{self, QueryKey};
use crate::operations;
use crate::pagination::DayBound;
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates the repository interface and its Dapper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositorySynthesizer;

impl Synthesizer for RepositorySynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Repository
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;

        let interface = Interface {
            name: names::repository_interface(&ctx),
            methods: operations::crud(&ctx)
                .into_iter()
                .chain(operations::existence(&ctx))
                .collect(),
        };

        let class_name = names::repository_class(&ctx);
        let mut class = Class::public(&class_name);
        class.bases.push(interface.name.clone());
        class.members.extend(dependencies(&class_name));
        class.members.push(Member::Constructor(constructor(&class_name)));
        class.members.push(Member::Method(insert(&ctx)));
        class.members.push(Member::Method(update(&ctx)));
        class.members.push(Member::Method(delete(&ctx)));
        class.members.push(Member::Method(get(&ctx)));
        class.members.push(Member::Method(list(&ctx)));
        class.members.push(Member::Method(paginate(&ctx)));
        for field in &ctx.fields {
            class.members.push(Member::Method(exists_by(&ctx, field)));
        }
        for field in ctx.non_key_fields() {
            class.members.push(Member::Method(exists_by_different(&ctx, field)));
        }

        let project_name = &ctx.project.name;
        Ok(GeneratedFile {
            path: format!("Common/Repositories/{}.cs", class_name),
            source: SourceFile {
                usings: vec![
                    format!("{project_name}.Domain.Entities"),
                    format!("{project_name}.Domain.Models.Responses"),
                    format!("{project_name}.Queries"),
                    format!("{project_name}.Services"),
                    "Dapper".into(),
                    "Microsoft.Extensions.Logging".into(),
                    "System".into(),
                    "System.Data".into(),
                    "System.Linq".into(),
                    "System.Threading.Tasks".into(),
                    "System.Collections.Generic".into(),
                ],
                namespace: ctx.namespace("Repositories"),
                types: vec![TypeDecl::Interface(interface), TypeDecl::Class(class)],
            },
        })
    }
}

const DEPENDENCIES: [(&str, &str); 3] = [
    ("ILogger<{}>", "logger"),
    ("ISqlService", "sqlService"),
    ("IAuthenticatedService", "authenticatedService"),
];

fn dependency_type(template: &str, class: &str) -> String {
    template.replace("{}", class)
}

fn dependencies(class: &str) -> Vec<Member> {
    DEPENDENCIES
        .iter()
        .map(|(ty, name)| Member::Field {
            ty: dependency_type(ty, class),
            name: format!("_{name}"),
        })
        .collect()
}

fn constructor(class: &str) -> Constructor {
    Constructor {
        class: class.to_string(),
        params: DEPENDENCIES
            .iter()
            .map(|(ty, name)| Param::new(dependency_type(ty, class), *name))
            .collect(),
        body: DEPENDENCIES
            .iter()
            .map(|(_, name)| {
                Stmt::line(format!(
                    "_{name} = {name} ?? throw new ArgumentNullException(nameof({name}));"
                ))
            })
            .collect(),
    }
}

fn log(message: String) -> Stmt {
    Stmt::line(format!("_logger.LogDebug($\"{message}\");"))
}

fn user_log(action: String) -> Stmt {
    log(format!("User {{_authenticatedService.GetUserKey()}} is {action}"))
}

fn sql(binding: Option<&str>, method: String, query: &QueryKey, ctx: &EntityContext<'_>, args: Args) -> Stmt {
    Stmt::Sql(SqlCall {
        binding: binding.map(str::to_string),
        method,
        query: query.reference(ctx),
        args,
    })
}

fn key_object(ctx: &EntityContext<'_>) -> Args {
    let key = ctx.key();
    Args::Object(vec![FieldValue::new(names::binding(key), key.camel.clone())])
}

fn insert(ctx: &EntityContext<'_>) -> Method {
    let key = ctx.key();
    let entity = &ctx.camel;

    let mut body = vec![
        user_log(format!("inserting a new {} - {{{entity}}}", ctx.name())),
        Stmt::Blank,
        Stmt::line("var parameters = new DynamicParameters();"),
    ];

    let retrieval = ctx.dialect.key_retrieval();
    if retrieval == KeyRetrieval::OutputParameter {
        body.push(Stmt::AddParameter {
            name: names::binding(key),
            value: format!("{entity}.{}", key.name()),
            direction: Direction::Output,
        });
    }
    for field in ctx.non_key_fields() {
        body.push(Stmt::AddParameter {
            name: names::binding(field),
            value: format!("{entity}.{}", field.name()),
            direction: Direction::Input,
        });
    }
    body.push(Stmt::Blank);

    let parameters = Args::Parameters("parameters".into());
    match retrieval {
        KeyRetrieval::ScalarResult => body.push(sql(
            Some(key.camel.as_str()),
            format!("ExecuteScalarAsync<{}>", key.cs_type()),
            &QueryKey::Insert,
            ctx,
            parameters,
        )),
        KeyRetrieval::OutputParameter => {
            body.push(sql(None, "ExecuteAsync".into(), &QueryKey::Insert, ctx, parameters));
            body.push(Stmt::line(format!(
                "var {} = parameters.Get<{}>(\"{}\");",
                key.camel,
                key.cs_type(),
                names::binding(key)
            )));
        }
    }

    body.push(Stmt::Blank);
    body.push(log(format!("{} {{{}}} inserted", ctx.name(), key.camel)));
    body.push(Stmt::Blank);
    body.push(Stmt::Return(key.camel.clone()));

    Method {
        attributes: Vec::new(),
        signature: operations::insert(ctx),
        body,
    }
}

fn update(ctx: &EntityContext<'_>) -> Method {
    let key = ctx.key();
    let entity = &ctx.camel;
    let fields = ctx
        .fields
        .iter()
        .map(|field| {
            let value = if field.is_key() {
                key.camel.clone()
            } else {
                format!("{entity}.{}", field.name())
            };
            FieldValue::new(names::binding(field), value)
        })
        .collect();

    Method {
        attributes: Vec::new(),
        signature: operations::update(ctx),
        body: vec![
            user_log(format!(
                "updating {} {{{}}} - {{{entity}}}",
                ctx.name(),
                key.camel
            )),
            Stmt::Blank,
            sql(None, "ExecuteAsync".into(), &QueryKey::Update, ctx, Args::Object(fields)),
            Stmt::Blank,
            log(format!("{} {{{}}} updated", ctx.name(), key.camel)),
        ],
    }
}

fn delete(ctx: &EntityContext<'_>) -> Method {
    let key = ctx.key();
    Method {
        attributes: Vec::new(),
        signature: operations::delete(ctx),
        body: vec![
            user_log(format!("deleting {} {{{}}}", ctx.name(), key.camel)),
            Stmt::Blank,
            sql(None, "ExecuteAsync".into(), &QueryKey::Delete, ctx, key_object(ctx)),
            Stmt::Blank,
            log(format!("{} {{{}}} deleted", ctx.name(), key.camel)),
        ],
    }
}

fn get(ctx: &EntityContext<'_>) -> Method {
    let key = ctx.key();
    let entity = &ctx.camel;
    Method {
        attributes: Vec::new(),
        signature: operations::get(ctx),
        body: vec![
            user_log(format!("getting {} {{{}}}", ctx.name(), key.camel)),
            Stmt::Blank,
            sql(
                Some(entity.as_str()),
                format!("QueryFirstOrDefaultAsync<{}>", names::entity_type(ctx)),
                &QueryKey::Get,
                ctx,
                key_object(ctx),
            ),
            Stmt::Blank,
            log(format!("Got {} {{{}}} - {{{entity}}}", ctx.name(), key.camel)),
            Stmt::Blank,
            Stmt::Return(entity.clone()),
        ],
    }
}

fn list(ctx: &EntityContext<'_>) -> Method {
    Method {
        attributes: Vec::new(),
        signature: operations::list(ctx),
        body: vec![
            user_log(format!("getting all {} data", ctx.name())),
            Stmt::Blank,
            sql(
                Some("list"),
                format!("QueryAsync<{}>", names::entity_type(ctx)),
                &QueryKey::List,
                ctx,
                Args::None,
            ),
            Stmt::Blank,
            log(format!("Got all {}", ctx.name())),
            Stmt::Blank,
            Stmt::Return("list.ToList()".into()),
        ],
    }
}

fn parsed(bound: DayBound, field: &Field<'_>) -> (String, String) {
    let (variable, parameter) = match bound {
        DayBound::StartOfDay => ("parsedFrom", names::range_from(field)),
        DayBound::EndOfDay => ("parsedTo", names::range_to(field)),
    };
    (format!("{variable}{}", field.name()), parameter)
}

fn normalize(bound: DayBound, field: &Field<'_>) -> Vec<Stmt> {
    let (variable, parameter) = parsed(bound, field);
    vec![
        Stmt::line(format!("DateTime? {variable} = null;")),
        Stmt::Blank,
        Stmt::If {
            condition: format!("{parameter} != null"),
            body: vec![Stmt::line(format!(
                "{variable} = {};",
                bound.cs_expression(&parameter)
            ))],
        },
        Stmt::Blank,
    ]
}

fn paginate(ctx: &EntityContext<'_>) -> Method {
    let mut filters = String::new();
    let mut body = Vec::new();
    let mut fields = vec![
        FieldValue::new(names::OFFSET, names::OFFSET),
        FieldValue::new(names::LIMIT, names::LIMIT),
    ];

    for field in &ctx.fields {
        if field.spec().range_filter {
            let from = names::range_from(field);
            let to = names::range_to(field);
            filters.push_str(&format!(" - {from}: {{{from}}} - {to}: {{{to}}}"));

            body.extend(normalize(DayBound::StartOfDay, field));
            body.extend(normalize(DayBound::EndOfDay, field));
            fields.push(FieldValue::new(from, parsed(DayBound::StartOfDay, field).0));
            fields.push(FieldValue::new(to, parsed(DayBound::EndOfDay, field).0));
        } else {
            filters.push_str(&format!(" - {camel}: {{{camel}}}", camel = field.camel));
            fields.push(FieldValue::new(names::binding(field), field.camel.clone()));
        }
    }

    let entity_type = names::entity_type(ctx);
    let mut stmts = vec![
        user_log(format!(
            "paginating {} - offset: {{offset}} - limit: {{limit}}{filters}",
            ctx.name()
        )),
        Stmt::Blank,
    ];
    stmts.extend(body);
    stmts.extend([
        sql(
            Some("paginated"),
            format!("QueryAsync<{entity_type}>"),
            &QueryKey::Paginate,
            ctx,
            Args::Object(fields),
        ),
        Stmt::Blank,
        sql(
            Some("total"),
            "ExecuteScalarAsync<int>".into(),
            &QueryKey::PaginateCount,
            ctx,
            Args::None,
        ),
        Stmt::Blank,
        Stmt::line(format!(
            "var pagination = new Pagination<{entity_type}>(paginated, offset, limit, total);"
        )),
        Stmt::Blank,
        log("Got pagination, the informed filter has {pagination.Itens.Count()} results in database".into()),
        Stmt::Blank,
        Stmt::Return("pagination".into()),
    ]);

    Method {
        attributes: Vec::new(),
        signature: operations::paginate(ctx),
        body: stmts,
    }
}

fn exists_body(search: String, query: QueryKey, ctx: &EntityContext<'_>, fields: Vec<FieldValue>) -> Vec<Stmt> {
    vec![
        user_log(search),
        Stmt::Blank,
        sql(
            Some("exists"),
            "ExecuteScalarAsync<bool>".into(),
            &query,
            ctx,
            Args::Object(fields),
        ),
        Stmt::Blank,
        Stmt::line("_logger.LogDebug(exists ? \"Found a match\" : \"No match found\");"),
        Stmt::Blank,
        Stmt::Return("exists".into()),
    ]
}

fn exists_by(ctx: &EntityContext<'_>, field: &Field<'_>) -> Method {
    Method {
        attributes: Vec::new(),
        signature: operations::exists_by(field),
        body: exists_body(
            format!(
                "searching for a match with {{{}}} in column {} on {} table",
                field.camel,
                field.name(),
                ctx.name()
            ),
            QueryKey::exists_by(field),
            ctx,
            vec![FieldValue::new(names::binding(field), field.camel.clone())],
        ),
    }
}

fn exists_by_different(ctx: &EntityContext<'_>, field: &Field<'_>) -> Method {
    let key = ctx.key();
    Method {
        attributes: Vec::new(),
        signature: operations::exists_by_different(ctx, field),
        body: exists_body(
            format!(
                "searching for a match with {{{}}} in column {} on {} table with a different {} than {{{}}}",
                field.camel,
                field.name(),
                ctx.name(),
                key.name(),
                key.camel
            ),
            QueryKey::exists_by_different(field, key),
            ctx,
            vec![
                FieldValue::new(names::binding(field), field.camel.clone()),
                FieldValue::new(names::binding(key), key.camel.clone()),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use crudgen_core::Property;

    use super::*;

    fn user(dialect: &str) -> Project {
        Project::new("Shop", dialect).with_entity(
            Entity::new("User")
                .with_property(Property::new("Id", "ID", "int").primary_key())
                .with_property(Property::new("Email", "EMAIL", "string"))
                .with_property(Property::new("CreatedAt", "CREATED_AT", "datetime")),
        )
    }

    fn build(project: &Project) -> GeneratedFile {
        RepositorySynthesizer
            .build(project, &project.entities[0])
            .unwrap()
    }

    #[test]
    fn test_scalar_insert() {
        let file = build(&user("mysql"));
        let insert = file.source.class("UserRepository").unwrap().method("InsertAsync").unwrap();

        assert_eq!(
            insert.added_parameters(),
            vec![("EMAIL", Direction::Input), ("CREATED_AT", Direction::Input)]
        );
        let calls = insert.sql_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "ExecuteScalarAsync<int>");
        assert_eq!(calls[0].binding.as_deref(), Some("id"));
        assert_eq!(calls[0].query.to_string(), "UserQuery.INSERT");
    }

    #[test]
    fn test_output_parameter_insert() {
        let file = build(&user("oracle"));
        let insert = file.source.class("UserRepository").unwrap().method("InsertAsync").unwrap();

        assert_eq!(
            insert.added_parameters(),
            vec![
                ("ID", Direction::Output),
                ("EMAIL", Direction::Input),
                ("CREATED_AT", Direction::Input)
            ]
        );
        assert_eq!(insert.sql_calls()[0].method, "ExecuteAsync");
        assert!(insert.body.contains(&Stmt::line("var id = parameters.Get<int>(\"ID\");")));
    }

    #[test]
    fn test_update_binds_key_parameter() {
        let file = build(&user("mysql"));
        let update = file.source.class("UserRepository").unwrap().method("UpdateAsync").unwrap();
        let call = update.sql_calls()[0];
        assert_eq!(
            call.args,
            Args::Object(vec![
                FieldValue::new("ID", "id"),
                FieldValue::new("EMAIL", "user.Email"),
                FieldValue::new("CREATED_AT", "user.CreatedAt"),
            ])
        );
    }

    #[test]
    fn test_pagination_normalizes_datetime_range() {
        let project = user("postgres");
        let text = build(&project).render().content;
        assert!(text.contains("parsedFromCreatedAt = fromCreatedAt.Value.Date;"));
        assert!(text.contains(
            "parsedToCreatedAt = toCreatedAt.Value.Date.AddHours(23).AddMinutes(59).AddSeconds(59);"
        ));
        assert!(text.contains("var total = await _sqlService.ExecuteScalarAsync<int>(UserQuery.PAGINATE_COUNT, CommandType.Text);"));

        let file = build(&project);
        let paginate = file.source.class("UserRepository").unwrap().method("PaginateAsync").unwrap();
        assert_eq!(
            paginate.sql_calls()[0].args.field_names(),
            vec!["offset", "limit", "ID", "EMAIL", "fromCreatedAt", "toCreatedAt"]
        );
    }

    #[test]
    fn test_existence_checks() {
        let file = build(&user("mysql"));
        let interface = file.source.interface("IUserRepository").unwrap();
        for name in [
            "ExistsByIdAsync",
            "ExistsByEmailAsync",
            "ExistsByCreatedAtAsync",
            "ExistsByEmailAndDifferentThanIdAsync",
            "ExistsByCreatedAtAndDifferentThanIdAsync",
        ] {
            assert!(interface.method(name).is_some(), "missing {name}");
        }
        assert!(interface.method("ExistsByIdAndDifferentThanIdAsync").is_none());

        let class = file.source.class("UserRepository").unwrap();
        for signature in &interface.methods {
            let method = class.method(&signature.name).unwrap();
            assert_eq!(&method.signature, signature);
        }
    }

    #[test]
    fn test_rendered_header_and_constructor() {
        let text = build(&user("mysql")).render().content;
        assert!(text.starts_with("using Shop.Domain.Entities;\n"));
        assert!(text.contains("namespace Shop.Repositories\n{\n    public interface IUserRepository\n"));
        assert!(text.contains("public class UserRepository : IUserRepository"));
        assert!(text.contains(
            "_sqlService = sqlService ?? throw new ArgumentNullException(nameof(sqlService));"
        ));
        assert!(text.contains(
            "_logger.LogDebug($\"User {_authenticatedService.GetUserKey()} is inserting a new User - {user}\");"
        ));
    }

    #[test]
    fn test_multiple_keys_are_fatal() {
        let mut project = user("mysql");
        project.entities[0].properties[1].is_primary_key = true;
        let err = RepositorySynthesizer.build(&project, &project.entities[0]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::PrimaryKey {
                entity: "User".into(),
                found: 2
            }
        );
    }
}
