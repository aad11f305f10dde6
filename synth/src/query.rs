//! SQL constants: `Common/Queries/{Entity}Query.cs`.
//!
//! One `public const string` per [`QueryKey`] the repository references.
//! Bound parameter names come from [`names`], the same source the repository
//! uses for its parameter objects.

use crudgen_core::{ConfigError, Dialect, Entity, Project};

use crate::ast::{Class, Member, SourceFile, TypeDecl};
use crate::context::{EntityContext, Field};
use crate::names::{self, QueryKey};
use crate::{ArtifactKind, GeneratedFile, Synthesizer};

/// Generates the static class of SQL constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySynthesizer;

impl Synthesizer for QuerySynthesizer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Query
    }

    fn build(&self, project: &Project, entity: &Entity) -> Result<GeneratedFile, ConfigError> {
        let ctx = EntityContext::new(project, entity)?;
        let sql = Sql { ctx: &ctx };

        let class_name = names::query_class(&ctx);
        let mut class = Class::public(&class_name);
        class.modifiers = "public static";
        class.members = QueryKey::for_entity(&ctx)
            .into_iter()
            .map(|key| -> Result<Member, ConfigError> {
                Ok(Member::Constant {
                    name: key.to_string(),
                    value: sql.statement(&key)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GeneratedFile {
            path: format!("Common/Queries/{class_name}.cs"),
            source: SourceFile {
                usings: Vec::new(),
                namespace: ctx.namespace("Queries"),
                types: vec![TypeDecl::Class(class)],
            },
        })
    }
}

struct Sql<'c, 'a> {
    ctx: &'c EntityContext<'a>,
}

impl Sql<'_, '_> {
    fn statement(&self, key: &QueryKey) -> Result<String, ConfigError> {
        let sql = match key {
            QueryKey::Insert => self.insert(),
            QueryKey::Update => self.update(),
            QueryKey::Delete => format!("DELETE FROM {} WHERE {}", self.table(), self.key_match()),
            QueryKey::Get => format!(
                "SELECT {} FROM {} WHERE {}",
                self.projection(),
                self.table(),
                self.key_match()
            ),
            QueryKey::List => format!("SELECT {} FROM {}", self.projection(), self.table()),
            QueryKey::Paginate => self.paginate(),
            QueryKey::PaginateCount => format!("SELECT COUNT(*) FROM {}", self.table()),
            QueryKey::ExistsBy(property) => self.exists(property, false)?,
            QueryKey::ExistsByAndDifferent(property, _) => self.exists(property, true)?,
        };
        Ok(sql)
    }

    fn dialect(&self) -> Dialect {
        self.ctx.dialect
    }

    fn table(&self) -> &str {
        self.ctx.name()
    }

    fn param(&self, name: &str) -> String {
        self.dialect().parameter(name)
    }

    fn equals(&self, field: &Field<'_>) -> String {
        format!("{} = {}", field.column(), self.param(&names::binding(field)))
    }

    fn key_match(&self) -> String {
        self.equals(self.ctx.key())
    }

    fn projection(&self) -> String {
        self.ctx
            .fields
            .iter()
            .map(|field| format!("{} AS {}", field.column(), field.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert(&self) -> String {
        let fields: Vec<&Field<'_>> = self.ctx.non_key_fields().collect();
        let columns: Vec<&str> = fields.iter().map(|field| field.column()).collect();
        let values: Vec<String> = fields
            .iter()
            .map(|field| self.param(&names::binding(field)))
            .collect();
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table(),
            columns.join(", "),
            values.join(", ")
        );

        let key = self.ctx.key();
        match self.dialect() {
            Dialect::MySql => format!("{statement}; SELECT LAST_INSERT_ID();"),
            Dialect::Postgres => format!("{statement} RETURNING {}", key.column()),
            Dialect::Oracle => format!(
                "{statement} RETURNING {} INTO {}",
                key.column(),
                self.param(&names::binding(key))
            ),
        }
    }

    fn update(&self) -> String {
        let assignments: Vec<String> = self
            .ctx
            .non_key_fields()
            .map(|field| self.equals(field))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {}",
            self.table(),
            assignments.join(", "),
            self.key_match()
        )
    }

    fn paginate(&self) -> String {
        let mut filters = Vec::new();
        for field in &self.ctx.fields {
            if field.spec().range_filter {
                let from = self.param(&names::range_from(field));
                let to = self.param(&names::range_to(field));
                filters.push(format!("({from} IS NULL OR {} >= {from})", field.column()));
                filters.push(format!("({to} IS NULL OR {} <= {to})", field.column()));
            } else {
                let value = self.param(&names::binding(field));
                filters.push(format!("({value} IS NULL OR {} = {value})", field.column()));
            }
        }

        let offset = self.param(names::OFFSET);
        let limit = self.param(names::LIMIT);
        let window = match self.dialect() {
            Dialect::MySql | Dialect::Postgres => format!("LIMIT {limit} OFFSET {offset}"),
            Dialect::Oracle => format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY"),
        };

        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {} {window}",
            self.projection(),
            self.table(),
            filters.join(" AND "),
            self.ctx.key().column()
        )
    }

    fn exists(&self, property: &str, different_key: bool) -> Result<String, ConfigError> {
        let field = self.ctx.field(property)?;

        let mut condition = self.equals(field);
        if different_key {
            let key = self.ctx.key();
            condition.push_str(&format!(
                " AND {} <> {}",
                key.column(),
                self.param(&names::binding(key))
            ));
        }
        let subquery = format!("SELECT 1 FROM {} WHERE {condition}", self.table());

        Ok(match self.dialect() {
            Dialect::MySql | Dialect::Postgres => format!("SELECT EXISTS ({subquery})"),
            Dialect::Oracle => {
                format!("SELECT CASE WHEN EXISTS ({subquery}) THEN 1 ELSE 0 END FROM DUAL")
            }
        })
    }
}
