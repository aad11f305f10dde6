//! Structured C# source tree.
//!
//! Synthesizers assemble these values; [`crate::render`] turns them into
//! text in one pass. Names, types and parameter lists stay typed until then,
//! so tests can inspect what was generated without diffing text.

use std::fmt;

/// One C# compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub usings: Vec<String>,
    pub namespace: String,
    pub types: Vec<TypeDecl>,
}

impl SourceFile {
    /// Finds an interface by name.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.types.iter().find_map(|decl| match decl {
            TypeDecl::Interface(interface) if interface.name == name => Some(interface),
            _ => None,
        })
    }

    /// Finds a class by name.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.types.iter().find_map(|decl| match decl {
            TypeDecl::Class(class) if class.name == name => Some(class),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    Interface(Interface),
    Class(Class),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<Signature>,
}

impl Interface {
    pub fn method(&self, name: &str) -> Option<&Signature> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub attributes: Vec<String>,
    /// Modifiers before `class` (`"public"`, `"public static"`).
    pub modifiers: &'static str,
    pub name: String,
    pub bases: Vec<String>,
    pub members: Vec<Member>,
}

impl Class {
    /// Creates a `public` class without members.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            modifiers: "public",
            name: name.into(),
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods().find(|method| method.signature.name == name)
    }

    pub fn constants(&self) -> impl Iterator<Item = (&str, &str)> {
        self.members.iter().filter_map(|member| match member {
            Member::Constant { name, value } => Some((name.as_str(), value.as_str())),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// `private readonly {ty} {name};`
    Field { ty: String, name: String },
    /// `public const string {name} = @"{value}";`
    Constant { name: String, value: String },
    /// `public {ty} {name} { get; set; }`
    Property {
        attributes: Vec<String>,
        ty: String,
        name: String,
    },
    Constructor(Constructor),
    Method(Method),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub class: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub attributes: Vec<String>,
    pub signature: Signature,
    pub body: Vec<Stmt>,
}

impl Method {
    /// SQL calls made by this method, in order.
    pub fn sql_calls(&self) -> Vec<&SqlCall> {
        fn collect<'a>(body: &'a [Stmt], calls: &mut Vec<&'a SqlCall>) {
            for stmt in body {
                match stmt {
                    Stmt::Sql(call) => calls.push(call),
                    Stmt::If { body, .. } => collect(body, calls),
                    _ => {}
                }
            }
        }

        let mut calls = Vec::new();
        collect(&self.body, &mut calls);
        calls
    }

    /// `DynamicParameters` additions made by this method, in order.
    pub fn added_parameters(&self) -> Vec<(&str, Direction)> {
        self.body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::AddParameter { name, direction, .. } => Some((name.as_str(), *direction)),
                _ => None,
            })
            .collect()
    }
}

/// Method signature shared by interface declarations and implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub returns: String,
    pub name: String,
    pub params: Vec<Param>,
}

impl Signature {
    pub fn new(returns: impl Into<String>, name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            returns: returns.into(),
            name: name.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub attributes: Vec<String>,
    pub ty: String,
    pub name: String,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            ty: ty.into(),
            name: name.into(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Blank,
    /// A complete statement, rendered verbatim.
    Line(String),
    If { condition: String, body: Vec<Stmt> },
    /// `parameters.Add("{name}", {value}, direction: ParameterDirection.{direction});`
    AddParameter {
        name: String,
        value: String,
        direction: Direction,
    },
    Sql(SqlCall),
    Return(String),
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("Input"),
            Self::Output => f.write_str("Output"),
        }
    }
}

/// A call through the generated code's SQL service.
///
/// Renders as `var {binding} = await _sqlService.{method}({query},
/// CommandType.Text, {args});`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCall {
    pub binding: Option<String>,
    pub method: String,
    pub query: QueryRef,
    pub args: Args,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    None,
    /// A named `DynamicParameters` variable.
    Parameters(String),
    /// An anonymous object `new { field = value, ... }`.
    Object(Vec<FieldValue>),
}

impl Args {
    /// Field names of an anonymous parameter object.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Object(fields) => fields.iter().map(|f| f.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Reference to a query constant, `{class}.{key}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRef {
    pub class: String,
    pub key: String,
}

impl fmt::Display for QueryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.key)
    }
}
