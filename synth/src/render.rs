//! Deterministic text rendering of a [`SourceFile`].
//!
//! Four-space indentation, `\n` line endings, Allman braces, one blank line
//! between type declarations and between members other than runs of fields
//! or constants. Every method renders as `public async`.

use crate::ast::{
    Args, Class, Constructor, Interface, Member, Method, Param, Signature, SourceFile, Stmt,
    TypeDecl,
};

#[derive(Default)]
struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close(&mut self, suffix: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }
}

/// Renders a source file to text.
pub fn render(source: &SourceFile) -> String {
    let mut w = Writer::default();

    for using in &source.usings {
        w.line(&format!("using {using};"));
    }
    if !source.usings.is_empty() {
        w.blank();
    }

    w.line(&format!("namespace {}", source.namespace));
    w.open();
    for (index, decl) in source.types.iter().enumerate() {
        if index > 0 {
            w.blank();
        }
        match decl {
            TypeDecl::Interface(interface) => render_interface(&mut w, interface),
            TypeDecl::Class(class) => render_class(&mut w, class),
        }
    }
    w.close("");

    w.out
}

/// Renders a signature without modifiers: `Task<int> InsertAsync(User user)`.
pub fn signature(signature: &Signature) -> String {
    format!(
        "{} {}({})",
        signature.returns,
        signature.name,
        params(&signature.params)
    )
}

fn params(params: &[Param]) -> String {
    params.iter().map(param).collect::<Vec<_>>().join(", ")
}

fn param(param: &Param) -> String {
    let attributes: String = param
        .attributes
        .iter()
        .map(|attribute| format!("[{attribute}] "))
        .collect();
    format!("{attributes}{} {}", param.ty, param.name)
}

fn render_interface(w: &mut Writer, interface: &Interface) {
    w.line(&format!("public interface {}", interface.name));
    w.open();
    for method in &interface.methods {
        w.line(&format!("{};", signature(method)));
    }
    w.close("");
}

fn render_class(w: &mut Writer, class: &Class) {
    for attribute in &class.attributes {
        w.line(&format!("[{attribute}]"));
    }
    let mut header = format!("{} class {}", class.modifiers, class.name);
    if !class.bases.is_empty() {
        header.push_str(" : ");
        header.push_str(&class.bases.join(", "));
    }
    w.line(&header);
    w.open();

    let mut previous: Option<&Member> = None;
    for member in &class.members {
        if let Some(previous) = previous {
            let grouped = matches!(
                (previous, member),
                (Member::Field { .. }, Member::Field { .. })
                    | (Member::Constant { .. }, Member::Constant { .. })
            );
            if !grouped {
                w.blank();
            }
        }
        render_member(w, member);
        previous = Some(member);
    }

    w.close("");
}

fn render_member(w: &mut Writer, member: &Member) {
    match member {
        Member::Field { ty, name } => w.line(&format!("private readonly {ty} {name};")),
        Member::Constant { name, value } => w.line(&format!(
            "public const string {name} = @\"{}\";",
            value.replace('"', "\"\"")
        )),
        Member::Property {
            attributes,
            ty,
            name,
        } => {
            for attribute in attributes {
                w.line(&format!("[{attribute}]"));
            }
            w.line(&format!("public {ty} {name} {{ get; set; }}"));
        }
        Member::Constructor(constructor) => render_constructor(w, constructor),
        Member::Method(method) => render_method(w, method),
    }
}

fn render_constructor(w: &mut Writer, constructor: &Constructor) {
    if constructor.params.len() <= 1 {
        w.line(&format!(
            "public {}({})",
            constructor.class,
            params(&constructor.params)
        ));
    } else {
        w.line(&format!("public {}(", constructor.class));
        w.indent += 1;
        let last = constructor.params.len() - 1;
        for (index, p) in constructor.params.iter().enumerate() {
            let end = if index == last { ")" } else { "," };
            w.line(&format!("{}{end}", param(p)));
        }
        w.indent -= 1;
    }
    w.open();
    render_block(w, &constructor.body);
    w.close("");
}

fn render_method(w: &mut Writer, method: &Method) {
    for attribute in &method.attributes {
        w.line(&format!("[{attribute}]"));
    }
    w.line(&format!("public async {}", signature(&method.signature)));
    w.open();
    render_block(w, &method.body);
    w.close("");
}

fn render_block(w: &mut Writer, body: &[Stmt]) {
    for stmt in body {
        render_stmt(w, stmt);
    }
}

fn render_stmt(w: &mut Writer, stmt: &Stmt) {
    match stmt {
        Stmt::Blank => w.blank(),
        Stmt::Line(text) => w.line(text),
        Stmt::If { condition, body } => {
            w.line(&format!("if ({condition})"));
            w.open();
            render_block(w, body);
            w.close("");
        }
        Stmt::AddParameter {
            name,
            value,
            direction,
        } => w.line(&format!(
            "parameters.Add(\"{name}\", {value}, direction: ParameterDirection.{direction});"
        )),
        Stmt::Sql(call) => {
            let binding = call
                .binding
                .as_ref()
                .map(|name| format!("var {name} = "))
                .unwrap_or_default();
            let head = format!(
                "{binding}await _sqlService.{}({}, CommandType.Text",
                call.method, call.query
            );
            match &call.args {
                Args::None => w.line(&format!("{head});")),
                Args::Parameters(variable) => w.line(&format!("{head}, {variable});")),
                Args::Object(fields) => {
                    w.line(&format!("{head}, new"));
                    w.open();
                    let last = fields.len().saturating_sub(1);
                    for (index, field) in fields.iter().enumerate() {
                        let comma = if index == last { "" } else { "," };
                        w.line(&format!("{} = {}{comma}", field.field, field.value));
                    }
                    w.close(");");
                }
            }
        }
        Stmt::Return(expression) => w.line(&format!("return {expression};")),
    }
}
