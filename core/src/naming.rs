//! Name derivations shared by every synthesizer.
//!
//! Declared names are used verbatim for types, members and columns. The two
//! derived forms below are the only transformations applied anywhere, which
//! keeps identifiers identical across artifacts.

/// Initial-lowercase form used for parameters and locals (`EmailAddress` →
/// `emailAddress`).
///
/// # Examples
///
/// ```
/// use crudgen_core::naming::camel;
///
/// assert_eq!(camel("EmailAddress"), "emailAddress");
/// assert_eq!(camel("ID"), "iD");
/// assert_eq!(camel(""), "");
/// ```
pub fn camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-cased form used inside constant-style query keys (`CreatedAt` →
/// `CREATEDAT`).
pub fn constant(name: &str) -> String {
    name.to_uppercase()
}

/// Reserved C# keywords. Contextual keywords (`var`, `value`, `async`...) are
/// legal identifiers and not listed.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Returns the reserved C# keyword `name` turns into once a derived form
/// is used as a parameter or local (`Event` → `event`), if any.
///
/// # Examples
///
/// ```
/// use crudgen_core::naming::reserved_keyword;
///
/// assert_eq!(reserved_keyword("Object"), Some("object"));
/// assert_eq!(reserved_keyword("User"), None);
/// ```
pub fn reserved_keyword(name: &str) -> Option<&'static str> {
    let camel = camel(name);
    CSHARP_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| *keyword == name || *keyword == camel)
}
