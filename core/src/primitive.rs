//! The closed set of primitive kinds and their lookup table.
//!
//! Everything that switches on a property's primitive (target type mapping,
//! pagination filter shape, legal `Depends.when` tokens and the condition
//! each token renders to) reads from [`PrimitiveKind::spec`], so every
//! synthesizer sees the same answers.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Primitive kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Decimal,
    DateTime,
    String,
    Bool,
}

/// One legal `Depends.when` state and the condition it stands for.
///
/// `condition` is a C# boolean expression in which `{}` is replaced by the
/// member access of the depended-on property (e.g. `x.Email`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhenState {
    pub token: &'static str,
    pub condition: &'static str,
}

impl WhenState {
    /// Renders the condition for `member`.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_core::PrimitiveKind;
    ///
    /// let filled = PrimitiveKind::String.spec().when_state("FILLED").unwrap();
    /// assert_eq!(filled.render("x.Email"), "!string.IsNullOrWhiteSpace(x.Email)");
    /// ```
    pub fn render(&self, member: &str) -> String {
        self.condition.replace("{}", member)
    }
}

/// Table entry for one primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveSpec {
    pub kind: PrimitiveKind,
    /// Token used in the schema document.
    pub token: &'static str,
    /// Target-language type for members, parameters and return values.
    pub cs_type: &'static str,
    /// Target-language type for optional pagination filters.
    pub filter_type: &'static str,
    /// Paginate filters this primitive with a `from`/`to` pair.
    pub range_filter: bool,
    /// Legal `Depends.when` states.
    pub when: &'static [WhenState],
}

impl PrimitiveSpec {
    /// Looks up a `when` state case-insensitively.
    pub fn when_state(&self, token: &str) -> Option<&'static WhenState> {
        self.when
            .iter()
            .find(|state| state.token.eq_ignore_ascii_case(token.trim()))
    }

    /// Allowed `when` tokens joined for diagnostics (`"filled, empty"`).
    pub fn allowed_when(&self) -> String {
        self.when
            .iter()
            .map(|state| state.token)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const NUMBER_WHEN: &[WhenState] = &[
    WhenState {
        token: "filled",
        condition: "{} != 0",
    },
    WhenState {
        token: "empty",
        condition: "{} == 0",
    },
    WhenState {
        token: "zero",
        condition: "{} == 0",
    },
    WhenState {
        token: "positive",
        condition: "{} > 0",
    },
    WhenState {
        token: "negative",
        condition: "{} < 0",
    },
];

const DATETIME_WHEN: &[WhenState] = &[
    WhenState {
        token: "filled",
        condition: "{} != default(DateTime)",
    },
    WhenState {
        token: "empty",
        condition: "{} == default(DateTime)",
    },
    WhenState {
        token: "past",
        condition: "{} < DateTime.Now",
    },
    WhenState {
        token: "future",
        condition: "{} > DateTime.Now",
    },
];

const STRING_WHEN: &[WhenState] = &[
    WhenState {
        token: "filled",
        condition: "!string.IsNullOrWhiteSpace({})",
    },
    WhenState {
        token: "empty",
        condition: "string.IsNullOrWhiteSpace({})",
    },
];

const BOOL_WHEN: &[WhenState] = &[
    WhenState {
        token: "true",
        condition: "{}",
    },
    WhenState {
        token: "false",
        condition: "!{}",
    },
];

static TABLE: [PrimitiveSpec; 5] = [
    PrimitiveSpec {
        kind: PrimitiveKind::Int,
        token: "int",
        cs_type: "int",
        filter_type: "int?",
        range_filter: false,
        when: NUMBER_WHEN,
    },
    PrimitiveSpec {
        kind: PrimitiveKind::Decimal,
        token: "decimal",
        cs_type: "decimal",
        filter_type: "decimal?",
        range_filter: false,
        when: NUMBER_WHEN,
    },
    PrimitiveSpec {
        kind: PrimitiveKind::DateTime,
        token: "datetime",
        cs_type: "DateTime",
        filter_type: "DateTime?",
        range_filter: true,
        when: DATETIME_WHEN,
    },
    PrimitiveSpec {
        kind: PrimitiveKind::String,
        token: "string",
        cs_type: "string",
        filter_type: "string",
        range_filter: false,
        when: STRING_WHEN,
    },
    PrimitiveSpec {
        kind: PrimitiveKind::Bool,
        token: "bool",
        cs_type: "bool",
        filter_type: "bool?",
        range_filter: false,
        when: BOOL_WHEN,
    },
];

impl PrimitiveKind {
    /// Every primitive kind, in table order.
    pub const ALL: [PrimitiveKind; 5] = [
        Self::Int,
        Self::Decimal,
        Self::DateTime,
        Self::String,
        Self::Bool,
    ];

    /// Returns the table entry for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen_core::PrimitiveKind;
    ///
    /// let spec = PrimitiveKind::DateTime.spec();
    /// assert_eq!(spec.cs_type, "DateTime");
    /// assert!(spec.range_filter);
    /// assert_eq!(spec.allowed_when(), "filled, empty, past, future");
    /// ```
    pub fn spec(self) -> &'static PrimitiveSpec {
        match self {
            Self::Int => &TABLE[0],
            Self::Decimal => &TABLE[1],
            Self::DateTime => &TABLE[2],
            Self::String => &TABLE[3],
            Self::Bool => &TABLE[4],
        }
    }

    /// Target-language type name.
    pub fn cs_type(self) -> &'static str {
        self.spec().cs_type
    }
}

impl FromStr for PrimitiveKind {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        TABLE
            .iter()
            .find(|spec| spec.token.eq_ignore_ascii_case(token.trim()))
            .map(|spec| spec.kind)
            .ok_or_else(|| ConfigError::UnsupportedPrimitive(token.to_string()))
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_keyed_by_kind() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.spec().kind, kind);
            assert_eq!(kind.spec().token.parse::<PrimitiveKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("DateTime".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::DateTime);
        assert_eq!(" BOOL ".parse::<PrimitiveKind>().unwrap(), PrimitiveKind::Bool);
    }

    #[test]
    fn test_unknown_primitive_is_config_error() {
        assert_eq!(
            "guid".parse::<PrimitiveKind>(),
            Err(ConfigError::UnsupportedPrimitive("guid".into()))
        );
    }

    #[test]
    fn test_only_datetime_filters_by_range() {
        let ranged: Vec<_> = PrimitiveKind::ALL
            .into_iter()
            .filter(|kind| kind.spec().range_filter)
            .collect();
        assert_eq!(ranged, vec![PrimitiveKind::DateTime]);
    }

    #[test]
    fn test_bool_conditions() {
        let spec = PrimitiveKind::Bool.spec();
        assert_eq!(spec.when_state("true").unwrap().render("x.Active"), "x.Active");
        assert_eq!(spec.when_state("False").unwrap().render("x.Active"), "!x.Active");
        assert!(spec.when_state("filled").is_none());
    }
}
