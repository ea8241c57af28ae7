//! Semantic highlighting types
//!
//! Decoded form of the legacy clangd semantic-highlighting token stream,
//! plus the session-wide scope lookup table advertised at initialization.

use serde::{Deserialize, Serialize};

/// Scope lookup table sent once in the server capabilities
/// (`semanticHighlighting.scopes`). Each entry is a group of TextMate
/// scope names; element 0 is the primary scope used for kind lookup.
/// Immutable for the lifetime of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTable(pub Vec<Vec<String>>);

impl ScopeTable {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self(groups)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Primary scope string for an index, if the index is in range and the
    /// group is non-empty.
    pub fn primary(&self, index: u16) -> Option<&str> {
        self.0
            .get(index as usize)
            .and_then(|group| group.first())
            .map(String::as_str)
    }
}

/// Semantic kind of a highlighted span.
///
/// Finite enumeration of the TextMate scopes clangd emits; anything the
/// table maps to an unrecognized scope string decodes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    Function,
    Method,
    StaticMethod,
    Variable,
    LocalVariable,
    Parameter,
    Field,
    StaticField,
    Class,
    Enum,
    EnumConstant,
    Typedef,
    DependentType,
    DependentName,
    Namespace,
    TemplateParameter,
    Concept,
    Primitive,
    Macro,
    InactiveCode,
    Unknown,
}

impl HighlightKind {
    /// Map a primary TextMate scope string onto a semantic kind.
    /// Total: unrecognized scopes become `Unknown`.
    pub fn from_scope(scope: &str) -> Self {
        match scope {
            "entity.name.function.cpp" => Self::Function,
            "entity.name.function.method.cpp" => Self::Method,
            "entity.name.function.method.static.cpp" => Self::StaticMethod,
            "variable.other.cpp" => Self::Variable,
            "variable.other.local.cpp" => Self::LocalVariable,
            "variable.parameter.cpp" => Self::Parameter,
            "variable.other.field.cpp" => Self::Field,
            "variable.other.field.static.cpp" => Self::StaticField,
            "entity.name.type.class.cpp" => Self::Class,
            "entity.name.type.enum.cpp" => Self::Enum,
            "variable.other.enummember.cpp" => Self::EnumConstant,
            "entity.name.type.typedef.cpp" => Self::Typedef,
            "entity.name.type.dependent.cpp" => Self::DependentType,
            "entity.name.other.dependent.cpp" => Self::DependentName,
            "entity.name.namespace.cpp" => Self::Namespace,
            "entity.name.type.template.cpp" => Self::TemplateParameter,
            "entity.name.type.concept.cpp" => Self::Concept,
            "storage.type.primitive.cpp" => Self::Primitive,
            "entity.name.function.preprocessor.cpp" => Self::Macro,
            "meta.disabled" => Self::InactiveCode,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Method => "Method",
            Self::StaticMethod => "StaticMethod",
            Self::Variable => "Variable",
            Self::LocalVariable => "LocalVariable",
            Self::Parameter => "Parameter",
            Self::Field => "Field",
            Self::StaticField => "StaticField",
            Self::Class => "Class",
            Self::Enum => "Enum",
            Self::EnumConstant => "EnumConstant",
            Self::Typedef => "Typedef",
            Self::DependentType => "DependentType",
            Self::DependentName => "DependentName",
            Self::Namespace => "Namespace",
            Self::TemplateParameter => "TemplateParameter",
            Self::Concept => "Concept",
            Self::Primitive => "Primitive",
            Self::Macro => "Macro",
            Self::InactiveCode => "InactiveCode",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One highlighted span decoded from the packed wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedToken {
    /// Start column of the token.
    pub character: u32,
    /// Length of the token.
    pub length: u32,
    /// Index into the session scope table.
    pub scope_index: u16,
    pub kind: HighlightKind,
}

/// A line of decoded highlightings. Rebuilt wholesale on every
/// notification for a document, never diffed against previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightLine {
    /// The zero-based line position in the text document.
    pub line: u32,
    pub tokens: Vec<DecodedToken>,
}
