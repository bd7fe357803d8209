use std::fmt;

/// Name of a type: one of the built-ins or a user-defined class. Two types are
/// compatible only when their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    pub const INT: &'static str = "Int";
    pub const STRING: &'static str = "String";
    pub const BOOLEAN: &'static str = "Boolean";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn int() -> Self {
        Self::new(Self::INT)
    }

    pub fn string() -> Self {
        Self::new(Self::STRING)
    }

    pub fn boolean() -> Self {
        Self::new(Self::BOOLEAN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Result of type inference. `Unknown` only equals itself, so an unresolved
/// name never satisfies a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InferredType {
    Known(TypeName),
    Unknown,
}

impl InferredType {
    pub fn int() -> Self {
        InferredType::Known(TypeName::int())
    }

    pub fn string() -> Self {
        InferredType::Known(TypeName::string())
    }

    pub fn boolean() -> Self {
        InferredType::Known(TypeName::boolean())
    }

    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            InferredType::Known(name) => Some(name),
            InferredType::Unknown => None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.type_name().is_some_and(|ty| ty.as_str() == name)
    }
}

impl From<TypeName> for InferredType {
    fn from(name: TypeName) -> Self {
        InferredType::Known(name)
    }
}

impl From<Option<TypeName>> for InferredType {
    fn from(name: Option<TypeName>) -> Self {
        name.map_or(InferredType::Unknown, InferredType::Known)
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Known(name) => write!(f, "{}", name),
            InferredType::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Which attribute table name lookups resolve against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    TopLevel,
    Class(String),
}

impl Scope {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Scope::TopLevel => None,
            Scope::Class(name) => Some(name),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::TopLevel => write!(f, "top level"),
            Scope::Class(name) => write!(f, "class {}", name),
        }
    }
}
