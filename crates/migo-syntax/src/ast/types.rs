//! Type expressions

use crate::lexer::PosRange;

use super::{GenDecl, Ident, Spanned};

/// A type as written in the source
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `struct { a, b int; c string }`
    Struct(StructType),
    /// `interface {}`
    Trait(TraitType),
    /// A named type (`int`, `Point`)
    Alias(TypeAlias),
    /// `fun(a int) int`
    Func(Box<FuncType>),
}

impl Spanned for Type {
    fn range(&self) -> PosRange {
        match self {
            Self::Struct(ty) => ty.range,
            Self::Trait(ty) => ty.range,
            Self::Alias(ty) => ty.ident.range(),
            Self::Func(ty) => ty.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<GenDecl>,
    pub range: PosRange,
}

/// An interface type
// TODO: carry the method set once interface bodies are parsed
#[derive(Debug, Clone, PartialEq)]
pub struct TraitType {
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub ident: Ident,
}

/// A function signature: parameter groups and result types
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub params: Vec<GenDecl>,
    pub results: Vec<Type>,
    pub range: PosRange,
}
