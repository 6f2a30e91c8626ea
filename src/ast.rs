//! Árbol sintáctico verificado.
//!
//! A diferencia de [`crate::parse`], cada nodo de este árbol corresponde
//! a un operador o tipo de sentencia en tiempo de ejecución, y toda
//! expresión lleva un tipo de dato concreto. Estos árboles solo se
//! construyen a partir de análisis semántico.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

use crate::lex::Identifier;

pub use crate::parse::{BinOp, UnOp};

/// Tipo de dato resuelto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Char,
    Float,
}

impl Type {
    /// Determina si el tipo admite operadores aritméticos y relacionales.
    pub fn is_arithmetic(self) -> bool {
        !matches!(self, Type::Bool)
    }
}

impl Display for Type {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => fmt.write_str("int"),
            Type::Bool => fmt.write_str("bool"),
            Type::Char => fmt.write_str("char"),
            Type::Float => fmt.write_str("float"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block(pub Vec<Statement>);

impl Block {
    pub fn statements(&self) -> &[Statement] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Asignación, incluyendo declaraciones con inicializador.
    Assign {
        target: Identifier,
        value: Expr,
        ty: Type,
    },

    /// Cadena completa `if`/`else if`/`else`.
    If {
        branches: Vec<Branch>,
        otherwise: Option<Block>,
    },

    While {
        condition: Expr,
        body: Block,
    },

    Output {
        format: Rc<str>,
        args: Vec<Expr>,
    },
}

/// Par condición-cuerpo de un `if` o `else if`.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constante literal, con su lexema original.
    Literal(Rc<str>),
    Variable(Identifier),
    Input,
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Expr { kind, ty }
    }
}
