//! Análisis semántico.
//!
//! Esta fase verifica tipos y mutabilidad a la vez que reconstruye el
//! árbol de [`crate::parse`] en la forma de [`crate::ast`]. El recorrido
//! es de abajo hacia arriba: los eslabones de cada [`parse::Chain`] se
//! pliegan en nodos binarios que asocian a la izquierda, usando como
//! operando izquierdo al acumulador ya verificado.
//!
//! El análisis se detiene en el primer error encontrado.

use std::{collections::HashMap, rc::Rc};

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Block, Branch, Expr, ExprKind, Statement, Type},
    lex::Identifier,
    parse::{self, BinOp, Chain, Link, LiteralKind, UnOp},
    source::{Located, Position},
};

/// Tabla de identificadores.
///
/// Existe un único espacio de nombres global: las declaraciones
/// dentro de bloques `if`/`while` continúan visibles luego del bloque.
/// La iteración ocurre en orden de inserción.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<Identifier, Binding>,
    order: Vec<Identifier>,
}

/// Entrada de la tabla de identificadores.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    ty: Option<Type>,
    mutable: bool,
}

impl Binding {
    pub fn new(ty: Option<Type>, mutable: bool) -> Self {
        Binding { ty, mutable }
    }

    /// Tipo de dato, `None` si todavía no se ha inferido.
    pub fn ty(&self) -> Option<Type> {
        self.ty
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Agrega una entrada nueva. Retorna `false` si el nombre ya existía,
    /// en cuyo caso la tabla no cambia.
    pub fn insert(&mut self, name: Identifier, binding: Binding) -> bool {
        if self.symbols.contains_key(&name) {
            return false;
        }

        self.symbols.insert(name.clone(), binding);
        self.order.push(name);

        true
    }

    /// Itera en orden de inserción.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Binding)> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.symbols.get(name).map(|binding| (name, binding)))
    }

    fn lookup(&self, id: &Located<Identifier>) -> Semantic<Binding> {
        self.symbols.get(id.val()).copied().ok_or_else(|| {
            Located::at(SemanticError::Undefined(id.val().clone()), id.position())
        })
    }

    fn declare(&mut self, id: &Located<Identifier>, binding: Binding) -> Semantic<()> {
        if self.insert(id.val().clone(), binding) {
            debug!(name = %id.val(), ty = ?binding.ty, mutable = binding.mutable, "declared");
            Ok(())
        } else {
            Err(Located::at(
                SemanticError::Redeclared(id.val().clone()),
                id.position(),
            ))
        }
    }

    fn ensure_undeclared(&self, id: &Located<Identifier>) -> Semantic<()> {
        match self.contains(id.val().as_ref()) {
            false => Ok(()),
            true => Err(Located::at(
                SemanticError::Redeclared(id.val().clone()),
                id.position(),
            )),
        }
    }
}

pub type Semantic<T> = Result<T, Located<SemanticError>>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Symbol `{0}` is undefined")]
    Undefined(Identifier),

    #[error("Symbol `{0}` is already declared")]
    Redeclared(Identifier),

    #[error("Cannot assign to immutable variable `{0}`, declare it with `let mut`")]
    Immutable(Identifier),

    #[error("Variable `{0}` is used before its first assignment")]
    Uninitialized(Identifier),

    #[error("Type mismatch: expected `{0}`, found `{1}`")]
    ExpectedType(Type, Type),

    #[error("Condition must be of type `bool`, found `{0}`")]
    NonBooleanCondition(Type),

    #[error("Operator `{0}` expects `int`, `char` or `float`, found `{1}`")]
    ExpectedArithmetic(String, Type),

    #[error("Operator `{0}` expects `bool`, found `{1}`")]
    ExpectedBool(String, Type),
}

/// Resultado de análisis semántico.
///
/// La tabla de identificadores se transfiere junto al árbol, ya que
/// generación de código intermedio continúa extendiéndola.
#[derive(Debug)]
pub struct Checked {
    pub block: Block,
    pub symbols: SymbolTable,
}

impl parse::Program {
    /// Verifica el programa y lo reconstruye como árbol verificado.
    pub fn check(self, symbols: SymbolTable) -> Semantic<Checked> {
        let mut checker = Checker { symbols };
        let block = checker.block(self)?;

        Ok(Checked {
            block,
            symbols: checker.symbols,
        })
    }
}

struct Checker {
    symbols: SymbolTable,
}

impl Checker {
    fn block(&mut self, program: parse::Program) -> Semantic<Block> {
        let mut statements = Vec::new();
        for statement in program.into_statements() {
            if let Some(statement) = self.statement(statement)? {
                statements.push(statement);
            }
        }

        Ok(Block(statements))
    }

    fn statement(&mut self, statement: parse::Statement) -> Semantic<Option<Statement>> {
        use parse::Statement::*;

        let statement = match statement {
            Reassign { target, value } => self.reassign(target, value)?,
            Let(declaration) => return self.declaration(declaration),

            If {
                condition,
                body,
                mut tail,
            } => {
                let mut branches = vec![Branch {
                    condition: self.condition(condition)?,
                    body: self.block(body)?,
                }];

                let otherwise = loop {
                    match tail {
                        parse::ElseTail::Empty => break None,
                        parse::ElseTail::Else(body) => break Some(self.block(body)?),
                        parse::ElseTail::ElseIf {
                            condition,
                            body,
                            tail: next,
                        } => {
                            branches.push(Branch {
                                condition: self.condition(condition)?,
                                body: self.block(body)?,
                            });

                            tail = *next;
                        }
                    }
                };

                Statement::If {
                    branches,
                    otherwise,
                }
            }

            While { condition, body } => Statement::While {
                condition: self.condition(condition)?,
                body: self.block(body)?,
            },

            Output { format, args } => Statement::Output {
                format: format.into_inner(),
                args: args
                    .into_iter()
                    .map(|arg| self.relation(arg))
                    .collect::<Semantic<Vec<_>>>()?,
            },
        };

        Ok(Some(statement))
    }

    fn reassign(
        &mut self,
        target: Located<Identifier>,
        value: parse::Relation,
    ) -> Semantic<Statement> {
        let binding = self.symbols.lookup(&target)?;
        if !binding.mutable {
            return Err(Located::at(
                SemanticError::Immutable(target.val().clone()),
                target.position(),
            ));
        }

        let value = self.relation(value)?;
        let ty = match binding.ty {
            Some(ty) if ty == value.ty => ty,
            Some(ty) => {
                return Err(Located::at(
                    SemanticError::ExpectedType(ty, value.ty),
                    target.position(),
                ))
            }

            // Tipado diferido: la primera asignación fija el tipo
            None => {
                if let Some(entry) = self.symbols.symbols.get_mut(target.val()) {
                    entry.ty = Some(value.ty);
                }

                debug!(name = %target.val(), ty = %value.ty, "inferred");
                value.ty
            }
        };

        Ok(Statement::Assign {
            target: target.into_inner(),
            value,
            ty,
        })
    }

    fn declaration(&mut self, declaration: parse::Declaration) -> Semantic<Option<Statement>> {
        let (name, value, mutable) = match declaration {
            parse::Declaration::Immutable { name, value } => (name, Some(value), false),
            parse::Declaration::Mutable { name, value } => (name, value, true),
        };

        self.symbols.ensure_undeclared(&name)?;

        let value = match value {
            Some(value) => self.relation(value)?,
            None => {
                self.symbols.declare(&name, Binding::new(None, mutable))?;
                return Ok(None);
            }
        };

        let ty = value.ty;
        self.symbols.declare(&name, Binding::new(Some(ty), mutable))?;

        Ok(Some(Statement::Assign {
            target: name.into_inner(),
            value,
            ty,
        }))
    }

    fn condition(&mut self, condition: Located<parse::Relation>) -> Semantic<Expr> {
        let (position, relation) = condition.split();

        let condition = self.relation(relation)?;
        match condition.ty {
            Type::Bool => Ok(condition),
            other => Err(Located::at(
                SemanticError::NonBooleanCondition(other),
                position,
            )),
        }
    }

    fn relation(&mut self, relation: parse::Relation) -> Semantic<Expr> {
        self.fold(relation, |this, term| this.fold(term, Self::not_term))
    }

    fn not_term(&mut self, term: parse::NotTerm) -> Semantic<Expr> {
        match term {
            parse::NotTerm::Not { bang, operand } => {
                let operand = self.relation(*operand)?;
                expect_bool(&UnOp::Not, operand.ty, bang)?;

                Ok(Expr::new(
                    ExprKind::Unary(UnOp::Not, Box::new(operand)),
                    Type::Bool,
                ))
            }

            parse::NotTerm::Compare { lhs, rhs } => {
                let lhs = self.expr(lhs)?;
                match rhs {
                    None => Ok(lhs),
                    Some((op, rhs)) => {
                        let rhs = self.expr(rhs)?;
                        binary(op, lhs, rhs)
                    }
                }
            }
        }
    }

    fn expr(&mut self, expr: parse::Expr) -> Semantic<Expr> {
        self.fold(expr, |this, term| this.fold(term, Self::factor))
    }

    fn factor(&mut self, factor: parse::Factor) -> Semantic<Expr> {
        use parse::Factor::*;

        match factor {
            Id(id) => {
                let ty = self.symbols.lookup(&id)?.ty.ok_or_else(|| {
                    Located::at(SemanticError::Uninitialized(id.val().clone()), id.position())
                })?;

                Ok(Expr::new(ExprKind::Variable(id.into_inner()), ty))
            }

            Literal(literal) => {
                let literal = literal.into_inner();
                let ty = match literal.kind {
                    LiteralKind::Int => Type::Int,
                    LiteralKind::Float => Type::Float,
                    LiteralKind::Char => Type::Char,
                    LiteralKind::Bool => Type::Bool,
                };

                Ok(Expr::new(ExprKind::Literal(Rc::clone(&literal.lexeme)), ty))
            }

            Input(_) => Ok(Expr::new(ExprKind::Input, Type::Int)),
            Group(relation) => self.relation(*relation),

            Negate { minus, operand } => {
                let operand = self.factor(*operand)?;
                expect_arithmetic(&UnOp::Neg, operand.ty, minus)?;

                let ty = promote(operand.ty, operand.ty);
                Ok(Expr::new(ExprKind::Unary(UnOp::Neg, Box::new(operand)), ty))
            }
        }
    }

    /// Pliega una secuencia en un árbol binario que asocia a la izquierda.
    fn fold<T, F>(&mut self, chain: Chain<T>, mut inner: F) -> Semantic<Expr>
    where
        F: FnMut(&mut Self, T) -> Semantic<Expr>,
    {
        let mut accumulator = inner(self, chain.first)?;
        for Link { op, operand } in chain.rest {
            let operand = inner(self, operand)?;
            accumulator = binary(op, accumulator, operand)?;
        }

        Ok(accumulator)
    }
}

fn binary(op: Located<BinOp>, lhs: Expr, rhs: Expr) -> Semantic<Expr> {
    use BinOp::*;

    let (position, op) = op.split();
    let ty = match op {
        Add | Sub | Mul | Div | Mod => {
            expect_arithmetic(&op, lhs.ty, position)?;
            expect_arithmetic(&op, rhs.ty, position)?;

            promote(lhs.ty, rhs.ty)
        }

        Equal | NotEqual | Less | LessOrEqual | Greater | GreaterOrEqual => {
            expect_arithmetic(&op, lhs.ty, position)?;
            expect_arithmetic(&op, rhs.ty, position)?;

            Type::Bool
        }

        And | Or => {
            expect_bool(&op, lhs.ty, position)?;
            expect_bool(&op, rhs.ty, position)?;

            Type::Bool
        }
    };

    Ok(Expr::new(
        ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
        ty,
    ))
}

/// `float` si cualquiera de los operandos lo es, de lo contrario `int`.
fn promote(lhs: Type, rhs: Type) -> Type {
    match (lhs, rhs) {
        (Type::Float, _) | (_, Type::Float) => Type::Float,
        _ => Type::Int,
    }
}

fn expect_arithmetic<O: ToString>(op: &O, ty: Type, position: Position) -> Semantic<()> {
    match ty.is_arithmetic() {
        true => Ok(()),
        false => Err(Located::at(
            SemanticError::ExpectedArithmetic(op.to_string(), ty),
            position,
        )),
    }
}

fn expect_bool<O: ToString>(op: &O, ty: Type, position: Position) -> Semantic<()> {
    match ty {
        Type::Bool => Ok(()),
        _ => Err(Located::at(
            SemanticError::ExpectedBool(op.to_string(), ty),
            position,
        )),
    }
}
