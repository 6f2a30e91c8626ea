//! Análisis sintáctico.
//!
//! El parser es predictivo (LL(1)): decide cada producción a partir de
//! únicamente el token actual, sin backtracking. El árbol resultante
//! conserva la forma de la gramática. En particular, las secuencias de
//! operadores binarios de igual precedencia no se asocian aquí, sino que
//! se mantienen como un primer operando seguido de eslabones
//! `(operador, operando)` en [`Chain`]. La asociación a la izquierda
//! ocurre durante análisis semántico.
//!
//! El parser no consulta la tabla de identificadores ni verifica tipos.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

use thiserror::Error;

use crate::{
    lex::{Identifier, Keyword, Token, TokenKind},
    source::{Located, Position},
};

/// `Program := (Statement ;)*`
#[derive(Debug)]
pub struct Program(Vec<Statement>);

impl Program {
    pub fn statements(&self) -> &[Statement] {
        &self.0
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.0
    }
}

#[derive(Debug)]
pub enum Statement {
    /// `v = Relation`, sobre una variable previamente declarada.
    Reassign {
        target: Located<Identifier>,
        value: Relation,
    },

    /// `let DeclTail`
    Let(Declaration),

    /// `if Relation { Program } ElseTail`
    If {
        condition: Located<Relation>,
        body: Program,
        tail: ElseTail,
    },

    /// `while Relation { Program }`
    While {
        condition: Located<Relation>,
        body: Program,
    },

    /// `output StringLiteral (, Relation)*`
    Output {
        format: Located<Rc<str>>,
        args: Vec<Relation>,
    },
}

#[derive(Debug)]
pub enum Declaration {
    /// `let v = Relation`
    Immutable {
        name: Located<Identifier>,
        value: Relation,
    },

    /// `let mut v` con inicializador opcional.
    Mutable {
        name: Located<Identifier>,
        value: Option<Relation>,
    },
}

#[derive(Debug)]
pub enum ElseTail {
    Empty,

    /// `else if Relation { Program } ElseTail`
    ElseIf {
        condition: Located<Relation>,
        body: Program,
        tail: Box<ElseTail>,
    },

    /// `else { Program }`
    Else(Program),
}

/// `Relation := AndTerm (|| AndTerm)*`
pub type Relation = Chain<AndTerm>;

/// `AndTerm := NotTerm (&& NotTerm)*`
pub type AndTerm = Chain<NotTerm>;

#[derive(Debug)]
pub enum NotTerm {
    /// `! ( Relation )`
    Not {
        bang: Position,
        operand: Box<Relation>,
    },

    /// `Expr (RelOp Expr)?`
    Compare {
        lhs: Expr,
        rhs: Option<(Located<BinOp>, Expr)>,
    },
}

/// `Expr := Term ((+|-) Term)*`
pub type Expr = Chain<Term>;

/// `Term := Factor ((*|/|%) Factor)*`
pub type Term = Chain<Factor>;

#[derive(Debug)]
pub enum Factor {
    Id(Located<Identifier>),
    Literal(Located<Literal>),
    Input(Position),
    Group(Box<Relation>),
    Negate {
        minus: Position,
        operand: Box<Factor>,
    },
}

/// Secuencia de operandos de igual precedencia.
#[derive(Debug)]
pub struct Chain<T> {
    pub first: T,
    pub rest: Vec<Link<T>>,
}

/// Eslabón de continuación de una [`Chain`].
#[derive(Debug)]
pub struct Link<T> {
    pub op: Located<BinOp>,
    pub operand: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub lexeme: Rc<str>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Char,
    Bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
}

impl Display for BinOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinOp::*;

        let symbol = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
            And => "&&",
            Or => "||",
        };

        fmt.write_str(symbol)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl Display for UnOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => fmt.write_str("-"),
            UnOp::Not => fmt.write_str("!"),
        }
    }
}

/// Descripción de lo que el parser esperaba encontrar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Statement,
    Operand,
    Declaration,
    ElseBody,
}

impl Display for Expected {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => kind.fmt(fmt),
            Expected::Statement => {
                fmt.write_str("any of assignment, `let`, `if`, `while` or `output`")
            }
            Expected::Operand => fmt.write_str("an identifier, literal, `input`, `(` or `-`"),
            Expected::Declaration => fmt.write_str("identifier or `mut`"),
            Expected::ElseBody => fmt.write_str("`if` or `{`"),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected {0}, found `{1}` instead")]
    UnexpectedToken(Expected, String),

    #[error("Expected {0}, found end of file instead")]
    UnexpectedEof(Expected),

    #[error("{0}")]
    Lexical(String),
}

impl ParserError {
    /// Lexema del token que provocó el error, si existe.
    pub fn lexeme(&self) -> Option<&str> {
        match self {
            ParserError::UnexpectedToken(_, found) => Some(found),
            ParserError::UnexpectedEof(_) => None,
            ParserError::Lexical(message) => Some(message),
        }
    }
}

pub type SyntaxError = Located<ParserError>;

/// Construye un árbol sintáctico a partir de un flujo de tokens.
///
/// El flujo debe terminar en un centinela. Un fin de flujo sin
/// centinela se trata como [`TokenKind::Eof`].
pub fn parse<I>(tokens: I) -> Result<Program, SyntaxError>
where
    I: Iterator<Item = Token>,
{
    let mut parser = Parser::new(tokens);

    let program = parser.program()?;
    match parser.peek() {
        TokenKind::Eof => Ok(program),
        _ => parser.unexpected(Expected::Statement),
    }
}

struct Parser<I> {
    tokens: I,
    lookahead: Token,
}

type Parse<T> = Result<T, SyntaxError>;

impl<I: Iterator<Item = Token>> Parser<I> {
    fn new(mut tokens: I) -> Self {
        let lookahead = tokens
            .next()
            .unwrap_or_else(|| Token::eof(Position::default()));

        Parser { tokens, lookahead }
    }

    fn program(&mut self) -> Parse<Program> {
        let mut statements = Vec::new();
        while starts_statement(self.peek()) {
            statements.push(self.statement()?);
            self.expect(TokenKind::Semicolon)?;
        }

        Ok(Program(statements))
    }

    fn statement(&mut self) -> Parse<Statement> {
        match self.peek() {
            TokenKind::Id => self.reassignment(),
            TokenKind::Keyword(Keyword::Let) => self.declaration(),
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::Output) => self.output(),
            _ => self.unexpected(Expected::Statement),
        }
    }

    fn reassignment(&mut self) -> Parse<Statement> {
        let target = self.id()?;
        self.expect(TokenKind::Assign)?;
        let value = self.relation()?;

        Ok(Statement::Reassign { target, value })
    }

    fn declaration(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::Let)?;

        let declaration = match self.peek() {
            TokenKind::Id => {
                let name = self.id()?;
                self.expect(TokenKind::Assign)?;
                let value = self.relation()?;

                Declaration::Immutable { name, value }
            }

            TokenKind::Keyword(Keyword::Mut) => {
                self.next();
                let name = self.id()?;

                let value = match self.peek() {
                    TokenKind::Assign => {
                        self.next();
                        Some(self.relation()?)
                    }

                    _ => None,
                };

                Declaration::Mutable { name, value }
            }

            _ => return self.unexpected(Expected::Declaration),
        };

        Ok(Statement::Let(declaration))
    }

    fn if_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::If)?;
        let condition = self.condition()?;
        let body = self.block()?;
        let tail = self.else_tail()?;

        Ok(Statement::If {
            condition,
            body,
            tail,
        })
    }

    fn else_tail(&mut self) -> Parse<ElseTail> {
        if self.peek() != TokenKind::Keyword(Keyword::Else) {
            return Ok(ElseTail::Empty);
        }

        self.next();
        match self.peek() {
            TokenKind::Keyword(Keyword::If) => {
                self.next();
                let condition = self.condition()?;
                let body = self.block()?;
                let tail = Box::new(self.else_tail()?);

                Ok(ElseTail::ElseIf {
                    condition,
                    body,
                    tail,
                })
            }

            TokenKind::OpenCurly => Ok(ElseTail::Else(self.block()?)),
            _ => self.unexpected(Expected::ElseBody),
        }
    }

    fn while_statement(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::While)?;
        let condition = self.condition()?;
        let body = self.block()?;

        Ok(Statement::While { condition, body })
    }

    fn output(&mut self) -> Parse<Statement> {
        self.keyword(Keyword::Output)?;

        if self.peek() != TokenKind::StringLiteral {
            return self.unexpected(Expected::Token(TokenKind::StringLiteral));
        }

        let (position, lexeme) = self.next_located();
        let format = Located::at(Rc::from(lexeme), position);

        let mut args = Vec::new();
        while self.peek() == TokenKind::Comma {
            self.next();
            args.push(self.relation()?);
        }

        Ok(Statement::Output { format, args })
    }

    fn block(&mut self) -> Parse<Program> {
        self.expect(TokenKind::OpenCurly)?;
        let program = self.program()?;
        self.expect(TokenKind::CloseCurly)?;

        Ok(program)
    }

    fn condition(&mut self) -> Parse<Located<Relation>> {
        let position = self.lookahead.position();
        let relation = self.relation()?;

        Ok(Located::at(relation, position))
    }

    fn relation(&mut self) -> Parse<Relation> {
        self.chain(
            |kind| match kind {
                TokenKind::Or => Some(BinOp::Or),
                _ => None,
            },
            Self::and_term,
        )
    }

    fn and_term(&mut self) -> Parse<AndTerm> {
        self.chain(
            |kind| match kind {
                TokenKind::And => Some(BinOp::And),
                _ => None,
            },
            Self::not_term,
        )
    }

    fn not_term(&mut self) -> Parse<NotTerm> {
        if self.peek() == TokenKind::Not {
            let bang = self.next().position();

            self.expect(TokenKind::OpenParen)?;
            let operand = Box::new(self.relation()?);
            self.expect(TokenKind::CloseParen)?;

            return Ok(NotTerm::Not { bang, operand });
        }

        let lhs = self.expr()?;
        let rhs = match relational(self.peek()) {
            Some(op) => {
                let op = Located::at(op, self.next().position());
                Some((op, self.expr()?))
            }

            None => None,
        };

        Ok(NotTerm::Compare { lhs, rhs })
    }

    fn expr(&mut self) -> Parse<Expr> {
        self.chain(
            |kind| match kind {
                TokenKind::Plus => Some(BinOp::Add),
                TokenKind::Minus => Some(BinOp::Sub),
                _ => None,
            },
            Self::term,
        )
    }

    fn term(&mut self) -> Parse<Term> {
        self.chain(
            |kind| match kind {
                TokenKind::Times => Some(BinOp::Mul),
                TokenKind::Divide => Some(BinOp::Div),
                TokenKind::Modulo => Some(BinOp::Mod),
                _ => None,
            },
            Self::factor,
        )
    }

    fn factor(&mut self) -> Parse<Factor> {
        let literal = match self.peek() {
            TokenKind::IntLiteral => LiteralKind::Int,
            TokenKind::FloatLiteral => LiteralKind::Float,
            TokenKind::CharLiteral => LiteralKind::Char,
            TokenKind::BoolLiteral => LiteralKind::Bool,

            TokenKind::Id => return Ok(Factor::Id(self.id()?)),
            TokenKind::Keyword(Keyword::Input) => return Ok(Factor::Input(self.next().position())),

            TokenKind::OpenParen => {
                self.next();
                let relation = self.relation()?;
                self.expect(TokenKind::CloseParen)?;

                return Ok(Factor::Group(Box::new(relation)));
            }

            TokenKind::Minus => {
                let minus = self.next().position();
                let operand = Box::new(self.factor()?);

                return Ok(Factor::Negate { minus, operand });
            }

            _ => return self.unexpected(Expected::Operand),
        };

        let (position, lexeme) = self.next_located();
        let literal = Literal {
            kind: literal,
            lexeme: Rc::from(lexeme),
        };

        Ok(Factor::Literal(Located::at(literal, position)))
    }

    /// Reconoce una secuencia `T (op T)*`.
    ///
    /// `operator` determina si el token actual continúa la secuencia.
    fn chain<T, F>(
        &mut self,
        operator: fn(TokenKind) -> Option<BinOp>,
        mut inner: F,
    ) -> Parse<Chain<T>>
    where
        F: FnMut(&mut Self) -> Parse<T>,
    {
        let first = inner(self)?;

        let mut rest = Vec::new();
        while let Some(op) = operator(self.peek()) {
            let op = Located::at(op, self.next().position());
            let operand = inner(self)?;

            rest.push(Link { op, operand });
        }

        Ok(Chain { first, rest })
    }

    fn id(&mut self) -> Parse<Located<Identifier>> {
        match self.peek() {
            TokenKind::Id => {
                let (position, lexeme) = self.next_located();
                Ok(Located::at(Identifier::from(lexeme), position))
            }

            _ => self.unexpected(Expected::Token(TokenKind::Id)),
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(TokenKind::Keyword(keyword))
    }

    fn expect(&mut self, kind: TokenKind) -> Parse<()> {
        if self.peek() == kind {
            self.next();
            Ok(())
        } else {
            self.unexpected(Expected::Token(kind))
        }
    }

    fn peek(&self) -> TokenKind {
        self.lookahead.kind()
    }

    /// Avanza al siguiente token y retorna el anterior.
    fn next(&mut self) -> Token {
        let following = match self.tokens.next() {
            Some(token) => token,
            None => Token::eof(self.lookahead.position()),
        };

        std::mem::replace(&mut self.lookahead, following)
    }

    fn next_located(&mut self) -> (Position, String) {
        let token = self.next();
        (token.position(), token.into_lexeme())
    }

    fn unexpected<T>(&self, expected: Expected) -> Parse<T> {
        let error = match self.peek() {
            TokenKind::Error => ParserError::Lexical(self.lookahead.lexeme().to_owned()),
            TokenKind::Eof => ParserError::UnexpectedEof(expected),
            _ => ParserError::UnexpectedToken(expected, self.lookahead.lexeme().to_owned()),
        };

        self.fail(error)
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        Err(Located::at(error, self.lookahead.position()))
    }
}

fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Id
            | TokenKind::Keyword(Keyword::Let)
            | TokenKind::Keyword(Keyword::If)
            | TokenKind::Keyword(Keyword::While)
            | TokenKind::Keyword(Keyword::Output)
    )
}

fn relational(kind: TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Equal => BinOp::Equal,
        TokenKind::NotEqual => BinOp::NotEqual,
        TokenKind::Less => BinOp::Less,
        TokenKind::LessOrEqual => BinOp::LessOrEqual,
        TokenKind::Greater => BinOp::Greater,
        TokenKind::GreaterOrEqual => BinOp::GreaterOrEqual,
        _ => return None,
    };

    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;

    fn parse_str(source: &str) -> Result<Program, SyntaxError> {
        parse(tokenize(source).into_iter())
    }

    fn only_expr(relation: &Relation) -> &Expr {
        assert!(relation.rest.is_empty());
        assert!(relation.first.rest.is_empty());

        match &relation.first.first {
            NotTerm::Compare { lhs, rhs: None } => lhs,
            other => panic!("expected a bare expression, got {:?}", other),
        }
    }

    #[test]
    fn additive_chain_stays_flat() {
        let program = parse_str("x = a + b - c;").unwrap();
        let value = match &program.statements()[0] {
            Statement::Reassign { target, value } => {
                assert_eq!(target.val().as_ref(), "x");
                value
            }

            other => panic!("unexpected statement {:?}", other),
        };

        let expr = only_expr(value);
        let ops: Vec<_> = expr.rest.iter().map(|link| *link.op.as_ref()).collect();
        assert_eq!(ops, vec![BinOp::Add, BinOp::Sub]);
    }

    #[test]
    fn multiplication_binds_tighter() {
        let program = parse_str("let y = 1 + 2 * 3;").unwrap();
        let value = match &program.statements()[0] {
            Statement::Let(Declaration::Immutable { value, .. }) => value,
            other => panic!("unexpected statement {:?}", other),
        };

        let expr = only_expr(value);
        assert_eq!(expr.rest.len(), 1);
        assert!(expr.first.rest.is_empty());

        let product = &expr.rest[0].operand;
        assert_eq!(product.rest.len(), 1);
        assert_eq!(*product.rest[0].op.as_ref(), BinOp::Mul);
    }

    #[test]
    fn mutable_declarations_have_optional_initializers() {
        let program = parse_str("let mut a; let mut b = 2; let c = 'x';").unwrap();
        let statements = program.statements();

        assert!(matches!(
            &statements[0],
            Statement::Let(Declaration::Mutable { value: None, .. })
        ));
        assert!(matches!(
            &statements[1],
            Statement::Let(Declaration::Mutable { value: Some(_), .. })
        ));
        assert!(matches!(
            &statements[2],
            Statement::Let(Declaration::Immutable { .. })
        ));
    }

    #[test]
    fn else_if_chains_nest_in_tails() {
        let source = "if a { } else if b { x = 1; } else { output \"no\"; };";
        let program = parse_str(source).unwrap();

        let tail = match &program.statements()[0] {
            Statement::If { body, tail, .. } => {
                assert!(body.statements().is_empty());
                tail
            }

            other => panic!("unexpected statement {:?}", other),
        };

        match tail {
            ElseTail::ElseIf { body, tail, .. } => {
                assert_eq!(body.statements().len(), 1);
                assert!(matches!(**tail, ElseTail::Else(_)));
            }

            other => panic!("unexpected tail {:?}", other),
        }
    }

    #[test]
    fn output_takes_format_and_arguments() {
        let program = parse_str("output \"%d %d\", x, input;").unwrap();
        match &program.statements()[0] {
            Statement::Output { format, args } => {
                assert_eq!(&**format.as_ref(), "\"%d %d\"");
                assert_eq!(args.len(), 2);
            }

            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn negation_requires_parentheses() {
        assert!(parse_str("let b = !(x < 1 || y >= 2) && z;").is_ok());

        let error = parse_str("let b = !x;").unwrap_err();
        assert!(matches!(
            error.val(),
            ParserError::UnexpectedToken(Expected::Token(TokenKind::OpenParen), found)
                if found == "x"
        ));
    }

    #[test]
    fn no_semantic_checks_during_parsing() {
        assert!(parse_str("y = undeclared + true * 'c';").is_ok());
    }

    #[test]
    fn missing_semicolon_reports_lexeme_and_line() {
        let error = parse_str("let a = 1;\nlet b = 2\nlet c = 3;").unwrap_err();

        assert_eq!(error.position().line(), 3);
        assert_eq!(error.val().lexeme(), Some("let"));
        assert!(matches!(
            error.val(),
            ParserError::UnexpectedToken(Expected::Token(TokenKind::Semicolon), _)
        ));
    }

    #[test]
    fn end_of_file_inside_block() {
        let error = parse_str("while x < 3 {\n x = x + 1;\n").unwrap_err();

        assert!(matches!(
            error.val(),
            ParserError::UnexpectedEof(Expected::Token(TokenKind::CloseCurly))
        ));
    }

    #[test]
    fn stray_closing_brace_at_top_level() {
        let error = parse_str("let a = 1; }").unwrap_err();

        assert!(matches!(
            error.val(),
            ParserError::UnexpectedToken(Expected::Statement, found) if found == "}"
        ));
    }

    #[test]
    fn strings_are_not_operands() {
        let error = parse_str("let s = \"text\";").unwrap_err();

        assert!(matches!(
            error.val(),
            ParserError::UnexpectedToken(Expected::Operand, _)
        ));
    }

    #[test]
    fn lexical_errors_surface_as_syntax_errors() {
        let error = parse_str("let a = 1;\nlet b = 2 $ 3;").unwrap_err();

        assert_eq!(error.position().line(), 2);
        assert!(matches!(error.val(), ParserError::Lexical(message) if message.contains("'$'")));
    }

    #[test]
    fn empty_program_is_valid() {
        let program = parse_str("// nada\n").unwrap();
        assert!(program.statements().is_empty());
    }
}
