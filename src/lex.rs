//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco y los comentarios se descartan durante esta operación. Cada
//! token emitido esta asociado a una posición en el código fuente original,
//! lo cual permite rastrear errores de fases posteriores.
//!
//! # Contenido de un token
//! A diferencia de otros lexers, todo token preserva su lexema original.
//! Las fases posteriores no resuelven constantes literales a valores, sino
//! que las transportan verbatim hasta el código de tres direcciones, por lo
//! cual el lexema es la única representación necesaria.
//!
//! # Reglas importantes del lenguaje
//! - Los identificadores comienzan con una letra o `'_'`.
//! - El lenguaje es case-sensitive: `if` es palabra clave, `IF` no.
//! - `true` y `false` son literales booleanos, no identificadores.
//! - Los literales de string solo pueden ocupar una línea.
//!
//! # Errores
//! El lexer es capaz de recuperarse parcialmente de condiciones de error,
//! descartando el resto de la línea. Sin embargo, [`Lexer::tokens()`] se
//! detiene en el primer error y lo reporta como un token centinela.

use crate::source::{InputStream, Located, Position};
use std::{
    borrow::Borrow,
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Error de E/S originado por el [`InputStream`].
    #[error("I/O error")]
    Input(#[from] std::io::Error),

    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Se esperaba un carácter específico en esta posición.
    #[error("Expected {0:?}")]
    Expected(char),

    /// Una constante entera se encuentra fuera de rango.
    ///
    /// Los literales no tienen signo: `-` es un operador aparte, por lo
    /// cual la cota es `i32::MAX` y el valor `i32::MIN` solo puede
    /// escribirse como expresión, por ejemplo `-2147483647 - 1`.
    #[error("Integer literal overflow, valid range is [0, {}]", i32::MAX)]
    IntOverflow,

    /// Constante entera con ceros a la izquierda, que C leería en octal.
    #[error("Integer literals cannot have leading zeros")]
    LeadingZero,

    /// Se alcanzó el final de la línea dentro de un string.
    #[error("Unterminated string literal")]
    UnterminatedString,

    /// Literal de carácter vacío, sin cerrar o con más de un carácter.
    #[error("Malformed character literal")]
    BadCharLiteral,
}

/// Un identificador.
///
/// Los identificadores se comparten entre el árbol sintáctico, la tabla
/// de identificadores y el código intermedio, por lo cual su clonación
/// no copia el nombre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Rc<str>);

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier(Rc::from(name))
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(fmt)
    }
}

/// Clasificación de un token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identificador.
    Id,

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal de entero.
    IntLiteral,

    /// Literal de punto flotante.
    FloatLiteral,

    /// Literal de carácter, con comillas simples.
    CharLiteral,

    /// `true` o `false`.
    BoolLiteral,

    /// Literal de string, con comillas dobles.
    StringLiteral,

    /// `=`
    Assign,

    /// `==`
    Equal,

    /// `!=`
    NotEqual,

    /// `<`
    Less,

    /// `<=`
    LessOrEqual,

    /// `>`
    Greater,

    /// `>=`
    GreaterOrEqual,

    /// `&&`
    And,

    /// `||`
    Or,

    /// `!`
    Not,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Divide,

    /// `%`
    Modulo,

    /// `,`
    Comma,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// Centinela de fin de flujo.
    Eof,

    /// Centinela de error léxico. El lexema describe el error.
    Error,
}

impl Display for TokenKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        match self {
            Id => fmt.write_str("identifier"),
            Keyword(keyword) => write!(fmt, "`{}`", keyword),
            IntLiteral => fmt.write_str("integer literal"),
            FloatLiteral => fmt.write_str("float literal"),
            CharLiteral => fmt.write_str("character literal"),
            BoolLiteral => fmt.write_str("boolean literal"),
            StringLiteral => fmt.write_str("string literal"),
            Assign => fmt.write_str("`=`"),
            Equal => fmt.write_str("`==`"),
            NotEqual => fmt.write_str("`!=`"),
            Less => fmt.write_str("`<`"),
            LessOrEqual => fmt.write_str("`<=`"),
            Greater => fmt.write_str("`>`"),
            GreaterOrEqual => fmt.write_str("`>=`"),
            And => fmt.write_str("`&&`"),
            Or => fmt.write_str("`||`"),
            Not => fmt.write_str("`!`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Times => fmt.write_str("`*`"),
            Divide => fmt.write_str("`/`"),
            Modulo => fmt.write_str("`%`"),
            Comma => fmt.write_str("`,`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            OpenCurly => fmt.write_str("`{`"),
            CloseCurly => fmt.write_str("`}`"),
            Eof => fmt.write_str("end of file"),
            Error => fmt.write_str("lexical error"),
        }
    }
}

/// Objeto resultante del análisis léxico.
///
/// Un token contiene suficiente información para describir completamente
/// a una entidad léxica en el programa fuente. Los tokens son inmutables
/// una vez construidos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    lexeme: String,
    position: Position,
}

impl Token {
    /// Construye un token.
    pub fn new<S: Into<String>>(kind: TokenKind, lexeme: S, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    /// Construye el centinela de fin de flujo.
    pub fn eof(position: Position) -> Self {
        Token::new(TokenKind::Eof, "end of file", position)
    }

    /// Construye el centinela de error a partir de un error léxico.
    pub fn error(error: &Located<LexerError>) -> Self {
        Token::new(TokenKind::Error, error.val().to_string(), error.position())
    }

    /// Obtiene la clasificación.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Obtiene el lexema.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Descarta todo excepto el lexema.
    pub fn into_lexeme(self) -> String {
        self.lexeme
    }

    /// Obtiene la posición de inicio.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Número de línea en donde inicia el token.
    pub fn line(&self) -> u32 {
        self.position.line()
    }

    /// Determina si este token termina el flujo.
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::Error)
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Mut,
    If,
    Else,
    While,
    Input,
    Output,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Keyword::*;
        let string = match self {
            Let    => "let",
            Mut    => "mut",
            If     => "if",
            Else   => "else",
            While  => "while",
            Input  => "input",
            Output => "output",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        const KEYWORDS: &[(&str, Keyword)] = &[
            ("let",    Let),
            ("mut",    Mut),
            ("if",     If),
            ("else",   Else),
            ("while",  While),
            ("input",  Input),
            ("output", Output),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada.
pub struct Lexer<S: Iterator> {
    source: Peekable<S>,
    state: State,
    lexeme: String,
    start: Position,
    last: Position,
}

/// Posibles estados del lexer.
#[derive(Copy, Clone)]
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de error, descarta hasta el final de la línea.
    Recovery,

    /// Estado de completitud; siempre emite el token incluido,
    /// consume la entrada actual y pasa a [`State::Start`].
    Complete(TokenKind),

    /// Se encontró `/`, que puede iniciar un comentario.
    AfterSlash,

    /// Comentario de línea.
    ///
    /// Este estado vuelve a [`State::Start`] al encontrar `'\n'`.
    Comment,

    /// Se encontró `=`.
    AfterEquals,

    /// Se encontró `!`.
    AfterBang,

    /// Se encontró `<`.
    AfterLess,

    /// Se encontró `>`.
    AfterGreater,

    /// Se encontró `&`, debe seguir otro.
    AfterAmpersand,

    /// Se encontró `|`, debe seguir otro.
    AfterPipe,

    /// Parte entera de una constante numérica.
    Integer,

    /// Parte fraccionaria, luego del primer `.`.
    Fraction,

    /// Término que puede ser un identificador o una palabra clave.
    Word,

    /// Interior de un literal de string.
    Str,

    /// Luego de la comilla simple de apertura.
    CharOpen,

    /// Luego de `'\`.
    CharEscape,

    /// Luego del contenido de un literal de carácter, espera `'`.
    CharBody,
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(source: S) -> Self {
        Lexer {
            source: source.peekable(),
            state: State::Start,
            lexeme: String::new(),
            start: Position::default(),
            last: Position::default(),
        }
    }

    /// Convierte al lexer en un flujo de tokens terminado por centinela.
    ///
    /// El flujo resultante termina exactamente una vez, ya sea con
    /// [`TokenKind::Eof`] o con [`TokenKind::Error`] ante el primer
    /// error léxico.
    pub fn tokens(self) -> Tokens<S> {
        Tokens {
            lexer: self,
            finished: false,
        }
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<TokenKind>, LexerError> {
        use {State::*, TokenKind::*};

        loop {
            // Se espera un siguiente carácter, fallando si hay error de E/S
            if let Some(Err(_)) = self.source.peek() {
                if let Some(Err(error)) = self.source.next() {
                    return Err(error.into());
                }
            }

            let next_char = match self.source.peek() {
                Some(Ok((c, position))) => {
                    // La posición de origen se mueve junto a la entrada
                    // siempre que no se haya encontrado una frontera de token
                    if let Start = self.state {
                        self.start = *position;
                    }

                    Some(*c)
                }

                _ => None,
            };

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (self.state, next_char) {
                // Condiciones de error: se descarta la línea donde
                // ocurrió el error. Al llegar al final de la línea
                // el lexer se recupera y reinicia.
                (Recovery, None) => return Ok(None),
                (Recovery, Some('\n')) => self.state = Start,
                (Recovery, Some(_)) => (),

                // Tokens triviales
                (Start, None) => return Ok(None),
                (Start, Some(',')) => self.state = Complete(Comma),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some('{')) => self.state = Complete(OpenCurly),
                (Start, Some('}')) => self.state = Complete(CloseCurly),
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some('*')) => self.state = Complete(Times),
                (Start, Some('%')) => self.state = Complete(Modulo),

                // Operadores de uno o dos caracteres
                (Start, Some('/')) => self.state = AfterSlash,
                (Start, Some('=')) => self.state = AfterEquals,
                (Start, Some('!')) => self.state = AfterBang,
                (Start, Some('<')) => self.state = AfterLess,
                (Start, Some('>')) => self.state = AfterGreater,
                (Start, Some('&')) => self.state = AfterAmpersand,
                (Start, Some('|')) => self.state = AfterPipe,

                // Literales delimitados
                (Start, Some('"')) => self.state = Str,
                (Start, Some('\'')) => self.state = CharOpen,

                // Identificadores, palabras clave y constantes numéricas
                (Start, Some(c)) if c.is_ascii_alphabetic() || c == '_' => self.state = Word,
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Integer,

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_ascii_whitespace() => (),
                (Start, Some(c)) => break Err(LexerError::BadChar(c)),

                // Emisión retardada de tokens cualesquiera
                (Complete(kind), _) => break Ok(Some(kind)),

                // `//` inicia un comentario, `/` a solas es división
                (AfterSlash, Some('/')) => {
                    self.lexeme.clear();
                    self.state = Comment;
                }

                (AfterSlash, _) => break Ok(Some(Divide)),

                // Los comentarios descartan la línea donde ocurren
                (Comment, Some('\n')) => self.state = Start,
                (Comment, Some(_)) => (),
                (Comment, None) => self.state = Start,

                (AfterEquals, Some('=')) => self.state = Complete(Equal),
                (AfterEquals, _) => break Ok(Some(Assign)),

                (AfterBang, Some('=')) => self.state = Complete(NotEqual),
                (AfterBang, _) => break Ok(Some(Not)),

                (AfterLess, Some('=')) => self.state = Complete(LessOrEqual),
                (AfterLess, _) => break Ok(Some(Less)),

                (AfterGreater, Some('=')) => self.state = Complete(GreaterOrEqual),
                (AfterGreater, _) => break Ok(Some(Greater)),

                // No existen operadores `&` ni `|` a solas
                (AfterAmpersand, Some('&')) => self.state = Complete(And),
                (AfterAmpersand, _) => break Err(LexerError::Expected('&')),

                (AfterPipe, Some('|')) => self.state = Complete(Or),
                (AfterPipe, _) => break Err(LexerError::Expected('|')),

                // Acumulación dígito por dígito de constantes enteras
                (Integer, Some(digit)) if digit.is_ascii_digit() && self.lexeme == "0" => {
                    break Err(LexerError::LeadingZero)
                }

                (Integer, Some(digit)) if digit.is_ascii_digit() => (),
                (Integer, Some('.')) => self.state = Fraction,

                // Si sigue algo que no es un dígito, la constante ha terminado
                (Integer, _) => match self.lexeme.parse::<i32>() {
                    Ok(_) => break Ok(Some(IntLiteral)),
                    Err(_) => break Err(LexerError::IntOverflow),
                },

                // Un segundo `.` termina la constante
                (Fraction, Some(digit)) if digit.is_ascii_digit() => (),
                (Fraction, _) => break Ok(Some(FloatLiteral)),

                // Extensión de términos
                (Word, Some(c)) if is_word_char(c) => (),

                // Si sigue algo que no puede formar parte del término, ha terminado
                (Word, _) => break Ok(Some(classify(&self.lexeme))),

                (Str, Some('"')) => self.state = Complete(StringLiteral),
                (Str, Some('\n')) | (Str, None) => break Err(LexerError::UnterminatedString),
                (Str, Some(_)) => (),

                (CharOpen, Some('\\')) => self.state = CharEscape,
                (CharOpen, Some('\'')) | (CharOpen, Some('\n')) | (CharOpen, None) => {
                    break Err(LexerError::BadCharLiteral)
                }
                (CharOpen, Some(_)) => self.state = CharBody,

                (CharEscape, Some('\n')) | (CharEscape, None) => {
                    break Err(LexerError::BadCharLiteral)
                }
                (CharEscape, Some(_)) => self.state = CharBody,

                (CharBody, Some('\'')) => self.state = Complete(CharLiteral),
                (CharBody, _) => break Err(LexerError::BadCharLiteral),
            }

            // Si no hubo `break`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some(Ok((c, position))) = self.source.next() {
                self.last = position;
                if !matches!(self.state, Start | Comment | Recovery) {
                    self.lexeme.push(c);
                }
            }
        }
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Result<Token, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some(kind)) => {
                self.state = State::Start;

                let lexeme = std::mem::take(&mut self.lexeme);
                Some(Ok(Token::new(kind, lexeme, self.start)))
            }

            Err(error) => {
                self.state = State::Recovery;
                self.lexeme.clear();

                Some(Err(Located::at(error, self.start)))
            }
        }
    }
}

/// Flujo de tokens terminado por un único centinela.
///
/// Ver [`Lexer::tokens()`].
pub struct Tokens<S: Iterator> {
    lexer: Lexer<S>,
    finished: bool,
}

impl<S: InputStream> Iterator for Tokens<S> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        match self.lexer.next() {
            Some(Ok(token)) => Some(token),
            Some(Err(error)) => {
                self.finished = true;
                Some(Token::error(&error))
            }

            None => {
                self.finished = true;
                Some(Token::eof(self.lexer.last))
            }
        }
    }
}

/// Ejecuta el lexer de manera síncrona sobre un texto completo.
///
/// El resultado siempre termina en un centinela.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(crate::source::consume(source.as_bytes()))
        .tokens()
        .collect()
}

/// Determina si un carácter puede pertenecer a un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Distingue palabras clave y literales booleanos de identificadores.
fn classify(word: &str) -> TokenKind {
    match word {
        "true" | "false" => TokenKind::BoolLiteral,
        _ => match Keyword::from_str(word) {
            Ok(keyword) => TokenKind::Keyword(keyword),
            Err(()) => TokenKind::Id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(Token::kind).collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(Token::into_lexeme).collect()
    }

    #[test]
    fn operators_take_the_longest_match() {
        use TokenKind::*;

        assert_eq!(
            kinds("= == ! != < <= > >= && || + - * / %"),
            vec![
                Assign, Equal, Not, NotEqual, Less, LessOrEqual, Greater, GreaterOrEqual, And,
                Or, Plus, Minus, Times, Divide, Modulo, Eof
            ]
        );

        assert_eq!(kinds("a<=b"), vec![Id, LessOrEqual, Id, Eof]);
        assert_eq!(kinds("x=-1"), vec![Id, Assign, Minus, IntLiteral, Eof]);
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let keywords = [
            Keyword::Let,
            Keyword::Mut,
            Keyword::If,
            Keyword::Else,
            Keyword::While,
            Keyword::Input,
            Keyword::Output,
        ];

        let mut expected: Vec<_> = keywords.iter().copied().map(TokenKind::Keyword).collect();
        expected.push(TokenKind::Eof);
        assert_eq!(kinds("let mut if else while input output"), expected);

        assert_eq!(
            kinds("IF Let inputs"),
            vec![TokenKind::Id, TokenKind::Id, TokenKind::Id, TokenKind::Eof]
        );

        assert_eq!(
            kinds("true false"),
            vec![TokenKind::BoolLiteral, TokenKind::BoolLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn literals_keep_their_lexemes() {
        use TokenKind::*;

        let source = r#"42 3.25 'a' '\n' "hello, world" _tmp1"#;
        assert_eq!(
            kinds(source),
            vec![IntLiteral, FloatLiteral, CharLiteral, CharLiteral, StringLiteral, Id, Eof]
        );

        assert_eq!(
            lexemes(source),
            vec!["42", "3.25", "'a'", "'\\n'", "\"hello, world\"", "_tmp1", "end of file"]
        );
    }

    #[test]
    fn comments_and_whitespace_are_discarded() {
        use TokenKind::{Assign, Divide, Eof, Id, IntLiteral, Semicolon};

        let source = "let x = 1; // comentario\n\tx = x / 2;";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Keyword(Keyword::Let),
                Id,
                Assign,
                IntLiteral,
                Semicolon,
                Id,
                Assign,
                Id,
                Divide,
                IntLiteral,
                Semicolon,
                Eof
            ]
        );
    }

    #[test]
    fn tokens_carry_their_lines() {
        let tokens = tokenize("let a = 1;\n\nlet b = 2;");
        let b = &tokens[6];

        assert_eq!(b.lexeme(), "b");
        assert_eq!(b.line(), 3);
        assert_eq!(b.position().column(), 5);
    }

    #[test]
    fn first_lexical_error_ends_the_stream() {
        let tokens = tokenize("let a = 1 & 2;\nlet b = 3;");
        let last = tokens.last().unwrap();

        assert_eq!(last.kind(), TokenKind::Error);
        assert_eq!(last.line(), 1);
        assert_eq!(tokens.len(), 5);
        assert!(last.lexeme().contains("Expected '&'"));
    }

    #[test]
    fn malformed_literals_are_errors() {
        for source in ["''", "'ab'", "\"open", "99999999999", "@"] {
            let tokens = tokenize(source);
            assert_eq!(tokens.len(), 1, "{}", source);
            assert_eq!(tokens[0].kind(), TokenKind::Error, "{}", source);
        }
    }

    #[test]
    fn leading_zeros_are_rejected() {
        let tokens = tokenize("010");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert!(tokens[0].lexeme().contains("leading zeros"));

        use TokenKind::{Eof, FloatLiteral, IntLiteral};
        assert_eq!(
            kinds("0 0.5 10 100"),
            vec![IntLiteral, FloatLiteral, IntLiteral, IntLiteral, Eof]
        );
        assert_eq!(lexemes("0 0.5"), vec!["0", "0.5", "end of file"]);
    }

    #[test]
    fn integer_literals_are_bounded_by_i32_max() {
        assert_eq!(kinds("2147483647"), vec![TokenKind::IntLiteral, TokenKind::Eof]);

        let tokens = tokenize("2147483648");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert!(tokens[0].lexeme().contains("overflow"));
    }
}
