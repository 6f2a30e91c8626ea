//! Errores de compilación y su presentación.

use std::fmt::{self, Display};

use thiserror::Error;

use crate::{
    generate::InternalError, parse::ParserError, semantic::SemanticError, source::Located,
    source::Position,
};

/// Único error que detiene a la pipeline.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] Located<ParserError>),

    #[error(transparent)]
    Semantic(#[from] Located<SemanticError>),

    /// Un defecto del compilador, no del programa de entrada.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CompileError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Syntax(_) => "syntax error",
            CompileError::Semantic(_) => "semantic error",
            CompileError::Internal(_) => "internal compiler error",
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Syntax(error) => Some(error.position()),
            CompileError::Semantic(error) => Some(error.position()),
            CompileError::Internal(_) => None,
        }
    }

    fn message(&self) -> &dyn Display {
        match self {
            CompileError::Syntax(error) => error.val() as &dyn Display,
            CompileError::Semantic(error) => error.val(),
            CompileError::Internal(error) => error,
        }
    }
}

/// Reporte legible de un error, con la línea de código fuente afectada.
pub struct Diagnostics<'a> {
    error: &'a CompileError,
    name: &'a str,
    source: &'a str,
}

impl<'a> Diagnostics<'a> {
    pub fn new(error: &'a CompileError, name: &'a str, source: &'a str) -> Self {
        Diagnostics {
            error,
            name,
            source,
        }
    }
}

impl Display for Diagnostics<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics {
            error,
            name,
            source,
        } = self;

        writeln!(fmt, "{}: {}", error.kind(), error.message())?;

        if let Some(position) = error.position() {
            writeln!(fmt, " --> {}:{}", name, position)?;

            let line_number = position.line();
            let line = source
                .lines()
                .nth(line_number as usize - 1)
                .map(expand_tabs)
                .unwrap_or_default();

            let digits = line_number.to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;
            writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)?;

            let skip = position.column().saturating_sub(1) as usize;
            writeln!(
                fmt,
                "{:digits$} | {:skip$}^",
                "",
                "",
                digits = digits,
                skip = skip
            )?;
        }

        writeln!(fmt)?;
        writeln!(fmt, "Build failed with 1 error")
    }
}

/// Expande tabuladores de la misma forma en que se asignan columnas.
fn expand_tabs(line: &str) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut position = Position::default();

    for c in line.chars() {
        match c {
            '\t' => {
                let next = position.tab();
                let width = (next.column() - position.column()) as usize;

                expanded.extend(std::iter::repeat(' ').take(width));
                position = next;
            }

            _ => {
                expanded.push(c);
                position = position.advance();
            }
        }
    }

    expanded
}
