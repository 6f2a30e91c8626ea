//! Compilador para un lenguaje imperativo mínimo.
//!
//! # Front end
//! El programa deriva de un único archivo de código fuente. Este se
//! somete primero a análisis léxico en [`lex`], que se ejecuta en un
//! hilo productor independiente y entrega tokens uno a uno por medio
//! de [`stream`]. El flujo de tokens se dispone en un árbol sintáctico
//! por medio de análisis sintáctico en [`parse`]. Análisis semántico en
//! [`semantic`] verifica tipos y mutabilidad y reconstruye el árbol en
//! la forma descrita por [`ast`], a la vez que llena la tabla de
//! identificadores.
//!
//! # Back end
//! El árbol verificado se traduce a código de tres direcciones
//! ([`ir`]) en [`generate`]. Finalmente, [`codegen`] emite un programa
//! de C equivalente. Las fases corren estrictamente en secuencia y la
//! primera que falla detiene a toda la pipeline con un [`CompileError`].

use std::io::BufRead;

use tracing::info;

#[macro_use]
mod macros;

pub mod ast;
pub mod codegen;
pub mod error;
pub mod generate;
pub mod ir;
pub mod lex;
pub mod parse;
pub mod semantic;
pub mod source;
pub mod stream;

pub use error::CompileError;

/// Ejecuta la pipeline completa hasta código de tres direcciones.
pub fn compile<R>(reader: R) -> Result<ir::Program, CompileError>
where
    R: BufRead + Send + 'static,
{
    info!("parsing");
    let program = parse::parse(stream::spawn(reader))?;

    info!(statements = program.statements().len(), "checking");
    let checked = program.check(semantic::SymbolTable::new())?;

    info!(symbols = checked.symbols.len(), "generating three-address code");
    let program = checked.generate()?;

    info!(
        instructions = program.instructions.len(),
        symbols = program.symbols.len(),
        "compiled"
    );

    Ok(program)
}
