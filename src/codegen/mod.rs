//! Emisión de código C.
//!
//! El programa completo se traduce a una única función `main()`. Todo
//! nombre en la tabla de identificadores con tipo concreto, incluyendo
//! temporales, se declara al inicio de la función. Las entradas cuyo
//! tipo nunca se infirió no se leen ni escriben en ningún punto del
//! programa, por lo cual se omiten.
//!
//! Todo nombre de la tabla, temporales incluidos, se escribe en C con el
//! prefijo `v_`. Así ningún identificador del programa puede coincidir
//! con palabras reservadas de C ni con nombres del preludio como
//! `printf` o `main`. Las anotaciones conservan los nombres originales.

use std::{
    fmt::{self, Display},
    io::{self, Write},
};

use bitflags::bitflags;

use crate::{
    ast::Type,
    ir::{Operand, Program},
    lex::Identifier,
};

mod c;

bitflags! {
    /// Opciones a aplicar durante la emisión.
    pub struct EmitOptions: u32 {
        /// Anteponer a cada traducción la instrucción de tres
        /// direcciones original, como comentario de C.
        const ANNOTATE = 0x01;
    }
}

/// Emite un programa de C equivalente.
pub fn emit<W: Write>(program: &Program, options: EmitOptions, output: &mut W) -> io::Result<()> {
    for header in ["stdio.h", "stdbool.h", "math.h"] {
        writeln!(output, "#include <{}>", header)?;
    }

    writeln!(output, "\nint main(void) {{")?;

    for (name, binding) in program.symbols.iter() {
        if let Some(ty) = binding.ty() {
            writeln!(output, "\t{} {};", c_type(ty), Mangled(name))?;
        }
    }

    writeln!(output)?;
    c::emit_body(output, program, options)?;

    writeln!(output, "\treturn 0;\n}}")
}

/// Nombre en C de un identificador del programa.
struct Mangled<'a>(&'a Identifier);

impl Display for Mangled<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "v_{}", self.0)
    }
}

/// Operando en C: nombres con prefijo, literales verbatim.
struct COperand<'a>(&'a Operand);

impl Display for COperand<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Operand::Name(name) => Mangled(name).fmt(fmt),
            Operand::Literal(lexeme) => fmt.write_str(lexeme),
        }
    }
}

fn c_type(ty: Type) -> &'static str {
    match ty {
        Type::Int => "int",
        Type::Float => "float",
        Type::Char => "char",
        Type::Bool => "bool",
    }
}
