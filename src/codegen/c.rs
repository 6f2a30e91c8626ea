use std::io::{self, Write};

use super::{COperand, EmitOptions, Mangled};
use crate::{
    ast::{BinOp, Type},
    ir::{Function, Instruction, Operand, Program},
    lex::Identifier,
    semantic::SymbolTable,
};

pub fn emit_body<W: Write>(
    output: &mut W,
    program: &Program,
    options: EmitOptions,
) -> io::Result<()> {
    let mut body = CBody {
        output,
        symbols: &program.symbols,
        options,
        params: Vec::new(),
    };

    program
        .instructions
        .iter()
        .try_for_each(|instruction| body.translate(instruction))
}

struct CBody<'a, W> {
    output: &'a mut W,
    symbols: &'a SymbolTable,
    options: EmitOptions,
    params: Vec<&'a Operand>,
}

impl<'a, W: Write> CBody<'a, W> {
    fn translate(&mut self, instruction: &'a Instruction) -> io::Result<()> {
        use Instruction::*;

        if self.options.contains(EmitOptions::ANNOTATE) {
            emit!(self, "// {}", instruction)?;
        }

        match instruction {
            // Una etiqueta de C debe preceder a una sentencia
            SetLabel(label) => writeln!(self.output, "{}: ;", label),

            Jump(label) => emit!(self, "goto {};", label),

            JumpIf(condition, label) => {
                emit!(self, "if ({}) goto {};", COperand(condition), label)
            }

            Copy { target, value } => {
                emit!(self, "{} = {};", Mangled(target), COperand(value))
            }

            Unary { target, op, value } => {
                emit!(self, "{} = {}{};", Mangled(target), op, COperand(value))
            }

            Binary {
                target,
                lhs,
                op: BinOp::Mod,
                rhs,
            } if self.type_of(target) == Some(Type::Float) => {
                let (lhs, rhs) = (COperand(lhs), COperand(rhs));
                emit!(self, "{} = fmod({}, {});", Mangled(target), lhs, rhs)
            }

            Binary {
                target,
                lhs,
                op,
                rhs,
            } => {
                let (lhs, rhs) = (COperand(lhs), COperand(rhs));
                emit!(self, "{} = {} {} {};", Mangled(target), lhs, op, rhs)
            }

            // Los argumentos se acumulan hasta el siguiente `call`
            Param(value) => {
                self.params.push(value);
                Ok(())
            }

            Call {
                function,
                arguments,
                output,
            } => {
                let first = self.params.len().saturating_sub(*arguments as usize);
                let arguments = self.params.split_off(first);

                match (function, output) {
                    (Function::Printf, _) => {
                        let arguments: Vec<_> = arguments
                            .iter()
                            .map(|&argument| COperand(argument).to_string())
                            .collect();

                        emit!(self, "printf({});", arguments.join(", "))
                    }

                    (Function::Input, Some(target)) => self.scan(target),
                    (Function::Input, None) => emit!(self, "scanf(\"%*d\");"),
                }
            }
        }
    }

    /// Lectura de entrada estándar según el tipo del destino.
    fn scan(&mut self, target: &Identifier) -> io::Result<()> {
        let ty = self.type_of(target);
        let target = Mangled(target);

        match ty {
            Some(Type::Float) => emit!(self, "scanf(\"%f\", &{});", target),
            Some(Type::Char) => emit!(self, "scanf(\" %c\", &{});", target),

            // `bool` no tiene conversión propia en `scanf()`
            Some(Type::Bool) => {
                emit!(self, "{{ int value; scanf(\"%d\", &value); {} = value; }}", target)
            }

            _ => emit!(self, "scanf(\"%d\", &{});", target),
        }
    }

    fn type_of(&self, name: &Identifier) -> Option<Type> {
        self.symbols.get(name.as_ref()).and_then(|binding| binding.ty())
    }
}
