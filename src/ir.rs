//! Código de tres direcciones.
//!
//! Cada [`Instruction`] tiene a lo sumo un operador, dos operandos fuente
//! y un destino. El orden de un [`Program`] es su orden de ejecución. La
//! forma textual de las instrucciones (ver implementaciones de `Display`)
//! es una por línea, con operandos verbatim.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

use crate::{
    ast::{BinOp, UnOp},
    lex::Identifier,
    semantic::SymbolTable,
};

#[derive(Debug)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub symbols: SymbolTable,
}

impl Display for Program {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(fmt, "{}", instruction)?;
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl Display for Label {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "L{}", self.0)
    }
}

/// Operando fuente: un nombre o una constante literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Name(Identifier),
    Literal(Rc<str>),
}

impl Display for Operand {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(name) => name.fmt(fmt),
            Operand::Literal(lexeme) => fmt.write_str(lexeme),
        }
    }
}

/// Rutinas externas invocables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function {
    Printf,
    Input,
}

impl Display for Function {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Printf => fmt.write_str("printf"),
            Function::Input => fmt.write_str("input"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    SetLabel(Label),
    Jump(Label),
    JumpIf(Operand, Label),

    Copy {
        target: Identifier,
        value: Operand,
    },

    Unary {
        target: Identifier,
        op: UnOp,
        value: Operand,
    },

    Binary {
        target: Identifier,
        lhs: Operand,
        op: BinOp,
        rhs: Operand,
    },

    /// Argumento para la siguiente [`Instruction::Call`].
    Param(Operand),

    Call {
        function: Function,
        arguments: u32,
        output: Option<Identifier>,
    },
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match self {
            SetLabel(label) => write!(fmt, "{}:", label),
            Jump(label) => write!(fmt, "goto {}", label),
            JumpIf(condition, label) => write!(fmt, "if {} goto {}", condition, label),
            Copy { target, value } => write!(fmt, "{} = {}", target, value),
            Unary { target, op, value } => write!(fmt, "{} = {} {}", target, op, value),

            Binary {
                target,
                lhs,
                op,
                rhs,
            } => write!(fmt, "{} = {} {} {}", target, lhs, op, rhs),

            Param(value) => write!(fmt, "param {}", value),

            Call {
                function,
                arguments,
                output,
            } => {
                if let Some(output) = output {
                    write!(fmt, "{} = ", output)?;
                }

                write!(fmt, "call {}, {}", function, arguments)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form() {
        let t1 = Identifier::from("t1");
        let x = Operand::Name(Identifier::from("x"));
        let three = Operand::Literal(Rc::from("3"));

        let lines: Vec<_> = [
            Instruction::SetLabel(Label(1)),
            Instruction::Jump(Label(2)),
            Instruction::JumpIf(Operand::Name(t1.clone()), Label(3)),
            Instruction::Copy {
                target: t1.clone(),
                value: three.clone(),
            },
            Instruction::Unary {
                target: t1.clone(),
                op: UnOp::Neg,
                value: x.clone(),
            },
            Instruction::Binary {
                target: t1.clone(),
                lhs: x.clone(),
                op: BinOp::GreaterOrEqual,
                rhs: three,
            },
            Instruction::Param(Operand::Literal(Rc::from("\"%d\\n\""))),
            Instruction::Call {
                function: Function::Printf,
                arguments: 2,
                output: None,
            },
            Instruction::Call {
                function: Function::Input,
                arguments: 0,
                output: Some(t1),
            },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            lines,
            vec![
                "L1:",
                "goto L2",
                "if t1 goto L3",
                "t1 = 3",
                "t1 = - x",
                "t1 = x >= 3",
                "param \"%d\\n\"",
                "call printf, 2",
                "t1 = call input, 0",
            ]
        );
    }
}
