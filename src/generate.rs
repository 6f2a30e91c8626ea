//! Generación de código intermedio.
//!
//! Las expresiones se reducen de manera uniforme: cada operador evalúa
//! ambos operandos de izquierda a derecha y deposita su resultado en un
//! temporal nuevo. No existe evaluación en cortocircuito para `&&` ni
//! `||`. Los temporales se registran en la tabla de identificadores con
//! el tipo del nodo que los origina.

use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{Block, Branch, Expr, ExprKind, Statement, Type},
    ir::{self, Function, Instruction, Label, Operand},
    lex::Identifier,
    semantic::{Binding, Checked, SymbolTable},
};

/// Violación de una invariante que análisis semántico debió garantizar.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("Symbol `{0}` has no entry in the symbol table")]
    Unbound(Identifier),

    #[error("Assignment target `{0}` has no resolved type")]
    UntypedTarget(Identifier),

    #[error("Ran out of {0}")]
    Exhausted(&'static str),
}

pub type Internal<T> = Result<T, InternalError>;

impl Checked {
    /// Traduce el árbol verificado a código de tres direcciones.
    pub fn generate(self) -> Internal<ir::Program> {
        let Checked { block, symbols } = self;

        let mut generator = Generator {
            symbols,
            code: Vec::new(),
            next_temp: 1,
            next_label: 1,
        };

        generator.block(&block)?;

        Ok(ir::Program {
            instructions: generator.code,
            symbols: generator.symbols,
        })
    }
}

struct Generator {
    symbols: SymbolTable,
    code: Vec<Instruction>,
    next_temp: u32,
    next_label: u32,
}

impl Generator {
    fn block(&mut self, block: &Block) -> Internal<()> {
        block
            .statements()
            .iter()
            .try_for_each(|statement| self.statement(statement))
    }

    fn statement(&mut self, statement: &Statement) -> Internal<()> {
        match statement {
            Statement::Assign { target, value, .. } => {
                match self.symbols.get(target.as_ref()).map(Binding::ty) {
                    None => return Err(InternalError::Unbound(target.clone())),
                    Some(None) => return Err(InternalError::UntypedTarget(target.clone())),
                    Some(Some(_)) => (),
                }

                let value = self.expr(value)?;
                self.push(Instruction::Copy {
                    target: target.clone(),
                    value,
                });
            }

            Statement::If {
                branches,
                otherwise,
            } => self.if_chain(branches, otherwise.as_ref())?,

            Statement::While { condition, body } => {
                let top = self.label()?;
                let enter = self.label()?;
                let exit = self.label()?;

                self.push(Instruction::SetLabel(top));
                let condition = self.expr(condition)?;

                self.push(Instruction::JumpIf(condition, enter));
                self.push(Instruction::Jump(exit));
                self.push(Instruction::SetLabel(enter));
                self.block(body)?;
                self.push(Instruction::Jump(top));
                self.push(Instruction::SetLabel(exit));
            }

            Statement::Output { format, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<Internal<Vec<_>>>()?;

                let arguments = u32::try_from(args.len() + 1)
                    .map_err(|_| InternalError::Exhausted("call arguments"))?;

                self.push(Instruction::Param(Operand::Literal(format.clone())));
                for arg in args {
                    self.push(Instruction::Param(arg));
                }

                self.push(Instruction::Call {
                    function: Function::Printf,
                    arguments,
                    output: None,
                });
            }
        }

        Ok(())
    }

    fn if_chain(&mut self, branches: &[Branch], otherwise: Option<&Block>) -> Internal<()> {
        let end = self.label()?;

        for branch in branches {
            let condition = self.expr(&branch.condition)?;
            let taken = self.label()?;
            let next = self.label()?;

            self.push(Instruction::JumpIf(condition, taken));
            self.push(Instruction::Jump(next));
            self.push(Instruction::SetLabel(taken));
            self.block(&branch.body)?;
            self.push(Instruction::Jump(end));
            self.push(Instruction::SetLabel(next));
        }

        if let Some(otherwise) = otherwise {
            self.block(otherwise)?;
        }

        self.push(Instruction::SetLabel(end));
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Internal<Operand> {
        let (target, instruction) = match &expr.kind {
            ExprKind::Literal(lexeme) => return Ok(Operand::Literal(lexeme.clone())),

            ExprKind::Variable(name) => {
                return match self.symbols.contains(name.as_ref()) {
                    true => Ok(Operand::Name(name.clone())),
                    false => Err(InternalError::Unbound(name.clone())),
                }
            }

            ExprKind::Input => {
                let target = self.temp(expr.ty)?;
                let call = Instruction::Call {
                    function: Function::Input,
                    arguments: 0,
                    output: Some(target.clone()),
                };

                (target, call)
            }

            ExprKind::Unary(op, operand) => {
                let value = self.expr(operand)?;
                let target = self.temp(expr.ty)?;
                let unary = Instruction::Unary {
                    target: target.clone(),
                    op: *op,
                    value,
                };

                (target, unary)
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                let target = self.temp(expr.ty)?;
                let binary = Instruction::Binary {
                    target: target.clone(),
                    lhs,
                    op: *op,
                    rhs,
                };

                (target, binary)
            }
        };

        self.push(instruction);
        Ok(Operand::Name(target))
    }

    /// Reserva un temporal nuevo, omitiendo nombres ya presentes en la tabla.
    fn temp(&mut self, ty: Type) -> Internal<Identifier> {
        loop {
            let number = self.next_temp;
            self.next_temp = number
                .checked_add(1)
                .ok_or(InternalError::Exhausted("temporaries"))?;

            let name = Identifier::from(format!("t{}", number));
            if self.symbols.insert(name.clone(), Binding::new(Some(ty), true)) {
                trace!(%name, %ty, "temporary");
                return Ok(name);
            }
        }
    }

    fn label(&mut self) -> Internal<Label> {
        let label = Label(self.next_label);
        self.next_label = label
            .0
            .checked_add(1)
            .ok_or(InternalError::Exhausted("labels"))?;

        trace!(%label, "label");
        Ok(label)
    }

    fn push(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::tokenize, parse};
    use std::rc::Rc;

    fn lower(source: &str) -> ir::Program {
        parse::parse(tokenize(source).into_iter())
            .expect("syntax error")
            .check(SymbolTable::new())
            .expect("semantic error")
            .generate()
            .expect("internal error")
    }

    fn lines(program: &ir::Program) -> Vec<String> {
        program
            .instructions
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn multiplication_is_lowered_first() {
        let program = lower("let y = 1 + 2 * 3;");

        assert_eq!(lines(&program), vec!["t1 = 2 * 3", "t2 = 1 + t1", "y = t2"]);
        assert_eq!(program.symbols.get("y").and_then(Binding::ty), Some(Type::Int));
    }

    #[test]
    fn output_with_input_argument() {
        let program = lower("output \"val\", input;");

        assert_eq!(
            lines(&program),
            vec![
                "t1 = call input, 0",
                "param \"val\"",
                "param t1",
                "call printf, 2",
            ]
        );
    }

    #[test]
    fn if_else_lowering() {
        let source = "let mut x; x = 5; if x > 3 { output \"big\"; } else { output \"small\"; };";
        let program = lower(source);

        assert_eq!(
            program.symbols.get("x"),
            Some(&Binding::new(Some(Type::Int), true))
        );

        assert_eq!(
            lines(&program),
            vec![
                "x = 5",
                "t1 = x > 3",
                "if t1 goto L2",
                "goto L3",
                "L2:",
                "param \"big\"",
                "call printf, 1",
                "goto L1",
                "L3:",
                "param \"small\"",
                "call printf, 1",
                "L1:",
            ]
        );
    }

    #[test]
    fn if_chain_shares_one_end_label() {
        let source = "let n = input;
            if n == 1 { output \"a\"; }
            else if n == 2 { output \"b\"; }
            else if n == 3 { output \"c\"; };";

        let program = lower(source);
        let code = &program.instructions;

        let end = match code.last() {
            Some(Instruction::SetLabel(label)) => *label,
            other => panic!("unexpected last instruction {:?}", other),
        };

        let conditional = code
            .iter()
            .filter(|i| matches!(i, Instruction::JumpIf(..)))
            .count();

        let to_end = code
            .iter()
            .filter(|i| **i == Instruction::Jump(end))
            .count();

        let labels = code
            .iter()
            .filter(|i| matches!(i, Instruction::SetLabel(_)))
            .count();

        assert_eq!(conditional, 3);
        assert_eq!(to_end, 3);
        assert_eq!(labels, 2 * 3 + 1);
    }

    #[test]
    fn while_has_a_single_back_edge() {
        let program = lower("let mut i = 0; while i < 10 { i = i + 1; };");
        let code = &program.instructions;

        let (top_index, top) = code
            .iter()
            .enumerate()
            .find_map(|(index, i)| match i {
                Instruction::SetLabel(label) => Some((index, *label)),
                _ => None,
            })
            .unwrap();

        let back_edges: Vec<_> = code
            .iter()
            .enumerate()
            .filter(|(_, i)| **i == Instruction::Jump(top))
            .map(|(index, _)| index)
            .collect();

        let condition = code
            .iter()
            .position(|i| matches!(i, Instruction::JumpIf(..)))
            .unwrap();

        let increment = code
            .iter()
            .position(|i| i.to_string() == "i = t2")
            .unwrap();

        assert_eq!(back_edges.len(), 1);
        assert!(top_index < condition);
        assert!(condition < increment);
        assert!(increment < back_edges[0]);
    }

    #[test]
    fn logical_operators_do_not_short_circuit() {
        let program = lower("let b = true && false || true;");

        assert_eq!(
            lines(&program),
            vec!["t1 = true && false", "t2 = t1 || true", "b = t2"]
        );
    }

    #[test]
    fn negation_is_lowered_through_a_temporary() {
        let program = lower("let b = !(1 < 2);");

        assert_eq!(lines(&program), vec!["t1 = 1 < 2", "t2 = ! t1", "b = t2"]);
        assert_eq!(program.symbols.get("t2").and_then(Binding::ty), Some(Type::Bool));
    }

    #[test]
    fn temporaries_skip_user_names() {
        let program = lower("let t1 = 1; let t2 = t1 + 1;");

        assert_eq!(lines(&program), vec!["t1 = 1", "t3 = t1 + 1", "t2 = t3"]);
    }

    #[test]
    fn temporaries_are_typed() {
        let program = lower("let f = -1.5 * 2.0; let b = 'a' < 'b';");

        let types: Vec<_> = ["t1", "t2", "t3"]
            .iter()
            .map(|name| program.symbols.get(name).and_then(Binding::ty))
            .collect();

        assert_eq!(
            types,
            vec![Some(Type::Float), Some(Type::Float), Some(Type::Bool)]
        );
    }

    #[test]
    fn lowering_is_reproducible() {
        let source = "let mut a = 2;
            while a < 8 { if a % 2 == 0 { output \"%d\", a; }; a = a + 1; };";
        assert_eq!(lines(&lower(source)), lines(&lower(source)));
    }

    #[test]
    fn broken_invariants_are_internal_errors() {
        let assign = |target: &str| Statement::Assign {
            target: Identifier::from(target),
            value: Expr::new(ExprKind::Literal(Rc::from("1")), Type::Int),
            ty: Type::Int,
        };

        let unbound = Checked {
            block: Block(vec![assign("ghost")]),
            symbols: SymbolTable::new(),
        };

        assert!(matches!(
            unbound.generate(),
            Err(InternalError::Unbound(name)) if name.as_ref() == "ghost"
        ));

        let mut symbols = SymbolTable::new();
        symbols.insert(Identifier::from("v"), Binding::new(None, true));

        let untyped = Checked {
            block: Block(vec![assign("v")]),
            symbols,
        };

        assert!(matches!(
            untyped.generate(),
            Err(InternalError::UntypedTarget(_))
        ));
    }
}
