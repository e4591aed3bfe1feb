//! Expression and call lowering.
//!
//! Every operator is emitted after its operands (postfix order); the
//! operand streams themselves are emitted left to right.

use super::ClassContext;
use crate::ast::{BinaryOp, Expr, SubroutineCall, UnaryOp};
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;
use crate::vm::{Segment, VmCommand};

impl ClassContext<'_> {
    pub(super) fn expression(&mut self, expr: &Spanned<Expr>) -> Result<(), Diagnostic> {
        match &expr.node {
            Expr::IntConst(n) => {
                self.emit(VmCommand::Push(Segment::Constant, *n));
            }
            Expr::StrConst(s) => self.string_constant(s),
            Expr::True => {
                // all-ones truth value
                self.emit(VmCommand::Push(Segment::Constant, 1));
                self.emit(VmCommand::Neg);
            }
            Expr::False | Expr::Null => {
                self.emit(VmCommand::Push(Segment::Constant, 0));
            }
            Expr::This => {
                self.emit(VmCommand::Push(Segment::Pointer, 0));
            }
            Expr::Var(name) => {
                let symbol = self.resolve(name)?;
                self.push_symbol(&symbol);
            }
            Expr::Index { name, index } => {
                // element address = index + base, then read through THAT
                self.expression(index)?;
                let symbol = self.resolve(name)?;
                self.push_symbol(&symbol);
                self.emit(VmCommand::Add);
                self.emit(VmCommand::Pop(Segment::Pointer, 1));
                self.emit(VmCommand::Push(Segment::That, 0));
            }
            Expr::Call(call) => {
                self.subroutine_call(call)?;
            }
            Expr::Unary { op, term } => {
                self.expression(term)?;
                match op {
                    UnaryOp::Neg => self.emit(VmCommand::Neg),
                    UnaryOp::Not => self.emit(VmCommand::Not),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                self.expression(lhs)?;
                self.expression(rhs)?;
                self.binary_op(*op);
            }
        }
        Ok(())
    }

    fn binary_op(&mut self, op: BinaryOp) {
        match op {
            BinaryOp::Add => self.emit(VmCommand::Add),
            BinaryOp::Sub => self.emit(VmCommand::Sub),
            BinaryOp::And => self.emit(VmCommand::And),
            BinaryOp::Or => self.emit(VmCommand::Or),
            BinaryOp::Lt => self.emit(VmCommand::Lt),
            BinaryOp::Gt => self.emit(VmCommand::Gt),
            BinaryOp::Eq => self.emit(VmCommand::Eq),
            // no multiply/divide hardware: these are OS calls
            BinaryOp::Mul => self.emit(VmCommand::Call("Math.multiply".to_string(), 2)),
            BinaryOp::Div => self.emit(VmCommand::Call("Math.divide".to_string(), 2)),
        }
    }

    fn string_constant(&mut self, s: &str) {
        let length = s.chars().count() as u16;
        self.emit(VmCommand::Push(Segment::Constant, length));
        self.emit(VmCommand::Call("String.new".to_string(), 1));
        for c in s.chars() {
            self.emit(VmCommand::Push(Segment::Constant, c as u16));
            self.emit(VmCommand::Call("String.appendChar".to_string(), 2));
        }
    }

    /// Compile one of the three call forms. The receiver slot decides:
    /// absent — a method call on the current object; a declared symbol —
    /// a method call on that object (its value becomes argument 0); an
    /// unknown name — a static or constructor call on that class.
    pub(super) fn subroutine_call(&mut self, call: &SubroutineCall) -> Result<(), Diagnostic> {
        match &call.receiver {
            None => {
                self.emit(VmCommand::Push(Segment::Pointer, 0));
                let n_args = self.arguments(call)?;
                let name = format!("{}.{}", self.class_name, call.name.node);
                self.emit(VmCommand::Call(name, n_args + 1));
            }
            Some(receiver) => match self.try_resolve(&receiver.node) {
                Some(symbol) => {
                    self.push_symbol(&symbol);
                    let n_args = self.arguments(call)?;
                    let name = format!("{}.{}", symbol.ty, call.name.node);
                    self.emit(VmCommand::Call(name, n_args + 1));
                }
                None => {
                    let n_args = self.arguments(call)?;
                    let name = format!("{}.{}", receiver.node, call.name.node);
                    self.emit(VmCommand::Call(name, n_args));
                }
            },
        }
        Ok(())
    }

    fn arguments(&mut self, call: &SubroutineCall) -> Result<u16, Diagnostic> {
        for arg in &call.args {
            self.expression(arg)?;
        }
        Ok(call.args.len() as u16)
    }
}
