//! Statement lowering.

use super::ClassContext;
use crate::ast::Statement;
use crate::diagnostic::Diagnostic;
use crate::vm::{Segment, VmCommand};

impl ClassContext<'_> {
    pub(super) fn statements(&mut self, stmts: &[Statement]) -> Result<(), Diagnostic> {
        for stmt in stmts {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Statement) -> Result<(), Diagnostic> {
        match stmt {
            Statement::Let {
                target,
                index,
                value,
            } => {
                let symbol = self.resolve(target)?;
                match index {
                    Some(index) => {
                        // Element address first, then the RHS; the
                        // temp 0 / pointer 1 shuffle keeps the address
                        // live across the RHS so aliased assignments
                        // like `let x[i] = x[j]` stay correct.
                        self.expression(index)?;
                        self.push_symbol(&symbol);
                        self.emit(VmCommand::Add);
                        self.expression(value)?;
                        self.emit(VmCommand::Pop(Segment::Temp, 0));
                        self.emit(VmCommand::Pop(Segment::Pointer, 1));
                        self.emit(VmCommand::Push(Segment::Temp, 0));
                        self.emit(VmCommand::Pop(Segment::That, 0));
                    }
                    None => {
                        self.expression(value)?;
                        self.emit(VmCommand::Pop(symbol.kind.segment(), symbol.index));
                    }
                }
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                let label_true = self.fresh_label();
                let label_false = self.fresh_label();
                let label_end = self.fresh_label();

                self.expression(condition)?;
                self.emit(VmCommand::IfGoto(label_true.clone()));
                self.emit(VmCommand::Goto(label_false.clone()));
                self.emit(VmCommand::Label(label_true));
                self.statements(then_body)?;
                match else_body {
                    Some(else_body) => {
                        self.emit(VmCommand::Goto(label_end.clone()));
                        self.emit(VmCommand::Label(label_false));
                        self.statements(else_body)?;
                        self.emit(VmCommand::Label(label_end));
                    }
                    None => {
                        self.emit(VmCommand::Label(label_false));
                    }
                }
            }
            Statement::While { condition, body } => {
                let label_top = self.fresh_label();
                let label_exit = self.fresh_label();

                self.emit(VmCommand::Label(label_top.clone()));
                self.expression(condition)?;
                self.emit(VmCommand::Not);
                self.emit(VmCommand::IfGoto(label_exit.clone()));
                self.statements(body)?;
                self.emit(VmCommand::Goto(label_top));
                self.emit(VmCommand::Label(label_exit));
            }
            Statement::Do(call) => {
                // compile as an expression, discard the result
                self.subroutine_call(call)?;
                self.emit(VmCommand::Pop(Segment::Temp, 0));
            }
            Statement::Return(value) => {
                match value {
                    Some(value) => self.expression(value)?,
                    None => self.emit(VmCommand::Push(Segment::Constant, 0)),
                }
                self.emit(VmCommand::Return);
            }
        }
        Ok(())
    }
}
