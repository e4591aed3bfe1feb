//! Jack AST → VM commands.
//!
//! A `ClassContext` is created per class, mutated by every compile
//! method, and discarded once the class's output is taken. The
//! subroutine symbol table is reset wholesale at each subroutine
//! boundary; the label counter is never reset.

mod expr;
mod stmt;

use crate::ast::{Class, ClassVarKind, SubroutineDec, SubroutineKind};
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;
use crate::symtab::{SymbolEntry, SymbolTable, VarKind};
use crate::vm::{Segment, VmCommand};

/// Source of fresh control-flow labels `L1`, `L2`, ...
///
/// The counter is monotonic and explicitly threaded: a multi-unit driver
/// passes the same counter to every class so compiler labels stay unique
/// across the whole run once they reach assembly.
#[derive(Debug, Default)]
pub struct LabelCounter {
    value: u32,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> String {
        self.value += 1;
        format!("L{}", self.value)
    }
}

/// Compile one class to its VM command stream.
pub fn build_class(
    class: &Class,
    labels: &mut LabelCounter,
) -> Result<Vec<VmCommand>, Diagnostic> {
    let ctx = ClassContext {
        class_name: class.name.node.clone(),
        class_table: SymbolTable::new(),
        subroutine_table: SymbolTable::new(),
        labels,
        code: Vec::new(),
    };
    ctx.build(class)
}

pub(crate) struct ClassContext<'a> {
    class_name: String,
    class_table: SymbolTable,
    subroutine_table: SymbolTable,
    labels: &'a mut LabelCounter,
    code: Vec<VmCommand>,
}

impl ClassContext<'_> {
    fn build(mut self, class: &Class) -> Result<Vec<VmCommand>, Diagnostic> {
        for dec in &class.vars {
            let kind = match dec.kind {
                ClassVarKind::Static => VarKind::Static,
                ClassVarKind::Field => VarKind::Field,
            };
            for name in &dec.names {
                self.define_in_class(name, dec.ty.name(), kind)?;
            }
        }

        for sub in &class.subroutines {
            self.subroutine(sub)?;
        }

        Ok(self.code)
    }

    fn subroutine(&mut self, sub: &SubroutineDec) -> Result<(), Diagnostic> {
        self.subroutine_table.reset();

        // A method receives its object as argument 0. The declared
        // keyword alone decides this; nothing else does.
        if sub.kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.subroutine_table.define("this", &class_name, VarKind::Arg);
        }
        for param in &sub.params {
            self.define_in_subroutine(&param.name, param.ty.name(), VarKind::Arg)?;
        }
        for dec in &sub.locals {
            for name in &dec.names {
                self.define_in_subroutine(name, dec.ty.name(), VarKind::Local)?;
            }
        }

        let n_locals = self.subroutine_table.kind_count(VarKind::Local);
        self.emit(VmCommand::Function(
            format!("{}.{}", self.class_name, sub.name.node),
            n_locals,
        ));

        match sub.kind {
            SubroutineKind::Constructor => {
                // allocate one word per field and anchor `this`
                let field_count = self.class_table.kind_count(VarKind::Field);
                self.emit(VmCommand::Push(Segment::Constant, field_count));
                self.emit(VmCommand::Call("Memory.alloc".to_string(), 1));
                self.emit(VmCommand::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Method => {
                self.emit(VmCommand::Push(Segment::Argument, 0));
                self.emit(VmCommand::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Function => {}
        }

        self.statements(&sub.body)
    }

    // --- Shared helpers for stmt/expr compilation ---

    fn emit(&mut self, command: VmCommand) {
        self.code.push(command);
    }

    fn fresh_label(&mut self) -> String {
        self.labels.fresh()
    }

    /// Subroutine-first, class-second lookup.
    fn try_resolve(&self, name: &str) -> Option<SymbolEntry> {
        self.subroutine_table
            .lookup(name)
            .or_else(|| self.class_table.lookup(name))
            .cloned()
    }

    fn resolve(&self, name: &Spanned<String>) -> Result<SymbolEntry, Diagnostic> {
        self.try_resolve(&name.node).ok_or_else(|| {
            Diagnostic::symbol(
                format!("undeclared identifier '{}'", name.node),
                name.span,
            )
            .with_help("declare it as a field, static, parameter, or var first".to_string())
        })
    }

    fn push_symbol(&mut self, entry: &SymbolEntry) {
        self.emit(VmCommand::Push(entry.kind.segment(), entry.index));
    }

    fn define_in_class(
        &mut self,
        name: &Spanned<String>,
        ty: &str,
        kind: VarKind,
    ) -> Result<(), Diagnostic> {
        if self.class_table.define(&name.node, ty, kind).is_none() {
            return Err(redefinition(name));
        }
        Ok(())
    }

    fn define_in_subroutine(
        &mut self,
        name: &Spanned<String>,
        ty: &str,
        kind: VarKind,
    ) -> Result<(), Diagnostic> {
        if self.subroutine_table.define(&name.node, ty, kind).is_none() {
            return Err(redefinition(name));
        }
        Ok(())
    }
}

fn redefinition(name: &Spanned<String>) -> Diagnostic {
    Diagnostic::symbol(
        format!("identifier '{}' is already defined in this scope", name.node),
        name.span,
    )
}
