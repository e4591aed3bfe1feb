use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

/// Recursive-descent parser with one-token lookahead.
///
/// Any token mismatch is fatal: the first error aborts the parse and is
/// reported as the invocation's single diagnostic.
pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse one unit: exactly one class followed by end of file.
    pub fn parse_class(mut self) -> Result<Class, Diagnostic> {
        let class = self.class()?;
        if !self.at(&Lexeme::Eof) {
            return Err(self.err(&format!(
                "expected end of file after class body, found {}",
                self.peek().description()
            )));
        }
        Ok(class)
    }

    fn class(&mut self) -> Result<Class, Diagnostic> {
        self.expect(&Lexeme::Class)?;
        let name = self.expect_ident()?;
        self.expect(&Lexeme::LBrace)?;

        let mut vars = Vec::new();
        while self.at(&Lexeme::Static) || self.at(&Lexeme::Field) {
            vars.push(self.class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while self.at(&Lexeme::Constructor)
            || self.at(&Lexeme::Function)
            || self.at(&Lexeme::Method)
        {
            subroutines.push(self.subroutine_dec()?);
        }

        self.expect(&Lexeme::RBrace)?;
        Ok(Class {
            name,
            vars,
            subroutines,
        })
    }

    fn class_var_dec(&mut self) -> Result<ClassVarDec, Diagnostic> {
        let kind = if self.eat(&Lexeme::Static) {
            ClassVarKind::Static
        } else {
            self.expect(&Lexeme::Field)?;
            ClassVarKind::Field
        };
        let ty = self.parse_type()?;
        let mut names = vec![self.expect_ident()?];
        while self.eat(&Lexeme::Comma) {
            names.push(self.expect_ident()?);
        }
        self.expect(&Lexeme::Semicolon)?;
        Ok(ClassVarDec { kind, ty, names })
    }

    fn subroutine_dec(&mut self) -> Result<SubroutineDec, Diagnostic> {
        let kind = if self.eat(&Lexeme::Constructor) {
            SubroutineKind::Constructor
        } else if self.eat(&Lexeme::Function) {
            SubroutineKind::Function
        } else {
            self.expect(&Lexeme::Method)?;
            SubroutineKind::Method
        };

        let return_ty = if self.eat(&Lexeme::Void) {
            ReturnType::Void
        } else {
            ReturnType::Of(self.parse_type()?)
        };

        let name = self.expect_ident()?;
        self.expect(&Lexeme::LParen)?;
        let params = self.parameter_list()?;
        self.expect(&Lexeme::RParen)?;

        self.expect(&Lexeme::LBrace)?;
        let mut locals = Vec::new();
        while self.at(&Lexeme::Var) {
            locals.push(self.var_dec()?);
        }
        let body = self.statements()?;
        self.expect(&Lexeme::RBrace)?;

        Ok(SubroutineDec {
            kind,
            return_ty,
            name,
            params,
            locals,
            body,
        })
    }

    fn parameter_list(&mut self) -> Result<Vec<Param>, Diagnostic> {
        let mut params = Vec::new();
        if self.at(&Lexeme::RParen) {
            return Ok(params);
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            params.push(Param { ty, name });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn var_dec(&mut self) -> Result<VarDec, Diagnostic> {
        self.expect(&Lexeme::Var)?;
        let ty = self.parse_type()?;
        let mut names = vec![self.expect_ident()?];
        while self.eat(&Lexeme::Comma) {
            names.push(self.expect_ident()?);
        }
        self.expect(&Lexeme::Semicolon)?;
        Ok(VarDec { ty, names })
    }

    fn parse_type(&mut self) -> Result<Type, Diagnostic> {
        if self.eat(&Lexeme::Int) {
            Ok(Type::Int)
        } else if self.eat(&Lexeme::Char) {
            Ok(Type::Char)
        } else if self.eat(&Lexeme::Boolean) {
            Ok(Type::Boolean)
        } else if let Some(name) = self.try_ident() {
            Ok(Type::ClassName(name.node))
        } else {
            Err(self.err(&format!(
                "expected a type, found {}",
                self.peek().description()
            )))
        }
    }

    // --- Statements ---

    fn statements(&mut self) -> Result<Vec<Statement>, Diagnostic> {
        let mut stmts = Vec::new();
        loop {
            if self.at(&Lexeme::Let) {
                stmts.push(self.let_statement()?);
            } else if self.at(&Lexeme::If) {
                stmts.push(self.if_statement()?);
            } else if self.at(&Lexeme::While) {
                stmts.push(self.while_statement()?);
            } else if self.at(&Lexeme::Do) {
                stmts.push(self.do_statement()?);
            } else if self.at(&Lexeme::Return) {
                stmts.push(self.return_statement()?);
            } else {
                return Ok(stmts);
            }
        }
    }

    fn let_statement(&mut self) -> Result<Statement, Diagnostic> {
        self.expect(&Lexeme::Let)?;
        let target = self.expect_ident()?;
        let index = if self.eat(&Lexeme::LBracket) {
            let index = self.expression()?;
            self.expect(&Lexeme::RBracket)?;
            Some(index)
        } else {
            None
        };
        self.expect(&Lexeme::Eq)?;
        let value = self.expression()?;
        self.expect(&Lexeme::Semicolon)?;
        Ok(Statement::Let {
            target,
            index,
            value,
        })
    }

    fn if_statement(&mut self) -> Result<Statement, Diagnostic> {
        self.expect(&Lexeme::If)?;
        self.expect(&Lexeme::LParen)?;
        let condition = self.expression()?;
        self.expect(&Lexeme::RParen)?;
        self.expect(&Lexeme::LBrace)?;
        let then_body = self.statements()?;
        self.expect(&Lexeme::RBrace)?;

        let else_body = if self.eat(&Lexeme::Else) {
            self.expect(&Lexeme::LBrace)?;
            let body = self.statements()?;
            self.expect(&Lexeme::RBrace)?;
            Some(body)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn while_statement(&mut self) -> Result<Statement, Diagnostic> {
        self.expect(&Lexeme::While)?;
        self.expect(&Lexeme::LParen)?;
        let condition = self.expression()?;
        self.expect(&Lexeme::RParen)?;
        self.expect(&Lexeme::LBrace)?;
        let body = self.statements()?;
        self.expect(&Lexeme::RBrace)?;
        Ok(Statement::While { condition, body })
    }

    fn do_statement(&mut self) -> Result<Statement, Diagnostic> {
        self.expect(&Lexeme::Do)?;
        let first = self.expect_ident()?;
        let call = self.subroutine_call(first)?;
        self.expect(&Lexeme::Semicolon)?;
        Ok(Statement::Do(call))
    }

    fn return_statement(&mut self) -> Result<Statement, Diagnostic> {
        self.expect(&Lexeme::Return)?;
        let value = if self.at(&Lexeme::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&Lexeme::Semicolon)?;
        Ok(Statement::Return(value))
    }

    // --- Expressions ---

    /// `expression := term (op term)*` — flat left-associative chain,
    /// no precedence.
    fn expression(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let mut lhs = self.term()?;
        while let Some(op) = binary_op(self.peek()) {
            self.advance();
            let rhs = self.term()?;
            let span = lhs.span.merge(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Spanned<Expr>, Diagnostic> {
        let start = self.current_span();
        match self.peek().clone() {
            Lexeme::IntConst(n) => {
                self.advance();
                Ok(Spanned::new(Expr::IntConst(n), start))
            }
            Lexeme::StrConst(s) => {
                self.advance();
                Ok(Spanned::new(Expr::StrConst(s), start))
            }
            Lexeme::True => {
                self.advance();
                Ok(Spanned::new(Expr::True, start))
            }
            Lexeme::False => {
                self.advance();
                Ok(Spanned::new(Expr::False, start))
            }
            Lexeme::Null => {
                self.advance();
                Ok(Spanned::new(Expr::Null, start))
            }
            Lexeme::This => {
                self.advance();
                Ok(Spanned::new(Expr::This, start))
            }
            Lexeme::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&Lexeme::RParen)?;
                Ok(inner)
            }
            Lexeme::Minus => {
                self.advance();
                let term = self.term()?;
                let span = start.merge(term.span);
                Ok(Spanned::new(
                    Expr::Unary {
                        op: UnaryOp::Neg,
                        term: Box::new(term),
                    },
                    span,
                ))
            }
            Lexeme::Tilde => {
                self.advance();
                let term = self.term()?;
                let span = start.merge(term.span);
                Ok(Spanned::new(
                    Expr::Unary {
                        op: UnaryOp::Not,
                        term: Box::new(term),
                    },
                    span,
                ))
            }
            Lexeme::Ident(_) => {
                let name = self.expect_ident()?;
                if self.eat(&Lexeme::LBracket) {
                    let index = self.expression()?;
                    self.expect(&Lexeme::RBracket)?;
                    let span = name.span.merge(self.prev_span());
                    Ok(Spanned::new(
                        Expr::Index {
                            name,
                            index: Box::new(index),
                        },
                        span,
                    ))
                } else if self.at(&Lexeme::LParen) || self.at(&Lexeme::Dot) {
                    let call = self.subroutine_call(name)?;
                    let span = start.merge(self.prev_span());
                    Ok(Spanned::new(Expr::Call(call), span))
                } else {
                    let span = name.span;
                    Ok(Spanned::new(Expr::Var(name), span))
                }
            }
            other => Err(self.err(&format!(
                "expected a term, found {}",
                other.description()
            ))),
        }
    }

    /// Parse the remainder of a subroutine call whose first identifier
    /// has already been consumed: `(args)` or `.name(args)`.
    fn subroutine_call(&mut self, first: Spanned<String>) -> Result<SubroutineCall, Diagnostic> {
        let (receiver, name) = if self.eat(&Lexeme::Dot) {
            let name = self.expect_ident()?;
            (Some(first), name)
        } else {
            (None, first)
        };
        self.expect(&Lexeme::LParen)?;
        let args = self.expression_list()?;
        self.expect(&Lexeme::RParen)?;
        Ok(SubroutineCall {
            receiver,
            name,
            args,
        })
    }

    fn expression_list(&mut self) -> Result<Vec<Spanned<Expr>>, Diagnostic> {
        let mut args = Vec::new();
        if self.at(&Lexeme::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        Ok(args)
    }

    // --- Utility methods ---

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> Result<Span, Diagnostic> {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.err(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, Diagnostic> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Ok(Spanned::new(name, span))
        } else {
            Err(self.err(&format!(
                "expected identifier, found {}",
                self.peek().description()
            )))
        }
    }

    fn try_ident(&mut self) -> Option<Spanned<String>> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Some(Spanned::new(name, span))
        } else {
            None
        }
    }

    fn err(&self, msg: &str) -> Diagnostic {
        Diagnostic::parse(msg.to_string(), self.current_span())
    }
}

fn binary_op(token: &Lexeme) -> Option<BinaryOp> {
    match token {
        Lexeme::Plus => Some(BinaryOp::Add),
        Lexeme::Minus => Some(BinaryOp::Sub),
        Lexeme::Star => Some(BinaryOp::Mul),
        Lexeme::Slash => Some(BinaryOp::Div),
        Lexeme::Amp => Some(BinaryOp::And),
        Lexeme::Pipe => Some(BinaryOp::Or),
        Lexeme::Lt => Some(BinaryOp::Lt),
        Lexeme::Gt => Some(BinaryOp::Gt),
        Lexeme::Eq => Some(BinaryOp::Eq),
        _ => None,
    }
}
