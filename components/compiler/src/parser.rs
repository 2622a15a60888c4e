//! Recursive descent parser, type checker and code generator for AMPL.
//!
//! Compilation is a single pass: each grammar production has one method
//! that parses with one token of lookahead, checks types as operands
//! appear, and drives the bytecode [`Generator`] as it goes. There is no
//! syntax tree; the parser's call stack is the only program structure.
//!
//! Type mismatches are reported with the context of the construct that
//! required the type, so the context string of the nearest enclosing
//! consumer (assignment target, array index, guard, parameter) threads
//! down through the expression methods.

use crate::error::{expected_token, incompatible_types, internal_error, semantic_error, syntax_error};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::symbols::SymbolTable;
use bytecode::{Comparison, Generator, Label, Opcode, Program};
use core_types::{CompileError, Primitive, SourcePosition, Span, SymbolProperties, ValueType};

/// A name collected by `varseq` before it is bound in the symbol table.
struct Declared {
    name: String,
    span: Span,
    value_type: ValueType,
}

fn comparison_for(kind: &TokenKind) -> Option<Comparison> {
    match kind {
        TokenKind::Eq => Some(Comparison::Eq),
        TokenKind::Ne => Some(Comparison::Ne),
        TokenKind::Lt => Some(Comparison::Lt),
        TokenKind::Le => Some(Comparison::Le),
        TokenKind::Gt => Some(Comparison::Gt),
        TokenKind::Ge => Some(Comparison::Ge),
        _ => None,
    }
}

/// AMPL parser
pub struct Parser {
    lexer: Lexer,
    token: Token,
    symbols: SymbolTable,
    code: Generator,
    /// Declared return type of the subroutine being compiled, `None` in
    /// procedures and in `main`
    return_type: Option<Primitive>,
    /// Current operand stack depth of the subroutine being compiled
    stack_depth: u32,
    /// High-water mark of `stack_depth`
    max_stack_depth: u32,
}

impl Parser {
    /// Create a new parser for the given source code.
    pub fn new(source: &str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            token: Token {
                kind: TokenKind::Eof,
                span: Span::point(SourcePosition::origin()),
            },
            symbols: SymbolTable::new(),
            code: Generator::new(),
            return_type: None,
            stack_depth: 0,
            max_stack_depth: 0,
        }
    }

    /// Compile the source to a bytecode program.
    ///
    /// Consumes the parser; compilation stops at the first error.
    pub fn parse(mut self) -> Result<Program, CompileError> {
        self.advance()?;
        self.parse_program()?;
        Ok(self.code.finish())
    }

    /// program = "program" id ":" { funcdef } "main" ":" body .
    fn parse_program(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Program)?;
        let (name, _) = self.expect_identifier()?;
        self.code.set_program_name(&name);
        self.expect(TokenKind::Colon)?;
        while matches!(self.token.kind, TokenKind::Identifier(_)) {
            self.parse_funcdef()?;
        }
        self.expect(TokenKind::Main)?;
        self.expect(TokenKind::Colon)?;

        // main's variables live in the global scope; its slots restart at
        // zero because close_subroutine leaves the counter where the last
        // funcdef ended
        self.symbols.reset_offsets();
        let properties = SymbolProperties::new(ValueType::Procedure { params: vec![] });
        if !self.symbols.insert_name("main", properties.clone()) {
            return Err(internal_error("'main' bound before its definition"));
        }
        self.code.init_subroutine("main", &properties);
        self.return_type = None;
        self.stack_depth = 0;
        self.max_stack_depth = 0;
        self.parse_body()?;
        self.code.set_max_stack_depth(self.max_stack_depth);
        self.code.close_subroutine(self.symbols.variables_width());

        self.expect(TokenKind::Eof)
    }

    /// funcdef = id ":" "takes" varseq { ";" varseq } [ "returns" type ] body .
    fn parse_funcdef(&mut self) -> Result<(), CompileError> {
        let (name, name_span) = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        self.expect(TokenKind::Takes)?;

        // the subroutine's own name seeds the group so a parameter that
        // repeats it reports a multiple definition
        let mut group = vec![Declared {
            name: name.clone(),
            span: name_span,
            value_type: ValueType::Procedure { params: vec![] },
        }];
        self.parse_varseq(&mut group)?;
        while self.check(&TokenKind::Semicolon) {
            self.advance()?;
            self.parse_varseq(&mut group)?;
        }

        let params: Vec<ValueType> = group[1..].iter().map(|d| d.value_type.clone()).collect();
        let value_type = if self.check(&TokenKind::Returns) {
            self.advance()?;
            let type_position = self.token.span.start;
            match self.parse_type()? {
                ValueType::Scalar(returns) => ValueType::Function { params, returns },
                _ => {
                    return Err(semantic_error(
                        "function may not return an array",
                        type_position,
                    ))
                }
            }
        } else {
            ValueType::Procedure { params }
        };

        let properties = SymbolProperties::new(value_type.clone());
        if !self.symbols.open_subroutine(&name, properties.clone()) {
            return Err(semantic_error(
                format!("multiple definition of '{}'", name),
                name_span.start,
            ));
        }
        for declared in group.drain(1..) {
            if !self
                .symbols
                .insert_name(&declared.name, SymbolProperties::new(declared.value_type))
            {
                return Err(semantic_error(
                    format!("multiple definition of '{}'", declared.name),
                    declared.span.start,
                ));
            }
        }

        self.code.init_subroutine(&name, &properties);
        self.return_type = match value_type {
            ValueType::Function { returns, .. } => Some(returns),
            _ => None,
        };
        self.stack_depth = 0;
        self.max_stack_depth = 0;
        self.parse_body()?;
        self.code.set_max_stack_depth(self.max_stack_depth);
        let frame_width = self.symbols.variables_width();
        self.symbols.close_subroutine();
        self.code.close_subroutine(frame_width);
        Ok(())
    }

    /// varseq = id { "," id } "as" type .
    ///
    /// Collected names are appended to `group` with their declared type;
    /// duplicates within the group or against visible bindings are fatal
    /// here so the error lands on the repeated name.
    fn parse_varseq(&mut self, group: &mut Vec<Declared>) -> Result<(), CompileError> {
        let segment_start = group.len();
        loop {
            let (name, span) = self.expect_identifier()?;
            if group.iter().any(|d| d.name == name) || self.symbols.find_name(&name).is_some() {
                return Err(semantic_error(
                    format!("multiple definition of '{}'", name),
                    span.start,
                ));
            }
            group.push(Declared {
                name,
                span,
                value_type: ValueType::Scalar(Primitive::Integer),
            });
            if self.check(&TokenKind::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(TokenKind::As)?;
        let value_type = self.parse_type()?;
        for declared in &mut group[segment_start..] {
            declared.value_type = value_type.clone();
        }
        Ok(())
    }

    /// type = ( "boolean" | "integer" ) [ "array" ] .
    fn parse_type(&mut self) -> Result<ValueType, CompileError> {
        let primitive = match self.token.kind {
            TokenKind::Boolean => Primitive::Boolean,
            TokenKind::Integer => Primitive::Integer,
            _ => {
                return Err(syntax_error(
                    format!("expected type, but found {}", self.token.kind),
                    self.token.span.start,
                ))
            }
        };
        self.advance()?;
        if self.check(&TokenKind::Array) {
            self.advance()?;
            Ok(ValueType::Array(primitive))
        } else {
            Ok(ValueType::Scalar(primitive))
        }
    }

    /// body = [ "vars" varseq { ";" varseq } ] statements .
    fn parse_body(&mut self) -> Result<(), CompileError> {
        if self.check(&TokenKind::Vars) {
            self.advance()?;
            let mut group = Vec::new();
            self.parse_varseq(&mut group)?;
            while self.check(&TokenKind::Semicolon) {
                self.advance()?;
                self.parse_varseq(&mut group)?;
            }
            for declared in group {
                if !self
                    .symbols
                    .insert_name(&declared.name, SymbolProperties::new(declared.value_type))
                {
                    return Err(semantic_error(
                        format!("multiple definition of '{}'", declared.name),
                        declared.span.start,
                    ));
                }
            }
        }
        self.parse_statements()
    }

    /// statements = "chillax" | statement { ";" statement } "end" .
    fn parse_statements(&mut self) -> Result<(), CompileError> {
        if self.check(&TokenKind::Chillax) {
            return self.advance();
        }
        self.parse_statement()?;
        while self.check(&TokenKind::Semicolon) {
            self.advance()?;
            self.parse_statement()?;
        }
        self.expect(TokenKind::End)
    }

    /// statement = assign | back | do | if | input | output | while .
    fn parse_statement(&mut self) -> Result<(), CompileError> {
        match self.token.kind {
            TokenKind::Let => self.parse_assign(),
            TokenKind::Back => self.parse_back(),
            TokenKind::Do => self.parse_do(),
            TokenKind::If => self.parse_if(),
            TokenKind::Input => self.parse_input(),
            TokenKind::Output => self.parse_output(),
            TokenKind::While => self.parse_while(),
            _ => Err(syntax_error(
                format!("expected statement, but found {}", self.token.kind),
                self.token.span.start,
            )),
        }
    }

    /// assign = "let" id [ "[" simple "]" ] "=" ( expr | "array" simple ) .
    fn parse_assign(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Let)?;
        let (name, name_span) = self.expect_identifier()?;
        match self.symbols.find_name(&name) {
            Some(properties) => {
                let properties = properties.clone();
                self.parse_assign_known(&name, name_span, &properties)
            }
            None => self.parse_assign_inferred(&name, name_span),
        }
    }

    /// Assignment to a declared name.
    fn parse_assign_known(
        &mut self,
        name: &str,
        name_span: Span,
        properties: &SymbolProperties,
    ) -> Result<(), CompileError> {
        if properties.value_type.is_callable() {
            return Err(semantic_error(
                format!("'{}' is not a variable", name),
                name_span.start,
            ));
        }

        let mut indexed = false;
        if self.check(&TokenKind::LBracket) {
            if !properties.value_type.is_array() {
                return Err(semantic_error(
                    format!("'{}' is not an array", name),
                    name_span.start,
                ));
            }
            indexed = true;
            self.advance()?;
            // the reference goes under the index and the value
            self.emit_load(properties.offset);
            self.parse_index(name)?;
            self.expect(TokenKind::RBracket)?;
        }
        self.expect(TokenKind::Eq)?;

        if self.check(&TokenKind::Array) {
            if indexed {
                return Err(semantic_error(
                    format!("illegal allocation to indexed array '{}'", name),
                    name_span.start,
                ));
            }
            let element = match properties.value_type {
                ValueType::Array(element) => element,
                _ => {
                    return Err(semantic_error(
                        format!("'{}' is not an array", name),
                        name_span.start,
                    ))
                }
            };
            self.advance()?;
            let size_position = self.token.span.start;
            let size_type = self.parse_simple("")?;
            self.check_type(
                &size_type,
                &ValueType::Scalar(Primitive::Integer),
                size_position,
                "",
            )?;
            // the length on the stack becomes the reference
            self.code.emit(Opcode::NewArray(element));
            self.emit_store(properties.offset);
            return Ok(());
        }

        if !self.token.kind.starts_expr() {
            return Err(syntax_error(
                format!(
                    "expected array allocation or expression, but found {}",
                    self.token.kind
                ),
                self.token.span.start,
            ));
        }
        let context = format!("for assignment to '{}'", name);
        let rhs_position = self.token.span.start;
        let rhs_type = self.parse_expr(&context)?.result();
        let expected = match (&properties.value_type, indexed) {
            (ValueType::Array(element), true) => ValueType::Scalar(*element),
            (other, _) => other.clone(),
        };
        self.check_type(&rhs_type, &expected, rhs_position, &context)?;

        if indexed {
            self.code.emit(Opcode::StoreElement);
            self.popped(3);
        } else {
            self.emit_store(properties.offset);
        }
        Ok(())
    }

    /// Assignment to an unknown name, which may declare it.
    ///
    /// Only the plain scalar form declares; an indexed target or an array
    /// allocation needs a prior declaration, so the name stays unknown.
    fn parse_assign_inferred(&mut self, name: &str, name_span: Span) -> Result<(), CompileError> {
        if self.check(&TokenKind::LBracket) {
            return Err(semantic_error(
                format!("unknown identifier '{}'", name),
                name_span.start,
            ));
        }
        self.expect(TokenKind::Eq)?;
        if self.check(&TokenKind::Array) {
            return Err(semantic_error(
                format!("unknown identifier '{}'", name),
                name_span.start,
            ));
        }
        if !self.token.kind.starts_expr() {
            return Err(syntax_error(
                format!(
                    "expected array allocation or expression, but found {}",
                    self.token.kind
                ),
                self.token.span.start,
            ));
        }
        let context = format!("for assignment to '{}'", name);
        let rhs_type = self.parse_expr(&context)?.result();

        // declare the name with the right-hand side's type; the slot it
        // receives is the counter value before insertion
        let offset = self.symbols.variables_width();
        if !self.symbols.insert_name(name, SymbolProperties::new(rhs_type)) {
            return Err(internal_error("fresh name failed to insert"));
        }
        self.emit_store(offset);
        Ok(())
    }

    /// back = "back" [ expr ] .
    fn parse_back(&mut self) -> Result<(), CompileError> {
        let back_position = self.token.span.start;
        self.expect(TokenKind::Back)?;
        if self.token.kind.starts_expr() {
            let returns = match self.return_type {
                Some(returns) => returns,
                None => {
                    return Err(semantic_error(
                        "'back' expression not allowed in procedure",
                        back_position,
                    ))
                }
            };
            let context = "for 'back' statement";
            let expr_position = self.token.span.start;
            // the declared return type must match exactly; a call result
            // keeps its callable type and has to pass through a variable
            let expr_type = self.parse_expr(context)?;
            self.check_type(
                &expr_type,
                &ValueType::Scalar(returns),
                expr_position,
                context,
            )?;
            self.code.emit(Opcode::ReturnValue);
            self.popped(1);
        } else {
            if self.return_type.is_some() {
                return Err(semantic_error(
                    "missing 'back' expression in function",
                    back_position,
                ));
            }
            self.code.emit(Opcode::Return);
        }
        Ok(())
    }

    /// do = "do" id "(" [ expr { "," expr } ] ")" .
    fn parse_do(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Do)?;
        let (name, name_span) = self.expect_identifier()?;
        let properties = match self.symbols.find_name(&name) {
            Some(properties) => properties.clone(),
            None => {
                return Err(semantic_error(
                    format!("unknown identifier '{}'", name),
                    name_span.start,
                ))
            }
        };
        let params = match properties.value_type {
            ValueType::Procedure { params } => params,
            _ => {
                return Err(semantic_error(
                    format!("'{}' is not a procedure", name),
                    name_span.start,
                ))
            }
        };
        self.expect(TokenKind::LParen)?;
        let argc = self.parse_arguments(&name, &params)?;
        self.expect(TokenKind::RParen)?;
        self.code.emit(Opcode::Call(name));
        self.popped(argc);
        Ok(())
    }

    /// if = "if" expr ":" statements { "elif" expr ":" statements }
    ///      [ "else" ":" statements ] .
    fn parse_if(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::If)?;
        let end_label = self.code.get_label();
        let mut next_arm = self.code.get_label();

        self.parse_guard("for 'if' guard")?;
        self.emit_branch_unless_true(next_arm);
        self.expect(TokenKind::Colon)?;
        self.parse_statements()?;
        self.code.emit(Opcode::Jump(end_label));

        while self.check(&TokenKind::Elif) {
            self.advance()?;
            self.code.place_label(next_arm);
            next_arm = self.code.get_label();
            self.parse_guard("for 'elif' guard")?;
            self.emit_branch_unless_true(next_arm);
            self.expect(TokenKind::Colon)?;
            self.parse_statements()?;
            self.code.emit(Opcode::Jump(end_label));
        }

        self.code.place_label(next_arm);
        if self.check(&TokenKind::Else) {
            self.advance()?;
            self.expect(TokenKind::Colon)?;
            self.parse_statements()?;
        }
        self.code.place_label(end_label);
        Ok(())
    }

    /// while = "while" expr ":" statements .
    fn parse_while(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::While)?;
        let exit_label = self.code.get_label();
        let top_label = self.code.get_label();
        self.code.place_label(top_label);
        self.parse_guard("for 'while' guard")?;
        self.emit_branch_unless_true(exit_label);
        self.expect(TokenKind::Colon)?;
        self.parse_statements()?;
        self.code.emit(Opcode::Jump(top_label));
        self.code.place_label(exit_label);
        Ok(())
    }

    /// Parse a guard expression and require it to be plain boolean.
    fn parse_guard(&mut self, context: &str) -> Result<(), CompileError> {
        let guard_position = self.token.span.start;
        let guard_type = self.parse_expr(context)?;
        self.check_type(
            &guard_type,
            &ValueType::Scalar(Primitive::Boolean),
            guard_position,
            context,
        )
    }

    /// input = "input" id [ "[" simple "]" ] .
    fn parse_input(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Input)?;
        let (name, name_span) = self.expect_identifier()?;
        let properties = match self.symbols.find_name(&name) {
            Some(properties) => properties.clone(),
            None => {
                return Err(semantic_error(
                    format!("unknown identifier '{}'", name),
                    name_span.start,
                ))
            }
        };
        match properties.value_type {
            ValueType::Array(element) => {
                if !self.check(&TokenKind::LBracket) {
                    return Err(semantic_error(
                        format!("expected scalar variable instead of '{}'", name),
                        name_span.start,
                    ));
                }
                self.advance()?;
                self.emit_load(properties.offset);
                self.parse_index(&name)?;
                self.expect(TokenKind::RBracket)?;
                self.code.emit(Opcode::Read(element));
                self.pushed(1);
                self.code.emit(Opcode::StoreElement);
                self.popped(3);
            }
            ValueType::Scalar(element) => {
                if self.check(&TokenKind::LBracket) {
                    return Err(semantic_error(
                        format!("'{}' is not an array", name),
                        name_span.start,
                    ));
                }
                self.code.emit(Opcode::Read(element));
                self.pushed(1);
                self.emit_store(properties.offset);
            }
            _ => {
                return Err(semantic_error(
                    format!("'{}' is not a variable", name),
                    name_span.start,
                ))
            }
        }
        Ok(())
    }

    /// output = "output" ( string | expr ) { "&" ( string | expr ) } .
    fn parse_output(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Output)?;
        self.parse_output_segment()?;
        while self.check(&TokenKind::Concat) {
            self.advance()?;
            self.parse_output_segment()?;
        }
        Ok(())
    }

    /// One `&`-separated segment of an output statement.
    fn parse_output_segment(&mut self) -> Result<(), CompileError> {
        if let TokenKind::Str(contents) = &self.token.kind {
            let contents = contents.clone();
            self.advance()?;
            self.code.emit(Opcode::PrintString(contents));
            return Ok(());
        }
        if !self.token.kind.starts_expr() {
            return Err(syntax_error(
                format!("expected string or expression, but found {}", self.token.kind),
                self.token.span.start,
            ));
        }
        let segment_position = self.token.span.start;
        match self.parse_expr("")?.result() {
            ValueType::Scalar(primitive) => {
                self.code.emit(Opcode::Print(primitive));
                self.popped(1);
                Ok(())
            }
            _ => Err(semantic_error(
                "'output' is an illegal array operation",
                segment_position,
            )),
        }
    }

    /// Parse a call argument list up to, but not including, the closing
    /// parenthesis. Arity is checked before each argument parses, so the
    /// error lands on the first argument past the declared count.
    fn parse_arguments(&mut self, name: &str, params: &[ValueType]) -> Result<u32, CompileError> {
        let mut argc: usize = 0;
        if self.token.kind.starts_expr() {
            loop {
                if argc == params.len() {
                    return Err(semantic_error(
                        format!("too many arguments for call to '{}'", name),
                        self.token.span.start,
                    ));
                }
                let context = format!("for parameter {} of call to '{}'", argc + 1, name);
                let argument_position = self.token.span.start;
                let argument_type = self.parse_expr(&context)?;
                if argument_type != params[argc] {
                    return Err(incompatible_types(
                        &params[argc],
                        &argument_type,
                        &context,
                        argument_position,
                    ));
                }
                argc += 1;
                if self.check(&TokenKind::Comma) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        if argc < params.len() {
            return Err(semantic_error(
                format!("too few arguments for call to '{}'", name),
                self.token.span.start,
            ));
        }
        Ok(argc as u32)
    }

    /// Parse an array index and require it to be integer.
    ///
    /// The index's own context replaces whatever the caller was checking
    /// for, since the innermost consumer is the one being violated.
    fn parse_index(&mut self, name: &str) -> Result<(), CompileError> {
        let context = format!("for array index of '{}'", name);
        let index_position = self.token.span.start;
        let index_type = self.parse_simple(&context)?;
        self.check_type(
            &index_type,
            &ValueType::Scalar(Primitive::Integer),
            index_position,
            &context,
        )
    }

    /// expr = simple [ relop simple ] .
    fn parse_expr(&mut self, context: &str) -> Result<ValueType, CompileError> {
        let lhs = self.parse_simple(context)?;
        if !self.token.kind.is_relop() {
            return Ok(lhs);
        }
        let op = self.token.kind.clone();
        let op_position = self.token.span.start;
        self.advance()?;
        let rhs_position = self.token.span.start;
        let rhs = self.parse_simple(context)?;
        if op == TokenKind::Eq || op == TokenKind::Ne {
            // equality needs identical types, arrays and callables included
            self.check_type(&rhs, &lhs, rhs_position, context)?;
        } else {
            // ordering compares integers; a function's result is accepted
            self.check_type(
                &lhs.result(),
                &ValueType::Scalar(Primitive::Integer),
                op_position,
                context,
            )?;
            self.check_type(
                &rhs.result(),
                &ValueType::Scalar(Primitive::Integer),
                rhs_position,
                context,
            )?;
        }
        let comparison =
            comparison_for(&op).ok_or_else(|| internal_error("relational operator expected"))?;
        self.code.emit_compare(comparison);
        self.popped(1);
        Ok(ValueType::Scalar(Primitive::Boolean))
    }

    /// simple = [ "-" ] term { addop term } .
    fn parse_simple(&mut self, context: &str) -> Result<ValueType, CompileError> {
        let mut negated = false;
        let mut minus_position = SourcePosition::origin();
        if self.check(&TokenKind::Minus) {
            negated = true;
            minus_position = self.token.span.start;
            self.advance()?;
        }
        let term_position = self.token.span.start;
        let mut lhs = self.parse_term(context)?;
        if negated {
            if lhs.is_array() {
                return Err(semantic_error(
                    "'-' is an illegal array operation",
                    minus_position,
                ));
            }
            self.check_type(
                &lhs,
                &ValueType::Scalar(Primitive::Integer),
                term_position,
                context,
            )?;
            self.code.emit(Opcode::Neg);
        }
        while self.token.kind.is_addop() {
            let op = self.token.kind.clone();
            let op_position = self.token.span.start;
            if lhs.is_array() {
                return Err(semantic_error(
                    format!("{} is an illegal array operation", op),
                    op_position,
                ));
            }
            let operand = if op == TokenKind::Or {
                Primitive::Boolean
            } else {
                Primitive::Integer
            };
            self.check_type(&lhs, &ValueType::Scalar(operand), op_position, context)?;
            self.advance()?;
            let rhs_position = self.token.span.start;
            let rhs = self.parse_term(context)?;
            if rhs.is_array() {
                return Err(semantic_error(
                    format!("{} is an illegal array operation", op),
                    op_position,
                ));
            }
            self.check_type(&rhs, &ValueType::Scalar(operand), rhs_position, context)?;
            match op {
                TokenKind::Plus => self.code.emit(Opcode::Add),
                TokenKind::Minus => {
                    // subtraction is negate-then-add
                    self.code.emit(Opcode::Neg);
                    self.code.emit(Opcode::Add);
                }
                TokenKind::Or => self.code.emit(Opcode::Or),
                _ => return Err(internal_error("additive operator expected")),
            }
            self.popped(1);
            lhs = ValueType::Scalar(operand);
        }
        Ok(lhs)
    }

    /// term = factor { mulop factor } .
    fn parse_term(&mut self, context: &str) -> Result<ValueType, CompileError> {
        let mut lhs = self.parse_factor(context)?;
        while self.token.kind.is_mulop() {
            let op = self.token.kind.clone();
            let op_position = self.token.span.start;
            if lhs.is_array() {
                return Err(semantic_error(
                    format!("{} is an illegal array operation", op),
                    op_position,
                ));
            }
            let operand = if op == TokenKind::And {
                Primitive::Boolean
            } else {
                Primitive::Integer
            };
            self.check_type(&lhs, &ValueType::Scalar(operand), op_position, context)?;
            self.advance()?;
            let rhs_position = self.token.span.start;
            let rhs = self.parse_factor(context)?;
            if rhs.is_array() {
                return Err(semantic_error(
                    format!("{} is an illegal array operation", op),
                    op_position,
                ));
            }
            self.check_type(&rhs, &ValueType::Scalar(operand), rhs_position, context)?;
            match op {
                TokenKind::Multiply => self.code.emit(Opcode::Mul),
                TokenKind::Divide => self.code.emit(Opcode::Div),
                TokenKind::Mod => self.code.emit(Opcode::Rem),
                TokenKind::And => self.code.emit(Opcode::And),
                _ => return Err(internal_error("multiplicative operator expected")),
            }
            self.popped(1);
            lhs = ValueType::Scalar(operand);
        }
        Ok(lhs)
    }

    /// factor = id [ "[" simple "]" | "(" [ expr { "," expr } ] ")" ]
    ///        | num | "(" expr { "," expr } ")" | "not" factor
    ///        | "true" | "false" .
    fn parse_factor(&mut self, context: &str) -> Result<ValueType, CompileError> {
        match self.token.kind.clone() {
            TokenKind::Identifier(name) => {
                let name_span = self.token.span;
                self.advance()?;
                self.parse_factor_identifier(name, name_span, context)
            }
            TokenKind::Number(value) => {
                self.advance()?;
                self.emit_push(value);
                Ok(ValueType::Scalar(Primitive::Integer))
            }
            TokenKind::True => {
                self.advance()?;
                self.emit_push(1);
                Ok(ValueType::Scalar(Primitive::Boolean))
            }
            TokenKind::False => {
                self.advance()?;
                self.emit_push(0);
                Ok(ValueType::Scalar(Primitive::Boolean))
            }
            TokenKind::LParen => {
                self.advance()?;
                let mut value_type = self.parse_expr(context)?;
                while self.check(&TokenKind::Comma) {
                    self.advance()?;
                    // only the last expression's value survives
                    self.code.emit(Opcode::Pop);
                    self.popped(1);
                    value_type = self.parse_expr(context)?;
                }
                self.expect(TokenKind::RParen)?;
                Ok(value_type)
            }
            TokenKind::Not => {
                self.advance()?;
                let operand_position = self.token.span.start;
                let operand = self.parse_factor(context)?;
                self.check_type(
                    &operand,
                    &ValueType::Scalar(Primitive::Boolean),
                    operand_position,
                    context,
                )?;
                self.code.emit(Opcode::Not);
                Ok(ValueType::Scalar(Primitive::Boolean))
            }
            _ => Err(syntax_error(
                format!("expected factor, but found {}", self.token.kind),
                self.token.span.start,
            )),
        }
    }

    /// A factor that began with an identifier: a variable reference, an
    /// indexed array read, or a function call.
    fn parse_factor_identifier(
        &mut self,
        name: String,
        name_span: Span,
        _context: &str,
    ) -> Result<ValueType, CompileError> {
        let properties = match self.symbols.find_name(&name) {
            Some(properties) => properties.clone(),
            None => {
                return Err(semantic_error(
                    format!("unknown identifier '{}'", name),
                    name_span.start,
                ))
            }
        };

        if self.check(&TokenKind::LBracket) {
            let element = match properties.value_type {
                ValueType::Array(element) => element,
                _ => {
                    return Err(semantic_error(
                        format!("'{}' is not an array", name),
                        name_span.start,
                    ))
                }
            };
            self.advance()?;
            self.emit_load(properties.offset);
            self.parse_index(&name)?;
            self.expect(TokenKind::RBracket)?;
            self.code.emit(Opcode::LoadElement);
            self.popped(1);
            return Ok(ValueType::Scalar(element));
        }

        if self.check(&TokenKind::LParen) {
            let params = match &properties.value_type {
                ValueType::Function { params, .. } => params.clone(),
                _ => {
                    return Err(semantic_error(
                        format!("'{}' is not a function", name),
                        name_span.start,
                    ))
                }
            };
            self.advance()?;
            let argc = self.parse_arguments(&name, &params)?;
            self.expect(TokenKind::RParen)?;
            self.code.emit(Opcode::Call(name));
            self.popped(argc);
            self.pushed(1);
            // the call keeps its callable type; consumers that accept a
            // result unwrap it with ValueType::result
            return Ok(properties.value_type);
        }

        if properties.value_type.is_callable() {
            return Err(semantic_error(
                format!("'{}' is not a variable", name),
                name_span.start,
            ));
        }
        self.emit_load(properties.offset);
        Ok(properties.value_type)
    }

    // Lookahead and emission helpers

    fn advance(&mut self) -> Result<(), CompileError> {
        self.token = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.token.kind == *kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), CompileError> {
        if self.token.kind == kind {
            self.advance()
        } else {
            Err(expected_token(&kind, &self.token))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), CompileError> {
        match &self.token.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.token.span;
                self.advance()?;
                Ok((name, span))
            }
            _ => Err(expected_token(&TokenKind::Identifier(String::new()), &self.token)),
        }
    }

    fn check_type(
        &self,
        found: &ValueType,
        expected: &ValueType,
        position: SourcePosition,
        context: &str,
    ) -> Result<(), CompileError> {
        if found == expected {
            Ok(())
        } else {
            Err(incompatible_types(expected, found, context, position))
        }
    }

    /// Branch to `target` unless the boolean on top of the stack is true.
    fn emit_branch_unless_true(&mut self, target: Label) {
        self.emit_push(1);
        self.code.emit(Opcode::Branch(Comparison::Ne, target));
        self.popped(2);
    }

    fn emit_push(&mut self, value: i32) {
        self.code.emit(Opcode::PushConst(value));
        self.pushed(1);
    }

    fn emit_load(&mut self, offset: u16) {
        self.code.emit(Opcode::LoadLocal(offset));
        self.pushed(1);
    }

    fn emit_store(&mut self, offset: u16) {
        self.code.emit(Opcode::StoreLocal(offset));
        self.popped(1);
    }

    fn pushed(&mut self, slots: u32) {
        self.stack_depth += slots;
        if self.stack_depth > self.max_stack_depth {
            self.max_stack_depth = self.stack_depth;
        }
    }

    fn popped(&mut self, slots: u32) {
        self.stack_depth = self.stack_depth.saturating_sub(slots);
    }
}
