//! Recursive-descent parser for GML
//!
//! Builds a lossless rowan CST from the lexer's token stream. Statements are
//! parsed by one method per construct; expressions use precedence climbing
//! over the binary operator tiers, with `?:` above them and unary/postfix
//! forms below.
//!
//! Trivia tokens are never looked at by grammar rules. They are flushed into
//! the tree right before the next significant token, so the tree text always
//! equals the source.
//!
//! The parser does not recover: the first error aborts the parse.

use super::lexer::{CstSpan, LineIndex};
use super::{CstBuilder, CstToken, GmlSyntaxKind, GmlSyntaxNode};
use crate::error::GmlError;
use tracing::debug;

/// A syntax error with the grammar context that was active when it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Span of the offending token
    pub span: CstSpan,
    pub expected: Vec<&'static str>,
    pub found: String,
    pub context: &'static str,
}

/// Parse tree plus the token stream it was built from
///
/// Token indices stored in the AST refer to `tokens`.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub root: GmlSyntaxNode,
    pub tokens: Vec<CstToken>,
}

/// Lex and parse GML source
///
/// # Example
///
/// ```rust,ignore
/// use gml_core::cst::parse_gml;
///
/// let parsed = parse_gml("x = 1; // one\n").unwrap();
/// assert_eq!(parsed.root.text().to_string(), "x = 1; // one\n");
/// ```
pub fn parse_gml(source: &str) -> Result<ParsedSource, GmlError> {
    let line_index = LineIndex::new(source);

    let tokens = super::lex(source).map_err(|err| {
        let (line, column) = line_index.line_col(source, err.span.start);
        GmlError::lex(err.message, err.span.start, line, column)
    })?;

    let root = parse_tokens(&tokens).map_err(|err| {
        let (line, column) = line_index.line_col(source, err.span.start);
        GmlError::Parse {
            message: err.message,
            line,
            column,
            expected: err.expected.iter().map(|s| s.to_string()).collect(),
            found: err.found,
            context: err.context.to_string(),
        }
    })?;

    debug!(tokens = tokens.len(), "parsed source");
    Ok(ParsedSource { root, tokens })
}

/// Parse a token stream into a CST
///
/// The stream must end with an `Eof` token, as produced by the lexer.
pub fn parse_tokens(tokens: &[CstToken]) -> Result<GmlSyntaxNode, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()?;
    Ok(parser.finish())
}

/// What an expression parse produced, enough to validate statement forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExprShape {
    kind: GmlSyntaxKind,
    /// Last chain operator for `LValueExpr`
    last_op: Option<GmlSyntaxKind>,
}

impl ExprShape {
    fn node(kind: GmlSyntaxKind) -> Self {
        Self {
            kind,
            last_op: None,
        }
    }

    /// Identifier or a chain ending in `.name` / `[index]`
    fn is_assignable(self) -> bool {
        match self.kind {
            GmlSyntaxKind::IdentifierExpr => true,
            GmlSyntaxKind::LValueExpr => matches!(
                self.last_op,
                Some(GmlSyntaxKind::MemberDotOp | GmlSyntaxKind::MemberIndexOp)
            ),
            _ => false,
        }
    }

    fn is_statement_expression(self) -> bool {
        match self.kind {
            GmlSyntaxKind::LValueExpr => self.last_op == Some(GmlSyntaxKind::CallOp),
            GmlSyntaxKind::NewExpr
            | GmlSyntaxKind::PreIncDecExpr
            | GmlSyntaxKind::PostIncDecExpr => true,
            _ => false,
        }
    }

    fn can_start_chain(self) -> bool {
        matches!(
            self.kind,
            GmlSyntaxKind::IdentifierExpr | GmlSyntaxKind::ParenExpr | GmlSyntaxKind::NewExpr
        )
    }
}

/// Binding power of a binary operator, higher binds tighter
fn binary_precedence(kind: GmlSyntaxKind) -> Option<u8> {
    use GmlSyntaxKind::*;
    let prec = match kind {
        QuestionQuestion => 1,
        PipePipe | OrKw => 2,
        CaretCaret | XorKw => 3,
        AmpAmp | AndKw => 4,
        Pipe => 5,
        Caret => 6,
        Amp => 7,
        EqEq | BangEq | LtGt | Eq => 8,
        Lt | LtEq | Gt | GtEq => 9,
        Shl | Shr => 10,
        Plus | Minus => 11,
        Star | Slash | Percent | ModKw | DivKw => 12,
        _ => return None,
    };
    Some(prec)
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    /// Indices of default-channel tokens; the last one is `Eof`
    significant: Vec<usize>,
    cursor: usize,
    /// Tokens before this index are already in the tree
    emitted: usize,
    builder: CstBuilder,
    context: Vec<&'static str>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            significant,
            cursor: 0,
            emitted: 0,
            builder: CstBuilder::new(),
            context: Vec::new(),
        }
    }

    fn finish(self) -> GmlSyntaxNode {
        GmlSyntaxNode::new_root(self.builder.finish())
    }

    // ==================
    // Statements
    // ==================

    fn parse_program(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::Program);
        self.builder.start_node(GmlSyntaxKind::StatementList);
        while !self.at(GmlSyntaxKind::Eof) {
            self.parse_statement()?;
        }
        self.builder.finish_node();
        // Flushes trailing trivia and the EOF token itself
        self.bump();
        self.builder.finish_node();
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<(), ParseError> {
        use GmlSyntaxKind::*;
        match self.current() {
            LBrace | BeginKw => self.parse_block(),
            Semicolon => {
                self.builder.start_node(EmptyStatement);
                self.bump();
                self.builder.finish_node();
                Ok(())
            }
            IfKw => self.parse_if(),
            DoKw => self.parse_do(),
            WhileKw => self.parse_clause_statement(WhileStatement, "while condition"),
            RepeatKw => self.parse_clause_statement(RepeatStatement, "repeat count"),
            WithKw => self.parse_clause_statement(WithStatement, "with target"),
            ForKw => self.parse_for(),
            SwitchKw => self.parse_switch(),
            BreakKw => self.parse_keyword_statement(BreakStatement),
            ContinueKw => self.parse_keyword_statement(ContinueStatement),
            ExitKw => self.parse_keyword_statement(ExitStatement),
            ReturnKw => self.parse_return(),
            ThrowKw => self.parse_keyword_expression(ThrowStatement, "throw statement"),
            DeleteKw => self.parse_keyword_expression(DeleteStatement, "delete statement"),
            TryKw => self.parse_try(),
            VarKw | StaticKw => {
                self.parse_variable_declarations()?;
                self.eat(Semicolon);
                self.builder.finish_node();
                Ok(())
            }
            GlobalvarKw => self.parse_globalvar(),
            FunctionKw if self.nth(1) == Ident => {
                self.parse_function(FunctionDeclaration).map(|_| ())
            }
            EnumKw => self.parse_enum(),
            MacroDirective => self.parse_directive(MacroStatement),
            RegionDirective => self.parse_directive(RegionStatement),
            EndRegionDirective => self.parse_directive(EndRegionStatement),
            DefineDirective => self.parse_directive(DefineStatement),
            _ => {
                self.parse_simple_statement()?;
                self.eat(Semicolon);
                self.builder.finish_node();
                Ok(())
            }
        }
    }

    /// Block: `{ statements }` or `begin statements end`
    fn parse_block(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::Block);
        let closing = if self.at(GmlSyntaxKind::BeginKw) {
            GmlSyntaxKind::EndKw
        } else {
            GmlSyntaxKind::RBrace
        };
        self.expect_any(&[GmlSyntaxKind::LBrace, GmlSyntaxKind::BeginKw])?;
        self.push_context("block");
        self.builder.start_node(GmlSyntaxKind::StatementList);
        while !self.at(closing) && !self.at(GmlSyntaxKind::Eof) {
            self.parse_statement()?;
        }
        self.builder.finish_node();
        self.expect(closing)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(())
    }

    fn parse_if(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::IfStatement);
        self.bump();
        self.with_context("if condition", |p| p.parse_expression())?;
        self.eat(GmlSyntaxKind::ThenKw);
        self.with_context("if body", |p| p.parse_statement())?;
        if self.at(GmlSyntaxKind::ElseKw) {
            self.builder.start_node(GmlSyntaxKind::ElseClause);
            self.bump();
            self.with_context("else body", |p| p.parse_statement())?;
            self.builder.finish_node();
        }
        self.builder.finish_node();
        Ok(())
    }

    /// `while`, `repeat` and `with`: keyword, expression, body
    fn parse_clause_statement(
        &mut self,
        kind: GmlSyntaxKind,
        context: &'static str,
    ) -> Result<(), ParseError> {
        self.builder.start_node(kind);
        self.bump();
        self.with_context(context, |p| p.parse_expression())?;
        self.parse_statement()?;
        self.builder.finish_node();
        Ok(())
    }

    fn parse_do(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::DoStatement);
        self.bump();
        self.with_context("do body", |p| p.parse_statement())?;
        self.with_context("do statement", |p| p.expect(GmlSyntaxKind::UntilKw))?;
        self.with_context("until condition", |p| p.parse_expression())?;
        self.eat(GmlSyntaxKind::Semicolon);
        self.builder.finish_node();
        Ok(())
    }

    fn parse_for(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::ForStatement);
        self.bump();
        self.push_context("for header");
        self.expect(GmlSyntaxKind::LParen)?;

        self.builder.start_node(GmlSyntaxKind::ForInit);
        if self.at(GmlSyntaxKind::VarKw) {
            self.parse_variable_declarations()?;
            self.builder.finish_node();
        } else if !self.at(GmlSyntaxKind::Semicolon) {
            self.parse_simple_statement()?;
            self.builder.finish_node();
        }
        self.builder.finish_node();
        self.expect(GmlSyntaxKind::Semicolon)?;

        self.builder.start_node(GmlSyntaxKind::ForTest);
        if !self.at(GmlSyntaxKind::Semicolon) {
            self.parse_expression()?;
        }
        self.builder.finish_node();
        self.expect(GmlSyntaxKind::Semicolon)?;

        self.builder.start_node(GmlSyntaxKind::ForUpdate);
        if !self.at(GmlSyntaxKind::RParen) {
            self.parse_simple_statement()?;
            self.builder.finish_node();
        }
        self.builder.finish_node();
        self.expect(GmlSyntaxKind::RParen)?;
        self.pop_context();

        self.with_context("for body", |p| p.parse_statement())?;
        self.builder.finish_node();
        Ok(())
    }

    fn parse_switch(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::SwitchStatement);
        self.bump();
        self.with_context("switch discriminant", |p| p.parse_expression())?;

        self.push_context("switch body");
        self.builder.start_node(GmlSyntaxKind::CaseBlock);
        self.expect(GmlSyntaxKind::LBrace)?;
        loop {
            let clause = match self.current() {
                GmlSyntaxKind::CaseKw => GmlSyntaxKind::CaseClause,
                GmlSyntaxKind::DefaultKw => GmlSyntaxKind::DefaultClause,
                _ => break,
            };
            self.builder.start_node(clause);
            self.bump();
            if clause == GmlSyntaxKind::CaseClause {
                self.parse_expression()?;
            }
            self.expect(GmlSyntaxKind::Colon)?;
            self.builder.start_node(GmlSyntaxKind::StatementList);
            while !matches!(
                self.current(),
                GmlSyntaxKind::CaseKw
                    | GmlSyntaxKind::DefaultKw
                    | GmlSyntaxKind::RBrace
                    | GmlSyntaxKind::Eof
            ) {
                self.parse_statement()?;
            }
            self.builder.finish_node();
            self.builder.finish_node();
        }
        self.expect(GmlSyntaxKind::RBrace)?;
        self.builder.finish_node();
        self.pop_context();

        self.builder.finish_node();
        Ok(())
    }

    /// `break`, `continue`, `exit`
    fn parse_keyword_statement(&mut self, kind: GmlSyntaxKind) -> Result<(), ParseError> {
        self.builder.start_node(kind);
        self.bump();
        self.eat(GmlSyntaxKind::Semicolon);
        self.builder.finish_node();
        Ok(())
    }

    /// `throw expr` and `delete expr`
    fn parse_keyword_expression(
        &mut self,
        kind: GmlSyntaxKind,
        context: &'static str,
    ) -> Result<(), ParseError> {
        self.builder.start_node(kind);
        self.bump();
        self.with_context(context, |p| p.parse_expression())?;
        self.eat(GmlSyntaxKind::Semicolon);
        self.builder.finish_node();
        Ok(())
    }

    fn parse_return(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::ReturnStatement);
        self.bump();
        if !matches!(
            self.current(),
            GmlSyntaxKind::Semicolon
                | GmlSyntaxKind::RBrace
                | GmlSyntaxKind::EndKw
                | GmlSyntaxKind::CaseKw
                | GmlSyntaxKind::DefaultKw
                | GmlSyntaxKind::Eof
        ) {
            self.with_context("return statement", |p| p.parse_expression())?;
        }
        self.eat(GmlSyntaxKind::Semicolon);
        self.builder.finish_node();
        Ok(())
    }

    fn parse_try(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::TryStatement);
        self.bump();
        self.with_context("try statement", |p| p.parse_block())?;

        if self.at(GmlSyntaxKind::CatchKw) {
            self.builder.start_node(GmlSyntaxKind::CatchClause);
            self.bump();
            self.push_context("catch clause");
            if self.eat(GmlSyntaxKind::LParen) {
                self.expect(GmlSyntaxKind::Ident)?;
                self.expect(GmlSyntaxKind::RParen)?;
            }
            self.parse_block()?;
            self.pop_context();
            self.builder.finish_node();
        }

        if self.at(GmlSyntaxKind::FinallyKw) {
            self.builder.start_node(GmlSyntaxKind::FinallyClause);
            self.bump();
            self.with_context("finally clause", |p| p.parse_block())?;
            self.builder.finish_node();
        }

        self.builder.finish_node();
        Ok(())
    }

    /// `var a = 1, b` / `static c = 2`
    ///
    /// Leaves the `VariableDeclarationList` node open so statement callers
    /// can take the trailing `;` into it.
    fn parse_variable_declarations(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::VariableDeclarationList);
        self.bump();
        self.push_context("variable declaration");
        loop {
            self.builder.start_node(GmlSyntaxKind::VariableDeclaration);
            self.expect(GmlSyntaxKind::Ident)?;
            if self.at(GmlSyntaxKind::Eq) || self.at(GmlSyntaxKind::ColonEq) {
                self.bump();
                self.parse_expression()?;
            }
            self.builder.finish_node();
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.pop_context();
        Ok(())
    }

    fn parse_globalvar(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::GlobalVarStatement);
        self.bump();
        self.push_context("globalvar statement");
        loop {
            self.expect(GmlSyntaxKind::Ident)?;
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.pop_context();
        self.eat(GmlSyntaxKind::Semicolon);
        self.builder.finish_node();
        Ok(())
    }

    /// Named declaration or anonymous function expression
    ///
    /// `function name(params) [: Parent(args)] [constructor] { ... }`
    fn parse_function(&mut self, kind: GmlSyntaxKind) -> Result<ExprShape, ParseError> {
        self.builder.start_node(kind);
        self.bump();
        self.push_context("function declaration");
        self.eat(GmlSyntaxKind::Ident);

        self.parse_parameter_list()?;

        if self.at(GmlSyntaxKind::Colon) {
            self.builder.start_node(GmlSyntaxKind::InheritanceClause);
            self.bump();
            self.expect(GmlSyntaxKind::Ident)?;
            self.parse_arguments()?;
            self.builder.finish_node();
        }
        self.eat(GmlSyntaxKind::ConstructorKw);

        self.parse_block()?;
        self.pop_context();
        self.builder.finish_node();
        Ok(ExprShape::node(kind))
    }

    fn parse_parameter_list(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::ParameterList);
        self.expect(GmlSyntaxKind::LParen)?;
        while !self.at(GmlSyntaxKind::RParen) {
            self.builder.start_node(GmlSyntaxKind::Parameter);
            self.expect(GmlSyntaxKind::Ident)?;
            if self.eat(GmlSyntaxKind::Eq) {
                self.parse_expression()?;
            }
            self.builder.finish_node();
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.expect(GmlSyntaxKind::RParen)?;
        self.builder.finish_node();
        Ok(())
    }

    fn parse_enum(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::EnumDeclaration);
        self.bump();
        self.push_context("enum declaration");
        self.expect(GmlSyntaxKind::Ident)?;
        self.expect(GmlSyntaxKind::LBrace)?;
        while !self.at(GmlSyntaxKind::RBrace) {
            self.builder.start_node(GmlSyntaxKind::EnumMember);
            self.expect(GmlSyntaxKind::Ident)?;
            if self.eat(GmlSyntaxKind::Eq) {
                self.parse_expression()?;
            }
            self.builder.finish_node();
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.expect(GmlSyntaxKind::RBrace)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(())
    }

    fn parse_directive(&mut self, kind: GmlSyntaxKind) -> Result<(), ParseError> {
        self.builder.start_node(kind);
        self.bump();
        self.builder.finish_node();
        Ok(())
    }

    /// Assignment or expression statement, without its trailing `;`
    ///
    /// Leaves the statement node open so callers decide whether the `;`
    /// belongs to it (statements) or not (`for` headers).
    fn parse_simple_statement(&mut self) -> Result<(), ParseError> {
        let checkpoint = self.builder.checkpoint();
        let start = self.current_token_index();
        let shape = self.with_context("statement", |p| p.parse_unary())?;

        if self.current().is_assignment_op() {
            if !shape.is_assignable() {
                return Err(self.error_at(start, "invalid assignment target", &["identifier"]));
            }
            self.builder
                .start_node_at(checkpoint, GmlSyntaxKind::AssignmentStatement);
            self.bump();
            self.with_context("assignment", |p| p.parse_expression())?;
            return Ok(());
        }

        if !shape.is_statement_expression() {
            return Err(self.error(
                "expected assignment or call",
                &["assignment operator", "'('"],
            ));
        }
        self.builder
            .start_node_at(checkpoint, GmlSyntaxKind::ExpressionStatement);
        Ok(())
    }

    // ==================
    // Expressions
    // ==================

    fn parse_expression(&mut self) -> Result<ExprShape, ParseError> {
        self.parse_ternary()
    }

    /// `test ? consequent : alternate`, right-associative
    fn parse_ternary(&mut self) -> Result<ExprShape, ParseError> {
        let checkpoint = self.builder.checkpoint();
        let shape = self.parse_binary(1)?;
        if !self.at(GmlSyntaxKind::Question) {
            return Ok(shape);
        }
        self.builder
            .start_node_at(checkpoint, GmlSyntaxKind::TernaryExpr);
        self.bump();
        self.parse_ternary()?;
        self.expect(GmlSyntaxKind::Colon)?;
        self.parse_ternary()?;
        self.builder.finish_node();
        Ok(ExprShape::node(GmlSyntaxKind::TernaryExpr))
    }

    /// Precedence climbing over the binary tiers, all left-associative
    fn parse_binary(&mut self, min_precedence: u8) -> Result<ExprShape, ParseError> {
        let checkpoint = self.builder.checkpoint();
        let mut shape = self.parse_unary()?;
        while let Some(precedence) = binary_precedence(self.current()) {
            if precedence < min_precedence {
                break;
            }
            self.builder
                .start_node_at(checkpoint, GmlSyntaxKind::BinaryExpr);
            self.bump();
            self.parse_binary(precedence + 1)?;
            self.builder.finish_node();
            shape = ExprShape::node(GmlSyntaxKind::BinaryExpr);
        }
        Ok(shape)
    }

    fn parse_unary(&mut self) -> Result<ExprShape, ParseError> {
        use GmlSyntaxKind::*;
        match self.current() {
            Bang | NotKw | Tilde | Minus | Plus => {
                self.builder.start_node(UnaryExpr);
                self.bump();
                self.parse_unary()?;
                self.builder.finish_node();
                Ok(ExprShape::node(UnaryExpr))
            }
            PlusPlus | MinusMinus => {
                self.builder.start_node(PreIncDecExpr);
                self.bump();
                self.parse_unary()?;
                self.builder.finish_node();
                Ok(ExprShape::node(PreIncDecExpr))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Chain operators and post-increment on top of a primary expression
    fn parse_postfix(&mut self) -> Result<ExprShape, ParseError> {
        let checkpoint = self.builder.checkpoint();
        let mut shape = self.parse_primary()?;

        if shape.can_start_chain() && self.at_chain_operator() {
            self.builder
                .start_node_at(checkpoint, GmlSyntaxKind::LValueExpr);
            let mut last_op = None;
            while self.at_chain_operator() {
                last_op = Some(self.parse_chain_operator()?);
            }
            self.builder.finish_node();
            shape = ExprShape {
                kind: GmlSyntaxKind::LValueExpr,
                last_op,
            };
        }

        if shape.is_assignable()
            && (self.at(GmlSyntaxKind::PlusPlus) || self.at(GmlSyntaxKind::MinusMinus))
        {
            self.builder
                .start_node_at(checkpoint, GmlSyntaxKind::PostIncDecExpr);
            self.bump();
            self.builder.finish_node();
            shape = ExprShape::node(GmlSyntaxKind::PostIncDecExpr);
        }

        Ok(shape)
    }

    fn at_chain_operator(&self) -> bool {
        let kind = self.current();
        kind == GmlSyntaxKind::Dot || kind == GmlSyntaxKind::LParen || kind.is_index_open()
    }

    fn parse_chain_operator(&mut self) -> Result<GmlSyntaxKind, ParseError> {
        let kind = self.current();
        if kind == GmlSyntaxKind::Dot {
            self.builder.start_node(GmlSyntaxKind::MemberDotOp);
            self.bump();
            self.with_context("member access", |p| p.expect(GmlSyntaxKind::Ident))?;
            self.builder.finish_node();
            return Ok(GmlSyntaxKind::MemberDotOp);
        }

        if kind == GmlSyntaxKind::LParen {
            self.builder.start_node(GmlSyntaxKind::CallOp);
            self.parse_arguments()?;
            self.builder.finish_node();
            return Ok(GmlSyntaxKind::CallOp);
        }

        self.builder.start_node(GmlSyntaxKind::MemberIndexOp);
        self.bump();
        self.push_context("index access");
        self.parse_expression()?;
        while self.eat(GmlSyntaxKind::Comma) {
            self.parse_expression()?;
        }
        self.expect(GmlSyntaxKind::RBracket)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(GmlSyntaxKind::MemberIndexOp)
    }

    fn parse_arguments(&mut self) -> Result<(), ParseError> {
        self.builder.start_node(GmlSyntaxKind::Arguments);
        self.push_context("argument list");
        self.expect(GmlSyntaxKind::LParen)?;
        while !self.at(GmlSyntaxKind::RParen) {
            self.parse_expression()?;
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.expect(GmlSyntaxKind::RParen)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<ExprShape, ParseError> {
        use GmlSyntaxKind::*;
        match self.current() {
            NumberLiteral | HexLiteral | BinaryLiteral | StringLiteral | VerbatimStringLiteral
            | TrueKw | FalseKw | UndefinedKw | NooneKw => {
                self.builder.start_node(LiteralExpr);
                self.bump();
                self.builder.finish_node();
                Ok(ExprShape::node(LiteralExpr))
            }
            Ident => {
                self.builder.start_node(IdentifierExpr);
                self.bump();
                self.builder.finish_node();
                Ok(ExprShape::node(IdentifierExpr))
            }
            LParen => {
                self.builder.start_node(ParenExpr);
                self.bump();
                self.push_context("parenthesized expression");
                self.parse_expression()?;
                self.expect(RParen)?;
                self.pop_context();
                self.builder.finish_node();
                Ok(ExprShape::node(ParenExpr))
            }
            LBracket => self.parse_array_literal(),
            LBrace => self.parse_struct_literal(),
            TemplateStart => self.parse_template_string(),
            FunctionKw => self.parse_function(FunctionExpr),
            NewKw => {
                self.builder.start_node(NewExpr);
                self.bump();
                self.push_context("new expression");
                self.builder.start_node(IdentifierExpr);
                self.expect(Ident)?;
                self.builder.finish_node();
                if self.at(LParen) {
                    self.parse_arguments()?;
                }
                self.pop_context();
                self.builder.finish_node();
                Ok(ExprShape::node(NewExpr))
            }
            _ => Err(self.error("expected expression", &["expression"])),
        }
    }

    fn parse_array_literal(&mut self) -> Result<ExprShape, ParseError> {
        self.builder.start_node(GmlSyntaxKind::ArrayLiteral);
        self.bump();
        self.push_context("array literal");
        while !self.at(GmlSyntaxKind::RBracket) {
            self.parse_expression()?;
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.expect(GmlSyntaxKind::RBracket)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(ExprShape::node(GmlSyntaxKind::ArrayLiteral))
    }

    fn parse_struct_literal(&mut self) -> Result<ExprShape, ParseError> {
        self.builder.start_node(GmlSyntaxKind::StructLiteral);
        self.bump();
        self.push_context("struct literal");
        while !self.at(GmlSyntaxKind::RBrace) {
            self.builder.start_node(GmlSyntaxKind::StructProperty);
            let key = self.current();
            if key == GmlSyntaxKind::Ident || key == GmlSyntaxKind::StringLiteral || key.is_keyword()
            {
                self.bump();
            } else {
                return Err(self.error("expected property name", &["identifier", "string"]));
            }
            if self.eat(GmlSyntaxKind::Colon) {
                self.parse_expression()?;
            }
            self.builder.finish_node();
            if !self.eat(GmlSyntaxKind::Comma) {
                break;
            }
        }
        self.expect(GmlSyntaxKind::RBrace)?;
        self.pop_context();
        self.builder.finish_node();
        Ok(ExprShape::node(GmlSyntaxKind::StructLiteral))
    }

    fn parse_template_string(&mut self) -> Result<ExprShape, ParseError> {
        self.builder.start_node(GmlSyntaxKind::TemplateString);
        self.bump();
        self.push_context("template string");
        loop {
            match self.current() {
                GmlSyntaxKind::TemplateText => self.bump(),
                GmlSyntaxKind::TemplateSpliceStart => {
                    self.builder.start_node(GmlSyntaxKind::TemplateSplice);
                    self.bump();
                    self.parse_expression()?;
                    self.expect(GmlSyntaxKind::TemplateSpliceEnd)?;
                    self.builder.finish_node();
                }
                GmlSyntaxKind::TemplateEnd => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("unterminated template string", &["'\"'"])),
            }
        }
        self.pop_context();
        self.builder.finish_node();
        Ok(ExprShape::node(GmlSyntaxKind::TemplateString))
    }

    // ==================
    // Token helpers
    // ==================

    fn current_token_index(&self) -> usize {
        self.significant[self.cursor]
    }

    fn current(&self) -> GmlSyntaxKind {
        self.tokens[self.current_token_index()].kind
    }

    /// Kind of the n-th significant token from the cursor
    fn nth(&self, n: usize) -> GmlSyntaxKind {
        self.significant
            .get(self.cursor + n)
            .map_or(GmlSyntaxKind::Eof, |&i| self.tokens[i].kind)
    }

    fn at(&self, kind: GmlSyntaxKind) -> bool {
        self.current() == kind
    }

    /// Add pending trivia and the current token to the tree, then advance
    fn bump(&mut self) {
        let index = self.current_token_index();
        for token in &self.tokens[self.emitted..=index] {
            self.builder.token(token.kind, &token.text);
        }
        self.emitted = index + 1;
        if self.cursor + 1 < self.significant.len() {
            self.cursor += 1;
        }
    }

    fn eat(&mut self, kind: GmlSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: GmlSyntaxKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", kind.describe()), &[kind.describe()]))
        }
    }

    fn expect_any(&mut self, kinds: &[GmlSyntaxKind]) -> Result<(), ParseError> {
        if kinds.contains(&self.current()) {
            self.bump();
            return Ok(());
        }
        let expected: Vec<&'static str> = kinds.iter().map(|k| k.describe()).collect();
        Err(self.error(&format!("expected {}", expected.join(" or ")), &expected))
    }

    fn push_context(&mut self, context: &'static str) {
        self.context.push(context);
    }

    fn pop_context(&mut self) {
        self.context.pop();
    }

    fn with_context<T>(
        &mut self,
        context: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.push_context(context);
        let result = f(self)?;
        self.pop_context();
        Ok(result)
    }

    fn error(&self, message: &str, expected: &[&'static str]) -> ParseError {
        self.error_at(self.current_token_index(), message, expected)
    }

    fn error_at(&self, index: usize, message: &str, expected: &[&'static str]) -> ParseError {
        let token = &self.tokens[index];
        let found = if token.kind == GmlSyntaxKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", token.text)
        };
        let context = self.context.last().copied().unwrap_or("program");
        ParseError {
            message: format!("{message}, found {found} in {context}"),
            span: token.span.clone(),
            expected: expected.to_vec(),
            found,
            context,
        }
    }
}
