//! CST → AST reduction
//!
//! One deterministic rule per CST node kind. Parentheses, statement wrappers
//! and separators disappear; optional children become `Empty` nodes and
//! empty statements are filtered out of statement lists. Every AST node keeps
//! the token-index span of the CST node it came from.

use super::ast::{
    Accessor, AssignmentOperator, Ast, BinaryOperator, DeclarationKind, Literal, Node, NodeId,
    NodeKind, TemplatePart, TokenSpan, UnaryOperator, UpdateOperator,
};
use super::{CstToken, GmlSyntaxKind, GmlSyntaxNode, GmlSyntaxToken};
use crate::error::GmlError;
use crate::result::Result;
use tracing::debug;

/// Reduce a parsed program to its AST
///
/// `tokens` must be the token stream the tree was built from; spans in the
/// result index into it.
pub fn build_ast(root: &GmlSyntaxNode, tokens: &[CstToken]) -> Result<Ast> {
    let mut builder = AstBuilder { tokens, next_id: 0 };
    let root = builder.program(root)?;
    debug!(nodes = builder.next_id, "built AST");
    Ok(Ast {
        root,
        node_count: builder.next_id,
    })
}

struct AstBuilder<'a> {
    tokens: &'a [CstToken],
    next_id: NodeId,
}

impl AstBuilder<'_> {
    fn alloc(&mut self, span: TokenSpan, kind: NodeKind) -> Node {
        let id = self.next_id;
        self.next_id += 1;
        Node::new(id, span, kind)
    }

    fn boxed(&mut self, span: TokenSpan, kind: NodeKind) -> Box<Node> {
        Box::new(self.alloc(span, kind))
    }

    fn empty(&mut self, at: usize) -> Box<Node> {
        self.boxed(TokenSpan::empty(at), NodeKind::Empty)
    }

    fn list(&mut self, span: TokenSpan, items: Vec<Node>) -> Box<Node> {
        self.boxed(span, NodeKind::NodeList(items))
    }

    // ==================
    // Statements
    // ==================

    fn program(&mut self, root: &GmlSyntaxNode) -> Result<Node> {
        if root.kind() != GmlSyntaxKind::Program {
            return Err(GmlError::unknown_node(root.kind().to_string(), "program root"));
        }
        let span = TokenSpan::new(0, self.tokens.len());
        let statements = required(child_node(root, GmlSyntaxKind::StatementList), root)?;
        let items = self.statement_list(&statements)?;
        let body = self.list(span, items);
        Ok(self.alloc(span, NodeKind::Program { body }))
    }

    fn statement_list(&mut self, list: &GmlSyntaxNode) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        for child in list.children() {
            let statement = self.statement(&child)?;
            if !statement.is_empty() {
                items.push(statement);
            }
        }
        Ok(items)
    }

    fn statement(&mut self, node: &GmlSyntaxNode) -> Result<Node> {
        use GmlSyntaxKind as K;
        let span = self.span(node);
        let kind = match node.kind() {
            K::Block => NodeKind::Block {
                body: self.block_body(node)?,
            },
            K::EmptyStatement => NodeKind::Empty,
            K::IfStatement => {
                let children = child_nodes(node);
                let test = self.expression_at(&children, 0, node)?;
                let consequent = self.statement_at(&children, 1, node)?;
                let alternate = match children.get(2) {
                    Some(clause) if clause.kind() == K::ElseClause => {
                        let body = required(clause.first_child(), clause)?;
                        Box::new(self.statement(&body)?)
                    }
                    _ => self.empty(span.end),
                };
                NodeKind::IfStatement {
                    test,
                    consequent,
                    alternate,
                }
            }
            K::DoStatement => {
                let children = child_nodes(node);
                NodeKind::DoStatement {
                    body: self.statement_at(&children, 0, node)?,
                    test: self.expression_at(&children, 1, node)?,
                }
            }
            K::WhileStatement => {
                let children = child_nodes(node);
                NodeKind::WhileStatement {
                    test: self.expression_at(&children, 0, node)?,
                    body: self.statement_at(&children, 1, node)?,
                }
            }
            K::RepeatStatement => {
                let children = child_nodes(node);
                NodeKind::RepeatStatement {
                    count: self.expression_at(&children, 0, node)?,
                    body: self.statement_at(&children, 1, node)?,
                }
            }
            K::WithStatement => {
                let children = child_nodes(node);
                NodeKind::WithStatement {
                    object: self.expression_at(&children, 0, node)?,
                    body: self.statement_at(&children, 1, node)?,
                }
            }
            K::ForStatement => self.for_statement(node)?,
            K::SwitchStatement => self.switch_statement(node)?,
            K::ContinueStatement => NodeKind::ContinueStatement,
            K::BreakStatement => NodeKind::BreakStatement,
            K::ExitStatement => NodeKind::ExitStatement,
            K::ReturnStatement => NodeKind::ReturnStatement {
                argument: self.optional_expression(node, span.end)?,
            },
            K::ThrowStatement => NodeKind::ThrowStatement {
                argument: self.expression_at(&child_nodes(node), 0, node)?,
            },
            K::DeleteStatement => NodeKind::DeleteStatement {
                argument: self.expression_at(&child_nodes(node), 0, node)?,
            },
            K::TryStatement => self.try_statement(node, span)?,
            K::VariableDeclarationList => self.variable_declarations(node)?,
            K::GlobalVarStatement => {
                let names: Vec<Node> = significant_tokens(node)
                    .filter(|t| t.kind() == K::Ident)
                    .map(|t| self.identifier(&t))
                    .collect();
                let list_span = cover_all(&names).unwrap_or(TokenSpan::empty(span.end));
                NodeKind::GlobalVarStatement {
                    names: self.list(list_span, names),
                }
            }
            K::FunctionDeclaration => self.function(node)?,
            K::EnumDeclaration => self.enum_declaration(node, span)?,
            K::MacroStatement => NodeKind::MacroStatement {
                text: directive_text(node),
            },
            K::RegionStatement | K::EndRegionStatement => NodeKind::RegionStatement {
                text: directive_text(node),
            },
            K::DefineStatement => NodeKind::DefineStatement {
                text: directive_text(node),
            },
            K::AssignmentStatement => {
                let children = child_nodes(node);
                let operator = significant_tokens(node)
                    .find(|t| t.kind().is_assignment_op())
                    .map(|t| assignment_operator(t.kind()))
                    .ok_or_else(|| GmlError::unknown_node("<assignment operator>", "assignment"))?;
                NodeKind::AssignmentExpression {
                    operator,
                    left: self.expression_at(&children, 0, node)?,
                    right: self.expression_at(&children, 1, node)?,
                }
            }
            K::ExpressionStatement => {
                // The statement adopts the expression; its span grows to the `;`
                let expression = required(node.first_child(), node)?;
                let mut inner = self.expression(&expression)?;
                inner.span = span;
                return Ok(inner);
            }
            other => return Err(GmlError::unknown_node(other.to_string(), "statement")),
        };
        Ok(self.alloc(span, kind))
    }

    fn statement_at(
        &mut self,
        children: &[GmlSyntaxNode],
        index: usize,
        parent: &GmlSyntaxNode,
    ) -> Result<Box<Node>> {
        let node = required(children.get(index).cloned(), parent)?;
        Ok(Box::new(self.statement(&node)?))
    }

    /// Statement list of a `Block`, spanning the braces
    fn block_body(&mut self, block: &GmlSyntaxNode) -> Result<Box<Node>> {
        let span = self.span(block);
        let statements = required(child_node(block, GmlSyntaxKind::StatementList), block)?;
        let items = self.statement_list(&statements)?;
        Ok(self.list(span, items))
    }

    fn block(&mut self, block: &GmlSyntaxNode) -> Result<Box<Node>> {
        let span = self.span(block);
        let body = self.block_body(block)?;
        Ok(self.boxed(span, NodeKind::Block { body }))
    }

    fn for_statement(&mut self, node: &GmlSyntaxNode) -> Result<NodeKind> {
        let end = self.span(node).end;
        let mut init = None;
        let mut test = None;
        let mut update = None;
        let mut body = None;
        for child in node.children() {
            match child.kind() {
                GmlSyntaxKind::ForInit => {
                    init = match child.first_child() {
                        Some(statement) => Some(Box::new(self.statement(&statement)?)),
                        None => None,
                    }
                }
                GmlSyntaxKind::ForTest => {
                    test = match child.first_child() {
                        Some(expression) => Some(Box::new(self.expression(&expression)?)),
                        None => None,
                    }
                }
                GmlSyntaxKind::ForUpdate => {
                    update = match child.first_child() {
                        Some(statement) => Some(Box::new(self.statement(&statement)?)),
                        None => None,
                    }
                }
                _ => body = Some(Box::new(self.statement(&child)?)),
            }
        }
        let body = match body {
            Some(body) => body,
            None => return Err(GmlError::unknown_node("<missing>", "for body")),
        };
        Ok(NodeKind::ForStatement {
            init: init.unwrap_or_else(|| self.empty(end)),
            test: test.unwrap_or_else(|| self.empty(end)),
            update: update.unwrap_or_else(|| self.empty(end)),
            body,
        })
    }

    fn switch_statement(&mut self, node: &GmlSyntaxNode) -> Result<NodeKind> {
        let children = child_nodes(node);
        let discriminant = self.expression_at(&children, 0, node)?;
        let case_block = required(child_node(node, GmlSyntaxKind::CaseBlock), node)?;

        let mut cases = Vec::new();
        for clause in case_block.children() {
            let clause_span = self.span(&clause);
            let test = match clause.kind() {
                GmlSyntaxKind::CaseClause => {
                    let expression = required(clause.first_child(), &clause)?;
                    Box::new(self.expression(&expression)?)
                }
                GmlSyntaxKind::DefaultClause => self.empty(clause_span.start),
                other => return Err(GmlError::unknown_node(other.to_string(), "switch body")),
            };
            let colon = find_token(&clause, GmlSyntaxKind::Colon)
                .map(|t| self.token_index(&t) + 1)
                .unwrap_or(clause_span.end);
            let statements = required(child_node(&clause, GmlSyntaxKind::StatementList), &clause)?;
            let items = self.statement_list(&statements)?;
            let body = self.list(TokenSpan::new(colon, clause_span.end.max(colon)), items);
            cases.push(self.alloc(clause_span, NodeKind::SwitchCase { test, body }));
        }

        let cases_span = self.span(&case_block);
        Ok(NodeKind::SwitchStatement {
            discriminant,
            cases: self.list(cases_span, cases),
        })
    }

    fn try_statement(&mut self, node: &GmlSyntaxNode, span: TokenSpan) -> Result<NodeKind> {
        let block = self.block(&required(child_node(node, GmlSyntaxKind::Block), node)?)?;

        let (param, handler) = match child_node(node, GmlSyntaxKind::CatchClause) {
            Some(clause) => {
                let param = match find_token(&clause, GmlSyntaxKind::Ident) {
                    Some(ident) => Box::new(self.identifier(&ident)),
                    None => self.empty(self.span(&clause).start),
                };
                let handler =
                    self.block(&required(child_node(&clause, GmlSyntaxKind::Block), &clause)?)?;
                (param, handler)
            }
            None => (self.empty(span.end), self.empty(span.end)),
        };

        let finalizer = match child_node(node, GmlSyntaxKind::FinallyClause) {
            Some(clause) => {
                self.block(&required(child_node(&clause, GmlSyntaxKind::Block), &clause)?)?
            }
            None => self.empty(span.end),
        };

        Ok(NodeKind::TryStatement {
            block,
            param,
            handler,
            finalizer,
        })
    }

    fn variable_declarations(&mut self, node: &GmlSyntaxNode) -> Result<NodeKind> {
        let modifier = match significant_tokens(node).next().map(|t| t.kind()) {
            Some(GmlSyntaxKind::StaticKw) => DeclarationKind::Static,
            _ => DeclarationKind::Var,
        };
        let mut declarations = Vec::new();
        for declaration in node.children() {
            let span = self.span(&declaration);
            let ident = required_token(&declaration, GmlSyntaxKind::Ident)?;
            let name = Box::new(self.identifier(&ident));
            let init = self.optional_expression(&declaration, span.end)?;
            declarations.push(self.alloc(span, NodeKind::VariableDeclaration { name, init }));
        }
        let end = self.span(node).end;
        let list_span = cover_all(&declarations).unwrap_or(TokenSpan::empty(end));
        Ok(NodeKind::VariableDeclarationList {
            modifier,
            declarations: self.list(list_span, declarations),
        })
    }

    /// `function` declarations and expressions, constructors included
    fn function(&mut self, node: &GmlSyntaxNode) -> Result<NodeKind> {
        let span = self.span(node);
        let name = match find_token(node, GmlSyntaxKind::Ident) {
            Some(ident) => Box::new(self.identifier(&ident)),
            None => self.empty(span.start),
        };

        let param_list = required(child_node(node, GmlSyntaxKind::ParameterList), node)?;
        let params_span = self.span(&param_list);
        let mut params = Vec::new();
        for parameter in param_list.children() {
            let parameter_span = self.span(&parameter);
            let ident = required_token(&parameter, GmlSyntaxKind::Ident)?;
            let name = Box::new(self.identifier(&ident));
            let default = self.optional_expression(&parameter, parameter_span.end)?;
            params.push(self.alloc(parameter_span, NodeKind::Parameter { name, default }));
        }
        let params = self.list(params_span, params);

        let body = self.block(&required(child_node(node, GmlSyntaxKind::Block), node)?)?;

        let is_constructor = find_token(node, GmlSyntaxKind::ConstructorKw).is_some();
        let inheritance = child_node(node, GmlSyntaxKind::InheritanceClause);
        if !is_constructor && inheritance.is_none() {
            return Ok(NodeKind::FunctionDeclaration { name, params, body });
        }

        let parent = match inheritance {
            Some(clause) => {
                let ident = required_token(&clause, GmlSyntaxKind::Ident)?;
                let object = Box::new(self.identifier(&ident));
                let arguments_node = required(child_node(&clause, GmlSyntaxKind::Arguments), &clause)?;
                let arguments = self.arguments(&arguments_node)?;
                let call_span = object.span.cover(arguments.span);
                self.boxed(call_span, NodeKind::CallExpression { object, arguments })
            }
            None => self.empty(params_span.end),
        };
        Ok(NodeKind::StructDeclaration {
            name,
            params,
            parent,
            body,
        })
    }

    fn enum_declaration(&mut self, node: &GmlSyntaxNode, span: TokenSpan) -> Result<NodeKind> {
        let ident = required_token(node, GmlSyntaxKind::Ident)?;
        let name = Box::new(self.identifier(&ident));

        let mut members = Vec::new();
        for member in node.children() {
            let member_span = self.span(&member);
            let ident = required_token(&member, GmlSyntaxKind::Ident)?;
            let member_name = Box::new(self.identifier(&ident));
            let init = self.optional_expression(&member, member_span.end)?;
            members.push(self.alloc(
                member_span,
                NodeKind::EnumMember {
                    name: member_name,
                    init,
                },
            ));
        }

        let open = find_token(node, GmlSyntaxKind::LBrace).map(|t| self.token_index(&t));
        let list_span = match open {
            Some(open) => TokenSpan::new(open, span.end),
            None => span,
        };
        Ok(NodeKind::EnumDeclaration {
            name,
            members: self.list(list_span, members),
        })
    }

    // ==================
    // Expressions
    // ==================

    fn expression(&mut self, node: &GmlSyntaxNode) -> Result<Node> {
        use GmlSyntaxKind as K;
        let span = self.span(node);
        let kind = match node.kind() {
            K::ParenExpr => {
                let inner = required(node.first_child(), node)?;
                return self.expression(&inner);
            }
            K::LiteralExpr => {
                let token = required_token_any(node)?;
                NodeKind::Literal(Literal::Scalar(token.text().to_string()))
            }
            K::IdentifierExpr => {
                let token = required_token(node, K::Ident)?;
                return Ok(self.identifier(&token));
            }
            K::BinaryExpr => {
                let children = child_nodes(node);
                let token = required_token_any(node)?;
                let operator = binary_operator(token.kind())
                    .ok_or_else(|| GmlError::unknown_node(token.kind().to_string(), "binary"))?;
                NodeKind::BinaryExpression {
                    operator,
                    left: self.expression_at(&children, 0, node)?,
                    right: self.expression_at(&children, 1, node)?,
                }
            }
            K::UnaryExpr => {
                let token = required_token_any(node)?;
                let operator = match token.kind() {
                    K::Bang | K::NotKw => UnaryOperator::Not,
                    K::Tilde => UnaryOperator::BitNot,
                    K::Minus => UnaryOperator::Negate,
                    K::Plus => UnaryOperator::Plus,
                    other => return Err(GmlError::unknown_node(other.to_string(), "unary")),
                };
                NodeKind::UnaryExpression {
                    operator,
                    argument: self.expression_at(&child_nodes(node), 0, node)?,
                }
            }
            K::PreIncDecExpr | K::PostIncDecExpr => {
                let token = required_token_any(node)?;
                let operator = if token.kind() == K::PlusPlus {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                NodeKind::UpdateExpression {
                    operator,
                    prefix: node.kind() == K::PreIncDecExpr,
                    argument: self.expression_at(&child_nodes(node), 0, node)?,
                }
            }
            K::TernaryExpr => {
                let children = child_nodes(node);
                NodeKind::TernaryExpression {
                    test: self.expression_at(&children, 0, node)?,
                    consequent: self.expression_at(&children, 1, node)?,
                    alternate: self.expression_at(&children, 2, node)?,
                }
            }
            K::LValueExpr => return self.chain(node),
            K::NewExpr => {
                let callee = required(child_node(node, K::IdentifierExpr), node)?;
                let callee = Box::new(self.expression(&callee)?);
                let arguments = match child_node(node, K::Arguments) {
                    Some(arguments) => self.arguments(&arguments)?,
                    None => self.list(TokenSpan::empty(span.end), Vec::new()),
                };
                NodeKind::NewExpression { callee, arguments }
            }
            K::ArrayLiteral => {
                let mut elements = Vec::new();
                for child in node.children() {
                    elements.push(self.expression(&child)?);
                }
                NodeKind::Literal(Literal::Array {
                    elements: self.list(span, elements),
                })
            }
            K::StructLiteral => {
                let mut properties = Vec::new();
                for property in node.children() {
                    let property_span = self.span(&property);
                    let key = required_token_any(&property)?.text().to_string();
                    let value = self.optional_expression(&property, property_span.end)?;
                    properties.push(self.alloc(property_span, NodeKind::StructProperty { key, value }));
                }
                NodeKind::Literal(Literal::Struct {
                    properties: self.list(span, properties),
                })
            }
            K::TemplateString => {
                let mut parts = Vec::new();
                for element in node.children_with_tokens() {
                    match element {
                        rowan::NodeOrToken::Token(token) if token.kind() == K::TemplateText => {
                            parts.push(TemplatePart::Text(token.text().to_string()));
                        }
                        rowan::NodeOrToken::Node(splice) if splice.kind() == K::TemplateSplice => {
                            let inner = required(splice.first_child(), &splice)?;
                            parts.push(TemplatePart::Splice(self.expression(&inner)?));
                        }
                        _ => {}
                    }
                }
                NodeKind::Literal(Literal::Template { parts })
            }
            K::FunctionExpr => self.function(node)?,
            other => return Err(GmlError::unknown_node(other.to_string(), "expression")),
        };
        Ok(self.alloc(span, kind))
    }

    fn expression_at(
        &mut self,
        children: &[GmlSyntaxNode],
        index: usize,
        parent: &GmlSyntaxNode,
    ) -> Result<Box<Node>> {
        let node = required(children.get(index).cloned(), parent)?;
        Ok(Box::new(self.expression(&node)?))
    }

    /// First child expression, or `Empty` at `at`
    fn optional_expression(&mut self, node: &GmlSyntaxNode, at: usize) -> Result<Box<Node>> {
        match node.first_child() {
            Some(expression) => Ok(Box::new(self.expression(&expression)?)),
            None => Ok(self.empty(at)),
        }
    }

    /// Fold chain links left to right onto the head expression
    fn chain(&mut self, node: &GmlSyntaxNode) -> Result<Node> {
        let mut children = node.children();
        let head = required(children.next(), node)?;
        let head = self.expression(&head)?;
        children.try_fold(head, |object, link| self.chain_link(object, &link))
    }

    fn chain_link(&mut self, object: Node, link: &GmlSyntaxNode) -> Result<Node> {
        let link_span = self.span(link);
        let span = object.span.cover(link_span);
        let object = Box::new(object);
        let kind = match link.kind() {
            GmlSyntaxKind::MemberDotOp => {
                let ident = required_token(link, GmlSyntaxKind::Ident)?;
                NodeKind::MemberDotExpression {
                    object,
                    property: Box::new(self.identifier(&ident)),
                }
            }
            GmlSyntaxKind::MemberIndexOp => {
                let open = required_token_any(link)?;
                let accessor = match open.kind() {
                    GmlSyntaxKind::ListAccessor => Accessor::List,
                    GmlSyntaxKind::MapAccessor => Accessor::Map,
                    GmlSyntaxKind::GridAccessor => Accessor::Grid,
                    GmlSyntaxKind::ArrayAccessor => Accessor::Array,
                    GmlSyntaxKind::StructAccessor => Accessor::Struct,
                    _ => Accessor::Plain,
                };
                let mut properties = Vec::new();
                for child in link.children() {
                    properties.push(self.expression(&child)?);
                }
                NodeKind::MemberIndexExpression {
                    object,
                    accessor,
                    properties: self.list(link_span, properties),
                }
            }
            GmlSyntaxKind::CallOp => {
                let arguments = required(child_node(link, GmlSyntaxKind::Arguments), link)?;
                NodeKind::CallExpression {
                    object,
                    arguments: self.arguments(&arguments)?,
                }
            }
            other => return Err(GmlError::unknown_node(other.to_string(), "member chain")),
        };
        Ok(self.alloc(span, kind))
    }

    /// Argument list spanning its parentheses
    fn arguments(&mut self, node: &GmlSyntaxNode) -> Result<Box<Node>> {
        let span = self.span(node);
        let mut items = Vec::new();
        for child in node.children() {
            items.push(self.expression(&child)?);
        }
        Ok(self.list(span, items))
    }

    fn identifier(&mut self, token: &GmlSyntaxToken) -> Node {
        let index = self.token_index(token);
        self.alloc(
            TokenSpan::new(index, index + 1),
            NodeKind::Identifier {
                name: token.text().to_string(),
            },
        )
    }

    // ==================
    // Spans
    // ==================

    /// Index of a tree token in the lexer output
    fn token_index(&self, token: &GmlSyntaxToken) -> usize {
        let offset = usize::from(token.text_range().start());
        let index = self.tokens.partition_point(|t| t.span.start < offset);
        // Zero-width tokens (only `Eof`) share their offset with nothing else
        index.min(self.tokens.len().saturating_sub(1))
    }

    /// Token span from the first to the last significant token of `node`
    fn span(&self, node: &GmlSyntaxNode) -> TokenSpan {
        let first = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| !token.kind().is_trivia());
        let Some(first) = first else {
            let at = node
                .first_token()
                .map(|t| self.token_index(&t))
                .unwrap_or(self.tokens.len());
            return TokenSpan::empty(at);
        };
        let mut last = node.last_token();
        while let Some(token) = last.clone() {
            if !token.kind().is_trivia() {
                break;
            }
            last = token.prev_token();
        }
        let start = self.token_index(&first);
        let end = last.map_or(start, |t| self.token_index(&t)) + 1;
        TokenSpan::new(start, end.max(start + 1))
    }
}

fn child_nodes(node: &GmlSyntaxNode) -> Vec<GmlSyntaxNode> {
    node.children().collect()
}

fn child_node(node: &GmlSyntaxNode, kind: GmlSyntaxKind) -> Option<GmlSyntaxNode> {
    node.children().find(|child| child.kind() == kind)
}

/// Direct non-trivia tokens of `node`
fn significant_tokens(node: &GmlSyntaxNode) -> impl Iterator<Item = GmlSyntaxToken> + use<> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
}

fn find_token(node: &GmlSyntaxNode, kind: GmlSyntaxKind) -> Option<GmlSyntaxToken> {
    significant_tokens(node).find(|token| token.kind() == kind)
}

fn required(node: Option<GmlSyntaxNode>, parent: &GmlSyntaxNode) -> Result<GmlSyntaxNode> {
    node.ok_or_else(|| GmlError::unknown_node("<missing child>", parent.kind().to_string()))
}

fn required_token(node: &GmlSyntaxNode, kind: GmlSyntaxKind) -> Result<GmlSyntaxToken> {
    find_token(node, kind)
        .ok_or_else(|| GmlError::unknown_node(kind.to_string(), node.kind().to_string()))
}

fn required_token_any(node: &GmlSyntaxNode) -> Result<GmlSyntaxToken> {
    significant_tokens(node)
        .next()
        .ok_or_else(|| GmlError::unknown_node("<token>", node.kind().to_string()))
}

fn cover_all(nodes: &[Node]) -> Option<TokenSpan> {
    let first = nodes.first()?.span;
    Some(nodes.iter().fold(first, |span, node| span.cover(node.span)))
}

fn directive_text(node: &GmlSyntaxNode) -> String {
    significant_tokens(node)
        .next()
        .map(|token| token.text().trim_end().to_string())
        .unwrap_or_default()
}

fn binary_operator(kind: GmlSyntaxKind) -> Option<BinaryOperator> {
    use GmlSyntaxKind as K;
    let operator = match kind {
        K::QuestionQuestion => BinaryOperator::Coalesce,
        K::PipePipe | K::OrKw => BinaryOperator::Or,
        K::CaretCaret | K::XorKw => BinaryOperator::Xor,
        K::AmpAmp | K::AndKw => BinaryOperator::And,
        K::Pipe => BinaryOperator::BitOr,
        K::Caret => BinaryOperator::BitXor,
        K::Amp => BinaryOperator::BitAnd,
        K::EqEq | K::Eq => BinaryOperator::Equal,
        K::BangEq | K::LtGt => BinaryOperator::NotEqual,
        K::Lt => BinaryOperator::Less,
        K::LtEq => BinaryOperator::LessEqual,
        K::Gt => BinaryOperator::Greater,
        K::GtEq => BinaryOperator::GreaterEqual,
        K::Shl => BinaryOperator::ShiftLeft,
        K::Shr => BinaryOperator::ShiftRight,
        K::Plus => BinaryOperator::Add,
        K::Minus => BinaryOperator::Subtract,
        K::Star => BinaryOperator::Multiply,
        K::Slash => BinaryOperator::Divide,
        K::Percent | K::ModKw => BinaryOperator::Modulo,
        K::DivKw => BinaryOperator::IntDivide,
        _ => return None,
    };
    Some(operator)
}

fn assignment_operator(kind: GmlSyntaxKind) -> AssignmentOperator {
    use GmlSyntaxKind as K;
    match kind {
        K::PlusEq => AssignmentOperator::Add,
        K::MinusEq => AssignmentOperator::Subtract,
        K::StarEq => AssignmentOperator::Multiply,
        K::SlashEq => AssignmentOperator::Divide,
        K::PercentEq => AssignmentOperator::Modulo,
        K::AmpEq => AssignmentOperator::BitAnd,
        K::PipeEq => AssignmentOperator::BitOr,
        K::CaretEq => AssignmentOperator::BitXor,
        K::ShlEq => AssignmentOperator::ShiftLeft,
        K::ShrEq => AssignmentOperator::ShiftRight,
        K::QuestionQuestionEq => AssignmentOperator::Coalesce,
        _ => AssignmentOperator::Assign,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_gml;

    fn build(source: &str) -> Ast {
        let parsed = parse_gml(source).unwrap();
        build_ast(&parsed.root, &parsed.tokens).unwrap()
    }

    fn statements(ast: &Ast) -> &[Node] {
        match &ast.root.kind {
            NodeKind::Program { body } => body.list(),
            other => panic!("unexpected root {other:?}"),
        }
    }

    #[test]
    fn test_empty_statements_are_filtered() {
        let ast = build(";;\nx = 1;;\n{ ; }");
        let body = statements(&ast);
        assert_eq!(body.len(), 2);
        match &body[1].kind {
            NodeKind::Block { body } => assert!(body.list().is_empty()),
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_else_is_empty_node() {
        let ast = build("if (a) b = 1;");
        match &statements(&ast)[0].kind {
            NodeKind::IfStatement { alternate, .. } => assert!(alternate.is_empty()),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_parentheses_collapse() {
        let ast = build("x = ((a));");
        match &statements(&ast)[0].kind {
            NodeKind::AssignmentExpression { right, .. } => {
                assert!(matches!(&right.kind, NodeKind::Identifier { name } if name == "a"));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_chain_folds_left_to_right() {
        let ast = build("a.b[c].d(e);");
        let call = &statements(&ast)[0];
        let NodeKind::CallExpression { object, arguments } = &call.kind else {
            panic!("expected call, got {:?}", call.kind);
        };
        assert_eq!(arguments.list().len(), 1);
        let NodeKind::MemberDotExpression { object, property } = &object.kind else {
            panic!("expected member dot");
        };
        assert!(matches!(&property.kind, NodeKind::Identifier { name } if name == "d"));
        let NodeKind::MemberIndexExpression {
            object, accessor, ..
        } = &object.kind
        else {
            panic!("expected member index");
        };
        assert_eq!(*accessor, Accessor::Plain);
        assert!(matches!(&object.kind, NodeKind::MemberDotExpression { .. }));
    }

    #[test]
    fn test_keyword_operators_normalize() {
        let ast = build("x = a and b or c mod 2 <> d;");
        let NodeKind::AssignmentExpression { right, .. } = &statements(&ast)[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::BinaryExpression { operator, left, .. } = &right.kind else {
            panic!("expected binary");
        };
        assert_eq!(*operator, BinaryOperator::Or);
        assert!(matches!(
            &left.kind,
            NodeKind::BinaryExpression {
                operator: BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn test_colon_equals_is_plain_assignment() {
        let ast = build("x := 1;");
        assert!(matches!(
            &statements(&ast)[0].kind,
            NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                ..
            }
        ));
    }

    #[test]
    fn test_statement_span_includes_semicolon() {
        let parsed = parse_gml("foo(1);").unwrap();
        let ast = build_ast(&parsed.root, &parsed.tokens).unwrap();
        let call = &statements(&ast)[0];
        let last = call.span.last().unwrap();
        assert_eq!(parsed.tokens[last].kind, GmlSyntaxKind::Semicolon);
        assert_eq!(parsed.tokens[call.span.start].text, "foo");
    }

    #[test]
    fn test_constructor_becomes_struct_declaration() {
        let ast = build("function Child(a, b = 2) : Parent(a) constructor { x = a; }");
        let NodeKind::StructDeclaration {
            name,
            params,
            parent,
            ..
        } = &statements(&ast)[0].kind
        else {
            panic!("expected struct declaration");
        };
        assert!(matches!(&name.kind, NodeKind::Identifier { name } if name == "Child"));
        assert_eq!(params.list().len(), 2);
        assert!(matches!(&parent.kind, NodeKind::CallExpression { .. }));
    }

    #[test]
    fn test_for_with_empty_header_parts() {
        let ast = build("for (;;) { break; }");
        let NodeKind::ForStatement {
            init, test, update, ..
        } = &statements(&ast)[0].kind
        else {
            panic!("expected for");
        };
        assert!(init.is_empty() && test.is_empty() && update.is_empty());
    }

    #[test]
    fn test_switch_cases_and_default() {
        let ast = build("switch (k) { case 1: a(); break; default: b(); }");
        let NodeKind::SwitchStatement { cases, .. } = &statements(&ast)[0].kind else {
            panic!("expected switch");
        };
        let cases = cases.list();
        assert_eq!(cases.len(), 2);
        let NodeKind::SwitchCase { test, body } = &cases[1].kind else {
            panic!("expected case");
        };
        assert!(test.is_empty());
        assert_eq!(body.list().len(), 1);
    }

    #[test]
    fn test_template_parts() {
        let ast = build("s = $\"hp {hp}!\";");
        let NodeKind::AssignmentExpression { right, .. } = &statements(&ast)[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::Literal(Literal::Template { parts }) = &right.kind else {
            panic!("expected template");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[1], TemplatePart::Splice(_)));
    }

    #[test]
    fn test_node_ids_are_unique() {
        let ast = build("var a = [1, 2], b = { c: 3 };\nif (a) { b.c(a[0]); }");
        let mut ids = std::collections::HashSet::new();
        ast.root.walk(&mut |node| {
            assert!(ids.insert(node.id), "duplicate id {}", node.id);
        });
        assert_eq!(ids.len() as u32, ast.node_count);
    }
}
