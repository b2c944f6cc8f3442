//! Expression printing
//!
//! Parentheses are only printed where the tree needs them; the AST keeps
//! no record of the source's grouping parentheses.

use super::AstFormatter;
use crate::cst::ast::{Accessor, Literal, Node, NodeKind, TemplatePart};
use crate::cst::format_element::{
    FormatElement, Group, conditional_group, expanded_group, fill, group, hard_line_break, indent,
    join, sequence, soft_line_break, soft_line_break_or_space, space, text, token,
};
use crate::error::GmlError;
use crate::result::Result;

fn parenthesize(doc: FormatElement) -> FormatElement {
    sequence(vec![token("("), doc, token(")")])
}

/// Expand the outermost group of `doc`, looking through comment wrappers
fn force_break(doc: FormatElement) -> FormatElement {
    match doc {
        FormatElement::Group(group) => FormatElement::Group(Group {
            contents: group.contents,
            expand: true,
        }),
        FormatElement::Sequence(parts) => {
            let mut expanded = false;
            let parts = parts
                .into_iter()
                .map(|part| {
                    if !expanded && matches!(part, FormatElement::Group(_)) {
                        expanded = true;
                        force_break(part)
                    } else {
                        part
                    }
                })
                .collect();
            FormatElement::Sequence(parts)
        }
        other => other,
    }
}

/// Last arguments that print better hugging the parentheses
fn is_huggable(node: &Node) -> bool {
    match &node.kind {
        NodeKind::FunctionDeclaration { .. } | NodeKind::StructDeclaration { .. } => true,
        NodeKind::Literal(Literal::Struct { properties }) => !properties.list().is_empty(),
        _ => false,
    }
}

/// Chain heads that can be followed by `.`, `[` or `(` without parentheses
fn is_simple_chain_head(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Identifier { .. } | NodeKind::NewExpression { .. }
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Call,
    Dot,
    Index,
}

/// A run of chain links printed together on one line
struct LinkGroup {
    parts: Vec<FormatElement>,
    has_call: bool,
    /// Some argument list in the group cannot print on one line
    breaks: bool,
}

impl AstFormatter<'_> {
    /// Binary chains of one precedence tier share a group
    ///
    /// Continuation lines are indented unless the expression is a clause
    /// condition, which the parentheses already indent.
    pub(super) fn print_binary(
        &mut self,
        node: &Node,
        indent_continuations: bool,
    ) -> Result<FormatElement> {
        let mut parts = Vec::new();
        self.binary_parts(node, &mut parts)?;
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return Err(GmlError::unknown_node(node.kind_name(), "binary operand"));
        };
        let rest: Vec<FormatElement> = parts.collect();
        let rest = if indent_continuations {
            indent(rest)
        } else {
            sequence(rest)
        };
        Ok(group(vec![first, rest]))
    }

    /// First operand, then one `operator operand` element per link
    fn binary_parts(&mut self, node: &Node, parts: &mut Vec<FormatElement>) -> Result<()> {
        let NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } = &node.kind
        else {
            parts.push(self.print(node)?);
            return Ok(());
        };
        let precedence = operator.precedence();

        let flatten = match &left.kind {
            NodeKind::BinaryExpression { operator: inner, .. } => {
                inner.precedence() == precedence && !self.comments.has_comments(left.id)
            }
            _ => false,
        };
        if flatten {
            self.binary_parts(left, parts)?;
        } else {
            parts.push(self.operand(left, precedence, false)?);
        }

        let right = self.operand(right, precedence, true)?;
        if operator.is_equality() {
            parts.push(sequence(vec![
                space(),
                token(operator.as_str()),
                space(),
                right,
            ]));
        } else {
            parts.push(sequence(vec![
                soft_line_break_or_space(),
                token(operator.as_str()),
                space(),
                right,
            ]));
        }
        Ok(())
    }

    fn operand(&mut self, child: &Node, precedence: u8, is_right: bool) -> Result<FormatElement> {
        let doc = self.print(child)?;
        let needs_parens = match &child.kind {
            NodeKind::BinaryExpression { operator, .. } => {
                operator.precedence() < precedence
                    || (is_right && operator.precedence() == precedence)
            }
            NodeKind::TernaryExpression { .. } | NodeKind::AssignmentExpression { .. } => true,
            _ => false,
        };
        Ok(if needs_parens { parenthesize(doc) } else { doc })
    }

    pub(super) fn print_unary(
        &mut self,
        operator: &'static str,
        argument: &Node,
    ) -> Result<FormatElement> {
        let doc = self.print(argument)?;
        let needs_parens = matches!(
            argument.kind,
            NodeKind::BinaryExpression { .. }
                | NodeKind::TernaryExpression { .. }
                | NodeKind::AssignmentExpression { .. }
                | NodeKind::UnaryExpression { .. }
                | NodeKind::UpdateExpression { prefix: true, .. }
        );
        let doc = if needs_parens { parenthesize(doc) } else { doc };
        Ok(sequence(vec![token(operator), doc]))
    }

    pub(super) fn print_update(
        &mut self,
        operator: &'static str,
        prefix: bool,
        argument: &Node,
    ) -> Result<FormatElement> {
        let doc = self.print(argument)?;
        Ok(if prefix {
            sequence(vec![token(operator), doc])
        } else {
            sequence(vec![doc, token(operator)])
        })
    }

    pub(super) fn print_ternary(
        &mut self,
        test: &Node,
        consequent: &Node,
        alternate: &Node,
    ) -> Result<FormatElement> {
        let test_doc = self.print(test)?;
        let test_doc = if matches!(
            test.kind,
            NodeKind::TernaryExpression { .. } | NodeKind::AssignmentExpression { .. }
        ) {
            parenthesize(test_doc)
        } else {
            test_doc
        };
        Ok(group(vec![
            test_doc,
            indent(vec![
                soft_line_break_or_space(),
                token("? "),
                self.print(consequent)?,
                soft_line_break_or_space(),
                token(": "),
                self.print(alternate)?,
            ]),
        ]))
    }

    /// Member and call chains
    ///
    /// Chains with two or more calls print on one line when that fits and
    /// one link group per line otherwise. Comments on inner chain nodes
    /// stay with their link; dangling ones move in front of the chain.
    pub(super) fn print_chain(&mut self, node: &Node) -> Result<FormatElement> {
        let mut links = Vec::new();
        let mut head = node;
        loop {
            match &head.kind {
                NodeKind::CallExpression { object, .. }
                | NodeKind::MemberDotExpression { object, .. }
                | NodeKind::MemberIndexExpression { object, .. } => {
                    links.push(head);
                    head = &**object;
                }
                _ => break,
            }
        }
        links.reverse();

        let head_doc = self.print(head)?;
        let mut head_parts = vec![if is_simple_chain_head(head) {
            head_doc
        } else {
            parenthesize(head_doc)
        }];

        let mut prefix = Vec::new();
        let mut printed = Vec::with_capacity(links.len());
        for link in &links {
            let is_outermost = link.id == node.id;
            if !is_outermost {
                prefix.extend(self.leading_parts(link)?);
            }
            let (kind, doc) = self.chain_link(link)?;
            let breaks = match &link.kind {
                NodeKind::CallExpression { arguments, .. } => {
                    self.arguments_force_break(arguments)
                }
                _ => false,
            };
            let doc = if is_outermost || !self.comments.has_comments(link.id) {
                doc
            } else {
                let mut parts = vec![doc];
                parts.extend(self.trailing_parts(link.id)?);
                sequence(parts)
            };
            printed.push((kind, doc, breaks));
        }
        let call_count = printed
            .iter()
            .filter(|(kind, _, _)| *kind == LinkKind::Call)
            .count();

        // Calls and indexes straight after the head stay on its line
        let mut printed = printed.into_iter().peekable();
        while let Some((_, doc, _)) = printed.next_if(|(kind, _, _)| *kind != LinkKind::Dot) {
            head_parts.push(doc);
        }

        let mut groups: Vec<LinkGroup> = Vec::new();
        for (kind, doc, breaks) in printed {
            let start_group = match groups.last() {
                Some(current) => kind == LinkKind::Dot && current.has_call,
                None => true,
            };
            if start_group {
                groups.push(LinkGroup {
                    parts: Vec::new(),
                    has_call: false,
                    breaks: false,
                });
            }
            if let Some(current) = groups.last_mut() {
                current.has_call |= kind == LinkKind::Call;
                current.breaks |= breaks || doc.will_break();
                current.parts.push(doc);
            }
        }

        let chain = if call_count < 2 || groups.is_empty() {
            let mut parts = head_parts;
            parts.extend(groups.into_iter().flat_map(|group| group.parts));
            sequence(parts)
        } else {
            let inner_breaks = groups[..groups.len() - 1].iter().any(|group| group.breaks);

            let mut one_line = head_parts.clone();
            one_line.extend(groups.iter().flat_map(|group| group.parts.iter().cloned()));

            let mut broken = Vec::with_capacity(groups.len() * 2);
            for group in groups {
                broken.push(hard_line_break());
                broken.push(sequence(group.parts));
            }
            let mut expanded = head_parts;
            expanded.push(indent(broken));

            if inner_breaks {
                sequence(expanded)
            } else {
                conditional_group(vec![sequence(one_line), sequence(expanded)])
            }
        };

        if prefix.is_empty() {
            Ok(chain)
        } else {
            prefix.push(chain);
            Ok(sequence(prefix))
        }
    }

    /// An argument list that never fits on one line: it holds a function
    /// whose body has statements or comments
    fn arguments_force_break(&self, arguments: &Node) -> bool {
        arguments.list().iter().any(|argument| {
            let body = match &argument.kind {
                NodeKind::FunctionDeclaration { body, .. }
                | NodeKind::StructDeclaration { body, .. } => body,
                _ => return false,
            };
            let NodeKind::Block { body: statements } = &body.kind else {
                return false;
            };
            !statements.list().is_empty()
                || self.comments.has_comments(body.id)
                || self.comments.has_comments(statements.id)
        })
    }

    fn chain_link(&mut self, link: &Node) -> Result<(LinkKind, FormatElement)> {
        match &link.kind {
            NodeKind::CallExpression { arguments, .. } => {
                Ok((LinkKind::Call, self.print_arguments(arguments)?))
            }
            NodeKind::MemberDotExpression { property, .. } => Ok((
                LinkKind::Dot,
                sequence(vec![token("."), self.print(property)?]),
            )),
            NodeKind::MemberIndexExpression {
                accessor,
                properties,
                ..
            } => Ok((LinkKind::Index, self.print_index(*accessor, properties)?)),
            _ => Err(GmlError::unknown_node(link.kind_name(), "member chain")),
        }
    }

    fn print_index(&mut self, accessor: Accessor, properties: &Node) -> Result<FormatElement> {
        let docs = self.print_all(properties)?;
        self.delimited(properties, accessor.open(), "]", docs, false)
    }

    fn print_all(&mut self, list: &Node) -> Result<Vec<FormatElement>> {
        list.list().iter().map(|item| self.print(item)).collect()
    }

    /// Argument lists; a trailing function or struct hugs the parentheses
    pub(super) fn print_arguments(&mut self, list: &Node) -> Result<FormatElement> {
        let arguments = list.list();
        let docs = self.print_all(list)?;

        let hug_last = match arguments.split_last() {
            Some((last, others)) => {
                is_huggable(last)
                    && !others.iter().any(is_huggable)
                    && self.comments.dangling(list.id).next().is_none()
            }
            None => false,
        };
        if !hug_last {
            return self.delimited(list, "(", ")", docs, false);
        }

        let all_broken = expanded_group(vec![
            token("("),
            indent(vec![
                soft_line_break(),
                sequence(join(docs.clone(), &[token(","), soft_line_break_or_space()])),
            ]),
            soft_line_break(),
            token(")"),
        ]);

        let mut docs = docs;
        let Some(last) = docs.pop() else {
            return Err(GmlError::unknown_node("Arguments", "empty argument list"));
        };
        let mut leading = vec![token("(")];
        for doc in docs {
            leading.push(doc);
            leading.push(token(", "));
        }

        let mut hugged = leading.clone();
        hugged.push(last.clone());
        hugged.push(token(")"));

        let mut hugged_expanded = leading;
        hugged_expanded.push(force_break(last));
        hugged_expanded.push(token(")"));

        Ok(conditional_group(vec![
            sequence(hugged),
            sequence(hugged_expanded),
            all_broken,
        ]))
    }

    pub(super) fn print_parameters(&mut self, list: &Node) -> Result<FormatElement> {
        let docs = self.print_all(list)?;
        self.delimited(list, "(", ")", docs, false)
    }

    /// Bracketed, comma separated list that breaks one item per line
    ///
    /// Dangling comments always print on their own lines before the
    /// closing bracket.
    fn delimited(
        &mut self,
        list: &Node,
        open: &'static str,
        close: &'static str,
        items: Vec<FormatElement>,
        padded: bool,
    ) -> Result<FormatElement> {
        let dangling = self.dangling_suffix(list)?;
        if items.is_empty() && dangling.is_empty() {
            return Ok(sequence(vec![token(open), token(close)]));
        }

        let line: fn() -> FormatElement = if padded {
            soft_line_break_or_space
        } else {
            soft_line_break
        };
        let mut inner = Vec::new();
        if !items.is_empty() {
            inner.push(line());
            inner.extend(join(items, &[token(","), soft_line_break_or_space()]));
        }
        let closing = if dangling.is_empty() {
            line()
        } else {
            hard_line_break()
        };
        inner.extend(dangling);

        Ok(group(vec![token(open), indent(inner), closing, token(close)]))
    }

    pub(super) fn print_literal(&mut self, literal: &Literal) -> Result<FormatElement> {
        match literal {
            Literal::Scalar(value) => Ok(text(value)),
            Literal::Array { elements } => self.print_array(elements),
            Literal::Struct { properties } => {
                let docs = self.print_all(properties)?;
                self.delimited(properties, "{", "}", docs, true)
            }
            Literal::Template { parts } => {
                let mut docs = vec![token("$\"")];
                for part in parts {
                    match part {
                        TemplatePart::Text(raw) => docs.push(text(raw)),
                        TemplatePart::Splice(expression) => {
                            docs.push(token("{"));
                            docs.push(self.print(expression)?);
                            docs.push(token("}"));
                        }
                    }
                }
                docs.push(token("\""));
                Ok(sequence(docs))
            }
        }
    }

    /// Arrays of plain values fill each line; anything else goes one per line
    fn print_array(&mut self, elements: &Node) -> Result<FormatElement> {
        let items = elements.list();
        let fillable = items.len() > 1
            && self.comments.dangling(elements.id).next().is_none()
            && items.iter().all(|item| {
                matches!(item.kind, NodeKind::Literal(Literal::Scalar(_)))
                    && !self.comments.has_comments(item.id)
            });
        let docs = self.print_all(elements)?;
        if !fillable {
            return self.delimited(elements, "[", "]", docs, false);
        }

        let count = docs.len();
        let mut parts = Vec::with_capacity(count * 2);
        for (index, doc) in docs.into_iter().enumerate() {
            if index + 1 < count {
                parts.push(sequence(vec![doc, token(",")]));
                parts.push(soft_line_break_or_space());
            } else {
                parts.push(doc);
            }
        }
        Ok(group(vec![
            token("["),
            indent(vec![soft_line_break(), fill(parts)]),
            soft_line_break(),
            token("]"),
        ]))
    }
}
