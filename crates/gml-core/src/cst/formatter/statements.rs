//! Statement printing
//!
//! Control-flow bodies are always braced. Simple statements end with `;`.

use super::{AstFormatter, Line, join_lines};
use crate::cst::ast::{Node, NodeKind};
use crate::cst::comments::Comment;
use crate::cst::format_element::{
    FormatElement, empty_line, expanded_group, group, hard_line_break, indent, join, sequence,
    soft_line_break, soft_line_break_or_space, space, token,
};
use crate::error::GmlError;
use crate::result::Result;

/// `{ lines }`, or `{}` without any
pub(super) fn braces(lines: Vec<Line>) -> FormatElement {
    if lines.is_empty() {
        return token("{}");
    }
    group(vec![
        token("{"),
        indent(vec![hard_line_break(), sequence(join_lines(lines))]),
        hard_line_break(),
        token("}"),
    ])
}

/// Statements that take a terminating semicolon
fn needs_semicolon(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::AssignmentExpression { .. }
            | NodeKind::CallExpression { .. }
            | NodeKind::NewExpression { .. }
            | NodeKind::UpdateExpression { .. }
            | NodeKind::VariableDeclarationList { .. }
            | NodeKind::GlobalVarStatement { .. }
            | NodeKind::ReturnStatement { .. }
            | NodeKind::ThrowStatement { .. }
            | NodeKind::DeleteStatement { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::ExitStatement
            | NodeKind::DoStatement { .. }
    )
}

impl AstFormatter<'_> {
    /// Statements of a list plus its dangling comments
    pub(super) fn statement_lines(&mut self, list: &Node) -> Result<Vec<Line>> {
        let mut lines = Vec::with_capacity(list.list().len());
        for statement in list.list() {
            let blank_before = self.comments.has_blank_line_before(statement.span.start);
            lines.push(Line::new(self.statement(statement)?, blank_before));
        }
        lines.extend(self.dangling_lines(list.id)?);
        Ok(lines)
    }

    pub(super) fn statement(&mut self, node: &Node) -> Result<FormatElement> {
        let doc = self.print_kind(node)?;
        let doc = if needs_semicolon(node) {
            sequence(vec![doc, token(";")])
        } else {
            doc
        };
        self.with_comments(node, doc)
    }

    /// A block used as a body; comments before its `{` move inside
    fn block_body(&mut self, block: &Node) -> Result<FormatElement> {
        let NodeKind::Block { body } = &block.kind else {
            return Err(GmlError::unknown_node(block.kind_name(), "block body"));
        };
        let mut lines = self.inner_comment_lines(block)?;
        lines.extend(self.statement_lines(body)?);

        let mut parts = vec![braces(lines)];
        parts.extend(self.trailing_parts(block.id)?);
        Ok(sequence(parts))
    }

    /// Leading and dangling comments of a body, printed inside its braces
    fn inner_comment_lines(&mut self, body: &Node) -> Result<Vec<Line>> {
        let comments = self.comments;
        let mut lines = Vec::new();
        for comment in comments.leading(body.id).chain(comments.dangling(body.id)) {
            lines.push(Line::new(self.comment(comment)?, comment.blank_line_before));
        }
        Ok(lines)
    }

    /// Loop and branch bodies, braced even when the source had none
    pub(super) fn clause_body(&mut self, body: &Node) -> Result<FormatElement> {
        if matches!(body.kind, NodeKind::Block { .. }) {
            return self.block_body(body);
        }
        // `if (a);` has an empty statement as its body
        if body.is_empty() {
            let mut parts = vec![braces(self.inner_comment_lines(body)?)];
            parts.extend(self.trailing_parts(body.id)?);
            return Ok(sequence(parts));
        }
        let statement = self.statement(body)?;
        Ok(braces(vec![Line::new(statement, false)]))
    }

    /// What goes between a braced body and the keyword that continues it
    fn continuation(&self, body: &Node) -> FormatElement {
        if (matches!(body.kind, NodeKind::Block { .. }) || body.is_empty())
            && self.comments.has_trailing_line_comment(body.id)
        {
            hard_line_break()
        } else {
            space()
        }
    }

    /// `( condition )`, wrapping inside the parentheses when too long
    pub(super) fn condition(&mut self, test: &Node) -> Result<FormatElement> {
        let test_doc = if matches!(test.kind, NodeKind::BinaryExpression { .. }) {
            let doc = self.print_binary(test, false)?;
            self.with_comments(test, doc)?
        } else {
            self.print(test)?
        };
        Ok(group(vec![
            token("("),
            indent(vec![soft_line_break(), test_doc]),
            soft_line_break(),
            token(")"),
        ]))
    }

    pub(super) fn print_clause(
        &mut self,
        keyword: &'static str,
        test: &Node,
        body: &Node,
    ) -> Result<FormatElement> {
        Ok(sequence(vec![
            token(keyword),
            space(),
            self.condition(test)?,
            space(),
            self.clause_body(body)?,
        ]))
    }

    pub(super) fn print_if(
        &mut self,
        test: &Node,
        consequent: &Node,
        alternate: &Node,
    ) -> Result<FormatElement> {
        let mut parts = vec![self.print_clause("if", test, consequent)?];
        if alternate.is_empty() {
            return Ok(sequence(parts));
        }

        parts.push(self.continuation(consequent));
        parts.push(token("else "));
        if matches!(alternate.kind, NodeKind::IfStatement { .. }) {
            parts.push(self.statement(alternate)?);
        } else {
            parts.push(self.clause_body(alternate)?);
        }
        Ok(sequence(parts))
    }

    pub(super) fn print_do(&mut self, body: &Node, test: &Node) -> Result<FormatElement> {
        Ok(sequence(vec![
            token("do "),
            self.clause_body(body)?,
            self.continuation(body),
            token("until "),
            self.condition(test)?,
        ]))
    }

    pub(super) fn print_for(
        &mut self,
        init: &Node,
        test: &Node,
        update: &Node,
        body: &Node,
    ) -> Result<FormatElement> {
        if init.is_empty() && test.is_empty() && update.is_empty() {
            return Ok(sequence(vec![token("for (;;) "), self.clause_body(body)?]));
        }

        let mut header = Vec::new();
        if !init.is_empty() {
            header.push(self.print(init)?);
        }
        header.push(token(";"));
        if !test.is_empty() {
            header.push(soft_line_break_or_space());
            header.push(self.print(test)?);
        }
        header.push(token(";"));
        if !update.is_empty() {
            header.push(soft_line_break_or_space());
            header.push(self.print(update)?);
        }
        let body_doc = self.clause_body(body)?;

        Ok(sequence(vec![
            token("for "),
            group(vec![
                token("("),
                indent(vec![soft_line_break(), sequence(header)]),
                soft_line_break(),
                token(")"),
            ]),
            space(),
            body_doc,
        ]))
    }

    pub(super) fn print_switch(&mut self, discriminant: &Node, cases: &Node) -> Result<FormatElement> {
        let head = self.condition(discriminant)?;
        let comments = self.comments;
        let dangling: Vec<&Comment> = comments.dangling(cases.id).collect();
        let items = cases.list();
        let mut lines = Vec::with_capacity(items.len() + dangling.len());

        // Comments past a case label belong to that case's body
        let first_case = items.first().map_or(usize::MAX, |case| case.span.start);
        for comment in dangling.iter().filter(|c| c.token_index < first_case) {
            lines.push(Line::new(self.comment(comment)?, comment.blank_line_before));
        }
        for (index, case) in items.iter().enumerate() {
            let blank_before = comments.has_blank_line_before(case.span.start);
            let next_case = items.get(index + 1).map_or(usize::MAX, |next| next.span.start);
            let mut tail = Vec::new();
            for comment in dangling
                .iter()
                .filter(|c| c.token_index >= case.span.start && c.token_index < next_case)
            {
                tail.push(Line::new(self.comment(comment)?, comment.blank_line_before));
            }

            let doc = self.print(case)?;
            let doc = match tail.first() {
                None => doc,
                Some(first) => {
                    let separator = if first.blank_before {
                        empty_line()
                    } else {
                        hard_line_break()
                    };
                    sequence(vec![doc, indent(vec![separator, sequence(join_lines(tail))])])
                }
            };
            lines.push(Line::new(doc, blank_before));
        }

        Ok(sequence(vec![
            token("switch "),
            head,
            space(),
            braces(lines),
        ]))
    }

    pub(super) fn print_case(&mut self, test: &Node, body: &Node) -> Result<FormatElement> {
        let label = if test.is_empty() {
            token("default:")
        } else {
            sequence(vec![token("case "), self.print(test)?, token(":")])
        };
        let lines = self.statement_lines(body)?;
        if lines.is_empty() {
            return Ok(label);
        }
        Ok(sequence(vec![
            label,
            indent(vec![hard_line_break(), sequence(join_lines(lines))]),
        ]))
    }

    pub(super) fn print_keyword_argument(
        &mut self,
        keyword: &'static str,
        argument: &Node,
    ) -> Result<FormatElement> {
        if argument.is_empty() {
            return Ok(token(keyword));
        }
        Ok(sequence(vec![token(keyword), space(), self.print(argument)?]))
    }

    pub(super) fn print_try(
        &mut self,
        block: &Node,
        param: &Node,
        handler: &Node,
        finalizer: &Node,
    ) -> Result<FormatElement> {
        let mut parts = vec![token("try "), self.block_body(block)?];
        let mut previous = block;

        if !handler.is_empty() {
            parts.push(self.continuation(previous));
            parts.push(token("catch "));
            if !param.is_empty() {
                parts.push(token("("));
                parts.push(self.print(param)?);
                parts.push(token(") "));
            }
            parts.push(self.block_body(handler)?);
            previous = handler;
        }

        if !finalizer.is_empty() {
            parts.push(self.continuation(previous));
            parts.push(token("finally "));
            parts.push(self.block_body(finalizer)?);
        }
        Ok(sequence(parts))
    }

    /// `var a = 1, b = 2` with continuation lines indented
    pub(super) fn print_variable_list(
        &mut self,
        modifier: &'static str,
        declarations: &Node,
    ) -> Result<FormatElement> {
        let mut docs = declarations
            .list()
            .iter()
            .map(|declaration| self.print(declaration))
            .collect::<Result<Vec<_>>>()?
            .into_iter();
        let Some(first) = docs.next() else {
            return Err(GmlError::unknown_node("VariableDeclarationList", "empty declaration list"));
        };

        let mut rest = Vec::new();
        for doc in docs {
            rest.push(token(","));
            rest.push(soft_line_break_or_space());
            rest.push(doc);
        }
        rest.extend(self.dangling_suffix(declarations)?);

        Ok(group(vec![token(modifier), space(), first, indent(rest)]))
    }

    /// `name` or `name = value`
    pub(super) fn print_binding(&mut self, name: &Node, value: &Node) -> Result<FormatElement> {
        let name = self.print(name)?;
        if value.is_empty() {
            return Ok(name);
        }
        Ok(sequence(vec![name, token(" = "), self.print(value)?]))
    }

    pub(super) fn print_globalvar(&mut self, names: &Node) -> Result<FormatElement> {
        let docs = names
            .list()
            .iter()
            .map(|name| self.print(name))
            .collect::<Result<Vec<_>>>()?;
        let mut parts = vec![token("globalvar ")];
        parts.extend(join(docs, &[token(","), space()]));
        parts.extend(self.dangling_suffix(names)?);
        Ok(sequence(parts))
    }

    /// Named or anonymous functions and constructors
    pub(super) fn print_function(
        &mut self,
        name: &Node,
        params: &Node,
        parent: Option<&Node>,
        body: &Node,
    ) -> Result<FormatElement> {
        let mut parts = vec![token("function")];
        if !name.is_empty() {
            parts.push(space());
            parts.push(self.print(name)?);
        }
        parts.push(self.print_parameters(params)?);

        if let Some(parent) = parent {
            if !parent.is_empty() {
                parts.push(token(" : "));
                parts.push(self.print(parent)?);
            }
            parts.push(token(" constructor"));
        }

        parts.push(space());
        parts.push(self.block_body(body)?);
        Ok(sequence(parts))
    }

    /// Enums always print one member per line
    pub(super) fn print_enum(&mut self, name: &Node, members: &Node) -> Result<FormatElement> {
        let name = self.print(name)?;
        let count = members.list().len();
        let mut entries = Vec::with_capacity(count);
        for (index, member) in members.list().iter().enumerate() {
            let doc = self.print(member)?;
            entries.push(if index + 1 < count {
                sequence(vec![doc, token(",")])
            } else {
                doc
            });
        }
        entries.extend(self.dangling_lines(members.id)?.into_iter().map(|line| line.doc));

        let body = if entries.is_empty() {
            token("{}")
        } else {
            expanded_group(vec![
                token("{"),
                indent(vec![hard_line_break(), sequence(join(entries, &[hard_line_break()]))]),
                hard_line_break(),
                token("}"),
            ])
        };
        Ok(sequence(vec![token("enum "), name, space(), body]))
    }
}

#[cfg(test)]
mod tests {
    use crate::cst::{FormatOptions, format_document};

    fn format(source: &str) -> String {
        format_document(source, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_if_else_chain() {
        assert_eq!(
            format("if (a) x = 1; else if (b) x = 2; else x = 3;"),
            "if (a) {\n  x = 1;\n} else if (b) {\n  x = 2;\n} else {\n  x = 3;\n}\n"
        );
    }

    #[test]
    fn test_loops_get_braces() {
        assert_eq!(format("while (i < 10) i++;"), "while (i < 10) {\n  i++;\n}\n");
        assert_eq!(format("repeat (3) show();"), "repeat (3) {\n  show();\n}\n");
        assert_eq!(
            format("with (obj_enemy) { hp = 0; }"),
            "with (obj_enemy) {\n  hp = 0;\n}\n"
        );
        assert_eq!(format("do x++; until (x > 5)"), "do {\n  x++;\n} until (x > 5);\n");
    }

    #[test]
    fn test_for_headers() {
        assert_eq!(
            format("for (var i = 0; i < n; i++) sum += i;"),
            "for (var i = 0; i < n; i++) {\n  sum += i;\n}\n"
        );
        assert_eq!(format("for (;;) { break; }"), "for (;;) {\n  break;\n}\n");
    }

    #[test]
    fn test_empty_bodies() {
        assert_eq!(format("if (a) {}"), "if (a) {}\n");
        assert_eq!(format("function f() {}"), "function f() {}\n");
    }

    #[test]
    fn test_empty_statement_body_prints_empty_braces() {
        for (source, expected) in [
            ("if (a);", "if (a) {}\n"),
            ("while (cond);", "while (cond) {}\n"),
            ("for (i = 0; i < 3; i++);", "for (i = 0; i < 3; i++) {}\n"),
            ("with (obj_wall);", "with (obj_wall) {}\n"),
            ("repeat (3);", "repeat (3) {}\n"),
            ("if (a); else b();", "if (a) {} else {\n  b();\n}\n"),
        ] {
            let once = format(source);
            assert_eq!(once, expected, "for {source:?}");
            assert_eq!(format(&once), once, "second pass changed {source:?}");
        }
    }

    #[test]
    fn test_switch() {
        let source = "switch (state) {\ncase 0: idle(); break;\ndefault: run();\n}";
        assert_eq!(
            format(source),
            "switch (state) {\n  case 0:\n    idle();\n    break;\n  default:\n    run();\n}\n"
        );
    }

    #[test]
    fn test_comment_in_case_body_is_indented() {
        let expected = "switch (s) {\n  case 0:\n    a();\n  default:\n    // nothing\n}\n";
        assert_eq!(format("switch (s) {\ncase 0: a();\ndefault:\n// nothing\n}"), expected);
        assert_eq!(format(expected), expected);

        let expected = "switch (s) {\n  default:\n    a();\n    // after\n}\n";
        assert_eq!(format(expected), expected);
    }

    #[test]
    fn test_try_catch_finally() {
        assert_eq!(
            format("try { a(); } catch (e) { b(e); } finally { c(); }"),
            "try {\n  a();\n} catch (e) {\n  b(e);\n} finally {\n  c();\n}\n"
        );
    }

    #[test]
    fn test_variable_lists() {
        assert_eq!(format("var a = 1, b;"), "var a = 1, b;\n");
        assert_eq!(format("static count = 0"), "static count = 0;\n");
        assert_eq!(format("globalvar score, lives;"), "globalvar score, lives;\n");
    }

    #[test]
    fn test_long_variable_list_breaks() {
        let source = "var first_value = 100000, second_value = 200000, third_value = 300000, fourth = 4;";
        assert_eq!(
            format(source),
            "var first_value = 100000,\n  second_value = 200000,\n  third_value = 300000,\n  fourth = 4;\n"
        );
    }

    #[test]
    fn test_functions_and_constructors() {
        assert_eq!(
            format("function add(a, b = 1) { return a + b; }"),
            "function add(a, b = 1) {\n  return a + b;\n}\n"
        );
        assert_eq!(
            format("function Dog(name) : Animal(name) constructor { bark = true; }"),
            "function Dog(name) : Animal(name) constructor {\n  bark = true;\n}\n"
        );
        assert_eq!(
            format("function Point() constructor {}"),
            "function Point() constructor {}\n"
        );
    }

    #[test]
    fn test_enum_is_always_expanded() {
        assert_eq!(
            format("enum Color { Red, Green = 5 }"),
            "enum Color {\n  Red,\n  Green = 5\n}\n"
        );
    }

    #[test]
    fn test_directives_verbatim() {
        assert_eq!(
            format("#macro MAX_HP   100\nhp = MAX_HP;"),
            "#macro MAX_HP   100\nhp = MAX_HP;\n"
        );
        assert_eq!(
            format("#region Setup\nx = 1;\n#endregion"),
            "#region Setup\nx = 1;\n#endregion\n"
        );
    }

    #[test]
    fn test_exit_and_bare_return() {
        assert_eq!(format("if (dead) exit"), "if (dead) {\n  exit;\n}\n");
        assert_eq!(format("function f() { return }"), "function f() {\n  return;\n}\n");
    }
}
