//! Typed AST for GML
//!
//! A closed set of node variants produced by the AST builder. Every node owns
//! its children, has a unique [`NodeId`] within one tree and remembers the
//! token-index range it came from, so comments can be looked up by position
//! and hosts can map nodes back to source.
//!
//! Optional children are never absent: they hold an [`NodeKind::Empty`]
//! node instead.

/// Identity of a node within one [`Ast`]
pub type NodeId = u32;

/// Half-open range of token indices `[start, end)` into the lexer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `at`
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Index of the last token covered, if any
    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    /// Does the span strictly surround the gap between tokens `before` and `after`?
    pub fn encloses_gap(&self, before: Option<usize>, after: usize) -> bool {
        if self.is_empty() {
            return false;
        }
        let starts_before = match before {
            Some(before) => self.start <= before,
            None => self.start == 0,
        };
        starts_before && after < self.end
    }

    pub fn cover(self, other: TokenSpan) -> TokenSpan {
        TokenSpan::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A parsed program with its node count
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub root: Node,
    pub node_count: u32,
}

/// One AST node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub span: TokenSpan,
    pub kind: NodeKind,
}

/// Node variants
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: Box<Node>,
    },
    Block {
        body: Box<Node>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    DoStatement {
        body: Box<Node>,
        test: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    ForStatement {
        init: Box<Node>,
        test: Box<Node>,
        update: Box<Node>,
        body: Box<Node>,
    },
    RepeatStatement {
        count: Box<Node>,
        body: Box<Node>,
    },
    WithStatement {
        object: Box<Node>,
        body: Box<Node>,
    },
    SwitchStatement {
        discriminant: Box<Node>,
        /// `NodeList` of `SwitchCase`
        cases: Box<Node>,
    },
    /// `case test:` or, with an empty test, `default:`
    SwitchCase {
        test: Box<Node>,
        body: Box<Node>,
    },
    ContinueStatement,
    BreakStatement,
    ExitStatement,
    ReturnStatement {
        argument: Box<Node>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    DeleteStatement {
        argument: Box<Node>,
    },
    TryStatement {
        block: Box<Node>,
        /// Catch binding, `Empty` when there is none
        param: Box<Node>,
        handler: Box<Node>,
        finalizer: Box<Node>,
    },
    VariableDeclarationList {
        modifier: DeclarationKind,
        declarations: Box<Node>,
    },
    VariableDeclaration {
        name: Box<Node>,
        init: Box<Node>,
    },
    GlobalVarStatement {
        names: Box<Node>,
    },
    /// Named declaration or anonymous function expression
    FunctionDeclaration {
        name: Box<Node>,
        params: Box<Node>,
        body: Box<Node>,
    },
    /// A `constructor` function, with optional parent call
    StructDeclaration {
        name: Box<Node>,
        params: Box<Node>,
        parent: Box<Node>,
        body: Box<Node>,
    },
    Parameter {
        name: Box<Node>,
        default: Box<Node>,
    },
    EnumDeclaration {
        name: Box<Node>,
        members: Box<Node>,
    },
    EnumMember {
        name: Box<Node>,
        init: Box<Node>,
    },
    MacroStatement {
        text: String,
    },
    /// `#region` or `#endregion` line
    RegionStatement {
        text: String,
    },
    DefineStatement {
        text: String,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<Node>,
    },
    UpdateExpression {
        operator: UpdateOperator,
        prefix: bool,
        argument: Box<Node>,
    },
    TernaryExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Box<Node>,
    },
    CallExpression {
        object: Box<Node>,
        arguments: Box<Node>,
    },
    MemberDotExpression {
        object: Box<Node>,
        property: Box<Node>,
    },
    MemberIndexExpression {
        object: Box<Node>,
        accessor: Accessor,
        properties: Box<Node>,
    },
    Literal(Literal),
    StructProperty {
        key: String,
        /// `Empty` for shorthand `{ name }`
        value: Box<Node>,
    },
    Identifier {
        name: String,
    },
    Empty,
    NodeList(Vec<Node>),
}

/// Literal forms
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numbers, strings, booleans, `undefined`, `noone`; source text kept verbatim
    Scalar(String),
    Array { elements: Box<Node> },
    Struct { properties: Box<Node> },
    Template { parts: Vec<TemplatePart> },
}

/// Piece of a template string
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    Splice(Node),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Static,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Static => "static",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Coalesce,
}

impl AssignmentOperator {
    /// Canonical spelling
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::Add => "+=",
            AssignmentOperator::Subtract => "-=",
            AssignmentOperator::Multiply => "*=",
            AssignmentOperator::Divide => "/=",
            AssignmentOperator::Modulo => "%=",
            AssignmentOperator::BitAnd => "&=",
            AssignmentOperator::BitOr => "|=",
            AssignmentOperator::BitXor => "^=",
            AssignmentOperator::ShiftLeft => "<<=",
            AssignmentOperator::ShiftRight => ">>=",
            AssignmentOperator::Coalesce => "??=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Coalesce,
    Or,
    Xor,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    IntDivide,
}

impl BinaryOperator {
    /// Canonical spelling; keyword synonyms map to their symbols
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Coalesce => "??",
            BinaryOperator::Or => "||",
            BinaryOperator::Xor => "^^",
            BinaryOperator::And => "&&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::IntDivide => "div",
        }
    }

    /// Precedence tier, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Coalesce => 1,
            BinaryOperator::Or => 2,
            BinaryOperator::Xor => 3,
            BinaryOperator::And => 4,
            BinaryOperator::BitOr => 5,
            BinaryOperator::BitXor => 6,
            BinaryOperator::BitAnd => 7,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 8,
            BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => 9,
            BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => 10,
            BinaryOperator::Add | BinaryOperator::Subtract => 11,
            BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo
            | BinaryOperator::IntDivide => 12,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Equal | BinaryOperator::NotEqual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    BitNot,
    Negate,
    Plus,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

/// Index accessor flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Plain,
    List,
    Map,
    Grid,
    Array,
    Struct,
}

impl Accessor {
    /// Opening bracket text including the accessor symbol
    pub fn open(self) -> &'static str {
        match self {
            Accessor::Plain => "[",
            Accessor::List => "[| ",
            Accessor::Map => "[? ",
            Accessor::Grid => "[# ",
            Accessor::Array => "[@ ",
            Accessor::Struct => "[$ ",
        }
    }
}

impl Node {
    pub fn new(id: NodeId, span: TokenSpan, kind: NodeKind) -> Self {
        Self { id, span, kind }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    /// First token index, as exposed to host tooling
    pub fn loc_start(&self) -> usize {
        self.span.start
    }

    /// One past the last token index, as exposed to host tooling
    pub fn loc_end(&self) -> usize {
        self.span.end
    }

    /// Can this node own leading and trailing comments?
    pub fn accepts_comments(&self) -> bool {
        !matches!(
            self.kind,
            NodeKind::Program { .. } | NodeKind::NodeList(_) | NodeKind::Empty
        ) && !self.span.is_empty()
    }

    /// Elements of a `NodeList`, or an empty slice for anything else
    pub fn list(&self) -> &[Node] {
        match &self.kind {
            NodeKind::NodeList(items) => items,
            _ => &[],
        }
    }

    /// Variant name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::Block { .. } => "Block",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::DoStatement { .. } => "DoStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::RepeatStatement { .. } => "RepeatStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ExitStatement => "ExitStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::DeleteStatement { .. } => "DeleteStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::VariableDeclarationList { .. } => "VariableDeclarationList",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::GlobalVarStatement { .. } => "GlobalVarStatement",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::StructDeclaration { .. } => "StructDeclaration",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::EnumDeclaration { .. } => "EnumDeclaration",
            NodeKind::EnumMember { .. } => "EnumMember",
            NodeKind::MacroStatement { .. } => "MacroStatement",
            NodeKind::RegionStatement { .. } => "RegionStatement",
            NodeKind::DefineStatement { .. } => "DefineStatement",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::TernaryExpression { .. } => "TernaryExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::MemberDotExpression { .. } => "MemberDotExpression",
            NodeKind::MemberIndexExpression { .. } => "MemberIndexExpression",
            NodeKind::Literal(_) => "Literal",
            NodeKind::StructProperty { .. } => "StructProperty",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Empty => "EmptyNode",
            NodeKind::NodeList(_) => "NodeList",
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Program { body } | NodeKind::Block { body } => vec![body],
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            }
            | NodeKind::TernaryExpression {
                test,
                consequent,
                alternate,
            } => vec![test, consequent, alternate],
            NodeKind::DoStatement { body, test } => vec![body, test],
            NodeKind::WhileStatement { test, body } => vec![test, body],
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => vec![init, test, update, body],
            NodeKind::RepeatStatement { count, body } => vec![count, body],
            NodeKind::WithStatement { object, body } => vec![object, body],
            NodeKind::SwitchStatement {
                discriminant,
                cases,
            } => vec![discriminant, cases],
            NodeKind::SwitchCase { test, body } => vec![test, body],
            NodeKind::ContinueStatement
            | NodeKind::BreakStatement
            | NodeKind::ExitStatement
            | NodeKind::MacroStatement { .. }
            | NodeKind::RegionStatement { .. }
            | NodeKind::DefineStatement { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::Empty => Vec::new(),
            NodeKind::ReturnStatement { argument }
            | NodeKind::ThrowStatement { argument }
            | NodeKind::DeleteStatement { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. } => vec![argument],
            NodeKind::TryStatement {
                block,
                param,
                handler,
                finalizer,
            } => vec![block, param, handler, finalizer],
            NodeKind::VariableDeclarationList { declarations, .. } => vec![declarations],
            NodeKind::VariableDeclaration { name, init } => vec![name, init],
            NodeKind::GlobalVarStatement { names } => vec![names],
            NodeKind::FunctionDeclaration { name, params, body } => vec![name, params, body],
            NodeKind::StructDeclaration {
                name,
                params,
                parent,
                body,
            } => vec![name, params, parent, body],
            NodeKind::Parameter { name, default } => vec![name, default],
            NodeKind::EnumDeclaration { name, members } => vec![name, members],
            NodeKind::EnumMember { name, init } => vec![name, init],
            NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::BinaryExpression { left, right, .. } => vec![left, right],
            NodeKind::NewExpression { callee, arguments } => vec![callee, arguments],
            NodeKind::CallExpression { object, arguments } => vec![object, arguments],
            NodeKind::MemberDotExpression { object, property } => vec![object, property],
            NodeKind::MemberIndexExpression {
                object, properties, ..
            } => vec![object, properties],
            NodeKind::Literal(literal) => match literal {
                Literal::Scalar(_) => Vec::new(),
                Literal::Array { elements } => vec![elements],
                Literal::Struct { properties } => vec![properties],
                Literal::Template { parts } => parts
                    .iter()
                    .filter_map(|part| match part {
                        TemplatePart::Splice(node) => Some(node),
                        TemplatePart::Text(_) => None,
                    })
                    .collect(),
            },
            NodeKind::StructProperty { value, .. } => vec![value],
            NodeKind::NodeList(items) => items.iter().collect(),
        }
    }

    /// Visit this node and all descendants, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: NodeId, at: usize, name: &str) -> Node {
        Node::new(
            id,
            TokenSpan::new(at, at + 1),
            NodeKind::Identifier {
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn test_span_gap_enclosure() {
        let span = TokenSpan::new(2, 8);
        assert!(span.encloses_gap(Some(3), 5));
        assert!(span.encloses_gap(Some(2), 7));
        assert!(!span.encloses_gap(Some(1), 5));
        assert!(!span.encloses_gap(Some(3), 8));
        assert!(TokenSpan::new(0, 4).encloses_gap(None, 3));
        assert!(!TokenSpan::empty(3).encloses_gap(Some(3), 3));
    }

    #[test]
    fn test_walk_is_pre_order() {
        let node = Node::new(
            0,
            TokenSpan::new(0, 3),
            NodeKind::BinaryExpression {
                operator: BinaryOperator::Add,
                left: Box::new(ident(1, 0, "a")),
                right: Box::new(ident(2, 2, "b")),
            },
        );
        let mut order = Vec::new();
        node.walk(&mut |n| order.push(n.id));
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_operator_spelling_and_precedence() {
        assert_eq!(BinaryOperator::And.as_str(), "&&");
        assert_eq!(BinaryOperator::Modulo.as_str(), "%");
        assert!(BinaryOperator::Multiply.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Equal.precedence() < BinaryOperator::Less.precedence());
        assert!(BinaryOperator::Coalesce.precedence() < BinaryOperator::Or.precedence());
    }

    #[test]
    fn test_comment_owners() {
        let list = Node::new(0, TokenSpan::new(0, 2), NodeKind::NodeList(Vec::new()));
        assert!(!list.accepts_comments());
        assert!(ident(1, 0, "a").accepts_comments());
        assert!(!Node::new(2, TokenSpan::empty(0), NodeKind::Empty).accepts_comments());
    }
}
