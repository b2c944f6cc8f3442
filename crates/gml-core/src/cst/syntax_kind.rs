//! Syntax kind enumeration for the GML CST
//!
//! Every token and every parse-tree node carries one of these kinds. Token
//! kinds come first, node kinds after `Eof`.

use std::fmt;

macro_rules! syntax_kinds {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        /// Syntax kind for GML language elements
        ///
        /// This enum covers:
        /// - Trivia (whitespace, newlines, comments)
        /// - Keywords and keyword operators
        /// - Literals, identifiers and directives
        /// - Punctuation and operators
        /// - Structural nodes produced by the parser
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum GmlSyntaxKind {
            $($(#[$meta])* $name),*
        }

        impl GmlSyntaxKind {
            const ALL: &'static [GmlSyntaxKind] = &[$(GmlSyntaxKind::$name),*];

            /// Map a raw rowan kind back to a syntax kind
            pub fn from_raw(raw: u16) -> Option<Self> {
                Self::ALL.get(raw as usize).copied()
            }
        }
    };
}

syntax_kinds! {
    // ==================
    // Trivia
    // ==================
    /// Spaces and tabs
    Whitespace,
    /// `\n`, `\r\n` or `\r`
    Newline,
    /// Line comment starting with //
    CommentLine,
    /// Block comment /* ... */
    CommentBlock,

    // ==================
    // Keywords
    // ==================
    IfKw,
    ThenKw,
    ElseKw,
    WhileKw,
    DoKw,
    UntilKw,
    ForKw,
    RepeatKw,
    WithKw,
    SwitchKw,
    CaseKw,
    DefaultKw,
    BreakKw,
    ContinueKw,
    ExitKw,
    ReturnKw,
    VarKw,
    StaticKw,
    GlobalvarKw,
    FunctionKw,
    ConstructorKw,
    NewKw,
    DeleteKw,
    ThrowKw,
    TryKw,
    CatchKw,
    FinallyKw,
    EnumKw,
    /// `begin`, synonym of `{`
    BeginKw,
    /// `end`, synonym of `}`
    EndKw,
    /// `and`, synonym of `&&`
    AndKw,
    /// `or`, synonym of `||`
    OrKw,
    /// `xor`, synonym of `^^`
    XorKw,
    /// `not`, synonym of `!`
    NotKw,
    /// `mod`, synonym of `%`
    ModKw,
    /// `div` integer division
    DivKw,
    TrueKw,
    FalseKw,
    UndefinedKw,
    NooneKw,

    // ==================
    // Literals, names and directives
    // ==================
    Ident,
    /// Decimal number, `12`, `1.5`, `.5`, `1_000`
    NumberLiteral,
    /// `0xFF`, `$FF` or `#RRGGBB`
    HexLiteral,
    /// `0b1010`
    BinaryLiteral,
    /// `"..."` with escapes
    StringLiteral,
    /// `@"..."` or `@'...'`
    VerbatimStringLiteral,
    /// `$"` opening a template string
    TemplateStart,
    /// Literal text between template splices
    TemplateText,
    /// `{` opening a template splice
    TemplateSpliceStart,
    /// `}` closing a template splice
    TemplateSpliceEnd,
    /// `"` closing a template string
    TemplateEnd,
    /// Whole `#macro` line, continuation lines included
    MacroDirective,
    /// Whole `#region` line
    RegionDirective,
    /// Whole `#endregion` line
    EndRegionDirective,
    /// Whole `#define` line
    DefineDirective,

    // ==================
    // Punctuation
    // ==================
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    /// `[|` list accessor
    ListAccessor,
    /// `[?` map accessor
    MapAccessor,
    /// `[#` grid accessor
    GridAccessor,
    /// `[@` array reference accessor
    ArrayAccessor,
    /// `[$` struct accessor
    StructAccessor,

    // ==================
    // Operators
    // ==================
    Eq,
    /// `:=`, synonym of `=`
    ColonEq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    QuestionQuestionEq,
    EqEq,
    BangEq,
    /// `<>`, synonym of `!=`
    LtGt,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AmpAmp,
    PipePipe,
    CaretCaret,
    QuestionQuestion,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,

    // ==================
    // Special
    // ==================
    /// End of input marker
    Eof,

    // ==================
    // Nodes
    // ==================
    Program,
    StatementList,
    Block,
    EmptyStatement,
    IfStatement,
    ElseClause,
    DoStatement,
    WhileStatement,
    ForStatement,
    ForInit,
    ForTest,
    ForUpdate,
    RepeatStatement,
    WithStatement,
    SwitchStatement,
    CaseBlock,
    CaseClause,
    DefaultClause,
    ContinueStatement,
    BreakStatement,
    ExitStatement,
    ReturnStatement,
    ThrowStatement,
    DeleteStatement,
    TryStatement,
    CatchClause,
    FinallyClause,
    VariableDeclarationList,
    VariableDeclaration,
    GlobalVarStatement,
    FunctionDeclaration,
    InheritanceClause,
    ParameterList,
    Parameter,
    EnumDeclaration,
    EnumMember,
    MacroStatement,
    RegionStatement,
    EndRegionStatement,
    DefineStatement,
    AssignmentStatement,
    ExpressionStatement,
    TernaryExpr,
    BinaryExpr,
    UnaryExpr,
    PreIncDecExpr,
    PostIncDecExpr,
    /// A start expression followed by chain operators
    LValueExpr,
    MemberDotOp,
    MemberIndexOp,
    CallOp,
    Arguments,
    ParenExpr,
    NewExpr,
    LiteralExpr,
    IdentifierExpr,
    ArrayLiteral,
    StructLiteral,
    StructProperty,
    TemplateString,
    TemplateSplice,
    FunctionExpr,
    /// Raw kind outside this enum
    Unknown,
}

impl GmlSyntaxKind {
    /// Check if this kind is trivia (hidden channel)
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::CommentLine | Self::CommentBlock
        )
    }

    /// Check if this kind is a comment
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::CommentLine | Self::CommentBlock)
    }

    /// Check if this kind is a keyword (including keyword operators and literals)
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= (Self::IfKw as u16) && (self as u16) <= (Self::NooneKw as u16)
    }

    /// Check if this kind is a parse-tree node rather than a token
    pub const fn is_node(self) -> bool {
        (self as u16) >= (Self::Program as u16)
    }

    /// Check if this kind is an assignment operator
    pub const fn is_assignment_op(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::ColonEq
                | Self::PlusEq
                | Self::MinusEq
                | Self::StarEq
                | Self::SlashEq
                | Self::PercentEq
                | Self::AmpEq
                | Self::PipeEq
                | Self::CaretEq
                | Self::ShlEq
                | Self::ShrEq
                | Self::QuestionQuestionEq
        )
    }

    /// Check if this kind opens an index access (`[` or an accessor)
    pub const fn is_index_open(self) -> bool {
        matches!(
            self,
            Self::LBracket
                | Self::ListAccessor
                | Self::MapAccessor
                | Self::GridAccessor
                | Self::ArrayAccessor
                | Self::StructAccessor
        )
    }

    /// Get the keyword kind for an identifier-shaped word
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "if" => Self::IfKw,
            "then" => Self::ThenKw,
            "else" => Self::ElseKw,
            "while" => Self::WhileKw,
            "do" => Self::DoKw,
            "until" => Self::UntilKw,
            "for" => Self::ForKw,
            "repeat" => Self::RepeatKw,
            "with" => Self::WithKw,
            "switch" => Self::SwitchKw,
            "case" => Self::CaseKw,
            "default" => Self::DefaultKw,
            "break" => Self::BreakKw,
            "continue" => Self::ContinueKw,
            "exit" => Self::ExitKw,
            "return" => Self::ReturnKw,
            "var" => Self::VarKw,
            "static" => Self::StaticKw,
            "globalvar" => Self::GlobalvarKw,
            "function" => Self::FunctionKw,
            "constructor" => Self::ConstructorKw,
            "new" => Self::NewKw,
            "delete" => Self::DeleteKw,
            "throw" => Self::ThrowKw,
            "try" => Self::TryKw,
            "catch" => Self::CatchKw,
            "finally" => Self::FinallyKw,
            "enum" => Self::EnumKw,
            "begin" => Self::BeginKw,
            "end" => Self::EndKw,
            "and" => Self::AndKw,
            "or" => Self::OrKw,
            "xor" => Self::XorKw,
            "not" => Self::NotKw,
            "mod" => Self::ModKw,
            "div" => Self::DivKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "undefined" => Self::UndefinedKw,
            "noone" => Self::NooneKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Human readable description used in parse errors
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ident => "identifier",
            Self::NumberLiteral | Self::HexLiteral | Self::BinaryLiteral => "number",
            Self::StringLiteral | Self::VerbatimStringLiteral => "string",
            Self::TemplateStart => "template string",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Semicolon => "';'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Question => "'?'",
            Self::Eq => "'='",
            Self::Eof => "end of file",
            Self::IfKw => "'if'",
            Self::ElseKw => "'else'",
            Self::WhileKw => "'while'",
            Self::UntilKw => "'until'",
            Self::CaseKw => "'case'",
            Self::DefaultKw => "'default'",
            Self::CatchKw => "'catch'",
            Self::FunctionKw => "'function'",
            Self::ConstructorKw => "'constructor'",
            Self::EndKw => "'end'",
            _ => "token",
        }
    }
}

impl fmt::Display for GmlSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<GmlSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: GmlSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(GmlSyntaxKind::Whitespace.is_trivia());
        assert!(GmlSyntaxKind::CommentBlock.is_trivia());
        assert!(!GmlSyntaxKind::Ident.is_trivia());
        assert!(!GmlSyntaxKind::Eof.is_trivia());
    }

    #[test]
    fn test_keyword_classification() {
        assert!(GmlSyntaxKind::IfKw.is_keyword());
        assert!(GmlSyntaxKind::NooneKw.is_keyword());
        assert!(!GmlSyntaxKind::Ident.is_keyword());
        assert_eq!(GmlSyntaxKind::from_keyword("mod"), Some(GmlSyntaxKind::ModKw));
        assert_eq!(GmlSyntaxKind::from_keyword("Mod"), None);
    }

    #[test]
    fn test_raw_round_trip() {
        for kind in [
            GmlSyntaxKind::Whitespace,
            GmlSyntaxKind::Eof,
            GmlSyntaxKind::Program,
            GmlSyntaxKind::FunctionExpr,
        ] {
            assert_eq!(GmlSyntaxKind::from_raw(kind as u16), Some(kind));
        }
        assert_eq!(GmlSyntaxKind::from_raw(u16::MAX), None);
    }

    #[test]
    fn test_node_classification() {
        assert!(GmlSyntaxKind::Program.is_node());
        assert!(GmlSyntaxKind::BinaryExpr.is_node());
        assert!(!GmlSyntaxKind::Eof.is_node());
    }
}
