//! Rowan language implementation for GML
//!
//! Connects `GmlSyntaxKind` to Rowan's generic CST infrastructure.

use rowan::Language;

use super::GmlSyntaxKind;

/// Zero-sized language marker for GameMaker Language trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GmlLanguage;

impl Language for GmlLanguage {
    type Kind = GmlSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        GmlSyntaxKind::from_raw(raw.0).unwrap_or(GmlSyntaxKind::Unknown)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            GmlSyntaxKind::Whitespace,
            GmlSyntaxKind::IfKw,
            GmlSyntaxKind::Ident,
            GmlSyntaxKind::Colon,
            GmlSyntaxKind::Program,
            GmlSyntaxKind::LValueExpr,
        ];

        for &kind in &kinds {
            let raw = GmlLanguage::kind_to_raw(kind);
            let back = GmlLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_unknown_raw_kind() {
        let back = GmlLanguage::kind_from_raw(rowan::SyntaxKind(u16::MAX));
        assert_eq!(back, GmlSyntaxKind::Unknown);
    }
}
