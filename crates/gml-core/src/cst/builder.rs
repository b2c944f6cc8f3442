//! Green tree builder
//!
//! Wraps `rowan::GreenNodeBuilder` with `GmlSyntaxKind`-typed methods so the
//! parser never deals with raw kinds.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use super::GmlSyntaxKind;

/// Builder used by the parser to assemble the green tree
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a node; every call must be matched by `finish_node`
    pub fn start_node(&mut self, kind: GmlSyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Open a node that wraps everything added since `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: GmlSyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn token(&mut self, kind: GmlSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn finish(self) -> GreenNode {
        self.inner.finish()
    }
}
