//! Core traits and types for CST nodes.
//!
//! # Node identity
//!
//! [`NodeId`] gives every expression and statement node a stable identity.
//! Ids are assigned in pre-order during parsing (parent before children,
//! left to right), so the same source always produces the same assignment.
//! Side tables in the instrumenter (the mark set, substitution plans) key
//! on NodeIds instead of holding references into the tree.
//!
//! # Code generation
//!
//! [`Codegen`] turns a node back into source text. Every node owns its
//! tokens, and each token carries its exact leading trivia, so printing an
//! unmodified tree reproduces the input byte-for-byte. Synthesized nodes
//! carry explicit trivia chosen by their factory.

use crate::tokenizer::Token;

/// A stable, unique identifier for a CST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Generator for assigning sequential [`NodeId`]s.
#[derive(Debug, Default, Clone)]
pub struct NodeIdGenerator {
    next_id: u32,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn count(&self) -> u32 {
        self.next_id
    }
}

/// Accumulates generated source text, or bare token texts when built with
/// [`CodegenState::collecting`].
#[derive(Debug, Default)]
pub struct CodegenState {
    out: String,
    texts: Option<Vec<String>>,
}

impl CodegenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect token texts without trivia, for normalized rendering.
    pub fn collecting() -> Self {
        Self {
            out: String::new(),
            texts: Some(Vec::new()),
        }
    }

    /// Append a token: leading trivia, then the token text.
    pub fn tok(&mut self, token: &Token) {
        if let Some(texts) = &mut self.texts {
            texts.push(token.text.clone());
        } else {
            self.out.push_str(&token.leading);
            self.out.push_str(&token.text);
        }
    }

    /// Append raw text (used only by generated-runtime emission).
    pub fn raw(&mut self, text: &str) {
        if let Some(texts) = &mut self.texts {
            texts.push(text.to_string());
        } else {
            self.out.push_str(text);
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.texts {
            Some(texts) => texts.is_empty(),
            None => self.out.is_empty(),
        }
    }

    pub fn into_texts(self) -> Vec<String> {
        self.texts.unwrap_or_default()
    }
}

impl std::fmt::Display for CodegenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.out)
    }
}

/// Convert a CST node back into source text.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

impl<T: Codegen> Codegen for Box<T> {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state)
    }
}

impl<T: Codegen> Codegen for Option<T> {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(node) = self {
            node.codegen(state)
        }
    }
}

impl Codegen for Token {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(self)
    }
}

/// Render a node to a standalone string.
pub fn to_source<T: Codegen>(node: &T) -> String {
    let mut state = CodegenState::new();
    node.codegen(&mut state);
    state.to_string()
}

/// Collect a node's token texts in order, without trivia.
pub fn token_texts<T: Codegen>(node: &T) -> Vec<String> {
    let mut state = CodegenState::collecting();
    node.codegen(&mut state);
    state.into_texts()
}
