//! Public types for tokenizer configuration

/// Which side of a sequence padding tokens are added to.
///
/// Causal generation over a batch requires `Left` so that every sequence
/// ends at the same position and generation continues from real tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingSide {
    #[default]
    Left,
    Right,
}
