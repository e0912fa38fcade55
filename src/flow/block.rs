//! Basic block representation.

use std::ops::Range;

/// Handle identifying a basic block within its [`FlowGraph`](crate::FlowGraph).
///
/// Blocks reference each other only by `BlockId`, never by owning pointer; the
/// graph may be cyclic without any ownership cycle. Ids are dense indices into
/// the graph's block arena, assigned in boundary discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// Creates a block id from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index of this block.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// A maximal run of instructions with a single entry point and no internal
/// control transfer.
///
/// A block records its starting offset and where its instruction and successor
/// slices live inside the backing storage owned by the graph; the actual slices
/// are obtained through [`FlowGraph::instructions`](crate::FlowGraph::instructions)
/// and [`FlowGraph::successors`](crate::FlowGraph::successors). Blocks are
/// created during construction and immutable afterwards.
///
/// The successor list is unique: no target block appears twice, and order
/// reflects first-discovered order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    /// Offset of the block's first instruction.
    pub(crate) offset: u32,
    /// Range of this block's instructions in the graph's instruction storage.
    pub(crate) instructions: Range<usize>,
    /// Range of this block's successor ids in the graph's edge storage.
    pub(crate) successors: Range<usize>,
}

impl BasicBlock {
    pub(crate) const fn placeholder(offset: u32) -> Self {
        Self {
            offset,
            instructions: 0..0,
            successors: 0..0,
        }
    }

    /// Offset of the block's first instruction within the method body.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of instructions in this block.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Number of successor edges leaving this block.
    #[must_use]
    pub fn successor_count(&self) -> usize {
        self.successors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_display() {
        assert_eq!(BlockId::new(3).to_string(), "B3");
        assert_eq!(BlockId::new(3).index(), 3);
    }

    #[test]
    fn placeholder_is_empty() {
        let block = BasicBlock::placeholder(16);
        assert_eq!(block.offset(), 16);
        assert_eq!(block.instruction_count(), 0);
        assert_eq!(block.successor_count(), 0);
    }
}
