//! The control flow graph produced by [`FlowGraphBuilder`](crate::flow::FlowGraphBuilder).

use std::collections::{HashMap, VecDeque};
use std::fmt::Write;

use crate::{
    flow::{BasicBlock, BlockId},
    il::Instruction,
    utils::escape_dot,
};

/// A control flow graph over one method body.
///
/// The graph owns the instruction stream, the block arena, and the shared edge
/// storage; blocks expose their instruction and successor lists as read-only
/// slices into that storage. Everything is immutable after construction, so a
/// finished graph can be shared across threads freely.
///
/// Blocks are addressed by [`BlockId`] or looked up by the offset of their
/// first instruction through [`FlowGraph::block_at`]. The root sequence starts
/// with the method entry block and continues with one root per exception
/// handler and filter entry, in region-list order.
///
/// # Examples
///
/// ```rust
/// use cilflow::MethodBody;
///
/// // brtrue.s +1; ret; ret
/// let graph = MethodBody::from_il(&[0x2D, 0x01, 0x2A, 0x2A], vec![])?.into_flow_graph()?;
///
/// let entry = graph.entry();
/// assert_eq!(graph.successors(entry).len(), 2);
/// for id in graph.bfs() {
///     println!("{id} @ IL_{:04X}", graph.block(id).map_or(0, |b| b.offset()));
/// }
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FlowGraph {
    instructions: Vec<Instruction>,
    blocks: Vec<BasicBlock>,
    edges: Vec<BlockId>,
    by_offset: HashMap<u32, BlockId>,
    roots: Vec<BlockId>,
}

impl FlowGraph {
    pub(crate) fn new(
        instructions: Vec<Instruction>,
        blocks: Vec<BasicBlock>,
        edges: Vec<BlockId>,
        by_offset: HashMap<u32, BlockId>,
        roots: Vec<BlockId>,
    ) -> Self {
        Self {
            instructions,
            blocks,
            edges,
            by_offset,
            roots,
        }
    }

    /// The method entry block, always the first root.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        self.roots[0]
    }

    /// The root blocks: method entry first, then one per exception handler
    /// start and filter decision start, in region-list order.
    #[must_use]
    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    /// Returns the block for `id`, or `None` if the id belongs to a different
    /// graph.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Looks up the block starting at `offset`.
    ///
    /// Only offsets that begin a block resolve; all other offsets return
    /// `None`.
    #[must_use]
    pub fn block_at(&self, offset: u32) -> Option<BlockId> {
        self.by_offset.get(&offset).copied()
    }

    /// The instruction slice of a block, in offset order.
    ///
    /// Returns an empty slice for an id from a different graph.
    #[must_use]
    pub fn instructions(&self, id: BlockId) -> &[Instruction] {
        self.blocks
            .get(id.index())
            .map_or(&[], |block| &self.instructions[block.instructions.clone()])
    }

    /// The successor list of a block, unique and in first-discovered order.
    ///
    /// Returns an empty slice for an id from a different graph.
    #[must_use]
    pub fn successors(&self, id: BlockId) -> &[BlockId] {
        self.blocks
            .get(id.index())
            .map_or(&[], |block| &self.edges[block.successors.clone()])
    }

    /// Number of basic blocks in the graph.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of instructions across all blocks.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Total number of successor edges across all blocks.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all blocks with their ids, in stream order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (BlockId::new(index), block))
    }

    /// Performs a breadth-first traversal from all roots.
    ///
    /// Roots are seeded in root order, so the method entry block is always
    /// yielded first and handler/filter entries follow before anything only
    /// they can reach. Each block is yielded exactly once; blocks unreachable
    /// from every root are not visited.
    pub fn bfs(&self) -> Bfs<'_> {
        let mut visited = vec![false; self.blocks.len()];
        let mut queue = VecDeque::with_capacity(self.roots.len());
        for &root in &self.roots {
            if !visited[root.index()] {
                visited[root.index()] = true;
                queue.push_back(root);
            }
        }
        Bfs {
            graph: self,
            visited,
            queue,
        }
    }

    /// Renders the graph in Graphviz DOT format.
    ///
    /// Each block becomes one box node listing its instructions; edges follow
    /// the successor lists. Pass a title to label the graph, typically the
    /// method name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilflow::MethodBody;
    ///
    /// let graph = MethodBody::from_il(&[0x00, 0x2A], vec![])?.into_flow_graph()?;
    /// let dot = graph.to_dot(Some("Main"));
    /// assert!(dot.starts_with("digraph CFG {"));
    /// # Ok::<(), cilflow::Error>(())
    /// ```
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        for (id, block) in self.blocks() {
            let node_name = format!("B{}_{:04X}", id.index(), block.offset());
            let mut label = node_name.clone();
            if id == self.entry() {
                label.push_str(" (entry)");
            } else if self.roots.contains(&id) {
                label.push_str(" (handler)");
            }
            label.push_str("\\l");

            for instruction in self.instructions(id) {
                let _ = write!(
                    label,
                    "{:04X}: {}\\l",
                    instruction.offset,
                    escape_dot(instruction.mnemonic)
                );
            }

            let _ = writeln!(dot, "    {node_name} [label=\"{label}\"];");
        }

        dot.push('\n');
        for (id, block) in self.blocks() {
            let from = format!("B{}_{:04X}", id.index(), block.offset());
            for &successor in self.successors(id) {
                if let Some(target) = self.block(successor) {
                    let _ = writeln!(
                        dot,
                        "    {from} -> B{}_{:04X};",
                        successor.index(),
                        target.offset()
                    );
                }
            }
        }

        dot.push_str("}\n");
        dot
    }
}

/// Breadth-first block traversal, created by [`FlowGraph::bfs`].
pub struct Bfs<'a> {
    graph: &'a FlowGraph,
    visited: Vec<bool>,
    queue: VecDeque<BlockId>,
}

impl Iterator for Bfs<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let id = self.queue.pop_front()?;
        for &successor in self.graph.successors(id) {
            if !self.visited[successor.index()] {
                self.visited[successor.index()] = true;
                self.queue.push_back(successor);
            }
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{ExceptionRegion, MethodBody};

    fn graph(il: &[u8], regions: Vec<ExceptionRegion>) -> FlowGraph {
        MethodBody::from_il(il, regions)
            .unwrap()
            .into_flow_graph()
            .unwrap()
    }

    #[test]
    fn offset_index_only_resolves_block_starts() {
        // brtrue.s +1; ret; ret
        let graph = graph(&[0x2D, 0x01, 0x2A, 0x2A], vec![]);
        assert!(graph.block_at(0).is_some());
        assert!(graph.block_at(2).is_some());
        assert!(graph.block_at(3).is_some());
        assert!(graph.block_at(1).is_none());
        assert!(graph.block_at(100).is_none());
    }

    #[test]
    fn foreign_id_is_harmless() {
        let graph = graph(&[0x00, 0x2A], vec![]);
        let foreign = BlockId::new(42);
        assert!(graph.block(foreign).is_none());
        assert!(graph.instructions(foreign).is_empty());
        assert!(graph.successors(foreign).is_empty());
    }

    #[test]
    fn bfs_visits_reachable_blocks_once() {
        // IL_0000 nop; IL_0001 brtrue.s -> IL_0000; IL_0003 ret
        let graph = graph(&[0x00, 0x2D, 0xFD, 0x2A], vec![]);
        let order: Vec<BlockId> = graph.bfs().collect();
        assert_eq!(order.len(), graph.block_count());
        assert_eq!(order[0], graph.entry());
    }

    #[test]
    fn bfs_reaches_handler_only_code() {
        // try [0, 3): nop; leave.s IL_0004; handler [3, 4): ret; IL_0004 ret
        let il = [0x00, 0xDE, 0x01, 0x2A, 0x2A];
        let region = ExceptionRegion::typed(0, 3, 3, 4).unwrap();
        let graph = graph(&il, vec![region]);

        // The handler block has no inbound edge but is a root, so BFS finds it.
        let order: Vec<BlockId> = graph.bfs().collect();
        assert!(order.contains(&graph.block_at(3).unwrap()));
        assert_eq!(order[0], graph.entry());
    }

    #[test]
    fn bfs_round_trip_reproduces_stream() {
        let il = [
            0x2D, 0x03, // IL_0000 brtrue.s -> IL_0005
            0x00, // IL_0002 nop
            0x2B, 0x01, // IL_0003 br.s -> IL_0006
            0x2A, // IL_0005 ret
            0x2A, // IL_0006 ret
        ];
        let graph = graph(&il, vec![]);

        let mut blocks: Vec<BlockId> = graph.bfs().collect();
        blocks.sort_by_key(|&id| graph.block(id).map(BasicBlock::offset));

        let replayed: Vec<u32> = blocks
            .iter()
            .flat_map(|&id| graph.instructions(id))
            .map(|instruction| instruction.offset)
            .collect();
        assert_eq!(replayed, vec![0, 2, 3, 5, 6]);
        assert_eq!(
            replayed.len(),
            graph.instruction_count(),
            "no instruction duplicated or omitted"
        );
    }

    #[test]
    fn dot_output_contains_nodes_and_edges() {
        let graph = graph(&[0x2D, 0x01, 0x2A, 0x2A], vec![]);
        let dot = graph.to_dot(Some("Sample<T>"));

        assert!(dot.starts_with("digraph CFG {"));
        assert!(dot.contains("Sample\\<T\\>"));
        assert!(dot.contains("B0_0000"));
        assert!(dot.contains("(entry)"));
        assert!(dot.contains("->"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn counts() {
        let graph = graph(&[0x2D, 0x01, 0x2A, 0x2A], vec![]);
        assert_eq!(graph.block_count(), 3);
        assert_eq!(graph.instruction_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.blocks().count(), 3);
    }
}
