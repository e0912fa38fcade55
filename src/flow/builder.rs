//! Two-pass flow graph construction.
//!
//! Basic block boundaries can be forced by instructions occurring later in the
//! stream than the block they terminate (forward branches), so the stream
//! cannot be sliced in a single pass. [`FlowGraphBuilder`] therefore runs two
//! linear passes:
//!
//! 1. **Boundary discovery** collects every offset that must start a block:
//!    branch, `leave`, and switch targets, the offset following any control
//!    transfer, exception region boundaries, and offset 0. Registration is
//!    idempotent. All targets are validated against the instruction stream
//!    here, so the second pass cannot encounter a dangling offset.
//! 2. **Slicing and edge building** walks the stream again, closing the
//!    current block at each boundary and recording successor edges, with
//!    fallthrough edges synthesized wherever the closing instruction does not
//!    suppress fallthrough (unconditional transfers and `switch` do).

use std::collections::{HashMap, HashSet};

use crate::{
    flow::{BasicBlock, BlockId, FlowGraph},
    il::{FlowType, Instruction},
    method::ExceptionRegion,
    Error, Result,
};

/// Builds a [`FlowGraph`] from an instruction stream and its exception regions.
///
/// Construction is all-or-nothing: any malformed operand, dangling target, or
/// out-of-stream region boundary aborts the build and no partial graph is
/// returned. Each invocation owns its working buffers, so independent method
/// bodies can be built concurrently.
///
/// # Examples
///
/// ```rust
/// use cilflow::{FlowGraphBuilder, MethodBody};
///
/// // brtrue.s +1; ret; ret
/// let body = MethodBody::from_il(&[0x2D, 0x01, 0x2A, 0x2A], vec![])?;
/// let graph = FlowGraphBuilder::build(body.instructions().to_vec(), body.exception_regions())?;
/// assert_eq!(graph.block_count(), 3);
/// # Ok::<(), cilflow::Error>(())
/// ```
pub struct FlowGraphBuilder;

impl FlowGraphBuilder {
    /// Builds the flow graph, taking ownership of the instruction stream.
    ///
    /// The stream must be ordered with monotonically increasing offsets, as
    /// produced by [`decode_stream`](crate::il::decode_stream).
    ///
    /// # Errors
    ///
    /// - [`Error::Empty`] if the instruction stream has no instructions
    /// - [`Error::MalformedOperand`] if a branch or switch instruction does
    ///   not carry an operand of the expected shape
    /// - [`Error::InvalidTarget`] if a branch or switch target is not the
    ///   offset of an instruction in the stream
    /// - [`Error::InvalidRegion`] if an exception region boundary is not the
    ///   offset of an instruction (the exclusive `handler_end` may also equal
    ///   the end of the stream)
    pub fn build(instructions: Vec<Instruction>, regions: &[ExceptionRegion]) -> Result<FlowGraph> {
        let Some(last) = instructions.last() else {
            return Err(Error::Empty);
        };
        let end_offset = last.next_offset();
        let offsets: Vec<u32> = instructions.iter().map(|i| i.offset).collect();

        let (boundaries, roots) =
            Self::discover_boundaries(&instructions, regions, &offsets, end_offset)?;

        // Allocate one block per boundary, in stream order so ids follow offsets.
        let mut blocks: Vec<BasicBlock> = Vec::with_capacity(boundaries.len());
        let mut by_offset: HashMap<u32, BlockId> = HashMap::with_capacity(boundaries.len());
        for instruction in &instructions {
            if boundaries.contains(&instruction.offset) {
                by_offset.insert(instruction.offset, BlockId::new(blocks.len()));
                blocks.push(BasicBlock::placeholder(instruction.offset));
            }
        }

        let edges = Self::build_edges(&instructions, &mut blocks, &by_offset)?;

        let root_ids = roots
            .iter()
            .map(|offset| Self::lookup(&by_offset, *offset, *offset))
            .collect::<Result<Vec<BlockId>>>()?;

        Ok(FlowGraph::new(instructions, blocks, edges, by_offset, root_ids))
    }

    /// Pass 1: collects all block boundary offsets and the root offsets.
    ///
    /// Roots are ordered: entry offset first, then each region's handler start
    /// followed by its filter decision start, in region-list order, without
    /// duplicates.
    fn discover_boundaries(
        instructions: &[Instruction],
        regions: &[ExceptionRegion],
        offsets: &[u32],
        end_offset: u32,
    ) -> Result<(HashSet<u32>, Vec<u32>)> {
        let mut boundaries = HashSet::new();
        let mut roots = vec![offsets[0]];
        boundaries.insert(offsets[0]);

        for instruction in instructions {
            if instruction.flow_type.has_branch_target() {
                let target = instruction.branch_target()?;
                Self::check_target(offsets, instruction.offset, target)?;
                boundaries.insert(target);
            } else if instruction.flow_type == FlowType::Switch {
                for &target in instruction.switch_targets()? {
                    Self::check_target(offsets, instruction.offset, target)?;
                    boundaries.insert(target);
                }
            }

            // The instruction following any control transfer starts a block:
            // it is either reachable from two control paths or begins a region
            // not reachable by fallthrough at all.
            if instruction.flow_type.ends_block() && instruction.next_offset() != end_offset {
                boundaries.insert(instruction.next_offset());
            }
        }

        for region in regions {
            Self::check_region_offset(offsets, "try start", region.try_start())?;
            boundaries.insert(region.try_start());

            Self::check_region_offset(offsets, "handler start", region.handler_start())?;
            boundaries.insert(region.handler_start());
            if !roots.contains(&region.handler_start()) {
                roots.push(region.handler_start());
            }

            if let Some(filter_start) = region.filter_start() {
                Self::check_region_offset(offsets, "filter start", filter_start)?;
                boundaries.insert(filter_start);
                if !roots.contains(&filter_start) {
                    roots.push(filter_start);
                }
            }

            // handler_end is exclusive, so a handler running to the end of the
            // stream closes without materializing a block past the last
            // instruction.
            if region.handler_end() != end_offset {
                Self::check_region_offset(offsets, "handler end", region.handler_end())?;
                boundaries.insert(region.handler_end());
            }
        }

        Ok((boundaries, roots))
    }

    /// Pass 2: slices the stream at the discovered boundaries and records
    /// successor edges per block.
    ///
    /// Returns the shared edge storage; each block's `successors` range points
    /// into it. Successor lists are deduplicated with first occurrence winning.
    fn build_edges(
        instructions: &[Instruction],
        blocks: &mut [BasicBlock],
        by_offset: &HashMap<u32, BlockId>,
    ) -> Result<Vec<BlockId>> {
        let mut edges: Vec<BlockId> = Vec::new();
        let mut current = BlockId::new(0);
        let mut instr_start = 0;
        let mut edge_start = 0;
        let mut no_fallthrough = false;

        for (index, instruction) in instructions.iter().enumerate() {
            if let Some(&block) = by_offset.get(&instruction.offset) {
                if block != current {
                    if !no_fallthrough && !edges[edge_start..].contains(&block) {
                        edges.push(block);
                    }
                    blocks[current.index()].instructions = instr_start..index;
                    blocks[current.index()].successors = edge_start..edges.len();
                    current = block;
                    instr_start = index;
                    edge_start = edges.len();
                }
            }

            no_fallthrough = instruction.flow_type.suppresses_fallthrough();

            if instruction.flow_type.has_branch_target() {
                let target =
                    Self::lookup(by_offset, instruction.offset, instruction.branch_target()?)?;
                if !edges[edge_start..].contains(&target) {
                    edges.push(target);
                }
            } else if instruction.flow_type == FlowType::Switch {
                for &offset in instruction.switch_targets()? {
                    let target = Self::lookup(by_offset, instruction.offset, offset)?;
                    // A repeated case label means the remaining table entries
                    // are already covered; stop rather than rescan.
                    if edges[edge_start..].contains(&target) {
                        break;
                    }
                    edges.push(target);
                }
            }
        }

        blocks[current.index()].instructions = instr_start..instructions.len();
        blocks[current.index()].successors = edge_start..edges.len();

        Ok(edges)
    }

    /// Validates that `target` is the offset of an instruction in the stream.
    ///
    /// `offsets` is sorted because the stream is offset-increasing, so a
    /// binary search suffices.
    fn check_target(offsets: &[u32], offset: u32, target: u32) -> Result<()> {
        if offsets.binary_search(&target).is_ok() {
            Ok(())
        } else {
            Err(Error::InvalidTarget { offset, target })
        }
    }

    fn check_region_offset(offsets: &[u32], what: &str, boundary: u32) -> Result<()> {
        if offsets.binary_search(&boundary).is_ok() {
            Ok(())
        } else {
            Err(Error::InvalidRegion(format!(
                "{what} IL_{boundary:04X} is not an instruction offset"
            )))
        }
    }

    fn lookup(by_offset: &HashMap<u32, BlockId>, offset: u32, target: u32) -> Result<BlockId> {
        by_offset
            .get(&target)
            .copied()
            .ok_or(Error::InvalidTarget { offset, target })
    }
}
