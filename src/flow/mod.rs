//! Basic blocks, the two-pass graph builder, and the resulting flow graph.
//!
//! Construction takes an ordered instruction stream plus an exception region
//! list and produces a [`FlowGraph`]: an arena of [`BasicBlock`]s addressed by
//! [`BlockId`], an offset index, and a root sequence covering the method entry
//! and every handler/filter entry point. See
//! [`FlowGraphBuilder`] for the construction algorithm and its failure modes.
//!
//! One builder invocation is fully synchronous and owns its working state, so
//! many method bodies can be built in parallel; [`build_graphs`] does exactly
//! that over a batch.

mod block;
mod builder;
mod graph;

pub use block::{BasicBlock, BlockId};
pub use builder::FlowGraphBuilder;
pub use graph::{Bfs, FlowGraph};

use rayon::prelude::*;

use crate::{method::MethodBody, Result};

/// Builds flow graphs for a batch of method bodies in parallel.
///
/// Results are returned in input order. Construction failures are per-body:
/// one malformed method does not stop the rest of the batch, matching how
/// assembly-wide tooling processes methods.
///
/// # Examples
///
/// ```rust
/// use cilflow::{flow::build_graphs, MethodBody};
///
/// let bodies = vec![
///     MethodBody::from_il(&[0x00, 0x2A], vec![])?,
///     MethodBody::from_il(&[0x2D, 0x01, 0x2A, 0x2A], vec![])?,
/// ];
/// let graphs = build_graphs(bodies);
///
/// assert_eq!(graphs.len(), 2);
/// assert_eq!(graphs[0].as_ref().map(|g| g.block_count()), Ok(1));
/// assert_eq!(graphs[1].as_ref().map(|g| g.block_count()), Ok(3));
/// # Ok::<(), cilflow::Error>(())
/// ```
#[must_use]
pub fn build_graphs(bodies: Vec<MethodBody>) -> Vec<Result<FlowGraph>> {
    bodies
        .into_par_iter()
        .map(MethodBody::into_flow_graph)
        .collect()
}
