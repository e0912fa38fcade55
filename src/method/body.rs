//! Method body representation.

use crate::{
    flow::{FlowGraph, FlowGraphBuilder},
    il::{decode_stream, Instruction, Parser},
    method::ExceptionRegion,
    Result,
};

/// A method body: the decoded instruction stream plus its exception regions.
///
/// `MethodBody` is the unit of flow graph construction. It can wrap an already
/// decoded instruction stream ([`MethodBody::new`]) or decode one from raw IL
/// bytes ([`MethodBody::from_il`]).
///
/// # Examples
///
/// ```rust
/// use cilflow::MethodBody;
///
/// let body = MethodBody::from_il(&[0x00, 0x2A], vec![])?; // nop, ret
/// assert_eq!(body.instructions().len(), 2);
///
/// let graph = body.into_flow_graph()?;
/// assert_eq!(graph.block_count(), 1);
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MethodBody {
    instructions: Vec<Instruction>,
    exception_regions: Vec<ExceptionRegion>,
}

impl MethodBody {
    /// Wraps an already decoded instruction stream.
    ///
    /// The stream must be ordered with monotonically increasing offsets;
    /// inconsistencies surface during graph construction, not here.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>, exception_regions: Vec<ExceptionRegion>) -> Self {
        Self {
            instructions,
            exception_regions,
        }
    }

    /// Decodes a method body from raw IL bytes.
    ///
    /// # Errors
    ///
    /// Any decoding error from [`decode_stream`].
    pub fn from_il(il: &[u8], exception_regions: Vec<ExceptionRegion>) -> Result<Self> {
        let mut parser = Parser::new(il);
        Ok(Self {
            instructions: decode_stream(&mut parser)?,
            exception_regions,
        })
    }

    /// The decoded instruction stream, in offset order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The exception region list, in clause order.
    #[must_use]
    pub fn exception_regions(&self) -> &[ExceptionRegion] {
        &self.exception_regions
    }

    /// Builds the control flow graph, consuming the body.
    ///
    /// Ownership of the instruction stream transfers to the graph, which hands
    /// out read-only slices of it per block. Use [`MethodBody::flow_graph`] to
    /// keep the body around.
    ///
    /// # Errors
    ///
    /// See [`FlowGraphBuilder::build`].
    pub fn into_flow_graph(self) -> Result<FlowGraph> {
        FlowGraphBuilder::build(self.instructions, &self.exception_regions)
    }

    /// Builds the control flow graph without consuming the body.
    ///
    /// Clones the instruction stream into the graph.
    ///
    /// # Errors
    ///
    /// See [`FlowGraphBuilder::build`].
    pub fn flow_graph(&self) -> Result<FlowGraph> {
        FlowGraphBuilder::build(self.instructions.clone(), &self.exception_regions)
    }
}
