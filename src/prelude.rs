//! # cilflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the cilflow library. Import this module to get quick access to the
//! essential types for control flow analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilflow operations
pub use crate::Error;

/// The result type used throughout cilflow
pub use crate::Result;

// ================================================================================================
// Instruction Model and Decoding
// ================================================================================================

/// Decoded CIL instruction with offset, mnemonic, flow classification, and operand
pub use crate::il::{FlowType, Instruction, Operand};

/// Decoding entry points and the bounds-checked byte cursor
pub use crate::il::{decode_instruction, decode_stream, Parser};

// ================================================================================================
// Method Bodies and Exception Regions
// ================================================================================================

/// Instruction stream plus exception region list, the unit of graph construction
pub use crate::method::MethodBody;

/// Exception handling region descriptors
pub use crate::method::{ExceptionRegion, ExceptionRegionKind};

// ================================================================================================
// Flow Graph
// ================================================================================================

/// The control flow graph and its building blocks
pub use crate::flow::{BasicBlock, BlockId, FlowGraph, FlowGraphBuilder};

/// Parallel batch construction over many method bodies
pub use crate::flow::build_graphs;
