// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # cilflow
//!
//! Control flow graph inference for CIL (Common Intermediate Language) method bodies.
//! Built in pure Rust, `cilflow` decodes raw IL bytecode into typed instruction streams
//! and reconstructs the classic first phase of any bytecode analysis pipeline: a graph
//! of basic blocks and successor edges, with exception handling regions folded into the
//! block structure.
//!
//! ## Features
//!
//! - **⚡ Two-pass block inference** - Forward branch targets are fully discovered before
//!   any block is sliced, so backward references from later code never mis-partition a block
//! - **📦 Zero-copy block views** - Blocks expose instruction and successor slices into
//!   shared backing storage owned by the graph; nothing is duplicated
//! - **🧩 Exception region aware** - try/handler/filter boundaries force block splits and
//!   seed handler entry roots, without fabricating fault-dispatch edges
//! - **🛡️ Memory safe** - Comprehensive error handling; malformed IL aborts construction
//!   instead of producing a dangling graph
//!
//! ## Quick Start
//!
//! ```rust
//! use cilflow::prelude::*;
//!
//! // brtrue.s +1; ret; ret
//! let body = MethodBody::from_il(&[0x2D, 0x01, 0x2A, 0x2A], vec![])?;
//! let graph = body.into_flow_graph()?;
//!
//! assert_eq!(graph.block_count(), 3);
//! assert_eq!(graph.roots().len(), 1);
//! # Ok::<(), cilflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `cilflow` is organized into three domain modules:
//!
//! - [`il`] - Instruction model, opcode tables, and the IL bytecode decoder
//! - [`method`] - Method bodies and exception region descriptors
//! - [`flow`] - Basic blocks, the two-pass graph builder, and the [`FlowGraph`] itself
//!
//! The graph construction consumes an ordered, offset-increasing instruction stream plus
//! an exception region list. The instruction stream can come from the built-in decoder
//! ([`il::decode_stream`]) or be assembled directly when instructions originate elsewhere.
//!
//! ## Construction Model
//!
//! Construction runs two linear passes over the instruction stream:
//!
//! 1. **Boundary discovery** registers every offset that must start a block: branch,
//!    switch, and `leave` targets, the instruction following any control transfer, and
//!    all exception region boundaries. Registration is idempotent.
//! 2. **Slicing and edge building** partitions the stream at the discovered boundaries
//!    and records successor edges per block, synthesizing fallthrough edges wherever the
//!    previous block did not end in an unconditional transfer.
//!
//! Both passes are synchronous and run to completion for one method body. Independent
//! method bodies can be processed concurrently; see [`flow::build_graphs`].
//!
//! ## Standards Compliance
//!
//! The decoder implements the CIL instruction encoding of the **ECMA-335 specification**
//! (6th edition), Partition III, including the `0xFE`-prefixed opcode map.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) and construction is all-or-nothing
//! per method body:
//!
//! ```rust
//! use cilflow::{Error, MethodBody};
//!
//! // br.s to an offset in the middle of nowhere
//! match MethodBody::from_il(&[0x2B, 0x7F], vec![]).and_then(MethodBody::into_flow_graph) {
//!     Err(Error::InvalidTarget { offset, target }) => {
//!         println!("branch at IL_{offset:04X} targets invalid IL_{target:04X}");
//!     }
//!     other => panic!("expected InvalidTarget, got {other:?}"),
//! }
//! ```

mod error;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// CIL instruction model and bytecode decoder based on ECMA-335.
///
/// This module provides the typed instruction representation consumed by the flow
/// graph builder, together with a decoder for raw IL bytecode:
///
/// - [`il::Instruction`] - A decoded CIL instruction with offset, mnemonic, and operand
/// - [`il::FlowType`] - How an instruction affects control flow
/// - [`il::Operand`] - Typed operands, with branch targets already resolved to
///   absolute method-body offsets
/// - [`il::decode_instruction`] / [`il::decode_stream`] - Decoding entry points
pub mod il;

/// Method bodies and exception handling regions.
///
/// - [`method::MethodBody`] - An instruction stream plus its exception region list
/// - [`method::ExceptionRegion`] - try/handler/filter offsets forcing block boundaries
pub mod method;

/// Basic blocks, the two-pass builder, and the resulting flow graph.
///
/// - [`flow::FlowGraph`] - Root blocks, offset index, and per-block slices
/// - [`flow::FlowGraphBuilder`] - Two-pass construction from an instruction stream
/// - [`flow::build_graphs`] - Parallel batch construction over many method bodies
pub mod flow;

pub(crate) mod utils;

/// `cilflow` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `cilflow` Error type
///
/// The main error type for all operations in this crate. See [`error::Error`] variants
/// for the decoding and construction failure modes.
pub use error::Error;

pub use flow::{BasicBlock, BlockId, FlowGraph, FlowGraphBuilder};
pub use method::{ExceptionRegion, ExceptionRegionKind, MethodBody};
