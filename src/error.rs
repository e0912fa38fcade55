use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of IL decoding and control flow graph construction.
/// Graph construction is all-or-nothing for one method body: on any error, no partial
/// graph is returned. Callers that process many method bodies are expected to handle
/// failures per method and continue with the rest.
///
/// # Error Categories
///
/// ## Decoding Errors
/// - [`Error::InvalidOpcode`] - Undefined or reserved opcode byte
/// - [`Error::OutOfBounds`] - Attempted to read beyond the IL blob
///
/// ## Construction Errors
/// - [`Error::Empty`] - Empty instruction stream
/// - [`Error::MalformedOperand`] - Branch/switch operand has the wrong shape
/// - [`Error::InvalidTarget`] - Control transfer to an offset with no instruction
/// - [`Error::InvalidRegion`] - Inconsistent exception region descriptor
///
/// # Examples
///
/// ```rust
/// use cilflow::{Error, MethodBody};
///
/// match MethodBody::from_il(&[0xE1], vec![]) {
///     Ok(_) => unreachable!(),
///     Err(Error::InvalidOpcode { offset, opcode }) => {
///         eprintln!("bad opcode {opcode:#04X} at IL_{offset:04X}");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An undefined or reserved opcode was encountered while decoding IL.
    ///
    /// The `opcode` field holds the offending byte; for `0xFE`-prefixed opcodes
    /// it holds the second byte of the pair.
    #[error("Invalid opcode {opcode:#04X} at IL_{offset:04X}")]
    InvalidOpcode {
        /// Offset of the instruction within the method body.
        offset: u32,
        /// The undefined opcode byte.
        opcode: u8,
    },

    /// An out of bound read would have occurred while decoding the IL blob.
    ///
    /// This happens when an instruction's operand extends past the end of the
    /// method body, which indicates a truncated or corrupted IL stream.
    #[error("Out of bound read would have occurred")]
    OutOfBounds,

    /// The provided instruction stream was empty.
    ///
    /// A control flow graph needs at least one instruction; the method entry
    /// block cannot be formed from nothing.
    #[error("Provided instruction stream was empty")]
    Empty,

    /// A branch or switch instruction carries an operand of the wrong shape.
    ///
    /// Single-target branches must carry a target offset, and `switch` must
    /// carry a target table. Anything else indicates an upstream decoding
    /// defect, not a recoverable runtime condition.
    #[error("Malformed branch operand at IL_{offset:04X}")]
    MalformedOperand {
        /// Offset of the instruction with the bad operand.
        offset: u32,
    },

    /// A control transfer references an offset that is not an instruction start.
    ///
    /// Raised for branch and switch targets. Producing a dangling block would
    /// violate the graph's offset index invariant, so construction aborts
    /// instead.
    #[error("Control transfer at IL_{offset:04X} targets invalid offset IL_{target:04X}")]
    InvalidTarget {
        /// Offset of the referencing instruction.
        offset: u32,
        /// The offset that does not start an instruction.
        target: u32,
    },

    /// An exception region descriptor is internally inconsistent.
    ///
    /// Covers inverted try/handler ranges, a filter start on a non-filter
    /// region (or a filter region without one), and region boundaries that do
    /// not land on an instruction offset.
    #[error("Invalid exception region: {0}")]
    InvalidRegion(String),
}
