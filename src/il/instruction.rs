//! CIL instruction representation and control flow classification.
//!
//! This module defines the typed representation of decoded CIL instructions. The
//! central type is [`Instruction`], which carries the instruction's offset within
//! the method body, its mnemonic, its [`FlowType`] classification, and a typed
//! [`Operand`]. Branch targets are stored as absolute method-body offsets.

use crate::{Error, Result};

/// How an instruction affects control flow.
///
/// This classification drives basic block boundary discovery and successor edge
/// construction. Every CIL opcode maps into exactly one variant.
///
/// # Examples
///
/// ```rust
/// use cilflow::il::FlowType;
///
/// assert!(FlowType::Return.is_unconditional_transfer());
/// assert!(!FlowType::ConditionalBranch.is_unconditional_transfer());
/// assert!(FlowType::Leave.has_branch_target());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Normal execution continues to the next instruction
    Sequential,
    /// Call to another method, execution resumes at the next instruction
    Call,
    /// Conditional branch to another location (fallthrough still applies)
    ConditionalBranch,
    /// Always branches to another location (unconditional jump)
    UnconditionalBranch,
    /// Exits a protected region and branches to a target outside it
    Leave,
    /// Multi-way branch (switch statement)
    Switch,
    /// Returns from the current method
    Return,
    /// Exception throwing (`throw` and `rethrow`)
    Throw,
    /// End of a finally or fault handler
    EndFinally,
    /// End of a filter decision block
    EndFilter,
    /// Transfers control to another method without returning (`jmp`)
    Jump,
}

impl FlowType {
    /// Returns `true` if no fallthrough successor exists after this instruction.
    ///
    /// Covers unconditional branches, `leave`, and all terminal forms (`ret`,
    /// `throw`, `rethrow`, `endfinally`, `endfilter`, `jmp`). A block ending in
    /// one of these never receives a synthesized fallthrough edge.
    #[must_use]
    pub const fn is_unconditional_transfer(&self) -> bool {
        matches!(
            self,
            Self::UnconditionalBranch
                | Self::Leave
                | Self::Return
                | Self::Throw
                | Self::EndFinally
                | Self::EndFilter
                | Self::Jump
        )
    }

    /// Returns `true` if no fallthrough successor edge is synthesized after
    /// this instruction.
    ///
    /// Every unconditional transfer qualifies, and so does `switch`: a switch
    /// block's successor set comes entirely from its target table.
    #[must_use]
    pub const fn suppresses_fallthrough(&self) -> bool {
        self.is_unconditional_transfer() || matches!(self, Self::Switch)
    }

    /// Returns `true` if this instruction carries a single branch target operand.
    #[must_use]
    pub const fn has_branch_target(&self) -> bool {
        matches!(
            self,
            Self::ConditionalBranch | Self::UnconditionalBranch | Self::Leave
        )
    }

    /// Returns `true` if the instruction physically following this one must
    /// start a new basic block.
    ///
    /// True for every control transfer, conditional or not: the next
    /// instruction is either reachable from two control paths (branch
    /// fallthrough plus whatever falls into the branch) or begins a region
    /// unreachable by fallthrough entirely.
    #[must_use]
    pub const fn ends_block(&self) -> bool {
        !matches!(self, Self::Sequential | Self::Call)
    }
}

/// A typed operand of a CIL instruction.
///
/// Branch and `leave` instructions carry [`Operand::Target`] with the absolute
/// method-body offset of the destination (already resolved from the relative IL
/// displacement); `switch` carries [`Operand::Switch`] with absolute offsets in
/// table order. All other shapes are opaque to control flow analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// Signed 8-bit immediate
    Int8(i8),
    /// Unsigned 8-bit immediate (short-form variable/argument index)
    UInt8(u8),
    /// Unsigned 16-bit immediate (long-form variable/argument index)
    UInt16(u16),
    /// Signed 32-bit immediate
    Int32(i32),
    /// Signed 64-bit immediate
    Int64(i64),
    /// 32-bit floating point immediate
    Float32(f32),
    /// 64-bit floating point immediate
    Float64(f64),
    /// Metadata token reference
    Token(u32),
    /// Branch target as an absolute method-body offset
    Target(u32),
    /// Switch table of absolute method-body offsets
    Switch(Vec<u32>),
}

/// A single decoded CIL instruction.
///
/// Instructions are immutable once constructed and owned by exactly one basic
/// block after graph construction. Offsets are unique and monotonically
/// increasing within a method body.
///
/// # Examples
///
/// ```rust
/// use cilflow::il::{decode_instruction, Parser};
///
/// let mut parser = Parser::new(&[0x2A]); // ret
/// let instruction = decode_instruction(&mut parser)?;
/// assert_eq!(instruction.mnemonic, "ret");
/// assert_eq!(instruction.size, 1);
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of this instruction from the start of the method body
    pub offset: u32,
    /// Size of this instruction in bytes, operand included
    pub size: u32,
    /// Primary opcode byte
    pub opcode: u8,
    /// Prefix byte (0 if no prefix)
    pub prefix: u8,
    /// Human-readable instruction mnemonic (e.g. "add", "brtrue.s", "ret")
    pub mnemonic: &'static str,
    /// How this instruction affects control flow
    pub flow_type: FlowType,
    /// The operand data for this instruction
    pub operand: Operand,
}

impl Instruction {
    /// Offset of the instruction physically following this one.
    #[must_use]
    pub const fn next_offset(&self) -> u32 {
        self.offset + self.size
    }

    /// Returns the single branch target of this instruction.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedOperand`] if the instruction is classified as a
    /// single-target branch but does not carry a [`Operand::Target`] operand.
    pub fn branch_target(&self) -> Result<u32> {
        match self.operand {
            Operand::Target(target) => Ok(target),
            _ => Err(Error::MalformedOperand {
                offset: self.offset,
            }),
        }
    }

    /// Returns the switch target table of this instruction.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedOperand`] if the instruction does not carry a
    /// [`Operand::Switch`] operand.
    pub fn switch_targets(&self) -> Result<&[u32]> {
        match &self.operand {
            Operand::Switch(targets) => Ok(targets),
            _ => Err(Error::MalformedOperand {
                offset: self.offset,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(offset: u32, operand: Operand) -> Instruction {
        Instruction {
            offset,
            size: 2,
            opcode: 0x2B,
            prefix: 0,
            mnemonic: "br.s",
            flow_type: FlowType::UnconditionalBranch,
            operand,
        }
    }

    #[test]
    fn unconditional_transfer_classification() {
        assert!(FlowType::UnconditionalBranch.is_unconditional_transfer());
        assert!(FlowType::Leave.is_unconditional_transfer());
        assert!(FlowType::Return.is_unconditional_transfer());
        assert!(FlowType::Throw.is_unconditional_transfer());
        assert!(FlowType::EndFinally.is_unconditional_transfer());
        assert!(FlowType::EndFilter.is_unconditional_transfer());
        assert!(FlowType::Jump.is_unconditional_transfer());

        assert!(!FlowType::Sequential.is_unconditional_transfer());
        assert!(!FlowType::Call.is_unconditional_transfer());
        assert!(!FlowType::ConditionalBranch.is_unconditional_transfer());
        assert!(!FlowType::Switch.is_unconditional_transfer());
    }

    #[test]
    fn switch_suppresses_fallthrough() {
        assert!(FlowType::Switch.suppresses_fallthrough());
        assert!(FlowType::Return.suppresses_fallthrough());
        assert!(!FlowType::ConditionalBranch.suppresses_fallthrough());
        assert!(!FlowType::Call.suppresses_fallthrough());
    }

    #[test]
    fn ends_block_covers_all_transfers() {
        assert!(FlowType::ConditionalBranch.ends_block());
        assert!(FlowType::Switch.ends_block());
        assert!(FlowType::Return.ends_block());
        assert!(!FlowType::Sequential.ends_block());
        assert!(!FlowType::Call.ends_block());
    }

    #[test]
    fn branch_target_accessor() {
        let instr = branch(4, Operand::Target(10));
        assert_eq!(instr.branch_target().unwrap(), 10);
        assert_eq!(instr.next_offset(), 6);
    }

    #[test]
    fn branch_target_wrong_shape() {
        let instr = branch(4, Operand::Int32(10));
        assert_eq!(
            instr.branch_target(),
            Err(Error::MalformedOperand { offset: 4 })
        );
    }

    #[test]
    fn switch_targets_wrong_shape() {
        let instr = branch(0, Operand::None);
        assert!(instr.switch_targets().is_err());
    }
}
