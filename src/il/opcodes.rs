//! CIL opcode decode tables (ECMA-335, Partition III).
//!
//! This module defines the per-opcode metadata the decoder needs: mnemonic,
//! operand encoding, and control flow classification. Single-byte opcodes live
//! in [`INSTRUCTIONS`], indexed by the opcode byte; two-byte opcodes sharing the
//! [`FE_PREFIX`] first byte live in [`INSTRUCTIONS_FE`], indexed by the second
//! byte. Reserved or undefined encodings carry an empty mnemonic and are
//! rejected by the decoder.

use crate::il::FlowType;

/// The shared first byte of all two-byte CIL opcodes.
pub const FE_PREFIX: u8 = 0xFE;

/// How an opcode's operand is encoded in the IL stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperandKind {
    /// No operand bytes follow the opcode
    None,
    /// Signed 8-bit immediate
    Int8,
    /// Unsigned 8-bit immediate
    UInt8,
    /// Unsigned 16-bit immediate
    UInt16,
    /// Signed 32-bit immediate
    Int32,
    /// Signed 64-bit immediate
    Int64,
    /// 32-bit float immediate
    Float32,
    /// 64-bit float immediate
    Float64,
    /// 32-bit metadata token
    Token,
    /// Signed 8-bit branch displacement, relative to the next instruction
    Target8,
    /// Signed 32-bit branch displacement, relative to the next instruction
    Target32,
    /// 32-bit case count followed by that many signed 32-bit displacements
    Switch,
}

/// Static decode metadata for one opcode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpSpec {
    /// Instruction mnemonic; empty for reserved encodings.
    pub mnemonic: &'static str,
    /// Operand encoding following the opcode byte(s).
    pub operand: OperandKind,
    /// Control flow classification.
    pub flow: FlowType,
}

const fn op(mnemonic: &'static str, operand: OperandKind, flow: FlowType) -> OpSpec {
    OpSpec {
        mnemonic,
        operand,
        flow,
    }
}

const fn simple(mnemonic: &'static str) -> OpSpec {
    op(mnemonic, OperandKind::None, FlowType::Sequential)
}

const RESERVED: OpSpec = op("", OperandKind::None, FlowType::Sequential);

/// Decode table for single-byte opcodes, indexed by the opcode byte.
///
/// The `0xFE` slot is reserved here; the decoder recognizes the prefix before
/// consulting this table.
pub(crate) static INSTRUCTIONS: [OpSpec; 256] = {
    use FlowType::{
        Call, ConditionalBranch, EndFinally, Jump, Leave, Return, Switch, Throw,
        UnconditionalBranch,
    };
    use OperandKind::{
        Float32, Float64, Int32, Int64, Int8, Target32, Target8, Token, UInt8,
    };

    let mut t = [RESERVED; 256];

    t[0x00] = simple("nop");
    t[0x01] = simple("break");
    t[0x02] = simple("ldarg.0");
    t[0x03] = simple("ldarg.1");
    t[0x04] = simple("ldarg.2");
    t[0x05] = simple("ldarg.3");
    t[0x06] = simple("ldloc.0");
    t[0x07] = simple("ldloc.1");
    t[0x08] = simple("ldloc.2");
    t[0x09] = simple("ldloc.3");
    t[0x0A] = simple("stloc.0");
    t[0x0B] = simple("stloc.1");
    t[0x0C] = simple("stloc.2");
    t[0x0D] = simple("stloc.3");
    t[0x0E] = op("ldarg.s", UInt8, FlowType::Sequential);
    t[0x0F] = op("ldarga.s", UInt8, FlowType::Sequential);
    t[0x10] = op("starg.s", UInt8, FlowType::Sequential);
    t[0x11] = op("ldloc.s", UInt8, FlowType::Sequential);
    t[0x12] = op("ldloca.s", UInt8, FlowType::Sequential);
    t[0x13] = op("stloc.s", UInt8, FlowType::Sequential);
    t[0x14] = simple("ldnull");
    t[0x15] = simple("ldc.i4.m1");
    t[0x16] = simple("ldc.i4.0");
    t[0x17] = simple("ldc.i4.1");
    t[0x18] = simple("ldc.i4.2");
    t[0x19] = simple("ldc.i4.3");
    t[0x1A] = simple("ldc.i4.4");
    t[0x1B] = simple("ldc.i4.5");
    t[0x1C] = simple("ldc.i4.6");
    t[0x1D] = simple("ldc.i4.7");
    t[0x1E] = simple("ldc.i4.8");
    t[0x1F] = op("ldc.i4.s", Int8, FlowType::Sequential);
    t[0x20] = op("ldc.i4", Int32, FlowType::Sequential);
    t[0x21] = op("ldc.i8", Int64, FlowType::Sequential);
    t[0x22] = op("ldc.r4", Float32, FlowType::Sequential);
    t[0x23] = op("ldc.r8", Float64, FlowType::Sequential);
    t[0x25] = simple("dup");
    t[0x26] = simple("pop");
    t[0x27] = op("jmp", Token, Jump);
    t[0x28] = op("call", Token, Call);
    t[0x29] = op("calli", Token, Call);
    t[0x2A] = op("ret", OperandKind::None, Return);
    t[0x2B] = op("br.s", Target8, UnconditionalBranch);
    t[0x2C] = op("brfalse.s", Target8, ConditionalBranch);
    t[0x2D] = op("brtrue.s", Target8, ConditionalBranch);
    t[0x2E] = op("beq.s", Target8, ConditionalBranch);
    t[0x2F] = op("bge.s", Target8, ConditionalBranch);
    t[0x30] = op("bgt.s", Target8, ConditionalBranch);
    t[0x31] = op("ble.s", Target8, ConditionalBranch);
    t[0x32] = op("blt.s", Target8, ConditionalBranch);
    t[0x33] = op("bne.un.s", Target8, ConditionalBranch);
    t[0x34] = op("bge.un.s", Target8, ConditionalBranch);
    t[0x35] = op("bgt.un.s", Target8, ConditionalBranch);
    t[0x36] = op("ble.un.s", Target8, ConditionalBranch);
    t[0x37] = op("blt.un.s", Target8, ConditionalBranch);
    t[0x38] = op("br", Target32, UnconditionalBranch);
    t[0x39] = op("brfalse", Target32, ConditionalBranch);
    t[0x3A] = op("brtrue", Target32, ConditionalBranch);
    t[0x3B] = op("beq", Target32, ConditionalBranch);
    t[0x3C] = op("bge", Target32, ConditionalBranch);
    t[0x3D] = op("bgt", Target32, ConditionalBranch);
    t[0x3E] = op("ble", Target32, ConditionalBranch);
    t[0x3F] = op("blt", Target32, ConditionalBranch);
    t[0x40] = op("bne.un", Target32, ConditionalBranch);
    t[0x41] = op("bge.un", Target32, ConditionalBranch);
    t[0x42] = op("bgt.un", Target32, ConditionalBranch);
    t[0x43] = op("ble.un", Target32, ConditionalBranch);
    t[0x44] = op("blt.un", Target32, ConditionalBranch);
    t[0x45] = op("switch", OperandKind::Switch, Switch);
    t[0x46] = simple("ldind.i1");
    t[0x47] = simple("ldind.u1");
    t[0x48] = simple("ldind.i2");
    t[0x49] = simple("ldind.u2");
    t[0x4A] = simple("ldind.i4");
    t[0x4B] = simple("ldind.u4");
    t[0x4C] = simple("ldind.i8");
    t[0x4D] = simple("ldind.i");
    t[0x4E] = simple("ldind.r4");
    t[0x4F] = simple("ldind.r8");
    t[0x50] = simple("ldind.ref");
    t[0x51] = simple("stind.ref");
    t[0x52] = simple("stind.i1");
    t[0x53] = simple("stind.i2");
    t[0x54] = simple("stind.i4");
    t[0x55] = simple("stind.i8");
    t[0x56] = simple("stind.r4");
    t[0x57] = simple("stind.r8");
    t[0x58] = simple("add");
    t[0x59] = simple("sub");
    t[0x5A] = simple("mul");
    t[0x5B] = simple("div");
    t[0x5C] = simple("div.un");
    t[0x5D] = simple("rem");
    t[0x5E] = simple("rem.un");
    t[0x5F] = simple("and");
    t[0x60] = simple("or");
    t[0x61] = simple("xor");
    t[0x62] = simple("shl");
    t[0x63] = simple("shr");
    t[0x64] = simple("shr.un");
    t[0x65] = simple("neg");
    t[0x66] = simple("not");
    t[0x67] = simple("conv.i1");
    t[0x68] = simple("conv.i2");
    t[0x69] = simple("conv.i4");
    t[0x6A] = simple("conv.i8");
    t[0x6B] = simple("conv.r4");
    t[0x6C] = simple("conv.r8");
    t[0x6D] = simple("conv.u4");
    t[0x6E] = simple("conv.u8");
    t[0x6F] = op("callvirt", Token, Call);
    t[0x70] = op("cpobj", Token, FlowType::Sequential);
    t[0x71] = op("ldobj", Token, FlowType::Sequential);
    t[0x72] = op("ldstr", Token, FlowType::Sequential);
    t[0x73] = op("newobj", Token, Call);
    t[0x74] = op("castclass", Token, FlowType::Sequential);
    t[0x75] = op("isinst", Token, FlowType::Sequential);
    t[0x76] = simple("conv.r.un");
    t[0x79] = op("unbox", Token, FlowType::Sequential);
    t[0x7A] = op("throw", OperandKind::None, Throw);
    t[0x7B] = op("ldfld", Token, FlowType::Sequential);
    t[0x7C] = op("ldflda", Token, FlowType::Sequential);
    t[0x7D] = op("stfld", Token, FlowType::Sequential);
    t[0x7E] = op("ldsfld", Token, FlowType::Sequential);
    t[0x7F] = op("ldsflda", Token, FlowType::Sequential);
    t[0x80] = op("stsfld", Token, FlowType::Sequential);
    t[0x81] = op("stobj", Token, FlowType::Sequential);
    t[0x82] = simple("conv.ovf.i1.un");
    t[0x83] = simple("conv.ovf.i2.un");
    t[0x84] = simple("conv.ovf.i4.un");
    t[0x85] = simple("conv.ovf.i8.un");
    t[0x86] = simple("conv.ovf.u1.un");
    t[0x87] = simple("conv.ovf.u2.un");
    t[0x88] = simple("conv.ovf.u4.un");
    t[0x89] = simple("conv.ovf.u8.un");
    t[0x8A] = simple("conv.ovf.i.un");
    t[0x8B] = simple("conv.ovf.u.un");
    t[0x8C] = op("box", Token, FlowType::Sequential);
    t[0x8D] = op("newarr", Token, FlowType::Sequential);
    t[0x8E] = simple("ldlen");
    t[0x8F] = op("ldelema", Token, FlowType::Sequential);
    t[0x90] = simple("ldelem.i1");
    t[0x91] = simple("ldelem.u1");
    t[0x92] = simple("ldelem.i2");
    t[0x93] = simple("ldelem.u2");
    t[0x94] = simple("ldelem.i4");
    t[0x95] = simple("ldelem.u4");
    t[0x96] = simple("ldelem.i8");
    t[0x97] = simple("ldelem.i");
    t[0x98] = simple("ldelem.r4");
    t[0x99] = simple("ldelem.r8");
    t[0x9A] = simple("ldelem.ref");
    t[0x9B] = simple("stelem.i");
    t[0x9C] = simple("stelem.i1");
    t[0x9D] = simple("stelem.i2");
    t[0x9E] = simple("stelem.i4");
    t[0x9F] = simple("stelem.i8");
    t[0xA0] = simple("stelem.r4");
    t[0xA1] = simple("stelem.r8");
    t[0xA2] = simple("stelem.ref");
    t[0xA3] = op("ldelem", Token, FlowType::Sequential);
    t[0xA4] = op("stelem", Token, FlowType::Sequential);
    t[0xA5] = op("unbox.any", Token, FlowType::Sequential);
    t[0xB3] = simple("conv.ovf.i1");
    t[0xB4] = simple("conv.ovf.u1");
    t[0xB5] = simple("conv.ovf.i2");
    t[0xB6] = simple("conv.ovf.u2");
    t[0xB7] = simple("conv.ovf.i4");
    t[0xB8] = simple("conv.ovf.u4");
    t[0xB9] = simple("conv.ovf.i8");
    t[0xBA] = simple("conv.ovf.u8");
    t[0xC2] = op("refanyval", Token, FlowType::Sequential);
    t[0xC3] = simple("ckfinite");
    t[0xC6] = op("mkrefany", Token, FlowType::Sequential);
    t[0xD0] = op("ldtoken", Token, FlowType::Sequential);
    t[0xD1] = simple("conv.u2");
    t[0xD2] = simple("conv.u1");
    t[0xD3] = simple("conv.i");
    t[0xD4] = simple("conv.ovf.i");
    t[0xD5] = simple("conv.ovf.u");
    t[0xD6] = simple("add.ovf");
    t[0xD7] = simple("add.ovf.un");
    t[0xD8] = simple("mul.ovf");
    t[0xD9] = simple("mul.ovf.un");
    t[0xDA] = simple("sub.ovf");
    t[0xDB] = simple("sub.ovf.un");
    t[0xDC] = op("endfinally", OperandKind::None, EndFinally);
    t[0xDD] = op("leave", Target32, Leave);
    t[0xDE] = op("leave.s", Target8, Leave);
    t[0xDF] = simple("stind.i");
    t[0xE0] = simple("conv.u");

    t
};

/// Decode table for `0xFE`-prefixed opcodes, indexed by the second byte.
pub(crate) static INSTRUCTIONS_FE: [OpSpec; 0x1F] = {
    use FlowType::{EndFilter, Throw};
    use OperandKind::{Token, UInt16, UInt8};

    let mut t = [RESERVED; 0x1F];

    t[0x00] = simple("arglist");
    t[0x01] = simple("ceq");
    t[0x02] = simple("cgt");
    t[0x03] = simple("cgt.un");
    t[0x04] = simple("clt");
    t[0x05] = simple("clt.un");
    t[0x06] = op("ldftn", Token, FlowType::Sequential);
    t[0x07] = op("ldvirtftn", Token, FlowType::Sequential);
    t[0x09] = op("ldarg", UInt16, FlowType::Sequential);
    t[0x0A] = op("ldarga", UInt16, FlowType::Sequential);
    t[0x0B] = op("starg", UInt16, FlowType::Sequential);
    t[0x0C] = op("ldloc", UInt16, FlowType::Sequential);
    t[0x0D] = op("ldloca", UInt16, FlowType::Sequential);
    t[0x0E] = op("stloc", UInt16, FlowType::Sequential);
    t[0x0F] = simple("localloc");
    t[0x11] = op("endfilter", OperandKind::None, EndFilter);
    t[0x12] = op("unaligned.", UInt8, FlowType::Sequential);
    t[0x13] = simple("volatile.");
    t[0x14] = simple("tail.");
    t[0x15] = op("initobj", Token, FlowType::Sequential);
    t[0x16] = op("constrained.", Token, FlowType::Sequential);
    t[0x17] = simple("cpblk");
    t[0x18] = simple("initblk");
    t[0x19] = op("no.", UInt8, FlowType::Sequential);
    t[0x1A] = op("rethrow", OperandKind::None, Throw);
    t[0x1C] = op("sizeof", Token, FlowType::Sequential);
    t[0x1D] = simple("refanytype");
    t[0x1E] = simple("readonly.");

    t
};
