//! Exception region descriptors for CIL method bodies.
//!
//! Try/catch/finally/fault regions force basic block boundaries independent of
//! branch targets, and handler entry points seed the flow graph's root blocks.
//! The types here are already-decoded descriptors; byte-level parsing of the
//! method data sections that encode them belongs to a metadata reader, not to
//! this crate.

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::{Error, Result};

bitflags! {
    /// Raw exception clause flag word as it appears in a method's data section.
    ///
    /// Exactly one handler kind is encoded per clause; [`ExceptionRegion::from_raw`]
    /// converts the flag word into an [`ExceptionRegionKind`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExceptionRegionFlags: u16 {
        /// A typed exception clause (the default, flag bits all clear).
        const EXCEPTION = 0x0000;

        /// An exception filter and handler clause.
        const FILTER = 0x0001;

        /// A finally clause, run on both normal and exceptional exit.
        const FINALLY = 0x0002;

        /// A fault clause, run only when an exception is thrown.
        const FAULT = 0x0004;
    }
}

/// The kind of handler an exception region describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ExceptionRegionKind {
    /// Typed catch handler
    Exception,
    /// Filter handler with a separate filter decision block
    Filter,
    /// Finally handler
    Finally,
    /// Fault handler
    Fault,
}

/// One try/handler clause of a method body.
///
/// Each of the offsets recorded here forces a basic block boundary during graph
/// construction. `handler_start` (and `filter_start`, when present) additionally
/// seed root blocks: a handler entry is always the beginning of its own block
/// even if no branch targets it, and it is never merged with preceding code.
///
/// Note that no control flow edge is synthesized from the protected region into
/// the handler: handler invocation is a runtime fault-driven transfer, not a
/// graph edge.
///
/// # Examples
///
/// ```rust
/// use cilflow::method::{ExceptionRegion, ExceptionRegionKind};
///
/// // try [0, 8), typed handler [8, 12)
/// let region = ExceptionRegion::typed(0, 8, 8, 12)?;
/// assert_eq!(region.kind(), ExceptionRegionKind::Exception);
/// assert_eq!(region.filter_start(), None);
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRegion {
    kind: ExceptionRegionKind,
    try_start: u32,
    try_end: u32,
    handler_start: u32,
    handler_end: u32,
    filter_start: Option<u32>,
}

impl ExceptionRegion {
    /// Creates a new exception region after validating its internal consistency.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if the try or handler range is inverted or
    /// empty, or if `filter_start` is present on a non-filter region (or
    /// missing on a filter region).
    pub fn new(
        kind: ExceptionRegionKind,
        try_start: u32,
        try_end: u32,
        handler_start: u32,
        handler_end: u32,
        filter_start: Option<u32>,
    ) -> Result<Self> {
        if try_start >= try_end {
            return Err(Error::InvalidRegion(format!(
                "{kind} region has empty try range [{try_start}, {try_end})"
            )));
        }
        if handler_start >= handler_end {
            return Err(Error::InvalidRegion(format!(
                "{kind} region has empty handler range [{handler_start}, {handler_end})"
            )));
        }
        match (kind, filter_start) {
            (ExceptionRegionKind::Filter, None) => {
                return Err(Error::InvalidRegion(
                    "filter region without a filter start offset".to_string(),
                ));
            }
            (ExceptionRegionKind::Filter, Some(_)) | (_, None) => {}
            (_, Some(_)) => {
                return Err(Error::InvalidRegion(format!(
                    "{kind} region carries a filter start offset"
                )));
            }
        }

        Ok(Self {
            kind,
            try_start,
            try_end,
            handler_start,
            handler_end,
            filter_start,
        })
    }

    /// Creates a typed catch region.
    ///
    /// # Errors
    ///
    /// See [`ExceptionRegion::new`].
    pub fn typed(try_start: u32, try_end: u32, handler_start: u32, handler_end: u32) -> Result<Self> {
        Self::new(
            ExceptionRegionKind::Exception,
            try_start,
            try_end,
            handler_start,
            handler_end,
            None,
        )
    }

    /// Creates a filter region; `filter_start` is where the filter decision code begins.
    ///
    /// # Errors
    ///
    /// See [`ExceptionRegion::new`].
    pub fn filter(
        try_start: u32,
        try_end: u32,
        filter_start: u32,
        handler_start: u32,
        handler_end: u32,
    ) -> Result<Self> {
        Self::new(
            ExceptionRegionKind::Filter,
            try_start,
            try_end,
            handler_start,
            handler_end,
            Some(filter_start),
        )
    }

    /// Creates a finally region.
    ///
    /// # Errors
    ///
    /// See [`ExceptionRegion::new`].
    pub fn finally(
        try_start: u32,
        try_end: u32,
        handler_start: u32,
        handler_end: u32,
    ) -> Result<Self> {
        Self::new(
            ExceptionRegionKind::Finally,
            try_start,
            try_end,
            handler_start,
            handler_end,
            None,
        )
    }

    /// Creates a fault region.
    ///
    /// # Errors
    ///
    /// See [`ExceptionRegion::new`].
    pub fn fault(try_start: u32, try_end: u32, handler_start: u32, handler_end: u32) -> Result<Self> {
        Self::new(
            ExceptionRegionKind::Fault,
            try_start,
            try_end,
            handler_start,
            handler_end,
            None,
        )
    }

    /// Creates a region from the raw clause encoding of a method data section.
    ///
    /// `filter_offset` is only meaningful when the flag word selects a filter
    /// clause; it is ignored otherwise, matching the file format where the
    /// field doubles as the class token for typed clauses.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if the flag word selects more than one handler
    /// kind or the ranges are inconsistent.
    pub fn from_raw(
        flags: ExceptionRegionFlags,
        try_offset: u32,
        try_length: u32,
        handler_offset: u32,
        handler_length: u32,
        filter_offset: u32,
    ) -> Result<Self> {
        let kind = if flags == ExceptionRegionFlags::EXCEPTION {
            ExceptionRegionKind::Exception
        } else if flags == ExceptionRegionFlags::FILTER {
            ExceptionRegionKind::Filter
        } else if flags == ExceptionRegionFlags::FINALLY {
            ExceptionRegionKind::Finally
        } else if flags == ExceptionRegionFlags::FAULT {
            ExceptionRegionKind::Fault
        } else {
            return Err(Error::InvalidRegion(format!(
                "unrecognized clause flags {:#06X}",
                flags.bits()
            )));
        };

        let filter_start = match kind {
            ExceptionRegionKind::Filter => Some(filter_offset),
            _ => None,
        };

        Self::new(
            kind,
            try_offset,
            try_offset.wrapping_add(try_length),
            handler_offset,
            handler_offset.wrapping_add(handler_length),
            filter_start,
        )
    }

    /// The kind of handler this region describes.
    #[must_use]
    pub const fn kind(&self) -> ExceptionRegionKind {
        self.kind
    }

    /// Offset of the first protected instruction.
    #[must_use]
    pub const fn try_start(&self) -> u32 {
        self.try_start
    }

    /// Offset one past the last protected instruction.
    #[must_use]
    pub const fn try_end(&self) -> u32 {
        self.try_end
    }

    /// Offset of the handler's first instruction.
    #[must_use]
    pub const fn handler_start(&self) -> u32 {
        self.handler_start
    }

    /// Offset one past the handler's last instruction.
    #[must_use]
    pub const fn handler_end(&self) -> u32 {
        self.handler_end
    }

    /// Offset of the filter decision code, for filter regions only.
    #[must_use]
    pub const fn filter_start(&self) -> Option<u32> {
        self.filter_start
    }
}
