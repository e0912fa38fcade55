//! Method bodies and exception handling regions.
//!
//! A [`MethodBody`] pairs a decoded instruction stream with the method's
//! exception region list, forming the complete input of flow graph
//! construction. [`ExceptionRegion`] describes one try/handler/filter clause as
//! specified by ECMA-335, Partition II, §25.4.6.

mod body;
mod exceptions;

pub use body::MethodBody;
pub use exceptions::{ExceptionRegion, ExceptionRegionFlags, ExceptionRegionKind};
