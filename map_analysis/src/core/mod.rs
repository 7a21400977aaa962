//! Core module has common/shared math and traits used by the planar and geographic code.
pub mod math;
pub mod traits;
