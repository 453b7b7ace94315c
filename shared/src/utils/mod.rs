//! Common utility functions

pub mod masking;

pub use masking::mask_target;
