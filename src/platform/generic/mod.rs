// coin-glue/src/platform/generic/mod.rs
//
//! Backends that are not specific to any operating system.

pub mod dylib;
pub mod osmesa;
