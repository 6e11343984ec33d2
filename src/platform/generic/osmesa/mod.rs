// coin-glue/src/platform/generic/osmesa/mod.rs
//
//! OSMesa, a software rasterizer, as an offscreen backend and a symbol source.

pub mod api;
pub mod context;
pub mod loader;
