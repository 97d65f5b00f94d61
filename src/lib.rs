//! Build a gene-by-sample expression matrix from a GEO series.
//!
//! Per-sample tables are reduced to (identifier, value) series by
//! [`normalize`], joined on identifiers by [`matrix::assemble`] and described
//! by [`stats::summarize`]. [`app::App`] wires the steps to a dataset
//! provider, a chart renderer and a progress sink.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod logbook;
pub mod matrix;
pub mod normalize;
pub mod output;
pub mod provider;
pub mod render;
pub mod resolve;
pub mod soft;
pub mod stats;
pub mod store;
pub mod view;
