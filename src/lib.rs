//! Core of an interactive force-directed graph visualizer.
//!
//! The crate has no opinion about windowing or rendering. An embedding UI
//! drives [`Field::tick`] once per frame, forwards user requests to
//! [`algo::Runner::execute`], and reads node positions, selections, and edge
//! annotations back for drawing.

pub mod algo;
pub mod field;
pub mod graph;

pub use algo::{Algorithm, InputError, Playback, Runner};
pub use field::{Field, FieldConfig, LoadOutcome};
pub use graph::{Connection, Edge, Graph, ParseError, SparseGraph, SparseGraphView};
