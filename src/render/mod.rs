//! Canvas 2D rendering for the grid.
//!
//! The viewer prepares plain render data (formatted strings, selection
//! flags) for the visible window only; the renderer draws it without
//! knowing anything about records or formulas.

mod canvas;

pub use canvas::{GridRenderer, RenderParams, RowRenderData};
