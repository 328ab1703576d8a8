//! Layout engine for the virtualized grid.
//!
//! This module handles:
//! - Pre-computing column positions from column widths
//! - Managing viewport state (scroll position, visible window)
//! - The windowing math that keeps DOM/canvas work bounded by the
//!   viewport size regardless of total row count

mod grid_layout;
mod viewport;

pub use grid_layout::{
    GridConfig, GridLayout, DEFAULT_COL_WIDTH, DEFAULT_HEADER_HEIGHT, DEFAULT_OVERSCAN,
    DEFAULT_ROW_HEIGHT,
};
pub use viewport::{Viewport, VisibleWindow};
