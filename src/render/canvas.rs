//! Canvas 2D grid renderer.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{Result, SyncviewError};
use crate::layout::{GridLayout, Viewport, VisibleWindow};
use crate::types::ColumnSpec;

/// UI constants
const CELL_PADDING: f64 = 8.0;
const HEADER_BG: &str = "#F3F3F3";
const HEADER_TEXT: &str = "#444444";
const GRID_LINE: &str = "#E0E0E0";
const ROW_BG: &str = "#FFFFFF";
const ROW_BG_ALT: &str = "#FAFAFA";
const ROW_BG_SELECTED: &str = "#E8F0FE";
const CELL_TEXT: &str = "#1F1F1F";
const PLACEHOLDER_TEXT: &str = "#888888";
const CELL_FONT: &str = "13px system-ui, -apple-system, sans-serif";
const HEADER_FONT: &str = "600 12px system-ui, -apple-system, sans-serif";

/// One row's draw data, already formatted by the viewer.
#[derive(Debug, Clone)]
pub struct RowRenderData {
    /// Absolute row index in the (filtered) view.
    pub row: usize,
    /// Display text per column, parallel to the column specs.
    pub cells: Vec<String>,
    /// Selected row highlight.
    pub selected: bool,
}

/// Everything the renderer needs for one frame.
pub struct RenderParams<'a> {
    pub layout: &'a GridLayout,
    pub viewport: &'a Viewport,
    pub window: VisibleWindow,
    pub columns: &'a [ColumnSpec],
    pub rows: &'a [RowRenderData],
    /// Message shown centered when there are no rows (empty data or an
    /// over-narrow filter).
    pub placeholder: &'a str,
}

/// Canvas 2D renderer for one grid view.
pub struct GridRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f32,
}

impl GridRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| SyncviewError::Render("get_context('2d') failed".to_string()))?
            .ok_or_else(|| SyncviewError::Render("canvas has no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SyncviewError::Render("context is not 2d".to_string()))?;
        Ok(Self {
            canvas,
            ctx,
            dpr: 1.0,
        })
    }

    /// Resize the backing store for a new physical size / pixel ratio.
    pub fn resize(&mut self, physical_width: u32, physical_height: u32, dpr: f32) {
        self.canvas.set_width(physical_width.max(1));
        self.canvas.set_height(physical_height.max(1));
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    /// Draw one frame: header band, visible rows, grid lines.
    pub fn render(&self, params: &RenderParams<'_>) {
        let ctx = &self.ctx;
        let width = f64::from(params.viewport.width);
        let height = f64::from(params.viewport.height) + f64::from(params.layout.header_height);

        // Device-pixel transform, then work in logical pixels.
        let _ = ctx.reset_transform();
        let dpr = f64::from(self.dpr);
        let _ = ctx.scale(dpr, dpr);

        ctx.set_fill_style_str(ROW_BG);
        ctx.fill_rect(0.0, 0.0, width, height);

        if params.rows.is_empty() {
            self.draw_header(params, width);
            self.draw_placeholder(params, width, height);
            return;
        }

        self.draw_rows(params);
        self.draw_grid_lines(params, width, height);
        // Header drawn last so scrolled rows never bleed over it.
        self.draw_header(params, width);
    }

    fn draw_header(&self, params: &RenderParams<'_>, width: f64) {
        let ctx = &self.ctx;
        let header_h = f64::from(params.layout.header_height);
        if header_h <= 0.0 {
            return;
        }

        ctx.set_fill_style_str(HEADER_BG);
        ctx.fill_rect(0.0, 0.0, width, header_h);

        ctx.set_font(HEADER_FONT);
        ctx.set_fill_style_str(HEADER_TEXT);
        ctx.set_text_baseline("middle");

        for (i, col) in params.columns.iter().enumerate() {
            let x = f64::from(params.layout.col_left(i) - params.viewport.scroll_x);
            let w = f64::from(params.layout.col_width(i));
            if x + w < 0.0 || x > width {
                continue;
            }
            self.draw_clipped_text(&col.title, x + CELL_PADDING, header_h / 2.0, w - CELL_PADDING * 2.0);
        }

        ctx.set_stroke_style_str(GRID_LINE);
        ctx.begin_path();
        ctx.move_to(0.0, header_h - 0.5);
        ctx.line_to(width, header_h - 0.5);
        ctx.stroke();
    }

    fn draw_rows(&self, params: &RenderParams<'_>) {
        let ctx = &self.ctx;
        let layout = params.layout;
        let header_h = f64::from(layout.header_height);
        let row_h = f64::from(layout.row_height);

        ctx.set_font(CELL_FONT);
        ctx.set_text_baseline("middle");

        for data in params.rows {
            let top = header_h + f64::from(layout.row_top(data.row) - params.viewport.scroll_y);

            let bg = if data.selected {
                ROW_BG_SELECTED
            } else if data.row % 2 == 1 {
                ROW_BG_ALT
            } else {
                ROW_BG
            };
            ctx.set_fill_style_str(bg);
            ctx.fill_rect(0.0, top, f64::from(params.viewport.width), row_h);

            ctx.set_fill_style_str(CELL_TEXT);
            for (i, text) in data.cells.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                let x = f64::from(layout.col_left(i) - params.viewport.scroll_x);
                let w = f64::from(layout.col_width(i));
                if x + w < 0.0 || x > f64::from(params.viewport.width) {
                    continue;
                }
                self.draw_clipped_text(text, x + CELL_PADDING, top + row_h / 2.0, w - CELL_PADDING * 2.0);
            }
        }
    }

    fn draw_grid_lines(&self, params: &RenderParams<'_>, width: f64, height: f64) {
        let ctx = &self.ctx;
        let layout = params.layout;
        let header_h = f64::from(layout.header_height);
        let row_h = f64::from(layout.row_height);

        ctx.set_stroke_style_str(GRID_LINE);
        ctx.begin_path();

        // Horizontal lines along the rendered window only.
        for data in params.rows {
            let y = header_h + f64::from(layout.row_top(data.row) - params.viewport.scroll_y) + row_h - 0.5;
            if y < header_h || y > height {
                continue;
            }
            ctx.move_to(0.0, y);
            ctx.line_to(width, y);
        }

        // Vertical column boundaries (col_left at col_count is the final
        // right edge).
        for i in 1..=layout.col_count() {
            let sx = f64::from(layout.col_left(i) - params.viewport.scroll_x) - 0.5;
            if sx < 0.0 || sx > width {
                continue;
            }
            ctx.move_to(sx, header_h);
            ctx.line_to(sx, height);
        }

        ctx.stroke();
    }

    fn draw_placeholder(&self, params: &RenderParams<'_>, width: f64, height: f64) {
        let ctx = &self.ctx;
        ctx.set_font(CELL_FONT);
        ctx.set_fill_style_str(PLACEHOLDER_TEXT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let header_h = f64::from(params.layout.header_height);
        let _ = ctx.fill_text(
            params.placeholder,
            width / 2.0,
            header_h + (height - header_h) / 2.0,
        );
        ctx.set_text_align("left");
    }

    /// Fill text clipped to a cell width. Clipping via save/clip keeps
    /// long values from spilling into the neighbor cell.
    fn draw_clipped_text(&self, text: &str, x: f64, y: f64, max_width: f64) {
        if max_width <= 0.0 {
            return;
        }
        let ctx = &self.ctx;
        ctx.save();
        ctx.begin_path();
        ctx.rect(x, y - 20.0, max_width, 40.0);
        ctx.clip();
        let _ = ctx.fill_text(text, x, y);
        ctx.restore();
    }
}
