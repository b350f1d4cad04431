//! Automatic table layout.
//!
//! [CSS2 § 17.5.2.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
//!
//! "This algorithm reflects the behavior of several popular HTML user
//! agents... Column widths are determined as follows: calculate the
//! minimum and maximum width of each cell; for each column, determine a
//! minimum and maximum column width from the cells that span only that
//! column."
//!
//! A first pass computes per-column min/max content widths; a second
//! distributes the available width proportionally between min and max.
//! Row heights are the maximum over the row's cells; `rowspan` cells
//! consume that rectangle and grow the last spanned row if they need
//! more.

use marten_css::style::{BorderCollapse, CaptionSide};

use crate::geometry::{round_half_even, Rect};
use crate::render_tree::{BoxId, BoxKind};

use super::{ContainingBlock, LayoutEngine};

/// A cell anchored in the grid.
struct GridCell {
    id: BoxId,
    row: usize,
    col: usize,
    colspan: usize,
    rowspan: usize,
}

/// The flattened grid: rows in document order, cells anchored, captions
/// separated.
struct TableGrid {
    rows: Vec<BoxId>,
    cells: Vec<GridCell>,
    columns: usize,
    captions: Vec<BoxId>,
}

impl LayoutEngine<'_> {
    /// Lay out a table box; returns the content height.
    pub(super) fn layout_table(
        &mut self,
        id: BoxId,
        content_x: f32,
        content_y: f32,
        content_width: f32,
    ) -> f32 {
        let grid = self.collect_grid(id);
        if grid.columns == 0 {
            // Caption-only or empty tables still stack their captions.
            return self.layout_captions_only(&grid, id, content_x, content_y, content_width);
        }

        let style = self.rt.get(id).style.clone();
        let (h_space, v_space) = if style.border_collapse == BorderCollapse::Collapse {
            (0.0, 0.0)
        } else {
            (
                self.cvt(id, &style.border_spacing.0.clone(), None).max(0.0),
                self.cvt(id, &style.border_spacing.1.clone(), None).max(0.0),
            )
        };

        // STEP 1: column min/max from the cells.
        let (col_min, col_max) = self.column_bounds(&grid);
        let spacing_total = h_space * (grid.columns as f32 + 1.0);
        let available = (content_width - spacing_total).max(0.0);
        let sum_min: f32 = col_min.iter().sum();
        let sum_max: f32 = col_max.iter().sum();

        // STEP 2: distribute the available width between min and max,
        // respecting explicit column widths (already folded into both
        // bounds by measurement).
        let has_explicit_width = !style.width.is_predefined();
        let widths: Vec<f32> = if sum_max <= available {
            if has_explicit_width && sum_max > 0.0 {
                // Stretch to the declared width, proportionally to max.
                let extra = available - sum_max;
                col_max
                    .iter()
                    .map(|&max| max + extra * max / sum_max)
                    .collect()
            } else {
                col_max.clone()
            }
        } else if sum_min >= available {
            // Overconstrained: columns get their minimum and the table
            // overflows.
            col_min.clone()
        } else {
            let range: f32 = sum_max - sum_min;
            let extra = available - sum_min;
            col_min
                .iter()
                .zip(&col_max)
                .map(|(&min, &max)| {
                    if range > 0.0 {
                        min + extra * (max - min) / range
                    } else {
                        min
                    }
                })
                .collect()
        };
        let used_width: f32 = widths.iter().sum::<f32>() + spacing_total;

        // An auto-width table shrinks to its used width.
        if !has_explicit_width {
            self.rt.get_mut(id).pos.width = round_half_even(used_width.min(content_width));
        }

        // STEP 3: captions above the grid.
        let mut cursor = content_y;
        let caption_cb = ContainingBlock {
            x: content_x,
            y: content_y,
            width: used_width.min(content_width),
            height: None,
        };
        for &caption in &grid.captions {
            if self.rt.get(caption).style.caption_side == CaptionSide::Top {
                let height = self.layout_block_level(caption, &caption_cb, cursor);
                cursor += height;
            }
        }
        let grid_top = cursor;

        // STEP 4: lay out cells at their column positions with
        // provisional row tops, collecting row heights.
        let col_x: Vec<f32> = {
            let mut xs = Vec::with_capacity(grid.columns);
            let mut x = content_x + h_space;
            for &width in &widths {
                xs.push(x);
                x += width + h_space;
            }
            xs
        };

        let mut row_heights = vec![0.0_f32; grid.rows.len()];
        let mut cell_heights = vec![0.0_f32; grid.cells.len()];
        for (index, cell) in grid.cells.iter().enumerate() {
            let span_width: f32 = widths[cell.col..(cell.col + cell.colspan).min(widths.len())]
                .iter()
                .sum::<f32>()
                + h_space * (cell.colspan.saturating_sub(1)) as f32;
            let height = self.layout_cell(cell.id, col_x[cell.col], grid_top, span_width);
            cell_heights[index] = height;
            if cell.rowspan == 1 {
                row_heights[cell.row] = row_heights[cell.row].max(height);
            }
        }

        // [§ 17.5.3] rowspan cells consume their rectangle: grow the
        // last spanned row when the cell is taller than the sum.
        for (index, cell) in grid.cells.iter().enumerate() {
            if cell.rowspan <= 1 {
                continue;
            }
            let last = (cell.row + cell.rowspan - 1).min(row_heights.len() - 1);
            let spanned: f32 = row_heights[cell.row..=last].iter().sum::<f32>()
                + v_space * (last - cell.row) as f32;
            if cell_heights[index] > spanned {
                row_heights[last] += cell_heights[index] - spanned;
            }
        }

        // STEP 5: final vertical placement — translate each cell to its
        // row and stretch it to the row rectangle.
        let mut row_y = vec![0.0_f32; grid.rows.len()];
        let mut y = grid_top + v_space;
        for (row, height) in row_heights.iter().enumerate() {
            row_y[row] = y;
            y += height + v_space;
        }
        let grid_bottom = y;

        for cell in &grid.cells {
            let last = (cell.row + cell.rowspan - 1).min(row_heights.len() - 1);
            let target_height: f32 = row_heights[cell.row..=last].iter().sum::<f32>()
                + v_space * (last - cell.row) as f32;
            let current = self.rt.get(cell.id).border_box();
            let dy = round_half_even(row_y[cell.row]) - current.y;
            self.translate_subtree(cell.id, 0, dy);
            // Stretch the border box to the row height.
            let b = self.rt.get_mut(cell.id);
            let chrome = b.borders.vertical() + b.padding.vertical();
            b.pos.height = (round_half_even(target_height) - chrome).max(0);
        }

        // Row and row-group boxes get their covering rectangles for
        // painting and hit testing.
        self.commit_row_geometry(&grid, &col_x, &widths, &row_y, &row_heights, h_space);

        // STEP 6: bottom captions.
        let mut cursor = grid_bottom;
        for &caption in &grid.captions.clone() {
            if self.rt.get(caption).style.caption_side == CaptionSide::Bottom {
                let height = self.layout_block_level(caption, &caption_cb, cursor);
                cursor += height;
            }
        }

        (cursor - content_y).max(0.0)
    }

    /// Table min/max content widths for shrink-to-fit callers.
    pub(super) fn measure_table_min_max(&mut self, id: BoxId) -> (f32, f32) {
        let grid = self.collect_grid(id);
        if grid.columns == 0 {
            return (0.0, 0.0);
        }
        let style = self.rt.get(id).style.clone();
        let h_space = if style.border_collapse == BorderCollapse::Collapse {
            0.0
        } else {
            self.cvt(id, &style.border_spacing.0.clone(), None).max(0.0)
        };
        let (col_min, col_max) = self.column_bounds(&grid);
        let spacing = h_space * (grid.columns as f32 + 1.0);
        (
            col_min.iter().sum::<f32>() + spacing,
            col_max.iter().sum::<f32>() + spacing,
        )
    }

    /// Walk the normalized table subtree into a grid, resolving
    /// `rowspan`/`colspan` occupancy.
    fn collect_grid(&mut self, table: BoxId) -> TableGrid {
        let mut rows = Vec::new();
        let mut captions = Vec::new();
        for &child in &self.rt.get(table).children {
            match self.rt.get(child).kind {
                BoxKind::TableCaption => captions.push(child),
                BoxKind::TableRowGroup => {
                    for &row in &self.rt.get(child).children {
                        if matches!(self.rt.get(row).kind, BoxKind::TableRow) {
                            rows.push(row);
                        }
                    }
                }
                BoxKind::TableRow => rows.push(child),
                _ => {}
            }
        }

        let mut cells = Vec::new();
        // occupancy[row] holds columns blocked by earlier rowspans.
        let mut occupancy: Vec<Vec<bool>> = vec![Vec::new(); rows.len()];
        let mut columns = 0;

        for (row_index, &row) in rows.iter().enumerate() {
            let mut col = 0;
            for &cell in &self.rt.get(row).children.clone() {
                if !matches!(self.rt.get(cell).kind, BoxKind::TableCell) {
                    continue;
                }
                // Skip slots blocked by a rowspan from above.
                while occupancy[row_index].get(col).copied().unwrap_or(false) {
                    col += 1;
                }
                let (colspan, rowspan) = self.cell_spans(cell);
                for spanned_row in row_index..(row_index + rowspan).min(rows.len()) {
                    for spanned_col in col..col + colspan {
                        if occupancy[spanned_row].len() <= spanned_col {
                            occupancy[spanned_row].resize(spanned_col + 1, false);
                        }
                        occupancy[spanned_row][spanned_col] = true;
                    }
                }
                cells.push(GridCell {
                    id: cell,
                    row: row_index,
                    col,
                    colspan,
                    rowspan,
                });
                col += colspan;
                columns = columns.max(col);
            }
        }

        TableGrid {
            rows,
            cells,
            columns,
            captions,
        }
    }

    /// `colspan`/`rowspan`, captured from the DOM at build time.
    fn cell_spans(&self, cell: BoxId) -> (usize, usize) {
        let (colspan, rowspan) = self.rt.get(cell).table_spans;
        (usize::from(colspan).min(1000), usize::from(rowspan))
    }

    /// Per-column min/max widths from the cells; spanning cells spread
    /// their demand evenly over their columns.
    fn column_bounds(&mut self, grid: &TableGrid) -> (Vec<f32>, Vec<f32>) {
        let mut col_min = vec![0.0_f32; grid.columns];
        let mut col_max = vec![0.0_f32; grid.columns];
        for cell in &grid.cells {
            let (min, max) = self.measure_min_max(cell.id);
            let span = cell.colspan.min(grid.columns - cell.col).max(1);
            let min_share = min / span as f32;
            let max_share = max / span as f32;
            for col in cell.col..cell.col + span {
                col_min[col] = col_min[col].max(min_share);
                col_max[col] = col_max[col].max(max_share.max(min_share));
            }
        }
        (col_min, col_max)
    }

    /// Lay out one cell pinned to its grid slot; returns the border-box
    /// height.
    fn layout_cell(&mut self, cell: BoxId, x: f32, y: f32, width: f32) -> f32 {
        let (borders, padding) = self.resolve_border_padding(cell, width);
        let chrome = (borders.horizontal() + padding.horizontal()) as f32;
        let content_width = (width - chrome).max(0.0);

        let saved_width = std::mem::replace(
            &mut self.rt.get_mut(cell).style.width,
            marten_css::Length::px(content_width),
        );
        let saved_sizing = std::mem::replace(
            &mut self.rt.get_mut(cell).style.box_sizing,
            marten_css::style::BoxSizing::ContentBox,
        );
        // Cell margins do not exist in the table model.
        let saved_margin = std::mem::replace(
            &mut self.rt.get_mut(cell).style.margin,
            marten_css::style::computed::EdgeLengths::default(),
        );

        let cb = ContainingBlock {
            x,
            y,
            width,
            height: None,
        };
        let height = self.layout_block_level(cell, &cb, y);

        {
            let b = self.rt.get_mut(cell);
            b.style.width = saved_width;
            b.style.box_sizing = saved_sizing;
            b.style.margin = saved_margin;
        }
        height
    }

    /// Rows and row groups cover their cells for painting/hit testing.
    fn commit_row_geometry(
        &mut self,
        grid: &TableGrid,
        col_x: &[f32],
        widths: &[f32],
        row_y: &[f32],
        row_heights: &[f32],
        h_space: f32,
    ) {
        let grid_left = col_x.first().copied().unwrap_or(0.0);
        let grid_right = col_x
            .last()
            .copied()
            .unwrap_or(0.0)
            + widths.last().copied().unwrap_or(0.0);
        let _ = h_space;
        for (index, &row) in grid.rows.iter().enumerate() {
            let rect = Rect {
                x: round_half_even(grid_left),
                y: round_half_even(row_y[index]),
                width: round_half_even(grid_right - grid_left),
                height: round_half_even(row_heights[index]),
            };
            self.rt.get_mut(row).pos = rect;
        }
        // Row groups union their rows.
        let groups: Vec<BoxId> = grid
            .rows
            .iter()
            .filter_map(|&row| self.rt.get(row).parent)
            .collect();
        for group in groups {
            if !matches!(self.rt.get(group).kind, BoxKind::TableRowGroup) {
                continue;
            }
            let mut bounds: Option<Rect> = None;
            for &row in &self.rt.get(group).children.clone() {
                let rect = self.rt.get(row).pos;
                bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
            }
            if let Some(bounds) = bounds {
                self.rt.get_mut(group).pos = bounds;
            }
        }
    }

    /// A table with no grid content: captions stack like blocks.
    fn layout_captions_only(
        &mut self,
        grid: &TableGrid,
        _table: BoxId,
        content_x: f32,
        content_y: f32,
        content_width: f32,
    ) -> f32 {
        let cb = ContainingBlock {
            x: content_x,
            y: content_y,
            width: content_width,
            height: None,
        };
        let mut cursor = content_y;
        for &caption in &grid.captions {
            cursor += self.layout_block_level(caption, &cb, cursor);
        }
        (cursor - content_y).max(0.0)
    }
}
