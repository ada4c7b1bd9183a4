use serde::{Deserialize, Serialize};

use crate::surface::SurfaceSize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(size: SurfaceSize) -> Self {
        Self {
            x: 0,
            y: 0,
            w: size.width,
            h: size.height,
        }
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && px < self.x.saturating_add(self.w)
            && py >= self.y
            && py < self.y.saturating_add(self.h)
    }

    /// Shrinks the rect by `amount` on every side, saturating to an empty rect.
    pub fn inset(&self, amount: u32) -> Self {
        let twice = amount.saturating_mul(2);
        Self {
            x: self.x.saturating_add(amount),
            y: self.y.saturating_add(amount),
            w: self.w.saturating_sub(twice),
            h: self.h.saturating_sub(twice),
        }
    }
}

/// Square cells laid out row-major and centred inside an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub origin: (u32, u32),
    pub columns: u32,
    pub rows: u32,
    pub cell: u32,
    pub gap: u32,
    pub count: u32,
}

impl GridLayout {
    pub fn fit(area: Rect, count: usize, columns: usize, gap: u32) -> Self {
        let count = count as u32;
        let columns = (columns as u32).max(1);
        let rows = count.div_ceil(columns).max(1);

        let avail_w = area.w.saturating_sub(gap.saturating_mul(columns + 1)) / columns;
        let avail_h = area.h.saturating_sub(gap.saturating_mul(rows + 1)) / rows;
        let cell = avail_w.min(avail_h);

        let grid_w = cell * columns + gap * (columns + 1);
        let grid_h = cell * rows + gap * (rows + 1);
        let origin = (
            area.x + area.w.saturating_sub(grid_w) / 2 + gap,
            area.y + area.h.saturating_sub(grid_h) / 2 + gap,
        );

        Self {
            origin,
            columns,
            rows,
            cell,
            gap,
            count,
        }
    }

    /// Smallest square-ish column count that fits `count` cells.
    pub fn columns_for(count: usize) -> usize {
        let mut columns = 1usize;
        while columns * columns < count {
            columns += 1;
        }
        columns
    }

    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        let index = u32::try_from(index).ok()?;
        if index >= self.count {
            return None;
        }
        let col = index % self.columns;
        let row = index / self.columns;
        let stride = self.cell + self.gap;
        Some(Rect::new(
            self.origin.0 + col * stride,
            self.origin.1 + row * stride,
            self.cell,
            self.cell,
        ))
    }

    /// Index of the cell under `(x, y)`; gaps between cells miss.
    pub fn hit_test(&self, x: u32, y: u32) -> Option<usize> {
        if self.cell == 0 || x < self.origin.0 || y < self.origin.1 {
            return None;
        }
        let stride = self.cell + self.gap;
        let (dx, dy) = (x - self.origin.0, y - self.origin.1);
        let (col, row) = (dx / stride, dy / stride);
        if col >= self.columns || dx % stride >= self.cell || dy % stride >= self.cell {
            return None;
        }
        let index = row * self.columns + col;
        (index < self.count).then_some(index as usize)
    }
}

pub fn clear(frame: &mut [u8], size: SurfaceSize, color: [u8; 4]) {
    fill_rect(frame, size, Rect::from_size(size), color);
}

pub fn fill_rect(frame: &mut [u8], size: SurfaceSize, rect: Rect, color: [u8; 4]) {
    paint_rect(frame, size, rect, |px| px.copy_from_slice(&color));
}

/// Alpha-blends `color` over the existing pixels; the stored alpha stays opaque.
pub fn blend_rect(frame: &mut [u8], size: SurfaceSize, rect: Rect, color: [u8; 4]) {
    let alpha = color[3] as u16;
    let inv = 255 - alpha;
    paint_rect(frame, size, rect, |px| {
        for c in 0..3 {
            px[c] = ((color[c] as u16 * alpha + px[c] as u16 * inv) / 255) as u8;
        }
        px[3] = 255;
    });
}

pub fn stroke_rect(
    frame: &mut [u8],
    size: SurfaceSize,
    rect: Rect,
    thickness: u32,
    color: [u8; 4],
) {
    let t = thickness.min(rect.w / 2).min(rect.h / 2);
    if t == 0 {
        return;
    }
    fill_rect(frame, size, Rect::new(rect.x, rect.y, rect.w, t), color);
    fill_rect(
        frame,
        size,
        Rect::new(rect.x, rect.y + rect.h - t, rect.w, t),
        color,
    );
    fill_rect(frame, size, Rect::new(rect.x, rect.y, t, rect.h), color);
    fill_rect(
        frame,
        size,
        Rect::new(rect.x + rect.w - t, rect.y, t, rect.h),
        color,
    );
}

fn paint_rect(frame: &mut [u8], size: SurfaceSize, rect: Rect, mut paint: impl FnMut(&mut [u8])) {
    let max_x = rect.x.saturating_add(rect.w).min(size.width);
    let max_y = rect.y.saturating_add(rect.h).min(size.height);
    if rect.x >= max_x || rect.y >= max_y {
        return;
    }

    let expected_len = size.rgba_len();
    if expected_len == 0 || frame.len() < expected_len {
        return;
    }

    let stride = size.width as usize * 4;
    let row_bytes = (max_x - rect.x) as usize * 4;
    let mut row_start = rect.y as usize * stride + rect.x as usize * 4;

    for _ in rect.y..max_y {
        let row = &mut frame[row_start..row_start + row_bytes];
        for px in row.chunks_exact_mut(4) {
            paint(px);
        }
        row_start += stride;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RgbaBufferSurface;

    #[test]
    fn grid_hit_test_maps_points_to_cells() {
        let layout = GridLayout::fit(Rect::new(0, 0, 100, 100), 4, 2, 10);
        assert_eq!(layout.cell, 35);

        let first = layout.cell_rect(0).unwrap();
        let last = layout.cell_rect(3).unwrap();
        assert_eq!(layout.hit_test(first.x, first.y), Some(0));
        assert_eq!(layout.hit_test(last.x + last.w - 1, last.y + last.h - 1), Some(3));
        assert_eq!(layout.cell_rect(4), None);
    }

    #[test]
    fn grid_gaps_and_outside_points_miss() {
        let layout = GridLayout::fit(Rect::new(0, 0, 100, 100), 4, 2, 10);
        let first = layout.cell_rect(0).unwrap();
        assert_eq!(layout.hit_test(first.x + first.w, first.y), None);
        assert_eq!(layout.hit_test(0, 0), None);
        assert_eq!(layout.hit_test(99, 99), None);
    }

    #[test]
    fn partial_last_row_does_not_hit_missing_cells() {
        let layout = GridLayout::fit(Rect::new(0, 0, 90, 90), 3, 2, 0);
        let missing = Rect::new(layout.origin.0 + layout.cell, layout.origin.1 + layout.cell, 1, 1);
        assert_eq!(layout.hit_test(missing.x, missing.y), None);
    }

    #[test]
    fn columns_for_is_ceil_sqrt() {
        assert_eq!(GridLayout::columns_for(4), 2);
        assert_eq!(GridLayout::columns_for(12), 4);
        assert_eq!(GridLayout::columns_for(16), 4);
        assert_eq!(GridLayout::columns_for(18), 5);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let size = SurfaceSize::new(4, 4);
        let mut surface = RgbaBufferSurface::new(size);
        fill_rect(surface.frame_mut(), size, Rect::new(2, 2, 10, 10), [9, 8, 7, 255]);

        assert_eq!(surface.pixel(3, 3), Some([9, 8, 7, 255]));
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blend_rect_mixes_with_background() {
        let size = SurfaceSize::new(1, 1);
        let mut surface = RgbaBufferSurface::new(size);
        clear(surface.frame_mut(), size, [0, 0, 0, 255]);
        blend_rect(surface.frame_mut(), size, Rect::new(0, 0, 1, 1), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));

        clear(surface.frame_mut(), size, [0, 0, 0, 255]);
        blend_rect(surface.frame_mut(), size, Rect::new(0, 0, 1, 1), [200, 0, 0, 0]);
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));
    }
}
