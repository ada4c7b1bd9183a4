use engine::render::{GridLayout, Rect, clear, fill_rect, stroke_rect};
use engine::surface::{RgbaBufferSurface, SurfaceSize};

#[test]
fn grid_is_centred_in_a_wide_area() {
    let area = Rect::new(0, 0, 1920, 1080);
    let grid = GridLayout::fit(area, 16, 4, 10);

    let first = grid.cell_rect(0).unwrap();
    let last = grid.cell_rect(15).unwrap();
    let left = first.x;
    let right = area.w - (last.x + last.w);
    assert!(left.abs_diff(right) <= 1, "left {left} right {right}");
    assert_eq!(first.w, first.h);
    assert_eq!(grid.cell_rect(16), None);
}

#[test]
fn every_cell_centre_hits_its_own_index() {
    let grid = GridLayout::fit(Rect::new(5, 30, 400, 300), 10, GridLayout::columns_for(10), 6);
    for i in 0..10 {
        let r = grid.cell_rect(i).unwrap();
        assert_eq!(grid.hit_test(r.x + r.w / 2, r.y + r.h / 2), Some(i));
    }
}

#[test]
fn stroke_leaves_interior_untouched() {
    let size = SurfaceSize::new(20, 20);
    let mut surface = RgbaBufferSurface::new(size);
    clear(surface.frame_mut(), size, [0, 0, 0, 255]);

    let rect = Rect::new(2, 2, 10, 10);
    stroke_rect(surface.frame_mut(), size, rect, 2, [255, 0, 0, 255]);

    assert_eq!(surface.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(11, 11), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(6, 6), Some([0, 0, 0, 255]));
    assert_eq!(surface.pixel(12, 12), Some([0, 0, 0, 255]));
}

#[test]
fn frame_hash_follows_pixels() {
    let size = SurfaceSize::new(8, 8);
    let mut a = RgbaBufferSurface::new(size);
    let mut b = RgbaBufferSurface::new(size);
    fill_rect(a.frame_mut(), size, Rect::new(1, 1, 2, 2), [9, 9, 9, 255]);
    fill_rect(b.frame_mut(), size, Rect::new(1, 1, 2, 2), [9, 9, 9, 255]);
    assert_eq!(a.hash(), b.hash());

    fill_rect(b.frame_mut(), size, Rect::new(7, 7, 1, 1), [1, 2, 3, 255]);
    assert_ne!(a.hash(), b.hash());
}
