//! Annotation primitives drawn straight into a frame
//!
//! Coordinates are signed so shapes may hang over the frame border; pixels
//! outside the frame are skipped. Loops only visit pixels inside the frame,
//! so the cost is bounded by the frame size whatever the shape size.

use std::ops::RangeInclusive;

use brn_core::Frame;
use image::Rgb;

/// Detection marker and outline color
pub const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Reference box color
pub const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

#[inline]
fn put(frame: &mut Frame, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= frame.width() as i64 || y >= frame.height() as i64 {
        return;
    }
    frame.put_rgb(x as usize, y as usize, color);
}

/// `[lo, hi]` clipped to `[0, len)`
fn clip(lo: i64, hi: i64, len: usize) -> RangeInclusive<i64> {
    lo.max(0)..=hi.min(len as i64 - 1)
}

/// Disk of `radius` around `center`
pub fn fill_circle(frame: &mut Frame, center: (i64, i64), radius: i64, color: Rgb<u8>) {
    let (cx, cy) = center;
    let r2 = radius.saturating_mul(radius);
    for y in clip(cy.saturating_sub(radius), cy.saturating_add(radius), frame.height()) {
        for x in clip(cx.saturating_sub(radius), cx.saturating_add(radius), frame.width()) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                put(frame, x, y, color);
            }
        }
    }
}

/// Ring of width `thickness` centered on the circle of `radius`
pub fn circle_outline(
    frame: &mut Frame,
    center: (i64, i64),
    radius: i64,
    thickness: u32,
    color: Rgb<u8>,
) {
    let (cx, cy) = center;
    let half = thickness.max(1) as f64 / 2.0;
    let reach = radius.saturating_add(half.ceil() as i64);
    for y in clip(cy.saturating_sub(reach), cy.saturating_add(reach), frame.height()) {
        for x in clip(cx.saturating_sub(reach), cx.saturating_add(reach), frame.width()) {
            let (dx, dy) = ((x - cx) as f64, (y - cy) as f64);
            let d = (dx * dx + dy * dy).sqrt();
            if (d - radius as f64).abs() <= half {
                put(frame, x, y, color);
            }
        }
    }
}

/// Outline of the `width` x `height` box whose top-left pixel is `origin`
///
/// Lines of `thickness` are centered on the box border.
pub fn rectangle_outline(
    frame: &mut Frame,
    origin: (i64, i64),
    width: i64,
    height: i64,
    thickness: u32,
    color: Rgb<u8>,
) {
    if width <= 0 || height <= 0 {
        return;
    }
    let (x0, y0) = origin;
    let (x1, y1) = (x0 + width - 1, y0 + height - 1);
    let h = (thickness.max(1) / 2) as i64;

    for y in clip(y0 - h, y1 + h, frame.height()) {
        for x in clip(x0 - h, x1 + h, frame.width()) {
            let inner = x > x0 + h && x < x1 - h && y > y0 + h && y < y1 - h;
            if !inner {
                put(frame, x, y, color);
            }
        }
    }
}
