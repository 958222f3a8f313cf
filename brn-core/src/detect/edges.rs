use std::collections::VecDeque;

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::Array2;

// tan(22.5 deg) and tan(67.5 deg), bounds of the gradient direction sectors
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Horizontal and vertical image derivatives
#[derive(Debug, Clone)]
pub struct Gradients {
    pub dx: Array2<f32>,
    pub dy: Array2<f32>,
}

impl Gradients {
    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }

    /// L1 gradient magnitude at `(y, x)`
    #[inline]
    pub fn magnitude(&self, y: usize, x: usize) -> f32 {
        self.dx[[y, x]].abs() + self.dy[[y, x]].abs()
    }
}

/// Edge pixel with its gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: usize,
    pub y: usize,
    pub dx: f32,
    pub dy: f32,
}

/// 3x3 Sobel derivatives, replicating the border pixels
pub fn sobel(src: &GrayImage) -> Gradients {
    let gx = horizontal_sobel(src);
    let gy = vertical_sobel(src);
    let (w, h) = src.dimensions();
    let shape = (h as usize, w as usize);

    Gradients {
        dx: Array2::from_shape_fn(shape, |(y, x)| gx.get_pixel(x as u32, y as u32)[0] as f32),
        dy: Array2::from_shape_fn(shape, |(y, x)| gy.get_pixel(x as u32, y as u32)[0] as f32),
    }
}

/// Canny edges: non-maximum suppression then hysteresis between `low` and `high`
///
/// The outermost rows and columns never hold edges.
pub fn canny(gradients: &Gradients, low: f32, high: f32) -> Vec<EdgePoint> {
    let (rows, cols) = gradients.dim();
    if rows < 3 || cols < 3 {
        return Vec::new();
    }

    // 0 = suppressed, 1 = weak, 2 = strong
    let mut class = Array2::<u8>::zeros((rows, cols));
    let mut queue = VecDeque::new();

    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            let m = gradients.magnitude(y, x);
            if m <= low {
                continue;
            }

            let gx = gradients.dx[[y, x]];
            let gy = gradients.dy[[y, x]];
            let (ax, ay) = (gx.abs(), gy.abs());
            let ((y1, x1), (y2, x2)) = if ay <= ax * TAN_22_5 {
                ((y, x - 1), (y, x + 1))
            } else if ay >= ax * TAN_67_5 {
                ((y - 1, x), (y + 1, x))
            } else if (gx > 0.0) == (gy > 0.0) {
                ((y - 1, x - 1), (y + 1, x + 1))
            } else {
                ((y - 1, x + 1), (y + 1, x - 1))
            };

            // Asymmetric comparison keeps one pixel on flat ridges
            if m > gradients.magnitude(y1, x1) && m >= gradients.magnitude(y2, x2) {
                if m > high {
                    class[[y, x]] = 2;
                    queue.push_back((y, x));
                } else {
                    class[[y, x]] = 1;
                }
            }
        }
    }

    // Promote weak pixels 8-connected to strong ones
    while let Some((y, x)) = queue.pop_front() {
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if class[[ny, nx]] == 1 {
                    class[[ny, nx]] = 2;
                    queue.push_back((ny, nx));
                }
            }
        }
    }

    let mut edges = Vec::new();
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            if class[[y, x]] == 2 {
                edges.push(EdgePoint {
                    x,
                    y,
                    dx: gradients.dx[[y, x]],
                    dy: gradients.dy[[y, x]],
                });
            }
        }
    }
    edges
}
