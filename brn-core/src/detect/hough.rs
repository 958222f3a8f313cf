use nalgebra::Point2;
use ndarray::Array2;

use super::edges::EdgePoint;
use super::{Circle, DetectionParams};

/// Gradient Hough transform over Canny edge pixels
///
/// Each edge pixel votes along its gradient line, in both directions, for
/// every radius in `[min_radius, max_radius]`. Accumulator cell `(i, j)` is
/// centered on image point `(j * dp, i * dp)`. Local maxima above
/// `accum_threshold` become candidate centers, visited in descending vote
/// order; each accepted center gets the radius supported by the most edge
/// pixels.
pub fn hough_circles(
    edges: &[EdgePoint],
    (rows, cols): (usize, usize),
    params: &DetectionParams,
) -> Vec<Circle> {
    if edges.is_empty() || rows == 0 || cols == 0 {
        return Vec::new();
    }

    let dp = params.accum_resolution;
    let acc = accumulate(edges, rows, cols, params);
    let centers = find_centers(&acc, params.accum_threshold);

    let min_r = params.min_radius as f64;
    let max_r = params.max_radius as f64;
    let min_dist2 = params.min_center_distance * params.min_center_distance;
    let mut circles: Vec<Circle> = Vec::new();
    let mut dists = Vec::with_capacity(edges.len());

    for (i, j) in centers {
        let center = refine_center(&acc, i, j, dp);

        let crowded = circles.iter().any(|c| {
            let (dx, dy) = (c.center.x - center.x, c.center.y - center.y);
            dx * dx + dy * dy < min_dist2
        });
        if crowded {
            continue;
        }

        dists.clear();
        dists.extend(edges.iter().filter_map(|e| {
            let (dx, dy) = (e.x as f64 - center.x, e.y as f64 - center.y);
            let d = (dx * dx + dy * dy).sqrt();
            (min_r..=max_r).contains(&d).then_some(d)
        }));
        dists.sort_by(|a, b| a.total_cmp(b));

        let Some((radius, support)) = densest_radius(&dists, dp) else {
            continue;
        };
        if support as f64 > params.accum_threshold {
            circles.push(Circle {
                center,
                radius,
                support,
            });
        }
    }

    circles
}

fn accumulate(
    edges: &[EdgePoint],
    rows: usize,
    cols: usize,
    params: &DetectionParams,
) -> Array2<u32> {
    let dp = params.accum_resolution;
    let arows = ((rows - 1) as f64 / dp).round() as usize + 1;
    let acols = ((cols - 1) as f64 / dp).round() as usize + 1;
    let mut acc = Array2::<u32>::zeros((arows, acols));

    for e in edges {
        let (gx, gy) = (e.dx as f64, e.dy as f64);
        let mag = (gx * gx + gy * gy).sqrt();
        if mag == 0.0 {
            continue;
        }
        let (ux, uy) = (gx / mag, gy / mag);

        for sign in [1.0, -1.0] {
            for r in params.min_radius..=params.max_radius {
                let r = sign * r as f64;
                let ax = ((e.x as f64 + ux * r) / dp).round();
                let ay = ((e.y as f64 + uy * r) / dp).round();
                // Points only move further out as r grows
                if ax < 0.0 || ay < 0.0 || ax >= acols as f64 || ay >= arows as f64 {
                    break;
                }
                acc[[ay as usize, ax as usize]] += 1;
            }
        }
    }

    acc
}

/// Cells above `threshold` that beat their 4-neighborhood, strongest first
fn find_centers(acc: &Array2<u32>, threshold: f64) -> Vec<(usize, usize)> {
    let (arows, acols) = acc.dim();
    let at = |i: usize, j: usize| acc[[i, j]];
    let mut centers = Vec::new();

    for i in 0..arows {
        for j in 0..acols {
            let v = at(i, j);
            if v as f64 <= threshold {
                continue;
            }
            // Ties go to the upper-left cell of a plateau
            let is_peak = (j == 0 || v > at(i, j - 1))
                && (j + 1 == acols || v >= at(i, j + 1))
                && (i == 0 || v > at(i - 1, j))
                && (i + 1 == arows || v >= at(i + 1, j));
            if is_peak {
                centers.push((i, j));
            }
        }
    }

    centers.sort_by(|a, b| at(b.0, b.1).cmp(&at(a.0, a.1)));
    centers
}

/// Vote-weighted centroid of the 3x3 cells around `(i, j)`, in image pixels
fn refine_center(acc: &Array2<u32>, i: usize, j: usize, dp: f64) -> Point2<f64> {
    let (arows, acols) = acc.dim();
    let (mut sx, mut sy, mut sw) = (0.0, 0.0, 0.0);

    for ii in i.saturating_sub(1)..=(i + 1).min(arows - 1) {
        for jj in j.saturating_sub(1)..=(j + 1).min(acols - 1) {
            let w = acc[[ii, jj]] as f64;
            sx += w * jj as f64;
            sy += w * ii as f64;
            sw += w;
        }
    }

    if sw == 0.0 {
        return Point2::new(j as f64 * dp, i as f64 * dp);
    }
    Point2::new(sx / sw * dp, sy / sw * dp)
}

/// Widest-populated window of sorted distances no wider than `width`
///
/// Returns the window's median distance and its size. The smallest radius
/// wins ties.
fn densest_radius(sorted: &[f64], width: f64) -> Option<(f64, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut end = 0;

    for start in 0..sorted.len() {
        end = end.max(start);
        while end < sorted.len() && sorted[end] - sorted[start] <= width {
            end += 1;
        }
        let count = end - start;
        if best.is_none_or(|(s, e)| count > e - s) {
            best = Some((start, end));
        }
    }

    best.map(|(s, e)| (sorted[(s + e - 1) / 2], e - s))
}
