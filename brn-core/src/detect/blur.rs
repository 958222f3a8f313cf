use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Normalized 1D Gaussian kernel of odd length `size`
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f32> {
    let half = (size / 2) as f64;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - half;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|w| (w / sum) as f32).collect()
}

/// Separable convolution with `kernel` along rows and columns
///
/// Filtering runs in `f32`; the result is rounded back to 8 bits.
pub fn gaussian_blur(src: &GrayImage, kernel: &[f32]) -> GrayImage {
    let (w, h) = src.dimensions();
    let plane: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w, h, |x, y| Luma([src.get_pixel(x, y)[0] as f32]));

    let blurred = separable_filter_equal(&plane, kernel);

    GrayImage::from_fn(w, h, |x, y| {
        let v = blurred.get_pixel(x, y)[0];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}
