//! Pre- and post-processing around the model call.

use image::DynamicImage;
use image::imageops::FilterType;

/// Resize to `width x height`, convert to RGB, scale to [0, 1] and lay out as planar NCHW (N = 1).
pub fn preprocess(image: &DynamicImage, width: u32, height: u32) -> Vec<f32> {
    let rgb = image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();
    let plane = width as usize * height as usize;
    let mut tensor = vec![0.0_f32; 3 * plane];
    for (i, px) in rgb.pixels().enumerate() {
        for c in 0..3 {
            tensor[c * plane + i] = f32::from(px[c]) / 255.0;
        }
    }
    tensor
}

/// In-place softmax, shifted by the max score for stability. No-op on empty input.
pub fn softmax(scores: &mut [f32]) {
    let Some(max) = scores.iter().copied().reduce(f32::max) else {
        return;
    };
    let mut sum = 0.0_f32;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
}

/// Indices and scores of the `k` highest scores, best first. Ties keep the lower index first.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k);
    indexed
}
