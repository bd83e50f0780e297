//! Zero-mean normalized cross-correlation search.
//!
//! The score is the correlation coefficient between the template and each
//! frame window: both sides are mean-normalized, so it is invariant to
//! uniform brightness and contrast offsets and conceptually lives in [-1, 1].
//! Window sums come from integral images; the cross term is the naive
//! per-window loop, so the total cost scales with frame area x template area.
//! The detection interval gate exists to amortize exactly that cost.

use image::GrayImage;

/// Best alignment of the template inside a frame.
///
/// `(x, y)` is the top-left frame pixel where the template best aligns. The
/// score is reported even when it falls below any acceptance threshold, so
/// callers can observe near-misses; deciding what counts as a hit is the
/// scheduler's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScan {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

/// Scan `frame` for the window where `template` correlates best.
///
/// Fails closed (`None`) when either image is zero-sized or the template is
/// larger than the frame in either dimension. Flat windows and flat
/// templates produce a score of 0.0 rather than dividing by zero.
pub fn best_match(frame: &GrayImage, template: &GrayImage) -> Option<MatchScan> {
    let (fw, fh) = frame.dimensions();
    let (tw, th) = template.dimensions();
    if fw == 0 || fh == 0 || tw == 0 || th == 0 {
        return None;
    }
    if tw > fw || th > fh {
        return None;
    }

    let n = f64::from(tw) * f64::from(th);
    let t_mean = template.as_raw().iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let t_diff: Vec<f64> = template
        .as_raw()
        .iter()
        .map(|&v| f64::from(v) - t_mean)
        .collect();
    let t_norm: f64 = t_diff.iter().map(|d| d * d).sum();

    let (sums, squares) = integral_images(frame);
    let raw = frame.as_raw();

    let mut best = MatchScan {
        x: 0,
        y: 0,
        score: f32::MIN,
    };

    for y in 0..=(fh - th) {
        for x in 0..=(fw - tw) {
            let win_sum = window_sum(&sums, fw, x, y, tw, th) as f64;
            let win_sq = window_sum(&squares, fw, x, y, tw, th) as f64;
            let f_norm = (win_sq - win_sum * win_sum / n).max(0.0);

            // Sum of t_diff is zero, so this cross term already equals the
            // mean-normalized numerator.
            let mut cross = 0.0f64;
            for ty in 0..th {
                let f_row = &raw[((y + ty) * fw + x) as usize..][..tw as usize];
                let t_row = &t_diff[(ty * tw) as usize..][..tw as usize];
                for (t, &f) in t_row.iter().zip(f_row) {
                    cross += t * f64::from(f);
                }
            }

            let denom = (t_norm * f_norm).sqrt();
            let score = if denom > f64::EPSILON {
                (cross / denom) as f32
            } else {
                0.0
            };

            if score > best.score {
                best = MatchScan { x, y, score };
            }
        }
    }

    Some(best)
}

/// Integral images of pixel values and squared values, with a zero border so
/// any window sum is four lookups.
fn integral_images(frame: &GrayImage) -> (Vec<u64>, Vec<u64>) {
    let (w, h) = frame.dimensions();
    let stride = (w + 1) as usize;
    let mut sums = vec![0u64; stride * (h + 1) as usize];
    let mut squares = vec![0u64; stride * (h + 1) as usize];
    let raw = frame.as_raw();

    for y in 0..h as usize {
        let mut row_sum = 0u64;
        let mut row_sq = 0u64;
        for x in 0..w as usize {
            let v = u64::from(raw[y * w as usize + x]);
            row_sum += v;
            row_sq += v * v;
            let i = (y + 1) * stride + x + 1;
            sums[i] = sums[i - stride] + row_sum;
            squares[i] = squares[i - stride] + row_sq;
        }
    }

    (sums, squares)
}

fn window_sum(integral: &[u64], frame_width: u32, x: u32, y: u32, w: u32, h: u32) -> u64 {
    let stride = (frame_width + 1) as usize;
    let (x0, y0) = (x as usize, y as usize);
    let (x1, y1) = ((x + w) as usize, (y + h) as usize);
    integral[y1 * stride + x1] + integral[y0 * stride + x0]
        - integral[y0 * stride + x1]
        - integral[y1 * stride + x0]
}
