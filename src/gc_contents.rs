use crate::error::{EngineError, ErrorCode};
use dna_compare_protocol::{GcWindow, OutlierWindow};

/// Standard deviation used in place of zero, so a flat profile yields z = 0
const ZERO_SD_EPSILON: f64 = 1e-9;

/// Fewer windows than this give no meaningful population spread
const MIN_WINDOWS_FOR_OUTLIERS: usize = 3;

#[inline(always)]
fn count_gc(sequence: &[u8]) -> usize {
    sequence
        .iter()
        .filter(|&&c| c == b'G' || c == b'C')
        .count()
}

#[inline(always)]
fn gc_percent_unchecked(sequence: &[u8]) -> f64 {
    count_gc(sequence) as f64 / sequence.len() as f64 * 100.0
}

/// Percentage of G and C symbols. Every other symbol, ambiguous ones
/// included, counts towards the length only.
pub fn gc_content(sequence: &[u8]) -> Result<f64, EngineError> {
    if sequence.is_empty() {
        return Err(EngineError::empty_sequence("GC content"));
    }
    Ok(gc_percent_unchecked(sequence))
}

/// GC profile over consecutive, non-overlapping windows starting at offset 0.
/// The last window keeps whatever is left and may be shorter.
#[derive(Clone, Debug)]
pub struct GcWindows<'a> {
    sequence: &'a [u8],
    window_size: usize,
    pos: usize,
}

impl Iterator for GcWindows<'_> {
    type Item = GcWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.sequence.len() {
            return None;
        }
        let to = self.sequence.len().min(self.pos + self.window_size);
        let chunk = &self.sequence[self.pos..to];
        let ret = GcWindow {
            start: self.pos + 1,
            end: to,
            gc_percent: gc_percent_unchecked(chunk),
        };
        self.pos = to;
        Some(ret)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.sequence.len().saturating_sub(self.pos);
        let n = left.div_ceil(self.window_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for GcWindows<'_> {}

pub fn sliding_gc(sequence: &[u8], window_size: usize) -> Result<GcWindows<'_>, EngineError> {
    if window_size == 0 {
        return Err(EngineError::new(
            ErrorCode::InvalidInput,
            "GC window size must be >= 1",
        ));
    }
    Ok(GcWindows {
        sequence,
        window_size,
        pos: 0,
    })
}

/// Windows whose GC percentage lies at least `z_threshold` population
/// standard deviations away from the mean, in their original order.
pub fn gc_outliers(windows: &[GcWindow], z_threshold: f64) -> Vec<OutlierWindow> {
    if windows.len() < MIN_WINDOWS_FOR_OUTLIERS {
        return vec![];
    }
    let first = windows[0].gc_percent;
    // Flat profiles skip the float sums, whose rounding leaves a tiny spread
    let (mean, sd) = if windows.iter().all(|w| w.gc_percent == first) {
        (first, ZERO_SD_EPSILON)
    } else {
        let n = windows.len() as f64;
        let mean = windows.iter().map(|w| w.gc_percent).sum::<f64>() / n;
        let variance = windows
            .iter()
            .map(|w| (w.gc_percent - mean).powi(2))
            .sum::<f64>()
            / n;
        let sd = variance.sqrt();
        (mean, if sd == 0.0 { ZERO_SD_EPSILON } else { sd })
    };
    windows
        .iter()
        .filter_map(|w| {
            let z_score = (w.gc_percent - mean) / sd;
            (z_score.abs() >= z_threshold).then_some(OutlierWindow {
                window: *w,
                z_score,
            })
        })
        .collect()
}
