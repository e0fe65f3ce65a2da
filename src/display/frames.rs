// ---------------------------------------------------------------------------
// Frame sequence for animated export
// ---------------------------------------------------------------------------

/// User-editable export range; 1-based slice indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
    pub ping_pong: bool,
}

impl FrameRange {
    /// Whole axis, forward only.
    pub fn full(extent: usize) -> Self {
        Self {
            start: 1,
            stop: extent.max(1),
            step: 1,
            ping_pong: false,
        }
    }

    pub fn frames(&self, extent: usize) -> Vec<usize> {
        build_frames(self.start, self.stop, self.step, self.ping_pong, extent)
    }
}

/// Ordered slice indices to render.
///
/// `start`/`stop` are clamped into `[1, extent]` and `step` is at least 1.
/// `start > stop` (after clamping) gives an empty sequence. With `ping_pong`
/// the sequence runs forward then back without repeating either endpoint,
/// e.g. `[1, 2, 3, 4]` → `[1, 2, 3, 4, 3, 2]`.
pub fn build_frames(
    start: usize,
    stop: usize,
    step: usize,
    ping_pong: bool,
    extent: usize,
) -> Vec<usize> {
    if extent == 0 {
        return Vec::new();
    }
    let start = start.clamp(1, extent);
    let stop = stop.clamp(1, extent);
    let step = step.max(1);

    if start > stop {
        return Vec::new();
    }
    let mut frames: Vec<usize> = (start..=stop).step_by(step).collect();

    if ping_pong && frames.len() >= 2 {
        let back: Vec<usize> = frames[1..frames.len() - 1].iter().rev().copied().collect();
        frames.extend(back);
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_pong() {
        assert_eq!(build_frames(1, 4, 1, true, 10), vec![1, 2, 3, 4, 3, 2]);
    }

    #[test]
    fn test_forward_only() {
        assert_eq!(build_frames(1, 4, 1, false, 10), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_single_frame_not_bounced() {
        assert_eq!(build_frames(1, 1, 1, true, 10), vec![1]);
    }

    #[test]
    fn test_two_frames_ping_pong() {
        assert_eq!(build_frames(3, 4, 1, true, 10), vec![3, 4]);
    }

    #[test]
    fn test_stride_and_ping_pong() {
        assert_eq!(build_frames(2, 9, 3, false, 10), vec![2, 5, 8]);
        assert_eq!(build_frames(2, 9, 3, true, 10), vec![2, 5, 8, 5]);
    }

    #[test]
    fn test_inputs_clamped() {
        assert_eq!(build_frames(0, 99, 0, false, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(build_frames(5, 2, 1, false, 10).is_empty());
        assert!(build_frames(5, 2, 1, true, 10).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let a = FrameRange { start: 2, stop: 7, step: 2, ping_pong: true }.frames(8);
        let b = build_frames(2, 7, 2, true, 8);
        assert_eq!(a, b);
        assert_eq!(a, vec![2, 4, 6, 4]);
    }

    #[test]
    fn test_full_range() {
        assert_eq!(FrameRange::full(3).frames(3), vec![1, 2, 3]);
    }
}
