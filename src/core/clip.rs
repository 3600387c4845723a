use smallvec::SmallVec;

/// Axis-aligned rectangle in pixel space (`y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Sub-rectangle from fractional bounds `[x0, y0, w, h]` measured from
    /// the bottom-left corner, the usual convention for axes placement.
    #[must_use]
    pub fn fraction(self, bounds: [f64; 4]) -> Self {
        let [x0, y0, w, h] = bounds;
        Self {
            left: self.left + x0 * self.width,
            top: self.bottom() - (y0 + h) * self.height,
            width: w * self.width,
            height: h * self.height,
        }
    }

    /// Intersection with `other`, or `None` when they do not overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > left && bottom > top).then(|| Self::new(left, top, right - left, bottom - top))
    }
}

/// Clips a segment to `rect` (Liang–Barsky). Returns `None` when the segment
/// lies entirely outside.
#[must_use]
pub fn clip_segment(
    rect: PixelRect,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    for (p, q) in [
        (-dx, x1 - rect.left),
        (dx, rect.right() - x1),
        (-dy, y1 - rect.top),
        (dy, rect.bottom() - y1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    Some((
        (x1 + t0 * dx, y1 + t0 * dy),
        (x1 + t1 * dx, y1 + t1 * dy),
    ))
}

/// Parts of a segment lying outside `rect`, used to keep lines from showing
/// through an opaque region painted above them.
#[must_use]
pub fn clip_segment_outside(
    rect: PixelRect,
    start: (f64, f64),
    end: (f64, f64),
) -> SmallVec<[((f64, f64), (f64, f64)); 2]> {
    let mut pieces = SmallVec::new();
    let Some((inside_start, inside_end)) = clip_segment(rect, start, end) else {
        pieces.push((start, end));
        return pieces;
    };
    if inside_start != start {
        pieces.push((start, inside_start));
    }
    if inside_end != end {
        pieces.push((inside_end, end));
    }
    pieces
}
