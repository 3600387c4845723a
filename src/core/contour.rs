//! Iso-lines over a [`ValueGrid`] using marching squares.
//!
//! Lines are produced in grid index space: `x` is a fractional column index
//! and `y` a fractional row index. Callers map them onto their own
//! coordinates (cell centres for heatmaps, axis values for surfaces).

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::core::grid::ValueGrid;
use crate::core::scale::nice_ticks;
use crate::core::types::DataPoint;

/// One connected iso-line.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<DataPoint>,
    pub closed: bool,
}

type Segment = (DataPoint, DataPoint);
type PointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// Picks up to `count` "nice" levels strictly inside `(min, max)`.
#[must_use]
pub fn contour_levels(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() || max <= min {
        return Vec::new();
    }

    let mut target = count + 2;
    loop {
        let levels: Vec<f64> = nice_ticks(min, max, target)
            .positions
            .into_iter()
            .filter(|&level| level > min && level < max)
            .collect();
        if levels.len() <= count || target <= 2 {
            return levels;
        }
        target -= 1;
    }
}

/// Traces iso-lines for every level.
#[must_use]
pub fn trace_contours(grid: &ValueGrid, levels: &[f64]) -> Vec<ContourLine> {
    levels
        .iter()
        .flat_map(|&level| {
            connect_segments(march_squares(grid, level))
                .into_iter()
                .map(move |(points, closed)| ContourLine {
                    level,
                    points,
                    closed,
                })
        })
        .collect()
}

fn march_squares(grid: &ValueGrid, level: f64) -> Vec<Segment> {
    let rows = grid.rows();
    let columns = grid.columns();
    if rows < 2 || columns < 2 {
        return Vec::new();
    }

    let values = grid.values();
    let mut segments = Vec::new();
    for row in 0..rows - 1 {
        for column in 0..columns - 1 {
            let tl = values[row * columns + column];
            let tr = values[row * columns + column + 1];
            let bl = values[(row + 1) * columns + column];
            let br = values[(row + 1) * columns + column + 1];
            if !(tl.is_finite() && tr.is_finite() && bl.is_finite() && br.is_finite()) {
                continue;
            }

            let mut case = 0_u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }

            let x = column as f64;
            let y = row as f64;
            segments.extend(cell_segments(case, x, y, [tl, tr, br, bl], level));
        }
    }
    segments
}

fn cell_segments(case: u8, x: f64, y: f64, corners: [f64; 4], level: f64) -> SmallVec<[Segment; 2]> {
    let [tl, tr, br, bl] = corners;
    // Shared edges are evaluated with identical arguments from both adjacent
    // cells, so their crossing points compare bit-for-bit equal.
    let top = || interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = || interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = || interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = || interpolate_edge(x, y, x, y + 1.0, tl, bl, level);

    let mut out = SmallVec::new();
    match case {
        1 | 14 => out.push((left(), top())),
        2 | 13 => out.push((top(), right())),
        3 | 12 => out.push((left(), right())),
        4 | 11 => out.push((right(), bottom())),
        5 => {
            out.push((left(), top()));
            out.push((right(), bottom()));
        }
        6 | 9 => out.push((top(), bottom())),
        7 | 8 => out.push((left(), bottom())),
        10 => {
            out.push((top(), right()));
            out.push((left(), bottom()));
        }
        _ => {}
    }
    out
}

fn interpolate_edge(x1: f64, y1: f64, x2: f64, y2: f64, v1: f64, v2: f64, level: f64) -> DataPoint {
    // Halved differences stay finite for values near f64::MAX.
    let span = v2 / 2.0 - v1 / 2.0;
    if span.abs() < f64::EPSILON / 2.0 {
        return DataPoint::new((x1 + x2) * 0.5, (y1 + y2) * 0.5);
    }
    let t = ((level / 2.0 - v1 / 2.0) / span).clamp(0.0, 1.0);
    DataPoint::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

fn key(point: DataPoint) -> PointKey {
    (OrderedFloat(point.x), OrderedFloat(point.y))
}

fn connect_segments(segments: Vec<Segment>) -> Vec<(Vec<DataPoint>, bool)> {
    let mut by_endpoint: HashMap<PointKey, SmallVec<[usize; 2]>> = HashMap::new();
    for (index, (start, end)) in segments.iter().enumerate() {
        by_endpoint.entry(key(*start)).or_default().push(index);
        by_endpoint.entry(key(*end)).or_default().push(index);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    let next_from = |point: DataPoint, used: &[bool]| -> Option<usize> {
        by_endpoint
            .get(&key(point))
            .and_then(|candidates| candidates.iter().copied().find(|&index| !used[index]))
    };

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let (start, end) = segments[seed];
        let mut forward = vec![start, end];

        while let Some(index) = next_from(forward[forward.len() - 1], &used) {
            used[index] = true;
            let tail = forward[forward.len() - 1];
            let (a, b) = segments[index];
            forward.push(if key(a) == key(tail) { b } else { a });
        }

        let mut backward = Vec::new();
        let mut head = forward[0];
        while let Some(index) = next_from(head, &used) {
            used[index] = true;
            let (a, b) = segments[index];
            head = if key(a) == key(head) { b } else { a };
            backward.push(head);
        }

        backward.reverse();
        backward.extend(forward);
        let closed = backward.len() > 2 && key(backward[0]) == key(backward[backward.len() - 1]);
        lines.push((backward, closed));
    }

    lines
}
