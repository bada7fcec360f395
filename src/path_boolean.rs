//! Flattening paths into line spans for boolean operations.
//!
//! Downstream clipping/boolean code wants straight spans, but also needs to
//! reconstruct shared geometry exactly; each span therefore records the
//! command index it came from and its `t` range within that command.

use crate::path_builder::{
    distance_from_point_to_line, CommandKind, PathSpline,
};
use crate::vector::Vector2;

/// Recursion cap for curve flattening.
const MAX_SEGMENTATION_DEPTH: i32 = 12;

/// A straight span of the flattened path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathCurveSpan {
    /// The kind of the command this span was cut from.
    pub command: CommandKind,
    /// Index of that command in the original spline.
    pub command_index: usize,
    /// Parameter range within the original command covered by this span.
    pub start_t: f64,
    pub end_t: f64,
    pub start: Vector2,
    pub end: Vector2,
    /// The sub-curve's control points, for spans cut from curves.
    pub control1: Vector2,
    pub control2: Vector2,
}

/// One subpath of the flattened path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PathSubpathView {
    pub move_to: Vector2,
    pub spans: Vec<PathCurveSpan>,
    pub closed: bool,
}

/// The whole path flattened into subpaths of line spans.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SegmentedPath {
    pub subpaths: Vec<PathSubpathView>,
}

fn max_control_distance(p0: Vector2, p1: Vector2, p2: Vector2, p3: Vector2) -> f64 {
    distance_from_point_to_line(p1, p0, p3).max(distance_from_point_to_line(p2, p0, p3))
}

#[allow(clippy::too_many_arguments)]
fn split_cubic(
    p0: Vector2,
    p1: Vector2,
    p2: Vector2,
    p3: Vector2,
    start_t: f64,
    end_t: f64,
    tolerance: f64,
    command_index: usize,
    depth: i32,
    spans: &mut Vec<PathCurveSpan>,
) {
    if depth >= MAX_SEGMENTATION_DEPTH || max_control_distance(p0, p1, p2, p3) <= tolerance {
        spans.push(PathCurveSpan {
            command: CommandKind::CurveTo,
            command_index,
            start_t,
            end_t,
            start: p0,
            end: p3,
            control1: p1,
            control2: p2,
        });
        return;
    }

    // De Casteljau subdivision at t = 0.5
    let p01 = (p0 + p1) * 0.5;
    let p12 = (p1 + p2) * 0.5;
    let p23 = (p2 + p3) * 0.5;
    let p012 = (p01 + p12) * 0.5;
    let p123 = (p12 + p23) * 0.5;
    let p0123 = (p012 + p123) * 0.5;

    let mid_t = (start_t + end_t) * 0.5;
    split_cubic(p0, p01, p012, p0123, start_t, mid_t, tolerance, command_index, depth + 1, spans);
    split_cubic(p0123, p123, p23, p3, mid_t, end_t, tolerance, command_index, depth + 1, spans);
}

fn current_subpath(segmented: &mut SegmentedPath) -> &mut PathSubpathView {
    if segmented.subpaths.is_empty() {
        segmented.subpaths.push(PathSubpathView::default());
    }
    segmented.subpaths.last_mut().unwrap()
}

/// Flattens `path` into line spans, subdividing curves until their control
/// polygon is within `tolerance` of the chord.
///
/// # Panics
///
/// Panics if `tolerance` is not positive.
pub fn segment_path_for_boolean(path: &PathSpline, tolerance: f64) -> SegmentedPath {
    assert!(tolerance > 0.0);

    let mut segmented = SegmentedPath::default();
    if path.is_empty() {
        return segmented;
    }

    let points = path.points();
    let mut current_point = Vector2::ZERO;
    let mut current_move_to = Vector2::ZERO;

    for (command_index, command) in path.commands().iter().enumerate() {
        match command.kind {
            CommandKind::MoveTo => {
                current_point = points[command.point_index];
                current_move_to = current_point;

                // A move-to after a closed subpath starts a fresh one.
                if segmented
                    .subpaths
                    .last()
                    .map(|subpath| subpath.closed || !subpath.spans.is_empty())
                    .unwrap_or(false)
                {
                    segmented.subpaths.push(PathSubpathView::default());
                }

                let subpath = current_subpath(&mut segmented);
                subpath.move_to = current_point;
            }

            CommandKind::LineTo => {
                let end = points[command.point_index];
                let subpath = current_subpath(&mut segmented);
                subpath.spans.push(PathCurveSpan {
                    command: CommandKind::LineTo,
                    command_index,
                    start_t: 0.0,
                    end_t: 1.0,
                    start: current_point,
                    end,
                    control1: Vector2::ZERO,
                    control2: Vector2::ZERO,
                });
                current_point = end;
            }

            CommandKind::CurveTo => {
                let control1 = points[command.point_index];
                let control2 = points[command.point_index + 1];
                let end = points[command.point_index + 2];
                let subpath = current_subpath(&mut segmented);
                split_cubic(
                    current_point,
                    control1,
                    control2,
                    end,
                    0.0,
                    1.0,
                    tolerance,
                    command_index,
                    0,
                    &mut subpath.spans,
                );
                current_point = end;
            }

            CommandKind::ClosePath => {
                let subpath = current_subpath(&mut segmented);
                subpath.spans.push(PathCurveSpan {
                    command: CommandKind::ClosePath,
                    command_index,
                    start_t: 0.0,
                    end_t: 1.0,
                    start: current_point,
                    end: current_move_to,
                    control1: Vector2::ZERO,
                    control2: Vector2::ZERO,
                });
                subpath.closed = true;
                current_point = current_move_to;
            }
        }
    }

    segmented
}
