//! Representation of Bézier paths.
//!
//! A [`PathSpline`] stores a path as one dense array of points and one dense
//! array of commands indexing into it; a cubic curve references three
//! consecutive points (two controls and the end point).  Elliptical arcs are
//! decomposed into cubic segments at construction time, with the generated
//! control points marked *internal* so that vertex iteration (used for marker
//! placement) skips them.
//!
//! Most paths in the wild are short, so both arrays use a [`TinyVec`] with
//! stack space for 32 entries before spilling to the heap.

use tinyvec::TinyVec;

use std::f64::consts::PI;

use crate::rect::Rect;
use crate::transform::Transform;
use crate::util::{clamp, near_equals, near_zero, near_zero_eps, solve_quadratic};
use crate::vector::Vector2;

/// Tolerance for the curve-flattening numerics.
const TOLERANCE: f64 = 0.001;

/// Recursion cap for the subdivision algorithms.
const MAX_RECURSION_DEPTH: i32 = 10;

/// Fill rule for [`PathSpline::is_inside`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// The command kinds of a path spline.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum CommandKind {
    #[default]
    MoveTo,
    LineTo,
    CurveTo,
    ClosePath,
}

/// One command plus the index of its first point.
///
/// `MoveTo`/`LineTo`/`ClosePath` reference one point; `CurveTo` references
/// three consecutive points (control 1, control 2, end).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub point_index: usize,
    /// On the `MoveTo` that opens a subpath: index of the matching
    /// `ClosePath` command, once one is seen.
    pub close_path_index: Option<usize>,
    /// Arc decomposition marks its generated segments so vertex iteration
    /// skips them.
    pub is_internal_point: bool,
}

impl Command {
    fn new(kind: CommandKind, point_index: usize) -> Command {
        Command {
            kind,
            point_index,
            close_path_index: None,
            is_internal_point: false,
        }
    }
}

/// A point on the path plus the direction a marker there should face.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub point: Vector2,
    /// Normalized; halfway between the adjacent tangents at corners.
    pub orientation: Vector2,
}

/// A mutable path of lines and cubic Bézier curves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PathSpline {
    points: TinyVec<[Vector2; 32]>,
    commands: TinyVec<[Command; 32]>,

    /// Point index of the last `MoveTo`, for `ClosePath` and auto-reopen.
    move_to_point_index: Option<usize>,
    /// Command index of the `MoveTo` that opened the current subpath.
    current_segment_start_command_index: Option<usize>,
    /// After a `ClosePath`, the next draw command re-opens the subpath at the
    /// close point.
    may_auto_reopen: bool,
}

impl PathSpline {
    pub fn new() -> PathSpline {
        PathSpline::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn points(&self) -> &[Vector2] {
        &self.points
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Begins a new subpath.  Consecutive move-tos collapse; the last wins.
    pub fn move_to(&mut self, point: Vector2) {
        if let Some(last) = self.commands.last() {
            if last.kind == CommandKind::MoveTo && !self.may_auto_reopen {
                // The last move-to owns a unique point, so replace it.
                debug_assert_eq!(last.point_index + 1, self.points.len());
                let index = last.point_index;
                self.points[index] = point;
                self.may_auto_reopen = false;
                return;
            }
        }

        let point_index = self.points.len();
        let command_index = self.commands.len();
        self.points.push(point);
        self.commands.push(Command::new(CommandKind::MoveTo, point_index));

        self.move_to_point_index = Some(point_index);
        self.current_segment_start_command_index = Some(command_index);
        self.may_auto_reopen = false;
    }

    /// # Panics
    ///
    /// Panics if no move-to precedes it.
    pub fn line_to(&mut self, point: Vector2) {
        assert!(
            self.move_to_point_index.is_some(),
            "line_to without calling move_to first"
        );

        self.maybe_auto_reopen();

        let index = self.points.len();
        self.points.push(point);
        self.commands.push(Command::new(CommandKind::LineTo, index));
    }

    /// # Panics
    ///
    /// Panics if no move-to precedes it.
    pub fn curve_to(&mut self, control1: Vector2, control2: Vector2, end: Vector2) {
        assert!(
            self.move_to_point_index.is_some(),
            "curve_to without calling move_to first"
        );

        self.maybe_auto_reopen();

        let index = self.points.len();
        self.points.push(control1);
        self.points.push(control2);
        self.points.push(end);
        self.commands.push(Command::new(CommandKind::CurveTo, index));
    }

    /// Appends an elliptical arc from the current point, decomposed into at
    /// most four cubic segments per SVG 2's endpoint-to-center conversion.
    ///
    /// # Panics
    ///
    /// Panics if no move-to precedes it.
    pub fn arc_to(
        &mut self,
        radius: Vector2,
        rotation_radians: f64,
        large_arc: bool,
        sweep: bool,
        end: Vector2,
    ) {
        assert!(
            self.move_to_point_index.is_some(),
            "arc_to without calling move_to first"
        );

        self.maybe_auto_reopen();

        if let Some(arc) = decompose_arc_into_cubics(
            self.current_point(),
            end,
            radius,
            rotation_radians,
            large_arc,
            sweep,
        ) {
            self.append_join(&arc, true);
        }
    }

    /// Draws a line back to the subpath start.  The next draw command after
    /// this re-opens the subpath at that point.
    ///
    /// # Panics
    ///
    /// Panics if there is no open path.
    pub fn close_path(&mut self) {
        assert!(
            self.move_to_point_index.is_some() || !self.commands.is_empty(),
            "close_path without an open path"
        );

        let move_to_point_index = self.move_to_point_index.unwrap();
        let segment_start = self
            .current_segment_start_command_index
            .expect("close_path requires an open segment");

        let command_index = self.commands.len();
        self.commands
            .push(Command::new(CommandKind::ClosePath, move_to_point_index));
        self.commands[segment_start].close_path_index = Some(command_index);

        self.may_auto_reopen = true;
        self.current_segment_start_command_index = None;
    }

    /// Appends a closed ellipse approximated by four cubic segments.
    pub fn ellipse(&mut self, center: Vector2, radius: Vector2) {
        // (4/3)·(sqrt(2) - 1), the standard magic constant for approximating
        // a quarter circle with one cubic.
        let kappa = 0.552284749831;

        let r = radius;
        self.move_to(center + Vector2::new(r.x, 0.0));

        self.curve_to(
            center + Vector2::new(r.x, r.y * kappa),
            center + Vector2::new(r.x * kappa, r.y),
            center + Vector2::new(0.0, r.y),
        );
        self.curve_to(
            center + Vector2::new(-r.x * kappa, r.y),
            center + Vector2::new(-r.x, r.y * kappa),
            center + Vector2::new(-r.x, 0.0),
        );
        self.curve_to(
            center + Vector2::new(-r.x, -r.y * kappa),
            center + Vector2::new(-r.x * kappa, -r.y),
            center + Vector2::new(0.0, -r.y),
        );
        self.curve_to(
            center + Vector2::new(r.x * kappa, -r.y),
            center + Vector2::new(r.x, -r.y * kappa),
            center + Vector2::new(r.x, 0.0),
        );

        self.close_path();
    }

    pub fn circle(&mut self, center: Vector2, radius: f64) {
        self.ellipse(center, Vector2::new(radius, radius));
    }

    /// The end point of the last command.
    ///
    /// # Panics
    ///
    /// Panics on an empty spline.
    pub fn current_point(&self) -> Vector2 {
        assert!(!self.commands.is_empty());

        self.end_point(self.commands.len() - 1)
    }

    /// Total length, measuring curves by adaptive subdivision.
    pub fn path_length(&self) -> f64 {
        let mut total = 0.0;
        let mut start = Vector2::ZERO;

        for command in &self.commands {
            match command.kind {
                CommandKind::MoveTo => {
                    start = self.points[command.point_index];
                }
                CommandKind::LineTo | CommandKind::ClosePath => {
                    let end = self.points[command.point_index];
                    total += start.distance(end);
                    start = end;
                }
                CommandKind::CurveTo => {
                    let curve = [
                        start,
                        self.points[command.point_index],
                        self.points[command.point_index + 1],
                        self.points[command.point_index + 2],
                    ];
                    total += subdivide_and_measure_cubic(&curve, TOLERANCE, 0);
                    start = curve[3];
                }
            }
        }

        total
    }

    /// Tight bounds, with curve extrema found analytically.
    ///
    /// # Panics
    ///
    /// Panics on an empty spline.
    pub fn bounds(&self) -> Rect {
        self.transformed_bounds(&Transform::identity())
    }

    /// Bounds after transforming the path.
    ///
    /// # Panics
    ///
    /// Panics on an empty spline.
    pub fn transformed_bounds(&self, path_from_target: &Transform) -> Rect {
        assert!(!self.is_empty());

        let mut bounds = Rect::empty_at(path_from_target.transform_position(self.points[0]));
        let mut current = Vector2::ZERO;

        for (i, command) in self.commands.iter().enumerate() {
            match command.kind {
                CommandKind::MoveTo | CommandKind::LineTo | CommandKind::ClosePath => {
                    current = self.points[command.point_index];
                    bounds.add_point(path_from_target.transform_position(current));
                }

                CommandKind::CurveTo => {
                    let start = current;
                    let control1 = self.points[command.point_index];
                    let control2 = self.points[command.point_index + 1];
                    let end = self.points[command.point_index + 2];

                    bounds.add_point(path_from_target.transform_position(start));
                    bounds.add_point(path_from_target.transform_position(end));
                    current = end;

                    // The derivative of the cubic is the quadratic
                    // 3(P1-P0)(1-t)² + 6(P2-P1)t(1-t) + 3(P3-P2)t²; collect it
                    // into At² + Bt + C per axis and add the in-range roots.
                    let a = 3.0 * (-start + 3.0 * control1 - 3.0 * control2 + end);
                    let b = 6.0 * (start + control2 - 2.0 * control1);
                    let c = 3.0 * (-start + control1);

                    for (a, b, c) in [(a.x, b.x, c.x), (a.y, b.y, c.y)] {
                        if near_zero(a) {
                            if !near_zero(b) {
                                let t = -c / b;
                                if (0.0..=1.0).contains(&t) {
                                    bounds.add_point(
                                        path_from_target.transform_position(self.point_at(i, t)),
                                    );
                                }
                            }
                        } else {
                            let res = solve_quadratic(a, b, c);
                            if res.has_solution {
                                for t in res.solution {
                                    if (0.0..=1.0).contains(&t) {
                                        bounds.add_point(
                                            path_from_target
                                                .transform_position(self.point_at(i, t)),
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        bounds
    }

    /// Bounds including miter-join extrema for the given stroke.
    ///
    /// # Panics
    ///
    /// Panics on an empty spline.
    pub fn stroke_miter_bounds(&self, stroke_width: f64, miter_limit: f64) -> Rect {
        assert!(!self.is_empty());
        debug_assert!(stroke_width > 0.0);
        debug_assert!(miter_limit >= 0.0);

        let mut bounds = Rect::empty_at(self.points[0]);
        let mut current = Vector2::ZERO;

        let mut last_index: Option<usize> = None;
        let mut last_move_to_index: Option<usize> = None;

        for (i, command) in self.commands.iter().enumerate() {
            match command.kind {
                CommandKind::MoveTo => {
                    current = self.points[command.point_index];
                    bounds.add_point(current);

                    last_index = None;
                    last_move_to_index = Some(i);
                }

                CommandKind::ClosePath => {
                    if let Some(last) = last_index {
                        // The closing line forms two joins: incoming segment
                        // to the close, and the close to the subpath start.
                        let last_tangent = self.tangent_at(last, 1.0);
                        let tangent = self.tangent_at(i, 0.0);

                        compute_miter(
                            &mut bounds,
                            current,
                            last_tangent,
                            tangent,
                            stroke_width,
                            miter_limit,
                        );
                        current = self.points[command.point_index];

                        let join_tangent =
                            self.tangent_at(last_move_to_index.expect("close requires move"), 0.0);
                        compute_miter(
                            &mut bounds,
                            current,
                            tangent,
                            join_tangent,
                            stroke_width,
                            miter_limit,
                        );
                    }

                    last_index = None;
                }

                CommandKind::LineTo => {
                    if let Some(last) = last_index {
                        let last_tangent = self.tangent_at(last, 1.0);
                        let tangent = self.tangent_at(i, 0.0);
                        compute_miter(
                            &mut bounds,
                            current,
                            last_tangent,
                            tangent,
                            stroke_width,
                            miter_limit,
                        );
                    }

                    current = self.points[command.point_index];
                    bounds.add_point(current);
                    last_index = Some(i);
                }

                CommandKind::CurveTo => {
                    if let Some(last) = last_index {
                        let last_tangent = self.tangent_at(last, 1.0);
                        let tangent = self.tangent_at(i, 0.0);
                        compute_miter(
                            &mut bounds,
                            current,
                            last_tangent,
                            tangent,
                            stroke_width,
                            miter_limit,
                        );
                    }

                    current = self.points[command.point_index + 2];
                    bounds.add_point(current);
                    last_index = Some(i);
                }
            }
        }

        bounds
    }

    /// Point on the command at `index` for `t` in `[0, 1]`.
    pub fn point_at(&self, index: usize, t: f64) -> Vector2 {
        debug_assert!(index < self.commands.len(), "index out of range");
        debug_assert!((0.0..=1.0).contains(&t), "t out of range");

        let command = &self.commands[index];

        match command.kind {
            CommandKind::MoveTo => self.start_point(index),

            CommandKind::LineTo | CommandKind::ClosePath => {
                let start = self.start_point(index);
                let rev_t = 1.0 - t;

                rev_t * start + t * self.points[command.point_index]
            }

            CommandKind::CurveTo => {
                let start = self.start_point(index);
                let rev_t = 1.0 - t;

                rev_t * rev_t * rev_t * start
                    + 3.0 * t * rev_t * rev_t * self.points[command.point_index]
                    + 3.0 * t * t * rev_t * self.points[command.point_index + 1]
                    + t * t * t * self.points[command.point_index + 2]
            }
        }
    }

    /// Tangent (unnormalized first derivative) at `t` on the command at
    /// `index`.  For a degenerate curve whose derivative vanishes at an
    /// endpoint, a nudged `t` is used instead.
    pub fn tangent_at(&self, index: usize, t: f64) -> Vector2 {
        debug_assert!(index < self.commands.len(), "index out of range");
        debug_assert!((0.0..=1.0).contains(&t), "t out of range");

        let command = &self.commands[index];

        match command.kind {
            CommandKind::MoveTo => {
                if index + 1 < self.commands.len() {
                    self.tangent_at(index + 1, 0.0)
                } else {
                    Vector2::ZERO
                }
            }

            CommandKind::LineTo | CommandKind::ClosePath => {
                self.points[command.point_index] - self.start_point(index)
            }

            CommandKind::CurveTo => {
                let rev_t = 1.0 - t;

                let p_1_0 = self.points[command.point_index] - self.start_point(index);
                let p_2_1 =
                    self.points[command.point_index + 1] - self.points[command.point_index];
                let p_3_2 =
                    self.points[command.point_index + 2] - self.points[command.point_index + 1];

                let derivative = 3.0
                    * (rev_t * rev_t * p_1_0 + 2.0 * t * rev_t * p_2_1 + t * t * p_3_2);

                if near_zero(derivative.length_squared()) {
                    // Coincident control points; nudge t away from the ends.
                    let adjusted = if near_equals(t, 0.0, 1e-6) {
                        0.01
                    } else if near_equals(t, 1.0, 1e-6) {
                        0.99
                    } else {
                        return derivative;
                    };

                    self.tangent_at(index, adjusted)
                } else {
                    derivative
                }
            }
        }
    }

    /// Normal: the tangent rotated a quarter turn.
    pub fn normal_at(&self, index: usize, t: f64) -> Vector2 {
        let tangent = self.tangent_at(index, t);
        Vector2::new(-tangent.y, tangent.x)
    }

    /// The vertices where markers would be placed: subpath start and end
    /// points and every interior corner, with orientations.  Arc-internal
    /// segments contribute no vertices.
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut vertices = Vec::new();

        let mut open_path_command: Option<usize> = None;
        let mut close_path_index: Option<usize> = None;
        let mut just_moved = false;
        let mut was_internal_point = false;

        for (i, command) in self.commands.iter().enumerate() {
            let should_skip = was_internal_point;
            was_internal_point = command.is_internal_point;

            if should_skip {
                continue;
            }

            match command.kind {
                CommandKind::MoveTo => {
                    if open_path_command.is_some() {
                        debug_assert!(i > 0);

                        // End the open subpath with a vertex pointing along
                        // its final segment.
                        let point = self.point_at(i - 1, 1.0);
                        let orientation = self.tangent_at(i - 1, 1.0).normalize();
                        vertices.push(Vertex { point, orientation });
                    }

                    open_path_command = Some(i);
                    close_path_index = command.close_path_index;
                    just_moved = true;
                }

                CommandKind::ClosePath => {
                    let opened =
                        open_path_command.expect("close_path requires an open subpath");
                    debug_assert!(i > 0);

                    let start_point = self.point_at(i - 1, 1.0);
                    let end_point = self.point_at(opened, 0.0);

                    // Skip the corner vertex when the closing line has no
                    // length; it would coincide with the final vertex.
                    if !near_zero((start_point - end_point).length_squared()) {
                        let prev_tangent = self.tangent_at(i - 1, 1.0).normalize();
                        let next_tangent = self.tangent_at(i, 0.0).normalize();

                        vertices.push(Vertex {
                            point: start_point,
                            orientation: interpolate_tangents(prev_tangent, next_tangent),
                        });
                    }

                    // The subpath's start/end vertex faces halfway between
                    // the closing line and the first segment.
                    {
                        let prev_tangent = self.tangent_at(i, 1.0).normalize();
                        let next_tangent = self.tangent_at(opened, 0.0).normalize();

                        vertices.push(Vertex {
                            point: end_point,
                            orientation: interpolate_tangents(prev_tangent, next_tangent),
                        });
                    }

                    open_path_command = None;
                    just_moved = false;
                }

                CommandKind::LineTo | CommandKind::CurveTo => {
                    debug_assert!(i > 0);

                    let start_point = self.point_at(i, 0.0);
                    let start_orientation = self.tangent_at(i, 0.0).normalize();

                    if just_moved {
                        if let Some(close_index) = close_path_index {
                            // Closed subpath: orient between the closing
                            // segment and this one.
                            let close_orientation = self.tangent_at(close_index, 1.0).normalize();
                            vertices.push(Vertex {
                                point: start_point,
                                orientation: interpolate_tangents(
                                    close_orientation,
                                    start_orientation,
                                ),
                            });
                        } else {
                            vertices.push(Vertex {
                                point: start_point,
                                orientation: start_orientation,
                            });
                        }
                    } else {
                        let prev_orientation = self.tangent_at(i - 1, 1.0).normalize();

                        vertices.push(Vertex {
                            point: start_point,
                            orientation: interpolate_tangents(
                                prev_orientation,
                                start_orientation,
                            ),
                        });
                    }

                    just_moved = false;
                }
            }
        }

        // Open path: place the final vertex.
        if open_path_command.is_some() && self.commands.len() > 1 {
            let last = self.commands.len() - 1;
            let point = self.point_at(last, 1.0);
            let orientation = self.tangent_at(last, 1.0).normalize();
            vertices.push(Vertex { point, orientation });
        }

        vertices
    }

    /// Point-in-path by winding-number accumulation; points on the outline
    /// count as inside.
    pub fn is_inside(&self, point: Vector2, fill_rule: FillRule) -> bool {
        let on_boundary_tolerance = 0.1;

        let mut winding = 0;
        let mut current = Vector2::ZERO;

        for command in &self.commands {
            match command.kind {
                CommandKind::MoveTo => {
                    current = self.points[command.point_index];
                }

                CommandKind::LineTo | CommandKind::ClosePath => {
                    let end = self.points[command.point_index];
                    if distance_from_point_to_line(point, current, end) <= on_boundary_tolerance {
                        return true;
                    }
                    winding += winding_number_of_line(current, end, point);
                    current = end;
                }

                CommandKind::CurveTo => {
                    let control1 = self.points[command.point_index];
                    let control2 = self.points[command.point_index + 1];
                    let end = self.points[command.point_index + 2];
                    if is_point_on_cubic(
                        point,
                        current,
                        control1,
                        control2,
                        end,
                        on_boundary_tolerance,
                        0,
                    ) {
                        return true;
                    }
                    winding +=
                        winding_number_of_cubic(current, control1, control2, end, point, TOLERANCE, 0);
                    current = end;
                }
            }
        }

        match fill_rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    /// Whether `point` lies on the path's outline, within `stroke_width`.
    pub fn is_on_path(&self, point: Vector2, stroke_width: f64) -> bool {
        let mut current = Vector2::ZERO;

        for command in &self.commands {
            match command.kind {
                CommandKind::MoveTo => {
                    current = self.points[command.point_index];
                }

                CommandKind::LineTo | CommandKind::ClosePath => {
                    let end = self.points[command.point_index];
                    if distance_from_point_to_line(point, current, end) <= stroke_width {
                        return true;
                    }
                    current = end;
                }

                CommandKind::CurveTo => {
                    let control1 = self.points[command.point_index];
                    let control2 = self.points[command.point_index + 1];
                    let end = self.points[command.point_index + 2];
                    if is_point_on_cubic(point, current, control1, control2, end, stroke_width, 0) {
                        return true;
                    }
                    current = end;
                }
            }
        }

        false
    }

    /// Start point of the command at `index` (the previous command's end).
    pub(crate) fn start_point(&self, index: usize) -> Vector2 {
        debug_assert!(index < self.commands.len(), "index out of range");

        let command = &self.commands[index];
        if command.kind == CommandKind::MoveTo {
            return self.points[command.point_index];
        }

        debug_assert!(index > 0, "the first command must be a move_to");
        self.end_point(index - 1)
    }

    /// End point of the command at `index`.
    pub(crate) fn end_point(&self, index: usize) -> Vector2 {
        debug_assert!(index < self.commands.len(), "index out of range");

        let command = &self.commands[index];
        match command.kind {
            CommandKind::MoveTo | CommandKind::LineTo | CommandKind::ClosePath => {
                self.points[command.point_index]
            }
            CommandKind::CurveTo => self.points[command.point_index + 2],
        }
    }

    /// Appends another spline's commands, skipping its leading move-to and
    /// remapping point indices.  Used by arc decomposition.
    fn append_join(&mut self, spline: &PathSpline, as_internal_path: bool) {
        if spline.is_empty() {
            return;
        }

        let point_offset = self.points.len();

        // Skip the first point; it coincides with our current point.
        for point in &spline.points[1..] {
            self.points.push(*point);
        }

        for (i, command) in spline.commands.iter().enumerate().skip(1) {
            debug_assert!(
                command.point_index != 0,
                "point 0 is only referenced by the skipped move_to"
            );

            let mut command = *command;
            command.point_index = command.point_index - 1 + point_offset;

            if as_internal_path && i != spline.commands.len() - 1 {
                command.is_internal_point = true;
            }

            if command.kind == CommandKind::MoveTo {
                self.move_to_point_index = Some(command.point_index);
            }

            self.commands.push(command);
        }
    }

    /// Re-opens a closed subpath at its close point before the next draw.
    fn maybe_auto_reopen(&mut self) {
        if self.may_auto_reopen {
            let command_index = self.commands.len();
            self.commands.push(Command::new(
                CommandKind::MoveTo,
                self.move_to_point_index.expect("auto-reopen requires a move_to"),
            ));

            self.may_auto_reopen = false;
            self.current_segment_start_command_index = Some(command_index);
        }
    }
}

// B.2.5. Correction of out-of-range radii
// https://www.w3.org/TR/SVG/implnote.html#ArcCorrectionOutOfRangeRadii
fn correct_arc_radius(radius: Vector2, major_axis: Vector2) -> Vector2 {
    // eq. 6.1
    let abs_radius = Vector2::new(radius.x.abs(), radius.y.abs());

    // eq. 6.2
    let lambda = (major_axis.x * major_axis.x) / (abs_radius.x * abs_radius.x)
        + (major_axis.y * major_axis.y) / (abs_radius.y * abs_radius.y);

    // eq. 6.3
    if lambda > 1.0 {
        abs_radius * lambda.sqrt()
    } else {
        abs_radius
    }
}

// eq. 5.2 from https://www.w3.org/TR/SVG/implnote.html#ArcConversionEndpointToCenter
fn ellipse_center_for_arc(
    radius: Vector2,
    axis: Vector2,
    large_arc: bool,
    sweep: bool,
) -> Vector2 {
    let mut k = radius.x * radius.x * axis.y * axis.y + radius.y * radius.y * axis.x * axis.x;
    debug_assert!(!near_zero(k));

    k = ((radius.x * radius.x * radius.y * radius.y) / k - 1.0).abs().sqrt();
    if sweep == large_arc {
        k = -k;
    }

    Vector2::new(k * radius.x * axis.y / radius.y, -k * radius.y * axis.x / radius.x)
}

/// Appendix F.6 of SVG 1.1: converts an endpoint-parameterized arc to center
/// parameterization and emits cubic segments covering it.
///
/// Returns `None` when the arc degenerates to nothing; a zero radius becomes
/// a line.
fn decompose_arc_into_cubics(
    start: Vector2,
    end: Vector2,
    radius: Vector2,
    rotation_radians: f64,
    large_arc: bool,
    sweep: bool,
) -> Option<PathSpline> {
    // Large enough that the center computation cannot divide by zero.
    let distance_sq_epsilon = 1e-14;

    if near_zero_eps(start.distance_squared(end), distance_sq_epsilon) {
        // No-op, the end point is the current position.
        return None;
    }

    if near_zero(radius.x) || near_zero(radius.y) {
        // Zero radius falls back to a line segment.
        let mut result = PathSpline::new();
        result.move_to(start);
        result.line_to(end);
        return Some(result);
    }

    let (sin_rotation, cos_rotation) = rotation_radians.sin_cos();

    // Rotate the extent to find the major axis.
    let extent = (start - end) * 0.5;
    let major_axis = extent.rotate_precomputed(cos_rotation, -sin_rotation);

    let ellipse_radius = correct_arc_radius(radius, major_axis);

    let center_no_rotation = ellipse_center_for_arc(ellipse_radius, major_axis, large_arc, sweep);
    let center =
        center_no_rotation.rotate_precomputed(cos_rotation, sin_rotation) + (start + end) * 0.5;

    // Compute the start angle.
    let intersection_start = Vector2::new(
        (major_axis.x - center_no_rotation.x) / ellipse_radius.x,
        (major_axis.y - center_no_rotation.y) / ellipse_radius.y,
    );
    let intersection_end = Vector2::new(
        (-major_axis.x - center_no_rotation.x) / ellipse_radius.x,
        (-major_axis.y - center_no_rotation.y) / ellipse_radius.y,
    );

    let mut k = intersection_start.length();
    if near_zero(k) {
        return None;
    }

    k = clamp(intersection_start.x / k, -1.0, 1.0);
    let theta = k.acos() * if intersection_start.y < 0.0 { -1.0 } else { 1.0 };

    // Compute the sweep angle.
    k = (intersection_start.length_squared() * intersection_end.length_squared()).sqrt();
    if near_zero(k) {
        return None;
    }

    k = clamp(intersection_start.dot(intersection_end) / k, -1.0, 1.0);

    let mut delta_theta = k.acos();
    if intersection_start.cross(intersection_end) < 0.0 {
        delta_theta = -delta_theta;
    }

    if sweep && delta_theta < 0.0 {
        delta_theta += PI * 2.0;
    } else if !sweep && delta_theta > 0.0 {
        delta_theta -= PI * 2.0;
    }

    // One cubic per quarter-turn-ish of sweep.
    let num_segments = (delta_theta / (PI * 0.5 + 0.001)).abs().ceil() as usize;
    let theta_increment = delta_theta / num_segments as f64;

    let mut result = PathSpline::new();
    result.move_to(start);

    for i in 0..num_segments {
        let theta_start = theta + i as f64 * theta_increment;
        let theta_end = theta + (i + 1) as f64 * theta_increment;

        let theta_half = 0.5 * (theta_end - theta_start);

        let sin_half_theta_half = (theta_half * 0.5).sin();
        let t = (8.0 / 3.0) * sin_half_theta_half * sin_half_theta_half / theta_half.sin();

        let (sin_theta_start, cos_theta_start) = theta_start.sin_cos();
        let p0 = Vector2::new(
            ellipse_radius.x * (cos_theta_start - t * sin_theta_start),
            ellipse_radius.y * (sin_theta_start + t * cos_theta_start),
        );

        let (sin_theta_end, cos_theta_end) = theta_end.sin_cos();
        let p2 = Vector2::new(
            ellipse_radius.x * cos_theta_end,
            ellipse_radius.y * sin_theta_end,
        );

        let p1 = p2 + Vector2::new(
            ellipse_radius.x * t * sin_theta_end,
            ellipse_radius.y * (-t * cos_theta_end),
        );

        result.curve_to(
            center + p0.rotate_precomputed(cos_rotation, sin_rotation),
            center + p1.rotate_precomputed(cos_rotation, sin_rotation),
            center + p2.rotate_precomputed(cos_rotation, sin_rotation),
        );
    }

    Some(result)
}

/// Measures a cubic by recursive subdivision: when the control net is close
/// to the chord, their average approximates the arc length.
fn subdivide_and_measure_cubic(points: &[Vector2; 4], tolerance: f64, depth: i32) -> f64 {
    if depth > MAX_RECURSION_DEPTH {
        return (points[0] - points[3]).length();
    }

    let chord_length = (points[3] - points[0]).length();
    let net_length = (points[1] - points[0]).length()
        + (points[2] - points[1]).length()
        + (points[3] - points[2]).length();

    if (net_length - chord_length) <= tolerance {
        return (net_length + chord_length) / 2.0;
    }

    let (left, right) = split_cubic_in_half(points);
    subdivide_and_measure_cubic(&left, tolerance, depth + 1)
        + subdivide_and_measure_cubic(&right, tolerance, depth + 1)
}

/// De Casteljau subdivision at t = 0.5.
fn split_cubic_in_half(points: &[Vector2; 4]) -> ([Vector2; 4], [Vector2; 4]) {
    let p01 = (points[0] + points[1]) * 0.5;
    let p12 = (points[1] + points[2]) * 0.5;
    let p23 = (points[2] + points[3]) * 0.5;
    let p012 = (p01 + p12) * 0.5;
    let p123 = (p12 + p23) * 0.5;
    let p0123 = (p012 + p123) * 0.5;

    (
        [points[0], p01, p012, p0123],
        [p0123, p123, p23, points[3]],
    )
}

/// Extends the bounds with the miter point of the join at `current_point`.
/// The tangents are unnormalized; the miter applies only under the limit and
/// when the join is not a straight line.
fn compute_miter(
    bounds: &mut Rect,
    current_point: Vector2,
    tangent0: Vector2,
    tangent1: Vector2,
    stroke_width: f64,
    miter_limit: f64,
) {
    let intersection_angle = tangent0.angle_with(-tangent1);

    let miter_length = stroke_width / (intersection_angle * 0.5).sin();
    if miter_length < miter_limit && !near_equals(intersection_angle, PI, 1e-9) {
        let joint_angle = (tangent0 - tangent1).angle();
        bounds.add_point(
            current_point
                + miter_length * Vector2::new(joint_angle.cos(), joint_angle.sin()),
        );
    }
}

pub(crate) fn distance_from_point_to_line(p: Vector2, a: Vector2, b: Vector2) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let ab_length_squared = ab.length_squared();
    if near_zero(ab_length_squared) {
        // 'a' and 'b' are the same point
        return ap.length();
    }
    let t = clamp(ap.dot(ab) / ab_length_squared, 0.0, 1.0);
    let projection = a + t * ab;
    (p - projection).length()
}

/// Whether a cubic is close enough to its chord to be treated as a line.
fn is_curve_flat_enough(
    p0: Vector2,
    p1: Vector2,
    p2: Vector2,
    p3: Vector2,
    tolerance: f64,
) -> bool {
    let d1 = distance_from_point_to_line(p1, p0, p3);
    let d2 = distance_from_point_to_line(p2, p0, p3);
    d1 <= tolerance && d2 <= tolerance
}

/// Winding contribution of the segment `p0 -> p1` around `point`.
fn winding_number_of_line(p0: Vector2, p1: Vector2, point: Vector2) -> i32 {
    if p0.y <= point.y {
        if p1.y > point.y && (p1 - p0).cross(point - p0) > 0.0 {
            return 1;
        }
    } else if p1.y <= point.y && (p1 - p0).cross(point - p0) < 0.0 {
        return -1;
    }
    0
}

fn winding_number_of_cubic(
    p0: Vector2,
    p1: Vector2,
    p2: Vector2,
    p3: Vector2,
    point: Vector2,
    tolerance: f64,
    depth: i32,
) -> i32 {
    if depth > MAX_RECURSION_DEPTH || is_curve_flat_enough(p0, p1, p2, p3, tolerance) {
        return winding_number_of_line(p0, p3, point);
    }

    let (left, right) = split_cubic_in_half(&[p0, p1, p2, p3]);
    winding_number_of_cubic(left[0], left[1], left[2], left[3], point, tolerance, depth + 1)
        + winding_number_of_cubic(right[0], right[1], right[2], right[3], point, tolerance, depth + 1)
}

fn is_point_on_cubic(
    point: Vector2,
    p0: Vector2,
    p1: Vector2,
    p2: Vector2,
    p3: Vector2,
    tolerance: f64,
    depth: i32,
) -> bool {
    if depth > MAX_RECURSION_DEPTH || is_curve_flat_enough(p0, p1, p2, p3, tolerance) {
        return distance_from_point_to_line(point, p0, p3) <= tolerance;
    }

    let (left, right) = split_cubic_in_half(&[p0, p1, p2, p3]);
    is_point_on_cubic(point, left[0], left[1], left[2], left[3], tolerance, depth + 1)
        || is_point_on_cubic(point, right[0], right[1], right[2], right[3], tolerance, depth + 1)
}

/// Halfway direction between two unit tangents; perpendicular when they
/// cancel out.
fn interpolate_tangents(prev_tangent: Vector2, next_tangent: Vector2) -> Vector2 {
    let sum = prev_tangent + next_tangent;

    if !near_zero(sum.length_squared()) {
        sum.normalize()
    } else {
        Vector2::new(prev_tangent.y, -prev_tangent.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    #[test]
    fn empty_spline() {
        let spline = PathSpline::new();
        assert!(spline.is_empty());
        assert_eq!(spline.commands().len(), 0);
    }

    #[test]
    #[should_panic]
    fn line_to_without_move_to_panics() {
        let mut spline = PathSpline::new();
        spline.line_to(v(1.0, 1.0));
    }

    #[test]
    #[should_panic]
    fn close_path_on_empty_spline_panics() {
        let mut spline = PathSpline::new();
        spline.close_path();
    }

    #[test]
    #[should_panic]
    fn bounds_of_empty_spline_panics() {
        let _ = PathSpline::new().bounds();
    }

    #[test]
    fn builds_triangle() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(4.0, 0.0));
        spline.line_to(v(0.0, 3.0));
        spline.close_path();

        assert_eq!(spline.points(), &[v(0.0, 0.0), v(4.0, 0.0), v(0.0, 3.0)]);
        let kinds: Vec<CommandKind> = spline.commands().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::MoveTo,
                CommandKind::LineTo,
                CommandKind::LineTo,
                CommandKind::ClosePath
            ]
        );

        // The opening move-to records its matching close.
        assert_eq!(spline.commands()[0].close_path_index, Some(3));
        // The close reuses the move-to point.
        assert_eq!(spline.commands()[3].point_index, 0);
    }

    #[test]
    fn consecutive_move_tos_collapse() {
        let mut spline = PathSpline::new();
        spline.move_to(v(1.0, 1.0));
        spline.move_to(v(2.0, 2.0));
        spline.line_to(v(3.0, 3.0));

        assert_eq!(spline.commands().len(), 2);
        assert_eq!(spline.points()[0], v(2.0, 2.0));
    }

    #[test]
    fn auto_reopens_after_close() {
        let mut spline = PathSpline::new();
        spline.move_to(v(1.0, 1.0));
        spline.line_to(v(2.0, 1.0));
        spline.close_path();
        spline.line_to(v(3.0, 3.0));

        let kinds: Vec<CommandKind> = spline.commands().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::MoveTo,
                CommandKind::LineTo,
                CommandKind::ClosePath,
                CommandKind::MoveTo,
                CommandKind::LineTo
            ]
        );

        // The reopening move-to reuses the subpath's start point.
        assert_eq!(spline.commands()[3].point_index, 0);
        assert_eq!(spline.point_at(3, 0.0), v(1.0, 1.0));
    }

    #[test]
    fn current_point_tracks_last_command() {
        let mut spline = PathSpline::new();
        spline.move_to(v(1.0, 2.0));
        assert_eq!(spline.current_point(), v(1.0, 2.0));

        spline.curve_to(v(2.0, 2.0), v(3.0, 2.0), v(4.0, 5.0));
        assert_eq!(spline.current_point(), v(4.0, 5.0));

        spline.close_path();
        assert_eq!(spline.current_point(), v(1.0, 2.0));
    }

    #[test]
    fn line_bounds() {
        let mut spline = PathSpline::new();
        spline.move_to(v(1.0, 1.0));
        spline.line_to(v(4.0, 5.0));
        spline.line_to(v(-2.0, 3.0));

        assert_eq!(spline.bounds(), Rect::new(-2.0, 1.0, 4.0, 5.0));
    }

    #[test]
    fn curve_bounds_include_extrema() {
        // This curve bulges past its end points; the extremum near
        // (4.043, 4.0) must be inside the bounds.
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.curve_to(v(8.0, 9.0), v(2.0, 0.0), v(0.0, 0.0));

        let bounds = spline.bounds();
        assert!(bounds.approx_eq(&Rect::new(0.0, 0.0, 4.043, 4.0), 0.01), "{bounds:?}");
    }

    #[test]
    fn transformed_bounds_scale() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(1.0, 1.0));

        let t = Transform::new_scale(2.0, 3.0);
        assert_eq!(spline.transformed_bounds(&t), Rect::new(0.0, 0.0, 2.0, 3.0));
    }

    #[test]
    fn path_length_of_lines() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(3.0, 4.0));
        assert!(near_equals(spline.path_length(), 5.0, 1e-9));

        spline.close_path();
        assert!(near_equals(spline.path_length(), 10.0, 1e-9));
    }

    #[test]
    fn path_length_of_half_circle() {
        // A half circle of radius 10 built from the arc decomposition.
        let mut spline = PathSpline::new();
        spline.move_to(v(-10.0, 0.0));
        spline.arc_to(v(10.0, 10.0), 0.0, false, true, v(10.0, 0.0));

        let length = spline.path_length();
        assert!((length - PI * 10.0).abs() < 0.1, "length = {length}");
    }

    #[test]
    fn zero_radius_arc_becomes_line() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.arc_to(v(0.0, 10.0), 0.0, false, true, v(5.0, 0.0));

        let kinds: Vec<CommandKind> = spline.commands().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CommandKind::MoveTo, CommandKind::LineTo]);
    }

    #[test]
    fn degenerate_arc_is_dropped() {
        let mut spline = PathSpline::new();
        spline.move_to(v(1.0, 1.0));
        spline.arc_to(v(5.0, 5.0), 0.0, false, true, v(1.0, 1.0));

        assert_eq!(spline.commands().len(), 1);
    }

    #[test]
    fn arc_marks_internal_points() {
        // A half circle takes two cubics; the join between them is internal.
        let mut spline = PathSpline::new();
        spline.move_to(v(-10.0, 0.0));
        spline.arc_to(v(10.0, 10.0), 0.0, false, true, v(10.0, 0.0));

        let internal: Vec<bool> = spline
            .commands()
            .iter()
            .map(|c| c.is_internal_point)
            .collect();
        assert_eq!(internal, vec![false, true, false]);

        // Vertex iteration sees only the two end points.
        let vertices = spline.vertices();
        assert_eq!(vertices.len(), 2);
        assert!(vertices[0].point.near_equals(v(-10.0, 0.0), 1e-9));
        assert!(vertices[1].point.near_equals(v(10.0, 0.0), 1e-9));
    }

    #[test]
    fn ellipse_is_closed_and_round() {
        let mut spline = PathSpline::new();
        spline.ellipse(v(5.0, 5.0), v(3.0, 2.0));

        assert!(spline.bounds().approx_eq(&Rect::new(2.0, 3.0, 8.0, 7.0), 1e-6));
        assert_eq!(
            spline.commands().last().unwrap().kind,
            CommandKind::ClosePath
        );
    }

    #[test]
    fn circle_circumference() {
        let mut spline = PathSpline::new();
        spline.circle(v(0.0, 0.0), 10.0);

        // The four-cubic approximation is accurate to well under 1%.
        let length = spline.path_length();
        assert!((length - 2.0 * PI * 10.0).abs() < 0.2, "length = {length}");
    }

    #[test]
    fn point_tangent_normal_on_line() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));

        assert_eq!(spline.point_at(1, 0.5), v(5.0, 0.0));

        let tangent = spline.tangent_at(1, 0.5);
        assert!(tangent.normalize().near_equals(v(1.0, 0.0), 1e-9));

        let normal = spline.normal_at(1, 0.5);
        assert!(normal.normalize().near_equals(v(0.0, 1.0), 1e-9));
    }

    #[test]
    fn point_on_curve() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.curve_to(v(0.0, 10.0), v(10.0, 10.0), v(10.0, 0.0));

        assert_eq!(spline.point_at(1, 0.0), v(0.0, 0.0));
        assert_eq!(spline.point_at(1, 1.0), v(10.0, 0.0));
        assert!(spline.point_at(1, 0.5).near_equals(v(5.0, 7.5), 1e-9));
    }

    #[test]
    fn tangent_of_degenerate_curve_is_nudged() {
        // All control points at the start: the derivative at t=0 vanishes.
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.curve_to(v(0.0, 0.0), v(0.0, 0.0), v(10.0, 0.0));

        let tangent = spline.tangent_at(1, 0.0);
        assert!(tangent.length() > 0.0);
        assert!(tangent.normalize().near_equals(v(1.0, 0.0), 1e-9));
    }

    #[test]
    fn move_to_tangent_uses_next_command() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(0.0, 5.0));

        let tangent = spline.tangent_at(0, 0.0);
        assert!(tangent.normalize().near_equals(v(0.0, 1.0), 1e-9));
    }

    #[test]
    fn vertices_of_open_path() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(10.0, 10.0));

        let vertices = spline.vertices();
        assert_eq!(vertices.len(), 3);

        assert_eq!(vertices[0].point, v(0.0, 0.0));
        assert!(vertices[0].orientation.near_equals(v(1.0, 0.0), 1e-9));

        // The corner orientation is halfway between the two segments.
        assert_eq!(vertices[1].point, v(10.0, 0.0));
        let expected = (v(1.0, 0.0) + v(0.0, 1.0)).normalize();
        assert!(vertices[1].orientation.near_equals(expected, 1e-9));

        assert_eq!(vertices[2].point, v(10.0, 10.0));
        assert!(vertices[2].orientation.near_equals(v(0.0, 1.0), 1e-9));
    }

    #[test]
    fn vertices_of_closed_path() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(10.0, 10.0));
        spline.close_path();

        let vertices = spline.vertices();
        // Two interior corners, the pre-close corner, and the start/end.
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].point, v(0.0, 0.0));
        assert_eq!(vertices[1].point, v(10.0, 0.0));
        assert_eq!(vertices[2].point, v(10.0, 10.0));
        assert_eq!(vertices[3].point, v(0.0, 0.0));
    }

    #[test]
    fn opposite_tangents_get_perpendicular_orientation() {
        // Go right, then back left over the same segment.
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(0.0, 0.0));

        let vertices = spline.vertices();
        assert_eq!(vertices.len(), 3);

        // At the reversal the tangents cancel; the orientation is the
        // incoming tangent rotated a quarter turn.
        assert!(vertices[1].orientation.near_equals(v(0.0, -1.0), 1e-9));
    }

    #[test]
    fn is_inside_square() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(10.0, 10.0));
        spline.line_to(v(0.0, 10.0));
        spline.close_path();

        assert!(spline.is_inside(v(5.0, 5.0), FillRule::NonZero));
        assert!(spline.is_inside(v(5.0, 5.0), FillRule::EvenOdd));
        assert!(!spline.is_inside(v(15.0, 5.0), FillRule::NonZero));
        assert!(!spline.is_inside(v(-5.0, 5.0), FillRule::EvenOdd));

        // On the outline counts as inside.
        assert!(spline.is_inside(v(0.0, 5.0), FillRule::NonZero));
    }

    #[test]
    fn fill_rules_differ_on_nested_same_direction_squares() {
        // Outer and inner squares both clockwise: the ring between them is
        // inside for both rules, but the inner square's interior differs.
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(20.0, 0.0));
        spline.line_to(v(20.0, 20.0));
        spline.line_to(v(0.0, 20.0));
        spline.close_path();

        spline.move_to(v(5.0, 5.0));
        spline.line_to(v(15.0, 5.0));
        spline.line_to(v(15.0, 15.0));
        spline.line_to(v(5.0, 15.0));
        spline.close_path();

        let center = v(10.0, 10.0);
        assert!(spline.is_inside(center, FillRule::NonZero));
        assert!(!spline.is_inside(center, FillRule::EvenOdd));

        let ring = v(2.5, 10.0);
        assert!(spline.is_inside(ring, FillRule::NonZero));
        assert!(spline.is_inside(ring, FillRule::EvenOdd));
    }

    #[test]
    fn is_inside_with_curves() {
        let mut spline = PathSpline::new();
        spline.circle(v(0.0, 0.0), 10.0);

        assert!(spline.is_inside(v(0.0, 0.0), FillRule::NonZero));
        assert!(spline.is_inside(v(6.0, 6.0), FillRule::NonZero));
        assert!(!spline.is_inside(v(8.0, 8.0), FillRule::NonZero));
    }

    #[test]
    fn is_on_path_with_stroke_width() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));

        assert!(spline.is_on_path(v(5.0, 0.5), 1.0));
        assert!(!spline.is_on_path(v(5.0, 2.0), 1.0));
        assert!(!spline.is_on_path(v(12.0, 0.0), 1.0));
    }

    #[test]
    fn miter_bounds_extend_past_corner() {
        // A right-angle corner at (10, 0).
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(10.0, 10.0));

        let plain = spline.bounds();
        let mitered = spline.stroke_miter_bounds(1.0, 4.0);

        assert!(mitered.x1 > plain.x1);
        assert!(mitered.y0 <= plain.y0);

        // The miter point for a right angle lies sqrt(2)·w out along the
        // bisector.
        let expected = v(10.0, 0.0) + (2.0f64).sqrt() * v(1.0, -1.0).normalize();
        assert!(mitered.contains_point(expected));
    }

    #[test]
    fn miter_limit_suppresses_sharp_joins() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(10.0, 0.0));
        spline.line_to(v(0.0, 1.0));

        // A very sharp join; with a tiny limit the miter must not apply.
        let limited = spline.stroke_miter_bounds(1.0, 1.5);
        assert_eq!(limited, spline.bounds());
    }

    #[test]
    fn straight_joins_add_no_miter() {
        let mut spline = PathSpline::new();
        spline.move_to(v(0.0, 0.0));
        spline.line_to(v(5.0, 0.0));
        spline.line_to(v(10.0, 0.0));

        assert_eq!(spline.stroke_miter_bounds(2.0, 10.0), spline.bounds());
    }

    proptest::proptest! {
        #[test]
        fn points_stay_inside_bounds(
            x0 in -100.0f64..100.0, y0 in -100.0f64..100.0,
            x1 in -100.0f64..100.0, y1 in -100.0f64..100.0,
            x2 in -100.0f64..100.0, y2 in -100.0f64..100.0,
            x3 in -100.0f64..100.0, y3 in -100.0f64..100.0,
            t in 0.0f64..=1.0,
        ) {
            let mut spline = PathSpline::new();
            spline.move_to(Vector2::new(x0, y0));
            spline.curve_to(
                Vector2::new(x1, y1),
                Vector2::new(x2, y2),
                Vector2::new(x3, y3),
            );

            let mut bounds = spline.bounds();
            bounds.x0 -= 1e-6;
            bounds.y0 -= 1e-6;
            bounds.x1 += 1e-6;
            bounds.y1 += 1e-6;

            for index in 0..spline.commands().len() {
                let p = spline.point_at(index, t);
                proptest::prop_assert!(bounds.contains_point(p), "{p:?} outside {bounds:?}");
            }
        }

        #[test]
        fn length_grows_monotonically(
            segments in proptest::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..8)
        ) {
            let mut spline = PathSpline::new();
            spline.move_to(Vector2::new(0.0, 0.0));

            let mut last_length = 0.0;
            for (x, y) in segments {
                spline.line_to(Vector2::new(x, y));
                let length = spline.path_length();
                proptest::prop_assert!(length >= last_length - 1e-9);
                last_length = length;
            }

            proptest::prop_assert!(last_length >= 0.0);
        }
    }
}
