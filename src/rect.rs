//! Axis-aligned rectangles.

#[allow(clippy::module_inception)]
mod rect {
    use core::ops::{Add, Range, Sub};
    use num_traits::Zero;

    // Use our own min() and max() that are acceptable for floating point

    fn min<T: PartialOrd>(x: T, y: T) -> T {
        if x <= y {
            x
        } else {
            y
        }
    }

    fn max<T: PartialOrd>(x: T, y: T) -> T {
        if x >= y {
            x
        } else {
            y
        }
    }

    #[derive(Default, Debug, Clone, Copy, PartialEq)]
    pub struct Rect<T> {
        pub x0: T,
        pub y0: T,
        pub x1: T,
        pub y1: T,
    }

    impl<T> Rect<T> {
        #[inline]
        pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
            Self { x0, y0, x1, y1 }
        }
    }

    impl<T> Rect<T>
    where
        T: Copy + PartialOrd + PartialEq + Add<T, Output = T> + Sub<T, Output = T> + Zero,
    {
        #[inline]
        pub fn from_size(w: T, h: T) -> Self {
            Self {
                x0: Zero::zero(),
                y0: Zero::zero(),
                x1: w,
                y1: h,
            }
        }

        #[inline]
        pub fn width(&self) -> T {
            self.x1 - self.x0
        }

        #[inline]
        pub fn height(&self) -> T {
            self.y1 - self.y0
        }

        #[inline]
        pub fn size(&self) -> (T, T) {
            (self.width(), self.height())
        }

        #[inline]
        pub fn x_range(&self) -> Range<T> {
            self.x0..self.x1
        }

        #[inline]
        pub fn y_range(&self) -> Range<T> {
            self.y0..self.y1
        }

        #[inline]
        pub fn contains(self, x: T, y: T) -> bool {
            x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
        }

        #[inline]
        pub fn translate(&self, by: (T, T)) -> Self {
            Self {
                x0: self.x0 + by.0,
                y0: self.y0 + by.1,
                x1: self.x1 + by.0,
                y1: self.y1 + by.1,
            }
        }

        #[inline]
        pub fn intersection(&self, rect: &Self) -> Option<Self> {
            let (x0, y0, x1, y1) = (
                max(self.x0, rect.x0),
                max(self.y0, rect.y0),
                min(self.x1, rect.x1),
                min(self.y1, rect.y1),
            );

            if x1 > x0 && y1 > y0 {
                Some(Self { x0, y0, x1, y1 })
            } else {
                None
            }
        }

        #[inline]
        pub fn union(&self, rect: &Self) -> Self {
            Self {
                x0: min(self.x0, rect.x0),
                y0: min(self.y0, rect.y0),
                x1: max(self.x1, rect.x1),
                y1: max(self.y1, rect.y1),
            }
        }
    }
}

use float_cmp::approx_eq;

use crate::vector::Vector2;

/// An axis-aligned box with `f64` coordinates.
pub type Rect = rect::Rect<f64>;

impl Rect {
    /// Creates an empty box sitting at `point`; growing it with
    /// [`Rect::add_point`] keeps it tight around the added points.
    #[inline]
    pub fn empty_at(point: Vector2) -> Rect {
        Rect::new(point.x, point.y, point.x, point.y)
    }

    /// Expands the box to contain `point`.
    #[inline]
    pub fn add_point(&mut self, point: Vector2) {
        if point.x < self.x0 {
            self.x0 = point.x;
        }
        if point.x > self.x1 {
            self.x1 = point.x;
        }
        if point.y < self.y0 {
            self.y0 = point.y;
        }
        if point.y > self.y1 {
            self.y1 = point.y;
        }
    }

    #[inline]
    pub fn contains_point(&self, point: Vector2) -> bool {
        self.contains(point.x, point.y)
    }

    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        approx_eq!(f64, self.x0, other.x0, epsilon = epsilon)
            && approx_eq!(f64, self.y0, other.y0, epsilon = epsilon)
            && approx_eq!(f64, self.x1, other.x1, epsilon = epsilon)
            && approx_eq!(f64, self.y1, other.y1, epsilon = epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_around_added_points() {
        let mut r = Rect::empty_at(Vector2::new(1.0, 1.0));
        assert_eq!(r.size(), (0.0, 0.0));

        r.add_point(Vector2::new(3.0, 0.5));
        assert_eq!(r, Rect::new(1.0, 0.5, 3.0, 1.0));

        r.add_point(Vector2::new(2.0, 0.75));
        assert_eq!(r, Rect::new(1.0, 0.5, 3.0, 1.0));
    }

    #[test]
    fn intersection() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, 1.0, 3.0, 3.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(1.0, 1.0, 2.0, 2.0)));

        let c = Rect::new(5.0, 5.0, 6.0, 6.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn union() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, -1.0, 3.0, 0.5);
        assert_eq!(a.union(&b), Rect::new(0.0, -1.0, 3.0, 1.0));
    }

    #[test]
    fn contains() {
        let r = Rect::new(0.0, 0.0, 2.0, 2.0);
        assert!(r.contains_point(Vector2::new(1.0, 1.0)));
        assert!(r.contains_point(Vector2::new(0.0, 2.0)));
        assert!(!r.contains_point(Vector2::new(2.1, 1.0)));
    }
}
