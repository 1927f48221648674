use crate::error::Error;
use ordered_float::NotNan;
use std::ops::{Add, Neg, Sub};

/// A pixel-space coordinate or a displacement between two of them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub(crate) fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: coordinate(x)?,
            y: coordinate(y)?,
        })
    }

    #[inline]
    pub(crate) fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3-D cross product of two in-plane vectors.
    #[inline]
    pub(crate) fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub(crate) fn norm(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub(crate) fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

fn coordinate(value: f32) -> Result<f32, Error> {
    let value = NotNan::new(value)
        .map_err(|e| Error::ConstructNotNan(e, value))?
        .into_inner();
    if value.is_infinite() {
        return Err(Error::InfiniteCoordinate(value));
    }
    Ok(value)
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::Output {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Point;
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn rejects_nan() {
        assert!(Point::new(f32::NAN, 1.0).is_err());
        assert!(Point::new(1.0, f32::NAN).is_err());
    }

    #[test]
    fn rejects_infinite() {
        assert!(matches!(
            Point::new(f32::INFINITY, 1.0),
            Err(Error::InfiniteCoordinate(x)) if x == f32::INFINITY
        ));
        assert!(matches!(
            Point::new(1.0, f32::NEG_INFINITY),
            Err(Error::InfiniteCoordinate(y)) if y == f32::NEG_INFINITY
        ));
        assert!(Point::new(f32::MAX, f32::MIN).is_ok());
    }

    #[test]
    fn norm_of_three_four() {
        let p = Point::new(3.0, 4.0).unwrap();
        assert_approx_eq!(p.norm(), 5.0);
    }

    #[test]
    fn cross_of_axes() {
        let x = Point::new(1.0, 0.0).unwrap();
        let y = Point::new(0.0, 1.0).unwrap();
        assert_approx_eq!(x.cross(y), 1.0);
        assert_approx_eq!(y.cross(x), -1.0);
        assert_approx_eq!(x.dot(y), 0.0);
    }

    #[test]
    fn midpoint() {
        let a = Point::new(0.0, 2.0).unwrap();
        let b = Point::new(4.0, 6.0).unwrap();
        assert_eq!(a.midpoint(b), Point::new(2.0, 4.0).unwrap());
        assert_eq!(a + b - b, a);
        assert_eq!(-(a - b), b - a);
    }
}
