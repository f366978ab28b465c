//! Nose radius compensation

use super::state::{Point, RadiusCompensation};

/// Moves shorter than this (radius space, mm) are not compensated
pub const MIN_TRAVEL: f64 = 1e-3;

/// Contact point for a cut from `prev` to `target`, offset by the nose radius along the
/// normal of travel. X is a diameter, so the math runs in radius space and the X offset
/// is doubled back. Returns `target` when compensation does not apply.
pub fn compensate(
    prev: Point,
    target: Point,
    side: RadiusCompensation,
    nose_radius: f64,
) -> Point {
    if side == RadiusCompensation::Off || nose_radius.is_nan() || nose_radius <= 0.0 {
        return target;
    }

    let d = target - prev;
    let (dx, dz) = (d.x / 2.0, d.z);
    let len = dz.hypot(dx);
    if len < MIN_TRAVEL {
        return target;
    }

    let (tx, tz) = (dx / len, dz / len);
    let (nx, nz) = match side {
        RadiusCompensation::Right => (tz, -tx),
        RadiusCompensation::Left => (-tz, tx),
        RadiusCompensation::Off => return target,
    };

    Point {
        x: target.x + nx * nose_radius * 2.0,
        z: target.z + nz * nose_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::compensate;
    use crate::machine::state::{Point, RadiusCompensation::*};
    use approx::assert_relative_eq;

    #[test]
    fn right_on_z_move() {
        let c = compensate(Point::new(40.0, 0.0), Point::new(40.0, -20.0), Right, 0.8);
        assert_relative_eq!(c.x, 38.4, epsilon = 1e-9);
        assert_relative_eq!(c.z, -20.0, epsilon = 1e-9);
    }

    #[test]
    fn left_on_z_move() {
        let c = compensate(Point::new(40.0, 0.0), Point::new(40.0, -20.0), Left, 0.8);
        assert_relative_eq!(c.x, 41.6, epsilon = 1e-9);
        assert_relative_eq!(c.z, -20.0, epsilon = 1e-9);
    }

    #[test]
    fn facing_move() {
        // Facing down towards center: dx = -10 (radius), dz = 0
        let c = compensate(Point::new(40.0, 0.0), Point::new(20.0, 0.0), Right, 0.4);
        assert_relative_eq!(c.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(c.z, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_or_off() {
        let p = Point::new(40.0, -20.0);
        assert_eq!(compensate(p, p, Right, 0.8), p);
        assert_eq!(compensate(Point::new(0.0, 0.0), p, Off, 0.8), p);
        assert_eq!(compensate(Point::new(0.0, 0.0), p, Left, 0.0), p);
        assert_eq!(compensate(Point::new(0.0, 0.0), p, Left, f64::NAN), p);
    }
}
