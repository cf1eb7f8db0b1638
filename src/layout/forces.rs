use std::f64::consts::TAU;

use rand::Rng;

use crate::geometry::Vector2;

/// Bearing from `start` towards `end` in radians. Coincident points get a
/// random bearing so they can separate.
pub(super) fn bearing_angle(start: Vector2, end: Vector2, rng: &mut impl Rng) -> f64 {
    if start == end {
        rng.gen_range(0.0..TAU)
    } else {
        (end - start).angle()
    }
}

/// Coulomb-style push acting on `point` away from `other`.
pub(super) fn repulsion_between(
    point: Vector2,
    other: Vector2,
    repulsion_strength: f64,
    rng: &mut impl Rng,
) -> Vector2 {
    let proximity = point.distance(other).max(1.0);
    let force = -(repulsion_strength / (proximity * proximity));
    Vector2::from_polar(force, bearing_angle(point, other, rng))
}

/// One-sided spring: pulls `point` towards `other` once they are further apart
/// than `spring_length`, never pushes.
pub(super) fn attraction_between(
    point: Vector2,
    other: Vector2,
    attraction_strength: f64,
    spring_length: f64,
    rng: &mut impl Rng,
) -> Vector2 {
    let proximity = point.distance(other).max(1.0);
    let stretch = (proximity - spring_length).max(0.0);
    if stretch <= 0.0 {
        return Vector2::ZERO;
    }
    let force = attraction_strength * stretch;
    Vector2::from_polar(force, bearing_angle(point, other, rng))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::geometry::vector2;

    #[test]
    fn repulsion_points_away_from_other() {
        let mut rng = StdRng::seed_from_u64(0);
        let force = repulsion_between(Vector2::ZERO, vector2(10.0, 0.0), 10_000.0, &mut rng);
        assert!(force.x < 0.0);
        assert!(force.y.abs() < 1e-9);
        assert!((force.magnitude() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn repulsion_distance_is_clamped_to_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let force = repulsion_between(Vector2::ZERO, vector2(0.25, 0.0), 10_000.0, &mut rng);
        assert!((force.magnitude() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn spring_only_pulls_past_its_length() {
        let mut rng = StdRng::seed_from_u64(0);
        let slack = attraction_between(Vector2::ZERO, vector2(50.0, 0.0), 0.1, 100.0, &mut rng);
        assert_eq!(slack, Vector2::ZERO);

        let stretched =
            attraction_between(Vector2::ZERO, vector2(0.0, 150.0), 0.1, 100.0, &mut rng);
        assert!(stretched.y > 0.0);
        assert!((stretched.magnitude() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_bearing_is_random_but_seeded() {
        let point = vector2(3.0, 3.0);
        let mut first = StdRng::seed_from_u64(7);
        let mut second = StdRng::seed_from_u64(7);
        let a = bearing_angle(point, point, &mut first);
        let b = bearing_angle(point, point, &mut second);
        assert_eq!(a.to_bits(), b.to_bits());
        assert!((0.0..TAU).contains(&a));
    }
}
