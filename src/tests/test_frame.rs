#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::frame::{
        deg_to_rad, isometry_to_pose, pose_to_isometry, rotation_from_axes, shift_along_local,
    };
    use crate::messages::{Point, Pose, Quaternion};
    use crate::tests::test_utils::{assert_close, random_rotation, random_vector};

    const TOLERANCE: f64 = 1E-9;

    fn random_pose(rng: &mut StdRng) -> Pose {
        let q = random_rotation(rng);
        let t = random_vector(rng, 3.0);
        Pose {
            position: Point::new(t.x, t.y, t.z),
            orientation: Quaternion { x: q.i, y: q.j, z: q.k, w: q.w },
        }
    }

    #[test]
    fn test_deg_to_rad() {
        assert_close(deg_to_rad(180.0), PI, TOLERANCE, "180 deg");
        assert_close(deg_to_rad(-90.0), -PI / 2.0, TOLERANCE, "-90 deg");
        assert_eq!(deg_to_rad(0.0), 0.0);
    }

    #[test]
    fn test_pose_isometry_round_trip() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let pose = random_pose(&mut rng);
            let back = isometry_to_pose(&pose_to_isometry(&pose));
            assert_close(back.position.x, pose.position.x, TOLERANCE, "x");
            assert_close(back.position.y, pose.position.y, TOLERANCE, "y");
            assert_close(back.position.z, pose.position.z, TOLERANCE, "z");
            assert_close(back.orientation.x, pose.orientation.x, TOLERANCE, "qx");
            assert_close(back.orientation.y, pose.orientation.y, TOLERANCE, "qy");
            assert_close(back.orientation.z, pose.orientation.z, TOLERANCE, "qz");
            assert_close(back.orientation.w, pose.orientation.w, TOLERANCE, "qw");
        }
    }

    #[test]
    fn test_isometry_with_inverse_is_identity() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let iso = pose_to_isometry(&random_pose(&mut rng));
            let identity = iso * iso.inverse();
            assert!(identity.translation.vector.norm() < TOLERANCE);
            assert!(identity.rotation.angle() < 1E-6);
        }
    }

    #[test]
    fn test_shift_cancels() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let pose = random_pose(&mut rng);
            let offset = random_vector(&mut rng, 0.5);
            let there = shift_along_local(&pose, &offset);
            let back = shift_along_local(&there, &(-offset));
            assert_eq!(there.orientation, pose.orientation);
            assert_close(back.position.x, pose.position.x, TOLERANCE, "x");
            assert_close(back.position.y, pose.position.y, TOLERANCE, "y");
            assert_close(back.position.z, pose.position.z, TOLERANCE, "z");
        }
    }

    #[test]
    fn test_shift_follows_own_axes() {
        // Rotated 90 degrees about z: own x is world y
        let pose = Pose {
            position: Point::new(1.0, 1.0, 1.0),
            orientation: Quaternion {
                x: 0.0,
                y: 0.0,
                z: (PI / 4.0).sin(),
                w: (PI / 4.0).cos(),
            },
        };
        let shifted = shift_along_local(&pose, &Vector3::new(-0.1, 0.0, 0.0));
        assert_close(shifted.position.x, 1.0, TOLERANCE, "x");
        assert_close(shifted.position.y, 0.9, TOLERANCE, "y");
        assert_close(shifted.position.z, 1.0, TOLERANCE, "z");
    }

    #[test]
    fn test_rotation_from_axes_recovers_rotation() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..500 {
            let q = random_rotation(&mut rng);
            let m = q.to_rotation_matrix();
            let columns = m.matrix();
            let recovered = rotation_from_axes(
                &columns.column(0).into_owned(),
                &columns.column(1).into_owned(),
                &columns.column(2).into_owned(),
            );
            assert_close(recovered.quaternion().norm(), 1.0, TOLERANCE, "norm");
            assert!(recovered.angle_to(&q) < 1E-6, "{:?} vs {:?}", recovered, q);
        }
    }

    #[test]
    fn test_rotation_from_world_axes_is_identity() {
        let q = rotation_from_axes(&Vector3::x(), &Vector3::y(), &Vector3::z());
        assert!(q.angle() < TOLERANCE);
    }
}
