//! Conversions between pose messages and nalgebra isometries, and the small amount of
//! frame arithmetic the grasp conversion needs.
//!
//! ```
//! use rs_grasp_pickup::frame::{isometry_to_pose, pose_to_isometry, shift_along_local};
//! use rs_grasp_pickup::messages::{Point, Pose, Quaternion};
//!
//! let pose = Pose {
//!     position: Point::new(1.0, 2.0, 3.0),
//!     orientation: Quaternion::identity(),
//! };
//! let back = isometry_to_pose(&pose_to_isometry(&pose));
//! assert_eq!(back.position, pose.position);
//!
//! // Move 10 cm back along the own x axis of the pose
//! let shifted = shift_along_local(&pose, &nalgebra::Vector3::new(-0.1, 0.0, 0.0));
//! assert!((shifted.position.x - 0.9).abs() < 1E-12);
//! ```

use nalgebra::{Isometry3, Matrix3, Quaternion as NaQuaternion, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::messages::{Point, Pose, Quaternion};

/// Pose of the gripper or object, expressed as isometry.
pub type Transform = Isometry3<f64>;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Translation first, then rotation, as the usual pose semantics. The quaternion is
/// not validated but is normalized when turned into the unit quaternion.
pub fn pose_to_isometry(pose: &Pose) -> Transform {
    let translation = Translation3::new(pose.position.x, pose.position.y, pose.position.z);
    let q = &pose.orientation;
    let rotation = UnitQuaternion::from_quaternion(NaQuaternion::new(q.w, q.x, q.y, q.z));
    Isometry3::from_parts(translation, rotation)
}

pub fn isometry_to_pose(isometry: &Transform) -> Pose {
    let t = isometry.translation.vector;
    let r = isometry.rotation;
    Pose {
        position: Point::new(t.x, t.y, t.z),
        orientation: Quaternion {
            x: r.i,
            y: r.j,
            z: r.k,
            w: r.w,
        },
    }
}

/// Moves the pose by `offset` given in the pose's own axes. Orientation is kept.
pub fn shift_along_local(pose: &Pose, offset: &Vector3<f64>) -> Pose {
    let shifted = pose_to_isometry(pose) * nalgebra::Point3::from(*offset);
    Pose {
        position: Point::new(shifted.x, shifted.y, shifted.z),
        orientation: pose.orientation,
    }
}

/// Rotation whose columns are the three given axes. For an orthonormal right-handed
/// triple this is exact; other inputs still produce a unit quaternion.
pub fn rotation_from_axes(
    approach: &Vector3<f64>,
    binormal: &Vector3<f64>,
    axis: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let matrix = Matrix3::from_columns(&[*approach, *binormal, *axis]);
    let rotation = Rotation3::from_matrix_unchecked(matrix);
    let q = UnitQuaternion::from_rotation_matrix(&rotation);
    UnitQuaternion::new_normalize(q.into_inner())
}

pub fn quaternion_to_msg(q: &UnitQuaternion<f64>) -> Quaternion {
    Quaternion {
        x: q.i,
        y: q.j,
        z: q.k,
        w: q.w,
    }
}

pub fn vector_to_na(v: &crate::messages::Vector3) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}
