//! Message shapes exchanged with the perception pipeline, the grasp detector and the
//! pickup action server. These mirror the external message definitions field by field
//! (only the fields this node reads or writes). Encoding on the wire is the business
//! of the middleware binding, not of this crate.

use std::time::Duration;

/// Common header of stamped messages. Stamp is time since the middleware epoch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub frame_id: String,
    pub stamp: Duration,
}

impl Header {
    pub fn new(frame_id: &str, stamp: Duration) -> Self {
        Header {
            frame_id: frame_id.to_string(),
            stamp,
        }
    }

    pub fn in_frame(frame_id: &str) -> Self {
        Header::new(frame_id, Duration::ZERO)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }
}

/// Orientation as quaternion, scalar part is `w`. Expected to be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn identity() -> Self {
        Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vector3Stamped {
    pub header: Header,
    pub vector: Vector3,
}

/// Datatype codes of [`PointField`].
pub mod datatype {
    pub const INT8: u8 = 1;
    pub const UINT8: u8 = 2;
    pub const INT16: u8 = 3;
    pub const UINT16: u8 = 4;
    pub const INT32: u8 = 5;
    pub const UINT32: u8 = 6;
    pub const FLOAT32: u8 = 7;
    pub const FLOAT64: u8 = 8;
}

/// Describes one named channel of the point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct PointField {
    pub name: String,
    /// Byte offset from the start of the point
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

/// Organized or unorganized point cloud with an arbitrary point layout.
/// See `point_cloud.rs` for field access.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud2 {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

/// Text marker published by the object classifier. Text is the label of the object,
/// pose is its centroid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Marker {
    pub header: Header,
    pub id: i32,
    pub text: String,
    pub pose: Pose,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

/// Grasp hypothesis as produced by the detector. Approach, binormal and axis are
/// orthonormal and together define the hand frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraspConfig {
    pub position: Point,
    pub approach: Vector3,
    pub binormal: Vector3,
    pub axis: Vector3,
    /// Opening width of the hand
    pub width: f64,
    pub score: f64,
    /// Point at which the grasp was sampled
    pub sample: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraspConfigList {
    pub header: Header,
    pub grasps: Vec<GraspConfig>,
}

/// Cloud with the camera origins it was taken from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CloudSources {
    pub cloud: PointCloud2,
    /// Index into `view_points` for every point of the cloud
    pub camera_source: Vec<i64>,
    pub view_points: Vec<Point>,
}

/// Cloud with the points at which the detector should sample grasps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CloudSamples {
    pub cloud_sources: CloudSources,
    pub samples: Vec<Point>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,
    pub time_from_start: Duration,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JointTrajectory {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub points: Vec<JointTrajectoryPoint>,
}

/// Straight line motion of the gripper before or after the grasp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GripperTranslation {
    pub direction: Vector3Stamped,
    pub desired_distance: f64,
    pub min_distance: f64,
}

/// Candidate grasp in the form the pickup action server expects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grasp {
    pub id: String,
    pub pre_grasp_posture: JointTrajectory,
    pub grasp_posture: JointTrajectory,
    pub grasp_pose: PoseStamped,
    pub grasp_quality: f64,
    pub pre_grasp_approach: GripperTranslation,
    pub post_grasp_retreat: GripperTranslation,
    pub max_contact_force: f64,
}

/// Only boxes are used by this node.
#[derive(Clone, Debug, PartialEq)]
pub enum SolidPrimitive {
    Box { dimensions: [f64; 3] },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectOperation {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollisionObject {
    pub header: Header,
    pub id: String,
    pub primitives: Vec<SolidPrimitive>,
    pub primitive_poses: Vec<Pose>,
    pub operation: ObjectOperation,
}

impl CollisionObject {
    /// Single box collision object to be added to the scene.
    pub fn boxed(frame_id: &str, id: &str, pose: Pose, dimensions: [f64; 3]) -> Self {
        CollisionObject {
            header: Header::in_frame(frame_id),
            id: id.to_string(),
            primitives: vec![SolidPrimitive::Box { dimensions }],
            primitive_poses: vec![pose],
            operation: ObjectOperation::Add,
        }
    }

    /// Dimensions of the first primitive if it is a box.
    pub fn box_dimensions(&self) -> Option<[f64; 3]> {
        match self.primitives.first() {
            Some(SolidPrimitive::Box { dimensions }) => Some(*dimensions),
            None => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttachedCollisionObject {
    pub link_name: String,
    pub object: CollisionObject,
}

impl AttachedCollisionObject {
    /// Request to detach and drop the object with the given id.
    pub fn removal(id: &str) -> Self {
        AttachedCollisionObject {
            link_name: String::new(),
            object: CollisionObject {
                header: Header::default(),
                id: id.to_string(),
                primitives: Vec::new(),
                primitive_poses: Vec::new(),
                operation: ObjectOperation::Remove,
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanningOptions {
    pub planning_scene_is_diff: bool,
    pub robot_state_is_diff: bool,
    pub plan_only: bool,
    pub replan: bool,
    pub replan_attempts: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PickupGoal {
    pub target_name: String,
    pub group_name: String,
    pub possible_grasps: Vec<Grasp>,
    pub allowed_planning_time: Duration,
    pub planning_options: PlanningOptions,
    pub attached_object_touch_links: Vec<String>,
}

/// Terminal state of the pickup action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalState {
    Succeeded,
    Aborted,
    Preempted,
    Rejected,
    Lost,
}

impl GoalState {
    pub fn is_success(&self) -> bool {
        *self == GoalState::Succeeded
    }
}
