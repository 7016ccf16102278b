//! Seams to the systems this node orchestrates but does not implement: the planning
//! scene of the motion planner, the perception topics, the transform tree, the grasp
//! detector input and the pickup action server. A middleware binding implements these;
//! `loopback.rs` provides in-memory implementations.
//!
//! All traits are `Send + Sync`, since callbacks run on a thread pool and share the
//! collaborators.

use std::time::Duration;

use anyhow::Result;

use crate::frame::Transform;
use crate::messages::{
    AttachedCollisionObject, CloudSamples, CollisionObject, GoalState, MarkerArray, PickupGoal,
    PointCloud2,
};

/// Collision world of the motion planner.
pub trait PlanningScene: Send + Sync {
    fn apply_attached_collision_object(&self, object: &AttachedCollisionObject) -> Result<()>;

    fn known_object_names(&self) -> Result<Vec<String>>;

    fn remove_collision_objects(&self, ids: &[String]) -> Result<()>;

    fn apply_collision_object(&self, object: &CollisionObject) -> Result<()>;
}

/// One shot reads of perception topics. `None` means nothing arrived within the timeout.
pub trait PerceptionSource: Send + Sync {
    fn wait_for_markers(&self, topic: &str, timeout: Duration) -> Option<MarkerArray>;

    fn wait_for_cloud(&self, topic: &str, timeout: Duration) -> Option<PointCloud2>;
}

/// Latest known transform that maps coordinates in `source_frame` into `target_frame`.
pub trait TransformLookup: Send + Sync {
    fn lookup_transform(&self, target_frame: &str, source_frame: &str) -> Result<Transform>;
}

/// Input of the grasp detector.
pub trait CloudSamplesPublisher: Send + Sync {
    fn publish(&self, msg: &CloudSamples) -> Result<()>;
}

/// Client of the pickup action server.
pub trait PickupActionClient: Send + Sync {
    /// Blocks until the server is up.
    fn wait_for_server(&self) -> Result<()>;

    fn send_goal(&self, goal: PickupGoal) -> Result<()>;

    /// Blocks until the last sent goal reaches a terminal state.
    fn wait_for_result(&self) -> Result<GoalState>;
}
