//! Orchestration node for picking up a perceived object with a motion planning stack.
//!
//! The node itself does no grasp detection and no planning. It connects three external
//! systems and converts between their messages:
//!
//! - Perception publishes a labeled point cloud (class id per point), the camera cloud,
//!   text markers at object centroids and the two corner vertices of the table.
//! - A grasp pose detector takes a cloud with sample points and answers with grasp
//!   hypotheses (hand position plus approach, binormal and axis vectors, and a score).
//! - A motion planning framework keeps a planning scene of collision objects and runs a
//!   pickup action server that plans and executes one of several candidate grasps.
//!
//! # Flow
//!
//! 1. Labeled and camera clouds are paired by stamp (`sync.rs`). The points carrying the
//!    label of the object to pick become the detector samples; the camera position from
//!    the transform tree becomes the view point (`cloud_relay.rs`).
//! 2. When the detector answers, the planning scene is cleared and rebuilt with a box for
//!    the table and a box for the object (`planning_scene.rs`).
//! 3. Each hypothesis is converted to a planning grasp: hand frame corrected by a fixed
//!    roll, pose pulled back from the object, gripper postures and approach/retreat
//!    attached (`grasp_conversion.rs`).
//! 4. All grasps go into one pickup goal (`pickup_goal.rs`), sent to the action server;
//!    the callback blocks until the outcome is known (`node.rs`).
//!
//! The external systems are reached through the traits in `node_traits.rs`. In-memory
//! implementations in `loopback.rs` make the node runnable without a robot, which the
//! `rs-grasp-pickup` binary uses to replay recorded scenarios.
//!
//! All numbers (topics, frames, offsets, timeouts, gripper values) come from
//! [`config::ManipulationConfig`], with defaults matching a TIAGo arm with parallel
//! gripper.

pub mod messages;

pub mod point_cloud;

pub mod frame;

pub mod config;
pub mod config_error;

#[path = "utils/utils.rs"]
pub mod utils;

pub mod node_traits;

pub mod planning_scene;

pub mod grasp_conversion;

pub mod pickup_goal;

pub mod sync;

pub mod cloud_relay;

pub mod node;

pub mod executor;

pub mod loopback;

pub mod scenario;

#[cfg(test)]
mod tests;
