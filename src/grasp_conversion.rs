//! Turns grasp hypotheses of the detector into grasps the pickup action server accepts.
//!
//! The detector describes the hand by approach, binormal and axis vectors. These are the
//! columns of the hand rotation. The gripper of the arm is rolled relative to the
//! detector's hand model, so the rotation is corrected by a fixed roll about its own x
//! axis. The pose is then pulled back along x so the fingers start clear of the object.
//!
//! Every candidate is converted, in order. Ranking and rejection is up to the server.

use std::time::Duration;

use nalgebra::{UnitQuaternion, Vector3};
use tracing::info;

use crate::config::ManipulationConfig;
use crate::frame::{deg_to_rad, quaternion_to_msg, rotation_from_axes, shift_along_local, vector_to_na};
use crate::messages::{
    Grasp, GraspConfig, GripperTranslation, Header, JointTrajectory, JointTrajectoryPoint, Pose,
    PoseStamped, Vector3 as Vector3Msg, Vector3Stamped,
};

pub struct GraspConverter<'a> {
    config: &'a ManipulationConfig,
}

impl<'a> GraspConverter<'a> {
    pub fn new(config: &'a ManipulationConfig) -> Self {
        GraspConverter { config }
    }

    pub fn convert_all(&self, candidates: &[GraspConfig]) -> Vec<Grasp> {
        candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let grasp = self.convert(index, candidate);
                info!("inserted grasp configuration with score: {}", candidate.score);
                grasp
            })
            .collect()
    }

    pub fn convert(&self, index: usize, candidate: &GraspConfig) -> Grasp {
        let approach_cfg = &self.config.grasp;
        let tool = &self.config.frames.tool;

        Grasp {
            id: format!("grasp_{}", index),
            pre_grasp_posture: self.open_posture(),
            grasp_posture: self.close_posture(),
            grasp_pose: PoseStamped {
                header: Header::in_frame(&approach_cfg.pose_frame),
                pose: self.grasp_pose(candidate),
            },
            grasp_quality: candidate.score,
            pre_grasp_approach: GripperTranslation {
                direction: Vector3Stamped {
                    header: Header::in_frame(tool),
                    vector: Vector3Msg::new(1.0, 0.0, 0.0),
                },
                desired_distance: approach_cfg.approach_distance,
                min_distance: approach_cfg.min_distance,
            },
            post_grasp_retreat: GripperTranslation {
                direction: Vector3Stamped {
                    header: Header::in_frame(tool),
                    vector: Vector3Msg::new(-1.0, 0.0, 0.0),
                },
                desired_distance: approach_cfg.retreat_distance,
                min_distance: approach_cfg.min_distance,
            },
            max_contact_force: approach_cfg.max_contact_force,
        }
    }

    /// Orientation from the hand axes with the roll correction, position pulled back.
    pub fn grasp_pose(&self, candidate: &GraspConfig) -> Pose {
        let hand = rotation_from_axes(
            &vector_to_na(&candidate.approach),
            &vector_to_na(&candidate.binormal),
            &vector_to_na(&candidate.axis),
        );
        let correction = UnitQuaternion::from_axis_angle(
            &Vector3::x_axis(),
            deg_to_rad(self.config.grasp.frame_correction_deg),
        );
        // Right multiplication: the roll is about the hand's own x axis
        let orientation = hand * correction;

        let pose = Pose {
            position: candidate.position,
            orientation: quaternion_to_msg(&orientation),
        };
        shift_along_local(&pose, &Vector3::new(-self.config.grasp.backoff, 0.0, 0.0))
    }

    /// Fingers open, single point.
    pub fn open_posture(&self) -> JointTrajectory {
        let gripper = &self.config.gripper;
        JointTrajectory {
            header: Header::in_frame(&self.config.frames.tool),
            joint_names: gripper.joint_names.clone(),
            points: vec![finger_point(gripper.joint_names.len(), gripper.open_position, gripper.open_time)],
        }
    }

    /// The open point, delayed, followed by the closed point.
    pub fn close_posture(&self) -> JointTrajectory {
        let gripper = &self.config.gripper;
        let mut posture = self.open_posture();
        for point in posture.points.iter_mut() {
            point.time_from_start += gripper.close_delay;
        }
        posture.points.push(finger_point(
            gripper.joint_names.len(),
            gripper.close_position,
            gripper.close_time,
        ));
        posture
    }
}

fn finger_point(joints: usize, position: f64, time_from_start: Duration) -> JointTrajectoryPoint {
    JointTrajectoryPoint {
        positions: vec![position; joints],
        time_from_start,
    }
}
