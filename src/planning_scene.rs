//! Rebuilds the collision world of the motion planner from what perception currently
//! sees: a thin box for the table and a fixed size box for the object to pick.
//!
//! The rebuild is destructive and done in two phases. [`SceneBuilder::clear`] drops the
//! attached target and every known collision object; [`SceneBuilder::populate`] then adds
//! the plane and the target again. Nothing is diffed against the previous scene.
//!
//! Missing perception (no markers, label not among them, no table vertices) does not
//! fail the rebuild. It is logged and listed in the returned [`SceneReport`], and the
//! scene is left with whatever could be built.

use std::fmt;
use std::thread::sleep;

use anyhow::Result;
use nalgebra::Point3;
use parry3d::bounding_volume::Aabb;
use tracing::{error, info};

use crate::config::{ManipulationConfig, SceneConfig};
use crate::messages::{AttachedCollisionObject, CollisionObject, Point, Pose, Quaternion};
use crate::node_traits::{PerceptionSource, PlanningScene};
use crate::point_cloud::CloudError;

/// Why some part of the scene could not be built.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneIssue {
    NoMarkers,
    LabelNotFound(String),
    NoPlaneVertices,
    TooFewPlaneVertices(usize),
    MalformedPlaneVertices(CloudError),
}

impl fmt::Display for SceneIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneIssue::NoMarkers => write!(f, "no labels detected"),
            SceneIssue::LabelNotFound(label) => write!(f, "no label: {} found", label),
            SceneIssue::NoPlaneVertices => write!(f, "no table vertices received"),
            SceneIssue::TooFewPlaneVertices(n) => {
                write!(f, "table vertices hold {} points, 2 required", n)
            }
            SceneIssue::MalformedPlaneVertices(e) => write!(f, "table vertices unreadable: {}", e),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneReport {
    pub plane_added: bool,
    pub target_added: bool,
    pub issues: Vec<SceneIssue>,
}

impl SceneReport {
    pub fn is_complete(&self) -> bool {
        self.plane_added && self.target_added
    }
}

/// Box standing for the table. The two vertices are opposite corners of the table
/// surface; the box spans their horizontal extent and hangs `plane_drop` below their
/// mean height.
pub fn plane_box(first: &Point3<f32>, second: &Point3<f32>, config: &SceneConfig) -> (Pose, [f64; 3]) {
    let a = parry3d::math::Point::new(first.x, first.y, first.z);
    let b = parry3d::math::Point::new(second.x, second.y, second.z);
    let aabb = Aabb::new(a.inf(&b), a.sup(&b));
    let center = aabb.center();
    let extents = aabb.extents();

    let pose = Pose {
        position: Point::new(
            center.x as f64,
            center.y as f64,
            center.z as f64 - config.plane_drop,
        ),
        orientation: Quaternion::identity(),
    };
    (pose, [extents.x as f64, extents.y as f64, config.plane_height])
}

/// Pose of the target box from the pose of its label marker. Orientation of the marker
/// carries no information and is reset.
pub fn target_box_pose(marker_pose: &Pose, config: &SceneConfig) -> Pose {
    let mut pose = *marker_pose;
    pose.position.z -= config.target_drop;
    pose.orientation = Quaternion::identity();
    pose
}

pub struct SceneBuilder<'a> {
    config: &'a ManipulationConfig,
    scene: &'a dyn PlanningScene,
    perception: &'a dyn PerceptionSource,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(
        config: &'a ManipulationConfig,
        scene: &'a dyn PlanningScene,
        perception: &'a dyn PerceptionSource,
    ) -> Self {
        SceneBuilder {
            config,
            scene,
            perception,
        }
    }

    /// Clear, then populate.
    pub fn rebuild(&self, label: &str) -> Result<SceneReport> {
        self.clear()?;
        self.populate(label)
    }

    pub fn clear(&self) -> Result<()> {
        info!("Removing any previous collision objects.");
        self.scene
            .apply_attached_collision_object(&AttachedCollisionObject::removal(&self.config.target.target_id))?;
        let known = self.scene.known_object_names()?;
        self.scene.remove_collision_objects(&known)?;
        if !self.config.scene.settle_delay.is_zero() {
            sleep(self.config.scene.settle_delay);
        }
        Ok(())
    }

    pub fn populate(&self, label: &str) -> Result<SceneReport> {
        let scene_config = &self.config.scene;
        let mut report = SceneReport::default();

        let target_pose = self.find_target(label, &mut report);

        let vertices = self
            .perception
            .wait_for_cloud(&self.config.topics.table_vertices, scene_config.wait_timeout);
        let plane = match vertices {
            None => {
                report.issues.push(SceneIssue::NoPlaneVertices);
                None
            }
            Some(cloud) => match cloud.xyz() {
                Ok(points) if points.len() >= 2 => {
                    // Only the first two points are the diagonal
                    let (pose, dims) = plane_box(&points[0], &points[1], scene_config);
                    Some((cloud.header.frame_id.clone(), pose, dims))
                }
                Ok(points) => {
                    report.issues.push(SceneIssue::TooFewPlaneVertices(points.len()));
                    None
                }
                Err(e) => {
                    report.issues.push(SceneIssue::MalformedPlaneVertices(e));
                    None
                }
            },
        };

        // Both boxes live in the frame of the table vertices
        match plane {
            Some((frame_id, plane_pose, plane_dims)) => {
                let plane_object =
                    CollisionObject::boxed(&frame_id, &self.config.target.plane_id, plane_pose, plane_dims);
                self.scene.apply_collision_object(&plane_object)?;
                report.plane_added = true;
                info!("Added plane collision object.");

                if let Some(pose) = target_pose {
                    let target_object = CollisionObject::boxed(
                        &frame_id,
                        &self.config.target.target_id,
                        pose,
                        scene_config.target_box,
                    );
                    self.scene.apply_collision_object(&target_object)?;
                    report.target_added = true;
                    info!("Added target collision object.");
                }
            }
            None => {
                error!("no collision objects added to planning scene");
            }
        }

        for issue in &report.issues {
            error!("{}", issue);
        }
        Ok(report)
    }

    fn find_target(&self, label: &str, report: &mut SceneReport) -> Option<Pose> {
        let markers = self
            .perception
            .wait_for_markers(&self.config.topics.text_markers, self.config.scene.wait_timeout);
        let Some(markers) = markers else {
            report.issues.push(SceneIssue::NoMarkers);
            return None;
        };
        match markers.markers.iter().find(|m| m.text == label) {
            Some(marker) => Some(target_box_pose(&marker.pose, &self.config.scene)),
            None => {
                report.issues.push(SceneIssue::LabelNotFound(label.to_string()));
                None
            }
        }
    }
}
