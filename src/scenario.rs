//! Recorded situation to replay through the node without a robot: what perception shows,
//! where the camera is, what the detector proposes and how the pickup ends.
//!
//! ```yaml
//! camera_transform:            # camera pose in the base frame
//!   translation: [0.2, 0.0, 1.1]
//!   rotation: [0.0, 0.0, 0.0, 1.0]   # x, y, z, w
//! markers:
//!   - text: traffic light
//!     position: [0.7, 0.1, 0.95]
//! table_vertices:
//!   frame: base_footprint
//!   points: [[0.5, -0.4, 0.7], [1.1, 0.4, 0.72]]
//! labeled_cloud:
//!   stamp: 12.0
//!   points: [[0.7, 0.1, 0.8, 7], [0.9, 0.3, 0.75, 2]]
//! camera_cloud:
//!   stamp: 12.01
//!   points: [[0.7, 0.1, 0.8], [0.9, 0.3, 0.75]]
//! grasps:
//!   - position: [0.7, 0.1, 0.8]
//!     approach: [1.0, 0.0, 0.0]
//!     binormal: [0.0, 1.0, 0.0]
//!     axis: [0.0, 0.0, 1.0]
//!     score: 0.93
//! pickup_result: succeeded
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{Isometry3, Quaternion as NaQuaternion, Translation3, UnitQuaternion};
use yaml_rust2::{Yaml, YamlLoader};

use crate::config::{as_number, ManipulationConfig};
use crate::executor::NodeEvent;
use crate::frame::Transform;
use crate::loopback::{QueuedPerception, StaticTransforms};
use crate::messages::{
    GoalState, GraspConfig, GraspConfigList, Header, Marker, MarkerArray, Point, PointCloud2,
    Pose, Quaternion, Vector3,
};

pub struct Scenario {
    pub camera_transform: Transform,
    pub markers: Option<MarkerArray>,
    pub table_vertices: Option<PointCloud2>,
    pub labeled_cloud: Option<PointCloud2>,
    pub camera_cloud: Option<PointCloud2>,
    pub grasps: GraspConfigList,
    pub pickup_result: GoalState,
}

impl Scenario {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P, config: &ManipulationConfig) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_yaml_str(&contents, config)
    }

    /// Frames not given in the file default to the configured base and camera frames.
    pub fn from_yaml_str(contents: &str, config: &ManipulationConfig) -> Result<Self> {
        let docs = YamlLoader::load_from_str(contents).map_err(|e| anyhow!("Scenario parse error: {}", e))?;
        let doc = docs.first().ok_or_else(|| anyhow!("Scenario is empty"))?;
        let base = &config.frames.base;
        let camera = &config.frames.camera;

        let camera_transform = match present(&doc["camera_transform"]) {
            Some(node) => parse_transform(node).context("camera_transform")?,
            None => Isometry3::identity(),
        };

        let markers = match present(&doc["markers"]) {
            Some(node) => Some(parse_markers(node, base).context("markers")?),
            None => None,
        };

        let table_vertices = match present(&doc["table_vertices"]) {
            Some(node) => Some(xyz_cloud(node, base).context("table_vertices")?),
            None => None,
        };

        let labeled_cloud = match present(&doc["labeled_cloud"]) {
            Some(node) => Some(parse_labeled_cloud(node, base).context("labeled_cloud")?),
            None => None,
        };

        let camera_cloud = match present(&doc["camera_cloud"]) {
            Some(node) => Some(xyz_cloud(node, camera).context("camera_cloud")?),
            None => None,
        };

        let grasps = match present(&doc["grasps"]) {
            Some(node) => parse_grasps(node, base).context("grasps")?,
            None => GraspConfigList::default(),
        };

        let pickup_result = match present(&doc["pickup_result"]) {
            Some(node) => goal_state(node)?,
            None => GoalState::Succeeded,
        };

        Ok(Scenario {
            camera_transform,
            markers,
            table_vertices,
            labeled_cloud,
            camera_cloud,
            grasps,
            pickup_result,
        })
    }

    /// Makes markers, table vertices and the camera transform available to the node.
    pub fn install(&self, config: &ManipulationConfig, perception: &QueuedPerception, transforms: &StaticTransforms) {
        if let Some(markers) = &self.markers {
            perception.push_markers(&config.topics.text_markers, markers.clone());
        }
        if let Some(vertices) = &self.table_vertices {
            perception.push_cloud(&config.topics.table_vertices, vertices.clone());
        }
        transforms.set(&config.frames.base, &config.frames.camera, self.camera_transform);
    }

    /// Messages as they would arrive: the cloud pair, then the detector answer.
    pub fn events(&self) -> Vec<NodeEvent> {
        let mut events = Vec::new();
        if let Some(cloud) = &self.labeled_cloud {
            events.push(NodeEvent::LabeledCloud(cloud.clone()));
        }
        if let Some(cloud) = &self.camera_cloud {
            events.push(NodeEvent::CameraCloud(cloud.clone()));
        }
        if !self.grasps.grasps.is_empty() {
            events.push(NodeEvent::Grasps(self.grasps.clone()));
        }
        events
    }
}

fn present(node: &Yaml) -> Option<&Yaml> {
    if node.is_badvalue() || node.is_null() {
        None
    } else {
        Some(node)
    }
}

fn numbers<const N: usize>(node: &Yaml) -> Result<[f64; N]> {
    let items = node
        .as_vec()
        .ok_or_else(|| anyhow!("expected a list of {} numbers", N))?;
    if items.len() != N {
        bail!("expected {} numbers, found {}", N, items.len());
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = as_number(item).ok_or_else(|| anyhow!("{:?} is not a number", item))?;
    }
    Ok(out)
}

fn list(node: &Yaml) -> Result<&Vec<Yaml>> {
    node.as_vec().ok_or_else(|| anyhow!("expected a list"))
}

fn parse_transform(node: &Yaml) -> Result<Transform> {
    let t = numbers::<3>(&node["translation"]).context("translation")?;
    let r = match present(&node["rotation"]) {
        Some(r) => numbers::<4>(r).context("rotation")?,
        None => [0.0, 0.0, 0.0, 1.0],
    };
    Ok(Isometry3::from_parts(
        Translation3::new(t[0], t[1], t[2]),
        UnitQuaternion::from_quaternion(NaQuaternion::new(r[3], r[0], r[1], r[2])),
    ))
}

fn header(node: &Yaml, default_frame: &str) -> Header {
    let frame = node["frame"].as_str().unwrap_or(default_frame);
    let stamp = as_number(&node["stamp"])
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .unwrap_or_default();
    Header::new(frame, stamp)
}

fn parse_markers(node: &Yaml, frame: &str) -> Result<MarkerArray> {
    let mut markers = Vec::new();
    for (id, item) in list(node)?.iter().enumerate() {
        let text = item["text"]
            .as_str()
            .ok_or_else(|| anyhow!("marker {} has no text", id))?;
        let p = numbers::<3>(&item["position"]).with_context(|| format!("marker {}", id))?;
        markers.push(Marker {
            header: Header::in_frame(frame),
            id: id as i32,
            text: text.to_string(),
            pose: Pose {
                position: Point::new(p[0], p[1], p[2]),
                orientation: Quaternion::identity(),
            },
        });
    }
    Ok(MarkerArray { markers })
}

fn xyz_cloud(node: &Yaml, default_frame: &str) -> Result<PointCloud2> {
    let mut points = Vec::new();
    for item in list(&node["points"])? {
        let p = numbers::<3>(item)?;
        points.push([p[0] as f32, p[1] as f32, p[2] as f32]);
    }
    Ok(PointCloud2::from_xyz(header(node, default_frame), &points))
}

fn parse_labeled_cloud(node: &Yaml, default_frame: &str) -> Result<PointCloud2> {
    let mut points = Vec::new();
    for item in list(&node["points"])? {
        let p = numbers::<4>(item)?;
        points.push(([p[0] as f32, p[1] as f32, p[2] as f32], p[3] as i32));
    }
    Ok(PointCloud2::from_labeled_xyz(header(node, default_frame), &points))
}

fn parse_grasps(node: &Yaml, frame: &str) -> Result<GraspConfigList> {
    let vector = |item: &Yaml, key: &str| -> Result<Vector3> {
        let v = numbers::<3>(&item[key]).context(key.to_string())?;
        Ok(Vector3::new(v[0], v[1], v[2]))
    };
    let mut grasps = Vec::new();
    for (i, item) in list(node)?.iter().enumerate() {
        let p = numbers::<3>(&item["position"]).with_context(|| format!("grasp {} position", i))?;
        let position = Point::new(p[0], p[1], p[2]);
        grasps.push(GraspConfig {
            position,
            approach: vector(item, "approach").with_context(|| format!("grasp {}", i))?,
            binormal: vector(item, "binormal").with_context(|| format!("grasp {}", i))?,
            axis: vector(item, "axis").with_context(|| format!("grasp {}", i))?,
            width: as_number(&item["width"]).unwrap_or(0.0),
            score: as_number(&item["score"]).unwrap_or(0.0),
            sample: position,
        });
    }
    Ok(GraspConfigList {
        header: Header::in_frame(frame),
        grasps,
    })
}

fn goal_state(node: &Yaml) -> Result<GoalState> {
    match node.as_str() {
        Some("succeeded") => Ok(GoalState::Succeeded),
        Some("aborted") => Ok(GoalState::Aborted),
        Some("preempted") => Ok(GoalState::Preempted),
        Some("rejected") => Ok(GoalState::Rejected),
        Some("lost") => Ok(GoalState::Lost),
        _ => bail!("pickup_result must be one of succeeded, aborted, preempted, rejected, lost"),
    }
}
