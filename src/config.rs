//! Configuration of the manipulation node. Every topic, frame, offset, timeout and
//! gripper value the node uses lives here. Defaults reproduce the setup of the TIAGo
//! arm with the parallel gripper; any subset can be overridden from a YAML file:
//!
//! ```yaml
//! topics:
//!   labeled_cloud: /labeled_object_point_cloud
//!   pickup_action: /pickup
//! target:
//!   label_id: 4
//!   label_text: cup
//! scene:
//!   wait_timeout: 1.5
//!   target_box: [0.06, 0.06, 0.12]
//! pickup:
//!   touch_links: [gripper_left_finger_link, gripper_right_finger_link]
//! ```
//!
//! Durations are given in seconds, angles in degrees, distances in meters.

use std::path::Path;
use std::time::Duration;

use yaml_rust2::{Yaml, YamlLoader};

use crate::config_error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct Topics {
    pub labeled_cloud: String,
    pub camera_cloud: String,
    pub text_markers: String,
    pub table_vertices: String,
    /// Where the cloud with samples for the detector is published
    pub cloud_samples: String,
    /// Where the detector publishes grasp candidates
    pub grasps: String,
    pub pickup_action: String,
}

impl Default for Topics {
    fn default() -> Self {
        Topics {
            labeled_cloud: "/labeled_object_point_cloud".to_string(),
            camera_cloud: "/combined_point_cloud".to_string(),
            text_markers: "/text_markers".to_string(),
            table_vertices: "/table_vertices".to_string(),
            cloud_samples: "/cloud_stitched".to_string(),
            grasps: "/detect_grasps/clustered_grasps".to_string(),
            pickup_action: "/pickup".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frames {
    pub base: String,
    pub camera: String,
    pub tool: String,
}

impl Default for Frames {
    fn default() -> Self {
        Frames {
            base: "base_footprint".to_string(),
            camera: "xtion_rgb_optical_frame".to_string(),
            tool: "arm_tool_link".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Depth of each queue of the approximate time synchronizer
    pub sync_queue_depth: usize,
    /// Upper bound of stamp difference for a cloud pair, unbounded if None
    pub max_pair_interval: Option<Duration>,
    pub executor_threads: usize,
    pub loop_rate_hz: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            sync_queue_depth: 10,
            max_pair_interval: None,
            executor_threads: 2,
            loop_rate_hz: 30.0,
        }
    }
}

impl RuntimeConfig {
    pub fn loop_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.loop_rate_hz)
    }
}

/// What object the node tries to pick.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetConfig {
    /// Class id of the object in the label field of the labeled cloud
    pub label_id: i64,
    /// Class name of the same object in the text markers
    pub label_text: String,
    pub label_field: String,
    pub target_id: String,
    pub plane_id: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            label_id: 7,
            label_text: "traffic light".to_string(),
            label_field: "label".to_string(),
            target_id: "target".to_string(),
            plane_id: "plane".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// How long to wait for markers and for table vertices, each
    pub wait_timeout: Duration,
    /// Pause after the scene has been cleared
    pub settle_delay: Duration,
    pub plane_height: f64,
    /// The plane box is lowered by this so that its top is near the table surface
    pub plane_drop: f64,
    pub target_box: [f64; 3],
    /// Label markers float above the object; the target box is lowered by this
    pub target_drop: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            wait_timeout: Duration::from_secs(2),
            settle_delay: Duration::from_secs(2),
            plane_height: 0.05,
            plane_drop: 0.025,
            target_box: [0.08, 0.08, 0.08],
            target_drop: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GripperConfig {
    pub joint_names: Vec<String>,
    pub open_position: f64,
    pub open_time: Duration,
    pub close_position: f64,
    pub close_time: Duration,
    /// In the closing posture, the open point is delayed by this
    pub close_delay: Duration,
}

impl Default for GripperConfig {
    fn default() -> Self {
        GripperConfig {
            joint_names: vec![
                "gripper_left_finger_joint".to_string(),
                "gripper_right_finger_joint".to_string(),
            ],
            open_position: 0.05,
            open_time: Duration::from_secs(2),
            close_position: 0.01,
            close_time: Duration::from_secs(6),
            close_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraspConversionConfig {
    /// Frame of the grasp poses (the detector works in the robot base frame)
    pub pose_frame: String,
    /// Rotation about the local x axis, degrees, applied to the detector hand frame
    pub frame_correction_deg: f64,
    /// Distance the grasp pose is moved back along its own x axis
    pub backoff: f64,
    pub approach_distance: f64,
    pub retreat_distance: f64,
    pub min_distance: f64,
    pub max_contact_force: f64,
}

impl Default for GraspConversionConfig {
    fn default() -> Self {
        GraspConversionConfig {
            pose_frame: "base_footprint".to_string(),
            frame_correction_deg: -90.0,
            backoff: 0.1,
            approach_distance: 0.15,
            retreat_distance: 0.15,
            min_distance: 0.0,
            max_contact_force: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PickupConfig {
    pub group_name: String,
    pub allowed_planning_time: Duration,
    pub plan_only: bool,
    pub replan: bool,
    pub replan_attempts: u32,
    /// Links allowed to touch the target during the grasp
    pub touch_links: Vec<String>,
}

impl Default for PickupConfig {
    fn default() -> Self {
        PickupConfig {
            group_name: "arm_torso".to_string(),
            allowed_planning_time: Duration::from_secs(35),
            plan_only: false,
            replan: true,
            replan_attempts: 1,
            touch_links: vec![
                "gripper_left_finger_link".to_string(),
                "gripper_right_finger_link".to_string(),
                "gripper_link".to_string(),
            ],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManipulationConfig {
    pub topics: Topics,
    pub frames: Frames,
    pub runtime: RuntimeConfig,
    pub target: TargetConfig,
    pub scene: SceneConfig,
    pub gripper: GripperConfig,
    pub grasp: GraspConversionConfig,
    pub pickup: PickupConfig,
}

impl ManipulationConfig {
    /// Read the configuration from the YAML file. Missing sections and keys keep
    /// their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}", e)))?;
        let mut config = ManipulationConfig::default();
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(config),
        };
        if !doc.is_null() && doc.as_hash().is_none() {
            return Err(ConfigError::ParseError("top level must be a mapping".to_string()));
        }

        let s = Section::of(doc, "topics")?;
        let t = &mut config.topics;
        s.string("labeled_cloud", &mut t.labeled_cloud)?;
        s.string("camera_cloud", &mut t.camera_cloud)?;
        s.string("text_markers", &mut t.text_markers)?;
        s.string("table_vertices", &mut t.table_vertices)?;
        s.string("cloud_samples", &mut t.cloud_samples)?;
        s.string("grasps", &mut t.grasps)?;
        s.string("pickup_action", &mut t.pickup_action)?;

        let s = Section::of(doc, "frames")?;
        let f = &mut config.frames;
        s.string("base", &mut f.base)?;
        s.string("camera", &mut f.camera)?;
        s.string("tool", &mut f.tool)?;

        let s = Section::of(doc, "runtime")?;
        let r = &mut config.runtime;
        s.usize("sync_queue_depth", &mut r.sync_queue_depth)?;
        s.optional_duration("max_pair_interval", &mut r.max_pair_interval)?;
        s.usize("executor_threads", &mut r.executor_threads)?;
        s.f64("loop_rate_hz", &mut r.loop_rate_hz)?;

        let s = Section::of(doc, "target")?;
        let t = &mut config.target;
        s.i64("label_id", &mut t.label_id)?;
        s.string("label_text", &mut t.label_text)?;
        s.string("label_field", &mut t.label_field)?;
        s.string("target_id", &mut t.target_id)?;
        s.string("plane_id", &mut t.plane_id)?;

        let s = Section::of(doc, "scene")?;
        let c = &mut config.scene;
        s.duration("wait_timeout", &mut c.wait_timeout)?;
        s.duration("settle_delay", &mut c.settle_delay)?;
        s.f64("plane_height", &mut c.plane_height)?;
        s.f64("plane_drop", &mut c.plane_drop)?;
        s.f64x3("target_box", &mut c.target_box)?;
        s.f64("target_drop", &mut c.target_drop)?;

        let s = Section::of(doc, "gripper")?;
        let g = &mut config.gripper;
        s.strings("joint_names", &mut g.joint_names)?;
        s.f64("open_position", &mut g.open_position)?;
        s.duration("open_time", &mut g.open_time)?;
        s.f64("close_position", &mut g.close_position)?;
        s.duration("close_time", &mut g.close_time)?;
        s.duration("close_delay", &mut g.close_delay)?;

        let s = Section::of(doc, "grasp")?;
        let g = &mut config.grasp;
        s.string("pose_frame", &mut g.pose_frame)?;
        s.f64("frame_correction_deg", &mut g.frame_correction_deg)?;
        s.f64("backoff", &mut g.backoff)?;
        s.f64("approach_distance", &mut g.approach_distance)?;
        s.f64("retreat_distance", &mut g.retreat_distance)?;
        s.f64("min_distance", &mut g.min_distance)?;
        s.f64("max_contact_force", &mut g.max_contact_force)?;

        let s = Section::of(doc, "pickup")?;
        let p = &mut config.pickup;
        s.string("group_name", &mut p.group_name)?;
        s.duration("allowed_planning_time", &mut p.allowed_planning_time)?;
        s.bool("plan_only", &mut p.plan_only)?;
        s.bool("replan", &mut p.replan)?;
        s.u32("replan_attempts", &mut p.replan_attempts)?;
        s.strings("touch_links", &mut p.touch_links)?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make the node misbehave rather than fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.runtime.sync_queue_depth == 0 {
            return Err(invalid("runtime.sync_queue_depth", "must be at least 1"));
        }
        if self.runtime.executor_threads == 0 {
            return Err(invalid("runtime.executor_threads", "must be at least 1"));
        }
        if !(self.runtime.loop_rate_hz.is_finite() && self.runtime.loop_rate_hz > 0.0) {
            return Err(invalid("runtime.loop_rate_hz", "must be positive"));
        }
        if self.gripper.joint_names.is_empty() {
            return Err(invalid("gripper.joint_names", "at least one joint is required"));
        }
        if self.gripper.close_time <= self.gripper.open_time + self.gripper.close_delay {
            return Err(invalid(
                "gripper.close_time",
                "must come after the delayed open point",
            ));
        }
        for (key, value) in [
            ("scene.plane_height", self.scene.plane_height),
            ("scene.target_box[0]", self.scene.target_box[0]),
            ("scene.target_box[1]", self.scene.target_box[1]),
            ("scene.target_box[2]", self.scene.target_box[2]),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(key, "box dimensions must be positive"));
            }
        }
        if !self.grasp.frame_correction_deg.is_finite() || !self.grasp.backoff.is_finite() {
            return Err(invalid("grasp", "values must be finite"));
        }
        Ok(())
    }
}

/// One top level mapping of the configuration file. A missing section reads as empty.
struct Section<'a> {
    name: &'static str,
    node: &'a Yaml,
}

impl<'a> Section<'a> {
    fn of(doc: &'a Yaml, name: &'static str) -> Result<Self, ConfigError> {
        let node = &doc[name];
        if !(node.is_badvalue() || node.is_null() || node.as_hash().is_some()) {
            return Err(ConfigError::WrongType {
                key: name.to_string(),
                expected: "mapping",
            });
        }
        Ok(Section { name, node })
    }

    fn get(&self, key: &str) -> Option<&'a Yaml> {
        let value = &self.node[key];
        if value.is_badvalue() || value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    fn wrong(&self, key: &str, expected: &'static str) -> ConfigError {
        ConfigError::WrongType {
            key: format!("{}.{}", self.name, key),
            expected,
        }
    }

    fn string(&self, key: &str, target: &mut String) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = value
                .as_str()
                .ok_or_else(|| self.wrong(key, "string"))?
                .to_string();
        }
        Ok(())
    }

    fn f64(&self, key: &str, target: &mut f64) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = as_number(value).ok_or_else(|| self.wrong(key, "number"))?;
        }
        Ok(())
    }

    fn i64(&self, key: &str, target: &mut i64) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = value.as_i64().ok_or_else(|| self.wrong(key, "integer"))?;
        }
        Ok(())
    }

    fn usize(&self, key: &str, target: &mut usize) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            let v = value.as_i64().ok_or_else(|| self.wrong(key, "integer"))?;
            *target = usize::try_from(v).map_err(|_| self.wrong(key, "non-negative integer"))?;
        }
        Ok(())
    }

    fn u32(&self, key: &str, target: &mut u32) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            let v = value.as_i64().ok_or_else(|| self.wrong(key, "integer"))?;
            *target = u32::try_from(v).map_err(|_| self.wrong(key, "non-negative integer"))?;
        }
        Ok(())
    }

    fn bool(&self, key: &str, target: &mut bool) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = value.as_bool().ok_or_else(|| self.wrong(key, "boolean"))?;
        }
        Ok(())
    }

    fn duration(&self, key: &str, target: &mut Duration) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = self.seconds(key, value)?;
        }
        Ok(())
    }

    fn optional_duration(&self, key: &str, target: &mut Option<Duration>) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            *target = Some(self.seconds(key, value)?);
        }
        Ok(())
    }

    fn seconds(&self, key: &str, value: &Yaml) -> Result<Duration, ConfigError> {
        let secs = as_number(value).ok_or_else(|| self.wrong(key, "seconds"))?;
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
            key: format!("{}.{}", self.name, key),
            reason: format!("{} is not a valid duration", secs),
        })
    }

    fn f64x3(&self, key: &str, target: &mut [f64; 3]) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            let items = value.as_vec().ok_or_else(|| self.wrong(key, "list of 3 numbers"))?;
            if items.len() != 3 {
                return Err(self.wrong(key, "list of 3 numbers"));
            }
            for (slot, item) in target.iter_mut().zip(items) {
                *slot = as_number(item).ok_or_else(|| self.wrong(key, "list of 3 numbers"))?;
            }
        }
        Ok(())
    }

    fn strings(&self, key: &str, target: &mut Vec<String>) -> Result<(), ConfigError> {
        if let Some(value) = self.get(key) {
            let items = value.as_vec().ok_or_else(|| self.wrong(key, "list of strings"))?;
            *target = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.wrong(key, "list of strings"))?;
        }
        Ok(())
    }
}

/// YAML distinguishes 2 from 2.0; both are fine for a float setting.
pub(crate) fn as_number(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|v| v as f64))
}
