use std::sync::Arc;
use std::time::Duration;

use nalgebra::{UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::ManipulationConfig;
use crate::loopback::{
    QueuedPerception, RecordingPublisher, RecordingScene, ScriptedPickupClient, StaticTransforms,
};
use crate::messages::{
    GoalState, GraspConfig, Header, Marker, MarkerArray, Point, PointCloud2, Pose, Quaternion,
    Vector3 as Vector3Msg,
};
use crate::node::Collaborators;

/// Default configuration without the pause after clearing the scene.
pub(crate) fn test_config() -> ManipulationConfig {
    let mut config = ManipulationConfig::default();
    config.scene.settle_delay = Duration::ZERO;
    config
}

/// Loopback collaborators, kept typed so tests can inspect what was recorded.
pub(crate) struct Loopback {
    pub scene: Arc<RecordingScene>,
    pub perception: Arc<QueuedPerception>,
    pub transforms: Arc<StaticTransforms>,
    pub publisher: Arc<RecordingPublisher>,
    pub pickup: Arc<ScriptedPickupClient>,
}

impl Loopback {
    pub fn new(result: GoalState) -> Self {
        Self::with_pickup(ScriptedPickupClient::new(result))
    }

    pub fn with_pickup(pickup: ScriptedPickupClient) -> Self {
        Loopback {
            scene: Arc::new(RecordingScene::new()),
            perception: Arc::new(QueuedPerception::new()),
            transforms: Arc::new(StaticTransforms::new()),
            publisher: Arc::new(RecordingPublisher::new()),
            pickup: Arc::new(pickup),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            scene: self.scene.clone(),
            perception: self.perception.clone(),
            transforms: self.transforms.clone(),
            publisher: self.publisher.clone(),
            pickup: self.pickup.clone(),
        }
    }

    /// Markers with the target label and the table diagonal, as perception would publish.
    pub fn perceive_table_scene(&self, config: &ManipulationConfig) {
        self.perception.push_markers(
            &config.topics.text_markers,
            markers(&[("bottle", [0.9, -0.2, 0.9]), (config.target.label_text.as_str(), [0.7, 0.1, 0.95])]),
        );
        self.perception.push_cloud(
            &config.topics.table_vertices,
            table_vertices("base_footprint", [0.5, -0.4, 0.7], [1.1, 0.4, 0.72]),
        );
    }
}

pub(crate) fn markers(labels: &[(&str, [f64; 3])]) -> MarkerArray {
    MarkerArray {
        markers: labels
            .iter()
            .enumerate()
            .map(|(i, (text, p))| Marker {
                header: Header::in_frame("base_footprint"),
                id: i as i32,
                text: text.to_string(),
                pose: Pose {
                    position: Point::new(p[0], p[1], p[2]),
                    // Marker orientation is meaningless and must be ignored
                    orientation: Quaternion { x: 0.0, y: 0.0, z: 0.7071068, w: 0.7071068 },
                },
            })
            .collect(),
    }
}

pub(crate) fn table_vertices(frame: &str, first: [f32; 3], second: [f32; 3]) -> PointCloud2 {
    PointCloud2::from_xyz(Header::in_frame(frame), &[first, second])
}

/// Grasp hypothesis with the hand frame given as rotation.
pub(crate) fn candidate(position: [f64; 3], hand: &UnitQuaternion<f64>, score: f64) -> GraspConfig {
    let m = hand.to_rotation_matrix();
    let column = |i: usize| {
        let c = m.matrix().column(i);
        Vector3Msg::new(c[0], c[1], c[2])
    };
    let position = Point::new(position[0], position[1], position[2]);
    GraspConfig {
        position,
        approach: column(0),
        binormal: column(1),
        axis: column(2),
        width: 0.06,
        score,
        sample: position,
    }
}

pub(crate) fn random_rotation(rng: &mut StdRng) -> UnitQuaternion<f64> {
    use std::f64::consts::PI;
    UnitQuaternion::from_euler_angles(
        rng.gen_range(-PI..PI),
        rng.gen_range(-PI / 2.0..PI / 2.0),
        rng.gen_range(-PI..PI),
    )
}

pub(crate) fn random_vector(rng: &mut StdRng, range: f64) -> Vector3<f64> {
    Vector3::new(
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
        rng.gen_range(-range..range),
    )
}

pub(crate) fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}
