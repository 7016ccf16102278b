//! Relay from the perception clouds to the grasp detector.
//!
//! The detector gets the full camera cloud (it needs the surroundings to reject colliding
//! hands) together with the camera origin as view point, and a list of sample points at
//! which to search for grasps. The samples are the points of the labeled cloud that carry
//! the label of the object to pick.

use anyhow::Result;
use nalgebra::Point3;
use tracing::debug;

use crate::config::ManipulationConfig;
use crate::messages::{CloudSamples, CloudSources, Point, PointCloud2};
use crate::node_traits::{CloudSamplesPublisher, TransformLookup};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Published with this many samples
    Published(usize),
    /// No point carried the label, nothing published
    NoSamples,
}

/// Points of the labeled cloud that carry `label_id`, in cloud order.
pub fn label_samples(
    labeled_cloud: &PointCloud2,
    label_field: &str,
    label_id: i64,
) -> Result<Vec<Point>> {
    let samples = labeled_cloud
        .labeled_xyz(label_field)?
        .into_iter()
        .filter(|(_, label)| *label == label_id)
        .map(|(p, _)| Point::new(p.x as f64, p.y as f64, p.z as f64))
        .collect();
    Ok(samples)
}

/// Detector input: the camera cloud seen from one view point, all points attributed to it.
pub fn cloud_sources(camera_cloud: &PointCloud2, camera_position: &Point3<f64>) -> CloudSources {
    CloudSources {
        cloud: camera_cloud.clone(),
        camera_source: vec![0; camera_cloud.len()],
        view_points: vec![Point::new(camera_position.x, camera_position.y, camera_position.z)],
    }
}

pub struct CloudRelay<'a> {
    config: &'a ManipulationConfig,
    transforms: &'a dyn TransformLookup,
    publisher: &'a dyn CloudSamplesPublisher,
}

impl<'a> CloudRelay<'a> {
    pub fn new(
        config: &'a ManipulationConfig,
        transforms: &'a dyn TransformLookup,
        publisher: &'a dyn CloudSamplesPublisher,
    ) -> Self {
        CloudRelay {
            config,
            transforms,
            publisher,
        }
    }

    /// A failed transform lookup aborts the relay; there is no fallback position.
    pub fn relay(&self, labeled_cloud: &PointCloud2, camera_cloud: &PointCloud2) -> Result<RelayOutcome> {
        let frames = &self.config.frames;
        let base_camera = self.transforms.lookup_transform(&frames.base, &frames.camera)?;
        let camera_position = Point3::from(base_camera.translation.vector);

        let target = &self.config.target;
        let samples = label_samples(labeled_cloud, &target.label_field, target.label_id)?;
        if samples.is_empty() {
            debug!("No points labeled {} in the cloud, nothing to relay", target.label_id);
            return Ok(RelayOutcome::NoSamples);
        }

        let count = samples.len();
        let msg = CloudSamples {
            cloud_sources: cloud_sources(camera_cloud, &camera_position),
            samples,
        };
        self.publisher.publish(&msg)?;
        debug!("Published {} samples to {}", count, self.config.topics.cloud_samples);
        Ok(RelayOutcome::Published(count))
    }
}
