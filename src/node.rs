//! The manipulation node: two callbacks wired to the collaborators.
//!
//! - [`ManipulationNode::on_cloud_pair`] relays the synchronized labeled and camera
//!   clouds to the grasp detector.
//! - [`ManipulationNode::on_grasps`] reacts to the detector's answer: rebuilds the
//!   planning scene, converts the candidates, sends one pickup goal and blocks until the
//!   server reports the outcome. One attempt per detector message, no retry.
//!
//! Only one pickup cycle runs at a time. A detector message arriving while a cycle is in
//! flight is dropped, so two cycles never rebuild the scene or command the arm
//! concurrently.

use std::sync::{Arc, Mutex, TryLockError};

use anyhow::Result;
use tracing::{info, warn};

use crate::cloud_relay::{CloudRelay, RelayOutcome};
use crate::config::ManipulationConfig;
use crate::grasp_conversion::GraspConverter;
use crate::messages::{GoalState, GraspConfigList, PointCloud2};
use crate::node_traits::{
    CloudSamplesPublisher, PerceptionSource, PickupActionClient, PlanningScene, TransformLookup,
};
use crate::pickup_goal::create_pickup_goal;
use crate::planning_scene::{SceneBuilder, SceneReport};

/// Handles to the external systems.
#[derive(Clone)]
pub struct Collaborators {
    pub scene: Arc<dyn PlanningScene>,
    pub perception: Arc<dyn PerceptionSource>,
    pub transforms: Arc<dyn TransformLookup>,
    pub publisher: Arc<dyn CloudSamplesPublisher>,
    pub pickup: Arc<dyn PickupActionClient>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraspCycleOutcome {
    Completed {
        state: GoalState,
        scene: SceneReport,
        grasps: usize,
    },
    /// Another cycle was in flight
    Skipped,
}

pub struct ManipulationNode {
    config: ManipulationConfig,
    collaborators: Collaborators,
    pickup_gate: Mutex<()>,
}

impl ManipulationNode {
    pub fn new(config: ManipulationConfig, collaborators: Collaborators) -> Self {
        ManipulationNode {
            config,
            collaborators,
            pickup_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    /// Blocks until the pickup action server is available.
    pub fn initialise(&self) -> Result<()> {
        info!("Waiting for action server {} to start.", self.config.topics.pickup_action);
        self.collaborators.pickup.wait_for_server()?;
        info!("Action server started.");
        Ok(())
    }

    pub fn on_cloud_pair(&self, labeled_cloud: &PointCloud2, camera_cloud: &PointCloud2) -> Result<RelayOutcome> {
        CloudRelay::new(
            &self.config,
            &*self.collaborators.transforms,
            &*self.collaborators.publisher,
        )
        .relay(labeled_cloud, camera_cloud)
    }

    pub fn on_grasps(&self, msg: &GraspConfigList) -> Result<GraspCycleOutcome> {
        let _in_flight = match self.pickup_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!(
                    "Pickup in progress, dropping {} grasp candidates.",
                    msg.grasps.len()
                );
                return Ok(GraspCycleOutcome::Skipped);
            }
            // The gate guards no data, a panicked cycle leaves nothing inconsistent
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        info!("Obtained {} possible grasp pose candidates.", msg.grasps.len());
        let config = &self.config;

        let scene = SceneBuilder::new(
            config,
            &*self.collaborators.scene,
            &*self.collaborators.perception,
        )
        .rebuild(&config.target.label_text)?;

        let grasps = GraspConverter::new(config).convert_all(&msg.grasps);
        let count = grasps.len();
        let goal = create_pickup_goal(
            &config.pickup,
            &config.pickup.group_name,
            &config.target.target_id,
            grasps,
            &config.pickup.touch_links,
        );

        info!("Sending goal.");
        self.collaborators.pickup.send_goal(goal)?;
        info!("Waiting for result.");
        let state = self.collaborators.pickup.wait_for_result()?;
        info!(
            "Pick result: {} ({:?})",
            if state.is_success() { "SUCCESS" } else { "FAILED" },
            state
        );

        Ok(GraspCycleOutcome::Completed {
            state,
            scene,
            grasps: count,
        })
    }
}
