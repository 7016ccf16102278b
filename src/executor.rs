//! Event loop hosting the node. Incoming messages arrive on a channel; clouds are paired
//! by stamp and the callbacks run on a small rayon pool, so a pickup cycle blocked on the
//! action server does not stall the cloud relay.

use std::sync::mpsc::{Receiver, RecvTimeoutError};

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::messages::{GraspConfigList, PointCloud2};
use crate::node::{GraspCycleOutcome, ManipulationNode};
use crate::sync::ApproximateTimeSync;

pub enum NodeEvent {
    LabeledCloud(PointCloud2),
    CameraCloud(PointCloud2),
    Grasps(GraspConfigList),
    Shutdown,
}

pub struct Executor<'a> {
    node: &'a ManipulationNode,
    pool: rayon::ThreadPool,
}

impl<'a> Executor<'a> {
    pub fn new(node: &'a ManipulationNode) -> Result<Self> {
        let threads = node.config().runtime.executor_threads;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("node-callback-{}", i))
            .build()
            .context("Failed to start the callback pool")?;
        Ok(Executor { node, pool })
    }

    /// Runs until `Shutdown` arrives or all senders are gone. Returns after the callbacks
    /// already started have finished.
    pub fn spin(&self, events: Receiver<NodeEvent>) {
        let runtime = &self.node.config().runtime;
        let period = runtime.loop_period();
        let mut sync: ApproximateTimeSync<PointCloud2, PointCloud2> =
            ApproximateTimeSync::new(runtime.sync_queue_depth, runtime.max_pair_interval);
        let node = self.node;

        self.pool.in_place_scope(|scope| {
            loop {
                let event = match events.recv_timeout(period) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Event channel closed");
                        break;
                    }
                };

                let pair = match event {
                    NodeEvent::LabeledCloud(cloud) => sync.push_first(cloud),
                    NodeEvent::CameraCloud(cloud) => sync.push_second(cloud),
                    NodeEvent::Grasps(grasps) => {
                        scope.spawn(move |_| match node.on_grasps(&grasps) {
                            Ok(GraspCycleOutcome::Completed { state, .. }) => {
                                debug!("Grasp cycle finished: {:?}", state)
                            }
                            Ok(GraspCycleOutcome::Skipped) => {}
                            Err(e) => error!("Grasp cycle failed: {:#}", e),
                        });
                        None
                    }
                    NodeEvent::Shutdown => break,
                };

                if let Some((labeled, camera)) = pair {
                    scope.spawn(move |_| {
                        if let Err(e) = node.on_cloud_pair(&labeled, &camera) {
                            error!("Cloud relay failed: {:#}", e);
                        }
                    });
                }
            }
            info!("Shutting down, waiting for callbacks in progress.");
        });
    }
}
