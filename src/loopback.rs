//! In-memory collaborators. They stand in for the middleware when replaying recorded
//! scenarios and in tests: the scene records what was applied, perception serves queued
//! messages, the publisher records what was published and the pickup client answers
//! with a scripted result.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::frame::Transform;
use crate::messages::{
    AttachedCollisionObject, CloudSamples, CollisionObject, GoalState, MarkerArray, PickupGoal,
    PointCloud2,
};
use crate::node_traits::{
    CloudSamplesPublisher, PerceptionSource, PickupActionClient, PlanningScene, TransformLookup,
};

/// Every call to the scene, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneCall {
    Attached(AttachedCollisionObject),
    Removed(Vec<String>),
    Applied(CollisionObject),
}

#[derive(Default)]
pub struct RecordingScene {
    objects: Mutex<Vec<CollisionObject>>,
    calls: Mutex<Vec<SceneCall>>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects currently in the scene.
    pub fn objects(&self) -> Vec<CollisionObject> {
        lock(&self.objects).clone()
    }

    pub fn object(&self, id: &str) -> Option<CollisionObject> {
        lock(&self.objects).iter().find(|o| o.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<SceneCall> {
        lock(&self.calls).clone()
    }
}

impl PlanningScene for RecordingScene {
    fn apply_attached_collision_object(&self, object: &AttachedCollisionObject) -> Result<()> {
        lock(&self.calls).push(SceneCall::Attached(object.clone()));
        Ok(())
    }

    fn known_object_names(&self) -> Result<Vec<String>> {
        Ok(lock(&self.objects).iter().map(|o| o.id.clone()).collect())
    }

    fn remove_collision_objects(&self, ids: &[String]) -> Result<()> {
        lock(&self.calls).push(SceneCall::Removed(ids.to_vec()));
        lock(&self.objects).retain(|o| !ids.contains(&o.id));
        Ok(())
    }

    fn apply_collision_object(&self, object: &CollisionObject) -> Result<()> {
        lock(&self.calls).push(SceneCall::Applied(object.clone()));
        let mut objects = lock(&self.objects);
        objects.retain(|o| o.id != object.id);
        objects.push(object.clone());
        Ok(())
    }
}

/// Messages queued per topic. A read takes the oldest message; an empty queue behaves
/// as a timeout (without waiting).
#[derive(Default)]
pub struct QueuedPerception {
    markers: Mutex<HashMap<String, VecDeque<MarkerArray>>>,
    clouds: Mutex<HashMap<String, VecDeque<PointCloud2>>>,
}

impl QueuedPerception {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_markers(&self, topic: &str, msg: MarkerArray) {
        lock(&self.markers).entry(topic.to_string()).or_default().push_back(msg);
    }

    pub fn push_cloud(&self, topic: &str, msg: PointCloud2) {
        lock(&self.clouds).entry(topic.to_string()).or_default().push_back(msg);
    }
}

impl PerceptionSource for QueuedPerception {
    fn wait_for_markers(&self, topic: &str, _timeout: Duration) -> Option<MarkerArray> {
        lock(&self.markers).get_mut(topic).and_then(|q| q.pop_front())
    }

    fn wait_for_cloud(&self, topic: &str, _timeout: Duration) -> Option<PointCloud2> {
        lock(&self.clouds).get_mut(topic).and_then(|q| q.pop_front())
    }
}

/// Fixed transforms keyed by (target frame, source frame).
#[derive(Default)]
pub struct StaticTransforms {
    transforms: Mutex<HashMap<(String, String), Transform>>,
}

impl StaticTransforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, target_frame: &str, source_frame: &str, transform: Transform) {
        lock(&self.transforms).insert((target_frame.to_string(), source_frame.to_string()), transform);
    }
}

impl TransformLookup for StaticTransforms {
    fn lookup_transform(&self, target_frame: &str, source_frame: &str) -> Result<Transform> {
        let transforms = lock(&self.transforms);
        if let Some(t) = transforms.get(&(target_frame.to_string(), source_frame.to_string())) {
            return Ok(*t);
        }
        if let Some(t) = transforms.get(&(source_frame.to_string(), target_frame.to_string())) {
            return Ok(t.inverse());
        }
        Err(anyhow!(
            "No transform from {} to {}",
            source_frame,
            target_frame
        ))
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<CloudSamples>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<CloudSamples> {
        lock(&self.published).clone()
    }
}

impl CloudSamplesPublisher for RecordingPublisher {
    fn publish(&self, msg: &CloudSamples) -> Result<()> {
        lock(&self.published).push(msg.clone());
        Ok(())
    }
}

/// Pickup server that accepts every goal and finishes it with the scripted state after
/// the scripted delay.
pub struct ScriptedPickupClient {
    result: GoalState,
    delay: Duration,
    goals: Mutex<Vec<PickupGoal>>,
}

impl ScriptedPickupClient {
    pub fn new(result: GoalState) -> Self {
        ScriptedPickupClient {
            result,
            delay: Duration::ZERO,
            goals: Mutex::new(Vec::new()),
        }
    }

    /// Time `wait_for_result` blocks, as if the arm was moving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn goals(&self) -> Vec<PickupGoal> {
        lock(&self.goals).clone()
    }
}

impl PickupActionClient for ScriptedPickupClient {
    fn wait_for_server(&self) -> Result<()> {
        Ok(())
    }

    fn send_goal(&self, goal: PickupGoal) -> Result<()> {
        lock(&self.goals).push(goal);
        Ok(())
    }

    fn wait_for_result(&self) -> Result<GoalState> {
        if lock(&self.goals).is_empty() {
            return Err(anyhow!("No goal has been sent"));
        }
        if !self.delay.is_zero() {
            sleep(self.delay);
        }
        Ok(self.result)
    }
}

/// Recording must survive a panicking test thread.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
