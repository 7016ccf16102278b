use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::channel;

use anyhow::{Context, Result};
use clap::Parser;

use rs_grasp_pickup::config::ManipulationConfig;
use rs_grasp_pickup::executor::{Executor, NodeEvent};
use rs_grasp_pickup::loopback::{
    QueuedPerception, RecordingPublisher, RecordingScene, ScriptedPickupClient, StaticTransforms,
};
use rs_grasp_pickup::node::{Collaborators, ManipulationNode};
use rs_grasp_pickup::scenario::Scenario;
use rs_grasp_pickup::utils::{dump_goal, dump_object, dump_samples};

/// Replays a recorded scenario through the pickup node, with in-memory stand-ins for the
/// planning scene, the grasp detector and the pickup server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Node configuration (YAML). Defaults are used if not given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to replay (YAML)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Do not pause after clearing the scene
    #[arg(long)]
    no_settle: bool,

    /// Debug level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut config = match &args.config {
        Some(path) => ManipulationConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ManipulationConfig::default(),
    };
    if args.no_settle {
        config.scene.settle_delay = std::time::Duration::ZERO;
    }

    let scenario = Scenario::from_yaml_file(&args.scenario, &config)?;

    let scene = Arc::new(RecordingScene::new());
    let perception = Arc::new(QueuedPerception::new());
    let transforms = Arc::new(StaticTransforms::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let pickup = Arc::new(ScriptedPickupClient::new(scenario.pickup_result));
    scenario.install(&config, &perception, &transforms);

    let node = ManipulationNode::new(
        config,
        Collaborators {
            scene: scene.clone(),
            perception: perception.clone(),
            transforms: transforms.clone(),
            publisher: publisher.clone(),
            pickup: pickup.clone(),
        },
    );
    node.initialise()?;

    let executor = Executor::new(&node)?;
    let (sender, receiver) = channel();
    for event in scenario.events() {
        sender.send(event)?;
    }
    sender.send(NodeEvent::Shutdown)?;
    executor.spin(receiver);

    println!("Published to the detector:");
    for msg in publisher.published() {
        dump_samples(&msg);
    }
    println!("Planning scene:");
    for object in scene.objects() {
        dump_object(&object);
    }
    println!("Pickup goals:");
    for goal in pickup.goals() {
        dump_goal(&goal);
    }
    Ok(())
}
