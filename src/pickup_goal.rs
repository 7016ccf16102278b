//! Assembly of the pickup action goal.

use crate::config::PickupConfig;
use crate::messages::{Grasp, PickupGoal, PlanningOptions};

/// Packages the candidate grasps with the planning policy. The server plans and executes
/// (never plan only), works on a diff of the current scene and robot state, and may
/// replan as configured.
pub fn create_pickup_goal(
    config: &PickupConfig,
    group: &str,
    target: &str,
    possible_grasps: Vec<Grasp>,
    links_to_allow_contact: &[String],
) -> PickupGoal {
    PickupGoal {
        target_name: target.to_string(),
        group_name: group.to_string(),
        possible_grasps,
        allowed_planning_time: config.allowed_planning_time,
        planning_options: PlanningOptions {
            planning_scene_is_diff: true,
            robot_state_is_diff: true,
            plan_only: config.plan_only,
            replan: config.replan,
            replan_attempts: config.replan_attempts,
        },
        attached_object_touch_links: links_to_allow_contact.to_vec(),
    }
}
