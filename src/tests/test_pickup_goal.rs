#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nalgebra::UnitQuaternion;

    use crate::grasp_conversion::GraspConverter;
    use crate::pickup_goal::create_pickup_goal;
    use crate::tests::test_utils::{candidate, test_config};

    #[test]
    fn test_default_policy() {
        let config = test_config();
        let grasps = GraspConverter::new(&config).convert_all(&[
            candidate([0.5, 0.0, 0.8], &UnitQuaternion::identity(), 0.7),
            candidate([0.5, 0.1, 0.8], &UnitQuaternion::identity(), 0.6),
        ]);
        let goal = create_pickup_goal(
            &config.pickup,
            "arm_torso",
            "target",
            grasps.clone(),
            &config.pickup.touch_links,
        );

        assert_eq!(goal.target_name, "target");
        assert_eq!(goal.group_name, "arm_torso");
        assert_eq!(goal.possible_grasps, grasps);
        assert_eq!(goal.allowed_planning_time, Duration::from_secs(35));
        assert!(goal.planning_options.planning_scene_is_diff);
        assert!(goal.planning_options.robot_state_is_diff);
        assert!(!goal.planning_options.plan_only);
        assert!(goal.planning_options.replan);
        assert_eq!(goal.planning_options.replan_attempts, 1);
        assert_eq!(
            goal.attached_object_touch_links,
            vec!["gripper_left_finger_link", "gripper_right_finger_link", "gripper_link"]
        );
    }

    #[test]
    fn test_configured_policy_and_no_grasps() {
        let mut config = test_config();
        config.pickup.allowed_planning_time = Duration::from_secs(10);
        config.pickup.replan = false;
        config.pickup.replan_attempts = 0;
        let links = vec!["gripper_link".to_string()];
        let goal = create_pickup_goal(&config.pickup, "arm", "cup", Vec::new(), &links);

        assert!(goal.possible_grasps.is_empty());
        assert_eq!(goal.target_name, "cup");
        assert_eq!(goal.group_name, "arm");
        assert_eq!(goal.allowed_planning_time, Duration::from_secs(10));
        assert!(!goal.planning_options.replan);
        assert_eq!(goal.planning_options.replan_attempts, 0);
        // Diffs are not configurable
        assert!(goal.planning_options.planning_scene_is_diff);
        assert_eq!(goal.attached_object_touch_links, links);
    }
}
