#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::ManipulationConfig;
    use crate::config_error::ConfigError;

    const READ_ERROR: &'static str = "Failed to load configuration from file";

    #[test]
    fn test_defaults() {
        let config = ManipulationConfig::default();
        assert_eq!(config.topics.pickup_action, "/pickup");
        assert_eq!(config.topics.cloud_samples, "/cloud_stitched");
        assert_eq!(config.topics.grasps, "/detect_grasps/clustered_grasps");
        assert_eq!(config.runtime.sync_queue_depth, 10);
        assert_eq!(config.runtime.loop_rate_hz, 30.0);
        assert_eq!(config.target.label_id, 7);
        assert_eq!(config.scene.wait_timeout, Duration::from_secs(2));
        assert_eq!(config.scene.target_box, [0.08, 0.08, 0.08]);
        assert_eq!(config.grasp.frame_correction_deg, -90.0);
        assert_eq!(config.grasp.backoff, 0.1);
        assert_eq!(config.pickup.allowed_planning_time, Duration::from_secs(35));
        assert_eq!(config.pickup.touch_links.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let filename = "src/tests/data/node_cup.yaml";
        let loaded = ManipulationConfig::from_yaml_file(filename).expect(READ_ERROR);

        let mut expected = ManipulationConfig::default();
        expected.topics.labeled_cloud = "/segmentation/labeled_cloud".to_string();
        expected.topics.pickup_action = "/arm/pickup".to_string();
        expected.runtime.sync_queue_depth = 5;
        expected.runtime.max_pair_interval = Some(Duration::from_millis(50));
        expected.target.label_id = 4;
        expected.target.label_text = "cup".to_string();
        expected.scene.wait_timeout = Duration::from_millis(1500);
        expected.scene.settle_delay = Duration::ZERO;
        expected.scene.target_box = [0.06, 0.06, 0.12];
        expected.gripper.close_time = Duration::from_secs(8);
        expected.grasp.frame_correction_deg = 90.0;
        expected.grasp.backoff = 0.12;
        expected.pickup.allowed_planning_time = Duration::from_secs(20);
        expected.pickup.replan_attempts = 3;
        expected.pickup.touch_links = vec![
            "gripper_left_finger_link".to_string(),
            "gripper_right_finger_link".to_string(),
        ];

        assert_eq!(expected, loaded);
    }

    #[test]
    fn test_empty_document_keeps_defaults() {
        let loaded = ManipulationConfig::from_yaml_str("").expect(READ_ERROR);
        assert_eq!(loaded, ManipulationConfig::default());
        let loaded = ManipulationConfig::from_yaml_str("scene:\n").expect(READ_ERROR);
        assert_eq!(loaded, ManipulationConfig::default());
    }

    #[test]
    fn test_wrong_type() {
        let result = ManipulationConfig::from_yaml_str("target:\n  label_id: cup\n");
        match result {
            Err(ConfigError::WrongType { key, expected }) => {
                assert_eq!(key, "target.label_id");
                assert_eq!(expected, "integer");
            }
            other => panic!("Expected type error, got {:?}", other),
        }

        let result = ManipulationConfig::from_yaml_str("scene: 5\n");
        assert!(matches!(result, Err(ConfigError::WrongType { .. })));

        let result = ManipulationConfig::from_yaml_str("scene:\n  target_box: [0.1, 0.1]\n");
        assert!(matches!(result, Err(ConfigError::WrongType { .. })));
    }

    #[test]
    fn test_invalid_values() {
        let result = ManipulationConfig::from_yaml_str("runtime:\n  sync_queue_depth: 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ManipulationConfig::from_yaml_str("scene:\n  wait_timeout: -1.0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        // Closing point would come before the delayed open point
        let result = ManipulationConfig::from_yaml_str("gripper:\n  close_time: 3.5\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ManipulationConfig::from_yaml_str("runtime:\n  executor_threads: -2\n");
        assert!(matches!(result, Err(ConfigError::WrongType { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ManipulationConfig::from_yaml_file("src/tests/data/does_not_exist.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ManipulationConfig::from_yaml_str("topics: [unclosed\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
