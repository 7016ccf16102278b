//! Helper functions

use crate::messages::{CloudSamples, CollisionObject, Grasp, PickupGoal, Pose};

pub fn dump_pose(pose: &Pose) {
    let p = &pose.position;
    let q = &pose.orientation;
    println!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        p.x, p.y, p.z, q.x, q.y, q.z, q.w
    );
}

/// Print the collision object with its box and pose.
pub fn dump_object(object: &CollisionObject) {
    let dims = object
        .box_dimensions()
        .map(|d| format!("box {:.3} x {:.3} x {:.3}", d[0], d[1], d[2]))
        .unwrap_or_else(|| "no shape".to_string());
    println!("[{}] in {}: {}", object.id, object.header.frame_id, dims);
    for pose in &object.primitive_poses {
        print!("  ");
        dump_pose(pose);
    }
}

pub fn dump_grasp(grasp: &Grasp) {
    print!("{} quality {:.3}: ", grasp.id, grasp.grasp_quality);
    dump_pose(&grasp.grasp_pose.pose);
}

pub fn dump_goal(goal: &PickupGoal) {
    println!(
        "pick '{}' with '{}', {} grasps, planning time {:.1} s, touch links [{}]",
        goal.target_name,
        goal.group_name,
        goal.possible_grasps.len(),
        goal.allowed_planning_time.as_secs_f64(),
        goal.attached_object_touch_links.join(", ")
    );
    for grasp in &goal.possible_grasps {
        print!("  ");
        dump_grasp(grasp);
    }
}

pub fn dump_samples(msg: &CloudSamples) {
    let view = msg.cloud_sources.view_points.first();
    println!(
        "{} cloud points, {} samples, view point {}",
        msg.cloud_sources.cloud.len(),
        msg.samples.len(),
        view.map(|v| format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z))
            .unwrap_or_else(|| "none".to_string())
    );
}
