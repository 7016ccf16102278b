mod test_utils;

mod test_frame;
mod test_point_cloud;
mod test_config;
mod test_pickup_goal;
