//! Pairs messages of two streams by approximate timestamp.
//!
//! Each stream has a bounded queue (oldest dropped on overflow). When a message arrives
//! and the other queue holds messages, it is paired with the one of closest stamp,
//! provided the difference is within the optional maximal interval. The partner and
//! everything queued before it are consumed, as are older unmatched messages of the
//! arriving stream. Unpaired arrivals wait in their queue.

use std::collections::VecDeque;
use std::time::Duration;

use crate::messages::PointCloud2;

/// Anything carrying a timestamp.
pub trait Stamped {
    fn stamp(&self) -> Duration;
}

impl Stamped for PointCloud2 {
    fn stamp(&self) -> Duration {
        self.header.stamp
    }
}

pub struct ApproximateTimeSync<A: Stamped, B: Stamped> {
    first: VecDeque<A>,
    second: VecDeque<B>,
    depth: usize,
    max_interval: Option<Duration>,
}

impl<A: Stamped, B: Stamped> ApproximateTimeSync<A, B> {
    pub fn new(depth: usize, max_interval: Option<Duration>) -> Self {
        ApproximateTimeSync {
            first: VecDeque::with_capacity(depth),
            second: VecDeque::with_capacity(depth),
            depth: depth.max(1),
            max_interval,
        }
    }

    pub fn push_first(&mut self, msg: A) -> Option<(A, B)> {
        let stamp = msg.stamp();
        match take_closest(&mut self.second, stamp, self.max_interval) {
            Some(partner) => {
                drop_not_newer(&mut self.first, stamp);
                Some((msg, partner))
            }
            None => {
                enqueue(&mut self.first, msg, self.depth);
                None
            }
        }
    }

    pub fn push_second(&mut self, msg: B) -> Option<(A, B)> {
        let stamp = msg.stamp();
        match take_closest(&mut self.first, stamp, self.max_interval) {
            Some(partner) => {
                drop_not_newer(&mut self.second, stamp);
                Some((partner, msg))
            }
            None => {
                enqueue(&mut self.second, msg, self.depth);
                None
            }
        }
    }

    /// Messages waiting for a partner, per stream.
    pub fn pending(&self) -> (usize, usize) {
        (self.first.len(), self.second.len())
    }
}

fn enqueue<T>(queue: &mut VecDeque<T>, msg: T, depth: usize) {
    while queue.len() >= depth {
        queue.pop_front();
    }
    queue.push_back(msg);
}

fn take_closest<T: Stamped>(queue: &mut VecDeque<T>, stamp: Duration, max_interval: Option<Duration>) -> Option<T> {
    let (index, distance) = queue
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m.stamp().abs_diff(stamp)))
        .min_by_key(|(_, d)| *d)?;
    if let Some(max) = max_interval {
        if distance > max {
            return None;
        }
    }
    // Queue is in arrival order; what came before the partner is stale
    queue.drain(..index);
    queue.pop_front()
}

fn drop_not_newer<T: Stamped>(queue: &mut VecDeque<T>, stamp: Duration) {
    queue.retain(|m| m.stamp() > stamp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tick(u64);

    impl Stamped for Tick {
        fn stamp(&self) -> Duration {
            Duration::from_millis(self.0)
        }
    }

    #[test]
    fn test_pairs_closest() {
        let mut sync: ApproximateTimeSync<Tick, Tick> = ApproximateTimeSync::new(10, None);
        assert!(sync.push_second(Tick(100)).is_none());
        assert!(sync.push_second(Tick(130)).is_none());
        assert!(sync.push_second(Tick(200)).is_none());

        let pair = sync.push_first(Tick(135)).expect("pair expected");
        assert_eq!(pair, (Tick(135), Tick(130)));
        // 100 was older than the partner and is gone, 200 still waits
        assert_eq!(sync.pending(), (0, 1));
    }

    #[test]
    fn test_respects_max_interval() {
        let mut sync: ApproximateTimeSync<Tick, Tick> =
            ApproximateTimeSync::new(10, Some(Duration::from_millis(20)));
        assert!(sync.push_first(Tick(100)).is_none());
        assert!(sync.push_second(Tick(150)).is_none());
        assert_eq!(sync.pending(), (1, 1));
        assert_eq!(sync.push_first(Tick(160)), Some((Tick(160), Tick(150))));
        // The unmatched 100 is older than the pair and dropped
        assert_eq!(sync.pending(), (0, 0));
    }

    #[test]
    fn test_queue_depth() {
        let mut sync: ApproximateTimeSync<Tick, Tick> = ApproximateTimeSync::new(3, None);
        for t in 0..5 {
            assert!(sync.push_first(Tick(t * 10)).is_none());
        }
        assert_eq!(sync.pending(), (3, 0));
        // Oldest two were dropped, 20 is the earliest left
        assert_eq!(sync.push_second(Tick(0)), Some((Tick(20), Tick(0))));
    }
}
