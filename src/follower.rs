//! Moves a point along a [Path] at constant speed, pausing at every waypoint.
//!
//! The follower is driven by the caller's loop: each [tick](PathFollower::tick) performs one
//! incremental update and returns, so a traversal can be suspended between ticks and resumed
//! without losing its place. Handing it a new path abandons the previous traversal.

use std::collections::VecDeque;

use glam::Vec3;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FollowerError;
use crate::path::Path;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FollowerSettings {
    /// World units per second.
    pub speed: f32,
    /// Seconds to wait after reaching each waypoint.
    pub pause: f32,
}

impl Default for FollowerSettings {
    fn default() -> FollowerSettings {
        FollowerSettings {
            speed: 1.0,
            pause: 0.2,
        }
    }
}

impl FollowerSettings {
    pub fn validate(&self) -> Result<(), FollowerError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(FollowerError::InvalidSpeed(self.speed));
        }
        if !(self.pause.is_finite() && self.pause >= 0.0) {
            return Err(FollowerError::InvalidPause(self.pause));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Moving,
    Paused { remaining: f32 },
}

/// What a single [tick](PathFollower::tick) did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowStep {
    /// No traversal in progress.
    Idle,
    /// Moved towards the current waypoint without reaching it.
    Moving,
    /// Landed exactly on a waypoint and started pausing.
    Reached(Vec3),
    /// Waiting at the last reached waypoint.
    Paused,
    /// The pause after the final waypoint ended.
    Finished,
}

#[derive(Clone, Debug)]
pub struct PathFollower {
    settings: FollowerSettings,
    position: Vec3,
    route: VecDeque<Vec3>,
    phase: Phase,
}

impl PathFollower {
    pub fn new(position: Vec3, settings: FollowerSettings) -> Result<PathFollower, FollowerError> {
        settings.validate()?;
        Ok(PathFollower {
            settings,
            position,
            route: VecDeque::new(),
            phase: Phase::Idle,
        })
    }

    pub fn settings(&self) -> &FollowerSettings {
        &self.settings
    }
    pub fn position(&self) -> Vec3 {
        self.position
    }
    /// Waypoints not reached yet, the current target first.
    pub fn remaining(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.route.iter().copied()
    }
    pub fn is_following(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Starts a traversal of `path` from the current position, abandoning any traversal in
    /// progress.
    pub fn follow(&mut self, path: &Path) {
        if self.is_following() {
            debug!(
                "Abandoning traversal with {} waypoints left at {}",
                self.route.len(),
                self.position
            );
        }
        self.route = path.world_positions().collect();
        self.phase = if self.route.is_empty() {
            Phase::Idle
        } else {
            Phase::Moving
        };
    }

    /// Stops where the follower currently is.
    pub fn cancel(&mut self) {
        self.route.clear();
        self.phase = Phase::Idle;
    }

    /// Advances the traversal by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> FollowStep {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.phase {
            Phase::Idle => FollowStep::Idle,
            Phase::Moving => {
                let Some(&target) = self.route.front() else {
                    self.phase = Phase::Idle;
                    return FollowStep::Idle;
                };
                let to_target = target - self.position;
                let distance = to_target.length();
                let step = self.settings.speed * dt;
                if step >= distance {
                    // Land exactly on the waypoint instead of overshooting.
                    self.position = target;
                    self.route.pop_front();
                    self.phase = Phase::Paused {
                        remaining: self.settings.pause,
                    };
                    debug!("Reached waypoint {target}, pausing for {}s", self.settings.pause);
                    FollowStep::Reached(target)
                } else {
                    self.position += to_target / distance * step;
                    FollowStep::Moving
                }
            }
            Phase::Paused { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Paused { remaining };
                    FollowStep::Paused
                } else if self.route.is_empty() {
                    self.phase = Phase::Idle;
                    FollowStep::Finished
                } else {
                    self.phase = Phase::Moving;
                    FollowStep::Paused
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use grid_util::point::Point;

    use super::*;
    use crate::path::Waypoint;

    fn path_through(points: &[Vec3]) -> Path {
        let steps = points
            .iter()
            .enumerate()
            .map(|(i, &world_position)| Waypoint {
                index: Point::new(i as i32, 0),
                world_position,
            })
            .collect();
        Path::new(steps, 0, 0)
    }

    fn follower(speed: f32, pause: f32) -> PathFollower {
        PathFollower::new(Vec3::ZERO, FollowerSettings { speed, pause }).unwrap()
    }

    #[test]
    fn rejects_invalid_settings() {
        let bad_speed = FollowerSettings {
            speed: 0.0,
            pause: 0.1,
        };
        assert_eq!(
            PathFollower::new(Vec3::ZERO, bad_speed).err(),
            Some(FollowerError::InvalidSpeed(0.0))
        );
        let bad_pause = FollowerSettings {
            speed: 1.0,
            pause: -1.0,
        };
        assert_eq!(
            PathFollower::new(Vec3::ZERO, bad_pause).err(),
            Some(FollowerError::InvalidPause(-1.0))
        );
    }

    #[test]
    fn moves_at_fixed_speed_and_lands_exactly() {
        let mut f = follower(2.0, 0.5);
        f.follow(&path_through(&[Vec3::new(1.0, 0.0, 0.0)]));
        assert_eq!(f.tick(0.25), FollowStep::Moving);
        assert_eq!(f.position(), Vec3::new(0.5, 0.0, 0.0));
        // A long tick would overshoot; the follower stops on the waypoint instead.
        assert_eq!(f.tick(10.0), FollowStep::Reached(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(f.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn pauses_between_waypoints() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 1.0);
        let mut f = follower(1.0, 0.5);
        f.follow(&path_through(&[a, b]));
        assert_eq!(f.tick(1.0), FollowStep::Reached(a));
        assert_eq!(f.tick(0.25), FollowStep::Paused);
        assert_eq!(f.position(), a);
        // Pause elapses; movement resumes on the next tick.
        assert_eq!(f.tick(0.25), FollowStep::Paused);
        assert_eq!(f.position(), a);
        assert_eq!(f.tick(0.5), FollowStep::Moving);
        assert_eq!(f.position(), Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(f.tick(0.5), FollowStep::Reached(b));
        assert_eq!(f.tick(0.5), FollowStep::Finished);
        assert!(!f.is_following());
        assert_eq!(f.tick(1.0), FollowStep::Idle);
        assert_eq!(f.position(), b);
    }

    #[test]
    fn new_path_abandons_previous_traversal() {
        let mut f = follower(1.0, 0.0);
        f.follow(&path_through(&[Vec3::new(4.0, 0.0, 0.0), Vec3::new(8.0, 0.0, 0.0)]));
        f.tick(1.0);
        assert_eq!(f.position(), Vec3::new(1.0, 0.0, 0.0));
        let other = Vec3::new(1.0, 0.0, 2.0);
        f.follow(&path_through(&[other]));
        assert_eq!(f.remaining().collect::<Vec<_>>(), vec![other]);
        // Resumes from where the mover stood, heading to the new waypoint.
        f.tick(1.0);
        assert_eq!(f.position(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(f.tick(1.0), FollowStep::Reached(other));
        assert_eq!(f.tick(0.0), FollowStep::Finished);
    }

    #[test]
    fn empty_path_and_cancel_leave_follower_idle() {
        let mut f = follower(1.0, 0.2);
        f.follow(&Path::default());
        assert!(!f.is_following());
        f.follow(&path_through(&[Vec3::new(2.0, 0.0, 0.0)]));
        f.tick(1.0);
        f.cancel();
        assert_eq!(f.tick(1.0), FollowStep::Idle);
        assert_eq!(f.position(), Vec3::new(1.0, 0.0, 0.0));
    }
}
