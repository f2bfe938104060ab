// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Fixed-rate frame scheduling.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::scene::{DrawableId, Scene};

/// Something the driver advances once per frame.
pub trait Animation {
    /// Every drawable the update hook writes to. Queried once when the
    /// animation is handed to a driver.
    fn drawables(&self) -> Vec<DrawableId>;

    /// Advances one frame. `delta` is the wall-clock time since the previous
    /// frame and is informational only. Must not fail: errors are handled
    /// inside and leave the previous drawable state in place.
    fn update(&mut self, scene: &mut dyn Scene, delta: Duration);
}

/// Single-threaded frame scheduler.
///
/// Each tick runs the update hook to completion and then composes every
/// registered drawable. Taking `&mut self` for a tick keeps ticks from
/// overlapping.
#[derive(Debug)]
pub struct AnimationDriver<A, S> {
    animation: A,
    scene: S,
    drawables: Vec<DrawableId>,
    interval: Duration,
    running: bool,
    last_tick: Option<Instant>,
    last_delta: Duration,
    frames: u64,
}

impl<A: Animation, S: Scene> AnimationDriver<A, S> {
    pub fn new(animation: A, scene: S, interval: Duration) -> Self {
        let drawables = animation.drawables();
        Self {
            animation,
            scene,
            drawables,
            interval: interval.max(Duration::from_millis(1)),
            running: false,
            last_tick: None,
            last_delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Adds a drawable to the redraw set.
    pub fn register(&mut self, id: DrawableId) {
        if !self.drawables.contains(&id) {
            self.drawables.push(id);
        }
    }

    pub fn drawables(&self) -> &[DrawableId] {
        &self.drawables
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!(interval = ?self.interval, "animation started");
            self.running = true;
            self.last_tick = None;
        }
    }

    /// Stops ticking. Calling it again has no effect; the scene keeps the
    /// last composed frame.
    pub fn stop(&mut self) {
        if self.running {
            debug!(frames = self.frames, "animation stopped");
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    /// When the next frame is due, `None` before the first frame.
    pub fn next_due(&self) -> Option<Instant> {
        self.last_tick.map(|last| last + self.interval)
    }

    /// Runs one frame if the driver is running and a frame is due at `now`.
    /// Returns whether a frame was produced.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        if let Some(due) = self.next_due() {
            if now < due {
                return false;
            }
        }
        let delta = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.animation.update(&mut self.scene, delta);
        self.scene.compose(&self.drawables);
        self.last_tick = Some(now);
        self.last_delta = delta;
        self.frames += 1;
        trace!(frame = self.frames, ?delta, "frame composed");
        true
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Blocks until `count` frames have been produced, sleeping between them
    /// to hold the interval. Starts the driver if needed and leaves it
    /// running.
    pub fn run_frames(&mut self, count: u64) -> u64 {
        self.start();
        let mut produced = 0;
        while produced < count {
            if let Some(due) = self.next_due() {
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
            }
            if self.tick() {
                produced += 1;
            }
        }
        produced
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Wall-clock time between the last two frames.
    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    /// Access for applying changes between ticks.
    pub fn animation_mut(&mut self) -> &mut A {
        &mut self.animation
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn into_parts(self) -> (A, S) {
        (self.animation, self.scene)
    }
}
