use std::time::Duration;

/// Largest integration step. Long frames are split into steps of this size.
const MAX_STEP_SECS: f64 = 0.004;
/// Frames longer than this (e.g. a backgrounded tab) are treated as this long.
const MAX_FRAME_SECS: f64 = 0.1;

/// Damped spring that follows a moving target, used to smooth the page
/// scroll progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_delta: f64,
    rest_speed: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Spring {
    pub fn new(initial: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target: initial,
            stiffness: 100.0,
            damping: 10.0,
            rest_delta: 0.01,
            rest_speed: 0.01,
        }
    }

    /// Soft follower for the scroll progress bar.
    pub fn scroll_progress() -> Self {
        Self::new(0.0)
            .with_stiffness(50.0)
            .with_damping(20.0)
            .with_rest_delta(0.01)
    }

    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(0.1);
        self
    }

    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    pub fn with_rest_delta(mut self, delta: f64) -> Self {
        self.rest_delta = delta.abs();
        self
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn is_at_rest(&self) -> bool {
        (self.target - self.position).abs() <= self.rest_delta
            && self.velocity.abs() <= self.rest_speed
    }

    /// Advances the simulation. Returns the new position.
    pub fn step(&mut self, dt: Duration) -> f64 {
        if self.is_at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            return self.position;
        }
        let mut remaining = dt.as_secs_f64().min(MAX_FRAME_SECS);
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            // semi-implicit Euler
            let force =
                -self.stiffness * (self.position - self.target) - self.damping * self.velocity;
            self.velocity += force * h;
            self.position += self.velocity * h;
            remaining -= h;
        }
        if self.is_at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
        }
        self.position
    }
}
