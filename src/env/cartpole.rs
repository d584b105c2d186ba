use ndarray::{array, Array1};
use rand::{thread_rng, Rng};

use super::Environment;

// Episode terminates when the cart leaves the track or the pole tips past
// ~12 degrees.
const CART_LIMIT: f32 = 2.4;
const POLE_ANGLE_LIMIT: f32 = 0.209;

/// Classic cart-pole balancing task.
///
/// A pole is hinged to a cart running on a frictionless track; the agent
/// pushes the cart left or right and is rewarded for every step the pole
/// stays upright. Observation is `[x, x_dot, theta, theta_dot]`.
pub struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,

    gravity: f32,
    mass_cart: f32,
    mass_pole: f32,
    length: f32,
    force_mag: f32,
    dt: f32,
}

impl CartPole {
    pub fn new() -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5, // half-length of the pole
            force_mag: 10.0,
            dt: 0.02,
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn reset(&mut self) -> Array1<f32> {
        let mut rng = thread_rng();
        self.x = rng.gen_range(-0.05..0.05);
        self.x_dot = rng.gen_range(-0.05..0.05);
        self.theta = rng.gen_range(-0.05..0.05);
        self.theta_dot = rng.gen_range(-0.05..0.05);
        self.observation()
    }

    fn step(&mut self, action: usize) -> (Array1<f32>, f32, bool) {
        let force = if action == 0 {
            -self.force_mag
        } else {
            self.force_mag
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = self.mass_cart + self.mass_pole;
        let pole_mass_length = self.mass_pole * self.length;

        let temp =
            (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (self.gravity * sin_theta - cos_theta * temp)
            / (self.length * (4.0 / 3.0 - self.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Semi-implicit Euler integration.
        self.x += self.dt * self.x_dot;
        self.x_dot += self.dt * x_acc;
        self.theta += self.dt * self.theta_dot;
        self.theta_dot += self.dt * theta_acc;

        let done = self.x.abs() > CART_LIMIT || self.theta.abs() > POLE_ANGLE_LIMIT;

        // One point for every step the pole is still up, including the step
        // that fails; the trainer rewrites terminal rewards.
        let reward = 1.0;

        (self.observation(), reward, done)
    }

    fn observation_size(&self) -> usize {
        4
    }

    fn action_count(&self) -> usize {
        2
    }
}
