use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::models::Point2;
use crate::utils::{SimulationError, EPSILON};

/// A smoothed gas particle, or the aggregate of several particles stored in a tree node.
///
/// Aggregates are built with `+` (combine) and reduced with `-` (uncombine).
/// Combining is a mass-weighted average of the vectors; masses, energies and
/// interaction counts add; radii add in quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point2,
    pub velocity: Point2,
    /// Acceleration of the previous step, used by the predictor.
    pub acceleration: Point2,
    pub mass: f64,
    /// Smoothing radius.
    pub radius: f64,
    /// Specific internal energy.
    pub energy: f64,
    /// Largest stable time step estimated for this particle.
    pub cfl_time: f64,
    /// Number of neighbours found in the last step.
    pub interactions_count: i32,
    /// Toggled each step when flickering is enabled, for display only.
    pub visited: bool,
}

impl Default for Particle {
    /// The empty aggregate a fresh tree node starts from.
    fn default() -> Self {
        Self {
            position: Point2::zero(),
            velocity: Point2::zero(),
            acceleration: Point2::zero(),
            mass: 0.0,
            radius: 0.0,
            energy: 0.0,
            cfl_time: 1.0,
            interactions_count: 1,
            visited: false,
        }
    }
}

impl Particle {
    /// Creates a particle with zero acceleration and default step bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns an error if `mass` or `radius` is negative or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_gas_collapse::models::Point2;
    /// use rs_gas_collapse::particles::Particle;
    ///
    /// let particle = Particle::new(Point2::xy(1.0, 0.0), Point2::xy(0.0, 1.0), 200.0, 1.0, 0.0)
    ///     .expect("Failed to create particle");
    /// assert_eq!(particle.interactions_count, 1);
    /// assert_eq!(particle.cfl_time, 1.0);
    ///
    /// assert!(Particle::new(Point2::zero(), Point2::zero(), -1.0, 1.0, 0.0).is_err());
    /// ```
    pub fn new(
        position: Point2,
        velocity: Point2,
        mass: f64,
        radius: f64,
        energy: f64,
    ) -> Result<Self, SimulationError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(SimulationError::InvalidMass);
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(SimulationError::InvalidRadius);
        }
        Ok(Self {
            position,
            velocity,
            mass,
            radius,
            energy,
            ..Self::default()
        })
    }

    /// Merges `other` into a new aggregate.
    ///
    /// If both masses are zero the vectors are averaged with equal weight.
    pub fn combine(&self, other: &Particle) -> Particle {
        let total = self.mass + other.mass;
        let ratio = if total != 0.0 { self.mass / total } else { 0.5 };
        let blend = |a: Point2, b: Point2| a * ratio + b * (1.0 - ratio);
        Particle {
            position: blend(self.position, other.position),
            velocity: blend(self.velocity, other.velocity),
            acceleration: blend(self.acceleration, other.acceleration),
            mass: total,
            radius: (self.radius * self.radius + other.radius * other.radius).sqrt(),
            energy: self.energy + other.energy,
            cfl_time: self.cfl_time.min(other.cfl_time),
            interactions_count: self.interactions_count + other.interactions_count,
            visited: self.visited || other.visited,
        }
    }

    /// Removes `other` from this aggregate, undoing [`Particle::combine`].
    ///
    /// Removing the whole mass leaves the vectors untouched; the radius never
    /// goes below zero.
    pub fn uncombine(&self, other: &Particle) -> Particle {
        let remaining = self.mass - other.mass;
        let unblend = |a: Point2, b: Point2| {
            if remaining == 0.0 {
                a
            } else {
                (a - b) * (self.mass / remaining) + b
            }
        };
        Particle {
            position: unblend(self.position, other.position),
            velocity: unblend(self.velocity, other.velocity),
            acceleration: unblend(self.acceleration, other.acceleration),
            mass: remaining,
            radius: (self.radius * self.radius - other.radius * other.radius).max(0.0).sqrt(),
            energy: self.energy - other.energy,
            cfl_time: self.cfl_time.min(other.cfl_time),
            interactions_count: self.interactions_count - other.interactions_count,
            visited: self.visited,
        }
    }

    /// Two particles are approximately equal when position and velocity each
    /// differ by less than [`EPSILON`].
    pub fn approx_eq(&self, other: &Particle) -> bool {
        (self.position - other.position).norm() < EPSILON
            && (self.velocity - other.velocity).norm() < EPSILON
    }

    /// True when every vector component and the scalar state are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.radius.is_finite()
            && self.energy.is_finite()
    }
}

impl Add for Particle {
    type Output = Particle;

    fn add(self, rhs: Particle) -> Particle {
        self.combine(&rhs)
    }
}

impl Sub for Particle {
    type Output = Particle;

    fn sub(self, rhs: Particle) -> Particle {
        self.uncombine(&rhs)
    }
}

impl AddAssign for Particle {
    fn add_assign(&mut self, rhs: Particle) {
        *self = self.combine(&rhs);
    }
}

impl SubAssign for Particle {
    fn sub_assign(&mut self, rhs: Particle) {
        *self = self.uncombine(&rhs);
    }
}
