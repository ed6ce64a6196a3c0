use rand::Rng;

use crate::models::Point2;
use crate::particles::Particle;
use crate::utils::DEFAULT_DOMAIN_SIZE;

/// Parameters of a rotating, roughly uniform gas disk.
///
/// Candidates are drawn uniformly from the square `[-R, R]²` with
/// `R = domain_size / size_fraction`; candidates outside the disk of radius `R`
/// are discarded, so a cloud holds at most `amount` particles. Each kept
/// particle is scaled by `position_scale` and given the velocity `(-y, x)` of
/// its unscaled position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskCloud {
    pub amount: usize,
    pub domain_size: f64,
    pub size_fraction: f64,
    pub position_scale: f64,
    pub base_mass: f64,
    pub mass_jitter: f64,
    pub radius: f64,
}

impl Default for DiskCloud {
    fn default() -> Self {
        Self {
            amount: 1000,
            domain_size: DEFAULT_DOMAIN_SIZE,
            size_fraction: 2.5,
            position_scale: 0.75,
            base_mass: 200.0,
            mass_jitter: 5.0,
            radius: 1.0,
        }
    }
}

impl DiskCloud {
    pub fn with_amount(mut self, amount: usize) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_domain_size(mut self, domain_size: f64) -> Self {
        self.domain_size = domain_size;
        self
    }

    /// Radius of the disk candidates are kept in.
    pub fn disk_radius(&self) -> f64 {
        self.domain_size / self.size_fraction
    }

    /// Samples a cloud from the given random source.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    /// use rs_gas_collapse::particles::DiskCloud;
    ///
    /// let cloud = DiskCloud::default().with_amount(200);
    /// let particles = cloud.sample(&mut StdRng::seed_from_u64(7));
    ///
    /// assert!(!particles.is_empty());
    /// assert!(particles.len() <= 200);
    /// assert!(particles.iter().all(|p| p.mass > 0.0));
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Particle> {
        let disk_radius = self.disk_radius();
        let mut particles = Vec::with_capacity(self.amount);
        if !disk_radius.is_finite() || disk_radius <= 0.0 {
            return particles;
        }

        for _ in 0..self.amount {
            let x = rng.random_range(-disk_radius..disk_radius);
            let y = rng.random_range(-disk_radius..disk_radius);
            let candidate = Point2::xy(x, y);
            if candidate.norm() > disk_radius {
                continue;
            }
            let jitter = if self.mass_jitter > 0.0 {
                rng.random_range(-self.mass_jitter..self.mass_jitter)
            } else {
                0.0
            };
            particles.push(Particle {
                position: candidate * self.position_scale,
                velocity: Point2::xy(-y, x),
                mass: self.base_mass + jitter,
                radius: self.radius,
                ..Particle::default()
            });
        }
        particles
    }

    /// Samples a cloud from the thread-local generator.
    pub fn sample_random(&self) -> Vec<Particle> {
        self.sample(&mut rand::rng())
    }
}

/// Creates the default rotating disk with `amount` candidates inside a square of side `domain_size`.
pub fn create_disk_cloud(amount: usize, domain_size: f64) -> Vec<Particle> {
    DiskCloud::default()
        .with_amount(amount)
        .with_domain_size(domain_size)
        .sample_random()
}
