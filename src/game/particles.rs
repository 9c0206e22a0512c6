use rand::Rng;

use super::state::Position;

/// Largest velocity component, in cells per frame
const MAX_PARTICLE_SPEED: f32 = 0.2;

/// Tint of a particle burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleColor {
    /// Death burst
    Red,
    /// Food eaten
    Green,
    /// Power-up collected
    Blue,
}

/// A short-lived decorative particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    /// Position in (fractional) grid cells
    pub x: f32,
    pub y: f32,
    /// Velocity in cells per frame
    pub vx: f32,
    pub vy: f32,
    pub color: ParticleColor,
    /// Remaining life in [0, 1]
    pub life: f32,
}

impl Particle {
    fn update(&mut self, decay: f32) {
        self.x += self.vx;
        self.y += self.vy;
        self.life = (self.life - decay).max(0.0);
    }

    /// Grid cell the particle currently sits in
    pub fn cell(&self) -> Position {
        Position::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// All live particles
///
/// Particles never interact with each other or with the simulation; they are
/// spawned by game events and decay on every animation frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    next_id: u64,
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 0,
            max_particles,
        }
    }

    /// Emit `count` particles from the centre of `origin` with random outward velocity
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        origin: Position,
        color: ParticleColor,
        count: usize,
    ) {
        for _ in 0..count {
            let id = self.next_id;
            self.next_id += 1;
            self.particles.push(Particle {
                id,
                x: origin.x as f32,
                y: origin.y as f32,
                vx: rng.gen_range(-MAX_PARTICLE_SPEED..MAX_PARTICLE_SPEED),
                vy: rng.gen_range(-MAX_PARTICLE_SPEED..MAX_PARTICLE_SPEED),
                color,
                life: 1.0,
            });
        }

        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Advance one animation frame, dropping particles whose life ran out
    pub fn update(&mut self, decay: f32) {
        for particle in &mut self.particles {
            particle.update(decay);
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
