//=========================================================================
// Projectile Throw
//=========================================================================
//
// Single-body kinematics for a throwable projectile.
//
// One slot cycles through:
//   Ready (dormant at origin) → InFlight → Spent → (cooldown) → Ready
//
// While in flight: explicit Euler with constant gravity, no drag.
// Opacity fades linearly between the near and far distance thresholds
// and never increases during one flight. The projectile is spent once it
// reaches the far threshold or its opacity hits zero. A spent projectile
// stays observable (inactive, transparent) until the next step re-arms
// the slot, so at most one dormant projectile ever exists.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;
use log::debug;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::{sanitize_delta, saturate, Simulation, SimulationContext};

//=== Projectile ==========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated Euler rotation in radians.
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    /// Always in `[0, 1]`.
    pub opacity: f32,
    pub active: bool,
}

impl Projectile {
    /// Dormant projectile at the origin.
    pub fn dormant() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            opacity: 1.0,
            active: false,
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.length()
    }
}

impl Default for Projectile {
    fn default() -> Self {
        Self::dormant()
    }
}

//=== ProjectileParams ====================================================

/// Scene-tunable throw constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileParams {
    /// Launch speed in units per second.
    pub speed: f32,
    /// Added to the forward direction's y before normalizing.
    pub upward_bias: f32,
    /// Downward acceleration in units per second squared.
    pub gravity: f32,
    /// Distance where fading starts.
    pub fade_near: f32,
    /// Distance where opacity reaches zero and the projectile is spent.
    pub fade_far: f32,
    /// Random spin range on x and z, symmetric around zero.
    pub spin_jitter: f32,
    /// Fixed spin on y.
    pub spin_y: f32,
    /// Delay between a projectile being spent and the next one appearing.
    pub cooldown: f32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: 12.0,
            upward_bias: 0.2,
            gravity: 3.0,
            fade_near: 15.0,
            fade_far: 25.0,
            spin_jitter: 2.0,
            spin_y: 8.0,
            cooldown: 0.0,
        }
    }
}

//=== ProjectilePhase =====================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectilePhase {
    /// Dormant at the origin, accepting a launch.
    Ready,
    InFlight,
    /// Spent; a fresh projectile appears once `cooldown` runs out.
    Spent { cooldown: f32 },
}

/// State change produced by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileEvent {
    /// The projectile in flight reached the far threshold or faded out.
    Spent,
    /// A fresh dormant projectile is ready at the origin.
    Rearmed,
}

//=== ProjectileLauncher ==================================================

#[derive(Debug, Clone)]
pub struct ProjectileLauncher {
    params: ProjectileParams,
    projectile: Projectile,
    phase: ProjectilePhase,
    launches: u32,
}

impl ProjectileLauncher {
    /// # Panics
    ///
    /// Panics unless `0 <= fade_near < fade_far`, or if the cooldown is
    /// negative.
    pub fn new(params: ProjectileParams) -> Self {
        assert!(
            params.fade_near >= 0.0 && params.fade_near < params.fade_far,
            "Fade thresholds must satisfy 0 <= near < far"
        );
        assert!(params.cooldown >= 0.0, "Cooldown must not be negative");

        Self {
            params,
            projectile: Projectile::dormant(),
            phase: ProjectilePhase::Ready,
            launches: 0,
        }
    }

    pub fn params(&self) -> &ProjectileParams {
        &self.params
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn phase(&self) -> ProjectilePhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ProjectilePhase::Ready
    }

    pub fn launches(&self) -> u32 {
        self.launches
    }

    /// Throws the ready projectile along `forward` with the upward bias.
    ///
    /// Returns `false` without changing anything if no projectile is
    /// ready.
    pub fn launch(&mut self, forward: Vec3, context: &mut SimulationContext) -> bool {
        if !self.is_ready() {
            return false;
        }

        let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
        let direction = (forward + Vec3::Y * self.params.upward_bias)
            .try_normalize()
            .unwrap_or(forward);

        let jitter = self.params.spin_jitter;
        let rng = context.rng();
        let spin = Vec3::new(
            random_symmetric(rng, jitter),
            self.params.spin_y,
            random_symmetric(rng, jitter),
        );

        self.projectile.velocity = direction * self.params.speed;
        self.projectile.angular_velocity = spin;
        self.projectile.active = true;
        self.phase = ProjectilePhase::InFlight;
        self.launches += 1;

        debug!(target: "simulation", "Projectile launched with velocity {:?}", self.projectile.velocity);
        true
    }

    /// Opacity for a projectile at `distance`, ignoring history.
    pub fn fade_at(&self, distance: f32) -> f32 {
        let ProjectileParams {
            fade_near,
            fade_far,
            ..
        } = self.params;

        if distance <= fade_near {
            1.0
        } else {
            saturate(1.0 - (distance - fade_near) / (fade_far - fade_near))
        }
    }

    fn integrate(&mut self, delta: f32) -> Option<ProjectileEvent> {
        let projectile = &mut self.projectile;
        projectile.position += projectile.velocity * delta;
        projectile.rotation += projectile.angular_velocity * delta;
        projectile.velocity.y -= self.params.gravity * delta;

        let distance = projectile.position.length();
        let faded = self.fade_at(distance);
        let projectile = &mut self.projectile;
        projectile.opacity = saturate(projectile.opacity.min(faded));

        if distance >= self.params.fade_far || projectile.opacity <= 0.0 {
            projectile.opacity = 0.0;
            projectile.active = false;
            self.phase = ProjectilePhase::Spent {
                cooldown: self.params.cooldown,
            };
            debug!(target: "simulation", "Projectile spent at distance {:.2}", distance);
            return Some(ProjectileEvent::Spent);
        }
        None
    }
}

impl Simulation for ProjectileLauncher {
    type Report = Option<ProjectileEvent>;

    fn step(&mut self, _context: &mut SimulationContext, delta: f32) -> Option<ProjectileEvent> {
        let delta = sanitize_delta(delta);

        match self.phase {
            ProjectilePhase::Ready => None,
            ProjectilePhase::InFlight => self.integrate(delta),
            ProjectilePhase::Spent { cooldown } if cooldown > delta => {
                self.phase = ProjectilePhase::Spent {
                    cooldown: cooldown - delta,
                };
                None
            }
            ProjectilePhase::Spent { .. } => {
                self.projectile = Projectile::dormant();
                self.phase = ProjectilePhase::Ready;
                Some(ProjectileEvent::Rearmed)
            }
        }
    }
}

fn random_symmetric<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    if range > 0.0 {
        rng.gen_range(-range..range)
    } else {
        0.0
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn launcher(params: ProjectileParams) -> (ProjectileLauncher, SimulationContext) {
        (ProjectileLauncher::new(params), SimulationContext::new(99))
    }

    fn step(launcher: &mut ProjectileLauncher, context: &mut SimulationContext) -> Option<ProjectileEvent> {
        let delta = context.advance(DT);
        launcher.step(context, delta)
    }

    #[test]
    fn launch_sets_speed_and_spin() {
        let (mut launcher, mut context) = launcher(ProjectileParams::default());
        assert!(launcher.launch(Vec3::NEG_Z, &mut context));

        let projectile = launcher.projectile();
        assert!(projectile.active);
        assert_relative_eq!(projectile.velocity.length(), 12.0, epsilon = 1e-4);
        assert!(projectile.velocity.y > 0.0);
        assert!(projectile.velocity.z < 0.0);
        assert_eq!(projectile.angular_velocity.y, 8.0);
        assert!(projectile.angular_velocity.x.abs() <= 2.0);
        assert!(projectile.angular_velocity.z.abs() <= 2.0);
    }

    #[test]
    fn launch_only_from_ready() {
        let (mut launcher, mut context) = launcher(ProjectileParams::default());
        assert!(launcher.launch(Vec3::NEG_Z, &mut context));
        assert!(!launcher.launch(Vec3::X, &mut context));
        assert_eq!(launcher.launches(), 1);
    }

    #[test]
    fn degenerate_forward_falls_back() {
        let (mut launcher, mut context) = launcher(ProjectileParams {
            upward_bias: 0.0,
            ..Default::default()
        });
        launcher.launch(Vec3::ZERO, &mut context);
        assert_relative_eq!(launcher.projectile().velocity.z, -12.0, epsilon = 1e-4);
    }

    #[test]
    fn gravity_bends_trajectory() {
        let (mut launcher, mut context) = launcher(ProjectileParams::default());
        launcher.launch(Vec3::NEG_Z, &mut context);
        let vy0 = launcher.projectile().velocity.y;

        step(&mut launcher, &mut context);
        assert_relative_eq!(launcher.projectile().velocity.y, vy0 - 3.0 * DT, epsilon = 1e-5);
        assert_eq!(launcher.projectile().opacity, 1.0);
    }

    #[test]
    fn opacity_never_increases_past_near() {
        for forward in [Vec3::NEG_Z, Vec3::new(0.3, -0.4, -1.0), Vec3::new(-1.0, 0.0, -0.2), Vec3::new(0.0, -1.0, -0.05)] {
            let (mut launcher, mut context) = launcher(ProjectileParams::default());
            launcher.launch(forward, &mut context);

            let mut previous = 1.0;
            while launcher.projectile().active {
                step(&mut launcher, &mut context);
                let projectile = launcher.projectile();
                if projectile.distance() > 15.0 {
                    assert!(projectile.opacity <= previous, "opacity rose for {forward:?}");
                }
                assert!((0.0..=1.0).contains(&projectile.opacity));
                previous = projectile.opacity;
            }
        }
    }

    #[test]
    fn spent_at_far_threshold_with_zero_opacity() {
        let (mut launcher, mut context) = launcher(ProjectileParams::default());
        launcher.launch(Vec3::NEG_Z, &mut context);

        let mut ticks = 0;
        let event = loop {
            ticks += 1;
            assert!(ticks < 10_000, "projectile never spent");
            if let Some(event) = step(&mut launcher, &mut context) {
                break event;
            }
        };

        assert_eq!(event, ProjectileEvent::Spent);
        let projectile = launcher.projectile();
        assert!(projectile.distance() >= 25.0);
        assert!(!projectile.active);
        assert_eq!(projectile.opacity, 0.0);
    }

    #[test]
    fn rearms_after_cooldown() {
        let (mut launcher, mut context) = launcher(ProjectileParams {
            cooldown: 0.04,
            ..Default::default()
        });
        launcher.launch(Vec3::NEG_Z, &mut context);
        while step(&mut launcher, &mut context) != Some(ProjectileEvent::Spent) {}

        assert!(!launcher.launch(Vec3::NEG_Z, &mut context));
        assert_eq!(step(&mut launcher, &mut context), None);
        assert_eq!(step(&mut launcher, &mut context), None);
        assert_eq!(step(&mut launcher, &mut context), Some(ProjectileEvent::Rearmed));

        assert!(launcher.is_ready());
        assert_eq!(launcher.projectile(), &Projectile::dormant());
        assert!(launcher.launch(Vec3::NEG_Z, &mut context));
    }

    #[test]
    fn zero_cooldown_rearms_on_next_step() {
        let (mut launcher, mut context) = launcher(ProjectileParams::default());
        launcher.launch(Vec3::NEG_Z, &mut context);
        while step(&mut launcher, &mut context) != Some(ProjectileEvent::Spent) {}
        assert_eq!(step(&mut launcher, &mut context), Some(ProjectileEvent::Rearmed));
    }

    #[test]
    fn fade_is_linear_between_thresholds() {
        let launcher = ProjectileLauncher::new(ProjectileParams::default());
        assert_eq!(launcher.fade_at(10.0), 1.0);
        assert_relative_eq!(launcher.fade_at(20.0), 0.5);
        assert_eq!(launcher.fade_at(25.0), 0.0);
        assert_eq!(launcher.fade_at(40.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "Fade thresholds")]
    fn inverted_thresholds_panic() {
        ProjectileLauncher::new(ProjectileParams {
            fade_near: 30.0,
            ..Default::default()
        });
    }
}
