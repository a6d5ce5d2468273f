//! Turn gating and launch orchestration.
//!
//! [`LaunchSession`] is the single owner of turn state.  Its methods are pure
//! transitions: they take a gesture or a tick and return the
//! [`LaunchRequest`]s the world must carry out.  [`launch_input_system`]
//! applies those requests with `Commands`; [`turn_tick_system`] feeds it the
//! current projectile's speed every step.
//!
//! ```text
//!  Idle ──fire / drop──▶ InFlight ──speed < settle──▶ Settling
//!   ▲                       ▲                            │
//!   │                       └────── speed ≥ settle ──────┤
//!   └──── settle timer ≥ duration, or projectile gone ───┘
//! ```

use crate::aim::{launch_impulse, AimDrag};
use crate::catapult::{CatapultFlow, CatapultStage};
use crate::config::{steps_cover, GameConfig};
use crate::input::PlayerInput;
use crate::progress::Progress;
use crate::projectile::{
    release_staged, spawn_projectile, spawn_staged_projectile, Projectile, ProjectileVariant,
};
use crate::ramp::{despawn_ramps, spawn_ramp, Ramp, RampGeometry};
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Slingshot,
    Catapult,
}

impl LaunchMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Slingshot => Self::Catapult,
            Self::Catapult => Self::Slingshot,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Slingshot => "Slingshot",
            Self::Catapult => "Catapult",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    InFlight,
    Settling,
}

/// World effect produced by a session transition.
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchRequest {
    /// Spawn a live projectile and kick it.
    Fire {
        variant: ProjectileVariant,
        origin: Vec2,
        impulse: Vec2,
    },
    /// Spawn a frozen projectile on the catapult.
    Stage { variant: ProjectileVariant, at: Vec2 },
    /// Make the staged projectile dynamic at `at`.
    Drop { projectile: Entity, at: Vec2 },
    /// Replace any ramp body with this geometry.
    BuildRamp(RampGeometry),
    /// Remove the ramp body, if any.
    ClearRamp,
    /// Remove a projectile that never went live.
    Discard(Entity),
}

/// Emitted when a turn ends and a new projectile may be launched.
#[derive(Message, Debug, Clone, Copy)]
pub struct TurnReady;

#[derive(Resource, Debug, Clone, Default)]
pub struct LaunchSession {
    mode: LaunchMode,
    phase: TurnPhase,
    current: Option<Entity>,
    settle_steps: u32,
    settle_timer: f32,
    variant: ProjectileVariant,
    aim: Option<AimDrag>,
    catapult: CatapultFlow,
    frozen: bool,
}

impl LaunchSession {
    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The projectile the turn is waiting on.  Split copies never become current.
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn settle_timer(&self) -> f32 {
        self.settle_timer
    }

    pub fn variant(&self) -> ProjectileVariant {
        self.variant
    }

    pub fn aim(&self) -> Option<AimDrag> {
        self.aim
    }

    pub fn catapult(&self) -> &CatapultFlow {
        &self.catapult
    }

    pub fn catapult_stage(&self) -> CatapultStage {
        self.catapult.stage()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn can_launch(&self) -> bool {
        self.phase == TurnPhase::Idle && !self.frozen
    }

    /// Applies to the next projectile created; a staged one keeps its variant.
    pub fn select_variant(&mut self, variant: ProjectileVariant) {
        self.variant = variant;
    }

    pub fn pointer_down(&mut self, at: Vec2, config: &GameConfig) -> Vec<LaunchRequest> {
        if !self.can_launch() {
            return Vec::new();
        }
        match self.mode {
            LaunchMode::Slingshot => {
                self.aim = Some(AimDrag::new(at));
                Vec::new()
            }
            LaunchMode::Catapult => match self.catapult.stage() {
                CatapultStage::Empty => vec![LaunchRequest::Stage {
                    variant: self.variant,
                    at,
                }],
                CatapultStage::Loaded => self.catapult.begin_ramp(at),
                CatapultStage::DrawingRamp => Vec::new(),
                CatapultStage::RampReady => match self.catapult.take_staged() {
                    Some(projectile) => {
                        self.begin_turn(projectile);
                        vec![LaunchRequest::Drop {
                            projectile,
                            at: at + Vec2::new(0.0, config.drop_height),
                        }]
                    }
                    None => Vec::new(),
                },
            },
        }
    }

    pub fn pointer_drag(&mut self, at: Vec2) {
        match self.mode {
            LaunchMode::Slingshot => {
                if let Some(aim) = self.aim.as_mut() {
                    aim.end = at;
                }
            }
            LaunchMode::Catapult => self.catapult.extend_ramp(at),
        }
    }

    pub fn pointer_up(&mut self, at: Vec2, config: &GameConfig) -> Vec<LaunchRequest> {
        match self.mode {
            LaunchMode::Slingshot => {
                let Some(mut aim) = self.aim.take() else {
                    return Vec::new();
                };
                if !self.can_launch() {
                    return Vec::new();
                }
                aim.end = at;
                vec![LaunchRequest::Fire {
                    variant: self.variant,
                    origin: at,
                    impulse: launch_impulse(aim.impulse(), config),
                }]
            }
            LaunchMode::Catapult => self.catapult.finish_ramp(at, config),
        }
    }

    /// A `Fire` request has produced `projectile`.
    pub fn fired(&mut self, projectile: Entity) {
        self.begin_turn(projectile);
    }

    /// A `Stage` request has produced `projectile`.
    pub fn staged(&mut self, projectile: Entity) {
        self.catapult.load(projectile);
    }

    pub fn ramp_rejected(&mut self) {
        self.catapult.ramp_rejected();
    }

    fn begin_turn(&mut self, projectile: Entity) {
        self.current = Some(projectile);
        self.phase = TurnPhase::InFlight;
        self.settle_steps = 0;
        self.settle_timer = 0.0;
    }

    fn end_turn(&mut self) {
        self.current = None;
        self.phase = TurnPhase::Idle;
        self.settle_steps = 0;
        self.settle_timer = 0.0;
    }

    /// Advance settle detection by one step.
    ///
    /// `speed` is the current projectile's linear speed, or `None` once it no
    /// longer exists.  Returns `true` on the step the turn ends.
    pub fn tick_turn(&mut self, dt: f32, speed: Option<f32>, config: &GameConfig) -> bool {
        if self.phase == TurnPhase::Idle {
            return false;
        }
        match speed {
            None => {
                debug!("current projectile gone, turn over");
                self.end_turn();
                true
            }
            Some(speed) if speed < config.settle_speed_threshold => {
                self.phase = TurnPhase::Settling;
                self.settle_steps += 1;
                self.settle_timer = self.settle_steps as f32 * dt;
                if steps_cover(self.settle_steps, dt, config.settle_duration) {
                    debug!("current projectile settled, turn over");
                    self.end_turn();
                    true
                } else {
                    false
                }
            }
            Some(_) => {
                self.phase = TurnPhase::InFlight;
                self.settle_steps = 0;
                self.settle_timer = 0.0;
                false
            }
        }
    }

    /// Advance the ramp lifetime by one step.
    pub fn tick_ramp(&mut self, dt: f32) -> Vec<LaunchRequest> {
        self.catapult.tick(dt)
    }

    /// Switch launch mode, discarding any partial gesture state.
    ///
    /// An in-flight turn is left running; only staged/stroke/ramp/aim state goes.
    pub fn toggle_mode(&mut self) -> Vec<LaunchRequest> {
        self.aim = None;
        let requests = self.catapult.discard();
        self.mode = self.mode.toggled();
        requests
    }

    /// Stop accepting launches (the level is won).
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.aim = None;
    }

    /// Return to a fresh turn, keeping mode and selected variant.
    ///
    /// Only session state is cleared; the caller removes every projectile and
    /// ramp body of the attempt.
    pub fn reset(&mut self) {
        self.catapult = CatapultFlow::default();
        self.aim = None;
        self.frozen = false;
        self.end_turn();
    }
}

// ── Systems ──────────────────────────────────────────────────────────────────

/// Carry out the world effects of a batch of session transitions.
fn apply_launch_requests(
    commands: &mut Commands,
    requests: Vec<LaunchRequest>,
    session: &mut LaunchSession,
    progress: &mut Progress,
    projectiles: &mut Query<&mut Projectile>,
    ramps: &Query<Entity, With<Ramp>>,
    config: &GameConfig,
) {
    for request in requests {
        match request {
            LaunchRequest::Fire {
                variant,
                origin,
                impulse,
            } => {
                let entity = spawn_projectile(commands, variant, origin, impulse, config);
                session.fired(entity);
                progress.projectiles_used += 1;
                info!(
                    "launched {:?} at ({:.0}, {:.0}) with impulse {:.0}",
                    variant,
                    origin.x,
                    origin.y,
                    impulse.length()
                );
            }
            LaunchRequest::Stage { variant, at } => {
                let entity = spawn_staged_projectile(commands, variant, at, config);
                session.staged(entity);
                progress.projectiles_used += 1;
                info!("staged {:?} at ({:.0}, {:.0})", variant, at.x, at.y);
            }
            LaunchRequest::Drop { projectile, at } => match projectiles.get_mut(projectile) {
                Ok(mut state) => {
                    release_staged(commands, projectile, &mut state, at);
                    info!("dropped projectile from ({:.0}, {:.0})", at.x, at.y);
                }
                // The turn ends on the next tick when the projectile is missing.
                Err(_) => warn!("nothing to drop: staged projectile {projectile} is gone"),
            },
            LaunchRequest::BuildRamp(geometry) => {
                despawn_ramps(commands, ramps);
                match spawn_ramp(commands, &geometry) {
                    Ok(_) => info!("ramp built with {} segments", geometry.segment_count()),
                    Err(e) => {
                        error!("ramp rejected: {e}");
                        session.ramp_rejected();
                    }
                }
            }
            LaunchRequest::ClearRamp => despawn_ramps(commands, ramps),
            LaunchRequest::Discard(projectile) => {
                commands.entity(projectile).try_despawn();
            }
        }
    }
}

/// Route pointer gestures and mode/variant commands into the session.
#[allow(clippy::too_many_arguments)]
pub fn launch_input_system(
    mut commands: Commands,
    mut inputs: MessageReader<PlayerInput>,
    config: Res<GameConfig>,
    mut session: ResMut<LaunchSession>,
    mut progress: ResMut<Progress>,
    mut projectiles: Query<&mut Projectile>,
    ramps: Query<Entity, With<Ramp>>,
) {
    for input in inputs.read() {
        let requests = match *input {
            PlayerInput::PointerDown(at) => session.pointer_down(at, &config),
            PlayerInput::PointerDrag(at) => {
                session.pointer_drag(at);
                Vec::new()
            }
            PlayerInput::PointerUp(at) => session.pointer_up(at, &config),
            PlayerInput::SelectVariant(variant) => {
                session.select_variant(variant);
                debug!("selected {:?}", variant);
                Vec::new()
            }
            PlayerInput::ToggleMode => {
                let requests = session.toggle_mode();
                info!("launch mode: {}", session.mode().label());
                requests
            }
            PlayerInput::TriggerAbility
            | PlayerInput::RestartLevel
            | PlayerInput::NextLevel => Vec::new(),
        };
        apply_launch_requests(
            &mut commands,
            requests,
            &mut session,
            &mut progress,
            &mut projectiles,
            &ramps,
            &config,
        );
    }
}

/// Settle detection for the current projectile, plus ramp expiry.
pub fn turn_tick_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut session: ResMut<LaunchSession>,
    velocities: Query<&Velocity, With<Projectile>>,
    ramps: Query<Entity, With<Ramp>>,
    mut ready: MessageWriter<TurnReady>,
) {
    let dt = config.physics_dt;
    let speed = session
        .current()
        .map(|entity| velocities.get(entity).ok().map(|v| v.linvel.length()));
    if let Some(speed) = speed {
        if session.tick_turn(dt, speed, &config) {
            ready.write(TurnReady);
        }
    }

    for request in session.tick_ramp(dt) {
        if request == LaunchRequest::ClearRamp {
            despawn_ramps(&mut commands, &ramps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.25;

    fn firing_session() -> (LaunchSession, GameConfig) {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.pointer_down(Vec2::ZERO, &config);
        session.pointer_drag(Vec2::new(50.0, 0.0));
        let requests = session.pointer_up(Vec2::new(100.0, 0.0), &config);
        assert!(matches!(requests.as_slice(), [LaunchRequest::Fire { .. }]));
        session.fired(Entity::PLACEHOLDER);
        (session, config)
    }

    #[test]
    fn release_fires_opposite_the_drag() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.pointer_down(Vec2::ZERO, &config);
        let requests = session.pointer_up(Vec2::new(100.0, 0.0), &config);
        let [LaunchRequest::Fire {
            origin, impulse, ..
        }] = requests.as_slice()
        else {
            panic!("expected a single Fire, got {requests:?}");
        };
        assert_eq!(*origin, Vec2::new(100.0, 0.0));
        assert!(impulse.x < 0.0);
        assert!(impulse.y.abs() < 1e-2);
    }

    #[test]
    fn one_projectile_per_turn() {
        let (mut session, config) = firing_session();
        assert!(!session.can_launch());
        assert_eq!(session.phase(), TurnPhase::InFlight);

        assert!(session.pointer_down(Vec2::ZERO, &config).is_empty());
        assert!(session.pointer_up(Vec2::new(40.0, 0.0), &config).is_empty());
    }

    #[test]
    fn settle_needs_the_full_duration() {
        let (mut session, config) = firing_session();
        let slow = Some(config.settle_speed_threshold * 0.5);

        // 0.75 s below threshold: not yet.
        for _ in 0..3 {
            assert!(!session.tick_turn(DT, slow, &config));
            assert_eq!(session.phase(), TurnPhase::Settling);
        }
        // 1.0 s: settled.
        assert!(session.tick_turn(DT, slow, &config));
        assert!(session.can_launch());
        assert!(session.current().is_none());
    }

    #[test]
    fn settle_ends_on_the_exact_step_at_frame_rate() {
        let (mut session, config) = firing_session();
        let dt = config.physics_dt;
        let steps = (config.settle_duration / dt).round() as u32;
        let slow = Some(0.0);

        for _ in 0..steps - 1 {
            assert!(!session.tick_turn(dt, slow, &config));
        }
        assert!(session.tick_turn(dt, slow, &config));
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    #[test]
    fn bounce_restarts_the_settle_timer() {
        let (mut session, config) = firing_session();
        let slow = Some(1.0);
        let fast = Some(config.settle_speed_threshold + 50.0);

        session.tick_turn(DT, slow, &config);
        session.tick_turn(DT, slow, &config);
        session.tick_turn(DT, slow, &config);
        assert!(!session.tick_turn(DT, fast, &config));
        assert_eq!(session.settle_timer(), 0.0);
        assert_eq!(session.phase(), TurnPhase::InFlight);

        for _ in 0..3 {
            assert!(!session.tick_turn(DT, slow, &config));
        }
        assert!(session.tick_turn(DT, slow, &config));
    }

    #[test]
    fn destroyed_projectile_ends_the_turn_immediately() {
        let (mut session, config) = firing_session();
        assert!(session.tick_turn(DT, None, &config));
        assert!(session.can_launch());
    }

    #[test]
    fn idle_session_ignores_ticks() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        assert!(!session.tick_turn(DT, None, &config));
        assert_eq!(session.phase(), TurnPhase::Idle);
    }

    #[test]
    fn catapult_flow_stages_draws_and_drops() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.toggle_mode();
        assert_eq!(session.mode(), LaunchMode::Catapult);

        let requests = session.pointer_down(Vec2::new(200.0, 100.0), &config);
        assert!(matches!(requests.as_slice(), [LaunchRequest::Stage { .. }]));
        session.staged(Entity::PLACEHOLDER);
        assert_eq!(session.catapult_stage(), CatapultStage::Loaded);
        assert!(session.can_launch(), "staging is not a launch");

        session.pointer_down(Vec2::new(50.0, 50.0), &config);
        let requests = session.pointer_up(Vec2::new(300.0, 150.0), &config);
        assert!(matches!(requests.as_slice(), [LaunchRequest::BuildRamp(_)]));
        assert_eq!(session.catapult_stage(), CatapultStage::RampReady);

        let requests = session.pointer_down(Vec2::new(400.0, 300.0), &config);
        assert_eq!(
            requests,
            vec![LaunchRequest::Drop {
                projectile: Entity::PLACEHOLDER,
                at: Vec2::new(400.0, 300.0 + config.drop_height),
            }]
        );
        assert_eq!(session.phase(), TurnPhase::InFlight);
        assert_eq!(session.current(), Some(Entity::PLACEHOLDER));
        assert_eq!(session.catapult_stage(), CatapultStage::Empty);
    }

    #[test]
    fn toggle_discards_staged_projectile_and_ramp() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.toggle_mode();
        session.pointer_down(Vec2::new(200.0, 100.0), &config);
        session.staged(Entity::PLACEHOLDER);
        session.pointer_down(Vec2::ZERO, &config);
        session.pointer_up(Vec2::new(100.0, 40.0), &config);

        let requests = session.toggle_mode();
        assert_eq!(
            requests,
            vec![
                LaunchRequest::Discard(Entity::PLACEHOLDER),
                LaunchRequest::ClearRamp
            ]
        );
        assert_eq!(session.mode(), LaunchMode::Slingshot);
        assert_eq!(session.catapult_stage(), CatapultStage::Empty);
    }

    #[test]
    fn toggle_mid_aim_drops_the_aim() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.pointer_down(Vec2::ZERO, &config);
        session.toggle_mode();
        session.toggle_mode();
        assert!(session.aim().is_none());
        assert!(session.pointer_up(Vec2::new(100.0, 0.0), &config).is_empty());
    }

    #[test]
    fn frozen_session_refuses_launches_until_reset() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.freeze();
        assert!(!session.can_launch());
        assert!(session.pointer_down(Vec2::ZERO, &config).is_empty());

        session.reset();
        assert!(session.can_launch());
    }

    #[test]
    fn reset_forgets_staged_projectile_and_ramp() {
        let config = GameConfig::default();
        let mut session = LaunchSession::default();
        session.toggle_mode();
        session.pointer_down(Vec2::new(300.0, 300.0), &config);
        session.staged(Entity::PLACEHOLDER);
        session.pointer_down(Vec2::new(250.0, 260.0), &config);
        session.pointer_up(Vec2::new(450.0, 140.0), &config);
        assert_eq!(session.catapult_stage(), CatapultStage::RampReady);

        session.reset();
        assert_eq!(session.catapult_stage(), CatapultStage::Empty);
        assert!(!session.catapult().ramp().is_ready());
        assert_eq!(session.mode(), LaunchMode::Catapult);
        assert_eq!(session.phase(), TurnPhase::Idle);
    }
}
