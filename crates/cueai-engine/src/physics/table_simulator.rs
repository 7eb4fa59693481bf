use std::{f64::consts::PI, sync::Arc};

use arrayvec::ArrayVec;
use glam::DVec2;

use crate::{
    Ball, BoardState, CUE_BALL, Shot, SimulationError, TableGeometry,
    physics::{BallContact, ContactObserver, Simulator, StepParams},
};

const BALL_SLOTS: usize = 16;
const BALL_PAIRS: usize = BALL_SLOTS * (BALL_SLOTS - 1) / 2;

const DENSITY: f64 = 1.0;
const LINEAR_DAMPING: f64 = 0.6;
const BALL_RESTITUTION: f64 = 0.8;
const RAIL_RESTITUTION: f64 = 0.8;
/// Below this speed a ball is put to sleep.
const SLEEP_SPEED: f64 = 0.05;
/// Per-axis speed above which a ball counts as moving.
const MOVING_SPEED: f64 = 0.001;
/// Distance within which two surfaces count as touching.
const CONTACT_SLOP: f64 = 0.005;
const MAX_SUBSTEPS: f64 = 64.0;

#[derive(Debug, Clone, Copy)]
struct Body {
    number: u8,
    position: DVec2,
    velocity: DVec2,
    angle: f64,
    pocketed: bool,
}

impl Body {
    fn from_ball(ball: &Ball) -> Self {
        Self {
            number: ball.number,
            position: ball.position,
            velocity: DVec2::ZERO,
            angle: ball.angle,
            pocketed: ball.pocketed,
        }
    }

    fn to_ball(self) -> Ball {
        Ball {
            number: self.number,
            position: self.position,
            angle: self.angle,
            pocketed: self.pocketed,
        }
    }

    fn contact(&self) -> BallContact {
        BallContact {
            number: self.number,
            position: self.position,
        }
    }

    fn is_moving(&self) -> bool {
        !self.pocketed
            && (self.velocity.x.abs() > MOVING_SPEED || self.velocity.y.abs() > MOVING_SPEED)
    }
}

/// Built-in deterministic disc simulator.
///
/// Balls are frictionless discs with linear damping on a table enclosed by four rails
/// that open at the pocket mouths. Each step is split into enough substeps that no ball
/// moves more than half a radius at a time, so fast shots cannot tunnel through
/// other balls.
///
/// Cloning a simulator is cheap; parallel search keeps one clone per worker.
#[derive(Debug, Clone, Default)]
pub struct TableSimulator {
    table: TableGeometry,
    origin: Option<Arc<BoardState>>,
    bodies: ArrayVec<Body, BALL_SLOTS>,
    /// Bitmask per body of the bodies it currently touches.
    touching: [u16; BALL_SLOTS],
    /// Bitmask of bodies currently touching a rail.
    on_rail: u16,
    pending_force: Option<DVec2>,
    first_contact: Option<u8>,
}

impl TableSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ball_mass(&self) -> f64 {
        DENSITY * PI * self.table.ball_radius * self.table.ball_radius
    }

    fn cue_index(&self) -> Option<usize> {
        self.bodies.iter().position(|b| b.number == CUE_BALL)
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn substep_count(&self, dt: f64) -> u32 {
        let max_speed = self
            .bodies
            .iter()
            .filter(|b| !b.pocketed)
            .map(|b| b.velocity.length())
            .fold(0.0, f64::max);
        let travel = max_speed * dt / (self.table.ball_radius * 0.5);
        travel.ceil().clamp(1.0, MAX_SUBSTEPS) as u32
    }

    fn integrate(&mut self, h: f64) {
        let damping = 1.0 / (1.0 + h * LINEAR_DAMPING);
        for body in self.bodies.iter_mut().filter(|b| !b.pocketed) {
            body.velocity *= damping;
            body.position += body.velocity * h;
        }
    }

    fn resolve_ball_contacts(&mut self, params: &StepParams, observer: &mut dyn ContactObserver) {
        let diameter = self.table.ball_radius * 2.0;
        let mut overlapping = ArrayVec::<(usize, usize), BALL_PAIRS>::new();

        for i in 0..self.bodies.len() {
            if self.bodies[i].pocketed {
                continue;
            }
            for j in i + 1..self.bodies.len() {
                if self.bodies[j].pocketed {
                    continue;
                }
                let distance = self.bodies[i].position.distance(self.bodies[j].position);
                if distance <= diameter + CONTACT_SLOP {
                    if self.touching[i] & (1 << j) == 0 {
                        self.touching[i] |= 1 << j;
                        self.touching[j] |= 1 << i;
                        self.begin_ball_contact(i, j, observer);
                    }
                    if distance < diameter {
                        overlapping.push((i, j));
                    }
                } else {
                    self.touching[i] &= !(1 << j);
                    self.touching[j] &= !(1 << i);
                }
            }
        }

        for _ in 0..params.velocity_iterations {
            for &(i, j) in &overlapping {
                let normal = self.contact_normal(i, j);
                let approach = (self.bodies[j].velocity - self.bodies[i].velocity).dot(normal);
                if approach < 0.0 {
                    // equal masses share the impulse evenly
                    let impulse = -(1.0 + BALL_RESTITUTION) * approach / 2.0;
                    self.bodies[i].velocity -= normal * impulse;
                    self.bodies[j].velocity += normal * impulse;
                }
            }
        }

        for _ in 0..params.position_iterations {
            for &(i, j) in &overlapping {
                let normal = self.contact_normal(i, j);
                let distance = self.bodies[i].position.distance(self.bodies[j].position);
                let overlap = diameter - distance;
                if overlap > 0.0 {
                    self.bodies[i].position -= normal * (overlap / 2.0);
                    self.bodies[j].position += normal * (overlap / 2.0);
                }
            }
        }
    }

    fn contact_normal(&self, i: usize, j: usize) -> DVec2 {
        (self.bodies[j].position - self.bodies[i].position).normalize_or(DVec2::X)
    }

    fn begin_ball_contact(&mut self, i: usize, j: usize, observer: &mut dyn ContactObserver) {
        let (a, b) = (self.bodies[i], self.bodies[j]);
        observer.on_ball_ball_contact(a.contact(), b.contact());
        if self.first_contact.is_none() {
            if a.number == CUE_BALL {
                self.first_contact = Some(b.number);
            } else if b.number == CUE_BALL {
                self.first_contact = Some(a.number);
            }
        }
    }

    fn resolve_rails(&mut self, observer: &mut dyn ContactObserver) {
        let cushion = self.table.cushion_bounds();
        let radius = self.table.ball_radius;
        let table = self.table;

        for i in 0..self.bodies.len() {
            let mut body = self.bodies[i];
            if body.pocketed {
                continue;
            }
            let mut touching = false;

            // (rail coordinate, outward sign, rail runs along x)
            for (rail, sign, along_x) in [
                (cushion.min.x, -1.0, false),
                (cushion.max.x, 1.0, false),
                (cushion.min.y, -1.0, true),
                (cushion.max.y, 1.0, true),
            ] {
                if table.is_pocket_gap(body.position, along_x, rail) {
                    continue;
                }
                let (coord, speed) = if along_x {
                    (&mut body.position.y, &mut body.velocity.y)
                } else {
                    (&mut body.position.x, &mut body.velocity.x)
                };
                let penetration = (*coord + sign * radius - rail) * sign;
                if penetration >= -CONTACT_SLOP {
                    touching = true;
                    if penetration > 0.0 {
                        *coord = rail - sign * radius;
                    }
                    if *speed * sign > 0.0 {
                        *speed = -*speed * RAIL_RESTITUTION;
                    }
                }
            }

            let bit = 1 << i;
            if touching {
                if self.on_rail & bit == 0 {
                    observer.on_ball_wall_contact(body.contact());
                }
                self.on_rail |= bit;
            } else {
                self.on_rail &= !bit;
            }
            self.bodies[i] = body;
        }
    }

    fn capture_pocketed(&mut self, observer: &mut dyn ContactObserver) {
        let pockets = self.table.pockets();
        let bed = self.table.bounds();
        let pocket_radius = self.table.pocket_radius;
        for i in 0..self.bodies.len() {
            let body = &mut self.bodies[i];
            if body.pocketed {
                continue;
            }
            let in_pocket = pockets
                .iter()
                .any(|pocket| pocket.distance(body.position) < pocket_radius);
            if !in_pocket && bed.contains(body.position) {
                continue;
            }
            body.pocketed = true;
            body.velocity = DVec2::ZERO;
            let contact = body.contact();

            let bit = 1 << i;
            self.touching[i] = 0;
            for mask in &mut self.touching {
                *mask &= !bit;
            }
            self.on_rail &= !bit;
            observer.on_ball_pocketed(contact);
        }
    }
}

impl Simulator for TableSimulator {
    fn load(&mut self, board: &Arc<BoardState>) {
        self.bodies.clear();
        self.bodies.extend(board.all_balls().map(Body::from_ball));
        self.touching = [0; BALL_SLOTS];
        self.on_rail = 0;
        self.pending_force = None;
        self.first_contact = None;
        self.origin = Some(Arc::clone(board));
    }

    fn shoot(&mut self, shot: &Shot) -> Result<(), SimulationError> {
        if self.origin.is_none() {
            return Err(SimulationError::NoBoardLoaded);
        }
        let cue = self.cue_index().ok_or(SimulationError::MissingCueBall)?;
        let body = &mut self.bodies[cue];
        if body.pocketed {
            let position = shot
                .cue_ball_position
                .ok_or(SimulationError::MissingCueBallPlacement)?;
            body.position = position;
            body.velocity = DVec2::ZERO;
            body.pocketed = false;
        }
        self.pending_force = Some(shot.force_vector());
        Ok(())
    }

    fn step(
        &mut self,
        params: &StepParams,
        observer: &mut dyn ContactObserver,
    ) -> Result<bool, SimulationError> {
        if self.origin.is_none() {
            return Err(SimulationError::NoBoardLoaded);
        }
        let dt = params.time_step;
        if let Some(force) = self.pending_force.take() {
            let cue = self.cue_index().ok_or(SimulationError::MissingCueBall)?;
            let mass = self.ball_mass();
            self.bodies[cue].velocity += force * dt / mass;
        }

        let substeps = self.substep_count(dt);
        let h = dt / f64::from(substeps);
        for _ in 0..substeps {
            self.integrate(h);
            self.resolve_ball_contacts(params, observer);
            self.resolve_rails(observer);
            self.capture_pocketed(observer);
        }

        for body in &mut self.bodies {
            if body.velocity.length() < SLEEP_SPEED {
                body.velocity = DVec2::ZERO;
            }
        }
        Ok(self.bodies.iter().any(Body::is_moving))
    }

    fn current_board_state(&self) -> Result<BoardState, SimulationError> {
        let origin = self.origin.as_ref().ok_or(SimulationError::NoBoardLoaded)?;
        let cue = self
            .bodies
            .iter()
            .find(|b| b.number == CUE_BALL)
            .ok_or(SimulationError::MissingCueBall)?
            .to_ball();
        let balls = self
            .bodies
            .iter()
            .filter(|b| b.number != CUE_BALL)
            .map(|b| b.to_ball())
            .collect();
        Ok(BoardState::after_shot(
            Arc::clone(origin),
            cue,
            balls,
            self.first_contact,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use crate::Player;

    use super::*;

    #[derive(Default)]
    struct Counter {
        ball_ball: Vec<(u8, u8)>,
        walls: Vec<u8>,
        pocketed: Vec<u8>,
    }

    impl ContactObserver for Counter {
        fn on_ball_ball_contact(&mut self, first: BallContact, second: BallContact) {
            self.ball_ball.push((first.number, second.number));
        }

        fn on_ball_wall_contact(&mut self, ball: BallContact) {
            self.walls.push(ball.number);
        }

        fn on_ball_pocketed(&mut self, ball: BallContact) {
            self.pocketed.push(ball.number);
        }
    }

    fn board(cue: Ball, balls: Vec<Ball>) -> Arc<BoardState> {
        Arc::new(
            BoardState::new(cue, balls, Player::Player1)
                .unwrap()
                .with_shot_index(3)
                .unwrap(),
        )
    }

    fn run(board: &Arc<BoardState>, shot: Shot) -> (BoardState, Counter) {
        let mut sim = TableSimulator::new();
        let mut counter = Counter::default();
        sim.load(board);
        sim.shoot(&shot).unwrap();
        sim.simulate_until_still(&StepParams::STANDARD, &mut counter)
            .unwrap();
        (sim.current_board_state().unwrap(), counter)
    }

    #[test]
    fn test_straight_shot_records_first_contact() {
        let start = board(
            Ball::cue(DVec2::new(1.5, 1.8)),
            vec![Ball::new(1, DVec2::new(3.0, 1.8)), Ball::new(8, DVec2::new(5.0, 0.8))],
        );
        let (after, counter) = run(&start, Shot::new(0.0, 20.0));
        assert_eq!(after.first_contact(), Some(1));
        assert_eq!(counter.ball_ball.first(), Some(&(0, 1)));
        assert_eq!(after.shot_index(), 4);
        assert!(Arc::ptr_eq(after.previous().unwrap(), &start));
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let start = board(
            Ball::cue(DVec2::new(1.2, 1.0)),
            vec![
                Ball::new(2, DVec2::new(2.5, 1.6)),
                Ball::new(8, DVec2::new(3.2, 2.2)),
                Ball::new(12, DVec2::new(4.4, 1.1)),
            ],
        );
        let shot = Shot::new(23.0, 90.0);
        let (a, _) = run(&start, shot);
        let (b, _) = run(&start, shot);
        for (x, y) in a.all_balls().zip(b.all_balls()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_ball_driven_into_corner_pocket() {
        let start = board(
            Ball::cue(DVec2::new(1.0, 1.0)),
            vec![Ball::new(1, DVec2::new(0.5, 0.5)), Ball::new(8, DVec2::new(5.0, 2.5))],
        );
        let (after, counter) = run(&start, Shot::new(225.0, 20.0));
        assert!(after.ball(1).unwrap().pocketed);
        assert!(counter.pocketed.contains(&1));
        assert_eq!(after.pocketed_count(Player::Player1), 1);
    }

    #[test]
    fn test_rail_bounce_is_reported() {
        let start = board(
            Ball::cue(DVec2::new(3.0, 1.8)),
            vec![Ball::new(8, DVec2::new(1.0, 3.0))],
        );
        let (after, counter) = run(&start, Shot::new(0.0, 5.0));
        assert!(counter.walls.contains(&0));
        let table = TableGeometry::STANDARD;
        let cue = after.cue_ball();
        assert!(!cue.pocketed);
        assert!(cue.position.x <= table.width - table.pocket_radius - table.ball_radius + 1e-9);
    }

    #[test]
    fn test_off_table_cue_needs_placement() {
        let start = board(
            Ball::cue(DVec2::new(0.0, 0.0)).pocketed(),
            vec![Ball::new(8, DVec2::new(5.0, 2.5))],
        );
        let mut sim = TableSimulator::new();
        sim.load(&start);
        assert_eq!(
            sim.shoot(&Shot::new(90.0, 1.0)),
            Err(SimulationError::MissingCueBallPlacement)
        );

        let (after, _) = run(
            &start,
            Shot::new(90.0, 1.0).with_cue_ball_position(DVec2::new(4.0, 1.8)),
        );
        let cue = after.cue_ball();
        assert!(!cue.pocketed);
        assert!(cue.position.y > 1.8);
    }

    #[test]
    fn test_requires_loaded_board() {
        let mut sim = TableSimulator::new();
        assert_eq!(
            sim.shoot(&Shot::new(0.0, 1.0)),
            Err(SimulationError::NoBoardLoaded)
        );
        assert_eq!(
            sim.step(&StepParams::STANDARD, &mut ()),
            Err(SimulationError::NoBoardLoaded)
        );
        assert!(sim.current_board_state().is_err());
    }
}
