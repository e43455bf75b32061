//! Closed-loop accuracy against simulated mechanisms.
//!
//! Every loop runs at 100 Hz on a `ManualClock`, so results are exact
//! functions of the gains and the plant.

use kinetic_common::state::KineticState;
use kinetic_common::time::ManualClock;
use kinetic_control::ControlSystem;
use kinetic_control::builder::ControlSystemBuilder;
use kinetic_control::feedback::{
    AngleType, AngularFeedback, FeedbackType, PidCoefficients, PidController, PidElement,
};

const DT_NANOS: u64 = 10_000_000;
const DT: f64 = 0.01;

/// Mechanism with inertia, viscous damping and an external load.
///
/// `a = (power − load(x)) / inertia − damping × v`
struct SimulatedAxis {
    state: KineticState,
    inertia: f64,
    damping: f64,
    load: fn(f64) -> f64,
}

impl SimulatedAxis {
    fn new(inertia: f64, damping: f64) -> Self {
        Self {
            state: KineticState::ZERO,
            inertia,
            damping,
            load: |_| 0.0,
        }
    }

    fn with_load(mut self, load: fn(f64) -> f64) -> Self {
        self.load = load;
        self
    }

    fn starting_at(mut self, position: f64) -> Self {
        self.state.position = position;
        self
    }

    fn step(&mut self, power: f64, dt: f64) {
        let s = self.state;
        let acceleration =
            (power - (self.load)(s.position)) / self.inertia - self.damping * s.velocity;
        let velocity = s.velocity + acceleration * dt;
        let position = s.position + velocity * dt;
        self.state = KineticState::new(position, velocity, acceleration);
    }
}

/// Run `ticks` cycles and return the largest |reference − position| seen.
fn run(system: &mut ControlSystem, axis: &mut SimulatedAxis, clock: &ManualClock, ticks: usize) -> f64 {
    let mut worst_tracking = 0.0_f64;
    for _ in 0..ticks {
        let power = system.calculate(axis.state);
        let tracking = (system.last_reference().position - axis.state.position).abs();
        worst_tracking = worst_tracking.max(tracking);
        axis.step(power, DT);
        clock.advance_nanos(DT_NANOS);
    }
    worst_tracking
}

fn pd_system(clock: &ManualClock) -> ControlSystem {
    ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(4.0, 0.0, 2.0)
        .build()
        .unwrap()
}

// ─── Step response ──────────────────────────────────────────────────

fn step_response_error(step: f64) -> f64 {
    let clock = ManualClock::new();
    let mut system = pd_system(&clock);
    let mut axis = SimulatedAxis::new(1.0, 0.5);
    system.set_goal(KineticState::from_position(step));
    run(&mut system, &mut axis, &clock, 1_000);
    (step - axis.state.position).abs()
}

#[test]
fn step_response_1_unit_steady_state_error_below_threshold() {
    let error = step_response_error(1.0);
    assert!(error < 0.01, "steady-state error {error:.6} for 1 unit step");
}

#[test]
fn step_response_10_units_steady_state_error_below_threshold() {
    let error = step_response_error(10.0);
    assert!(error < 0.01, "steady-state error {error:.6} for 10 unit step");
}

#[test]
fn step_response_100_units_steady_state_error_below_threshold() {
    let error = step_response_error(100.0);
    assert!(error < 0.01, "steady-state error {error:.6} for 100 unit step");
}

#[test]
fn step_response_overshoot_bounded() {
    let clock = ManualClock::new();
    let mut system = pd_system(&clock);
    let mut axis = SimulatedAxis::new(1.0, 0.5);
    system.set_goal(KineticState::from_position(10.0));

    let mut max_overshoot = 0.0_f64;
    for _ in 0..1_000 {
        let power = system.calculate(axis.state);
        axis.step(power, DT);
        clock.advance_nanos(DT_NANOS);
        max_overshoot = max_overshoot.max(axis.state.position - 10.0);
    }

    // ζ ≈ 0.6 gives under 10 % overshoot
    let overshoot_pct = max_overshoot / 10.0 * 100.0;
    assert!(overshoot_pct < 15.0, "overshoot {overshoot_pct:.2}%");
    assert!(system.is_within_tolerance(KineticState::new(0.01, 0.01, 0.1)));
}

// ─── Integral action ────────────────────────────────────────────────

fn loaded_axis_error(ki: f64) -> f64 {
    let clock = ManualClock::new();
    // per-nanosecond ki, no zero-crossing reset so the integral can hold the load
    let controller = PidController::new(PidCoefficients::new(4.0, ki, 2.0))
        .reset_integral_on_zero_crossover(false);
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .feedback(PidElement::from_controller(
            FeedbackType::Position,
            controller,
            clock.clone(),
        ))
        .build()
        .unwrap();
    let mut axis = SimulatedAxis::new(1.0, 0.5).with_load(|_| 2.0);
    system.set_goal(KineticState::from_position(1.0));
    run(&mut system, &mut axis, &clock, 4_000);
    1.0 - axis.state.position
}

#[test]
fn proportional_only_sags_under_constant_load() {
    let error = loaded_axis_error(0.0);
    // load / kp
    assert!((error - 0.5).abs() < 1e-3, "sag {error:.6}");
}

#[test]
fn integral_removes_steady_state_error() {
    let error = loaded_axis_error(1e-9);
    assert!(error.abs() < 1e-3, "residual error {error:.6}");
}

// ─── Feedforward ────────────────────────────────────────────────────

fn arm_error(kg: f64) -> f64 {
    let clock = ManualClock::new();
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(4.0, 0.0, 2.0)
        .arm_ff(kg, 0.0, 0.0, 0.0)
        .build()
        .unwrap();
    let mut axis = SimulatedAxis::new(1.0, 0.5).with_load(|x| 1.5 * x.cos());
    system.set_goal(KineticState::from_position(0.3));
    run(&mut system, &mut axis, &clock, 1_500);
    0.3 - axis.state.position
}

#[test]
fn arm_sags_without_gravity_feedforward() {
    assert!(arm_error(0.0) > 0.2);
}

#[test]
fn arm_feedforward_cancels_gravity() {
    let error = arm_error(1.5);
    assert!(error.abs() < 1e-3, "residual error {error:.6}");
}

#[test]
fn trapezoid_with_model_feedforward_tracks_closely() {
    let clock = ManualClock::new();
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(8.0, 0.0, 4.0)
        .basic_ff(1.0, 2.0, 0.0)
        .trapezoid_interpolator(0.8, 1.6, 1.6)
        .build()
        .unwrap();
    let mut axis = SimulatedAxis::new(2.0, 0.5);
    system.set_goal(KineticState::from_position(1.2));

    let worst = run(&mut system, &mut axis, &clock, 600);
    assert!(worst < 0.02, "worst tracking error {worst:.6}");
    assert!((axis.state.position - 1.2).abs() < 0.005);
}

// ─── Nonlinear feedback ─────────────────────────────────────────────

#[test]
fn squid_converges() {
    let clock = ManualClock::new();
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .pos_squid(4.0, 0.0, 2.0)
        .build()
        .unwrap();
    let mut axis = SimulatedAxis::new(1.0, 0.5);
    system.set_goal(KineticState::from_position(2.0));
    run(&mut system, &mut axis, &clock, 1_500);
    assert!((axis.state.position - 2.0).abs() < 0.01);
    assert!(axis.state.velocity.abs() < 0.05);
}

#[test]
fn angular_feedback_takes_short_way_round() {
    let clock = ManualClock::new();
    let pid = PidElement::new(
        FeedbackType::Position,
        PidCoefficients::new(4.0, 0.0, 2.0),
        clock.clone(),
    );
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .feedback(AngularFeedback::new(AngleType::Degrees, pid))
        .build()
        .unwrap();
    let mut axis = SimulatedAxis::new(1.0, 0.5).starting_at(350.0);
    system.set_goal(KineticState::from_position(10.0));

    let mut lowest = f64::INFINITY;
    for _ in 0..1_000 {
        let power = system.calculate(axis.state);
        axis.step(power, DT);
        clock.advance_nanos(DT_NANOS);
        lowest = lowest.min(axis.state.position);
    }

    // 20° forward through 360°, never the 340° backwards
    assert!(lowest >= 349.0, "moved backwards to {lowest}");
    assert!((axis.state.position - 370.0).abs() < 0.01);
}
