//! Builder-assembled systems driven through pauses, resets and goal changes.

use std::time::Duration;

use kinetic_common::state::KineticState;
use kinetic_common::time::ManualClock;
use kinetic_control::sim::{PlantConfig, SimulatedPlant};
use kinetic_control::{ControlSystem, ControlSystemBuilder};

const PERIOD: Duration = Duration::from_millis(10);

fn drive(system: &mut ControlSystem, plant: &mut SimulatedPlant, clock: &ManualClock, ticks: usize) {
    for _ in 0..ticks {
        let power = system.calculate(plant.state());
        plant.step(power, PERIOD.as_secs_f64());
        clock.advance(PERIOD);
    }
}

fn elevator() -> SimulatedPlant {
    SimulatedPlant::new(&PlantConfig {
        inertia: 2.0,
        damping: 0.5,
        initial: KineticState::ZERO,
    })
}

fn profiled_elevator(clock: &ManualClock) -> ControlSystem {
    ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(8.0, 0.0, 4.0)
        .basic_ff(1.0, 2.0, 0.0)
        .vel_filter(|f| f.low_pass(0.2, 0.0))
        .trapezoid_interpolator(1.0, 2.0, 2.0)
        .build()
        .unwrap()
}

#[test]
fn reset_restarts_profile_at_reengage_time() {
    let clock = ManualClock::new();
    let mut system = profiled_elevator(&clock);
    let mut plant = elevator();

    system.set_goal(KineticState::from_position(1.0));
    drive(&mut system, &mut plant, &clock, 500);
    assert!((plant.state().position - 1.0).abs() < 0.005);

    // loop paused for 5 s, then re-engaged with a longer move
    clock.advance(Duration::from_secs(5));
    system.reset();
    system.set_goal(KineticState::from_position(2.0));
    system.calculate(plant.state());
    assert_eq!(system.last_reference(), KineticState::ZERO);

    clock.advance(PERIOD);
    system.calculate(plant.state());
    let reference = system.last_reference();
    assert!(reference.position > 0.0 && reference.position < 0.001);
    assert!((reference.acceleration - 2.0).abs() < 1e-12);
}

#[test]
fn without_reset_profile_time_keeps_running() {
    let clock = ManualClock::new();
    let mut system = profiled_elevator(&clock);
    let mut plant = elevator();

    system.set_goal(KineticState::from_position(1.0));
    drive(&mut system, &mut plant, &clock, 10);

    clock.advance(Duration::from_secs(60));
    system.set_goal(KineticState::from_position(2.0));
    system.calculate(plant.state());
    // long past the end of any profile, so the reference is the goal
    assert_eq!(system.last_reference(), KineticState::from_position(2.0));
}

#[test]
fn velocity_loop_with_kv_feedforward_holds_speed() {
    let clock = ManualClock::new();
    let mut system = ControlSystemBuilder::with_clock(clock.clone())
        .vel_pid(2.0, 0.0, 0.0)
        .basic_ff(0.5, 0.0, 0.0)
        .build()
        .unwrap();
    let mut plant = SimulatedPlant::new(&PlantConfig {
        inertia: 1.0,
        damping: 0.5,
        initial: KineticState::ZERO,
    });

    system.set_goal(KineticState::new(0.0, 2.0, 0.0));
    drive(&mut system, &mut plant, &clock, 1_000);
    assert!((plant.state().velocity - 2.0).abs() < 1e-3);
}

#[test]
fn ema_interpolator_softens_the_step() {
    let clock = ManualClock::new();
    let mut soft = ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(4.0, 0.0, 2.0)
        .ema_interpolator(0.05)
        .build()
        .unwrap();
    let mut hard = ControlSystemBuilder::with_clock(clock.clone())
        .pos_pid(4.0, 0.0, 2.0)
        .build()
        .unwrap();

    soft.set_goal(KineticState::from_position(1.0));
    hard.set_goal(KineticState::from_position(1.0));
    // EMA reference is 0.05 on the first tick
    assert!(soft.calculate(KineticState::ZERO) < 0.5);
    assert_eq!(hard.calculate(KineticState::ZERO), 4.0);

    let mut plant = elevator();
    drive(&mut soft, &mut plant, &clock, 1_500);
    assert!((plant.state().position - 1.0).abs() < 0.01);
}

#[test]
fn invalid_element_parameters_fail_the_build() {
    assert!(
        ControlSystemBuilder::with_clock(ManualClock::new())
            .pos_pid(1.0, 0.0, 0.0)
            .trapezoid_interpolator(1.0, 0.0, 1.0)
            .build()
            .is_err()
    );
    assert!(
        ControlSystemBuilder::with_clock(ManualClock::new())
            .pos_filter(|f| f.low_pass(0.5, 0.0).low_pass(-1.0, 0.0))
            .build()
            .is_err()
    );
}
