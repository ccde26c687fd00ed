//! Per-frame simulation step

use super::collision::{CollisionOutcome, judge};
use super::physics::{SteeringInput, integrate};
use super::state::{FlightPhase, FlightState, GameState};
use crate::clamp_dt;
use crate::consts::*;

/// Advance the session by one host frame
///
/// Stages run in a fixed order: the deferred action, settings, launch
/// detection, flight (integrate then judge), visual tilt, then the
/// finish-phase hint.
pub fn tick(state: &mut GameState, input: &SteeringInput, dt: f32) {
    let dt = clamp_dt(dt);
    state.time_ticks += 1;

    if let Some(action) = state.pending_mut().advance(dt) {
        state.apply(action);
    }

    let input = state.settings().apply_to_input(*input);

    if state.state == FlightState::Ready
        && (input.thrust_held || input.lateral.abs() > LAUNCH_STEER_THRESHOLD)
    {
        state.launch();
    }

    if state.state.is_flying() {
        fly(state, &input, dt);
    }

    state.rocket.update_visuals(&input, dt);

    if state.state == FlightState::Flying(FlightPhase::Side)
        && state.world().in_finish_zone(state.rocket.pos)
    {
        state.state = FlightState::Flying(FlightPhase::Finish);
    }
}

fn fly(state: &mut GameState, input: &SteeringInput, dt: f32) {
    state.rocket = integrate(&state.rocket, input, state.physics(), dt);

    let mut rocket = state.rocket;
    let outcome = judge(&mut rocket, state.world(), ROCKET_RADIUS);
    state.rocket = rocket;

    match outcome {
        CollisionOutcome::Safe | CollisionOutcome::OnLaunchPad => {}
        CollisionOutcome::OnLandingPad => state.try_land(state.metrics()),
        fatal => {
            if let Some(reason) = fatal.crash_reason() {
                state.crash(reason);
            }
        }
    }
}
