//! Rocket Corridor entry point
//!
//! The browser build is driven from `lib.rs` (`wasm_start`). Natively this
//! runs a headless autopilot through the campaign and logs what happens.

#[cfg(not(target_arch = "wasm32"))]
use rocket_corridor::sim::{FlightEvent, FlightState, GameState, SteeringInput, tick};

#[cfg(not(target_arch = "wasm32"))]
const DT: f32 = 1.0 / 60.0;
/// Give up on a level after this many simulated seconds
#[cfg(not(target_arch = "wasm32"))]
const LEVEL_TIMEOUT_SECS: f32 = 90.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rocket Corridor (native) starting headless run...");

    let mut game = GameState::new(rocket_corridor::sim::Campaign::standard());
    let levels = game.campaign().len();
    let mut attempts = 0u32;
    let mut elapsed = 0.0f32;
    let mut done = false;

    while !done && game.level_index < levels {
        let input = autopilot(&game);
        tick(&mut game, &input, DT);
        elapsed += DT;

        for event in game.drain_events() {
            match event {
                FlightEvent::LevelLoaded { index, name } => {
                    println!("level {:>2}: {name}", index + 1);
                    elapsed = 0.0;
                }
                FlightEvent::Crashed { reason } => {
                    attempts += 1;
                    println!("  crashed: {reason}");
                }
                FlightEvent::Landed { points } => println!("  landed (+{points})"),
                FlightEvent::CampaignComplete { score } => {
                    println!("campaign complete: {score} points");
                    done = true;
                }
                FlightEvent::Launched | FlightEvent::NewBest { .. } => {}
            }
        }

        if elapsed > LEVEL_TIMEOUT_SECS {
            log::warn!("Level {} timed out, skipping", game.level_index + 1);
            if game.level_index + 1 >= levels {
                break;
            }
            game.load_level(game.level_index as i64 + 1);
        }
    }

    println!("score {} after {attempts} crashes", game.score);
}

/// Crude controller: hold a cruise altitude, slow down over the pad, drop in
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(game: &GameState) -> SteeringInput {
    if game.state == FlightState::Crashed {
        return SteeringInput::default();
    }

    let world = game.world();
    let rocket = &game.rocket;
    let pad = world.landing_pad().center;
    let dx = pad.x - rocket.pos.x;
    let dz = pad.z - rocket.pos.z;

    let ground = world.ground_height_at(rocket.pos.x, rocket.pos.z);
    let ceiling = world
        .corridor_at(rocket.pos.x)
        .map_or(world.flight_ceiling_y(), |p| p.ceiling);
    let over_pad = dx.abs() < world.landing_pad().half() * 0.6;

    let target_y = if over_pad {
        world.landing_pad_top_y()
    } else {
        (ground + 3.0).min(ceiling - 1.5)
    };
    let desired_vy = ((target_y - rocket.pos.y) * 1.5).clamp(-3.0, 3.0);
    let thrust = rocket.vel.y < desired_vy;

    let desired_vx = (dx * 0.5).clamp(-4.0, 4.0);
    let lateral = ((desired_vx - rocket.vel.x) * 0.4).clamp(-1.0, 1.0);
    let vertical = (-dz * 0.3).clamp(-0.8, 0.8);

    SteeringInput::new(lateral, vertical, thrust)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library
}
