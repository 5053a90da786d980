mod sim;

use std::time::Duration;

use bevy::{prelude::*, time::TimeUpdateStrategy};
use game::{args::get_args, GameTunables, HordeGamePlugin};
use utils::logs::setup_logging;

use sim::{log_summary, BotSimPlugin};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = get_args();

    let _logging_guard = setup_logging(Some(args.cid.as_str()))?;

    let tunables = match &args.config {
        Some(path) => GameTunables::load(path)?,
        None => GameTunables::default(),
    };
    info!(
        "server{{start cid={} seed={} players={} tick_ms={} duration_secs={}}}",
        args.cid, args.seed, args.players, args.tick_ms, args.duration_secs
    );

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            args.tick_ms,
        )))
        .add_plugins(HordeGamePlugin {
            tunables,
            seed: args.seed,
        })
        .add_plugins(BotSimPlugin {
            players: args.players,
        });
    app.finish();
    app.cleanup();

    let ticks = args.duration_secs * 1_000 / args.tick_ms;
    for _ in 0..ticks {
        app.update();
    }

    log_summary(app.world_mut());
    info!("server{{stop ticks={}}}", ticks);
    Ok(())
}
