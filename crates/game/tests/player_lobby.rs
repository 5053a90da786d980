mod common;

use bevy::prelude::*;
use common::*;
use game::{
    character::player::{PlayerId, PlayerLeft},
    ui::UiMessage,
    GameTunables,
};

fn status_pushes(app: &App, id: PlayerId) -> usize {
    app.world()
        .resource::<Outbox>()
        .payloads_for(id)
        .into_iter()
        .filter(|payload| matches!(payload, UiMessage::Health { .. } | UiMessage::Money { .. }))
        .count()
}

#[test]
fn joining_pushes_health_and_money_once() {
    let mut app = test_app(GameTunables::default());
    let id = join(&mut app, 1, "ana");
    run_ticks(&mut app, 3);

    assert_eq!(status_pushes(&app, id), 2);
}

#[test]
fn rejoining_under_the_same_id_gets_a_fresh_hud() {
    let mut app = test_app(GameTunables::default());
    let id = join(&mut app, 1, "ana");
    run_ticks(&mut app, 2);

    send(&mut app, PlayerLeft { id });
    app.update();
    app.world_mut().resource_mut::<Outbox>().ui.clear();

    join(&mut app, 1, "ana");
    run_ticks(&mut app, 3);

    assert_eq!(status_pushes(&app, id), 2);
}
