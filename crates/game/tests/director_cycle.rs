mod common;

use bevy::prelude::*;
use common::*;
use game::{
    character::{
        enemy::{ai::EnemyBrain, Enemy},
        player::{Player, PlayerCombatState, PlayerDownedChanged},
    },
    effects::DeathEffects,
    shop::PurchaseRequest,
    ui::UiMessage,
    waves::{DirectorPhase, EndGameRequest, UnloadArena, WaveConfig, WaveDirector},
    GameTunables,
};

fn tunables(countdown_secs: u32) -> GameTunables {
    GameTunables {
        waves: WaveConfig {
            countdown_secs,
            end_game_debounce_ms: 500,
            game_over_settle_ms: 2_000,
            ..default()
        },
        ..default()
    }
}

fn enemy_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, With<Enemy>>();
    query.iter(app.world()).count()
}

fn phase(app: &App) -> DirectorPhase {
    app.world().resource::<WaveDirector>().phase()
}

fn start_game(app: &mut App) -> game::character::player::PlayerId {
    let id = join(app, 1, "ana");
    load_arena(app);
    run_ticks(app, 20);
    assert_eq!(phase(app), DirectorPhase::Active);
    id
}

#[test]
fn countdown_leads_into_the_first_wave() {
    let mut app = test_app(tunables(2));
    let id = join(&mut app, 1, "ana");
    load_arena(&mut app);
    assert_eq!(phase(&app), DirectorPhase::Countdown);

    run_ticks(&mut app, 30);

    let director = app.world().resource::<WaveDirector>();
    assert_eq!(director.phase(), DirectorPhase::Active);
    assert_eq!(director.state().wave_number, 1);
    assert!(enemy_count(&mut app) >= 1);

    let outbox = app.world().resource::<Outbox>();
    let payloads = outbox.payloads_for(id);
    assert!(payloads.contains(&&UiMessage::Countdown { seconds: 1 }));
    assert!(payloads.contains(&&UiMessage::GameStart));
    assert!(payloads.contains(&&UiMessage::Wave { wave: 1 }));
    assert!(outbox.chat.iter().any(|line| line.text == "Wave 1 has begun"));
}

#[test]
fn everyone_down_ends_the_game_and_respawns_after_the_settle_delay() {
    let mut app = test_app(tunables(1));
    let id = start_game(&mut app);

    let entity = player_entity(&mut app, id);
    app.world_mut()
        .get_mut::<PlayerCombatState>(entity)
        .expect("combat state")
        .take_damage(1_000.0, 0);
    send(&mut app, PlayerDownedChanged::new(id, true));
    run_ticks(&mut app, 10);

    assert_eq!(phase(&app), DirectorPhase::GameOver);
    assert_eq!(enemy_count(&mut app), 0);
    assert!(!app.world().get::<Player>(entity).expect("player").spawned);
    {
        let outbox = app.world().resource::<Outbox>();
        let payloads = outbox.payloads_for(id);
        assert!(payloads.contains(&&UiMessage::GameOver { wave: 1 }));
        assert!(payloads
            .iter()
            .any(|payload| matches!(payload, UiMessage::Scoreboard { wave: 1, .. })));
    }

    run_ticks(&mut app, 25);

    assert_ne!(phase(&app), DirectorPhase::GameOver);
    assert!(app.world().get::<Player>(entity).expect("player").spawned);
    let state = combat_state(&mut app, id);
    assert!(!state.downed);
    assert_eq!(state.health, state.max_health);
    assert_eq!(state.downs, 0);
}

#[test]
fn a_standing_player_keeps_the_game_running() {
    let mut app = test_app(tunables(1));
    let downed = start_game(&mut app);
    let standing = join(&mut app, 2, "bo");

    let entity = player_entity(&mut app, downed);
    app.world_mut()
        .get_mut::<PlayerCombatState>(entity)
        .expect("combat state")
        .take_damage(1_000.0, 0);
    send(&mut app, PlayerDownedChanged::new(downed, true));
    run_ticks(&mut app, 10);

    assert_eq!(phase(&app), DirectorPhase::Active);
    assert!(!combat_state(&mut app, standing).downed);
}

#[test]
fn end_game_request_stops_an_active_game() {
    let mut app = test_app(tunables(1));
    start_game(&mut app);

    send(&mut app, EndGameRequest);
    app.update();

    assert_eq!(phase(&app), DirectorPhase::GameOver);
    assert_eq!(app.world().resource::<WaveDirector>().state().wave_number, 0);
}

#[test]
fn buying_a_barrier_unlocks_its_spawn_area() {
    let mut app = test_app(tunables(30));
    let id = join(&mut app, 1, "ana");
    load_arena(&mut app);

    let entity = player_entity(&mut app, id);
    app.world_mut()
        .get_mut::<PlayerCombatState>(entity)
        .expect("combat state")
        .add_money(1_000.0);

    send(
        &mut app,
        PurchaseRequest {
            player: id,
            item_id: "cellar-door".into(),
        },
    );
    app.update();

    let director = app.world().resource::<WaveDirector>();
    assert!(director.state().is_unlocked("cellar"));
    assert_eq!(combat_state(&mut app, id).money, 250.0);
    let outbox = app.world().resource::<Outbox>();
    assert!(outbox
        .chat
        .iter()
        .any(|line| line.text.contains("opened the Cellar Door")));
}

#[test]
fn ending_the_game_kills_enemies_without_paying_anyone() {
    let mut app = test_app(tunables(1));
    let id = start_game(&mut app);
    assert!(enemy_count(&mut app) >= 1);
    let before = combat_state(&mut app, id);
    app.world_mut().resource_mut::<Outbox>().sounds.clear();

    send(&mut app, EndGameRequest);
    app.update();

    assert_eq!(enemy_count(&mut app), 0);
    let after = combat_state(&mut app, id);
    assert_eq!(after.money, before.money);
    assert_eq!(after.kills, before.kills);
    assert_eq!(after.score, before.score);

    assert!(app.world().resource::<DeathEffects>().active() > 0);
    let outbox = app.world().resource::<Outbox>();
    assert!(outbox
        .sounds
        .iter()
        .any(|sound| sound.0.uri.ends_with("zombie-death.mp3")));
}

#[test]
fn reloading_the_arena_during_game_over_brings_players_back() {
    let mut app = test_app(tunables(1));
    let id = start_game(&mut app);
    let entity = player_entity(&mut app, id);

    send(&mut app, EndGameRequest);
    app.update();
    assert!(!app.world().get::<Player>(entity).expect("player").spawned);

    send(&mut app, UnloadArena);
    app.update();
    load_arena(&mut app);
    assert!(app.world().get::<Player>(entity).expect("player").spawned);

    run_ticks(&mut app, 15);
    assert_eq!(phase(&app), DirectorPhase::Active);
    assert!(app.world().get::<Player>(entity).expect("player").spawned);

    let mut brains = app.world_mut().query::<&EnemyBrain>();
    assert!(brains
        .iter(app.world())
        .any(|brain| brain.target == Some(id)));
}
