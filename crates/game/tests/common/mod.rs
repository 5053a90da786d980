#![allow(dead_code)]

use std::time::Duration;

use bevy::{ecs::message::Messages, prelude::*, time::TimeUpdateStrategy};
use game::{
    audio::SoundStarted,
    character::player::{Player, PlayerCombatState, PlayerId, PlayerJoined},
    system_set::GameSystemSet,
    ui::{ChatLine, UiMessage, UiPush},
    waves::{Arena, LoadArena, SpawnPoint},
    GameTunables, HordeGamePlugin,
};

pub const TICK_MS: u64 = 100;

/// Everything the game sent out, in order.
#[derive(Resource, Default, Debug)]
pub struct Outbox {
    pub ui: Vec<UiPush>,
    pub chat: Vec<ChatLine>,
    pub sounds: Vec<SoundStarted>,
}

impl Outbox {
    pub fn payloads_for(&self, player: PlayerId) -> Vec<&UiMessage> {
        self.ui
            .iter()
            .filter(|push| push.player == player)
            .map(|push| &push.payload)
            .collect()
    }
}

fn collect_outbound_system(
    mut outbox: ResMut<Outbox>,
    mut ui: MessageReader<UiPush>,
    mut chat: MessageReader<ChatLine>,
    mut sounds: MessageReader<SoundStarted>,
) {
    outbox.ui.extend(ui.read().cloned());
    outbox.chat.extend(chat.read().cloned());
    outbox.sounds.extend(sounds.read().cloned());
}

pub fn test_app(tunables: GameTunables) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            TICK_MS,
        )))
        .add_plugins(HordeGamePlugin { tunables, seed: 7 })
        .init_resource::<Outbox>()
        .add_systems(
            Update,
            collect_outbound_system.after(GameSystemSet::Presentation),
        );
    app.finish();
    app.cleanup();
    app
}

pub fn send<M: Message>(app: &mut App, message: M) {
    app.world_mut().resource_mut::<Messages<M>>().write(message);
}

pub fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

pub fn arena() -> Arena {
    Arena {
        spawn_points: vec![
            SpawnPoint {
                position: Vec3::new(20.0, 0.0, 0.0),
                area_id: "start".into(),
            },
            SpawnPoint {
                position: Vec3::new(0.0, 0.0, 40.0),
                area_id: "cellar".into(),
            },
        ],
        player_spawn: Vec3::ZERO,
    }
}

pub fn join(app: &mut App, id: u64, name: &str) -> PlayerId {
    let id = PlayerId(id);
    send(
        app,
        PlayerJoined {
            id,
            name: name.into(),
        },
    );
    app.update();
    id
}

pub fn load_arena(app: &mut App) {
    send(app, LoadArena(arena()));
    app.update();
}

pub fn player_entity(app: &mut App, id: PlayerId) -> Entity {
    let mut query = app.world_mut().query::<(Entity, &Player)>();
    query
        .iter(app.world())
        .find(|(_, player)| player.id == id)
        .map(|(entity, _)| entity)
        .expect("player spawned")
}

pub fn combat_state(app: &mut App, id: PlayerId) -> PlayerCombatState {
    let entity = player_entity(app, id);
    app.world()
        .get::<PlayerCombatState>(entity)
        .cloned()
        .expect("combat state")
}
