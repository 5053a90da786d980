//! Stand-in host for soak runs: bots join, shoot the nearest enemy, revive
//! each other and buy barriers. Raycasts and path searches are answered
//! with cheap geometry instead of physics.

use bevy::prelude::*;
use game::{
    audio::AudioPool,
    character::{
        enemy::{
            ai::{PathfindFinished, PathfindOutcome, PathfindRequest},
            Enemy, EnemyInstance,
        },
        health::HitReport,
        player::{Player, PlayerCombatState, PlayerId, PlayerJoined, ReviveRequest},
        WorldPosition,
    },
    config::GameTunables,
    core::SessionRng,
    effects::DeathEffects,
    shop::PurchaseRequest,
    system_set::GameSystemSet,
    ui::{scoreboard::build_scoreboard, ChatLine, ChatTarget, UiPush},
    waves::{Arena, LoadArena, SpawnPoint, WaveDirector},
    weapons::{
        systems::{RaycastRequest, ReloadInput, TriggerInput},
        Gun, TriggerState,
    },
};
use rand::Rng;
use utils::frame::TickCount;

const EYE_HEIGHT: f32 = 1.6;
const BODY_RADIUS: f32 = 0.6;
const BODY_HEIGHT: f32 = 2.0;
const HEAD_AIM_HEIGHT: f32 = 1.7;
const BODY_AIM_HEIGHT: f32 = 1.1;
const HEADSHOT_AIM_CHANCE: f64 = 0.25;
/// Furthest an enemy travels per answered path search.
const PATH_STEP: f32 = 6.0;
const REVIVE_EVERY_TICKS: u64 = 40;

pub struct BotSimPlugin {
    pub players: usize,
}

#[derive(Resource, Debug, Clone, Copy)]
struct BotRoster {
    count: usize,
}

impl Plugin for BotSimPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(BotRoster {
            count: self.players,
        });
        app.add_systems(Startup, join_bots_system);
        app.add_systems(
            Update,
            (bot_trigger_system, bot_support_system)
                .after(GameSystemSet::Lobby)
                .before(GameSystemSet::Input),
        );
        app.add_systems(
            Update,
            resolve_raycasts_system
                .after(GameSystemSet::Input)
                .before(GameSystemSet::Combat),
        );
        app.add_systems(Update, answer_pathfinds_system.after(GameSystemSet::EnemyAi));
        app.add_systems(Update, log_outbound_system.after(GameSystemSet::Presentation));
    }
}

/// Square courtyard map: a few spawn points in the starting area and more
/// behind each barrier.
pub fn default_arena() -> Arena {
    let point = |x: f32, z: f32, area: &str| SpawnPoint {
        position: Vec3::new(x, 0.0, z),
        area_id: area.to_string(),
    };
    Arena {
        spawn_points: vec![
            point(20.0, 0.0, "start"),
            point(-20.0, 0.0, "start"),
            point(0.0, 20.0, "start"),
            point(0.0, -20.0, "start"),
            point(30.0, 30.0, "cellar"),
            point(-30.0, 30.0, "cellar"),
            point(35.0, -35.0, "courtyard"),
            point(-35.0, -35.0, "courtyard"),
            point(0.0, 45.0, "rooftop"),
        ],
        player_spawn: Vec3::ZERO,
    }
}

fn join_bots_system(
    roster: Res<BotRoster>,
    mut joins: MessageWriter<PlayerJoined>,
    mut arenas: MessageWriter<LoadArena>,
) {
    joins.write_batch((0..roster.count).map(|i| PlayerJoined {
        id: PlayerId(i as u64 + 1),
        name: format!("bot-{}", i + 1),
    }));
    arenas.write(LoadArena(default_arena()));
}

fn bot_trigger_system(
    tick: Res<TickCount>,
    mut rng: ResMut<SessionRng>,
    players: Query<(&Player, &PlayerCombatState, &WorldPosition, &Gun)>,
    enemies: Query<&WorldPosition, (With<Enemy>, Without<Player>)>,
    mut triggers: MessageWriter<TriggerInput>,
    mut reloads: MessageWriter<ReloadInput>,
) {
    for (player, state, position, gun) in players.iter() {
        if !player.spawned || state.downed {
            continue;
        }
        if gun.magazine == 0 && !gun.is_reloading() {
            reloads.write(ReloadInput { player: player.id });
            continue;
        }

        let Some(target) = enemies
            .iter()
            .map(|enemy| enemy.0)
            .filter(|enemy| enemy.distance(position.0) <= gun.config.range)
            .min_by(|a, b| a.distance_squared(position.0).total_cmp(&b.distance_squared(position.0)))
        else {
            continue;
        };

        let height = if rng.0.gen_bool(HEADSHOT_AIM_CHANCE) {
            HEAD_AIM_HEIGHT
        } else {
            BODY_AIM_HEIGHT
        };
        let origin = position.0 + Vec3::Y * EYE_HEIGHT;
        triggers.write(TriggerInput {
            player: player.id,
            trigger: TriggerState {
                pressed: tick.tick % 2 == 0,
                held: true,
            },
            origin,
            forward: (target + Vec3::Y * height) - origin,
        });
    }
}

fn bot_support_system(
    tick: Res<TickCount>,
    tunables: Res<GameTunables>,
    director: Res<WaveDirector>,
    players: Query<(&Player, &PlayerCombatState)>,
    mut revives: MessageWriter<ReviveRequest>,
    mut purchases: MessageWriter<PurchaseRequest>,
) {
    let standing: Vec<_> = players
        .iter()
        .filter(|(player, state)| player.spawned && !state.downed)
        .collect();

    if tick.tick % REVIVE_EVERY_TICKS == 0 {
        for (downed, _) in players.iter().filter(|(p, s)| p.spawned && s.downed) {
            if let Some((reviver, _)) = standing.first() {
                revives.write(ReviveRequest {
                    reviver: reviver.id,
                    target: downed.id,
                });
            }
        }
    }

    let next_barrier = tunables
        .shop
        .barriers
        .iter()
        .filter(|barrier| !director.state().is_unlocked(&barrier.area_id))
        .min_by(|a, b| a.cost.total_cmp(&b.cost));
    if let Some(barrier) = next_barrier {
        if let Some((buyer, _)) = standing.iter().find(|(_, state)| state.money >= barrier.cost) {
            purchases.write(PurchaseRequest {
                player: buyer.id,
                item_id: barrier.id.clone(),
            });
        }
    }
}

/// Closest point along the ray where it passes through an upright cylinder
/// standing at `base`. Returns the distance along the ray and the point.
pub fn ray_hits_body(origin: Vec3, direction: Vec3, range: f32, base: Vec3) -> Option<(f32, Vec3)> {
    let direction = direction.try_normalize()?;
    let flat = Vec2::new(direction.x, direction.z);
    let flat_len_sq = flat.length_squared();
    if flat_len_sq <= f32::EPSILON {
        return None;
    }

    let to_base = Vec2::new(base.x - origin.x, base.z - origin.z);
    let t = to_base.dot(flat) / flat_len_sq;
    if t < 0.0 || t > range {
        return None;
    }

    let point = origin + direction * t;
    let offset = point - base;
    let inside = Vec2::new(offset.x, offset.z).length() <= BODY_RADIUS
        && (0.0..=BODY_HEIGHT).contains(&offset.y);
    inside.then_some((t, point))
}

fn resolve_raycasts_system(
    mut raycasts: MessageReader<RaycastRequest>,
    enemies: Query<(Entity, &WorldPosition, &EnemyInstance), With<Enemy>>,
    mut hits: MessageWriter<HitReport>,
) {
    for ray in raycasts.read() {
        let nearest = enemies
            .iter()
            .filter(|(_, _, instance)| !instance.dead)
            .filter_map(|(entity, position, _)| {
                ray_hits_body(ray.origin, ray.direction, ray.range, position.0)
                    .map(|(t, point)| (entity, t, point))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, distance, point)) = nearest {
            hits.write(HitReport {
                shooter: ray.shooter,
                target,
                damage: ray.damage,
                hit_point: Some(point),
                distance,
                headshot: None,
            });
        }
    }
}

fn answer_pathfinds_system(
    mut requests: MessageReader<PathfindRequest>,
    mut finished: MessageWriter<PathfindFinished>,
) {
    for request in requests.read() {
        let step = (request.goal - request.from).clamp_length_max(PATH_STEP);
        finished.write(PathfindFinished {
            enemy: request.enemy,
            outcome: PathfindOutcome::Completed,
            position: Some(request.from + step),
        });
    }
}

fn log_outbound_system(mut chat: MessageReader<ChatLine>, mut ui: MessageReader<UiPush>) {
    for line in chat.read() {
        match line.target {
            ChatTarget::All => info!("chat{{all color={}}} {}", line.color.as_hex(), line.text),
            ChatTarget::Player(id) => {
                info!("chat{{to={} color={}}} {}", id, line.color.as_hex(), line.text)
            }
        }
    }
    for push in ui.read() {
        match push.to_json() {
            Ok(json) => trace!("ui{{to={}}} {}", push.player, json),
            Err(error) => warn!("ui{{to={} serialize_failed={}}}", push.player, error),
        }
    }
}

/// Final standings of a run.
pub fn log_summary(world: &mut World) {
    let wave = world.resource::<WaveDirector>().state().wave_number;
    let phase = world.resource::<WaveDirector>().phase();
    info!("summary{{wave={} phase={:?}}}", wave, phase);

    let mut players = world.query::<(&Player, &PlayerCombatState)>();
    for row in build_scoreboard(players.iter(world)) {
        info!(
            "summary{{player={} score={} kills={} headshots={} downs={} revives={} money={}}}",
            row.name, row.score, row.kills, row.headshots, row.downs, row.revives, row.money
        );
    }

    let audio = world.resource::<AudioPool>();
    let effects = world.resource::<DeathEffects>();
    info!(
        "summary{{sounds_dropped={} particles_dropped={} particle_pool={}}}",
        audio.dropped(),
        effects.dropped(),
        effects.allocated()
    );
}
