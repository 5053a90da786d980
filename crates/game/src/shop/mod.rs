//! Things players spend money on: barriers that open new spawn areas, and
//! guns hanging on walls.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    audio::{PlaySound, SoundRequest},
    character::{
        player::{Player, PlayerCombatState, PlayerId},
        WorldPosition,
    },
    config::GameTunables,
    ui::{ChatColor, ChatLine},
    waves::WaveDirector,
    weapons::{Gun, GunConfig},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarrierOffer {
    pub id: String,
    pub name: String,
    /// Spawn area opened by removing this barrier.
    pub area_id: String,
    pub cost: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallWeaponOffer {
    pub id: String,
    pub cost: f32,
    pub gun: GunConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopCatalogue {
    pub barriers: Vec<BarrierOffer>,
    pub wall_weapons: Vec<WallWeaponOffer>,
}

impl Default for ShopCatalogue {
    fn default() -> Self {
        let barrier = |id: &str, name: &str, area_id: &str, cost: f32| BarrierOffer {
            id: id.into(),
            name: name.into(),
            area_id: area_id.into(),
            cost,
        };
        Self {
            barriers: vec![
                barrier("cellar-door", "Cellar Door", "cellar", 750.0),
                barrier("courtyard-gate", "Courtyard Gate", "courtyard", 1_000.0),
                barrier("rooftop-stairs", "Rooftop Stairs", "rooftop", 1_500.0),
            ],
            wall_weapons: vec![
                WallWeaponOffer {
                    id: "shotgun-wall".into(),
                    cost: 500.0,
                    gun: GunConfig::shotgun(),
                },
                WallWeaponOffer {
                    id: "ar15-wall".into(),
                    cost: 1_200.0,
                    gun: GunConfig::rifle(),
                },
            ],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PurchaseError {
    #[error("not enough money: {cost:.0} needed, you have {money:.0}")]
    InsufficientFunds { cost: f32, money: f32 },
    #[error("you already have the {0}")]
    AlreadyEquipped(String),
    #[error("the {0} is already open")]
    AlreadyUnlocked(String),
    #[error("nothing to buy here ({0})")]
    UnknownItem(String),
    #[error("you cannot buy anything while down")]
    PlayerDowned,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Purchase {
    Barrier { name: String, area_id: String },
    Weapon { name: String },
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub player: PlayerId,
    pub item_id: String,
}

impl ShopCatalogue {
    pub fn barrier(&self, id: &str) -> Option<&BarrierOffer> {
        self.barriers.iter().find(|b| b.id == id)
    }

    pub fn wall_weapon(&self, id: &str) -> Option<&WallWeaponOffer> {
        self.wall_weapons.iter().find(|w| w.id == id)
    }

    /// Checks the purchase, charges the player and equips bought guns.
    /// Unlocking the area of a bought barrier is left to the caller.
    pub fn purchase(
        &self,
        item_id: &str,
        state: &mut PlayerCombatState,
        gun: &mut Gun,
        is_unlocked: impl Fn(&str) -> bool,
    ) -> Result<Purchase, PurchaseError> {
        if state.downed {
            return Err(PurchaseError::PlayerDowned);
        }

        if let Some(barrier) = self.barrier(item_id) {
            if is_unlocked(&barrier.area_id) {
                return Err(PurchaseError::AlreadyUnlocked(barrier.name.clone()));
            }
            charge(state, barrier.cost)?;
            return Ok(Purchase::Barrier {
                name: barrier.name.clone(),
                area_id: barrier.area_id.clone(),
            });
        }

        if let Some(offer) = self.wall_weapon(item_id) {
            if gun.config.id == offer.gun.id {
                return Err(PurchaseError::AlreadyEquipped(offer.gun.name.clone()));
            }
            charge(state, offer.cost)?;
            *gun = Gun::new(offer.gun.clone());
            return Ok(Purchase::Weapon {
                name: offer.gun.name.clone(),
            });
        }

        Err(PurchaseError::UnknownItem(item_id.to_string()))
    }
}

fn charge(state: &mut PlayerCombatState, cost: f32) -> Result<(), PurchaseError> {
    if state.spend(cost) {
        Ok(())
    } else {
        Err(PurchaseError::InsufficientFunds {
            cost,
            money: state.money,
        })
    }
}

pub fn purchase_system(
    tunables: Res<GameTunables>,
    mut director: ResMut<WaveDirector>,
    mut requests: MessageReader<PurchaseRequest>,
    mut players: Query<(&Player, &mut PlayerCombatState, &mut Gun, &WorldPosition)>,
    mut chat: MessageWriter<ChatLine>,
    mut sounds: MessageWriter<PlaySound>,
) {
    for request in requests.read() {
        let Some((player, mut state, mut gun, position)) = players
            .iter_mut()
            .find(|(player, ..)| player.id == request.player && player.spawned)
        else {
            continue;
        };

        let result = tunables.shop.purchase(&request.item_id, &mut state, &mut gun, |area| {
            director.state().is_unlocked(area)
        });

        match result {
            Ok(Purchase::Barrier { name, area_id }) => {
                director.unlock_area(&area_id);
                info!("shop{{barrier player={} area={}}}", player.id, area_id);
                chat.write(ChatLine::broadcast(
                    format!("{} opened the {}! New area unlocked", player.name, name),
                    ChatColor::Success,
                ));
                sounds.write(PlaySound(
                    SoundRequest::new("audio/sfx/purchase.mp3").at(position.0),
                ));
            }
            Ok(Purchase::Weapon { name }) => {
                info!("shop{{weapon player={} gun={}}}", player.id, name);
                chat.write(ChatLine::to_player(
                    player.id,
                    format!("You bought the {name}"),
                    ChatColor::Success,
                ));
                sounds.write(PlaySound(
                    SoundRequest::new("audio/sfx/purchase.mp3").at(position.0),
                ));
            }
            Err(error) => {
                debug!("shop{{refused player={} reason={}}}", player.id, error);
                chat.write(ChatLine::error(player.id, &error));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::player::PlayerConfig;

    fn rich_player(money: f32) -> PlayerCombatState {
        let mut state = PlayerCombatState::new(&PlayerConfig::default());
        state.add_money(money);
        state
    }

    #[test]
    fn barrier_purchase_charges_and_reports_area() {
        let shop = ShopCatalogue::default();
        let mut state = rich_player(800.0);
        let mut gun = Gun::new(GunConfig::pistol());

        let bought = shop.purchase("cellar-door", &mut state, &mut gun, |_| false);
        assert_eq!(
            bought,
            Ok(Purchase::Barrier {
                name: "Cellar Door".into(),
                area_id: "cellar".into()
            })
        );
        assert_eq!(state.money, 50.0);

        assert_eq!(
            shop.purchase("cellar-door", &mut state, &mut gun, |area| area == "cellar"),
            Err(PurchaseError::AlreadyUnlocked("Cellar Door".into()))
        );
    }

    #[test]
    fn wall_weapon_equips_and_refuses_duplicates() {
        let shop = ShopCatalogue::default();
        let mut state = rich_player(1_000.0);
        let mut gun = Gun::new(GunConfig::pistol());

        assert!(shop.purchase("shotgun-wall", &mut state, &mut gun, |_| false).is_ok());
        assert_eq!(gun.config.id, "shotgun");
        assert_eq!(gun.magazine, gun.config.magazine_size);

        assert_eq!(
            shop.purchase("shotgun-wall", &mut state, &mut gun, |_| false),
            Err(PurchaseError::AlreadyEquipped("Shotgun".into()))
        );
        assert_eq!(state.money, 500.0);
    }

    #[test]
    fn refusals_leave_money_untouched() {
        let shop = ShopCatalogue::default();
        let mut state = rich_player(100.0);
        let mut gun = Gun::new(GunConfig::pistol());

        assert!(matches!(
            shop.purchase("ar15-wall", &mut state, &mut gun, |_| false),
            Err(PurchaseError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            shop.purchase("jukebox", &mut state, &mut gun, |_| false),
            Err(PurchaseError::UnknownItem(_))
        ));
        state.take_damage(500.0, 0);
        assert_eq!(
            shop.purchase("cellar-door", &mut state, &mut gun, |_| false),
            Err(PurchaseError::PlayerDowned)
        );
        assert_eq!(state.money, 100.0);
        assert_eq!(gun.config.id, "pistol");
    }
}
