//! Performance classification over a parsed roster.
//!
//! Tier assignment ([`assign_tiers`]) is deterministic; only comment
//! selection in [`classify`] consumes randomness, through the injected RNG.

use std::collections::BTreeMap;

use hunt_core::models::{Category, Classification, PlayerStat, Tier};
use rand::Rng;

use crate::comments::CommentPool;

const TOP_SHARE_S: f64 = 0.35;
const LOW_SHARE_S: f64 = 0.10;
const LOW_SHARE_A: f64 = 0.20;
const LOSS_RATIO_S: f64 = 1.5;
const LOSS_RATIO_A: f64 = 0.8;

/// Classify every player and attach one comment per assigned tier.
///
/// Every player has an entry; players that fit no category get an empty
/// [`Classification`]. An empty pool yields empty comments.
pub fn classify<R: Rng + ?Sized>(
    players: &[PlayerStat],
    pool: &CommentPool,
    rng: &mut R,
) -> BTreeMap<String, Classification> {
    let mut out = assign_tiers(players);

    // Roster order keeps seeded runs reproducible.
    for player in players {
        let Some(class) = out.get_mut(&player.name) else {
            continue;
        };
        if let Some(tier) = class.damage_class {
            let category = if is_top(player, players, PlayerStat::damage_or_zero) {
                Category::HighDamage
            } else {
                Category::LowDamage
            };
            class.damage_comment = Some(pool.pick(category, tier, rng));
        }
        if let Some(tier) = class.heal_class {
            class.heal_comment = Some(pool.pick(Category::HighHeal, tier, rng));
        }
        if let Some(tier) = class.balance_class {
            class.balance_comment = Some(pool.pick(Category::LowProfit, tier, rng));
        }
    }

    out
}

/// Tier assignment without comments.
pub fn assign_tiers(players: &[PlayerStat]) -> BTreeMap<String, Classification> {
    let mut out: BTreeMap<String, Classification> = players
        .iter()
        .map(|p| (p.name.clone(), Classification::default()))
        .collect();
    if players.is_empty() {
        return out;
    }

    let total_damage = saturating_total(players.iter().map(PlayerStat::damage_or_zero));
    let total_healing = saturating_total(players.iter().map(PlayerStat::healing_or_zero));
    let total_loot = saturating_total(players.iter().map(|p| p.loot));

    // ── Damage ────────────────────────────────────────────────────────────────
    let top_damage = if total_damage > 0 {
        first_max_by(players, PlayerStat::damage_or_zero)
    } else {
        None
    };

    if let Some(top) = top_damage {
        let share = share_of(players[top].damage_or_zero(), total_damage);
        set(&mut out, &players[top].name, |c| {
            c.damage_class = Some(if share >= TOP_SHARE_S { Tier::S } else { Tier::A })
        });
    }

    // A dealer tied for the maximum is never the lowest.
    let max_damage = players.iter().map(PlayerStat::damage_or_zero).max();
    let min_nonzero = players
        .iter()
        .map(PlayerStat::damage_or_zero)
        .filter(|d| *d > 0)
        .min()
        .filter(|min| Some(*min) != max_damage);
    if let Some(min) = min_nonzero {
        let lowest = players.iter().find(|p| p.damage_or_zero() == min);
        if let Some(player) = lowest {
            let share = share_of(min, total_damage);
            let tier = if share < LOW_SHARE_S {
                Tier::S
            } else if share < LOW_SHARE_A {
                Tier::A
            } else {
                Tier::B
            };
            set(&mut out, &player.name, |c| c.damage_class = Some(tier));
        }
    }

    // ── Healing ───────────────────────────────────────────────────────────────
    if total_healing > 0 {
        if let Some(top) = first_max_by(players, PlayerStat::healing_or_zero) {
            let share = share_of(players[top].healing_or_zero(), total_healing);
            set(&mut out, &players[top].name, |c| {
                c.heal_class = Some(if share >= TOP_SHARE_S { Tier::S } else { Tier::A })
            });
        }
    }

    // ── Balance ───────────────────────────────────────────────────────────────
    let lowest_balance = players
        .iter()
        .enumerate()
        .min_by_key(|(i, p)| (p.balance, *i))
        .map(|(_, p)| p);
    if let Some(player) = lowest_balance.filter(|p| p.balance < 0) {
        let average_loot = total_loot as f64 / players.len() as f64;
        let ratio = if average_loot > 0.0 {
            player.balance.unsigned_abs() as f64 / average_loot
        } else {
            f64::INFINITY
        };
        let tier = if ratio > LOSS_RATIO_S {
            Tier::S
        } else if ratio > LOSS_RATIO_A {
            Tier::A
        } else {
            Tier::B
        };
        set(&mut out, &player.name, |c| c.balance_class = Some(tier));
    }

    out
}

/// Index of the first player holding the maximum of `metric`.
fn first_max_by(players: &[PlayerStat], metric: fn(&PlayerStat) -> u64) -> Option<usize> {
    let max = players.iter().map(metric).max()?;
    players.iter().position(|p| metric(p) == max)
}

fn is_top(player: &PlayerStat, players: &[PlayerStat], metric: fn(&PlayerStat) -> u64) -> bool {
    first_max_by(players, metric).is_some_and(|i| players[i].name == player.name)
}

fn share_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

fn set(
    out: &mut BTreeMap<String, Classification>,
    name: &str,
    update: impl FnOnce(&mut Classification),
) {
    if let Some(class) = out.get_mut(name) {
        update(class);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
