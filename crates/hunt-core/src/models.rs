use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Parsed reports ────────────────────────────────────────────────────────────

/// One player's figures from a hunt analyzer report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// Character name, with any `" (Leader)"` marker stripped.
    pub name: String,
    pub loot: u64,
    pub supplies: u64,
    /// `loot - supplies` as printed by the game client; may be negative.
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<u64>,
}

impl PlayerStat {
    /// Damage dealt, with an absent line counted as zero.
    pub fn damage_or_zero(&self) -> u64 {
        self.damage.unwrap_or(0)
    }

    /// Healing done, with an absent line counted as zero.
    pub fn healing_or_zero(&self) -> u64 {
        self.healing.unwrap_or(0)
    }
}

/// A party member's figures without the name, used as the value of
/// [`PartySessionRecord::party_characters`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStats {
    pub loot: u64,
    pub supplies: u64,
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<u64>,
}

impl From<&PlayerStat> for MemberStats {
    fn from(p: &PlayerStat) -> Self {
        MemberStats {
            loot: p.loot,
            supplies: p.supplies,
            balance: p.balance,
            damage: p.damage,
            healing: p.healing,
        }
    }
}

/// A solo (or loot-split) hunt session as copied from the party analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// `"<date>, <time>"` of the session start.
    pub date_from: String,
    /// `"<date>, <time>"` of the session end.
    pub date_to: String,
    /// Session length as printed, e.g. `"01:30h"`.
    pub duration: String,
    pub loot_type: String,
    pub total_loot: u64,
    pub total_supplies: u64,
    pub total_balance: i64,
    /// Players in order of appearance; never empty.
    pub players: Vec<PlayerStat>,
}

/// A party hunt as submitted on behalf of one acting character.
///
/// The acting character's own entry is removed from `party_characters`;
/// `party_size` still counts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySessionRecord {
    pub date: String,
    pub start_hour: String,
    pub end_hour: String,
    pub total_loot: u64,
    pub total_supplies: u64,
    pub balance: i64,
    pub party_size: usize,
    pub party_characters: BTreeMap<String, MemberStats>,
}

/// The individual XP analyzer report of a single character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpReport {
    /// Session date, `YYYY-MM-DD`.
    pub data: String,
    pub start_hour: String,
    pub end_hour: String,
    pub raw_xp_gain: u64,
    pub xp_gain: u64,
    pub raw_xp_per_hour: u64,
    pub xp_per_hour: u64,
    pub loot: u64,
    pub supplies: u64,
    pub damage: u64,
    pub dps: u64,
    pub healing: u64,
    pub healing_per_hour: u64,
}

impl XpReport {
    /// Loot minus supplies, saturating at the `i64` bounds.
    pub fn balance(&self) -> i64 {
        net_balance(self.loot, self.supplies)
    }
}

fn net_balance(loot: u64, supplies: u64) -> i64 {
    let loot = i64::try_from(loot).unwrap_or(i64::MAX);
    let supplies = i64::try_from(supplies).unwrap_or(i64::MAX);
    loot.saturating_sub(supplies)
}

// ── Settlement & classification ───────────────────────────────────────────────

/// A single transfer that moves a player towards the fair share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub from: String,
    pub to: String,
    /// Always strictly positive.
    pub amount: u64,
}

/// Coarse performance bucket used to pick flavour text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "tier_s")]
    S,
    #[serde(rename = "tier_a")]
    A,
    #[serde(rename = "tier_b")]
    B,
}

impl Tier {
    /// The key used in the comment pool, e.g. `"tier_s"`.
    pub fn key(self) -> &'static str {
        match self {
            Tier::S => "tier_s",
            Tier::A => "tier_a",
            Tier::B => "tier_b",
        }
    }
}

/// Comment categories of the flavour-text pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighDamage,
    LowDamage,
    HighHeal,
    LowProfit,
}

/// Per-player performance labels. Fields are independent: a player may be
/// both the top damage dealer and the lowest balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_class: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal_class: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_class: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_comment: Option<String>,
}

impl Classification {
    /// `true` when no category applies to the player.
    pub fn is_empty(&self) -> bool {
        self.damage_class.is_none() && self.heal_class.is_none() && self.balance_class.is_none()
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

/// A character known to the caller, used to resolve the acting character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub pid: String,
    pub name: String,
    #[serde(default)]
    pub vocation: String,
    #[serde(default)]
    pub min_lvl: u32,
    #[serde(default)]
    pub max_lvl: u32,
}

// ── Persisted sessions (timeline input) ───────────────────────────────────────

/// A hunting ground reference as stored with a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntingGround {
    pub pid: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A stored individual session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualHuntSession {
    pub pid: String,
    pub hunting_ground: Option<HuntingGround>,
    pub start_hour: String,
    pub end_hour: String,
    pub raw_xp_gain: u64,
    pub xp_gain: u64,
    pub raw_xp_per_hour: u64,
    pub xp_per_hour: u64,
    pub loot: u64,
    pub supplies: u64,
    pub damage: u64,
    pub dps: u64,
    pub healing: u64,
    pub healing_per_hour: u64,
}

impl IndividualHuntSession {
    /// Net profit of the session, saturating at the `i64` bounds.
    pub fn balance(&self) -> i64 {
        net_balance(self.loot, self.supplies)
    }
}

/// One member of a stored party session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyCharacterDetails {
    pub character_name: String,
    pub character_pid: String,
    pub loot: u64,
    pub supplies: u64,
    pub balance: i64,
    pub damage: u64,
    pub healing: u64,
}

/// A stored party session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyHuntSession {
    pub pid: String,
    pub hunting_ground: Option<HuntingGround>,
    pub start_hour: String,
    pub end_hour: String,
    pub total_loot: u64,
    pub total_supplies: u64,
    pub balance: i64,
    pub party_size: u32,
    pub party_characters: Vec<PartyCharacterDetails>,
}

/// The API sends either a single object or an array for session lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// View the contents as a slice regardless of shape.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// All sessions recorded at one hunting ground on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntingGroundSessions {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_data: Option<OneOrMany<IndividualHuntSession>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_hunt_data: Option<OneOrMany<PartyHuntSession>>,
}

impl HuntingGroundSessions {
    /// Individual sessions, empty when none were recorded.
    pub fn individual_sessions(&self) -> &[IndividualHuntSession] {
        self.individual_data.as_ref().map_or(&[], |d| d.as_slice())
    }

    /// Party sessions, empty when none were recorded.
    pub fn party_sessions(&self) -> &[PartyHuntSession] {
        self.party_hunt_data.as_ref().map_or(&[], |d| d.as_slice())
    }
}

/// One calendar day of a character's hunting history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntSessionsByDate {
    pub date: NaiveDate,
    pub hunting_grounds: Vec<HuntingGroundSessions>,
}

// ── Timeline output ───────────────────────────────────────────────────────────

/// Daily totals for one character, ready for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub xp: u64,
    pub balance: i64,
    pub damage: u64,
    pub hunting_grounds: BTreeSet<String>,
    pub damage_by_ground: BTreeMap<String, u64>,
}

impl DailyAggregate {
    /// An empty aggregate for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            xp: 0,
            balance: 0,
            damage: 0,
            hunting_grounds: BTreeSet::new(),
            damage_by_ground: BTreeMap::new(),
        }
    }

    /// Ground names sorted and joined with `", "` for display.
    pub fn hunting_grounds_label(&self) -> String {
        self.hunting_grounds
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Damage restricted to `selected` grounds; an empty selection means the
    /// day's total.
    pub fn damage_for_grounds(&self, selected: &[String]) -> u64 {
        if selected.is_empty() {
            return self.damage;
        }
        self.damage_by_ground
            .iter()
            .filter(|(ground, _)| selected.iter().any(|s| s == *ground))
            .fold(0u64, |acc, (_, dmg)| acc.saturating_add(*dmg))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
