//! Per-day aggregation of a character's hunting history.
//!
//! Folds stored individual and party sessions into one [`DailyAggregate`]
//! per date, sorted ascending, for charting XP, balance and damage.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use hunt_core::models::{
    DailyAggregate, HuntSessionsByDate, HuntingGroundSessions, PartyCharacterDetails,
    PartyHuntSession,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── TimelineAggregator ────────────────────────────────────────────────────────

/// Aggregates sessions from the point of view of one acting character.
#[derive(Debug, Clone)]
pub struct TimelineAggregator {
    /// Character pid, or name when no pid is known.
    character: String,
}

impl TimelineAggregator {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
        }
    }

    /// Build the daily series. Inputs are only read; repeated calls on the
    /// same data return equal results.
    pub fn aggregate(&self, days: &[HuntSessionsByDate]) -> Timeline {
        let mut by_date: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();

        for day in days {
            let aggregate = by_date
                .entry(day.date)
                .or_insert_with(|| DailyAggregate::new(day.date));
            for ground in &day.hunting_grounds {
                self.add_ground(aggregate, ground);
            }
        }

        let days: Vec<DailyAggregate> = by_date.into_values().collect();
        debug!(
            "Aggregated {} day(s) of hunting for {}",
            days.len(),
            self.character
        );
        Timeline { days }
    }

    fn add_ground(&self, aggregate: &mut DailyAggregate, ground: &HuntingGroundSessions) {
        aggregate.hunting_grounds.insert(ground.name.clone());
        let ground_damage = aggregate
            .damage_by_ground
            .entry(ground.name.clone())
            .or_insert(0);

        let parties = ground.party_sessions();

        for session in ground.individual_sessions() {
            aggregate.xp = aggregate.xp.saturating_add(session.xp_gain);
            aggregate.damage = aggregate.damage.saturating_add(session.damage);
            *ground_damage = ground_damage.saturating_add(session.damage);
            // Party balance already covers this ground.
            if parties.is_empty() {
                aggregate.balance = aggregate.balance.saturating_add(session.balance());
            }
        }

        for party in parties {
            aggregate.balance = aggregate.balance.saturating_add(even_split(party));
            if let Some(member) = self.find_member(party) {
                aggregate.damage = aggregate.damage.saturating_add(member.damage);
                *ground_damage = ground_damage.saturating_add(member.damage);
            }
        }
    }

    /// The acting character's entry, by pid first, then by name.
    fn find_member<'p>(&self, party: &'p PartyHuntSession) -> Option<&'p PartyCharacterDetails> {
        party
            .party_characters
            .iter()
            .find(|m| !m.character_pid.is_empty() && m.character_pid == self.character)
            .or_else(|| {
                party
                    .party_characters
                    .iter()
                    .find(|m| m.character_name.eq_ignore_ascii_case(&self.character))
            })
    }
}

/// `floor(balance / party_size)`, with a zero size counted as one.
pub fn even_split(party: &PartyHuntSession) -> i64 {
    let size = i64::from(party.party_size.max(1));
    party.balance.div_euclid(size)
}

/// Aggregate `days` for `character` (pid or name).
pub fn aggregate(days: &[HuntSessionsByDate], character: &str) -> Vec<DailyAggregate> {
    TimelineAggregator::new(character).aggregate(days).days
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// The aggregated series, sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub days: Vec<DailyAggregate>,
}

/// Sums across a whole timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineTotals {
    pub days: usize,
    pub xp: u64,
    pub balance: i64,
    pub damage: u64,
}

impl Timeline {
    /// Every hunting ground that appears in the series.
    pub fn available_grounds(&self) -> BTreeSet<String> {
        self.days
            .iter()
            .flat_map(|d| d.hunting_grounds.iter().cloned())
            .collect()
    }

    pub fn totals(&self) -> TimelineTotals {
        self.days.iter().fold(
            TimelineTotals {
                days: self.days.len(),
                ..Default::default()
            },
            |mut acc, d| {
                acc.xp = acc.xp.saturating_add(d.xp);
                acc.balance = acc.balance.saturating_add(d.balance);
                acc.damage = acc.damage.saturating_add(d.damage);
                acc
            },
        )
    }

    /// Damage per day restricted to `grounds`; empty means all grounds.
    pub fn damage_series(&self, grounds: &[String]) -> Vec<(NaiveDate, u64)> {
        self.days
            .iter()
            .map(|d| (d.date, d.damage_for_grounds(grounds)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
