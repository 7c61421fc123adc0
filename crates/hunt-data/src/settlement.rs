//! Loot-split settlement.
//!
//! Computes the transfers that bring every player to the fair share
//! `floor(total / players)`. The division remainder (0 to N-1 gold) is not
//! redistributed and stays with whichever payer is processed last.

use hunt_core::models::{Payment, PlayerStat};
use serde::{Deserialize, Serialize};

/// Anything that carries a player name and a signed balance.
pub trait Balanced {
    fn name(&self) -> &str;
    fn balance(&self) -> i64;
}

impl Balanced for PlayerStat {
    fn name(&self) -> &str {
        &self.name
    }

    fn balance(&self) -> i64 {
        self.balance
    }
}

/// A bare `{name, balance}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub name: String,
    pub balance: i64,
}

impl BalanceEntry {
    pub fn new(name: impl Into<String>, balance: i64) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

impl Balanced for BalanceEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn balance(&self) -> i64 {
        self.balance
    }
}

/// How far a player is from the fair share; positive means they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareDifference {
    pub name: String,
    pub balance: i64,
    pub difference: i64,
}

// ── SettlementEngine ──────────────────────────────────────────────────────────

/// Stateless greedy settlement.
pub struct SettlementEngine;

impl SettlementEngine {
    /// `floor(sum of balances / players)`, or `None` for an empty roster.
    pub fn fair_share<B: Balanced>(players: &[B]) -> Option<i64> {
        if players.is_empty() {
            return None;
        }
        let total: i128 = players.iter().map(|p| p.balance() as i128).sum();
        let share = total.div_euclid(players.len() as i128);
        // The mean of i64 values always fits in i64.
        Some(share as i64)
    }

    /// Compute the transfers that equalise `players` to the fair share.
    ///
    /// Payers (above the share) are served highest balance first, receivers
    /// (below the share) lowest balance first; equal balances keep roster
    /// order. Each payer pays the current receiver until either side is
    /// exhausted, so at most `payers + receivers - 1` payments are emitted.
    pub fn settle<B: Balanced>(players: &[B]) -> Vec<Payment> {
        let Some(target) = Self::fair_share(players) else {
            return Vec::new();
        };
        let target = target as i128;

        let mut payers: Vec<(&str, i128)> = players
            .iter()
            .filter(|p| p.balance() as i128 > target)
            .map(|p| (p.name(), p.balance() as i128 - target))
            .collect();
        payers.sort_by(|a, b| b.1.cmp(&a.1));

        let mut receivers: Vec<(&str, i128)> = players
            .iter()
            .filter(|p| (p.balance() as i128) < target)
            .map(|p| (p.name(), target - p.balance() as i128))
            .collect();
        receivers.sort_by(|a, b| b.1.cmp(&a.1));

        let mut payments = Vec::new();
        let mut head = 0;

        for (payer, mut excess) in payers {
            while excess > 0 && head < receivers.len() {
                let (receiver, deficit) = &mut receivers[head];
                let amount = excess.min(*deficit);
                payments.push(Payment {
                    from: payer.to_string(),
                    to: receiver.to_string(),
                    amount: amount as u64,
                });
                excess -= amount;
                *deficit -= amount;
                if *deficit == 0 {
                    head += 1;
                }
            }
        }

        payments
    }

    /// Each player's distance from the fair share, in roster order.
    pub fn share_differences<B: Balanced>(players: &[B]) -> Vec<ShareDifference> {
        let Some(target) = Self::fair_share(players) else {
            return Vec::new();
        };
        players
            .iter()
            .map(|p| ShareDifference {
                name: p.name().to_string(),
                balance: p.balance(),
                difference: p.balance().saturating_sub(target),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
