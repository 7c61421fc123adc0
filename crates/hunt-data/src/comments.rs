//! Flavour-text pool for performance classifications.
//!
//! The pool is a static JSON document `category -> tier -> [comment]`:
//!
//! ```json
//! { "high_damage": { "tier_s": ["..."], "tier_a": ["..."], "tier_b": ["..."] } }
//! ```
//!
//! Missing categories or tiers are treated as empty; selection from an empty
//! list yields an empty string.

use std::path::Path;

use hunt_core::error::{HuntError, Result};
use hunt_core::models::{Category, Tier};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Comments for one category, split by tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierComments {
    pub tier_s: Vec<String>,
    pub tier_a: Vec<String>,
    pub tier_b: Vec<String>,
}

impl TierComments {
    pub fn get(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::S => &self.tier_s,
            Tier::A => &self.tier_a,
            Tier::B => &self.tier_b,
        }
    }
}

/// Read-only comment pool, loaded once per process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentPool {
    pub high_damage: TierComments,
    pub low_damage: TierComments,
    pub high_heal: TierComments,
    pub low_profit: TierComments,
}

impl CommentPool {
    /// A pool with no comments; every pick returns `""`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a pool from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HuntError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let pool: CommentPool = serde_json::from_str(&content)?;
        debug!(
            "Loaded comment pool from {} ({} comments)",
            path.display(),
            pool.len()
        );
        Ok(pool)
    }

    /// Load a pool, falling back to an empty one when the file is missing
    /// or unreadable.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Comment pool unavailable, continuing without comments: {}", e);
                Self::empty()
            }
        }
    }

    /// All comments for `(category, tier)`.
    pub fn comments(&self, category: Category, tier: Tier) -> &[String] {
        let by_tier = match category {
            Category::HighDamage => &self.high_damage,
            Category::LowDamage => &self.low_damage,
            Category::HighHeal => &self.high_heal,
            Category::LowProfit => &self.low_profit,
        };
        by_tier.get(tier)
    }

    /// Total number of comments across all categories and tiers.
    pub fn len(&self) -> usize {
        [
            &self.high_damage,
            &self.low_damage,
            &self.high_heal,
            &self.low_profit,
        ]
        .iter()
        .map(|t| t.tier_s.len() + t.tier_a.len() + t.tier_b.len())
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One uniformly chosen comment, or `""` when none exist.
    pub fn pick<R: Rng + ?Sized>(&self, category: Category, tier: Tier, rng: &mut R) -> String {
        self.comments(category, tier)
            .choose(rng)
            .cloned()
            .unwrap_or_default()
    }

    /// Up to `n` distinct comments in random order. Returns every comment
    /// when fewer than `n` exist.
    pub fn pick_many<R: Rng + ?Sized>(
        &self,
        category: Category,
        tier: Tier,
        n: usize,
        rng: &mut R,
    ) -> Vec<String> {
        self.comments(category, tier)
            .choose_multiple(rng, n)
            .cloned()
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
