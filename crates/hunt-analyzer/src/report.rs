//! Plain-text and JSON rendering of analysis results.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use hunt_core::formatting::{
    format_display_date, format_gold, format_grouped, format_signed_gold, percentage,
};
use hunt_core::models::{Classification, Payment, SessionRecord, Tier};
use hunt_data::aggregator::Timeline;
use hunt_data::settlement::ShareDifference;
use hunt_data::submission::HuntSubmission;
use serde_json::{json, Value};

/// Everything computed for a loot-split report.
pub struct SoloAnalysis<'a> {
    pub record: &'a SessionRecord,
    pub fair_share: Option<i64>,
    pub differences: &'a [ShareDifference],
    pub payments: &'a [Payment],
    pub classifications: &'a BTreeMap<String, Classification>,
}

// ── Solo ──────────────────────────────────────────────────────────────────────

pub fn render_solo_text(a: &SoloAnalysis<'_>) -> String {
    let r = a.record;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Session {} -> {} ({}, {})",
        r.date_from, r.date_to, r.duration, r.loot_type
    );
    let _ = writeln!(
        out,
        "Loot {} | Supplies {} | Balance {}",
        format_gold(r.total_loot as i64),
        format_gold(r.total_supplies as i64),
        format_gold(r.total_balance)
    );
    if let Some(share) = a.fair_share {
        let _ = writeln!(out, "Fair share per player: {}", format_gold(share));
    }

    let total_damage = r
        .players
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.damage_or_zero()));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>14} {:>14} {:>14} {:>16} {:>8}",
        "Player", "Loot", "Supplies", "Balance", "To fair share", "Damage"
    );
    for (player, diff) in r.players.iter().zip(a.differences) {
        let damage_share = percentage(player.damage_or_zero() as f64, total_damage as f64, 1);
        let _ = writeln!(
            out,
            "{:<20} {:>14} {:>14} {:>14} {:>16} {:>7.1}%",
            player.name,
            format_grouped(player.loot as i64),
            format_grouped(player.supplies as i64),
            format_grouped(player.balance),
            format_signed_gold(diff.difference),
            damage_share
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Payments");
    if a.payments.is_empty() {
        let _ = writeln!(out, "  Nothing to settle");
    }
    for p in a.payments {
        let _ = writeln!(out, "  {} -> {}: {}", p.from, p.to, format_gold(p.amount as i64));
    }

    let highlighted: Vec<(&String, &Classification)> = a
        .classifications
        .iter()
        .filter(|(_, c)| !c.is_empty())
        .collect();
    if !highlighted.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Performance");
        for (name, c) in highlighted {
            let labels = [
                ("damage", c.damage_class, c.damage_comment.as_deref()),
                ("healing", c.heal_class, c.heal_comment.as_deref()),
                ("balance", c.balance_class, c.balance_comment.as_deref()),
            ];
            for (label, tier, comment) in labels {
                let Some(tier) = tier else { continue };
                let _ = write!(out, "  {:<20} {:<8} {}", name, label, tier_badge(tier));
                match comment.filter(|c| !c.is_empty()) {
                    Some(text) => {
                        let _ = writeln!(out, "  {}", text);
                    }
                    None => {
                        let _ = writeln!(out);
                    }
                }
            }
        }
    }

    out
}

pub fn render_solo_json(a: &SoloAnalysis<'_>) -> Value {
    json!({
        "session": a.record,
        "fairShare": a.fair_share,
        "differences": a.differences,
        "payments": a.payments,
        "classifications": a.classifications,
    })
}

fn tier_badge(tier: Tier) -> &'static str {
    match tier {
        Tier::S => "[S]",
        Tier::A => "[A]",
        Tier::B => "[B]",
    }
}

// ── Party ─────────────────────────────────────────────────────────────────────

pub fn render_party_text(submission: &HuntSubmission, acting: &str) -> String {
    let mut out = String::new();
    let Some(party) = &submission.party_hunt_data else {
        return out;
    };
    let size = party.party_size.max(1) as i64;
    let _ = writeln!(
        out,
        "Party hunt {} {}-{} ({} characters)",
        party.date, party.start_hour, party.end_hour, party.party_size
    );
    let _ = writeln!(
        out,
        "Loot {} | Supplies {} | Balance {}",
        format_gold(party.total_loot as i64),
        format_gold(party.total_supplies as i64),
        format_gold(party.balance)
    );
    let _ = writeln!(
        out,
        "Share for {}: {}",
        acting,
        format_gold(party.balance.div_euclid(size))
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>14} {:>14} {:>14}",
        "Member", "Loot", "Supplies", "Balance"
    );
    for (name, m) in &party.party_characters {
        let _ = writeln!(
            out,
            "{:<20} {:>14} {:>14} {:>14}",
            name,
            format_grouped(m.loot as i64),
            format_grouped(m.supplies as i64),
            format_grouped(m.balance)
        );
    }
    out
}

// ── Timeline ──────────────────────────────────────────────────────────────────

pub fn render_timeline_text(timeline: &Timeline, grounds: &[String]) -> String {
    let mut out = String::new();
    if timeline.is_empty() {
        let _ = writeln!(out, "No hunts recorded");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<12} {:>14} {:>16} {:>14}  {}",
        "Date", "XP", "Balance", "Damage", "Hunting grounds"
    );
    for day in &timeline.days {
        let _ = writeln!(
            out,
            "{:<12} {:>14} {:>16} {:>14}  {}",
            format_display_date(day.date),
            format_grouped(day.xp as i64),
            format_gold(day.balance),
            format_grouped(day.damage_for_grounds(grounds) as i64),
            day.hunting_grounds_label()
        );
    }
    let totals = timeline.totals();
    let filtered_damage: u64 = timeline
        .damage_series(grounds)
        .iter()
        .fold(0u64, |acc, (_, d)| acc.saturating_add(*d));
    let _ = writeln!(
        out,
        "{:<12} {:>14} {:>16} {:>14}  {} day(s)",
        "Total",
        format_grouped(totals.xp as i64),
        format_gold(totals.balance),
        format_grouped(filtered_damage as i64),
        totals.days
    );
    out
}

pub fn render_timeline_json(timeline: &Timeline, grounds: &[String]) -> Value {
    let series: Vec<Value> = timeline
        .days
        .iter()
        .map(|d| {
            json!({
                "date": format_display_date(d.date),
                "xp": d.xp,
                "balance": d.balance,
                "damage": d.damage_for_grounds(grounds),
                "huntingGrounds": d.hunting_grounds_label(),
                "damageByHuntingGround": d.damage_by_ground,
            })
        })
        .collect();
    json!({
        "days": series,
        "availableGrounds": timeline.available_grounds(),
        "totals": timeline.totals(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
