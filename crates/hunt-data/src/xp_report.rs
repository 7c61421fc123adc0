//! Individual XP analyzer report parsing.
//!
//! The XP analyzer prints one character's hunt: experience, loot and
//! combat totals followed by free-form monster and item lists, which are
//! ignored.

use hunt_core::error::ParseError;
use hunt_core::models::XpReport;
use tracing::debug;

use crate::lexer::{field_value, parse_grouped_u64, parse_header};
use crate::parser::report_lines;

/// Labels that must be present for the report to be accepted.
const REQUIRED: [&str; 5] = ["XP Gain", "Loot", "Supplies", "Damage", "Healing"];

/// Parse an XP analyzer report.
///
/// The header, `XP Gain`, `Loot`, `Supplies`, `Damage` and `Healing` are
/// required; raw and per-hour figures default to 0.
pub fn parse_xp_report(text: &str) -> Result<XpReport, ParseError> {
    let mut lines = report_lines(text);
    let header = lines
        .next()
        .ok_or_else(|| ParseError::MalformedHeader("empty report".to_string()))?;
    let window = parse_header(header)?;

    let mut report = XpReport {
        data: window.date_from,
        start_hour: window.time_from,
        end_hour: window.time_to,
        ..Default::default()
    };
    let mut seen: Vec<&'static str> = Vec::new();

    for line in lines {
        let Some((label, slot)) = slot_for(&mut report, line) else {
            continue;
        };
        if seen.contains(&label) {
            continue;
        }
        let value = field_value(line, label).unwrap_or_default();
        *slot = parse_grouped_u64(value, label)?;
        seen.push(label);
    }

    if let Some(missing) = REQUIRED.into_iter().find(|label| !seen.contains(label)) {
        return Err(ParseError::MissingRequiredField {
            field: missing,
            player: None,
        });
    }

    debug!(
        "Parsed XP report {} {}-{} ({} xp)",
        report.data, report.start_hour, report.end_hour, report.xp_gain
    );
    Ok(report)
}

/// Map a line to the report field it fills.
fn slot_for<'r>(report: &'r mut XpReport, line: &str) -> Option<(&'static str, &'r mut u64)> {
    const LABELS: [&str; 10] = [
        "Raw XP Gain",
        "XP Gain",
        "Raw XP/h",
        "XP/h",
        "Loot",
        "Supplies",
        "Damage",
        "Damage/h",
        "Healing",
        "Healing/h",
    ];
    let label = LABELS
        .into_iter()
        .find(|label| field_value(line, label).is_some())?;
    let slot = match label {
        "Raw XP Gain" => &mut report.raw_xp_gain,
        "XP Gain" => &mut report.xp_gain,
        "Raw XP/h" => &mut report.raw_xp_per_hour,
        "XP/h" => &mut report.xp_per_hour,
        "Loot" => &mut report.loot,
        "Supplies" => &mut report.supplies,
        "Damage" => &mut report.damage,
        "Damage/h" => &mut report.dps,
        "Healing" => &mut report.healing,
        _ => &mut report.healing_per_hour,
    };
    Some((label, slot))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
