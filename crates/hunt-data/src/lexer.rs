//! Line classification for hunt analyzer reports.
//!
//! Every report line is one of: the session header, a `Label: value` field,
//! a stat line inside a player block, or something else (player names).
//! The parser consumes the tokens produced here and owns the grammar.

use std::sync::OnceLock;

use hunt_core::error::ParseError;
use regex::Regex;

// ── SessionWindow ─────────────────────────────────────────────────────────────

/// The `Session data: From <date>, <time> to <date>, <time>` line, tokenised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    pub date_from: String,
    pub time_from: String,
    pub date_to: String,
    pub time_to: String,
}

impl SessionWindow {
    /// Start stamp as printed, e.g. `"2024-01-01, 10:00:00"`.
    pub fn from_stamp(&self) -> String {
        format!("{}, {}", self.date_from, self.time_from)
    }

    /// End stamp as printed.
    pub fn to_stamp(&self) -> String {
        format!("{}, {}", self.date_to, self.time_to)
    }
}

const HEADER_PREFIX: &str = "Session data:";

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Session data: From ([\d-]+), ([\d:]+) to ([\d-]+), ([\d:]+)$")
            .expect("regex is valid")
    })
}

/// Tokenise the session header line.
pub fn parse_header(line: &str) -> Result<SessionWindow, ParseError> {
    let line = line.trim();
    if !line.starts_with(HEADER_PREFIX) {
        return Err(ParseError::MalformedHeader(format!(
            "expected '{} From <date>, <time> to <date>, <time>', got {:?}",
            HEADER_PREFIX, line
        )));
    }
    let cap = header_regex().captures(line).ok_or_else(|| {
        ParseError::MalformedHeader(format!("unrecognised session window {:?}", line))
    })?;
    Ok(SessionWindow {
        date_from: cap[1].to_string(),
        time_from: cap[2].to_string(),
        date_to: cap[3].to_string(),
        time_to: cap[4].to_string(),
    })
}

// ── Fields ────────────────────────────────────────────────────────────────────

/// Return the trimmed value of a `Label: value` line, or `None` when the
/// line carries a different label.
pub fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.trim()
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
}

/// Decode a non-negative integer with optional `,` thousands separators.
pub fn parse_grouped_u64(value: &str, field: &'static str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidField {
        field,
        value: value.to_string(),
        player: None,
    };
    let digits = strip_separators(value).ok_or_else(invalid)?;
    digits.parse::<u64>().map_err(|_| invalid())
}

/// Decode a signed integer with optional `,` thousands separators.
pub fn parse_grouped_i64(value: &str, field: &'static str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidField {
        field,
        value: value.to_string(),
        player: None,
    };
    let (negative, magnitude) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let digits = strip_separators(magnitude).ok_or_else(invalid)?;
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits
    };
    signed.parse::<i64>().map_err(|_| invalid())
}

/// Remove `,` separators; `None` unless the input is digits and commas with
/// at least one digit.
fn strip_separators(value: &str) -> Option<String> {
    if !value.chars().all(|c| c.is_ascii_digit() || c == ',') {
        return None;
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

// ── Stat lines ────────────────────────────────────────────────────────────────

/// The five stats a player block may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Loot,
    Supplies,
    Balance,
    Damage,
    Healing,
}

impl StatField {
    pub const ALL: [StatField; 5] = [
        StatField::Loot,
        StatField::Supplies,
        StatField::Balance,
        StatField::Damage,
        StatField::Healing,
    ];

    /// The line label, without the trailing colon.
    pub fn label(self) -> &'static str {
        match self {
            StatField::Loot => "Loot",
            StatField::Supplies => "Supplies",
            StatField::Balance => "Balance",
            StatField::Damage => "Damage",
            StatField::Healing => "Healing",
        }
    }
}

/// One classified line inside a player block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatLine {
    Loot(u64),
    Supplies(u64),
    Balance(i64),
    Damage(u64),
    Healing(u64),
    /// Anything that is not a stat line; ends the current block.
    Unrecognized,
}

impl StatLine {
    /// Which stat this line carries, `None` for [`StatLine::Unrecognized`].
    pub fn field(&self) -> Option<StatField> {
        match self {
            StatLine::Loot(_) => Some(StatField::Loot),
            StatLine::Supplies(_) => Some(StatField::Supplies),
            StatLine::Balance(_) => Some(StatField::Balance),
            StatLine::Damage(_) => Some(StatField::Damage),
            StatLine::Healing(_) => Some(StatField::Healing),
            StatLine::Unrecognized => None,
        }
    }
}

/// Classify a line by its stat prefix.
///
/// A recognised prefix with an undecodable number is an error rather than
/// [`StatLine::Unrecognized`], so a typo never silently ends a block.
pub fn classify_stat_line(line: &str) -> Result<StatLine, ParseError> {
    for field in StatField::ALL {
        let Some(value) = field_value(line, field.label()) else {
            continue;
        };
        let label = field.label();
        return Ok(match field {
            StatField::Loot => StatLine::Loot(parse_grouped_u64(value, label)?),
            StatField::Supplies => StatLine::Supplies(parse_grouped_u64(value, label)?),
            StatField::Balance => StatLine::Balance(parse_grouped_i64(value, label)?),
            StatField::Damage => StatLine::Damage(parse_grouped_u64(value, label)?),
            StatField::Healing => StatLine::Healing(parse_grouped_u64(value, label)?),
        });
    }
    Ok(StatLine::Unrecognized)
}

/// Strip the trailing `" (Leader)"` marker from a player name line.
pub fn player_name(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix(" (Leader)").unwrap_or(line).trim_end()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let w = parse_header("Session data: From 2024-01-01, 10:00:00 to 2024-01-02, 01:15:30")
            .unwrap();
        assert_eq!(w.date_from, "2024-01-01");
        assert_eq!(w.time_from, "10:00:00");
        assert_eq!(w.date_to, "2024-01-02");
        assert_eq!(w.time_to, "01:15:30");
        assert_eq!(w.from_stamp(), "2024-01-01, 10:00:00");
        assert_eq!(w.to_stamp(), "2024-01-02, 01:15:30");
    }

    #[test]
    fn test_parse_header_wrong_line() {
        let err = parse_header("Loot: 100").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader(_)));
    }

    #[test]
    fn test_parse_header_bad_window() {
        let err = parse_header("Session data: From yesterday to today").unwrap_err();
        match err {
            ParseError::MalformedHeader(reason) => assert!(reason.contains("unrecognised")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_field_value() {
        assert_eq!(field_value("Loot Type: Leader", "Loot Type"), Some("Leader"));
        assert_eq!(field_value("  Session: 01:00h ", "Session"), Some("01:00h"));
        assert_eq!(field_value("Session data: From", "Session"), None);
        assert_eq!(field_value("Loot Type: Leader", "Loot"), None);
    }

    #[test]
    fn test_parse_grouped_u64() {
        assert_eq!(parse_grouped_u64("1,234,567", "Loot").unwrap(), 1_234_567);
        assert_eq!(parse_grouped_u64("0", "Loot").unwrap(), 0);
        assert!(parse_grouped_u64("-5", "Loot").is_err());
        assert!(parse_grouped_u64(",", "Loot").is_err());
        assert!(parse_grouped_u64("", "Loot").is_err());
        assert!(parse_grouped_u64("12k", "Loot").is_err());
    }

    #[test]
    fn test_parse_grouped_i64_negative() {
        assert_eq!(parse_grouped_i64("-12,500", "Balance").unwrap(), -12_500);
        assert_eq!(parse_grouped_i64("800", "Balance").unwrap(), 800);
        assert!(parse_grouped_i64("--1", "Balance").is_err());
        assert!(parse_grouped_i64("-", "Balance").is_err());
    }

    #[test]
    fn test_parse_grouped_overflow() {
        let err = parse_grouped_u64("99,999,999,999,999,999,999", "Loot").unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { field: "Loot", .. }));
    }

    #[test]
    fn test_classify_stat_lines() {
        assert_eq!(classify_stat_line("Loot: 1,000").unwrap(), StatLine::Loot(1000));
        assert_eq!(classify_stat_line("Supplies: 200").unwrap(), StatLine::Supplies(200));
        assert_eq!(classify_stat_line("Balance: -50").unwrap(), StatLine::Balance(-50));
        assert_eq!(classify_stat_line("Damage: 3,000").unwrap(), StatLine::Damage(3000));
        assert_eq!(classify_stat_line("  Healing: 7 ").unwrap(), StatLine::Healing(7));
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify_stat_line("Alice").unwrap(), StatLine::Unrecognized);
        assert_eq!(classify_stat_line("Damage/h: 10").unwrap(), StatLine::Unrecognized);
        assert_eq!(classify_stat_line("Loot Type: Leader").unwrap(), StatLine::Unrecognized);
        assert_eq!(StatLine::Unrecognized.field(), None);
    }

    #[test]
    fn test_classify_negative_damage_is_invalid() {
        let err = classify_stat_line("Damage: -3").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidField {
                field: "Damage",
                value: "-3".to_string(),
                player: None
            }
        );
    }

    #[test]
    fn test_player_name_strips_leader() {
        assert_eq!(player_name("Alice (Leader)"), "Alice");
        assert_eq!(player_name("  Bob  "), "Bob");
        assert_eq!(player_name("Leader"), "Leader");
    }
}
