//! Party hunt analyzer report parsing.
//!
//! Reports are consumed by a small state machine over the non-blank lines:
//!
//! ```text
//! Header  -> Session data: From <date>, <time> to <date>, <time>
//! Meta    -> Session: <duration>h / Loot Type: <kind>   (required for solo)
//! Totals  -> Loot / Supplies / Balance                    (in that order)
//! Players -> <name> [(Leader)] followed by stat lines until a non-stat line
//! ```
//!
//! Parsing is all-or-nothing: the first failure aborts the report.

use std::collections::{BTreeMap, HashSet};
use std::iter::Peekable;

use hunt_core::error::ParseError;
use hunt_core::models::{MemberStats, PartySessionRecord, PlayerStat, SessionRecord};
use tracing::debug;

use crate::lexer::{
    classify_stat_line, field_value, parse_header, player_name, SessionWindow, StatField, StatLine,
};

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse a solo / loot-split session report.
pub fn parse_solo(text: &str) -> Result<SessionRecord, ParseError> {
    let mut lines = report_lines(text);
    let preamble = Preamble::read(&mut lines, ReportKind::Solo)?;
    let players = read_players(&mut lines)?;

    if players.is_empty() {
        return Err(ParseError::MissingRequiredField {
            field: "player",
            player: None,
        });
    }

    debug!(
        "Parsed solo session {} with {} players",
        preamble.window.from_stamp(),
        players.len()
    );

    Ok(SessionRecord {
        date_from: preamble.window.from_stamp(),
        date_to: preamble.window.to_stamp(),
        duration: preamble.duration.unwrap_or_default(),
        loot_type: preamble.loot_type.unwrap_or_default(),
        total_loot: preamble.totals.loot,
        total_supplies: preamble.totals.supplies,
        total_balance: preamble.totals.balance,
        players,
    })
}

/// Parse a party report on behalf of `acting_character`.
///
/// The acting character must be a member (matched case-insensitively); its
/// entry is removed from the published `party_characters` while
/// `party_size` still counts it.
pub fn parse_party(text: &str, acting_character: &str) -> Result<PartySessionRecord, ParseError> {
    let mut lines = report_lines(text);
    let preamble = Preamble::read(&mut lines, ReportKind::Party)?;
    let players = read_players(&mut lines)?;

    let wanted = acting_character.trim().to_lowercase();
    let actor = players
        .iter()
        .position(|p| p.name.to_lowercase() == wanted)
        .ok_or_else(|| ParseError::ActorNotInParty(acting_character.to_string()))?;

    let party_size = players.len();
    if party_size < 2 {
        return Err(ParseError::InsufficientPartySize { found: party_size });
    }

    let party_characters: BTreeMap<String, MemberStats> = players
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != actor)
        .map(|(_, p)| (p.name.clone(), MemberStats::from(p)))
        .collect();

    debug!(
        "Parsed party session {} for {} ({} members)",
        preamble.window.from_stamp(),
        players[actor].name,
        party_size
    );

    Ok(PartySessionRecord {
        date: preamble.window.date_from,
        start_hour: preamble.window.time_from,
        end_hour: preamble.window.time_to,
        total_loot: preamble.totals.loot,
        total_supplies: preamble.totals.supplies,
        balance: preamble.totals.balance,
        party_size,
        party_characters,
    })
}

// ── Internal state machine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportKind {
    Solo,
    Party,
}

/// Trimmed, non-blank lines of a report.
pub(crate) fn report_lines(text: &str) -> Peekable<impl Iterator<Item = &str>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .peekable()
}

#[derive(Debug, Default)]
struct Totals {
    loot: u64,
    supplies: u64,
    balance: i64,
}

/// Everything before the first player block.
#[derive(Debug)]
struct Preamble {
    window: SessionWindow,
    duration: Option<String>,
    loot_type: Option<String>,
    totals: Totals,
}

impl Preamble {
    fn read<'a, I>(lines: &mut Peekable<I>, kind: ReportKind) -> Result<Self, ParseError>
    where
        I: Iterator<Item = &'a str>,
    {
        let header = lines
            .next()
            .ok_or_else(|| ParseError::MalformedHeader("empty report".to_string()))?;
        let window = parse_header(header)?;

        let mut duration = None;
        let mut loot_type = None;
        while let Some(&line) = lines.peek() {
            if let Some(value) = field_value(line, "Session") {
                if duration.is_some() {
                    return Err(duplicate_meta("Session"));
                }
                duration = Some(parse_duration(value)?);
            } else if let Some(value) = field_value(line, "Loot Type") {
                if loot_type.is_some() {
                    return Err(duplicate_meta("Loot Type"));
                }
                loot_type = Some(value.to_string());
            } else {
                break;
            }
            lines.next();
        }

        if kind == ReportKind::Solo {
            if duration.is_none() {
                return Err(ParseError::MissingRequiredField {
                    field: "Session",
                    player: None,
                });
            }
            if loot_type.is_none() {
                return Err(ParseError::MissingRequiredField {
                    field: "Loot Type",
                    player: None,
                });
            }
        }

        let loot = match next_stat(lines, StatField::Loot)? {
            StatLine::Loot(v) => v,
            _ => return Err(missing_total(StatField::Loot)),
        };
        let supplies = match next_stat(lines, StatField::Supplies)? {
            StatLine::Supplies(v) => v,
            _ => return Err(missing_total(StatField::Supplies)),
        };
        let balance = match next_stat(lines, StatField::Balance)? {
            StatLine::Balance(v) => v,
            _ => return Err(missing_total(StatField::Balance)),
        };

        Ok(Preamble {
            window,
            duration,
            loot_type,
            totals: Totals {
                loot,
                supplies,
                balance,
            },
        })
    }
}

/// Session length such as `"01:30h"`; kept verbatim.
fn parse_duration(value: &str) -> Result<String, ParseError> {
    let valid = value
        .strip_suffix('h')
        .map(|body| !body.is_empty() && body.chars().all(|c| c.is_ascii_digit() || c == ':'))
        .unwrap_or(false);
    if valid {
        Ok(value.to_string())
    } else {
        Err(ParseError::InvalidField {
            field: "Session",
            value: value.to_string(),
            player: None,
        })
    }
}

fn duplicate_meta(field: &'static str) -> ParseError {
    ParseError::DuplicateField {
        field,
        player: None,
    }
}

fn missing_total(field: StatField) -> ParseError {
    ParseError::MissingRequiredField {
        field: field.label(),
        player: None,
    }
}

/// Consume and classify the line where the `field` total is expected.
fn next_stat<'a, I>(lines: &mut Peekable<I>, field: StatField) -> Result<StatLine, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    let line = lines.next().ok_or_else(|| missing_total(field))?;
    classify_stat_line(line)
}

/// Stats collected for the player block being read.
#[derive(Debug, Default)]
struct PlayerBlock {
    loot: Option<u64>,
    supplies: Option<u64>,
    balance: Option<i64>,
    damage: Option<u64>,
    healing: Option<u64>,
}

impl PlayerBlock {
    fn apply(&mut self, stat: StatLine) -> Result<(), ParseError> {
        fn set<T>(slot: &mut Option<T>, value: T, field: StatField) -> Result<(), ParseError> {
            if slot.is_some() {
                return Err(ParseError::DuplicateField {
                    field: field.label(),
                    player: None,
                });
            }
            *slot = Some(value);
            Ok(())
        }

        match stat {
            StatLine::Loot(v) => set(&mut self.loot, v, StatField::Loot),
            StatLine::Supplies(v) => set(&mut self.supplies, v, StatField::Supplies),
            StatLine::Balance(v) => set(&mut self.balance, v, StatField::Balance),
            StatLine::Damage(v) => set(&mut self.damage, v, StatField::Damage),
            StatLine::Healing(v) => set(&mut self.healing, v, StatField::Healing),
            StatLine::Unrecognized => Ok(()),
        }
    }

    fn finish(self, name: String) -> Result<PlayerStat, ParseError> {
        let missing = |field: StatField| ParseError::MissingRequiredField {
            field: field.label(),
            player: Some(name.clone()),
        };
        let loot = self.loot.ok_or_else(|| missing(StatField::Loot))?;
        let supplies = self.supplies.ok_or_else(|| missing(StatField::Supplies))?;
        let balance = self.balance.ok_or_else(|| missing(StatField::Balance))?;
        Ok(PlayerStat {
            name,
            loot,
            supplies,
            balance,
            damage: self.damage,
            healing: self.healing,
        })
    }
}

/// Read player blocks until the input is exhausted.
fn read_players<'a, I>(lines: &mut Peekable<I>) -> Result<Vec<PlayerStat>, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    let mut players = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    while let Some(line) = lines.next() {
        if classify_stat_line(line)? != StatLine::Unrecognized {
            return Err(ParseError::MissingRequiredField {
                field: "player name",
                player: None,
            });
        }
        let name = player_name(line).to_string();

        let mut block = PlayerBlock::default();
        while let Some(&next) = lines.peek() {
            let stat = classify_stat_line(next).map_err(|e| e.with_player(&name))?;
            if stat == StatLine::Unrecognized {
                break;
            }
            block.apply(stat).map_err(|e| e.with_player(&name))?;
            lines.next();
        }

        if !seen.insert(name.clone()) {
            return Err(ParseError::DuplicatePlayer(name));
        }
        players.push(block.finish(name)?);
    }

    Ok(players)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "Session data: From 2024-01-01, 10:00:00 to 2024-01-01, 11:00:00\n\
                           Session: 1:00h\n\
                           Loot Type: Leader\n\
                           Loot: 1,000\n\
                           Supplies: 200\n\
                           Balance: 800\n\
                           Alice\n\
                           Loot: 1,000\n\
                           Supplies: 200\n\
                           Balance: 800\n";

    const PARTY: &str = "Session data: From 2024-03-10, 14:00:00 to 2024-03-10, 16:30:00
Session: 02:30h
Loot Type: Leader
Loot: 1,500,000
Supplies: 900,000
Balance: 600,000
Alice (Leader)
    Loot: 1,000,000
    Supplies: 300,000
    Balance: 700,000
    Damage: 2,000,000
    Healing: 150,000
Bob
    Loot: 500,000
    Supplies: 400,000
    Balance: 100,000
    Damage: 1,200,000
    Healing: 900,000
Carol
    Loot: 0
    Supplies: 200,000
    Balance: -200,000
    Damage: 800,000
    Healing: 50,000
";

    #[test]
    fn test_parse_solo_minimal_fixture() {
        let record = parse_solo(MINIMAL).unwrap();
        assert_eq!(record.date_from, "2024-01-01, 10:00:00");
        assert_eq!(record.date_to, "2024-01-01, 11:00:00");
        assert_eq!(record.duration, "1:00h");
        assert_eq!(record.loot_type, "Leader");
        assert_eq!(record.total_loot, 1000);
        assert_eq!(record.total_supplies, 200);
        assert_eq!(record.total_balance, 800);
        assert_eq!(
            record.players,
            vec![PlayerStat {
                name: "Alice".to_string(),
                loot: 1000,
                supplies: 200,
                balance: 800,
                damage: None,
                healing: None,
            }]
        );
    }

    #[test]
    fn test_parse_solo_is_deterministic() {
        assert_eq!(parse_solo(PARTY).unwrap(), parse_solo(PARTY).unwrap());
    }

    #[test]
    fn test_parse_solo_players_in_order_with_optional_stats() {
        let record = parse_solo(PARTY).unwrap();
        let names: Vec<&str> = record.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(record.total_balance, 600_000);
        assert_eq!(record.players[0].damage, Some(2_000_000));
        assert_eq!(record.players[2].balance, -200_000);
        assert_eq!(record.players[2].healing, Some(50_000));
    }

    #[test]
    fn test_parse_solo_stats_in_any_order() {
        let text = "Session data: From 2024-01-01, 10:00:00 to 2024-01-01, 11:00:00
Session: 1:00h
Loot Type: Market
Loot: 10
Supplies: 5
Balance: 5
Alice
Healing: 3
Balance: 5
Supplies: 5
Loot: 10
Bob
Loot: 0
Supplies: 0
Balance: 0
Damage: 9
";
        let record = parse_solo(text).unwrap();
        assert_eq!(record.players.len(), 2);
        assert_eq!(record.players[0].healing, Some(3));
        assert_eq!(record.players[0].damage, None);
        assert_eq!(record.players[1].damage, Some(9));
        assert_eq!(record.players[1].healing, None);
    }

    #[test]
    fn test_parse_solo_negative_total_balance() {
        let text = MINIMAL.replace("Balance: 800\nAlice", "Balance: -1,200\nAlice");
        let record = parse_solo(&text).unwrap();
        assert_eq!(record.total_balance, -1200);
    }

    #[test]
    fn test_parse_solo_tolerates_crlf_and_blank_lines() {
        let text = MINIMAL.replace('\n', "\r\n\r\n");
        let record = parse_solo(&text).unwrap();
        assert_eq!(record.players.len(), 1);
        assert_eq!(record.players[0].loot, 1000);
    }

    #[test]
    fn test_parse_solo_empty_input() {
        let err = parse_solo("   \n").unwrap_err();
        assert_eq!(err, ParseError::MalformedHeader("empty report".to_string()));
    }

    #[test]
    fn test_parse_solo_bad_header() {
        let err = parse_solo(&MINIMAL.replace("Session data:", "Session info:")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader(_)));
    }

    #[test]
    fn test_parse_solo_requires_duration() {
        let err = parse_solo(&MINIMAL.replace("Session: 1:00h\n", "")).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredField {
                field: "Session",
                player: None
            }
        );
    }

    #[test]
    fn test_parse_solo_requires_loot_type() {
        let err = parse_solo(&MINIMAL.replace("Loot Type: Leader\n", "")).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredField {
                field: "Loot Type",
                player: None
            }
        );
    }

    #[test]
    fn test_parse_solo_invalid_duration() {
        let err = parse_solo(&MINIMAL.replace("1:00h", "one hour")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidField {
                field: "Session",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_solo_missing_total_supplies() {
        let text = MINIMAL.replacen("Supplies: 200\n", "", 1);
        let err = parse_solo(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredField {
                field: "Supplies",
                player: None
            }
        );
    }

    #[test]
    fn test_parse_solo_missing_player_balance() {
        let text = "Session data: From 2024-01-01, 10:00:00 to 2024-01-01, 11:00:00
Session: 1:00h
Loot Type: Leader
Loot: 1
Supplies: 1
Balance: 0
Alice
Loot: 1
Supplies: 1
Bob
Loot: 0
Supplies: 0
Balance: 0
";
        let err = parse_solo(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredField {
                field: "Balance",
                player: Some("Alice".to_string())
            }
        );
    }

    #[test]
    fn test_parse_solo_invalid_player_number() {
        let text = MINIMAL.replace("Alice\nLoot: 1,000", "Alice\nLoot: 1.000");
        let err = parse_solo(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidField {
                field: "Loot",
                value: "1.000".to_string(),
                player: Some("Alice".to_string())
            }
        );
    }

    #[test]
    fn test_parse_solo_duplicate_stat_line() {
        let text = format!("{}Damage: 1\nDamage: 2\n", MINIMAL);
        let err = parse_solo(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateField {
                field: "Damage",
                player: Some("Alice".to_string())
            }
        );
    }

    #[test]
    fn test_parse_solo_duplicate_player() {
        let text = format!("{}Alice\nLoot: 1\nSupplies: 1\nBalance: 0\n", MINIMAL);
        let err = parse_solo(&text).unwrap_err();
        assert_eq!(err, ParseError::DuplicatePlayer("Alice".to_string()));
    }

    #[test]
    fn test_parse_solo_without_players() {
        let text = "Session data: From 2024-01-01, 10:00:00 to 2024-01-01, 11:00:00
Session: 1:00h
Loot Type: Leader
Loot: 0
Supplies: 0
Balance: 0
";
        let err = parse_solo(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingRequiredField {
                field: "player",
                player: None
            }
        );
    }

    #[test]
    fn test_parse_party_removes_actor() {
        let record = parse_party(PARTY, "alice").unwrap();
        assert_eq!(record.date, "2024-03-10");
        assert_eq!(record.start_hour, "14:00:00");
        assert_eq!(record.end_hour, "16:30:00");
        assert_eq!(record.total_loot, 1_500_000);
        assert_eq!(record.total_supplies, 900_000);
        assert_eq!(record.balance, 600_000);
        assert_eq!(record.party_size, 3);
        let names: Vec<&str> = record.party_characters.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
        assert_eq!(record.party_characters["Carol"].balance, -200_000);
        assert_eq!(record.party_characters["Bob"].healing, Some(900_000));
    }

    #[test]
    fn test_parse_party_without_meta_lines() {
        let text = PARTY
            .replace("Session: 02:30h\n", "")
            .replace("Loot Type: Leader\n", "");
        let record = parse_party(&text, "Bob").unwrap();
        assert_eq!(record.party_size, 3);
        assert!(record.party_characters.contains_key("Alice"));
        assert!(!record.party_characters.contains_key("Bob"));
    }

    #[test]
    fn test_parse_party_actor_not_in_party() {
        let err = parse_party(PARTY, "Dave").unwrap_err();
        assert_eq!(err, ParseError::ActorNotInParty("Dave".to_string()));
    }

    #[test]
    fn test_parse_party_single_member() {
        let text = "Session data: From 2024-03-10, 14:00:00 to 2024-03-10, 16:30:00
Loot: 10
Supplies: 5
Balance: 5
Alice (Leader)
Loot: 10
Supplies: 5
Balance: 5
";
        let err = parse_party(text, "Alice").unwrap_err();
        assert_eq!(err, ParseError::InsufficientPartySize { found: 1 });
    }

    #[test]
    fn test_parse_party_actor_checked_before_size() {
        let text = "Session data: From 2024-03-10, 14:00:00 to 2024-03-10, 16:30:00
Loot: 10
Supplies: 5
Balance: 5
Alice
Loot: 10
Supplies: 5
Balance: 5
";
        let err = parse_party(text, "Bob").unwrap_err();
        assert_eq!(err, ParseError::ActorNotInParty("Bob".to_string()));
    }

    #[test]
    fn test_repeated_session_line_rejected() {
        let text = MINIMAL.replace("Session: 1:00h\n", "Session: 1:00h\nSession: 2:00h\n");
        let err = parse_solo(&text).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateField {
                field: "Session",
                player: None
            }
        );
    }

    #[test]
    fn test_repeated_loot_type_rejected() {
        let text = PARTY.replace("Loot Type: Leader\n", "Loot Type: Leader\nLoot Type: Market\n");
        let err = parse_party(&text, "Bob").unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateField {
                field: "Loot Type",
                player: None
            }
        );
    }
}
