//! Submission payload and acting-character resolution.

use std::path::Path;

use hunt_core::error::{HuntError, ParseError, Result};
use hunt_core::models::{Character, PartySessionRecord, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::parse_party;

// ── HuntSubmission ────────────────────────────────────────────────────────────

/// The body sent to the persistence API for one hunt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntSubmission {
    pub is_party_hunt: bool,
    pub individual_session_data: Option<SessionRecord>,
    pub party_hunt_data: Option<PartySessionRecord>,
}

impl HuntSubmission {
    /// Build a submission; at least one record is required.
    pub fn new(
        individual: Option<SessionRecord>,
        party: Option<PartySessionRecord>,
    ) -> Result<Self> {
        if individual.is_none() && party.is_none() {
            return Err(HuntError::Config(
                "a hunt submission needs an individual or a party session".to_string(),
            ));
        }
        Ok(Self {
            is_party_hunt: party.is_some(),
            individual_session_data: individual,
            party_hunt_data: party,
        })
    }

    pub fn solo(record: SessionRecord) -> Self {
        Self {
            is_party_hunt: false,
            individual_session_data: Some(record),
            party_hunt_data: None,
        }
    }

    pub fn party(record: PartySessionRecord) -> Self {
        Self {
            is_party_hunt: true,
            individual_session_data: None,
            party_hunt_data: Some(record),
        }
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

/// Characters known to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pub characters: Vec<Character>,
}

impl Roster {
    pub fn new(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    /// Load a JSON array of characters.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HuntError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let roster: Roster = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} character(s) from {}",
            roster.characters.len(),
            path.display()
        );
        Ok(roster)
    }

    /// Find a character by exact pid, then by case-insensitive name.
    pub fn resolve(&self, id_or_name: &str) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.pid == id_or_name)
            .or_else(|| {
                self.characters
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(id_or_name))
            })
    }
}

/// Parse a party report on behalf of a roster character given by pid or name.
pub fn parse_party_for(
    text: &str,
    id_or_name: &str,
    roster: &Roster,
) -> std::result::Result<PartySessionRecord, ParseError> {
    let character = roster
        .resolve(id_or_name)
        .ok_or_else(|| ParseError::UnknownCharacter(id_or_name.to_string()))?;
    parse_party(text, &character.name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
