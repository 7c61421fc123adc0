use clap::{CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Parse hunt analyzer reports, settle loot splits and chart hunting history
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hunt-analyzer",
    about = "Parse hunt analyzer reports, settle loot splits and chart hunting history",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level
    #[arg(
        long,
        global = true,
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"]
    )]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Comment pool (JSON) used for performance flavour text
    #[arg(long, global = true)]
    pub comments: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Seed for comment selection (random when omitted)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Clear saved preferences
    #[arg(long, global = true)]
    pub clear: bool,
}

/// What to do with the input.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze a loot-split session report: payments and performance
    Solo {
        /// Report file, or `-` for stdin
        input: PathBuf,
    },
    /// Summarise an individual XP analyzer report
    Xp {
        /// Report file, or `-` for stdin
        input: PathBuf,
    },
    /// Build the submission for a party hunt report
    Party {
        /// Report file, or `-` for stdin
        input: PathBuf,
        /// Acting character (name, or id when a roster is given)
        #[arg(long)]
        character: Option<String>,
        /// Known characters (JSON array of {pid, name, vocation, min_lvl, max_lvl})
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Fold stored sessions into a daily timeline for one character
    Timeline {
        /// Sessions grouped by date and hunting ground (JSON)
        input: PathBuf,
        /// Character id or name whose share is charted
        #[arg(long)]
        character: Option<String>,
        /// Restrict the damage series to these hunting grounds
        #[arg(long = "ground")]
        grounds: Vec<String>,
    },
}

impl Command {
    /// The acting character, for subcommands that take one.
    pub fn character(&self) -> Option<&str> {
        match self {
            Command::Solo { .. } | Command::Xp { .. } => None,
            Command::Party { character, .. } | Command::Timeline { character, .. } => {
                character.as_deref()
            }
        }
    }

    fn character_slot(&mut self) -> Option<&mut Option<String>> {
        match self {
            Command::Solo { .. } | Command::Xp { .. } => None,
            Command::Party { character, .. } | Command::Timeline { character, .. } => {
                Some(character)
            }
        }
    }
}

// ── SavedPreferences ───────────────────────────────────────────────────────────

/// Persisted preferences saved to `~/.hunt-analyzer/preferences.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct SavedPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl SavedPreferences {
    /// Return the default path to the preferences file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&app_dir_base())
    }

    /// Return the preferences path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".hunt-analyzer").join("preferences.json")
    }

    /// Load preferences from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Atomically write preferences to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the preferences file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// The application directory, `~/.hunt-analyzer`.
pub fn app_dir() -> PathBuf {
    app_dir_base().join(".hunt-analyzer")
}

fn app_dir_base() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with saved preferences where no explicit
    /// CLI value was provided, and persist the result.
    pub fn load_with_saved() -> Self {
        Self::load_with_saved_impl(
            std::env::args_os().collect(),
            &SavedPreferences::config_path(),
        )
    }

    /// Full implementation with an explicit argument list and preferences
    /// path, so tests can redirect to a temporary directory.
    pub fn load_with_saved_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = SavedPreferences::clear_at(config_path) {
                tracing::warn!("Could not clear preferences at {}: {}", config_path.display(), e);
            }
            return settings.resolve();
        }

        let saved = SavedPreferences::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = saved.format {
                settings.format = v;
            }
        }
        if settings.comments.is_none() {
            settings.comments = saved.comments;
        }
        if let Some(slot) = settings.command.character_slot() {
            if slot.is_none() {
                *slot = saved.character.clone();
            }
        }

        let mut prefs = SavedPreferences::from(&settings);
        if prefs.character.is_none() {
            prefs.character = saved.character;
        }
        if let Err(e) = prefs.save_to(config_path) {
            tracing::warn!("Could not save preferences to {}: {}", config_path.display(), e);
        }

        settings.resolve()
    }

    /// Apply the `--debug` override.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// `true` when JSON output was requested.
    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for SavedPreferences {
    fn from(s: &Settings) -> Self {
        SavedPreferences {
            comments: s.comments.clone(),
            character: s.command.character().map(str::to_string),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
