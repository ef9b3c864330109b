//! Karma balances with threshold-derived roles.
//!
//! The manager keeps every known balance in memory and rewrites the whole
//! store after each mutation. Roles are never read back from disk; they are
//! derived from karma and the active thresholds whenever a profile is
//! observed.
//!
//! Store layout (`karma_state.json` by default):
//!
//! ```json
//! {
//!   "alice": {
//!     "karma": 10,
//!     "role": "specialist"
//!   }
//! }
//! ```

use crate::config::KarmaConfig;
use crate::error::{KarmaError, Result};
use crate::io;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarmaProfile {
    pub username: String,
    pub karma: i64,
    pub role: String,
}

/// One entry as written to the store. `role` is there for people reading
/// the file.
#[derive(Debug, Serialize)]
struct StoredProfile<'a> {
    karma: i64,
    role: &'a str,
}

/// One entry as read back. Everything except `karma` is ignored, whatever
/// its type.
#[derive(Debug, Deserialize)]
struct LoadedProfile {
    #[serde(default, deserialize_with = "whole_karma")]
    karma: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKarma {
    Int(i64),
    Float(f64),
}

/// Accept integers and integral floats (`12.0`); reject fractions.
fn whole_karma<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match RawKarma::deserialize(deserializer)? {
        RawKarma::Int(k) => Ok(k),
        RawKarma::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        RawKarma::Float(f) => Err(D::Error::custom(format!(
            "karma must be a whole number, got {f}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// KarmaManager
// ---------------------------------------------------------------------------

/// Owns one profile store. Not shared between processes; concurrent writers
/// to the same file silently overwrite each other.
#[derive(Debug)]
pub struct KarmaManager {
    config: KarmaConfig,
    balances: BTreeMap<String, i64>,
}

impl KarmaManager {
    /// Load the store named by `config`. A missing file is an empty store.
    pub fn open(config: KarmaConfig) -> Result<Self> {
        let balances = load_balances(config.storage_path())?;
        Ok(Self { config, balances })
    }

    pub fn config(&self) -> &KarmaConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.balances.contains_key(username)
    }

    /// Add `points` (possibly negative) to `username`, flooring at zero, and
    /// persist the store.
    ///
    /// Zero points is a plain read: nothing is created or written. If the
    /// write fails the in-memory balance is rolled back so memory and disk
    /// stay in agreement.
    pub fn award(&mut self, username: &str, points: i64) -> Result<KarmaProfile> {
        self.award_with(username, points, io::atomic_write)
    }

    /// `award` with the store write supplied by the caller.
    fn award_with<W>(&mut self, username: &str, points: i64, write: W) -> Result<KarmaProfile>
    where
        W: FnOnce(&Path, &[u8]) -> Result<()>,
    {
        if points == 0 {
            return Ok(self.get_profile(username));
        }

        let previous = self.balances.get(username).copied();
        let karma = previous.unwrap_or(0).saturating_add(points).max(0);
        self.balances.insert(username.to_string(), karma);

        if let Err(e) = self.save(write) {
            match previous {
                Some(k) => self.balances.insert(username.to_string(), k),
                None => self.balances.remove(username),
            };
            return Err(e);
        }

        let profile = self.profile_for(username);
        tracing::info!(
            username,
            points,
            karma = profile.karma,
            role = %profile.role,
            "karma awarded"
        );
        Ok(profile)
    }

    /// Current profile for `username`. Unknown users get a virtual profile
    /// with zero karma and the default role; it is not stored.
    pub fn get_profile(&self, username: &str) -> KarmaProfile {
        self.profile_for(username)
    }

    /// All known profiles, highest karma first, ties by username.
    pub fn list_profiles(&self) -> Vec<KarmaProfile> {
        let mut profiles: Vec<KarmaProfile> = self
            .balances
            .iter()
            .map(|(username, &karma)| self.derive(username, karma))
            .collect();
        profiles.sort_by(|a, b| {
            b.karma
                .cmp(&a.karma)
                .then_with(|| a.username.cmp(&b.username))
        });
        profiles
    }

    fn profile_for(&self, username: &str) -> KarmaProfile {
        match self.balances.get(username) {
            Some(&karma) => self.derive(username, karma),
            None => KarmaProfile {
                username: username.to_string(),
                karma: 0,
                role: self.config.default_role().to_string(),
            },
        }
    }

    fn derive(&self, username: &str, karma: i64) -> KarmaProfile {
        KarmaProfile {
            username: username.to_string(),
            karma,
            role: self.config.resolve_role(karma).to_string(),
        }
    }

    fn save<W>(&self, write: W) -> Result<()>
    where
        W: FnOnce(&Path, &[u8]) -> Result<()>,
    {
        let snapshot: BTreeMap<&str, StoredProfile<'_>> = self
            .balances
            .iter()
            .map(|(username, &karma)| {
                let role = self.config.resolve_role(karma);
                (username.as_str(), StoredProfile { karma, role })
            })
            .collect();
        let mut data = serde_json::to_string_pretty(&snapshot)?;
        data.push('\n');

        let path = self.config.storage_path();
        write(path, data.as_bytes())?;
        tracing::debug!(
            path = %path.display(),
            profiles = snapshot.len(),
            "saved karma store"
        );
        Ok(())
    }
}

fn load_balances(path: &Path) -> Result<BTreeMap<String, i64>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no karma store yet");
        return Ok(BTreeMap::new());
    }
    let data = std::fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let raw: BTreeMap<String, LoadedProfile> =
        serde_json::from_str(&data).map_err(|source| KarmaError::CorruptStore {
            path: path.to_path_buf(),
            source,
        })?;

    let balances: BTreeMap<String, i64> = raw
        .into_iter()
        .map(|(username, stored)| (username, stored.karma.max(0)))
        .collect();
    tracing::debug!(
        path = %path.display(),
        profiles = balances.len(),
        "loaded karma store"
    );
    Ok(balances)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
