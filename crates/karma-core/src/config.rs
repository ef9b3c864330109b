use crate::error::{KarmaError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// One rung of the role ladder: users with at least `threshold` karma may hold `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub role: String,
    pub threshold: i64,
}

// ---------------------------------------------------------------------------
// KarmaConfig
// ---------------------------------------------------------------------------

/// Validated karma configuration.
///
/// Always holds at least one tier, unique role names, and a default role
/// that is one of the tiers. Tiers are kept sorted by threshold ascending;
/// equal thresholds keep the order they were declared in.
#[derive(Debug, Clone)]
pub struct KarmaConfig {
    thresholds: Vec<Tier>,
    default_role: String,
    storage_path: PathBuf,
}

impl KarmaConfig {
    /// Build a config from `(role, threshold)` pairs in declaration order.
    ///
    /// When `default_role` is `None` the role with the smallest threshold is
    /// used, the first declared one winning ties.
    pub fn new<I, R>(
        thresholds: I,
        default_role: Option<&str>,
        storage_path: impl Into<PathBuf>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (R, i64)>,
        R: Into<String>,
    {
        let declared: Vec<Tier> = thresholds
            .into_iter()
            .map(|(role, threshold)| Tier {
                role: role.into(),
                threshold,
            })
            .collect();

        if declared.is_empty() {
            return Err(KarmaError::InvalidConfig(
                "thresholds must define at least one role".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for tier in &declared {
            if !seen.insert(tier.role.as_str()) {
                return Err(KarmaError::InvalidConfig(format!(
                    "role '{}' is declared more than once in thresholds",
                    tier.role
                )));
            }
        }

        let default_role = match default_role {
            Some(role) => {
                if !seen.contains(role) {
                    return Err(KarmaError::InvalidConfig(format!(
                        "default_role '{role}' is not one of the threshold roles"
                    )));
                }
                role.to_string()
            }
            None => lowest_tier(&declared).role.clone(),
        };

        let mut ladder = declared;
        // Stable: ties keep declaration order.
        ladder.sort_by_key(|t| t.threshold);

        Ok(Self {
            thresholds: ladder,
            default_role,
            storage_path: storage_path.into(),
        })
    }

    /// Load and validate a YAML manifest.
    ///
    /// A relative `storage.path` is resolved against the manifest's directory,
    /// never the working directory. Without one the store lives next to the
    /// manifest as `karma_state.json`.
    pub fn load(manifest: &Path) -> Result<Self> {
        if !manifest.exists() {
            return Err(KarmaError::ConfigNotFound(manifest.to_path_buf()));
        }
        let data = std::fs::read_to_string(manifest)?;
        let raw: Manifest = if data.trim().is_empty() {
            Manifest::default()
        } else {
            match serde_yaml::from_str::<Value>(&data)? {
                Value::Null => Manifest::default(),
                value => serde_yaml::from_value(value)?,
            }
        };

        let manifest_dir = match manifest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let base = std::fs::canonicalize(manifest_dir)?;

        let storage_path = match raw.storage.and_then(|s| s.path) {
            Some(p) if p.is_absolute() => paths::normalize(&p),
            Some(p) => paths::normalize(&base.join(p)),
            None => paths::default_store_path(&base),
        };

        let tiers = parse_thresholds(raw.thresholds)?;
        let config = Self::new(tiers, raw.default_role.as_deref(), storage_path)?;

        tracing::debug!(
            manifest = %manifest.display(),
            tiers = config.thresholds.len(),
            storage = %config.storage_path.display(),
            "loaded karma config"
        );
        Ok(config)
    }

    /// Tiers sorted by threshold ascending.
    pub fn thresholds(&self) -> &[Tier] {
        &self.thresholds
    }

    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Highest tier `karma` qualifies for, or the default role if none.
    pub fn resolve_role(&self, karma: i64) -> &str {
        self.thresholds
            .iter()
            .take_while(|t| karma >= t.threshold)
            .last()
            .map(|t| t.role.as_str())
            .unwrap_or(&self.default_role)
    }
}

fn lowest_tier(declared: &[Tier]) -> &Tier {
    let mut lowest = &declared[0];
    for tier in &declared[1..] {
        if tier.threshold < lowest.threshold {
            lowest = tier;
        }
    }
    lowest
}

// ---------------------------------------------------------------------------
// Manifest (on-disk shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    thresholds: Option<Value>,
    #[serde(default)]
    default_role: Option<String>,
    #[serde(default)]
    storage: Option<StorageSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    #[serde(default)]
    path: Option<PathBuf>,
}

/// Read `thresholds` in manifest order. The YAML mapping keeps insertion order.
fn parse_thresholds(value: Option<Value>) -> Result<Vec<(String, i64)>> {
    let mapping = match value {
        None | Some(Value::Null) => {
            return Err(KarmaError::InvalidConfig(
                "thresholds is required".to_string(),
            ))
        }
        Some(Value::Mapping(m)) => m,
        Some(_) => {
            return Err(KarmaError::InvalidConfig(
                "thresholds must be a mapping of role to minimum karma".to_string(),
            ))
        }
    };

    let mut out = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(role) = key.as_str() else {
            return Err(KarmaError::InvalidConfig(format!(
                "threshold role names must be strings, got {key:?}"
            )));
        };
        let Some(threshold) = value.as_i64() else {
            return Err(KarmaError::InvalidConfig(format!(
                "threshold for role '{role}' must be an integer"
            )));
        };
        out.push((role.to_string(), threshold));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("karma.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn ladder() -> KarmaConfig {
        KarmaConfig::new(
            [("novice", 0), ("specialist", 10)],
            Some("novice"),
            "/tmp/karma_state.json",
        )
        .unwrap()
    }

    #[test]
    fn resolves_highest_eligible_tier() {
        let cfg = ladder();
        assert_eq!(cfg.resolve_role(0), "novice");
        assert_eq!(cfg.resolve_role(9), "novice");
        assert_eq!(cfg.resolve_role(10), "specialist");
        assert_eq!(cfg.resolve_role(999), "specialist");
    }

    #[test]
    fn below_every_threshold_falls_back_to_default() {
        let cfg = KarmaConfig::new(
            [("member", 5), ("elder", 50)],
            Some("member"),
            "/tmp/k.json",
        )
        .unwrap();
        assert_eq!(cfg.resolve_role(0), "member");
        assert_eq!(cfg.resolve_role(4), "member");
        assert_eq!(cfg.resolve_role(50), "elder");
    }

    #[test]
    fn tiers_are_sorted_ascending() {
        let cfg = KarmaConfig::new(
            [("master", 100), ("novice", 0), ("adept", 25)],
            None,
            "/tmp/k.json",
        )
        .unwrap();
        let roles: Vec<&str> = cfg.thresholds().iter().map(|t| t.role.as_str()).collect();
        assert_eq!(roles, vec!["novice", "adept", "master"]);
        let thresholds: Vec<i64> = cfg.thresholds().iter().map(|t| t.threshold).collect();
        assert_eq!(thresholds, vec![0, 25, 100]);
    }

    #[test]
    fn equal_thresholds_resolve_to_last_declared() {
        let cfg = KarmaConfig::new([("a", 0), ("b", 0)], None, "/tmp/k.json").unwrap();
        assert_eq!(cfg.default_role(), "a");
        assert_eq!(cfg.resolve_role(0), "b");
    }

    #[test]
    fn new_rejects_empty_thresholds() {
        let empty: [(&str, i64); 0] = [];
        let err = KarmaConfig::new(empty, None, "/tmp/k.json").unwrap_err();
        assert!(matches!(err, KarmaError::InvalidConfig(_)));
    }

    #[test]
    fn new_rejects_duplicate_roles() {
        let err = KarmaConfig::new([("a", 0), ("a", 5)], None, "/tmp/k.json").unwrap_err();
        assert!(matches!(err, KarmaError::InvalidConfig(_)));
    }

    #[test]
    fn load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = KarmaConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, KarmaError::ConfigNotFound(_)));
    }

    #[test]
    fn load_full_manifest() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "thresholds:\n  novice: 0\n  specialist: 10\ndefault_role: novice\nstorage:\n  path: data/karma.json\n",
        );
        let cfg = KarmaConfig::load(&path).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(cfg.default_role(), "novice");
        assert_eq!(cfg.thresholds().len(), 2);
        assert_eq!(cfg.storage_path(), base.join("data/karma.json"));
        assert!(cfg.storage_path().is_absolute());
    }

    #[test]
    fn load_derives_default_role_from_lowest_threshold() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "thresholds:\n  specialist: 10\n  apprentice: -5\n  novice: 0\n",
        );
        let cfg = KarmaConfig::load(&path).unwrap();
        assert_eq!(cfg.default_role(), "apprentice");
    }

    #[test]
    fn load_default_role_tie_uses_first_declared() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "thresholds:\n  zeta: 0\n  alpha: 0\n");
        let cfg = KarmaConfig::load(&path).unwrap();
        assert_eq!(cfg.default_role(), "zeta");
    }

    #[test]
    fn load_rejects_unknown_default_role() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "thresholds:\n  novice: 0\ndefault_role: wizard\n");
        let err = KarmaConfig::load(&path).unwrap_err();
        assert!(matches!(err, KarmaError::InvalidConfig(_)));
    }

    #[test]
    fn load_rejects_missing_and_empty_thresholds() {
        let dir = TempDir::new().unwrap();
        for body in ["default_role: novice\n", "thresholds: {}\n", "thresholds:\n", ""] {
            let path = write_manifest(&dir, body);
            let err = KarmaConfig::load(&path).unwrap_err();
            assert!(
                matches!(err, KarmaError::InvalidConfig(_)),
                "expected schema error for {body:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn load_rejects_non_integer_threshold() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "thresholds:\n  novice: lots\n");
        let err = KarmaConfig::load(&path).unwrap_err();
        assert!(matches!(err, KarmaError::InvalidConfig(_)));
    }

    #[test]
    fn load_rejects_thresholds_list() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "thresholds:\n  - novice\n  - specialist\n");
        let err = KarmaConfig::load(&path).unwrap_err();
        assert!(matches!(err, KarmaError::InvalidConfig(_)));
    }

    #[test]
    fn load_without_storage_uses_manifest_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "thresholds:\n  novice: 0\n");
        let cfg = KarmaConfig::load(&path).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(cfg.storage_path(), base.join(paths::STORE_FILE));
    }

    #[test]
    fn load_keeps_absolute_storage_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("elsewhere/./state.json");
        let body = format!(
            "thresholds:\n  novice: 0\nstorage:\n  path: {}\n",
            target.display()
        );
        let path = write_manifest(&dir, &body);
        let cfg = KarmaConfig::load(&path).unwrap();
        assert_eq!(cfg.storage_path(), dir.path().join("elsewhere/state.json"));
    }

    #[test]
    fn load_resolves_parent_relative_storage_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        let path = dir.path().join("config/karma.yaml");
        std::fs::write(
            &path,
            "thresholds:\n  novice: 0\nstorage:\n  path: ../var/karma.json\n",
        )
        .unwrap();
        let cfg = KarmaConfig::load(&path).unwrap();
        let base = dir.path().canonicalize().unwrap();
        assert_eq!(cfg.storage_path(), base.join("var/karma.json"));
    }

    #[test]
    fn load_ignores_unrelated_sections() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "presets:\n  fast: {}\nthresholds:\n  novice: 0\n",
        );
        assert!(KarmaConfig::load(&path).is_ok());
    }
}
