//! @ai:module:intent Configuration file and diagnostic policy for compatibility checks
//! @ai:module:layer infrastructure
//! @ai:module:public_api CheckConfig, ParseConfig, Policy
//! @ai:module:depends_on diagnostic, parser, model
//! @ai:module:stateless true

use crate::diagnostic::{Diagnostic, Diagnostics, Issue, Severity};
use crate::error::{Error, Result};
use crate::model::NullMode;
use crate::parser::ParseOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "sigcheck.toml";

/// @ai:intent Top-level configuration loaded from `sigcheck.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CheckConfig {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub policy: Policy,
}

/// @ai:intent How signature files are read
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ParseConfig {
    /// Forced null mode; when unset each file's header decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_mode: Option<NullMode>,
}

impl ParseConfig {
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            null_mode: self.null_mode,
        }
    }
}

/// @ai:intent Which findings are reported and which are fatal
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Policy {
    /// Codes that are never reported.
    #[serde(default)]
    pub suppress: Vec<u32>,
    /// Codes reported as errors.
    #[serde(default)]
    pub errors: Vec<u32>,
    #[serde(default)]
    pub warnings_as_errors: bool,
}

impl CheckConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)?;

        for code in config.policy.unknown_codes() {
            tracing::warn!(code, path = %path.display(), "unknown diagnostic code in policy");
        }

        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Policy {
    /// @ai:intent Filter and re-grade findings; order is preserved
    /// @ai:effects pure
    pub fn apply(&self, diagnostics: &Diagnostics) -> Diagnostics {
        let mut result = Diagnostics::new(&diagnostics.previous, &diagnostics.current);

        for diagnostic in diagnostics {
            if self.suppress.contains(&diagnostic.code) {
                continue;
            }
            result.push(Diagnostic {
                severity: self.severity_of(diagnostic),
                ..diagnostic.clone()
            });
        }

        result
    }

    fn severity_of(&self, diagnostic: &Diagnostic) -> Severity {
        if self.warnings_as_errors || self.errors.contains(&diagnostic.code) {
            Severity::Error
        } else {
            diagnostic.severity
        }
    }

    /// @ai:intent Codes named by this policy that no issue uses
    pub fn unknown_codes(&self) -> Vec<u32> {
        self.suppress
            .iter()
            .chain(&self.errors)
            .copied()
            .filter(|code| Issue::from_code(*code).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;
    use pretty_assertions::assert_eq;

    fn sample() -> Diagnostics {
        let mut diagnostics = Diagnostics::new("old.txt", "new.txt");
        for (issue, message) in [
            (Issue::RemovedClass, "Removed class p.A"),
            (Issue::ChangedClass, "Class p.B changed class/interface declaration"),
            (Issue::InvalidNullConversion, "Attempted to remove @Nullable annotation from method p.C.f"),
        ] {
            diagnostics.push(Diagnostic::warning(issue, message, "p", Location::new("new.txt", 1)));
        }
        diagnostics
    }

    #[test]
    fn test_default_policy_keeps_everything_as_warnings() {
        let applied = Policy::default().apply(&sample());
        assert_eq!(applied, sample());
        assert!(!applied.has_errors());
    }

    #[test]
    fn test_suppress_and_promote() {
        let policy = Policy {
            suppress: vec![23],
            errors: vec![40],
            warnings_as_errors: false,
        };
        let applied = policy.apply(&sample());

        assert_eq!(applied.codes(), vec![8, 40]);
        assert_eq!(applied.errors(), 1);
        assert_eq!(applied.warnings(), 1);
        assert_eq!(applied.as_slice()[1].severity, Severity::Error);
    }

    #[test]
    fn test_warnings_as_errors() {
        let policy = Policy {
            warnings_as_errors: true,
            ..Default::default()
        };
        let applied = policy.apply(&sample());
        assert_eq!(applied.errors(), 3);
        assert_eq!(applied.warnings(), 0);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let config: CheckConfig = toml::from_str(
            r#"
[parse]
null_mode = "null-aware"

[policy]
suppress = [7, 99]
"#,
        )
        .unwrap();

        assert_eq!(config.parse.null_mode, Some(NullMode::NullAware));
        assert_eq!(config.parse.options().null_mode, Some(NullMode::NullAware));
        assert_eq!(config.policy.suppress, vec![7, 99]);
        assert!(config.policy.errors.is_empty());
        assert_eq!(config.policy.unknown_codes(), vec![99]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let config = CheckConfig {
            parse: ParseConfig {
                null_mode: Some(NullMode::Legacy),
            },
            policy: Policy {
                suppress: vec![17],
                errors: vec![8, 9],
                warnings_as_errors: false,
            },
        };

        config.save(&path).unwrap();
        assert_eq!(CheckConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[policy]\nsuppress = \"all\"\n").unwrap();
        assert!(matches!(CheckConfig::load(&path), Err(Error::Config(_))));
    }
}
