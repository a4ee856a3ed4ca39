use clap::ValueEnum;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{ext::BestEffortPathExt, filesystem::LinkStyle, resolver::MissingRootPolicy};

pub const SETTINGS_FILE_NAME: &str = "overlink.yaml";

const KNOWN_KEYS: [&str; 4] = ["link_style", "on_missing_root", "log_file", "protected_roots"];

/// Values read from the optional settings file. Anything left unset falls
/// back to the command line or the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub link_style: Option<LinkStyle>,
    pub on_missing_root: Option<MissingRootPolicy>,
    pub log_file: Option<PathBuf>,
    pub protected_roots: Vec<PathBuf>,
}

impl Settings {
    /// Reads `explicit` when given, otherwise `overlink.yaml` in the working
    /// directory if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let default_path = PathBuf::from(SETTINGS_FILE_NAME);
                if default_path.is_file() {
                    Self::from_path(&default_path)
                } else {
                    debug!("No {} found, using defaults", SETTINGS_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.best_effort_path_display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_settings(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, SettingsError> {
        for key in top_level.keys() {
            match key.as_str() {
                Some(name) if KNOWN_KEYS.contains(&name) => {}
                _ => debug!("Ignoring unknown settings entry: {:?}", key),
            }
        }

        let link_style = string_entry(top_level, "link_style")?
            .map(|value| parse_choice::<LinkStyle>("link_style", value))
            .transpose()?;
        let on_missing_root = string_entry(top_level, "on_missing_root")?
            .map(|value| parse_choice::<MissingRootPolicy>("on_missing_root", value))
            .transpose()?;
        let log_file = string_entry(top_level, "log_file")?.map(PathBuf::from);
        let protected_roots = path_list_entry(top_level, "protected_roots")?;

        Ok(Settings {
            link_style,
            on_missing_root,
            log_file,
            protected_roots,
        })
    }
}

fn string_entry<'a>(
    top_level: &'a LinkedHashMap<Yaml, Yaml>,
    key: &'static str,
) -> Result<Option<&'a str>, SettingsError> {
    match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or(SettingsError::NotAStringError { key }),
    }
}

fn path_list_entry(
    top_level: &LinkedHashMap<Yaml, Yaml>,
    key: &'static str,
) -> Result<Vec<PathBuf>, SettingsError> {
    let Some(value) = top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) else {
        return Ok(Vec::new());
    };

    value
        .as_sequence()
        .ok_or(SettingsError::NotAListError { key })?
        .iter()
        .map(|item| {
            item.as_str()
                .map(PathBuf::from)
                .ok_or(SettingsError::NotAStringError { key })
        })
        .collect()
}

fn parse_choice<T: ValueEnum>(key: &'static str, value: &str) -> Result<T, SettingsError> {
    T::from_str(value, true).map_err(|_| SettingsError::InvalidChoiceError {
        key,
        value: value.to_string(),
    })
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        let contents_vec =
            Yaml::load_from_str(contents).map_err(|e| SettingsError::ParseError { source: e })?;
        let Some(contents) = contents_vec.first() else {
            return Ok(Settings::default());
        };

        let top_level = contents
            .as_mapping()
            .ok_or(SettingsError::TopLevelNotMap)?;

        Self::parse_settings(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Setting '{}' should be a string", key))]
    NotAStringError { key: &'static str },
    #[snafu(display("Setting '{}' should be a list", key))]
    NotAListError { key: &'static str },
    #[snafu(display("Setting '{}' has unrecognised value '{}'", key, value))]
    InvalidChoiceError { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::TempDir;

    #[test]
    fn settings_returns_error_on_nonexistent_file() {
        let result = Settings::from_path(Path::new("nonexistent.yaml"));
        assert!(matches!(result, Err(SettingsError::ReadError { .. })));
    }

    #[test]
    fn settings_returns_error_on_invalid_yaml() {
        let result: Result<Settings, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }

    #[test]
    fn settings_default_on_empty_file() {
        let result: Result<Settings, _> = "".try_into();
        assert_eq!(result.unwrap(), Settings::default());
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn settings_returns_error_when_top_level_is_not_map(#[case] contents: &str) {
        let result: Result<Settings, _> = contents.try_into();
        assert!(matches!(result, Err(SettingsError::TopLevelNotMap)));
    }

    #[test]
    fn settings_reads_every_known_key() {
        let contents = r#"
link_style: relative
on_missing_root: always-abort
log_file: /var/log/overlink.log
protected_roots:
  - /opt/tool-base
  - /srv/vendor
"#;
        let settings: Settings = contents.try_into().unwrap();

        assert_eq!(
            settings,
            Settings {
                link_style: Some(LinkStyle::Relative),
                on_missing_root: Some(MissingRootPolicy::AlwaysAbort),
                log_file: Some(PathBuf::from("/var/log/overlink.log")),
                protected_roots: vec![
                    PathBuf::from("/opt/tool-base"),
                    PathBuf::from("/srv/vendor")
                ],
            }
        );
    }

    #[test]
    fn settings_ignores_unknown_keys() {
        let settings: Settings = "colour: blue\nlink_style: absolute".try_into().unwrap();
        assert_eq!(settings.link_style, Some(LinkStyle::Absolute));
    }

    #[rstest]
    #[case("link_style: sideways")]
    #[case("on_missing_root: sometimes")]
    fn settings_rejects_unknown_choices(#[case] contents: &str) {
        let result: Result<Settings, _> = contents.try_into();
        assert!(matches!(result, Err(SettingsError::InvalidChoiceError { .. })));
    }

    #[rstest]
    #[case("link_style: [a, b]", "link_style")]
    #[case("log_file: {path: x}", "log_file")]
    #[case("protected_roots: [[nested]]", "protected_roots")]
    fn settings_rejects_wrong_value_types(#[case] contents: &str, #[case] expected_key: &str) {
        let result: Result<Settings, _> = contents.try_into();
        match result {
            Err(SettingsError::NotAStringError { key }) => assert_eq!(key, expected_key),
            other => panic!("Expected NotAStringError, got {other:?}"),
        }
    }

    #[test]
    fn settings_rejects_scalar_protected_roots() {
        let result: Result<Settings, _> = "protected_roots: /opt/tool-base".try_into();
        assert!(matches!(
            result,
            Err(SettingsError::NotAListError {
                key: "protected_roots"
            })
        ));
    }

    #[test]
    fn settings_load_reads_an_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "link_style: relative\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.link_style, Some(LinkStyle::Relative));
    }
}
