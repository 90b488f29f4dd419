use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pilot_logging::{pilot_error, pilot_info, pilot_warn};
use searchpilot_core::{Browser, Preferences};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const PREFS_FILENAME: &str = ".searchpilot_prefs.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PersistedPrefs {
    browser: String,
    delay_secs: f64,
    mobile_enabled: bool,
}

impl Default for PersistedPrefs {
    fn default() -> Self {
        Self::from(&Preferences::default())
    }
}

impl From<&Preferences> for PersistedPrefs {
    fn from(prefs: &Preferences) -> Self {
        Self {
            browser: prefs.browser.as_str().to_string(),
            delay_secs: prefs.delay_secs,
            mobile_enabled: prefs.mobile_enabled,
        }
    }
}

/// Reads saved preferences. Missing or unreadable files give defaults.
pub(crate) fn load_preferences(state_dir: &Path) -> Preferences {
    let path = state_dir.join(PREFS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            pilot_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    let persisted: PersistedPrefs = match ron::from_str(&content) {
        Ok(prefs) => prefs,
        Err(err) => {
            pilot_warn!("Failed to parse preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    let defaults = Preferences::default();
    let browser = persisted.browser.parse::<Browser>().unwrap_or_else(|err| {
        pilot_warn!("Ignoring saved browser: {}", err);
        defaults.browser
    });
    let delay_secs = if persisted.delay_secs.is_finite() && persisted.delay_secs >= 0.0 {
        persisted.delay_secs
    } else {
        pilot_warn!("Ignoring saved delay {}", persisted.delay_secs);
        defaults.delay_secs
    };

    pilot_info!("Loaded preferences from {:?}", path);
    Preferences {
        browser,
        delay_secs,
        mobile_enabled: persisted.mobile_enabled,
    }
}

pub(crate) fn save_preferences(state_dir: &Path, prefs: &Preferences) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&PersistedPrefs::from(prefs), pretty) {
        Ok(text) => text,
        Err(err) => {
            pilot_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(state_dir, PREFS_FILENAME, &content) {
        pilot_error!("Failed to write preferences to {:?}: {}", state_dir, err);
    }
}

/// Writes `{dir}/{filename}` through a temp file in the same directory, then
/// renames it into place.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}
