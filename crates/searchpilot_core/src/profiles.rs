use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Catalog status text shown while the profile list is unknown.
pub const LOOKING_FOR_PROFILES: &str = "Looking for profiles…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Browser {
    #[default]
    Edge,
    Chrome,
}

impl Browser {
    /// Identifier understood by the job executor.
    pub fn as_str(self) -> &'static str {
        match self {
            Browser::Edge => "edge",
            Browser::Chrome => "chrome",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "edge" => Ok(Browser::Edge),
            "chrome" => Ok(Browser::Chrome),
            other => Err(format!("unknown browser '{other}' (expected edge or chrome)")),
        }
    }
}

/// Profile tier. Semantics are owned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Level {
    #[default]
    One,
    Two,
}

impl Level {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Level::One => Level::Two,
            Level::Two => Level::One,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub directory: Option<String>,
    pub path: Option<String>,
}

impl Profile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    /// Browser changed (or never fetched); contents are not trustworthy.
    #[default]
    Stale,
    Loading,
    Ready,
}

/// Profiles available for the current browser.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileCatalog {
    browser: Browser,
    profiles: Vec<Profile>,
    status: CatalogStatus,
    committed: bool,
    latest_request: u64,
}

impl ProfileCatalog {
    pub fn browser(&self) -> Browser {
        self.browser
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn status(&self) -> CatalogStatus {
        self.status
    }

    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// Whether `request` is the newest fetch issued for this catalog.
    pub fn is_current(&self, browser: Browser, request: u64) -> bool {
        self.browser == browser && self.latest_request == request
    }

    /// Switches browser context; the previous list and any fetch in flight
    /// are dropped.
    pub(crate) fn reset(&mut self, browser: Browser) {
        self.browser = browser;
        self.profiles.clear();
        self.status = CatalogStatus::Stale;
        self.committed = false;
        self.latest_request += 1;
    }

    /// Returns the id the fetch result must carry to be accepted.
    pub(crate) fn begin_loading(&mut self) -> u64 {
        self.latest_request += 1;
        self.status = CatalogStatus::Loading;
        self.latest_request
    }

    pub(crate) fn commit(&mut self, profiles: Vec<Profile>) {
        self.profiles = profiles;
        self.status = CatalogStatus::Ready;
        self.committed = true;
    }

    /// A failed fetch keeps whatever was committed before it.
    pub(crate) fn abort_loading(&mut self) {
        self.status = if self.committed {
            CatalogStatus::Ready
        } else {
            CatalogStatus::Stale
        };
    }
}

/// User-picked profiles, keyed by name, in pick order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    entries: Vec<Profile>,
}

impl Selection {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[Profile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a snapshot of `profile` if absent, removes it otherwise.
    /// Returns whether the profile is selected afterwards.
    pub fn toggle(&mut self, profile: &Profile) -> bool {
        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.name == profile.name)
        {
            self.entries.remove(index);
            false
        } else {
            self.entries.push(profile.clone());
            true
        }
    }

    pub fn replace_with(&mut self, profiles: &[Profile]) {
        self.entries.clear();
        for profile in profiles {
            if !self.contains(&profile.name) {
                self.entries.push(profile.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLevel {
    seq: u64,
    level: Level,
}

/// Confirmed per-profile levels plus the bookkeeping for in-flight changes.
///
/// Every request gets a sequence number. A confirmation only lands if it is
/// newer than the last one applied for that profile, so a slow response for
/// an older request cannot overwrite a newer confirmed level.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelCache {
    confirmed: BTreeMap<String, Level>,
    applied_seq: BTreeMap<String, u64>,
    pending: BTreeMap<String, PendingLevel>,
    next_seq: u64,
}

impl LevelCache {
    /// Confirmed level; profiles the server has not reported are level 1.
    pub fn level(&self, name: &str) -> Level {
        self.confirmed.get(name).copied().unwrap_or_default()
    }

    /// Level requested by the newest in-flight change, if any.
    pub fn pending(&self, name: &str) -> Option<Level> {
        self.pending.get(name).map(|pending| pending.level)
    }

    pub(crate) fn replace_confirmed(&mut self, levels: BTreeMap<String, Level>) {
        self.confirmed = levels;
    }

    pub(crate) fn request(&mut self, name: &str, level: Level) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending
            .insert(name.to_owned(), PendingLevel { seq, level });
        seq
    }

    /// Returns false when the confirmation was older than one already applied.
    pub(crate) fn confirm(&mut self, name: &str, level: Level, seq: u64) -> bool {
        self.settle(name, seq);
        let last = self.applied_seq.get(name).copied().unwrap_or(0);
        if seq <= last {
            return false;
        }
        self.applied_seq.insert(name.to_owned(), seq);
        self.confirmed.insert(name.to_owned(), level);
        true
    }

    pub(crate) fn reject(&mut self, name: &str, seq: u64) {
        self.settle(name, seq);
    }

    fn settle(&mut self, name: &str, seq: u64) {
        if self.pending.get(name).is_some_and(|pending| pending.seq == seq) {
            self.pending.remove(name);
        }
    }
}
