use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityProgress {
    pub done: u32,
    pub total: u32,
}

/// One status response from the job executor. Replaced wholesale on every
/// applied poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub progress_percent: f64,
    pub is_running: bool,
    pub status_message: String,
    pub current_search: String,
    pub current_profile: Option<String>,
    pub completed: Option<u64>,
    pub total: Option<u64>,
    /// Display only; the client never tracks a paused state of its own.
    pub is_paused: bool,
    pub desktop: BTreeMap<String, EntityProgress>,
    pub mobile: BTreeMap<String, EntityProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Desktop,
    Mobile,
}

impl Channel {
    pub fn label(self) -> &'static str {
        match self {
            Channel::Desktop => "Desktop",
            Channel::Mobile => "Mobile",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub name: String,
    pub done: u32,
    pub total: u32,
    /// `"name: done/total"`.
    pub label: String,
    /// Bar width in `[0, 100]`.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardSection {
    pub channel: Channel,
    pub rows: Vec<ProgressRow>,
}

/// Row view-model for the per-profile progress display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressBoard {
    pub sections: Vec<BoardSection>,
}

impl ProgressBoard {
    /// Builds the board from a single snapshot. Empty channels get no section.
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        let sections = [
            (Channel::Desktop, &snapshot.desktop),
            (Channel::Mobile, &snapshot.mobile),
        ]
        .into_iter()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(channel, entries)| BoardSection {
            channel,
            rows: entries.iter().map(|(name, p)| row(name, *p)).collect(),
        })
        .collect();
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, channel: Channel) -> Option<&BoardSection> {
        self.sections.iter().find(|section| section.channel == channel)
    }
}

fn row(name: &str, progress: EntityProgress) -> ProgressRow {
    ProgressRow {
        name: name.to_owned(),
        done: progress.done,
        total: progress.total,
        label: format!("{name}: {}/{}", progress.done, progress.total),
        percent: bar_percent(progress.done, progress.total),
    }
}

/// `done / total` as a percentage clamped to `[0, 100]`; zero totals give 0.
pub fn bar_percent(done: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(done) / f64::from(total) * 100.0).clamp(0.0, 100.0)
}
