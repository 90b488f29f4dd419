use std::fmt::Write;

use searchpilot_core::{AppViewModel, BoardSection, CatalogStatus, JobRunState, ProfileRowView};

const BAR_WIDTH: usize = 20;

fn job_label(job: JobRunState) -> &'static str {
    match job {
        JobRunState::Idle => "Idle",
        JobRunState::Starting => "Starting",
        JobRunState::Running => "Running",
        JobRunState::Stopping => "Stopping",
    }
}

/// One-line status, printed whenever it changes.
pub fn summary(view: &AppViewModel) -> String {
    let mut line = format!("[{}", job_label(view.job));
    if view.is_paused {
        line.push_str(", paused");
    }
    line.push(']');

    if view.job.is_active() {
        let _ = write!(line, " {:.1}%", view.progress_percent);
        if let (Some(completed), Some(total)) = (view.completed, view.total) {
            let _ = write!(line, " ({completed}/{total})");
        }
    }
    if !view.status_message.is_empty() {
        let _ = write!(line, " {}", view.status_message);
    }
    if view.job.is_active() {
        if let Some(profile) = view.current_profile.as_deref().filter(|p| !p.is_empty()) {
            let _ = write!(line, " | profile: {profile}");
        }
        if !view.current_search.is_empty() {
            let _ = write!(line, " | search: {}", view.current_search);
        }
    }
    line
}

/// Full state dump for the `show` command.
pub fn full(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary(view));
    let _ = writeln!(out, "Controls: {}", controls_line(view));

    let _ = writeln!(out, "Queries ({}):", view.queries.len());
    for query in &view.queries {
        let _ = writeln!(out, "  {query}");
    }

    let _ = writeln!(
        out,
        "Browser: {} | delay {}s | mobile {}",
        view.browser,
        view.delay_secs,
        if view.mobile_enabled { "on" } else { "off" }
    );
    if let Some(count) = view.mobile_search_count {
        let _ = writeln!(out, "Mobile searches per profile: {count}");
    }

    let _ = writeln!(out, "Profiles: {}", view.catalog_text);
    if view.catalog_status != CatalogStatus::Loading {
        for row in &view.profiles {
            let _ = writeln!(out, "  {}", profile_line(row));
        }
    }
    let applied = if view.applied.is_empty() {
        "default profile".to_string()
    } else {
        view.applied.join(", ")
    };
    let _ = writeln!(out, "Next run uses: {applied}");

    for section in &view.board.sections {
        out.push_str(&section_text(section));
    }
    out
}

fn controls_line(view: &AppViewModel) -> String {
    let controls = [
        ("start", view.controls.start),
        ("pause", view.controls.pause),
        ("resume", view.controls.resume),
        ("stop", view.controls.stop),
    ];
    let enabled: Vec<&str> = controls
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect();
    if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(" ")
    }
}

fn profile_line(row: &ProfileRowView) -> String {
    let mark = if row.selected { "[x]" } else { "[ ]" };
    match row.pending_level {
        Some(pending) => format!("{mark} {} {} -> {}…", row.name, row.level, pending),
        None => format!("{mark} {} {}", row.name, row.level),
    }
}

pub fn section_text(section: &BoardSection) -> String {
    let mut out = format!("{} progress:\n", section.channel.label());
    let width = section
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);
    for row in &section.rows {
        let _ = writeln!(
            out,
            "  {:<width$} {} {:>5.1}%",
            row.label,
            bar(row.percent),
            row.percent
        );
    }
    out
}

/// Text bar for a percentage in `[0, 100]`.
pub fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
