//! Text rendering of dashboard snapshots.

use std::fmt::Write as _;

use smartmail_core::{DashboardSnapshot, EmailRecord, SessionPhase, SessionState, SyncState};

/// Renders the whole dashboard.
#[must_use]
pub fn render(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Smart Email Assistant ==");
    out.push_str(&session_line(&snapshot.session));
    out.push('\n');

    if let Some(sync) = &snapshot.sync {
        out.push('\n');
        render_sync(&mut out, sync);
    }

    out
}

fn session_line(session: &SessionState) -> String {
    let label = match session.phase {
        SessionPhase::Checking => "checking",
        SessionPhase::Unauthenticated => "signed out",
        SessionPhase::Authenticating => "signing in",
        SessionPhase::Authenticated => "signed in",
        SessionPhase::Error => "error",
    };
    format!("[{label}] {}", session.message)
}

fn render_sync(out: &mut String, sync: &SyncState) {
    let _ = writeln!(out, "Email Dashboard (refresh every {})", sync.interval);
    if sync.loading {
        let _ = writeln!(out, "Loading emails...");
    }
    if let Some(error) = &sync.error {
        let _ = writeln!(out, "! {error}");
    }

    if sync.records.is_empty() {
        if !sync.loading {
            let _ = writeln!(out, "No emails today.");
        }
        return;
    }

    for (index, record) in sync.records.iter().enumerate() {
        render_record(out, index + 1, record);
    }
}

fn render_record(out: &mut String, number: usize, record: &EmailRecord) {
    let _ = writeln!(
        out,
        "{number:>3}. {} | {} | {}",
        record.sender,
        record.subject,
        record.date.to_local_string()
    );
    let _ = writeln!(
        out,
        "     Priority: {}  Replied: {}",
        record.priority,
        if record.replied { "Yes" } else { "No" }
    );
    if !record.summary.is_empty() {
        let _ = writeln!(out, "     Summary: {}", record.summary);
    }
    if !record.draft_reply.is_empty() {
        let _ = writeln!(out, "     Suggested Reply: {}", record.draft_reply);
    }
}
