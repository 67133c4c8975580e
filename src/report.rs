use ballchasing_api::coach::CoachReport;
use ballchasing_api::{MatchSummary, PlayerRecord, TeamColor};
use chrono::{DateTime, Utc};

/// Render the human-readable replay report.
pub fn render(s: &MatchSummary) -> String {
    let mut lines = vec![
        format!("Replay Title: {}", s.title),
        format!("Map: {}", s.map),
    ];
    if !s.date.is_empty() {
        lines.push(format!("Date: {}", format_date(&s.date)));
    }
    lines.push(format!("Mode: {}  Duration: {}", s.game_mode, format_duration(s.duration)));
    lines.push(format!(
        "Score: Blue {} - {} Orange ({} wins)",
        s.blue_score,
        s.orange_score,
        s.winning_team.label()
    ));

    for team in [TeamColor::Blue, TeamColor::Orange] {
        lines.push(String::new());
        lines.push(format!("--- {} Team ---", team.label()));
        for player in s.roster(team) {
            push_player(&mut lines, player);
        }
    }

    finish(lines)
}

fn push_player(lines: &mut Vec<String>, p: &PlayerRecord) {
    lines.push(String::new());
    lines.push(format!("Player: {}", p.name));
    lines.push(format!("  Platform: {}", p.platform));
    lines.push(format!("  Score: {}", p.score));
    lines.push(format!("  Goals: {}", p.goals));
    lines.push(format!("  Assists: {}", p.assists));
    lines.push(format!("  Saves: {}", p.saves));
    lines.push(format!("  Shots: {}", p.shots));
    lines.push(format!("  Shooting %: {:.2}", p.shooting_percentage));
    if p.mvp {
        lines.push("  MVP: Yes".to_string());
    }
}

/// Coaching section appended after the report when a rank is given.
pub fn render_coaching(reports: &[CoachReport]) -> String {
    let mut lines = Vec::new();
    for r in reports {
        lines.push(String::new());
        lines.push(format!(
            "--- Coaching: {} ({} -> {}) ---",
            r.player, r.current_rank, r.target_rank
        ));
        lines.push(r.overall_assessment.to_string());
        if r.advice.is_empty() {
            lines.push("  No stats below the target rank.".to_string());
        }
        for a in &r.advice {
            let gap = &a.gap_info;
            lines.push(format!(
                "  {}. {} ({}: {} vs {} target, {:.1}% short)",
                a.priority,
                a.title,
                a.stat.key(),
                gap.player_value,
                gap.target_value,
                gap.gap_percentage
            ));
            lines.push(format!("     {}", a.advice));
            lines.push(format!("     Drills: {}", a.drills.join(", ")));
        }
    }
    finish(lines)
}

fn finish(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    lines.join("\n")
}

/// RFC 3339 dates are shown in UTC; anything else is printed as received.
fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}

fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}
