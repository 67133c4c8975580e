pub mod ballchasing;
pub mod client;
pub mod coach;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Replay summary types, as emitted to callers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    #[default]
    Blue,
    Orange,
}

impl TeamColor {
    /// Key of the team object in the replay document.
    pub fn key(&self) -> &'static str {
        match self {
            TeamColor::Blue => "blue",
            TeamColor::Orange => "orange",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamColor::Blue => "Blue",
            TeamColor::Orange => "Orange",
        }
    }

    /// Blue wins only on strictly more goals; a tie goes to orange.
    pub fn winner(blue_goals: i64, orange_goals: i64) -> Self {
        if blue_goals > orange_goals {
            TeamColor::Blue
        } else {
            TeamColor::Orange
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: TeamColor,
    pub platform: String,
    pub score: i64,
    pub goals: i64,
    pub assists: i64,
    pub saves: i64,
    pub shots: i64,
    pub shooting_percentage: f64,
    pub mvp: bool,
}

/// One analysed replay, with every optional upstream field already defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub replay_id: String,
    pub title: String,
    pub map: String,
    pub date: String,
    pub duration: i64,
    #[serde(rename = "gameMode")]
    pub game_mode: String,
    #[serde(rename = "blueScore")]
    pub blue_score: i64,
    #[serde(rename = "orangeScore")]
    pub orange_score: i64,
    #[serde(rename = "winningTeam")]
    pub winning_team: TeamColor,
    pub players: Vec<PlayerRecord>,
    pub success: bool,
}

impl MatchSummary {
    pub fn roster(&self, team: TeamColor) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter().filter(move |p| p.team == team)
    }
}

/// Payload emitted in structured (`--json`) mode.
///
/// A rejected replay (upstream status other than "ok") carries only the
/// error; every other failure also reports `success: false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplayOutput {
    Summary(MatchSummary),
    Rejected { error: String },
    Failed { error: String, success: bool },
}
