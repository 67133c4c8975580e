//! Rank benchmarks and improvement advice over a player's core stats.
//!
//! A player's replay numbers are compared with the per-game averages of a
//! target rank (the next rank up unless one is chosen). The biggest
//! shortfalls are turned into advice with practice drills.
use crate::{MatchSummary, PlayerRecord, TeamColor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ADVICE_COUNT: usize = 3;

/// Gaps averaged for the overall assessment.
const ASSESSMENT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rank {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Champion,
    #[serde(rename = "Grand Champion")]
    GrandChampion,
    #[serde(rename = "Supersonic Legend")]
    SupersonicLegend,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Bronze,
        Rank::Silver,
        Rank::Gold,
        Rank::Platinum,
        Rank::Diamond,
        Rank::Champion,
        Rank::GrandChampion,
        Rank::SupersonicLegend,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
            Rank::Champion => "Champion",
            Rank::GrandChampion => "Grand Champion",
            Rank::SupersonicLegend => "Supersonic Legend",
        }
    }

    /// Next rank up; Supersonic Legend is its own successor.
    pub fn next(self) -> Self {
        match self {
            Rank::Bronze => Rank::Silver,
            Rank::Silver => Rank::Gold,
            Rank::Gold => Rank::Platinum,
            Rank::Platinum => Rank::Diamond,
            Rank::Diamond => Rank::Champion,
            Rank::Champion => Rank::GrandChampion,
            Rank::GrandChampion | Rank::SupersonicLegend => Rank::SupersonicLegend,
        }
    }

    /// Per-game averages, indexed by `CoreStat`.
    fn benchmarks(&self) -> [f64; 6] {
        match self {
            Rank::Bronze => [250.0, 0.8, 0.4, 1.2, 2.5, 25.0],
            Rank::Silver => [350.0, 1.0, 0.6, 1.5, 3.5, 28.0],
            Rank::Gold => [450.0, 1.2, 0.8, 1.8, 4.5, 32.0],
            Rank::Platinum => [550.0, 1.4, 1.0, 2.0, 5.5, 35.0],
            Rank::Diamond => [650.0, 1.6, 1.2, 2.3, 6.5, 38.0],
            Rank::Champion => [750.0, 1.8, 1.4, 2.5, 7.5, 42.0],
            Rank::GrandChampion => [850.0, 2.0, 1.6, 2.8, 8.5, 45.0],
            Rank::SupersonicLegend => [950.0, 2.2, 1.8, 3.0, 9.5, 48.0],
        }
    }

    pub fn benchmark(&self, stat: CoreStat) -> f64 {
        self.benchmarks()[stat as usize]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRank(pub String);

impl fmt::Display for UnknownRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Rank::ALL.iter().map(Rank::label).collect();
        write!(f, "Unknown rank: {} (expected one of {})", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownRank {}

impl FromStr for Rank {
    type Err = UnknownRank;

    /// Case-insensitive; spaces, dashes and underscores are ignored, and
    /// the community short forms "plat", "champ", "gc" and "ssl" are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "bronze" => Ok(Rank::Bronze),
            "silver" => Ok(Rank::Silver),
            "gold" => Ok(Rank::Gold),
            "platinum" | "plat" => Ok(Rank::Platinum),
            "diamond" => Ok(Rank::Diamond),
            "champion" | "champ" => Ok(Rank::Champion),
            "grandchampion" | "gc" => Ok(Rank::GrandChampion),
            "supersoniclegend" | "ssl" => Ok(Rank::SupersonicLegend),
            _ => Err(UnknownRank(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreStat {
    Score,
    Goals,
    Assists,
    Saves,
    Shots,
    ShootingPercentage,
}

impl CoreStat {
    pub const ALL: [CoreStat; 6] = [
        CoreStat::Score,
        CoreStat::Goals,
        CoreStat::Assists,
        CoreStat::Saves,
        CoreStat::Shots,
        CoreStat::ShootingPercentage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CoreStat::Score => "score",
            CoreStat::Goals => "goals",
            CoreStat::Assists => "assists",
            CoreStat::Saves => "saves",
            CoreStat::Shots => "shots",
            CoreStat::ShootingPercentage => "shooting_percentage",
        }
    }

    pub fn value(&self, player: &PlayerRecord) -> f64 {
        match self {
            CoreStat::Score => player.score as f64,
            CoreStat::Goals => player.goals as f64,
            CoreStat::Assists => player.assists as f64,
            CoreStat::Saves => player.saves as f64,
            CoreStat::Shots => player.shots as f64,
            CoreStat::ShootingPercentage => player.shooting_percentage,
        }
    }

    fn tip(&self) -> Tip {
        match self {
            CoreStat::Score => Tip {
                title: "Overall Game Impact",
                advice: "Your overall score suggests you're not impacting games as much as you could. \
                         This is usually positioning and game sense rather than mechanics. Review your \
                         replays for moments where a different decision would have mattered.",
                drills: &[
                    "Replay Analysis Session",
                    "Positioning Tutorials by Virge",
                    "Rotation Practice Modes",
                    "Game Sense Workshop by Thanovic",
                ],
            },
            CoreStat::Goals => Tip {
                title: "Finishing & Offensive Pressure",
                advice: "You're scoring fewer goals than average for your rank. Work on recognising \
                         scoring chances, shot power and accuracy, and following up on your own shots.",
                drills: &[
                    "Finishing Training Packs",
                    "Redirect Practice",
                    "Follow-up Shot Training",
                    "Offensive Positioning Workshop",
                ],
            },
            CoreStat::Assists => Tip {
                title: "Passing & Team Play",
                advice: "Your assist numbers suggest you might be ball-chasing or not setting up \
                         teammates. Practise infield passes and centres, and trust teammates to \
                         finish the plays you set up.",
                drills: &[
                    "Passing Plays Workshop",
                    "Infield Pass Training",
                    "Center Ball Practice",
                    "Team Play Tutorial by Thanovic",
                ],
            },
            CoreStat::Saves => Tip {
                title: "Defensive Positioning & Saves",
                advice: "You're making fewer saves than typical for your rank, which often means you \
                         are too far forward or late back on defence. Practise shadow defence and \
                         read opponent shots earlier.",
                drills: &[
                    "Shadow Defense Tutorial by Virge",
                    "Save Training Packs",
                    "Backboard Defense Practice",
                    "Defensive Positioning Workshop",
                ],
            },
            CoreStat::Shots => Tip {
                title: "Shot Volume & Pressure",
                advice: "You're taking fewer shots than typical for your rank. More shots put more \
                         pressure on opponents; look for the space to shoot and take it.",
                drills: &[
                    "Shot Variety Training",
                    "Quick Shot Practice",
                    "Pressure Training",
                    "Offensive Awareness Workshop",
                ],
            },
            CoreStat::ShootingPercentage => Tip {
                title: "Shot Accuracy & Quality",
                advice: "Your shooting percentage is below average for your rank. Take higher quality \
                         shots rather than shooting whenever possible, and work on power shots and \
                         placement.",
                drills: &[
                    "Shooting Consistency by Poquito",
                    "Wall Shots Training",
                    "Powershot Training Pack",
                    "Ground Shots by Wayprotein",
                ],
            },
        }
    }
}

struct Tip {
    title: &'static str,
    advice: &'static str,
    drills: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatGap {
    pub stat: CoreStat,
    pub player_value: f64,
    pub target_value: f64,
    pub gap: f64,
    pub gap_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub priority: usize,
    pub stat: CoreStat,
    pub title: &'static str,
    pub advice: &'static str,
    pub drills: &'static [&'static str],
    pub gap_info: StatGap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachReport {
    pub player: String,
    pub team: TeamColor,
    pub current_rank: Rank,
    pub target_rank: Rank,
    pub overall_assessment: &'static str,
    pub advice: Vec<Advice>,
    pub all_gaps: Vec<StatGap>,
    /// 50 means exactly on the current rank's average; clamped to 0..=100.
    pub percentiles: BTreeMap<&'static str, f64>,
}

/// Structured output for a successful replay with coaching attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachedSummary {
    #[serde(flatten)]
    pub summary: MatchSummary,
    pub coaching: Vec<CoachReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coach {
    pub current: Rank,
    pub target: Rank,
    pub advice_count: usize,
}

impl Coach {
    pub fn new(current: Rank, target: Option<Rank>) -> Self {
        Self {
            current,
            target: target.unwrap_or_else(|| current.next()),
            advice_count: DEFAULT_ADVICE_COUNT,
        }
    }

    pub fn analyze(&self, player: &PlayerRecord) -> CoachReport {
        let gaps = self.stat_gaps(player);
        CoachReport {
            player: player.name.clone(),
            team: player.team,
            current_rank: self.current,
            target_rank: self.target,
            overall_assessment: overall_assessment(&gaps),
            advice: self.advice(&gaps),
            percentiles: self.percentiles(player),
            all_gaps: gaps,
        }
    }

    /// One report per player, in roster order.
    pub fn analyze_summary(&self, summary: &MatchSummary) -> Vec<CoachReport> {
        summary.players.iter().map(|p| self.analyze(p)).collect()
    }

    pub fn annotate(&self, summary: MatchSummary) -> CoachedSummary {
        CoachedSummary {
            coaching: self.analyze_summary(&summary),
            summary,
        }
    }

    /// Gaps against the target rank, largest relative gap first.
    fn stat_gaps(&self, player: &PlayerRecord) -> Vec<StatGap> {
        let mut gaps: Vec<StatGap> = CoreStat::ALL
            .iter()
            .map(|&stat| {
                let player_value = stat.value(player);
                let target_value = self.target.benchmark(stat);
                let gap = target_value - player_value;
                StatGap {
                    stat,
                    player_value: round_to(player_value, 2),
                    target_value: round_to(target_value, 2),
                    gap: round_to(gap, 2),
                    gap_percentage: round_to(gap / target_value * 100.0, 2),
                }
            })
            .collect();
        gaps.sort_by(|a, b| b.gap_percentage.abs().total_cmp(&a.gap_percentage.abs()));
        gaps
    }

    /// Only shortfalls get advice; beating the target is not a weakness.
    fn advice(&self, gaps: &[StatGap]) -> Vec<Advice> {
        gaps.iter()
            .filter(|g| g.gap > 0.0)
            .take(self.advice_count)
            .enumerate()
            .map(|(i, gap)| {
                let tip = gap.stat.tip();
                Advice {
                    priority: i + 1,
                    stat: gap.stat,
                    title: tip.title,
                    advice: tip.advice,
                    drills: tip.drills,
                    gap_info: gap.clone(),
                }
            })
            .collect()
    }

    fn percentiles(&self, player: &PlayerRecord) -> BTreeMap<&'static str, f64> {
        CoreStat::ALL
            .iter()
            .map(|&stat| {
                let pct = stat.value(player) / self.current.benchmark(stat) * 50.0;
                (stat.key(), round_to(pct.clamp(0.0, 100.0), 1))
            })
            .collect()
    }
}

fn overall_assessment(gaps: &[StatGap]) -> &'static str {
    let window = &gaps[..gaps.len().min(ASSESSMENT_WINDOW)];
    if window.is_empty() {
        return "Unable to assess performance with current data.";
    }
    let avg = window.iter().map(|g| g.gap_percentage.abs()).sum::<f64>() / window.len() as f64;

    if avg < 10.0 {
        "You're performing at or above your rank level! Focus on consistency and you'll rank up soon."
    } else if avg < 25.0 {
        "You're close to the next rank. Focus on the key areas below to push through."
    } else if avg < 40.0 {
        "There's room for improvement. Concentrate on the priority areas to advance your rank."
    } else {
        "Significant improvement needed. Focus on fundamentals in the priority areas below."
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
