use crate::ballchasing::{PlayerDoc, ReplayDoc, STATUS_OK};
use crate::{MatchSummary, PlayerRecord, ReplayOutput, TeamColor};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const BALLCHASING_API: &str = "https://ballchasing.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_TITLE: &str = "Unknown";
const DEFAULT_MAP: &str = "Unknown";
const DEFAULT_DURATION: i64 = 300;
const DEFAULT_GAME_MODE: &str = "Standard";
const UNKNOWN_PLAYER: &str = "Unknown";
const UNKNOWN_PLATFORM: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BALLCHASING_API.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// ballchasing.com replay API client.
#[derive(Debug, Clone)]
pub struct BallchasingApi {
    client: Client,
    config: ApiConfig,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Parse(serde_json::Error),
    Status(String),
    MissingField(&'static str),
    Malformed(&'static str),
}

/// Coarse classification used to decide the shape of the structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Parse,
    Status,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(..) => ErrorKind::Transport,
            ApiError::Parse(_) | ApiError::MissingField(_) | ApiError::Malformed(_) => {
                ErrorKind::Parse
            }
            ApiError::Status(_) => ErrorKind::Status,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parse(e) => write!(f, "JSON parsing error: {e}"),
            ApiError::Status(status) => write!(f, "Replay status: {status}"),
            ApiError::MissingField(path) => write!(f, "JSON parsing error: missing field {path}"),
            ApiError::Malformed(msg) => write!(f, "JSON parsing error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) => Some(e),
            ApiError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl BallchasingApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("rlreplay/", env!("CARGO_PKG_VERSION")))
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Value sent in the `Authorization` header.
    ///
    /// ballchasing expects the bare API key: no `Bearer` or other scheme
    /// prefix is added.
    pub fn authorization_header(&self) -> &str {
        &self.config.api_key
    }

    pub fn replay_url(&self, replay_id: &str) -> String {
        format!("{}/replays/{replay_id}", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch the raw replay document. One GET, no retries.
    ///
    /// Error statuses still return their body: ballchasing answers 404 with
    /// a JSON error object and gateways answer with HTML, and both are
    /// judged by `classify` like any other body.
    pub fn fetch_replay(&self, replay_id: &str) -> ApiResult<String> {
        let url = self.replay_url(replay_id);
        debug!("fetching replay {replay_id} from {url}");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.authorization_header())
            .timeout(self.config.timeout)
            .send()
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("replay {replay_id} answered with HTTP {status}");
        }

        response.text().map_err(|e| ApiError::Network(e, url))
    }

    /// Fetch, classify and summarise one replay.
    pub fn fetch_summary(&self, replay_id: &str) -> ApiResult<MatchSummary> {
        let raw = self.fetch_replay(replay_id)?;
        let data = classify(&raw)?;
        build_summary(replay_id, &data)
    }

    /// Same as `fetch_summary`, folded into the structured output shape.
    pub fn fetch_output(&self, replay_id: &str) -> ReplayOutput {
        ReplayOutput::from(self.fetch_summary(replay_id))
    }
}

impl From<ApiError> for ReplayOutput {
    fn from(err: ApiError) -> Self {
        let error = err.to_string();
        match err.kind() {
            ErrorKind::Status => ReplayOutput::Rejected { error },
            ErrorKind::Transport | ErrorKind::Parse => ReplayOutput::Failed { error, success: false },
        }
    }
}

impl From<ApiResult<MatchSummary>> for ReplayOutput {
    fn from(result: ApiResult<MatchSummary>) -> Self {
        match result {
            Ok(summary) => ReplayOutput::Summary(summary),
            Err(e) => e.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification: raw body → parsed document
// ---------------------------------------------------------------------------

/// Parse the response body and reject replays that upstream has not
/// finished processing.
pub fn classify(raw: &str) -> ApiResult<Value> {
    let data: Value = serde_json::from_str(raw).map_err(ApiError::Parse)?;
    if !data.is_object() {
        return Err(ApiError::Malformed("replay document is not an object"));
    }

    let status = ReplayDoc::new(&data)
        .status()
        .ok_or(ApiError::Malformed("replay status missing or not a string"))?;
    if status != STATUS_OK {
        debug!("replay rejected with status {status}");
        return Err(ApiError::Status(status.to_owned()));
    }

    Ok(data)
}

// ---------------------------------------------------------------------------
// Mapping: replay document → MatchSummary / PlayerRecord
// ---------------------------------------------------------------------------

/// Build the match summary from a classified document.
///
/// Team goal counts are the only required fields; everything else falls
/// back to a default.
pub fn build_summary(replay_id: &str, data: &Value) -> ApiResult<MatchSummary> {
    let replay = ReplayDoc::new(data);

    let blue = replay.team(TeamColor::Blue.key());
    let orange = replay.team(TeamColor::Orange.key());

    let blue_score = blue
        .and_then(|t| t.goals())
        .ok_or(ApiError::MissingField("blue.stats.core.goals"))?;
    let orange_score = orange
        .and_then(|t| t.goals())
        .ok_or(ApiError::MissingField("orange.stats.core.goals"))?;

    let players = [(TeamColor::Blue, blue), (TeamColor::Orange, orange)]
        .into_iter()
        .flat_map(|(color, team)| {
            team.into_iter()
                .flat_map(|t| t.players())
                .map(move |p| extract_player(p, color))
        })
        .collect();

    Ok(MatchSummary {
        replay_id: replay_id.to_owned(),
        title: replay.title().unwrap_or(DEFAULT_TITLE).to_owned(),
        map: replay.map_code().unwrap_or(DEFAULT_MAP).to_owned(),
        date: replay.date().unwrap_or_default().to_owned(),
        duration: replay.duration().unwrap_or(DEFAULT_DURATION),
        game_mode: replay.playlist_name().unwrap_or(DEFAULT_GAME_MODE).to_owned(),
        blue_score,
        orange_score,
        winning_team: TeamColor::winner(blue_score, orange_score),
        players,
        success: true,
    })
}

/// Map one roster entry. Never fails: each missing field takes its own default.
pub fn extract_player(player: PlayerDoc<'_>, team: TeamColor) -> PlayerRecord {
    let core = player.core();
    let stat = |field: &str| core.and_then(|c| c.int(field)).unwrap_or_default();

    PlayerRecord {
        name: player.name().unwrap_or(UNKNOWN_PLAYER).to_owned(),
        team,
        platform: player.platform().unwrap_or(UNKNOWN_PLATFORM).to_owned(),
        score: stat("score"),
        goals: stat("goals"),
        assists: stat("assists"),
        saves: stat("saves"),
        shots: stat("shots"),
        shooting_percentage: core
            .and_then(|c| c.float("shooting_percentage"))
            .unwrap_or_default(),
        mvp: player.mvp().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summarize(raw: &str) -> ReplayOutput {
        ReplayOutput::from(classify(raw).and_then(|data| build_summary("abc-123", &data)))
    }

    fn team(goals: i64, players: Value) -> Value {
        json!({"stats": {"core": {"goals": goals}}, "players": players})
    }

    #[test]
    fn minimal_ok_payload_maps_to_defaults() {
        let raw = json!({
            "status": "ok",
            "blue": {"stats": {"core": {"goals": 3}}, "players": [{"name": "A"}]},
            "orange": {"stats": {"core": {"goals": 1}}, "players": []},
        })
        .to_string();

        let out = serde_json::to_value(summarize(&raw)).unwrap();
        assert_eq!(out["blueScore"], json!(3));
        assert_eq!(out["orangeScore"], json!(1));
        assert_eq!(out["winningTeam"], json!("blue"));
        assert_eq!(out["success"], json!(true));
        assert!(out.get("error").is_none());
        assert_eq!(
            out["players"],
            json!([{
                "name": "A", "team": "blue", "platform": "Unknown",
                "score": 0, "goals": 0, "assists": 0, "saves": 0, "shots": 0,
                "shooting_percentage": 0.0, "mvp": false,
            }])
        );
        assert_eq!(out["replay_id"], json!("abc-123"));
        assert_eq!(out["title"], json!("Unknown"));
        assert_eq!(out["map"], json!("Unknown"));
        assert_eq!(out["date"], json!(""));
        assert_eq!(out["duration"], json!(300));
        assert_eq!(out["gameMode"], json!("Standard"));
    }

    #[test]
    fn pending_status_emits_error_only() {
        let out = serde_json::to_value(summarize(r#"{"status":"pending"}"#)).unwrap();
        assert_eq!(out, json!({"error": "Replay status: pending"}));
    }

    #[test]
    fn non_json_body_is_a_parse_failure() {
        let out = serde_json::to_value(summarize("<html>502 Bad Gateway</html>")).unwrap();
        assert_eq!(out["success"], json!(false));
        let error = out["error"].as_str().unwrap();
        assert!(error.starts_with("JSON parsing error: "), "got: {error}");
        assert_eq!(out.as_object().unwrap().len(), 2);
    }

    #[test]
    fn missing_status_is_a_parse_failure() {
        let err = classify(r#"{"title":"no status"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let err = classify("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_goal_count_is_a_parse_failure() {
        let data = json!({"status": "ok", "blue": team(1, json!([])), "orange": {"players": []}});
        let err = build_summary("x", &data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "JSON parsing error: missing field orange.stats.core.goals");
    }

    #[test]
    fn fractional_goal_counts_truncate() {
        let data = json!({
            "status": "ok",
            "blue": {"stats": {"core": {"goals": 2.5}}},
            "orange": team(2, json!([])),
        });
        let summary = build_summary("x", &data).unwrap();
        assert_eq!(summary.blue_score, 2);
        assert_eq!(summary.winning_team, TeamColor::Orange);
    }

    #[test]
    fn winner_requires_strictly_more_blue_goals() {
        let cases = [(3, 1, TeamColor::Blue), (2, 2, TeamColor::Orange), (0, 4, TeamColor::Orange)];
        for (b, o, expected) in cases {
            let data = json!({"status": "ok", "blue": team(b, json!([])), "orange": team(o, json!([]))});
            let summary = build_summary("x", &data).unwrap();
            assert_eq!(summary.winning_team, expected, "blue {b} vs orange {o}");
        }
    }

    #[test]
    fn players_keep_roster_order_blue_first() {
        let data = json!({
            "status": "ok",
            "orange": team(0, json!([{"name": "O1"}, {"name": "O2"}])),
            "blue": team(0, json!([{"name": "B1"}, {"name": "B2"}, {"name": "B3"}])),
        });
        let summary = build_summary("x", &data).unwrap();
        let names: Vec<_> = summary.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B1", "B2", "B3", "O1", "O2"]);
        assert_eq!(summary.roster(TeamColor::Orange).count(), 2);
        assert!(summary.players[..3].iter().all(|p| p.team == TeamColor::Blue));
    }

    #[test]
    fn missing_players_key_gives_empty_roster() {
        let data = json!({
            "status": "ok",
            "blue": {"stats": {"core": {"goals": 1}}},
            "orange": team(0, json!([{"name": "O1"}])),
        });
        let summary = build_summary("x", &data).unwrap();
        assert_eq!(summary.players.len(), 1);
        assert_eq!(summary.players[0].team, TeamColor::Orange);
    }

    #[test]
    fn player_without_stats_is_all_zero() {
        let node = json!({"name": "Ghost", "mvp": "yes"});
        let p = extract_player(PlayerDoc::new(&node), TeamColor::Orange);
        assert_eq!(
            p,
            PlayerRecord {
                name: "Ghost".into(),
                team: TeamColor::Orange,
                platform: "Unknown".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn player_stats_default_independently() {
        let node = json!({
            "id": {"platform": "epic"},
            "stats": {"core": {"goals": 2, "shots": 4, "shooting_percentage": 50.0}},
            "mvp": true,
        });
        let p = extract_player(PlayerDoc::new(&node), TeamColor::Blue);
        assert_eq!(p.name, "Unknown");
        assert_eq!(p.platform, "epic");
        assert_eq!((p.score, p.goals, p.assists, p.saves, p.shots), (0, 2, 0, 0, 4));
        assert_eq!(p.shooting_percentage, 50.0);
        assert!(p.mvp);
    }

    #[test]
    fn top_level_fields_are_read_when_present() {
        let data = json!({
            "status": "ok",
            "title": "RLCS Final",
            "map_code": "stadium_p",
            "date": "2024-05-01T18:30:00Z",
            "duration": 412,
            "playlist_name": "Ranked Doubles",
            "blue": team(2, json!([])),
            "orange": team(2, json!([])),
        });
        let s = build_summary("r1", &data).unwrap();
        assert_eq!(s.title, "RLCS Final");
        assert_eq!(s.map, "stadium_p");
        assert_eq!(s.date, "2024-05-01T18:30:00Z");
        assert_eq!(s.duration, 412);
        assert_eq!(s.game_mode, "Ranked Doubles");
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn api_for(server: &mockito::ServerGuard) -> BallchasingApi {
        BallchasingApi::new(ApiConfig {
            api_key: "secret-key".into(),
            base_url: server.url(),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn fetch_sends_raw_key_in_authorization_header() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/replays/abc-123")
            .match_header("authorization", "secret-key")
            .with_status(200)
            .with_body(r#"{"status":"ok","blue":{"stats":{"core":{"goals":1}}},"orange":{"stats":{"core":{"goals":0}}}}"#)
            .create();

        let summary = api_for(&server).fetch_summary("abc-123").unwrap();
        mock.assert();
        assert_eq!(summary.replay_id, "abc-123");
        assert_eq!(summary.winning_team, TeamColor::Blue);
    }

    #[test]
    fn gateway_error_page_is_a_parse_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/replays/r")
            .with_status(502)
            .with_body("<html>502 Bad Gateway</html>")
            .create();

        let out = serde_json::to_value(api_for(&server).fetch_output("r")).unwrap();
        assert_eq!(out["success"], json!(false));
        let error = out["error"].as_str().unwrap();
        assert!(error.starts_with("JSON parsing error: "), "got: {error}");
    }

    #[test]
    fn not_found_json_body_is_a_parse_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/replays/missing")
            .with_status(404)
            .with_body(r#"{"error":"not found"}"#)
            .create();

        let err = api_for(&server).fetch_summary("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(
            err.to_string(),
            "JSON parsing error: replay status missing or not a string"
        );
    }

    #[test]
    fn pending_replay_served_with_error_status_is_still_rejected() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/replays/p")
            .with_status(409)
            .with_body(r#"{"status":"pending"}"#)
            .create();

        let out = serde_json::to_value(api_for(&server).fetch_output("p")).unwrap();
        assert_eq!(out, json!({"error": "Replay status: pending"}));
    }

    #[test]
    fn unreachable_host_is_a_network_failure() {
        let api = BallchasingApi::new(ApiConfig {
            api_key: "k".into(),
            base_url: "http://127.0.0.1:1".into(),
            timeout: Duration::from_secs(2),
        });
        let err = api.fetch_replay("x").unwrap_err();
        assert!(matches!(err, ApiError::Network(..)));
    }

    #[test]
    fn replay_url_tolerates_trailing_slash() {
        let api = BallchasingApi::new(ApiConfig {
            base_url: "https://example.test/api/".into(),
            ..ApiConfig::new("k")
        });
        assert_eq!(api.replay_url("r1"), "https://example.test/api/replays/r1");
        assert_eq!(api.authorization_header(), "k");
    }
}
