//! Borrowed views over a raw ballchasing replay document.
//! Endpoint: https://ballchasing.com/api/replays/{id}
//!
//! The upstream schema is irregular (most keys are optional and nesting
//! depth varies between replays), so every accessor returns an `Option`
//! and the caller picks the default.
use serde_json::Value;

pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone, Copy)]
pub struct ReplayDoc<'a>(&'a Value);

impl<'a> ReplayDoc<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn status(&self) -> Option<&'a str> {
        str_at(self.0, "status")
    }

    pub fn title(&self) -> Option<&'a str> {
        str_at(self.0, "title")
    }

    pub fn map_code(&self) -> Option<&'a str> {
        str_at(self.0, "map_code")
    }

    pub fn date(&self) -> Option<&'a str> {
        str_at(self.0, "date")
    }

    /// Match length in seconds.
    pub fn duration(&self) -> Option<i64> {
        self.0.get("duration").and_then(as_int)
    }

    pub fn playlist_name(&self) -> Option<&'a str> {
        str_at(self.0, "playlist_name")
    }

    /// `blue` or `orange` team object.
    pub fn team(&self, key: &str) -> Option<TeamDoc<'a>> {
        self.0.get(key).filter(|v| v.is_object()).map(TeamDoc)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TeamDoc<'a>(&'a Value);

impl<'a> TeamDoc<'a> {
    pub fn core(&self) -> Option<CoreStats<'a>> {
        core_stats(self.0)
    }

    pub fn goals(&self) -> Option<i64> {
        self.core().and_then(|c| c.int("goals"))
    }

    /// Players in upstream order; empty when the `players` key is absent.
    pub fn players(self) -> impl Iterator<Item = PlayerDoc<'a>> {
        self.0
            .get("players")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(PlayerDoc)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerDoc<'a>(&'a Value);

impl<'a> PlayerDoc<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn name(&self) -> Option<&'a str> {
        str_at(self.0, "name")
    }

    /// `id.platform`, e.g. "steam" or "epic".
    pub fn platform(&self) -> Option<&'a str> {
        self.0.get("id").and_then(|id| str_at(id, "platform"))
    }

    pub fn core(&self) -> Option<CoreStats<'a>> {
        core_stats(self.0)
    }

    pub fn mvp(&self) -> Option<bool> {
        self.0.get("mvp").and_then(Value::as_bool)
    }
}

/// The `stats.core` group shared by teams and players.
#[derive(Debug, Clone, Copy)]
pub struct CoreStats<'a>(&'a Value);

impl CoreStats<'_> {
    pub fn int(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(as_int)
    }

    pub fn float(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }
}

fn core_stats(node: &Value) -> Option<CoreStats<'_>> {
    node.get("stats")
        .and_then(|s| s.get("core"))
        .filter(|c| c.is_object())
        .map(CoreStats)
}

fn str_at<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str)
}

/// Counts sometimes arrive as floats; they are truncated toward zero.
fn as_int(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}
