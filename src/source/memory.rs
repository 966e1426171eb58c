use super::{GameRecord, LeaderEntry, LeagueLeaders, StatLine, StatSource};
use crate::error::FetchError;
use crate::normalize::metric_value;
use crate::plan::Filters;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EntityKind {
    #[default]
    Player,
    Team,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EntityFixture {
    kind: EntityKind,
    team: Option<String>,
    position: Option<String>,
    /// Season → stat line. JSON keys are season years as strings.
    seasons: BTreeMap<i32, StatLine>,
    games: Vec<GameRecord>,
}

/// In-memory [`StatSource`] backed by fixture data.
///
/// Entity names are matched case-insensitively. A fetch with no seasons in its
/// filters reads the entity's latest season; a fetch with several seasons sums
/// them.
///
/// ```json
/// {
///   "entities": {
///     "Micah Parsons": {"team": "Cowboys", "position": "LB", "seasons": {"2024": {"sacks": 12}}},
///     "Cowboys": {"kind": "team", "seasons": {"2024": {"sacks": 45}}}
///   },
///   "failures": {"T.J. Watt": "upstream 503"},
///   "delays_ms": {"Nick Bosa": 50}
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemorySource {
    entities: BTreeMap<String, EntityFixture>,
    failures: BTreeMap<String, String>,
    delays_ms: BTreeMap<String, u64>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add (or extend) a player's stat line for one season.
    pub fn with_player(self, name: &str, season: i32, stats: &[(&str, f64)]) -> Self {
        self.with_entity(name, EntityKind::Player, season, stats)
    }

    pub fn with_team(self, name: &str, season: i32, stats: &[(&str, f64)]) -> Self {
        self.with_entity(name, EntityKind::Team, season, stats)
    }

    /// Roster details used for leaderboard entries and position filters.
    pub fn with_roster(mut self, name: &str, team: &str, position: &str) -> Self {
        let fixture = self.entities.entry(name.to_string()).or_default();
        fixture.team = Some(team.to_string());
        fixture.position = Some(position.to_string());
        self
    }

    pub fn with_games(mut self, name: &str, games: Vec<GameRecord>) -> Self {
        self.entities.entry(name.to_string()).or_default().games.extend(games);
        self
    }

    /// Every fetch for `name` fails with a backend error.
    pub fn failing(mut self, name: &str, reason: &str) -> Self {
        self.failures.insert(name.to_string(), reason.to_string());
        self
    }

    /// Every fetch for `name` waits `ms` before answering.
    pub fn delayed(mut self, name: &str, ms: u64) -> Self {
        self.delays_ms.insert(name.to_string(), ms);
        self
    }

    fn with_entity(mut self, name: &str, kind: EntityKind, season: i32, stats: &[(&str, f64)]) -> Self {
        let fixture = self.entities.entry(name.to_string()).or_default();
        fixture.kind = kind;
        let line = fixture.seasons.entry(season).or_default();
        for (metric, value) in stats {
            line.insert(metric.to_string(), *value);
        }
        self
    }

    fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
        map.get(name).or_else(|| map.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v))
    }

    /// Apply the configured delay and failure for `name`.
    async fn gate(&self, name: &str) -> Result<(), FetchError> {
        if let Some(ms) = Self::lookup(&self.delays_ms, name) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        match Self::lookup(&self.failures, name) {
            Some(reason) => Err(FetchError::Backend(reason.clone())),
            None => Ok(()),
        }
    }

    fn entity(&self, name: &str) -> Result<&EntityFixture, FetchError> {
        Self::lookup(&self.entities, name).ok_or_else(|| FetchError::NotFound { entity: name.to_string() })
    }

    fn season_line(fixture: &EntityFixture, seasons: &[i32]) -> Option<StatLine> {
        if seasons.is_empty() {
            return fixture.seasons.values().next_back().cloned();
        }
        let mut selected = seasons.iter().filter_map(|season| fixture.seasons.get(season)).peekable();
        selected.peek()?;

        let mut total = StatLine::new();
        for line in selected {
            for (metric, value) in line {
                *total.entry(metric.clone()).or_insert(0.0) += value;
            }
        }
        Some(total)
    }
}

#[async_trait]
impl StatSource for MemorySource {
    async fn fetch_entity_stats(&self, entity: &str, filters: &Filters) -> Result<StatLine, FetchError> {
        self.gate(entity).await?;
        let fixture = self.entity(entity)?;
        Self::season_line(fixture, &filters.seasons).ok_or_else(|| FetchError::NotFound { entity: entity.to_string() })
    }

    async fn fetch_game_log(&self, entity: &str, filters: &Filters) -> Result<Vec<GameRecord>, FetchError> {
        self.gate(entity).await?;
        let fixture = self.entity(entity)?;
        if fixture.games.is_empty() {
            return Err(FetchError::NotFound { entity: entity.to_string() });
        }

        let games = fixture
            .games
            .iter()
            .filter(|game| match game.season {
                Some(season) if !filters.seasons.is_empty() => filters.seasons.contains(&season),
                _ => true,
            })
            .cloned()
            .collect();
        Ok(games)
    }

    async fn fetch_league_leaders(
        &self,
        _sport: &str,
        metric: &str,
        filters: &Filters,
        limit: usize,
    ) -> Result<LeagueLeaders, FetchError> {
        let mut pool: Vec<LeaderEntry> = self
            .entities
            .iter()
            .filter(|(_, fixture)| fixture.kind == EntityKind::Player)
            .filter(|(_, fixture)| {
                filters.positions.is_empty()
                    || fixture
                        .position
                        .as_deref()
                        .is_some_and(|pos| filters.positions.iter().any(|want| want.eq_ignore_ascii_case(pos)))
            })
            .filter_map(|(name, fixture)| {
                let line = Self::season_line(fixture, &filters.seasons)?;
                let value = metric_value(&line, metric)?;
                Some(LeaderEntry { entity: name.clone(), team: fixture.team.clone(), value })
            })
            .collect();

        if pool.is_empty() {
            return Err(FetchError::Unsupported { metric: metric.to_string() });
        }

        pool.sort_by(|a, b| b.value.total_cmp(&a.value));
        let total_entities = pool.len();
        let league_average = pool.iter().map(|entry| entry.value).sum::<f64>() / total_entities as f64;
        pool.truncate(limit);

        Ok(LeagueLeaders {
            metric: metric.to_string(),
            leaders: pool,
            league_average: Some(league_average),
            total_entities,
        })
    }
}
