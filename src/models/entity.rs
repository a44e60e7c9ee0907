//! Raw entity and connection records as delivered by the data source.
//!
//! Parsing is lenient: optional fields that are missing, of the wrong type or
//! not finite fall back to defaults. Records without ids are skipped. Only a
//! structurally broken document (non-array collections) is rejected.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A company in the competitive landscape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Sizing attribute (market capitalization or revenue proxy).
    pub market_cap: Option<f64>,
    pub industry: Option<String>,
    pub segment: Option<String>,
    /// Marks the user's own company.
    pub is_home: bool,
}

impl Entity {
    /// Create an entity with only an id and a display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            market_cap: None,
            industry: None,
            segment: None,
            is_home: false,
        }
    }

    /// Builder: set the sizing attribute.
    pub fn with_market_cap(mut self, value: f64) -> Self {
        self.market_cap = Some(value);
        self
    }

    /// Builder: set the industry.
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Builder: set the market segment.
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Builder: mark as the home entity.
    pub fn home(mut self) -> Self {
        self.is_home = true;
        self
    }

    /// Parse one entity record. `index` is only used in error messages.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, AppError> {
        let field = format!("entities[{}]", index);
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::invalid_input(&field, "expected an object"))?;
        let id = id_field(obj, &["id"])
            .ok_or_else(|| AppError::invalid_input(&field, "missing id"))?;

        let name = string_field(obj, &["name"]).unwrap_or_else(|| id.clone());
        let market_cap = number_field(obj, &["market_cap", "marketCap", "revenue"])
            .filter(|v| *v >= 0.0);

        Ok(Self {
            id,
            name,
            market_cap,
            industry: string_field(obj, &["industry"]),
            segment: string_field(obj, &["segment", "marketSegment", "market_segment"]),
            is_home: bool_field(obj, &["is_home", "isHome", "isUserCompany"]).unwrap_or(false),
        })
    }
}

/// Relationship type between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Competitor,
    Adjacency,
    Partner,
    Supplier,
    Other(String),
}

impl ConnectionKind {
    /// Lowercase name used in themes and legends.
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionKind::Competitor => "competitor",
            ConnectionKind::Adjacency => "adjacency",
            ConnectionKind::Partner => "partner",
            ConnectionKind::Supplier => "supplier",
            ConnectionKind::Other(name) => name,
        }
    }
}

impl Default for ConnectionKind {
    fn default() -> Self {
        ConnectionKind::Other("related".to_string())
    }
}

impl Serialize for ConnectionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "competitor" | "competition" | "competes_with" => ConnectionKind::Competitor,
            "adjacency" | "adjacent" => ConnectionKind::Adjacency,
            "partner" | "partnership" => ConnectionKind::Partner,
            "supplier" | "supplies" => ConnectionKind::Supplier,
            "" => ConnectionKind::default(),
            other => ConnectionKind::Other(other.to_string()),
        };
        Ok(kind)
    }
}

/// A relationship between two entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub source_id: String,
    pub target_id: String,
    pub kind: ConnectionKind,
    /// Relationship intensity, expected in [0, 1].
    pub strength: Option<f64>,
    /// Optional sentiment in [-1, 1].
    pub sentiment: Option<f64>,
}

impl Connection {
    /// Create a connection of the given kind without strength or sentiment.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: ConnectionKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
            strength: None,
            sentiment: None,
        }
    }

    /// Builder: set the strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Builder: set the sentiment.
    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Parse one connection record. `index` is only used in error messages.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, AppError> {
        let field = format!("connections[{}]", index);
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::invalid_input(&field, "expected an object"))?;
        let source_id = id_field(obj, &["source_id", "sourceId", "source"])
            .ok_or_else(|| AppError::invalid_input(&field, "missing sourceId"))?;
        let target_id = id_field(obj, &["target_id", "targetId", "target"])
            .ok_or_else(|| AppError::invalid_input(&field, "missing targetId"))?;

        let kind = string_field(obj, &["type", "kind"])
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default();

        Ok(Self {
            source_id,
            target_id,
            kind,
            strength: number_field(obj, &["strength", "intensity"]),
            sentiment: number_field(obj, &["sentiment"]).map(|s| s.clamp(-1.0, 1.0)),
        })
    }
}

/// A full data batch: entities plus the connections between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandscapeData {
    pub entities: Vec<Entity>,
    pub connections: Vec<Connection>,
}

impl LandscapeData {
    /// Parse a JSON document of the form `{ "entities": [...], "connections": [...] }`.
    ///
    /// Only a non-array collection is an error. Records that are not objects
    /// or lack their ids are skipped.
    pub fn from_value(value: &Value) -> Result<Self, AppError> {
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::invalid_input("$", "expected an object"))?;

        let entities = match obj.get("entities") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| skip_invalid(Entity::from_value(i, v)))
                .collect(),
            Some(_) => return Err(AppError::invalid_input("entities", "expected an array")),
        };

        let connections = match obj.get("connections") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| skip_invalid(Connection::from_value(i, v)))
                .collect(),
            Some(_) => return Err(AppError::invalid_input("connections", "expected an array")),
        };

        Ok(Self {
            entities,
            connections,
        })
    }

    /// Parse from JSON text.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Read and parse a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

// =============================================================================
// Lenient field access
// =============================================================================

fn skip_invalid<T>(record: Result<T, AppError>) -> Option<T> {
    match record {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Skipping record: {}", e);
            None
        }
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

/// Ids may arrive as strings or numbers.
fn id_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let n = match lookup(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn bool_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    match lookup(obj, keys)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
