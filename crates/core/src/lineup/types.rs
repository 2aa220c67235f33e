//! Lineup data model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Field carrying the channel identifier in export records.
pub const CHANNEL_ID_FIELD: &str = "EPG_ID";

/// Unique-ID name segment of a channel exported without a name.
pub const MISSING_NAME_SEGMENT: &str = "undefined";

/// Reasons a single export record cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no usable EPG_ID")]
    MissingChannelId,
}

/// Attributes of one channel, passed through verbatim from the export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelAttributes(Map<String, Value>);

impl ChannelAttributes {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw attribute by field name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Channel display name, rendered as text.
    pub fn name(&self) -> Option<String> {
        self.get("name").and_then(render_scalar)
    }

    /// Name as it appears in channel unique IDs.
    ///
    /// Catalogs filled by the older loader hold `undefined` for channels
    /// exported without a name and `null` for an explicit null, so those
    /// placeholders are kept to address the same entities.
    pub fn name_segment(&self) -> String {
        match self.0.get("name") {
            None => MISSING_NAME_SEGMENT.to_string(),
            Some(Value::Null) => "null".to_string(),
            Some(value) => render_scalar(value).unwrap_or_else(|| value.to_string()),
        }
    }

    pub fn channel_type(&self) -> Option<&Value> {
        self.get("channelType")
    }

    pub fn type_description(&self) -> Option<&Value> {
        self.get("typeDescription")
    }

    pub fn channel_number(&self) -> Option<&Value> {
        self.get("Channel_Number")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One row from an export file.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupRecord {
    /// `EPG_ID` rendered as text (`7159`, `"ard-hd"`).
    pub channel_id: String,
    /// Every other field of the row.
    pub attributes: ChannelAttributes,
}

impl TryFrom<Value> for LineupRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(RecordError::NotAnObject);
        };
        let channel_id = fields
            .remove(CHANNEL_ID_FIELD)
            .as_ref()
            .and_then(render_scalar)
            .ok_or(RecordError::MissingChannelId)?;

        Ok(Self {
            channel_id,
            attributes: ChannelAttributes::new(fields),
        })
    }
}

/// Render a scalar JSON value the way it appears in identifiers.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(render_number(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integral floats render without a fraction (`7159.0` as `7159`), the
/// way JavaScript prints them.
fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// Channels offered by one operator, keyed by channel identifier.
///
/// Iteration follows first-encounter order; replacing a channel keeps its
/// position. The older loader walked numeric IDs in ascending order
/// instead, so publish order can differ from it; the resulting catalog
/// state does not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorLineup {
    code: String,
    channels: IndexMap<String, ChannelAttributes>,
}

impl OperatorLineup {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            channels: IndexMap::new(),
        }
    }

    /// Two-character operator code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Insert or replace a channel, returning the replaced attributes.
    pub fn upsert(&mut self, record: LineupRecord) -> Option<ChannelAttributes> {
        self.channels.insert(record.channel_id, record.attributes)
    }

    pub fn get(&self, channel_id: &str) -> Option<&ChannelAttributes> {
        self.channels.get(channel_id)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &ChannelAttributes)> {
        self.channels.iter().map(|(id, attrs)| (id.as_str(), attrs))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Everything one run will publish, keyed by operator code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDataset {
    operators: IndexMap<String, OperatorLineup>,
    /// Channels replaced by a later record for the same operator.
    pub overwrites: usize,
    /// Records dropped because they were unusable.
    pub skipped_records: usize,
}

impl RunDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lineup for `code`, created on first use.
    pub fn operator_mut(&mut self, code: &str) -> &mut OperatorLineup {
        self.operators
            .entry(code.to_string())
            .or_insert_with(|| OperatorLineup::new(code))
    }

    pub fn operator(&self, code: &str) -> Option<&OperatorLineup> {
        self.operators.get(code)
    }

    pub fn operators(&self) -> impl Iterator<Item = &OperatorLineup> {
        self.operators.values()
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    pub fn channel_count(&self) -> usize {
        self.operators.values().map(OperatorLineup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
