use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, XapiError};

/// Locale key used by the display-string accessors unless one is given.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Indent width used by [`Statement::to_pretty`].
pub const DEFAULT_INDENT: usize = 4;

/// Storage timestamp layout, e.g. `2021-03-04T15:21:30.123456+0000`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse a timestamp in the LRS storage format
/// `YYYY-MM-DDTHH:MM:SS.ffffff±HHMM`.
///
/// Handles the common `Z`-suffix form as `+0000`. The offset is kept in
/// the returned value rather than converted away, so instants written in
/// different zones still compare correctly. The fractional-seconds part
/// may be absent, slightly wider than the stored format.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    // Replace trailing 'Z' with '+0000'.
    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+0000", stripped)
    } else {
        s.to_string()
    };

    DateTime::parse_from_str(&normalised, TIMESTAMP_FORMAT)
        .map_err(|_| XapiError::TimestampParse(s.to_string()))
}

// ── Statement ─────────────────────────────────────────────────────────────────

/// A single xAPI record as stored by a Learning Record Store: the outer
/// envelope (identifiers, flags, forwarding queues) plus the nested
/// `statement` object carrying actor, verb and object.
///
/// Top-level fields are looked up gracefully and yield `Option`; walking
/// into the nested statement is strict and yields `Result`, since code
/// that asks for an actor's name has no useful way to continue without
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statement {
    doc: Value,
}

impl Default for Statement {
    fn default() -> Self {
        Self::empty()
    }
}

impl Statement {
    // ── Construction ──────────────────────────────────────────────────────────

    /// Wrap an already-parsed JSON document.
    pub fn from_value(doc: Value) -> Self {
        Self { doc }
    }

    /// Parse a statement document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self {
            doc: serde_json::from_str(text)?,
        })
    }

    /// Load a statement document from disk.
    ///
    /// A missing path is not an error: it logs a warning and yields an
    /// empty statement, which [`is_empty`](Self::is_empty) exposes. A file
    /// that exists but cannot be read or parsed does fail.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("statement file {} does not exist", path.display());
            return Ok(Self::empty());
        }
        let text = fs::read_to_string(path).map_err(|e| XapiError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// A statement holding an empty document.
    pub fn empty() -> Self {
        Self {
            doc: Value::Object(Map::new()),
        }
    }

    /// Whether the document is an empty object, the loader's signal for a
    /// missing file.
    pub fn is_empty(&self) -> bool {
        self.doc.as_object().map(|o| o.is_empty()).unwrap_or(false)
    }

    /// Borrow the underlying JSON document.
    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    // ── Flat access ───────────────────────────────────────────────────────────

    /// Look up a top-level key. Absent keys are `None`, never an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    fn flat_str(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(Value::as_str)
    }

    fn flat_bool(&self, key: &str) -> Option<bool> {
        self.doc.get(key).and_then(Value::as_bool)
    }

    fn flat_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.doc.get(key).and_then(Value::as_array)
    }

    // ── Nested navigation ─────────────────────────────────────────────────────

    /// Walk a dot-separated path from the document root, failing on the
    /// first segment that is missing or reached through a non-object.
    fn navigate(&self, path: &str) -> Result<&Value> {
        let mut current = &self.doc;
        let mut walked = String::new();
        for segment in path.split('.') {
            if !current.is_object() {
                let parent = if walked.is_empty() {
                    "document".to_string()
                } else {
                    walked
                };
                return Err(XapiError::FieldType {
                    path: parent,
                    expected: "an object",
                });
            }
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);
            current = current
                .get(segment)
                .ok_or_else(|| XapiError::MissingField(walked.clone()))?;
        }
        Ok(current)
    }

    /// Pull a string at a dot-separated path.
    fn text_at(&self, path: &str) -> Result<&str> {
        let value = self.navigate(path)?;
        value.as_str().ok_or_else(|| XapiError::FieldType {
            path: path.to_string(),
            expected: "a string",
        })
    }

    /// Pull one locale entry out of a language map at `path`.
    fn display_at(&self, path: &str, locale: &str) -> Result<&str> {
        let map = self.navigate(path)?;
        if !map.is_object() {
            return Err(XapiError::FieldType {
                path: path.to_string(),
                expected: "an object",
            });
        }
        let value = map
            .get(locale)
            .ok_or_else(|| XapiError::MissingField(format!("{}.{}", path, locale)))?;
        value.as_str().ok_or_else(|| XapiError::FieldType {
            path: format!("{}.{}", path, locale),
            expected: "a string",
        })
    }

    // ── Statement body ────────────────────────────────────────────────────────

    /// The nested `statement` object.
    pub fn body(&self) -> Result<&Value> {
        self.navigate("statement")
    }

    /// The actor object of the nested statement.
    pub fn actor(&self) -> Result<&Value> {
        self.navigate("statement.actor")
    }

    /// The actor's `name` string.
    pub fn actor_name(&self) -> Result<&str> {
        self.text_at("statement.actor.name")
    }

    /// The verb object of the nested statement.
    pub fn verb(&self) -> Result<&Value> {
        self.navigate("statement.verb")
    }

    /// The verb's display string for [`DEFAULT_LOCALE`].
    pub fn verb_display(&self) -> Result<&str> {
        self.verb_display_in(DEFAULT_LOCALE)
    }

    /// The verb's display string for a specific locale key.
    pub fn verb_display_in(&self, locale: &str) -> Result<&str> {
        self.display_at("statement.verb.display", locale)
    }

    /// The object of the nested statement.
    pub fn object(&self) -> Result<&Value> {
        self.navigate("statement.object")
    }

    /// The object definition's name for [`DEFAULT_LOCALE`].
    pub fn object_name(&self) -> Result<&str> {
        self.object_name_in(DEFAULT_LOCALE)
    }

    /// The object definition's name for a specific locale key.
    pub fn object_name_in(&self, locale: &str) -> Result<&str> {
        self.display_at("statement.object.definition.name", locale)
    }

    /// The object definition's description for [`DEFAULT_LOCALE`].
    pub fn object_description(&self) -> Result<&str> {
        self.object_description_in(DEFAULT_LOCALE)
    }

    /// The object definition's description for a specific locale key.
    pub fn object_description_in(&self, locale: &str) -> Result<&str> {
        self.display_at("statement.object.definition.description", locale)
    }

    // ── Temporal fields ───────────────────────────────────────────────────────

    /// When the LRS persisted the record (the top-level `stored` field).
    pub fn stored(&self) -> Result<DateTime<FixedOffset>> {
        parse_timestamp(self.text_at("stored")?)
    }

    /// When the activity was reported (the top-level `timestamp` field).
    pub fn timestamp(&self) -> Result<DateTime<FixedOffset>> {
        parse_timestamp(self.text_at("timestamp")?)
    }

    /// Signed lag between reporting and persistence: `stored - timestamp`.
    ///
    /// Positive when the record reached the store after it was generated;
    /// negative values happen with skewed clocks and are preserved.
    pub fn time_diff(&self) -> Result<Duration> {
        Ok(self.stored()? - self.timestamp()?)
    }

    // ── Envelope flags ────────────────────────────────────────────────────────

    /// The `active` flag, if present and boolean.
    pub fn is_active(&self) -> Option<bool> {
        self.flat_bool("active")
    }

    /// The `voided` flag, if present and boolean.
    pub fn is_voided(&self) -> Option<bool> {
        self.flat_bool("voided")
    }

    /// The `hasGeneratedId` flag, if present and boolean.
    pub fn has_generated_id(&self) -> Option<bool> {
        self.flat_bool("hasGeneratedId")
    }

    // ── Envelope identifiers ──────────────────────────────────────────────────

    /// The submitting client's identifier.
    pub fn client(&self) -> Option<&str> {
        self.flat_str("client")
    }

    /// The identifier of the Learning Record Store holding the record.
    pub fn lrs_id(&self) -> Option<&str> {
        self.flat_str("lrs_id")
    }

    /// The record's own identifier (the `_id` field).
    pub fn id(&self) -> Option<&str> {
        self.flat_str("_id")
    }

    /// The persona the record is attributed to.
    pub fn persona_identifier(&self) -> Option<&str> {
        self.flat_str("personaIdentifier")
    }

    /// The organisation the record belongs to.
    pub fn organisation(&self) -> Option<&str> {
        self.flat_str("organisation")
    }

    /// The record's content hash.
    pub fn hash(&self) -> Option<&str> {
        self.flat_str("hash")
    }

    // ── Forwarding queues ─────────────────────────────────────────────────────

    /// Forwarding queues that completed for this record.
    pub fn completed_forwarding_queue(&self) -> Option<&Vec<Value>> {
        self.flat_list("completedForwardingQueue")
    }

    /// Log entries for forwards that failed.
    pub fn failed_forwarding_log(&self) -> Option<&Vec<Value>> {
        self.flat_list("failedForwardingLog")
    }

    /// Processing queues that completed for this record.
    pub fn completed_queues(&self) -> Option<&Vec<Value>> {
        self.flat_list("completedQueues")
    }

    /// Forwarding queues that gave up on this record.
    pub fn dead_forwarding_queue(&self) -> Option<&Vec<Value>> {
        self.flat_list("deadForwardingQueue")
    }

    /// Forwarding queues the record is still waiting on.
    pub fn pending_forwarding_queue(&self) -> Option<&Vec<Value>> {
        self.flat_list("pendingForwardingQueue")
    }

    /// Queues currently processing the record.
    pub fn processing_queues(&self) -> Option<&Vec<Value>> {
        self.flat_list("processingQueues")
    }

    /// Registrations associated with the record.
    pub fn registrations(&self) -> Option<&Vec<Value>> {
        self.flat_list("registrations")
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the document as indented JSON text using [`DEFAULT_INDENT`].
    pub fn to_pretty(&self) -> Result<String> {
        self.to_pretty_indent(DEFAULT_INDENT)
    }

    /// Render the document as indented JSON text with a caller-chosen
    /// indent width.
    pub fn to_pretty_indent(&self, indent: usize) -> Result<String> {
        let indent_bytes = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.doc.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
