//! # Validation Paths and Server Errors
//!
//! Server-side field errors are keyed by a path through the document:
//!
//! ```text
//! blocks/34e3a26c-103d-4a05-ab9d-7e14032309c3/addresses/fbeaee8f-4bc9-43ee-8b81-fca8978850f1/city
//! └────┘ └──────────────────────────────────┘ └───────┘ └──────────────────────────────────┘ └──┘
//! property          element (block content)    property         element (nested block)     property
//! ```
//!
//! Paths are held as typed segments so that element keys compare by value
//! regardless of how the server formats them.

use crate::BlockObject;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};
use uuid::Uuid;

const PROPERTIES_PREFIX: &str = "_Properties";
const COMPLEX_RESERVED_FIELDS: &[&str] = &["$id", "$elementTypeAlias", "ModelState"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Property(String),
    Element(Uuid),
}

impl PathSegment {
    pub fn parse(segment: &str) -> Self {
        match Uuid::parse_str(segment) {
            Ok(key) => PathSegment::Element(key),
            Err(_) => PathSegment::Property(segment.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(alias) => f.write_str(alias),
            PathSegment::Element(key) => write!(f, "{}", key.hyphenated()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValidationPath {
    segments: Vec<PathSegment>,
}

/// How a subscription or removal path is compared with an error path
///
/// An exact match always counts. The other modes additionally accept error
/// paths that extend the pattern: `Prefix` below it, `Suffix` above it and
/// `Contains` on both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Exact,
    Prefix,
    Suffix,
    Contains,
}

impl ValidationPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn property(alias: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Property(alias.into())],
        }
    }

    pub fn element(key: Uuid) -> Self {
        Self {
            segments: vec![PathSegment::Element(key)],
        }
    }

    /// Parses a `/`-separated path; segments that are GUIDs become element
    /// segments.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(PathSegment::parse)
                .collect(),
        }
    }

    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn join_property(&self, alias: impl Into<String>) -> Self {
        self.join(PathSegment::Property(alias.into()))
    }

    pub fn join_element(&self, key: Uuid) -> Self {
        self.join(PathSegment::Element(key))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this (error) path is matched by `pattern` under `mode`.
    pub fn matches(&self, pattern: &ValidationPath, mode: MatchMode) -> bool {
        if self == pattern {
            return true;
        }
        let (path, pat) = (&self.segments, &pattern.segments);
        if pat.is_empty() || path.len() <= pat.len() {
            return false;
        }
        match mode {
            MatchMode::Exact => false,
            MatchMode::Prefix => path.starts_with(pat),
            MatchMode::Suffix => path.ends_with(pat),
            MatchMode::Contains => {
                let last_start = path.len() - pat.len();
                (1..last_start).any(|start| &path[start..start + pat.len()] == pat.as_slice())
            }
        }
    }
}

impl fmt::Display for ValidationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// `None`, empty, `"null"` and `"invariant"` all mean no variation.
fn normalize_variant(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") | Some("null") | Some("invariant") => None,
        Some(v) => Some(v.to_string()),
    }
}

/// One server-reported property error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyError {
    pub path: ValidationPath,
    pub culture: Option<String>,
    pub segment: Option<String>,
    pub field: String,
    pub message: String,
}

impl PropertyError {
    pub fn new(path: ValidationPath, message: impl Into<String>) -> Self {
        Self {
            path,
            culture: None,
            segment: None,
            field: String::new(),
            message: message.into(),
        }
    }

    pub fn with_culture(mut self, culture: Option<&str>) -> Self {
        self.culture = normalize_variant(culture);
        self
    }

    pub fn with_segment(mut self, segment: Option<&str>) -> Self {
        self.segment = normalize_variant(segment);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// Selects errors by path, variant and field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorQuery {
    pub path: ValidationPath,
    pub culture: Option<String>,
    pub segment: Option<String>,
    pub field: String,
    pub mode: MatchMode,
}

impl ErrorQuery {
    pub fn new(path: ValidationPath) -> Self {
        Self {
            path,
            culture: None,
            segment: None,
            field: String::new(),
            mode: MatchMode::Exact,
        }
    }

    pub fn with_culture(mut self, culture: Option<&str>) -> Self {
        self.culture = normalize_variant(culture);
        self
    }

    pub fn with_segment(mut self, segment: Option<&str>) -> Self {
        self.segment = normalize_variant(segment);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Field names only narrow exact queries; an empty field matches all.
    pub fn matches(&self, error: &PropertyError) -> bool {
        error.path.matches(&self.path, self.mode)
            && error.culture == self.culture
            && error.segment == self.segment
            && (self.mode != MatchMode::Exact || self.field.is_empty() || self.field == error.field)
    }
}

/// Delivered to subscribers whenever the error set changes
#[derive(Debug, Clone)]
pub struct ValidationNotice {
    pub is_valid: bool,
    pub errors: Vec<PropertyError>,
    pub culture: Option<String>,
    pub segment: Option<String>,
}

pub type ValidationCallback = Arc<dyn Fn(&ValidationNotice) + Send + Sync>;

struct Subscriber {
    id: u64,
    query: ErrorQuery,
    callback: ValidationCallback,
}

#[derive(Default)]
struct RegistryState {
    errors: Vec<PropertyError>,
    subscribers: Vec<Subscriber>,
}

/// Document-wide store of server errors with path subscriptions
#[derive(Default)]
pub struct ValidationRegistry {
    state: Mutex<RegistryState>,
    next_id: AtomicU64,
}

impl fmt::Debug for ValidationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ValidationRegistry")
            .field("errors", &state.errors)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// Live subscription; dropping it unsubscribes
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct ValidationSubscription {
    id: u64,
    registry: Weak<ValidationRegistry>,
}

impl ValidationSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for ValidationSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.state.lock().subscribers.retain(|s| s.id != self.id);
        }
    }
}

impl fmt::Debug for ValidationSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationSubscription").field("id", &self.id).finish()
    }
}

impl ValidationRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers `callback` for errors selected by `query`. The callback runs
    /// once immediately with the current state.
    pub fn subscribe(
        self: &Arc<Self>,
        query: ErrorQuery,
        callback: impl Fn(&ValidationNotice) + Send + Sync + 'static,
    ) -> ValidationSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: ValidationCallback = Arc::new(callback);

        let notice = {
            let mut state = self.state.lock();
            let notice = notice_for(&state.errors, &query);
            state.subscribers.push(Subscriber {
                id,
                query,
                callback: callback.clone(),
            });
            notice
        };
        callback(&notice);

        ValidationSubscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Adds one error unless an identical one is already present.
    ///
    /// A message holding a JSON array is a nested block error report: it is
    /// flattened into per-property errors below `error.path` and the error on
    /// the property itself is kept with an empty message.
    pub fn add_property_error(&self, mut error: PropertyError) {
        let trimmed = error.message.trim();
        if trimmed.starts_with('[') {
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(items)) => {
                    let nested = flatten_complex_errors(&items, &error.path);
                    debug!(path = %error.path, count = nested.len(), "Flattened nested block errors");
                    let mut state = self.state.lock();
                    for nested_error in nested {
                        insert_unique(&mut state.errors, nested_error);
                    }
                    error.message = String::new();
                }
                _ => {
                    trace!(path = %error.path, "Error message looks like JSON but is not an array");
                }
            }
        }
        insert_unique(&mut self.state.lock().errors, error);
        self.notify();
    }

    /// Adds a nested block error report for the property at `parent`.
    pub fn add_complex_errors(&self, parent: &ValidationPath, report: &[Value]) {
        let nested = flatten_complex_errors(report, parent);
        {
            let mut state = self.state.lock();
            for error in nested {
                insert_unique(&mut state.errors, error);
            }
        }
        self.notify();
    }

    /// Removes every error selected by `query`, returning how many were
    /// removed.
    pub fn remove_property_error(&self, query: &ErrorQuery) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let before = state.errors.len();
            state.errors.retain(|e| !query.matches(e));
            before - state.errors.len()
        };
        if removed > 0 {
            debug!(path = %query.path, removed, "Removed property errors");
            self.notify();
        }
        removed
    }

    pub fn property_errors(&self, query: &ErrorQuery) -> Vec<PropertyError> {
        let state = self.state.lock();
        state.errors.iter().filter(|e| query.matches(e)).cloned().collect()
    }

    pub fn has_property_error(&self, query: &ErrorQuery) -> bool {
        self.state.lock().errors.iter().any(|e| query.matches(e))
    }

    pub fn errors(&self) -> Vec<PropertyError> {
        self.state.lock().errors.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Drops all errors and notifies subscribers.
    pub fn reset(&self) {
        self.state.lock().errors.clear();
        self.notify();
    }

    /// Re-delivers the current state to every subscriber.
    ///
    /// Callbacks run after the lock is released so they may query the
    /// registry.
    pub fn notify(&self) {
        let pending: Vec<(ValidationCallback, ValidationNotice)> = {
            let state = self.state.lock();
            state
                .subscribers
                .iter()
                .map(|s| (s.callback.clone(), notice_for(&state.errors, &s.query)))
                .collect()
        };
        for (callback, notice) in pending {
            callback(&notice);
        }
    }
}

fn notice_for(errors: &[PropertyError], query: &ErrorQuery) -> ValidationNotice {
    let errors: Vec<PropertyError> = errors.iter().filter(|e| query.matches(e)).cloned().collect();
    ValidationNotice {
        is_valid: errors.is_empty(),
        errors,
        culture: query.culture.clone(),
        segment: query.segment.clone(),
    }
}

fn insert_unique(errors: &mut Vec<PropertyError>, error: PropertyError) {
    let exists = errors.iter().any(|e| {
        e.path == error.path
            && e.culture == error.culture
            && e.segment == error.segment
            && e.field == error.field
    });
    if !exists {
        errors.push(error);
    }
}

/// Flattens `[{ "$id", "ModelState", "<nested>": [...] }]` into property
/// errors below `parent`.
fn flatten_complex_errors(items: &[Value], parent: &ValidationPath) -> Vec<PropertyError> {
    let mut errors = Vec::new();
    collect_complex_errors(items, parent, &mut errors);
    errors
}

fn collect_complex_errors(items: &[Value], parent: &ValidationPath, out: &mut Vec<PropertyError>) {
    for item in items {
        let Some(block) = item.as_object() else {
            continue;
        };
        let (Some(id), Some(model_state)) = (
            block.get("$id").and_then(Value::as_str),
            block.get("ModelState").and_then(Value::as_object),
        ) else {
            continue;
        };

        let element_path = parent.join(PathSegment::parse(id));
        out.extend(model_state_errors(model_state, &element_path));

        for (alias, nested) in block {
            if COMPLEX_RESERVED_FIELDS.contains(&alias.as_str()) {
                continue;
            }
            if let Value::Array(nested_items) = nested {
                collect_complex_errors(nested_items, &element_path.join_property(alias.clone()), out);
            }
        }
    }
}

/// Reads `"_Properties.<alias>.<culture>.<segment>.<field>": [message]` keys.
fn model_state_errors(model_state: &Map<String, Value>, element_path: &ValidationPath) -> Vec<PropertyError> {
    let mut errors = Vec::new();
    for (key, messages) in model_state {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() < 2 || parts[0] != PROPERTIES_PREFIX {
            trace!(key = %key, "Skipping non-property model state entry");
            continue;
        }
        let message = messages
            .as_array()
            .and_then(|m| m.first())
            .and_then(Value::as_str)
            .unwrap_or_default();
        errors.push(
            PropertyError::new(element_path.join_property(parts[1]), message)
                .with_culture(parts.get(2).copied())
                .with_segment(parts.get(3).copied())
                .with_field(parts.get(4).copied().unwrap_or_default()),
        );
    }
    errors
}

/// Validation paths of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockValidationPaths {
    pub content: ValidationPath,
    pub settings: Option<ValidationPath>,
}

/// Derives block validation paths below a property path
///
/// Nested editors chain: the property path of a block list inside a block is
/// that block's content path joined with the nested property alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPathResolver {
    property_path: ValidationPath,
}

impl ValidationPathResolver {
    pub fn new(property_path: ValidationPath) -> Self {
        Self { property_path }
    }

    pub fn property_path(&self) -> &ValidationPath {
        &self.property_path
    }

    pub fn path_for(&self, block: &BlockObject) -> BlockValidationPaths {
        BlockValidationPaths {
            content: self.property_path.join_element(block.content_key().key()),
            settings: block
                .settings_key()
                .map(|key| self.property_path.join_element(key.key())),
        }
    }

    /// Property path for a block editor nested in `alias` of this block.
    pub fn nested_property_path(&self, block: &BlockObject, alias: &str) -> ValidationPath {
        self.path_for(block).content.join_property(alias)
    }

    /// Queries selecting every error at or below the block's payloads.
    pub fn error_queries(
        &self,
        block: &BlockObject,
        culture: Option<&str>,
        segment: Option<&str>,
    ) -> Vec<ErrorQuery> {
        let paths = self.path_for(block);
        std::iter::once(paths.content)
            .chain(paths.settings)
            .map(|path| {
                ErrorQuery::new(path)
                    .with_culture(culture)
                    .with_segment(segment)
                    .with_mode(MatchMode::Prefix)
            })
            .collect()
    }

    /// Queries used to clear a deleted block's errors, keyed by bare payload
    /// identity so errors reported through any ancestor chain are found.
    pub fn release_queries(
        &self,
        block: &BlockObject,
        culture: Option<&str>,
        segment: Option<&str>,
    ) -> Vec<ErrorQuery> {
        std::iter::once(block.content_key())
            .chain(block.settings_key())
            .map(|key| {
                ErrorQuery::new(ValidationPath::element(key.key()))
                    .with_culture(culture)
                    .with_segment(segment)
                    .with_mode(MatchMode::Contains)
            })
            .collect()
    }
}
