//! Per-form session: owns the state, the lists and the cascade selection
//!
//! All mutation of a form goes through [`FormSession`]. The two asynchronous
//! operations (configuration load and submission) are split into a `begin_*`
//! step that hands out a ticket and a `finish_*` step that applies the result.
//! Tickets are stamped with the session epoch, which [`FormSession::close`]
//! bumps, so results arriving after close are discarded. Load tickets also
//! carry a load sequence number; only the most recent load may finish.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::cascade::{CascadingResolver, ClearInstruction, ConfigurationMap, MarketDetails, SelectOption, Selection};
use super::definition::FormDefinition;
use super::dispatch::SubmitOutcome;
use super::error::FormError;
use super::list::{ItemId, ListEditor};
use super::path::PropertyPath;
use super::render::{build_document, render_fields, RenderContext, RenderNode};
use super::schema::FieldKind;
use super::seed::{seed_fields, Seeds};
use super::state::FormState;
use crate::domain::Record;

/// Loading state of the configuration map
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConfigStatus {
    #[default]
    NotRequested,
    Pending,
    Loaded(ConfigurationMap),
    Failed(String),
}

/// Proof that an async operation was started in a given session epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    load: u64,
}

/// What the dispatcher receives for one submission attempt
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub fields: FormState,
    pub document: Value,
    /// Required paths of the fields visible at submit time
    pub required: Vec<PropertyPath>,
}

impl SubmissionPayload {
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.fields.snapshot()
    }

    /// Merge extra top-level values into the document
    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        if let Value::Object(doc) = &mut self.document {
            doc.extend(extras);
        }
        self
    }
}

pub struct FormSession {
    definition: FormDefinition,
    state: FormState,
    lists: ListEditor,
    resolver: Option<CascadingResolver>,
    config: ConfigStatus,
    record_id: Option<String>,
    /// Stored record values, used to seed the market block on restore
    record: Option<Value>,
    pending_restore: Option<Selection>,
    epoch: u64,
    /// Sequence number of the latest configuration load
    load: u64,
    closed: bool,
    in_flight: bool,
}

impl FormSession {
    /// Open a blank form.
    pub fn open(definition: FormDefinition) -> Result<Self, FormError> {
        definition.validate()?;

        let resolver = definition
            .cascade
            .as_ref()
            .map(|c| CascadingResolver::new(c.secondary_path(), c.dependent_roots()));

        let mut session = Self {
            definition,
            state: FormState::new(),
            lists: ListEditor::new(),
            resolver,
            config: ConfigStatus::NotRequested,
            record_id: None,
            record: None,
            pending_restore: None,
            epoch: 0,
            load: 0,
            closed: false,
            in_flight: false,
        };
        session.seed_visible(None);
        Ok(session)
    }

    /// Open a form over an existing record. The record's selection is
    /// restored once the configuration map has loaded.
    pub fn open_with_record(definition: FormDefinition, record: &Record) -> Result<Self, FormError> {
        let mut session = Self::open(definition)?;
        session.record_id = Some(record.id.clone());
        session.record = Some(record.data.clone());
        session.seed_visible(Some(&record.data));

        if let Some(cascade) = &session.definition.cascade {
            let primary = record.data.get(&cascade.primary_field).and_then(Value::as_str);
            let secondary = record.data.get(&cascade.secondary_field).and_then(Value::as_str);
            if let Some(primary) = primary.filter(|s| !s.is_empty()) {
                session.pending_restore = Some(Selection {
                    primary: Some(primary.to_string()),
                    secondary: secondary.filter(|s| !s.is_empty()).map(String::from),
                });
            }
        }

        tracing::info!("Opened form for record '{}'", record.id);
        Ok(session)
    }

    fn seed_visible(&mut self, record: Option<&Value>) {
        seed_fields(
            &self.definition.fields,
            &PropertyPath::root(),
            Seeds::new(record, None),
            &mut self.state,
            &mut self.lists,
        );
        if let Some(cascade) = &self.definition.cascade {
            self.state.set(cascade.primary_path(), Value::String(String::new()));
        }
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn lists(&self) -> &ListEditor {
        &self.lists
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn config_status(&self) -> &ConfigStatus {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.resolver
            .as_ref()
            .map(|r| r.selection().clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.closed {
            Err(FormError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn check_ticket(&self, ticket: Ticket) -> Result<(), FormError> {
        if self.closed || ticket.epoch != self.epoch {
            tracing::warn!("Discarding result for stale ticket (epoch {})", ticket.epoch);
            return Err(FormError::SessionClosed);
        }
        Ok(())
    }

    fn check_load_ticket(&self, ticket: Ticket) -> Result<(), FormError> {
        self.check_ticket(ticket)?;
        if ticket.load != self.load {
            tracing::warn!(
                "Discarding configuration load {} superseded by load {}",
                ticket.load,
                self.load
            );
            return Err(FormError::StaleLoad);
        }
        Ok(())
    }

    // Configuration loading

    pub fn begin_config_load(&mut self) -> Result<Ticket, FormError> {
        self.ensure_open()?;
        self.load += 1;
        self.config = ConfigStatus::Pending;
        tracing::debug!("Configuration load {} started", self.load);
        Ok(Ticket {
            epoch: self.epoch,
            load: self.load,
        })
    }

    pub fn finish_config_load(&mut self, ticket: Ticket, map: ConfigurationMap) -> Result<(), FormError> {
        self.check_load_ticket(ticket)?;
        tracing::info!("Configuration loaded with {} environment(s)", map.environments().len());
        self.config = ConfigStatus::Loaded(map);
        self.restore_selection();
        Ok(())
    }

    pub fn fail_config_load(&mut self, ticket: Ticket, reason: String) -> Result<(), FormError> {
        self.check_load_ticket(ticket)?;
        tracing::warn!("Configuration load failed: {}", reason);
        self.config = ConfigStatus::Failed(reason);
        Ok(())
    }

    /// Install an already available map.
    pub fn load_configuration(&mut self, map: ConfigurationMap) -> Result<(), FormError> {
        let ticket = self.begin_config_load()?;
        self.finish_config_load(ticket, map)
    }

    fn restore_selection(&mut self) {
        let Some(selection) = self.pending_restore.take() else {
            return;
        };
        let Some(primary) = selection.primary else {
            return;
        };

        if let Err(e) = self.apply_primary(&primary) {
            tracing::warn!("Could not restore environment '{}': {}", primary, e);
            return;
        }
        if let Some(secondary) = selection.secondary {
            if let Err(e) = self.apply_secondary(&secondary) {
                tracing::warn!("Could not restore market '{}': {}", secondary, e);
            }
        }
        self.record = None;
    }

    fn loaded_map(&self) -> Result<&ConfigurationMap, FormError> {
        match &self.config {
            ConfigStatus::Loaded(map) => Ok(map),
            ConfigStatus::Failed(reason) => Err(FormError::ConfigurationUnavailable(reason.clone())),
            ConfigStatus::NotRequested | ConfigStatus::Pending => Err(FormError::ConfigurationPending),
        }
    }

    // Selection

    /// Select an environment and return the market options it offers.
    pub fn select_environment(&mut self, key: &str) -> Result<Vec<SelectOption>, FormError> {
        self.ensure_open()?;
        self.record = None;
        self.pending_restore = None;
        self.apply_primary(key)
    }

    /// Select a market and seed the dependent block from its details.
    pub fn select_market(&mut self, key: &str) -> Result<MarketDetails, FormError> {
        self.ensure_open()?;
        self.record = None;
        self.pending_restore = None;
        self.apply_secondary(key)
    }

    fn apply_primary(&mut self, key: &str) -> Result<Vec<SelectOption>, FormError> {
        let cascade = self
            .definition
            .cascade
            .as_ref()
            .ok_or_else(|| FormError::UnknownField(PropertyPath::parse("environment")))?;
        if !key.is_empty() && !cascade.primary_options.iter().any(|o| o == key) {
            return Err(FormError::not_found("environment", key));
        }
        let resolver = self
            .resolver
            .as_mut()
            .ok_or_else(|| FormError::UnknownField(cascade.primary_path()))?;

        // Markets are unknown until the map loads; the form stays editable.
        let empty = ConfigurationMap::new();
        let map = match &self.config {
            ConfigStatus::Loaded(map) => map,
            _ => &empty,
        };

        let change = resolver.select_primary(map, key);
        apply_clear(&change.clear, &mut self.state, &mut self.lists);

        self.state.set(cascade.primary_path(), Value::String(key.to_string()));
        if !key.is_empty() {
            self.state.set(cascade.secondary_path(), Value::String(String::new()));
        }

        tracing::debug!(
            "Environment set to '{}' with {} market(s)",
            key,
            change.secondary_keys.len()
        );
        Ok(change.secondary_keys.iter().map(|k| SelectOption::market(k)).collect())
    }

    fn apply_secondary(&mut self, key: &str) -> Result<MarketDetails, FormError> {
        let cascade = self
            .definition
            .cascade
            .as_ref()
            .ok_or_else(|| FormError::UnknownField(PropertyPath::parse("market")))?;
        let map = match &self.config {
            ConfigStatus::Loaded(map) => map,
            ConfigStatus::Failed(reason) => return Err(FormError::ConfigurationUnavailable(reason.clone())),
            ConfigStatus::NotRequested | ConfigStatus::Pending => return Err(FormError::ConfigurationPending),
        };
        let resolver = self
            .resolver
            .as_mut()
            .ok_or_else(|| FormError::UnknownField(cascade.secondary_path()))?;

        let change = resolver.select_secondary(map, key)?;
        apply_clear(&change.clear, &mut self.state, &mut self.lists);

        self.state.set(cascade.secondary_path(), Value::String(key.to_string()));

        let defaults = change.details.as_defaults();
        seed_fields(
            &cascade.dependent,
            &PropertyPath::root(),
            Seeds::new(self.record.as_ref(), Some(&defaults)),
            &mut self.state,
            &mut self.lists,
        );

        tracing::debug!("Market set to '{}'", key);
        Ok(change.details)
    }

    // Editing

    /// Bind `value` to the field at `path`. The selection fields route
    /// through the resolver.
    pub fn set_value(&mut self, path: &PropertyPath, value: Value) -> Result<(), FormError> {
        self.ensure_open()?;

        if let Some(cascade) = &self.definition.cascade {
            let is_primary = *path == cascade.primary_path();
            let is_secondary = *path == cascade.secondary_path();
            if is_primary || is_secondary {
                let key = value.as_str().ok_or_else(|| FormError::TypeMismatch {
                    path: path.clone(),
                    expected: "string".to_string(),
                    actual: value.to_string(),
                })?;
                let key = key.to_string();
                if is_primary {
                    self.select_environment(&key)?;
                } else if key.is_empty() {
                    return Err(FormError::not_found("market", ""));
                } else {
                    self.select_market(&key)?;
                }
                return Ok(());
            }
        }

        let field = self
            .definition
            .field_at(path)
            .filter(|f| f.is_primitive())
            .ok_or_else(|| FormError::UnknownField(path.clone()))?;
        if !self.state.contains(path) {
            return Err(FormError::UnknownField(path.clone()));
        }
        if !field.kind.accepts(&value) {
            return Err(FormError::TypeMismatch {
                path: path.clone(),
                expected: field.kind.type_name().to_string(),
                actual: value.to_string(),
            });
        }

        self.state.set(path.clone(), value);
        Ok(())
    }

    pub fn add_item(&mut self, list_path: &PropertyPath) -> Result<ItemId, FormError> {
        self.ensure_open()?;
        let item_schema = self
            .definition
            .field_at(list_path)
            .filter(|f| f.kind == FieldKind::Array)
            .and_then(|f| f.item_schema.as_deref())
            .ok_or_else(|| FormError::UnknownField(list_path.clone()))?;
        self.lists.add(list_path, item_schema, &mut self.state)
    }

    pub fn remove_item(&mut self, list_path: &PropertyPath, identity: ItemId) -> Result<(), FormError> {
        self.ensure_open()?;
        self.lists.remove(list_path, identity, &mut self.state)?;
        Ok(())
    }

    // Projection

    /// Descriptor tree for the currently visible fields
    pub fn render(&self) -> Vec<RenderNode> {
        let ctx = RenderContext {
            state: &self.state,
            lists: &self.lists,
        };
        let mut nodes = render_fields(&self.definition.fields, &PropertyPath::root(), ctx);

        let (Some(cascade), Some(resolver)) = (&self.definition.cascade, &self.resolver) else {
            return nodes;
        };
        let selection = resolver.selection();

        nodes.push(RenderNode::Select {
            path: cascade.primary_path(),
            label: "Environment".to_string(),
            value: selection.primary.clone(),
            options: cascade
                .primary_options
                .iter()
                .map(|o| SelectOption {
                    value: o.clone(),
                    label: o.clone(),
                })
                .collect(),
        });

        if selection.primary.is_none() {
            return nodes;
        }
        let options = self
            .loaded_map()
            .map(|map| resolver.secondary_options(map))
            .unwrap_or_default();
        nodes.push(RenderNode::Select {
            path: cascade.secondary_path(),
            label: "Market".to_string(),
            value: selection.secondary.clone(),
            options,
        });

        if selection.secondary.is_some() {
            nodes.extend(render_fields(&cascade.dependent, &PropertyPath::root(), ctx));
        }
        nodes
    }

    /// Nested JSON document of the visible fields
    pub fn document(&self) -> Value {
        let ctx = RenderContext {
            state: &self.state,
            lists: &self.lists,
        };
        let mut doc = Map::new();
        build_document(&self.definition.fields, &PropertyPath::root(), ctx, &mut doc);

        if let (Some(cascade), Some(resolver)) = (&self.definition.cascade, &self.resolver) {
            for (name, path) in [
                (&cascade.primary_field, cascade.primary_path()),
                (&cascade.secondary_field, cascade.secondary_path()),
            ] {
                if let Some(value) = self.state.get(&path) {
                    doc.insert(name.clone(), value.clone());
                }
            }
            if resolver.selection().secondary.is_some() {
                build_document(&cascade.dependent, &PropertyPath::root(), ctx, &mut doc);
            }
        }

        Value::Object(doc)
    }

    pub fn payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            record_id: self.record_id.clone(),
            fields: self.state.clone(),
            document: self.document(),
            required: self.definition.required_paths(&self.selection()),
        }
    }

    // Submission

    /// Mark a submission in flight and hand out its payload.
    pub fn begin_submit(&mut self, extras: Map<String, Value>) -> Result<(Ticket, SubmissionPayload), FormError> {
        self.ensure_open()?;
        if self.in_flight {
            tracing::warn!("Rejected submit: another submission is in flight");
            return Err(FormError::SubmissionInFlight);
        }
        self.in_flight = true;
        let ticket = Ticket {
            epoch: self.epoch,
            load: self.load,
        };
        Ok((ticket, self.payload().with_extras(extras)))
    }

    /// Apply a dispatch outcome. Form values are kept either way.
    pub fn finish_submit(&mut self, ticket: Ticket, outcome: &SubmitOutcome) -> Result<(), FormError> {
        self.check_ticket(ticket)?;
        self.in_flight = false;
        if let SubmitOutcome::Success(record) = outcome {
            if self.record_id.is_none() {
                tracing::debug!("Form now bound to record '{}'", record.id);
                self.record_id = Some(record.id.clone());
            }
        }
        Ok(())
    }

    /// Close the form. Pending loads and submissions are discarded on arrival.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.epoch += 1;
            self.in_flight = false;
            tracing::debug!("Form session closed");
        }
    }
}

fn apply_clear(clear: &ClearInstruction, state: &mut FormState, lists: &mut ListEditor) {
    for path in &clear.paths {
        lists.clear_subtree(path, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::definition::default_primary_options;
    use crate::form::render::bound_paths;
    use crate::form::schema::FieldSchema;
    use serde_json::json;

    fn p(s: &str) -> PropertyPath {
        PropertyPath::parse(s)
    }

    fn sample_map() -> ConfigurationMap {
        serde_json::from_value(json!({
            "dev": {
                "eu": { "hostUrl": "h1", "tokenUrl": "t1", "appIds": ["a", "b"] },
                "us": { "hostUrl": "h2", "tokenUrl": "t2", "appIds": [] }
            }
        }))
        .unwrap()
    }

    fn market_session() -> FormSession {
        let mut session =
            FormSession::open(FormDefinition::market_configuration(default_primary_options())).unwrap();
        session.load_configuration(sample_map()).unwrap();
        session
    }

    fn state_paths(session: &FormSession) -> Vec<String> {
        session.state().iter().map(|(p, _)| p.to_string()).collect()
    }

    #[test]
    fn test_blank_form_shows_only_environment() {
        let session = market_session();
        let paths: Vec<String> = bound_paths(&session.render()).iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["name", "description", "environment"]);
        assert_eq!(session.document(), json!({ "name": "", "description": "", "environment": "" }));

        // Hidden fields are never required
        let required: Vec<String> = session.payload().required.iter().map(|p| p.to_string()).collect();
        assert_eq!(required, vec!["name", "description", "environment"]);
    }

    #[test]
    fn test_bound_paths_match_state() {
        let mut session = market_session();
        session.select_environment("dev").unwrap();
        session.select_market("eu").unwrap();

        let mut rendered: Vec<String> =
            bound_paths(&session.render()).iter().map(|p| p.to_string()).collect();
        rendered.sort();
        let mut stored = state_paths(&session);
        stored.sort();
        assert_eq!(rendered, stored);
    }

    #[test]
    fn test_market_requires_loaded_configuration() {
        let mut session =
            FormSession::open(FormDefinition::market_configuration(default_primary_options())).unwrap();
        let ticket = session.begin_config_load().unwrap();

        // Editing continues while the map is loading
        session.set_value(&p("name"), json!("svc")).unwrap();
        assert!(session.select_environment("dev").unwrap().is_empty());
        assert!(matches!(session.select_market("eu"), Err(FormError::ConfigurationPending)));

        session.finish_config_load(ticket, sample_map()).unwrap();
        session.select_market("eu").unwrap();
        assert_eq!(session.state().get(&p("hostUrl")), Some(&json!("h1")));
    }

    #[test]
    fn test_failed_load_reports_unavailable() {
        let mut session =
            FormSession::open(FormDefinition::market_configuration(default_primary_options())).unwrap();
        let ticket = session.begin_config_load().unwrap();
        session.fail_config_load(ticket, "timeout".to_string()).unwrap();
        session.select_environment("dev").unwrap();
        assert!(matches!(
            session.select_market("eu"),
            Err(FormError::ConfigurationUnavailable(_))
        ));
    }

    #[test]
    fn test_switching_market_replaces_dependents() {
        let mut session = market_session();
        session.select_environment("dev").unwrap();
        session.select_market("eu").unwrap();
        session.select_market("us").unwrap();

        assert_eq!(session.state().get(&p("hostUrl")), Some(&json!("h2")));
        assert!(session.lists().list(&p("appIds")).unwrap().is_empty());
        assert!(!session.state().contains(&p("appIds[0]")));
    }

    #[test]
    fn test_unknown_market_leaves_state_untouched() {
        let mut session = market_session();
        session.select_environment("dev").unwrap();
        session.select_market("eu").unwrap();
        let before = session.state().clone();

        assert!(matches!(session.select_market("apac"), Err(FormError::NotFound { .. })));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_set_value_checks_path_and_kind() {
        let mut session = FormSession::open(FormDefinition::from_fields(vec![
            FieldSchema::number("age", None),
            FieldSchema::array("tags", FieldSchema::string("", "")),
        ]))
        .unwrap();

        session.set_value(&p("age"), json!(42)).unwrap();
        assert!(matches!(
            session.set_value(&p("age"), json!("old")),
            Err(FormError::TypeMismatch { .. })
        ));
        assert!(matches!(
            session.set_value(&p("tags[0]"), json!("x")),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            session.set_value(&p("missing"), json!("x")),
            Err(FormError::UnknownField(_))
        ));

        session.add_item(&p("tags")).unwrap();
        session.set_value(&p("tags[0]"), json!("x")).unwrap();
        assert_eq!(session.document(), json!({ "age": 42, "tags": ["x"] }));
    }

    #[test]
    fn test_set_value_routes_selection_fields() {
        let mut session = market_session();
        session.set_value(&p("environment"), json!("dev")).unwrap();
        session.set_value(&p("market"), json!("eu")).unwrap();
        assert_eq!(session.selection().secondary.as_deref(), Some("eu"));
        assert!(matches!(
            session.set_value(&p("environment"), json!("prod-x")),
            Err(FormError::NotFound { .. })
        ));
    }

    #[test]
    fn test_restore_from_record() {
        let record = Record::new(
            "rec-1",
            json!({
                "name": "svc",
                "description": "d",
                "environment": "dev",
                "market": "eu",
                "hostUrl": "custom-host",
                "tokenUrl": "t1",
                "appIds": ["x"]
            }),
        );
        let mut session = FormSession::open_with_record(
            FormDefinition::market_configuration(default_primary_options()),
            &record,
        )
        .unwrap();
        assert_eq!(session.state().get(&p("name")), Some(&json!("svc")));
        assert!(!session.state().contains(&p("hostUrl")));

        session.load_configuration(sample_map()).unwrap();
        assert_eq!(session.record_id(), Some("rec-1"));
        assert_eq!(session.state().get(&p("hostUrl")), Some(&json!("custom-host")));
        assert_eq!(session.lists().list(&p("appIds")).unwrap().len(), 1);

        // A fresh market choice seeds from the configuration, not the record
        session.select_market("eu").unwrap();
        assert_eq!(session.state().get(&p("hostUrl")), Some(&json!("h1")));
        assert_eq!(session.lists().list(&p("appIds")).unwrap().len(), 2);
    }

    #[test]
    fn test_submit_guard_and_close() {
        let mut session = market_session();
        let (ticket, payload) = session.begin_submit(Map::new()).unwrap();
        assert!(payload.record_id.is_none());
        assert!(matches!(session.begin_submit(Map::new()), Err(FormError::SubmissionInFlight)));

        let record = Record::new("new-id", payload.document.clone());
        session.finish_submit(ticket, &SubmitOutcome::Success(record)).unwrap();
        assert_eq!(session.record_id(), Some("new-id"));

        let (ticket, _) = session.begin_submit(Map::new()).unwrap();
        session.close();
        let late = SubmitOutcome::Success(Record::new("other", json!({})));
        assert!(matches!(session.finish_submit(ticket, &late), Err(FormError::SessionClosed)));
        assert_eq!(session.record_id(), Some("new-id"));
    }

    #[test]
    fn test_late_config_is_discarded_after_close() {
        let mut session =
            FormSession::open(FormDefinition::market_configuration(default_primary_options())).unwrap();
        let ticket = session.begin_config_load().unwrap();
        session.close();
        assert!(session.finish_config_load(ticket, sample_map()).is_err());
        assert_eq!(session.config_status(), &ConfigStatus::Pending);
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let mut session =
            FormSession::open(FormDefinition::market_configuration(default_primary_options())).unwrap();
        let older = session.begin_config_load().unwrap();
        let newer = session.begin_config_load().unwrap();

        let newer_map: ConfigurationMap = serde_json::from_value(json!({
            "dev": { "us": { "hostUrl": "h2", "tokenUrl": "t2", "appIds": [] } }
        }))
        .unwrap();
        session.finish_config_load(newer, newer_map.clone()).unwrap();

        assert!(matches!(
            session.finish_config_load(older, sample_map()),
            Err(FormError::StaleLoad)
        ));
        assert!(matches!(
            session.fail_config_load(older, "timeout".to_string()),
            Err(FormError::StaleLoad)
        ));
        assert_eq!(session.config_status(), &ConfigStatus::Loaded(newer_map));

        let markets: Vec<String> = session
            .select_environment("dev")
            .unwrap()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(markets, vec!["us"]);
    }

    #[test]
    fn test_extras_merge_into_document() {
        let session = market_session();
        let mut extras = Map::new();
        extras.insert("status".to_string(), json!("published"));
        let payload = session.payload().with_extras(extras);
        assert_eq!(payload.document["status"], json!("published"));
    }
}
