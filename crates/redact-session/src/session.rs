//! Review session - cursor, bulk operations and reconciliation
//!
//! Every mutation runs to completion and is followed by a full re-extraction.
//! Review state is reconciled against the new occurrences by group key, so
//! decisions survive re-scans and vanish with the fragments they describe.

use redact_core::{
    BulkOutcome, DetectionResult, Error, Extractor, GroupKey, LiveGroup, Occurrence, OccurrenceKey,
    Outcome, ReplacementCatalog, ReplacementEngine, Result, ReviewState, ReviewStatus, TextBuffer,
    engine,
};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog};
use crate::host::{EditorHost, HostError, Marker};
use crate::progress::Progress;
use crate::sort::{self, SortOrder};

type ResolvedListener = Box<dyn FnMut(&Progress)>;

pub struct ReviewSession<B: TextBuffer> {
    id: Uuid,
    buffer: B,
    detection: DetectionResult,
    extractor: Extractor,
    engine: ReplacementEngine,
    state: ReviewState,
    occurrences: Vec<Occurrence>,
    groups: Vec<LiveGroup>,
    skipped_suggestions: usize,
    /// Indices into `occurrences` in display order
    order: Vec<usize>,
    sort: SortOrder,
    /// Position within `order`
    cursor: Option<usize>,
    host: Option<Box<dyn EditorHost>>,
    audit: AuditLog,
    resolved_listener: Option<ResolvedListener>,
    resolved_fired: bool,
}

impl<B: TextBuffer> ReviewSession<B> {
    pub fn new(buffer: B, catalog: ReplacementCatalog) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!("Review session {} started", id);

        Self {
            id,
            buffer,
            detection: DetectionResult::default(),
            extractor: Extractor::new(catalog),
            engine: ReplacementEngine::new(),
            state: ReviewState::new(),
            occurrences: Vec::new(),
            groups: Vec::new(),
            skipped_suggestions: 0,
            order: Vec::new(),
            sort: SortOrder::default(),
            cursor: None,
            host: None,
            audit: AuditLog::new(id),
            resolved_listener: None,
            resolved_fired: false,
        }
    }

    pub fn with_host(mut self, host: impl EditorHost + 'static) -> Self {
        self.attach_host(host);
        self
    }

    pub fn attach_host(&mut self, host: impl EditorHost + 'static) {
        self.host = Some(Box::new(host));
        self.publish_markers();
    }

    /// Host torn down: later commands are dropped, review state keeps updating
    pub fn detach_host(&mut self) {
        self.host = None;
    }

    /// Called once each time the last pending group gets a decision
    pub fn on_resolved(&mut self, listener: impl FnMut(&Progress) + 'static) {
        self.resolved_listener = Some(Box::new(listener));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Install a new classifier result and re-extract.
    ///
    /// A result with nothing to review clears all review state.
    pub fn set_detection(&mut self, detection: DetectionResult) {
        if detection.is_clear() {
            tracing::info!("No PHI detected, clearing review state");
            self.state.clear();
        }
        self.detection = detection;
        self.refresh();
    }

    /// Apply a raw edit from the editing surface, then re-extract
    pub fn edit_buffer(&mut self, edit: impl FnOnce(&mut B)) {
        edit(&mut self.buffer);
        self.refresh();
    }

    /// Re-extract occurrences and reconcile review state against them
    pub fn refresh(&mut self) {
        let previous = self.current().map(|o| (o.key.clone(), o.group.clone()));
        let previous_cursor = self.cursor;

        let extraction = self
            .extractor
            .extract(&self.detection, &self.buffer.text(), &self.state);

        if self.detection.is_clear() {
            self.state.clear();
        } else {
            self.state.reconcile(extraction.live_groups());
        }

        self.occurrences = extraction.occurrences;
        self.groups = extraction.groups;
        self.skipped_suggestions = extraction.skipped_suggestions;
        self.rebuild_order();
        self.cursor = self.restore_cursor(previous, previous_cursor);

        self.publish_markers();
        self.check_resolved();
    }

    fn rebuild_order(&mut self) {
        self.order = sort::display_order(&self.occurrences, self.sort, &self.state);
    }

    /// Follow the same occurrence, else the same group, else stay at the
    /// same display row
    fn restore_cursor(
        &self,
        previous: Option<(OccurrenceKey, GroupKey)>,
        previous_cursor: Option<usize>,
    ) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        let (key, group) = previous?;
        self.position_of(|o| o.key == key)
            .or_else(|| self.position_of(|o| o.group == group))
            .or_else(|| previous_cursor.map(|c| c.min(self.order.len() - 1)))
    }

    fn position_of(&self, predicate: impl Fn(&Occurrence) -> bool) -> Option<usize> {
        self.order
            .iter()
            .position(|&index| predicate(&self.occurrences[index]))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Occurrences in extraction (first-seen) order
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Occurrences in display order
    pub fn displayed(&self) -> impl Iterator<Item = &Occurrence> {
        self.order.iter().map(|&index| &self.occurrences[index])
    }

    pub fn occurrence(&self, key: &OccurrenceKey) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| &o.key == key)
    }

    /// Every live group in first-seen order, including groups whose
    /// positions were all claimed by another group
    pub fn groups(&self) -> &[LiveGroup] {
        &self.groups
    }

    pub fn status(&self, group: &GroupKey) -> ReviewStatus {
        self.state.status(group)
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn effective_replacement<'a>(&'a self, occurrence: &'a Occurrence) -> &'a str {
        self.state
            .effective_replacement(&occurrence.group, &occurrence.suggested_replacement)
    }

    pub fn progress(&self) -> Progress {
        Progress::compute(&self.occurrences, &self.groups, &self.state)
    }

    /// Suggestions ignored in the last extraction for missing title or examples
    pub fn skipped_suggestions(&self) -> usize {
        self.skipped_suggestions
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.displayed()
            .map(|o| Marker::new(o, self.state.status(&o.group), self.effective_replacement(o)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Occurrence> {
        self.cursor
            .and_then(|c| self.order.get(c))
            .map(|&index| &self.occurrences[index])
    }

    pub fn next(&mut self) -> Option<&Occurrence> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        self.move_to(self.cursor.map_or(0, |c| (c + 1) % len))
    }

    pub fn previous(&mut self) -> Option<&Occurrence> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        self.move_to(match self.cursor {
            Some(0) | None => len - 1,
            Some(c) => c - 1,
        })
    }

    pub fn first(&mut self) -> Option<&Occurrence> {
        if self.order.is_empty() {
            return None;
        }
        self.move_to(0)
    }

    pub fn last(&mut self) -> Option<&Occurrence> {
        if self.order.is_empty() {
            return None;
        }
        self.move_to(self.order.len() - 1)
    }

    pub fn select(&mut self, key: &OccurrenceKey) -> Option<&Occurrence> {
        let position = self.position_of(|o| &o.key == key)?;
        self.move_to(position)
    }

    fn move_to(&mut self, position: usize) -> Option<&Occurrence> {
        self.cursor = Some(position);
        let index = self.order[position];

        let occurrence = &self.occurrences[index];
        dispatch(&mut self.host, "reveal", |host| host.reveal(occurrence));

        Some(&self.occurrences[index])
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Re-sort the display; the cursor stays on the same occurrence
    pub fn set_sort(&mut self, sort: SortOrder) {
        let current = self.current().map(|o| o.key.clone());
        self.sort = sort;
        self.rebuild_order();
        if let Some(key) = current {
            self.cursor = self.position_of(|o| o.key == key);
        }
        self.publish_markers();
    }

    // ------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------

    fn lookup(&self, key: &OccurrenceKey) -> Result<Occurrence> {
        self.occurrence(key)
            .cloned()
            .ok_or_else(|| Error::UnknownOccurrence(key.to_string()))
    }

    pub fn accept(&mut self, key: &OccurrenceKey) -> Result<Outcome> {
        let occurrence = self.lookup(key)?;
        let outcome = self
            .engine
            .accept(&mut self.buffer, &mut self.state, &occurrence)?;
        self.finish(AuditAction::Accept, &occurrence, &outcome);
        Ok(outcome)
    }

    pub fn skip(&mut self, key: &OccurrenceKey) -> Result<Outcome> {
        let occurrence = self.lookup(key)?;
        let outcome = self.engine.skip(&mut self.state, &occurrence)?;
        self.finish(AuditAction::Skip, &occurrence, &outcome);
        Ok(outcome)
    }

    pub fn revert(&mut self, key: &OccurrenceKey) -> Result<Outcome> {
        let occurrence = self.lookup(key)?;
        let outcome = self
            .engine
            .revert(&mut self.buffer, &mut self.state, &occurrence)?;
        self.finish(AuditAction::Revert, &occurrence, &outcome);
        Ok(outcome)
    }

    pub fn edit_replacement(&mut self, key: &OccurrenceKey, text: &str) -> Result<Outcome> {
        let occurrence = self.lookup(key)?;
        let outcome =
            self.engine
                .edit_replacement(&mut self.buffer, &mut self.state, &occurrence, text)?;
        self.finish(AuditAction::EditReplacement, &occurrence, &outcome);
        Ok(outcome)
    }

    /// Revert a group by key. Reaches groups with no visible occurrence.
    pub fn revert_group(&mut self, group: &GroupKey) -> Result<Outcome> {
        let target = self
            .groups
            .iter()
            .find(|g| &g.group == group)
            .map(|g| g.first.clone())
            .ok_or_else(|| Error::UnknownGroup(group.clone()))?;
        let outcome = self
            .engine
            .revert(&mut self.buffer, &mut self.state, &target)?;
        self.finish(AuditAction::Revert, &target, &outcome);
        Ok(outcome)
    }

    /// Shortcut activation: accept the current occurrence if it still shows
    /// its original value (pending, or reappeared after acceptance),
    /// otherwise do nothing
    pub fn activate_current(&mut self) -> Result<Option<Outcome>> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        if !engine::needs_redaction(&self.state, current) {
            return Ok(None);
        }
        let key = current.key.clone();
        self.accept(&key).map(Some)
    }

    /// Occurrences in first-seen order, then one stand-in per decided group
    /// whose positions were all claimed by another group
    fn bulk_targets(&self) -> Vec<Occurrence> {
        let shadowed = self
            .groups
            .iter()
            .filter(|g| g.is_shadowed() && self.state.status(&g.group).is_decided())
            .map(|g| g.first.clone());
        self.occurrences.iter().cloned().chain(shadowed).collect()
    }

    pub fn apply_all(&mut self) -> Result<BulkOutcome> {
        let targets = self.bulk_targets();
        let outcome = self
            .engine
            .apply_all(&mut self.buffer, &mut self.state, &targets)?;
        self.finish_bulk(AuditAction::ApplyAll, outcome);
        Ok(outcome)
    }

    pub fn skip_all(&mut self) -> Result<BulkOutcome> {
        let targets = self.bulk_targets();
        let outcome = self.engine.skip_all(&mut self.state, &targets)?;
        self.finish_bulk(AuditAction::SkipAll, outcome);
        Ok(outcome)
    }

    pub fn revert_all(&mut self) -> Result<BulkOutcome> {
        let targets = self.bulk_targets();
        let outcome = self
            .engine
            .revert_all(&mut self.buffer, &mut self.state, &targets)?;
        self.finish_bulk(AuditAction::RevertAll, outcome);
        Ok(outcome)
    }

    fn finish(&mut self, action: AuditAction, occurrence: &Occurrence, outcome: &Outcome) {
        self.audit.record_group(
            action,
            &outcome.group,
            &occurrence.detected_type,
            outcome.status,
            outcome.replacements,
        );
        self.refresh();
    }

    fn finish_bulk(&mut self, action: AuditAction, outcome: BulkOutcome) {
        tracing::info!(
            "{:?}: {} groups, {} replacements",
            action,
            outcome.groups,
            outcome.replacements
        );
        self.audit
            .record_bulk(action, outcome.groups, outcome.replacements);
        self.refresh();
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn publish_markers(&mut self) {
        if self.host.is_none() {
            return;
        }
        let markers = self.markers();
        dispatch(&mut self.host, "publish_markers", |host| {
            host.publish_markers(&markers)
        });
    }

    fn check_resolved(&mut self) {
        let progress = self.progress();

        if !progress.is_resolved() {
            self.resolved_fired = false;
            return;
        }
        if self.resolved_fired {
            return;
        }

        self.resolved_fired = true;
        tracing::info!(
            "All {} groups resolved ({} accepted, {} skipped)",
            progress.unique_groups,
            progress.accepted,
            progress.skipped
        );
        if let Some(listener) = self.resolved_listener.as_mut() {
            listener(&progress);
        }
    }
}

/// Send a command to the host, dropping it if the host is gone or failing
fn dispatch(
    host: &mut Option<Box<dyn EditorHost>>,
    command: &str,
    send: impl FnOnce(&mut dyn EditorHost) -> std::result::Result<(), HostError>,
) {
    let Some(host) = host.as_mut() else {
        return;
    };
    if let Err(e) = send(&mut **host) {
        tracing::warn!("Dropped {} command: {}", command, e);
    }
}
