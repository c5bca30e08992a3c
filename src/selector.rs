//! The cascading field selector — a recursive selection state machine.
//!
//! A [`FieldSelector`] holds one level of the drill-down: the catalog of
//! selectable fields and the current pick. When the pick (or the context
//! handed down from the enclosing level) is a reference field, the
//! selector owns a nested `FieldSelector` scoped to the referenced
//! object. Context flows top-down through [`FieldSelector::set_context`];
//! picks flow bottom-up through [`FieldSelector::on_nested_pick`].
//!
//! Catalog loading is split in two halves, mirroring the host's
//! callback-driven runtime: `set_context` initiates and returns the
//! [`CatalogRequest`] to fulfill, [`FieldSelector::complete_catalog`]
//! applies the outcome. There is no generation token: a completion for a
//! superseded request still overwrites the catalog, exactly as a late
//! promise callback would.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::catalog::FieldCatalog;
use crate::error::Result;
use crate::loader::CatalogLoader;
use crate::presenter::{reduce_errors, ErrorPresenter, TracingPresenter};
use crate::types::{Field, PickOption, SelectedField};

const EVENT_CAPACITY: usize = 64;

/// Where a selector sits in its lifecycle. Long-lived: there is no
/// terminal state, the selector idles between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// No catalog, no pick.
    Idle,
    /// Catalog populated, nothing picked yet.
    CatalogLoaded,
    /// A field is picked (possibly a reference).
    Selected,
    /// A catalog fetch for the referenced object is in flight.
    AwaitingNestedCatalog,
}

/// A catalog fetch the host must fulfill and feed back through
/// [`FieldSelector::complete_catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub object_api_name: String,
    pub include_formula: bool,
}

/// One level of the cascading picker, composable into a chain by
/// ownership: each segment owns at most one nested segment.
pub trait FieldPathSegment {
    /// Accept the field picked by the enclosing level. Returns the
    /// catalog request to fulfill when that pick is a reference.
    fn set_context(&mut self, context: SelectedField) -> Option<CatalogRequest>;
    /// Replace the catalog wholesale.
    fn set_selectable_fields(&mut self, fields: Vec<Field>);
    /// Pick a field by API name. Unknown names are a silent no-op.
    fn on_pick(&mut self, api_name: &str) -> Option<SelectedField>;
    /// Merge the nested level's pick into this level's chain.
    fn on_nested_pick(&mut self, nested: SelectedField) -> SelectedField;
}

/// Builder for [`FieldSelector`]. Created by [`FieldSelector::builder`].
pub struct FieldSelectorBuilder {
    loader: Arc<dyn CatalogLoader>,
    presenter: Arc<dyn ErrorPresenter>,
    fields: Option<Vec<Field>>,
    selection: Option<SelectedField>,
    lock_required: bool,
    require_selection: bool,
}

impl FieldSelectorBuilder {
    /// Override the default tracing-backed error presenter.
    pub fn with_presenter(mut self, presenter: Arc<dyn ErrorPresenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Seed the catalog before any load. The lookup map and display
    /// options are built together from the same list.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Seed the current selection.
    pub fn with_selection(mut self, selection: SelectedField) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Enable the required-field lock: a required pick disables further
    /// edits at this level.
    pub fn lock_required(mut self, lock: bool) -> Self {
        self.lock_required = lock;
        self
    }

    /// Whether `validate()` demands a pick once the catalog offers
    /// options. Defaults to true.
    pub fn require_selection(mut self, require: bool) -> Self {
        self.require_selection = require;
        self
    }

    pub fn build(self) -> FieldSelector {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let catalog = self
            .fields
            .as_deref()
            .map(FieldCatalog::from_fields)
            .unwrap_or_default();
        let selection = self.selection.unwrap_or_default();
        let state = match (catalog.is_empty(), selection.is_picked()) {
            (_, true) => SelectorState::Selected,
            (false, false) => SelectorState::CatalogLoaded,
            (true, false) => SelectorState::Idle,
        };
        FieldSelector {
            loader: self.loader,
            presenter: self.presenter,
            catalog,
            selection,
            context: None,
            state,
            lock_required: self.lock_required,
            require_selection: self.require_selection,
            validity: Vec::new(),
            child: None,
            events,
        }
    }
}

/// One level of the cascading field picker.
pub struct FieldSelector {
    loader: Arc<dyn CatalogLoader>,
    presenter: Arc<dyn ErrorPresenter>,
    catalog: FieldCatalog,
    selection: SelectedField,
    context: Option<SelectedField>,
    state: SelectorState,
    lock_required: bool,
    require_selection: bool,
    validity: Vec<String>,
    child: Option<Box<FieldSelector>>,
    events: broadcast::Sender<SelectedField>,
}

impl FieldSelector {
    pub fn builder(loader: Arc<dyn CatalogLoader>) -> FieldSelectorBuilder {
        FieldSelectorBuilder {
            loader,
            presenter: Arc::new(TracingPresenter),
            fields: None,
            selection: None,
            lock_required: false,
            require_selection: true,
        }
    }

    // --- Catalog ---

    /// Replace the catalog wholesale from a field list.
    pub fn set_selectable_fields(&mut self, fields: Vec<Field>) {
        self.catalog = FieldCatalog::from_fields(&fields);
        self.recompute_state();
        tracing::debug!(fields = self.catalog.len(), "catalog installed");
    }

    /// Replace the catalog from a raw payload. Non-array input resets
    /// the catalog to empty.
    pub fn set_selectable_from_value(&mut self, value: &serde_json::Value) {
        self.catalog = FieldCatalog::from_value(value);
        self.recompute_state();
    }

    /// The catalog's fields, unordered. Callers needing display order
    /// use [`FieldSelector::display_options`].
    pub fn selectable_fields(&self) -> impl Iterator<Item = &Field> {
        self.catalog.fields()
    }

    /// The ordered `{label, value}` display options.
    pub fn display_options(&self) -> &[PickOption] {
        self.catalog.options()
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    // --- Context / async catalog refresh ---

    /// Accept the field picked by the enclosing level.
    ///
    /// When the context is a reference, the selector enters
    /// `AwaitingNestedCatalog` and returns the fetch to fulfill (formula
    /// fields included). A non-reference context has nothing to recurse
    /// into and returns `None`.
    pub fn set_context(&mut self, context: SelectedField) -> Option<CatalogRequest> {
        let request = context
            .reference_to
            .as_ref()
            .map(|object| CatalogRequest {
                object_api_name: object.clone(),
                include_formula: true,
            });
        self.context = Some(context);
        if request.is_some() {
            self.state = SelectorState::AwaitingNestedCatalog;
        }
        request
    }

    /// Apply the outcome of a catalog fetch.
    ///
    /// On success the catalog is replaced and, if the stored context
    /// carries a nested pick, that pick is restored as this level's
    /// current selection. On failure the messages are surfaced through
    /// the presenter and the catalog keeps its last-known state — no
    /// partial write. Returns whether a catalog was installed.
    pub fn complete_catalog(&mut self, outcome: Result<Vec<Field>>) -> bool {
        match outcome {
            Ok(fields) => {
                self.set_selectable_fields(fields);
                let restored = self
                    .context
                    .as_ref()
                    .and_then(|c| c.parent.as_deref())
                    .cloned();
                if let Some(nested) = restored {
                    tracing::debug!(path = %nested.dot_path(), "restoring nested selection");
                    self.selection = nested;
                    self.state = SelectorState::Selected;
                }
                true
            }
            Err(error) => {
                self.presenter.show(&reduce_errors(&error));
                self.recompute_state();
                false
            }
        }
    }

    /// `set_context` end to end: initiate, await the owned loader, apply.
    ///
    /// When the restored selection is itself a reference, the nested
    /// selector is rebuilt and the walk continues down the stored chain,
    /// so a previously built path comes back fully populated.
    pub async fn apply_context(&mut self, context: SelectedField) {
        let mut selector: &mut FieldSelector = self;
        let mut context = context;
        loop {
            let had_nested = context.parent.is_some();
            let Some(request) = selector.set_context(context) else {
                return;
            };
            let outcome = selector
                .loader
                .fetch_fields(&request.object_api_name, request.include_formula)
                .await;
            let installed = selector.complete_catalog(outcome);
            if !(installed && had_nested && selector.selection.is_reference()) {
                return;
            }
            let next = selector.selection.clone();
            selector = selector.ensure_child();
            context = next;
        }
    }

    // --- Picks ---

    /// Pick a field by API name.
    ///
    /// A successful pick replaces the selection, drops any previously
    /// built nested chain (a fresh pick at this level invalidates stale
    /// downstream state), and emits a selection-changed snapshot. Names
    /// absent from the catalog are a silent no-op: the rendered options
    /// list is the source of truth for what is selectable.
    pub fn on_pick(&mut self, api_name: &str) -> Option<SelectedField> {
        let field = self.catalog.get(api_name)?.clone();
        self.selection = SelectedField::from(&field);
        self.child = None;
        self.state = SelectorState::Selected;
        tracing::debug!(field = %api_name, "field picked");
        self.notify();
        Some(self.selection.clone())
    }

    /// Merge the nested level's pick into this level's chain. Every
    /// other part of the current selection is preserved.
    pub fn on_nested_pick(&mut self, nested: SelectedField) -> SelectedField {
        self.selection = self.selection.with_nested(nested);
        self.notify();
        self.selection.clone()
    }

    /// [`FieldSelector::on_pick`] plus ownership composition: a picked
    /// reference field builds the nested selector and loads its catalog.
    pub async fn pick(&mut self, api_name: &str) -> Option<SelectedField> {
        let selection = self.on_pick(api_name)?;
        if selection.is_reference() {
            let context = selection.clone();
            self.ensure_child().apply_context(context).await;
        }
        Some(selection)
    }

    /// Pick at a nested level (`depth` 0 is this selector) and merge the
    /// result upward through every enclosing level. Returns the full
    /// chain as seen from this selector, or `None` when no selector
    /// exists at that depth or the name is unknown there.
    pub async fn pick_at(&mut self, depth: usize, api_name: &str) -> Option<SelectedField> {
        if depth == 0 {
            return self.pick(api_name).await;
        }
        let child = self.child.as_mut()?;
        let nested = Box::pin(child.pick_at(depth - 1, api_name)).await?;
        Some(self.on_nested_pick(nested))
    }

    // --- Validation ---

    /// Validate this level's own input: a pick is demanded once the
    /// catalog offers options (unless `require_selection` is off). Does
    /// not recurse into the nested selector — chain-wide gating is
    /// [`FieldSelector::validate_chain`].
    pub fn validate(&mut self) -> bool {
        self.validity.clear();
        if self.require_selection && !self.catalog.is_empty() && !self.selection.is_picked() {
            self.validity.push("a field selection is required".to_string());
        }
        let valid = self.validity.is_empty();
        if !valid {
            tracing::debug!(messages = ?self.validity, "selector input invalid");
        }
        valid
    }

    /// Validate every level of the owned chain.
    pub fn validate_chain(&mut self) -> bool {
        let own = self.validate();
        let nested = self.child.as_mut().map_or(true, |c| c.validate_chain());
        own && nested
    }

    /// The validity report of the last [`FieldSelector::validate`] call.
    pub fn validity_messages(&self) -> &[String] {
        &self.validity
    }

    // --- State ---

    /// True only when the required-field lock is enabled and the current
    /// pick is required. False whenever the lock is off.
    pub fn is_required_and_locked(&self) -> bool {
        self.lock_required && self.selection.required
    }

    pub fn selection(&self) -> &SelectedField {
        &self.selection
    }

    pub fn context(&self) -> Option<&SelectedField> {
        self.context.as_ref()
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// The nested selector, present while the current pick or context
    /// drills into a referenced object.
    pub fn nested(&self) -> Option<&FieldSelector> {
        self.child.as_deref()
    }

    pub fn nested_mut(&mut self) -> Option<&mut FieldSelector> {
        self.child.as_deref_mut()
    }

    /// Subscribe to selection-changed snapshots. Each emission carries
    /// the full chain as value-copied data; later selector mutation
    /// cannot alter a delivered snapshot.
    ///
    /// The channel buffers the most recent 64 emissions. A subscriber
    /// that falls further behind than that receives
    /// [`broadcast::error::RecvError::Lagged`] with the number of
    /// dropped snapshots and resumes from the oldest retained one —
    /// loss is reported, never silent.
    pub fn subscribe(&self) -> broadcast::Receiver<SelectedField> {
        self.events.subscribe()
    }

    // --- Internal ---

    fn ensure_child(&mut self) -> &mut FieldSelector {
        let loader = Arc::clone(&self.loader);
        let presenter = Arc::clone(&self.presenter);
        let lock_required = self.lock_required;
        let require_selection = self.require_selection;
        self.child.get_or_insert_with(|| {
            Box::new(
                FieldSelector::builder(loader)
                    .with_presenter(presenter)
                    .lock_required(lock_required)
                    .require_selection(require_selection)
                    .build(),
            )
        })
    }

    fn notify(&self) {
        // No receivers is fine; the host may not have subscribed yet.
        let _ = self.events.send(self.selection.clone());
    }

    /// Settle the lifecycle state from what is actually held. Used after
    /// catalog replacement and after a failed fetch (back to the
    /// last-known state, never stuck in `AwaitingNestedCatalog`).
    fn recompute_state(&mut self) {
        self.state = match (self.catalog.is_empty(), self.selection.is_picked()) {
            (_, true) => SelectorState::Selected,
            (false, false) => SelectorState::CatalogLoaded,
            (true, false) => SelectorState::Idle,
        };
    }
}

impl FieldPathSegment for FieldSelector {
    fn set_context(&mut self, context: SelectedField) -> Option<CatalogRequest> {
        FieldSelector::set_context(self, context)
    }

    fn set_selectable_fields(&mut self, fields: Vec<Field>) {
        FieldSelector::set_selectable_fields(self, fields)
    }

    fn on_pick(&mut self, api_name: &str) -> Option<SelectedField> {
        FieldSelector::on_pick(self, api_name)
    }

    fn on_nested_pick(&mut self, nested: SelectedField) -> SelectedField {
        FieldSelector::on_nested_pick(self, nested)
    }
}
