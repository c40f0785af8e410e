//! The page context: one document, one map controller and the feature
//! handlers wired to document events.
//!
//! Events are delivered with [`Page::dispatch`]. Each handler runs to
//! completion on `&mut Page`, so handlers never interleave; the only
//! suspension points are the file read and the backend calls.

use crate::adapters::map::InMemoryMap;
use crate::config::PageConfig;
use crate::core::forms::{self, ServiceFieldBuilder, ServiceRow};
use crate::core::job_filter;
use crate::core::map_control::MapController;
use crate::core::media;
use crate::core::messaging::{self, MessagingClient, Outbox};
use crate::core::notifications::Notifier;
use crate::core::rating;
use crate::domain::document::{Document, NodeId};
use crate::domain::model::{
    parse_int_prefix, JobFilter, JobSort, LatLng, MessageKind, RecipientId, Severity,
};
use crate::domain::ports::{MapSurface, MarketplaceApi};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::time::Instant;

pub const MAP_ID: &str = "map";
pub const FILTER_INPUT_CLASS: &str = "filter-input";
pub const CATEGORY_FILTER_ID: &str = "category-filter";
pub const MIN_RATE_FILTER_ID: &str = "min-rate-filter";
pub const MAX_DISTANCE_FILTER_ID: &str = "max-distance-filter";
pub const KEYWORD_FILTER_ID: &str = "keyword-filter";

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Something the user did to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Submit(NodeId),
    Change(NodeId),
    Click(NodeId),
}

impl PageEvent {
    fn target(self) -> (NodeId, &'static [Listener]) {
        match self {
            PageEvent::Submit(node) => (node, SUBMIT_LISTENERS),
            PageEvent::Change(node) => (node, CHANGE_LISTENERS),
            PageEvent::Click(node) => (node, CLICK_LISTENERS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// No listener for this event on that element.
    Ignored,
    Handled,
    /// The default action (form submission) must not happen.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listener {
    ValidateOnSubmit,
    PreviewOnChange,
    FilterOnChange,
    RemoveRowOnClick,
    RateOnClick,
}

const SUBMIT_LISTENERS: &[Listener] = &[Listener::ValidateOnSubmit];
const CHANGE_LISTENERS: &[Listener] = &[Listener::PreviewOnChange, Listener::FilterOnChange];
const CLICK_LISTENERS: &[Listener] = &[Listener::RemoveRowOnClick, Listener::RateOnClick];

pub struct Page<A: MarketplaceApi, M: MapSurface + Default = InMemoryMap> {
    document: Document,
    map: MapController<M>,
    map_center: LatLng,
    map_zoom: u8,
    services: ServiceFieldBuilder,
    notifier: Notifier,
    messaging: MessagingClient<A>,
    listeners: HashMap<NodeId, Vec<Listener>>,
}

impl<A: MarketplaceApi, M: MapSurface + Default> Page<A, M> {
    pub fn new(document: Document, api: A) -> Self {
        Self::with_config(document, api, &PageConfig::default())
    }

    pub fn with_config(document: Document, api: A, config: &PageConfig) -> Self {
        Self {
            document,
            map: MapController::new(config.map.tile_layer()),
            map_center: config.map.center(),
            map_zoom: config.map.zoom,
            services: ServiceFieldBuilder::new(config.services.categories.clone()),
            notifier: Notifier::new(config.notifications.duration()),
            messaging: MessagingClient::new(api),
            listeners: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn map(&self) -> &MapController<M> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapController<M> {
        &mut self.map
    }

    pub fn outbox(&self) -> &Outbox {
        self.messaging.outbox()
    }

    pub fn api(&self) -> &A {
        self.messaging.api()
    }

    fn listen(&mut self, node: NodeId, listener: Listener) {
        let entry = self.listeners.entry(node).or_default();
        if !entry.contains(&listener) {
            entry.push(listener);
        }
    }

    /// Page-ready hook: initializes the map when its mount exists and
    /// registers the form, file input and filter listeners.
    pub fn on_ready(&mut self) -> Result<()> {
        if self.document.get_element_by_id(MAP_ID).is_some() {
            self.map.init_map(self.map_center, self.map_zoom);
        }

        let forms = self.document.query_tag("form");
        for form in &forms {
            self.listen(*form, Listener::ValidateOnSubmit);
        }

        let file_input = self.document.query_tag("input").into_iter().find(|n| {
            self.document
                .element(*n)
                .map(|el| el.attribute("type") == Some("file"))
                .unwrap_or(false)
        });
        if let Some(input) = file_input {
            self.listen(input, Listener::PreviewOnChange);
        }

        let filter_inputs = self.document.query_class(FILTER_INPUT_CLASS);
        for input in &filter_inputs {
            self.listen(*input, Listener::FilterOnChange);
        }

        let stars = self.document.query_class(rating::STAR_CLASS);
        for star in &stars {
            self.listen(*star, Listener::RateOnClick);
        }

        tracing::info!(
            "Page ready: map={}, forms={}, file_input={}, filter_inputs={}, stars={}",
            self.map.is_initialized(),
            forms.len(),
            file_input.is_some(),
            filter_inputs.len(),
            stars.len()
        );
        Ok(())
    }

    pub async fn dispatch(&mut self, event: PageEvent) -> Result<EventOutcome> {
        let (node, wanted) = event.target();

        let listeners: Vec<Listener> = self
            .listeners
            .get(&node)
            .map(|ls| ls.iter().copied().filter(|l| wanted.contains(l)).collect())
            .unwrap_or_default();
        if listeners.is_empty() {
            return Ok(EventOutcome::Ignored);
        }

        let mut outcome = EventOutcome::Handled;
        for listener in listeners {
            match listener {
                Listener::ValidateOnSubmit => {
                    if !forms::validate_form_element(&mut self.document, node)? {
                        self.show_notification(REQUIRED_FIELDS_MESSAGE, Severity::Error)?;
                        outcome = EventOutcome::Blocked;
                    }
                }
                Listener::PreviewOnChange => {
                    media::preview_image(&mut self.document, node).await?;
                }
                Listener::FilterOnChange => {
                    let filter = self.current_filter()?;
                    job_filter::filter_jobs(&mut self.document, &filter)?;
                }
                Listener::RemoveRowOnClick => {
                    self.remove_service_field(node)?;
                }
                Listener::RateOnClick => {
                    let value = self.star_value(node)?;
                    rating::set_rating(&mut self.document, value)?;
                }
            }
        }
        Ok(outcome)
    }

    /// Reads the filter fields. The keyword field is optional.
    pub fn current_filter(&self) -> Result<JobFilter> {
        let value_of = |id: &str| -> Result<String> {
            let node = self.document.require_by_id(id)?;
            Ok(self.document.element(node)?.value().to_string())
        };
        let keyword = match self.document.get_element_by_id(KEYWORD_FILTER_ID) {
            Some(node) => self.document.element(node)?.value().to_string(),
            None => String::new(),
        };

        Ok(JobFilter::from_fields(
            &value_of(CATEGORY_FILTER_ID)?,
            &value_of(MIN_RATE_FILTER_ID)?,
            &value_of(MAX_DISTANCE_FILTER_ID)?,
            &keyword,
        ))
    }

    // ---- map ----

    pub fn init_map(&mut self, center: LatLng, zoom: u8) {
        self.map.init_map(center, zoom);
    }

    pub fn plot_jobs(&mut self, origin: Option<LatLng>, radius_km: Option<f64>) -> Result<usize> {
        job_filter::plot_jobs(&self.document, &mut self.map, origin, radius_km)
    }

    // ---- forms ----

    pub fn validate_form(&mut self, form_id: &str) -> Result<bool> {
        forms::validate_form(&mut self.document, form_id)
    }

    /// Adds a service row and wires its remove button.
    pub fn add_service_field(&mut self) -> Result<ServiceRow> {
        let row = self.services.add_service_field(&mut self.document)?;
        self.listen(row.remove_button, Listener::RemoveRowOnClick);
        Ok(row)
    }

    /// Detaches the row holding `control` and drops the listeners of every
    /// node inside it.
    pub fn remove_service_field(&mut self, control: NodeId) -> Result<()> {
        if let Some(row) = self.document.parent(control)? {
            self.listeners.remove(&row);
            for node in self.document.descendants(row)? {
                self.listeners.remove(&node);
            }
        }
        forms::remove_service_field(&mut self.document, control)
    }

    /// Whether `node` has a listener for `event`'s kind registered.
    pub fn has_listener(&self, event: PageEvent) -> bool {
        let (node, wanted) = event.target();
        self.listeners
            .get(&node)
            .is_some_and(|ls| ls.iter().any(|l| wanted.contains(l)))
    }

    // ---- media / rating ----

    pub async fn preview_image(&mut self, file_input: NodeId) -> Result<bool> {
        media::preview_image(&mut self.document, file_input).await
    }

    pub fn set_rating(&mut self, rating: i64) -> Result<()> {
        rating::set_rating(&mut self.document, rating)
    }

    /// `data-value` of a star, or its 1-based position when the attribute is
    /// missing or malformed.
    fn star_value(&self, star: NodeId) -> Result<i64> {
        let declared = self
            .document
            .element(star)?
            .dataset("value")
            .and_then(parse_int_prefix);
        Ok(match declared {
            Some(value) => value,
            None => {
                let position = self
                    .document
                    .query_class(rating::STAR_CLASS)
                    .iter()
                    .position(|n| *n == star)
                    .unwrap_or(0);
                position as i64 + 1
            }
        })
    }

    // ---- notifications ----

    pub fn show_notification(&mut self, message: &str, severity: Severity) -> Result<NodeId> {
        self.notifier.show(&mut self.document, message, severity)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        self.notifier.run_due(&mut self.document)
    }

    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.notifier.next_deadline()
    }

    /// Sleeps until the next notification deadline and fires it. Returns 0
    /// immediately when nothing is scheduled.
    pub async fn wait_for_next_timer(&mut self) -> Result<usize> {
        match self.notifier.next_deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.run_due_timers()
            }
            None => Ok(0),
        }
    }

    // ---- job cards ----

    pub fn filter_jobs(&mut self, filter: &JobFilter) -> Result<usize> {
        job_filter::filter_jobs(&mut self.document, filter)
    }

    pub fn annotate_job_distances(&mut self, origin: LatLng) -> Result<usize> {
        job_filter::annotate_job_distances(&mut self.document, origin)
    }

    pub fn sort_jobs(&mut self, order: JobSort) -> Result<()> {
        job_filter::sort_jobs(&mut self.document, order)
    }

    // ---- messaging ----

    pub async fn send_message(&mut self, recipient_id: RecipientId, message: &str) -> Result<bool> {
        self.messaging
            .send_message(&mut self.document, &mut self.notifier, recipient_id, message)
            .await
    }

    pub async fn update_availability(
        &mut self,
        date: NaiveDate,
        time_slot: &str,
        available: bool,
    ) -> Result<bool> {
        self.messaging
            .update_availability(
                &mut self.document,
                &mut self.notifier,
                date,
                time_slot,
                available,
            )
            .await
    }

    pub fn append_message(&mut self, text: &str, kind: MessageKind) -> Result<NodeId> {
        messaging::append_message(&mut self.document, text, kind)
    }
}
