use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::confirmation::{self, AssignmentDraft};
use crate::error::{ConsoleError, RecommendationError};
use crate::fleet::FleetRegistry;
use crate::models::assignment::{ConfirmedAssignment, InternalId};
use crate::models::fleet::{Driver, Truck};
use crate::models::trip::{MatchRecommendation, RecommendationResponse, TripAnalysis, TripRequest};

/// Message shown for every failed recommendation call, whatever the cause.
pub const SEARCH_ERROR_MESSAGE: &str =
    "Hubo un error al comunicarse con la IA. Por favor verifica tu API Key.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Screen {
    Search,
    Assignment,
    Success,
    History,
}

impl Screen {
    fn name(self) -> &'static str {
        match self {
            Screen::Search => "search",
            Screen::Assignment => "assignment",
            Screen::Success => "success",
            Screen::History => "history",
        }
    }
}

/// Issued per submitted search; only the latest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    pub sequence: u64,
}

/// Issued per confirmation; only the latest one may reset the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchFailure {
    pub message: &'static str,
    pub kind: &'static str,
}

/// A recommendation whose truck and driver both resolve, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOption {
    pub index: usize,
    pub best_match: bool,
    pub capacity_shortage: bool,
    pub recommendation: MatchRecommendation,
    pub truck: Truck,
    pub driver: Driver,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleView {
    pub id: Uuid,
    pub screen: Screen,
    pub loading: bool,
    pub request: Option<TripRequest>,
    pub analysis: Option<TripAnalysis>,
    pub recommendations: Vec<MatchRecommendation>,
    pub options: Vec<MatchOption>,
    pub dropped_options: usize,
    pub draft: Option<AssignmentDraft>,
    pub error: Option<SearchFailure>,
    pub history_len: usize,
    pub created_at: DateTime<Utc>,
}

/// View state of one operator console.
#[derive(Debug, Clone)]
pub struct Console {
    id: Uuid,
    screen: Screen,
    loading: bool,
    request: Option<TripRequest>,
    analysis: Option<TripAnalysis>,
    recommendations: Vec<MatchRecommendation>,
    draft: Option<AssignmentDraft>,
    error: Option<SearchFailure>,
    history: Vec<ConfirmedAssignment>,
    latest_search: u64,
    latest_confirmation: u64,
    created_at: DateTime<Utc>,
}

impl Console {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            screen: Screen::Search,
            loading: false,
            request: None,
            analysis: None,
            recommendations: Vec::new(),
            draft: None,
            error: None,
            history: Vec::new(),
            latest_search: 0,
            latest_confirmation: 0,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn request(&self) -> Option<&TripRequest> {
        self.request.as_ref()
    }

    pub fn analysis(&self) -> Option<&TripAnalysis> {
        self.analysis.as_ref()
    }

    pub fn recommendations(&self) -> &[MatchRecommendation] {
        &self.recommendations
    }

    pub fn draft(&self) -> Option<&AssignmentDraft> {
        self.draft.as_ref()
    }

    pub fn error(&self) -> Option<&SearchFailure> {
        self.error.as_ref()
    }

    /// Most recent first.
    pub fn history(&self) -> &[ConfirmedAssignment] {
        &self.history
    }

    pub fn begin_search(&mut self, request: TripRequest) -> Result<SearchTicket, ConsoleError> {
        self.require(Screen::Search, "search")?;

        self.latest_search += 1;
        self.loading = true;
        self.error = None;
        self.analysis = None;
        self.recommendations.clear();
        self.draft = None;
        self.request = Some(request);

        Ok(SearchTicket {
            sequence: self.latest_search,
        })
    }

    /// Lands a search result unless a newer search was issued after it.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<RecommendationResponse, RecommendationError>,
    ) -> SearchOutcome {
        if ticket.sequence != self.latest_search {
            return SearchOutcome::Stale;
        }

        match result {
            Ok(response) => {
                self.analysis = Some(response.analysis);
                self.recommendations = response.recommendations;
                self.error = None;
            }
            Err(err) => {
                self.analysis = None;
                self.recommendations.clear();
                self.error = Some(SearchFailure {
                    message: SEARCH_ERROR_MESSAGE,
                    kind: err.kind(),
                });
            }
        }
        self.loading = false;

        SearchOutcome::Applied
    }

    pub fn select(
        &mut self,
        index: usize,
        internal_id: InternalId,
    ) -> Result<&AssignmentDraft, ConsoleError> {
        self.require(Screen::Search, "select")?;

        if self.request.is_none() || self.recommendations.is_empty() {
            return Err(ConsoleError::NothingToSelect);
        }
        let recommendation = self
            .recommendations
            .get(index)
            .cloned()
            .ok_or(ConsoleError::UnknownOption(index))?;

        self.screen = Screen::Assignment;
        Ok(&*self.draft.insert(AssignmentDraft {
            internal_id,
            recommendation,
        }))
    }

    pub fn back(&mut self) -> Result<(), ConsoleError> {
        match self.screen {
            Screen::Assignment | Screen::History | Screen::Search => {
                self.draft = None;
                self.screen = Screen::Search;
                Ok(())
            }
            Screen::Success => Err(self.wrong_screen("back")),
        }
    }

    pub fn confirm(
        &mut self,
        customer_transport_id: &str,
        registry: &FleetRegistry,
        date: NaiveDate,
    ) -> Result<(ConfirmedAssignment, ResetToken), ConsoleError> {
        self.require(Screen::Assignment, "confirm")?;

        if customer_transport_id.trim().is_empty() {
            return Err(ConsoleError::MissingTransportId);
        }
        let (Some(draft), Some(request)) = (self.draft.as_ref(), self.request.as_ref()) else {
            return Err(ConsoleError::NothingToSelect);
        };

        let record = confirmation::confirm(draft, request, customer_transport_id, registry, date);
        self.history.insert(0, record.clone());
        self.screen = Screen::Success;
        self.latest_confirmation += 1;

        Ok((record, ResetToken(self.latest_confirmation)))
    }

    /// Clears the finished flow and returns to search. Ignored if another
    /// confirmation happened since `token` was issued.
    pub fn reset_after_success(&mut self, token: ResetToken) -> bool {
        if token.0 != self.latest_confirmation {
            return false;
        }

        // a search submitted while the timer was pending belongs to the
        // cleared flow and must not land
        self.latest_search += 1;
        self.loading = false;
        self.error = None;
        self.request = None;
        self.analysis = None;
        self.recommendations.clear();
        self.draft = None;
        self.screen = Screen::Search;
        true
    }

    pub fn view_history(&mut self) -> &[ConfirmedAssignment] {
        self.screen = Screen::History;
        &self.history
    }

    pub fn view(&self, registry: &FleetRegistry) -> ConsoleView {
        let options = self
            .request
            .as_ref()
            .map(|request| display_options(&self.recommendations, request, registry))
            .unwrap_or_default();
        let dropped_options = self.recommendations.len() - options.len();

        ConsoleView {
            id: self.id,
            screen: self.screen,
            loading: self.loading,
            request: self.request.clone(),
            analysis: self.analysis.clone(),
            recommendations: self.recommendations.clone(),
            options,
            dropped_options,
            draft: self.draft.clone(),
            error: self.error.clone(),
            history_len: self.history.len(),
            created_at: self.created_at,
        }
    }

    fn require(&self, screen: Screen, action: &'static str) -> Result<(), ConsoleError> {
        if self.screen == screen {
            Ok(())
        } else {
            Err(self.wrong_screen(action))
        }
    }

    fn wrong_screen(&self, action: &'static str) -> ConsoleError {
        ConsoleError::WrongScreen {
            action,
            screen: self.screen.name(),
        }
    }
}

/// Recommendations in response order, minus the ones whose truck or driver
/// is not in the registry.
pub fn display_options(
    recommendations: &[MatchRecommendation],
    request: &TripRequest,
    registry: &FleetRegistry,
) -> Vec<MatchOption> {
    recommendations
        .iter()
        .enumerate()
        .filter_map(|(index, recommendation)| {
            let (truck, driver) = registry.resolve(recommendation)?;
            Some(MatchOption {
                index,
                best_match: index == 0,
                capacity_shortage: truck.capacity_tons < request.weight_tons,
                recommendation: recommendation.clone(),
                truck: truck.clone(),
                driver: driver.clone(),
            })
        })
        .collect()
}
