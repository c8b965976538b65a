use crate::domain::{
    errors::AppError,
    logging::{LogComponent, get_logger},
    market_data::{FinancialDataEntry, FinancialSeries, Symbol},
};

/// Receipt for one outstanding fetch. Only the latest ticket can be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    key: Symbol,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &Symbol {
        &self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    /// Fetch in flight with nothing to show yet
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Applied,
    Superseded,
}

/// Keyed fetch state for the settled symbol.
///
/// Keeps the last applied series visible while a new key loads, never issues
/// a second request for a key that is already current, and drops responses
/// whose ticket is no longer the latest.
#[derive(Debug, Default)]
pub struct FinancialDataQuery {
    key: Option<Symbol>,
    in_flight: Option<FetchTicket>,
    data: Option<FinancialSeries>,
    error: Option<AppError>,
    next_id: u64,
}

impl FinancialDataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&Symbol> {
        self.key.as_ref()
    }

    /// Switch to `key`; returns a ticket when a fetch has to be issued.
    pub fn set_key(&mut self, key: Symbol) -> Option<FetchTicket> {
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        self.key = Some(key.clone());
        self.error = None;
        Some(self.issue(key))
    }

    /// Fetch the current key again unless a fetch for it is outstanding.
    pub fn refetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let key = self.key.clone()?;
        Some(self.issue(key))
    }

    fn issue(&mut self, key: Symbol) -> FetchTicket {
        self.next_id += 1;
        let ticket = FetchTicket { id: self.next_id, key };
        if let Some(previous) = self.in_flight.replace(ticket.clone()) {
            get_logger().debug(
                LogComponent::Application("Query"),
                &format!("Request #{} for {} superseded by #{}", previous.id, previous.key, ticket.id),
            );
        }
        ticket
    }

    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<FinancialDataEntry>, AppError>,
    ) -> ResolveOutcome {
        if self.in_flight.as_ref() != Some(ticket) {
            return ResolveOutcome::Superseded;
        }
        self.in_flight = None;
        match result {
            Ok(entries) => {
                self.data = Some(FinancialSeries::new(ticket.key.clone(), entries, ticket.id));
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
        ResolveOutcome::Applied
    }

    pub fn status(&self) -> QueryStatus {
        match (&self.in_flight, &self.data, &self.error) {
            (Some(_), None, _) => QueryStatus::Loading,
            (None, _, Some(_)) => QueryStatus::Error,
            (_, Some(_), _) => QueryStatus::Success,
            (None, None, None) => QueryStatus::Idle,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn data(&self) -> Option<&FinancialSeries> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }
}
