//! Single-writer front door to the bracket: load, apply one operation, save, notify.
//!
//! Every mutation holds the writer lock from load to save, so two concurrent reports can never
//! both start from the same snapshot and silently overwrite each other.

use crate::logic::{self, ResultReport};
use crate::models::{
    BracketDocument, BracketError, BracketSettings, StoreError, TeamRef, TournamentFormat,
};
use crate::store::{BracketStore, ChangeNotifier};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::{Arc, Mutex};

pub struct BracketService {
    store: Box<dyn BracketStore>,
    notifier: Arc<dyn ChangeNotifier>,
    settings: BracketSettings,
    default_format: TournamentFormat,
    writer: Mutex<()>,
}

impl BracketService {
    pub fn new(
        store: Box<dyn BracketStore>,
        notifier: Arc<dyn ChangeNotifier>,
        settings: BracketSettings,
        default_format: TournamentFormat,
    ) -> Self {
        Self {
            store,
            notifier,
            settings,
            default_format,
            writer: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &BracketSettings {
        &self.settings
    }

    pub fn default_format(&self) -> TournamentFormat {
        self.default_format
    }

    /// Current document. An empty store is seeded with the template on first read.
    pub fn current(&self) -> Result<BracketDocument, BracketError> {
        if let Some(document) = self.store.load()? {
            return Ok(document);
        }
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(document) = self.store.load()? {
            return Ok(document);
        }
        let document = logic::new_bracket(self.default_format, &self.settings, Utc::now())?;
        self.store.save(&document)?;
        info!("Created empty {} bracket {}", self.default_format, document.tournament.id);
        Ok(document)
    }

    pub fn initialize(&self, teams: Vec<TeamRef>, format: TournamentFormat) -> Result<BracketDocument, BracketError> {
        let settings = self.settings.clone();
        self.mutate("initialize", |doc, now| logic::initialize(doc, teams, format, &settings, now))
    }

    pub fn report_result(&self, match_id: &str, report: &ResultReport) -> Result<BracketDocument, BracketError> {
        self.mutate("report result", |doc, now| logic::report_result(doc, match_id, report, now))
    }

    pub fn advance_stage(&self) -> Result<BracketDocument, BracketError> {
        self.mutate("advance stage", |doc, now| logic::advance_stage(doc, now))
    }

    pub fn reset(&self) -> Result<BracketDocument, BracketError> {
        let settings = self.settings.clone();
        self.mutate("reset", |doc, now| logic::reset(doc, &settings, now))
    }

    fn load_or_template(&self, now: DateTime<Utc>) -> Result<BracketDocument, BracketError> {
        match self.store.load()? {
            Some(document) => Ok(document),
            None => Ok(logic::new_bracket(self.default_format, &self.settings, now)?),
        }
    }

    fn mutate<F>(&self, action: &str, op: F) -> Result<BracketDocument, BracketError>
    where
        F: FnOnce(&mut BracketDocument, DateTime<Utc>) -> Result<(), BracketError>,
    {
        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        let now = Utc::now();
        let mut document = self.load_or_template(now)?;
        if let Err(e) = op(&mut document, now) {
            warn!("Rejected {}: {}", action, e);
            return Err(e);
        }
        self.store.save(&document)?;
        self.notifier.notify_changed(&document);
        info!(
            "{} ok, tournament {} is {}",
            action, document.tournament.id, document.tournament.status
        );
        Ok(document)
    }
}
