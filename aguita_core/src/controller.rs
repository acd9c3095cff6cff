//! Today's intake: record lifecycle, day rollover and mutations.
//!
//! The controller owns the current day's record and the injected
//! preferences. Every mutation updates the in-memory record first, then
//! attempts to persist it and signals the widget. Persistence failures are
//! logged and otherwise ignored; the in-memory value is what the user sees.

use crate::container::SharedContainer;
use crate::preferences::PreferencesState;
use crate::signals::{Clock, HapticSink, SystemClock, WidgetRefresh};
use crate::store::{JsonRecordStore, RecordStore};
use crate::{Haptic, IntakeRecord, Result, UnitMode};
use chrono::{DateTime, Duration, Local};
use std::rc::Rc;

/// Orchestrates the record store and preferences for the current day
pub struct IntakeController<S: RecordStore> {
    store: S,
    preferences: PreferencesState,
    clock: Box<dyn Clock>,
    refresh: Rc<dyn WidgetRefresh>,
    haptics: Box<dyn HapticSink>,
    today: IntakeRecord,
}

impl<S: RecordStore> IntakeController<S> {
    /// Build the controller and establish today's record
    pub fn new(
        mut store: S,
        preferences: PreferencesState,
        clock: Box<dyn Clock>,
        refresh: Rc<dyn WidgetRefresh>,
        haptics: Box<dyn HapticSink>,
    ) -> Self {
        let today = load_or_create_today(&mut store, clock.now());
        Self {
            store,
            preferences,
            clock,
            refresh,
            haptics,
            today,
        }
    }

    /// Adopt the record for the current day, creating it if missing
    pub fn ensure_today(&mut self) {
        self.today = load_or_create_today(&mut self.store, self.clock.now());
    }

    /// Switch to a new record if the calendar day changed.
    ///
    /// Hosts call this when they become active; nothing here polls.
    /// Returns whether a rollover happened.
    pub fn check_for_rollover(&mut self) -> bool {
        let current_day = self.clock.now().date_naive();
        if self.today.normalized_date() == current_day {
            return false;
        }

        tracing::info!(
            "Day changed from {} to {}, rolling over",
            self.today.normalized_date(),
            current_day
        );
        self.ensure_today();
        true
    }

    /// Add to today's intake (in cups)
    pub fn add(&mut self, cups: f64) {
        if !cups.is_finite() {
            tracing::warn!("Ignoring non-finite amount {}", cups);
            return;
        }

        let before = self.progress();
        self.haptics.emit(Haptic::MediumTap);
        self.apply(self.today.amount_cups() + cups);

        if before < 1.0 && self.progress() >= 1.0 {
            tracing::info!("Daily goal reached");
            self.haptics.emit(Haptic::Success);
        }
    }

    /// Remove from today's intake (in cups), never going below zero
    pub fn remove(&mut self, cups: f64) {
        if !cups.is_finite() {
            tracing::warn!("Ignoring non-finite amount {}", cups);
            return;
        }

        self.haptics.emit(Haptic::LightTap);
        self.apply(self.today.amount_cups() - cups);
    }

    /// Set today's intake back to zero
    pub fn reset(&mut self) {
        self.haptics.emit(Haptic::Warning);
        self.apply(0.0);
    }

    /// Replace today's intake with an absolute amount (in cups)
    pub fn set_amount(&mut self, cups: f64) {
        if !cups.is_finite() {
            tracing::warn!("Ignoring non-finite amount {}", cups);
            return;
        }
        self.apply(cups);
    }

    /// Fraction of the goal reached, capped at 1.0
    pub fn progress(&self) -> f64 {
        progress_ratio(self.today.amount_cups(), self.preferences.daily_goal_cups())
    }

    /// Records from the last `days` days, newest first
    pub fn history(&self, days: i64) -> Vec<IntakeRecord> {
        let since = self.clock.now() - Duration::days(days);
        match self.store.query(since) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to fetch history: {}", e);
                Vec::new()
            }
        }
    }

    /// Hand a feedback event to the haptics sink
    pub fn signal(&mut self, haptic: Haptic) {
        self.haptics.emit(haptic);
    }

    pub(crate) fn prepare_haptics(&mut self) {
        self.haptics.prepare();
    }

    pub fn today(&self) -> &IntakeRecord {
        &self.today
    }

    pub fn amount_cups(&self) -> f64 {
        self.today.amount_cups()
    }

    pub fn unit(&self) -> UnitMode {
        self.preferences.unit()
    }

    pub fn daily_goal_cups(&self) -> f64 {
        self.preferences.daily_goal_cups()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn preferences(&self) -> &PreferencesState {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut PreferencesState {
        &mut self.preferences
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn apply(&mut self, cups: f64) {
        self.today.set_amount_cups(cups);
        tracing::debug!("Today's intake now {} cups", self.today.amount_cups());
        self.persist();
    }

    fn persist(&mut self) {
        let saved = self
            .store
            .update(&self.today)
            .and_then(|()| self.store.save());
        if let Err(e) = saved {
            tracing::warn!("Failed to save today's record: {}", e);
        }
        self.refresh.reload_all_timelines();
    }
}

impl IntakeController<JsonRecordStore> {
    /// Wire up a controller against a shared container.
    ///
    /// Preferences and records come from the container; the widget refresh
    /// signal stamps the container's reload marker.
    pub fn open(container: &SharedContainer, haptics: Box<dyn HapticSink>) -> Result<Self> {
        let refresh: Rc<dyn WidgetRefresh> = Rc::new(container.refresh_signal());
        let preferences = PreferencesState::load(container, refresh.clone());
        let store = JsonRecordStore::open(container.records_path())?;
        Ok(Self::new(
            store,
            preferences,
            Box::new(SystemClock),
            refresh,
            haptics,
        ))
    }
}

/// `amount / goal` capped at 1.0, or 0 when there is no goal
pub fn progress_ratio(amount: f64, goal: f64) -> f64 {
    if goal <= 0.0 || !goal.is_finite() {
        return 0.0;
    }
    (amount / goal).min(1.0)
}

fn load_or_create_today<S: RecordStore>(store: &mut S, now: DateTime<Local>) -> IntakeRecord {
    let day = now.date_naive();

    match store.find_record(day) {
        Ok(Some(record)) => {
            tracing::debug!("Using existing record for {}", day);
            return record;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to look up record for {}: {}", day, e);
        }
    }

    let record = IntakeRecord::new(now);
    if let Err(e) = store.insert(record.clone()) {
        tracing::warn!("Failed to insert record for {}: {}", day, e);
    } else if let Err(e) = store.save() {
        tracing::warn!("Failed to save new record for {}: {}", day, e);
    }
    tracing::info!("Started a new record for {}", day);
    record
}
