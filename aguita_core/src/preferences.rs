//! User preferences persisted in the shared container.
//!
//! Three scalars are kept under fixed keys (`dailyGoal`, `defaultUnitMode`,
//! `colorScheme`) so a separate read-only consumer can pick them up. The
//! goal is stored in the selected unit; the goal in cups is always derived.

use crate::container::{read_json_locked, write_json_atomic, SharedContainer};
use crate::signals::WidgetRefresh;
use crate::units::{self, goal_range, goal_step, round_to_step};
use crate::{ColorScheme, Result, UnitMode};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Goal used when none (or zero) is stored
pub const DEFAULT_DAILY_GOAL: f64 = 8.0;

mod keys {
    pub const DAILY_GOAL: &str = "dailyGoal";
    pub const UNIT: &str = "defaultUnitMode";
    pub const COLOR_SCHEME: &str = "colorScheme";
}

/// Plain preference values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preferences {
    /// Daily goal, expressed in `unit`
    pub daily_goal: f64,
    pub unit: UnitMode,
    pub color_scheme: ColorScheme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            unit: UnitMode::Cups,
            color_scheme: ColorScheme::Cyan,
        }
    }
}

impl Preferences {
    /// Daily goal in cups
    pub fn daily_goal_cups(&self) -> f64 {
        units::to_canonical(self.daily_goal, self.unit)
    }

    /// Read preferences from a file, falling back per key.
    ///
    /// A missing file, an unreadable file, a zero goal or an unknown enum
    /// value each fall back to the default for that key.
    pub fn read(path: &Path) -> Self {
        let map = match read_json_locked::<Map<String, Value>>(path) {
            Ok(Some(map)) => map,
            Ok(None) => {
                tracing::info!("No preferences found at {:?}, using defaults", path);
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read preferences {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Self::default();
            }
        };
        Self::from_keys(&map)
    }

    fn from_keys(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let daily_goal = map
            .get(keys::DAILY_GOAL)
            .and_then(Value::as_f64)
            .filter(|goal| *goal != 0.0 && goal.is_finite())
            .unwrap_or(defaults.daily_goal);

        let unit = map
            .get(keys::UNIT)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(defaults.unit);

        let color_scheme = map
            .get(keys::COLOR_SCHEME)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(defaults.color_scheme);

        Self {
            daily_goal,
            unit,
            color_scheme,
        }
    }

    fn to_keys(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::DAILY_GOAL.into(), Value::from(self.daily_goal));
        map.insert(keys::UNIT.into(), Value::from(self.unit.label()));
        map.insert(
            keys::COLOR_SCHEME.into(),
            Value::from(self.color_scheme.display_name()),
        );
        map
    }
}

/// Live, persisted preferences for one process.
///
/// Constructed once by the host and handed to the controller. Every
/// mutation is written through to the container; write failures are
/// logged and the in-memory values stay authoritative.
pub struct PreferencesState {
    prefs: Preferences,
    path: PathBuf,
    refresh: Rc<dyn WidgetRefresh>,
}

impl PreferencesState {
    /// Load preferences from the container
    pub fn load(container: &SharedContainer, refresh: Rc<dyn WidgetRefresh>) -> Self {
        let path = container.preferences_path();
        let prefs = Preferences::read(&path);
        tracing::debug!(
            "Preferences: goal {} {}, scheme {}",
            prefs.daily_goal,
            prefs.unit,
            prefs.color_scheme
        );
        Self {
            prefs,
            path,
            refresh,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    /// Daily goal in the selected unit
    pub fn daily_goal(&self) -> f64 {
        self.prefs.daily_goal
    }

    pub fn unit(&self) -> UnitMode {
        self.prefs.unit
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.prefs.color_scheme
    }

    /// Daily goal in cups, derived from the current goal and unit
    pub fn daily_goal_cups(&self) -> f64 {
        self.prefs.daily_goal_cups()
    }

    /// Set the goal in the selected unit.
    ///
    /// Non-positive or non-finite goals are ignored.
    pub fn set_daily_goal(&mut self, goal: f64) {
        if !goal.is_finite() || goal <= 0.0 {
            tracing::warn!("Ignoring invalid daily goal {}", goal);
            return;
        }
        self.prefs.daily_goal = goal;
        self.persist();
        self.refresh.reload_all_timelines();
    }

    /// Raise the goal by one stepper step, within the unit's range
    pub fn step_goal_up(&mut self) {
        let step = goal_step(self.prefs.unit);
        self.set_stepped_goal(self.prefs.daily_goal + step);
    }

    /// Lower the goal by one stepper step, within the unit's range
    pub fn step_goal_down(&mut self) {
        let step = goal_step(self.prefs.unit);
        self.set_stepped_goal(self.prefs.daily_goal - step);
    }

    fn set_stepped_goal(&mut self, goal: f64) {
        let (lo, hi) = goal_range(self.prefs.unit);
        self.set_daily_goal(goal.clamp(lo, hi));
    }

    /// Switch the display unit, rescaling the goal.
    ///
    /// The goal is converted through cups first and only then rounded to
    /// the new unit's stepper granularity, so repeated switching stays
    /// within one step of the original.
    pub fn set_unit(&mut self, unit: UnitMode) {
        let old_unit = self.prefs.unit;
        if old_unit == unit {
            return;
        }

        let canonical = units::to_canonical(self.prefs.daily_goal, old_unit);
        let converted = units::from_canonical(canonical, unit);
        let rescaled = round_to_step(converted, goal_step(unit));

        tracing::info!(
            "Unit changed {} -> {}: goal {} -> {}",
            old_unit,
            unit,
            self.prefs.daily_goal,
            rescaled
        );

        self.prefs.unit = unit;
        if rescaled > 0.0 {
            self.prefs.daily_goal = rescaled;
        } else {
            // Rounded away entirely; keep the smallest non-zero step
            self.prefs.daily_goal = goal_step(unit);
        }
        self.persist();
        self.refresh.reload_all_timelines();
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.prefs.color_scheme = scheme;
        self.persist();
    }

    /// Write the current values, reporting failure to the caller.
    ///
    /// Hosts call this on teardown; regular mutations go through the
    /// swallowing path.
    pub fn flush(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.prefs.to_keys())
    }

    fn persist(&self) {
        match self.flush() {
            Ok(()) => tracing::debug!("Saved preferences to {:?}", self.path),
            Err(e) => tracing::warn!("Failed to save preferences {:?}: {}", self.path, e),
        }
    }
}
