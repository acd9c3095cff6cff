//! Core domain types for the Aguita hydration tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Display units and color schemes
//! - The per-day intake record
//! - Haptic feedback events

use crate::Error;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Units
// ============================================================================

/// Unit an amount or goal is displayed in.
///
/// Stored amounts are always in cups; this only affects presentation and
/// the step sizes used when entering values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum UnitMode {
    #[default]
    #[serde(rename = "cups")]
    Cups,
    #[serde(rename = "oz")]
    Oz,
    #[serde(rename = "mL")]
    Ml,
}

impl UnitMode {
    pub const ALL: [UnitMode; 3] = [UnitMode::Cups, UnitMode::Oz, UnitMode::Ml];

    /// Short lowercase label used next to amounts ("cups", "oz", "mL")
    pub fn label(self) -> &'static str {
        match self {
            UnitMode::Cups => "cups",
            UnitMode::Oz => "oz",
            UnitMode::Ml => "mL",
        }
    }

    /// Title-case name used in pickers ("Cups", "Oz", "mL")
    pub fn display_name(self) -> &'static str {
        match self {
            UnitMode::Cups => "Cups",
            UnitMode::Oz => "Oz",
            UnitMode::Ml => "mL",
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cups" | "cup" | "c" => Ok(UnitMode::Cups),
            "oz" | "ounce" | "ounces" | "floz" | "fl_oz" => Ok(UnitMode::Oz),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Ok(UnitMode::Ml),
            other => Err(Error::Other(format!(
                "unknown unit '{}' (expected cups, oz or ml)",
                other
            ))),
        }
    }
}

// ============================================================================
// Color schemes
// ============================================================================

/// Accent palette chosen by the user. Only persisted here; rendering
/// belongs to the presentation layer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    #[serde(rename = "Cyan & Blue")]
    Cyan,
    #[serde(rename = "Purple & Pink")]
    Purple,
    #[serde(rename = "Green & Teal")]
    Green,
    #[serde(rename = "Orange & Red")]
    Orange,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 4] = [
        ColorScheme::Cyan,
        ColorScheme::Purple,
        ColorScheme::Green,
        ColorScheme::Orange,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ColorScheme::Cyan => "Cyan & Blue",
            ColorScheme::Purple => "Purple & Pink",
            ColorScheme::Green => "Green & Teal",
            ColorScheme::Orange => "Orange & Red",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| {
                let name = scheme.display_name().to_lowercase();
                name == wanted || name.split(' ').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| Error::Other(format!("unknown color scheme '{}'", s.trim())))
    }
}

// ============================================================================
// Intake record
// ============================================================================

/// One day's accumulated intake.
///
/// The record's identity is its normalized date: the local calendar day
/// it was created on. `amount_cups` never goes below zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntakeRecord {
    id: Uuid,
    date: DateTime<Local>,
    amount_cups: f64,
}

impl IntakeRecord {
    /// Create an empty record stamped with `date`
    pub fn new(date: DateTime<Local>) -> Self {
        Self::with_amount(date, 0.0)
    }

    /// Create a record with an initial amount (floored at zero)
    pub fn with_amount(date: DateTime<Local>, amount_cups: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount_cups: floor_amount(amount_cups),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Creation timestamp
    pub fn date(&self) -> DateTime<Local> {
        self.date
    }

    /// Calendar day this record belongs to
    pub fn normalized_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn amount_cups(&self) -> f64 {
        self.amount_cups
    }

    pub(crate) fn set_amount_cups(&mut self, cups: f64) {
        self.amount_cups = floor_amount(cups);
    }
}

fn floor_amount(cups: f64) -> f64 {
    if cups.is_finite() {
        cups.max(0.0)
    } else {
        0.0
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Discrete feedback signals handed to the haptics collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Haptic {
    /// Amount removed
    LightTap,
    /// Amount added
    MediumTap,
    /// Dial snapped to a new increment during a drag
    SnapTick,
    /// Daily goal reached
    Success,
    /// Today's amount was reset
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unit_parsing() {
        assert_eq!("cups".parse::<UnitMode>().unwrap(), UnitMode::Cups);
        assert_eq!("OZ".parse::<UnitMode>().unwrap(), UnitMode::Oz);
        assert_eq!("mL".parse::<UnitMode>().unwrap(), UnitMode::Ml);
        assert!("gallons".parse::<UnitMode>().is_err());
    }

    #[test]
    fn test_unit_serde_uses_raw_names() {
        assert_eq!(serde_json::to_string(&UnitMode::Ml).unwrap(), "\"mL\"");
        let parsed: UnitMode = serde_json::from_str("\"oz\"").unwrap();
        assert_eq!(parsed, UnitMode::Oz);
    }

    #[test]
    fn test_color_scheme_parsing() {
        assert_eq!("purple".parse::<ColorScheme>().unwrap(), ColorScheme::Purple);
        assert_eq!(
            "Green & Teal".parse::<ColorScheme>().unwrap(),
            ColorScheme::Green
        );
        assert!("magenta".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn test_record_amount_never_negative() {
        let date = Local.with_ymd_and_hms(2025, 11, 15, 9, 30, 0).unwrap();
        let mut record = IntakeRecord::with_amount(date, -3.0);
        assert_eq!(record.amount_cups(), 0.0);

        record.set_amount_cups(2.5);
        assert_eq!(record.amount_cups(), 2.5);

        record.set_amount_cups(f64::NAN);
        assert_eq!(record.amount_cups(), 0.0);
    }

    #[test]
    fn test_normalized_date_is_calendar_day() {
        let date = Local.with_ymd_and_hms(2025, 11, 15, 21, 45, 0).unwrap();
        let record = IntakeRecord::new(date);
        assert_eq!(
            record.normalized_date(),
            NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
        );
    }
}
