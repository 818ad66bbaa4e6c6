//! Deduction rates
//!
//! The process-wide table of statutory deductions applied during payroll.
//! Each entry declares its own base: the whole gross pay, or gross pay capped
//! at a ceiling. Entries are parsed one by one on load, so a malformed entry
//! is kept aside, reported and skipped instead of rejecting the whole table.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Money;

/// Entry names every table is expected to carry
pub const REQUIRED_RATES: [&str; 2] = ["health", "pension"];

/// Default employee health contribution (percent of gross)
pub const DEFAULT_HEALTH_PERCENT: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Default employee pension contribution (percent of gross)
pub const DEFAULT_PENSION_PERCENT: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// How an entry's value is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateKind {
    /// `value` is a percentage (0..=100) of the base
    Percentage,
    /// `value` is a flat amount per payroll run
    Fixed,
}

/// Portion of gross pay an entry applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RateBase {
    #[default]
    Gross,
    Capped { cap: Decimal },
}

/// One named deduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub name: String,
    pub kind: RateKind,
    pub value: Decimal,
    #[serde(default)]
    pub base: RateBase,
}

impl RateEntry {
    pub fn percentage(name: impl Into<String>, percent: Decimal) -> Self {
        Self {
            name: name.into(),
            kind: RateKind::Percentage,
            value: percent,
            base: RateBase::Gross,
        }
    }

    pub fn fixed(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            kind: RateKind::Fixed,
            value: amount,
            base: RateBase::Gross,
        }
    }

    pub fn capped_at(mut self, cap: Decimal) -> Self {
        self.base = RateBase::Capped { cap };
        self
    }

    /// Check the entry can be applied. Returns the reason when it cannot.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("entry has no name".to_string());
        }

        match self.kind {
            RateKind::Percentage => {
                if self.value < Decimal::ZERO || self.value > Decimal::ONE_HUNDRED {
                    return Err(format!("percentage {} outside 0..=100", self.value));
                }
            }
            RateKind::Fixed => {
                Money::rounded(self.value)
                    .map_err(|e| format!("fixed amount {}: {}", self.value, e))?;
            }
        }

        if let RateBase::Capped { cap } = self.base {
            Money::rounded(cap).map_err(|e| format!("cap {}: {}", cap, e))?;
        }

        Ok(())
    }
}

/// A stored entry that does not parse as a `RateEntry`.
///
/// The raw value is written back unchanged on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableRate {
    /// Stored `name`, or empty when there is none
    pub name: String,
    pub reason: String,
    pub raw: serde_json::Value,
}

impl UnreadableRate {
    fn from_raw(raw: serde_json::Value, error: serde_json::Error) -> Self {
        let name = raw
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            name,
            reason: error.to_string(),
            raw,
        }
    }
}

/// The configured deduction table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionRates {
    pub entries: Vec<RateEntry>,
    /// Stored entries that failed to parse
    pub unreadable: Vec<UnreadableRate>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredEntry<'a> {
    Parsed(&'a RateEntry),
    Unreadable(&'a serde_json::Value),
}

#[derive(Serialize)]
struct StoredRatesRef<'a> {
    entries: Vec<StoredEntry<'a>>,
}

#[derive(Deserialize)]
struct StoredRates {
    entries: Vec<serde_json::Value>,
}

impl Serialize for DeductionRates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self
            .entries
            .iter()
            .map(StoredEntry::Parsed)
            .chain(self.unreadable.iter().map(|u| StoredEntry::Unreadable(&u.raw)))
            .collect();
        StoredRatesRef { entries }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeductionRates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredRates::deserialize(deserializer)?;
        Ok(Self::from_raw_entries(stored.entries))
    }
}

impl Default for DeductionRates {
    /// Health 4 % and pension 4 %, both on the whole gross
    fn default() -> Self {
        Self {
            entries: vec![
                RateEntry::percentage("health", DEFAULT_HEALTH_PERCENT),
                RateEntry::percentage("pension", DEFAULT_PENSION_PERCENT),
            ],
            unreadable: Vec::new(),
        }
    }
}

impl DeductionRates {
    /// An empty table (every required rate missing)
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// Parse each stored entry on its own
    fn from_raw_entries(raw_entries: Vec<serde_json::Value>) -> Self {
        let mut rates = Self::empty();
        for raw in raw_entries {
            match serde_json::from_value::<RateEntry>(raw.clone()) {
                Ok(entry) => rates.entries.push(entry),
                Err(e) => {
                    let unreadable = UnreadableRate::from_raw(raw, e);
                    tracing::warn!(
                        rate = %unreadable.name,
                        reason = %unreadable.reason,
                        "Stored deduction rate does not parse"
                    );
                    rates.unreadable.push(unreadable);
                }
            }
        }
        rates
    }

    pub fn get(&self, name: &str) -> Option<&RateEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Insert or replace the entry with the same name
    pub fn set(&mut self, entry: RateEntry) {
        self.unreadable.retain(|u| u.name != entry.name);
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn with(mut self, entry: RateEntry) -> Self {
        self.set(entry);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<RateEntry> {
        self.unreadable.retain(|u| u.name != name);
        let idx = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(idx))
    }

    /// Required entry names absent from the table
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_RATES
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none())
            .filter(|name| !self.unreadable.iter().any(|u| u.name == *name))
            .collect()
    }
}
