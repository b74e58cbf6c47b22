//! Discovered lead (company profile) types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive numeric band such as an employee count or a revenue range in USD.
///
/// A single value is a band with `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

static RANGE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*([kmb])?").expect("static range pattern is valid")
});

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.check("range")?;
        Ok(range)
    }

    /// Validate bounds that arrived without going through [`NumericRange::new`],
    /// e.g. deserialized or built as a literal. `field` names the owner in the error.
    pub fn check(&self, field: &str) -> Result<()> {
        let (min, max) = (self.min, self.max);
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::invalid_input(field, "bounds must be finite"));
        }
        if min < 0.0 {
            return Err(Error::invalid_input(field, format!("negative lower bound {}", min)));
        }
        if min > max {
            return Err(Error::invalid_input(
                field,
                format!("lower bound {} exceeds upper bound {}", min, max),
            ));
        }
        Ok(())
    }

    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }

    /// Parse free-form bands: `"50-200"`, `"$5M-$20M"`, `"10K to 100K"`, `"125"`.
    ///
    /// A single number (including `"1000+"`) parses as a point.
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned = text.replace(',', "");
        let values: Vec<f64> = RANGE_NUMBER
            .captures_iter(&cleaned)
            .filter_map(|caps| {
                let base: f64 = caps.get(1)?.as_str().parse().ok()?;
                let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
                    Some(ref s) if s == "k" => 1_000.0,
                    Some(ref s) if s == "m" => 1_000_000.0,
                    Some(ref s) if s == "b" => 1_000_000_000.0,
                    _ => 1.0,
                };
                Some(base * multiplier)
            })
            .take(2)
            .collect();

        match values.as_slice() {
            [single] => Some(Self::point(*single)),
            [a, b] => Self::new(a.min(*b), a.max(*b)).ok(),
            _ => None,
        }
    }

    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance from `value` to the nearest edge of the band (0 inside)
    pub fn distance_to(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    /// Fraction of `self` that fits `target`, in [0, 1].
    ///
    /// Bands score by the share of their width inside the target. Points
    /// inside the target score 1; points outside decay linearly with their
    /// distance, reaching 0 at `tolerance × target midpoint`.
    pub fn overlap_fraction(&self, target: &NumericRange, tolerance: f64) -> f64 {
        if self.is_point() {
            return if target.contains(self.min) {
                1.0
            } else {
                Self::proximity(target.distance_to(self.min), target, tolerance)
            };
        }

        if target.is_point() {
            return if self.contains(target.min) {
                1.0
            } else {
                Self::proximity(self.distance_to(target.min), target, tolerance)
            };
        }

        let lo = self.min.max(target.min);
        let hi = self.max.min(target.max);
        ((hi - lo).max(0.0) / self.span()).clamp(0.0, 1.0)
    }

    fn proximity(distance: f64, target: &NumericRange, tolerance: f64) -> f64 {
        let reach = target.midpoint() * tolerance;
        if reach <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / reach).clamp(0.0, 1.0)
    }
}

/// Decision-maker contact at a lead company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Profile fields counted by the data-quality score, in report order
pub const REQUIRED_PROFILE_FIELDS: [&str; 8] = [
    "company_name",
    "website",
    "industry",
    "employees",
    "revenue",
    "location",
    "decision_maker",
    "contact_email",
];

/// Lead / company profile as delivered by the discovery collaborator.
///
/// Treated as immutable once discovered; only `refresh_signals` changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompanyProfile {
    pub company_name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Employee-count band
    #[serde(default)]
    pub employees: Option<NumericRange>,
    /// Annual revenue band (USD)
    #[serde(default)]
    pub revenue: Option<NumericRange>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Decision makers; the first one is the principal contact
    #[serde(default)]
    pub contacts: Vec<Contact>,
    /// Recency signals (funding, hiring, launches)
    #[serde(default)]
    pub signals: Vec<String>,
}

impl CompanyProfile {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Default::default()
        }
    }

    /// Structural validation: industry and size band are the minimum
    pub fn validate(&self) -> Result<()> {
        if !has_text(&self.industry) {
            return Err(Error::invalid_input("lead.industry", "industry is required"));
        }
        match &self.employees {
            Some(band) => band.check("lead.employees")?,
            None => return Err(Error::invalid_input("lead.employees", "size band is required")),
        }
        if let Some(revenue) = &self.revenue {
            revenue.check("lead.revenue")?;
        }
        Ok(())
    }

    pub fn principal_contact(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    /// Presence of each field in [`REQUIRED_PROFILE_FIELDS`], same order
    pub fn field_presence(&self) -> [bool; 8] {
        [
            !self.company_name.trim().is_empty(),
            has_text(&self.website),
            has_text(&self.industry),
            self.employees.is_some(),
            self.revenue.is_some(),
            has_text(&self.location),
            self.contacts.iter().any(|c| !c.title.trim().is_empty()),
            self.contacts.iter().any(|c| has_text(&c.email)),
        ]
    }

    /// Data-completeness indicator in [0, 1]
    pub fn completeness(&self) -> f64 {
        let presence = self.field_presence();
        let present = presence.iter().filter(|p| **p).count();
        present as f64 / presence.len() as f64
    }

    /// Names of required fields that are missing or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_PROFILE_FIELDS
            .iter()
            .zip(self.field_presence())
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Replace recency signals with a fresh observation
    pub fn refresh_signals(&mut self, signals: Vec<String>) {
        self.signals = signals;
    }
}

pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}
