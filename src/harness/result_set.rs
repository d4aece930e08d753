//! Aggregated results of one harness run.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::category::Category;
use super::outcome::TestOutcome;

/// Outcomes grouped by category.
///
/// Categories appear in the order their first outcome was recorded and
/// outcomes within a category in execution order. Serializes as a JSON
/// object (`category → [outcome, ...]`) preserving that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    categories: Vec<(Category, Vec<TestOutcome>)>,
}

impl ResultSet {
    /// Empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to its category
    pub(crate) fn push(&mut self, category: &Category, outcome: TestOutcome) {
        match self.categories.iter_mut().find(|(c, _)| c == category) {
            Some((_, outcomes)) => outcomes.push(outcome),
            None => self.categories.push((category.clone(), vec![outcome])),
        }
    }

    /// Categories with their outcomes, in order
    pub fn categories(&self) -> impl Iterator<Item = (&Category, &[TestOutcome])> {
        self.categories.iter().map(|(c, o)| (c, o.as_slice()))
    }

    /// Outcomes of one category
    pub fn get(&self, category: &Category) -> Option<&[TestOutcome]> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, o)| o.as_slice())
    }

    /// Every outcome, in execution order
    pub fn outcomes(&self) -> impl Iterator<Item = &TestOutcome> {
        self.categories.iter().flat_map(|(_, o)| o.iter())
    }

    /// Total number of outcomes
    pub fn total(&self) -> usize {
        self.categories.iter().map(|(_, o)| o.len()).sum()
    }

    /// Number of passing outcomes
    pub fn passed(&self) -> usize {
        self.outcomes().filter(|o| o.success).count()
    }

    /// No outcomes recorded
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Aggregate counts, per-category breakdown and grade
    pub fn summary(&self) -> Summary {
        let categories: Vec<CategorySummary> = self
            .categories
            .iter()
            .map(|(category, outcomes)| {
                let passed = outcomes.iter().filter(|o| o.success).count();
                CategorySummary {
                    category: category.clone(),
                    passed,
                    total: outcomes.len(),
                    success_rate: success_rate(passed, outcomes.len()),
                }
            })
            .collect();

        let total = self.total();
        let passed = self.passed();
        let rate = success_rate(passed, total);

        Summary {
            total,
            passed,
            failed: total - passed,
            success_rate: rate,
            grade: Grade::from_rate(rate),
            categories,
        }
    }
}

/// Percentage of `passed` in `total`; 0.0 when `total` is zero.
pub(crate) fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (passed * 100) as f64 / total as f64
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, outcomes) in &self.categories {
            map.serialize_entry(category, outcomes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultSetVisitor;

        impl<'de> Visitor<'de> for ResultSetVisitor {
            type Value = ResultSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category to outcome list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ResultSet, A::Error> {
                let mut set = ResultSet::new();
                while let Some((category, outcomes)) =
                    access.next_entry::<Category, Vec<TestOutcome>>()?
                {
                    // Empty categories carry no information
                    if outcomes.is_empty() {
                        continue;
                    }
                    for outcome in outcomes {
                        set.push(&category, outcome);
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ResultSetVisitor)
    }
}

/// Per-category pass counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category
    pub category: Category,
    /// Passing outcomes
    pub passed: usize,
    /// All outcomes
    pub total: usize,
    /// Percentage passed
    pub success_rate: f64,
}

impl CategorySummary {
    /// ✅ when everything passed, ⚠️ at 80% or more, ❌ otherwise
    pub fn status_icon(&self) -> &'static str {
        if self.passed == self.total {
            "✅"
        } else if self.success_rate >= 80.0 {
            "⚠️"
        } else {
            "❌"
        }
    }
}

/// Aggregate view of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// All outcomes
    pub total: usize,
    /// Passing outcomes
    pub passed: usize,
    /// Failing outcomes
    pub failed: usize,
    /// Percentage passed (0.0 for an empty run)
    pub success_rate: f64,
    /// Qualitative grade
    pub grade: Grade,
    /// Per-category breakdown, in result order
    pub categories: Vec<CategorySummary>,
}

/// Qualitative grade derived from the success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// ≥ 95%
    Excellent,
    /// ≥ 90%
    VeryGood,
    /// ≥ 80%
    Good,
    /// ≥ 70%
    Fair,
    /// < 70%
    Poor,
}

impl Grade {
    /// Grade for a success rate in percent
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            Self::Excellent
        } else if rate >= 90.0 {
            Self::VeryGood
        } else if rate >= 80.0 {
            Self::Good
        } else if rate >= 70.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Lowercase label
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::VeryGood => "very good",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    /// What the grade means for release readiness
    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Production ready",
            Self::VeryGood => "Minor issues to address",
            Self::Good => "Some improvements needed",
            Self::Fair => "Significant improvements needed",
            Self::Poor => "Major issues to resolve",
        }
    }

    /// Console/Markdown icon
    pub fn icon(self) -> &'static str {
        match self {
            Self::Excellent => "🌟",
            Self::VeryGood => "✅",
            Self::Good => "⚠️",
            Self::Fair => "🔧",
            Self::Poor => "❌",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
