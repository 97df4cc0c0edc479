// 🏷️ Point Rules - Rules as Data
// Independent scoring rules summed into a receipt's loyalty points

use crate::error::ScoreError;
use crate::receipt::{NewReceipt, Receipt};
use chrono::{Datelike, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use unicode_general_category::{get_general_category, GeneralCategory};

pub const ROUND_DOLLAR_POINTS: u64 = 50;
pub const QUARTER_MULTIPLE_POINTS: u64 = 25;
pub const ITEM_PAIR_POINTS: u64 = 5;
pub const ODD_DAY_POINTS: u64 = 6;
pub const AFTERNOON_POINTS: u64 = 10;

/// Afternoon window in whole hours, end exclusive (14:00 through 15:59).
pub const AFTERNOON_START_HOUR: u32 = 14;
pub const AFTERNOON_END_HOUR: u32 = 16;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointRule {
    /// +1 per Unicode letter or number in the retailer name
    RetailerName,
    /// +50 when the total has no cents
    RoundDollar,
    /// +25 when the total is a multiple of 0.25
    QuarterMultiple,
    /// +5 per two items
    ItemPairs,
    /// ceil(price * 0.2) per item whose trimmed description length is a multiple of 3
    DescriptionLength,
    /// +6 when the purchase day is odd
    OddDay,
    /// +10 when purchased from 14:00 up to (not including) 16:00
    Afternoon,
}

impl PointRule {
    pub const ALL: [PointRule; 7] = [
        PointRule::RetailerName,
        PointRule::RoundDollar,
        PointRule::QuarterMultiple,
        PointRule::ItemPairs,
        PointRule::DescriptionLength,
        PointRule::OddDay,
        PointRule::Afternoon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PointRule::RetailerName => "retailer_name",
            PointRule::RoundDollar => "round_dollar",
            PointRule::QuarterMultiple => "quarter_multiple",
            PointRule::ItemPairs => "item_pairs",
            PointRule::DescriptionLength => "description_length",
            PointRule::OddDay => "odd_day",
            PointRule::Afternoon => "afternoon",
        }
    }

    /// Points this rule awards. Parse failures are pushed onto `errors` and
    /// the affected part contributes nothing.
    pub fn evaluate(&self, receipt: &NewReceipt, errors: &mut Vec<ScoreError>) -> u64 {
        let result = match self {
            PointRule::RetailerName => Ok(retailer_points(&receipt.retailer)),
            PointRule::RoundDollar => total_cents(receipt).map(|cents| {
                if is_multiple_of(cents, Decimal::ONE_HUNDRED) {
                    ROUND_DOLLAR_POINTS
                } else {
                    0
                }
            }),
            PointRule::QuarterMultiple => total_cents(receipt).map(|cents| {
                if is_multiple_of(cents, Decimal::from(25)) {
                    QUARTER_MULTIPLE_POINTS
                } else {
                    0
                }
            }),
            PointRule::ItemPairs => Ok((receipt.items.len() / 2) as u64 * ITEM_PAIR_POINTS),
            PointRule::DescriptionLength => {
                let mut points = 0;
                for item in &receipt.items {
                    if !description_qualifies(&item.short_description) {
                        continue;
                    }
                    match item
                        .price
                        .to_decimal("price")
                        .and_then(|price| price_bonus(price, item.price.as_str()))
                    {
                        Ok(bonus) => points += bonus,
                        Err(e) => errors.push(e),
                    }
                }
                Ok(points)
            }
            PointRule::OddDay => receipt
                .purchase_date()
                .map(|date| if date.day() % 2 == 1 { ODD_DAY_POINTS } else { 0 }),
            PointRule::Afternoon => receipt.purchase_time().map(|time| {
                if (AFTERNOON_START_HOUR..AFTERNOON_END_HOUR).contains(&time.hour()) {
                    AFTERNOON_POINTS
                } else {
                    0
                }
            }),
        };

        result.unwrap_or_else(|e| {
            errors.push(e);
            0
        })
    }
}

// Letters and numbers by general category (L*, N*); combining marks do not count.
fn retailer_points(retailer: &str) -> u64 {
    retailer
        .chars()
        .filter(|&c| is_letter_or_number(get_general_category(c)))
        .count() as u64
}

fn is_letter_or_number(category: GeneralCategory) -> bool {
    matches!(
        category,
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
            | GeneralCategory::LetterNumber
            | GeneralCategory::OtherNumber
    )
}

/// `round(total * 100)` as an exact decimal.
fn total_cents(receipt: &NewReceipt) -> Result<Decimal, ScoreError> {
    let total = receipt.total.to_decimal("total")?;
    total
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round())
        .ok_or_else(|| ScoreError::Overflow {
            field: "total",
            value: receipt.total.to_string(),
        })
}

fn is_multiple_of(cents: Decimal, step: Decimal) -> bool {
    (cents % step).is_zero()
}

// Length in UTF-8 bytes. An empty trimmed description has length 0, which counts.
fn description_qualifies(description: &str) -> bool {
    description.trim().len() % 3 == 0
}

fn price_bonus(price: Decimal, raw: &str) -> Result<u64, ScoreError> {
    let overflow = || ScoreError::Overflow {
        field: "price",
        value: raw.to_string(),
    };
    let bonus = price.checked_mul(Decimal::new(2, 1)).ok_or_else(overflow)?.ceil();
    if bonus.is_sign_negative() {
        return Ok(0);
    }
    bonus.to_u64().ok_or_else(overflow)
}

// ============================================================================
// SCORING RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleContribution {
    pub rule: PointRule,
    pub points: u64,
}

/// A rule (or one item of it) that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub rule: PointRule,
    pub error: ScoreError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsBreakdown {
    pub contributions: Vec<RuleContribution>,
    pub skipped: Vec<SkippedRule>,
}

impl PointsBreakdown {
    pub fn total(&self) -> u64 {
        self.contributions.iter().map(|c| c.points).sum()
    }

    pub fn points_for(&self, rule: PointRule) -> u64 {
        self.contributions
            .iter()
            .filter(|c| c.rule == rule)
            .map(|c| c.points)
            .sum()
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

pub struct RuleEngine {
    rules: Vec<PointRule>,
}

impl RuleEngine {
    /// Engine with every point rule enabled
    pub fn new() -> Self {
        RuleEngine {
            rules: PointRule::ALL.to_vec(),
        }
    }

    /// Engine restricted to the given rules
    pub fn from_rules(rules: Vec<PointRule>) -> Self {
        RuleEngine { rules }
    }

    /// Evaluate every rule against the receipt, keeping per-rule points and
    /// any parse failures. Never performs I/O.
    pub fn score(&self, receipt: &NewReceipt) -> PointsBreakdown {
        let mut breakdown = PointsBreakdown::default();

        for &rule in &self.rules {
            let mut errors = Vec::new();
            let points = rule.evaluate(receipt, &mut errors);
            breakdown.contributions.push(RuleContribution { rule, points });
            breakdown
                .skipped
                .extend(errors.into_iter().map(|error| SkippedRule { rule, error }));
        }

        breakdown
    }

    pub fn points(&self, receipt: &NewReceipt) -> u64 {
        self.score(receipt).total()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Total points for a stored receipt using every rule.
pub fn compute_points(receipt: &Receipt) -> u64 {
    RuleEngine::new().points(receipt.data())
}

// ============================================================================
// TESTS
// ============================================================================
