//! Built-in exercise tables, the number-drill generator and the Pot Odds
//! question filter.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

use crate::eval::Operator;
use crate::model::{AnswerValue, Item, Mode, ModeSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown Poker Numbs level: {0}")]
    UnknownLevel(String),
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("unknown street: {0}")]
    UnknownStreet(String),
    #[error("unknown pot odds domain: {0}")]
    UnknownDomain(String),
    #[error("outs must be between 1 and 20, got {0}")]
    OutsOutOfRange(String),
    #[error("numbers must be between 1 and 100, got {0}")]
    NumberOutOfRange(String),
}

//
// ─── NUMBER DRILLS ─────────────────────────────────────────────────────────────
//

/// Numbers offered for selection.
pub const NUMBER_PICKS: RangeInclusive<u32> = 1..=100;

/// Chain length from which the generated order is always shuffled.
pub const RANDOM_CHAIN: u8 = 3;

/// INI / END / CHN: the partner range and how many operands each expression has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    start: u32,
    end: u32,
    chain: u8,
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: 10,
            chain: 2,
        }
    }
}

impl NumberRange {
    /// Clamp to a usable range: bounds at least 1, `start <= end`, chain at least 2.
    #[must_use]
    pub fn new(start: u32, end: u32, chain: u8) -> Self {
        let end = end.max(1);
        Self {
            start: start.clamp(1, end),
            end,
            chain: chain.max(2),
        }
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[must_use]
    pub fn chain(&self) -> u8 {
        self.chain
    }

    /// Long chains are drilled shuffled only: Random on, Surges off.
    #[must_use]
    pub fn forces_random(&self) -> bool {
        self.chain >= RANDOM_CHAIN
    }

    /// Apply the chain rule to the requested modes.
    #[must_use]
    pub fn constrain_modes(&self, modes: ModeSet) -> ModeSet {
        if self.forces_random() {
            modes.with(Mode::Random).without(Mode::Surges)
        } else {
            modes
        }
    }

    /// `chain - 1` partners starting at `first`, wrapping inside the range.
    fn partners(&self, first: u32) -> impl Iterator<Item = u32> + '_ {
        let width = self.end - self.start + 1;
        (0..u32::from(self.chain) - 1).map(move |step| self.start + (first - self.start + step) % width)
    }
}

/// Validate picked numbers against [`NUMBER_PICKS`].
///
/// # Errors
///
/// Returns `CatalogError::NumberOutOfRange` for the first value outside it.
pub fn check_numbers(numbers: &[u32]) -> Result<(), CatalogError> {
    match numbers.iter().find(|n| !NUMBER_PICKS.contains(*n)) {
        Some(n) => Err(CatalogError::NumberOutOfRange(n.to_string())),
        None => Ok(()),
    }
}

/// One expression per operator, picked number and partner in the range.
///
/// Each expression starts with the picked number, followed by `chain - 1`
/// consecutive partners from the range. Order: operator, then number
/// (ascending, duplicates dropped), then first partner.
#[must_use]
pub fn number_expressions(ops: &[Operator], numbers: &[u32], range: NumberRange) -> Vec<Item> {
    let numbers: BTreeSet<u32> = numbers.iter().copied().collect();
    let mut items = Vec::new();
    for op in ops {
        for n in &numbers {
            for first in range.start..=range.end {
                let mut expr = n.to_string();
                for partner in range.partners(first) {
                    expr.push(op.symbol());
                    expr.push_str(&partner.to_string());
                }
                items.push(Item::expression(expr));
            }
        }
    }
    items
}

//
// ─── POKER NUMBS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PokerLevel {
    Basic,
    Med,
    High,
    Advance,
}

impl PokerLevel {
    pub const ALL: [PokerLevel; 4] = [
        PokerLevel::Basic,
        PokerLevel::Med,
        PokerLevel::High,
        PokerLevel::Advance,
    ];

    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            PokerLevel::Basic => 1,
            PokerLevel::Med => 2,
            PokerLevel::High => 3,
            PokerLevel::Advance => 4,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PokerLevel::Basic => "Basic",
            PokerLevel::Med => "Med",
            PokerLevel::High => "High",
            PokerLevel::Advance => "Advance",
        }
    }

    fn table(self) -> &'static [(Operator, &'static [&'static str])] {
        match self {
            PokerLevel::Basic => LEVEL_1,
            PokerLevel::Med => LEVEL_2,
            PokerLevel::High => LEVEL_3,
            PokerLevel::Advance => LEVEL_4,
        }
    }
}

impl fmt::Display for PokerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PokerLevel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        PokerLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(raw) || level.number().to_string() == raw)
            .ok_or_else(|| CatalogError::UnknownLevel(raw.to_string()))
    }
}

/// Parse an operator given either as its symbol or as `*` / `/` / `x`.
///
/// # Errors
///
/// Returns `CatalogError::UnknownOperator` for anything else.
pub fn parse_operator(raw: &str) -> Result<Operator, CatalogError> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let op = match (chars.next(), chars.next()) {
        (Some('*' | 'x' | 'X'), None) => Some(Operator::Mul),
        (Some('/' | ':'), None) => Some(Operator::Div),
        (Some(ch), None) => Operator::from_char(ch),
        _ => None,
    };
    op.ok_or_else(|| CatalogError::UnknownOperator(raw.to_string()))
}

const LEVEL_1: &[(Operator, &[&str])] = &[
    (
        Operator::Mul,
        &[
            "2×2=4", "2×3=6", "2×4=8", "2×5=10", "3×2=6", "3×3=9", "4×3=12", "5×2=10", "5×3=15",
            "5×4=20", "6×2=12", "6×3=18", "10×10=100",
        ],
    ),
    (
        Operator::Add,
        &[
            "1.5+1.5=3", "2+2.5=4.5", "2.5+2.5=5", "3+3=6", "5+5=10", "6+6=12", "10+15=25",
            "25+25=50",
        ],
    ),
    (Operator::Sub, &["10-2.5=7.5", "15-5=10", "25-15=10", "50-25=25"]),
    (
        Operator::Div,
        &[
            "2÷2=1", "4÷2=2", "6÷2=3", "10÷2=5", "10÷5=2", "20÷4=5", "60÷10=6", "100÷10=10",
        ],
    ),
];

const LEVEL_2: &[(Operator, &[&str])] = &[
    (
        Operator::Mul,
        &[
            "2×1.5=3", "2×2.5=5", "3×1.5=4.5", "3×2.5=7.5", "4×2.5=10", "4×3.5=14", "5×2=10",
            "6×1.5=9", "7.5×2=15", "10×1.5=15", "1.25×4=5", "1.25×8=10", "1.5×10=15",
        ],
    ),
    (
        Operator::Add,
        &[
            "1+1.5=2.5", "2.5+1.5=4", "2.5+3=5.5", "3.5+1.5=5", "4.5+1.5=6", "4.5+4.5=9",
            "7.5+7.5=15",
        ],
    ),
    (
        Operator::Sub,
        &[
            "7.5-2.5=5", "10-1.5=8.5", "20-7.5=12.5", "25-7.5=17.5", "30-7.5=22.5", "50-15=35",
        ],
    ),
    (
        Operator::Div,
        &[
            "1÷2=0.5", "1÷4=0.25", "1÷5=0.2", "2÷1.5=1.33", "3÷1.25=2.4", "3÷4=0.75", "4÷4=1",
            "5÷1.5=3.33", "5÷5=1", "6÷3=2",
        ],
    ),
];

const LEVEL_3: &[(Operator, &[&str])] = &[
    (
        Operator::Mul,
        &[
            "2.5×2=5", "2.5×3=7.5", "2.5×4=10", "2.5×6=15", "2.5×10=25", "3.5×2=7", "3.5×3=10.5",
            "3.5×4=14", "4.5×2=9", "4.5×3=13.5", "4.5×4=18",
        ],
    ),
    (Operator::Add, &["3+4.5=7.5", "12.5+25=37.5", "25+50=75", "75+75=150"]),
    (
        Operator::Sub,
        &["10-1.25=8.75", "10-1.75=8.25", "25-12.5=12.5", "30-12.5=17.5", "100-75=25"],
    ),
    (
        Operator::Div,
        &[
            "1÷3=0.33", "1÷1.25=0.8", "1÷1.75=0.57", "1÷2.25=0.44", "2÷1.75=1.14", "2.5÷1.25=2",
            "3.5÷1.25=2.8", "4.5÷1.5=3", "7.5÷2.5=3", "10÷3=3.33", "15÷2.5=6", "27÷18.5=1.46",
        ],
    ),
];

const LEVEL_4: &[(Operator, &[&str])] = &[
    (
        Operator::Mul,
        &[
            "1.25×6=7.5", "1.25×12=15", "1.5×12=18", "1.5×15=22.5", "1.5×20=30", "1.75×4=7",
            "1.75×6=10.5", "1.75×8=14", "1.75×10=17.5", "2.25×4=9", "2.25×6=13.5", "2.25×10=22.5",
            "2.75×6=16.5", "2.75×10=27.5",
        ],
    ),
    (Operator::Add, &["7.5+10=17.5", "15+15=30"]),
    (Operator::Sub, &["100-37.5=62.5"]),
    (
        Operator::Div,
        &[
            "3÷7=0.43", "4÷1.75=2.29", "5÷6=0.83", "6÷2.5=2.4", "9÷4.5=2", "10÷2.5=4", "15÷1.5=10",
            "20÷5=4", "25÷5.5=4.54", "30÷6=5", "30÷7.5=4", "35÷8.5=4.11", "40÷9.5=4.21",
            "45÷12.5=3.6", "70÷10=7", "75÷7.5=10", "80÷10=8", "100÷8=12.5",
        ],
    ),
];

/// Expressions of the selected levels restricted to the selected operators.
///
/// The table's reference answers are dropped; answers are always recomputed
/// by the evaluator from the expression. Order: level, then table operator
/// order, then table order.
#[must_use]
pub fn poker_expressions(levels: &[PokerLevel], ops: &[Operator]) -> Vec<Item> {
    let levels: BTreeSet<PokerLevel> = levels.iter().copied().collect();
    levels
        .into_iter()
        .flat_map(|level| level.table().iter())
        .filter(|(op, _)| ops.contains(op))
        .flat_map(|(_, entries)| entries.iter())
        .map(|entry| {
            let expr = entry.split_once('=').map_or(*entry, |(lhs, _)| lhs);
            Item::expression(expr)
        })
        .collect()
}

//
// ─── POT ODDS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    FlopTurn,
    TurnRiver,
    FlopRiver,
    #[serde(other)]
    Unknown,
}

impl FromStr for Street {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "flop_turn" | "Flop-Turn" => Ok(Street::FlopTurn),
            "turn_river" | "Turn-River" => Ok(Street::TurnRiver),
            "flop_river" | "Flop-River" => Ok(Street::FlopRiver),
            other => Err(CatalogError::UnknownStreet(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotOddsDomain {
    RawPercent,
    RawOdds,
    Conversion,
    #[serde(other)]
    Unknown,
}

impl FromStr for PotOddsDomain {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "raw_percent" | "%" | "N %" => Ok(PotOddsDomain::RawPercent),
            "raw_odds" | "N : N" | "odds" => Ok(PotOddsDomain::RawOdds),
            other => Err(CatalogError::UnknownDomain(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionFormat {
    PercentToOdds,
    OddsToPercent,
    #[serde(other)]
    Unknown,
}

/// One question from the external Pot Odds dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PotOddsRecord {
    pub outs: u8,
    pub street: Street,
    pub domain: PotOddsDomain,
    #[serde(default)]
    pub format: Option<ConversionFormat>,
    pub question: String,
    pub answer: AnswerValue,
}

impl PotOddsRecord {
    #[must_use]
    pub fn to_item(&self) -> Item {
        Item::question(self.question.clone(), self.answer.to_answer_string())
    }
}

/// Outs buttons as offered to the user.
pub const OUTS_BUCKETS: [(&str, RangeInclusive<u8>); 4] =
    [("1–5", 1..=5), ("6–10", 6..=10), ("11–15", 11..=15), ("16–20", 16..=20)];

/// Current Pot Odds filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PotOddsSelection {
    pub outs: BTreeSet<u8>,
    pub domains: BTreeSet<PotOddsDomain>,
    pub streets: BTreeSet<Street>,
    pub conversions: bool,
}

impl PotOddsSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every outs value of the bucket containing `outs`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::OutsOutOfRange` if `outs` is outside 1..=20.
    pub fn add_outs_bucket(&mut self, outs: u8) -> Result<(), CatalogError> {
        let (_, range) = OUTS_BUCKETS
            .iter()
            .find(|(_, range)| range.contains(&outs))
            .ok_or_else(|| CatalogError::OutsOutOfRange(outs.to_string()))?;
        self.outs.extend(range.clone());
        Ok(())
    }

    /// Nothing can match without outs and streets, or without any domain or conversion.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.outs.is_empty()
            && !self.streets.is_empty()
            && (!self.domains.is_empty() || self.conversions)
    }

    #[must_use]
    pub fn matches(&self, record: &PotOddsRecord) -> bool {
        if !self.outs.contains(&record.outs) || !self.streets.contains(&record.street) {
            return false;
        }
        let has_percent = self.domains.contains(&PotOddsDomain::RawPercent);
        let has_odds = self.domains.contains(&PotOddsDomain::RawOdds);

        match record.domain {
            PotOddsDomain::RawPercent => has_percent,
            PotOddsDomain::RawOdds => has_odds,
            PotOddsDomain::Conversion => match record.format {
                Some(ConversionFormat::PercentToOdds) => self.conversions && has_percent,
                Some(ConversionFormat::OddsToPercent) => self.conversions && has_odds,
                _ => false,
            },
            PotOddsDomain::Unknown => false,
        }
    }

    /// Matching records as drill items, dataset order preserved.
    #[must_use]
    pub fn select(&self, records: &[PotOddsRecord]) -> Vec<Item> {
        if !self.is_selectable() {
            return Vec::new();
        }
        records
            .iter()
            .filter(|record| self.matches(record))
            .map(PotOddsRecord::to_item)
            .collect()
    }
}

/// Seconds budgeted per item in the pre-run estimate.
pub const SECONDS_PER_ITEM: usize = 5;

/// Pre-run stats line: total items, Pot Odds share, estimated time.
#[must_use]
pub fn stats_line(total: usize, pot_odds: usize) -> String {
    let estimated = total * SECONDS_PER_ITEM;
    format!("Total: {total} (Pot Odds: {pot_odds})  Est. tiempo: {estimated}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outs: u8, street: Street, domain: PotOddsDomain, format: Option<ConversionFormat>) -> PotOddsRecord {
        PotOddsRecord {
            outs,
            street,
            domain,
            format,
            question: format!("{outs} outs {street:?} {domain:?}"),
            answer: AnswerValue::Text("x".into()),
        }
    }

    #[test]
    fn number_expressions_pair_each_pick_with_the_range() {
        let items = number_expressions(&[Operator::Mul, Operator::Add], &[7, 3, 7], NumberRange::new(2, 3, 2));
        assert_eq!(
            items,
            vec![
                Item::expression("3×2"),
                Item::expression("3×3"),
                Item::expression("7×2"),
                Item::expression("7×3"),
                Item::expression("3+2"),
                Item::expression("3+3"),
                Item::expression("7+2"),
                Item::expression("7+3"),
            ]
        );
    }

    #[test]
    fn long_chains_wrap_inside_the_range() {
        let items = number_expressions(&[Operator::Sub], &[20], NumberRange::new(1, 3, 4));
        assert_eq!(
            items,
            vec![
                Item::expression("20-1-2-3"),
                Item::expression("20-2-3-1"),
                Item::expression("20-3-1-2"),
            ]
        );
    }

    #[test]
    fn range_is_clamped_like_the_spinners() {
        let range = NumberRange::new(9, 4, 0);
        assert_eq!((range.start(), range.end(), range.chain()), (4, 4, 2));
        let range = NumberRange::new(0, 0, 5);
        assert_eq!((range.start(), range.end(), range.chain()), (1, 1, 5));
        assert_eq!(NumberRange::default(), NumberRange::new(1, 10, 2));
    }

    #[test]
    fn chain_of_three_forces_random_and_drops_surges() {
        let requested = ModeSet::empty().with(Mode::Surges).with(Mode::Mirror);
        assert_eq!(NumberRange::new(1, 10, 2).constrain_modes(requested), requested);

        let constrained = NumberRange::new(1, 10, 3).constrain_modes(requested);
        assert!(constrained.contains(Mode::Random));
        assert!(constrained.contains(Mode::Mirror));
        assert!(!constrained.contains(Mode::Surges));
    }

    #[test]
    fn picked_numbers_must_be_offered() {
        assert!(check_numbers(&[1, 50, 100]).is_ok());
        assert_eq!(check_numbers(&[5, 101]), Err(CatalogError::NumberOutOfRange("101".into())));
    }

    #[test]
    fn poker_expressions_drop_reference_answers() {
        let items = poker_expressions(&[PokerLevel::Basic], &[Operator::Sub]);
        assert_eq!(
            items,
            vec![
                Item::expression("10-2.5"),
                Item::expression("15-5"),
                Item::expression("25-15"),
                Item::expression("50-25"),
            ]
        );
    }

    #[test]
    fn poker_expressions_follow_level_then_operator_order() {
        let items = poker_expressions(&[PokerLevel::Advance, PokerLevel::High], &[Operator::Sub, Operator::Add]);
        let first_level4 = items.iter().position(|i| *i == Item::expression("7.5+10")).unwrap();
        let last_level3 = items.iter().position(|i| *i == Item::expression("100-75")).unwrap();
        assert!(last_level3 < first_level4);
        assert_eq!(items.first(), Some(&Item::expression("3+4.5")));
    }

    #[test]
    fn parses_levels_and_operators() {
        assert_eq!("med".parse::<PokerLevel>().unwrap(), PokerLevel::Med);
        assert_eq!("4".parse::<PokerLevel>().unwrap(), PokerLevel::Advance);
        assert!("5".parse::<PokerLevel>().is_err());
        assert_eq!(parse_operator("*").unwrap(), Operator::Mul);
        assert_eq!(parse_operator("÷").unwrap(), Operator::Div);
        assert!(parse_operator("^").is_err());
    }

    #[test]
    fn selection_requires_outs_streets_and_domain() {
        let records = vec![record(3, Street::FlopTurn, PotOddsDomain::RawPercent, None)];
        let mut sel = PotOddsSelection::new();
        sel.add_outs_bucket(3).unwrap();
        sel.streets.insert(Street::FlopTurn);
        assert!(sel.select(&records).is_empty());

        sel.domains.insert(PotOddsDomain::RawPercent);
        assert_eq!(sel.select(&records).len(), 1);
        assert_eq!(sel.outs, (1..=5).collect());
    }

    #[test]
    fn conversions_follow_their_source_domain() {
        let records = vec![
            record(8, Street::TurnRiver, PotOddsDomain::Conversion, Some(ConversionFormat::PercentToOdds)),
            record(8, Street::TurnRiver, PotOddsDomain::Conversion, Some(ConversionFormat::OddsToPercent)),
            record(8, Street::TurnRiver, PotOddsDomain::RawOdds, None),
        ];
        let mut sel = PotOddsSelection::new();
        sel.add_outs_bucket(8).unwrap();
        sel.streets.insert(Street::TurnRiver);
        sel.domains.insert(PotOddsDomain::RawOdds);
        assert_eq!(sel.select(&records), vec![records[2].to_item()]);

        sel.conversions = true;
        assert_eq!(sel.select(&records), vec![records[1].to_item(), records[2].to_item()]);
    }

    #[test]
    fn deserializes_dataset_records() {
        let raw = r#"{"outs": 9, "street": "flop_river", "domain": "raw_percent", "question": "9 outs flop→river %", "answer": 35}"#;
        let rec: PotOddsRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.to_item(), Item::question("9 outs flop→river %", "35"));
        assert_eq!(rec.format, None);
    }

    #[test]
    fn stats_line_estimates_five_seconds_each() {
        assert_eq!(stats_line(12, 4), "Total: 12 (Pot Odds: 4)  Est. tiempo: 60s");
    }
}
