//! World configuration constants and tunable parameters.

use crate::state::{Kind, Subkind};

/// Inclusive range of entity identifiers reserved for a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdRange {
    pub low: u32,
    pub high: u32,
}

impl IdRange {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    #[inline]
    pub const fn contains(&self, id: u32) -> bool {
        id >= self.low && id <= self.high
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        if self.high < self.low {
            0
        } else {
            self.high - self.low + 1
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Allocation rule: entities of `kind` (optionally narrowed to `subkind`)
/// draw their IDs from `ranges`, primary range first.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeRule {
    pub kind: Kind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subkind: Option<Subkind>,
    pub ranges: Vec<IdRange>,
}

impl RangeRule {
    fn matches(&self, kind: Kind, subkind: Subkind) -> bool {
        self.kind == kind && self.subkind.is_none_or(|s| s == subkind)
    }
}

/// World configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RealmConfig {
    /// Number of days processed per turn.
    pub month_days: u32,
    /// Maximum number of pending orders per (player, actor) queue.
    pub max_orders_per_queue: usize,
    /// Upper bound on parent-link traversal before a stack is declared cyclic.
    pub max_stack_depth: usize,
    /// First tier at which the automatic engagement check may fire.
    pub engagement_tier: u8,
    /// Raise the engagement flag at the start of every day.
    pub daily_engagement_check: bool,
    /// ID allocation table, searched in order; the first matching rule wins.
    pub id_ranges: Vec<RangeRule>,
}

impl RealmConfig {
    // ===== compile-time constants =====
    /// Number of priority tiers. Tier 0 is the most urgent.
    pub const TIERS: usize = 5;
    /// Maximum number of operands decoded from a single order.
    pub const MAX_OPERANDS: usize = 8;
    /// Largest valid entity identifier. ID 0 is never allocated.
    pub const MAX_ENTITY_ID: u32 = 99_999;
    /// Order text pushed to the front of a queue by a forced stop.
    pub const STOP_ORDER: &'static str = "stop";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MONTH_DAYS: u32 = 30;
    pub const DEFAULT_MAX_ORDERS: usize = 250;
    pub const DEFAULT_MAX_STACK_DEPTH: usize = 64;
    pub const DEFAULT_ENGAGEMENT_TIER: u8 = 3;

    pub fn new() -> Self {
        Self {
            month_days: Self::DEFAULT_MONTH_DAYS,
            max_orders_per_queue: Self::DEFAULT_MAX_ORDERS,
            max_stack_depth: Self::DEFAULT_MAX_STACK_DEPTH,
            engagement_tier: Self::DEFAULT_ENGAGEMENT_TIER,
            daily_engagement_check: true,
            id_ranges: default_id_ranges(),
        }
    }

    pub fn with_month_days(mut self, month_days: u32) -> Self {
        self.month_days = month_days;
        self
    }

    /// Ranges an entity of the given category draws from, primary first.
    /// Falls back to the whole ID space when no rule matches.
    pub fn ranges_for(&self, kind: Kind, subkind: Subkind) -> Vec<IdRange> {
        let mut ranges = self
            .id_ranges
            .iter()
            .find(|rule| rule.matches(kind, subkind))
            .map(|rule| rule.ranges.clone())
            .unwrap_or_default();
        ranges.push(IdRange::new(1, Self::MAX_ENTITY_ID));
        ranges
    }
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_id_ranges() -> Vec<RangeRule> {
    let rule = |kind, subkind, ranges: &[IdRange]| RangeRule {
        kind,
        subkind,
        ranges: ranges.to_vec(),
    };

    vec![
        rule(Kind::Skill, None, &[IdRange::new(600, 999)]),
        rule(Kind::Player, None, &[IdRange::new(1_000, 1_999)]),
        rule(
            Kind::Char,
            None,
            &[IdRange::new(5_000, 9_999), IdRange::new(2_000, 4_999)],
        ),
        rule(
            Kind::Loc,
            Some(Subkind::Region),
            &[IdRange::new(10_000, 10_999)],
        ),
        rule(
            Kind::Loc,
            Some(Subkind::Province),
            &[IdRange::new(11_000, 49_999)],
        ),
        rule(
            Kind::Loc,
            None,
            &[IdRange::new(50_000, 79_999), IdRange::new(11_000, 49_999)],
        ),
        rule(Kind::Item, None, &[IdRange::new(80_000, 89_999)]),
        rule(Kind::Ship, None, &[IdRange::new(90_000, 94_999)]),
        rule(Kind::Gate, None, &[IdRange::new(95_000, 97_999)]),
        rule(Kind::Unform, None, &[IdRange::new(98_000, 99_999)]),
    ]
}
