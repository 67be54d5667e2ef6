use tracing::debug;

use crate::record::RuleRecord;
use crate::rule::WeeklyRule;

/// The posted weekly rules for one meter or meter cluster.
///
/// Rules are kept in source order. A priority order is computed once at
/// construction: ascending start minute, ties kept in source order. When
/// several rules are active at the same instant the first one in priority
/// order binds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    rules: Vec<WeeklyRule>,
    priority: Vec<usize>,
    source_len: usize,
}

impl Schedule {
    pub fn new(rules: Vec<WeeklyRule>) -> Self {
        let source_len = rules.len();
        Self::build(rules, source_len)
    }

    /// Build from source records. Records whose times cannot be read, or
    /// whose window is empty, are dropped and counted in [`Schedule::skipped`].
    pub fn from_records(records: &[RuleRecord]) -> Self {
        let mut rules = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match WeeklyRule::from_record(record) {
                Ok(rule) => rules.push(rule),
                Err(e) => debug!(
                    index,
                    from_time = %record.from_time,
                    to_time = %record.to_time,
                    error = %e,
                    "dropping rule with unusable window"
                ),
            }
        }
        Self::build(rules, records.len())
    }

    fn build(rules: Vec<WeeklyRule>, source_len: usize) -> Self {
        let mut priority: Vec<usize> = (0..rules.len()).collect();
        // sort_by_key is stable
        priority.sort_by_key(|&i| rules[i].from.minute_of_day());
        Self {
            rules,
            priority,
            source_len,
        }
    }

    /// Usable rules in source order.
    pub fn rules(&self) -> &[WeeklyRule] {
        &self.rules
    }

    /// Usable rules in priority order.
    pub fn by_priority(&self) -> impl Iterator<Item = &WeeklyRule> + '_ {
        self.priority.iter().map(|&i| &self.rules[i])
    }

    /// True only when no rules were posted at all. A schedule whose records
    /// were all dropped is still posted: rules exist, none of them bind.
    pub fn is_unposted(&self) -> bool {
        self.source_len == 0
    }

    /// Number of usable rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of source records dropped at construction.
    pub fn skipped(&self) -> usize {
        self.source_len - self.rules.len()
    }

    /// The same schedule in normal form: times rendered `HH:MM`, duplicate
    /// rules collapsed, rules sorted by their canonical text. Whether any
    /// rules were posted is preserved; dropped records are not carried over,
    /// except that a posted schedule with no usable rule keeps one so it
    /// does not turn unposted.
    pub fn canonical(&self) -> Self {
        let mut keyed: Vec<(String, WeeklyRule)> = self
            .rules
            .iter()
            .map(|rule| {
                let mut rule = rule.clone();
                rule.from_text = rule.from.to_string();
                rule.to_text = rule.to.to_string();
                rule.raw_state = rule.raw_state.trim().to_string();
                (rule.canonical_line(), rule)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);

        let rules: Vec<WeeklyRule> = keyed.into_iter().map(|(_, rule)| rule).collect();
        let source_len = match (rules.is_empty(), self.is_unposted()) {
            (true, false) => 1,
            _ => rules.len(),
        };
        Self::build(rules, source_len)
    }

    /// Source-shaped records for the usable rules.
    pub fn to_records(&self) -> Vec<RuleRecord> {
        self.rules.iter().map(WeeklyRule::to_record).collect()
    }
}

impl FromIterator<WeeklyRule> for Schedule {
    fn from_iter<I: IntoIterator<Item = WeeklyRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
