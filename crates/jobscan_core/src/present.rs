use crate::{ClassifiedRecord, Verdict};

/// Result filter chosen in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FilterSelection {
    #[default]
    All,
    Positive,
    Applied,
    Rejected,
}

impl FilterSelection {
    pub const ALL: [FilterSelection; 4] = [
        FilterSelection::All,
        FilterSelection::Positive,
        FilterSelection::Applied,
        FilterSelection::Rejected,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(FilterSelection::All),
            "positive" => Some(FilterSelection::Positive),
            "applied" => Some(FilterSelection::Applied),
            "rejected" => Some(FilterSelection::Rejected),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterSelection::All => "all",
            FilterSelection::Positive => "positive",
            FilterSelection::Applied => "applied",
            FilterSelection::Rejected => "rejected",
        }
    }
}

/// Which verdicts count as "positive" beyond the fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositivePolicy {
    pub include_referred: bool,
}

/// Filters and orders records with the default [`PositivePolicy`].
pub fn present(records: &[ClassifiedRecord], filter: FilterSelection) -> Vec<ClassifiedRecord> {
    present_with(records, filter, PositivePolicy::default())
}

/// Keeps the records matching `filter`, highest priority first.
///
/// Equal priorities keep their input order.
pub fn present_with(
    records: &[ClassifiedRecord],
    filter: FilterSelection,
    policy: PositivePolicy,
) -> Vec<ClassifiedRecord> {
    let mut kept: Vec<ClassifiedRecord> = records
        .iter()
        .filter(|record| matches_filter(&record.verdict, filter, policy))
        .cloned()
        .collect();
    kept.sort_by_key(|record| std::cmp::Reverse(record.verdict.priority()));
    kept
}

fn matches_filter(verdict: &Verdict, filter: FilterSelection, policy: PositivePolicy) -> bool {
    match filter {
        FilterSelection::All => true,
        FilterSelection::Rejected => *verdict == Verdict::Rejected,
        FilterSelection::Applied => *verdict == Verdict::ApplicationReceived,
        FilterSelection::Positive => verdict.is_positive(policy.include_referred),
    }
}
