//! In-memory policy and regulation catalog seeded with sample data.

mod policy;
mod regulation;

use std::collections::HashSet;

use tokio::sync::RwLock;

pub(crate) use self::policy::{PolicyCategory, PolicyDocument, PolicyStatus};
pub(crate) use self::regulation::{MappingStatus, Regulation, RegulationSummary};

pub(crate) struct Catalog {
    policies: RwLock<Vec<PolicyDocument>>,
    regulations: Vec<Regulation>,
}

impl Catalog {
    pub(crate) fn new(policies: Vec<PolicyDocument>, regulations: Vec<Regulation>) -> Self {
        Self {
            policies: RwLock::new(policies),
            regulations,
        }
    }

    pub(crate) fn with_sample_data() -> Self {
        Self::new(policy::sample_policies(), regulation::sample_regulations())
    }

    /// Policies whose title or owner contains `search`, ignoring case. A
    /// missing or blank search returns every policy.
    pub(crate) async fn policies(&self, search: Option<&str>) -> Vec<PolicyDocument> {
        let policies = self.policies.read().await;
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => {
                let needle = search.to_lowercase();
                policies
                    .iter()
                    .filter(|policy| policy.matches(&needle))
                    .cloned()
                    .collect()
            }
            None => policies.clone(),
        }
    }

    /// Newest documents are listed first.
    pub(crate) async fn add_policy(&self, policy: PolicyDocument) {
        self.policies.write().await.insert(0, policy);
    }

    pub(crate) fn regulations(&self, framework: Option<&str>) -> Vec<Regulation> {
        self.regulations
            .iter()
            .filter(|r| framework.map_or(true, |name| r.name == name))
            .cloned()
            .collect()
    }

    /// Distinct framework names in first-seen order.
    pub(crate) fn frameworks(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.regulations
            .iter()
            .filter(|r| seen.insert(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect()
    }

    pub(crate) fn regulation_summary(&self) -> RegulationSummary {
        let total = self.regulations.len();
        let count = |status: MappingStatus| {
            self.regulations
                .iter()
                .filter(|r| r.status == status)
                .count()
        };
        let half_points = 2 * count(MappingStatus::Compliant) + count(MappingStatus::Partial);
        let coverage_score = if total == 0 {
            0
        } else {
            // Rounded percentage of `half_points / (2 * total)`.
            (half_points * 100 + total) / (2 * total)
        };
        let mapped_controls = self
            .regulations
            .iter()
            .filter_map(|r| r.mapped_control_id.as_deref())
            .collect::<HashSet<_>>()
            .len();

        RegulationSummary {
            coverage_score: to_i32(coverage_score),
            critical_gaps: to_i32(count(MappingStatus::Gap)),
            mapped_controls: to_i32(mapped_controls),
            total_requirements: to_i32(total),
        }
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
