use async_graphql::{ComplexObject, Enum, SimpleObject};
use chrono::{NaiveDate, Utc};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum PolicyCategory {
    Hr,
    InfoSec,
    Legal,
    Finance,
    Ops,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum PolicyStatus {
    Active,
    Review,
    Draft,
    Archived,
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub(crate) struct PolicyDocument {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) category: PolicyCategory,
    pub(crate) last_updated: NaiveDate,
    pub(crate) status: PolicyStatus,
    pub(crate) owner: String,
    /// Percentage of mapped controls this policy covers, 0 to 100.
    pub(crate) coverage: i32,
    pub(crate) version: String,
    pub(crate) next_review_date: NaiveDate,
}

impl PolicyDocument {
    pub(crate) fn is_review_overdue(&self, today: NaiveDate) -> bool {
        self.next_review_date < today
    }

    /// Case-insensitive match on title or owner. `needle` must be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.owner.to_lowercase().contains(needle)
    }
}

#[ComplexObject]
impl PolicyDocument {
    async fn review_overdue(&self) -> bool {
        self.is_review_overdue(Utc::now().date_naive())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub(super) fn sample_policies() -> Vec<PolicyDocument> {
    vec![
        PolicyDocument {
            id: "1".to_string(),
            title: "Global Remote Work Policy".to_string(),
            category: PolicyCategory::Hr,
            last_updated: date(2024, 3, 15),
            status: PolicyStatus::Active,
            owner: "Sarah Jenkins".to_string(),
            coverage: 100,
            version: "2.4".to_string(),
            next_review_date: date(2025, 3, 15),
        },
        PolicyDocument {
            id: "2".to_string(),
            title: "Data Access & Classification".to_string(),
            category: PolicyCategory::InfoSec,
            last_updated: date(2024, 4, 2),
            status: PolicyStatus::Active,
            owner: "Mike Ross".to_string(),
            coverage: 95,
            version: "1.1".to_string(),
            next_review_date: date(2024, 10, 2),
        },
        PolicyDocument {
            id: "3".to_string(),
            title: "Travel & Expense Standard".to_string(),
            category: PolicyCategory::Finance,
            last_updated: date(2023, 11, 20),
            status: PolicyStatus::Review,
            owner: "Finance Ops".to_string(),
            coverage: 80,
            version: "3.0".to_string(),
            next_review_date: date(2023, 11, 20),
        },
        PolicyDocument {
            id: "4".to_string(),
            title: "Incident Response Plan".to_string(),
            category: PolicyCategory::InfoSec,
            last_updated: date(2024, 1, 10),
            status: PolicyStatus::Active,
            owner: "SOC Team".to_string(),
            coverage: 100,
            version: "4.2".to_string(),
            next_review_date: date(2025, 1, 10),
        },
        PolicyDocument {
            id: "5".to_string(),
            title: "AI Usage & Governance".to_string(),
            category: PolicyCategory::Legal,
            last_updated: date(2024, 5, 1),
            status: PolicyStatus::Draft,
            owner: "Legal Counsel".to_string(),
            coverage: 40,
            version: "0.9".to_string(),
            next_review_date: date(2024, 6, 1),
        },
    ]
}
