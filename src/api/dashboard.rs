use std::sync::Arc;

use async_graphql::{Context, Object, Result, SimpleObject};
use chrono::Utc;

use crate::catalog::{Catalog, PolicyStatus};

/// One slice of the control coverage breakdown, in percent.
#[derive(SimpleObject, Clone, Debug)]
struct CoverageSlice {
    name: String,
    value: i32,
}

/// Open risk counts for one week.
#[derive(SimpleObject, Clone, Debug)]
struct RiskPoint {
    name: String,
    high: i32,
    medium: i32,
}

#[derive(SimpleObject)]
struct Dashboard {
    coverage: Vec<CoverageSlice>,
    risk_trend: Vec<RiskPoint>,
    /// The number of policies in the catalog.
    policy_count: i32,
    /// The number of policies with status `ACTIVE`.
    active_policy_count: i32,
    /// The number of policies whose review date has passed.
    overdue_review_count: i32,
}

fn coverage() -> Vec<CoverageSlice> {
    [("Covered", 72), ("Partial", 18), ("Gap", 10)]
        .into_iter()
        .map(|(name, value)| CoverageSlice {
            name: name.to_string(),
            value,
        })
        .collect()
}

fn risk_trend() -> Vec<RiskPoint> {
    [
        ("Week 1", 12, 24),
        ("Week 2", 10, 22),
        ("Week 3", 8, 18),
        ("Week 4", 5, 15),
    ]
    .into_iter()
    .map(|(name, high, medium)| RiskPoint {
        name: name.to_string(),
        high,
        medium,
    })
    .collect()
}

#[derive(Default)]
pub(super) struct DashboardQuery;

#[Object]
impl DashboardQuery {
    async fn dashboard(&self, ctx: &Context<'_>) -> Result<Dashboard> {
        let catalog = ctx.data::<Arc<Catalog>>()?;
        let policies = catalog.policies(None).await;
        let today = Utc::now().date_naive();
        let active = policies
            .iter()
            .filter(|p| p.status == PolicyStatus::Active)
            .count();
        let overdue = policies
            .iter()
            .filter(|p| p.is_review_overdue(today))
            .count();

        Ok(Dashboard {
            coverage: coverage(),
            risk_trend: risk_trend(),
            policy_count: policies.len().try_into()?,
            active_policy_count: active.try_into()?,
            overdue_review_count: overdue.try_into()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::TestSchema;

    #[tokio::test]
    async fn static_figures() {
        let schema = TestSchema::new();
        let query = r"
        {
            dashboard {
                coverage { name value }
                riskTrend { name high medium }
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        let coverage = data["dashboard"]["coverage"].as_array().unwrap();
        let total: i64 = coverage.iter().map(|s| s["value"].as_i64().unwrap()).sum();
        assert_eq!(total, 100);
        assert_eq!(coverage[0]["name"], "Covered");
        assert_eq!(coverage[0]["value"], 72);

        let trend = data["dashboard"]["riskTrend"].as_array().unwrap();
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[3]["name"], "Week 4");
        assert_eq!(trend[3]["high"], 5);
        assert_eq!(trend[3]["medium"], 15);
    }

    #[tokio::test]
    async fn policy_counts() {
        let schema = TestSchema::new();
        let query = r"
        {
            dashboard {
                policyCount
                activePolicyCount
                overdueReviewCount
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["dashboard"]["policyCount"], 5);
        assert_eq!(data["dashboard"]["activePolicyCount"], 3);
        // Every sample review date lies in the past.
        assert_eq!(data["dashboard"]["overdueReviewCount"], 5);
    }
}
