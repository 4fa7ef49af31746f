use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use crate::catalog::{Catalog, Regulation, RegulationSummary};

#[derive(Default)]
pub(super) struct RegulationQuery;

#[Object]
impl RegulationQuery {
    /// Regulatory requirements, optionally limited to one framework.
    async fn regulations(
        &self,
        ctx: &Context<'_>,
        framework: Option<String>,
    ) -> Result<Vec<Regulation>> {
        let catalog = ctx.data::<Arc<Catalog>>()?;
        Ok(catalog.regulations(framework.as_deref()))
    }

    /// Framework names available for filtering.
    async fn frameworks(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let catalog = ctx.data::<Arc<Catalog>>()?;
        Ok(catalog.frameworks())
    }

    async fn regulation_summary(&self, ctx: &Context<'_>) -> Result<RegulationSummary> {
        let catalog = ctx.data::<Arc<Catalog>>()?;
        Ok(catalog.regulation_summary())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::TestSchema;

    #[tokio::test]
    async fn filter_by_framework() {
        let schema = TestSchema::new();
        let query = r#"
        {
            regulations(framework: "GDPR") {
                id
                section
                mappedControlId
                status
            }
        }"#;
        let data = schema.execute(query).await.data.into_json().unwrap();
        let regulations = data["regulations"].as_array().unwrap();
        assert_eq!(regulations.len(), 1);
        assert_eq!(regulations[0]["id"], "r3");
        assert_eq!(regulations[0]["status"], "PARTIAL");
    }

    #[tokio::test]
    async fn unmapped_requirement_has_null_control() {
        let schema = TestSchema::new();
        let query = r#"
        {
            regulations(framework: "HIPAA") {
                mappedControlId
                status
                evidenceCount
            }
        }"#;
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert!(data["regulations"][0]["mappedControlId"].is_null());
        assert_eq!(data["regulations"][0]["status"], "GAP");
        assert_eq!(data["regulations"][0]["evidenceCount"], 0);
    }

    #[tokio::test]
    async fn summary_and_frameworks() {
        let schema = TestSchema::new();
        let query = r"
        {
            frameworks
            regulationSummary {
                coverageScore
                criticalGaps
                mappedControls
                totalRequirements
            }
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["frameworks"].as_array().unwrap().len(), 5);
        let summary = &data["regulationSummary"];
        assert_eq!(summary["coverageScore"], 75);
        assert_eq!(summary["criticalGaps"], 1);
        assert_eq!(summary["mappedControls"], 4);
        assert_eq!(summary["totalRequirements"], 6);
    }
}
