use std::sync::Arc;

use async_graphql::{Context, Object, Result};

use crate::catalog::{Catalog, PolicyDocument};

#[derive(Default)]
pub(super) struct PolicyQuery;

#[Object]
impl PolicyQuery {
    /// Policy documents, newest uploads first.
    ///
    /// `search` matches the title or owner, ignoring case.
    async fn policies(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
    ) -> Result<Vec<PolicyDocument>> {
        let catalog = ctx.data::<Arc<Catalog>>()?;
        Ok(catalog.policies(search.as_deref()).await)
    }
}
