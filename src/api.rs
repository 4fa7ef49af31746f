mod chat;
mod dashboard;
mod policy;
mod regulation;
mod upload;

use std::{sync::Arc, time::Duration};

use async_graphql::{EmptySubscription, MergedObject};
use tokio::sync::Mutex;

use crate::{catalog::Catalog, llm::ModelClient, session::ChatSession, upload::Uploader};

/// A set of queries defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub(crate) struct Query(
    chat::ChatQuery,
    dashboard::DashboardQuery,
    policy::PolicyQuery,
    regulation::RegulationQuery,
    upload::UploadQuery,
);

/// A set of mutations defined in the schema.
///
/// This is exposed only for [`Schema`], and not used directly.
#[derive(Default, MergedObject)]
pub(crate) struct Mutation(chat::ChatMutation, upload::UploadMutation);

pub(crate) type Schema = async_graphql::Schema<Query, Mutation, EmptySubscription>;

/// Builds the schema around a fresh chat session and uploader.
pub(crate) fn schema(
    client: Arc<dyn ModelClient>,
    catalog: Arc<Catalog>,
    stage_delay: Duration,
) -> Schema {
    let uploader = Uploader::new(catalog.clone(), stage_delay);
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(client)
        .data(catalog)
        .data(Arc::new(Mutex::new(ChatSession::new())))
        .data(uploader)
        .finish()
}

#[cfg(test)]
struct TestSchema {
    catalog: Arc<Catalog>,
    schema: Schema,
}

#[cfg(test)]
impl TestSchema {
    const STAGE_DELAY: Duration = Duration::from_millis(1500);

    fn new() -> Self {
        Self::with_model(crate::session::tests::FakeModel::replying(|| {
            Ok(String::new())
        }))
    }

    fn with_model(model: impl ModelClient + 'static) -> Self {
        let catalog = Arc::new(Catalog::with_sample_data());
        let schema = schema(Arc::new(model), catalog.clone(), Self::STAGE_DELAY);
        Self { catalog, schema }
    }

    async fn execute(&self, query: &str) -> async_graphql::Response {
        let request: async_graphql::Request = query.into();
        self.schema.execute(request).await
    }
}
