use async_graphql::{Context, Object, Result};

use crate::upload::{UploadForm, UploadStatus, Uploader};

#[derive(Default)]
pub(super) struct UploadQuery;

#[Object]
impl UploadQuery {
    async fn upload_status(&self, ctx: &Context<'_>) -> Result<UploadStatus> {
        let uploader = ctx.data::<Uploader>()?;
        Ok(uploader.status().await)
    }
}

#[derive(Default)]
pub(super) struct UploadMutation;

#[Object]
impl UploadMutation {
    /// Starts a simulated upload. The document is registered as a draft
    /// policy once every processing stage has passed.
    async fn start_upload(&self, ctx: &Context<'_>, input: UploadForm) -> Result<UploadStatus> {
        let uploader = ctx.data::<Uploader>()?;
        Ok(uploader.start(input).await?)
    }
}
