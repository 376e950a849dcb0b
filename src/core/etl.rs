use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs query → clear → header → transform → append, stopping at the
    /// first failure. Returns the number of data rows written.
    pub async fn run(&self) -> Result<usize> {
        tracing::info!("Starting conversion import.");

        let rows = self.pipeline.extract().await?;
        self.pipeline.prepare().await?;
        let output = self.pipeline.transform(rows).await?;
        let written = self.pipeline.load(output).await?;

        tracing::info!("✅ Done. {} conversion rows written.", written);
        Ok(written)
    }
}
