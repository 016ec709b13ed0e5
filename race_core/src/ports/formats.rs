// competition format service port

use crate::CompetitionFormat;
use crate::ports::events::AdapterResult;
use async_trait::async_trait;

/// competition format catalog port trait
#[async_trait]
pub trait CompetitionFormatPort: Send + Sync {
    /// Look up a competition format by its unique name.
    async fn get_competition_format(&self, name: &str) -> AdapterResult<CompetitionFormat>;
}
