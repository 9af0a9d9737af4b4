use crate::{GeneratorError, GeneratorResult, MoveGenerator, SearchRequest};
use async_trait::async_trait;

/// Stand-in used when no engine executable was found at startup
#[derive(Debug, Default, Clone, Copy)]
pub struct AbsentGenerator;

#[async_trait]
impl MoveGenerator for AbsentGenerator {
    fn name(&self) -> &str {
        "absent"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn best_move(&self, _request: &SearchRequest) -> GeneratorResult<Option<String>> {
        Err(GeneratorError::Unavailable)
    }
}
