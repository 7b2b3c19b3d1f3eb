mod generator;
pub mod models;
pub mod parser;
pub mod prompt;

pub use generator::{BriefGenerator, RigBriefGenerator};
pub use models::{BriefRequest, PrepBrief};
pub use parser::parse_brief;
pub use prompt::build_prompt;

use crate::error::{config_error, PrepResult};
use tracing::{debug, info};

/// Validate the request, generate text and parse it into a brief.
///
/// Validation happens before the generator is touched, so a bad request
/// never costs an upstream call.
pub async fn prepare_brief(
    generator: Option<&dyn BriefGenerator>,
    request: &BriefRequest,
) -> PrepResult<PrepBrief> {
    request.validate()?;

    let generator =
        generator.ok_or_else(|| config_error("OpenAI API key not configured"))?;

    let prompt = build_prompt(request);
    debug!("Brief prompt is {} characters", prompt.len());

    let text = generator.complete(&prompt).await?;
    let brief = parse_brief(&text);
    info!(
        "Prepared brief for '{}' with {} questions",
        request.title,
        brief.suggested_questions.len()
    );

    Ok(brief)
}
