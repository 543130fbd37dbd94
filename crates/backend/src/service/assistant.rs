//! Free-form assistant replies grounded in the knowledge base.

use llm::prompts::{ASSISTANT_FALLBACK_REPLY, build_assistant_prompt};
use tracing::{debug, warn};

use super::SynthesisContext;
use crate::PipelineError;

const ASSISTANT_CONTEXT_MATCHES: usize = 3;

/// Answer `question` using retrieved context
///
/// A failed generative call yields the fixed capability reply rather than an
/// error. Only a blank question is rejected.
pub async fn reply(ctx: &SynthesisContext<'_>, question: &str) -> Result<String, PipelineError> {
  let question = question.trim();
  if question.is_empty() {
    return Err(PipelineError::EmptyInput("the question is empty"));
  }

  let context = ctx
    .context(question, ASSISTANT_CONTEXT_MATCHES, "\n\n")
    .await
    .unwrap_or_default();

  let request = ctx.request(build_assistant_prompt(&context, question));
  match ctx.provider.infer(request).await {
    Ok(response) if !response.text.trim().is_empty() => {
      debug!(reply_len = response.text.len(), "Assistant replied");
      Ok(response.text.trim().to_string())
    }
    Ok(_) => {
      warn!(provider = ctx.provider.name(), "Empty assistant reply, using fallback");
      Ok(ASSISTANT_FALLBACK_REPLY.to_string())
    }
    Err(e) => {
      warn!(err = %e, provider = ctx.provider.name(), "Assistant call failed, using fallback");
      Ok(ASSISTANT_FALLBACK_REPLY.to_string())
    }
  }
}
