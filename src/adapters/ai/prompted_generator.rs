//! Prompted Generator - StatementGenerator backed by a chat completion model.
//!
//! Renders a [`GenerationContext`] into a single user prompt per mode, sends
//! it through an [`AIProvider`] and parses the reply. Batch replies must be a
//! JSON object `{"questions": [...]}`, optionally inside a code fence.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::AiConfig;
use crate::domain::interview::{ContextEntry, GenerationContext, GenerationMode};
use crate::ports::{
    AIProvider, CompletionRequest, GeneratedStatement, GenerationOutput, GeneratorError,
    MessageRole, RequestMetadata, StatementGenerator,
};

const NONE_PROVIDED: &str = "none";

/// Generator that prompts an LLM.
pub struct PromptedGenerator {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
    analysis_max_tokens: u32,
}

impl PromptedGenerator {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            analysis_max_tokens: 1000,
        }
    }

    /// Applies temperature and token settings from the `ai` config section.
    pub fn from_config(provider: Arc<dyn AIProvider>, config: &AiConfig) -> Self {
        Self::new(provider)
            .with_temperature(config.temperature)
            .with_analysis_max_tokens(config.analysis_max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_analysis_max_tokens(mut self, max_tokens: u32) -> Self {
        self.analysis_max_tokens = max_tokens;
        self
    }

    fn build_request(&self, context: &GenerationContext, mode: GenerationMode) -> CompletionRequest {
        let trace_id = match context.target_window {
            Some(window) => format!("{}:{}", mode, window),
            None => mode.to_string(),
        };
        let prompt = match mode {
            GenerationMode::Batch => batch_prompt(context),
            GenerationMode::Analysis => analysis_prompt(context),
            GenerationMode::Report => report_prompt(context),
        };

        let request = CompletionRequest::new(RequestMetadata::new(context.session_id, trace_id))
            .with_message(MessageRole::User, prompt)
            .with_temperature(self.temperature);

        match mode {
            GenerationMode::Analysis => request.with_max_tokens(self.analysis_max_tokens),
            _ => request,
        }
    }
}

#[async_trait]
impl StatementGenerator for PromptedGenerator {
    async fn generate(
        &self,
        context: &GenerationContext,
        mode: GenerationMode,
    ) -> Result<GenerationOutput, GeneratorError> {
        let request = self.build_request(context, mode);
        let response = self.provider.complete(request).await?;

        tracing::debug!(
            session_id = %context.session_id,
            %mode,
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            "Generation completed"
        );

        match mode {
            GenerationMode::Batch => parse_statements(&response.content).map(GenerationOutput::Statements),
            GenerationMode::Analysis | GenerationMode::Report => {
                let text = response.content.trim();
                if text.is_empty() {
                    return Err(GeneratorError::malformed(format!("empty {} text", mode)));
                }
                Ok(GenerationOutput::Text(text.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchReply {
    questions: Vec<GeneratedStatement>,
}

/// Parses a batch reply, tolerating code fences and surrounding prose.
fn parse_statements(content: &str) -> Result<Vec<GeneratedStatement>, GeneratorError> {
    let body = strip_code_fence(content.trim());
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(open), Some(close)) if open < close => &body[open..=close],
        _ => return Err(GeneratorError::malformed("no JSON object in reply")),
    };

    let reply: BatchReply = serde_json::from_str(json)
        .map_err(|e| GeneratorError::malformed(format!("invalid batch JSON: {}", e)))?;
    Ok(reply.questions)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn or_none(text: Option<&str>) -> &str {
    text.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(NONE_PROVIDED)
}

fn write_entry(out: &mut String, entry: &ContextEntry, label: &str) {
    out.push_str(&format!(
        "{}\nDetail: {}\nOptions: {}\n{}: {}",
        entry.statement,
        entry.detail,
        entry.options.join(" / "),
        label,
        entry.answer
    ));
}

fn history(entries: &[ContextEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("Q{}: ", entry.index));
        write_entry(&mut out, entry, "Answer");
    }
    out
}

fn batch_prompt(ctx: &GenerationContext) -> String {
    let qa = if ctx.entries.is_empty() {
        "No statements yet (this is the first batch).".to_string()
    } else {
        history(&ctx.entries)
    };
    let analyses = if ctx.prior_analyses.is_empty() {
        String::new()
    } else {
        let joined: Vec<&str> = ctx.prior_analyses.iter().map(|a| a.text.as_str()).collect();
        format!("## Analyses so far\n{}\n\n", joined.join("\n\n---\n\n"))
    };
    let target = match ctx.target_window {
        Some(w) => format!("Q{} to Q{} ({} items)", w.start, w.end, w.len()),
        None => "the next batch".to_string(),
    };

    format!(
        r#"You are an expert in guided self-reflection and in designing statements.
Write statements that help the user clarify their own stance and values.

## Purpose
{purpose}

## Background
{background}

## Statements and answers so far
{qa}

{analyses}## Current phase and guidance
{guidance}

## Items to generate
{target}

## Statement design
Write statements the user will most likely answer "yes" to, but avoid truisms.
Aim at contested ground: value conflicts, trade-offs, conditional agreement.
About two thirds should test your current hypothesis about the user; the rest
should explore a different angle or the opposite direction to expose boundaries.
- statement: one concise declarative sentence, never a question
- detail: one or two sentences of concrete context, referring to earlier answers when relevant

## Options
- exactly 5 options
- options[0] is always "yes"
- options[1] is always "don't know"
- options[2]: the most likely stance of someone who does not say yes
- options[3]: the second most likely, e.g. partial or conditional disagreement
- options[4]: an unlikely but coherent stance from a different angle
Options must be concrete and must not overlap.

## Output
Reply with JSON only, no commentary:
{{"questions": [{{"statement": "...", "detail": "...", "options": ["yes", "don't know", "...", "...", "..."]}}]}}"#,
        purpose = ctx.purpose,
        background = or_none(ctx.background.as_deref()),
        qa = qa,
        analyses = analyses,
        guidance = ctx.phase_guidance.as_deref().unwrap_or(NONE_PROVIDED),
        target = target,
    )
}

fn analysis_prompt(ctx: &GenerationContext) -> String {
    let previous = if ctx.prior_analyses.is_empty() {
        String::new()
    } else {
        let joined: Vec<&str> = ctx.prior_analyses.iter().map(|a| a.text.as_str()).collect();
        format!("## Previous analyses\n{}\n\n", joined.join("\n\n---\n\n"))
    };
    let window = ctx
        .target_window
        .map(|w| format!(" ({})", w))
        .unwrap_or_default();

    format!(
        r#"You are an empathetic, insightful reflection counsellor.
Analyse the user's answers and offer observations about their tendencies and values.

## Purpose
{purpose}

## Background
{background}

{previous}## Questions and answers to analyse{window}
{qa}

## Guidance
- In about 200 characters, describe the patterns these answers reveal
- Portray the user's values with empathy
- Treat contradictions and hesitation gently, as part of being human, never as faults

## Output
Plain text only, no JSON."#,
        purpose = ctx.purpose,
        background = or_none(ctx.background.as_deref()),
        previous = previous,
        window = window,
        qa = history(&ctx.entries),
    )
}

fn report_prompt(ctx: &GenerationContext) -> String {
    let instructions = match ctx.report_instructions.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("## Additional report instructions\n{}\n\n", text),
        _ => String::new(),
    };
    let analyses = ctx
        .prior_analyses
        .iter()
        .enumerate()
        .map(|(i, a)| format!("### Analysis {}\n{}", i + 1, a.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut qa = String::new();
    for (i, entry) in ctx.entries.iter().enumerate() {
        if i > 0 {
            qa.push_str("\n\n");
        }
        qa.push_str(&format!("[Q{}] ", entry.index));
        write_entry(&mut qa, entry, "Choice");
    }

    format!(
        r#"You are a reflection specialist with deep insight and empathy.
Using the user's {count} answers, write a detailed reflection report.

## Purpose
{purpose}

## Background
{background}

{instructions}## Interim analyses
{analyses}

## All questions and answers
{qa}

## Tone
Make the user feel understood. Offer new insight without judging or lecturing.

## Required structure
1. **Overview**: the user's current stance, phrased as observed tendencies
2. **Values and concerns**: 3-4 main values, each citing question numbers
3. **Hesitations and conflicts**: wavering or contradictory answers, framed as signs of depth
4. **Consistent options**: 3-5 concrete, actionable suggestions aligned with those values
5. **Summary**: encouragement and a restatement of the user's strengths

## Citations
Cite questions in square brackets, e.g. [12], and chain several as [12][34][56].

## Output
Markdown, using ## headings for each section."#,
        count = ctx.entries.len(),
        purpose = ctx.purpose,
        background = or_none(ctx.background.as_deref()),
        instructions = instructions,
        analyses = analyses,
        qa = qa,
    )
}
