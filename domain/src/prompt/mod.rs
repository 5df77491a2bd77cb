//! Prompt templates for the workflow agent
//!
//! Pure string builders; the gateway adapters and tools fill them with
//! context and pass them to the model. Kept in the domain so infrastructure
//! adapters share one source of truth for wording and output schemas.

use serde_json::Value;

use crate::tool::metadata::ToolMetadata;

/// Templates for mediator decisions and tool-internal model calls
pub struct WorkflowPromptTemplate;

impl WorkflowPromptTemplate {
    /// System prompt for the model-backed mediator
    pub fn mediator_system() -> String {
        "You are the decision-maker for a social-content agent. Each turn you \
         are shown the run context and the available tools, and you decide the \
         single next action. Respond with exactly one JSON object and nothing \
         else."
            .to_string()
    }

    /// Per-step decide prompt: current context, tool metadata, and the
    /// instruction schema the model must emit.
    pub fn mediator_decide(context: &Value, tools: &[ToolMetadata]) -> String {
        let tool_lines = tools
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Given the current run context and the available tools, decide what the agent should do next.

## Run context

{context}

## Available tools

{tool_lines}

## Output schema

Return one JSON object, either a tool call:

{{"action": "call_tool", "tool": "research", "args": {{"field": "AI"}}}}

or completion:

{{"action": "done", "reason": "post scheduled"}}

Call each tool at most once unless its output is missing from the context. When the workflow is finished, return "done"."#,
            context = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string()),
            tool_lines = tool_lines,
        )
    }

    /// Extract top keywords from a profile's skills and experience
    pub fn profile_keywords(skills: &Value, experience: &Value) -> String {
        format!(
            r#"Analyze the user's profile and extract the top keywords from their skills and experience.

Skills: {skills}
Experience: {experience}

Only return the top keywords, no extra text."#
        )
    }

    /// Score a profile's posting activity on a 1-10 scale
    pub fn profile_activity_level(recent_post_time: Option<&str>, post_count: u64) -> String {
        format!(
            r#"Based on the user's recent activity, determine their posting activity level.

Recent Post Time: {recent}
Number of Posts: {post_count}

Activity level for recent post:
- (8 - 10): recent post within the last 7 days (high)
- (4 - 7): recent post within the last 14 days (medium)
- (1 - 3): no recent posts (low)

Activity level for number of posts:
- (8 - 10): more than 10 posts (high)
- (4 - 7): 5 to 10 posts (medium)
- (0 - 3): less than 5 posts (low)

Activity Level = 0.6 * [activity level for recent post] + 0.4 * [activity level for number of posts]

Only return the activity level, no extra text."#,
            recent = recent_post_time.unwrap_or("none"),
        )
    }

    /// Structured analysis of fetched trends; the model must answer in the
    /// JSON shape the research tool's output schema expects.
    pub fn trend_analysis(trends: &Value) -> String {
        format!(
            r#"You are an expert in analyzing trends. Given the following trend data, provide a comprehensive analysis:

Trend Details: {trends}

Return JSON in exactly this shape:

{{
  "future_growth_potential": "...",
  "high_engagement_accounts": "...",
  "potential_challenges_and_risks": "..."
}}"#
        )
    }

    /// Pick the single best trend for post creation
    pub fn trend_finalize(profile: &Value, analysis: &Value) -> String {
        format!(
            r#"You are a social media manager.
Based on the user's profile and trend analysis, select the best trend to use for post creation.

Here is the profile information:
{profile}

Here is the trend analysis:
{analysis}

Return only the best trend for post creation."#
        )
    }

    /// Draft the post text for the selected trend
    pub fn content_creation(trend: &str, analysis: &Value) -> String {
        format!(
            r#"You are a social media manager.
Based on the selected trend and analysis, create a social media post.

Here is the selected trend:
{trend}

Here is the analysis:
{analysis}

- Make sure the content is engaging and relevant to the audience.
- Use a conversational tone and include relevant hashtags.
- Make it concise and impactful.

Return only the textual content for the post."#
        )
    }
}
