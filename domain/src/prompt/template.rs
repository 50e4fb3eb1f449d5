//! Prompt templates for the response and voting phases

/// Templates for generating prompts at each stage of a round
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt sent to every selected agent in the response phase
    pub fn task_prompt(description: &str, capabilities: &[String]) -> String {
        let mut prompt = format!(
            r#"You are one member of a council of independent agents answering the same task.
Your answer will be compared against the other members' answers and voted on.

Task:
{}
"#,
            description
        );

        if !capabilities.is_empty() {
            prompt.push_str(&format!(
                "\nRelevant expertise: {}\n",
                capabilities.join(", ")
            ));
        }

        prompt.push_str("\nProvide a clear, self-contained answer.");
        prompt
    }

    /// Prompt asking an agent to pick the best candidate answer.
    ///
    /// Candidates are labelled "Response 1", "Response 2", ... and the agent
    /// is asked for a 1-based `choice` plus a `confidence` from 1 to 10.
    pub fn ballot_prompt(description: &str, candidates: &[&str]) -> String {
        let mut prompt = format!(
            r#"The council answered the following task:

{}

Candidate answers:
"#,
            description
        );

        for (i, content) in candidates.iter().enumerate() {
            prompt.push_str(&format!("\n--- Response {} ---\n{}\n", i + 1, content));
        }

        prompt.push_str(&format!(
            r#"
Pick the single best response (1-{}) and rate your confidence from 1 to 10.

Respond with JSON only:
{{"choice": <number>, "confidence": <1-10>, "reasoning": "<one sentence>"}}"#,
            candidates.len()
        ));

        prompt
    }
}
