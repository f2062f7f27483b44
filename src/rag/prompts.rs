//! Grounded-answer prompts

/// Exact reply the generator is told to give when context is insufficient
pub const REFUSAL_SENTENCE: &str =
    "The provided context does not contain enough information to answer this question.";

pub const RAG_SYSTEM_PROMPT: &str = "You are a helpful assistant.
You must answer ONLY using the provided context.
If the answer is not clearly supported by the context, say you do not have enough information.
Write in English.
";

pub fn build_rag_user_prompt(context: &str, question: &str) -> String {
    format!(
        r#"Context:
{context}

User question:
{question}

Instructions:
- Use ONLY the context above.
- If you use information from a specific excerpt, add its citation at the end of the sentence, e.g. [1].
- Keep the answer concise and factual.
- If the context is insufficient, reply with exactly:
  "{refusal}"
- Only answer if you can directly support the answer with citations like [1]. If you cannot provide citations, reply with exactly:
  "{refusal}"
"#,
        context = context,
        question = question,
        refusal = REFUSAL_SENTENCE,
    )
}
