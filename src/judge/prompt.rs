//! Judge prompts

/// System prompt instructing the scoring model
pub const JUDGE_SYSTEM_PROMPT: &str = r#"You are an expert evaluator of answers produced by a Retrieval-Augmented Generation (RAG) system.

You will receive:
- The user question
- The system answer
- The ideal/ground-truth answer (if provided)
- The retrieved context excerpts (numbered)

Score each dimension on a 0-1 scale (0 worst, 1 best).
Return ONLY valid JSON with this exact schema:
{
  "relevance": float,
  "correctness": float,
  "grounding": float,
  "completeness": float,
  "reasoning_quality": float,
  "overall": float,
  "explanation": string
}

Guidelines:
- relevance: Is it on-topic and answering the question?
- correctness: Factually correct vs ideal answer AND context.
- grounding: Uses ONLY the provided context, no hallucinations.
- completeness: Covers key aspects needed.
- reasoning_quality: Coherent, logically structured, cautious when uncertain.
- overall: single holistic score (not necessarily the mean).

If the context is insufficient, a good answer should say so.
"#;

/// Build the user turn for one judged answer
pub fn build_user_prompt(
    question: &str,
    answer: &str,
    context: &str,
    ideal_answer: Option<&str>,
) -> String {
    let ideal = ideal_answer.filter(|s| !s.is_empty()).unwrap_or("N/A");

    format!(
        "Question:\n{}\n\nSystem answer:\n{}\n\nIdeal answer (if available):\n{}\n\nRetrieved context excerpts:\n{}\n",
        question, answer, ideal, context
    )
}
