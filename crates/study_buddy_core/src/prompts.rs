//! crates/study_buddy_core/src/prompts.rs
//!
//! Prompt text and prompt assembly for every model-facing operation, plus the
//! keyword classifier that picks an answer depth from the user's phrasing.
//! Keeping these in one place makes the engines read as pure orchestration.

/// The tutor persona used for conversational answers. The formatting rules
/// matter: the frontend renders answers as markdown, and formula answers are
/// expected as a code block followed by a symbol legend.
pub const TUTOR_PERSONA: &str = r#"You are the AI Study Buddy, an expert tutor. Your primary goal is to help a user understand the provided context by explaining it clearly and conversationally.

**CRITICAL FORMATTING RULES:**
- Your entire response MUST use Markdown for all formatting.
- Use headings (`#`, `##`), bold (`**text**`), italics (`*text*`), and lists (`-`, `1.`) to structure your explanation logically.
- When explaining a formula, you MUST place the formula on its own line in a Markdown code block. On the lines immediately following, use a bulleted list to define what each symbol in the formula represents. For example:

The formula for kinetic energy is:
```
K = 1/2 * m * v^2
```
Where:
- `K` is the kinetic energy.
- `m` is the mass of the object.
- `v` is the velocity of the object.

- For sub-topics or nested ideas, use indented bullet points to show the hierarchy of information.

**TUTORING STYLE:**
You are an intelligent, helpful, and highly knowledgeable assistant.
You explain complex concepts clearly and thoroughly in a way that's easy for beginners to understand.
You adapt the level of detail based on how the user asks their question.
All explanations MUST be based *only* on the provided context below. If the answer is not in the context, clearly state that.
Always answer honestly and clearly. Use examples, analogies, or step-by-step reasoning when helpful.
If applicable, explain any relevant formulas or technical terms mentioned in the text."#;

/// Instruction for turning a follow-up question into a standalone one.
pub const REFORMULATE_INSTRUCTIONS: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can \
be understood without the chat history. Do NOT answer the question, just reformulate it if \
needed and otherwise return it as is.";

/// Instructions for the three-paragraph document summary.
pub const SUMMARY_INSTRUCTIONS: &str = "You are an intelligent and friendly assistant. Your \
task is to summarize the following content clearly and concisely, as if explaining it to \
someone who wants to quickly understand the main points.\n\nWrite a 3-paragraph summary that \
captures the key ideas: the main topic and purpose, the key points or arguments, and the \
overall conclusion or significance. If the content is technical, simplify it a little for \
better readability. Avoid sounding robotic.";

/// Instructions for quiz generation. The reply must be raw JSON in the
/// `Quiz` schema; validation of the parsed value happens in the engine.
pub const QUIZ_INSTRUCTIONS: &str = r#"You are a strict and intelligent quiz generation assistant. Your job is to create a high-quality, diverse 5-question multiple-choice quiz from the provided Source Text.

Your questions can be about anything - programming, biology, physics, law, history, etc. - depending on the content.

IMPORTANT RULES (MUST FOLLOW):
1. NO OUTSIDE KNOWLEDGE: Use ONLY what is in the Source Text. Do not invent code, formulas, scenarios, or facts that are not present.
2. STRICT GROUNDING: Every question, all answer choices, and explanations must be directly answerable from the text. Do not reference "the provided code" unless actual code appears in the Source Text.
3. DIVERSITY OF QUESTIONS: Include a variety of question types: definitions, cause-effect, reasoning, comparisons, structure, logic, etc.
4. ANSWERABLE QUESTIONS ONLY: Each question should have one correct answer that is clearly supported by the Source Text.
5. VALID FORMAT: Reply with nothing but a JSON object in exactly this shape:
{"questions": [{"question": "...", "options": ["...", "...", "...", "..."], "correct_answer": "...", "explanation": "..."}]}
There must be exactly 5 questions, each with exactly 4 options, and `correct_answer` must exactly match one of the `options`."#;

/// Instructions for flashcard generation. Exactly ten cards, raw JSON.
pub const FLASHCARD_INSTRUCTIONS: &str = r#"You are an expert educator specializing in creating effective study materials.
Based *only* on the provided text, identify the most important key terms, concepts, and definitions.
Generate a set of exactly 10 high-quality flashcards from this text.
Reply with nothing but a JSON object in exactly this shape:
{"flashcards": [{"term": "...", "definition": "..."}]}
`term` is the key term, concept, or name; `definition` is a clear and concise definition or explanation of it."#;

/// How much detail the user asked for, inferred from their phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerDepth {
    Detailed,
    Thorough,
    Concise,
}

impl AnswerDepth {
    /// Scans the original question (not the reformulated one) for depth
    /// keywords, case-insensitively. "Detailed" keywords win over "thorough"
    /// ones when both appear; anything unrecognized stays concise.
    pub fn classify(question: &str) -> Self {
        let q = question.to_lowercase();
        if ["in detail", "detailed", "elaborate"].iter().any(|kw| q.contains(kw)) {
            AnswerDepth::Detailed
        } else if ["in depth", "explain", "describe"].iter().any(|kw| q.contains(kw)) {
            AnswerDepth::Thorough
        } else {
            AnswerDepth::Concise
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            AnswerDepth::Detailed => {
                "The user has asked for detail. Give a long, detailed explanation: structure \
                 the answer with headings and break every major concept down step by step."
            }
            AnswerDepth::Thorough => {
                "Provide a thorough, multi-paragraph explanation. Use examples from the \
                 context where they help."
            }
            AnswerDepth::Concise => {
                "Keep the answer concise: two to four sentences, unless the question truly \
                 cannot be answered that briefly."
            }
        }
    }
}

/// Assembles the full system prompt for a grounded answer: persona, depth
/// instruction, then the retrieved context.
pub fn qa_system_prompt(depth: AnswerDepth, context: &str) -> String {
    format!(
        "{}\n\n{}\n\nCONTEXT:\n{}",
        TUTOR_PERSONA,
        depth.instruction(),
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_keywords_classify_as_detailed() {
        assert_eq!(AnswerDepth::classify("Explain photosynthesis in detail"), AnswerDepth::Detailed);
        assert_eq!(AnswerDepth::classify("Give me a DETAILED overview"), AnswerDepth::Detailed);
        assert_eq!(AnswerDepth::classify("elaborate on chapter two"), AnswerDepth::Detailed);
    }

    #[test]
    fn explain_and_describe_classify_as_thorough() {
        assert_eq!(AnswerDepth::classify("Explain photosynthesis"), AnswerDepth::Thorough);
        assert_eq!(AnswerDepth::classify("Describe the water cycle"), AnswerDepth::Thorough);
        assert_eq!(AnswerDepth::classify("cover this in depth please"), AnswerDepth::Thorough);
    }

    #[test]
    fn everything_else_stays_concise() {
        assert_eq!(AnswerDepth::classify("What is photosynthesis?"), AnswerDepth::Concise);
        assert_eq!(AnswerDepth::classify("tell me more"), AnswerDepth::Concise);
        assert_eq!(AnswerDepth::classify(""), AnswerDepth::Concise);
    }

    #[test]
    fn detailed_wins_when_both_families_match() {
        assert_eq!(AnswerDepth::classify("describe this in detail"), AnswerDepth::Detailed);
    }

    #[test]
    fn qa_prompt_contains_all_sections() {
        let prompt = qa_system_prompt(AnswerDepth::Concise, "chunk one\n\nchunk two");
        assert!(prompt.starts_with(TUTOR_PERSONA));
        assert!(prompt.contains(AnswerDepth::Concise.instruction()));
        assert!(prompt.ends_with("chunk one\n\nchunk two"));
    }
}
