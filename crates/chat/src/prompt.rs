//! Prompt template engine.
//!
//! Every response path has a fixed template skeleton with `{conversation}`,
//! `{context}`, and `{question}` placeholders plus a persona instruction
//! block. Composition fails loudly when a template requires an input the
//! caller did not provide — context is never silently omitted.

use newsdesk_core::event::AnsweredPath;
use newsdesk_core::{Error, EvidenceDocument, Persona, Result};

/// Which template a prompt is composed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPath {
    /// Answer grounded in retrieved articles
    Retrieval,
    /// General-knowledge answer, no retrieval attempted
    General,
    /// Retrieval ran but found nothing relevant
    NoEvidence,
    /// Greeting / acknowledgement / too short to classify
    ShortInput,
}

impl PromptPath {
    fn template(&self) -> &'static str {
        match self {
            PromptPath::Retrieval => RETRIEVAL_TEMPLATE,
            PromptPath::General => GENERAL_TEMPLATE,
            PromptPath::NoEvidence => NO_EVIDENCE_TEMPLATE,
            PromptPath::ShortInput => SHORT_INPUT_TEMPLATE,
        }
    }

    /// Placeholders this path's template requires from the caller.
    fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            PromptPath::Retrieval => &["conversation", "context", "question"],
            PromptPath::General
            | PromptPath::NoEvidence
            | PromptPath::ShortInput => &["conversation", "question"],
        }
    }

    /// The event-facing label for this path.
    pub fn as_answered(&self) -> AnsweredPath {
        match self {
            PromptPath::Retrieval => AnsweredPath::Retrieval,
            PromptPath::General => AnsweredPath::General,
            PromptPath::NoEvidence => AnsweredPath::NoEvidence,
            PromptPath::ShortInput => AnsweredPath::ShortInput,
        }
    }
}

const RETRIEVAL_TEMPLATE: &str = "\
{conversation}

{instructions}

Use the following articles to answer the user's question:

{context}

Question: {question}

Instructions:
- Summarize the most relevant information from the articles that answers the question.
- Only include information supported by the articles or by verified knowledge up to your knowledge cutoff.
- If multiple points are relevant, list them numerically.
- At the end of each point, invite the user to read more by providing the source URL.
- Ensure all information is accurate and verified.

Answer:";

const GENERAL_TEMPLATE: &str = "\
{conversation}

{instructions}

Instructions:
- Provide a clear and concise answer based on verified information up to your knowledge cutoff.
- Avoid including any information that you're not sure about.
- Do not mention future events or speculate about the future.
- Be informative and helpful, maintaining a friendly and professional tone.

User: {question}
Assistant:";

const NO_EVIDENCE_TEMPLATE: &str = "\
{conversation}

{instructions}

The user asked: \"{question}\"

Unfortunately, no relevant information was found in the latest articles.

Instructions:
- Provide a helpful answer based on your general knowledge up to your knowledge cutoff.
- Avoid mentioning any information beyond your knowledge cutoff.
- If the question is not related to technology or programming, politely refuse to answer and remind the user of your focus area.
- If the question is about recent events, inform the user that you don't have updated information.
- Offer assistance with other tech-related topics if appropriate.

Answer:";

const SHORT_INPUT_TEMPLATE: &str = "\
{conversation}

{instructions}

The user sent a very short message: \"{question}\"

Instructions:
- Reply briefly and warmly, as to a greeting or an acknowledgement.
- If the intent is unclear, ask which tech-news topic the user is interested in.
- Do not invent a question the user did not ask.

Assistant:";

const TECHNICAL_INSTRUCTIONS: &str = "\
You are a specialized tech assistant with expertise in technology, programming, and the tech industry. \
Use accurate and structured language, focusing on industry terminology and detail.
- Provide data, statistics, or references as appropriate.
- Use a professional tone and avoid oversimplifying unless prompted.
- Respond warmly to greetings or polite inquiries.
- Answer questions about past topics if relevant.
- Do not respond to unrelated topics (e.g., politics or entertainment); gently redirect these questions back to tech.
- For tech questions, deliver thorough, in-depth responses.";

const NON_TECHNICAL_INSTRUCTIONS: &str = "\
You are a friendly tech assistant who simplifies complex concepts related to technology and programming.
- Focus on main points without excessive technical jargon.
- Maintain a friendly and accessible tone.
- Use analogies or examples to help explain complex topics.
- Respond to greetings and casual questions politely.
- Avoid unrelated topics (e.g., politics, entertainment); gently redirect to tech.
- Provide concise answers to technology questions.";

/// Inputs available for substitution. `None` means the caller has no value
/// for that placeholder — composing a path that requires it is an error.
/// An empty string (e.g. no history yet) is a valid value.
#[derive(Debug, Default)]
pub struct PromptInputs<'a> {
    pub conversation: Option<&'a str>,
    pub context: Option<&'a str>,
    pub question: Option<&'a str>,
}

/// Caps on how much evidence text is folded into a prompt, so prompt size
/// stays bounded no matter what the index returns.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceFormat {
    /// Per-document cap on body text, in characters.
    pub max_doc_chars: usize,
    /// Cap on the whole evidence block, in characters.
    pub max_total_chars: usize,
}

impl Default for EvidenceFormat {
    fn default() -> Self {
        Self {
            max_doc_chars: 1000,
            max_total_chars: 6000,
        }
    }
}

impl EvidenceFormat {
    /// Render evidence documents into the numbered block the retrieval
    /// template expects. Documents past the total cap are dropped; body
    /// text past the per-document cap is cut with a trailing ellipsis.
    pub fn render(&self, documents: &[EvidenceDocument]) -> String {
        let mut out = String::new();

        for (i, doc) in documents.iter().enumerate() {
            let body = truncate_chars(&doc.text, self.max_doc_chars);
            let published = doc
                .published_at
                .map(|dt| format!(", published {}", dt.format("%Y-%m-%d")))
                .unwrap_or_default();

            let block = format!(
                "[{}] {}\n{}\n(Source: {}, {}{})\n",
                i + 1,
                doc.title,
                body,
                doc.source,
                doc.url,
                published,
            );

            if !out.is_empty() && out.len() + block.len() > self.max_total_chars {
                break;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&block);
        }

        out
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}

/// Composes fully-substituted prompts for one persona.
#[derive(Debug, Clone, Copy)]
pub struct PromptEngine {
    persona: Persona,
}

impl PromptEngine {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// The persona instruction block included verbatim in every prompt.
    pub fn instructions(&self) -> &'static str {
        match self.persona {
            Persona::Technical => TECHNICAL_INSTRUCTIONS,
            Persona::NonTechnical => NON_TECHNICAL_INSTRUCTIONS,
        }
    }

    /// Compose the prompt for `path` from `inputs`.
    ///
    /// Returns a validation error when a required input is absent or a
    /// placeholder would survive substitution.
    pub fn compose(&self, path: PromptPath, inputs: &PromptInputs<'_>) -> Result<String> {
        let mut prompt = path
            .template()
            .replace("{instructions}", self.instructions());

        for name in path.required_inputs() {
            let value = match *name {
                "conversation" => inputs.conversation,
                "context" => inputs.context,
                "question" => inputs.question,
                other => {
                    return Err(Error::Validation(format!(
                        "template references unknown placeholder {other:?}"
                    )));
                }
            };

            let value = value.ok_or_else(|| {
                Error::Validation(format!(
                    "missing required input {name:?} for {path:?} prompt"
                ))
            })?;

            prompt = prompt.replace(&format!("{{{name}}}"), value);
        }

        for name in ["conversation", "context", "question"] {
            if prompt.contains(&format!("{{{name}}}")) {
                return Err(Error::Validation(format!(
                    "placeholder {name:?} survived substitution for {path:?} prompt"
                )));
            }
        }

        Ok(prompt)
    }
}
