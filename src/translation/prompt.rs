/*!
 * Prompt construction for batch translation.
 *
 * The prompt mandates the contract the reconciliation step depends on:
 * identical delimiter in the output, no commentary, strict order and count
 * preservation, and pass-through of segments that are not in the source
 * language.
 */

/// Template for a batch translation instruction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instruction for delimiter-joined batch translation.
    pub const BATCH_TRANSLATOR: &'static str = r#"Task: translate each segment of the following {source_language} text into {target_language}.
The segments are joined by the special delimiter `"{delimiter}"`.

Rules:
1. Join the translated segments with the exact same delimiter `"{delimiter}"`.
2. Do not add any preamble, explanation or extra characters beyond the translated segments and the delimiters.
3. If a segment is a number, foreign text, plain punctuation or otherwise not {source_language}, return that segment unchanged.
4. Keep the segments in exactly the same order as the source.
5. Return exactly {count} segments, the same number as the source.

{glossary_section}

---
Source segments:
"{payload}"

---
Translated segments:
"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self { template: template.to_string() }
    }

    /// Create the default batch translator template.
    pub fn batch_translator() -> Self {
        Self::new(Self::BATCH_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(
        &self,
        source_language: &str,
        target_language: &str,
        delimiter: &str,
        count: usize,
        glossary_section: &str,
        payload: &str,
    ) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .replace("{delimiter}", delimiter)
            .replace("{count}", &count.to_string())
            .replace("{glossary_section}", glossary_section)
            .replace("{payload}", payload)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::batch_translator()
    }
}

/// Builder for batch translation prompts.
#[derive(Debug, Clone)]
pub struct BatchPromptBuilder {
    source_language: String,
    target_language: String,
    template: PromptTemplate,
}

impl BatchPromptBuilder {
    /// Create a builder for a language pair, given display names
    /// (e.g. "Vietnamese", "Chinese").
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            template: PromptTemplate::batch_translator(),
        }
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Render the glossary block for a batch.
    ///
    /// An empty hint list still produces an explicit marker so the
    /// instruction block is always present and well formed.
    pub fn glossary_section(&self, hints: &[(&str, &str)]) -> String {
        if hints.is_empty() {
            return "Priority terms:\nNo special terms apply to this batch.".to_string();
        }

        let mut section = String::from(
            "Priority terms:\nAlways honor the following term mappings, preferring them over any other rendering:",
        );
        for (source, target) in hints {
            section.push_str(&format!("\n- \"{}\" must be translated as \"{}\"", source, target));
        }
        section
    }

    /// Build the full prompt for one batch.
    pub fn build(
        &self,
        payload: &str,
        delimiter: &str,
        count: usize,
        hints: &[(&str, &str)],
    ) -> String {
        let glossary_section = self.glossary_section(hints);
        self.template.render(
            &self.source_language,
            &self.target_language,
            delimiter,
            count,
            &glossary_section,
            payload,
        )
    }
}
