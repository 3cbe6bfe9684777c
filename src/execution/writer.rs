//! Writer step - turn research into a cited HTML article

use crate::{
    agent::TextGenerator,
    core::{PipelineState, Researched},
    execution::PipelineError,
};
use tracing::{debug, error, info};

/// Inline style applied to the lead image
pub const IMAGE_STYLE: &str = "width:100%; border-radius:10px; margin-bottom: 20px;";

/// Prompts the text generator once per run
pub struct WriterStep<G> {
    generator: G,
}

impl<G: TextGenerator> WriterStep<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Generate the article for a researched run
    ///
    /// The model output is returned exactly as received.
    pub async fn write(&self, state: &PipelineState<Researched>) -> Result<String, PipelineError> {
        info!("Writing article: {}", state.brief().topic);

        let prompt = build_prompt(state);
        debug!("Writer prompt: {} bytes", prompt.len());

        let article = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Generation failed for {}: {}", state.brief().topic, e);
            PipelineError::GenerationFailed { source: e }
        })?;

        debug!("Writer returned {} bytes", article.len());
        Ok(article)
    }
}

/// The image element the article must open with
pub fn lead_image_tag(image_url: &str) -> String {
    format!("<img src=\"{}\" style=\"{}\" />", image_url, IMAGE_STYLE)
}

/// Research blocks labelled with the citation number of their source
///
/// Blocks are numbered rather than lines, since a snippet may span
/// several lines.
pub fn numbered_research(snippets: &[String]) -> String {
    snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| format!("[{}] {}", i + 1, snippet.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the single generation prompt for a researched run
pub fn build_prompt(state: &PipelineState<Researched>) -> String {
    let brief = state.brief();
    format!(
        r#"You are a senior journalist writing for a {audience} audience.

**Assignment Brief:**
- Topic: {topic}
- Angle/Thesis: {angle}
- Tone: {tone}
- Target Word Count: {word_count} words

**Research Data (Use this strictly; each block starts with its source number):**
{research}

**Requirements:**
1. **Format:** Return clean HTML only. Do not wrap it in markdown code fences (```html) or any other wrapper.
2. **Image:** Start EXACTLY with this tag: {image_tag}
3. **Structure:** Use a single <h1> for the main headline, <h2> for sections, <p> for paragraphs.
4. **Citations:** You MUST use inline citations like [1], [2] next to facts. Cite the number of the research block a fact came from, from [1] up to [{source_count}]. Never invent other numbers.
5. **Style:** Write in a {tone} voice.
"#,
        audience = brief.audience,
        topic = brief.topic,
        angle = brief.angle,
        tone = brief.tone,
        word_count = brief.word_count,
        research = numbered_research(state.snippets()),
        image_tag = lead_image_tag(state.image_url()),
        source_count = state.sources().len(),
    )
}
