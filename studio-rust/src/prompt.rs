use crate::{AdminSettings, FunnelInput};

/// Fixed closing block describing the four sections the model must return.
pub const OUTPUT_INSTRUCTIONS: &str = "Generate the content in strict JSON format tailored for high conversion.
Include:
1. A Landing Page structure (Hero section, features, etc).
2. A sequence of 3 emails (Welcome, Nurture, Sales).
3. 2 Ad variants (Facebook/Instagram).
4. A brief strategy summary.";

/// Render the brief as labeled lines, one per field.
pub fn brief_lines(input: &FunnelInput) -> Vec<String> {
    vec![
        format!("Product Name: {}", input.product_name),
        format!("Target Audience: {}", input.target_audience),
        format!("Main Pain Points: {}", input.pain_points),
        format!("Key Benefits: {}", input.benefits),
        format!("Tone of Voice: {}", input.tone),
        format!("Language: {}", input.language.prompt_label()),
    ]
}

/// Base prompt, then the brief, then the output instructions, separated by
/// blank lines.
pub fn build_prompt(input: &FunnelInput, settings: &AdminSettings) -> String {
    [
        settings.base_prompt_template.trim_end().to_string(),
        brief_lines(input).join("\n"),
        OUTPUT_INSTRUCTIONS.to_string(),
    ]
    .join("\n\n")
}
