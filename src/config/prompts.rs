//! Prompt templates for Svar.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for grounded answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You answer questions using only the provided context documents.

Guidelines:
- Base every statement on the context; do not use outside knowledge
- If the context does not contain the answer, say so explicitly
- Keep answers short and direct"#
                .to_string(),

            user: r#"{{context}}

Question: {{question}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Render a template, substituting `{{name}}` placeholders.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut rendered = template.to_string();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What color is the sky?".to_string());
        vars.insert("context".to_string(), "Doc 1".to_string());

        let rendered = Prompts::render(&RagPrompts::default().user, &vars);
        assert!(rendered.contains("Doc 1"));
        assert!(rendered.ends_with("Question: What color is the sky?"));
    }
}
