//! Prompt assembly for the Gemini client
//!
//! Pure functions that turn domain requests into the text the model sees.
//! Kept separate from the HTTP code so the wording can be tested without a
//! server.

use crate::models::{
    ArchitectureStyle, ChatContext, CodeRequest, ErrorReport, GenerationSettings, ImageRequest,
    TypingStyle, Verbosity,
};
use gdforge_project::{FileKind, ProjectSnapshot};

/// Renders the whole project as fenced blocks for model context.
pub fn project_context(snapshot: &ProjectSnapshot) -> String {
    let mut parts = vec!["Project files:".to_string()];
    for file in snapshot.files() {
        let fence = match file.kind() {
            FileKind::Script => "gdscript",
            FileKind::Data => "json",
        };
        parts.push(format!("### {}\n```{}\n{}\n```", file.name, fence, file.content));
    }
    parts.join("\n\n")
}

/// Style directives derived from the generation settings.
fn style_directives(settings: &GenerationSettings) -> Vec<String> {
    let mut parts = Vec::new();

    parts.push(match settings.verbosity {
        Verbosity::Minimal => "Keep comments to the bare minimum.".to_string(),
        Verbosity::Standard => "Comment non-obvious sections briefly.".to_string(),
        Verbosity::Educational => {
            "Comment generously, explaining each step for a learner.".to_string()
        }
    });

    parts.push(match settings.typing {
        TypingStyle::Strict => {
            "Use typed GDScript: explicit parameter, return, and variable types.".to_string()
        }
        TypingStyle::Dynamic => "Use dynamic GDScript without type annotations.".to_string(),
    });

    match settings.architecture {
        ArchitectureStyle::Default => {}
        ArchitectureStyle::Composition => parts.push(
            "Favor composition: build behavior from small reusable nodes and resources."
                .to_string(),
        ),
        ArchitectureStyle::Inheritance => {
            parts.push("Favor inheritance: extend base classes to share behavior.".to_string())
        }
    }

    parts
}

/// The full prompt for a code generation request.
///
/// Ends with the response contract the client parses against: a single
/// JSON object carrying the replacement code and an explanation.
pub fn code_prompt(request: &CodeRequest) -> String {
    let target_name = request
        .snapshot
        .get(request.target)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "the current file".to_string());

    let mut parts = vec![
        "You are a senior GDScript engineer working inside the user's Godot project.".to_string(),
    ];
    parts.extend(style_directives(&request.settings));
    parts.push(String::new());
    parts.push(project_context(&request.snapshot));
    parts.push(String::new());
    parts.push(format!(
        "Rewrite `{}` to satisfy this request:\n{}",
        target_name, request.prompt
    ));
    parts.push(String::new());
    parts.push(
        "Respond with a single JSON object of the form \
         {\"code\": \"<complete new file content>\", \"explanation\": \"<what changed and why>\"} \
         and nothing else. No markdown fences around the JSON."
            .to_string(),
    );
    parts.join("\n")
}

/// The final user turn for a chat request: project context plus question.
///
/// Earlier transcript turns travel separately as structured history; only
/// the newest message carries the context block.
pub fn chat_turn(context: &ChatContext) -> String {
    let mut parts = vec![
        "You are a helpful Godot and GDScript development assistant.".to_string(),
        "Answer concisely and refer to the user's files by name when relevant.".to_string(),
        String::new(),
        project_context(&context.snapshot),
        String::new(),
    ];
    parts.push(format!("Question: {}", context.message));
    parts.join("\n")
}

/// The full prompt for a runtime error analysis request.
pub fn error_prompt(report: &ErrorReport) -> String {
    let mut parts = vec![
        "You are debugging a Godot project. The engine reported this error:".to_string(),
        String::new(),
        report.error_text.clone(),
        String::new(),
        format!("Content of `{}`:", report.file_name),
        format!("```gdscript\n{}\n```", report.file_content),
        String::new(),
        "Explain the likely cause in plain language, then suggest a concrete fix.".to_string(),
    ];
    if report.error_text.trim().is_empty() {
        parts.push("If no error text was provided, review the script for likely runtime problems.".to_string());
    }
    parts.join("\n")
}

/// The prompt for an image generation request.
pub fn image_prompt(request: &ImageRequest) -> String {
    let mut parts = vec![format!("Generate a 2D game asset image: {}", request.prompt)];
    parts.push(
        "Flat shading, clean silhouette, plain background, usable as a sprite.".to_string(),
    );
    if request.reference_image.is_some() {
        parts.push("Match the style of the attached reference image.".to_string());
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdforge_project::{create_file, ProjectSnapshot};

    fn two_file_snapshot() -> ProjectSnapshot {
        create_file(&ProjectSnapshot::starter(), "items.json").unwrap()
    }

    #[test]
    fn context_lists_every_file_with_matching_fences() {
        let context = project_context(&two_file_snapshot());
        assert!(context.contains("### main.gd"));
        assert!(context.contains("```gdscript"));
        assert!(context.contains("### items.json"));
        assert!(context.contains("```json"));
    }

    #[test]
    fn code_prompt_names_the_target_and_the_contract() {
        let snapshot = two_file_snapshot();
        let target = snapshot.files()[0].id;
        let request = CodeRequest {
            prompt: "add a jump".to_string(),
            snapshot,
            target,
            settings: GenerationSettings::default(),
        };

        let prompt = code_prompt(&request);
        assert!(prompt.contains("Rewrite `main.gd`"));
        assert!(prompt.contains("add a jump"));
        assert!(prompt.contains("\"code\""));
        assert!(prompt.contains("\"explanation\""));
    }

    #[test]
    fn code_prompt_varies_with_settings() {
        let snapshot = two_file_snapshot();
        let target = snapshot.files()[0].id;
        let mut request = CodeRequest {
            prompt: "add a jump".to_string(),
            snapshot,
            target,
            settings: GenerationSettings::default(),
        };

        request.settings.typing = TypingStyle::Dynamic;
        request.settings.verbosity = Verbosity::Educational;
        request.settings.architecture = ArchitectureStyle::Composition;
        let prompt = code_prompt(&request);

        assert!(prompt.contains("dynamic GDScript"));
        assert!(prompt.contains("explaining each step"));
        assert!(prompt.contains("Favor composition"));
        assert!(!prompt.contains("explicit parameter"));
    }

    #[test]
    fn chat_turn_carries_context_and_question() {
        let context = ChatContext {
            transcript: Vec::new(),
            message: "how do signals work?".to_string(),
            snapshot: two_file_snapshot(),
        };
        let turn = chat_turn(&context);
        assert!(turn.contains("### main.gd"));
        assert!(turn.contains("Question: how do signals work?"));
    }

    #[test]
    fn error_prompt_quotes_error_and_script() {
        let report = ErrorReport {
            error_text: "Invalid get index 'speed'".to_string(),
            file_name: "player.gd".to_string(),
            file_content: "extends Node\n".to_string(),
        };
        let prompt = error_prompt(&report);
        assert!(prompt.contains("Invalid get index 'speed'"));
        assert!(prompt.contains("Content of `player.gd`"));
        assert!(prompt.contains("extends Node"));
    }

    #[test]
    fn image_prompt_mentions_reference_only_when_present() {
        let bare = ImageRequest {
            prompt: "a red potion".to_string(),
            reference_image: None,
        };
        assert!(!image_prompt(&bare).contains("reference image"));

        let with_reference = ImageRequest {
            prompt: "a red potion".to_string(),
            reference_image: Some(vec![1, 2, 3]),
        };
        assert!(image_prompt(&with_reference).contains("reference image"));
    }
}
