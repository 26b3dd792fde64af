//! The two front-end variants: a math tutor and a plain assistant.

use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;
use crate::render::Renderer;

/// Instruction sent with every tutor prompt so formulas come back as LaTeX.
pub const TUTOR_SYSTEM_INSTRUCTION: &str = "
You are an expert Math/Physics tutor.
1. CRITICAL: NEVER use code blocks (```) for math.
2. Use LaTeX with $ for inline math and $$ for block math.
3. Respond in professional Arabic.
";

/// Front-end variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Math & science tutor with a fixed system instruction and math rendering
    #[default]
    Tutor,
    /// General assistant, no preamble, plain output
    Basic,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Tutor => "tutor",
            Preset::Basic => "basic",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Preset::Tutor => "Math & Science AI Assistant",
            Preset::Basic => "My AI App",
        }
    }

    pub fn greeting(&self) -> Option<&'static str> {
        match self {
            Preset::Tutor => None,
            Preset::Basic => Some("Welcome! This app is powered by Gemini."),
        }
    }

    /// Label shown in front of the prompt input.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Preset::Tutor => "Type your problem here",
            Preset::Basic => "What do you want to ask me?",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Preset::Tutor => "gemini-1.5-pro",
            Preset::Basic => "gemini-pro",
        }
    }

    pub fn system_instruction(&self) -> Option<&'static str> {
        match self {
            Preset::Tutor => Some(TUTOR_SYSTEM_INSTRUCTION),
            Preset::Basic => None,
        }
    }

    pub fn renderer(&self) -> Renderer {
        match self {
            Preset::Tutor => Renderer::Math,
            Preset::Basic => Renderer::Plain,
        }
    }
}

impl FromStr for Preset {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tutor" => Ok(Preset::Tutor),
            "basic" => Ok(Preset::Basic),
            _ => Err(ChatError::InvalidRequest(format!("Unknown preset: {}", s))),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
