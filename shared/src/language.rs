//! Language selection for nudge and recommendation text
//!
//! The core never fails on an unknown language code; it falls back to English.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Hi,
}

impl Language {
    /// Resolve a language code, falling back to English
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "es" => Language::Es,
            "hi" => Language::Hi,
            _ => Language::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Hi => "hi",
        }
    }

    /// Text shown alongside a reduced-plan recommendation
    pub fn reduced_plan_recommendation(&self) -> &'static str {
        match self {
            Language::En => "We're considering temporarily reducing daily tasks to help you get back on track.",
            Language::Es => "Consideramos reducir temporalmente tus tareas diarias para ayudarte a retomar el ritmo.",
            Language::Hi => "हम आपको फिर से शुरू करने में मदद के लिए अस्थायी रूप से दैनिक कार्यों को कम करने पर विचार कर रहे हैं।",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
