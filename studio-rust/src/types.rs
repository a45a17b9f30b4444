use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Tone of voice requested for the copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Urgent,
    Friendly,
    Luxury,
}

impl Tone {
    pub const ALL: [Self; 4] = [Self::Professional, Self::Urgent, Self::Friendly, Self::Luxury];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Urgent => "urgent",
            Self::Friendly => "friendly",
            Self::Luxury => "luxury",
        }
    }
}

/// Output language of the generated copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::Es, Self::En];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// How the language is named inside the prompt.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::Es => "Spanish (Español)",
            Self::En => "English",
        }
    }

    /// Human readable name, in the language itself.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Es => "Español",
            Self::En => "English",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text value that does not name any variant of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} '{value}', expected one of: {expected}")]
pub struct InvalidFieldValue {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_variant<T: Copy>(
    field: &'static str,
    value: &str,
    variants: &[T],
    name: fn(T) -> &'static str,
) -> Result<T, InvalidFieldValue> {
    let needle = value.trim().to_ascii_lowercase();
    variants
        .iter()
        .copied()
        .find(|variant| name(*variant) == needle)
        .ok_or_else(|| InvalidFieldValue {
            field,
            value: value.to_string(),
            expected: variants
                .iter()
                .map(|variant| name(*variant))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

impl FromStr for Tone {
    type Err = InvalidFieldValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("tone", s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for Language {
    type Err = InvalidFieldValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("language", s, &Self::ALL, Self::as_str)
    }
}

/// The product brief a user submits. Embedded verbatim into generated
/// funnels and templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FunnelInput {
    pub product_name: String,
    pub target_audience: String,
    pub pain_points: String,
    pub benefits: String,
    pub tone: Tone,
    pub language: Language,
}

/// A saved, reusable brief.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub data: FunnelInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageCopy {
    pub headline: String,
    pub subheadline: String,
    pub hero_button: String,
    pub features: Vec<String>,
    pub testimonials: Vec<String>,
    pub cta: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Welcome,
    Nurture,
    Sales,
}

impl EmailType {
    pub const ALL: [Self; 3] = [Self::Welcome, Self::Nurture, Self::Sales];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Nurture => "nurture",
            Self::Sales => "sales",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailCopy {
    #[serde(rename = "type")]
    pub kind: EmailType,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdCopy {
    /// Free text, usually Facebook, Instagram or LinkedIn.
    pub platform: String,
    pub primary_text: String,
    pub headline: String,
    pub description: String,
}

/// The part of a funnel written by the model, before it is stamped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelCopy {
    pub strategy_summary: String,
    pub landing_page: LandingPageCopy,
    pub emails: Vec<EmailCopy>,
    pub ads: Vec<AdCopy>,
}

/// A funnel produced by one successful generation. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFunnel {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub input: FunnelInput,
    pub strategy_summary: String,
    pub landing_page: LandingPageCopy,
    pub emails: Vec<EmailCopy>,
    pub ads: Vec<AdCopy>,
}

impl GeneratedFunnel {
    /// Attach identity, timestamp and the originating brief to model output.
    pub fn stamp(copy: FunnelCopy, input: FunnelInput, created_at: DateTime<Utc>) -> Self {
        let FunnelCopy {
            strategy_summary,
            landing_page,
            emails,
            ads,
        } = copy;
        Self {
            id: new_id(),
            created_at,
            input,
            strategy_summary,
            landing_page,
            emails,
            ads,
        }
    }
}

/// Fresh random identifier for funnels and templates.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
