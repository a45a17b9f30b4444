#![allow(dead_code)]

use copyfunnel_sdk::{sdk_test::MockLanguageModel, ModelResponse};
use copyfunnel_studio::{
    storage::{MemoryStorage, PersistenceStore},
    FunnelGenerator, FunnelInput, Language, Studio, Tone,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn funnel_json() -> Value {
    json!({
        "strategySummary": "Lead with the pain, close with scarcity.",
        "landingPage": {
            "headline": "Stop losing leads",
            "subheadline": "A funnel that converts while you sleep",
            "heroButton": "Start now",
            "features": ["Fast setup", "No code"],
            "testimonials": ["Doubled my sales"],
            "cta": "Get instant access"
        },
        "emails": [
            {"type": "welcome", "subject": "Welcome aboard", "body": "Hi there"},
            {"type": "nurture", "subject": "A quick story", "body": "Once upon a time"},
            {"type": "sales", "subject": "Last chance", "body": "Doors close tonight"}
        ],
        "ads": [
            {
                "platform": "Facebook",
                "primaryText": "Tired of cold leads?",
                "headline": "Warm leads on autopilot",
                "description": "Try it free"
            },
            {
                "platform": "Instagram",
                "primaryText": "Your funnel, done",
                "headline": "Launch this week",
                "description": "No code needed"
            }
        ]
    })
}

pub fn funnel_response() -> ModelResponse {
    ModelResponse::text(funnel_json().to_string())
}

pub fn brief() -> FunnelInput {
    FunnelInput {
        product_name: "X".to_string(),
        target_audience: "Y".to_string(),
        pain_points: "Z".to_string(),
        benefits: "W".to_string(),
        tone: Tone::Urgent,
        language: Language::En,
    }
}

/// A studio over a fresh in-memory store, with the mock it generates from.
pub fn memory_studio() -> (Studio, PersistenceStore, Arc<MockLanguageModel>) {
    let store = PersistenceStore::new(Arc::new(MemoryStorage::new()));
    let (studio, model) = studio_over(store.clone());
    (studio, store, model)
}

pub fn studio_over(store: PersistenceStore) -> (Studio, Arc<MockLanguageModel>) {
    let model = Arc::new(MockLanguageModel::new());
    let studio = Studio::open(store, FunnelGenerator::new(model.clone()));
    (studio, model)
}
