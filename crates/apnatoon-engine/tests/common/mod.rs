//! Shared test helpers for engine integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use apnatoon_core::config::EngineConfig;
use apnatoon_core::rng::SharedRng;
use apnatoon_engine::engine::ReaderEngine;
use apnatoon_engine::state::EngineState;
use apnatoon_story::domain::session::StoryRecord;
use apnatoon_test_support::{
    FixedClock, RecordingAudioOutput, ScriptedGenerativeService, SequenceRng, fixed_now,
};

/// Two PCM samples, base64 encoded.
pub const PCM_B64: &str = "AAEAAg==";

/// A valid three-question quiz wrapped the way the model sometimes wraps it.
pub const QUIZ_JSON: &str = r#"```json
[
  {"question": "Who was clever?", "options": ["Fox", "Owl", "Cat", "Dog"], "correctAnswer": "Fox"},
  {"question": "Who hooted?", "options": ["Fox", "Owl", "Cat", "Dog"], "correctAnswer": "Owl"},
  {"question": "Who purred?", "options": ["Fox", "Owl", "Cat", "Dog"], "correctAnswer": "Cat"}
]
```"#;

/// Everything a test needs to drive and observe an engine.
pub struct TestEngine {
    pub engine: ReaderEngine,
    pub service: Arc<ScriptedGenerativeService>,
    pub output: RecordingAudioOutput,
}

/// Build an engine over a scripted service with a fixed clock and
/// deterministic RNG.
pub fn build_test_engine(service: ScriptedGenerativeService) -> TestEngine {
    let service = Arc::new(service);
    let output = RecordingAudioOutput::new();
    let rng: SharedRng = Arc::new(Mutex::new(SequenceRng::new((1..=64).collect())));
    let state = EngineState::new(
        EngineConfig::default(),
        service.clone(),
        Arc::new(output.clone()),
        Arc::new(FixedClock(fixed_now())),
        rng,
    );
    TestEngine {
        engine: ReaderEngine::new(state),
        service,
        output,
    }
}

/// A repository story as the content repository serves it.
pub fn fox_record() -> StoryRecord {
    serde_json::from_value(serde_json::json!({
        "id": "001",
        "title": "The Clever Fox",
        "author": "Grandma",
        "category": "Animal Tales",
        "content": "A fox lived in the woods.\nShe was very clever.",
        "gradient": "from-orange-400 to-red-500",
        "accent": "bg-orange-100 text-orange-700",
        "readTime": "3 min",
        "iconType": "fox"
    }))
    .unwrap()
}

/// A second repository story.
pub fn owl_record() -> StoryRecord {
    serde_json::from_value(serde_json::json!({
        "id": "002",
        "title": "The Wise Owl",
        "author": "Grandpa",
        "category": "Birds",
        "content": "An owl lived in a tree."
    }))
    .unwrap()
}
