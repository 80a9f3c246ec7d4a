//! Integration tests for the reader engine.

mod common;

use std::time::Duration;

use apnatoon_audio::application::playback::{PlaybackOutcome, PlaybackState};
use apnatoon_core::error::EngineError;
use apnatoon_quiz::application::controller::{QuizStart, QuizStatus};
use apnatoon_story::application::session_controller::{SequelOutcome, TranslationOutcome};
use apnatoon_test_support::ScriptedGenerativeService;

use common::{PCM_B64, QUIZ_JSON, build_test_engine, fox_record, owl_record};

#[tokio::test]
async fn test_reading_session_round_trip() {
    let t = build_test_engine(
        ScriptedGenerativeService::new()
            .with_speech(PCM_B64, None)
            .with_text("एक चतुर लोमड़ी थी।"),
    );

    // Open a repository story and start narration.
    let id = t.engine.open_record(fox_record());
    assert_eq!(id.as_str(), "001");
    assert_eq!(t.engine.narrate().await.unwrap(), PlaybackOutcome::Started);
    assert_eq!(t.engine.playback_state(), PlaybackState::Playing);

    // Translate while narrating; narration is untouched.
    assert_eq!(
        t.engine.translate_toggle().await.unwrap(),
        TranslationOutcome::Translated
    );
    assert_eq!(t.engine.playback_state(), PlaybackState::Playing);
    let story = t.engine.current_story().unwrap();
    assert_eq!(story.text(), "एक चतुर लोमड़ी थी।");
    assert_eq!(story.styling.icon.as_deref(), Some("fox"));

    // Switching stories stops narration and shows untranslated text.
    t.engine.open_record(owl_record());
    assert_eq!(t.engine.playback_state(), PlaybackState::Idle);
    assert_eq!(t.output.live_count(), 0);
    let story = t.engine.current_story().unwrap();
    assert_eq!(story.title, "The Wise Owl");
    assert!(!story.is_translated());

    let types: Vec<_> = t
        .engine
        .drain_notices()
        .into_iter()
        .map(|n| n.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "narration.started",
            "narration.stopped",
            "story.opened",
            "story.translated",
            "story.opened",
        ]
    );
}

#[tokio::test]
async fn test_generated_story_opens_with_magic_metadata() {
    let t = build_test_engine(
        ScriptedGenerativeService::new().with_text("**The Moon Cat**\nA cat flew to the moon."),
    );

    let draft = t.engine.generate_story("a cat on the moon").await.unwrap();
    assert_eq!(draft.preview(), "The Moon Cat\nA cat flew to the moon.");
    let id = t.engine.open_draft(draft);

    let story = t.engine.current_story().unwrap();
    assert_eq!(story.id, id);
    assert!(id.as_str().starts_with("magic-"));
    assert_eq!(story.title, "The Moon Cat");
    assert_eq!(story.author, "Magic AI");
    assert_eq!(story.text(), "A cat flew to the moon.");
    assert!(!t.engine.is_generating());
}

#[tokio::test]
async fn test_sequel_chain_replaces_story_and_bounds_prompt() {
    let t = build_test_engine(
        ScriptedGenerativeService::new()
            .with_text("**The Clever Fox: Part 2**\nThe fox met a rabbit.")
            .with_text("**The Clever Fox: Part 3**\nThe rabbit met a bear."),
    );
    t.engine.open_record(fox_record());

    let first = t.engine.chain_sequel().await.unwrap();
    let second = t.engine.chain_sequel().await.unwrap();

    let story = t.engine.current_story().unwrap();
    assert_eq!(second, SequelOutcome::Opened(story.id.clone()));
    assert_ne!(first, second);
    assert_eq!(story.title, "The Clever Fox: Part 3");
    assert_eq!(story.category, "Animal Tales");
    for request in t.service.text_requests() {
        let apnatoon_core::service::GenerationRequest::Sequel { excerpt, .. } = request else {
            panic!("expected only sequel requests");
        };
        assert!(excerpt.chars().count() <= 100);
    }
}

#[tokio::test]
async fn test_failed_translation_surfaces_notice_and_keeps_text() {
    let t = build_test_engine(
        ScriptedGenerativeService::new()
            .with_text_error(EngineError::TransportFailure("offline".to_owned())),
    );
    t.engine.open_record(fox_record());
    t.engine.drain_notices();

    let result = t.engine.translate_toggle().await;

    assert!(matches!(result, Err(EngineError::TransportFailure(_))));
    assert_eq!(
        t.engine.current_story().unwrap().text(),
        "A fox lived in the woods.\nShe was very clever."
    );
    let notices = t.engine.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_failure());
    assert_eq!(notices[0].subject_id, "001");
}

#[tokio::test(start_paused = true)]
async fn test_quiz_over_translated_story() {
    let t = build_test_engine(
        ScriptedGenerativeService::new()
            .with_text("अनुवाद")
            .with_text(QUIZ_JSON),
    );
    t.engine.open_record(fox_record());
    t.engine.translate_toggle().await.unwrap();

    let started = t.engine.start_quiz().await.unwrap();
    for option in ["Fox", "Dog", "Cat"] {
        t.engine.answer_quiz(option);
        tokio::time::sleep(Duration::from_millis(1_001)).await;
    }

    assert_eq!(started, QuizStart::Ready(3));
    let requests = t.service.text_requests();
    let apnatoon_core::service::GenerationRequest::Quiz { text, question_count } = &requests[1]
    else {
        panic!("expected a quiz request");
    };
    assert_eq!(text, "अनुवाद");
    assert_eq!(*question_count, 3);
    let view = t.engine.quiz_view();
    assert_eq!(view.status, QuizStatus::Result);
    assert_eq!(view.score, 2);
}

#[tokio::test(start_paused = true)]
async fn test_opening_another_story_closes_the_quiz() {
    let t = build_test_engine(ScriptedGenerativeService::new().with_text(QUIZ_JSON));
    t.engine.open_record(fox_record());
    t.engine.start_quiz().await.unwrap();
    t.engine.answer_quiz("Fox");

    t.engine.open_record(owl_record());
    tokio::time::sleep(Duration::from_millis(2_000)).await;

    assert_eq!(t.engine.quiz_view().status, QuizStatus::Closed);
}

#[tokio::test]
async fn test_close_clears_story_and_quiz() {
    let t = build_test_engine(ScriptedGenerativeService::new().with_text("not json"));
    t.engine.open_record(fox_record());
    assert!(t.engine.start_quiz().await.is_err());
    assert_eq!(t.engine.quiz_view().status, QuizStatus::Errored);

    assert!(t.engine.close());

    assert!(t.engine.current_story().is_none());
    assert_eq!(t.engine.quiz_view().status, QuizStatus::Closed);
    assert!(matches!(
        t.engine.narrate().await,
        Err(EngineError::NoActiveStory)
    ));
}
