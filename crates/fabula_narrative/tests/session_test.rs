//! Tests for conversation sessions.

mod test_utils;

use std::sync::Arc;

use fabula_core::Role;
use fabula_error::{FabulaErrorKind, GeminiErrorKind, NarrativeErrorKind};
use fabula_narrative::{ConversationSession, FALLBACK_DESCRIPTION};
use test_utils::{LIGHTHOUSE_REPLY, MockResponse, MockStoryDriver, scene_reply, test_config};

#[tokio::test]
async fn test_start_returns_opening_scene() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_success(LIGHTHOUSE_REPLY));
    let mut session = ConversationSession::new(driver.clone(), &test_config());

    let scene = session.start("a haunted lighthouse").await?;

    assert_eq!(scene.description(), "You stand before a lighthouse.");
    assert_eq!(scene.choices(), &["Enter", "Leave", "Call out", "Wait"]);
    assert!(session.is_active());
    assert_eq!(driver.call_count(), 1);

    let request = &driver.requests()[0];
    let prompt = request.prompt().expect("prompt sent");
    assert_eq!(prompt.role, Role::User);
    assert!(prompt.text.starts_with(
        "Create an opening scene for a text adventure game. Theme: \"a haunted lighthouse\"."
    ));
    assert!(prompt.text.contains("Include exactly 4 choices"));
    Ok(())
}

#[tokio::test]
async fn test_blank_theme_uses_default() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_success(LIGHTHOUSE_REPLY));
    let mut session = ConversationSession::new(driver.clone(), &test_config());

    session.start("   ").await?;

    let prompt = driver.requests()[0].prompt().expect("prompt sent").text.clone();
    assert!(prompt.contains("Theme: \"a classic high fantasy quest\""));
    Ok(())
}

#[tokio::test]
async fn test_transcript_grows_one_exchange_per_step() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_sequence(vec![
        MockResponse::Success(LIGHTHOUSE_REPLY.to_string()),
        MockResponse::Success(scene_reply("The door creaks open.", &["Climb", "Descend"])),
    ]));
    let mut session = ConversationSession::new(driver.clone(), &test_config());

    session.start("a haunted lighthouse").await?;
    assert_eq!(session.transcript().len(), 2);

    let scene = session.advance("Enter").await?.expect("scene");
    assert_eq!(scene.description(), "The door creaks open.");
    assert_eq!(session.transcript().len(), 4);

    let roles: Vec<Role> = session.transcript().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Model, Role::User, Role::Model]);
    assert_eq!(session.transcript()[1].text, LIGHTHOUSE_REPLY);

    // The second request carries the first exchange as history.
    let second = &driver.requests()[1];
    assert_eq!(second.turns().len(), 3);
    assert_eq!(second.turns()[..2], session.transcript()[..2]);
    assert!(
        second.turns()[2]
            .text
            .starts_with("The player chose: \"Enter\". Continue the story")
    );
    Ok(())
}

#[tokio::test]
async fn test_advance_before_start_sends_nothing() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_success(LIGHTHOUSE_REPLY));
    let mut session = ConversationSession::new(driver.clone(), &test_config());

    let scene = session.advance("Enter").await?;

    assert!(scene.is_none());
    assert_eq!(driver.call_count(), 0);
    assert!(session.transcript().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_start_reports_start_failed() {
    let driver = Arc::new(MockStoryDriver::new_error(GeminiErrorKind::HttpError {
        status_code: 403,
        message: "API key not valid".to_string(),
    }));
    let mut session = ConversationSession::new(driver, &test_config());

    let err = session.start("a haunted lighthouse").await.unwrap_err();

    match err.kind() {
        FabulaErrorKind::Narrative(e) => match &e.kind {
            NarrativeErrorKind::StartFailed(message) => {
                assert!(message.contains("API key not valid"));
            }
            other => panic!("expected StartFailed, got {:?}", other),
        },
        other => panic!("expected narrative error, got {:?}", other),
    }
    assert!(!session.is_active());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_failed_advance_leaves_transcript_unchanged() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_sequence(vec![
        MockResponse::Success(LIGHTHOUSE_REPLY.to_string()),
        MockResponse::Error(GeminiErrorKind::HttpError {
            status_code: 429,
            message: "Resource exhausted".to_string(),
        }),
    ]));
    let mut session = ConversationSession::new(driver.clone(), &test_config());
    session.start("a haunted lighthouse").await?;

    let err = session.advance("Enter").await.unwrap_err();

    assert!(err.as_gemini().is_some());
    assert_eq!(session.transcript().len(), 2);
    assert!(session.is_active());
    Ok(())
}

#[tokio::test]
async fn test_malformed_reply_is_not_an_error() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_success(r#"{"description":"X","choices":[]}"#));
    let mut session = ConversationSession::new(driver, &test_config());

    let scene = session.start("anything").await?;

    assert_eq!(scene.description(), FALLBACK_DESCRIPTION);
    assert!(session.is_active());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_request_failed() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_sequence(vec![
        MockResponse::Success(LIGHTHOUSE_REPLY.to_string()),
        MockResponse::Hang,
    ]));
    let mut session = ConversationSession::new(driver, &test_config());
    session.start("a haunted lighthouse").await?;

    let err = session.advance("Enter").await.unwrap_err();

    match err.kind() {
        FabulaErrorKind::Narrative(e) => {
            assert!(matches!(e.kind, NarrativeErrorKind::RequestFailed(_)));
        }
        other => panic!("expected narrative error, got {:?}", other),
    }
    assert_eq!(session.transcript().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_restart_discards_transcript() -> anyhow::Result<()> {
    let driver = Arc::new(MockStoryDriver::new_success(LIGHTHOUSE_REPLY));
    let mut session = ConversationSession::new(driver.clone(), &test_config());

    session.start("first").await?;
    session.advance("Enter").await?;
    session.start("second").await?;

    assert_eq!(session.transcript().len(), 2);
    assert_eq!(driver.requests()[2].turns().len(), 1);
    Ok(())
}
