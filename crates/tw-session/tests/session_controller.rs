//! Session controller behaviour against scripted and gated generators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use tw_core::{Character, Choice, ChoiceInput, StoryError, StoryPayload};
use tw_session::{
    ContinueRequest, GeneratorCall, GeneratorError, GeneratorResult, ScriptedGenerator,
    SessionError, SessionState, StoryGenerator, StoryScript, StorySession,
};

fn knight() -> Character {
    Character::new("Brave Knight", "Strong and honorable")
}

fn a_then_b() -> StoryScript {
    StoryScript::new(
        StoryPayload::new("A", vec![Choice::predefined(1, "go")]),
        vec![StoryPayload::new("B", vec![])],
    )
}

fn long_story() -> StoryScript {
    StoryScript::new(
        StoryPayload::new("A", vec![Choice::predefined(1, "go")]),
        vec![
            StoryPayload::new("B", vec![Choice::predefined(1, "on")]),
            StoryPayload::new("C", vec![Choice::predefined(1, "further")]),
            StoryPayload::new("D", vec![]),
        ],
    )
}

async fn start(script: StoryScript) -> (Arc<ScriptedGenerator>, StorySession) {
    let generator = Arc::new(ScriptedGenerator::new(script));
    let session = StorySession::start(generator.clone(), knight(), "en")
        .await
        .unwrap();
    (generator, session)
}

/// Holds every continuation until released.
struct GatedGenerator {
    release: Notify,
    calls: AtomicUsize,
    free: usize,
}

impl GatedGenerator {
    fn new() -> Self {
        Self::with_free_calls(0)
    }

    /// The first `free` continuations answer immediately.
    fn with_free_calls(free: usize) -> Self {
        Self {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            free,
        }
    }
}

#[async_trait]
impl StoryGenerator for GatedGenerator {
    async fn start_story(
        &self,
        _character: &Character,
        _language: &str,
    ) -> GeneratorResult<StoryPayload> {
        Ok(StoryPayload::new("A", vec![Choice::predefined(1, "go")]))
    }

    async fn continue_story(&self, request: &ContinueRequest) -> GeneratorResult<StoryPayload> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n > self.free {
            self.release.notified().await;
        }
        Ok(StoryPayload::new(
            format!("after {} (#{n})", request.choice_text),
            vec![Choice::predefined(1, "go")],
        ))
    }
}

async fn wait_until_submitting(session: &StorySession) {
    while !session.state().is_submitting() {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// start
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opening_step() {
    let (generator, session) = start(a_then_b()).await;

    assert_eq!(session.len(), 1);
    assert_eq!(session.current_index(), 0);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps[0].story_text, "A");
    assert!(snapshot.steps[0].selected_choice.is_none());
    assert_eq!(snapshot.state, SessionState::Idle);
    assert_eq!(
        generator.calls(),
        vec![GeneratorCall::Start {
            character: "Brave Knight".to_string(),
            language: "en".to_string(),
        }]
    );
}

// ---------------------------------------------------------------------------
// submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn choice_round_trip_reaches_ending() {
    let (generator, session) = start(a_then_b()).await;

    session
        .submit_choice(Choice::predefined(1, "go"))
        .await
        .unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps.len(), 2);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(
        snapshot.steps[0].selected_choice,
        Some(Choice::predefined(1, "go"))
    );
    assert!(snapshot.steps[1].choices.is_empty());
    assert_eq!(snapshot.state, SessionState::Idle);

    match &generator.calls()[1] {
        GeneratorCall::Continue(request) => {
            assert_eq!(request.choice_id, 1);
            assert_eq!(request.choice_text, "go");
            assert_eq!(request.prior_story_text, "A");
            assert!(!request.is_custom);
            assert_eq!(request.language, "en");
        }
        other => panic!("expected a continuation, got {other:?}"),
    }

    let err = session
        .submit(ChoiceInput::Custom("keep going".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Story(StoryError::StoryEnded));
    assert_eq!(generator.continue_calls(), 1);
}

#[tokio::test]
async fn custom_choice_is_normalized_before_sending() {
    let (generator, session) = start(a_then_b()).await;

    session
        .submit(ChoiceInput::Custom(" fight ".to_string()))
        .await
        .unwrap();

    let recorded = session.snapshot().steps[0].selected_choice.clone().unwrap();
    assert_eq!(recorded, Choice::custom("fight"));

    match &generator.calls()[1] {
        GeneratorCall::Continue(request) => {
            assert_eq!(request.choice_id, -1);
            assert_eq!(request.choice_text, "fight");
            assert!(request.is_custom);
        }
        other => panic!("expected a continuation, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_custom_choice_never_reaches_generator() {
    let (generator, session) = start(a_then_b()).await;

    let err = session
        .submit(ChoiceInput::Custom("   ".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Story(StoryError::EmptyChoice));
    assert_eq!(generator.continue_calls(), 0);
    assert!(session.snapshot().steps[0].selected_choice.is_none());
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn answered_step_rejects_second_choice() {
    let (generator, session) = start(long_story()).await;
    session.submit(ChoiceInput::ById(1)).await.unwrap();
    session.prev().unwrap();

    let err = session
        .submit_choice(Choice::custom("do it differently"))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Story(StoryError::AlreadyAnswered(0)));
    assert_eq!(generator.continue_calls(), 1);
    assert_eq!(
        session.snapshot().steps[0].selected_choice,
        Some(Choice::predefined(1, "go"))
    );
}

#[tokio::test]
async fn answered_step_wins_over_input_errors() {
    let (generator, session) = start(long_story()).await;
    session.submit(ChoiceInput::ById(1)).await.unwrap();
    session.prev().unwrap();

    let blank = session
        .submit(ChoiceInput::Custom("  ".to_string()))
        .await
        .unwrap_err();
    assert_eq!(blank, SessionError::Story(StoryError::AlreadyAnswered(0)));

    let unoffered = session.submit(ChoiceInput::ById(9)).await.unwrap_err();
    assert_eq!(unoffered, SessionError::Story(StoryError::AlreadyAnswered(0)));
    assert_eq!(generator.continue_calls(), 1);
}

#[tokio::test]
async fn submit_choice_validates_like_raw_input() {
    let (generator, session) = start(a_then_b()).await;

    let blank = session
        .submit_choice(Choice::custom("   "))
        .await
        .unwrap_err();
    assert_eq!(blank, SessionError::Story(StoryError::EmptyChoice));

    let forged = session
        .submit_choice(Choice::predefined(-7, "fly to the moon"))
        .await
        .unwrap_err();
    assert_eq!(forged, SessionError::Story(StoryError::NotOffered(-7)));

    let renamed = session
        .submit_choice(Choice::predefined(1, "go somewhere else"))
        .await
        .unwrap_err();
    assert_eq!(renamed, SessionError::Story(StoryError::NotOffered(1)));

    assert_eq!(generator.continue_calls(), 0);
    assert_eq!(session.snapshot().steps[0].selected_choice, None);
    assert_eq!(session.state(), SessionState::Idle);

    session
        .submit_choice(Choice::custom("  sneak past  "))
        .await
        .unwrap();
    assert_eq!(
        session.snapshot().steps[0].selected_choice,
        Some(Choice::custom("sneak past"))
    );
}

#[tokio::test]
async fn generator_failure_keeps_choice_and_fails_session() {
    let (generator, session) = start(a_then_b()).await;
    generator.fail_next(GeneratorError::Transport("connection refused".to_string()));

    let err = session.submit(ChoiceInput::ById(1)).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Generator(GeneratorError::Transport("connection refused".to_string()))
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps.len(), 1);
    assert_eq!(
        snapshot.steps[0].selected_choice,
        Some(Choice::predefined(1, "go"))
    );
    assert!(matches!(snapshot.state, SessionState::Failed { .. }));

    // Failed sessions refuse new choices until reset.
    let err = session.submit(ChoiceInput::ById(1)).await.unwrap_err();
    assert_eq!(err, SessionError::Busy);

    // After reset the step is still answered, so nothing can be resubmitted on it.
    session.reset().unwrap();
    let err = session.submit(ChoiceInput::ById(1)).await.unwrap_err();
    assert_eq!(err, SessionError::Story(StoryError::AlreadyAnswered(0)));
    assert_eq!(generator.continue_calls(), 1);
    assert_eq!(session.retry().await, Err(SessionError::NothingToRetry));
}

#[tokio::test]
async fn retry_resends_recorded_choice() {
    let (generator, session) = start(a_then_b()).await;
    generator.fail_next(GeneratorError::Status {
        status: 500,
        body: "model overloaded".to_string(),
    });

    session
        .submit(ChoiceInput::Custom("fight".to_string()))
        .await
        .unwrap_err();
    session.go_to(0).unwrap();
    session.retry().await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps.len(), 2);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.state, SessionState::Idle);

    let calls = generator.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1], calls[2]);
}

// ---------------------------------------------------------------------------
// concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_submission_while_submitting_is_busy() {
    let generator = Arc::new(GatedGenerator::new());
    let session = Arc::new(
        StorySession::start(generator.clone(), knight(), "en")
            .await
            .unwrap(),
    );

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(ChoiceInput::ById(1)).await })
    };
    wait_until_submitting(&session).await;

    let err = session
        .submit(ChoiceInput::Custom("run".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Busy);
    assert_eq!(session.len(), 1);
    assert_eq!(session.reset(), Err(SessionError::Busy));

    generator.release.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(session.len(), 2);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigation_while_submitting_lands_on_new_step() {
    let generator = Arc::new(GatedGenerator::with_free_calls(1));
    let session = Arc::new(
        StorySession::start(generator.clone(), knight(), "en")
            .await
            .unwrap(),
    );
    session.submit(ChoiceInput::ById(1)).await.unwrap();
    assert_eq!(session.current_index(), 1);

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(ChoiceInput::ById(1)).await })
    };
    wait_until_submitting(&session).await;

    assert_eq!(session.prev().unwrap(), 0);
    assert_eq!(session.next().unwrap(), 1);
    assert_eq!(session.go_to(0).unwrap(), 0);
    assert!(session.go_to(2).is_err());

    generator.release.notify_one();
    pending.await.unwrap().unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps.len(), 3);
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(snapshot.steps[2].story_text, "after go (#2)");
    assert_eq!(snapshot.state, SessionState::Idle);
}

#[tokio::test]
async fn response_after_fail_pending_is_discarded() {
    let generator = Arc::new(GatedGenerator::new());
    let session = Arc::new(
        StorySession::start(generator.clone(), knight(), "en")
            .await
            .unwrap(),
    );

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit(ChoiceInput::ById(1)).await })
    };
    wait_until_submitting(&session).await;

    assert!(session.fail_pending("deadline passed"));
    assert!(matches!(
        session.state(),
        SessionState::Failed {
            error: GeneratorError::TimedOut(_),
            step: 0
        }
    ));

    generator.release.notify_one();
    assert_eq!(pending.await.unwrap(), Err(SessionError::Abandoned));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.steps.len(), 1);
    assert!(snapshot.steps[0].selected_choice.is_some());
    assert!(matches!(snapshot.state, SessionState::Failed { .. }));
}

// ---------------------------------------------------------------------------
// navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn navigate_full_history() {
    let (generator, session) = start(long_story()).await;
    for _ in 0..3 {
        session.submit(ChoiceInput::ById(1)).await.unwrap();
    }
    assert_eq!(session.len(), 4);
    assert_eq!(session.current_index(), 3);

    assert!(matches!(
        session.next(),
        Err(SessionError::Story(StoryError::OutOfRange { index: 4, len: 4 }))
    ));
    session.go_to(0).unwrap();
    assert!(matches!(
        session.prev(),
        Err(SessionError::Story(StoryError::OutOfRange { index: -1, len: 4 }))
    ));

    // Revisiting an old step never erases the steps after it.
    session.next().unwrap();
    assert_eq!(session.len(), 4);
    assert_eq!(generator.continue_calls(), 3);
}
