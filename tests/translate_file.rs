use docs_translate::synchronise::translate_file;
use docs_translate::translate::{
    translate_with_retry, MockTranslator, RetryPolicy, TranslateError,
};
use std::time::Duration;
use tempfile::tempdir;

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        backoff: 2,
        call_timeout: Duration::from_secs(5),
        rate_limit_pause: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn translate_file_normalises_then_writes_target() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("queues.md");
    let target = dir.path().join("queues.translated.md");
    std::fs::write(
        &source,
        "# Queues {#queues}\n\n> {note} Be careful\n\nLaravel {{ version }} docs.\n",
    )
    .unwrap();

    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .withf(|prompt, text| {
            prompt == "system prompt"
                && text.contains("Laravel 12.x docs.")
                && text.contains("> [!NOTE]")
                && !text.contains("{#queues}")
        })
        .times(1)
        .returning(|_, text| Ok(format!("translated:{text}")));

    let translated = translate_file(
        &source,
        &target,
        Some("12.x"),
        "system prompt",
        &translator,
        &fast_policy(),
    )
    .await
    .expect("translation should succeed");

    assert!(translated);
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("translated:# Queues\n"));
}

#[tokio::test]
async fn empty_source_is_skipped_without_calling_the_translator() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("empty.md");
    let target = dir.path().join("empty.translated.md");
    std::fs::write(&source, "   \n\n").unwrap();

    let mut translator = MockTranslator::new();
    translator.expect_translate().times(0);

    let translated = translate_file(
        &source,
        &target,
        None,
        "system prompt",
        &translator,
        &fast_policy(),
    )
    .await
    .expect("skip should not be an error");

    assert!(!translated);
    assert!(!target.exists());
}

#[tokio::test]
async fn retry_recovers_from_a_transient_failure() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(1)
        .returning(|_, _| Err(TranslateError::EmptyResponse));
    translator
        .expect_translate()
        .times(1)
        .returning(|_, _| Ok("second attempt".to_string()));

    let out = translate_with_retry(&translator, &fast_policy(), "p", "text")
        .await
        .expect("second attempt should succeed");
    assert_eq!(out, "second attempt");
}

#[tokio::test]
async fn retry_gives_up_after_max_attempts() {
    let mut translator = MockTranslator::new();
    translator
        .expect_translate()
        .times(3)
        .returning(|_, _| Err(TranslateError::EmptyResponse));

    let err = translate_with_retry(&translator, &fast_policy(), "p", "text")
        .await
        .expect_err("all attempts fail");
    assert!(matches!(err, TranslateError::EmptyResponse));
}
