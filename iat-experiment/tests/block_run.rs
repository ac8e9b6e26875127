mod common;

use std::time::Duration;

use iat_experiment::{BlockCatalog, ExperimentConfig, Halt, run_block};
use iat_timing::ManualTimer;

use common::{FirstKey, ScriptedKeys, Shown, context, pool};

fn catalog() -> BlockCatalog {
    BlockCatalog::from_config(&ExperimentConfig::default())
}

#[test]
fn short_pool_runs_a_full_block_without_repeats() {
    let pool = pool(&[
        ("me", "Self"),
        ("mine", "Self"),
        ("myself", "Self"),
        ("they", "Other"),
        ("them", "Other"),
        ("theirs", "Other"),
    ]);
    let mut ctx = context(FirstKey::forever(), ManualTimer::new(), pool, 11);
    let spec = catalog().get(1).unwrap().clone();
    let mut rows = Vec::new();

    run_block(&mut ctx, &spec, &mut rows).unwrap();

    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.block_name == "SelfOther"));
    assert!(rows.windows(2).all(|w| w[0].content != w[1].content));
    assert!(rows.iter().all(|r| r.isi == 0.150));

    let shown = &ctx.screen.shown;
    assert_eq!(shown.first(), Some(&Shown::Anchors(true)));
    assert_eq!(shown.last(), Some(&Shown::Anchors(false)));
    assert_eq!(ctx.screen.count(|s| *s == Shown::Fixation), 20);
}

#[test]
fn wrong_first_answer_keeps_the_first_reaction_time() {
    let timer = ManualTimer::new();
    // Block 1 scores Self with the left key.
    let keys = ScriptedKeys::new(&timer, &[(400, Some("i")), (2000, Some("e"))]);
    let mut ctx = context(keys, timer.clone(), pool(&[("me", "Self")]), 3);
    let mut spec = catalog().get(1).unwrap().clone().with_trials(1);
    spec.selection.retain(|l| &**l == "Self");
    let mut rows = Vec::new();

    run_block(&mut ctx, &spec, &mut rows).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].correct_on_first_try);
    assert!((rows[0].reaction_time_secs - 0.4).abs() < 1e-9);
    assert_eq!(
        ctx.screen.shown,
        [
            Shown::Anchors(true),
            Shown::Stimulus("me".to_string()),
            Shown::Feedback,
            Shown::Stimulus("me".to_string()),
            Shown::Fixation,
            Shown::Anchors(false),
        ]
    );
    assert!((timer.slept().as_secs_f64() - 1.15).abs() < 1e-6);
}

#[test]
fn timeout_without_answer_scores_incorrect() {
    let timer = ManualTimer::new();
    let keys = ScriptedKeys::new(&timer, &[(3000, None), (100, Some("e"))]);
    let mut ctx = context(keys, timer.clone(), pool(&[("me", "Self")]), 3);
    ctx.settings.response_timeout = Some(Duration::from_secs(3));
    let mut spec = catalog().get(1).unwrap().clone().with_trials(1);
    spec.selection.retain(|l| &**l == "Self");
    let mut rows = Vec::new();

    run_block(&mut ctx, &spec, &mut rows).unwrap();

    assert!(!rows[0].correct_on_first_try);
    assert!((rows[0].reaction_time_secs - 3.0).abs() < 1e-9);
}

#[test]
fn abort_keeps_completed_rows_and_clears_anchors() {
    let timer = ManualTimer::new();
    let keys = ScriptedKeys::new(
        &timer,
        &[(300, Some("e")), (350, Some("e")), (500, Some("e"))],
    );
    let pool = pool(&[("me", "Self"), ("mine", "Self"), ("myself", "Self")]);
    let mut ctx = context(keys, timer, pool, 5);
    let mut spec = catalog().get(1).unwrap().clone().with_trials(6);
    spec.selection.retain(|l| &**l == "Self");
    let mut rows = Vec::new();

    let result = run_block(&mut ctx, &spec, &mut rows);

    assert!(matches!(result, Err(Halt::Abort)));
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.correct_on_first_try));
    assert_eq!(ctx.screen.shown.last(), Some(&Shown::Anchors(false)));
}
