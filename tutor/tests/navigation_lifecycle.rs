use std::fs;

use tutor::core::invariants::{validate, validate_structure};
use tutor::core::progress::{completed_steps, tutorial_percent};
use tutor::engine::{Engine, JumpParams, ResetParams, StartParams};
use tutor::io::catalog::Catalog;
use tutor::io::content::ContentLoader;
use tutor::io::state_store::StateStore;
use tutor::test_support::TestEnv;
use tutor::tutorial::{Progress, State};

struct Session {
    env: TestEnv,
    store: StateStore,
    content: ContentLoader,
}

impl Session {
    fn new(env: TestEnv) -> Self {
        let store = StateStore::new(env.paths());
        let content = ContentLoader::new(Catalog::new(env.content.root()), 10);
        Self {
            env,
            store,
            content,
        }
    }

    fn engine(&mut self) -> Engine<'_> {
        Engine::new(&self.store, &mut self.content)
    }

    fn start(&mut self, name: &str) -> String {
        self.engine().start(&StartParams {
            tutorial_name: Some(name.to_string()),
        })
    }

    fn next(&mut self) -> String {
        self.engine().next()
    }

    fn jump(&mut self, tutorial: &str, lesson: Option<&str>, step: Option<&str>) -> String {
        self.engine().jump(&JumpParams {
            tutorial_name: tutorial.to_string(),
            lesson_name: lesson.map(str::to_string),
            step_name: step.map(str::to_string),
        })
    }

    fn state(&self) -> State {
        self.store.load_state().expect("load").expect("state")
    }

    fn raw_state(&self) -> String {
        fs::read_to_string(&self.env.paths().state_path).expect("read state")
    }

    fn assert_consistent(&self) {
        let state = self.state();
        assert!(validate_structure(&state).is_empty());
        for tutorial in &state.tutorials {
            let violations = validate(tutorial);
            assert!(violations.is_empty(), "{violations:?}");
        }
    }

    fn percent(&self, tutorial: &str) -> u8 {
        tutorial_percent(self.state().tutorial(tutorial).expect("tutorial"))
    }
}

fn three_lessons() -> TestEnv {
    let env = TestEnv::new();
    env.content.add_tutorial(
        "t3",
        1,
        &[
            ("l1", vec!["s1", "s2"]),
            ("l2", vec!["s1", "s2"]),
            ("l3", vec!["s1", "s2"]),
        ],
    );
    env
}

fn statuses(state: &State, tutorial: &str) -> Vec<Progress> {
    state
        .tutorial(tutorial)
        .expect("tutorial")
        .steps()
        .map(|step| step.status)
        .collect()
}

/// Verifies a full walk reports 0/25/50/75/100 and then stays put.
#[test]
fn walk_through_two_by_two_tutorial() {
    let mut session = Session::new(TestEnv::two_by_two());

    let text = session.start("t1");
    assert!(text.contains("📝 Step: a1 title (1/2)"));
    assert_eq!(session.percent("t1"), 0);
    session.assert_consistent();

    let text = session.next();
    assert!(text.starts_with("🎉 Great job completing \"a1 title\"!"));
    assert!(text.contains("📝 Step: b1 title (2/2)"));
    assert_eq!(session.percent("t1"), 25);

    let text = session.next();
    assert!(text.starts_with("🎉 Lesson Complete! You've finished \"l1 title\""));
    assert!(text.contains("📝 Step: a2 title (1/2)"));
    assert_eq!(session.percent("t1"), 50);
    session.assert_consistent();

    session.next();
    assert_eq!(session.percent("t1"), 75);

    let text = session.next();
    assert!(text.starts_with("🎉 Congratulations! You've completed \"t1 title\"!"));
    assert_eq!(session.percent("t1"), 100);
    let state = session.state();
    let t1 = state.tutorial("t1").expect("t1");
    assert_eq!(t1.status, Progress::Completed);
    assert!(t1.current_lesson.is_empty());
    session.assert_consistent();

    let before = session.raw_state();
    let text = session.next();
    assert!(text.starts_with("🎉 Congratulations!"));
    assert_eq!(session.raw_state(), before);
}

/// Verifies `status` never rewrites the stored state.
#[test]
fn status_is_read_only() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    session.next();

    let before = session.raw_state();
    let first = session.engine().status();
    let second = session.engine().status();
    assert_eq!(first, second);
    assert!(first.contains("🎯 Current: t1 title"));
    assert!(first.contains("📝 Step: b1 title (step 2 of 4)"));
    assert_eq!(session.raw_state(), before);
}

/// Verifies jumping deep completes everything before the target only.
#[test]
fn jump_completes_preceding_steps() {
    let mut session = Session::new(three_lessons());

    let text = session.jump("t3", Some("l3"), Some("s2"));
    assert!(text.starts_with("🎯 Jumped to: t3 title\n📘 Lesson 3: l3 title\n📝 Step 2/2: s2 title"));

    let state = session.state();
    assert_eq!(state.current_tutorial, "t3");
    let t3 = state.tutorial("t3").expect("t3");
    assert_eq!(t3.status, Progress::InProgress);
    assert_eq!(t3.current_lesson, "l3");
    assert_eq!(t3.lessons[0].status, Progress::Completed);
    assert_eq!(t3.lessons[1].status, Progress::Completed);
    assert_eq!(t3.lessons[2].status, Progress::InProgress);
    assert_eq!(t3.lessons[2].current_step, "s2");
    assert_eq!(
        statuses(&state, "t3"),
        vec![
            Progress::Completed,
            Progress::Completed,
            Progress::Completed,
            Progress::Completed,
            Progress::Completed,
            Progress::InProgress,
        ]
    );
    assert_eq!(completed_steps(t3), 5);
    session.assert_consistent();

    // Jumping back moves the pointer without undoing completion.
    session.jump("t3", Some("l1"), Some("s1"));
    let state = session.state();
    let t3 = state.tutorial("t3").expect("t3");
    assert_eq!(t3.current_lesson, "l1");
    assert_eq!(t3.lessons[0].steps[0].status, Progress::Completed);
    assert_eq!(completed_steps(t3), 5);
    session.assert_consistent();
}

/// Verifies reset needs explicit confirmation and then clears everything.
#[test]
fn reset_previews_then_clears() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    session.next();
    session.next();

    let before = session.raw_state();
    let preview = session.engine().reset(&ResetParams { confirm: None });
    assert!(preview.starts_with("⚠️ Reset All Tutorial Progress"));
    let declined = session.engine().reset(&ResetParams {
        confirm: Some(false),
    });
    assert_eq!(declined, preview);
    assert_eq!(session.raw_state(), before);

    let user_id = session.state().user_id;
    let text = session.engine().reset(&ResetParams {
        confirm: Some(true),
    });
    assert!(text.starts_with("✅ Tutorial progress has been reset successfully!"));

    let state = session.state();
    assert_eq!(state.user_id, user_id);
    assert!(state.current_tutorial.is_empty());
    let t1 = state.tutorial("t1").expect("t1");
    assert_eq!(t1.status, Progress::NotStarted);
    assert!(t1.current_lesson.is_empty());
    assert!(t1.lessons.iter().all(|lesson| lesson.current_step.is_empty()));
    assert!(statuses(&state, "t1").iter().all(|status| *status == Progress::NotStarted));
    session.assert_consistent();
}

/// Verifies a corrupt state file is replaced by a valid default.
#[test]
fn corrupt_state_is_regenerated() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    let user_id = session.state().user_id;

    fs::write(session.env.paths().state_path, "{\"version\": \"1.0.0\", \"state\": ").expect("corrupt");
    let text = session.engine().status();
    assert!(text.starts_with("📊 Tutorial Progress"));
    assert!(text.contains("No tutorial currently active."));

    let state = session.state();
    assert_eq!(state.user_id, user_id);
    assert!(statuses(&state, "t1").iter().all(|status| *status == Progress::NotStarted));
    session.assert_consistent();
}

/// Verifies missing step content leaves the stored position untouched.
#[test]
fn missing_content_does_not_advance() {
    let env = TestEnv::two_by_two();
    env.content.remove_step("t1", "l1", "b1");
    let mut session = Session::new(env);
    session.start("t1");

    let before = session.raw_state();
    let text = session.next();
    assert!(text.starts_with("❌ Content for step 'b1' in lesson 'l1'"));
    assert!(text.contains("- a1"));
    assert_eq!(session.raw_state(), before);

    let text = session.jump("t1", Some("l1"), Some("b1"));
    assert!(text.starts_with("❌ Content for step 'b1'"));
    assert_eq!(session.raw_state(), before);
}

/// Verifies step statuses never move backwards across navigation.
#[test]
fn progress_is_monotonic() {
    let mut session = Session::new(three_lessons());
    session.start("t3");
    let mut previous = statuses(&session.state(), "t3");

    let mut check = |session: &Session| {
        let current = statuses(&session.state(), "t3");
        for (before, after) in previous.iter().zip(&current) {
            assert!(after >= before, "{before:?} -> {after:?}");
        }
        session.assert_consistent();
        previous = current;
    };

    session.next();
    check(&session);
    session.jump("t3", Some("l2"), None);
    check(&session);
    session.jump("t3", None, None);
    check(&session);
    session.start("t3");
    check(&session);
    session.next();
    check(&session);
    session.jump("t3", Some("l3"), Some("s1"));
    check(&session);
}

/// Verifies navigation errors are answered without touching disk.
#[test]
fn invalid_jump_is_rejected_before_loading() {
    let mut session = Session::new(TestEnv::two_by_two());
    let text = session.jump("t1", None, Some("a1"));
    assert!(text.starts_with("❌ invalid navigation"));
    assert!(!session.env.paths().state_path.exists());

    let text = session.jump("nope", None, None);
    assert!(text.starts_with("❌ Tutorial \"nope\" not found."));
}

/// Verifies starting a finished tutorial offers options instead of replaying it.
#[test]
fn restarting_completed_tutorial_offers_review() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    for _ in 0..4 {
        session.next();
    }
    assert_eq!(session.percent("t1"), 100);

    let before = session.raw_state();
    let text = session.start("t1");
    assert!(text.starts_with("✅ Tutorial \"t1 title\" is already complete!"));
    assert!(text.contains("- Reset your progress"));
    assert!(!text.contains("### Step Content:"));
    assert_eq!(session.raw_state(), before);
}

/// Verifies the step after the new position is cached ahead of time.
#[test]
fn following_step_is_preloaded() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    let stats = session.content.stats();
    assert_eq!(stats.entries, 2);

    session
        .content
        .load_step_content("t1", "l1", "b1")
        .expect("preloaded");
    assert_eq!(session.content.stats().hits, stats.hits + 1);

    session.next();
    assert_eq!(session.content.stats().entries, 3);
    session.jump("t1", Some("l2"), Some("b2"));
    assert_eq!(session.content.stats().entries, 4);
}

/// Verifies `next` after jumping back to a finished step completes the
/// earliest unfinished step, not the reviewed one.
#[test]
fn next_after_review_jump_completes_first_unfinished_step() {
    let mut session = Session::new(TestEnv::two_by_two());
    session.start("t1");
    session.next();
    session.next();

    let text = session.jump("t1", Some("l1"), Some("a1"));
    assert!(text.starts_with("🎯 Jumped to: t1 title\n📘 Lesson 1: l1 title"));
    assert_eq!(session.state().tutorial("t1").expect("t1").current_lesson, "l1");

    let text = session.next();
    assert!(text.starts_with("🎉 Great job completing \"a2 title\"!"));
    assert!(text.contains("📝 Step: b2 title (2/2)"));
    let state = session.state();
    assert_eq!(
        statuses(&state, "t1"),
        vec![
            Progress::Completed,
            Progress::Completed,
            Progress::Completed,
            Progress::InProgress,
        ]
    );

    let text = session.next();
    assert!(text.starts_with("🎉 Congratulations!"));
    session.assert_consistent();
}
