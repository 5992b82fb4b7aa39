//! Navigation operations: `start`, `next`, `status`, `jump` and `reset`.
//!
//! Every operation returns one block of text. Domain failures become guidance
//! text here and never cross the outer boundary as errors.

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::format;
use crate::core::progress;
use crate::core::selector::{self, StepRef};
use crate::core::state_update;
use crate::error::{Result, TutorError};
use crate::io::content::ContentLoader;
use crate::io::state_store::StateStore;
use crate::tutorial::{State, Tutorial};

/// Parameters for `start`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StartParams {
    /// Tutorial name or its 1-based position in the listing.
    pub tutorial_name: Option<String>,
}

/// Parameters for `jump`. `step_name` requires `lesson_name`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JumpParams {
    pub tutorial_name: String,
    #[serde(default)]
    pub lesson_name: Option<String>,
    #[serde(default)]
    pub step_name: Option<String>,
}

/// Parameters for `reset`; anything but an explicit `true` only previews.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetParams {
    pub confirm: Option<bool>,
}

/// Owned `(lesson, step)` names, detached from any borrowed state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    lesson: String,
    step: String,
}

impl Target {
    fn of(found: &StepRef<'_>) -> Self {
        Self {
            lesson: found.lesson.name.clone(),
            step: found.step.name.clone(),
        }
    }

    fn resolve<'t>(&self, tutorial: &'t Tutorial) -> Result<StepRef<'t>> {
        selector::locate(tutorial, &self.lesson, &self.step).ok_or_else(|| {
            TutorError::StepNotFound {
                lesson: self.lesson.clone(),
                step: self.step.clone(),
            }
        })
    }
}

pub struct Engine<'a> {
    store: &'a StateStore,
    content: &'a mut ContentLoader,
}

impl<'a> Engine<'a> {
    pub fn new(store: &'a StateStore, content: &'a mut ContentLoader) -> Self {
        Self { store, content }
    }

    pub fn start(&mut self, params: &StartParams) -> String {
        self.try_start(params).unwrap_or_else(|err| format::error(&err))
    }

    pub fn next(&mut self) -> String {
        self.try_next().unwrap_or_else(|err| format::error(&err))
    }

    pub fn status(&mut self) -> String {
        self.try_status().unwrap_or_else(|err| format::error(&err))
    }

    pub fn jump(&mut self, params: &JumpParams) -> String {
        self.try_jump(params).unwrap_or_else(|err| format::error(&err))
    }

    pub fn reset(&mut self, params: &ResetParams) -> String {
        self.try_reset(params).unwrap_or_else(|err| format::error(&err))
    }

    pub(crate) fn store(&self) -> &StateStore {
        self.store
    }

    pub(crate) fn content(&mut self) -> &mut ContentLoader {
        &mut *self.content
    }

    fn try_start(&mut self, params: &StartParams) -> Result<String> {
        let state = self.store.load_or_initialize()?;
        let requested = params
            .tutorial_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let Some(requested) = requested else {
            return Ok(format::welcome(&state));
        };
        let Some(tutorial) = find_tutorial(&state, requested) else {
            return Ok(format::tutorial_not_found(requested, &state.tutorial_names()));
        };
        if tutorial.status.is_completed() {
            return Ok(format::already_complete(tutorial));
        }
        let Some(found) = selector::current_step(tutorial) else {
            return Ok(format!("❌ No steps found in tutorial \"{}\".", tutorial.title));
        };

        let wrapped = match self.content.load_and_wrap(tutorial, &found) {
            Ok(wrapped) => wrapped,
            Err(TutorError::ContentNotFound { .. }) => {
                return Ok(format::content_not_found(&found, tutorial));
            }
            Err(err) => return Err(err),
        };
        let banner = format::start_banner(tutorial, tutorial.status);
        let target = Target::of(&found);
        let name = tutorial.name.clone();

        info!(tutorial = %name, lesson = %target.lesson, step = %target.step, "starting tutorial");
        let updated = self
            .store
            .update_progress(&name, &target.lesson, &target.step)?;
        self.preload_after(&updated, &name, &target);
        Ok(format!("{banner}\n\n{wrapped}"))
    }

    fn try_next(&mut self) -> Result<String> {
        let Some(state) = self.store.load_state()? else {
            return Ok(format::no_state());
        };
        let Some(tutorial) = state.active_tutorial() else {
            return Ok(format::no_active_tutorial());
        };
        if tutorial.status.is_completed() {
            return Ok(format::tutorial_completion(tutorial));
        }
        // A pointer left on a completed step (after jumping back to review)
        // is stale: `next` completes the first unfinished step instead.
        let Some(current) = selector::current_step(tutorial) else {
            return Ok(format::tutorial_completion(tutorial));
        };
        let name = tutorial.name.clone();
        let completed = Target::of(&current);
        let completed_title = current.step.title.clone();
        let completed_lesson_title = current.lesson.title.clone();

        // Resolve the follow-up step against the tree as it will look once the
        // current step is completed.
        let mut projected = state.clone();
        state_update::mark_completed(&mut projected, &name, &completed.lesson, &completed.step)?;
        let projected_tutorial = projected
            .tutorial(&name)
            .ok_or_else(|| TutorError::TutorialNotFound { name: name.clone() })?;
        let following = selector::next_unfinished_after(
            projected_tutorial,
            &completed.lesson,
            &completed.step,
        )
        .or_else(|| selector::next_step(projected_tutorial))
        .map(|found| Target::of(&found));

        let Some(following) = following else {
            info!(tutorial = %name, "final step completed");
            let (updated, _) =
                self.store
                    .mark_completed(&name, &completed.lesson, &completed.step)?;
            let finished = updated
                .tutorial(&name)
                .ok_or_else(|| TutorError::TutorialNotFound { name: name.clone() })?;
            return Ok(format::tutorial_completion(finished));
        };

        // Content first: a missing file must not advance the stored position.
        let next_ref = following.resolve(projected_tutorial)?;
        let wrapped = match self.content.load_and_wrap(projected_tutorial, &next_ref) {
            Ok(wrapped) => wrapped,
            Err(TutorError::ContentNotFound { .. }) => {
                return Ok(format::content_not_found(&next_ref, projected_tutorial));
            }
            Err(err) => return Err(err),
        };

        debug!(
            tutorial = %name,
            from = %format!("{}/{}", completed.lesson, completed.step),
            to = %format!("{}/{}", following.lesson, following.step),
            "advancing"
        );
        self.store
            .mark_completed(&name, &completed.lesson, &completed.step)?;
        let updated = self
            .store
            .update_progress(&name, &following.lesson, &following.step)?;
        let tutorial = updated
            .tutorial(&name)
            .ok_or_else(|| TutorError::TutorialNotFound { name: name.clone() })?;
        let next_ref = following.resolve(tutorial)?;

        let mut response = String::new();
        if following.lesson != completed.lesson {
            response.push_str(&format::lesson_completion(&completed_lesson_title, tutorial));
            response.push_str("\n\n");
        }
        response.push_str(&format::step_completion(&completed_title, tutorial, &next_ref));
        response.push_str("\n\n");
        response.push_str(&wrapped);
        self.preload_after(&updated, &name, &following);
        Ok(response)
    }

    fn try_status(&mut self) -> Result<String> {
        match self.store.load_state()? {
            Some(state) => Ok(format::status_overview(&state)),
            None => Ok(
                "📊 Tutorial Progress\n\nNo tutorial progress yet. Ask me to \"start a tutorial\" to begin."
                    .to_string(),
            ),
        }
    }

    fn try_jump(&mut self, params: &JumpParams) -> Result<String> {
        let tutorial_name = params.tutorial_name.trim();
        let lesson_name = params.lesson_name.as_deref().filter(|name| !name.is_empty());
        let step_name = params.step_name.as_deref().filter(|name| !name.is_empty());
        if tutorial_name.is_empty() {
            return Err(TutorError::InvalidNavigation(
                "tutorial name is required".to_string(),
            ));
        }
        if step_name.is_some() && lesson_name.is_none() {
            return Err(TutorError::InvalidNavigation(
                "lesson name is required when step name is provided".to_string(),
            ));
        }

        let state = self.store.load_or_initialize()?;
        let Some(tutorial) = state.tutorial(tutorial_name) else {
            return Ok(format::tutorial_not_found(tutorial_name, &state.tutorial_names()));
        };
        let found = match (lesson_name, step_name) {
            (None, _) => selector::first_step(tutorial, None),
            (Some(lesson), None) => {
                if tutorial.lesson(lesson).is_none() {
                    return Ok(format::lesson_not_found(tutorial, lesson));
                }
                selector::first_step(tutorial, Some(lesson))
            }
            (Some(lesson), Some(step)) => {
                let Some(lesson_entry) = tutorial.lesson(lesson) else {
                    return Ok(format::lesson_not_found(tutorial, lesson));
                };
                if lesson_entry.step(step).is_none() {
                    return Ok(format::step_not_found(
                        &lesson_entry.title,
                        step,
                        &lesson_entry.step_names(),
                    ));
                }
                selector::locate(tutorial, lesson, step)
            }
        };
        let Some(found) = found else {
            return Ok(format!("❌ No steps found in tutorial \"{}\".", tutorial.title));
        };

        let wrapped = match self.content.load_and_wrap(tutorial, &found) {
            Ok(wrapped) => wrapped,
            Err(TutorError::ContentNotFound { .. }) => {
                return Ok(format::content_not_found(&found, tutorial));
            }
            Err(err) => return Err(err),
        };
        let name = tutorial.name.clone();
        let target = Target::of(&found);

        let retro = self
            .store
            .complete_steps_before(&name, &target.lesson, &target.step)?;
        info!(
            tutorial = %name,
            lesson = %target.lesson,
            step = %target.step,
            retro_completed = retro.len(),
            "jumping"
        );
        let updated = self
            .store
            .update_progress(&name, &target.lesson, &target.step)?;
        let tutorial = updated
            .tutorial(&name)
            .ok_or_else(|| TutorError::TutorialNotFound { name: name.clone() })?;
        let context = format::jump_context(tutorial, &target.resolve(tutorial)?);
        self.preload_after(&updated, &name, &target);
        Ok(format!("{context}\n\n{wrapped}"))
    }

    fn try_reset(&mut self, params: &ResetParams) -> Result<String> {
        let Some(state) = self.store.load_state()? else {
            return Ok("📚 No tutorial state found. There's nothing to reset.".to_string());
        };
        if params.confirm != Some(true) {
            return Ok(format::reset_preview(&state));
        }
        let before = progress::overall_stats(&state);
        if !before.has_progress() {
            return Ok(format::nothing_to_reset());
        }
        self.store.reset_progress()?;
        info!(
            completed = before.completed_tutorials,
            in_progress = before.in_progress_tutorials,
            "progress reset"
        );
        Ok(format::reset_complete(&before))
    }

    /// Warm the cache with the step after `target`, if any.
    fn preload_after(&mut self, state: &State, tutorial: &str, target: &Target) {
        let next = state.tutorial(tutorial).and_then(|found| {
            selector::step_after_completion(found, &target.lesson, &target.step)
                .map(|next| Target::of(&next))
        });
        if let Some(next) = next {
            self.content.preload(tutorial, &next.lesson, &next.step);
        }
    }
}

/// Look a tutorial up by exact name, else by 1-based listing position.
fn find_tutorial<'s>(state: &'s State, requested: &str) -> Option<&'s Tutorial> {
    state.tutorial(requested).or_else(|| {
        requested
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| state.tutorials.get(index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::catalog::Catalog;
    use crate::test_support::TestEnv;
    use crate::tutorial::Progress;

    struct Harness {
        env: TestEnv,
        store: StateStore,
        content: ContentLoader,
    }

    impl Harness {
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

        fn state(&self) -> State {
            self.store.load_state().expect("load").expect("state")
        }
    }

    #[test]
    fn start_by_number_matches_start_by_name() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let text = harness.engine().start(&StartParams {
            tutorial_name: Some("1".to_string()),
        });
        assert!(text.starts_with("🎓 Starting \"t1 title\" tutorial!"));
        assert_eq!(harness.state().current_tutorial, "t1");
    }

    #[test]
    fn start_unknown_tutorial_lists_names() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let text = harness.engine().start(&StartParams {
            tutorial_name: Some("nope".to_string()),
        });
        assert!(text.contains("❌ Tutorial \"nope\" not found."));
        assert!(text.contains("- t1"));
        assert!(harness.state().current_tutorial.is_empty());
    }

    #[test]
    fn restart_resumes_current_step() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let params = StartParams {
            tutorial_name: Some("t1".to_string()),
        };
        harness.engine().start(&params);
        harness.engine().next();

        let text = harness.engine().start(&params);
        assert!(text.starts_with("🎓 Resuming"));
        assert!(text.contains("📝 Step: b1 title (2/2)"));
    }

    #[test]
    fn jump_rejects_step_without_lesson() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let text = harness.engine().jump(&JumpParams {
            tutorial_name: "t1".to_string(),
            lesson_name: None,
            step_name: Some("a2".to_string()),
        });
        assert!(text.starts_with("❌ invalid navigation: lesson name is required"));
        assert!(!harness.env.paths().state_path.exists());
    }

    #[test]
    fn jump_to_lesson_opens_its_first_step() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let text = harness.engine().jump(&JumpParams {
            tutorial_name: "t1".to_string(),
            lesson_name: Some("l2".to_string()),
            step_name: None,
        });
        assert!(text.starts_with("🎯 Jumped to: t1 title\n📘 Lesson 2: l2 title\n📝 Step 1/2: a2 title"));
        assert!(text.contains("📊 Tutorial Progress: 50% (3/4 steps)"));

        let state = harness.state();
        let t1 = state.tutorial("t1").expect("t1");
        assert_eq!(t1.lessons[0].status, Progress::Completed);
        assert_eq!(t1.lessons[1].steps[0].status, Progress::InProgress);
    }

    #[test]
    fn jump_to_unknown_step_lists_steps() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        let text = harness.engine().jump(&JumpParams {
            tutorial_name: "t1".to_string(),
            lesson_name: Some("l1".to_string()),
            step_name: Some("zz".to_string()),
        });
        assert!(text.contains("❌ Step 'zz' not found in lesson 'l1 title'."));
        assert!(text.contains("- a1\n- b1"));
    }

    #[test]
    fn params_deserialize_from_camel_case() {
        let jump: JumpParams = serde_json::from_str(
            r#"{"tutorialName":"t1","lessonName":"l2","stepName":"b2"}"#,
        )
        .expect("jump params");
        assert_eq!(jump.step_name.as_deref(), Some("b2"));
        let reset: ResetParams = serde_json::from_str("{}").expect("reset params");
        assert_eq!(reset.confirm, None);
        let start: StartParams = serde_json::from_str("{}").expect("start params");
        assert!(start.tutorial_name.is_none());
    }

    #[test]
    fn reset_with_no_progress_does_not_write() {
        let mut harness = Harness::new(TestEnv::two_by_two());
        harness.engine().start(&StartParams::default());
        let before = std::fs::read_to_string(harness.env.paths().state_path).expect("read");

        let text = harness.engine().reset(&ResetParams {
            confirm: Some(true),
        });
        assert!(text.contains("No progress found to reset"));
        let after = std::fs::read_to_string(harness.env.paths().state_path).expect("read");
        assert_eq!(after, before);
    }
}
