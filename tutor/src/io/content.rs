//! Step content loading with a small bounded cache.

use std::collections::{HashMap, VecDeque};
use std::fs;

use tracing::{debug, warn};

use super::catalog::Catalog;
use crate::core::frontmatter::strip_front_matter;
use crate::core::selector::StepRef;
use crate::core::wrap::{StepPosition, StepRenderer};
use crate::error::{IoContext, Result, TutorError};
use crate::tutorial::Tutorial;

/// Cache key: one step of one lesson of one tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepKey {
    pub tutorial: String,
    pub lesson: String,
    pub step: String,
}

impl StepKey {
    pub fn new(tutorial: &str, lesson: &str, step: &str) -> Self {
        Self {
            tutorial: tutorial.to_string(),
            lesson: lesson.to_string(),
            step: step.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Insertion-ordered cache; the oldest entry is evicted once full.
#[derive(Debug)]
pub struct StepCache {
    capacity: usize,
    entries: HashMap<StepKey, String>,
    order: VecDeque<StepKey>,
    hits: u64,
    misses: u64,
}

impl StepCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &StepKey) -> Option<&str> {
        match self.entries.get(key) {
            Some(body) => {
                self.hits += 1;
                Some(body.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: StepKey, body: String) {
        if self.entries.insert(key.clone(), body).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!(tutorial = %oldest.tutorial, lesson = %oldest.lesson, step = %oldest.step, "evicting cached step");
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn contains(&self, key: &StepKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Maps `(tutorial, lesson, step)` to presentation text.
pub struct ContentLoader {
    catalog: Catalog,
    cache: StepCache,
    renderer: StepRenderer,
}

impl ContentLoader {
    pub fn new(catalog: Catalog, capacity: usize) -> Self {
        Self {
            catalog,
            cache: StepCache::new(capacity),
            renderer: StepRenderer::new(),
        }
    }

    /// Step body with front matter removed, from cache or disk.
    pub fn load_step_content(&mut self, tutorial: &str, lesson: &str, step: &str) -> Result<String> {
        let key = StepKey::new(tutorial, lesson, step);
        if let Some(body) = self.cache.get(&key) {
            debug!(tutorial, lesson, step, "step content cache hit");
            return Ok(body.to_string());
        }

        let path = self.catalog.step_path(tutorial, lesson, step);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(TutorError::ContentNotFound {
                    tutorial: tutorial.to_string(),
                    lesson: lesson.to_string(),
                    step: step.to_string(),
                    path,
                });
            }
            Err(err) => return Err(err).io_context(|| format!("read {}", path.display())),
        };
        let body = strip_front_matter(&raw).to_string();
        debug!(path = %path.display(), bytes = body.len(), "loaded step content");
        self.cache.insert(key, body.clone());
        Ok(body)
    }

    /// Load the step at `found` and wrap it for presentation.
    pub fn load_and_wrap(&mut self, tutorial: &Tutorial, found: &StepRef<'_>) -> Result<String> {
        let body = self.load_step_content(&tutorial.name, &found.lesson.name, &found.step.name)?;
        self.renderer.wrap(&body, &StepPosition::of(tutorial, found))
    }

    /// Warm the cache for a step the user is likely to open next.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn preload(&mut self, tutorial: &str, lesson: &str, step: &str) {
        if self.cache.contains(&StepKey::new(tutorial, lesson, step)) {
            return;
        }
        if let Err(err) = self.load_step_content(tutorial, lesson, step) {
            warn!(tutorial, lesson, step, error = %err, "failed to preload step content");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
