//! Flashcard study flow.
//!
//! A [`StudyController`] shows one randomly picked word at a time. The learner
//! answers "known" (move on to another word) or "unknown" (open the word's
//! detail page). All state lives in a [`SessionStorage`] under one key and is
//! written back after every mutation, so a page reload or back-navigation
//! restores the same card instead of drawing a new one.
//!
//! Every pick carries an id. An answer is only recorded if it names the
//! current, unanswered pick, which makes double submits and answers replayed
//! from a stale page harmless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Word, WordCatalog};

/// Storage key of the persisted study state.
pub const STATE_KEY: &str = "study:state";

/// History entries kept per session; older ones are dropped.
pub const MAX_HISTORY: usize = 500;

/// String key/value storage scoped to one browsing session.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Process-local [`SessionStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// How the study page was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationType {
    /// Fresh navigation (link, typed URL).
    #[default]
    Navigate,
    Reload,
    BackForward,
}

impl NavigationType {
    /// Parse a navigation type name. Unknown values count as a fresh navigation.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reload" => Self::Reload,
            "back_forward" => Self::BackForward,
            _ => Self::Navigate,
        }
    }

    fn restores_current(self) -> bool {
        matches!(self, Self::Reload | Self::BackForward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Known,
    Unknown,
}

/// The card currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub id: u64,
    pub slug: String,
    /// Set once "unknown" was answered; the next restore draws a new card.
    pub answered: bool,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub slug: String,
    pub answer: Answer,
    pub pick_id: u64,
    pub at: DateTime<Utc>,
}

/// Everything persisted for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyState {
    pub current: Option<Pick>,
    pub history: Vec<HistoryEntry>,
    pub next_pick_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub known: usize,
    pub unknown: usize,
    pub answered: usize,
}

/// Result of [`StudyController::answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Recorded as known; a new card is up.
    Next,
    /// Recorded as unknown; the caller should open this word's detail.
    OpenDetail(String),
    /// Stale or duplicate answer; nothing changed.
    Ignored,
}

/// Time left on the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
}

impl Countdown {
    fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).to_std().unwrap_or_default()
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }

    /// Fraction of the countdown that has run, in `[0, 1]`.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_zero()
    }
}

/// Drives the study flow for one session.
pub struct StudyController {
    catalog: Arc<WordCatalog>,
    storage: Arc<dyn SessionStorage>,
    key: String,
    countdown: Duration,
    rng: Box<dyn RngCore + Send>,
    state: StudyState,
}

impl StudyController {
    /// Load the controller for `key`. Corrupt persisted state is discarded.
    pub fn load(
        catalog: Arc<WordCatalog>,
        storage: Arc<dyn SessionStorage>,
        key: impl Into<String>,
        countdown: Duration,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let key = key.into();
        let state = match storage.get(&key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Discarding corrupt study state");
                StudyState::default()
            }),
            None => StudyState::default(),
        };
        Self {
            catalog,
            storage,
            key,
            countdown,
            rng,
            state,
        }
    }

    pub fn state(&self) -> &StudyState {
        &self.state
    }

    /// The word on the current card.
    pub fn current_word(&self) -> Option<&Word> {
        let pick = self.state.current.as_ref()?;
        self.catalog.get_by_slug(&pick.slug)
    }

    /// Bring the session up for a page entered via `nav`.
    ///
    /// Reload and back/forward keep an unanswered card; anything else draws
    /// a new one. A card whose word left the catalog is always replaced.
    pub fn restore(&mut self, nav: NavigationType) -> Option<&Pick> {
        let keep = nav.restores_current()
            && self
                .state
                .current
                .as_ref()
                .is_some_and(|p| !p.answered && self.catalog.get_by_slug(&p.slug).is_some());
        if keep {
            debug!(key = %self.key, ?nav, "Restoring current study card");
        } else {
            self.pick_next();
        }
        self.persist();
        self.state.current.as_ref()
    }

    /// Draw a new random card, avoiding the current word when possible.
    pub fn pick_next(&mut self) -> Option<&Pick> {
        let words = self.catalog.all();
        if words.is_empty() {
            self.state.current = None;
            return None;
        }

        let current_idx = self
            .state
            .current
            .as_ref()
            .and_then(|p| words.iter().position(|w| w.slug == p.slug));
        let idx = match current_idx {
            Some(cur) if words.len() > 1 => {
                let i = self.rng.gen_range(0..words.len() - 1);
                if i >= cur {
                    i + 1
                } else {
                    i
                }
            }
            _ => self.rng.gen_range(0..words.len()),
        };

        let id = self.state.next_pick_id;
        self.state.next_pick_id += 1;
        self.state.current = Some(Pick {
            id,
            slug: words[idx].slug.clone(),
            answered: false,
            started_at: Utc::now(),
        });
        self.persist();
        self.state.current.as_ref()
    }

    /// Record an answer for `pick_id`.
    pub fn answer(&mut self, pick_id: u64, answer: Answer) -> AnswerOutcome {
        let Some(pick) = self.state.current.as_mut() else {
            return AnswerOutcome::Ignored;
        };
        if pick.id != pick_id || pick.answered {
            debug!(key = %self.key, pick_id, current = pick.id, "Ignoring stale study answer");
            return AnswerOutcome::Ignored;
        }

        let slug = pick.slug.clone();
        self.state.history.push(HistoryEntry {
            slug: slug.clone(),
            answer,
            pick_id,
            at: Utc::now(),
        });
        if self.state.history.len() > MAX_HISTORY {
            let excess = self.state.history.len() - MAX_HISTORY;
            self.state.history.drain(..excess);
        }

        let outcome = match answer {
            Answer::Known => {
                self.pick_next();
                AnswerOutcome::Next
            }
            Answer::Unknown => {
                pick.answered = true;
                AnswerOutcome::OpenDetail(slug)
            }
        };
        self.persist();
        outcome
    }

    /// Take back the last answer and put its word back on screen.
    ///
    /// The restored card gets a fresh pick id. Returns `false` with no history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.state.history.pop() else {
            return false;
        };
        let id = self.state.next_pick_id;
        self.state.next_pick_id += 1;
        self.state.current = Some(Pick {
            id,
            slug: entry.slug,
            answered: false,
            started_at: Utc::now(),
        });
        self.persist();
        true
    }

    pub fn stats(&self) -> StudyStats {
        let known = self
            .state
            .history
            .iter()
            .filter(|e| e.answer == Answer::Known)
            .count();
        StudyStats {
            known,
            unknown: self.state.history.len() - known,
            answered: self.state.history.len(),
        }
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.state.current.as_ref().map(|p| Countdown {
            duration: self.countdown,
            started_at: p.started_at,
        })
    }

    /// Forget everything for this session.
    pub fn reset(&mut self) {
        self.state = StudyState::default();
        self.storage.remove(&self.key);
    }

    fn persist(&self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => self.storage.set(&self.key, json),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to persist study state"),
        }
    }
}

/// Sessions idle longer than this are dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

/// Live sessions kept at most; the least recently used is dropped beyond this.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Longest gap between idle sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionSlot {
    lock: Arc<Mutex<()>>,
    last_seen: Instant,
}

/// Study sessions keyed by session id, sharing one storage.
///
/// Sessions behave like browser session storage that outlives a tab only
/// briefly: idle ones are swept, and the oldest is dropped past the cap.
pub struct StudySessions {
    catalog: Arc<WordCatalog>,
    storage: Arc<dyn SessionStorage>,
    countdown: Duration,
    idle_ttl: Duration,
    max_sessions: usize,
    slots: DashMap<String, SessionSlot>,
    last_sweep: Mutex<Instant>,
}

impl StudySessions {
    pub fn new(
        catalog: Arc<WordCatalog>,
        storage: Arc<dyn SessionStorage>,
        countdown: Duration,
    ) -> Self {
        Self {
            catalog,
            storage,
            countdown,
            idle_ttl: DEFAULT_SESSION_IDLE,
            max_sessions: DEFAULT_MAX_SESSIONS,
            slots: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn in_memory(catalog: Arc<WordCatalog>, countdown: Duration) -> Self {
        Self::new(catalog, Arc::new(MemoryStorage::new()), countdown)
    }

    /// Override the idle timeout and the session cap (minimum 1).
    pub fn with_limits(mut self, idle_ttl: Duration, max_sessions: usize) -> Self {
        self.idle_ttl = idle_ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn storage_key(session_id: &str) -> String {
        format!("{session_id}:{STATE_KEY}")
    }

    /// Run `f` against the session's controller. Calls for one session are serialized.
    pub fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&mut StudyController) -> T) -> T {
        let now = Instant::now();
        self.sweep_idle(now);

        let lock = {
            let mut slot = self
                .slots
                .entry(session_id.to_string())
                .or_insert_with(|| SessionSlot {
                    lock: Arc::default(),
                    last_seen: now,
                });
            slot.last_seen = now;
            slot.lock.clone()
        };
        if self.slots.len() > self.max_sessions {
            self.evict_oldest(session_id);
        }

        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut controller = StudyController::load(
            self.catalog.clone(),
            self.storage.clone(),
            Self::storage_key(session_id),
            self.countdown,
            Box::new(StdRng::from_entropy()),
        );
        f(&mut controller)
    }

    /// Drop a session's state and lock.
    pub fn remove(&self, session_id: &str) {
        self.slots.remove(session_id);
        self.storage.remove(&Self::storage_key(session_id));
    }

    fn sweep_idle(&self, now: Instant) {
        {
            let mut last = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
            if now.duration_since(*last) < self.idle_ttl.min(MAX_SWEEP_INTERVAL) {
                return;
            }
            *last = now;
        }
        let idle: Vec<String> = self
            .slots
            .iter()
            .filter(|slot| now.duration_since(slot.last_seen) > self.idle_ttl)
            .map(|slot| slot.key().clone())
            .collect();
        if !idle.is_empty() {
            debug!(count = idle.len(), "Dropping idle study sessions");
        }
        for id in idle {
            self.remove(&id);
        }
    }

    fn evict_oldest(&self, keep: &str) {
        while self.slots.len() > self.max_sessions {
            let oldest = self
                .slots
                .iter()
                .filter(|slot| slot.key() != keep)
                .min_by_key(|slot| slot.last_seen)
                .map(|slot| slot.key().clone());
            match oldest {
                Some(id) => self.remove(&id),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<WordCatalog> {
        Arc::new(WordCatalog::builtin())
    }

    fn controller(storage: Arc<MemoryStorage>, seed: u64) -> StudyController {
        StudyController::load(
            catalog(),
            storage,
            STATE_KEY,
            Duration::from_secs(5),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    #[test]
    fn test_navigation_type_parse() {
        assert_eq!(NavigationType::parse("reload"), NavigationType::Reload);
        assert_eq!(NavigationType::parse("back_forward"), NavigationType::BackForward);
        assert_eq!(NavigationType::parse("Back-Forward"), NavigationType::BackForward);
        assert_eq!(NavigationType::parse("navigate"), NavigationType::Navigate);
        assert_eq!(NavigationType::parse("prerender"), NavigationType::Navigate);
    }

    #[test]
    fn test_fresh_restore_picks_a_word() {
        let storage = Arc::new(MemoryStorage::new());
        let mut c = controller(storage.clone(), 1);
        let pick = c.restore(NavigationType::Navigate).cloned().unwrap();
        assert_eq!(pick.id, 0);
        assert!(catalog().get_by_slug(&pick.slug).is_some());
        assert!(storage.get(STATE_KEY).is_some(), "state persisted");
    }

    #[test]
    fn test_reload_keeps_unanswered_card() {
        let storage = Arc::new(MemoryStorage::new());
        let first = controller(storage.clone(), 1)
            .restore(NavigationType::Navigate)
            .cloned()
            .unwrap();

        let mut reloaded = controller(storage.clone(), 2);
        let again = reloaded.restore(NavigationType::Reload).cloned().unwrap();
        assert_eq!(again, first);

        let mut back = controller(storage.clone(), 3);
        assert_eq!(back.restore(NavigationType::BackForward).cloned().unwrap(), first);
    }

    #[test]
    fn test_fresh_navigation_draws_new_card() {
        let storage = Arc::new(MemoryStorage::new());
        let first = controller(storage.clone(), 1)
            .restore(NavigationType::Navigate)
            .cloned()
            .unwrap();
        let mut c = controller(storage, 2);
        let second = c.restore(NavigationType::Navigate).cloned().unwrap();
        assert_eq!(second.id, first.id + 1);
        assert_ne!(second.slug, first.slug);
    }

    #[test]
    fn test_pick_next_never_repeats_current() {
        let storage = Arc::new(MemoryStorage::new());
        let mut c = controller(storage, 7);
        let mut prev = c.pick_next().unwrap().slug.clone();
        for _ in 0..100 {
            let next = c.pick_next().unwrap().slug.clone();
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_single_word_catalog_repeats() {
        let one = Arc::new(WordCatalog::from_words(vec![Word::new("bid", "bid")]));
        let mut c = StudyController::load(
            one,
            Arc::new(MemoryStorage::new()),
            STATE_KEY,
            Duration::from_secs(5),
            Box::new(StdRng::seed_from_u64(0)),
        );
        assert_eq!(c.pick_next().unwrap().slug, "bid");
        assert_eq!(c.pick_next().unwrap().slug, "bid");
    }

    #[test]
    fn test_empty_catalog_has_no_pick() {
        let mut c = StudyController::load(
            Arc::new(WordCatalog::from_words(vec![])),
            Arc::new(MemoryStorage::new()),
            STATE_KEY,
            Duration::from_secs(5),
            Box::new(StdRng::seed_from_u64(0)),
        );
        assert!(c.restore(NavigationType::Navigate).is_none());
        assert!(c.countdown().is_none());
        assert_eq!(c.answer(0, Answer::Known), AnswerOutcome::Ignored);
    }

    #[test]
    fn test_known_answer_records_and_advances() {
        let mut c = controller(Arc::new(MemoryStorage::new()), 1);
        let pick = c.restore(NavigationType::Navigate).cloned().unwrap();
        assert_eq!(c.answer(pick.id, Answer::Known), AnswerOutcome::Next);
        let next = c.state().current.clone().unwrap();
        assert_ne!(next.id, pick.id);
        assert_eq!(c.stats(), StudyStats { known: 1, unknown: 0, answered: 1 });
    }

    #[test]
    fn test_duplicate_and_stale_answers_are_ignored() {
        let mut c = controller(Arc::new(MemoryStorage::new()), 1);
        let pick = c.restore(NavigationType::Navigate).cloned().unwrap();
        assert_eq!(c.answer(pick.id, Answer::Known), AnswerOutcome::Next);
        assert_eq!(c.answer(pick.id, Answer::Known), AnswerOutcome::Ignored);
        assert_eq!(c.answer(999, Answer::Unknown), AnswerOutcome::Ignored);
        assert_eq!(c.stats().answered, 1);
    }

    #[test]
    fn test_unknown_answer_opens_detail_and_back_draws_new_card() {
        let storage = Arc::new(MemoryStorage::new());
        let mut c = controller(storage.clone(), 1);
        let pick = c.restore(NavigationType::Navigate).cloned().unwrap();
        assert_eq!(
            c.answer(pick.id, Answer::Unknown),
            AnswerOutcome::OpenDetail(pick.slug.clone())
        );
        // A second click on the same card must not double count.
        assert_eq!(c.answer(pick.id, Answer::Unknown), AnswerOutcome::Ignored);

        // Learner comes back from the detail page.
        let mut back = controller(storage, 2);
        let next = back.restore(NavigationType::BackForward).cloned().unwrap();
        assert_ne!(next.id, pick.id);
        assert_eq!(back.stats(), StudyStats { known: 0, unknown: 1, answered: 1 });
    }

    #[test]
    fn test_undo_restores_previous_word_with_new_id() {
        let mut c = controller(Arc::new(MemoryStorage::new()), 1);
        let pick = c.restore(NavigationType::Navigate).cloned().unwrap();
        c.answer(pick.id, Answer::Known);

        assert!(c.undo());
        let restored = c.state().current.clone().unwrap();
        assert_eq!(restored.slug, pick.slug);
        assert!(!restored.answered);
        assert!(restored.id > pick.id);
        assert_eq!(c.stats().answered, 0);
        // The original pick id is now stale.
        assert_eq!(c.answer(pick.id, Answer::Known), AnswerOutcome::Ignored);
        assert!(!c.undo());
    }

    #[test]
    fn test_history_is_capped() {
        let mut c = controller(Arc::new(MemoryStorage::new()), 1);
        c.restore(NavigationType::Navigate);
        for _ in 0..MAX_HISTORY + 10 {
            let id = c.state().current.as_ref().unwrap().id;
            c.answer(id, Answer::Known);
        }
        assert_eq!(c.state().history.len(), MAX_HISTORY);
    }

    #[test]
    fn test_corrupt_state_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(STATE_KEY, "{garbage".into());
        let mut c = controller(storage, 1);
        assert_eq!(c.state(), &StudyState::default());
        assert!(c.restore(NavigationType::Reload).is_some());
    }

    #[test]
    fn test_reset_clears_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut c = controller(storage.clone(), 1);
        c.restore(NavigationType::Navigate);
        c.reset();
        assert!(storage.get(STATE_KEY).is_none());
        assert!(c.state().current.is_none());
    }

    #[test]
    fn test_countdown() {
        let start = Utc::now();
        let cd = Countdown {
            duration: Duration::from_secs(4),
            started_at: start,
        };
        let mid = start + chrono::Duration::seconds(1);
        assert_eq!(cd.remaining(mid), Duration::from_secs(3));
        assert!((cd.progress(mid) - 0.25).abs() < 1e-9);
        assert!(!cd.is_expired(mid));

        let late = start + chrono::Duration::seconds(10);
        assert!(cd.is_expired(late));
        assert_eq!(cd.progress(late), 1.0);
        // Clock skew before the start counts as no time elapsed.
        let early = start - chrono::Duration::seconds(1);
        assert_eq!(cd.remaining(early), Duration::from_secs(4));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let sessions = StudySessions::in_memory(catalog(), Duration::from_secs(5));
        let a = sessions.with_session("a", |c| c.restore(NavigationType::Navigate).cloned());
        sessions.with_session("a", |c| {
            let id = c.state().current.as_ref().unwrap().id;
            c.answer(id, Answer::Known);
        });
        let b_stats = sessions.with_session("b", |c| c.stats());
        assert!(a.is_some());
        assert_eq!(b_stats.answered, 0);
        assert_eq!(sessions.with_session("a", |c| c.stats()).answered, 1);

        sessions.remove("a");
        assert_eq!(sessions.with_session("a", |c| c.stats()).answered, 0);
    }

    #[test]
    fn test_anonymous_sessions_are_capped() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = StudySessions::new(catalog(), storage.clone(), Duration::from_secs(5))
            .with_limits(DEFAULT_SESSION_IDLE, 100);
        for i in 0..10_000 {
            sessions.with_session(&format!("anon-{i}"), |c| {
                c.restore(NavigationType::Navigate);
            });
        }
        assert_eq!(sessions.len(), 100);
        assert_eq!(storage.len(), 100);
        // The most recent session survives, the first one is gone.
        assert!(storage.get(&format!("anon-9999:{STATE_KEY}")).is_some());
        assert!(storage.get(&format!("anon-0:{STATE_KEY}")).is_none());
    }

    #[test]
    fn test_idle_sessions_are_swept() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = StudySessions::new(catalog(), storage.clone(), Duration::from_secs(5))
            .with_limits(Duration::from_millis(50), DEFAULT_MAX_SESSIONS);
        sessions.with_session("old", |c| {
            c.restore(NavigationType::Navigate);
        });
        std::thread::sleep(Duration::from_millis(120));
        sessions.with_session("new", |c| {
            c.restore(NavigationType::Navigate);
        });
        assert_eq!(sessions.len(), 1);
        assert!(storage.get(&format!("old:{STATE_KEY}")).is_none());
        assert!(storage.get(&format!("new:{STATE_KEY}")).is_some());
    }
}
