//! Session-scoped planner state.
//!
//! Each session owns its own memo slot behind a run lock, so a session never has
//! two chains in flight while separate sessions proceed independently. The last
//! successful plan is also published to a separate slot that readers take only
//! briefly, so the cached plan stays readable while a new one is generated.
//!
//! The store is bounded: sessions idle past the TTL are swept when a new session
//! is created or when they are next looked up, and creation fails once the live
//! count reaches the cap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::CompletionModel;
use crate::planner::chain::{ChainError, LearningPlan, LearningPlanChain};
use crate::planner::memo::{Memoized, ResultMemo};
use crate::planner::skills::{RequestKey, SkillSet};

/// The cached artifact: the plan together with the inputs it answers.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRecord {
    pub target_role: String,
    pub skills: SkillSet,
    pub plan: LearningPlan,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PlannerSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Held for the whole chain run.
    memo: Mutex<ResultMemo<RequestKey, PlanRecord>>,
    /// Copy of the memo's value, replaced only after a successful run.
    published: RwLock<Option<PlanRecord>>,
    opened: Instant,
    /// Milliseconds after `opened` of the last access.
    last_used_ms: AtomicU64,
}

impl PlannerSession {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            memo: Mutex::new(ResultMemo::new()),
            published: RwLock::new(None),
            opened: Instant::now(),
            last_used_ms: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The plan currently on display for this session, if any. Never waits on an
    /// in-flight chain run.
    pub async fn current_plan(&self) -> Option<PlanRecord> {
        self.published.read().await.clone()
    }

    /// Returns the cached plan for `key`, or runs the chain and caches its result.
    /// A failed run leaves the previously cached plan in place.
    pub async fn plan_for(
        &self,
        chain: &LearningPlanChain,
        llm: &dyn CompletionModel,
        key: RequestKey,
    ) -> Result<Memoized<PlanRecord>, ChainError> {
        let mut memo = self.memo.lock().await;
        let replacing = memo.is_populated();

        let request = key.clone();
        let outcome = memo
            .get_or_compute(key, || async move {
                let plan = chain.run(llm, &request).await?;
                Ok::<_, ChainError>(PlanRecord {
                    target_role: request.target_role().to_string(),
                    skills: request.skills().clone(),
                    plan,
                    generated_at: Utc::now(),
                })
            })
            .await;
        self.touch();
        let outcome = outcome?;

        if outcome.cached {
            debug!("Session {}: inputs unchanged, serving cached plan", self.id);
        } else {
            *self.published.write().await = Some(outcome.value.clone());
            if replacing {
                debug!("Session {}: previous plan replaced", self.id);
            }
        }
        Ok(outcome)
    }

    fn touch(&self) {
        let elapsed = self.opened.elapsed().as_millis() as u64;
        self.last_used_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let last_used = Duration::from_millis(self.last_used_ms.load(Ordering::Relaxed));
        self.opened.elapsed().saturating_sub(last_used)
    }

    /// A session mid-run is never expired, however long the run takes.
    fn is_expired(&self, idle_ttl: Duration) -> bool {
        self.idle_for() >= idle_ttl && self.memo.try_lock().is_ok()
    }
}

/// Bounds on the session map.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_ttl: Duration::from_secs(3600),
        }
    }
}

/// In-memory map of live sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<PlannerSession>>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            sessions: Arc::default(),
            limits,
        }
    }

    /// Sweeps idle sessions, then opens a new one unless the store is full.
    pub async fn create(&self) -> Result<Arc<PlannerSession>, AppError> {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.limits.idle_ttl));
        let swept = before - sessions.len();
        if swept > 0 {
            info!("Expired {swept} idle planner session(s)");
        }

        if sessions.len() >= self.limits.max_sessions {
            warn!(
                "Refusing new planner session: {} sessions live (limit {})",
                sessions.len(),
                self.limits.max_sessions
            );
            return Err(AppError::SessionLimit(format!(
                "The planner is at its limit of {} active sessions. Please try again later.",
                self.limits.max_sessions
            )));
        }

        let id = Uuid::new_v4();
        let session = Arc::new(PlannerSession::new(id));
        sessions.insert(id, session.clone());
        info!("Created planner session {id}");
        Ok(session)
    }

    /// Looks up a live session and marks it used. An expired session is dropped
    /// and reported as absent.
    pub async fn get(&self, id: Uuid) -> Option<Arc<PlannerSession>> {
        let session = self.sessions.read().await.get(&id).cloned()?;

        if session.is_expired(self.limits.idle_ttl) {
            self.sessions.write().await.remove(&id);
            info!("Planner session {id} expired after {:?} idle", session.idle_for());
            return None;
        }

        session.touch();
        Some(session)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Removed planner session {id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
