use super::*;
use fl_auth::Creator;
use fl_core::ID;
use fl_core::Unique;
use std::time::SystemTime;

/// A single analytics event: a page view, a maps click, a search, ...
/// Attribution fields are all optional; whatever the client sent is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    id: ID<Self>,
    creator: Option<ID<Creator>>,
    recommendation: Option<ID<Recommendation>>,
    kind: String,
    search_query: Option<String>,
    user_agent: Option<String>,
    ip: Option<String>,
    referrer: Option<String>,
    session: Option<uuid::Uuid>,
    created_at: SystemTime,
}

impl Unique for AnalyticsEvent {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct TrackEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub creator_slug: Option<String>,
    #[serde(default)]
    pub recommendation_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub session_id: Option<uuid::Uuid>,
}

/// Request metadata captured at the HTTP boundary.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referrer: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait EventRepository {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), ContentError>;
}

/// Records an event, best effort. A missing creator slug, a failed slug
/// lookup, or a failed insert is logged and swallowed: analytics must
/// never break the page that emitted it. This is the one place in the
/// system where log-and-continue is allowed.
pub async fn track<R>(repo: &R, req: TrackEventRequest, ctx: RequestContext)
where
    R: EventRepository + ProfileRepository,
{
    let creator = match req.creator_slug.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(slug) => match repo.find_by_slug(slug).await {
            Ok(found) => found.map(|c| c.id()),
            Err(e) => {
                log::warn!("analytics creator lookup failed: {}", e);
                None
            }
        },
    };
    let event = AnalyticsEvent {
        id: ID::default(),
        creator,
        recommendation: req.recommendation_id.map(ID::from),
        kind: req.event_type,
        search_query: req.search_query,
        user_agent: ctx.user_agent,
        ip: ctx.ip,
        referrer: ctx.referrer,
        session: req.session_id,
        created_at: SystemTime::now(),
    };
    if let Err(e) = repo.record(&event).await {
        log::warn!("analytics event dropped: {}", e);
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use fl_pg::*;

    impl Schema for AnalyticsEvent {
        fn name() -> &'static str {
            EVENTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                EVENTS,
                " (
                    id                UUID PRIMARY KEY,
                    creator_id        UUID,
                    recommendation_id UUID,
                    kind              VARCHAR(50) NOT NULL,
                    search_query      TEXT,
                    user_agent        TEXT,
                    ip                VARCHAR(64),
                    referrer          TEXT,
                    session_id        UUID,
                    created_at        TIMESTAMPTZ NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_events_creator ON ",
                EVENTS,
                " (creator_id);
                 CREATE INDEX IF NOT EXISTS idx_events_created ON ",
                EVENTS,
                " (created_at);"
            )
        }
    }
}

#[cfg(feature = "database")]
mod postgres {
    use super::*;
    use fl_pg::*;
    use std::sync::Arc;
    use tokio_postgres::Client;

    impl EventRepository for Arc<Client> {
        async fn record(&self, event: &AnalyticsEvent) -> Result<(), ContentError> {
            self.execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    EVENTS,
                    " (id, creator_id, recommendation_id, kind, search_query,
                       user_agent, ip, referrer, session_id, created_at)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
                ),
                &[
                    &event.id.inner(),
                    &event.creator.map(|id| id.inner()),
                    &event.recommendation.map(|id| id.inner()),
                    &event.kind,
                    &event.search_query,
                    &event.user_agent,
                    &event.ip,
                    &event.referrer,
                    &event.session,
                    &event.created_at,
                ],
            )
            .await
            .map(|_| ())
            .map_err(|e| ContentError::Store(e.to_string()))
        }
    }
}
