//! Enrichment pipeline — bounded concurrent comment fan-out for unread
//! threads.
//!
//! Flow:
//! 1. Filter to unread threads, cap at the fan-out limit
//! 2. Zero unread → clear presented alerts, done (no fetches)
//! 3. Fan out comment fetches, bounded; threads without a comment URL
//!    resolve to plain alerts without a fetch
//! 4. Present each alert as its resolution lands; per-item failures are
//!    logged and counted, never aborting siblings
//! 5. After every resolution returns, present the group summary if any
//!    per-item alert was produced

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::{debug, warn};

use crate::alerts::compose;
use crate::config::SyncConfig;
use crate::error::FeedError;
use crate::model::{Comment, NotificationThread};
use crate::ports::{AlertSink, NotificationFeed};

/// How one selected thread resolved.
enum Resolution {
    /// Latest comment fetched — alert carries author and body.
    WithComment(NotificationThread, Comment),
    /// No latest-comment URL — plain subject alert.
    Plain(NotificationThread),
    /// Comment fetch failed or timed out — no alert for this thread.
    Failed(NotificationThread, FeedError),
}

/// What a pipeline run did. Nothing here is persisted; the job maps it
/// onto the run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Unread threads selected for enrichment (post-cap).
    pub selected: usize,
    /// Per-item alerts presented.
    pub presented: usize,
    /// Comment fetches that failed or timed out.
    pub failed: usize,
}

/// Concurrently enriches unread threads with their latest comment and
/// presents the resulting alerts.
pub struct EnrichmentPipeline {
    feed: Arc<dyn NotificationFeed>,
    alerts: Arc<dyn AlertSink>,
    config: SyncConfig,
}

impl EnrichmentPipeline {
    pub fn new(
        feed: Arc<dyn NotificationFeed>,
        alerts: Arc<dyn AlertSink>,
        config: SyncConfig,
    ) -> Self {
        Self {
            feed,
            alerts,
            config,
        }
    }

    /// Run the pipeline over the latest fetch.
    ///
    /// Completes only after every selected thread's resolution has
    /// returned. Presentation writes happen on this task only, so they
    /// never interleave within a run.
    pub async fn run(&self, threads: &[NotificationThread]) -> PipelineReport {
        let selected: Vec<NotificationThread> = threads
            .iter()
            .filter(|t| t.unread)
            .take(self.config.fanout_limit)
            .cloned()
            .collect();

        if selected.is_empty() {
            debug!("No unread threads — clearing presented alerts");
            self.alerts.clear_all().await;
            return PipelineReport {
                selected: 0,
                presented: 0,
                failed: 0,
            };
        }

        let count = selected.len();
        debug!(selected = count, "Enriching unread threads");

        let mut resolutions = stream::iter(selected.into_iter().map(|t| self.resolve(t)))
            .buffer_unordered(self.config.fanout_limit);

        let mut presented = 0usize;
        let mut failed = 0usize;
        while let Some(resolution) = resolutions.next().await {
            match resolution {
                Resolution::WithComment(thread, comment) => {
                    self.alerts
                        .present(compose::with_comment(
                            &thread,
                            &comment,
                            self.config.accent_color,
                        ))
                        .await;
                    presented += 1;
                }
                Resolution::Plain(thread) => {
                    self.alerts
                        .present(compose::without_comment(&thread, self.config.accent_color))
                        .await;
                    presented += 1;
                }
                Resolution::Failed(thread, err) => {
                    warn!(thread = %thread.id, error = %err, "Comment fetch failed");
                    failed += 1;
                }
            }
        }

        if presented > 0 {
            self.alerts
                .present(compose::group_summary(self.config.accent_color))
                .await;
        }

        PipelineReport {
            selected: count,
            presented,
            failed,
        }
    }

    /// Resolve one thread: fetch its latest comment under the per-fetch
    /// timeout, or pass it through plain when it has none.
    async fn resolve(&self, thread: NotificationThread) -> Resolution {
        let Some(url) = thread.latest_comment_url().map(str::to_string) else {
            return Resolution::Plain(thread);
        };

        let timeout = self.config.comment_fetch_timeout;
        match tokio::time::timeout(timeout, self.feed.comment(&url)).await {
            Ok(Ok(comment)) => Resolution::WithComment(thread, comment),
            Ok(Err(err)) => Resolution::Failed(thread, err),
            Err(_) => Resolution::Failed(thread, FeedError::Timeout { url, timeout }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::alerts::AlertCenter;
    use crate::alerts::model::AlertId;
    use crate::model::{CommentAuthor, Repository, Subject};

    /// Scripted feed: comment URLs map to canned outcomes; every fetch
    /// is recorded.
    struct ScriptedFeed {
        comments: HashMap<String, Result<Comment, String>>,
        fetched: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl ScriptedFeed {
        fn new() -> Self {
            Self {
                comments: HashMap::new(),
                fetched: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn with_comment(mut self, url: &str, author: &str) -> Self {
            self.comments.insert(
                url.to_string(),
                Ok(Comment {
                    id: 1,
                    user: Some(CommentAuthor {
                        login: author.to_string(),
                    }),
                    body: format!("comment at {url}"),
                    created_at: Utc::now(),
                }),
            );
            self
        }

        fn with_failure(mut self, url: &str) -> Self {
            self.comments
                .insert(url.to_string(), Err("boom".to_string()));
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn fetch_count(&self) -> usize {
            self.fetched.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationFeed for ScriptedFeed {
        async fn notifications(&self, _page: u32) -> Result<Vec<NotificationThread>, FeedError> {
            Ok(Vec::new())
        }

        async fn comment(&self, url: &str) -> Result<Comment, FeedError> {
            self.fetched.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.comments.get(url) {
                Some(Ok(comment)) => Ok(comment.clone()),
                Some(Err(reason)) => Err(FeedError::Http(reason.clone())),
                None => Err(FeedError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn unread_thread(id: usize, comment_url: Option<String>) -> NotificationThread {
        NotificationThread {
            id: id.to_string(),
            unread: true,
            updated_at: Some(Utc::now()),
            subject: Subject {
                title: format!("Thread {id}"),
                url: format!("https://api.github.com/repos/o/r/issues/{id}"),
                latest_comment_url: comment_url,
            },
            repository: Repository {
                full_name: "o/r".to_string(),
            },
        }
    }

    fn comment_url(id: usize) -> String {
        format!("https://api.github.com/repos/o/r/issues/comments/{id}")
    }

    fn pipeline(feed: Arc<ScriptedFeed>, alerts: Arc<AlertCenter>) -> EnrichmentPipeline {
        EnrichmentPipeline::new(feed, alerts, SyncConfig::default())
    }

    #[tokio::test]
    async fn twelve_unread_caps_at_ten_plus_summary() {
        let mut feed = ScriptedFeed::new();
        for i in 0..12 {
            feed = feed.with_comment(&comment_url(i), "octocat");
        }
        let feed = Arc::new(feed);
        let alerts = AlertCenter::new();

        let threads: Vec<_> = (0..12)
            .map(|i| unread_thread(i, Some(comment_url(i))))
            .collect();

        let report = pipeline(Arc::clone(&feed), Arc::clone(&alerts))
            .run(&threads)
            .await;

        assert_eq!(report.selected, 10);
        assert_eq!(report.presented, 10);
        assert_eq!(report.failed, 0);
        // 10 per-item alerts + 1 group summary.
        assert_eq!(alerts.len().await, 11);
        // Threads 11 and 12 were never fetched.
        assert_eq!(feed.fetch_count(), 10);
        assert!(alerts.get(&AlertId::Summary).await.is_some());
    }

    #[tokio::test]
    async fn single_failure_does_not_abort_siblings() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .with_comment(&comment_url(0), "a")
                .with_failure(&comment_url(1))
                .with_comment(&comment_url(2), "c"),
        );
        let alerts = AlertCenter::new();

        let threads: Vec<_> = (0..3)
            .map(|i| unread_thread(i, Some(comment_url(i))))
            .collect();

        let report = pipeline(feed, Arc::clone(&alerts)).run(&threads).await;

        assert_eq!(report.presented, 2);
        assert_eq!(report.failed, 1);
        // 2 comment alerts + summary; the failed thread produced nothing.
        assert_eq!(alerts.len().await, 3);
        assert!(alerts.get(&AlertId::Thread("1".to_string())).await.is_none());
    }

    #[tokio::test]
    async fn zero_unread_clears_alerts_without_fetching() {
        let feed = Arc::new(ScriptedFeed::new());
        let alerts = AlertCenter::new();

        // Something stale from a previous run.
        alerts
            .present(compose::group_summary(0x1976D2))
            .await;

        let mut read = unread_thread(1, Some(comment_url(1)));
        read.unread = false;

        let report = pipeline(Arc::clone(&feed), Arc::clone(&alerts))
            .run(&[read])
            .await;

        assert_eq!(report.selected, 0);
        assert_eq!(report.presented, 0);
        assert!(alerts.is_empty().await);
        assert_eq!(feed.fetch_count(), 0);
    }

    #[tokio::test]
    async fn threads_without_comment_url_get_plain_alerts() {
        let feed = Arc::new(ScriptedFeed::new());
        let alerts = AlertCenter::new();

        let threads = vec![unread_thread(5, None)];
        let report = pipeline(Arc::clone(&feed), Arc::clone(&alerts))
            .run(&threads)
            .await;

        assert_eq!(report.presented, 1);
        assert_eq!(feed.fetch_count(), 0);

        let alert = alerts
            .get(&AlertId::Thread("5".to_string()))
            .await
            .unwrap();
        assert_eq!(alert.title, "Thread 5");
        assert_eq!(alert.body, "o/r");
    }

    #[tokio::test]
    async fn read_threads_are_filtered_out() {
        let feed = Arc::new(ScriptedFeed::new().with_comment(&comment_url(1), "a"));
        let alerts = AlertCenter::new();

        let mut read = unread_thread(2, Some(comment_url(2)));
        read.unread = false;
        let threads = vec![unread_thread(1, Some(comment_url(1))), read];

        let report = pipeline(Arc::clone(&feed), Arc::clone(&alerts))
            .run(&threads)
            .await;

        assert_eq!(report.selected, 1);
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_as_item_failure() {
        let feed = Arc::new(
            ScriptedFeed::new()
                .with_comment(&comment_url(1), "slow")
                .with_delay(Duration::from_secs(60)),
        );
        let alerts = AlertCenter::new();

        let threads = vec![unread_thread(1, Some(comment_url(1)))];
        let report = pipeline(feed, Arc::clone(&alerts)).run(&threads).await;

        assert_eq!(report.presented, 0);
        assert_eq!(report.failed, 1);
        // No per-item alert, so no summary either.
        assert!(alerts.is_empty().await);
    }
}
