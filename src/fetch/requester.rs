//! HTTP requester bound to one webservice key.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::config::SyncSettings;
use crate::error::{Error, Result};
use crate::schema::Resource;

use super::response::{ActiveIdsResponse, PaginatedResponse};

/// Items requested per page.
pub const PAGE_SIZE: usize = 100;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the active property identifiers.
pub const ACTIVE_PROPERTIES_PATH: &str = "imoveis/ativos";

/// Items of a paginated fetch and the pages that could not be retrieved.
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    /// Pages (2 and up) whose request or decoding failed. Their items are missing.
    pub failed_pages: Vec<usize>,
}

impl<T> FetchOutcome<T> {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }
}

/// Webservice client for a single key.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Requester {
    client: reqwest::Client,
    endpoint: String,
    version: String,
    key: String,
    max_pages: usize,
    concurrency: usize,
}

impl Requester {
    /// Build a requester from the run settings, bound to the global key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &SyncSettings) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            version: settings.version.clone(),
            key: settings.webservice_key.clone().unwrap_or_default(),
            max_pages: settings.max_pages.max(1),
            concurrency: settings.concurrency.max(1),
        })
    }

    /// A copy of this requester bound to another webservice key.
    #[must_use]
    pub fn for_tenant(&self, key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..self.clone()
        }
    }

    /// Request URL for one page of `path`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not a valid base URL.
    pub fn url(&self, path: &str, page: usize, since: Option<DateTime<Utc>>) -> Result<Url> {
        let invalid = || Error::Config(format!("Invalid webservice endpoint: {}", self.endpoint));

        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push(&self.key)
            .extend(path.split('/'));

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("v", &self.version)
                .append_pair("pageSize", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());
            if let Some(since) = since {
                query.append_pair("start", &since.timestamp().to_string());
            }
        }

        Ok(url)
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        page: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<R> {
        let url = self.url(path, page, since)?;
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        debug!(
            url = %url,
            page,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );

        if status != StatusCode::OK {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Identifiers of the currently active properties. Single request.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error; there is no partial result.
    pub async fn fetch_active_ids(&self) -> Result<Vec<i64>> {
        let response: ActiveIdsResponse = self.get(ACTIVE_PROPERTIES_PATH, 1, None).await?;
        debug!(count = response.data.result.len(), "Active property ids fetched");
        Ok(response.data.result)
    }

    /// Fetch every page of the collection of `T`.
    ///
    /// Page 1 is requested first. When more pages exist, pages
    /// `2..=min(max_pages, total pages)` are fetched by
    /// `min(concurrency, pages)` workers. Item order across pages is not
    /// preserved.
    ///
    /// A failing page other than the first is logged and skipped; it shows
    /// up in [`FetchOutcome::failed_pages`].
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error when page 1 fails.
    pub async fn fetch_all<T: Resource>(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<FetchOutcome<T>> {
        let path = T::KIND.path();
        let first: PaginatedResponse<T> = self.get(path, 1, since).await?;

        let pages = first.max_pages().min(self.max_pages);
        if pages <= 1 || first.data.len() < first.page_size {
            debug!(resource = T::KIND.name(), count = first.data.len(), "Single page fetched");
            return Ok(FetchOutcome {
                items: first.data,
                failed_pages: Vec::new(),
            });
        }

        let workers = self.concurrency.min(pages);
        debug!(resource = T::KIND.name(), pages, workers, "Fetching remaining pages in parallel");

        let (job_tx, job_rx) = mpsc::channel::<usize>(workers);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<(usize, Result<Vec<T>>)>(workers);

        let mut set = JoinSet::new();
        for _ in 0..workers {
            let requester = self.clone();
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            set.spawn(async move {
                loop {
                    let next = jobs.lock().await.recv().await;
                    let Some(page) = next else { break };
                    let data = requester
                        .get::<PaginatedResponse<T>>(path, page, since)
                        .await
                        .map(|r| r.data);
                    if results.send((page, data)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut items = first.data;
        let mut failed_pages = Vec::new();
        let mut next_page = 2;
        let mut pending = 0usize;

        while next_page <= pages || pending > 0 {
            tokio::select! {
                permit = job_tx.reserve(), if next_page <= pages => {
                    let Ok(permit) = permit else { break };
                    permit.send(next_page);
                    next_page += 1;
                    pending += 1;
                }
                received = result_rx.recv(), if pending > 0 => {
                    let Some((page, data)) = received else { break };
                    pending -= 1;
                    match data {
                        Ok(mut page_items) => items.append(&mut page_items),
                        Err(e) => {
                            warn!(
                                resource = T::KIND.name(),
                                page,
                                error = %e,
                                "Page request failed, its items are skipped"
                            );
                            failed_pages.push(page);
                        }
                    }
                }
            }
        }
        drop(job_tx);

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!(resource = T::KIND.name(), error = %e, "Fetch worker aborted");
            }
        }

        if next_page <= pages || pending > 0 {
            return Err(Error::Other(format!(
                "Fetch workers for {} stopped before all pages were retrieved",
                T::KIND.name()
            )));
        }

        failed_pages.sort_unstable();
        Ok(FetchOutcome {
            items,
            failed_pages,
        })
    }
}
