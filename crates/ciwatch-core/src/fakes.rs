//! In-memory fake for the build API (testing only)
//!
//! `ScriptedBuildApi` replays queued responses for the listing and detail
//! endpoints and counts how often each endpoint was hit, so tests can
//! assert on budget consumption without any network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{BuildApi, BuildDetail, BuildSummary};
use crate::error::{WatchError, WatchResult};

enum Scripted<T> {
    Response(T),
    TransportError,
}

/// Scripted [`BuildApi`] backed by two response queues.
///
/// Listing calls pop from the listing queue; once it is empty every
/// further call returns an empty page ("build not found"). Detail calls
/// pop from the detail queue; once it is empty the last popped detail is
/// repeated, so a single queued non-terminal status models a build that
/// stays in progress.
#[derive(Default)]
pub struct ScriptedBuildApi {
    listings: Mutex<VecDeque<Scripted<Vec<BuildSummary>>>>,
    details: Mutex<VecDeque<Scripted<BuildDetail>>>,
    last_detail: Mutex<Option<BuildDetail>>,
    listing_calls: AtomicU32,
    detail_calls: AtomicU32,
}

impl ScriptedBuildApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one listing page.
    pub fn push_listing(&self, builds: Vec<BuildSummary>) {
        self.listings
            .lock()
            .unwrap()
            .push_back(Scripted::Response(builds));
    }

    /// Queue a transport failure for the next listing call.
    pub fn push_listing_error(&self) {
        self.listings
            .lock()
            .unwrap()
            .push_back(Scripted::TransportError);
    }

    /// Queue one detail record.
    pub fn push_detail(&self, detail: BuildDetail) {
        self.details
            .lock()
            .unwrap()
            .push_back(Scripted::Response(detail));
    }

    /// Queue a detail record with the given status and a canned URL.
    pub fn push_detail_status(&self, status: &str) {
        self.push_detail(BuildDetail {
            status: status.to_string(),
            build_url: "https://circleci.example.com/gh/acme/shop/1".to_string(),
        });
    }

    /// Queue a transport failure for the next detail call.
    pub fn push_detail_error(&self) {
        self.details
            .lock()
            .unwrap()
            .push_back(Scripted::TransportError);
    }

    /// Number of listing-endpoint calls made so far.
    pub fn listing_calls(&self) -> u32 {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Number of detail-endpoint calls made so far.
    pub fn detail_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn transport_error() -> WatchError {
        WatchError::Http("scripted transport failure".to_string())
    }
}

#[async_trait]
impl BuildApi for ScriptedBuildApi {
    async fn recent_builds(&self) -> WatchResult<Vec<BuildSummary>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        match self.listings.lock().unwrap().pop_front() {
            Some(Scripted::Response(builds)) => Ok(builds),
            Some(Scripted::TransportError) => Err(Self::transport_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn build_detail(&self, _build_num: u64) -> WatchResult<BuildDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        match self.details.lock().unwrap().pop_front() {
            Some(Scripted::Response(detail)) => {
                *self.last_detail.lock().unwrap() = Some(detail.clone());
                Ok(detail)
            }
            Some(Scripted::TransportError) => Err(Self::transport_error()),
            None => self
                .last_detail
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(Self::transport_error),
        }
    }
}
