//! Lazy item pagination
//!
//! An `ItemPager` hands out the items of the first page and fetches further
//! pages on demand by replaying the original call with the continuation token
//! of the previous page.

use super::result::ApiResult;
use crate::api::client::ClientCore;
use crate::api::groups::Endpoint;
use crate::api::params::CallArguments;
use crate::error::{ClientError, Result};
use futures::Stream;
use log::debug;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

pub struct ItemPager {
    core: Arc<ClientCore>,
    endpoint: Endpoint,
    args: CallArguments,
    buffer: VecDeque<Value>,
    continuation_token: Option<String>,
    more_items_remaining: Option<bool>,
    pages_fetched: u32,
}

impl ItemPager {
    pub(crate) fn new(
        core: Arc<ClientCore>,
        endpoint: Endpoint,
        args: CallArguments,
        items: Vec<Value>,
        continuation_token: Option<String>,
        more_items_remaining: Option<bool>,
    ) -> Self {
        Self {
            core,
            endpoint,
            args,
            buffer: items.into(),
            continuation_token,
            more_items_remaining,
            pages_fetched: 1,
        }
    }

    /// Items already fetched but not yet handed out
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// Pages retrieved so far, including the initial response
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Whether another page request will be made once the buffer drains
    pub fn has_more_pages(&self) -> bool {
        self.continuation_token.as_deref().is_some_and(|token| !token.is_empty())
            && self.more_items_remaining != Some(false)
    }

    /// Next item, fetching the following page when the buffer is empty.
    ///
    /// A failed page fetch surfaces as [`ClientError::Pagination`] and ends the
    /// iteration.
    pub async fn next(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if !self.has_more_pages() {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let Some(token) = self.continuation_token.take() else {
            return Ok(());
        };

        let page = self.pages_fetched + 1;
        debug!("Fetching page {} of {} {}", page, self.endpoint.operation.name(), self.endpoint.group);

        let mut args = self.args.clone();
        args.continuation_token = Some(token.clone());

        match self.core.fetch_page(self.endpoint, args, page, &token).await? {
            ApiResult::Valid(valid) => {
                self.pages_fetched = page;
                self.continuation_token = valid.continuation_token.clone();
                self.more_items_remaining = valid.more_items_remaining;
                self.buffer = valid.into_items().map(ItemPager::into_buffer).unwrap_or_default();
                Ok(())
            }
            ApiResult::Error(error) => {
                self.more_items_remaining = Some(false);
                Err(ClientError::Pagination(Box::new(error)))
            }
        }
    }

    pub(crate) fn into_buffer(self) -> VecDeque<Value> {
        self.buffer
    }

    /// Adapt the pager into a `Stream` of items
    pub fn into_stream(self) -> impl Stream<Item = Result<Value>> {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok::<_, ClientError>(pager.next().await?.map(|item| (item, pager)))
        })
    }

    /// Drain every remaining page into memory
    pub async fn collect_all(mut self) -> Result<Vec<Value>> {
        let mut items = Vec::with_capacity(self.buffer.len());
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}

impl std::fmt::Debug for ItemPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemPager")
            .field("group", &self.endpoint.group)
            .field("operation", &self.endpoint.operation.name())
            .field("buffered", &self.buffer.len())
            .field("continuation_token", &self.continuation_token)
            .field("more_items_remaining", &self.more_items_remaining)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
