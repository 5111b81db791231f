// src/domain/pagination.rs
use crate::domain::error::{DomainError, DomainResult};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// The 5th consecutive 503 on one page is fatal; the four before it sleep
/// `attempt x retry_delay`.
pub const MAX_RETRIES: u32 = 5;

/// One paged request against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub count: u64,
    pub since: Option<String>,
}

/// One page of raw item records plus the server-issued cursor.
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<Value>,
    pub since: Option<String>,
}

/// Source of pages. The production implementation talks HTTP; tests script
/// responses. A 503 must surface as [`DomainError::ServiceUnavailable`] so
/// the stream can retry it; everything else is fatal as-is.
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, request: &PageRequest) -> DomainResult<ItemPage>;
}

/// Callback invoked with the server's `since` token right after a non-empty
/// page is received, before its items are yielded. A crash mid-stream then
/// loses at most the in-flight page; upsert semantics make re-delivery safe.
pub type RecordSince<'a> = Box<dyn FnMut(&str) -> DomainResult<()> + 'a>;

type Sleeper<'a> = Box<dyn FnMut(Duration) + 'a>;

/// Lazy, finite stream of raw item records, oldest-added-first.
///
/// Not restartable mid-stream: to resume after an interruption, build a
/// fresh stream from the recorded cursor. An empty page terminates the
/// stream; the offset advances by exactly `page_size` per non-empty page
/// (the server's pagination contract is trusted over the actual item count).
pub struct ItemStream<'a> {
    source: &'a dyn PageSource,
    since: Option<String>,
    page_size: u64,
    page_sleep: Duration,
    retry_sleep: Duration,
    record_since: RecordSince<'a>,
    sleeper: Sleeper<'a>,
    offset: u64,
    pages_fetched: u64,
    buffer: VecDeque<Value>,
    done: bool,
}

impl<'a> ItemStream<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        since: Option<String>,
        page_size: u64,
        page_sleep: Duration,
        retry_sleep: Duration,
        record_since: RecordSince<'a>,
    ) -> Self {
        Self::with_sleeper(
            source,
            since,
            page_size,
            page_sleep,
            retry_sleep,
            record_since,
            Box::new(std::thread::sleep),
        )
    }

    /// Like [`ItemStream::new`] but with an injectable sleep function, so
    /// tests can assert on backoff without waiting it out.
    pub fn with_sleeper(
        source: &'a dyn PageSource,
        since: Option<String>,
        page_size: u64,
        page_sleep: Duration,
        retry_sleep: Duration,
        record_since: RecordSince<'a>,
        sleeper: Sleeper<'a>,
    ) -> Self {
        Self {
            source,
            since,
            page_size,
            page_sleep,
            retry_sleep,
            record_since,
            sleeper,
            offset: 0,
            pages_fetched: 0,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Fetch the next non-empty page, retrying 503s with linear backoff.
    /// `Ok(None)` means the stream is exhausted.
    fn next_page(&mut self) -> DomainResult<Option<Vec<Value>>> {
        // rate-limit pause between successive page requests
        if self.pages_fetched > 0 && !self.page_sleep.is_zero() {
            (self.sleeper)(self.page_sleep);
        }

        let request = PageRequest {
            offset: self.offset,
            count: self.page_size,
            since: self.since.clone(),
        };

        let mut retries = 0u32;
        loop {
            match self.source.fetch_page(&request) {
                Ok(page) => {
                    if page.items.is_empty() {
                        debug!(offset = request.offset, "empty page, stream exhausted");
                        return Ok(None);
                    }
                    if let Some(cursor) = page.since.as_deref() {
                        (self.record_since)(cursor)?;
                    }
                    self.offset += self.page_size;
                    self.pages_fetched += 1;
                    return Ok(Some(page.items));
                }
                Err(DomainError::ServiceUnavailable(msg)) => {
                    retries += 1;
                    if retries >= MAX_RETRIES {
                        return Err(DomainError::RemoteService(format!(
                            "giving up after {} consecutive 503s: {}",
                            retries, msg
                        )));
                    }
                    warn!(retries, "got a 503, retrying");
                    (self.sleeper)(self.retry_sleep * retries);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Iterator for ItemStream<'_> {
    type Item = DomainResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(record) = self.buffer.pop_front() {
            return Some(Ok(record));
        }
        match self.next_page() {
            Ok(Some(items)) => {
                self.buffer.extend(items);
                self.buffer.pop_front().map(Ok)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::sync::Mutex;

    /// Scripted page source: pops one canned response per request and
    /// remembers what was asked.
    struct ScriptedSource {
        responses: Mutex<VecDeque<DomainResult<ItemPage>>>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<DomainResult<ItemPage>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageSource for ScriptedSource {
        fn fetch_page(&self, request: &PageRequest) -> DomainResult<ItemPage> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted source ran out of responses")
        }
    }

    fn page(ids: &[i64], since: &str) -> DomainResult<ItemPage> {
        Ok(ItemPage {
            items: ids.iter().map(|id| json!({"item_id": id})).collect(),
            since: Some(since.to_string()),
        })
    }

    fn empty_page(since: &str) -> DomainResult<ItemPage> {
        Ok(ItemPage {
            items: Vec::new(),
            since: Some(since.to_string()),
        })
    }

    fn unavailable() -> DomainResult<ItemPage> {
        Err(DomainError::ServiceUnavailable("503".to_string()))
    }

    #[test]
    fn given_three_items_at_page_size_two_when_streamed_then_two_pages_and_stop() {
        let source = ScriptedSource::new(vec![
            page(&[1, 2], "100"),
            page(&[3], "200"),
            empty_page("200"),
        ]);
        let stream = ItemStream::with_sleeper(
            &source,
            None,
            2,
            Duration::from_secs(2),
            Duration::from_secs(3),
            Box::new(|_| Ok(())),
            Box::new(|_| {}),
        );

        let items: Vec<_> = stream.map(Result::unwrap).collect();
        assert_eq!(items.len(), 3);

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].offset, 0);
        assert_eq!(requests[1].offset, 2);
        // offset advances by page_size even though page two was short
        assert_eq!(requests[2].offset, 4);
    }

    #[test]
    fn given_pages_when_streamed_then_cursor_recorded_per_non_empty_page() {
        let source = ScriptedSource::new(vec![
            page(&[1, 2], "100"),
            page(&[3], "200"),
            empty_page("999"),
        ]);
        let recorded = RefCell::new(Vec::new());
        let stream = ItemStream::with_sleeper(
            &source,
            None,
            2,
            Duration::ZERO,
            Duration::ZERO,
            Box::new(|cursor| {
                recorded.borrow_mut().push(cursor.to_string());
                Ok(())
            }),
            Box::new(|_| {}),
        );
        assert_eq!(stream.count(), 3);

        // the terminal empty page's cursor is not recorded, so the stored
        // cursor is always the since of the last page that had items
        assert_eq!(*recorded.borrow(), vec!["100", "200"]);
    }

    #[test]
    fn given_resume_cursor_when_streamed_then_requests_carry_it() {
        let source = ScriptedSource::new(vec![empty_page("300")]);
        let stream = ItemStream::with_sleeper(
            &source,
            Some("250".to_string()),
            500,
            Duration::ZERO,
            Duration::ZERO,
            Box::new(|_| Ok(())),
            Box::new(|_| {}),
        );
        assert_eq!(stream.count(), 0);
        assert_eq!(source.requests()[0].since.as_deref(), Some("250"));
    }

    #[test]
    fn given_four_503s_then_success_when_streamed_then_backoff_sums_linear() {
        let source = ScriptedSource::new(vec![
            unavailable(),
            unavailable(),
            unavailable(),
            unavailable(),
            page(&[1], "100"),
            empty_page("100"),
        ]);
        let slept = RefCell::new(Vec::new());
        let retry = Duration::from_secs(3);
        let stream = ItemStream::with_sleeper(
            &source,
            None,
            2,
            Duration::ZERO,
            retry,
            Box::new(|_| Ok(())),
            Box::new(|d| slept.borrow_mut().push(d)),
        );
        let items: Vec<_> = stream.collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 1);

        let total: Duration = slept.borrow().iter().sum();
        assert_eq!(slept.borrow().as_slice(), &[retry, retry * 2, retry * 3, retry * 4]);
        assert_eq!(total, retry * 10);
    }

    #[test]
    fn given_five_consecutive_503s_when_streamed_then_fatal() {
        let source = ScriptedSource::new(vec![
            unavailable(),
            unavailable(),
            unavailable(),
            unavailable(),
            unavailable(),
        ]);
        let mut stream = ItemStream::with_sleeper(
            &source,
            None,
            2,
            Duration::ZERO,
            Duration::from_secs(3),
            Box::new(|_| Ok(())),
            Box::new(|_| {}),
        );
        let first = stream.next().unwrap();
        assert!(matches!(first, Err(DomainError::RemoteService(_))));
        // fatal error fuses the stream
        assert!(stream.next().is_none());
    }

    #[test]
    fn given_retries_interrupted_by_success_when_streamed_then_counter_resets() {
        let source = ScriptedSource::new(vec![
            unavailable(),
            unavailable(),
            page(&[1], "100"),
            unavailable(),
            unavailable(),
            unavailable(),
            page(&[2], "200"),
            empty_page("200"),
        ]);
        let stream = ItemStream::with_sleeper(
            &source,
            None,
            1,
            Duration::ZERO,
            Duration::ZERO,
            Box::new(|_| Ok(())),
            Box::new(|_| {}),
        );
        let items: Vec<_> = stream.collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn given_other_http_failure_when_streamed_then_fatal_without_retry() {
        let source = ScriptedSource::new(vec![Err(DomainError::RemoteService(
            "401 unauthorized".to_string(),
        ))]);
        let mut stream = ItemStream::with_sleeper(
            &source,
            None,
            2,
            Duration::ZERO,
            Duration::ZERO,
            Box::new(|_| Ok(())),
            Box::new(|_| {}),
        );
        assert!(matches!(
            stream.next().unwrap(),
            Err(DomainError::RemoteService(_))
        ));
        assert_eq!(source.requests().len(), 1);
    }

    #[test]
    fn given_page_sleep_when_streamed_then_pause_between_pages_only() {
        let source = ScriptedSource::new(vec![
            page(&[1], "100"),
            page(&[2], "200"),
            empty_page("200"),
        ]);
        let slept = RefCell::new(Vec::new());
        let pause = Duration::from_secs(2);
        let stream = ItemStream::with_sleeper(
            &source,
            None,
            1,
            pause,
            Duration::from_secs(3),
            Box::new(|_| Ok(())),
            Box::new(|d| slept.borrow_mut().push(d)),
        );
        assert_eq!(stream.count(), 2);
        // no pause before the first request, one before each later request
        assert_eq!(slept.borrow().as_slice(), &[pause, pause]);
    }
}
