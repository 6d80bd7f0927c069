use std::fmt::Debug;
use std::ops::Deref;

use chrono::Utc;

/// Channel payload wrapper that records where and when a message was produced.
#[derive(Clone, Debug)]
pub struct Message<T> {
    pub inner: T,
    pub source: Option<String>,
    pub time: Option<chrono::DateTime<Utc>>,
}

impl<T> Message<T> {
    pub fn new(t: T) -> Self {
        Message { inner: t, source: None, time: None }
    }

    pub fn new_with_source(t: T, source: &str) -> Self {
        Message { inner: t, source: Some(source.to_string()), time: Some(Utc::now()) }
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("unknown")
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Debug + Clone> Deref for Message<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
