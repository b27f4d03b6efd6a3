//! Query request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wire body for `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub query: String,
}

impl QueryRequest {
    /// Create a new query request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// A validated, non-empty question
///
/// No maximum length is enforced; the embedding and generation services
/// apply their own limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Validate a question
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::input("query must not be empty"));
        }
        Ok(Self(text))
    }

    /// The question text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<QueryRequest> for Query {
    type Error = Error;

    fn try_from(request: QueryRequest) -> Result<Self> {
        Self::new(request.query)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
