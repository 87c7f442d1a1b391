//! Request URLs and canonical mount paths
//!
//! A publisher asks for `/<name>?record`, a player for `/<name>`. Both end
//! up referencing the same logical path `/<name>`.

/// Query marker of a publish request
pub const RECORD_QUERY: &str = "record";

/// Suffix of the path the record endpoint is mounted at
pub const RECORD_SUFFIX: &str = "?record";

/// What a client wants to do with a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Push a stream into the path
    Publish,
    /// Play the path's stream
    Subscribe,
}

impl Role {
    /// Role implied by a request's query string
    pub fn from_query(query: Option<&str>) -> Self {
        if query == Some(RECORD_QUERY) {
            Role::Publish
        } else {
            Role::Subscribe
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Publish => f.write_str("publish"),
            Role::Subscribe => f.write_str("subscribe"),
        }
    }
}

/// Path and query of a request URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    /// Absolute path, without query
    pub abspath: String,
    /// Query string, without the leading `?`
    pub query: Option<String>,
}

impl RequestUrl {
    pub fn new(abspath: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            abspath: abspath.into(),
            query: query.map(str::to_owned),
        }
    }

    /// Split `"/cam1?record"` into path and query
    pub fn parse(url: &str) -> Self {
        match url.split_once('?') {
            Some((abspath, query)) => Self::new(abspath, Some(query)),
            None => Self::new(url, None),
        }
    }

    pub fn role(&self) -> Role {
        Role::from_query(self.query.as_deref())
    }
}

/// Path the record endpoint of `abspath` is mounted at
pub fn record_path(abspath: &str) -> String {
    format!("{}{}", abspath, RECORD_SUFFIX)
}

/// Mount path handed back to the engine for a request
pub fn canonical_path(abspath: &str, role: Role) -> String {
    match role {
        Role::Publish => record_path(abspath),
        Role::Subscribe => abspath.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_url() {
        let url = RequestUrl::parse("/cam1");

        assert_eq!(url.abspath, "/cam1");
        assert_eq!(url.query, None);
        assert_eq!(url.role(), Role::Subscribe);
    }

    #[test]
    fn test_parse_record_url() {
        let url = RequestUrl::parse("/cam1?record");

        assert_eq!(url.abspath, "/cam1");
        assert_eq!(url.role(), Role::Publish);
    }

    #[test]
    fn test_other_queries_subscribe() {
        assert_eq!(RequestUrl::parse("/cam1?RECORD").role(), Role::Subscribe);
        assert_eq!(RequestUrl::parse("/cam1?record=1").role(), Role::Subscribe);
        assert_eq!(RequestUrl::parse("/cam1?").role(), Role::Subscribe);
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("/cam1", Role::Subscribe), "/cam1");
        assert_eq!(canonical_path("/cam1", Role::Publish), "/cam1?record");
    }
}
