use anyhow::bail;

const PRODUCTION_URL: &str = "https://bloom-parse-server-production.azurewebsites.net/parse/";
const PRODUCTION_APP_ID: &str = "R6qNTeumQXjJCMutAJYAwPtip1qBulkFyLefkCE5";
const DEVELOP_URL: &str = "https://bloom-parse-server-develop.azurewebsites.net/parse/";
const DEVELOP_APP_ID: &str = "yrXftBF6mbAuVu3fO6LnhCJiHxZPIdE7gl1DUVGR";
const LOCAL_URL: &str = "http://localhost:1337/parse/";
const LOCAL_APP_ID: &str = "myAppId";

pub const ENVIRONMENTS: &[&str] = &["production", "develop", "local"];

/// Where the store lives and how to identify to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Always ends with `/`.
    pub url: String,
    pub app_id: String,
    pub session_token: Option<String>,
}

impl Connection {
    pub fn new(url: &str, app_id: &str) -> Connection {
        let url = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{url}/")
        };
        Connection {
            url,
            app_id: app_id.to_string(),
            session_token: None,
        }
    }

    pub fn for_environment(name: &str) -> anyhow::Result<Connection> {
        let (url, app_id) = match name {
            "production" => (PRODUCTION_URL, PRODUCTION_APP_ID),
            "develop" => (DEVELOP_URL, DEVELOP_APP_ID),
            "local" => (LOCAL_URL, LOCAL_APP_ID),
            other => bail!(
                "unknown server environment {other:?}, expected one of {}",
                ENVIRONMENTS.join(", ")
            ),
        };
        Ok(Connection::new(url, app_id))
    }

    pub fn with_session_token(mut self, token: Option<String>) -> Connection {
        self.session_token = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("X-Parse-Application-Id", self.app_id.clone()),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-Parse-Session-Token", token.clone()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environments() {
        let c = Connection::for_environment("develop").unwrap();
        assert_eq!(c.url, DEVELOP_URL);
        assert_eq!(c.app_id, DEVELOP_APP_ID);
        assert!(Connection::for_environment("staging").is_err());
    }

    #[test]
    fn test_url_gets_trailing_slash() {
        let c = Connection::new("http://localhost:1337/parse", "id");
        assert_eq!(c.url, "http://localhost:1337/parse/");
    }

    #[test]
    fn test_session_header() {
        let c = Connection::new("http://x/", "id");
        assert_eq!(c.headers().len(), 2);

        let c = c.with_session_token(Some(" abc ".to_string()));
        let headers = c.headers();
        assert_eq!(
            headers.last(),
            Some(&("X-Parse-Session-Token", "abc".to_string()))
        );

        let c = c.with_session_token(Some("  ".to_string()));
        assert!(c.session_token.is_none());
    }
}
