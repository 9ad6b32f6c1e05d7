use reqwest::{blocking::RequestBuilder, Method};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use url::Url;

use crate::query::QueryDocument;

use super::{
    backend::{CatalogBackend, QueryResponse},
    connection::Connection,
    errors::AppError,
};

/// Store error code for a missing object.
const OBJECT_NOT_FOUND: i64 = 101;

pub struct ParseRemote {
    connection: Connection,
    client: reqwest::blocking::Client,
}

impl ParseRemote {
    pub fn new(connection: Connection) -> ParseRemote {
        ParseRemote {
            connection,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn class_url(&self, class: &str, id: Option<&str>) -> Result<Url, AppError> {
        let path = match id {
            Some(id) => format!("classes/{class}/{id}"),
            None => format!("classes/{class}"),
        };
        Ok(Url::parse(&self.connection.url)?.join(&path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::info!("{method} {url}");

        self.connection
            .headers()
            .into_iter()
            .fold(self.client.request(method, url), |req, (name, value)| {
                req.header(name, value)
            })
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum ServerResponse<T> {
    Error { code: i64, error: String },
    Data(T),
}

fn handle_response<T>(response: reqwest::blocking::Response) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    let text = response.text()?;

    let server_response = serde_json::from_str::<ServerResponse<T>>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        err
    })?;

    match server_response {
        ServerResponse::Data(data) => Ok(data),
        ServerResponse::Error { code, .. } if code == OBJECT_NOT_FOUND => Err(AppError::NotFound),
        ServerResponse::Error { code, error } => Err(AppError::Server { code, error }),
    }
}

impl CatalogBackend for ParseRemote {
    fn query(&self, class: &str, doc: &QueryDocument) -> anyhow::Result<QueryResponse, AppError> {
        let mut url = self.class_url(class, None)?;
        url.query_pairs_mut().extend_pairs(doc.to_query_pairs());

        let resp = self.request(Method::GET, url).send()?;

        handle_response(resp)
    }

    fn get(&self, class: &str, id: &str) -> anyhow::Result<Value, AppError> {
        let url = self.class_url(class, Some(id))?;
        let resp = self.request(Method::GET, url).send()?;

        handle_response(resp)
    }

    fn update(&self, class: &str, id: &str, body: &Value) -> anyhow::Result<(), AppError> {
        let url = self.class_url(class, Some(id))?;
        let resp = self.request(Method::PUT, url).json(body).send()?;

        let answer: Value = handle_response(resp)?;
        log::debug!("updated {class}/{id}: {answer}");

        Ok(())
    }
}
