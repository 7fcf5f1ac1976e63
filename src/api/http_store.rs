//! Implements the `BillsService` trait against the Billed REST API.

use crate::api::BillsService;
use crate::error::ServiceError;
use crate::model::{Bill, BillUpload, CreatedBill};
use crate::Result;
use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

const BILLS: &str = "bills";

/// Talks to the bills endpoints of the API found at `base_url`. Requests carry `jwt` as a bearer
/// token when one is available.
pub struct HttpStore {
    base_url: Url,
    jwt: Option<String>,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(base_url: Url, jwt: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            base_url,
            jwt,
            client,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Unable to build a URL for '{path}' from {}", self.base_url))
    }

    /// The URL of the bill `id`. The id is pushed as a single percent-encoded path segment.
    fn bill_url(&self, id: &str) -> Result<Url> {
        let mut url = self.url(BILLS)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("The API URL {} cannot be a base", self.base_url))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.jwt {
            Some(jwt) => request.bearer_auth(jwt),
            None => request,
        }
    }

    async fn send<T>(&self, request: RequestBuilder, what: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .authorize(request)
            .send()
            .await
            .with_context(|| format!("Failed to send the {what} request"))?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl BillsService for HttpStore {
    async fn list(&mut self) -> Result<Vec<Bill>> {
        let url = self.url(BILLS)?;
        trace!("GET {url}");
        self.send(self.client.get(url), "list").await
    }

    async fn create(&mut self, payload: BillUpload) -> Result<CreatedBill> {
        let url = self.url(BILLS)?;
        trace!("POST {url} with {}", payload.file.name());
        let part = Part::bytes(payload.file.content().to_vec())
            .file_name(payload.file.name().to_string())
            .mime_str(payload.file.mime_type())
            .with_context(|| format!("Invalid MIME type '{}'", payload.file.mime_type()))?;
        let form = Form::new().part("file", part).text("email", payload.email);
        self.send(self.client.post(url).multipart(form), "create")
            .await
    }

    async fn update(&mut self, bill: Bill) -> Result<Bill> {
        let id = bill
            .id
            .as_deref()
            .context("A bill cannot be updated before it has been created")?;
        let url = self.bill_url(id)?;
        trace!("PATCH {url}");
        self.send(self.client.patch(url).json(&bill), "update")
            .await
    }
}

/// Turns a non-success status into `ServiceError::Status` and decodes the body otherwise.
async fn decode<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::Status(status.as_u16()).into());
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SelectedFile;
    use crate::view;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const CREATED: &str = r#"{"fileUrl": "https://localhost:3456/images/facture.jpg", "key": "1234"}"#;

    /// Accepts one connection on a loopback port, answers it with `status` and `body`, and yields
    /// the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            request
        });
        (url, handle)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        while !request_complete(&buf) {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn request_complete(buf: &[u8]) -> bool {
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap());
        match content_length {
            Some(len) => buf.len() >= end + 4 + len,
            None if head.contains("transfer-encoding: chunked") => buf.ends_with(b"0\r\n\r\n"),
            None => true,
        }
    }

    fn store(url: Url) -> HttpStore {
        HttpStore::new(url, Some("jwt-value".to_string())).unwrap()
    }

    #[test]
    fn test_url_join() {
        let store = HttpStore::new(Url::parse("http://localhost:5678/").unwrap(), None).unwrap();
        assert_eq!(
            "http://localhost:5678/bills",
            store.url(BILLS).unwrap().as_str()
        );
        assert_eq!(
            "http://localhost:5678/bills/47qAXb6fIm2zOKkLzMro",
            store.bill_url("47qAXb6fIm2zOKkLzMro").unwrap().as_str()
        );
    }

    #[test]
    fn test_bill_url_encodes_id() {
        let store = HttpStore::new(Url::parse("http://localhost:5678/api/").unwrap(), None).unwrap();
        let url = store.bill_url("a?b#c/d").unwrap();
        assert_eq!("http://localhost:5678/api/bills/a%3Fb%23c%2Fd", url.as_str());
        assert_eq!(None, url.query());
        assert_eq!(None, url.fragment());
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let mut store =
            HttpStore::new(Url::parse("http://localhost:5678/").unwrap(), None).unwrap();
        let err = store.update(Bill::default()).await.unwrap_err();
        assert!(err.to_string().contains("before it has been created"));
    }

    #[tokio::test]
    async fn test_list_sends_bearer_token() {
        let body = r#"[{"id": "47qAXb6fIm2zOKkLzMro", "type": "Transports", "name": "vol", "date": "2004-04-04", "amount": "348", "status": "pending", "email": "a@a"}]"#;
        let (url, server) = serve_once("200 OK", body).await;
        let bills = store(url).list().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /bills HTTP/1.1\r\n"), "{request}");
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer jwt-value"));
        assert_eq!(1, bills.len());
        assert_eq!(Some(348), bills[0].amount);
        assert_eq!("vol", bills[0].name);
    }

    #[tokio::test]
    async fn test_list_without_jwt_has_no_authorization() {
        let (url, server) = serve_once("200 OK", "[]").await;
        let bills = HttpStore::new(url, None).unwrap().list().await.unwrap();
        let request = server.await.unwrap();
        assert!(bills.is_empty());
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_list_not_found() {
        let (url, server) = serve_once("404 Not Found", "").await;
        let err = store(url).list().await.unwrap_err();
        server.await.unwrap();
        assert_eq!(
            Some(&ServiceError::Status(404)),
            err.downcast_ref::<ServiceError>()
        );
        assert_eq!("Erreur 404", view::error_message(&err));
    }

    #[tokio::test]
    async fn test_list_server_error() {
        let (url, server) = serve_once("500 Internal Server Error", "").await;
        let err = store(url).list().await.unwrap_err();
        server.await.unwrap();
        assert_eq!("Erreur 500", view::error_message(&err));
    }

    #[tokio::test]
    async fn test_list_unreadable_body() {
        let (url, server) = serve_once("200 OK", "not json").await;
        let err = store(url).list().await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_create_sends_multipart_file_and_email() {
        let (url, server) = serve_once("200 OK", CREATED).await;
        let payload = BillUpload {
            file: SelectedFile::new("facture.jpg", "image/jpeg", b"jpeg bytes".to_vec()),
            email: "a@a".to_string(),
        };
        let created = store(url).create(payload).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!("1234", created.id());
        assert_eq!(
            "https://localhost:3456/images/facture.jpg",
            created.file_url
        );
        assert!(request.starts_with("POST /bills HTTP/1.1\r\n"), "{request}");
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(lower.contains("authorization: bearer jwt-value"));
        assert!(request.contains(r#"name="file"; filename="facture.jpg""#), "{request}");
        assert!(lower.contains("content-type: image/jpeg"));
        assert!(request.contains("jpeg bytes"));
        assert!(request.contains(r#"name="email""#));
        assert!(request.contains("\r\n\r\na@a\r\n"));
    }

    #[tokio::test]
    async fn test_update_patches_bill_by_id() {
        let echoed = r#"{"id": "47qAXb6fIm2zOKkLzMro", "type": "Transports", "name": "vol", "date": "2004-04-04", "amount": 348, "pct": 20, "status": "pending", "email": "a@a"}"#;
        let (url, server) = serve_once("200 OK", echoed).await;
        let bill = Bill {
            id: Some("47qAXb6fIm2zOKkLzMro".to_string()),
            expense_type: "Transports".to_string(),
            name: "vol".to_string(),
            date: "2004-04-04".to_string(),
            amount: Some(348),
            pct: Some(20),
            email: "a@a".to_string(),
            ..Default::default()
        };
        let updated = store(url).update(bill.clone()).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(bill, updated);
        assert!(
            request.starts_with("PATCH /bills/47qAXb6fIm2zOKkLzMro HTTP/1.1\r\n"),
            "{request}"
        );
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("content-type: application/json"));
        assert!(lower.contains("authorization: bearer jwt-value"));
        assert!(request.contains(r#""status":"pending""#));
        assert!(request.contains(r#""type":"Transports""#));
    }

    #[tokio::test]
    async fn test_update_failure_status() {
        let (url, server) = serve_once("500 Internal Server Error", "").await;
        let bill = Bill {
            id: Some("1234".to_string()),
            ..Default::default()
        };
        let err = store(url).update(bill).await.unwrap_err();
        server.await.unwrap();
        assert_eq!("Erreur 500", view::error_message(&err));
    }
}
