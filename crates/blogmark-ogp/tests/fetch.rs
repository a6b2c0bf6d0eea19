#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use std::{net::SocketAddr, time::Duration};

use blogmark_ogp::{FetchError, HttpPageSource, OgpConfig, PageSource};
use mockito::{Matcher, Server};
use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::{TcpListener, TcpStream},
};
use url::Url;

fn source(max_body_bytes: usize, timeout: Duration) -> HttpPageSource {
  HttpPageSource::new(&OgpConfig {
    max_body_bytes,
    timeout,
    ..OgpConfig::default()
  })
  .expect("client builds")
}

fn page_url(server: &Server, path: &str) -> Url {
  Url::parse(&format!("{}{path}", server.url())).expect("valid url")
}

async fn read_request(socket: &mut TcpStream) {
  let mut request = Vec::new();
  let mut buf = [0_u8; 1024];
  while !request.windows(4).any(|w| w == b"\r\n\r\n") {
    let n = socket.read(&mut buf).await.expect("read request");
    if n == 0 {
      break;
    }
    request.extend_from_slice(&buf[..n]);
  }
}

/// Serve one connection: read the request, write `response` verbatim, then
/// keep the socket open for `hold`.
async fn serve_raw(response: Vec<u8>, hold: Duration) -> SocketAddr {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.expect("accept");
    read_request(&mut socket).await;
    socket.write_all(&response).await.expect("write response");
    tokio::time::sleep(hold).await;
  });
  addr
}

#[tokio::test]
async fn test_fetches_html_page() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/post")
    .match_header("user-agent", Matcher::Regex("^blogmark-ogp/".to_string()))
    .with_status(200)
    .with_header("content-type", "text/html; charset=utf-8")
    .with_body("<title>Hello</title>")
    .create_async()
    .await;

  let body = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/post"))
    .await
    .expect("page fetched");

  assert_eq!(body, "<title>Hello</title>");
  mock.assert_async().await;
}

#[tokio::test]
async fn test_rejects_non_html() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/data.json")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body("{}")
    .create_async()
    .await;

  let result = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/data.json"))
    .await;
  assert!(matches!(result, Err(FetchError::ContentType(_))));
}

#[tokio::test]
async fn test_rejects_error_status() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/gone")
    .with_status(404)
    .with_header("content-type", "text/html")
    .with_body("<title>Not Found</title>")
    .create_async()
    .await;

  let result = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/gone"))
    .await;
  assert!(matches!(result, Err(FetchError::Status(404))));
}

#[tokio::test]
async fn test_rejects_oversized_content_length() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/big")
    .with_status(200)
    .with_header("content-type", "text/html")
    .with_body("x".repeat(2048))
    .create_async()
    .await;

  let result = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/big"))
    .await;
  assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024 })));
}

#[tokio::test]
async fn test_rejects_oversized_stream() {
  let chunk = "a".repeat(600);
  let response = format!(
    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: \
     chunked\r\nConnection: close\r\n\r\n258\r\n{chunk}\r\n258\r\n{chunk}\r\n0\
     \r\n\r\n"
  );
  let addr = serve_raw(response.into_bytes(), Duration::ZERO).await;

  let url = Url::parse(&format!("http://{addr}/stream")).expect("valid url");
  let result = source(1000, Duration::from_secs(5)).fetch_page(&url).await;
  assert!(matches!(result, Err(FetchError::TooLarge { limit: 1000 })));
}

#[tokio::test]
async fn test_times_out_on_silent_server() {
  let addr = serve_raw(Vec::new(), Duration::from_secs(30)).await;

  let url = Url::parse(&format!("http://{addr}/slow")).expect("valid url");
  let result = source(1024, Duration::from_millis(200))
    .fetch_page(&url)
    .await;
  assert!(matches!(result, Err(FetchError::Timeout(_))));
}

#[tokio::test]
async fn test_invalid_utf8_is_decoded_lossily() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/latin1")
    .with_status(200)
    .with_header("content-type", "text/html")
    .with_body(b"<title>caf\xe9</title>".as_slice())
    .create_async()
    .await;

  let body = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/latin1"))
    .await
    .expect("page fetched");
  assert_eq!(body, "<title>caf\u{FFFD}</title>");
}

#[tokio::test]
async fn test_redirect_to_internal_host_is_not_followed() {
  let mut server = Server::new_async().await;
  server
    .mock("GET", "/hop")
    .with_status(302)
    .with_header("location", "https://169.254.169.254/latest/meta-data")
    .create_async()
    .await;

  let result = source(1024, Duration::from_secs(5))
    .fetch_page(&page_url(&server, "/hop"))
    .await;
  assert!(matches!(result, Err(FetchError::Status(302))));
}
