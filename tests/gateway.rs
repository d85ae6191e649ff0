//! End-to-end gateway tests over real sockets.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use mirror_proxy::{GatewayConfig, HttpServer, Shutdown};

mod common;
use common::{start_mock_upstream, MockResponse};

fn gateway_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.origin = format!("http://{}", upstream);
    config.upstream.path_prefix = "/go".to_string();
    config
}

async fn start_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("server assembly");
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (format!("http://{}", addr), shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

#[tokio::test]
async fn html_is_rewritten_and_bootstrap_injected() {
    let upstream = start_mock_upstream(|req| {
        MockResponse::new(200)
            .header("content-type", "text/html; charset=utf-8")
            .header("x-upstream-path", &req.path)
            .body(
                r#"<html><head><title>X</title></head><body><a href="/x">l</a><a href="/go/y">m</a></body></html>"#,
            )
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client()
        .get(format!("{}/go/page", base))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    // the mirrored prefix was stripped before forwarding
    assert_eq!(res.headers()["x-upstream-path"], "/page");

    let declared_length: usize = res.headers()["content-length"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body = res.text().await.unwrap();
    assert_eq!(declared_length, body.len());

    // script sits immediately after the <head> opening tag
    assert!(body.contains("<head><script>"));
    assert!(body.contains("beforeinstallprompt"));
    // root-relative link prefixed, already-prefixed link untouched
    assert!(body.contains(r#"href="/go/x""#));
    assert!(body.contains(r#"href="/go/y""#));
    assert!(!body.contains("/go/go/"));

    shutdown.trigger();
}

#[tokio::test]
async fn upstream_receives_virtual_host_without_referer() {
    let upstream = start_mock_upstream(|req| {
        MockResponse::new(200)
            .header("content-type", "text/plain")
            .header("x-echo-host", req.header("host").unwrap_or(""))
            .header("x-had-referer", &req.header("referer").is_some().to_string())
            .header(
                "x-echo-accept-encoding",
                req.header("accept-encoding").unwrap_or(""),
            )
            .body("ok")
    })
    .await;

    let mut config = gateway_config(upstream);
    config.upstream.host_header = Some("app.upstream.example".to_string());
    let (base, shutdown) = start_gateway(config).await;

    let res = client()
        .get(format!("{}/go/x", base))
        .header("referer", "http://secret.proxy.example/go/x")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-echo-host"], "app.upstream.example");
    assert_eq!(res.headers()["x-had-referer"], "false");
    assert_eq!(res.headers()["x-echo-accept-encoding"], "identity");

    shutdown.trigger();
}

#[tokio::test]
async fn passthrough_forwards_original_path_without_rewriting() {
    let upstream = start_mock_upstream(|req| {
        MockResponse::new(200)
            .header("content-type", "text/html")
            .header("x-upstream-path", &req.path)
            .header("x-frame-options", "DENY")
            .body(r#"<head></head><a href="/x">l</a>"#)
    })
    .await;

    let mut config = gateway_config(upstream);
    config.passthrough.prefixes = vec!["/api/".to_string()];
    let (base, shutdown) = start_gateway(config).await;

    let res = client()
        .get(format!("{}/api/v1/data", base))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    // path forwarded unstripped
    assert_eq!(res.headers()["x-upstream-path"], "/api/v1/data");
    // drop-list still enforced on passthrough responses
    assert!(res.headers().get("x-frame-options").is_none());

    // no rewriting, no injection, even for a text content type
    let body = res.text().await.unwrap();
    assert_eq!(body, r#"<head></head><a href="/x">l</a>"#);

    shutdown.trigger();
}

#[tokio::test]
async fn binary_bodies_pass_through_byte_for_byte() {
    let payload: Vec<u8> = {
        let mut p = vec![0x00, 0xFF, 0x1F, 0x8B, 0x07];
        p.extend_from_slice(b"https://anywhere.example/x and href=\"/x\"");
        p
    };
    let expected = payload.clone();

    let upstream = start_mock_upstream(move |_| {
        MockResponse::new(200)
            .header("content-type", "application/octet-stream")
            .body(payload.clone())
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client()
        .get(format!("{}/go/blob.bin", base))
        .send()
        .await
        .unwrap();

    let declared_length: usize = res.headers()["content-length"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(declared_length, expected.len());
    let body = res.bytes().await.unwrap();
    assert_eq!(&body[..], &expected[..]);

    shutdown.trigger();
}

#[tokio::test]
async fn set_cookie_is_rescoped_to_the_proxy_host() {
    let upstream = start_mock_upstream(|_| {
        MockResponse::new(200)
            .header("content-type", "text/plain")
            .header(
                "set-cookie",
                "session=abc; Domain=upstream.com; Secure; SameSite=None",
            )
            .header("set-cookie", "theme=dark; Path=/")
            .body("ok")
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client().get(format!("{}/go/x", base)).send().await.unwrap();

    let cookies: Vec<_> = res
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        cookies,
        vec![
            "session=abc; Domain=127.0.0.1; SameSite=Lax".to_string(),
            "theme=dark; Path=/".to_string(),
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn isolation_headers_never_reach_the_client() {
    let upstream = start_mock_upstream(|_| {
        MockResponse::new(200)
            .header("content-type", "text/html")
            .header("x-frame-options", "DENY")
            .header("content-security-policy", "default-src 'self'")
            .header("content-security-policy-report-only", "default-src 'self'")
            .header("strict-transport-security", "max-age=63072000")
            .header("cross-origin-opener-policy", "same-origin")
            .header("permissions-policy", "geolocation=()")
            .header("x-custom", "kept")
            .body("<head></head>ok")
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client().get(format!("{}/go/x", base)).send().await.unwrap();

    for name in [
        "x-frame-options",
        "content-security-policy",
        "content-security-policy-report-only",
        "strict-transport-security",
        "cross-origin-opener-policy",
        "permissions-policy",
    ] {
        assert!(res.headers().get(name).is_none(), "{name} leaked");
    }
    assert_eq!(res.headers()["x-custom"], "kept");

    shutdown.trigger();
}

#[tokio::test]
async fn gzip_clients_get_compressed_rewritten_bodies() {
    let upstream = start_mock_upstream(|_| {
        MockResponse::new(200)
            .header("content-type", "text/html")
            .body(r#"<html><head></head><a href="/x">l</a></html>"#)
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client()
        .get(format!("{}/go/page", base))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["content-encoding"], "gzip");
    let declared_length: usize = res.headers()["content-length"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let compressed = res.bytes().await.unwrap();
    assert_eq!(declared_length, compressed.len());

    let text = String::from_utf8(gunzip(&compressed)).unwrap();
    assert!(text.contains(r#"href="/go/x""#));
    assert!(text.contains("<head><script>"));

    shutdown.trigger();
}

#[tokio::test]
async fn encoded_upstream_bodies_are_decoded_defensively() {
    // upstream ignores Accept-Encoding: identity and sends gzip anyway
    let upstream = start_mock_upstream(|_| {
        MockResponse::new(200)
            .header("content-type", "application/javascript")
            .header("content-encoding", "gzip")
            .body(gzip(b"fetch('/assets/a.js')"))
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client()
        .get(format!("{}/go/bundle.js", base))
        .send()
        .await
        .unwrap();

    assert!(res.headers().get("content-encoding").is_none());
    let body = res.text().await.unwrap();
    assert_eq!(body, "fetch('/go/assets/a.js')");

    shutdown.trigger();
}

#[tokio::test]
async fn manifest_entry_points_carry_the_prefix() {
    let upstream = start_mock_upstream(|_| {
        MockResponse::new(200)
            .header("content-type", "application/manifest+json")
            .body(r#"{"scope":"/","start_url":"/"}"#)
    })
    .await;

    let (base, shutdown) = start_gateway(gateway_config(upstream)).await;
    let res = client()
        .get(format!("{}/go/manifest.webmanifest", base))
        .send()
        .await
        .unwrap();

    let body = res.text().await.unwrap();
    assert_eq!(body, r#"{"scope":"/go/","start_url":"/go/"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn unmatched_paths_serve_the_application_shell() {
    let upstream = start_mock_upstream(|_| MockResponse::new(500).body("never called")).await;

    let shell = std::env::temp_dir().join(format!(
        "mirror-proxy-shell-{}-{}",
        std::process::id(),
        line!()
    ));
    std::fs::create_dir_all(shell.join("assets")).unwrap();
    std::fs::write(shell.join("index.html"), "<html>shell</html>").unwrap();
    std::fs::write(shell.join("assets/app.css"), "body{margin:0}").unwrap();

    let mut config = gateway_config(upstream);
    config.static_files.root = shell.to_str().unwrap().to_string();
    let (base, shutdown) = start_gateway(config).await;

    // SPA fallback: any unmatched path serves index.html
    let res = client()
        .get(format!("{}/app/settings", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<html>shell</html>");

    // build assets are immutable and long-cached
    let res = client()
        .get(format!("{}/assets/app.css", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["cache-control"],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(res.text().await.unwrap(), "body{margin:0}");

    shutdown.trigger();
    let _ = std::fs::remove_dir_all(shell);
}

#[tokio::test]
async fn unreachable_upstream_yields_bad_gateway() {
    // reserve a port, then close it
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let (base, shutdown) = start_gateway(gateway_config(dead_addr)).await;
    let res = client().get(format!("{}/go/x", base)).send().await.unwrap();
    assert_eq!(res.status(), 502);

    shutdown.trigger();
}
