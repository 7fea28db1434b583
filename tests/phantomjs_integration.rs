//! End-to-end captures against a real PhantomJS binary
//!
//! Run with `BROWSERSHOT_PHANTOMJS=/path/to/phantomjs cargo test -- --ignored`.

use browsershot::{Browsershot, PaperSize};
use image::GenericImageView;
use std::sync::Once;
use tiny_http::{Response, Server};

static INIT: Once = Once::new();

fn start_test_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for request in server.incoming_requests() {
                let response = match request.url() {
                    "/" => Response::from_string(
                        r#"<!DOCTYPE html>
<html>
<head><title>Browsershot Test Page</title></head>
<body style="background: linear-gradient(#f00, #00f); height: 3000px">
<h1>Hello from Test Server</h1>
<p>This page is taller than any viewport used below.</p>
</body>
</html>"#,
                    )
                    .with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    ),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18090/".to_string()
}

#[test]
#[ignore] // Requires PhantomJS
fn test_png_capture_is_cropped() {
    let url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("page.png");

    let output = Browsershot::new()
        .set_url(&url)
        .unwrap()
        .set_width(320)
        .unwrap()
        .set_height(240)
        .set_timeout(200)
        .save(&target)
        .expect("capture failed");

    assert!(output.cropped);
    assert_eq!(image::open(&target).unwrap().dimensions(), (320, 240));
}

#[test]
#[ignore] // Requires PhantomJS
fn test_full_page_capture_is_taller_than_viewport() {
    let url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("page.jpg");

    Browsershot::new()
        .set_url(&url)
        .unwrap()
        .set_width(320)
        .unwrap()
        .set_height_to_render_whole_page()
        .set_timeout(200)
        .save(&target)
        .expect("capture failed");

    let (_, height) = image::open(&target).unwrap().dimensions();
    assert!(height > 2000, "full page height was {}", height);
}

#[test]
#[ignore] // Requires PhantomJS
fn test_pdf_capture() {
    let url = start_test_server();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("page.pdf");

    Browsershot::new()
        .set_url(&url)
        .unwrap()
        .set_paper_size(PaperSize::default())
        .set_timeout(200)
        .save(&target)
        .expect("capture failed");

    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
