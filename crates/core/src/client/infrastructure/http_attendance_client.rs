use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::Url;

use crate::client::domain::attendance_api::{AttendanceApi, ClientError};
use crate::client::domain::server_reply::ServerReply;
use crate::encoding::domain::captured_image::CapturedImage;
use crate::shared::constants::{LOGIN_FACE_PATH, MARK_ATTENDANCE_PATH, REGISTER_PATH};

/// Blocking multipart client for the attendance server.
///
/// Holds a cookie store so that a face login and later requests made through
/// the same client share one server session. Requests have no timeout and
/// are never retried.
pub struct HttpAttendanceClient {
    base_url: Url,
    http: Client,
}

impl HttpAttendanceClient {
    /// Endpoint paths are root-absolute: any path component of `server_url`
    /// is replaced, so `http://host/app/` posts to `http://host/api/...`.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: server_url.to_string(),
            reason,
        };
        let base_url = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        let http = Client::builder()
            .cookie_store(true)
            .timeout(Option::<Duration>::None)
            .build()
            .map_err(|e| ClientError::Transport {
                url: server_url.to_string(),
                source: e,
            })?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    fn image_part(url: &Url, image: &CapturedImage) -> Result<Part, ClientError> {
        Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name())
            .mime_str(image.mime_type())
            .map_err(|e| ClientError::Transport {
                url: url.to_string(),
                source: e,
            })
    }

    fn submit(
        &self,
        path: &str,
        name: Option<&str>,
        image: &CapturedImage,
    ) -> Result<ServerReply, ClientError> {
        let url = self.endpoint(path)?;

        let mut form = Form::new();
        if let Some(name) = name {
            form = form.text("name", name.to_string());
        }
        form = form.part("image", Self::image_part(&url, image)?);

        log::debug!("POST {url} ({} byte image)", image.bytes().len());
        let transport = |e: reqwest::Error| ClientError::Transport {
            url: url.to_string(),
            source: e,
        };
        let response = self
            .http
            .post(url.clone())
            .multipart(form)
            .send()
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        let reply: ServerReply =
            serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
                url: url.to_string(),
                status: status.as_u16(),
                reason: e.to_string(),
            })?;

        if status.is_success() {
            log::debug!("{url} answered HTTP {status}");
        } else {
            log::warn!("{url} answered HTTP {status}: {}", reply.msg);
        }
        Ok(reply)
    }
}

impl AttendanceApi for HttpAttendanceClient {
    fn mark_attendance(&mut self, image: &CapturedImage) -> Result<ServerReply, ClientError> {
        self.submit(MARK_ATTENDANCE_PATH, None, image)
    }

    fn register(&mut self, name: &str, image: &CapturedImage) -> Result<ServerReply, ClientError> {
        self.submit(REGISTER_PATH, Some(name), image)
    }

    fn login_face(
        &mut self,
        name: &str,
        image: &CapturedImage,
    ) -> Result<ServerReply, ClientError> {
        self.submit(LOGIN_FACE_PATH, Some(name), image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    struct CannedResponse {
        status: u16,
        body: &'static str,
        extra_headers: &'static str,
    }

    fn json(status: u16, body: &'static str) -> CannedResponse {
        CannedResponse {
            status,
            body,
            extra_headers: "",
        }
    }

    /// Raw bytes of one HTTP request as seen by the loopback server.
    struct Recorded {
        head: String,
        body: Vec<u8>,
    }

    impl Recorded {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case(name)
                    .then(|| value.trim().to_string())
            })
        }

        fn body_contains(&self, needle: &[u8]) -> bool {
            find(&self.body, needle).is_some()
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Serves the canned responses to consecutive connections, one request
    /// per connection, and hands back what was received.
    fn serve(responses: Vec<CannedResponse>) -> (String, JoinHandle<Vec<Recorded>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for canned in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                recorded.push(read_request(&mut reader));

                let reason = if canned.status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {reason}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n{}\r\n{}",
                    canned.status,
                    canned.body.len(),
                    canned.extra_headers,
                    canned.body
                );
                let mut stream = stream;
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            recorded
        });

        (base, handle)
    }

    fn read_request(reader: &mut impl BufRead) -> Recorded {
        let mut head = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            head.push_str(&line);
        }
        let recorded = Recorded {
            head,
            body: Vec::new(),
        };

        let body = if let Some(len) = recorded.header("content-length") {
            let mut body = vec![0u8; len.parse().unwrap()];
            reader.read_exact(&mut body).unwrap();
            body
        } else {
            read_chunked(reader)
        };
        Recorded { body, ..recorded }
    }

    fn read_chunked(reader: &mut impl BufRead) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).unwrap();
            let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk).unwrap();
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
        body
    }

    fn jpeg_image() -> CapturedImage {
        CapturedImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 0xFF, 0xD9], 2, 2)
    }

    #[test]
    fn test_register_sends_name_then_image() {
        let (base, server) = serve(vec![json(200, r#"{"msg": "Registered Ada."}"#)]);
        let mut client = HttpAttendanceClient::new(&base).unwrap();

        let reply = client.register("Ada", &jpeg_image()).unwrap();
        assert_eq!(reply.msg, "Registered Ada.");

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert!(req.request_line().starts_with("POST /api/register "));
        assert!(req
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data"));

        let name_at = find(&req.body, b"name=\"name\"").expect("name field");
        let image_at = find(&req.body, b"name=\"image\"; filename=\"capture.jpg\"").expect("image");
        assert!(name_at < image_at);
        assert!(req.body_contains(b"\r\n\r\nAda\r\n"));
        assert!(req.body_contains(b"image/jpeg"));
        assert!(req.body_contains(&jpeg_image().into_bytes()));
    }

    #[test]
    fn test_mark_attendance_sends_only_image() {
        let (base, server) = serve(vec![json(
            200,
            r#"{"success": true, "msg": "Attendance marked for Ada."}"#,
        )]);
        let mut client = HttpAttendanceClient::new(&base).unwrap();

        let reply = client.mark_attendance(&jpeg_image()).unwrap();
        assert_eq!(reply.msg, "Attendance marked for Ada.");
        assert!(reply.is_success());

        let requests = server.join().unwrap();
        let req = &requests[0];
        assert!(req.request_line().starts_with("POST /api/mark_attendance "));
        assert!(!req.body_contains(b"name=\"name\""));
        assert!(req.body_contains(b"name=\"image\"; filename=\"capture.jpg\""));
    }

    #[test]
    fn test_error_status_with_json_is_returned_as_reply() {
        let (base, server) = serve(vec![json(
            401,
            r#"{"success": false, "msg": "Face not recognized."}"#,
        )]);
        let mut client = HttpAttendanceClient::new(&base).unwrap();

        let reply = client.mark_attendance(&jpeg_image()).unwrap();
        assert_eq!(reply.msg, "Face not recognized.");
        assert!(!reply.is_success());
        server.join().unwrap();
    }

    #[test]
    fn test_non_json_body_is_invalid_response() {
        let (base, server) = serve(vec![json(500, "<html>Internal Server Error</html>")]);
        let mut client = HttpAttendanceClient::new(&base).unwrap();

        match client.register("Ada", &jpeg_image()) {
            Err(ClientError::InvalidResponse { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_login_session_cookie_is_reused() {
        let login = CannedResponse {
            status: 200,
            body: r#"{"success": true, "msg": "Login successful!", "role": "student"}"#,
            extra_headers: "Set-Cookie: session=abc123; Path=/\r\n",
        };
        let (base, server) = serve(vec![
            login,
            json(200, r#"{"msg": "Attendance marked for Ada."}"#),
        ]);
        let mut client = HttpAttendanceClient::new(&base).unwrap();

        let reply = client.login_face("Ada", &jpeg_image()).unwrap();
        assert_eq!(reply.role.as_deref(), Some("student"));
        client.mark_attendance(&jpeg_image()).unwrap();

        let requests = server.join().unwrap();
        assert!(requests[0].request_line().starts_with("POST /api/login_face "));
        assert!(requests[0].body_contains(b"name=\"name\""));
        assert_eq!(requests[1].header("cookie").as_deref(), Some("session=abc123"));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut client = HttpAttendanceClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        assert!(matches!(
            client.mark_attendance(&jpeg_image()),
            Err(ClientError::Transport { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpAttendanceClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpAttendanceClient::new("mailto:someone@example.com"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_server_path_prefix_is_replaced() {
        let client = HttpAttendanceClient::new("http://attendance.local/app/").unwrap();
        assert_eq!(
            client.endpoint(MARK_ATTENDANCE_PATH).unwrap().as_str(),
            "http://attendance.local/api/mark_attendance"
        );
    }

    #[test]
    fn test_endpoints_resolve_against_server_root() {
        let client = HttpAttendanceClient::new("http://attendance.local:5000/").unwrap();
        assert_eq!(
            client.endpoint(REGISTER_PATH).unwrap().as_str(),
            "http://attendance.local:5000/api/register"
        );
        assert_eq!(client.base_url().host_str(), Some("attendance.local"));
    }
}
