use super::*;
use crate::session::Cookie;
use std::sync::Mutex;

// =========================================================================
// MockTransport
// =========================================================================

struct MockTransport {
    responses: Mutex<Vec<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    fn new(responses: Vec<Result<HttpResponse, String>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses), requests: Mutex::new(Vec::new()) })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(TransportError::Exchange("no response queued".into()));
        }
        responses.remove(0).map_err(TransportError::Exchange)
    }
}

fn body(body: &str) -> Result<HttpResponse, String> {
    Ok(HttpResponse { status: 200, set_cookies: Vec::new(), body: body.into() })
}

fn login_ok(token: &str) -> Result<HttpResponse, String> {
    Ok(HttpResponse {
        status: 200,
        set_cookies: vec!["sid=abc123; Path=/; HttpOnly".into()],
        body: format!(r#"<script>var i9 = "{token}";</script>"#),
    })
}

fn client(mock: &Arc<MockTransport>) -> PokecClient {
    PokecClient::with_transport(ClientConfig::default(), mock.clone())
}

async fn logged_in(mock: &Arc<MockTransport>) -> PokecClient {
    let mut c = client(mock);
    c.login("alice", "secret1").await.unwrap();
    c
}

// =========================================================================
// RecordingDiagnostics
// =========================================================================

#[derive(Default)]
struct RecordingDiagnostics {
    events: Mutex<Vec<String>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: &Diagnostic<'_>) {
        let line = match event {
            Diagnostic::Call { operation, detail } => format!("call {operation} {detail}"),
            Diagnostic::Failure { operation, error } => format!("fail {operation} {}", error.error_code()),
        };
        self.events.lock().unwrap().push(line);
    }
}

// =========================================================================
// list_rooms
// =========================================================================

#[tokio::test]
async fn list_rooms_filters_empty_rooms() {
    let mock = MockTransport::new(vec![body(r#"[["Group A",[["Chat1","101",5],["Chat2","102",0]],"g1"]]"#)]);
    let result = client(&mock).list_rooms().await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({
            "data": [{ "_id": "g1", "title": "Group A", "rooms": [{ "_id": "101", "title": "Chat1", "chatters": 5 }] }]
        })
    );

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.host, wire::CHAT_HOST);
    assert_eq!(req.path, "/zoznam-miestnosti/");
    assert_eq!(req.header("Cookie"), Some("about_cookie_usage=true"));
    assert_eq!(req.header("Content-Type"), Some(wire::FORM_CONTENT_TYPE));
    assert_eq!(req.header("Content-Length"), None);
    assert!(req.body.is_none());
}

#[tokio::test]
async fn list_rooms_parse_error() {
    let mock = MockTransport::new(vec![body("<html>maintenance</html>")]);
    let err = client(&mock).list_rooms().await.unwrap_err();
    assert!(matches!(err, PokecError::Parse { operation: Operation::ListRooms, .. }));
}

#[tokio::test]
async fn list_rooms_request_error() {
    let mock = MockTransport::new(vec![Err("connection refused".into())]);
    let err = client(&mock).list_rooms().await.unwrap_err();
    assert!(matches!(err, PokecError::Request { operation: Operation::ListRooms, .. }));
    assert!(err.to_string().contains("connection refused"));
}

// =========================================================================
// login / logout
// =========================================================================

#[tokio::test]
async fn login_stores_token_and_cookies() {
    let mock = MockTransport::new(vec![login_ok("TOK42")]);
    let mut c = client(&mock);

    let result = c.login("alice", "secret1").await.unwrap();
    assert_eq!(result.data.token, "TOK42");
    assert_eq!(result.data.cookies.last(), Some(&Cookie::new("sid", "abc123")));
    assert_eq!(c.session().token(), "TOK42");

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.host, wire::AUTH_HOST);
    assert_eq!(req.path, "/overenie?isWap=0");
    let form = "form[username]=alice&form[password]=secret1";
    assert_eq!(req.body.as_deref(), Some(form));
    assert_eq!(req.header("Content-Length"), Some(form.len().to_string().as_str()));
    assert_eq!(req.header("Cookie"), Some("about_cookie_usage=true"));
}

#[tokio::test]
async fn login_drops_login_token_cookie() {
    let mock = MockTransport::new(vec![Ok(HttpResponse {
        status: 200,
        set_cookies: vec!["loginToken=stale; Path=/".into(), "sid=1".into()],
        body: "i9='T';".into(),
    })]);
    let mut c = client(&mock);
    let result = c.login("alice", "pw").await.unwrap();
    assert!(result.data.cookies.iter().all(|k| k.key != "loginToken"));
    assert_eq!(result.data.cookies.len(), 2);
}

#[tokio::test]
async fn login_sends_default_cookies_after_previous_session() {
    let mock = MockTransport::new(vec![login_ok("ONE"), login_ok("TWO")]);
    let mut c = client(&mock);
    c.login("alice", "pw").await.unwrap();
    c.login("alice", "pw").await.unwrap();

    assert_eq!(mock.requests()[1].header("Cookie"), Some("about_cookie_usage=true"));
    assert_eq!(c.session().token(), "TWO");
}

#[tokio::test]
async fn login_without_token_fails_and_clears_session() {
    let mock = MockTransport::new(vec![login_ok("OLD"), body("<html>Nesprávne meno</html>")]);
    let mut c = client(&mock);
    c.login("alice", "pw").await.unwrap();

    let err = c.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, PokecError::Authentication(_)));
    assert_eq!(err.to_string(), "login failed");
    assert!(!c.session().is_authenticated());
}

#[tokio::test]
async fn login_rejects_empty_credentials_without_request() {
    let mock = MockTransport::new(vec![]);
    let mut c = client(&mock);

    assert!(matches!(c.login("", "pw").await, Err(PokecError::Validation(_))));
    assert!(matches!(c.login("alice", "").await, Err(PokecError::Validation(_))));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn login_request_error() {
    let mock = MockTransport::new(vec![Err("tls handshake".into())]);
    let err = client(&mock).login("alice", "pw").await.unwrap_err();
    assert!(matches!(err, PokecError::Request { operation: Operation::Login, .. }));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let mock = MockTransport::new(vec![login_ok("TOK")]);
    let mut c = logged_in(&mock).await;

    let first = c.logout();
    let second = c.logout();
    assert_eq!(first, second);
    assert_eq!(first.token, "");
    assert_eq!(first.cookies, vec![Cookie::consent()]);
}

// =========================================================================
// send_message
// =========================================================================

#[tokio::test]
async fn send_message_requires_token() {
    let mock = MockTransport::new(vec![]);
    let c = client(&mock);

    for (message, room, to) in [("hi", 101, "all"), ("", 0, ""), ("hi", 0, "bob")] {
        let err = c.send_message_to(message, room, to).await.unwrap_err();
        assert!(matches!(err, PokecError::Authentication(_)));
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn send_message_validates_arguments() {
    let mock = MockTransport::new(vec![login_ok("TOK")]);
    let c = logged_in(&mock).await;

    for (message, room, to) in [("", 101, "all"), ("hi", 0, "all"), ("hi", 101, "")] {
        let err = c.send_message_to(message, room, to).await.unwrap_err();
        assert!(matches!(err, PokecError::Validation(_)));
    }
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn send_message_accepted() {
    let mock = MockTransport::new(vec![login_ok("TOK42"), body(r#"{"sendMessage":1}"#)]);
    let c = logged_in(&mock).await;

    c.send_message("hi", 101).await.unwrap();

    let req = &mock.requests()[1];
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.host, wire::CHAT_HOST);
    assert_eq!(req.path, "/_s/sklo/posliPrispevok.php?i9=TOK42");
    assert_eq!(req.body.as_deref(), Some("idRoom=101&message=hi&to=all"));
    assert_eq!(req.header("Cookie"), Some("about_cookie_usage=true;sid=abc123"));
    assert_eq!(req.header("Content-Length"), Some("28"));
}

#[tokio::test]
async fn send_message_wraps_room_id_to_32_bits() {
    let mock = MockTransport::new(vec![login_ok("T"), body(r#"{"sendMessage":1}"#)]);
    let c = logged_in(&mock).await;

    c.send_message_to("hi", (1_i64 << 32) + 7, "bob").await.unwrap();
    assert_eq!(mock.requests()[1].body.as_deref(), Some("idRoom=7&message=hi&to=bob"));
}

#[tokio::test]
async fn send_message_rejected_with_reason() {
    let mock = MockTransport::new(vec![login_ok("T"), body(r#"{"sendMessage":0,"errorMessage":"Room closed"}"#)]);
    let c = logged_in(&mock).await;

    let err = c.send_message("hi", 101).await.unwrap_err();
    assert!(matches!(err, PokecError::Send { .. }));
    assert!(err.to_string().ends_with("Room closed"));
}

#[tokio::test]
async fn send_message_parse_error() {
    let mock = MockTransport::new(vec![login_ok("T"), body("Internal Server Error")]);
    let c = logged_in(&mock).await;

    let err = c.send_message("hi", 101).await.unwrap_err();
    assert!(matches!(err, PokecError::Parse { operation: Operation::SendMessage, .. }));
}

// =========================================================================
// ping
// =========================================================================

#[tokio::test]
async fn ping_requires_token() {
    let mock = MockTransport::new(vec![]);
    let err = client(&mock).ping().await.unwrap_err();
    assert!(matches!(err, PokecError::Authentication(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn ping_unwraps_jsonp() {
    let mock = MockTransport::new(vec![login_ok("TOK"), body(r#"jsonp({"online":12,"messages":[]});"#)]);
    let c = logged_in(&mock).await;

    let result = c.ping().await.unwrap();
    assert_eq!(result.data, serde_json::json!({ "online": 12, "messages": [] }));

    let req = &mock.requests()[1];
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.host, wire::STATUS_HOST);
    assert!(req.path.starts_with("/_s/system/ping.php?i9=TOK&callback=jsonp&st=&cf=0&_="));
    let stamp = req.path.rsplit("&_=").next().unwrap();
    assert!(stamp.parse::<u128>().unwrap() > 0);
}

#[tokio::test]
async fn ping_accepts_plain_json() {
    let mock = MockTransport::new(vec![login_ok("TOK"), body(r#"{"online":1}"#)]);
    let c = logged_in(&mock).await;
    assert_eq!(c.ping().await.unwrap().data["online"], 1);
}

#[tokio::test]
async fn ping_parse_error() {
    let mock = MockTransport::new(vec![login_ok("TOK"), body("jsonp(<oops>);")]);
    let c = logged_in(&mock).await;
    let err = c.ping().await.unwrap_err();
    assert!(matches!(err, PokecError::Parse { operation: Operation::Ping, .. }));
}

// =========================================================================
// diagnostics
// =========================================================================

#[tokio::test]
async fn diagnostics_record_calls_and_failures() {
    let mock = MockTransport::new(vec![body("nope")]);
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let mut c = PokecClient::with_transport(ClientConfig::default().verbose(true), mock.clone())
        .with_diagnostics(diagnostics.clone());

    let _ = c.login("alice", "secret1").await;

    let events = diagnostics.events.lock().unwrap().clone();
    assert_eq!(events[0], "call login username=alice password=***");
    assert!(events.iter().any(|e| e == "call logout "));
    assert_eq!(events.last().map(String::as_str), Some("fail login E_AUTHENTICATION"));
    assert!(events.iter().all(|e| !e.contains("secret1")));
}

#[tokio::test]
async fn verbose_config_is_kept() {
    let mock = MockTransport::new(vec![]);
    let c = PokecClient::with_transport(ClientConfig::default().verbose(true), mock);
    assert!(c.config().verbose);
}
