// API client module: a small blocking client for the Open Trivia Database.
// The HTTP layer sits behind the `Transport` trait so the request building
// and response parsing can be exercised without touching the network.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::QuizError;
use crate::models::{Category, Difficulty, Question, QuestionCount};

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";
pub const BASE_URL_ENV: &str = "TRIVIA_API_URL";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues a GET request and returns the decoded JSON body.
pub trait Transport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, QuizError>;
}

/// `Transport` backed by a reqwest blocking client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, QuizError> {
        debug!("GET {} {:?}", url, query);
        let network = |source: reqwest::Error| QuizError::Network {
            url: url.to_string(),
            source,
        };
        let res = self.client.get(url).query(query).send().map_err(network)?;
        let status = res.status();
        if status.is_success() {
            // A body that is not JSON surfaces as a reqwest decode error.
            return res.json::<Value>().map_err(network);
        }
        // Error statuses may still carry the API envelope; its code wins.
        match res.json::<Value>().ok().as_ref().and_then(response_code) {
            Some(code) if code != 0 => Err(QuizError::from_response_code(code)),
            _ => Err(QuizError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Parameters of one `api.php` request, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionQuery {
    pub category: u32,
    pub difficulty: Difficulty,
    pub amount: QuestionCount,
}

impl QuestionQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("amount", self.amount.to_string()),
            ("difficulty", self.difficulty.to_string()),
            ("category", self.category.to_string()),
        ]
    }
}

#[derive(Deserialize)]
struct CategoryEnvelope {
    trivia_categories: Vec<Category>,
}

#[derive(Deserialize)]
struct QuestionEnvelope {
    results: Vec<Question>,
}

/// Trivia API client: the transport plus the base URL requests go to.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    base_url: String,
}

impl ApiClient<HttpTransport> {
    /// Create an ApiClient configured from the environment variable
    /// `TRIVIA_API_URL` or fall back to `https://opentdb.com`.
    pub fn from_env() -> Result<Self> {
        let base_url = base_url_or_default(std::env::var(BASE_URL_ENV).ok());
        let transport = HttpTransport::new(REQUEST_TIMEOUT)?;
        Ok(ApiClient::with_transport(transport, base_url))
    }
}

/// Blank values fall back to the default rather than producing relative URLs.
fn base_url_or_default(configured: Option<String>) -> String {
    configured
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.into())
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            transport,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the list of categories from `/api_category.php`.
    pub fn fetch_categories(&self) -> Result<Vec<Category>, QuizError> {
        let url = format!("{}/api_category.php", self.base_url);
        let body = self.transport.get_json(&url, &[])?;
        let envelope: CategoryEnvelope = serde_json::from_value(body)
            .map_err(|e| QuizError::DataFormat(format!("category list: {e}")))?;
        info!("fetched {} categories", envelope.trivia_categories.len());
        Ok(envelope.trivia_categories)
    }

    /// Validate the raw difficulty and count, then fetch a batch of
    /// questions. Nothing is sent when either value is invalid.
    pub fn fetch_questions(
        &self,
        category_id: u32,
        difficulty: &str,
        count: &str,
    ) -> Result<Vec<Question>, QuizError> {
        let query = QuestionQuery {
            category: category_id,
            difficulty: difficulty.parse()?,
            amount: count.parse()?,
        };
        self.fetch_question_batch(&query)
    }

    /// Fetch questions for an already validated query from `/api.php`.
    pub fn fetch_question_batch(&self, query: &QuestionQuery) -> Result<Vec<Question>, QuizError> {
        let url = format!("{}/api.php", self.base_url);
        let body = self.transport.get_json(&url, &query.params())?;
        let questions = parse_questions(body)?;
        info!(
            "fetched {} {} questions for category {}",
            questions.len(),
            query.difficulty,
            query.category
        );
        Ok(questions)
    }
}

fn response_code(body: &Value) -> Option<u8> {
    body.get("response_code")
        .and_then(Value::as_u64)
        .map(|code| u8::try_from(code).unwrap_or(u8::MAX))
}

fn parse_questions(body: Value) -> Result<Vec<Question>, QuizError> {
    let code = response_code(&body).unwrap_or(0);
    if code != 0 {
        return Err(QuizError::from_response_code(code));
    }
    let envelope: QuestionEnvelope = serde_json::from_value(body)
        .map_err(|e| QuizError::DataFormat(format!("question batch: {e}")))?;
    Ok(envelope.results.into_iter().map(Question::decoded).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    struct RecordingTransport {
        response: Value,
        calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl RecordingTransport {
        fn new(response: Value) -> Self {
            Self {
                response,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, QuizError> {
            let query = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            self.calls.borrow_mut().push((url.to_string(), query));
            Ok(self.response.clone())
        }
    }

    fn question_body() -> Value {
        json!({
            "response_code": 0,
            "results": [{
                "type": "multiple",
                "difficulty": "easy",
                "category": "General Knowledge",
                "question": "Which planet is known as the &quot;Red Planet&quot;?",
                "correct_answer": "Mars",
                "incorrect_answers": ["Venus", "Jupiter", "Saturn"]
            }]
        })
    }

    #[test]
    fn fetch_questions_builds_exact_query() {
        for difficulty in ["easy", "medium", "hard"] {
            for count in 1..=10u8 {
                let api = ApiClient::with_transport(
                    RecordingTransport::new(question_body()),
                    "http://trivia.test/",
                );
                api.fetch_questions(9, difficulty, &count.to_string())
                    .unwrap();

                let calls = api.transport().calls.borrow();
                assert_eq!(calls.len(), 1);
                let (url, query) = &calls[0];
                assert_eq!(url, "http://trivia.test/api.php");
                assert_eq!(
                    query,
                    &vec![
                        ("amount".to_string(), count.to_string()),
                        ("difficulty".to_string(), difficulty.to_string()),
                        ("category".to_string(), "9".to_string()),
                    ]
                );
            }
        }
    }

    #[test]
    fn invalid_parameters_fail_before_any_request() {
        let api = ApiClient::with_transport(RecordingTransport::new(question_body()), "http://t");
        for count in ["0", "11", "abc", "", "-3"] {
            assert!(matches!(
                api.fetch_questions(9, "easy", count),
                Err(QuizError::InvalidCount(_))
            ));
        }
        assert!(matches!(
            api.fetch_questions(9, "impossible", "5"),
            Err(QuizError::InvalidDifficulty(_))
        ));
        assert!(api.transport().calls.borrow().is_empty());
    }

    #[test]
    fn questions_are_decoded() {
        let api = ApiClient::with_transport(RecordingTransport::new(question_body()), "http://t");
        let questions = api.fetch_questions(17, "hard", "1").unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(
            questions[0].prompt,
            "Which planet is known as the \"Red Planet\"?"
        );
        assert_eq!(questions[0].correct_answer, "Mars");
        assert_eq!(questions[0].incorrect_answers.len(), 3);
    }

    #[test]
    fn fetch_categories_parses_list() {
        let body = json!({
            "trivia_categories": [
                {"id": 9, "name": "General Knowledge"},
                {"id": 10, "name": "Entertainment: Books"}
            ]
        });
        let api = ApiClient::with_transport(RecordingTransport::new(body), "http://t");
        let categories = api.fetch_categories().unwrap();
        assert_eq!(
            categories,
            vec![
                Category { id: 9, name: "General Knowledge".into() },
                Category { id: 10, name: "Entertainment: Books".into() },
            ]
        );
        let calls = api.transport().calls.borrow();
        assert_eq!(calls[0].0, "http://t/api_category.php");
        assert!(calls[0].1.is_empty());
    }

    #[test]
    fn missing_fields_are_data_format_errors() {
        let api = ApiClient::with_transport(RecordingTransport::new(json!({"other": []})), "http://t");
        assert!(matches!(api.fetch_categories(), Err(QuizError::DataFormat(_))));
        assert!(matches!(
            api.fetch_questions(9, "easy", "1"),
            Err(QuizError::DataFormat(_))
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let api = ApiClient::with_transport(RecordingTransport::new(json!({})), "http://trivia.test//");
        assert_eq!(api.base_url(), "http://trivia.test");
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let api = ApiClient::with_transport(transport, "http://127.0.0.1:9");
        match api.fetch_categories() {
            Err(QuizError::Network { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:9/api_category.php");
            }
            other => panic!("expected a network error, got {other:?}"),
        }
    }

    /// Answer a single HTTP request on a local port with a canned response.
    fn serve_once(status: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    fn http_client(base_url: String) -> ApiClient<HttpTransport> {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        ApiClient::with_transport(transport, base_url)
    }

    #[test]
    fn http_transport_parses_json_body() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"{"trivia_categories":[{"id":9,"name":"General Knowledge"}]}"#,
        );
        let categories = http_client(base).fetch_categories().unwrap();
        assert_eq!(categories, vec![Category { id: 9, name: "General Knowledge".into() }]);
    }

    #[test]
    fn server_error_status_is_reported() {
        let base = serve_once("500 Internal Server Error", "text/plain", "boom");
        match http_client(base.clone()).fetch_categories() {
            Err(QuizError::HttpStatus { url, status }) => {
                assert_eq!(status, 500);
                assert_eq!(url, format!("{base}/api_category.php"));
            }
            other => panic!("expected an HTTP status error, got {other:?}"),
        }
    }

    #[test]
    fn html_body_is_a_network_error() {
        let base = serve_once("200 OK", "text/html", "<html><body>maintenance</body></html>");
        assert!(matches!(
            http_client(base).fetch_categories(),
            Err(QuizError::Network { .. })
        ));
    }

    #[test]
    fn response_code_wins_over_error_status() {
        let base = serve_once(
            "429 Too Many Requests",
            "application/json",
            r#"{"response_code":5,"results":[]}"#,
        );
        assert!(matches!(
            http_client(base).fetch_questions(9, "easy", "3"),
            Err(QuizError::Api { code: 5, .. })
        ));
    }

    #[test]
    fn blank_base_url_falls_back_to_default() {
        assert_eq!(base_url_or_default(None), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some(String::new())), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some("   ".into())), DEFAULT_BASE_URL);
        assert_eq!(
            base_url_or_default(Some(" http://trivia.test ".into())),
            "http://trivia.test"
        );
    }

    #[test]
    fn non_zero_response_code_is_an_api_error() {
        let body = json!({"response_code": 1, "results": []});
        let api = ApiClient::with_transport(RecordingTransport::new(body), "http://t");
        assert!(matches!(
            api.fetch_questions(9, "hard", "10"),
            Err(QuizError::Api { code: 1, .. })
        ));
    }
}
