// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! AI-assisted security review of contract source.

use crate::{
    constants::{REVIEW_ENDPOINT, REVIEW_MAX_OUTPUT_TOKENS, REVIEW_MODEL},
    macros::*,
    ReviewConfig,
};
use eyre::{bail, eyre, Result, WrapErr};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use sol_deploy_util::{color::Color, sys};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn weight(self) -> u64 {
        match self {
            Self::Low => 10,
            Self::Medium => 25,
            Self::High => 50,
            Self::Critical => 100,
        }
    }

    /// Reads a reviewer's severity label in any case. Unknown labels are `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "severe" => Self::Critical,
            "high" => Self::High,
            "low" | "info" | "informational" | "note" => Self::Low,
            _ => Self::Medium,
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Self::Low => text.mint(),
            Self::Medium => text.yellow(),
            Self::High => text.pink(),
            Self::Critical => text.red(),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Self::from_label(&label),
            _ => Self::default(),
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(
        default,
        deserialize_with = "loose_line",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub recommendation: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default, deserialize_with = "loose_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "loose_issues")]
    pub critical_issues: Vec<Issue>,
    #[serde(default, deserialize_with = "loose_issues")]
    pub warnings: Vec<Issue>,
    #[serde(default, deserialize_with = "loose_issues")]
    pub suggestions: Vec<Issue>,
    #[serde(default)]
    pub overall_risk: Severity,
}

// Reviewer output drifts from the requested shape; accept what carries meaning.

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Accepts `42`, `"42"` or `"L42-50"`.
fn loose_line<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(text) => {
            let digits: String = text
                .trim_start_matches(|c: char| !c.is_ascii_digit())
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

/// Issues may arrive as objects or bare strings. Anything else is dropped.
fn loose_issues<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Issue>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(vec![]);
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(title) => Some(Issue {
                title,
                ..Default::default()
            }),
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect())
}

impl Report {
    /// A report that carries the reviewer's text verbatim when it could not be parsed.
    pub fn unstructured(text: &str) -> Self {
        Self {
            summary: text.to_owned(),
            overall_risk: Severity::Medium,
            ..Default::default()
        }
    }
}

/// Sums issue weights over critical issues and warnings. Suggestions do not count.
pub fn risk_score(report: &Report) -> u64 {
    report
        .critical_issues
        .iter()
        .chain(&report.warnings)
        .map(|issue| issue.severity.weight())
        .sum()
}

/// Reads a report from reviewer output, which may wrap the JSON in a fenced block.
/// Only output that is not a JSON object falls back to an unstructured report.
pub fn parse_report(text: &str) -> Report {
    let json = fenced_block(text).unwrap_or(text.trim());
    serde_json::from_str(json).unwrap_or_else(|_| Report::unstructured(text))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Something that can assess contract source for security problems.
pub trait Reviewer {
    async fn review(&self, source: &str) -> Result<Report>;
}

/// Reviews through an OpenAI-style responses endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiReviewer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiReviewer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: REVIEW_MODEL.into(),
            endpoint: REVIEW_ENDPOINT.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Reviewer for OpenAiReviewer {
    async fn review(&self, source: &str) -> Result<Report> {
        let request = json!({
            "model": self.model,
            "input": review_prompt(source),
            "max_output_tokens": REVIEW_MAX_OUTPUT_TOKENS,
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .wrap_err("failed to send review request")?;

        let status = resp.status();
        let body = resp.text().await.wrap_err("failed to read review response")?;
        let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("failed to analyze contract");
            bail!("review failed: HTTP {status}: {message}");
        }
        if body.is_null() {
            bail!("review endpoint returned a malformed response");
        }
        Ok(parse_report(&response_text(&body)))
    }
}

/// Extracts the generated text from a responses payload.
pub fn response_text(body: &Value) -> String {
    let outputs = body["output"].as_array().into_iter().flatten();
    let contents = outputs.flat_map(|output| output["content"].as_array().into_iter().flatten());
    contents
        .filter_map(|content| content["text"].as_str())
        .find(|text| !text.trim().is_empty())
        .or(body["output_text"].as_str())
        .unwrap_or_default()
        .to_owned()
}

fn review_prompt(source: &str) -> String {
    format!(
        r#"You are a smart contract security expert. Analyze the following Solidity contract and return a structured JSON analysis.

Return output strictly in JSON format:
{{
  "summary": "Brief overview of the contract and its security posture",
  "criticalIssues": [
    {{
      "title": "Issue title",
      "description": "Detailed description",
      "severity": "critical",
      "line": 10,
      "recommendation": "How to fix"
    }}
  ],
  "warnings": [],
  "suggestions": [],
  "overallRisk": "low|medium|high|critical"
}}

Focus on reentrancy, integer overflow and underflow, access control, gas usage, logic errors and violations of best practices.

Contract code:
{source}
"#
    )
}

/// Prints a report to stdout.
pub fn print_report(report: &Report) {
    let risk = report.overall_risk;
    greyln!(
        "security review: {} risk (score {})",
        risk.paint(&risk.to_string()),
        risk_score(report)
    );
    if !report.summary.is_empty() {
        println!("{}", report.summary);
    }

    let sections = [
        ("critical issues", &report.critical_issues),
        ("warnings", &report.warnings),
        ("suggestions", &report.suggestions),
    ];
    for (name, issues) in sections {
        if issues.is_empty() {
            continue;
        }
        greyln!("{name}:");
        for issue in issues {
            let line = issue.line.map(|l| format!(" (line {l})")).unwrap_or_default();
            let badge = issue.severity.paint(&format!("[{}]", issue.severity));
            println!("  {badge} {}{}", issue.title, line.grey());
            if !issue.description.is_empty() {
                println!("    {}", issue.description);
            }
            if !issue.recommendation.is_empty() {
                println!("    {} {}", "fix:".grey(), issue.recommendation);
            }
        }
    }
}

/// Reviews a source file and prints the report.
pub async fn review_source(cfg: ReviewConfig) -> Result<()> {
    let source = sys::read_file_or_stdin(&cfg.source)?;
    let reviewer = cfg.review_opts.reviewer()?;
    let report = reviewer.review(&source).await?;
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report);
    if report.overall_risk >= Severity::High {
        mintln!("NOTE: address the reported issues before deploying");
    }
    Ok(())
}

impl crate::ReviewOpts {
    pub fn reviewer(&self) -> Result<OpenAiReviewer> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| eyre!("OpenAI API key is not configured (set OPENAI_API_KEY)"))?;
        Ok(OpenAiReviewer::new(api_key)
            .with_model(&self.review_model)
            .with_endpoint(&self.review_endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    const REPORT: &str = r#"{
        "summary": "Simple token",
        "criticalIssues": [
            { "title": "Reentrancy", "description": "withdraw", "severity": "critical", "line": 42, "recommendation": "use checks-effects-interactions" }
        ],
        "warnings": [
            { "title": "Floating pragma", "description": "", "severity": "low", "recommendation": "pin it" },
            { "title": "Unchecked call", "description": "", "severity": "high", "recommendation": "" }
        ],
        "suggestions": [
            { "title": "Use immutable", "description": "", "severity": "medium", "recommendation": "" }
        ],
        "overallRisk": "high"
    }"#;

    #[test]
    fn parses_plain_and_fenced() {
        let test_cases = vec![
            REPORT.to_owned(),
            format!("```json\n{REPORT}\n```"),
            format!("Here is the analysis:\n```\n{REPORT}\n```\nDone."),
        ];
        for text in test_cases {
            let report = parse_report(&text);
            assert_eq!(report.summary, "Simple token");
            assert_eq!(report.overall_risk, Severity::High);
            assert_eq!(report.critical_issues[0].line, Some(42));
            assert_eq!(report.warnings[1].severity, Severity::High);
            assert_eq!(report.suggestions.len(), 1);
        }
    }

    #[test]
    fn falls_back_to_text() {
        let text = "The contract looks fine, no JSON today.";
        let report = parse_report(text);
        assert_eq!(report, Report::unstructured(text));
        assert_eq!(report.overall_risk, Severity::Medium);
        assert!(report.critical_issues.is_empty());

        let broken = "```json\n{ \"summary\": \n```";
        assert_eq!(parse_report(broken).summary, broken);
    }

    #[test]
    fn tolerates_loose_fields() {
        let text = r#"{
            "summary": null,
            "criticalIssues": [
                { "title": "Reentrancy", "severity": "Critical", "line": "42" },
                { "title": "Oracle", "severity": "CRITICAL", "line": "L7-9", "description": 3 }
            ],
            "warnings": [
                { "title": "Events", "severity": "informational" },
                "Floating pragma",
                17
            ],
            "suggestions": null,
            "overallRisk": "Critical"
        }"#;
        let report = parse_report(text);
        assert_eq!(report.overall_risk, Severity::Critical);
        assert_eq!(report.summary, "");
        assert_eq!(report.critical_issues.len(), 2);
        assert_eq!(report.critical_issues[0].line, Some(42));
        assert_eq!(report.critical_issues[1].line, Some(7));
        assert_eq!(report.critical_issues[1].description, "3");
        assert_eq!(report.warnings[0].severity, Severity::Low);
        assert_eq!(report.warnings[1].title, "Floating pragma");
        assert_eq!(report.warnings[1].severity, Severity::Medium);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.suggestions.is_empty());
        // 100 + 100 + 10 + 25
        assert_eq!(risk_score(&report), 235);
    }

    #[test]
    fn severity_labels() {
        let test_cases = vec![
            ("critical", Severity::Critical),
            (" High ", Severity::High),
            ("MEDIUM", Severity::Medium),
            ("info", Severity::Low),
            ("unknown", Severity::Medium),
        ];
        for (label, want) in test_cases {
            assert_eq!(Severity::from_label(label), want, "{label}");
        }
        let risk: Severity = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(risk, Severity::Medium);
    }

    #[test]
    fn scores_risk() {
        // 100 + 10 + 50; suggestions are ignored
        assert_eq!(risk_score(&parse_report(REPORT)), 160);
        assert_eq!(risk_score(&Report::default()), 0);
    }

    #[test]
    fn extracts_response_text() {
        let test_cases = vec![
            (
                json!({ "output": [
                    { "type": "reasoning", "summary": [] },
                    { "type": "message", "content": [{ "type": "output_text", "text": "hello" }] }
                ]}),
                "hello",
            ),
            (json!({ "output": [], "output_text": "fallback" }), "fallback"),
            (json!({}), ""),
        ];
        for (body, want) in test_cases {
            assert_eq!(response_text(&body), want);
        }
    }

    /// Serves a single canned HTTP response and hands back the raw request.
    fn serve_once(status: &str, body: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/responses", listener.local_addr().unwrap());
        let status = status.to_owned();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = vec![];
            let mut buf = [0; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head) = text.find("\r\n\r\n") {
                    let len = text[..head]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= head + 4 + len || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    fn reviewer(url: &str) -> OpenAiReviewer {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        OpenAiReviewer::new("test-key")
            .with_endpoint(url)
            .with_client(client)
    }

    #[tokio::test]
    async fn reviews_over_http() {
        let body = json!({ "output": [{ "content": [{ "text": format!("```json\n{REPORT}\n```") }] }] });
        let (url, server) = serve_once("200 OK", body.to_string());

        let report = reviewer(&url).review("contract A {}").await.unwrap();
        assert_eq!(report.overall_risk, Severity::High);

        let request = server.join().unwrap();
        assert!(request.to_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains("gpt-5-nano"));
        assert!(request.contains("\"max_output_tokens\":2000"));
        assert!(request.contains("contract A {}"));
    }

    #[tokio::test]
    async fn surfaces_api_errors() {
        let body = json!({ "error": { "message": "invalid api key" } });
        let (url, server) = serve_once("401 Unauthorized", body.to_string());

        let err = reviewer(&url).review("contract A {}").await.unwrap_err();
        assert!(err.to_string().contains("invalid api key"), "{err}");
        server.join().unwrap();
    }
}
