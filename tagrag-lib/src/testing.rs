//! Deterministic stand-ins for the external services, used by unit tests.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::embed::{Embedder, Embedding};
use crate::generate::Generator;
use crate::{Error, Result};

/// Substrings identifying each prompt kind.
pub const ENUMERATION: &str = "list the names of all APIs";
pub const OVERVIEW: &str = "overall content, purpose or use";
pub const NAMED: &str = "API list:";
pub const GATE: &str = "### Rules ###";
pub const ANSWER: &str = "Answer the question using only";

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
}

/// Generator answering from a list of `(needle, reply)` rules.
///
/// The first rule whose needle occurs in the prompt wins. Unmatched prompts
/// get "None", which reads as "no" for yes/no checks and as an empty list for
/// entry extraction. Every prompt is recorded.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    rules: Vec<(String, Reply)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, needle: &str, text: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Text(text.to_string())));
        self
    }

    pub fn fail(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of recorded prompts containing `needle`.
    pub fn calls(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Reply::Text("None".to_string()));
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(Error::Generation("scripted failure".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Embedder returning fixed vectors per exact text; unknown text maps to `fallback`.
#[derive(Debug, Clone)]
pub struct TableEmbedder {
    table: HashMap<String, Embedding>,
    fallback: Embedding,
    pub calls: usize,
    pub fail: bool,
}

impl TableEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            table: HashMap::new(),
            fallback: vec![0.0; dimension],
            calls: 0,
            fail: false,
        }
    }

    pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.table.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn lookup(&self, text: &str) -> Embedding {
        self.table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Embedder for TableEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.calls += 1;
        if self.fail {
            return Err(Error::Embedding("table embedder offline".to_string()));
        }
        Ok(texts.iter().map(|t| self.lookup(t)).collect())
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.calls += 1;
        if self.fail {
            return Err(Error::Embedding("table embedder offline".to_string()));
        }
        Ok(self.lookup(text))
    }

    fn dimension(&self) -> usize {
        self.fallback.len()
    }

    fn model_name(&self) -> &str {
        "table"
    }
}

/// Base URL of a local server that accepts one connection and never replies.
pub fn silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(Duration::from_secs(10));
            drop(stream);
        }
    });
    format!("http://{addr}")
}

/// Base URL of a local server that reads one request and answers with
/// `status` and a JSON `body`.
pub fn canned_endpoint(status: u16, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&stream);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn read_request(stream: &TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;
    let mut line = String::new();
    while reader.read_line(&mut line).unwrap_or(0) > 0 {
        if line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        line.clear();
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
}
