//! Terminal rendering of answers and failures

use console::style;
use diet_rag::{AnswerResponse, Error};
use std::io::{self, Write};

/// Print an answer followed by its source metadata, numbered from 1
pub fn render_answer<W: Write>(out: &mut W, response: &AnswerResponse) -> io::Result<()> {
    writeln!(out, "{}", style("Answer:").bold().green())?;
    writeln!(out, "{}", response.answer.trim())?;

    if response.sources.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{}", style("Source Metadata").bold().cyan())?;
    for (i, metadata) in response.sources.iter().enumerate() {
        let pretty = serde_json::to_string_pretty(metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(out, "{}", style(format!("Source {}:", i + 1)).bold())?;
        writeln!(out, "{}", pretty)?;
    }
    Ok(())
}

/// Print a failure to reach or use the backend
pub fn render_error<W: Write>(out: &mut W, error: &Error) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        style("Error communicating with backend:").bold().red(),
        error.message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn metadata(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn render(response: &AnswerResponse) -> String {
        let mut out = Vec::new();
        render_answer(&mut out, response).unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
    }

    #[test]
    fn test_sources_numbered_from_one() {
        let response = AnswerResponse {
            answer: "Protein repairs muscle.".to_string(),
            sources: vec![
                metadata(json!({"source": "doc1.pdf"})),
                metadata(json!({"source": "doc2.pdf", "page": 3})),
            ],
        };

        let text = render(&response);

        assert!(text.starts_with("Answer:\nProtein repairs muscle.\n"));
        assert!(text.contains("Source Metadata"));
        let first = text.find("Source 1:").unwrap();
        let second = text.find("Source 2:").unwrap();
        assert!(first < second);
        assert!(text.contains("\"source\": \"doc2.pdf\""));
        assert!(!text.contains("Source 0:"));
    }

    #[test]
    fn test_no_sources_block_when_empty() {
        let response = AnswerResponse {
            answer: "I don't know.".to_string(),
            sources: Vec::new(),
        };
        assert!(!render(&response).contains("Source Metadata"));
    }

    #[test]
    fn test_error_uses_message() {
        let mut out = Vec::new();
        render_error(&mut out, &Error::transport("connection refused")).unwrap();
        let text = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
        assert_eq!(text, "Error communicating with backend: connection refused\n");
    }
}
