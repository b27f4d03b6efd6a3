//! Prompt templates for "stuff" retrieval QA

use crate::types::RetrievedDocument;

/// Separator placed between document bodies in the context
const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate every document body, in order, into one context block
    pub fn build_context(documents: &[RetrievedDocument]) -> String {
        documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    /// Build the full question-answering prompt around a context block
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = context,
            question = question
        )
    }

    /// Stuff all documents into a single prompt
    pub fn build_stuff_prompt(question: &str, documents: &[RetrievedDocument]) -> String {
        Self::build_qa_prompt(question, &Self::build_context(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_order() {
        let docs = vec![
            RetrievedDocument::with_source("Protein is a macronutrient.", "doc1.pdf"),
            RetrievedDocument::with_source("Leucine triggers muscle synthesis.", "doc2.pdf"),
        ];
        let context = PromptBuilder::build_context(&docs);
        assert_eq!(
            context,
            "Protein is a macronutrient.\n\nLeucine triggers muscle synthesis."
        );
    }

    #[test]
    fn test_stuff_prompt_contains_question_and_documents() {
        let docs = vec![RetrievedDocument::with_source("Fibre aids digestion.", "fibre.pdf")];
        let prompt = PromptBuilder::build_stuff_prompt("Why eat fibre?", &docs);

        assert!(prompt.contains("Fibre aids digestion."));
        assert!(prompt.ends_with("Question: Why eat fibre?\nHelpful Answer:"));
        assert!(!prompt.contains("fibre.pdf"));
    }

    #[test]
    fn test_empty_context() {
        let prompt = PromptBuilder::build_stuff_prompt("What is protein?", &[]);
        assert!(prompt.contains("don't try to make up an answer.\n\n\n\nQuestion: What is protein?"));
    }
}
