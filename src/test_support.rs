// Fakes shared by unit tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::documents::{ChunkMetadata, DocumentChunk};
use crate::generation::ChatModel;
use crate::rag::Retriever;
use crate::{AssistantError, Result};

pub fn chunk(text: &str, source: &str) -> DocumentChunk {
    DocumentChunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source_type: "pdf".to_string(),
            source_name: source.to_string(),
            page: Some(0),
            chunk_id: 0,
        },
    }
}

/// Returns the same chunks for every query, truncated to `k`
#[derive(Default)]
pub struct StaticRetriever {
    pub chunks: Vec<DocumentChunk>,
    pub requested_k: AtomicUsize,
    pub fail: bool,
}

impl StaticRetriever {
    pub fn new(chunks: Vec<DocumentChunk>) -> Self {
        Self {
            chunks,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        self.requested_k.store(k, Ordering::SeqCst);
        if self.fail {
            return Err(AssistantError::Database("index unavailable".to_string()));
        }
        Ok(self.chunks.iter().take(k).cloned().collect())
    }
}

/// Records every prompt and answers with a fixed reply
pub struct RecordingModel {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// A minimal text-layer PDF with one Helvetica line per page.
/// Page text must be ASCII without parentheses or backslashes.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use std::fmt::Write;

    let font_id = 3 + 2 * pages.len();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    ];
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            font_id,
            4 + 2 * i
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        write!(pdf, "{} 0 obj\n{}\nendobj\n", i + 1, body).expect("writing to a String");
    }

    let xref = pdf.len();
    write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1)
        .expect("writing to a String");
    for offset in offsets {
        write!(pdf, "{:010} 00000 n \n", offset).expect("writing to a String");
    }
    write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    )
    .expect("writing to a String");

    pdf.into_bytes()
}
