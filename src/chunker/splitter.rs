use tracing::debug;

use super::{ChunkOptions, tokenize};
use crate::document::{Document, chunk_id};

/// Split a single document into overlapping chunks.
///
/// Rules:
/// - Empty content, or content that fits in `max_tokens`, returns the
///   document unchanged as the only element
/// - Otherwise a window of `max_tokens` slides over the tokens, advancing by
///   `max_tokens - overlap` (at least one token) until it reaches the end
/// - Each chunk gets `id = parent#index`, links back via `parent_id` and
///   owns a copy of the parent's metadata
pub fn chunk_document(doc: &Document, options: &ChunkOptions) -> Vec<Document> {
    let opts = options.resolved();

    if doc.content.is_empty() {
        return vec![doc.clone()];
    }

    let tokens = tokenize(&doc.content, &opts.separator);
    if tokens.len() <= opts.max_tokens {
        return vec![doc.clone()];
    }

    if opts.overlap >= opts.max_tokens {
        debug!(
            doc_id = %doc.id,
            max_tokens = opts.max_tokens,
            overlap = opts.overlap,
            "overlap covers the whole window, advancing one token per chunk"
        );
    }

    let step = opts.step();
    let mut chunks = Vec::with_capacity(expected_chunks(tokens.len(), opts.max_tokens, step));
    let mut start = 0;

    loop {
        let end = (start + opts.max_tokens).min(tokens.len());
        chunks.push(make_chunk(doc, chunks.len(), tokens[start..end].join(" ")));

        if end >= tokens.len() {
            break;
        }
        start += step;
    }

    debug!(
        doc_id = %doc.id,
        tokens = tokens.len(),
        chunks = chunks.len(),
        "split document"
    );

    chunks
}

/// Chunk every document in order, concatenating the results
pub fn chunk_documents(docs: &[Document], options: &ChunkOptions) -> Vec<Document> {
    let opts = options.resolved();
    docs.iter()
        .flat_map(|doc| chunk_document(doc, &opts))
        .collect()
}

/// Build chunk `index` of `parent` with the given text
fn make_chunk(parent: &Document, index: usize, content: String) -> Document {
    Document {
        id: chunk_id(&parent.id, index),
        content,
        title: parent.title.clone(),
        source: parent.source.clone(),
        url: parent.url.clone(),
        metadata: parent.metadata.clone(),
        chunk_index: index,
        parent_id: parent.id.clone(),
        updated_at: parent.updated_at,
    }
}

/// Number of windows needed to cover `token_count` tokens
pub(crate) fn expected_chunks(token_count: usize, max_tokens: usize, step: usize) -> usize {
    if token_count <= max_tokens {
        return 1;
    }
    (token_count - max_tokens).div_ceil(step) + 1
}
