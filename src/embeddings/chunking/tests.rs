use super::*;

fn numbered_words(count: usize) -> String {
    (0..count)
        .map(|i| format!("word{:04}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest prefix of `next` that is also a suffix of `prev`, in characters
fn shared_boundary(prev: &str, next: &str) -> usize {
    let prev: Vec<char> = prev.chars().collect();
    let next: Vec<char> = next.chars().collect();
    let max = prev.len().min(next.len());

    (1..=max)
        .rev()
        .find(|&k| prev[prev.len() - k..] == next[..k])
        .unwrap_or(0)
}

#[test]
fn short_text_is_one_chunk() {
    let text = "Whisk two eggs with a pinch of salt.";
    let chunks = chunk_text(text, &ChunkingConfig::default());

    assert_eq!(chunks, vec![text.to_string()]);
}

#[test]
fn empty_and_blank_text_yield_nothing() {
    let config = ChunkingConfig::default();
    assert!(chunk_text("", &config).is_empty());
    assert!(chunk_text("   \n\n  \n", &config).is_empty());
}

#[test]
fn chunks_never_exceed_chunk_size() {
    let text = numbered_words(2000);
    let config = ChunkingConfig::default();

    let chunks = chunk_text(&text, &config);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(
            char_len(chunk) <= config.chunk_size,
            "chunk of {} characters exceeds {}",
            char_len(chunk),
            config.chunk_size
        );
    }
}

#[test]
fn adjacent_chunks_overlap_by_about_chunk_overlap() {
    let text = numbered_words(2000);
    let config = ChunkingConfig::default();

    let chunks = chunk_text(&text, &config);

    for pair in chunks.windows(2) {
        let overlap = shared_boundary(&pair[0], &pair[1]);
        assert!(
            (80..=config.chunk_overlap).contains(&overlap),
            "overlap of {} characters outside the expected range",
            overlap
        );
    }
}

#[test]
fn no_overlap_when_disabled() {
    let text = numbered_words(500);
    let config = ChunkingConfig {
        chunk_size: 200,
        chunk_overlap: 0,
    };

    let chunks = chunk_text(&text, &config);
    let rejoined = chunks.join(" ");

    assert_eq!(rejoined, text);
}

#[test]
fn paragraphs_are_preferred_split_points() {
    let first = "Cream the butter and sugar until pale. ".repeat(5);
    let second = "Fold in the flour gently. ".repeat(5);
    let text = format!("{}\n\n{}", first.trim(), second.trim());
    let config = ChunkingConfig {
        chunk_size: 220,
        chunk_overlap: 0,
    };

    let chunks = chunk_text(&text, &config);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], first.trim());
    assert_eq!(chunks[1], second.trim());
}

#[test]
fn long_unbroken_text_falls_back_to_characters() {
    let text = "a".repeat(250);
    let config = ChunkingConfig {
        chunk_size: 100,
        chunk_overlap: 10,
    };

    let chunks = chunk_text(&text, &config);

    assert!(chunks.len() >= 3);
    assert!(chunks.iter().all(|c| char_len(c) <= 100));
}

#[test]
fn multibyte_text_is_measured_in_characters() {
    let text = "crème brûlée ".repeat(100);
    let config = ChunkingConfig {
        chunk_size: 120,
        chunk_overlap: 20,
    };

    let chunks = chunk_text(&text, &config);

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| char_len(c) <= 120));
}

#[test]
fn custom_separators() {
    let splitter = TextSplitter::new(&ChunkingConfig {
        chunk_size: 12,
        chunk_overlap: 0,
    })
    .with_separators(["|"]);

    let chunks = splitter.split_text("salt|pepper|paprika|cumin");

    assert_eq!(chunks, vec!["salt|pepper", "|paprika", "|cumin"]);
}

#[test]
fn overlap_is_clamped_below_chunk_size() {
    let splitter = TextSplitter::new(&ChunkingConfig {
        chunk_size: 50,
        chunk_overlap: 80,
    });

    assert_eq!(splitter.chunk_size(), 50);
    assert_eq!(splitter.chunk_overlap(), 49);
}
