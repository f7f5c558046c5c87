//! Fixture bodies cut into arbitrary pieces decode to the same events as the whole body.

use chatbridge::providers::anthropic::AnthropicStreamDecoder;
use chatbridge::providers::gemini::GeminiStreamDecoder;
use chatbridge::providers::openai::OpenAiStreamDecoder;
use chatbridge::streaming::{DecodeEvent, FrameDecoder};
use proptest::prelude::*;

fn fixture(path: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{path}")).expect("fixture exists")
}

fn decode<D: FrameDecoder>(mut decoder: D, chunks: &[&[u8]]) -> Vec<DecodeEvent> {
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(decoder.feed(chunk));
    }
    events.extend(decoder.finish());
    events
}

fn split<'a>(body: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut cuts: Vec<usize> = cuts.iter().map(|c| c % (body.len() + 1)).collect();
    cuts.sort_unstable();
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut last = 0;
    for cut in cuts {
        chunks.push(&body[last..cut]);
        last = cut;
    }
    chunks.push(&body[last..]);
    chunks
}

fn delta_texts(events: &[DecodeEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DecodeEvent::Delta(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn fixtures_decode_to_expected_text() {
    let openai = decode(OpenAiStreamDecoder::new(), &[&fixture("openai/hello_two_chunks.sse")[..]]);
    assert_eq!(delta_texts(&openai), vec!["He", "llo"]);

    let anthropic = decode(
        AnthropicStreamDecoder::new(),
        &[&fixture("anthropic/text_then_stop.sse")[..]],
    );
    assert_eq!(delta_texts(&anthropic), vec!["Hello", " world"]);

    let gemini = decode(GeminiStreamDecoder::new(), &[&fixture("gemini/array_stream.json")[..]]);
    assert_eq!(delta_texts(&gemini), vec!["Hello", " world, \"quoted {braces}\""]);
}

#[test]
fn byte_at_a_time_feeding_matches_whole_body() {
    let body = fixture("gemini/array_stream.json");
    let whole = decode(GeminiStreamDecoder::new(), &[body.as_slice()]);
    let bytes: Vec<&[u8]> = body.chunks(1).collect();
    assert_eq!(decode(GeminiStreamDecoder::new(), &bytes), whole);
}

proptest! {
    #[test]
    fn openai_arbitrary_splits(cuts in proptest::collection::vec(any::<usize>(), 0..12)) {
        let body = fixture("openai/hello_two_chunks.sse");
        let whole = decode(OpenAiStreamDecoder::new(), &[body.as_slice()]);
        prop_assert_eq!(decode(OpenAiStreamDecoder::new(), &split(&body, &cuts)), whole);
    }

    #[test]
    fn anthropic_arbitrary_splits(cuts in proptest::collection::vec(any::<usize>(), 0..12)) {
        let body = fixture("anthropic/text_then_stop.sse");
        let whole = decode(AnthropicStreamDecoder::new(), &[body.as_slice()]);
        prop_assert_eq!(decode(AnthropicStreamDecoder::new(), &split(&body, &cuts)), whole);
    }

    #[test]
    fn gemini_arbitrary_splits(cuts in proptest::collection::vec(any::<usize>(), 0..12)) {
        let body = fixture("gemini/array_stream.json");
        let whole = decode(GeminiStreamDecoder::new(), &[body.as_slice()]);
        prop_assert_eq!(decode(GeminiStreamDecoder::new(), &split(&body, &cuts)), whole);
    }
}
