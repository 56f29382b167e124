//! Unit tests for frame decoding and construction.

use rstest::rstest;

use super::*;
use crate::codec::FramingError;

fn header(words: &[u32]) -> Vec<u8> {
    let count = u32::try_from(words.len() - 1).expect("segment count fits");
    let mut out = count.to_le_bytes().to_vec();
    for w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
    while out.len() % 8 != 0 {
        out.push(0);
    }
    out
}

fn frame_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = header(words);
    let payload: usize = words.iter().map(|&w| w as usize * WORD_SIZE).sum();
    out.extend((0..payload).map(|i| u8::try_from(i % 251).expect("fits in u8")));
    out
}

#[rstest]
#[case::one_segment(1, 8)]
#[case::two_segments(2, 16)]
#[case::three_segments(3, 16)]
#[case::four_segments(4, 24)]
fn header_is_padded_to_word_boundary(#[case] segments: usize, #[case] expected: usize) {
    assert_eq!(aligned_header_len(segments), Some(expected));
}

#[test]
fn reference_frame_reports_incomplete_until_24_bytes() {
    let bytes = frame_bytes(&[2]);
    assert_eq!(&bytes[..8], &[0, 0, 0, 0, 2, 0, 0, 0]);
    let limits = FrameLimits::default();

    for len in 0..24 {
        let status = decode(&bytes[..len], &limits).expect("valid prefix");
        assert!(
            matches!(status, FrameStatus::Incomplete { needed } if needed > 0),
            "prefix of {len} bytes should be incomplete, got {status:?}"
        );
    }
    let status = decode(&bytes, &limits).expect("valid frame");
    assert_eq!(status.frame_len(), Some(24));
}

#[rstest]
#[case::single(vec![3])]
#[case::pair(vec![1, 2])]
#[case::triple_with_padding(vec![0, 4, 1])]
#[case::zero_length(vec![0])]
#[case::zero_between(vec![2, 0, 2, 0])]
fn decoder_reports_declared_length(#[case] words: Vec<u32>) {
    let bytes = frame_bytes(&words);
    let expected = aligned_header_len(words.len()).expect("small header")
        + words.iter().map(|&w| w as usize * WORD_SIZE).sum::<usize>();
    assert_eq!(bytes.len(), expected);

    let status = decode(&bytes, &FrameLimits::default()).expect("valid frame");
    let FrameStatus::Complete(layout) = status else {
        panic!("expected a complete frame");
    };
    assert_eq!(layout.total_len(), expected);
    assert_eq!(layout.segment_words(), words.as_slice());
}

#[test]
fn decoder_ignores_trailing_bytes() {
    let mut bytes = frame_bytes(&[1]);
    bytes.extend_from_slice(&[9; 5]);
    let status = decode(&bytes, &FrameLimits::default()).expect("valid frame");
    assert_eq!(status.frame_len(), Some(16));
}

#[test]
fn incomplete_header_reports_missing_bytes() {
    // Two segments need a 16-byte header; only the count field is present.
    let status = decode(&[1, 0, 0, 0], &FrameLimits::default()).expect("valid prefix");
    assert_eq!(status, FrameStatus::Incomplete { needed: 12 });
}

#[test]
fn count_field_overflow_is_rejected() {
    let err = decode(&[0xff, 0xff, 0xff, 0xff], &FrameLimits::unbounded())
        .expect_err("count + 1 overflows");
    assert_eq!(err, FramingError::SegmentCountOverflow { raw: u32::MAX });
}

#[test]
fn segment_limit_is_checked_before_header_arrives() {
    let limits = FrameLimits::default().max_segments(2);
    let err = decode(&[2, 0, 0, 0], &limits).expect_err("three segments exceed the limit");
    assert_eq!(err, FramingError::TooManySegments { count: 3, max: 2 });
}

#[test]
fn frame_length_limit_is_checked_before_payload_arrives() {
    let limits = FrameLimits::default().max_frame_length(64);
    let err = decode(&header(&[8]), &limits).expect_err("72-byte frame exceeds 64");
    assert_eq!(err, FramingError::OversizedFrame { size: 72, max: 64 });
}

#[test]
fn unbounded_limits_accept_large_declarations() {
    let status = decode(&header(&[u32::MAX]), &FrameLimits::unbounded()).expect("valid header");
    assert!(matches!(status, FrameStatus::Incomplete { .. }));
}

#[test]
fn builder_pads_segments_to_words() {
    let frame = FrameBuilder::new()
        .segment(vec![1_u8, 2, 3])
        .segment(Vec::<u8>::new())
        .segment(vec![4_u8; 8])
        .build()
        .expect("frame fits");

    assert_eq!(frame.layout().segment_words(), &[1, 0, 1]);
    assert_eq!(frame.len(), 16 + 16);
    assert_eq!(frame.segment(0), Some(&[1_u8, 2, 3, 0, 0, 0, 0, 0][..]));
    assert_eq!(frame.segment(1), Some(&[][..]));
    assert_eq!(frame.segment(2), Some(&[4_u8; 8][..]));
    assert_eq!(frame.segment(3), None);
    assert_eq!(&frame.as_bytes()[..16], header(&[1, 0, 1]).as_slice());
}

#[test]
fn empty_builder_emits_single_empty_segment() {
    let frame = FrameBuilder::new().build().expect("frame fits");
    assert_eq!(frame.as_bytes(), &[0_u8; 8]);
    assert_eq!(frame.segment_count(), 1);
    assert_eq!(frame.segments().count(), 1);
}

#[test]
fn built_frames_decode_to_the_same_layout() {
    let frame = FrameBuilder::new()
        .segment(vec![7_u8; 24])
        .segment(vec![8_u8; 40])
        .build()
        .expect("frame fits");
    let status = decode(frame.as_bytes(), &FrameLimits::default()).expect("valid frame");
    assert_eq!(status, FrameStatus::Complete(frame.layout().clone()));
}
