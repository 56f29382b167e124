//! Unit tests for frame delivery ordering and termination.

use std::{sync::Arc, time::Duration};

use futures::{FutureExt, future::join_all};
use rstest::rstest;
use tokio::task::yield_now;

use super::*;
use crate::frame::FrameBuilder;

fn frame(tag: u8) -> Frame {
    FrameBuilder::new()
        .segment(vec![tag; 8])
        .build()
        .expect("frame fits")
}

fn tag_of(frame: &Frame) -> u8 { frame.segment(0).expect("one segment")[0] }

#[tokio::test]
async fn queued_frame_is_returned_without_suspending() {
    let queue = DeliveryQueue::new();
    assert_eq!(queue.deliver(frame(1)), Delivery::Queued);

    let received = queue
        .receive()
        .now_or_never()
        .expect("receive must not suspend when a frame is queued")
        .expect("open queue");
    assert_eq!(tag_of(&received), 1);
}

#[tokio::test]
async fn waiting_receiver_gets_the_next_frame() {
    let queue = Arc::new(DeliveryQueue::new());
    let waiter = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.receive().await }
    });
    while queue.pending_len() == 0 {
        yield_now().await;
    }

    assert_eq!(queue.deliver(frame(7)), Delivery::Received);
    let received = waiter.await.expect("join").expect("frame");
    assert_eq!(tag_of(&received), 7);
    assert_eq!(queue.queued_len(), 0);
}

#[rstest]
#[case::more_frames_than_receivers(3, 5)]
#[case::equal(4, 4)]
#[tokio::test]
async fn receivers_are_served_in_fifo_order(#[case] receivers: usize, #[case] frames: u8) {
    let queue = Arc::new(DeliveryQueue::new());
    let mut handles = Vec::new();
    for _ in 0..receivers {
        let receiver_queue = Arc::clone(&queue);
        handles.push(tokio::spawn(async move { receiver_queue.receive().await }));
        // Register each receiver before spawning the next.
        while queue.pending_len() < handles.len() {
            yield_now().await;
        }
    }

    for tag in 0..frames {
        queue.deliver(frame(tag));
    }

    let served: Vec<u8> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| tag_of(&joined.expect("join").expect("frame")))
        .collect();
    let expected: Vec<u8> = (0..frames).take(receivers).collect();
    assert_eq!(served, expected);

    let mut backlog = Vec::new();
    while queue.queued_len() > 0 {
        backlog.push(tag_of(&queue.receive().await.expect("queued frame")));
    }
    let remaining: Vec<u8> = (0..frames).skip(receivers).collect();
    assert_eq!(backlog, remaining);
}

#[tokio::test]
async fn end_releases_pending_receivers_with_reason() {
    let queue = Arc::new(DeliveryQueue::new());
    let waiter = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.receive().await }
    });
    while queue.pending_len() == 0 {
        yield_now().await;
    }

    assert!(queue.end(EndReason::PeerClosed));
    let err = waiter.await.expect("join").expect_err("queue ended");
    assert_eq!(err, EndReason::PeerClosed);
}

#[tokio::test]
async fn end_discards_backlog_and_fails_later_receives() {
    let queue = DeliveryQueue::new();
    queue.deliver(frame(1));
    queue.deliver(frame(2));

    assert!(queue.end(EndReason::Closed));
    assert_eq!(queue.queued_len(), 0);
    assert_eq!(queue.deliver(frame(3)), Delivery::Discarded);

    let err = queue
        .receive()
        .now_or_never()
        .expect("ended queue fails immediately")
        .expect_err("queue ended");
    assert_eq!(err, EndReason::Closed);
}

#[tokio::test]
async fn first_end_reason_wins() {
    let queue = DeliveryQueue::new();
    assert!(queue.end(EndReason::Closed));
    assert!(!queue.end(EndReason::PeerClosed));
    assert_eq!(queue.state(), ConnectionState::Ended(EndReason::Closed));
}

#[tokio::test]
async fn withdrawn_receiver_does_not_lose_frames() {
    let queue = DeliveryQueue::new();
    {
        let abandoned = queue.receive();
        // Poll once so the receiver registers, then drop it.
        assert!(abandoned.now_or_never().is_none());
    }
    assert_eq!(queue.pending_len(), 0);

    assert_eq!(queue.deliver(frame(9)), Delivery::Queued);
    let received = queue.receive().await.expect("queued frame");
    assert_eq!(tag_of(&received), 9);
}

#[tokio::test]
async fn frame_handed_to_a_dropped_receiver_is_requeued_first() {
    let queue = DeliveryQueue::new();
    let mut abandoned = Box::pin(queue.receive());
    assert!((&mut abandoned).now_or_never().is_none());

    assert_eq!(queue.deliver(frame(7)), Delivery::Received);
    assert_eq!(queue.deliver(frame(8)), Delivery::Queued);
    drop(abandoned);

    assert_eq!(queue.queued_len(), 2);
    let first = queue.receive().await.expect("requeued frame");
    let second = queue.receive().await.expect("queued frame");
    assert_eq!((tag_of(&first), tag_of(&second)), (7, 8));
}

#[tokio::test]
async fn frame_handed_to_a_dropped_receiver_goes_to_the_next_one() {
    let queue = DeliveryQueue::new();
    let mut abandoned = Box::pin(queue.receive());
    let mut next = Box::pin(queue.receive());
    assert!((&mut abandoned).now_or_never().is_none());
    assert!((&mut next).now_or_never().is_none());

    assert_eq!(queue.deliver(frame(5)), Delivery::Received);
    drop(abandoned);

    let received = next
        .now_or_never()
        .expect("frame was passed on")
        .expect("open queue");
    assert_eq!(tag_of(&received), 5);
    assert_eq!(queue.queued_len(), 0);
    assert_eq!(queue.pending_len(), 0);
}

#[tokio::test]
async fn frame_handed_to_a_dropped_receiver_after_end_is_discarded() {
    let queue = DeliveryQueue::new();
    let mut abandoned = Box::pin(queue.receive());
    assert!((&mut abandoned).now_or_never().is_none());

    assert_eq!(queue.deliver(frame(3)), Delivery::Received);
    assert!(queue.end(EndReason::PeerClosed));
    drop(abandoned);

    assert_eq!(queue.queued_len(), 0);
}

#[tokio::test]
async fn timed_out_receivers_do_not_accumulate() {
    let queue = DeliveryQueue::new();
    for _ in 0..1_000 {
        let outcome = tokio::time::timeout(Duration::from_nanos(1), queue.receive()).await;
        assert!(outcome.is_err(), "no frame was delivered");
    }
    assert_eq!(queue.pending_len(), 0);

    assert_eq!(queue.deliver(frame(4)), Delivery::Queued);
    assert_eq!(tag_of(&queue.receive().await.expect("queued frame")), 4);
}

#[tokio::test]
async fn ended_resolves_after_end() {
    let queue = Arc::new(DeliveryQueue::new());
    let watcher = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.ended().await }
    });
    yield_now().await;
    queue.end(EndReason::Truncated(crate::codec::EofError::MidFrame {
        bytes_received: 3,
        expected: 16,
    }));

    let reason = tokio::time::timeout(Duration::from_secs(1), watcher)
        .await
        .expect("ended() resolves")
        .expect("join");
    assert!(matches!(reason, EndReason::Truncated(_)));
}
