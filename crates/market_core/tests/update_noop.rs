use market_core::{update, FeedState, Msg};

#[test]
fn update_is_noop() {
    let state = FeedState::default();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn completion_without_request_is_ignored() {
    let state = FeedState::default();
    let (next, effects) = update(
        state.clone(),
        Msg::PageFailed {
            page: 4,
            generation: 0,
            message: "late".into(),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn page_zero_is_rejected() {
    let state = FeedState::default();
    let (next, effects) = update(state.clone(), Msg::PageRequested(0));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
