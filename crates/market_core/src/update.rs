use crate::{Effect, FeedEvent, FeedState, Msg, PageNumber, FIRST_PAGE_NUMBER};

/// Pure update function: applies a message to state and returns any effects.
///
/// Effects are ordered; the owner must publish them in the order returned so
/// that `LoadingChanged(true)` precedes the fetch it announces and
/// `ItemsAdded` precedes the `LoadingChanged(false)` that closes it.
pub fn update(mut state: FeedState, msg: Msg) -> (FeedState, Vec<Effect>) {
    let effects = match msg {
        Msg::Activated => {
            if state.next_page_number() == FIRST_PAGE_NUMBER {
                state.advance_page_counter();
                request_page(&mut state, FIRST_PAGE_NUMBER)
            } else {
                Vec::new()
            }
        }
        Msg::Dismissed => {
            let was_loading = state.is_loading();
            state.reset();
            let mut effects = Vec::with_capacity(2);
            if was_loading {
                effects.push(Effect::Publish(FeedEvent::LoadingChanged(false)));
            }
            effects.push(Effect::Publish(FeedEvent::FeedCleared));
            effects
        }
        Msg::PageRequested(page) => request_page(&mut state, page),
        Msg::VisibleRangeEnded { last_visible_index } => {
            match state
                .gate()
                .authorize(last_visible_index, state.next_page_number())
            {
                Some(page) => {
                    // Advance before the fetch resolves so repeated callbacks
                    // for the same boundary stay no-ops.
                    state.advance_page_counter();
                    request_page(&mut state, page)
                }
                None => Vec::new(),
            }
        }
        Msg::PageLoaded {
            page,
            generation,
            items,
        } => {
            if generation != state.generation() || !state.finish_request(page) {
                return (state, Vec::new());
            }
            let appended = state.merge_items(items);
            let mut effects = Vec::with_capacity(2);
            if !appended.is_empty() {
                effects.push(Effect::Publish(FeedEvent::ItemsAdded(appended)));
            }
            if !state.is_loading() {
                effects.push(Effect::Publish(FeedEvent::LoadingChanged(false)));
            }
            effects
        }
        Msg::PageFailed {
            page,
            generation,
            message,
        } => {
            if generation != state.generation() || !state.finish_request(page) {
                return (state, Vec::new());
            }
            // The page counter is not rolled back: scrolling will not retry this page.
            state.record_error(message.clone());
            let mut effects = vec![Effect::Publish(FeedEvent::ErrorOccurred(message))];
            if !state.is_loading() {
                effects.push(Effect::Publish(FeedEvent::LoadingChanged(false)));
            }
            effects
        }
        Msg::ItemSelected(id) => vec![Effect::Publish(FeedEvent::ItemSelected(id))],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn request_page(state: &mut FeedState, page: PageNumber) -> Vec<Effect> {
    if page < FIRST_PAGE_NUMBER {
        return Vec::new();
    }
    let was_loading = state.is_loading();
    if !state.begin_request(page) {
        return Vec::new();
    }
    let mut effects = Vec::with_capacity(2);
    if !was_loading {
        effects.push(Effect::Publish(FeedEvent::LoadingChanged(true)));
    }
    effects.push(Effect::FetchPage {
        page,
        generation: state.generation(),
    });
    effects
}
