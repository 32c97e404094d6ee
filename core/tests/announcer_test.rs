use narrator_core::{
    AccessibleElement, AnnouncementKind, AnnouncementQueue, FocusAnnouncer, FocusEvent,
    FocusOutcome, KeyAnnouncer, KeyEvent, KeyNameTable, NarratorError, Result,
};

// Element whose attributes vanished before they could be read
struct StaleElement;

impl AccessibleElement for StaleElement {
    fn control_type(&self) -> Result<String> {
        Err(NarratorError::TransientAttribute("element no longer exists".into()))
    }

    fn name(&self) -> Result<Option<String>> {
        Err(NarratorError::TransientAttribute("element no longer exists".into()))
    }
}

fn texts(queue: &AnnouncementQueue) -> Vec<String> {
    queue.pending().into_iter().map(|r| r.text).collect()
}

#[test]
fn duplicate_focus_is_suppressed() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    assert_eq!(
        focus.on_focus_changed(&FocusEvent::new("Button", "OK")),
        FocusOutcome::Announced("Button: OK".into())
    );
    assert_eq!(
        focus.on_focus_changed(&FocusEvent::new("Button", "OK")),
        FocusOutcome::Duplicate
    );
    focus.on_focus_changed(&FocusEvent::new("Button", "Cancel"));

    assert_eq!(texts(&queue), vec!["Button: OK", "Button: Cancel"]);
    assert_eq!(focus.last_spoken(), "Button: Cancel");
}

#[test]
fn focus_returning_to_earlier_control_is_spoken_again() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    focus.on_focus_changed(&FocusEvent::new("Button", "OK"));
    focus.on_focus_changed(&FocusEvent::new("Button", "Cancel"));
    focus.on_focus_changed(&FocusEvent::new("Button", "OK"));

    assert_eq!(texts(&queue), vec!["Button: OK", "Button: Cancel", "Button: OK"]);
}

#[test]
fn empty_name_speaks_control_type_only() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    focus.on_focus_changed(&FocusEvent::new("Edit", ""));
    focus.on_focus_changed(&FocusEvent {
        control_type: "Pane".into(),
        name: None,
    });

    assert_eq!(texts(&queue), vec!["Edit", "Pane"]);
}

#[test]
fn fully_empty_focus_produces_nothing() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    assert_eq!(focus.on_focus_changed(&FocusEvent::new("", "")), FocusOutcome::Empty);
    assert!(queue.is_empty());
    assert_eq!(focus.last_spoken(), "");
}

#[test]
fn stale_element_is_dropped_without_touching_state() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    focus.on_focus_changed(&FocusEvent::new("Button", "OK"));
    assert_eq!(focus.on_focus_changed(&StaleElement), FocusOutcome::Failed);
    assert_eq!(focus.last_spoken(), "Button: OK");

    // Still a duplicate after the failure
    assert_eq!(
        focus.on_focus_changed(&FocusEvent::new("Button", "OK")),
        FocusOutcome::Duplicate
    );
    assert_eq!(texts(&queue), vec!["Button: OK"]);
}

#[test]
fn reset_allows_current_focus_to_be_repeated() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    focus.on_focus_changed(&FocusEvent::new("List item", "Documents"));
    focus.reset();
    focus.on_focus_changed(&FocusEvent::new("List item", "Documents"));

    assert_eq!(queue.len(), 2);
}

#[test]
fn closed_queue_leaves_last_announcement_untouched() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());

    focus.on_focus_changed(&FocusEvent::new("Button", "Cancel"));
    queue.close();

    assert_eq!(
        focus.on_focus_changed(&FocusEvent::new("Button", "OK")),
        FocusOutcome::Rejected
    );
    assert_eq!(focus.last_spoken(), "Button: Cancel");
    assert_eq!(queue.stats().rejected, 1);
}

#[test]
fn focus_requests_are_tagged_as_focus() {
    let queue = AnnouncementQueue::new(16);
    let focus = FocusAnnouncer::new(queue.clone());
    focus.on_focus_changed(&FocusEvent::new("Button", "OK"));
    assert_eq!(queue.pending()[0].kind, AnnouncementKind::Focus);
}

#[test]
fn keys_are_never_deduplicated() {
    let queue = AnnouncementQueue::new(16);
    let keys = KeyAnnouncer::new(queue.clone(), KeyNameTable::korean());

    for k in ["a", "a", "space"] {
        keys.on_key_pressed(&KeyEvent::new(k));
    }

    assert_eq!(texts(&queue), vec!["a", "a", "스페이스"]);
    assert!(queue
        .pending()
        .iter()
        .all(|r| r.kind == AnnouncementKind::Key));
}

#[test]
fn single_characters_are_spoken_verbatim() {
    let queue = AnnouncementQueue::new(16);
    let keys = KeyAnnouncer::new(queue, KeyNameTable::korean());

    assert_eq!(keys.phrase_for("Z"), "Z");
    assert_eq!(keys.phrase_for("7"), "7");
    assert_eq!(keys.phrase_for("한"), "한");
}

#[test]
fn named_keys_use_table_or_fall_back_to_raw() {
    let queue = AnnouncementQueue::new(16);
    let keys = KeyAnnouncer::new(queue, KeyNameTable::korean());

    assert_eq!(keys.phrase_for("enter"), "엔터");
    assert_eq!(keys.phrase_for("caps lock"), "캡스락");
    assert_eq!(keys.phrase_for("right"), "오른쪽 방향키");
    assert_eq!(keys.phrase_for("f5"), "f5");
    assert_eq!(keys.phrase_for("print screen"), "print screen");
}

#[test]
fn table_overrides_replace_and_extend() {
    let table = KeyNameTable::korean().with_overrides([("enter", "리턴"), ("f1", "도움말")]);
    assert_eq!(table.lookup("enter"), Some("리턴"));
    assert_eq!(table.lookup("f1"), Some("도움말"));
    assert_eq!(table.lookup("space"), Some("스페이스"));
    assert_eq!(table.len(), 15);
}
