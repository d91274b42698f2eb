use chat_provider::{ConversationError, Fragment};
use papermind::{ChatSession, FragmentOutcome, Submission};
use pretty_assertions::assert_eq;

fn dispatch(session: &mut ChatSession, question: &str) -> u64 {
    match session.submit(question).expect("accepted") {
        Submission::Dispatched(exchange) => exchange.id,
        Submission::Ignored => panic!("expected dispatch"),
    }
}

#[test]
fn stale_exchange_callbacks_are_ignored_while_another_is_active() {
    let mut session = ChatSession::default();
    let stale = dispatch(&mut session, "first");
    session.apply_fragment(stale, &Fragment::from("first answer"));
    session.finish(stale);

    let active = dispatch(&mut session, "second");
    session.apply_fragment(active, &Fragment::from("live output"));
    let snapshot = session.transcript().clone();

    assert_eq!(
        session.apply_fragment(stale, &Fragment::from("stale chunk")),
        FragmentOutcome::Dropped
    );
    assert!(!session.finish(stale));
    assert!(!session.fail(stale, &ConversationError::transport("stale error")));
    assert!(!session.abandon(stale));

    assert_eq!(session.transcript(), &snapshot);
    assert_eq!(session.in_flight(), Some(active));

    session.apply_fragment(active, &Fragment::from(" + still live"));
    assert_eq!(
        session.turns().last().map(|turn| turn.answer()),
        Some("live output + still live")
    );
}

#[test]
fn fragments_after_teardown_never_mutate() {
    let mut session = ChatSession::default();
    let id = dispatch(&mut session, "q");
    session.apply_fragment(id, &Fragment::from("partial"));

    assert_eq!(session.teardown(), Some(id));
    let snapshot = session.transcript().clone();

    assert_eq!(
        session.apply_fragment(id, &Fragment::from(" more")),
        FragmentOutcome::Dropped
    );
    assert!(!session.fail(id, &ConversationError::transport("late failure")));
    assert!(!session.finish(id));

    assert_eq!(session.transcript(), &snapshot);
    assert_eq!(
        session.turns().last().map(|turn| turn.answer()),
        Some("partial")
    );
}

#[test]
fn teardown_is_idempotent() {
    let mut session = ChatSession::default();
    assert_eq!(session.teardown(), None);
    assert_eq!(session.teardown(), None);
    assert!(!session.is_live());
}
