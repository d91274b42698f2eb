#![allow(unused_imports)]

use papermind::listing::{
    bytes_to_mb, format_iso_date, format_size, validate_login, validate_new_bot,
    validate_registration, FormError,
};
use papermind::pagination::{
    page_count, page_slice, page_window, Page, BOTS_PER_PAGE, FILES_PER_PAGE, MAX_VISIBLE_PAGES,
};
use papermind::{
    format_response, ChangeObserver, ChatController, ChatSession, ControllerError, Exchange,
    FragmentOutcome, NoopObserver, Role, SessionChange, SessionConfig, SessionError, Submission,
    Transcript, TurnView,
};

#[test]
fn public_api_exports_compile() {}
