//! Integration tests for the local URL precondition.

use phishguard_provider::{InvalidUrlError, check_url_input};

#[test]
fn url_precondition_tests_reject_obviously_invalid_input() {
    assert_eq!(check_url_input(""), Err(InvalidUrlError::Empty));
    assert_eq!(check_url_input("a.b"), Err(InvalidUrlError::TooShort));
    assert_eq!(check_url_input("localhost"), Err(InvalidUrlError::MissingDot));
}

#[test]
fn url_precondition_tests_accept_minimal_dotted_input() {
    assert_eq!(check_url_input("a.io"), Ok("a.io"));
    assert_eq!(
        check_url_input("http://paypa1.com/login"),
        Ok("http://paypa1.com/login")
    );
}
