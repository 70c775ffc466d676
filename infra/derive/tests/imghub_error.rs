use imghub_derive::imghub_error;
use std::borrow::Cow;

#[imghub_error]
pub enum SampleError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected status {status}{}", format_context(.context))]
    Rejected { status: u16, context: Option<Cow<'static, str>> },

    #[error("Internal fault{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
}

#[test]
fn imghub_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/imghub_error_pass.rs");
}

#[test]
fn context_is_attached_to_source_errors() {
    let err = failing_io().context("Opening cache").expect_err("io error expected");

    assert!(matches!(&err, SampleError::Io { context: Some(c), .. } if c == "Opening cache"));
    assert_eq!(err.to_string(), "I/O failure (Opening cache): gone");
}

#[test]
fn context_replaces_existing_context() {
    let first: Result<(), SampleError> =
        Err(SampleError::Rejected { status: 418, context: Some("first".into()) });

    let err = first.context("second").expect_err("error expected");
    assert_eq!(err.to_string(), "Rejected status 418 (second)");
}

#[test]
fn question_mark_converts_sources() {
    fn run() -> Result<(), SampleError> {
        failing_io()?;
        Ok(())
    }

    let err = run().expect_err("io error expected");
    assert!(matches!(err, SampleError::Io { context: None, .. }));
}

#[test]
fn strings_become_internal_errors() {
    let from_static: SampleError = "static failure".into();
    let from_owned: SampleError = format!("owned {}", 42).into();

    assert_eq!(from_static.to_string(), "Internal fault: static failure");
    assert_eq!(from_owned.to_string(), "Internal fault: owned 42");
}

#[test]
fn source_chain_is_exposed() {
    use std::error::Error as _;

    let err: SampleError = std::io::Error::other("disk").into();
    assert!(err.source().is_some(), "wrapped io error should be reachable as source");
}
