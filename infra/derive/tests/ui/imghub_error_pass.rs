use imghub_derive::imghub_error;
use std::borrow::Cow;

#[imghub_error]
pub enum FetchError {
    #[error("Transport failure{}: {source}", format_context(.context))]
    Transport {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Upstream answered {status}{}", format_context(.context))]
    Status { status: u16, context: Option<Cow<'static, str>> },

    #[error("Internal fault{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let _: FetchError = "boom".into();
    let _: FetchError = std::io::Error::other("down").into();
}
