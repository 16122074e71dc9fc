//! Error description formatting.
//!
//! Renders an [`ErrorPayload`] as `<kind>: <message>` followed by each
//! underlying cause, outermost first, separated by ` ---> `.

use std::error::Error;

use crate::event::ErrorPayload;

const STRUCTURED_KIND: &str = "EventRecord";
const PLAIN_KIND: &str = "Error";

fn format_error_header(payload: &ErrorPayload) -> String {
    match payload {
        ErrorPayload::Structured(event) => format!(
            "{}: {}",
            event.event_name().unwrap_or(STRUCTURED_KIND),
            event.message()
        ),
        ErrorPayload::Plain(err) => format!("{PLAIN_KIND}: {err}"),
    }
}

/// Format an error payload and its cause chain on one line.
pub fn format_error_description(payload: &ErrorPayload) -> String {
    let mut output = format_error_header(payload);
    let mut cause = payload.source();
    while let Some(err) = cause {
        output.push_str(" ---> ");
        output.push_str(&err.to_string());
        cause = err.source();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventRecord;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("gatt read failed")]
    struct GattError(#[source] io::Error);

    #[test]
    fn structured_header_prefers_event_name() {
        let payload = ErrorPayload::from(EventRecord::new("bad frame").with_event_name("Parse"));
        assert_eq!(format_error_description(&payload), "Parse: bad frame");
    }

    #[test]
    fn walks_the_cause_chain() {
        let inner = GattError(io::Error::other("device gone"));
        let payload = ErrorPayload::from(
            EventRecord::new("Error while receiving advertisement").with_source(inner),
        );
        assert_eq!(
            format_error_description(&payload),
            "EventRecord: Error while receiving advertisement ---> gatt read failed ---> device gone"
        );
    }

    #[test]
    fn plain_errors_use_generic_kind() {
        let payload = ErrorPayload::plain(GattError(io::Error::other("device gone")));
        assert_eq!(
            format_error_description(&payload),
            "Error: gatt read failed ---> device gone"
        );
    }
}
