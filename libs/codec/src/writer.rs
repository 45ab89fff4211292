//! FIN message rendering.
//!
//! The inverse of [`crate::parser`]: renders an [`MtMessage`] back to wire
//! text. Block 4 uses CRLF line endings as FIN does; multiline tag values
//! stored with `\n` are expanded back to CRLF. Absent blocks are simply not
//! emitted, so parse → write → parse round-trips to an equal message.

use crate::message::MtMessage;
use std::fmt::Write;

/// Render a message to FIN wire text.
pub fn write_message(message: &MtMessage) -> String {
    let mut out = String::new();

    if let Some(header) = &message.basic_header {
        // Infallible: writing to a String cannot fail.
        let _ = write!(out, "{{1:{header}}}");
    }
    if let Some(header) = &message.application_header {
        let _ = write!(out, "{{2:{header}}}");
    }
    if let Some(user_header) = &message.user_header {
        if !user_header.is_empty() {
            let _ = write!(out, "{{3:{user_header}}}");
        }
    }
    if let Some(text) = message.text() {
        out.push_str("{4:\r\n");
        for tag in text {
            let _ = write!(out, ":{}:{}\r\n", tag.name(), tag.value().replace('\n', "\r\n"));
        }
        out.push_str("-}");
    }
    if let Some(trailer) = &message.trailer {
        if !trailer.is_empty() {
            let _ = write!(out, "{{5:{trailer}}}");
        }
    }

    out
}
