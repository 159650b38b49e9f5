use tracing::{Span, field};

use super::TraceId;

/// Root span for one user flow (a booking attempt, a CLI command).
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        showtime_id = field::Empty,
        seat_count = field::Empty
    )
}

/// Child span; inherits the trace id from the enclosing root span.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!(
        "child",
        name = %name,
        showtime_id = field::Empty,
        seat_count = field::Empty
    )
}

/// Fill in the showtime fields of the current span once they are known.
pub fn annotate_span(showtime_id: &str, seat_count: Option<usize>) {
    let span = Span::current();
    span.record("showtime_id", field::display(showtime_id));
    if let Some(n) = seat_count {
        span.record("seat_count", n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn child_span_carries_annotated_seat_count() {
        let span = child_span("confirm");
        let _entered = span.enter();

        annotate_span("st4", Some(3));
        tracing::info!("inside");

        assert!(logs_contain("showtime_id=st4"));
        assert!(logs_contain("seat_count=3"));
    }
}
