//! Logging macros.

/// Evaluates the expression and logs how long it took at the info level.
#[macro_export]
macro_rules! with_timing_info_logging {
    ($message:expr $(,$arg:expr)*; $expression:expr) => {{
        let _start_time = ::std::time::Instant::now();
        let _result = $expression;
        let _duration = _start_time.elapsed();
        $crate::info!(
            concat!($message, " took {:.3} ms")$(,$arg)*,
            _duration.as_secs_f64() * 1e3,
        );
        _result
    }};
}

/// Evaluates the expression between a pair of debug level messages marking
/// the start and end of a pipeline step.
#[macro_export]
macro_rules! with_step_logging {
    ($message:expr $(,$arg:expr)*; $expression:expr) => {{
        $crate::debug!(concat!("Begin: ", $message)$(,$arg)*);
        let _start_time = ::std::time::Instant::now();
        let _result = $expression;
        let _duration = _start_time.elapsed();
        $crate::debug!(
            concat!("({:.3} ms) Done: ", $message),
            _duration.as_secs_f64() * 1e3
            $(,$arg)*
        );
        _result
    }};
}
