
//! Fatal internal errors.
//!
//! A failed invariant here is a bug in pass ordering, never a user error, so it
//! does not return. Everything recoverable goes through `shared::error`.

use tracing::error;

/// Report an internal compiler error and abort the current run.
#[cold]
#[track_caller]
pub fn internal_error(message: &str) -> ! {
    let location = std::panic::Location::caller();

    error!(file = location.file(), line = location.line(), "Internal Error: {}", message);

    panic!("Internal Error: {}", message);
}

/// Abort with an internal error unless `cond` holds.
#[macro_export]
macro_rules! uassert {
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            $crate::diag::internal_error(&format!($($msg)+));
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn holding_assertion_is_silent() {
        uassert!(1 + 1 == 2, "arithmetic");
    }

    #[test]
    #[should_panic(expected = "Internal Error: call once")]
    fn failed_assertion_panics() {
        uassert!(false, "call once");
    }

    #[test]
    #[should_panic(expected = "Internal Error: stage 7 broken")]
    fn message_is_formatted() {
        uassert!(false, "stage {} broken", 7);
    }
}
