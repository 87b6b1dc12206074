use tracing::warn;

use crate::docker::EngineError;

/// Run `op`, repeating it up to `retries` more times while it fails with a
/// transient engine error.
///
/// `retries == 0` means a single attempt. Non-transient errors are returned
/// after the first failure; once attempts run out the last error is returned
/// unchanged. There is no delay between attempts.
pub fn with_retries<T, F>(retries: u32, what: &str, mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Result<T, EngineError>,
{
    let mut remaining = retries;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && remaining > 0 => {
                remaining -= 1;
                warn!(operation = what, error = %e, remaining, "transient engine error, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fails with a server error `failures` times, then succeeds.
    fn flaky(failures: u32, calls: &Cell<u32>) -> impl FnMut() -> Result<&'static str, EngineError> + '_ {
        move || {
            calls.set(calls.get() + 1);
            if calls.get() <= failures {
                Err(EngineError::Server(format!("attempt {}", calls.get())))
            } else {
                Ok("done")
            }
        }
    }

    #[test]
    fn succeeds_when_retries_cover_failures() {
        let calls = Cell::new(0);
        let out = with_retries(3, "test", flaky(3, &calls)).unwrap();
        assert_eq!(out, "done");
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn fails_with_last_error_when_retries_exhausted() {
        let calls = Cell::new(0);
        let err = with_retries(2, "test", flaky(5, &calls)).unwrap_err();
        assert_eq!(calls.get(), 3);
        match err {
            EngineError::Server(msg) => assert_eq!(msg, "attempt 3"),
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn zero_retries_means_one_attempt() {
        let calls = Cell::new(0);
        assert!(with_retries(0, "test", flaky(1, &calls)).is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn non_transient_error_is_not_retried() {
        let calls = Cell::new(0);
        let err = with_retries(20, "test", || -> Result<(), EngineError> {
            calls.set(calls.get() + 1);
            Err(EngineError::Conflict("name in use".into()))
        })
        .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn every_transient_kind_is_retried() {
        let kinds: Vec<fn() -> EngineError> = vec![
            || EngineError::Server("500".into()),
            || EngineError::UnexpectedResponse("garbled".into()),
            || EngineError::Timeout(std::time::Duration::from_secs(1)),
            || EngineError::Io(std::io::Error::other("reset")),
        ];
        for make in kinds {
            let calls = Cell::new(0);
            let out = with_retries(1, "test", || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 { Err(make()) } else { Ok(()) }
            });
            assert!(out.is_ok());
            assert_eq!(calls.get(), 2);
        }
    }
}
