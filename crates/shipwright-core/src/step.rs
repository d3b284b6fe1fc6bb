use crate::error::Result;

/// Result of a pipeline step that may be skipped in optional mode.
#[derive(Debug, PartialEq, Eq)]
pub enum StepOutcome<T> {
    Done(T),
    Skipped { reason: String },
}

/// Run `step`; in optional mode a non-fatal error becomes
/// [`StepOutcome::Skipped`] carrying `skip_message` and the error text.
///
/// Fatal errors (see [`crate::ShipError::is_fatal`]) and every error in
/// required mode are returned unchanged. Reporting a skip is left to the
/// caller.
pub fn degradable<T>(
    optional: bool,
    skip_message: &str,
    step: impl FnOnce() -> Result<T>,
) -> Result<StepOutcome<T>> {
    match step() {
        Ok(value) => Ok(StepOutcome::Done(value)),
        Err(e) if optional && !e.is_fatal() => Ok(StepOutcome::Skipped {
            reason: format!("{skip_message}: {e}"),
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShipError;

    #[test]
    fn success_passes_through() {
        let out = degradable(true, "skipped", || Ok(7)).unwrap();
        assert_eq!(out, StepOutcome::Done(7));
    }

    #[test]
    fn optional_failure_is_skipped() {
        let out: StepOutcome<()> =
            degradable(true, "Firebase login unavailable", || Err(ShipError::NotLoggedIn)).unwrap();
        match out {
            StepOutcome::Skipped { reason } => {
                assert!(reason.starts_with("Firebase login unavailable: not logged in"))
            }
            StepOutcome::Done(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn required_failure_propagates() {
        let err = degradable::<()>(false, "skipped", || Err(ShipError::NotLoggedIn)).unwrap_err();
        assert!(matches!(err, ShipError::NotLoggedIn));
    }

    #[test]
    fn fatal_failure_propagates_in_optional_mode() {
        let err = degradable::<()>(true, "skipped", || {
            Err(ShipError::ProjectCreateFailed {
                id: "demo".into(),
                reason: "denied".into(),
            })
        })
        .unwrap_err();
        assert!(err.is_fatal());
    }
}
