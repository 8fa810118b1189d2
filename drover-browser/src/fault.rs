//! Failure taxonomy for WebDriver command errors.
//!
//! Anything that is a normal consequence of hostile, slow or unusual web
//! content is absorbed locally and reported as a negative result; anything
//! indicating the automation substrate itself is broken propagates to the
//! caller.

use fantoccini::error::{CmdError, ErrorStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Expected page-level trouble: timeouts, missing or stale elements,
    /// intercepted clicks, navigation-level network errors.
    Recoverable,
    /// The driver or browser is broken; no local recovery is possible.
    Substrate,
}

pub(crate) fn classify(err: &CmdError) -> Fault {
    match err {
        CmdError::WaitTimeout => Fault::Recoverable,
        CmdError::Standard(wd) => classify_status(&wd.error),
        _ => Fault::Substrate,
    }
}

fn classify_status(status: &ErrorStatus) -> Fault {
    match status {
        ErrorStatus::Timeout
        | ErrorStatus::ScriptTimeout
        | ErrorStatus::ElementClickIntercepted
        | ErrorStatus::ElementNotInteractable
        | ErrorStatus::StaleElementReference
        | ErrorStatus::NoSuchElement
        | ErrorStatus::MoveTargetOutOfBounds
        | ErrorStatus::InsecureCertificate
        | ErrorStatus::UnexpectedAlertOpen
        // Chromedriver reports page-level net::ERR_* failures (DNS,
        // refused connections) under this status.
        | ErrorStatus::UnknownError => Fault::Recoverable,
        _ => Fault::Substrate,
    }
}

pub(crate) fn is_recoverable(err: &CmdError) -> bool {
    classify(err) == Fault::Recoverable
}
