//! Error types for host primitives.
//!
//! The public event API never returns these. Backends log them and carry on,
//! so a teardown path stays safe to call redundantly.

use miette::Diagnostic;
use smol_str::SmolStr;

/// Errors raised by a host while attaching, detaching or probing.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum DomError {
    /// The host object lacks a member the backend relies on.
    #[error("host object has no `{0}` member")]
    #[diagnostic(code(heddle::missing_member))]
    MissingMember(SmolStr),

    /// A call into the host threw.
    #[error("host call `{member}` failed: {message}")]
    #[diagnostic(code(heddle::host_call))]
    HostCall {
        /// The member that was invoked.
        member: SmolStr,
        /// Whatever the host reported.
        message: String,
    },

    /// The value handed to the backend cannot carry listeners.
    #[error("node is not an event target")]
    #[diagnostic(code(heddle::not_a_target))]
    NotATarget,

    /// No global document is available.
    #[error("no global document")]
    #[diagnostic(
        code(heddle::no_document),
        help("this backend assumes a browser main thread")
    )]
    NoDocument,
}

impl DomError {
    /// Shorthand for [`DomError::HostCall`].
    pub fn host_call(member: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        DomError::HostCall {
            member: member.into(),
            message: message.into(),
        }
    }
}

/// Log a host failure instead of propagating it.
///
/// Backends outside this crate use it too, so every host failure is logged
/// the same way.
pub fn report(result: Result<(), DomError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "host primitive failed");
    }
}

/// Diagnostic for permissive no-op paths. Compiled out without `dev`.
macro_rules! usage_fault {
    ($($arg:tt)*) => {
        if cfg!(feature = "dev") {
            tracing::debug!($($arg)*);
        }
    };
}

pub(crate) use usage_fault;
