use std::io;
use std::path::PathBuf;

/// Failures raised while turning an input line into a running program.
///
/// Everything except [`ShellError::SignalRegistrationFailed`] is recovered by
/// the read loop: the error is reported and the next line is read.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The line contained no command tokens.
    #[error("empty command")]
    EmptyCommand,

    #[error("{0}: command not found")]
    UnknownExecutable(String),

    #[error("{name}: permission denied")]
    ExecPermissionDenied {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The program exists but its image could not be loaded, e.g. ENOEXEC.
    #[error("{name}: cannot execute: {source}")]
    ExecFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The OS refused to create a new process (EAGAIN, ENOMEM).
    #[error("{name}: cannot create process: {source}")]
    ProcessCreationFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: {}: {source}", path.display())]
    DirectoryChangeFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{name}: wait failed: {source}")]
    WaitFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Background execution is impossible without a working reaper.
    #[error("cannot install child reaper: {0}")]
    SignalRegistrationFailed(#[source] io::Error),
}

impl ShellError {
    /// Whether the interpreter has to stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::SignalRegistrationFailed(_))
    }

    /// Classifies a failed `spawn` of the program `name`.
    pub(crate) fn from_spawn(name: &str, source: io::Error) -> Self {
        let name = name.to_owned();
        match (source.kind(), source.raw_os_error()) {
            (io::ErrorKind::NotFound, _) => ShellError::UnknownExecutable(name),
            (io::ErrorKind::PermissionDenied, _) => ShellError::ExecPermissionDenied { name, source },
            (_, Some(libc::EAGAIN | libc::ENOMEM)) => {
                ShellError::ProcessCreationFailed { name, source }
            }
            _ => ShellError::ExecFailed { name, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_registration_failure_is_fatal() {
        let fatal = ShellError::SignalRegistrationFailed(io::Error::other("boom"));
        assert!(fatal.is_fatal());
        assert!(!ShellError::EmptyCommand.is_fatal());
        assert!(!ShellError::UnknownExecutable("nope".into()).is_fatal());
    }

    #[test]
    fn test_spawn_errors_are_classified() {
        let e = ShellError::from_spawn("x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(e, ShellError::UnknownExecutable(ref n) if n == "x"));

        let e = ShellError::from_spawn("x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, ShellError::ExecPermissionDenied { .. }));

        let e = ShellError::from_spawn("x", io::Error::from_raw_os_error(libc::EAGAIN));
        assert!(matches!(e, ShellError::ProcessCreationFailed { .. }));

        let e = ShellError::from_spawn("x", io::Error::from_raw_os_error(libc::ENOMEM));
        assert!(matches!(e, ShellError::ProcessCreationFailed { .. }));
    }

    #[test]
    fn test_unloadable_image_is_an_exec_failure() {
        let e = ShellError::from_spawn("x", io::Error::from_raw_os_error(libc::ENOEXEC));
        assert!(matches!(e, ShellError::ExecFailed { ref name, .. } if name == "x"));
        assert!(e.to_string().starts_with("x: cannot execute: "));

        let e = ShellError::from_spawn("x", io::Error::from_raw_os_error(libc::EISDIR));
        assert!(matches!(e, ShellError::ExecFailed { .. }));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ShellError::UnknownExecutable("frobnicate".into()).to_string(),
            "frobnicate: command not found"
        );
        let e = ShellError::DirectoryChangeFailed {
            path: PathBuf::from("/nonexistent"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(e.to_string().starts_with("cd: /nonexistent: "));
    }
}
