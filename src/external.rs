//! Creation of child processes for non-builtin commands.

use crate::env::Environment;
use crate::error::ShellError;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// How the standard input of a new child is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinMode {
    /// Share the interpreter's terminal input.
    Inherit,
    /// Read from `/dev/null`; used for background children so they never
    /// compete with the prompt for input.
    Detached,
}

/// Spawns the program named by `argv[0]`, passing the whole vector as its arguments.
///
/// `argv[0]` is handed to the child exactly as typed, the executable itself is
/// resolved with [`find_command_path`]. The child inherits stdout and stderr,
/// runs in `env.current_dir` and sees `env.vars`.
///
/// Exec failures are detected by the standard library before `spawn` returns, so
/// a child that cannot run its program never executes any interpreter code.
pub fn launch(argv: &[String], stdin: StdinMode, env: &Environment) -> Result<Child, ShellError> {
    let name = argv.first().ok_or(ShellError::EmptyCommand)?;
    let search_paths = env.search_paths();
    let executable = find_command_path(&search_paths, Path::new(name))
        .ok_or_else(|| ShellError::UnknownExecutable(name.clone()))?;

    let stdin = match stdin {
        StdinMode::Inherit => Stdio::inherit(),
        StdinMode::Detached => Stdio::null(),
    };

    let child = Command::new(&*executable)
        .arg0(name)
        .args(&argv[1..])
        .env_clear()
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .stdin(stdin)
        .spawn()
        .map_err(|e| ShellError::from_spawn(name, e))?;

    tracing::debug!(pid = child.id(), argv = ?argv, "spawned child");
    Ok(child)
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo`: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first regular file with an execute bit set.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| is_executable_file(path))
}

fn is_executable_file(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use std::fs::File;

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("external_tests_{}_{}", std::process::id(), tag));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(osstr("/bin"), path).expect("Expected to find /bin/sh");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    fn absolute_nonexisting() {
        let res = find_command_path(osstr("/bin"), Path::new("/bin/nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    fn single_component_found_in_path() {
        let found = find_command_path(osstr("/nope:/bin"), Path::new("sh"))
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found.as_ref(), Path::new("/bin/sh"));
    }

    #[test]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    fn directories_in_path_are_skipped() {
        let base = temp_dir("dirs");
        fs::create_dir_all(base.join("first").join("tool")).unwrap();
        fs::create_dir_all(base.join("second")).unwrap();
        write_file(&base.join("second").join("tool"), "", 0o755);

        let paths = std::env::join_paths([base.join("first"), base.join("second")]).unwrap();
        let found = find_command_path(&paths, Path::new("tool")).expect("tool");
        assert_eq!(found.as_ref(), base.join("second").join("tool"));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn non_executable_files_in_path_are_skipped() {
        let base = temp_dir("modes");
        fs::create_dir_all(base.join("first")).unwrap();
        fs::create_dir_all(base.join("second")).unwrap();
        write_file(&base.join("first").join("tool"), "", 0o644);
        write_file(&base.join("second").join("tool"), "", 0o755);

        let paths = std::env::join_paths([base.join("first"), base.join("second")]).unwrap();
        let found = find_command_path(&paths, Path::new("tool")).expect("tool");
        assert_eq!(found.as_ref(), base.join("second").join("tool"));

        let only_plain = std::env::join_paths([base.join("first")]).unwrap();
        assert!(find_command_path(&only_plain, Path::new("tool")).is_none());

        let _ = fs::remove_dir_all(base);
    }

    fn write_file(path: &Path, contents: &str, mode: u32) {
        File::create(path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, contents.as_bytes()))
            .unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn empty_path_is_none() {
        assert!(find_command_path(osstr("/bin"), Path::new("")).is_none());
    }

    #[test]
    fn launch_runs_program_with_full_argv() {
        let env = Environment::new();
        let mut child = launch(&argv(&["sh", "-c", "exit 7"]), StdinMode::Inherit, &env).unwrap();
        assert_eq!(child.wait().unwrap().code(), Some(7));
    }

    #[test]
    fn launch_unknown_program() {
        let env = Environment::new();
        let err = launch(&argv(&["no_such_program_hello_shell"]), StdinMode::Inherit, &env)
            .unwrap_err();
        assert!(matches!(err, ShellError::UnknownExecutable(ref n) if n == "no_such_program_hello_shell"));
    }

    #[test]
    fn launch_non_executable_file() {
        let base = temp_dir("noexec");
        let script = base.join("script");
        write_file(&script, "#!/bin/sh\nexit 0\n", 0o644);

        let env = Environment::new();
        let err = launch(&argv(&[script.to_str().unwrap()]), StdinMode::Inherit, &env).unwrap_err();
        assert!(matches!(err, ShellError::ExecPermissionDenied { .. }));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn launch_executable_without_interpreter_line() {
        let base = temp_dir("noshebang");
        let script = base.join("script");
        write_file(&script, "echo hi\n", 0o755);

        let env = Environment::new();
        let err = launch(&argv(&[script.to_str().unwrap()]), StdinMode::Inherit, &env).unwrap_err();
        assert!(matches!(err, ShellError::ExecFailed { .. }), "{err:?}");
        assert!(err.to_string().contains(": cannot execute: "));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn launch_uses_environment_dir_and_vars() {
        let base = temp_dir("cwd");
        let env = Environment {
            vars: HashMap::from([
                ("PATH".to_string(), "/usr/bin:/bin".to_string()),
                ("GREETING".to_string(), "hi".to_string()),
            ]),
            current_dir: base.clone(),
            should_exit: false,
        };
        let mut child = launch(
            &argv(&["sh", "-c", "test \"$GREETING\" = hi && touch marker"]),
            StdinMode::Detached,
            &env,
        )
        .unwrap();
        assert_eq!(child.wait().unwrap().code(), Some(0));
        assert!(base.join("marker").exists());

        let _ = fs::remove_dir_all(base);
    }
}
