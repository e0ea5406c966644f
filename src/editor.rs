//! Editor-launch helper (§6.5) — boundary-clarity demo only.
//!
//! The core never calls this; it exists so the external-collaborator
//! contract spec.md documents for the host CLI is represented somewhere
//! runnable and testable, the way the teacher ships small, independently
//! testable CLI helpers (e.g. its shader install/uninstall procedures)
//! alongside — but outside of — its rendering core.

use std::env;
use std::path::PathBuf;

/// Why an editor command could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorLaunchError {
    /// Refused to launch inside a sandboxed packaging environment.
    #[error("refusing to launch an editor inside a snap sandbox (SNAP_REVISION is set)")]
    SandboxedEnvironment,
}

/// Resolve the external editor command: `$EDITOR`, falling back to
/// `nano`. Refuses to resolve at all when running inside a snap sandbox
/// (signalled by `SNAP_REVISION` being set), since a spawned editor
/// cannot see the user's real filesystem there.
pub fn resolve_editor_command() -> Result<String, EditorLaunchError> {
    if env::var_os("SNAP_REVISION").is_some() {
        return Err(EditorLaunchError::SandboxedEnvironment);
    }
    Ok(env::var("EDITOR").unwrap_or_else(|_| "nano".to_string()))
}

/// Build the argv for launching `command` on `path`, as the host CLI
/// would invoke it. Kept separate from [`resolve_editor_command`] so
/// callers can resolve once and build the argv per-file.
pub fn editor_argv(command: &str, path: &PathBuf) -> Vec<String> {
    vec![command.to_string(), path.display().to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize these tests so
    // they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn falls_back_to_nano_without_editor_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::remove_var("EDITOR");
            env::remove_var("SNAP_REVISION");
        }
        assert_eq!(resolve_editor_command().unwrap(), "nano");
    }

    #[test]
    fn respects_editor_env_var() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::set_var("EDITOR", "vim");
            env::remove_var("SNAP_REVISION");
        }
        assert_eq!(resolve_editor_command().unwrap(), "vim");
        unsafe {
            env::remove_var("EDITOR");
        }
    }

    #[test]
    fn refuses_inside_snap_sandbox() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::set_var("SNAP_REVISION", "123");
        }
        assert_eq!(
            resolve_editor_command(),
            Err(EditorLaunchError::SandboxedEnvironment)
        );
        unsafe {
            env::remove_var("SNAP_REVISION");
        }
    }

    #[test]
    fn argv_includes_path() {
        let argv = editor_argv("nano", &PathBuf::from("/tmp/file.md"));
        assert_eq!(argv, vec!["nano".to_string(), "/tmp/file.md".to_string()]);
    }
}
