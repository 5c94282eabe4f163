//! Isolated execution of hook scripts
//!
//! A script sees a cleared environment: the invocation's
//! [`ExecutionEnvironment`] entries plus `PATH` and `HOME` from the parent
//! process, which `#!/usr/bin/env` interpreters and most shells need. It runs
//! from its own directory.

use crate::environment::ExecutionEnvironment;
use crate::error::{Error, Result};
use crate::result::Effect;
use crate::system::{ScriptInvocation, System};
use dotlayer_core::path::AbsPath;
use indexmap::IndexMap;

/// Parent-process variables forwarded to every script
pub const PASSTHROUGH_VARS: [&str; 2] = ["PATH", "HOME"];

/// Build the invocation for `script` without running it
pub fn invocation(script: &AbsPath, environment: &ExecutionEnvironment) -> ScriptInvocation {
    let mut env: IndexMap<String, String> = environment.to_map();
    for key in PASSTHROUGH_VARS {
        if let Ok(value) = std::env::var(key) {
            env.insert(key.to_string(), value);
        }
    }

    ScriptInvocation {
        program: script.clone(),
        args: Vec::new(),
        working_dir: script.parent().unwrap_or_else(|| script.clone()),
        env,
    }
}

/// Run `script` and return its exit status
///
/// # Errors
///
/// - [`Error::ScriptNotFound`] if the script does not exist
/// - a permissions error if the execute bit cannot be set
/// - [`Error::Spawn`] if the process cannot be started
#[tracing::instrument(skip(system, script, environment), fields(script = %script))]
pub fn run_script(
    system: &dyn System,
    script: &AbsPath,
    environment: &ExecutionEnvironment,
) -> Result<i32> {
    if !system.is_file(script) {
        return Err(Error::ScriptNotFound {
            path: script.clone(),
        });
    }

    if !system.is_executable(script) {
        tracing::debug!("Setting execute bit");
        system.set_executable(script)?;
    }

    let invocation = invocation(script, environment);
    let code = system.spawn(&invocation)?;
    tracing::debug!(code, "Script finished");
    Ok(code)
}

/// Run `script` as a hook: nonzero exit is an error, success touches `target`
pub fn run_hook_script(
    system: &dyn System,
    script: &AbsPath,
    environment: &ExecutionEnvironment,
    target: &AbsPath,
) -> Result<Effect> {
    match run_script(system, script, environment)? {
        0 => Ok(Effect::touched(target)),
        exit_code => Err(Error::ScriptFailed {
            path: script.clone(),
            exit_code,
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::environment::KEYS;
    use crate::system::{MockSystem, Operation};
    use dotlayer_config::ToolConfig;

    fn abs(p: &str) -> AbsPath {
        AbsPath::new(p.into()).unwrap()
    }

    fn environment() -> ExecutionEnvironment {
        ExecutionEnvironment::build(
            &ToolConfig::new("nvim", "/home/user/.config/nvim"),
            &abs("/dotfiles"),
            "linux",
            None,
        )
    }

    #[test]
    fn test_invocation_env_is_closed() {
        let inv = invocation(&abs("/dotfiles/tools/nvim/merge.sh"), &environment());

        assert_eq!(inv.working_dir, abs("/dotfiles/tools/nvim"));
        for key in inv.env.keys() {
            assert!(
                KEYS.contains(&key.as_str()) || PASSTHROUGH_VARS.contains(&key.as_str()),
                "unexpected variable {key}"
            );
        }
        for key in KEYS {
            assert!(inv.env.contains_key(key));
        }
    }

    #[test]
    fn test_missing_script() {
        let fs = MockSystem::new();
        let err = run_script(&fs, &abs("/dotfiles/tools/nvim/merge.sh"), &environment())
            .unwrap_err();
        assert!(matches!(err, Error::ScriptNotFound { .. }));
        assert!(fs.operations().is_empty());
    }

    #[test]
    fn test_sets_execute_bit_then_spawns() {
        let fs = MockSystem::new().with_file("/dotfiles/tools/nvim/merge.sh", "#!/bin/sh\n");
        let script = abs("/dotfiles/tools/nvim/merge.sh");

        let code = run_script(&fs, &script, &environment()).unwrap();

        assert_eq!(code, 0);
        let ops = fs.operations();
        assert_eq!(ops[0], Operation::SetExecutable { path: script });
        assert!(matches!(ops[1], Operation::Spawn { .. }));
    }

    #[test]
    fn test_nonzero_exit_is_script_failed() {
        let fs = MockSystem::new()
            .with_executable("/dotfiles/tools/nvim/merge.sh", "#!/bin/sh\nexit 4\n")
            .with_exit_code("/dotfiles/tools/nvim/merge.sh", 4);

        let err = run_hook_script(
            &fs,
            &abs("/dotfiles/tools/nvim/merge.sh"),
            &environment(),
            &abs("/home/user/.config/nvim"),
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), Some(4));
    }
}
