//! Hooks against a real dotfiles directory in a temp dir

use dotlayer_config::ToolConfig;
use dotlayer_core::path::AbsPath;
use dotlayer_engine::{HookRunner, RealSystem, apply_tool};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    dotfiles: AbsPath,
    home: AbsPath,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = AbsPath::from_path(temp.path()).unwrap();
    let dotfiles = root.join("dotfiles");
    let home = root.join("home");
    fs::create_dir_all(dotfiles.as_path()).unwrap();
    fs::create_dir_all(home.as_path()).unwrap();
    Fixture {
        _temp: temp,
        dotfiles,
        home,
    }
}

fn write(path: &AbsPath, content: &str) {
    fs::create_dir_all(path.parent().unwrap().as_path()).unwrap();
    fs::write(path.as_path(), content).unwrap();
}

fn tool_toml(fx: &Fixture, tool: &str, body: &str) {
    write(&fx.dotfiles.join(format!("tools/{tool}/tool.toml")), body);
}

#[test]
fn test_load_and_concat() {
    let fx = fixture();
    write(&fx.dotfiles.join("configs/ssh/base"), "Host *\n");
    write(&fx.dotfiles.join("configs/ssh/work"), "Host bastion\n");
    tool_toml(
        &fx,
        "ssh",
        &format!(
            r#"
target = "{}/.ssh/config"
merge = "builtin:concat"

[[layers]]
name = "base"
path = "configs/ssh/base"

[[layers]]
name = "work"
path = "configs/ssh/work"
"#,
            fx.home
        ),
    );

    let config = ToolConfig::load(&fx.dotfiles, "ssh").unwrap();
    let runner = HookRunner::new(&fx.dotfiles.to_string(), RealSystem).unwrap();
    let result = runner.run_merge(&config);

    assert!(result.is_success(), "{}", result.error_message());
    let written = fs::read_to_string(fx.home.join(".ssh/config").as_path()).unwrap();
    assert_eq!(
        written,
        "# --- layer: base ---\nHost *\n# --- layer: work ---\nHost bastion\n"
    );
}

#[cfg(unix)]
#[test]
fn test_symlink_replaces_existing_file() {
    let fx = fixture();
    write(&fx.dotfiles.join("git/base"), "[core]\n");
    write(&fx.home.join(".gitconfig"), "old");
    tool_toml(
        &fx,
        "git",
        &format!(
            "target = \"{}/.gitconfig\"\nmerge = \"builtin:symlink\"\n\n[[layers]]\nname = \"base\"\npath = \"git/base\"\n",
            fx.home
        ),
    );

    let config = ToolConfig::load(&fx.dotfiles, "git").unwrap();
    let runner = HookRunner::new(&fx.dotfiles.to_string(), RealSystem).unwrap();
    let backups = fx.dotfiles.join("../backups");
    let report = apply_tool(&runner, &config, Some(&backups));

    assert!(report.is_success());
    let link = fx.home.join(".gitconfig");
    assert_eq!(
        fs::read_link(link.as_path()).unwrap(),
        fx.dotfiles.join("git/base").into_path_buf()
    );
    let backup = report.backup.unwrap();
    assert_eq!(fs::read_to_string(backup.as_path()).unwrap(), "old");
}

#[cfg(unix)]
#[test]
fn test_script_runs_in_closed_environment() {
    let fx = fixture();
    let out = fx.home.join("env.out");
    write(
        &fx.dotfiles.join("tools/zsh/merge.sh"),
        &format!(
            "#!/bin/sh\n\
             {{\n\
             echo \"TOOL=$TOOL\"\n\
             echo \"LAYERS=$LAYERS\"\n\
             echo \"OS=$OS\"\n\
             echo \"PWD=$(pwd)\"\n\
             echo \"PKG=${{CARGO_PKG_NAME:-unset}}\"\n\
             }} > \"{out}\"\n"
        ),
    );
    let config = ToolConfig::new("zsh", format!("{}/.zshrc", fx.home))
        .with_merge("merge.sh".parse().unwrap());

    let runner = HookRunner::new(&fx.dotfiles.to_string(), RealSystem).unwrap();
    let result = runner.run_merge(&config);

    assert!(result.is_success(), "{}", result.error_message());
    let env = fs::read_to_string(out.as_path()).unwrap();
    assert!(env.contains("TOOL=zsh"));
    assert!(env.contains("LAYERS=\n"));
    assert!(env.contains(&format!("OS={}", runner.os())));
    assert!(env.contains("PKG=unset"));
    let tool_dir = fs::canonicalize(fx.dotfiles.join("tools/zsh").as_path()).unwrap();
    assert!(env.contains(&format!("PWD={}", tool_dir.display())));
}

#[cfg(unix)]
#[test]
fn test_script_exit_code_is_reported() {
    let fx = fixture();
    write(&fx.dotfiles.join("tools/tmux/install.sh"), "#!/bin/sh\nexit 7\n");
    let config = ToolConfig::new("tmux", format!("{}/.tmux.conf", fx.home))
        .with_install("./install.sh".parse().unwrap());

    let runner = HookRunner::new(&fx.dotfiles.to_string(), RealSystem).unwrap();
    let result = runner.run_install(&config);

    assert!(!result.is_success());
    assert_eq!(result.error_code(), 7);
    assert!(result.error_message().contains('7'));
}
