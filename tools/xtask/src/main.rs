//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 tween-runtime 覆盖率
//! - `demo`: 运行演示脚本冒烟检查

use std::process::{Command, ExitCode};

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    match cargo(&["llvm-cov", "--version"]).status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let sub = std::env::args().nth(1).unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let fmt = ["fmt", "--all", "--", "--check"];
            run("cargo fmt --all -- --check", &mut cargo(&fmt))?;

            let clippy = ["clippy", "--workspace", "--all-targets"];
            run("cargo clippy --workspace --all-targets", &mut cargo(&clippy))?;

            run("cargo test --workspace", &mut cargo(&["test", "--workspace"]))?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let cov = ["llvm-cov", "-p", "tween-runtime", "--html"];
            run("cargo llvm-cov -p tween-runtime --html", &mut cargo(&cov))?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "demo" => {
            // 覆盖三种典型脚本：准备后播放、直接完成、播放中销毁宿主
            let scripts: [&[&str]; 3] = [
                &["--actions", "ready,play"],
                &["--actions", "ready,complete"],
                &["--actions", "play", "--destroy-at", "5"],
            ];
            for script in scripts {
                let mut args = vec!["run", "-q", "-p", "tween-demo", "--"];
                args.extend_from_slice(script);
                let step = format!("tween-demo {}", script.join(" "));
                run(&step, &mut cargo(&args))?;
            }
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 tween-runtime 覆盖率报告
  demo            依次运行几段演示脚本

ALIASES (in .cargo/config.toml):
  cargo check-all   -> cargo xtask check-all
  cargo cov-runtime -> cargo xtask cov-runtime
"#
    );
}
