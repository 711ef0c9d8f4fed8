use std::time::Duration;

use assert_cmd::Command;
use cargo_metadata::{MetadataCommand, TargetKind};

const TIMEOUT_DURATION: Duration = Duration::from_secs(30);

#[test]
fn main_doesnt_panic() -> Result<(), anyhow::Error> {
    Command::cargo_bin(env!("CARGO_PKG_NAME"))?
        .env("HEADLESS", "true")
        .timeout(TIMEOUT_DURATION)
        .assert()
        .success();
    Ok(())
}

#[test]
fn demos_dont_panic() -> Result<(), anyhow::Error> {
    let metadata = MetadataCommand::new()
        .exec()
        .expect("Failed to fetch metadata");
    for package in metadata.packages {
        if !metadata.workspace_members.contains(&package.id) {
            continue;
        }
        for target in package.targets {
            if target.is_kind(TargetKind::Example) {
                let demo_under_test = escargot::CargoBuild::new()
                    .example(&target.name)
                    .run()?;
                Command::from_std(demo_under_test.command())
                    .env("HEADLESS", "true")
                    .timeout(TIMEOUT_DURATION)
                    .assert()
                    .success();
            }
        }
    }
    Ok(())
}

#[test]
fn textures_demo_survives_missing_assets() -> Result<(), anyhow::Error> {
    let demo_under_test = escargot::CargoBuild::new().example("textures").run()?;
    let assert = Command::from_std(demo_under_test.command())
        .env("HEADLESS", "true")
        .env("ASSETS_DIR", std::env::temp_dir().join("wgpu-first-steps-no-assets"))
        .timeout(TIMEOUT_DURATION)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("using placeholder instead"));
    Ok(())
}
