//! Command execution for `executeCommand` requests

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use architect_core::bridge::CommandRunner;
use architect_core::Result;

/// Runs commands through the platform shell and echoes their output on stderr.
///
/// Output never goes to stdout, which carries the bridge protocol.
pub struct ShellRunner;

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<()> {
        tracing::info!("Executing command: {}", command);
        let output = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        eprint!("{}", String::from_utf8_lossy(&output.stdout));
        eprint!("{}", String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(std::io::Error::other(format!(
                "command exited with {}",
                output.status
            ))
            .into());
        }
        Ok(())
    }
}
