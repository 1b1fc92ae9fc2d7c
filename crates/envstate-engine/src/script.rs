//! Remote script execution

use crate::report::{Location, Step, TransitionReport};
use envstate_cloud::{RemoteExecutor, SshTarget};
use envstate_core::Ssh;

/// Commands arrive HTML-escaped from some editors and templates.
pub fn unescape(command: &str) -> String {
    command.replace("&gt;", ">")
}

/// Run `commands` on `host` one after another.
///
/// Each command is recorded on its own; a failure never stops the ones
/// that follow. Returns the number of failed commands.
pub async fn run_commands(
    remote: &dyn RemoteExecutor,
    host: &str,
    ssh: &Ssh,
    commands: &[String],
    at: &Location,
    report: &mut TransitionReport,
) -> usize {
    let mut failed = 0;

    for command in commands {
        let command = unescape(command);

        let target = match SshTarget::new(host, ssh.port_or_default(), &ssh.user, &ssh.key) {
            Ok(target) => target,
            Err(e) => {
                report.failed(at, Step::Script, format!("`{command}`: {e}"));
                failed += 1;
                continue;
            }
        };

        match remote.run(&target, &command).await {
            Ok(output) => {
                report.command_output(
                    at,
                    format!("ran `{command}` on {}", target.destination()),
                    output.stdout,
                );
            }
            Err(e) => {
                report.failed(at, Step::Script, format!("`{command}` on {host}: {e}"));
                failed += 1;
            }
        }
    }

    failed
}
