//! Agent gateway that runs each agent as a local command.
//!
//! The prompt is written to the child's stdin, which is then closed; the
//! child's stdout is the answer. The child is killed when the invocation is
//! dropped, so a round timeout or a cancelled loop never leaves stray
//! processes behind.

use async_trait::async_trait;
use council_application::{AgentGateway, AgentReply, GatewayError};
use council_domain::AgentId;
use council_domain::core::string::truncate;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Maximum stderr kept in an error message
const MAX_STDERR_CHARS: usize = 500;

/// Command line that runs one agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AgentCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// [`AgentGateway`] backed by child processes
pub struct ProcessAgentGateway {
    commands: HashMap<AgentId, AgentCommand>,
}

impl ProcessAgentGateway {
    pub fn new(commands: HashMap<AgentId, AgentCommand>) -> Self {
        Self { commands }
    }

    pub fn command(&self, agent: &AgentId) -> Option<&AgentCommand> {
        self.commands.get(agent)
    }

    fn build(command: &AgentCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

#[async_trait]
impl AgentGateway for ProcessAgentGateway {
    async fn invoke(
        &self,
        agent: &AgentId,
        prompt: &str,
        timeout: Duration,
    ) -> Result<AgentReply, GatewayError> {
        let command = self
            .commands
            .get(agent)
            .ok_or_else(|| GatewayError::UnknownAgent(agent.to_string()))?;

        debug!("Invoking {} via {}", agent, command.program);
        let start = Instant::now();

        let mut child = Self::build(command)
            .spawn()
            .map_err(|e| GatewayError::SpawnFailed(format!("{}: {}", command.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // a child that exits without reading its input still gets judged on its output
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                debug!("Could not write prompt to {}: {}", agent, e);
            }
            drop(stdin);
        }

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::ExitFailure {
                status: output.status.to_string(),
                stderr: truncate(stderr.trim(), MAX_STDERR_CHARS),
            });
        }

        let content = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if content.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        Ok(AgentReply::new(content, start.elapsed().as_millis() as u64))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn gateway(id: &str, program: &str, args: &[&str]) -> ProcessAgentGateway {
        let mut commands = HashMap::new();
        commands.insert(
            AgentId::new(id),
            AgentCommand::new(program, args.iter().map(|a| a.to_string()).collect()),
        );
        ProcessAgentGateway::new(commands)
    }

    #[tokio::test]
    async fn test_prompt_on_stdin_answer_on_stdout() {
        let gateway = gateway("echo", "cat", &[]);
        let reply = gateway
            .invoke(&AgentId::new("echo"), "Use LRU\n", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply.content, "Use LRU");
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let gateway = gateway("bad", "sh", &["-c", "echo 'rate limited' >&2; exit 3"]);
        let err = gateway
            .invoke(&AgentId::new("bad"), "x", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            GatewayError::ExitFailure { stderr, .. } => assert_eq!(stderr, "rate limited"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_output() {
        let gateway = gateway("quiet", "sh", &["-c", "cat >/dev/null"]);
        let err = gateway
            .invoke(&AgentId::new("quiet"), "x", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let gateway = gateway("slow", "sleep", &["30"]);
        let start = Instant::now();
        let err = gateway
            .invoke(&AgentId::new("slow"), "x", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Timeout);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unknown_agent_and_spawn_failure() {
        let gateway = gateway("ghost", "/nonexistent/agent-binary", &[]);
        let err = gateway
            .invoke(&AgentId::new("other"), "x", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::UnknownAgent("other".to_string()));

        let err = gateway
            .invoke(&AgentId::new("ghost"), "x", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::SpawnFailed(_)));
    }
}
