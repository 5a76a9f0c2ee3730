//! Subprocess execution.
//!
//! One call spawns exactly one child process:
//! - stdin is closed (`/dev/null`)
//! - stdout is piped and captured in full
//! - stderr is inherited, so tool diagnostics land in our own stderr
//!
//! The child is created with `kill_on_drop`, so dropping the call future
//! (client cancellation) kills it. Timeouts and the output limit kill and
//! reap the child before returning.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::args::{self, ResolvedArgs};
use crate::config::Defaults;
use crate::descriptor::REPORT_PLACEHOLDER;
use crate::error::{Error, Result};
use crate::registry::{Entry, ToolRegistry};
use crate::types::{ArgSource, PresetRequest, ToolInvocationRequest, ToolOutput};

/// A fully planned process launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Tool (or preset tool) name, for errors and logs
    pub tool: String,
    pub program: String,
    pub args: Vec<String>,
    pub source: ArgSource,
    pub timeout: Option<Duration>,
    pub max_output_bytes: Option<usize>,
    /// Arguments carry a `{report}` slot whose file becomes the output
    pub report: bool,
}

impl Invocation {
    pub fn new(tool: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args,
            source: ArgSource::Caller,
            timeout: None,
            max_output_bytes: None,
            report: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = Some(limit);
        self
    }
}

/// Runs a planned invocation
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Executor backed by real operating-system processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::LaunchFailure {
                tool: invocation.tool.clone(),
                program: invocation.program.clone(),
                source,
            })?;

        debug!("Spawned {} (pid {:?})", invocation.program, child.id());

        let collected = match invocation.timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, collect(&mut child, invocation)).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("{} timed out after {:?}, killing", invocation.tool, limit);
                        reap(&mut child).await;
                        return Err(Error::Timeout {
                            tool: invocation.tool.clone(),
                            timeout_ms: limit.as_millis() as u64,
                        });
                    }
                }
            }
            None => collect(&mut child, invocation).await,
        };

        let (stdout, status) = match collected {
            Ok(collected) => collected,
            Err(e) => {
                reap(&mut child).await;
                return Err(e);
            }
        };

        check_status(&invocation.tool, status)?;
        Ok(ToolOutput::text(stdout))
    }
}

/// Read stdout to EOF, then wait for the exit status.
async fn collect(child: &mut Child, invocation: &Invocation) -> Result<(Vec<u8>, ExitStatus)> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;

    let stdout = read_capped(stdout, invocation.max_output_bytes)
        .await?
        .ok_or_else(|| Error::OutputTooLarge {
            tool: invocation.tool.clone(),
            limit: invocation.max_output_bytes.unwrap_or_default(),
        })?;

    let status = child.wait().await?;
    Ok((stdout, status))
}

/// Read everything, or `None` once more than `limit` bytes arrive.
async fn read_capped<R>(reader: R, limit: Option<usize>) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    match limit {
        Some(limit) => {
            reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
            if buf.len() > limit {
                return Ok(None);
            }
        }
        None => {
            let mut reader = reader;
            reader.read_to_end(&mut buf).await?;
        }
    }
    Ok(Some(buf))
}

/// Kill the child if it is still running and wait for it.
async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!("kill after failure: {}", e);
    }
}

fn check_status(tool: &str, status: ExitStatus) -> Result<()> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(Error::NonZeroExit {
            tool: tool.to_string(),
            code,
        }),
        None => Err(Error::Terminated {
            tool: tool.to_string(),
            signal: exit_signal(&status),
        }),
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Registry lookup, argument resolution and execution for tool calls
#[derive(Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    executor: Arc<dyn Executor>,
    defaults: Defaults,
}

impl ToolRunner {
    pub fn new(registry: Arc<ToolRegistry>, defaults: Defaults) -> Self {
        Self::with_executor(registry, defaults, Arc::new(ProcessExecutor))
    }

    pub fn with_executor(
        registry: Arc<ToolRegistry>,
        defaults: Defaults,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            registry,
            executor,
            defaults,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Plan a plain tool call without running anything.
    pub fn plan(&self, name: &str, request: &ToolInvocationRequest) -> Result<Invocation> {
        let tool = self.registry.get(name)?;
        let resolved = args::resolve(tool, request)?;
        Ok(self.build(&tool.name, &tool.executable, tool.timeout_secs, resolved))
    }

    /// Plan a preset call without running anything.
    pub fn plan_preset(&self, name: &str, request: &PresetRequest) -> Result<Invocation> {
        match self.registry.lookup(name)? {
            Entry::Preset(tool, preset) => {
                let resolved = args::resolve_preset(preset, request)?;
                Ok(self.build(name, &tool.executable, tool.timeout_secs, resolved))
            }
            Entry::Tool(_) => Err(Error::InvalidRequest(format!("{} is not a preset", name))),
        }
    }

    /// Run a plain tool call.
    pub async fn invoke(&self, name: &str, request: &ToolInvocationRequest) -> Result<ToolOutput> {
        let invocation = self.plan(name, request)?;
        self.run(&invocation).await
    }

    /// Run a preset call.
    pub async fn invoke_preset(&self, name: &str, request: &PresetRequest) -> Result<ToolOutput> {
        let invocation = self.plan_preset(name, request)?;
        self.run(&invocation).await
    }

    /// Execute an already planned invocation.
    pub async fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        info!(
            "Running {} with {} arguments: {:?}",
            invocation.tool, invocation.source, invocation.args
        );

        let result = if invocation.report {
            self.run_with_report(invocation).await
        } else {
            self.executor.execute(invocation).await
        };
        match &result {
            Ok(output) => debug!("{} succeeded ({} bytes)", invocation.tool, output.stdout.len()),
            Err(e) => warn!("{} failed: {}", invocation.tool, e),
        }
        result
    }

    /// Point `{report}` at a fresh temporary file and return that file.
    async fn run_with_report(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report");
        let path_text = path.to_string_lossy();

        let mut planned = invocation.clone();
        planned.args = invocation
            .args
            .iter()
            .map(|arg| arg.replace(REPORT_PLACEHOLDER, &path_text))
            .collect();
        debug!("{} writes its report to {}", invocation.tool, path.display());

        self.executor.execute(&planned).await?;
        let report = tokio::fs::read(&path)
            .await
            .map_err(|source| Error::MissingReport {
                tool: invocation.tool.clone(),
                source,
            })?;
        Ok(ToolOutput::text(report))
    }

    fn build(
        &self,
        name: &str,
        program: &str,
        timeout_secs: Option<u64>,
        resolved: ResolvedArgs,
    ) -> Invocation {
        Invocation {
            tool: name.to_string(),
            program: program.to_string(),
            args: resolved.args,
            source: resolved.source,
            timeout: self.defaults.timeout_for(timeout_secs),
            max_output_bytes: self.defaults.max_output_bytes,
            report: resolved.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ToolDescriptor, ToolPreset};
    use std::sync::Mutex;
    use std::time::Instant;

    fn runner_for(tools: Vec<ToolDescriptor>) -> ToolRunner {
        let registry = Arc::new(ToolRegistry::new(tools).unwrap());
        ToolRunner::new(registry, Defaults::default())
    }

    fn katana() -> ToolDescriptor {
        ToolDescriptor::new("katana", "katana").with_default_args(["-u", "https://example.com"])
    }

    /// Records invocations instead of spawning processes.
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<Invocation>>,
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn execute(&self, invocation: &Invocation) -> Result<ToolOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            Ok(ToolOutput::text(b"recorded".to_vec()))
        }
    }

    #[test]
    fn test_plan_empty_request_uses_defaults() {
        let runner = runner_for(vec![katana()]);
        let invocation = runner.plan("katana", &ToolInvocationRequest::new("")).unwrap();

        assert_eq!(invocation.program, "katana");
        assert_eq!(invocation.args, vec!["-u", "https://example.com"]);
        assert_eq!(invocation.source, ArgSource::Default);
        assert_eq!(invocation.timeout, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_plan_caller_args() {
        let runner = runner_for(vec![katana()]);
        let invocation = runner
            .plan("katana", &ToolInvocationRequest::new("-u https://test.local -jc"))
            .unwrap();

        assert_eq!(invocation.args, vec!["-u", "https://test.local", "-jc"]);
        assert_eq!(invocation.source, ArgSource::Caller);
    }

    #[test]
    fn test_plan_uses_tool_timeout() {
        let runner = runner_for(vec![katana().with_timeout_secs(0)]);
        let invocation = runner.plan("katana", &ToolInvocationRequest::default()).unwrap();
        assert_eq!(invocation.timeout, None);
    }

    #[test]
    fn test_plan_unknown_tool() {
        let runner = runner_for(vec![katana()]);
        let err = runner.plan("nuclei", &ToolInvocationRequest::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownTool(_)));
    }

    #[test]
    fn test_plan_preset() {
        let nmap = ToolDescriptor::new("nmap", "/usr/bin/nmap")
            .with_preset(ToolPreset::new("ping_sweep", ["-sn", "{args}", "{target}"]));
        let runner = runner_for(vec![nmap]);

        let invocation = runner
            .plan_preset("nmap_ping_sweep", &PresetRequest::new("192.168.1.0/24"))
            .unwrap();
        assert_eq!(invocation.tool, "nmap_ping_sweep");
        assert_eq!(invocation.program, "/usr/bin/nmap");
        assert_eq!(invocation.args, vec!["-sn", "192.168.1.0/24"]);
        assert_eq!(invocation.source, ArgSource::Preset);

        let err = runner
            .plan_preset("nmap", &PresetRequest::new("10.0.0.1"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_invoke_passes_tokens_in_order() {
        let recorder = Arc::new(RecordingExecutor::default());
        let registry = Arc::new(ToolRegistry::new([katana()]).unwrap());
        let runner = ToolRunner::with_executor(registry, Defaults::default(), recorder.clone());

        let output = runner
            .invoke("katana", &ToolInvocationRequest::new("-u https://test.local -jc"))
            .await
            .unwrap();
        assert_eq!(output.stdout, b"recorded");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "katana");
        assert_eq!(calls[0].args, vec!["-u", "https://test.local", "-jc"]);
    }

    #[tokio::test]
    async fn test_process_success_returns_exact_stdout() {
        let runner = runner_for(vec![ToolDescriptor::new("printf", "printf")]);
        let output = runner
            .invoke("printf", &ToolInvocationRequest::new("%s|%s| -u https://test.local"))
            .await
            .unwrap();

        // No trailing newline added, nothing trimmed.
        assert_eq!(output.stdout, b"-u|https://test.local|");
        assert_eq!(output.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_process_echo_argument_vector() {
        let runner = runner_for(vec![ToolDescriptor::new("echo", "echo")]);
        let output = runner
            .invoke("echo", &ToolInvocationRequest::new("  hello   world "))
            .await
            .unwrap();
        assert_eq!(output.as_utf8(), Some("hello world\n"));
    }

    #[tokio::test]
    async fn test_process_defaults_when_empty() {
        let tool = ToolDescriptor::new("echo", "echo").with_default_args(["-n", "default run"]);
        let runner = runner_for(vec![tool]);

        let output = runner.invoke("echo", &ToolInvocationRequest::new(" ")).await.unwrap();
        assert_eq!(output.stdout, b"default run");
    }

    #[tokio::test]
    async fn test_process_non_zero_exit_reports_code() {
        let tool = ToolDescriptor::new("sh", "sh").with_default_args(["-c", "echo partial; exit 7"]);
        let runner = runner_for(vec![tool]);

        let err = runner.invoke("sh", &ToolInvocationRequest::default()).await.unwrap_err();
        match err {
            Error::NonZeroExit { tool, code } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, 7);
            }
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_launch_failure_is_distinct() {
        let tool = ToolDescriptor::new("ghost", "rtmcp-no-such-binary-4f2a");
        let runner = runner_for(vec![tool]);

        let err = runner.invoke("ghost", &ToolInvocationRequest::default()).await.unwrap_err();
        match err {
            Error::LaunchFailure { tool, program, source } => {
                assert_eq!(tool, "ghost");
                assert_eq!(program, "rtmcp-no-such-binary-4f2a");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected LaunchFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_stdin_is_closed() {
        // cat would block forever on an inherited terminal; with /dev/null it exits at once.
        let runner = runner_for(vec![ToolDescriptor::new("cat", "cat")]);
        let output = runner.invoke("cat", &ToolInvocationRequest::default()).await.unwrap();
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_process_timeout_kills_child() {
        let invocation = Invocation::new("sleep", "sleep", vec!["5".to_string()])
            .with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let err = ProcessExecutor.execute(&invocation).await.unwrap_err();

        assert!(matches!(err, Error::Timeout { timeout_ms: 200, .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_process_output_limit() {
        let invocation = Invocation::new(
            "sh",
            "sh",
            vec!["-c".to_string(), "printf 0123456789".to_string()],
        )
        .with_max_output_bytes(4);

        let err = ProcessExecutor.execute(&invocation).await.unwrap_err();
        assert!(matches!(err, Error::OutputTooLarge { limit: 4, .. }));

        let within = invocation.clone().with_max_output_bytes(10);
        let output = ProcessExecutor.execute(&within).await.unwrap();
        assert_eq!(output.stdout, b"0123456789");
    }

    #[tokio::test]
    async fn test_report_preset_returns_file_content() {
        let tool = ToolDescriptor::new("sh", "sh").with_preset(ToolPreset::new(
            "report",
            [
                "-c",
                "echo console noise; printf %s \"$2\" > \"$1\"",
                "sh",
                "{report}",
                "{target}",
                "{args}",
            ],
        ));
        let runner = runner_for(vec![tool]);

        let invocation = runner
            .plan_preset("sh_report", &PresetRequest::new("scan-result"))
            .unwrap();
        assert!(invocation.report);
        assert!(invocation.args.contains(&"{report}".to_string()));

        let output = runner.run(&invocation).await.unwrap();
        assert_eq!(output.stdout, b"scan-result");
    }

    #[tokio::test]
    async fn test_report_preset_without_file() {
        let tool = ToolDescriptor::new("sh", "sh").with_preset(ToolPreset::new(
            "report",
            ["-c", "true", "{report}", "{target}", "{args}"],
        ));
        let runner = runner_for(vec![tool]);

        let err = runner
            .invoke_preset("sh_report", &PresetRequest::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingReport { ref tool, .. } if tool == "sh_report"));
    }

    #[tokio::test]
    async fn test_report_path_substituted_for_executor() {
        let recorder = Arc::new(RecordingExecutor::default());
        let tool = ToolDescriptor::new("dirsearch", "dirsearch").with_preset(ToolPreset::new(
            "json_report_scan",
            ["-u", "{target}", "--output={report}", "{args}"],
        ));
        let registry = Arc::new(ToolRegistry::new([tool]).unwrap());
        let runner = ToolRunner::with_executor(registry, Defaults::default(), recorder.clone());

        // The recorder writes nothing, so the report is missing.
        let err = runner
            .invoke_preset("dirsearch_json_report_scan", &PresetRequest::new("https://t"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingReport { .. }));

        let calls = recorder.calls.lock().unwrap();
        let output_arg = &calls[0].args[2];
        assert!(output_arg.starts_with("--output=/"), "{}", output_arg);
        assert!(!output_arg.contains("{report}"));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropped_call_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let invocation = Invocation::new(
            "sh",
            "sh",
            vec![
                "-c".to_string(),
                "echo $$ > \"$0\"; exec sleep 30".to_string(),
                pid_file.display().to_string(),
            ],
        );

        // No timeout on the invocation: the outer timeout drops the future,
        // as a cancelled MCP request does.
        let dropped =
            tokio::time::timeout(Duration::from_millis(500), ProcessExecutor.execute(&invocation))
                .await;
        assert!(dropped.is_err());

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let stat = format!("/proc/{}/stat", pid.trim());

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            // Gone, or a zombie waiting to be reaped.
            let alive = match std::fs::read_to_string(&stat) {
                Ok(content) => {
                    let state = content.rsplit(')').next().unwrap_or("").trim_start();
                    !state.starts_with('Z')
                }
                Err(_) => false,
            };
            if !alive {
                break;
            }
            assert!(Instant::now() < deadline, "child {} still running", pid.trim());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_killed_by_signal() {
        let invocation = Invocation::new(
            "sh",
            "sh",
            vec!["-c".to_string(), "kill -9 $$".to_string()],
        );

        let err = ProcessExecutor.execute(&invocation).await.unwrap_err();
        assert!(matches!(err, Error::Terminated { signal: Some(9), .. }));
    }
}
