use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::domain::entities::ProcessSpec;
use crate::domain::error::{DomainError, Result};
use crate::domain::value_objects::{InstanceId, InstanceState, ProcessExit};

/// Runtime state of one spawned copy of a `ProcessSpec`
///
/// All mutation goes through the `mark_*` methods so every state change is
/// validated against the transition table.
#[derive(Debug, Clone)]
pub struct ProcessInstance {
    id: InstanceId,
    spec: Arc<ProcessSpec>,
    instance_index: u32,
    state: InstanceState,
    pid: Option<u32>,
    restart_count: u32,
    last_exit: Option<ProcessExit>,
    /// Set when the restart limit was exhausted; cleared by a manual start
    failed: bool,
    /// Set when the next exit should schedule a restart (memory ceiling kill)
    restart_after_stop: bool,
    started_at: Option<SystemTime>,
    stopped_at: Option<SystemTime>,
    created_at: SystemTime,
}

impl ProcessInstance {
    pub fn new(spec: Arc<ProcessSpec>, instance_index: u32) -> Self {
        Self {
            id: InstanceId::generate(),
            spec,
            instance_index,
            state: InstanceState::Stopped,
            pid: None,
            restart_count: 0,
            last_exit: None,
            failed: false,
            restart_after_stop: false,
            started_at: None,
            stopped_at: None,
            created_at: SystemTime::now(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn spec(&self) -> &Arc<ProcessSpec> {
        &self.spec
    }

    pub fn instance_index(&self) -> u32 {
        self.instance_index
    }

    /// Display label: the spec name, suffixed with the index in cluster mode
    pub fn label(&self) -> String {
        if self.spec.instances() > 1 {
            format!("{}-{}", self.spec.name(), self.instance_index)
        } else {
            self.spec.name().to_string()
        }
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn last_exit(&self) -> Option<ProcessExit> {
        self.last_exit
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn restart_after_stop(&self) -> bool {
        self.restart_after_stop
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<SystemTime> {
        self.stopped_at
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Wall-clock duration measured from the moment the process reached
    /// Running. None until then, so a spawn that never came up has no run
    /// duration to its name.
    pub fn current_run_duration(&self) -> Option<Duration> {
        self.started_at.and_then(|t| t.elapsed().ok())
    }

    /// Uptime of the current run, only while actually running
    pub fn uptime(&self) -> Option<Duration> {
        if self.state == InstanceState::Running {
            self.current_run_duration()
        } else {
            None
        }
    }

    fn transition_to(&mut self, new_state: InstanceState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }
        self.state = new_state;
        Ok(())
    }

    pub fn mark_starting(&mut self) -> Result<()> {
        self.transition_to(InstanceState::Starting)?;
        self.started_at = None;
        self.stopped_at = None;
        self.pid = None;
        Ok(())
    }

    pub fn mark_running(&mut self, pid: u32) -> Result<()> {
        self.transition_to(InstanceState::Running)?;
        self.pid = Some(pid);
        self.started_at = Some(SystemTime::now());
        Ok(())
    }

    pub fn mark_stopping(&mut self) -> Result<()> {
        self.transition_to(InstanceState::Stopping)
    }

    pub fn mark_stopped(&mut self) -> Result<()> {
        self.transition_to(InstanceState::Stopped)?;
        self.pid = None;
        if self.stopped_at.is_none() {
            self.stopped_at = Some(SystemTime::now());
        }
        Ok(())
    }

    /// Record that the OS process left the process table
    ///
    /// An exit while Stopping completes the requested stop; any other exit is
    /// a crash, regardless of exit code.
    pub fn mark_exited(&mut self, exit: ProcessExit) -> Result<()> {
        let new_state = if matches!(self.state, InstanceState::Stopping | InstanceState::Stopped) {
            InstanceState::Stopped
        } else {
            InstanceState::Crashed
        };
        self.transition_to(new_state)?;
        self.last_exit = Some(exit);
        self.pid = None;
        self.stopped_at = Some(SystemTime::now());
        Ok(())
    }

    /// Give up on the instance after the restart limit was exhausted
    pub fn mark_failed(&mut self) -> Result<()> {
        self.transition_to(InstanceState::Stopped)?;
        self.pid = None;
        self.failed = true;
        if self.stopped_at.is_none() {
            self.stopped_at = Some(SystemTime::now());
        }
        Ok(())
    }

    pub fn increment_restarts(&mut self) {
        self.restart_count += 1;
    }

    pub fn reset_restarts(&mut self) {
        self.restart_count = 0;
    }

    pub fn clear_failed(&mut self) {
        self.failed = false;
    }

    pub fn set_restart_after_stop(&mut self, pending: bool) {
        self.restart_after_stop = pending;
    }

    /// Read and clear the pending-restart marker
    pub fn take_restart_after_stop(&mut self) -> bool {
        std::mem::take(&mut self.restart_after_stop)
    }
}
