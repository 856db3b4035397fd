use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread::JoinHandle;

use serde_json::Value;

use crate::foundation::error::{PlayError, PlayResult};
use crate::foundation::ids::IdAllocator;
use crate::model::array::ArrayModel;
use crate::model::script::{Playlist, Script};
use crate::playback::config::PlaybackConfig;
use crate::playback::events::{
    PlaybackEvent, PlaybackView, RunReport, RunState, StepFrame, StepWarning,
};
use crate::playback::interpret::{self, Change, TransitionHint};
use crate::playback::pacer::{Pacer, ThreadPacer};

/// Replays command lists against an identity-stable array, one paced step at a time.
///
/// `Engine` is a cheap handle; clones share the same state. At most one run is in progress per
/// engine: a `start` while running is rejected and leaves the current run untouched.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

struct Shared {
    config: PlaybackConfig,
    pacer: Box<dyn Pacer>,
    alloc: IdAllocator,
    state: Mutex<EngineState>,
}

#[derive(Default)]
struct EngineState {
    model: ArrayModel,
    active_line: Option<u32>,
    variables: BTreeMap<String, Value>,
    transitions: Vec<TransitionHint>,
    run: RunState,
    subscribers: Vec<mpsc::Sender<PlaybackEvent>>,
}

impl EngineState {
    fn view(&self) -> PlaybackView {
        PlaybackView {
            elements: self.model.clone(),
            active_line: self.active_line,
            variables: self.variables.clone(),
            transitions: self.transitions.clone(),
            running: self.run == RunState::Running,
        }
    }

    fn publish(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Outcome of [`Engine::start`].
#[derive(Debug)]
pub enum StartOutcome {
    /// The run was accepted and is playing on its own thread.
    Started(RunHandle),
    /// Another run is in progress; nothing was changed.
    Rejected,
}

impl StartOutcome {
    /// Whether the run was accepted.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    /// The run handle, if the run was accepted.
    pub fn into_handle(self) -> Option<RunHandle> {
        match self {
            Self::Started(h) => Some(h),
            Self::Rejected => None,
        }
    }
}

/// Join handle for a run started with [`Engine::start`].
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Block until the run drains.
    pub fn join(self) -> PlayResult<RunReport> {
        self.handle
            .join()
            .map_err(|_| PlayError::Other(anyhow::anyhow!("playback thread panicked")))
    }

    /// Whether the run has drained.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Engine {
    /// Engine over `initial`, pacing steps with real sleeps.
    pub fn new(initial: Vec<Value>, config: PlaybackConfig) -> PlayResult<Self> {
        Self::with_pacer(initial, config, ThreadPacer)
    }

    /// Engine over `initial` with a custom pacer.
    pub fn with_pacer(
        initial: Vec<Value>,
        config: PlaybackConfig,
        pacer: impl Pacer + 'static,
    ) -> PlayResult<Self> {
        config.validate()?;
        let alloc = IdAllocator::new();
        let state = EngineState {
            model: ArrayModel::from_values(&alloc, initial),
            ..EngineState::default()
        };
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                pacer: Box::new(pacer),
                alloc,
                state: Mutex::new(state),
            }),
        })
    }

    /// Engine over a script's initial array.
    pub fn from_script(script: &Script, config: PlaybackConfig) -> PlayResult<Self> {
        Self::new(script.initial.clone(), config)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &PlaybackConfig {
        &self.shared.config
    }

    /// Current state, for rendering.
    pub fn view(&self) -> PlaybackView {
        self.shared.lock().view()
    }

    /// Current run state.
    pub fn run_state(&self) -> RunState {
        self.shared.lock().run
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Receive every event published from now on. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel();
        self.shared.lock().subscribers.push(tx);
        rx
    }

    /// Replace the array with `values` under fresh identities.
    ///
    /// Refused while a run is in progress.
    pub fn load(&self, values: Vec<Value>) -> PlayResult<()> {
        let mut st = self.shared.lock();
        if st.run == RunState::Running {
            return Err(PlayError::rejected("cannot load while a run is in progress"));
        }
        st.model = ArrayModel::from_values(&self.shared.alloc, values);
        st.transitions.clear();
        st.active_line = None;
        Ok(())
    }

    /// Start playing `playlist` on a dedicated thread.
    ///
    /// Returns [`StartOutcome::Rejected`] without touching any state when a run is already in
    /// progress. Errors only if the playback thread cannot be spawned.
    #[tracing::instrument(skip_all)]
    pub fn start(&self, playlist: impl Into<Playlist>) -> PlayResult<StartOutcome> {
        let playlist = playlist.into();
        if !self.shared.begin() {
            return Ok(StartOutcome::Rejected);
        }

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("arrayplay-run".to_string())
            .spawn(move || shared.drive(&playlist));

        match spawned {
            Ok(handle) => Ok(StartOutcome::Started(RunHandle { handle })),
            Err(err) => {
                self.shared.abort();
                Err(err.into())
            }
        }
    }

    /// Play `playlist` on the calling thread and return its report.
    ///
    /// Returns `None` when another run is already in progress.
    #[tracing::instrument(skip_all)]
    pub fn run(&self, playlist: impl Into<Playlist>) -> Option<RunReport> {
        let playlist = playlist.into();
        if !self.shared.begin() {
            return None;
        }
        Some(self.shared.drive(&playlist))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.shared.config)
            .field("run", &self.run_state())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Idle -> Running. The check and the transition happen under one lock. Subscribers hear
    // nothing until `drive` actually begins.
    fn begin(&self) -> bool {
        let mut st = self.lock();
        if st.run == RunState::Running {
            tracing::debug!("start rejected: a run is already in progress");
            return false;
        }
        st.run = RunState::Running;
        st.variables.clear();
        st.transitions.clear();
        st.active_line = None;
        true
    }

    // Running -> Idle without a report, for a run that never got to (or failed to) finish.
    fn abort(&self) {
        let mut st = self.lock();
        st.run = RunState::Idle;
        st.active_line = None;
        st.transitions.clear();
        st.variables.clear();
    }

    #[tracing::instrument(skip_all, fields(steps = playlist.commands.len()))]
    fn drive(&self, playlist: &Playlist) -> RunReport {
        let mut guard = DriveGuard {
            shared: self,
            finished: false,
        };
        {
            let mut st = self.lock();
            let view = st.view();
            st.publish(PlaybackEvent::RunStarted {
                total: playlist.commands.len(),
                view,
            });
        }

        let mut warnings = Vec::new();

        for (idx, cmd) in playlist.commands.iter().enumerate() {
            let line = playlist.line_at(idx);
            let delay = {
                let mut st = self.lock();
                st.active_line = line;

                let step = interpret::step(&st.model, cmd, &self.alloc, &self.config);
                st.model = step.next;
                if let Change::VarSet { name, value } = &step.change {
                    st.variables.insert(name.clone(), value.clone());
                }
                st.transitions = step.change.hints();

                let warning = step.fault.map(|fault| {
                    tracing::warn!(step = idx, ?line, kind = %cmd.kind(), error = %fault, "skipping step");
                    StepWarning {
                        step: idx,
                        line,
                        kind: cmd.kind(),
                        category: fault.category(),
                        message: fault.to_string(),
                    }
                });
                if let Some(w) = &warning {
                    warnings.push(w.clone());
                }

                let frame = StepFrame {
                    step: idx,
                    command: cmd.clone(),
                    change: step.change,
                    delay_ms: u64::try_from(step.delay.as_millis()).unwrap_or(u64::MAX),
                    warning,
                    view: st.view(),
                };
                st.publish(PlaybackEvent::Step(frame));
                step.delay
            };
            self.pacer.pause(delay);
        }

        let mut st = self.lock();
        st.active_line = None;
        st.transitions.clear();
        st.run = RunState::Idle;

        let final_matches_expected = playlist
            .expected_final
            .as_ref()
            .map(|expected| st.model.values_match(expected));
        if final_matches_expected == Some(false) {
            tracing::warn!("final array differs from the interpreter's reported result");
        }

        let report = RunReport {
            steps: playlist.commands.len(),
            warnings,
            elements: st.model.clone(),
            variables: st.variables.clone(),
            final_matches_expected,
        };
        st.publish(PlaybackEvent::Finished(report.clone()));
        guard.finished = true;
        tracing::debug!(warnings = report.warnings.len(), "run finished");
        report
    }
}

// Returns the engine to idle if `drive` unwinds before publishing its report.
struct DriveGuard<'a> {
    shared: &'a Shared,
    finished: bool,
}

impl Drop for DriveGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("run unwound before finishing; engine reset to idle");
            self.shared.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/engine.rs"]
mod tests;
