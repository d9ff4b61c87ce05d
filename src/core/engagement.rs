//! Timed screens shown between a successful submission and the payment redirect.
//!
//! The sequence is a tarot transition with two phases followed by scripted
//! messages revealed one at a time. Pacing comes only from the clock; the
//! visitor's single input is the continue action exposed at the end.

use std::time::Duration;

use tokio::sync::watch;

use crate::core::timeline::{Scheduler, Timeline};

/// Lines revealed by the message screen
pub const SCRIPT: [&str; 5] = [
    "E eu não estou exagerando quando digo que é um valor simbólico, porque é uma taxa só de R$19,90...",
    "Só lembrando, essa taxa é por todo material que eu tenho que usar e ainda tem todo o meu esforço pra me conectar com vocês dois, você entende né?",
    "Mas olha só, se você me disser que eu posso confiar em você, eu vou te mandar o desenho antes mesmo de você me pagar essa taxinha....",
    "Porque eu ACABEI de terminar o retrato dele e eu já tô MAIS ANSIOSA do que você, eu aposto 😁",
    "Então, eu posso confiar em você né?",
];

pub const LOADING_STEPS: [&str; 3] = [
    "✨ Processando seus dados pessoais",
    "🔮 Analisando compatibilidade cósmica",
    "💕 Encontrando sua conexão perfeita",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Revelation,
    Analysis,
}

/// What the visitor currently sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Transition(TransitionPhase),
    /// Number of script lines visible, 1-based
    Messages { visible: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementState {
    Idle,
    Showing { step: usize, screen: Screen },
    /// Every line shown; continue is available
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementAction {
    Transition(TransitionPhase),
    RevealLine(usize),
    EnableContinue,
}

/// Fixed pacing of the engagement screens
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementScript {
    pub analysis_after: Duration,
    pub transition_total: Duration,
    pub line_interval: Duration,
    pub continue_pause: Duration,
    pub lines: usize,
}

impl Default for EngagementScript {
    fn default() -> Self {
        Self {
            analysis_after: Duration::from_secs(3),
            transition_total: Duration::from_secs(6),
            line_interval: Duration::from_secs(3),
            continue_pause: Duration::from_secs(1),
            lines: SCRIPT.len(),
        }
    }
}

impl EngagementScript {
    pub fn transition_timeline(&self) -> Timeline<EngagementAction> {
        Timeline::new()
            .at(Duration::ZERO, EngagementAction::Transition(TransitionPhase::Revelation))
            .at(self.analysis_after, EngagementAction::Transition(TransitionPhase::Analysis))
    }

    pub fn message_timeline(&self) -> Timeline<EngagementAction> {
        let mut timeline = Timeline::new();
        for idx in 0..self.lines {
            timeline.push(self.line_interval * idx as u32, EngagementAction::RevealLine(idx + 1));
        }
        timeline.push(
            self.line_interval * self.lines as u32 + self.continue_pause,
            EngagementAction::EnableContinue,
        );
        timeline
    }

    /// Whole sequence: messages start when the transition completes
    pub fn timeline(&self) -> Timeline<EngagementAction> {
        self.transition_timeline()
            .chain(self.transition_total, self.message_timeline())
    }

    pub fn total_duration(&self) -> Duration {
        self.timeline().duration()
    }
}

/// State machine `idle -> showing(step) -> complete`
#[derive(Debug, Clone)]
pub struct EngagementSequence {
    state: EngagementState,
    steps_shown: usize,
}

impl Default for EngagementSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagementSequence {
    pub fn new() -> Self {
        Self {
            state: EngagementState::Idle,
            steps_shown: 0,
        }
    }

    pub fn state(&self) -> EngagementState {
        self.state
    }

    pub fn can_continue(&self) -> bool {
        self.state == EngagementState::Complete
    }

    pub fn apply(&mut self, action: EngagementAction) -> EngagementState {
        if self.state == EngagementState::Complete {
            return self.state;
        }
        self.state = match action {
            EngagementAction::Transition(phase) => self.show(Screen::Transition(phase)),
            EngagementAction::RevealLine(visible) => self.show(Screen::Messages { visible }),
            EngagementAction::EnableContinue => EngagementState::Complete,
        };
        self.state
    }

    fn show(&mut self, screen: Screen) -> EngagementState {
        self.steps_shown += 1;
        EngagementState::Showing {
            step: self.steps_shown,
            screen,
        }
    }

    /// Back to idle, as when the modal is closed
    pub fn reset(&mut self) {
        self.state = EngagementState::Idle;
        self.steps_shown = 0;
    }
}

/// Plays an engagement sequence on the scheduler
pub struct EngagementPlayer {
    script: EngagementScript,
    sequence: EngagementSequence,
}

impl EngagementPlayer {
    pub fn new(script: EngagementScript) -> Self {
        Self {
            script,
            sequence: EngagementSequence::new(),
        }
    }

    pub fn state(&self) -> EngagementState {
        self.sequence.state()
    }

    /// Run while `open` stays true, until the continue action is available
    ///
    /// `on_change` sees every state the visitor would see. Clearing `open`
    /// (or dropping its sender) cancels every pending cue at once and the
    /// sequence returns to idle.
    pub async fn play<F>(&mut self, mut open: watch::Receiver<bool>, mut on_change: F) -> EngagementState
    where
        F: FnMut(&EngagementState),
    {
        self.sequence.reset();
        if !*open.borrow() {
            return self.sequence.state();
        }

        let mut run = Scheduler::start(self.script.timeline());
        loop {
            tokio::select! {
                biased;
                changed = open.changed() => {
                    if changed.is_err() || !*open.borrow() {
                        run.cancel();
                        break;
                    }
                }
                action = run.next() => {
                    let Some(action) = action else { break };
                    let state = self.sequence.apply(action);
                    on_change(&state);
                    if state == EngagementState::Complete {
                        break;
                    }
                }
            }
        }

        if run.is_cancelled() {
            self.sequence.reset();
            tracing::debug!("Engagement sequence cancelled");
        }
        self.sequence.state()
    }
}

/// Loading indicator steps shown while the submission is in flight
pub fn loading_timeline() -> Timeline<usize> {
    Timeline::new()
        .at(Duration::ZERO, 1)
        .at(Duration::from_millis(1500), 2)
        .at(Duration::from_millis(3000), 3)
}
