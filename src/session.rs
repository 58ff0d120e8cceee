//! Session controller
//!
//! Owns every piece of mutable state: the mode machine, both marker
//! stores, per-hand click memory, the sliding oscillators and the latest
//! pose. All of it is touched from one task only. Other tasks read a
//! published [`SessionView`] instead.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::audio::{OscillatorBank, OscillatorId};
use crate::events::SessionEvent;
use crate::input::InputEvent;
use crate::layout::Canvas;
use crate::mapping::{self, LEFT, RIGHT_LIVE, RIGHT_TUNED};
use crate::markers::{Hand, Marker, MarkerStore};
use crate::pose::{Point, PoseSnapshot};
use crate::render::{RenderSurface, Scene};
use crate::slide::SlideHandler;
use crate::state::{ClickRoute, Mode, ModeMachine};
use crate::toggle::{HandState, ToggleAction};

/// Wrist oscillators fade in over this long when capture begins
const CAPTURE_RAMP_SECS: f64 = 0.5;

/// What collaborators may see of the session: the mode, both marker
/// stores in full and whether each wrist oscillator is playing a marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionView {
    pub mode: Mode,
    pub right: Vec<Marker>,
    pub left: Vec<Marker>,
    pub right_playing: bool,
    pub left_playing: bool,
}

/// Drives the installation from pointer and pose input, issuing
/// oscillator commands to `A`
pub struct Session<A> {
    machine: ModeMachine,
    canvas: Canvas,
    pose: Option<PoseSnapshot>,
    right_markers: MarkerStore,
    left_markers: MarkerStore,
    right_hand: HandState,
    left_hand: HandState,
    slides: SlideHandler,
    pointer_held: bool,
    bank: A,
    event_tx: broadcast::Sender<SessionEvent>,
    view_tx: watch::Sender<SessionView>,
}

impl<A: OscillatorBank> Session<A> {
    /// Create an idle session with empty marker stores
    pub fn new(canvas: Canvas, bank: A, event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            machine: ModeMachine::new(event_tx.clone()),
            canvas,
            pose: None,
            right_markers: MarkerStore::new(),
            left_markers: MarkerStore::new(),
            right_hand: HandState::new(Hand::Right),
            left_hand: HandState::new(Hand::Left),
            slides: SlideHandler::new(),
            pointer_held: false,
            bank,
            event_tx,
            view_tx: watch::channel(SessionView::default()).0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    /// Follow the session's published view. It is updated after every
    /// click and frame, so readers always see the full marker stores.
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    #[cfg(test)]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn markers(&self, hand: Hand) -> &MarkerStore {
        match hand {
            Hand::Left => &self.left_markers,
            Hand::Right => &self.right_markers,
        }
    }

    #[cfg(test)]
    pub fn hand_state(&self, hand: Hand) -> &HandState {
        match hand {
            Hand::Left => &self.left_hand,
            Hand::Right => &self.right_hand,
        }
    }

    #[cfg(test)]
    pub fn slides(&self) -> &SlideHandler {
        &self.slides
    }

    #[cfg(test)]
    pub fn bank(&self) -> &A {
        &self.bank
    }

    #[cfg(test)]
    pub fn bank_mut(&mut self) -> &mut A {
        &mut self.bank
    }

    /// Run the session until the input channel closes, rendering a frame
    /// every `frame_interval`
    pub async fn run(
        &mut self,
        mut input_rx: mpsc::Receiver<InputEvent>,
        surface: &mut impl RenderSurface,
        frame_interval: Duration,
    ) {
        info!(mode = %self.mode(), "session started");
        let mut ticker = tokio::time::interval(frame_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = input_rx.recv() => match event {
                    Some(event) => self.handle(event, surface),
                    None => break,
                },
                _ = ticker.tick() => {
                    let scene = self.update();
                    surface.present(&scene);
                }
            }
        }

        info!(mode = %self.mode(), "session stopped");
    }

    /// Dispatch one input event
    pub fn handle(&mut self, event: InputEvent, surface: &mut impl RenderSurface) {
        match event {
            InputEvent::Click(p) => self.on_click(p),
            InputEvent::Press(p) => self.on_press(p),
            InputEvent::Move(p) => self.on_pointer_move(p),
            InputEvent::Release(p) => self.on_release(p),
            InputEvent::Pose(pose) => self.on_pose_update(pose),
            InputEvent::Resize { width, height } => self.on_resize(width, height),
            InputEvent::Frame => {
                let scene = self.update();
                surface.present(&scene);
            }
        }
    }

    pub fn on_click(&mut self, point: Point) {
        match self.machine.on_click(point, &self.canvas) {
            ClickRoute::EnteredCapture => self.enter_capture(),
            ClickRoute::EnteredReview => self.enter_review(),
            ClickRoute::Record(hand) => {
                self.record_marker(hand);
            }
            ClickRoute::Perform => self.perform_click(point),
            ClickRoute::Ignored => {}
        }
        self.publish();
    }

    pub fn on_press(&mut self, point: Point) {
        self.pointer_held = true;
        self.drag(point);
    }

    pub fn on_pointer_move(&mut self, point: Point) {
        if self.pointer_held {
            self.drag(point);
        }
    }

    /// Stops both sliding oscillators, whatever the mode
    pub fn on_release(&mut self, _point: Point) {
        self.pointer_held = false;
        self.slides.on_release(&mut self.bank);
        self.emit(SessionEvent::SlidesStopped);
    }

    pub fn on_pose_update(&mut self, pose: PoseSnapshot) {
        trace!(left = ?pose.left_wrist, right = ?pose.right_wrist, "pose update");
        self.pose = Some(pose);
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            warn!(width, height, "ignoring degenerate canvas size");
            return;
        }
        info!(width, height, "canvas resized");
        self.canvas = Canvas::new(width, height);
    }

    /// Advance one frame and describe what should be on screen.
    ///
    /// In Review this is the single pass that draws the markers before
    /// the session moves on to Perform.
    pub fn update(&mut self) -> Scene {
        let scene = self.render();
        self.publish();
        scene
    }

    fn render(&mut self) -> Scene {
        match self.mode() {
            Mode::Idle => Scene::idle(&self.canvas),
            Mode::Capture => {
                self.track_wrists();
                Scene::capture(&self.canvas, self.pose.as_ref())
            }
            Mode::Review => {
                let scene = Scene::markers(
                    Mode::Review,
                    &self.canvas,
                    &self.right_markers,
                    &self.left_markers,
                );
                self.machine.after_render();
                scene
            }
            Mode::Perform => Scene::markers(
                Mode::Perform,
                &self.canvas,
                &self.right_markers,
                &self.left_markers,
            ),
        }
    }

    fn enter_capture(&mut self) {
        for osc in [OscillatorId::LeftWrist, OscillatorId::RightWrist] {
            self.bank.start(osc);
            self.bank.set_amplitude(osc, 1.0, CAPTURE_RAMP_SECS);
        }
    }

    fn enter_review(&mut self) {
        self.bank.stop(OscillatorId::LeftWrist);
        self.bank.stop(OscillatorId::RightWrist);
    }

    /// Let the wrist oscillators follow the live pose
    fn track_wrists(&mut self) {
        let Some(pose) = &self.pose else {
            trace!("no pose yet, skipping wrist tracking");
            return;
        };

        let left = mapping::to_frequency(pose.left_wrist.y, self.canvas.height, LEFT);
        let right = mapping::to_frequency(pose.right_wrist.x, self.canvas.width, RIGHT_LIVE);
        self.bank.set_frequency(OscillatorId::LeftWrist, left);
        self.bank.set_frequency(OscillatorId::RightWrist, right);
    }

    /// Store the current wrist position for `hand`. Returns the new index.
    fn record_marker(&mut self, hand: Hand) -> Option<usize> {
        let Some(pose) = &self.pose else {
            warn!(%hand, "no pose detected, marker not recorded");
            return None;
        };

        let (position, frequency) = match hand {
            Hand::Right => {
                let p = pose.right_wrist;
                (p, mapping::to_frequency(p.x, self.canvas.width, RIGHT_TUNED))
            }
            Hand::Left => {
                let p = pose.left_wrist;
                (p, mapping::to_frequency(p.y, self.canvas.height, LEFT))
            }
        };

        let store = match hand {
            Hand::Right => &mut self.right_markers,
            Hand::Left => &mut self.left_markers,
        };
        let index = store.push(Marker::new(position, frequency));

        info!(%hand, index, x = position.x, y = position.y, frequency, "marker recorded");
        self.emit(SessionEvent::MarkerRecorded {
            hand,
            index,
            x: position.x,
            y: position.y,
            frequency,
        });
        Some(index)
    }

    fn perform_click(&mut self, point: Point) {
        let right = self
            .right_hand
            .on_click(point, &self.right_markers, &mut self.bank);
        self.announce(Hand::Right, right);

        let left = self
            .left_hand
            .on_click(point, &self.left_markers, &mut self.bank);
        self.announce(Hand::Left, left);
    }

    fn announce(&self, hand: Hand, action: ToggleAction) {
        match action {
            ToggleAction::Start { frequency, .. } => {
                self.emit(SessionEvent::WristStarted { hand, frequency })
            }
            ToggleAction::Stop { .. } => self.emit(SessionEvent::WristStopped { hand }),
            ToggleAction::Miss => {}
        }
    }

    fn drag(&mut self, point: Point) {
        if self.mode() != Mode::Perform {
            return;
        }

        let started = self.slides.on_drag(
            point,
            &self.canvas,
            &self.right_markers,
            &self.left_markers,
            &mut self.bank,
        );
        for hand in started {
            self.emit(SessionEvent::SlideStarted { hand });
        }
    }

    /// Bring the published view up to date. Markers are append-only, so
    /// a store whose length is unchanged is unchanged.
    fn publish(&self) {
        let mode = self.mode();
        let right = self.markers(Hand::Right);
        let left = self.markers(Hand::Left);
        let right_playing = self.right_hand.is_running();
        let left_playing = self.left_hand.is_running();

        self.view_tx.send_if_modified(|view| {
            let mut changed = sync_markers(&mut view.right, right);
            changed |= sync_markers(&mut view.left, left);
            if view.mode != mode
                || view.right_playing != right_playing
                || view.left_playing != left_playing
            {
                view.mode = mode;
                view.right_playing = right_playing;
                view.left_playing = left_playing;
                changed = true;
            }
            changed
        });
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "session event");
        let _ = self.event_tx.send(event);
    }
}

fn sync_markers(copy: &mut Vec<Marker>, store: &MarkerStore) -> bool {
    if copy.len() == store.len() {
        return false;
    }
    copy.clear();
    copy.extend(store.iter().cloned());
    true
}
