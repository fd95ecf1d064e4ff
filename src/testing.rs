//! Test doubles for the perception and input collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::errors::{EfClawError, EfClawResult};
use crate::executor::input::{InputSubstrate, MouseButton, Press, WindowHandle};
use crate::perception::traits::Perception;
use crate::perception::types::{CaptureFrame, DetectedRegion, Point2D, ScreenRect};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text {
        region: Option<ScreenRect>,
        pattern: Option<String>,
    },
    Feature {
        region: Option<ScreenRect>,
        feature_id: String,
    },
}

impl Query {
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Query::Text { pattern, .. } => pattern.as_deref(),
            Query::Feature { .. } => None,
        }
    }

    pub fn region(&self) -> Option<ScreenRect> {
        match self {
            Query::Text { region, .. } | Query::Feature { region, .. } => *region,
        }
    }
}

type Responder = Box<dyn FnMut(&Query) -> Vec<DetectedRegion> + Send>;

pub struct ScriptedPerception {
    frame: CaptureFrame,
    responder: Mutex<Responder>,
    queries: Mutex<Vec<Query>>,
}

impl ScriptedPerception {
    pub fn new(
        frame: CaptureFrame,
        responder: impl FnMut(&Query) -> Vec<DetectedRegion> + Send + 'static,
    ) -> Self {
        Self {
            frame,
            responder: Mutex::new(Box::new(responder)),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answers queries in order; every query after the script runs out misses.
    pub fn sequence(frame: CaptureFrame, responses: Vec<Vec<DetectedRegion>>) -> Self {
        let mut queue: VecDeque<_> = responses.into();
        Self::new(frame, move |_| queue.pop_front().unwrap_or_default())
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn answer(&self, query: Query) -> Vec<DetectedRegion> {
        let hits = {
            let mut responder = self.responder.lock().unwrap();
            (responder.as_mut())(&query)
        };
        self.queries.lock().unwrap().push(query);
        hits
    }
}

#[async_trait]
impl Perception for ScriptedPerception {
    async fn capture(&self) -> EfClawResult<CaptureFrame> {
        Ok(self.frame)
    }

    async fn recognize_text(
        &self,
        region: Option<ScreenRect>,
        pattern: Option<&Regex>,
        _timeout: Duration,
    ) -> EfClawResult<Vec<DetectedRegion>> {
        let mut hits = self.answer(Query::Text {
            region,
            pattern: pattern.map(|p| p.as_str().to_string()),
        });
        // like a real recognizer, only fragments matching the pattern come back
        if let Some(pattern) = pattern {
            hits.retain(|hit| pattern.is_match(&hit.text));
        }
        Ok(hits)
    }

    async fn recognize_feature(
        &self,
        region: Option<ScreenRect>,
        feature_id: &str,
    ) -> EfClawResult<Vec<DetectedRegion>> {
        Ok(self.answer(Query::Feature {
            region,
            feature_id: feature_id.to_string(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Focus(WindowHandle),
    Motion(i32, i32),
    MoveTo(Point2D),
    Button(MouseButton, Press),
    Key(char, Press),
    Scroll(Point2D, i32),
}

#[derive(Debug, Default)]
pub struct RecordingInput {
    pub events: Vec<InputEvent>,
    pub foreground: bool,
    pub fail_focus: bool,
    pub pointer: Point2D,
}

impl RecordingInput {
    pub fn focused() -> Self {
        Self {
            foreground: true,
            ..Self::default()
        }
    }

    pub fn motions(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Motion(dx, dy) => Some((*dx, *dy)),
                _ => None,
            })
            .collect()
    }

    /// Button presses, with the absolute move that immediately preceded each
    /// one (`None` when the click landed wherever the pointer was).
    pub fn clicks(&self) -> Vec<(Option<Point2D>, MouseButton)> {
        self.events
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e {
                InputEvent::Button(button, Press::Down) => {
                    let at = match i.checked_sub(1).map(|prev| &self.events[prev]) {
                        Some(InputEvent::MoveTo(p)) => Some(*p),
                        _ => None,
                    };
                    Some((at, *button))
                }
                _ => None,
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<char> {
        self.events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Key(key, Press::Down) => Some(*key),
                _ => None,
            })
            .collect()
    }
}

impl InputSubstrate for RecordingInput {
    fn is_foreground(&mut self, _window: WindowHandle) -> EfClawResult<bool> {
        Ok(self.foreground)
    }

    fn move_window_to_foreground(&mut self, window: WindowHandle) -> EfClawResult<()> {
        if self.fail_focus {
            return Err(EfClawError::Executor("window vanished".into()));
        }
        self.foreground = true;
        self.events.push(InputEvent::Focus(window));
        Ok(())
    }

    fn emit_relative_motion(&mut self, dx: i32, dy: i32) -> EfClawResult<()> {
        self.pointer = Point2D::new(self.pointer.x + dx, self.pointer.y + dy);
        self.events.push(InputEvent::Motion(dx, dy));
        Ok(())
    }

    fn pointer_position(&mut self) -> EfClawResult<Point2D> {
        Ok(self.pointer)
    }

    fn move_pointer_to(&mut self, position: Point2D) -> EfClawResult<()> {
        self.pointer = position;
        self.events.push(InputEvent::MoveTo(position));
        Ok(())
    }

    fn mouse_button(&mut self, button: MouseButton, press: Press) -> EfClawResult<()> {
        self.events.push(InputEvent::Button(button, press));
        Ok(())
    }

    fn key(&mut self, key: char, press: Press) -> EfClawResult<()> {
        self.events.push(InputEvent::Key(key, press));
        Ok(())
    }

    fn scroll(&mut self, position: Point2D, amount: i32) -> EfClawResult<()> {
        self.events.push(InputEvent::Scroll(position, amount));
        Ok(())
    }
}

pub fn fragment(x: i32, y: i32, text: &str) -> DetectedRegion {
    DetectedRegion::new(x, y, 120, 20, text)
}
