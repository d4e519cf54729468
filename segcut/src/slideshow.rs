use std::collections::VecDeque;
use std::time::Duration;

/// Outcome of advancing a [`Cursor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Show the image at this position
    Render(usize),
    /// Every image has been shown; the stage stops
    Finished,
}

/// Position within an image list of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    total: usize,
}

impl Cursor {
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    /// Render the current position and advance, or report that we are done
    pub fn tick(&mut self) -> Tick {
        if self.index < self.total {
            let index = self.index;
            self.index += 1;
            Tick::Render(index)
        } else {
            Tick::Finished
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.index >= self.total
    }
}

/// Which of the two paced stages an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Segmentation cutout, once per period
    Preview,
    /// Original image, a fixed offset after each preview tick
    Reveal,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub period: Duration,
    pub reveal_offset: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1200),
            reveal_offset: Duration::from_millis(400),
        }
    }
}

/// A stage tick due `at` after the slideshow starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub at: Duration,
    pub stage: Stage,
    pub tick: Tick,
}

/// Time-ordered events of the two-stage slideshow
///
/// Preview tick `k` fires at `(k + 1) * period` and queues reveal tick `k`
/// at `reveal_offset` later. Both stages tick once more after the last
/// image to report [`Tick::Finished`], then the iterator ends.
#[derive(Debug, Clone)]
pub struct Schedule {
    config: ScheduleConfig,
    preview: Cursor,
    reveal: Cursor,
    next_preview: Option<Duration>,
    pending_reveals: VecDeque<Duration>,
}

impl Schedule {
    pub fn new(total: usize, config: ScheduleConfig) -> Self {
        let first = config.period;
        Self {
            config,
            preview: Cursor::new(total),
            reveal: Cursor::new(total),
            next_preview: Some(first),
            pending_reveals: VecDeque::new(),
        }
    }

    fn fire_preview(&mut self, at: Duration) -> Event {
        let tick = self.preview.tick();
        self.next_preview = match tick {
            Tick::Render(_) => Some(at + self.config.period),
            Tick::Finished => None,
        };
        self.pending_reveals.push_back(at + self.config.reveal_offset);

        Event {
            at,
            stage: Stage::Preview,
            tick,
        }
    }

    fn fire_reveal(&mut self) -> Option<Event> {
        let at = self.pending_reveals.pop_front()?;
        Some(Event {
            at,
            stage: Stage::Reveal,
            tick: self.reveal.tick(),
        })
    }
}

impl Iterator for Schedule {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        match (self.next_preview, self.pending_reveals.front().copied()) {
            (None, None) => None,
            (Some(preview), Some(reveal)) if reveal <= preview => self.fire_reveal(),
            (Some(preview), _) => Some(self.fire_preview(preview)),
            (None, Some(_)) => self.fire_reveal(),
        }
    }
}
