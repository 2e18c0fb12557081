use std::time::Instant;

/// Handle returned by [`Clock::on_tick`], used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(f32)>;

/// Drives per-frame updates.
///
/// The runner calls [`tick`](Self::tick) once per redraw. While the clock is running
/// every listener receives the seconds elapsed since the previous tick; a stopped
/// clock swallows ticks, and the first tick after [`start`](Self::start) reports no
/// time for the pause.
pub struct Clock {
    running: bool,
    last_tick: Option<Instant>,
    elapsed: f32,
    frames: u64,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("running", &self.running)
            .field("elapsed", &self.elapsed)
            .field("frames", &self.frames)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Clock {
    /// A running clock with no listeners.
    pub fn new() -> Self {
        Self {
            running: true,
            last_tick: None,
            elapsed: 0.0,
            frames: 0,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_tick = None;
            log::info!("Clock resumed");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::info!("Clock stopped");
        }
    }

    /// Total running time in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of ticks delivered while running.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn on_tick(&mut self, listener: impl FnMut(f32) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Measures the time since the last tick and notifies listeners.
    ///
    /// Returns the delta in seconds, or `None` while stopped.
    pub fn tick(&mut self) -> Option<f32> {
        if !self.running {
            return None;
        }

        let now = Instant::now();
        let dt = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        self.advance(dt)
    }

    /// Delivers a tick of exactly `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.running {
            return None;
        }

        self.elapsed += dt;
        self.frames += 1;
        for (_, listener) in &mut self.listeners {
            listener(dt);
        }
        Some(dt)
    }
}
