/// Hooks the render loop drives. `App` implements these over its window, renderer and scene.
pub(crate) trait GalleryHost {
    fn update_controls(&mut self);
    fn render_frame(&mut self);
    fn dispose_controls(&mut self);
    fn dispose_renderer(&mut self);
    fn remove_click_listener(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LoopState {
    #[default]
    Running,
    TornDown,
}

/// Per-frame driver: controls update then render while running, with a one-shot teardown.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns false once torn down; no hook runs in that case.
    pub(crate) fn frame(&mut self, host: &mut impl GalleryHost) -> bool {
        if !self.is_running() {
            return false;
        }
        host.update_controls();
        host.render_frame();
        self.frames += 1;
        true
    }

    /// Disposes controls and renderer and removes the click listener, exactly once.
    pub(crate) fn teardown(&mut self, host: &mut impl GalleryHost) {
        if !self.is_running() {
            return;
        }
        self.state = LoopState::TornDown;
        host.dispose_controls();
        host.dispose_renderer();
        host.remove_click_listener();
        log::info!("[gallery] torn down after {} frames", self.frames());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<&'static str>,
    }

    impl GalleryHost for RecordingHost {
        fn update_controls(&mut self) {
            self.calls.push("update_controls");
        }
        fn render_frame(&mut self) {
            self.calls.push("render_frame");
        }
        fn dispose_controls(&mut self) {
            self.calls.push("dispose_controls");
        }
        fn dispose_renderer(&mut self) {
            self.calls.push("dispose_renderer");
        }
        fn remove_click_listener(&mut self) {
            self.calls.push("remove_click_listener");
        }
    }

    impl RecordingHost {
        fn count(&self, name: &str) -> usize {
            self.calls.iter().filter(|call| **call == name).count()
        }
    }

    #[test]
    fn controls_update_before_each_render() {
        let mut host = RecordingHost::default();
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.frame(&mut host));
        assert!(render_loop.frame(&mut host));
        assert_eq!(host.calls, ["update_controls", "render_frame", "update_controls", "render_frame"]);
        assert_eq!(render_loop.frames(), 2);
    }

    #[test]
    fn teardown_runs_once_and_stops_frames() {
        let mut host = RecordingHost::default();
        let mut render_loop = RenderLoop::new();
        render_loop.frame(&mut host);
        render_loop.teardown(&mut host);
        render_loop.teardown(&mut host);
        assert!(!render_loop.frame(&mut host));
        assert_eq!(host.count("remove_click_listener"), 1);
        assert_eq!(host.count("dispose_controls") + host.count("dispose_renderer"), 2);
        assert_eq!(host.count("render_frame"), 1);
        assert_eq!(host.calls.last(), Some(&"remove_click_listener"));
    }
}
