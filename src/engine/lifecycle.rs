// Shared lifecycle for anything the game loop drives

/// Hooks called by the [`GameLoop`](super::game_loop::GameLoop)
///
/// Every hook defaults to a no-op so implementors only override what they use.
pub trait Lifecycle {
    /// Called once before the first update
    fn init(&mut self) {}

    /// Called once per fixed timestep with the step length in seconds
    fn update(&mut self, _dt: f64) {}

    /// Called once per frame after all updates for that frame
    fn render(&mut self) {}

    /// Called once when the object is torn down
    fn destroy(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        updates: u32,
    }

    impl Lifecycle for Counter {
        fn update(&mut self, _dt: f64) {
            self.updates += 1;
        }
    }

    #[test]
    fn test_default_hooks_are_no_ops() {
        let mut counter = Counter::default();
        counter.init();
        counter.render();
        counter.destroy();
        assert_eq!(counter.updates, 0);

        counter.update(0.1);
        assert_eq!(counter.updates, 1);
    }
}
