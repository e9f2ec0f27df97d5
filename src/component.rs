//! Host lifecycle capability.
//!
//! The `Component` trait is what a host application loop drives: `setup()`
//! once at startup, then `tick()` once per scheduling tick.

/// Cooperative component driven by the host's main loop.
///
/// `tick()` must not block. Components do their work in short slices and
/// return; the host calls them again on the next iteration.
pub trait Component {
    /// Setup error type
    type Error;

    /// One-time initialisation, before the first `tick()`.
    fn setup(&mut self) -> Result<(), Self::Error>;

    /// One main-loop iteration.
    fn tick(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        ready: bool,
        ticks: u32,
    }

    impl Component for Counter {
        type Error = ();

        fn setup(&mut self) -> Result<(), Self::Error> {
            self.ready = true;
            Ok(())
        }

        fn tick(&mut self) {
            if self.ready {
                self.ticks += 1;
            }
        }
    }

    #[test]
    fn test_host_drives_components_polymorphically() {
        let mut a = Counter::default();
        let mut b = Counter::default();

        {
            let components: [&mut dyn Component<Error = ()>; 2] = [&mut a, &mut b];
            for component in components {
                component.setup().unwrap();
                component.tick();
                component.tick();
            }
        }

        assert_eq!(a.ticks, 2);
        assert_eq!(b.ticks, 2);
    }
}
