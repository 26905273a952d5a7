use trip_types::LatLng;

/// Frames used to move the cab marker between two reported positions.
pub const GLIDE_STEPS: u32 = 15;

/// Fixed-step linear interpolation from one position to the next. Yields one
/// position per frame; the last frame lands exactly on the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGlide {
    from: LatLng,
    to: LatLng,
    steps: u32,
    step: u32,
}

impl MarkerGlide {
    pub fn new(from: LatLng, to: LatLng) -> Self {
        Self::with_steps(from, to, GLIDE_STEPS)
    }

    pub fn with_steps(from: LatLng, to: LatLng, steps: u32) -> Self {
        Self {
            from,
            to,
            steps: steps.max(1),
            step: 0,
        }
    }

    pub fn target(&self) -> LatLng {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }
}

impl Iterator for MarkerGlide {
    type Item = LatLng;

    fn next(&mut self) -> Option<LatLng> {
        if self.is_finished() {
            return None;
        }
        self.step += 1;
        if self.step == self.steps {
            return Some(self.to);
        }
        Some(
            self.from
                .lerp(self.to, f64::from(self.step) / f64::from(self.steps)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps - self.step) as usize;
        (left, Some(left))
    }
}

#[cfg(feature = "hydrate")]
pub use browser::GlideAnimator;

#[cfg(feature = "hydrate")]
mod browser {
    use std::cell::Cell;
    use std::rc::Rc;

    use leptos::logging::warn;
    use trip_types::LatLng;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use super::MarkerGlide;

    /// Drives a `MarkerGlide` with `requestAnimationFrame`. Starting a new
    /// glide cancels the one in flight.
    #[derive(Clone, Default)]
    pub struct GlideAnimator {
        frame: Rc<Cell<Option<i32>>>,
    }

    impl GlideAnimator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn cancel(&self) {
            if let Some(id) = self.frame.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }

        pub fn start(&self, glide: MarkerGlide, apply: impl Fn(LatLng) + 'static) {
            self.cancel();
            run_frame(glide, Rc::new(apply), self.frame.clone());
        }
    }

    fn run_frame(mut glide: MarkerGlide, apply: Rc<dyn Fn(LatLng)>, frame: Rc<Cell<Option<i32>>>) {
        frame.set(None);
        let Some(position) = glide.next() else {
            return;
        };
        apply(position);
        if glide.is_finished() {
            return;
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let next = frame.clone();
        let callback = Closure::once_into_js(move || run_frame(glide, apply, next));
        match window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => frame.set(Some(id)),
            Err(err) => warn!("could not schedule marker frame: {err:?}"),
        }
    }
}
