//! # Coroutine Engine
//!
//! Cooperative, resumable computations driven once per tick by the scheduler
//! of the component that started them. A coroutine is a state machine: every
//! [`Coroutine::resume`] runs from the stored state to the next suspension point
//! and reports how long to stay suspended.
//!
//! ```text
//!  resume() ──> Yield::NextPass     run again on the next pass
//!           ──> Yield::WaitFor(d)   run again once the scene clock passes now + d
//!           ──> Yield::WaitUntil(p) run again once p(scene) holds
//!           ──> Yield::WaitWhile(p) run again once p(scene) stops holding
//!           ──> Yield::Finished     removed, never resumed again
//! ```
//!
//! Nothing here blocks: a suspended coroutine costs one predicate or clock
//! check per pass.

mod fade;
mod master;

use std::fmt;
use std::time::Duration;

use crate::behaviour::ScriptContext;
use crate::scene::Scene;

pub use fade::FadeOpacity;
pub use master::CoroutineMaster;
pub(crate) use master::run_pass;

/// Predicate gating a suspended coroutine.
pub type ScenePredicate = Box<dyn FnMut(&Scene) -> bool>;

/// Suspension signal returned by [`Coroutine::resume`].
pub enum Yield {
    /// Resume on the next scheduling pass.
    NextPass,
    /// Resume once this much simulated time has elapsed.
    WaitFor(Duration),
    /// Resume once the predicate returns `true`.
    WaitUntil(ScenePredicate),
    /// Resume once the predicate returns `false`.
    WaitWhile(ScenePredicate),
    /// Done. The coroutine is dropped.
    Finished,
}

impl Yield {
    /// Timed wait in seconds. Negative or non-finite values wait zero.
    #[must_use]
    pub fn seconds(seconds: f32) -> Self {
        Self::WaitFor(Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO))
    }

    /// Predicate-gated wait.
    #[must_use]
    pub fn until(predicate: impl FnMut(&Scene) -> bool + 'static) -> Self {
        Self::WaitUntil(Box::new(predicate))
    }

    /// Inverse predicate-gated wait.
    #[must_use]
    pub fn while_(predicate: impl FnMut(&Scene) -> bool + 'static) -> Self {
        Self::WaitWhile(Box::new(predicate))
    }

    /// Checks for [`Yield::Finished`].
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Debug for Yield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextPass => f.write_str("NextPass"),
            Self::WaitFor(d) => f.debug_tuple("WaitFor").field(d).finish(),
            Self::WaitUntil(_) => f.write_str("WaitUntil(..)"),
            Self::WaitWhile(_) => f.write_str("WaitWhile(..)"),
            Self::Finished => f.write_str("Finished"),
        }
    }
}

/// Resumable computation.
///
/// Implementors keep their own resume point, typically an enum field matched
/// at the top of `resume`.
pub trait Coroutine {
    /// Runs until the next suspension point.
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> Yield;
}

/// Identity of a scheduled coroutine, unique within its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoroutineId(pub(crate) u64);

impl CoroutineId {
    /// Id that is never running.
    pub const NONE: Self = Self(0);

    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Coroutine backed by a closure. The closure owns whatever state it needs.
pub struct FnCoroutine<F>(F);

impl<F> Coroutine for FnCoroutine<F>
where
    F: FnMut(&mut ScriptContext<'_>) -> Yield,
{
    fn resume(&mut self, ctx: &mut ScriptContext<'_>) -> Yield {
        (self.0)(ctx)
    }
}

/// Wraps a closure as a coroutine.
///
/// ```rust,ignore
/// let mut shots = 0;
/// ctx.start_coroutine(coroutine::from_fn(move |ctx| {
///     shots += 1;
///     if shots == 3 { Yield::Finished } else { Yield::seconds(0.5) }
/// }));
/// ```
pub fn from_fn<F>(f: F) -> FnCoroutine<F>
where
    F: FnMut(&mut ScriptContext<'_>) -> Yield,
{
    FnCoroutine(f)
}
