//! Per-invocation state machines for each hook kind.
//!
//! The machines hold all mutable iteration state of one invocation. They
//! never run taps themselves; the runners in [`run`](crate::run) feed them tap
//! outcomes one at a time and act on what they answer.

use hookline_tap::args::WaterfallArgs;
use hookline_tap::error::HookError;
use hookline_tap::tap::TapOutput;

use crate::kind::HookKind;

/// Result of a finished invocation before it is shaped for the caller.
pub(crate) type Settled<R> = Result<Option<R>, HookError>;

/// Accessors for the leading argument of a waterfall hook.
pub(crate) struct WaterfallOps<A, R> {
    pub(crate) head: fn(&A) -> R,
    pub(crate) replace: fn(&mut A, R),
}

impl<A, R> Clone for WaterfallOps<A, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for WaterfallOps<A, R> {}

impl<A: WaterfallArgs> WaterfallOps<A, A::Head> {
    pub(crate) fn for_args() -> Self {
        Self {
            head: |args: &A| args.head().clone(),
            replace: |args: &mut A, head| args.replace_head(head),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Series
// ─────────────────────────────────────────────────────────────────────────────

/// What a series runner does after recording an outcome.
pub(crate) enum Step<R> {
    /// Run the tap at [`SeriesMachine::position`].
    Continue,
    /// A loop pass restarted; notify loop interceptors, then continue.
    Restart,
    /// The invocation is over.
    Finish(Settled<R>),
}

/// Iteration state for sync and series hooks of every kind.
pub(crate) struct SeriesMachine<A, R> {
    kind: HookKind,
    waterfall: Option<WaterfallOps<A, R>>,
    args: A,
    position: usize,
    len: usize,
}

impl<A, R> SeriesMachine<A, R> {
    pub(crate) fn new(
        kind: HookKind,
        waterfall: Option<WaterfallOps<A, R>>,
        args: A,
        len: usize,
    ) -> Self {
        Self {
            kind,
            waterfall,
            args,
            position: 0,
            len,
        }
    }

    /// Arguments the next tap receives.
    pub(crate) fn args(&self) -> &A {
        &self.args
    }

    /// Index of the next tap to run, or `None` once the pass is complete.
    pub(crate) fn position(&self) -> Option<usize> {
        (self.position < self.len).then_some(self.position)
    }

    /// Records the outcome of the tap at the current position.
    pub(crate) fn record(&mut self, tap: &str, output: TapOutput<R>) -> Step<R> {
        let value = match output {
            Ok(value) => value,
            Err(source) => return Step::Finish(Err(HookError::tap_execution(tap, source))),
        };

        match (self.kind, value) {
            (HookKind::Bail, Some(value)) => return Step::Finish(Ok(Some(value))),
            (HookKind::Loop, Some(_)) => {
                tracing::trace!(tap, "loop restarted");
                self.position = 0;
                return Step::Restart;
            }
            (HookKind::Waterfall, Some(value)) => {
                if let Some(ops) = self.waterfall {
                    (ops.replace)(&mut self.args, value);
                }
            }
            _ => {}
        }

        self.position += 1;
        Step::Continue
    }

    /// Delivers the outcome of a completed pass.
    pub(crate) fn finish(self) -> Settled<R> {
        Ok(self.waterfall.map(|ops| (ops.head)(&self.args)))
    }
}

/// The outcome of an invocation with no taps to run.
pub(crate) fn empty_outcome<A, R>(waterfall: Option<WaterfallOps<A, R>>, args: &A) -> Settled<R> {
    Ok(waterfall.map(|ops| (ops.head)(args)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Parallel
// ─────────────────────────────────────────────────────────────────────────────

/// Progress of a parallel invocation.
pub(crate) enum Outcome<R> {
    /// Not decided yet.
    Pending,
    /// Decided with a value, or with "no value".
    Value(Option<R>),
    /// Decided with an error.
    Error(HookError),
}

impl<R> Outcome<R> {
    pub(crate) fn into_settled(self) -> Option<Settled<R>> {
        match self {
            Self::Pending => None,
            Self::Value(value) => Some(Ok(value)),
            Self::Error(err) => Some(Err(err)),
        }
    }
}

/// Joins the outcomes of concurrently started taps.
pub(crate) trait Join<R>: Send {
    /// Returns `false` once taps at `index` and beyond must not be started.
    fn accepts(&self, index: usize) -> bool;

    /// Records the outcome of the tap at `index`.
    fn record(&mut self, index: usize, tap: &str, output: TapOutput<R>) -> Outcome<R>;

    /// Outcome once every started tap has settled without a decision.
    fn finish(&mut self) -> Outcome<R>;
}

/// Basic parallel semantics: wait for all, the first error wins.
#[derive(Debug, Default)]
pub(crate) struct ParallelJoin {
    failed: bool,
}

impl<R: Send> Join<R> for ParallelJoin {
    fn accepts(&self, _index: usize) -> bool {
        !self.failed
    }

    fn record(&mut self, _index: usize, tap: &str, output: TapOutput<R>) -> Outcome<R> {
        match output {
            Ok(_) => Outcome::Pending,
            Err(source) if self.failed => {
                tracing::debug!(tap, error = %source, "discarding error from settled invocation");
                Outcome::Pending
            }
            Err(source) => {
                self.failed = true;
                Outcome::Error(HookError::tap_execution(tap, source))
            }
        }
    }

    fn finish(&mut self) -> Outcome<R> {
        if self.failed {
            Outcome::Pending
        } else {
            Outcome::Value(None)
        }
    }
}

/// A tap outcome buffered by [`BailConvergence`].
enum Slot<R> {
    Empty,
    Value(R),
    Failed(HookError),
}

/// Parallel bail semantics: the lowest index with a value or error wins.
///
/// Outcomes are buffered by index. `boundary` is the lowest index known to
/// hold a value or error; once every index below it has settled the
/// decision is final. Taps at or past the boundary are never started, and
/// their outcomes are discarded if they were.
pub(crate) struct BailConvergence<R> {
    slots: Vec<Option<Slot<R>>>,
    boundary: usize,
    frontier: usize,
    decided: bool,
}

impl<R> BailConvergence<R> {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
            boundary: len,
            frontier: 0,
            decided: false,
        }
    }

    fn converge(&mut self) -> Outcome<R> {
        while self.frontier < self.boundary && self.slots[self.frontier].is_some() {
            self.frontier += 1;
        }
        if self.decided || self.frontier < self.boundary {
            return Outcome::Pending;
        }

        self.decided = true;
        match self.slots.get_mut(self.boundary).and_then(Option::take) {
            Some(Slot::Value(value)) => Outcome::Value(Some(value)),
            Some(Slot::Failed(err)) => Outcome::Error(err),
            Some(Slot::Empty) | None => Outcome::Value(None),
        }
    }
}

impl<R: Send> Join<R> for BailConvergence<R> {
    fn accepts(&self, index: usize) -> bool {
        !self.decided && index < self.boundary
    }

    fn record(&mut self, index: usize, tap: &str, output: TapOutput<R>) -> Outcome<R> {
        if self.decided || index >= self.boundary {
            if let Err(source) = &output {
                tracing::debug!(tap, index, error = %source, "discarding error past bail boundary");
            }
            return Outcome::Pending;
        }

        let slot = match output {
            Ok(None) => Slot::Empty,
            Ok(Some(value)) => Slot::Value(value),
            Err(source) => Slot::Failed(HookError::tap_execution(tap, source)),
        };
        if !matches!(slot, Slot::Empty) {
            self.boundary = index;
        }
        self.slots[index] = Some(slot);
        self.converge()
    }

    fn finish(&mut self) -> Outcome<R> {
        self.converge()
    }
}
