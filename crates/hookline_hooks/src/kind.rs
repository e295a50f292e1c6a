//! Classification vocabulary shared by the planner and the hook types.

use core::fmt;

use hookline_tap::tap::TapConvention;

/// How a hook combines the outcomes of its taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Every tap runs; results are ignored.
    Basic,
    /// The first tap producing a value ends the invocation with that value.
    Bail,
    /// Each value replaces the leading argument seen by the following taps.
    Waterfall,
    /// Any value restarts the pass from the first tap.
    Loop,
}

/// How a hook schedules its taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookMode {
    /// Only synchronous taps, run one after another.
    Sync,
    /// Each tap is awaited before the next one starts.
    Series,
    /// All taps start together and are joined.
    Parallel,
}

/// How an invocation wants its result delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConvention {
    /// Returned from `call`.
    Sync,
    /// Passed to the callback given to `call_async`.
    Callback,
    /// Resolved by the future returned from `promise`.
    Promise,
}

impl CallConvention {
    /// All conventions, in plan cache slot order.
    pub const ALL: [CallConvention; 3] = [Self::Sync, Self::Callback, Self::Promise];

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Sync => 0,
            Self::Callback => 1,
            Self::Promise => 2,
        }
    }

    /// Returns `true` if a tap of `convention` can hand its outcome straight
    /// to an invocation of this convention.
    #[must_use]
    pub fn matches(self, convention: TapConvention) -> bool {
        matches!(
            (self, convention),
            (Self::Sync, TapConvention::Sync)
                | (Self::Callback, TapConvention::Callback)
                | (Self::Promise, TapConvention::Promise)
        )
    }
}

impl fmt::Display for CallConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sync => "sync",
            Self::Callback => "async",
            Self::Promise => "promise",
        })
    }
}

/// The tap-shape signature a plan is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapShape {
    /// No taps and no interceptors.
    None,
    /// One tap, no interceptors.
    Single(TapConvention),
    /// Several taps sharing one convention, no interceptors.
    Homogeneous(TapConvention),
    /// Several taps with mixed conventions, no interceptors.
    Heterogeneous,
    /// At least one interceptor.
    Intercepted,
}

impl fmt::Display for TapShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Single(convention) => write!(f, "single:{convention}"),
            Self::Homogeneous(convention) => write!(f, "multiple-homogeneous:{convention}"),
            Self::Heterogeneous => f.write_str("multiple-heterogeneous"),
            Self::Intercepted => f.write_str("intercepted"),
        }
    }
}

/// The execution strategy selected for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Nothing to run; the kind's empty outcome is delivered.
    Empty,
    /// Taps run in a plain loop on the caller's stack.
    Inline,
    /// The single tap's outcome is wired straight to the caller.
    Forward,
    /// A per-invocation state machine runs on the inline task driver.
    Driven,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Inline => "inline",
            Self::Forward => "forward",
            Self::Driven => "driven",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_signatures() {
        assert_eq!(TapShape::None.to_string(), "none");
        assert_eq!(TapShape::Single(TapConvention::Sync).to_string(), "single:sync");
        assert_eq!(
            TapShape::Homogeneous(TapConvention::Promise).to_string(),
            "multiple-homogeneous:promise"
        );
        assert_eq!(TapShape::Heterogeneous.to_string(), "multiple-heterogeneous");
        assert_eq!(TapShape::Intercepted.to_string(), "intercepted");
    }

    #[test]
    fn slots_are_distinct() {
        let slots: Vec<usize> = CallConvention::ALL.iter().map(|c| c.slot()).collect();
        assert_eq!(slots, [0, 1, 2]);
    }

    #[test]
    fn convention_matching() {
        assert!(CallConvention::Callback.matches(TapConvention::Callback));
        assert!(!CallConvention::Promise.matches(TapConvention::Callback));
    }
}
