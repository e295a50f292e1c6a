//! Tap identity and ordering constraints.

/// Options supplied when registering a tap.
///
/// A bare name converts into options through [`From`], so every registration
/// method accepts either `"name"` or a fully built `TapOptions`.
///
/// # Ordering
///
/// - `stage` partitions taps into bands; lower stages run earlier. Defaults to `0`.
/// - `before` names taps, registered earlier, that must run after this one.
///   Names of taps that do not exist yet are ignored.
///
/// # Example
///
/// ```
/// use hookline_tap::options::TapOptions;
///
/// let options = TapOptions::new("minify")
///     .with_stage(10)
///     .with_before("emit");
///
/// assert_eq!(options.name(), "minify");
/// assert_eq!(options.stage(), 10);
/// assert_eq!(options.before(), ["emit"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapOptions {
    name: String,
    stage: Option<i32>,
    before: Option<Vec<String>>,
}

impl TapOptions {
    /// Creates options with the given tap name and no ordering constraints.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the stage the tap runs in.
    #[must_use]
    pub fn with_stage(mut self, stage: i32) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Adds a tap that must run after this one.
    #[must_use]
    pub fn with_before(mut self, name: impl Into<String>) -> Self {
        self.before.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    /// Adds several taps that must run after this one.
    #[must_use]
    pub fn with_before_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns the tap name as supplied.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage, defaulting to `0`.
    #[must_use]
    pub fn stage(&self) -> i32 {
        self.stage.unwrap_or(0)
    }

    /// Returns the names this tap must precede.
    #[must_use]
    pub fn before(&self) -> &[String] {
        self.before.as_deref().unwrap_or_default()
    }

    /// Returns `true` if the name is empty or whitespace only.
    #[must_use]
    pub fn has_blank_name(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Fills every option left unset here from `defaults`.
    ///
    /// Values set explicitly on `self` always win.
    #[must_use]
    pub fn merged_over(self, defaults: &TapOptions) -> Self {
        Self {
            name: if self.name.is_empty() {
                defaults.name.clone()
            } else {
                self.name
            },
            stage: self.stage.or(defaults.stage),
            before: self.before.or_else(|| defaults.before.clone()),
        }
    }

    pub(crate) fn into_parts(self) -> (String, i32, Vec<String>) {
        let stage = self.stage();
        (self.name, stage, self.before.unwrap_or_default())
    }
}

impl From<&str> for TapOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TapOptions {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for TapOptions {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}
