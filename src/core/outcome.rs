use serde::Serialize;

/// Result of a service-client call. Always carries renderable data.
///
/// `Live` came from the provider just now, `Cached` from a fresh cache entry,
/// and `Degraded` is cached or synthetic data handed out because the live
/// call failed or was refused; `reason` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "payload", rename_all = "snake_case")]
pub enum Outcome<T> {
    Live(T),
    Cached(T),
    Degraded { data: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(data: T, reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            data,
            reason: reason.into(),
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Outcome::Live(d) | Outcome::Cached(d) | Outcome::Degraded { data: d, .. } => d,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Outcome::Live(d) | Outcome::Cached(d) | Outcome::Degraded { data: d, .. } => d,
        }
    }

    /// The advisory error, if the data is not live.
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Outcome::Live(_))
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Outcome::Cached(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Split into `(data, error)`, the shape UI hooks consume.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Outcome::Live(d) | Outcome::Cached(d) => (d, None),
            Outcome::Degraded { data, reason } => (data, Some(reason)),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Live(d) => Outcome::Live(f(d)),
            Outcome::Cached(d) => Outcome::Cached(f(d)),
            Outcome::Degraded { data, reason } => Outcome::Degraded {
                data: f(data),
                reason,
            },
        }
    }

    /// Merge per-item outcomes. The result is degraded if any item is, using
    /// the first reason; cached if any item is cached; otherwise live.
    pub fn collect<I>(items: I) -> Outcome<Vec<T>>
    where
        I: IntoIterator<Item = Outcome<T>>,
    {
        let mut data = Vec::new();
        let mut reason: Option<String> = None;
        let mut any_cached = false;
        for item in items {
            match item {
                Outcome::Live(d) => data.push(d),
                Outcome::Cached(d) => {
                    any_cached = true;
                    data.push(d);
                }
                Outcome::Degraded { data: d, reason: r } => {
                    reason.get_or_insert(r);
                    data.push(d);
                }
            }
        }
        match reason {
            Some(reason) => Outcome::Degraded { data, reason },
            None if any_cached => Outcome::Cached(data),
            None => Outcome::Live(data),
        }
    }
}

/// `{data, loading, error}` as kept by a data-fetching hook.
///
/// A refetch keeps the previous data visible until the new outcome lands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> FeedState<T> {
    /// Mark a (re)fetch as in flight.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply a finished call.
    pub fn finish(&mut self, outcome: Outcome<T>) {
        let (data, error) = outcome.into_parts();
        self.data = Some(data);
        self.error = error;
        self.loading = false;
    }
}

impl<T> From<Outcome<T>> for FeedState<T> {
    fn from(outcome: Outcome<T>) -> Self {
        let mut state = Self::default();
        state.finish(outcome);
        state
    }
}
