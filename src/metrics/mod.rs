pub mod registry;
pub mod endpoint;

pub use registry::{MetricsRegistry, MetricsSnapshot, RouteStats};

/// The fixed set of endpoints tracked by the metrics registry.
///
/// A closed enum: an observation for an unknown route cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Route {
    MonthlyProfile,
    BestMonth,
    CompareCities,
}

impl Route {
    pub const COUNT: usize = 3;
    pub const ALL: [Route; Route::COUNT] = [Route::MonthlyProfile, Route::BestMonth, Route::CompareCities];

    /// Key used in the `/metrics` payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::MonthlyProfile => "weather/monthly-profile",
            Route::BestMonth => "travel/best-month",
            Route::CompareCities => "travel/compare-cities",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
