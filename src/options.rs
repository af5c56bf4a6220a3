/// Knobs controlling the numeric tolerances and limits used while solving.
///
/// The defaults are what you want for interactive use.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SolverOptions {
    /// The largest second difference still considered "linear".
    pub linearity_tolerance: f64,
    /// Coefficients smaller than this are treated as zero.
    pub coefficient_epsilon: f64,
    /// Upper bound on the number of rewrites the mini evaluation stepper
    /// will attempt before giving up.
    pub max_mini_steps: usize,
    /// How many decimal places to keep when reporting a system's solution.
    pub system_decimals: i32,
}

impl SolverOptions {
    pub fn new() -> Self { SolverOptions::default() }

    pub fn with_linearity_tolerance(mut self, tolerance: f64) -> Self {
        self.linearity_tolerance = tolerance;
        self
    }

    pub fn with_coefficient_epsilon(mut self, epsilon: f64) -> Self {
        self.coefficient_epsilon = epsilon;
        self
    }

    pub fn with_max_mini_steps(mut self, max_mini_steps: usize) -> Self {
        self.max_mini_steps = max_mini_steps;
        self
    }

    pub fn with_system_decimals(mut self, decimals: i32) -> Self {
        self.system_decimals = decimals;
        self
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            linearity_tolerance: 1e-9,
            coefficient_epsilon: 1e-12,
            max_mini_steps: 10,
            system_decimals: 6,
        }
    }
}
