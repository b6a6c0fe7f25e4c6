//! Constrained numerical minimization for the solver driver.
//!
//! The feasible region is a product of scaled simplices: each constraint
//! pins the sum over a disjoint index group to a fixed total, with every
//! variable nonnegative. The driver's objective is piecewise linear in
//! the variables (a best response is a max over plans of linear terms),
//! so the minimizer runs projected subgradient descent: forward
//! differences estimate the active piece's gradient, steps use an
//! adaptive Polyak-style target that tightens whenever progress stalls,
//! and the best iterate seen is returned.

/// Sum-to-total constraint over a group of variable indices. Groups must
/// not overlap; indices outside every group are only clamped at zero.
#[derive(Debug, Clone)]
pub struct SimplexConstraint {
    pub indices: Vec<usize>,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    pub max_iterations: usize,
    /// Initial guess for the distance to the optimum; the Polyak step
    /// targets `best - gap`.
    pub initial_gap: f64,
    /// Multiplier applied to the gap when progress stalls.
    pub gap_shrink: f64,
    /// The run counts as converged once the gap shrinks below this.
    pub min_gap: f64,
    /// Iterations without improvement before the gap shrinks.
    pub patience: usize,
    /// Forward-difference step for gradient estimates.
    pub fd_step: f64,
}

impl Default for MinimizeOptions {
    fn default() -> MinimizeOptions {
        MinimizeOptions {
            max_iterations: 4000,
            initial_gap: 0.5,
            gap_shrink: 0.5,
            min_gap: 1e-4,
            patience: 30,
            fd_step: 1e-6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best feasible point seen.
    pub x: Vec<f64>,
    /// Objective at that point.
    pub objective: f64,
    pub iterations: usize,
    /// True when the gap schedule ran to completion (or the gradient
    /// vanished) before the iteration cap.
    pub converged: bool,
}

/// Minimize `f` over the constraint set starting from `x0`.
pub fn minimize<F>(
    mut f: F,
    x0: &[f64],
    constraints: &[SimplexConstraint],
    opts: &MinimizeOptions,
) -> MinimizeResult
where
    F: FnMut(&[f64]) -> f64,
{
    let mut x = x0.to_vec();
    project(&mut x, constraints);

    let mut fx = f(&x);
    let mut best_x = x.clone();
    let mut best_f = fx;

    let mut gap = opts.initial_gap;
    let mut stalled = 0;
    let mut converged = false;
    let mut iterations = 0;
    let mut grad = vec![0.0; x.len()];

    for iteration in 0..opts.max_iterations {
        iterations = iteration + 1;

        // Forward-difference subgradient of the currently active piece.
        let mut norm_sq = 0.0;
        for i in 0..x.len() {
            let saved = x[i];
            x[i] = saved + opts.fd_step;
            let perturbed = f(&x);
            x[i] = saved;
            let g = (perturbed - fx) / opts.fd_step;
            grad[i] = g;
            norm_sq += g * g;
        }
        if norm_sq <= f64::EPSILON {
            converged = true;
            break;
        }

        // Step towards the estimated target value, then re-project.
        let step = (fx - (best_f - gap)) / norm_sq;
        for i in 0..x.len() {
            x[i] -= step * grad[i];
        }
        project(&mut x, constraints);
        fx = f(&x);

        if fx < best_f - 1e-12 {
            best_f = fx;
            best_x.copy_from_slice(&x);
            stalled = 0;
        } else {
            stalled += 1;
            if stalled >= opts.patience {
                // Restart from the incumbent with a tighter target.
                stalled = 0;
                gap *= opts.gap_shrink;
                x.copy_from_slice(&best_x);
                fx = best_f;
                if gap < opts.min_gap {
                    converged = true;
                    break;
                }
            }
        }
    }

    MinimizeResult { x: best_x, objective: best_f, iterations, converged }
}

/// Euclidean projection onto the constraint set.
fn project(x: &mut [f64], constraints: &[SimplexConstraint]) {
    let mut grouped = vec![false; x.len()];
    for constraint in constraints {
        let mut values: Vec<f64> = constraint.indices.iter().map(|&i| x[i]).collect();
        project_simplex(&mut values, constraint.total);
        for (&i, &v) in constraint.indices.iter().zip(&values) {
            x[i] = v;
            grouped[i] = true;
        }
    }
    for (value, &in_group) in x.iter_mut().zip(&grouped) {
        if !in_group && *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Project onto the scaled simplex `{w >= 0, sum w = total}`
/// (Duchi et al. 2008).
fn project_simplex(values: &mut [f64], total: f64) {
    if values.is_empty() {
        return;
    }
    if total <= 0.0 {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut threshold = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - total) / (j as f64 + 1.0);
        if u - candidate > 0.0 {
            threshold = candidate;
        } else {
            break;
        }
    }

    for v in values.iter_mut() {
        *v = (*v - threshold).max(0.0);
    }
}
