//! Epsilon support vector regression on a single (position) feature with an
//! RBF kernel.
//!
//! The dual problem is solved by SMO using second order working set
//! selection.  Variables 0..n are the alpha+ and n..2n the alpha- multipliers.
//! Training points are kept sorted by x so that the (truncated) kernel row of
//! a point is a contiguous window.  Gradients are updated over those
//! windows for every variable, so shrinking only narrows the working set
//! search and never needs a gradient rebuild.

use std::ops::Range;

const TAU: f64 = 1.0e-12;
const SHRINK_INTERVAL: usize = 1000;
// exp(-36) ~ 2.3e-16; beyond this the kernel is treated as zero
const KERNEL_CUTOFF: f64 = 36.0;

#[derive(Debug, Copy, Clone)]
pub struct SvrParams {
    pub c: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub tol: f64,
}

impl Default for SvrParams {
    fn default() -> Self {
        Self {
            c: 50.0,
            gamma: 0.1,
            epsilon: 0.1,
            tol: 1.0e-3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Svr {
    gamma: f64,
    radius: f64,
    // Support vectors sorted by x
    sv_x: Vec<f64>,
    sv_coef: Vec<f64>,
    rho: f64,
}

#[derive(Copy, Clone)]
struct Kernel {
    gamma: f64,
}

impl Kernel {
    #[inline]
    fn k(&self, a: f64, b: f64) -> f64 {
        let d = a - b;
        let z = self.gamma * d * d;
        if z > KERNEL_CUTOFF {
            0.0
        } else {
            (-z).exp()
        }
    }

    fn radius(&self) -> f64 {
        (KERNEL_CUTOFF / self.gamma).sqrt()
    }
}

/// Indices of sorted `x` within `r` of `x0`
fn window(x: &[f64], x0: f64, r: f64) -> Range<usize> {
    let a = x.partition_point(|&v| v < x0 - r);
    let b = x.partition_point(|&v| v <= x0 + r).max(a);
    a..b
}

struct Solver<'a> {
    x: &'a [f64],
    kern: Kernel,
    radius: f64,
    c: f64,
    n: usize,
    alpha: Vec<f64>,
    grad: Vec<f64>,
    // Variables considered for the working set
    active: Vec<usize>,
}

impl<'a> Solver<'a> {
    fn new(x: &'a [f64], y: &[f64], par: &SvrParams) -> Self {
        let n = x.len();
        let kern = Kernel { gamma: par.gamma };
        let mut grad = Vec::with_capacity(2 * n);
        grad.extend(y.iter().map(|&v| par.epsilon - v));
        grad.extend(y.iter().map(|&v| par.epsilon + v));
        Self {
            x,
            kern,
            radius: kern.radius(),
            c: par.c,
            n,
            alpha: vec![0.0; 2 * n],
            grad,
            active: (0..2 * n).collect(),
        }
    }

    #[inline]
    fn sign(&self, t: usize) -> f64 {
        if t < self.n {
            1.0
        } else {
            -1.0
        }
    }

    #[inline]
    fn point(&self, t: usize) -> usize {
        if t < self.n {
            t
        } else {
            t - self.n
        }
    }

    /// Signed kernel entry Q[t][u] = s_t s_u K(x_t, x_u)
    #[inline]
    fn q(&self, t: usize, u: usize) -> f64 {
        self.sign(t) * self.sign(u) * self.kern.k(self.x[self.point(t)], self.x[self.point(u)])
    }

    #[inline]
    fn is_upper(&self, t: usize) -> bool {
        self.alpha[t] >= self.c
    }

    #[inline]
    fn is_lower(&self, t: usize) -> bool {
        self.alpha[t] <= 0.0
    }

    fn select_working_set(&self, tol: f64) -> Option<(usize, usize)> {
        let mut gmax = f64::NEG_INFINITY;
        let mut i = None;
        for &t in self.active.iter() {
            let g = -self.sign(t) * self.grad[t];
            let free = if self.sign(t) > 0.0 {
                !self.is_upper(t)
            } else {
                !self.is_lower(t)
            };
            if free && g >= gmax {
                gmax = g;
                i = Some(t);
            }
        }
        let i = i?;

        let mut gmax2 = f64::NEG_INFINITY;
        let mut j = None;
        let mut obj_min = f64::INFINITY;
        for &t in self.active.iter() {
            let (ok, g) = if self.sign(t) > 0.0 {
                (!self.is_lower(t), self.grad[t])
            } else {
                (!self.is_upper(t), -self.grad[t])
            };
            if !ok {
                continue;
            }
            gmax2 = gmax2.max(g);
            let grad_diff = gmax + g;
            if grad_diff > 0.0 {
                // QD is 1 for the RBF kernel
                let quad = 2.0 - 2.0 * self.sign(i) * self.sign(t) * self.q(i, t);
                let quad = if quad > 0.0 { quad } else { TAU };
                let obj = -(grad_diff * grad_diff) / quad;
                if obj <= obj_min {
                    obj_min = obj;
                    j = Some(t);
                }
            }
        }
        if gmax + gmax2 < tol {
            None
        } else {
            j.map(|j| (i, j))
        }
    }

    fn update_pair(&mut self, i: usize, j: usize) {
        let c = self.c;
        let (old_i, old_j) = (self.alpha[i], self.alpha[j]);
        let qij = self.q(i, j);
        let (mut ai, mut aj) = (old_i, old_j);
        if self.sign(i) != self.sign(j) {
            let quad = 2.0 + 2.0 * qij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (-self.grad[i] - self.grad[j]) / quad;
            let diff = ai - aj;
            ai += delta;
            aj += delta;
            if diff > 0.0 {
                if aj < 0.0 {
                    aj = 0.0;
                    ai = diff;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = -diff;
            }
            if diff > 0.0 {
                if ai > c {
                    ai = c;
                    aj = c - diff;
                }
            } else if aj > c {
                aj = c;
                ai = c + diff;
            }
        } else {
            let quad = 2.0 - 2.0 * qij;
            let quad = if quad > 0.0 { quad } else { TAU };
            let delta = (self.grad[i] - self.grad[j]) / quad;
            let sum = ai + aj;
            ai -= delta;
            aj += delta;
            if sum > c {
                if ai > c {
                    ai = c;
                    aj = sum - c;
                }
            } else if aj < 0.0 {
                aj = 0.0;
                ai = sum;
            }
            if sum > c {
                if aj > c {
                    aj = c;
                    ai = sum - c;
                }
            } else if ai < 0.0 {
                ai = 0.0;
                aj = sum;
            }
        }
        self.alpha[i] = ai;
        self.alpha[j] = aj;
        self.update_grad(i, ai - old_i);
        self.update_grad(j, aj - old_j);
    }

    fn update_grad(&mut self, t: usize, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let n = self.n;
        let xt = self.x[self.point(t)];
        let st = self.sign(t);
        for k in window(self.x, xt, self.radius) {
            let z = st * delta * self.kern.k(xt, self.x[k]);
            self.grad[k] += z;
            self.grad[k + n] -= z;
        }
    }

    /// Bounded variables whose gradient puts them beyond the current
    /// violating pair cannot enter the working set until the end
    fn be_shrunk(&self, t: usize, gmax1: f64, gmax2: f64) -> bool {
        let pos = self.sign(t) > 0.0;
        if self.is_upper(t) {
            -self.grad[t] > if pos { gmax1 } else { gmax2 }
        } else if self.is_lower(t) {
            self.grad[t] > if pos { gmax2 } else { gmax1 }
        } else {
            false
        }
    }

    fn do_shrinking(&mut self, tol: f64, unshrunk: &mut bool) {
        let (mut gmax1, mut gmax2) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &t in self.active.iter() {
            let g = self.grad[t];
            if self.sign(t) > 0.0 {
                if !self.is_upper(t) {
                    gmax1 = gmax1.max(-g)
                }
                if !self.is_lower(t) {
                    gmax2 = gmax2.max(g)
                }
            } else {
                if !self.is_upper(t) {
                    gmax2 = gmax2.max(-g)
                }
                if !self.is_lower(t) {
                    gmax1 = gmax1.max(g)
                }
            }
        }
        // Close to convergence: reopen everything once so that variables shrunk
        // early get a second look
        if !*unshrunk && gmax1 + gmax2 <= tol * 10.0 {
            *unshrunk = true;
            self.unshrink();
        }
        let mut active = std::mem::take(&mut self.active);
        active.retain(|&t| !self.be_shrunk(t, gmax1, gmax2));
        self.active = active;
    }

    fn unshrink(&mut self) {
        if self.active.len() < 2 * self.n {
            self.active.clear();
            self.active.extend(0..2 * self.n);
        }
    }

    fn solve(&mut self, tol: f64, shrinking: bool) {
        let max_iter = (100 * 2 * self.n).max(10_000_000);
        let mut counter = SHRINK_INTERVAL.min(2 * self.n);
        let mut unshrunk = false;
        let mut iter = 0;
        while iter < max_iter {
            counter -= 1;
            if counter == 0 {
                counter = SHRINK_INTERVAL.min(2 * self.n);
                if shrinking {
                    self.do_shrinking(tol, &mut unshrunk);
                }
            }
            let (i, j) = match self.select_working_set(tol) {
                Some(p) => p,
                None if self.active.len() < 2 * self.n => {
                    // Converged on the shrunk problem; check the full one
                    self.unshrink();
                    counter = 1;
                    match self.select_working_set(tol) {
                        Some(p) => p,
                        None => break,
                    }
                }
                None => break,
            };
            self.update_pair(i, j);
            iter += 1;
        }
        if iter >= max_iter {
            warn!("SVR reached maximum number of iterations ({})", max_iter);
        }
        trace!(
            "SVR converged after {} iterations ({} active variables)",
            iter,
            self.active.len()
        );
    }

    fn rho(&self) -> f64 {
        let (mut ub, mut lb) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut n_free, mut sum_free) = (0usize, 0.0);
        for t in 0..2 * self.n {
            let s = self.sign(t);
            let yg = s * self.grad[t];
            if self.is_upper(t) {
                if s < 0.0 {
                    ub = ub.min(yg)
                } else {
                    lb = lb.max(yg)
                }
            } else if self.is_lower(t) {
                if s > 0.0 {
                    ub = ub.min(yg)
                } else {
                    lb = lb.max(yg)
                }
            } else {
                n_free += 1;
                sum_free += yg;
            }
        }
        if n_free > 0 {
            sum_free / n_free as f64
        } else {
            0.5 * (ub + lb)
        }
    }
}

impl Svr {
    /// Fit to (x, y) pairs.  Returns None if there are no points.
    pub fn fit(x: &[f64], y: &[f64], par: &SvrParams) -> Option<Self> {
        assert_eq!(x.len(), y.len(), "Unequal x and y lengths");
        if x.is_empty() {
            return None;
        }
        let mut ix: Vec<usize> = (0..x.len()).collect();
        ix.sort_unstable_by(|&a, &b| x[a].total_cmp(&x[b]));
        let xs: Vec<f64> = ix.iter().map(|&i| x[i]).collect();
        let ys: Vec<f64> = ix.iter().map(|&i| y[i]).collect();

        let mut solver = Solver::new(&xs, &ys, par);
        solver.solve(par.tol, true);
        let rho = solver.rho();

        let n = xs.len();
        let (sv_x, sv_coef): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|k| (xs[k], solver.alpha[k] - solver.alpha[k + n]))
            .filter(|(_, c)| *c != 0.0)
            .unzip();
        trace!(
            "SVR fit: {} points, {} support vectors, rho = {}",
            n,
            sv_x.len(),
            rho
        );

        Some(Self {
            gamma: par.gamma,
            radius: solver.radius,
            sv_x,
            sv_coef,
            rho,
        })
    }

    pub fn predict_one(&self, x: f64) -> f64 {
        let kern = Kernel { gamma: self.gamma };
        let r = window(&self.sv_x, x, self.radius);
        let s: f64 = self.sv_x[r.clone()]
            .iter()
            .zip(self.sv_coef[r].iter())
            .map(|(&v, &c)| c * kern.k(v, x))
            .sum();
        s - self.rho
    }

    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&v| self.predict_one(v)).collect()
    }

    pub fn n_sv(&self) -> usize {
        self.sv_x.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn constant_data_gives_constant_fit() {
        let x: Vec<f64> = (1..=200).map(|i| i as f64).collect();
        let y = vec![50.0; 200];
        let m = Svr::fit(&x, &y, &SvrParams::default()).unwrap();
        assert_eq!(m.n_sv(), 0);
        for p in [1.0, 100.0, 5000.0] {
            assert_approx_eq!(m.predict_one(p), 50.0, 1.0e-9);
        }
    }

    #[test]
    fn follows_smooth_signal() {
        let x: Vec<f64> = (0..300).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 30.0 + 10.0 * (v / 40.0).sin()).collect();
        let m = Svr::fit(&x, &y, &SvrParams::default()).unwrap();
        let pred = m.predict(&x);
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 0.5, "prediction {} target {}", p, t);
        }
    }

    #[test]
    fn far_positions_fall_back_to_bias() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![10.0, 12.0, 10.0, 12.0];
        let m = Svr::fit(&x, &y, &SvrParams::default()).unwrap();
        // Outside the kernel support only the intercept remains
        assert_approx_eq!(m.predict_one(1000.0), -m.rho);
        assert!(m.predict_one(1000.0) > 9.0 && m.predict_one(1000.0) < 13.0);
    }

    fn noisy(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y = x
            .iter()
            .map(|&v| 50.0 + 15.0 * (((v as usize * 7919) % 31) as f64 / 30.0 - 0.5))
            .collect();
        (x, y)
    }

    #[test]
    fn shrinking_reaches_same_solution() {
        let (x, y) = noisy(600);
        let par = SvrParams::default();
        let mut full = Solver::new(&x, &y, &par);
        full.solve(par.tol, false);
        let mut shrunk = Solver::new(&x, &y, &par);
        shrunk.solve(par.tol, true);

        // Both meet the stopping tolerance on the complete problem
        shrunk.unshrink();
        assert!(shrunk.select_working_set(par.tol).is_none());
        assert_approx_eq!(full.rho(), shrunk.rho(), 0.1);

        let f = |s: &Solver, x0: f64| -> f64 {
            (0..s.n)
                .map(|k| (s.alpha[k] - s.alpha[k + s.n]) * s.kern.k(s.x[k], x0))
                .sum::<f64>()
                - s.rho()
        };
        for &x0 in x.iter().step_by(7) {
            assert_approx_eq!(f(&full, x0), f(&shrunk, x0), 0.5);
        }
    }

    #[test]
    fn noisy_flanks_converge() {
        let (x, y) = noisy(2000);
        let m = Svr::fit(&x, &y, &SvrParams::default()).unwrap();
        assert!(m.n_sv() > 0);
        let pred = m.predict(&x);
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!(p.is_finite());
            assert!((p - t).abs() < 8.0, "prediction {} target {}", p, t);
        }
    }

    #[test]
    fn empty_input() {
        assert!(Svr::fit(&[], &[], &SvrParams::default()).is_none());
    }

    #[test]
    fn window_bounds() {
        let x = [1.0, 2.0, 3.0, 10.0, 11.0];
        assert_eq!(window(&x, 2.0, 1.0), 0..3);
        assert_eq!(window(&x, 6.0, 1.0), 3..3);
        assert_eq!(window(&x, 11.0, 1.0), 3..5);
    }
}
