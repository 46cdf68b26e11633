//! Statevector simulation engine.

use ndarray::Array1;
use num_complex::Complex64;
use qvex_ir::{Gate, IrResult, QubitIndex, RegisterValues};
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// A statevector over `num_qubits` qubits.
///
/// Basis index `k` has qubit `q` in `|1⟩` iff bit `q` of `k` is set.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Apply `gate` to `qubits`, evaluating rotation angles against `values`.
    pub fn apply_gate(
        &mut self,
        gate: &Gate,
        qubits: &[QubitIndex],
        values: &RegisterValues,
    ) -> IrResult<()> {
        let q: Vec<usize> = qubits.iter().map(|q| q.as_usize()).collect();
        match gate {
            Gate::I => {}
            Gate::X => self.apply_x(q[0]),
            Gate::Y => self.apply_y(q[0]),
            Gate::Z => self.apply_z(q[0]),
            Gate::H => self.apply_h(q[0]),
            Gate::S => self.apply_phase(q[0], FRAC_PI_2),
            Gate::Sdg => self.apply_phase(q[0], -FRAC_PI_2),
            Gate::Rx(theta) => self.apply_rx(q[0], theta.evaluate(values)?),
            Gate::Ry(theta) => self.apply_ry(q[0], theta.evaluate(values)?),
            Gate::Rz(theta) => self.apply_rz(q[0], theta.evaluate(values)?),
            Gate::CX => self.apply_cx(q[0], q[1]),
            Gate::CZ => self.apply_cz(q[0], q[1]),
            Gate::Swap => self.apply_swap(q[0], q[1]),
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Readout
    // =========================================================================

    /// Draw `shots` basis-state indices from the Born distribution.
    pub fn sample<R: Rng + ?Sized>(&self, shots: usize, rng: &mut R) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut total = 0.0;
        for amp in &self.amplitudes {
            total += amp.norm_sqr();
            cumulative.push(total);
        }
        let last = self.amplitudes.len() - 1;

        (0..shots)
            .map(|_| {
                let r: f64 = rng.r#gen::<f64>() * total;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }

    /// Consume into an amplitude array.
    pub fn into_amplitudes(self) -> Array1<Complex64> {
        Array1::from(self.amplitudes)
    }
}
