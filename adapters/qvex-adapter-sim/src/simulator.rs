//! Simulator backend implementation.

use ndarray::Array2;
use qvex_ir::{Instruction, Program, QubitIndex, READOUT_REGISTER, RegisterValues};
use qvex_vqe::{BackendResult, QuantumComputer, Wavefunction, WavefunctionSimulator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Default qubit limit.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// A program compiled for the local simulator.
///
/// Holds the gate sequence separately from the terminal measurements and the
/// qubit read into each readout slot.
#[derive(Debug, Clone)]
pub struct SimExecutable {
    gates: Program<QubitIndex>,
    readout: Vec<QubitIndex>,
    num_qubits: usize,
    shots: u32,
}

impl SimExecutable {
    /// Qubit measured into each readout slot, in slot order.
    pub fn readout(&self) -> &[QubitIndex] {
        &self.readout
    }

    /// Trials per run.
    pub fn shots(&self) -> u32 {
        self.shots
    }
}

/// Local statevector simulator.
///
/// Implements both [`WavefunctionSimulator`] and [`QuantumComputer`]. Sampling
/// draws from an internal seeded generator, so two simulators built with the
/// same seed produce the same outcomes for the same calls.
pub struct LocalSimulator {
    max_qubits: u32,
    rng: Mutex<StdRng>,
}

impl LocalSimulator {
    /// Create a simulator with an entropy-seeded generator.
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a simulator with a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Change the qubit limit.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// The qubit limit.
    pub fn max_qubits(&self) -> u32 {
        self.max_qubits
    }

    fn check_size(&self, num_qubits: usize) -> SimResult<()> {
        if num_qubits > self.max_qubits as usize {
            return Err(SimError::TooManyQubits {
                requested: num_qubits,
                max: self.max_qubits,
            });
        }
        Ok(())
    }

    /// Apply every gate of `program` to |0…0⟩ over `num_qubits` qubits.
    fn evolve(
        program: &Program<QubitIndex>,
        num_qubits: usize,
        values: &RegisterValues,
    ) -> SimResult<Statevector> {
        let mut sv = Statevector::new(num_qubits);
        for inst in program.instructions() {
            match inst {
                Instruction::Gate { gate, qubits } => sv.apply_gate(gate, qubits, values)?,
                Instruction::Measure { .. } => return Err(SimError::MeasurementInWavefunction),
            }
        }
        Ok(sv)
    }

    fn split_measurements(program: &Program<QubitIndex>) -> SimResult<SimExecutable> {
        let size = program.declaration(READOUT_REGISTER).map_or(0, |d| d.size);
        let mut gates = Program::new();
        for (name, decl) in program.declarations() {
            if name != READOUT_REGISTER {
                // Parameter regions keep their shape so bindings still check.
                gates.declare_parameters(name.clone(), decl.size)?;
            }
        }

        let mut slots: Vec<Option<QubitIndex>> = vec![None; size];
        let mut measured = false;
        for inst in program.instructions() {
            match inst {
                Instruction::Gate { gate, qubits } => {
                    if measured {
                        return Err(SimError::MidCircuitMeasurement {
                            gate: gate.name().to_string(),
                        });
                    }
                    gates.gate(gate.clone(), qubits.iter().copied())?;
                }
                Instruction::Measure { qubit, target } => {
                    measured = true;
                    if target.register != READOUT_REGISTER || target.index >= size {
                        return Err(SimError::InvalidReadout(format!(
                            "{}[{}]",
                            target.register, target.index
                        )));
                    }
                    slots[target.index] = Some(*qubit);
                }
            }
        }

        let readout = slots
            .into_iter()
            .enumerate()
            .map(|(slot, q)| q.ok_or(SimError::UnfilledReadout(slot)))
            .collect::<SimResult<Vec<_>>>()?;

        Ok(SimExecutable {
            gates,
            readout,
            num_qubits: program.num_qubits(),
            shots: program.num_shots(),
        })
    }

    #[instrument(skip(self, exe, values), fields(shots = exe.shots))]
    fn sample(&self, exe: &SimExecutable, values: &RegisterValues) -> SimResult<Array2<u8>> {
        let start = Instant::now();
        let sv = Self::evolve(&exe.gates, exe.num_qubits, values)?;

        let outcomes = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            sv.sample(exe.shots as usize, &mut *rng)
        };
        let batch = Array2::from_shape_fn((outcomes.len(), exe.readout.len()), |(shot, col)| {
            ((outcomes[shot] >> exe.readout[col].as_usize()) & 1) as u8
        });

        debug!(elapsed = ?start.elapsed(), "sampling completed");
        Ok(batch)
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl WavefunctionSimulator for LocalSimulator {
    fn wavefunction(
        &self,
        program: &Program<QubitIndex>,
        values: &RegisterValues,
    ) -> BackendResult<Wavefunction> {
        let num_qubits = program.num_qubits();
        self.check_size(num_qubits)?;
        let sv = Self::evolve(program, num_qubits, values)?;
        Ok(Wavefunction::new(sv.into_amplitudes()))
    }
}

impl QuantumComputer for LocalSimulator {
    type Executable = SimExecutable;

    fn compile(&self, program: &Program<QubitIndex>) -> BackendResult<SimExecutable> {
        self.check_size(program.num_qubits())?;
        let exe = Self::split_measurements(program)?;
        debug!(
            num_qubits = exe.num_qubits,
            readout = exe.readout.len(),
            shots = exe.shots,
            "compiled program"
        );
        Ok(exe)
    }

    fn run(&self, exe: &SimExecutable, values: &RegisterValues) -> BackendResult<Array2<u8>> {
        Ok(self.sample(exe, values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qvex_vqe::BackendError;

    fn bell(measure: bool) -> Program<QubitIndex> {
        let mut p = Program::new();
        p.h(QubitIndex(0)).unwrap();
        p.cx(QubitIndex(0), QubitIndex(1)).unwrap();
        if measure {
            p.declare_readout(READOUT_REGISTER, 2).unwrap();
            p.measure(QubitIndex(1), READOUT_REGISTER, 0).unwrap();
            p.measure(QubitIndex(0), READOUT_REGISTER, 1).unwrap();
            p.wrap_in_numshots_loop(200);
        }
        p
    }

    #[test]
    fn test_wavefunction_bell() {
        let sim = LocalSimulator::with_seed(1);
        let wf = sim.wavefunction(&bell(false), &RegisterValues::new()).unwrap();
        let p = wf.probabilities();
        assert!((p[0] - 0.5).abs() < 1e-10);
        assert!((p[3] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_wavefunction_rejects_measurement() {
        let sim = LocalSimulator::with_seed(1);
        let err = sim.wavefunction(&bell(true), &RegisterValues::new()).unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }

    #[test]
    fn test_run_bell_correlated() {
        let sim = LocalSimulator::with_seed(7);
        let exe = sim.compile(&bell(true)).unwrap();
        assert_eq!(exe.readout(), &[QubitIndex(1), QubitIndex(0)]);

        let batch = sim.run(&exe, &RegisterValues::new()).unwrap();
        assert_eq!(batch.dim(), (200, 2));
        assert!(batch.rows().into_iter().all(|r| r[0] == r[1]));
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let a = LocalSimulator::with_seed(99);
        let b = LocalSimulator::with_seed(99);
        let exe = a.compile(&bell(true)).unwrap();
        let values = RegisterValues::new();
        assert_eq!(a.run(&exe, &values).unwrap(), b.run(&exe, &values).unwrap());
    }

    #[test]
    fn test_mid_circuit_measurement_rejected() {
        let mut p = bell(true);
        p.x(QubitIndex(0)).unwrap();
        let err = LocalSimulator::with_seed(0).compile(&p).unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(msg) if msg.contains("x follows a measurement")));
    }

    #[test]
    fn test_unfilled_readout_rejected() {
        let mut p = bell(false);
        p.declare_readout(READOUT_REGISTER, 2).unwrap();
        p.measure(QubitIndex(0), READOUT_REGISTER, 0).unwrap();
        assert!(LocalSimulator::with_seed(0).compile(&p).is_err());
    }

    #[test]
    fn test_too_many_qubits() {
        let sim = LocalSimulator::with_seed(0).with_max_qubits(1);
        let err = sim.wavefunction(&bell(false), &RegisterValues::new()).unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }

    #[test]
    fn test_unbound_parameter_reported() {
        let mut p = Program::new();
        let theta = p.declare_parameters("theta", 1).unwrap();
        p.rx(theta[0].clone(), QubitIndex(0)).unwrap();
        let err = LocalSimulator::with_seed(0)
            .wavefunction(&p, &RegisterValues::new())
            .unwrap_err();
        assert!(matches!(err, BackendError::Ir(_)));
    }
}
