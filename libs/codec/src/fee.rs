//! Baker minimum fee and the fee/size fixed point
//!
//! The minimum fee a baker accepts grows with the encoded size of an
//! operation, and the fee is itself a variable-length field of that
//! encoding. [`converge`] alternates between the two until the fee stops
//! increasing. Because Zarith length saturates quickly this settles within a
//! few rounds; [`MAX_FEE_ITERATIONS`] caps it regardless.

use crate::error::{CodecError, Result};
use crate::limits::Limits;
use crate::operations::Operation;
use crate::params::Params;
use log::{debug, trace};

/// Upper bound on fee/size rounds per operation
pub const MAX_FEE_ITERATIONS: usize = 16;

/// Bytes charged to the first operation of a batch: branch plus signature
pub const BATCH_OVERHEAD: usize = 32 + 64;

/// Minimum fee in mutez for `op` at `gas_limit`
///
/// `ceil((minimal_fees_mutez * 1000 + size * nanotez_per_byte + gas * nanotez_per_gas) / 1000)`
/// where `size` is the encoded length of `op`, plus [`BATCH_OVERHEAD`] when
/// it is the first operation of its batch.
pub fn min_fee(op: &Operation, gas_limit: u64, is_first: bool, params: &Params) -> Result<u64> {
    let mut size = op.to_bytes(params)?.len();
    if is_first {
        size += BATCH_OVERHEAD;
    }
    let nanotez = u128::from(params.minimal_fees_mutez) * 1000
        + size as u128 * u128::from(params.minimal_nanotez_per_byte)
        + u128::from(gas_limit) * u128::from(params.minimal_nanotez_per_gas_unit);
    Ok(u64::try_from(nanotez.div_ceil(1000)).unwrap_or(u64::MAX))
}

/// Apply simulated limits to `op` and settle its fee
///
/// Gas gets `margin` on top of the simulation. Storage only gets it when the
/// simulation reported some, so no burn is invented for operations that
/// allocate nothing. Both stay within the per-operation hard limits of
/// `params`. The fee never goes below `simulated.fee`.
///
/// Works on a copy of `op` and only writes back once the fee has settled.
pub fn converge(
    op: &mut Operation,
    simulated: Limits,
    margin: u64,
    index: usize,
    params: &Params,
) -> Result<()> {
    let mut snapshot = op.clone();
    snapshot.set_limits(simulated);

    let mut adjusted = Limits {
        fee: 0,
        gas_limit: simulated
            .gas_limit
            .saturating_add(margin)
            .min(params.hard_gas_limit_per_operation),
        storage_limit: if simulated.storage_limit > 0 {
            simulated
                .storage_limit
                .saturating_add(margin)
                .min(params.hard_storage_limit_per_operation)
        } else {
            0
        },
    };

    let is_first = index == 0;
    let mut last = None;
    for iteration in 1..=MAX_FEE_ITERATIONS {
        let fee = simulated
            .fee
            .max(min_fee(&snapshot, adjusted.gas_limit, is_first, params)?);
        trace!("op {index} round {iteration}: fee {fee}");
        if last.is_some_and(|last| fee <= last) {
            debug!(
                "op {index} ({}) settled after {iteration} rounds: {adjusted:?}",
                snapshot.kind()
            );
            *op = snapshot;
            return Ok(());
        }
        adjusted.fee = fee;
        snapshot.set_limits(adjusted);
        last = Some(fee);
    }

    Err(CodecError::FeeNotConverged {
        index,
        iterations: MAX_FEE_ITERATIONS,
        fee: adjusted.fee,
    })
}

/// Raise the fee of `op` to the minimum for its current gas limit, once
pub fn apply_min_fee(op: &mut Operation, index: usize, params: &Params) -> Result<()> {
    let limits = op.limits();
    let fee = limits
        .fee
        .max(min_fee(op, limits.gas_limit, index == 0, params)?);
    trace!("op {index}: min fee pass {} -> {fee}", limits.fee);
    op.set_limits(Limits { fee, ..limits });
    Ok(())
}
