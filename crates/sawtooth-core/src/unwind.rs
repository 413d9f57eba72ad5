//! Backward propagation of a resolved value.
//!
//! After descent finds a value at some step, every step passed over on the
//! way down is revisited last-to-first:
//!
//! ```text
//!   descent:  A.get -> miss, B.get -> miss, C.get -> v
//!   unwind:   B.set(v), B.get -> v2, A.set(v2), A.get -> v3   => v3
//! ```
//!
//! Store steps are written and then re-read, so the value handed to the next
//! tier up is what the tier actually holds (it may decorate or re-encode on
//! write). Transform steps map the value without any read-back.

use std::fmt::Debug;

use anyhow::Result;
use tracing::{debug, warn};

use crate::step::{Step, StepRef};

/// Propagate `value` back through `steps`, from the last element to the first.
///
/// `steps` are the steps visited before the resolution point, in forward
/// order. Returns the value produced by the first step, or `value` itself
/// when `steps` is empty. The first failure aborts the walk and is returned
/// unchanged.
pub async fn unwind<K, V>(steps: &[Step<K, V>], key: &K, value: V) -> Result<V>
where
    K: Debug + Send + Sync,
    V: Send,
{
    let mut current = value;

    for (index, step) in steps.iter().enumerate().rev() {
        current = match step {
            Step::Transform { transform, .. } => {
                debug!(step = %step.step_ref(index), key = ?key, "unwind: applying transform");
                (**transform)
                    .transform(current, key)
                    .await
                    .map_err(|err| unwind_failed(step.step_ref(index), key, "transform", err))?
            }
            Step::Store { get, set, .. } => {
                debug!(step = %step.step_ref(index), key = ?key, "unwind: writing back");
                (**set)
                    .set(key, &current)
                    .await
                    .map_err(|err| unwind_failed(step.step_ref(index), key, "set", err))?;

                match (**get)
                    .get(key)
                    .await
                    .map_err(|err| unwind_failed(step.step_ref(index), key, "get", err))?
                {
                    Some(stored) => stored,
                    None => {
                        debug!(
                            step = %step.step_ref(index),
                            key = ?key,
                            "unwind: tier did not retain written value, passing it through"
                        );
                        current
                    }
                }
            }
            Step::Terminal { .. } => {
                debug!(
                    step = %step.step_ref(index),
                    key = ?key,
                    "unwind: read-only step, passing through"
                );
                current
            }
        };
    }

    Ok(current)
}

fn unwind_failed<K: Debug>(step: StepRef, key: &K, op: &str, err: anyhow::Error) -> anyhow::Error {
    warn!(step = %step, key = ?key, op, error = %err, "unwind failed");
    err
}
