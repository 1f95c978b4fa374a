//! Distance since the most recent bar where a condition held.
//!
//! 0 on the condition bar itself, -1 before the condition has ever held.

use crate::error::CoreError;

/// Count bars since `condition` was last true.
///
/// An all -1 output is a legitimate answer (the condition never held), so
/// only empty input is rejected.
pub fn bars_since(condition: &[bool]) -> Result<Vec<i64>, CoreError> {
    if condition.is_empty() {
        return Err(CoreError::InsufficientData {
            indicator: "bars_since".into(),
            required: 1,
            available: 0,
        });
    }

    let mut last: Option<usize> = None;
    Ok(condition
        .iter()
        .enumerate()
        .map(|(i, &hit)| {
            if hit {
                last = Some(i);
            }
            last.map_or(-1, |j| (i - j) as i64)
        })
        .collect())
}
