//! Which `(l, m)` modes an evaluation covers, and in what order.

use crate::domain::{ModeKey, ModeRequest};
use crate::error::{AppError, ErrorKind};

/// Resolve a mode request against the modes a model carries.
///
/// `UpTo(L)` enumerates every `(l, m)` with `2 <= l <= L`, `0 <= m <= l`,
/// whether or not the model has it. With `minus_m`, every `m > 0` entry is
/// followed (at the end of the list) by its mirror.
pub fn select(
    available: &[ModeKey],
    request: &ModeRequest,
    minus_m: bool,
) -> Result<Vec<ModeKey>, AppError> {
    let modes = match request {
        ModeRequest::All => available.to_vec(),
        ModeRequest::UpTo(ell_max) => (2..=*ell_max)
            .flat_map(|ell| (0..=ell).map(move |m| ModeKey::new(ell, m)))
            .collect(),
        ModeRequest::Pairs(pairs) => pairs.clone(),
    };
    if minus_m {
        extend_minus_m(modes)
    } else {
        Ok(modes)
    }
}

/// Append `(l, -m)` for every `(l, m)` with `m > 0`.
///
/// A list that already holds a negative `m` is rejected so a mode can never
/// be mirrored twice.
pub fn extend_minus_m(mut modes: Vec<ModeKey>) -> Result<Vec<ModeKey>, AppError> {
    if let Some(neg) = modes.iter().find(|k| k.m < 0) {
        return Err(AppError::new(
            ErrorKind::NegativeModeInList,
            format!("Mode list already has negative modes ({neg})."),
        ));
    }
    let mirrored: Vec<ModeKey> = modes.iter().filter(|k| k.m > 0).map(|k| k.mirrored()).collect();
    modes.extend(mirrored);
    Ok(modes)
}

/// Stable ascending sort by `(l, m)`: (2,-2), (2,-1), ..., (2,2), (3,-3), ...
pub fn sort_modes(modes: &mut [ModeKey]) {
    modes.sort();
}
