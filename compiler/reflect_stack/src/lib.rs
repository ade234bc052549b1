//! Stack growth for recursive passes.
//!
//! Shape classification follows member types, sample generation follows
//! nested products, and the evaluator follows nested expressions. Each
//! recursive step goes through [`ensure_sufficient_stack`], which grows the
//! stack on demand instead of overflowing on deeply nested input.
//!
//! On wasm the call is a passthrough.

/// Grow when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        assert_eq!(nest(200_000), 200_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("no default"));
        assert_eq!(result, Err("no default"));
    }
}
