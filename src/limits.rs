//! Nesting limits for the recursive-descent parsers
//!
//! Both the syntax parser and the regexp validator recurse once per level
//! of source nesting. Each guarded entry point counts against a depth
//! bound and runs on a stack that `stacker` grows on demand, so hostile
//! input such as ten thousand `(` fails with a `SyntaxError` instead of
//! overflowing the thread's stack.

/// Maximum nesting of guarded parser entry points.
///
/// One level of source nesting passes through up to three guards (a
/// parenthesized expression enters `parse_maybe_assign`,
/// `parse_maybe_unary` and `parse_expr_atom`), so roughly 330 nested
/// parentheses or 1000 nested blocks are accepted.
///
/// ```javascript
/// ((((((((((((((((((((x))))))))))))))))))));
/// [[[[[[[[[[[[[[[[[[[[]]]]]]]]]]]]]]]]]]]];
/// !!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!x;
/// ```
pub const MAX_NESTING_DEPTH: u32 = 1000;

/// Maximum nesting of groups and nested classes inside one regexp literal.
pub const MAX_REGEXP_NESTING_DEPTH: u32 = 1000;

/// Stack that must remain before a guarded call runs in place.
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated once the red zone is reached.
pub const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if little stack remains.
pub(crate) fn ensure_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, f)
}
