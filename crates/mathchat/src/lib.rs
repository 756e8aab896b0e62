#![forbid(unsafe_code)]

//! Umbrella crate: the full mathchat surface under one dependency.
//!
//! The interesting subsystem is the sandboxed calculator: a restricted
//! grammar that can only express arithmetic, identifiers, and
//! allow-listed calls, evaluated bottom-up under magnitude and arity
//! bounds. The chat layer is glue around it.

pub use mc_ast::{BinaryOp, CONSTANT_NAMES, Expr, FUNCTION_NAMES, Function, UnaryOp, constant_value};
pub use mc_chat::{
    ChatEngine, ChatError, ChatStyle, Reply, ReplyKind, ResponseLength, Transcript,
    TranscriptEntry, UserContext,
};
pub use mc_classify::{looks_like_math, looks_like_math_with_limits};
pub use mc_eval::{
    EvalError, EvalErrorKind, EvalLimits, calculator_help, evaluate, evaluate_with_limits,
    validate,
};
pub use mc_parse::{ParseError, normalize, parse};

#[cfg(test)]
mod tests {
    use super::{ChatEngine, UserContext, evaluate, looks_like_math};

    #[test]
    fn the_public_surface_wires_together() {
        assert!(looks_like_math("2 + 2"));
        assert_eq!(evaluate("2 + 2").expect("eval"), "4");
        let reply = ChatEngine::new().respond("2 + 2", &UserContext::default());
        assert_eq!(reply.text, "the answer is: **4**");
    }
}
