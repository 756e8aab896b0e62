#![forbid(unsafe_code)]

use mc_ast::{CONSTANT_NAMES, FUNCTION_NAMES};
use mc_eval::{EvalLimits, validate};
use mc_parse::{normalize, parse};

/// Messages with more whitespace-separated words than this are treated
/// as natural language, not candidate expressions.
const MAX_WORD_COUNT: usize = 10;

/// Operator and grouping characters that count as expression structure.
const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '^', '%', '(', ')'];

/// Decide whether `text` is plausibly a math expression.
///
/// This is a routing filter, not an authority: a `true` verdict only
/// means the string parses under the same restricted grammar the
/// evaluator uses, so handing it to `mc_eval::evaluate` cannot execute
/// anything — at worst it fails with an unknown-name or numeric error.
/// A `false` verdict just means the caller should answer with a normal
/// chat reply. Pure and total; never panics.
#[must_use]
pub fn looks_like_math(text: &str) -> bool {
    looks_like_math_with_limits(text, &EvalLimits::default())
}

#[must_use]
pub fn looks_like_math_with_limits(text: &str, limits: &EvalLimits) -> bool {
    if text.len() > limits.max_input_len {
        return false;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.split_whitespace().count() > MAX_WORD_COUNT {
        return false;
    }

    // Cheap signal scan before committing to a parse: something numeric
    // (a digit or a named constant) and something structural (an
    // operator or a known function). Pure prose has neither.
    let normalized = normalize(trimmed);
    let lowered = normalized.to_lowercase();
    let numeric_signal = lowered.chars().any(|c| c.is_ascii_digit())
        || contains_known_word(&lowered, CONSTANT_NAMES);
    let structure_signal = lowered.chars().any(|c| OPERATOR_CHARS.contains(&c))
        || contains_known_word(&lowered, FUNCTION_NAMES);
    if !numeric_signal || !structure_signal {
        return false;
    }

    // Authoritative tail: the evaluator's own grammar and validation
    // walk. Anything that parses here is inert by construction.
    match parse(&normalized) {
        Ok(expr) => validate(&expr, limits).is_ok(),
        Err(_) => false,
    }
}

fn contains_known_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|token| words.contains(&token))
}

#[cfg(test)]
mod tests {
    use mc_eval::EvalLimits;

    use super::{looks_like_math, looks_like_math_with_limits};

    #[test]
    fn expressions_are_accepted() {
        for input in [
            "2 + 2",
            "(2+2)*3",
            "sqrt(16)",
            "2^10",
            "pi * 2",
            "factorial(5) / 10",
            "3×4÷2",
            "√(81)",
        ] {
            assert!(looks_like_math(input), "expected true for {input:?}");
        }
    }

    #[test]
    fn prose_is_rejected() {
        for input in [
            "hello how are you",
            "tell me a joke",
            "what do you think about math",
            "",
            "   ",
        ] {
            assert!(!looks_like_math(input), "expected false for {input:?}");
        }
    }

    #[test]
    fn prose_mentioning_numbers_is_rejected_without_structure() {
        assert!(!looks_like_math("i am 25 years old"));
        assert!(!looks_like_math("hello 22"));
    }

    #[test]
    fn questions_around_expressions_are_rejected_by_the_parse() {
        // Signals pass (digits + operator) but the grammar does not.
        assert!(!looks_like_math("what is 2 + 2"));
        assert!(!looks_like_math("calculate 5 * 3 please"));
    }

    #[test]
    fn long_messages_are_rejected_before_parsing() {
        assert!(!looks_like_math(
            "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 + 1"
        ));
        let oversized = format!("2 + {}", "9".repeat(2_000));
        assert!(!looks_like_math(&oversized));
    }

    #[test]
    fn code_shaped_input_is_rejected() {
        for input in [
            "__import__('os')",
            "exec('rm -rf /')",
            "[1, 2] + [3]",
            "lambda x: x + 1",
            "foo.bar(2)",
        ] {
            assert!(!looks_like_math(input), "expected false for {input:?}");
        }
    }

    #[test]
    fn nesting_beyond_the_validation_limit_is_rejected() {
        let deep = format!("{}1{}", "min(".repeat(101), ")".repeat(101));
        assert!(!looks_like_math_with_limits(&deep, &EvalLimits::default()));
    }

    mod properties {
        use proptest::prelude::*;

        use super::looks_like_math;
        use mc_eval::{EvalError, evaluate};

        proptest! {
            #[test]
            fn letters_and_spaces_never_classify_as_math(input in "[a-zA-Z ]{0,80}") {
                prop_assert!(!looks_like_math(&input));
            }

            #[test]
            fn accepted_input_never_fails_structurally(input in ".{0,120}") {
                if looks_like_math(&input) {
                    match evaluate(&input) {
                        Ok(_)
                        | Err(
                            EvalError::UnknownIdentifier(_)
                            | EvalError::UnknownFunction(_)
                            | EvalError::Arity { .. }
                            | EvalError::Domain(_)
                            | EvalError::DivisionByZero
                            | EvalError::ExponentTooLarge { .. }
                            | EvalError::NumberTooLarge { .. }
                            | EvalError::ResultTooLarge
                            | EvalError::NonFiniteResult,
                        ) => {}
                        Err(other) => {
                            prop_assert!(
                                false,
                                "structural error after accept: {:?} for {:?}",
                                other,
                                input
                            );
                        }
                    }
                }
            }
        }
    }
}
