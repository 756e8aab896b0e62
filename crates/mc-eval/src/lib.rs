#![forbid(unsafe_code)]

use mc_ast::{BinaryOp, Expr, Function, UnaryOp, constant_value};
use mc_parse::{ParseError, normalize, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric-safety bounds for a single evaluation.
///
/// These are build-time constants in spirit: `Default` is the
/// configuration the chat surface ships with, and nothing reads them from
/// the environment. Every literal, intermediate, and final result is held
/// under `max_number`; the remaining fields bound the operations whose
/// cost or output grows faster than their input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalLimits {
    /// Longest accepted input, in bytes, checked before any parsing.
    pub max_input_len: usize,
    /// Magnitude ceiling for every literal, intermediate, and result.
    pub max_number: f64,
    /// Exponent magnitude ceiling for `^` and two-argument `pow`.
    pub max_exponent: f64,
    /// Largest permitted `factorial` argument.
    pub max_factorial: f64,
    /// Exponent ceiling for three-argument modular `pow`. Deliberately
    /// wider than `max_exponent`: square-and-multiply keeps the cost
    /// logarithmic and the result below the modulus.
    pub max_mod_exponent: f64,
    /// Magnitude ceiling on base and modulus in modular `pow`.
    pub max_mod_operand: f64,
    /// Nesting ceiling enforced by the validation walk.
    pub max_depth: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_input_len: 1_000,
            max_number: 1e300,
            max_exponent: 100.0,
            max_factorial: 100.0,
            max_mod_exponent: 100_000.0,
            max_mod_operand: 1e9,
            max_depth: 100,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    EmptyInput,
    #[error("expression is too long ({len} bytes, limit {max})")]
    InputTooLong { len: usize, max: usize },
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unsupported construct: {0}")]
    UnsupportedOperation(String),
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),
    #[error("unknown constant: {0}")]
    UnknownIdentifier(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("exponent {exponent} exceeds the limit of {max}")]
    ExponentTooLarge { exponent: f64, max: f64 },
    #[error("number {value} exceeds the magnitude limit")]
    NumberTooLarge { value: f64 },
    #[error("intermediate result exceeds the magnitude limit")]
    ResultTooLarge,
    #[error("result is not a finite number")]
    NonFiniteResult,
    #[error("{func} expects {expected} argument(s), found {found}")]
    Arity {
        func: String,
        expected: String,
        found: usize,
    },
    #[error("domain error: {0}")]
    Domain(String),
}

impl From<ParseError> for EvalError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Syntax(msg) => Self::Syntax(msg),
            ParseError::UnsupportedOperation(msg) => Self::UnsupportedOperation(msg),
            ParseError::UnsupportedArgument(msg) => Self::UnsupportedArgument(msg),
        }
    }
}

/// Discriminant-only view of `EvalError`, for transcripts and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalErrorKind {
    EmptyInput,
    InputTooLong,
    Syntax,
    UnsupportedOperation,
    UnsupportedArgument,
    UnknownIdentifier,
    UnknownFunction,
    DivisionByZero,
    ExponentTooLarge,
    NumberTooLarge,
    ResultTooLarge,
    NonFiniteResult,
    Arity,
    Domain,
}

impl EvalError {
    #[must_use]
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            Self::EmptyInput => EvalErrorKind::EmptyInput,
            Self::InputTooLong { .. } => EvalErrorKind::InputTooLong,
            Self::Syntax(_) => EvalErrorKind::Syntax,
            Self::UnsupportedOperation(_) => EvalErrorKind::UnsupportedOperation,
            Self::UnsupportedArgument(_) => EvalErrorKind::UnsupportedArgument,
            Self::UnknownIdentifier(_) => EvalErrorKind::UnknownIdentifier,
            Self::UnknownFunction(_) => EvalErrorKind::UnknownFunction,
            Self::DivisionByZero => EvalErrorKind::DivisionByZero,
            Self::ExponentTooLarge { .. } => EvalErrorKind::ExponentTooLarge,
            Self::NumberTooLarge { .. } => EvalErrorKind::NumberTooLarge,
            Self::ResultTooLarge => EvalErrorKind::ResultTooLarge,
            Self::NonFiniteResult => EvalErrorKind::NonFiniteResult,
            Self::Arity { .. } => EvalErrorKind::Arity,
            Self::Domain(_) => EvalErrorKind::Domain,
        }
    }
}

/// Evaluate an untrusted expression string under the default limits.
///
/// Total over arbitrary input: every failure mode is an `EvalError`
/// variant, nothing panics, and each call is stateless and reentrant.
pub fn evaluate(input: &str) -> Result<String, EvalError> {
    evaluate_with_limits(input, &EvalLimits::default())
}

pub fn evaluate_with_limits(input: &str, limits: &EvalLimits) -> Result<String, EvalError> {
    if input.len() > limits.max_input_len {
        return Err(EvalError::InputTooLong {
            len: input.len(),
            max: limits.max_input_len,
        });
    }
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    let normalized = normalize(trimmed);
    let expr = parse(&normalized)?;
    validate(&expr, limits)?;
    let value = eval_expr(&expr, limits)?;
    format_result(value)
}

/// The mandatory structural check from the safety contract.
///
/// The grammar already guarantees that only the five permitted node kinds
/// exist, so what remains to verify is that the tree stays within the
/// nesting bound. This runs inside `evaluate_with_limits` even when the
/// classifier already vetted the same string — the evaluator must be safe
/// when invoked directly.
pub fn validate(expr: &Expr, limits: &EvalLimits) -> Result<(), EvalError> {
    let depth = expr.depth();
    if depth > limits.max_depth {
        return Err(EvalError::Syntax(format!(
            "expression nests too deeply (depth {depth}, limit {})",
            limits.max_depth
        )));
    }
    Ok(())
}

fn eval_expr(expr: &Expr, limits: &EvalLimits) -> Result<f64, EvalError> {
    match expr {
        Expr::Number { value } => {
            if value.abs() > limits.max_number {
                return Err(EvalError::NumberTooLarge { value: *value });
            }
            Ok(*value)
        }
        Expr::Ident { name } => {
            constant_value(name).ok_or_else(|| EvalError::UnknownIdentifier(name.clone()))
        }
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, limits)?;
            Ok(match op {
                UnaryOp::Neg => -value,
                UnaryOp::Plus => value,
            })
        }
        Expr::Binary { op, left, right } => {
            let lhs = eval_expr(left, limits)?;
            let rhs = eval_expr(right, limits)?;
            apply_binary(*op, lhs, rhs, limits)
        }
        Expr::Call { func, args } => {
            let function = Function::from_name(func)
                .ok_or_else(|| EvalError::UnknownFunction(func.clone()))?;
            check_arity(function, args.len())?;
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, limits))
                .collect::<Result<Vec<_>, _>>()?;
            apply_function(function, &values, limits)
        }
    }
}

fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64, limits: &EvalLimits) -> Result<f64, EvalError> {
    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => {
            if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs / rhs
        }
        BinaryOp::Rem => {
            if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            sign_of_divisor_rem(lhs, rhs)
        }
        BinaryOp::Pow => power(lhs, rhs, limits)?,
    };
    check_magnitude(value, limits)
}

/// Remainder with the sign of the divisor, the convention of the chat
/// frontend's source language: `-7 % 3 == 2`, `7 % -3 == -2`.
fn sign_of_divisor_rem(lhs: f64, rhs: f64) -> f64 {
    let rem = lhs % rhs;
    if rem != 0.0 && (rem < 0.0) != (rhs < 0.0) {
        rem + rhs
    } else {
        rem
    }
}

fn power(base: f64, exponent: f64, limits: &EvalLimits) -> Result<f64, EvalError> {
    if exponent.abs() > limits.max_exponent {
        return Err(EvalError::ExponentTooLarge {
            exponent,
            max: limits.max_exponent,
        });
    }
    Ok(base.powf(exponent))
}

fn check_arity(function: Function, found: usize) -> Result<(), EvalError> {
    if function.accepts_arity(found) {
        return Ok(());
    }
    let expected = match function.arity() {
        (lo, Some(hi)) if lo == hi => lo.to_string(),
        (lo, Some(hi)) => format!("{lo} to {hi}"),
        (lo, None) => format!("at least {lo}"),
    };
    Err(EvalError::Arity {
        func: function.name().to_owned(),
        expected,
        found,
    })
}

fn apply_function(function: Function, args: &[f64], limits: &EvalLimits) -> Result<f64, EvalError> {
    let value = match function {
        Function::Sqrt => {
            let arg = args[0];
            if arg < 0.0 {
                return Err(EvalError::Domain(
                    "square root of a negative number".to_owned(),
                ));
            }
            arg.sqrt()
        }
        Function::Abs => args[0].abs(),
        Function::Round => round_call(args)?,
        Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Function::Pow => {
            if args.len() == 2 {
                power(args[0], args[1], limits)?
            } else {
                modular_power(args[0], args[1], args[2], limits)?
            }
        }
        Function::Factorial => factorial(args[0], limits)?,
    };
    check_magnitude(value, limits)
}

fn round_call(args: &[f64]) -> Result<f64, EvalError> {
    let value = args[0];
    let Some(&digits) = args.get(1) else {
        return Ok(value.round());
    };
    if digits.trunc() != digits || digits.abs() > 15.0 {
        return Err(EvalError::Domain(
            "round digits must be a whole number between -15 and 15".to_owned(),
        ));
    }
    let factor = 10f64.powi(digits as i32);
    Ok((value * factor).round() / factor)
}

fn factorial(arg: f64, limits: &EvalLimits) -> Result<f64, EvalError> {
    if arg.trunc() != arg {
        return Err(EvalError::Domain(
            "factorial of a non-integer".to_owned(),
        ));
    }
    if arg < 0.0 {
        return Err(EvalError::Domain(
            "factorial of a negative number".to_owned(),
        ));
    }
    if arg > limits.max_factorial {
        return Err(EvalError::Domain(format!(
            "factorial argument exceeds the limit of {}",
            limits.max_factorial
        )));
    }
    let n = arg as u32;
    let mut product = 1.0_f64;
    for i in 2..=n {
        product *= f64::from(i);
    }
    Ok(product)
}

/// Three-argument `pow`: modular exponentiation over whole numbers.
///
/// Square-and-multiply with the accumulator reduced every step, so the
/// wider exponent bound stays cheap and nothing leaves i128 range.
fn modular_power(
    base: f64,
    exponent: f64,
    modulus: f64,
    limits: &EvalLimits,
) -> Result<f64, EvalError> {
    if base.trunc() != base || exponent.trunc() != exponent || modulus.trunc() != modulus {
        return Err(EvalError::Domain(
            "modular pow requires whole-number arguments".to_owned(),
        ));
    }
    if base.abs() > limits.max_mod_operand || modulus.abs() > limits.max_mod_operand {
        return Err(EvalError::Domain(format!(
            "modular pow base and modulus must stay within {}",
            limits.max_mod_operand
        )));
    }
    if exponent < 0.0 {
        return Err(EvalError::Domain(
            "modular pow does not support negative exponents".to_owned(),
        ));
    }
    if exponent > limits.max_mod_exponent {
        return Err(EvalError::ExponentTooLarge {
            exponent,
            max: limits.max_mod_exponent,
        });
    }
    if modulus == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    let modulus = modulus as i128;
    let mut base = (base as i128).rem_euclid(modulus.abs());
    let mut exponent = exponent as u64;
    let mut result: i128 = 1;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = (result * base).rem_euclid(modulus.abs());
        }
        base = (base * base).rem_euclid(modulus.abs());
        exponent >>= 1;
    }
    // Remainder carries the divisor's sign, as with `%`.
    if modulus < 0 && result != 0 {
        result += modulus;
    }
    Ok(result as f64)
}

fn check_magnitude(value: f64, limits: &EvalLimits) -> Result<f64, EvalError> {
    if value.abs() > limits.max_number {
        return Err(EvalError::ResultTooLarge);
    }
    Ok(value)
}

/// Render a finite result: whole values as plain integers, everything
/// else rounded to 10 significant digits with trailing noise trimmed.
fn format_result(value: f64) -> Result<String, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFiniteResult);
    }
    if value == 0.0 {
        return Ok("0".to_owned());
    }
    if value.trunc() == value {
        return Ok(format!("{value:.0}"));
    }
    let rounded = round_significant(value);
    if rounded.trunc() == rounded && rounded.abs() < 1e15 {
        return Ok(format!("{rounded:.0}"));
    }
    if rounded.abs() >= 1e-9 && rounded.abs() < 1e15 {
        return Ok(format!("{rounded}"));
    }
    Ok(scientific_trimmed(rounded))
}

/// Round to 10 significant digits by a decimal round-trip; immune to the
/// overflow a power-of-ten scale factor would hit near the f64 extremes.
fn round_significant(value: f64) -> f64 {
    format!("{value:.9e}").parse().unwrap_or(value)
}

fn scientific_trimmed(value: f64) -> String {
    let formatted = format!("{value:.9e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
            format!("{mantissa}e{exponent}")
        }
        None => formatted,
    }
}

const HELP_TEXT: &str = "\
I can evaluate math expressions directly in chat.\n\
Operators: + - * / % ^ (the display forms ×, ÷, √, and ** work too)\n\
Functions: sqrt(x), abs(x), round(x), round(x, digits), min(a, ...), \
max(a, ...), pow(base, exp), pow(base, exp, modulus), factorial(n)\n\
Constants: pi, e, tau\n\
Examples: 2 + 2 * 3, sqrt(16), 2^10, factorial(5), round(10 / 3, 2)";

/// Static reference card for the calculator: operators, functions, and
/// constants, suitable for embedding in a chat reply.
#[must_use]
pub fn calculator_help() -> &'static str {
    HELP_TEXT
}

#[cfg(test)]
mod tests {
    use super::{EvalError, EvalErrorKind, EvalLimits, evaluate, evaluate_with_limits};

    #[test]
    fn whole_results_format_as_integers() {
        assert_eq!(evaluate("2 + 2").expect("eval"), "4");
        assert_eq!(evaluate("2^10").expect("eval"), "1024");
        assert_eq!(evaluate("sqrt(16)").expect("eval"), "4");
        assert_eq!(evaluate("factorial(5)").expect("eval"), "120");
    }

    #[test]
    fn fractional_results_keep_ten_significant_digits() {
        assert_eq!(evaluate("10 / 4").expect("eval"), "2.5");
        assert_eq!(evaluate("pi").expect("eval"), "3.141592654");
        assert_eq!(evaluate("0.1 + 0.2").expect("eval"), "0.3");
        assert_eq!(evaluate("1 / 3").expect("eval"), "0.3333333333");
    }

    #[test]
    fn tau_is_twice_pi() {
        assert_eq!(evaluate("tau / 2").expect("eval"), evaluate("pi").expect("eval"));
    }

    #[test]
    fn display_symbols_normalize_before_parsing() {
        assert_eq!(evaluate("10 × 4 ÷ 8").expect("eval"), "5");
        assert_eq!(evaluate("√(16)").expect("eval"), "4");
        assert_eq!(evaluate("7 − 3").expect("eval"), "4");
    }

    #[test]
    fn precedence_and_unary_follow_the_grammar() {
        assert_eq!(evaluate("2 + 3 * 4").expect("eval"), "14");
        assert_eq!(evaluate("-2^2").expect("eval"), "-4");
        assert_eq!(evaluate("(-2)^2").expect("eval"), "4");
        assert_eq!(evaluate("2^3^2").expect("eval"), "512");
        assert_eq!(evaluate("+5").expect("eval"), "5");
    }

    #[test]
    fn remainder_takes_the_sign_of_the_divisor() {
        assert_eq!(evaluate("7 % 3").expect("eval"), "1");
        assert_eq!(evaluate("-7 % 3").expect("eval"), "2");
        assert_eq!(evaluate("7 % -3").expect("eval"), "-2");
    }

    #[test]
    fn division_and_modulo_by_zero_are_rejected() {
        assert_eq!(evaluate("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 % 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("pow(2, 3, 0)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn factorial_domain_is_whole_nonnegative_and_bounded() {
        assert!(matches!(evaluate("factorial(-1)"), Err(EvalError::Domain(_))));
        assert!(matches!(evaluate("factorial(2.5)"), Err(EvalError::Domain(_))));
        assert!(matches!(evaluate("factorial(101)"), Err(EvalError::Domain(_))));
        assert_eq!(evaluate("factorial(0)").expect("eval"), "1");
        // 100! is within the magnitude limit and formats as a full integer.
        let value = evaluate("factorial(100)").expect("eval");
        assert_eq!(value.len(), 158);
        assert!(value.starts_with("9332621544"));
    }

    #[test]
    fn exponent_limits_apply_to_caret_and_pow() {
        assert!(matches!(
            evaluate("2^101"),
            Err(EvalError::ExponentTooLarge { .. })
        ));
        assert!(matches!(
            evaluate("2 ^ -101"),
            Err(EvalError::ExponentTooLarge { .. })
        ));
        assert!(matches!(
            evaluate("pow(2, 101)"),
            Err(EvalError::ExponentTooLarge { .. })
        ));
        assert_eq!(evaluate("pow(2, 10)").expect("eval"), "1024");
        assert_eq!(evaluate("2^100").expect("eval"), evaluate("pow(2, 100)").expect("eval"));
    }

    #[test]
    fn modular_pow_takes_the_wider_exponent_bound() {
        assert_eq!(evaluate("pow(2, 10, 1000)").expect("eval"), "24");
        assert_eq!(evaluate("pow(2, 100000, 9)").expect("eval"), "7");
        assert_eq!(evaluate("pow(-2, 3, 5)").expect("eval"), "2");
        assert_eq!(evaluate("pow(2, 3, -5)").expect("eval"), "-2");
        assert!(matches!(
            evaluate("pow(2, 100001, 9)"),
            Err(EvalError::ExponentTooLarge { .. })
        ));
        assert!(matches!(evaluate("pow(2.5, 2, 7)"), Err(EvalError::Domain(_))));
        assert!(matches!(evaluate("pow(2, -1, 7)"), Err(EvalError::Domain(_))));
        assert!(matches!(
            evaluate("pow(2000000000, 2, 7)"),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn min_max_round_cover_their_contracts() {
        assert_eq!(evaluate("min(3, 1, 2)").expect("eval"), "1");
        assert_eq!(evaluate("max(3, 1, 2)").expect("eval"), "3");
        assert_eq!(evaluate("round(2.4)").expect("eval"), "2");
        assert_eq!(evaluate("round(2.6)").expect("eval"), "3");
        assert_eq!(evaluate("round(10 / 3, 2)").expect("eval"), "3.33");
        assert!(matches!(evaluate("min()"), Err(EvalError::Arity { .. })));
        assert!(matches!(evaluate("sqrt(1, 2)"), Err(EvalError::Arity { .. })));
        assert!(matches!(evaluate("pow(2)"), Err(EvalError::Arity { .. })));
        assert!(matches!(
            evaluate("round(1.5, 2.5)"),
            Err(EvalError::Domain(_))
        ));
    }

    #[test]
    fn unknown_names_are_distinct_errors() {
        assert_eq!(
            evaluate("notareal_fn(1)"),
            Err(EvalError::UnknownFunction("notareal_fn".to_owned()))
        );
        assert_eq!(
            evaluate("x + 1"),
            Err(EvalError::UnknownIdentifier("x".to_owned()))
        );
    }

    #[test]
    fn code_shaped_input_is_rejected_unexecuted() {
        for input in [
            "__import__('os')",
            "[1, 2, 3]",
            "lambda x: x",
            "os.system",
            "x = 2",
            "1 < 2",
        ] {
            assert!(
                matches!(evaluate(input), Err(EvalError::UnsupportedOperation(_))),
                "expected rejection for {input:?}"
            );
        }
        assert!(matches!(
            evaluate("round(1.5, ndigits=1)"),
            Err(EvalError::UnsupportedArgument(_))
        ));
    }

    #[test]
    fn magnitude_limits_catch_literals_and_results() {
        let big_literal = format!("1{}", "0".repeat(301));
        assert!(matches!(
            evaluate(&big_literal),
            Err(EvalError::NumberTooLarge { .. })
        ));
        let near_limit = format!("1{}", "0".repeat(300));
        assert!(matches!(
            evaluate(&format!("{near_limit} * 10")),
            Err(EvalError::ResultTooLarge)
        ));
        assert!(evaluate(&near_limit).expect("eval").len() >= 300);
    }

    #[test]
    fn non_finite_results_are_reported_not_returned() {
        assert_eq!(evaluate("(-8) ^ 0.5"), Err(EvalError::NonFiniteResult));
        assert!(matches!(evaluate("sqrt(-4)"), Err(EvalError::Domain(_))));
    }

    #[test]
    fn input_length_boundary_is_exact() {
        let limits = EvalLimits::default();
        // Exactly at the limit: a valid expression padded with spaces.
        let padded = format!("{}{}", "1+1", " ".repeat(limits.max_input_len - 3));
        assert_eq!(padded.len(), limits.max_input_len);
        assert_eq!(evaluate_with_limits(&padded, &limits).expect("eval"), "2");
        // One byte over fails fast, regardless of content.
        let over = " ".repeat(limits.max_input_len + 1);
        assert_eq!(
            evaluate_with_limits(&over, &limits),
            Err(EvalError::InputTooLong {
                len: limits.max_input_len + 1,
                max: limits.max_input_len,
            })
        );
    }

    #[test]
    fn empty_and_blank_input_is_rejected() {
        assert_eq!(evaluate(""), Err(EvalError::EmptyInput));
        assert_eq!(evaluate("   "), Err(EvalError::EmptyInput));
    }

    #[test]
    fn nesting_beyond_the_validation_limit_is_rejected() {
        let deep = format!("{}1{}", "min(".repeat(101), ")".repeat(101));
        assert!(matches!(evaluate(&deep), Err(EvalError::Syntax(_))));
        let shallow = format!("{}1{}", "min(".repeat(20), ")".repeat(20));
        assert_eq!(evaluate(&shallow).expect("eval"), "1");
    }

    #[test]
    fn error_kinds_serialize_snake_case() {
        let kind = evaluate("1/0").expect_err("fails").kind();
        assert_eq!(kind, EvalErrorKind::DivisionByZero);
        let json = serde_json::to_string(&kind).expect("serialize");
        assert_eq!(json, "\"division_by_zero\"");
    }

    mod properties {
        use proptest::prelude::*;

        use super::evaluate;

        fn arithmetic_expr() -> impl Strategy<Value = String> {
            let leaf = prop_oneof![
                (0..100i32).prop_map(|n| n.to_string()),
                Just("pi".to_owned()),
                Just("e".to_owned()),
            ];
            leaf.prop_recursive(3, 24, 2, |inner| {
                prop_oneof![
                    (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} + {b})")),
                    (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} - {b})")),
                    (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a} * {b})")),
                    inner.clone().prop_map(|a| format!("-({a})")),
                ]
            })
        }

        proptest! {
            #[test]
            fn evaluation_is_total_and_deterministic(input in ".{0,200}") {
                let first = evaluate(&input);
                let second = evaluate(&input);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn bounded_arithmetic_always_succeeds(expr in arithmetic_expr()) {
                prop_assert!(evaluate(&expr).is_ok(), "failed on {}", expr);
            }
        }
    }
}
