//! Condition parser using nom.
//!
//! Parses filter conditions into an expression tree.
//!
//! # Syntax Overview
//!
//! ```text
//! StockStream.price > 100 and (symbol == 'IBM' or volume < $0:long)
//! ────────┬──────── ┬ ─┬─     ───┬──           ───┬── ┬ ────┬────
//!         │         │  │         │                │   │     │
//!         │         │  │         │                │   │     └── Query parameter ($index:type)
//!         │         │  │         │                │   └── Comparison
//!         │         │  │         │                └── Store column
//!         │         │  │         └── Store column
//!         │         │  └── Constant
//!         │         └── Comparison
//!         └── Stream variable (Stream.attribute)
//! ```
//!
//! Keywords (`and`, `or`, `not`, `is null`, `is not null`, `in`) are case
//! insensitive. Function calls may carry a namespace (`str:concat(a, b)`);
//! the parser accepts them even though the translator rejects them.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, map_opt, map_res, not, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::ast::builders::{and, math, not as negate, or};
use crate::ast::{AttrType, CompareOp, Expr, MathOp, Value};
use crate::error::{CondError, CondResult};

const KEYWORDS: &[&str] = &["and", "or", "not", "is", "null", "in", "true", "false"];

/// Deepest nesting of parentheses, `not` and call arguments the parser accepts.
pub const MAX_DEPTH: usize = 64;

/// Parse a complete condition string.
pub fn parse(input: &str) -> CondResult<Expr> {
    let offset = input.len() - input.trim_start().len();
    let input = input.trim();
    if input.is_empty() {
        return Err(CondError::parse(offset, "Empty condition"));
    }

    match parse_expr(input, 0) {
        Ok((remaining, expr)) => {
            let remaining = remaining.trim_start();
            if remaining.is_empty() {
                Ok(expr)
            } else {
                Err(CondError::parse(
                    offset + input.len() - remaining.len(),
                    format!("Unexpected trailing content: '{}'", remaining),
                ))
            }
        }
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(CondError::parse(
            offset + input.len() - e.input.len(),
            format!("Condition nests deeper than {} levels", MAX_DEPTH),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(CondError::parse(
            offset + input.len() - e.input.len(),
            format!("Parse failed: {:?}", e.code),
        )),
        Err(nom::Err::Incomplete(_)) => Err(CondError::parse(
            offset + input.len(),
            "Unexpected end of input",
        )),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive keyword that is not the prefix of a longer identifier.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    delimited(
        multispace0,
        terminated(tag_no_case(kw), not(satisfy(is_ident_char))),
        multispace0,
    )
}

/// Parse an identifier that is not a keyword.
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let (rest, ident) = recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)?;
    if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(ident)) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)));
    }
    Ok((rest, ident))
}

fn parse_type(input: &str) -> IResult<&str, AttrType> {
    map_opt(take_while1(|c: char| c.is_alphabetic()), AttrType::from_name)(input)
}

/// Optional `::type` annotation on columns and stream variables.
fn parse_type_annotation(input: &str) -> IResult<&str, AttrType> {
    map(opt(preceded(tag("::"), parse_type)), Option::unwrap_or_default)(input)
}

/// Fails hard once `depth` passes [`MAX_DEPTH`], so deep input is an error
/// instead of a stack overflow.
fn check_depth(input: &str, depth: usize) -> IResult<&str, ()> {
    if depth > MAX_DEPTH {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    Ok((input, ()))
}

fn parse_expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = check_depth(input, depth)?;
    parse_or(input, depth)
}

fn parse_or(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_and(input, depth)?;
    let (input, rest) = many0(preceded(keyword("or"), |i| parse_and(i, depth)))(input)?;
    Ok((input, rest.into_iter().fold(first, or)))
}

fn parse_and(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_not(input, depth)?;
    let (input, rest) = many0(preceded(keyword("and"), |i| parse_not(i, depth)))(input)?;
    Ok((input, rest.into_iter().fold(first, and)))
}

fn parse_not(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = check_depth(input, depth)?;
    alt((
        map(preceded(keyword("not"), |i| parse_not(i, depth + 1)), negate),
        |i| parse_postfix(i, depth),
    ))(input)
}

enum Postfix<'a> {
    IsNull,
    IsNotNull,
    In(&'a str),
}

/// `x is null`, `x is not null`, `x in Store`.
fn parse_postfix(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, operand) = parse_compare(input, depth)?;
    let (input, postfix) = opt(alt((
        map(
            tuple((keyword("is"), keyword("not"), keyword("null"))),
            |_| Postfix::IsNotNull,
        ),
        map(pair(keyword("is"), keyword("null")), |_| Postfix::IsNull),
        map(preceded(keyword("in"), parse_identifier), Postfix::In),
    )))(input)?;

    let is_null = |operand: Expr| Expr::IsNull {
        operand: Some(Box::new(operand)),
        stream_id: None,
    };
    let expr = match postfix {
        None => operand,
        Some(Postfix::IsNull) => is_null(operand),
        Some(Postfix::IsNotNull) => negate(is_null(operand)),
        Some(Postfix::In(store)) => Expr::In {
            operand: Box::new(operand),
            store_id: store.to_string(),
        },
    };
    Ok((input, expr))
}

fn parse_compare_op(input: &str) -> IResult<&str, CompareOp> {
    delimited(
        multispace0,
        alt((
            value(CompareOp::Eq, tag("==")),
            value(CompareOp::Ne, tag("!=")),
            value(CompareOp::Ne, tag("<>")),
            value(CompareOp::Gte, tag(">=")),
            value(CompareOp::Lte, tag("<=")),
            value(CompareOp::Eq, tag("=")),
            value(CompareOp::Gt, tag(">")),
            value(CompareOp::Lt, tag("<")),
        )),
        multispace0,
    )(input)
}

fn parse_compare(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, left) = parse_additive(input, depth)?;
    let (input, rest) = opt(pair(parse_compare_op, |i| parse_additive(i, depth)))(input)?;
    let expr = match rest {
        Some((op, right)) => Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        None => left,
    };
    Ok((input, expr))
}

fn parse_additive(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_multiplicative(input, depth)?;
    let (input, rest) = many0(pair(
        delimited(
            multispace0,
            alt((value(MathOp::Add, char('+')), value(MathOp::Sub, char('-')))),
            multispace0,
        ),
        |i| parse_multiplicative(i, depth),
    ))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, (op, right)| math(acc, op, right)),
    ))
}

fn parse_multiplicative(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = parse_primary(input, depth)?;
    let (input, rest) = many0(pair(
        delimited(
            multispace0,
            alt((
                value(MathOp::Mul, char('*')),
                value(MathOp::Div, char('/')),
                value(MathOp::Mod, char('%')),
            )),
            multispace0,
        ),
        |i| parse_primary(i, depth),
    ))(input)?;
    Ok((
        input,
        rest.into_iter()
            .fold(first, |acc, (op, right)| math(acc, op, right)),
    ))
}

fn parse_primary(input: &str, depth: usize) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            delimited(
                char('('),
                |i| parse_expr(i, depth + 1),
                preceded(multispace0, char(')')),
            ),
            parse_number,
            parse_quoted_string,
            map(keyword("true"), |_| literal(Value::Bool(true))),
            map(keyword("false"), |_| literal(Value::Bool(false))),
            map(keyword("null"), |_| literal(Value::Null)),
            parse_param,
            |i| parse_call(i, depth),
            parse_stream_variable,
            parse_column,
        )),
    )(input)
}

fn literal(value: Value) -> Expr {
    let ty = value.natural_type();
    Expr::Constant { value, ty }
}

/// Parse a number. Suffixes: `L` long, `f` float, `d` double.
/// Unsuffixed integers are `int` unless they overflow into `long`;
/// unsuffixed decimals are `double`.
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let (rest, (digits, suffix)) = pair(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        opt(one_of("lLfFdD")),
    )(input)?;

    let decimal = digits.contains('.');
    let parsed = match suffix {
        Some('l' | 'L') if decimal => None,
        Some('l' | 'L') => digits.parse().ok().map(Value::Long),
        Some('f' | 'F') => digits.parse().ok().map(Value::Float),
        Some(_) => digits.parse().ok().map(Value::Double),
        None if decimal => digits.parse().ok().map(Value::Double),
        None => digits
            .parse()
            .map(Value::Int)
            .ok()
            .or_else(|| digits.parse().ok().map(Value::Long)),
    };

    match parsed {
        Some(value) => Ok((rest, literal(value))),
        None => Err(nom::Err::Failure(Error::new(input, ErrorKind::Digit))),
    }
}

/// Parse a single- or double-quoted string.
fn parse_quoted_string(input: &str) -> IResult<&str, Expr> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| literal(Value::String(s.to_string())),
    )(input)
}

/// Parse a query parameter: `$0`, `$1:long`.
fn parse_param(input: &str) -> IResult<&str, Expr> {
    let (input, index) = preceded(char('$'), map_res(digit1, str::parse::<usize>))(input)?;
    let (input, ty) = opt(preceded(char(':'), parse_type))(input)?;
    Ok((
        input,
        Expr::Parameter {
            index,
            ty: ty.unwrap_or_default(),
        },
    ))
}

/// Parse a function call: `name(args)` or `ns:name(args)`.
fn parse_call(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, namespace) = opt(terminated(parse_identifier, char(':')))(input)?;
    let (input, name) = parse_identifier(input)?;
    let (input, _) = preceded(multispace0, char('('))(input)?;
    let (input, args) = separated_list0(preceded(multispace0, char(',')), |i| {
        parse_expr(i, depth + 1)
    })(input)?;
    let (input, _) = preceded(multispace0, char(')'))(input)?;
    Ok((
        input,
        Expr::Function {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            args,
        },
    ))
}

/// Parse a stream variable: `Stream.attribute`.
fn parse_stream_variable(input: &str) -> IResult<&str, Expr> {
    let (input, (stream, attribute)) =
        pair(parse_identifier, preceded(char('.'), parse_identifier))(input)?;
    let (input, ty) = parse_type_annotation(input)?;
    Ok((
        input,
        Expr::StreamVariable {
            id: format!("{}.{}", stream, attribute),
            stream_id: Some(stream.to_string()),
            attribute: attribute.to_string(),
            ty,
        },
    ))
}

/// Parse a bare store column.
fn parse_column(input: &str) -> IResult<&str, Expr> {
    let (input, attribute) = parse_identifier(input)?;
    let (input, ty) = parse_type_annotation(input)?;
    Ok((
        input,
        Expr::StoreVariable {
            store_id: None,
            attribute: attribute.to_string(),
            ty,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::{MAX_DEPTH, parse};
    use crate::ast::builders::*;
    use crate::ast::{AttrType, MathOp, Value};
    use crate::error::CondError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_comparison() {
        let expr = parse("price > 100").unwrap();
        assert_eq!(expr, gt(column("price"), constant(100)));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a = 5 and b = 'x' or c = 7").unwrap();
        assert_eq!(
            expr,
            or(
                and(eq(column("a"), constant(5)), eq(column("b"), constant("x"))),
                eq(column("c"), constant(7)),
            )
        );
    }

    #[test]
    fn test_parentheses() {
        let expr = parse("a = 1 and (b = 2 or c = 3)").unwrap();
        assert_eq!(
            expr,
            and(
                eq(column("a"), constant(1)),
                or(eq(column("b"), constant(2)), eq(column("c"), constant(3))),
            )
        );
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse("a + b * c").unwrap();
        assert_eq!(
            expr,
            math(
                column("a"),
                MathOp::Add,
                math(column("b"), MathOp::Mul, column("c"))
            )
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("a - b - c").unwrap();
        assert_eq!(
            expr,
            math(
                math(column("a"), MathOp::Sub, column("b")),
                MathOp::Sub,
                column("c")
            )
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let expr = parse("NOT a IS NULL AND b Is Not Null").unwrap();
        assert_eq!(
            expr,
            and(not(is_null(column("a"))), not(is_null(column("b"))))
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let expr = parse("order_id = android").unwrap();
        assert_eq!(expr, eq(column("order_id"), column("android")));
    }

    #[test]
    fn test_in_store() {
        let expr = parse("symbol in BlockedSymbols").unwrap();
        assert_eq!(expr, is_in(column("symbol"), "BlockedSymbols"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("5").unwrap(), constant(5));
        assert_eq!(parse("5L").unwrap(), constant(5i64));
        assert_eq!(parse("3000000000").unwrap(), constant(3_000_000_000i64));
        assert_eq!(parse("2.5").unwrap(), constant(2.5f64));
        assert_eq!(parse("2.5f").unwrap(), constant(2.5f32));
        assert_eq!(parse("-7").unwrap(), constant(-7));
        assert!(parse("2.5L").is_err());
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("\"IBM\"").unwrap(), constant("IBM"));
        assert_eq!(parse("true").unwrap(), constant(true));
        assert_eq!(
            parse("null").unwrap(),
            typed_constant(Value::Null, AttrType::Object)
        );
    }

    #[test]
    fn test_stream_variable_and_param() {
        let expr = parse("StockStream.price::double < $1:long").unwrap();
        assert_eq!(
            expr,
            lt(
                stream_var("StockStream", "price", AttrType::Double),
                param(1, AttrType::Long)
            )
        );
    }

    #[test]
    fn test_typed_column() {
        let expr = parse("volume::long >= 10").unwrap();
        assert_eq!(
            expr,
            gte(typed_column("volume", AttrType::Long), constant(10))
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse("upper(name) == 'IBM'").unwrap(),
            eq(call("upper", [column("name")]), constant("IBM"))
        );
        assert_eq!(parse("now()").unwrap(), call("now", []));
        assert_eq!(
            parse("str:concat(a, 'x')").unwrap(),
            ns_call("str", "concat", [column("a"), constant("x")])
        );
    }

    #[test]
    fn test_not_equal_spellings() {
        assert_eq!(parse("a != 1").unwrap(), parse("a <> 1").unwrap());
    }

    #[test]
    fn test_trailing_content() {
        let err = parse("a = 1 b").unwrap_err();
        assert!(matches!(err, CondError::Parse { position: 6, .. }));
    }

    #[test]
    fn test_empty() {
        assert!(matches!(parse("   "), Err(CondError::Parse { .. })));
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let depth = 10_000;
        let nested = format!("{}a = 1{}", "(".repeat(depth), ")".repeat(depth));
        let err = parse(&nested).unwrap_err();
        assert!(matches!(err, CondError::Parse { position: 65, .. }), "{}", err);

        let negated = format!("{}a", "not ".repeat(depth));
        assert!(matches!(parse(&negated), Err(CondError::Parse { .. })));

        let calls = format!("{}a{}", "f(".repeat(depth), ")".repeat(depth));
        assert!(matches!(parse(&calls), Err(CondError::Parse { .. })));
    }

    #[test]
    fn test_nesting_up_to_limit() {
        let depth = MAX_DEPTH;
        let nested = format!("{}a = 1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&nested).unwrap(), eq(column("a"), constant(1)));
    }

    #[test]
    fn test_display_round_trip() {
        let conditions = [
            "(a = 5 and b > 2) or not c is null",
            "x = 2.0 and y < 7L and z >= 1.5f and w != 3000000000",
            "price * 2.0 - -1 > $0:double",
        ];
        for condition in conditions {
            let expr = parse(condition).unwrap();
            assert_eq!(parse(&expr.to_string()).unwrap(), expr, "{}", condition);
        }
    }
}
