//! Global functions and primitive methods available to expression code.
//!
//! String positions are counted in characters, not UTF-16 code units.

use varex_domain::value::format_number;
use varex_domain::{EvaluationError, ScriptValue};

static UNDEFINED: ScriptValue = ScriptValue::Undefined;

/// Longest string expression code may build, in bytes.
pub const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

/// Checks the byte length of a string about to be built.
///
/// `None` stands for a length that overflowed while being computed.
pub fn checked_length(len: Option<usize>) -> Result<usize, EvaluationError> {
    len.filter(|len| *len <= MAX_STRING_LENGTH)
        .ok_or_else(|| EvaluationError::runtime("RangeError", "Invalid string length"))
}

/// A native function reachable from expression code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `encodeURIComponent(s)`
    EncodeUriComponent,
    /// `decodeURIComponent(s)`
    DecodeUriComponent,
    /// `String(v)`
    String,
    /// `Number(v)`
    Number,
    /// `parseInt(s, radix?)`
    ParseInt,
    /// `parseFloat(s)`
    ParseFloat,
    /// `Math.floor(x)`
    Floor,
    /// `Math.ceil(x)`
    Ceil,
    /// `Math.round(x)`
    Round,
    /// `Math.min(...xs)`
    Min,
    /// `Math.max(...xs)`
    Max,
    /// `Math.abs(x)`
    Abs,
}

impl Builtin {
    /// Looks up a global function by name.
    #[must_use]
    pub fn global(name: &str) -> Option<Self> {
        match name {
            "encodeURIComponent" => Some(Self::EncodeUriComponent),
            "decodeURIComponent" => Some(Self::DecodeUriComponent),
            "String" => Some(Self::String),
            "Number" => Some(Self::Number),
            "parseInt" => Some(Self::ParseInt),
            "parseFloat" => Some(Self::ParseFloat),
            _ => None,
        }
    }

    /// Looks up a member of `Math` by name.
    #[must_use]
    pub fn math(name: &str) -> Option<Self> {
        match name {
            "floor" => Some(Self::Floor),
            "ceil" => Some(Self::Ceil),
            "round" => Some(Self::Round),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    /// Name the function is known by.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EncodeUriComponent => "encodeURIComponent",
            Self::DecodeUriComponent => "decodeURIComponent",
            Self::String => "String",
            Self::Number => "Number",
            Self::ParseInt => "parseInt",
            Self::ParseFloat => "parseFloat",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
            Self::Abs => "abs",
        }
    }

    /// Calls the function.
    ///
    /// # Errors
    ///
    /// `decodeURIComponent` fails with a `URIError` on malformed input.
    pub fn call(self, args: &[ScriptValue]) -> Result<ScriptValue, EvaluationError> {
        let value = match self {
            Self::EncodeUriComponent => {
                ScriptValue::String(encode_uri_component(&string_arg(args, 0)))
            }
            Self::DecodeUriComponent => {
                let input = string_arg(args, 0);
                let decoded = urlencoding::decode(&input)
                    .map_err(|_| EvaluationError::runtime("URIError", "URI malformed"))?;
                ScriptValue::String(decoded.into_owned())
            }
            Self::String => ScriptValue::String(
                args.first()
                    .map(ScriptValue::to_display_string)
                    .unwrap_or_default(),
            ),
            Self::Number => ScriptValue::Number(args.first().map_or(0.0, ScriptValue::to_number)),
            Self::ParseInt => {
                let radix = args.get(1).filter(|r| !r.is_nullish()).map(ScriptValue::to_number);
                ScriptValue::Number(parse_int(&string_arg(args, 0), radix))
            }
            Self::ParseFloat => ScriptValue::Number(parse_float(&string_arg(args, 0))),
            Self::Floor => ScriptValue::Number(arg(args, 0).to_number().floor()),
            Self::Ceil => ScriptValue::Number(arg(args, 0).to_number().ceil()),
            Self::Round => ScriptValue::Number(round(arg(args, 0).to_number())),
            Self::Abs => ScriptValue::Number(arg(args, 0).to_number().abs()),
            Self::Min => ScriptValue::Number(fold_numbers(args, f64::INFINITY, f64::min)),
            Self::Max => ScriptValue::Number(fold_numbers(args, f64::NEG_INFINITY, f64::max)),
        };
        Ok(value)
    }
}

/// Numeric members of `Math`.
#[must_use]
pub fn math_constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn arg(args: &[ScriptValue], index: usize) -> &ScriptValue {
    args.get(index).unwrap_or(&UNDEFINED)
}

fn string_arg(args: &[ScriptValue], index: usize) -> String {
    arg(args, index).to_display_string()
}

/// `ToIntegerOrInfinity`, saturated to `i64`; `undefined` yields `default`.
fn integer_arg(args: &[ScriptValue], index: usize, default: i64) -> i64 {
    match arg(args, index) {
        ScriptValue::Undefined => default,
        value => {
            let n = value.to_number();
            if n.is_nan() { 0 } else { n.trunc() as i64 }
        }
    }
}

fn encode_uri_component(input: &str) -> String {
    // These stay unescaped in encodeURIComponent.
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

fn round(n: f64) -> f64 {
    // Halves round towards positive infinity.
    if n.fract() == -0.5 { n.ceil() } else { n.round() }
}

fn fold_numbers(args: &[ScriptValue], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

fn parse_int(input: &str, radix: Option<f64>) -> f64 {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (mut radix, detect_hex) = match radix {
        None => (10, true),
        Some(r) if r.is_nan() || r.trunc() == 0.0 => (10, true),
        Some(r) => (r.trunc() as i64, r.trunc() == 16.0),
    };
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let mut digits = s;
    if detect_hex {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            digits = hex;
            radix = 16;
        }
    }

    let radix = radix as u32;
    let mut value: Option<f64> = None;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        value = Some(value.unwrap_or(0.0) * f64::from(radix) + f64::from(d));
    }

    match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }
}

fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut saw_digit = false;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        saw_digit = true;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
            saw_digit = true;
        }
    }
    if !saw_digit {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

fn read_error(receiver: &ScriptValue, key: &str) -> EvaluationError {
    EvaluationError::type_error(format_args!(
        "Cannot read properties of {} (reading '{key}')",
        receiver.to_display_string()
    ))
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Reads `receiver[key]` for a plain value.
///
/// # Errors
///
/// Reading any property of `undefined` or `null` is a `TypeError`.
pub fn property(receiver: &ScriptValue, key: &str) -> Result<ScriptValue, EvaluationError> {
    let value = match receiver {
        ScriptValue::Undefined | ScriptValue::Null => return Err(read_error(receiver, key)),
        ScriptValue::String(s) => {
            if key == "length" {
                ScriptValue::Number(s.chars().count() as f64)
            } else {
                array_index(key)
                    .and_then(|i| s.chars().nth(i))
                    .map_or(ScriptValue::Undefined, |c| ScriptValue::String(c.to_string()))
            }
        }
        ScriptValue::Array(items) => {
            if key == "length" {
                ScriptValue::Number(items.len() as f64)
            } else {
                array_index(key)
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or_default()
            }
        }
        ScriptValue::Object(map) => map.get(key).cloned().unwrap_or_default(),
        ScriptValue::Bool(_) | ScriptValue::Number(_) => ScriptValue::Undefined,
    };
    Ok(value)
}

/// Calls `receiver.name(...args)` for a plain value.
///
/// Returns `Ok(None)` when the receiver has no such method.
///
/// # Errors
///
/// Calling a method on `undefined` or `null` is a `TypeError`; some methods
/// raise a `RangeError` on invalid arguments.
pub fn call_method(
    receiver: &ScriptValue,
    name: &str,
    args: &[ScriptValue],
) -> Result<Option<ScriptValue>, EvaluationError> {
    match receiver {
        ScriptValue::Undefined | ScriptValue::Null => Err(read_error(receiver, name)),
        ScriptValue::String(s) => string_method(s, name, args),
        ScriptValue::Array(items) => array_method(items, name, args),
        ScriptValue::Number(n) => number_method(*n, name, args),
        ScriptValue::Bool(_) | ScriptValue::Object(_) => Ok((name == "toString")
            .then(|| ScriptValue::String(receiver.to_display_string()))),
    }
}

/// Resolves a relative index the way `slice` does.
fn relative(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { (len + index).max(0) } else { index.min(len) };
    resolved as usize
}

fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    if start >= end {
        String::new()
    } else {
        chars[start..end].iter().collect()
    }
}

fn pad(s: &str, args: &[ScriptValue], at_start: bool) -> Result<String, EvaluationError> {
    let target = integer_arg(args, 0, 0).max(0) as usize;
    let fill = match arg(args, 1) {
        ScriptValue::Undefined => " ".to_string(),
        other => other.to_display_string(),
    };
    let len = s.chars().count();
    if target <= len || fill.is_empty() {
        return Ok(s.to_string());
    }

    let needed = target - len;
    let fill_chars = fill.chars().count();
    let partial: usize = fill
        .chars()
        .take(needed % fill_chars)
        .map(char::len_utf8)
        .sum();
    checked_length(
        (needed / fill_chars)
            .checked_mul(fill.len())
            .and_then(|full| full.checked_add(partial))
            .and_then(|padding| padding.checked_add(s.len())),
    )?;

    let padding: String = fill.chars().cycle().take(needed).collect();
    Ok(if at_start {
        format!("{padding}{s}")
    } else {
        format!("{s}{padding}")
    })
}

fn string_method(
    s: &str,
    name: &str,
    args: &[ScriptValue],
) -> Result<Option<ScriptValue>, EvaluationError> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();

    let value = match name {
        "toUpperCase" => ScriptValue::String(s.to_uppercase()),
        "toLowerCase" => ScriptValue::String(s.to_lowercase()),
        "trim" => ScriptValue::String(s.trim().to_string()),
        "trimStart" => ScriptValue::String(s.trim_start().to_string()),
        "trimEnd" => ScriptValue::String(s.trim_end().to_string()),
        "toString" => ScriptValue::String(s.to_string()),
        "startsWith" => ScriptValue::Bool(s.starts_with(&string_arg(args, 0))),
        "endsWith" => ScriptValue::Bool(s.ends_with(&string_arg(args, 0))),
        "includes" => ScriptValue::Bool(s.contains(&string_arg(args, 0))),
        "indexOf" => {
            let position = s
                .find(&string_arg(args, 0))
                .map_or(-1.0, |byte| s[..byte].chars().count() as f64);
            ScriptValue::Number(position)
        }
        "charAt" => {
            let index = integer_arg(args, 0, 0);
            let c = usize::try_from(index).ok().and_then(|i| chars.get(i));
            ScriptValue::String(c.map(char::to_string).unwrap_or_default())
        }
        "slice" => {
            let start = relative(integer_arg(args, 0, 0), len);
            let end = relative(integer_arg(args, 1, len as i64), len);
            ScriptValue::String(char_slice(&chars, start, end))
        }
        "substring" => {
            let clamp = |i: i64| i.clamp(0, len as i64) as usize;
            let start = clamp(integer_arg(args, 0, 0));
            let end = clamp(integer_arg(args, 1, len as i64));
            ScriptValue::String(char_slice(&chars, start.min(end), start.max(end)))
        }
        "replace" => ScriptValue::String(s.replacen(
            &string_arg(args, 0),
            &string_arg(args, 1),
            1,
        )),
        "replaceAll" => {
            let pattern = string_arg(args, 0);
            let replacement = string_arg(args, 1);
            if pattern.is_empty() {
                checked_length(
                    (len + 1)
                        .checked_mul(replacement.len())
                        .and_then(|inserted| inserted.checked_add(s.len())),
                )?;
                let mut out = replacement.clone();
                for c in &chars {
                    out.push(*c);
                    out.push_str(&replacement);
                }
                ScriptValue::String(out)
            } else {
                ScriptValue::String(s.replace(&pattern, &replacement))
            }
        }
        "split" => {
            let parts: Vec<ScriptValue> = match arg(args, 0) {
                ScriptValue::Undefined => vec![ScriptValue::String(s.to_string())],
                separator => {
                    let separator = separator.to_display_string();
                    if separator.is_empty() {
                        chars.iter().map(|c| ScriptValue::String(c.to_string())).collect()
                    } else {
                        s.split(separator.as_str())
                            .map(|p| ScriptValue::String(p.to_string()))
                            .collect()
                    }
                }
            };
            let limit = match arg(args, 1) {
                ScriptValue::Undefined => parts.len(),
                _ => usize::try_from(integer_arg(args, 1, 0)).unwrap_or(0),
            };
            ScriptValue::Array(parts.into_iter().take(limit).collect())
        }
        "padStart" => ScriptValue::String(pad(s, args, true)?),
        "padEnd" => ScriptValue::String(pad(s, args, false)?),
        "repeat" => {
            let count = arg(args, 0).to_number();
            if count < 0.0 || count.is_infinite() {
                return Err(EvaluationError::runtime(
                    "RangeError",
                    format_args!("Invalid count value: {}", format_number(count)),
                ));
            }
            let count = usize::try_from(integer_arg(args, 0, 0)).unwrap_or(0);
            checked_length(s.len().checked_mul(count))?;
            ScriptValue::String(s.repeat(count))
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                let piece = value.to_display_string();
                checked_length(out.len().checked_add(piece.len()))?;
                out.push_str(&piece);
            }
            ScriptValue::String(out)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn same_value_zero(a: &ScriptValue, b: &ScriptValue) -> bool {
    match (a, b) {
        (ScriptValue::Number(x), ScriptValue::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_eq(b),
    }
}

fn array_method(
    items: &[ScriptValue],
    name: &str,
    args: &[ScriptValue],
) -> Result<Option<ScriptValue>, EvaluationError> {
    let value = match name {
        "join" => {
            let separator = match arg(args, 0) {
                ScriptValue::Undefined => ",".to_string(),
                other => other.to_display_string(),
            };
            let pieces: Vec<String> = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect();
            let separators = separator.len().checked_mul(pieces.len().saturating_sub(1));
            checked_length(
                pieces
                    .iter()
                    .try_fold(0usize, |total, piece| total.checked_add(piece.len()))
                    .zip(separators)
                    .and_then(|(text, separators)| text.checked_add(separators)),
            )?;
            ScriptValue::String(pieces.join(&separator))
        }
        "toString" => ScriptValue::String(ScriptValue::Array(items.to_vec()).to_display_string()),
        "includes" => ScriptValue::Bool(items.iter().any(|item| same_value_zero(item, arg(args, 0)))),
        "indexOf" => ScriptValue::Number(
            items
                .iter()
                .position(|item| item.strict_eq(arg(args, 0)))
                .map_or(-1.0, |i| i as f64),
        ),
        "concat" => {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    ScriptValue::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            ScriptValue::Array(out)
        }
        "slice" => {
            let start = relative(integer_arg(args, 0, 0), items.len());
            let end = relative(integer_arg(args, 1, items.len() as i64), items.len());
            ScriptValue::Array(if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn number_method(
    n: f64,
    name: &str,
    args: &[ScriptValue],
) -> Result<Option<ScriptValue>, EvaluationError> {
    let value = match name {
        "toFixed" => {
            let digits = integer_arg(args, 0, 0);
            if !(0..=100).contains(&digits) {
                return Err(EvaluationError::runtime(
                    "RangeError",
                    "toFixed() digits argument must be between 0 and 100",
                ));
            }
            if !n.is_finite() || n.abs() >= 1e21 {
                ScriptValue::String(format_number(n))
            } else {
                ScriptValue::String(format!("{n:.precision$}", precision = digits as usize))
            }
        }
        "toString" => {
            let radix = integer_arg(args, 0, 10);
            if !(2..=36).contains(&radix) {
                return Err(EvaluationError::runtime(
                    "RangeError",
                    "toString() radix must be between 2 and 36",
                ));
            }
            if radix == 10 || !n.is_finite() {
                ScriptValue::String(format_number(n))
            } else {
                ScriptValue::String(integer_to_radix(n.trunc(), radix as u32))
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Integer part of `n` in the given radix.
fn integer_to_radix(n: f64, radix: u32) -> String {
    let negative = n < 0.0;
    let mut magnitude = n.abs() as u128;
    if magnitude == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while magnitude > 0 {
        let d = (magnitude % u128::from(radix)) as u32;
        digits.push(char::from_digit(d, radix).unwrap_or('0'));
        magnitude /= u128::from(radix);
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(value: &str) -> ScriptValue {
        ScriptValue::string(value)
    }

    fn n(value: f64) -> ScriptValue {
        ScriptValue::Number(value)
    }

    fn call(receiver: &ScriptValue, name: &str, args: &[ScriptValue]) -> ScriptValue {
        call_method(receiver, name, args)
            .expect("call should succeed")
            .expect("method should exist")
    }

    #[test]
    fn test_uri_component_round_trip_keeps_unreserved_marks() {
        let encoded = Builtin::EncodeUriComponent
            .call(&[s("a b&c=d/é!*'()")])
            .unwrap();
        assert_eq!(encoded, s("a%20b%26c%3Dd%2F%C3%A9!*'()"));

        let decoded = Builtin::DecodeUriComponent.call(&[encoded]).unwrap();
        assert_eq!(decoded, s("a b&c=d/é!*'()"));
    }

    #[test]
    fn test_number_parsing_globals() {
        assert_eq!(Builtin::ParseInt.call(&[s("  42px")]).unwrap(), n(42.0));
        assert_eq!(Builtin::ParseInt.call(&[s("-0x1A")]).unwrap(), n(-26.0));
        assert_eq!(Builtin::ParseInt.call(&[s("101"), n(2.0)]).unwrap(), n(5.0));
        assert_eq!(Builtin::ParseFloat.call(&[s("3.5e2abc")]).unwrap(), n(350.0));
        assert_eq!(Builtin::Number.call(&[s(" 12 ")]).unwrap(), n(12.0));
        assert_eq!(Builtin::String.call(&[n(2.5)]).unwrap(), s("2.5"));

        let nan = Builtin::ParseInt.call(&[s("px")]).unwrap();
        assert!(nan.to_number().is_nan());
    }

    #[test]
    fn test_math() {
        assert_eq!(Builtin::Round.call(&[n(2.5)]).unwrap(), n(3.0));
        assert_eq!(Builtin::Round.call(&[n(-2.5)]).unwrap(), n(-2.0));
        assert_eq!(Builtin::Floor.call(&[s("7.9")]).unwrap(), n(7.0));
        assert_eq!(Builtin::Max.call(&[n(1.0), n(9.0), n(4.0)]).unwrap(), n(9.0));
        assert_eq!(Builtin::Min.call(&[]).unwrap(), n(f64::INFINITY));
        assert!(Builtin::Min.call(&[n(1.0), s("x")]).unwrap().to_number().is_nan());
    }

    #[test]
    fn test_string_methods() {
        let text = s("2023-01-31");
        assert_eq!(call(&text, "slice", &[n(0.0), n(4.0)]), s("2023"));
        assert_eq!(call(&text, "slice", &[n(-2.0)]), s("31"));
        assert_eq!(call(&text, "substring", &[n(7.0), n(5.0)]), s("01"));
        assert_eq!(call(&text, "replaceAll", &[s("-"), s("")]), s("20230131"));
        assert_eq!(call(&text, "replace", &[s("-"), s("/")]), s("2023/01-31"));
        assert_eq!(call(&text, "indexOf", &[s("01")]), n(5.0));
        assert_eq!(
            call(&text, "split", &[s("-")]),
            ScriptValue::Array(vec![s("2023"), s("01"), s("31")])
        );
        assert_eq!(call(&s("7"), "padStart", &[n(3.0), s("0")]), s("007"));
        assert_eq!(call(&s("ab"), "repeat", &[n(2.0)]), s("abab"));
        assert_eq!(property(&text, "length").unwrap(), n(10.0));
        assert_eq!(call_method(&text, "map", &[]).unwrap(), None);
    }

    #[test]
    fn test_string_length_limit() {
        let too_long = |result: Result<Option<ScriptValue>, EvaluationError>| {
            assert_eq!(
                result.unwrap_err().to_string(),
                "RangeError: Invalid string length"
            );
        };

        too_long(call_method(&s("ab"), "repeat", &[n(9_007_199_254_740_991.0)]));
        too_long(call_method(&s("ab"), "repeat", &[n((MAX_STRING_LENGTH / 2 + 1) as f64)]));
        too_long(call_method(&s("a"), "padStart", &[n(1e19)]));
        too_long(call_method(&s("a"), "padEnd", &[n(1e19), s("é")]));

        assert_eq!(call(&s("x"), "repeat", &[n(0.0)]), s(""));
        assert_eq!(call(&s("5"), "padEnd", &[n(4.0), s("é")]), s("5ééé"));
        assert!(call_method(&s("ab"), "repeat", &[n(-1.0)]).is_err());
    }

    #[test]
    fn test_array_methods() {
        let items = ScriptValue::Array(vec![s("a"), n(1.0), ScriptValue::Null]);
        assert_eq!(call(&items, "join", &[s("/")]), s("a/1/"));
        assert_eq!(call(&items, "indexOf", &[n(1.0)]), n(1.0));
        assert_eq!(call(&items, "includes", &[s("b")]), ScriptValue::Bool(false));
        assert_eq!(property(&items, "0").unwrap(), s("a"));
        assert_eq!(property(&items, "01").unwrap(), ScriptValue::Undefined);
    }

    #[test]
    fn test_number_methods() {
        assert_eq!(call(&n(1.5), "toFixed", &[n(2.0)]), s("1.50"));
        assert_eq!(call(&n(255.0), "toString", &[n(16.0)]), s("ff"));
        assert!(call_method(&n(1.0), "toFixed", &[n(101.0)]).is_err());
    }

    #[test]
    fn test_nullish_receivers_raise_type_errors() {
        let err = property(&ScriptValue::Undefined, "name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Cannot read properties of undefined (reading 'name')"
        );
        assert!(call_method(&ScriptValue::Null, "trim", &[]).is_err());
    }
}
