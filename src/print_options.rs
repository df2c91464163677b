//! Print options and the coercion of untyped request parameters into them.
//!
//! Request parameters arrive as loosely typed values (query strings are always
//! strings, event payloads may carry JSON numbers or booleans). Each recognized
//! option is coerced into the primitive type of its default; unrecognized keys
//! are dropped.
//!
//! Coercion follows loose scripting-language conversion rules, including the
//! truthy-string rule: any non-empty string, `"false"` included, becomes `true`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Strictly typed options for the print-to-PDF operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub landscape: bool,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub scale: f64,
    /// Paper width in inches.
    pub paper_width: f64,
    /// Paper height in inches.
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Page ranges such as `1-5, 8`; empty means all pages.
    pub page_ranges: String,
}

impl Default for PrintOptions {
    /// A4 portrait, backgrounds on, no margins.
    fn default() -> Self {
        Self {
            landscape: false,
            display_header_footer: false,
            print_background: true,
            scale: 1.0,
            paper_width: 8.27,
            paper_height: 11.69,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            page_ranges: String::new(),
        }
    }
}

/// Target primitive type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Number,
    Text,
}

/// Typed accessor for the field an option coerces into.
#[derive(Clone, Copy)]
enum Field {
    Bool(fn(&mut PrintOptions) -> &mut bool),
    Number(fn(&mut PrintOptions) -> &mut f64),
    Text(fn(&mut PrintOptions) -> &mut String),
}

impl Field {
    fn kind(self) -> OptionKind {
        match self {
            Field::Bool(_) => OptionKind::Bool,
            Field::Number(_) => OptionKind::Number,
            Field::Text(_) => OptionKind::Text,
        }
    }

    fn apply(self, options: &mut PrintOptions, value: &OptionValue) {
        match self {
            Field::Bool(field) => *field(options) = value.to_bool(),
            Field::Number(field) => *field(options) = value.to_number(),
            Field::Text(field) => *field(options) = value.to_text(),
        }
    }
}

/// Wire name and target field of every recognized option.
const OPTION_SCHEMA: &[(&str, Field)] = &[
    ("landscape", Field::Bool(|o| &mut o.landscape)),
    ("displayHeaderFooter", Field::Bool(|o| &mut o.display_header_footer)),
    ("printBackground", Field::Bool(|o| &mut o.print_background)),
    ("scale", Field::Number(|o| &mut o.scale)),
    ("paperWidth", Field::Number(|o| &mut o.paper_width)),
    ("paperHeight", Field::Number(|o| &mut o.paper_height)),
    ("marginTop", Field::Number(|o| &mut o.margin_top)),
    ("marginBottom", Field::Number(|o| &mut o.margin_bottom)),
    ("marginLeft", Field::Number(|o| &mut o.margin_left)),
    ("marginRight", Field::Number(|o| &mut o.margin_right)),
    ("pageRanges", Field::Text(|o| &mut o.page_ranges)),
];

fn schema_field(name: &str) -> Option<Field> {
    OPTION_SCHEMA
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, field)| *field)
}

/// Looks up the target type of an option by its wire name.
pub fn option_kind(name: &str) -> Option<OptionKind> {
    schema_field(name).map(Field::kind)
}

/// An untyped option value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    pub fn to_bool(&self) -> bool {
        match self {
            OptionValue::Null => false,
            OptionValue::Bool(b) => *b,
            OptionValue::Number(n) => !(*n == 0.0 || n.is_nan()),
            OptionValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            OptionValue::Null => 0.0,
            OptionValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            OptionValue::Number(n) => *n,
            OptionValue::Text(s) => parse_loose_number(s),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            OptionValue::Null => "null".to_string(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Number(n) => format_loose_number(*n),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl PrintOptions {
    /// Coerces `value` into the option named `name`. Returns `false` when the
    /// name is not a recognized option.
    pub fn set(&mut self, name: &str, value: &OptionValue) -> bool {
        match schema_field(name) {
            Some(field) => {
                field.apply(self, value);
                true
            }
            None => false,
        }
    }
}

/// Builds print options from defaults overlaid with caller overrides.
///
/// Never fails: every recognized value is force-coerced and unknown keys are
/// ignored.
pub fn normalize<K, V, I>(overrides: I) -> PrintOptions
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<OptionValue>,
{
    let mut options = PrintOptions::default();
    for (key, value) in overrides {
        let key = key.as_ref();
        let value = value.into();
        if !options.set(key, &value) {
            debug!(option = key, "Dropping unrecognized print option");
        }
    }
    options
}

/// Normalizes string-typed query parameters, as delivered by the request boundary.
pub fn normalize_query(params: &HashMap<String, String>) -> PrintOptions {
    normalize(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn parse_loose_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&s[2..], radix);
    }

    // Rust also accepts "inf"/"nan" spellings; only plain decimal literals count here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Accumulates digits in `f64` so literals wider than 64 bits still parse.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

fn format_loose_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form carries an explicit sign, e.g. `1e+21` and `1.5e-7`.
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}
